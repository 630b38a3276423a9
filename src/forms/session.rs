use crate::domain::models::{Decision, Question, SubmissionOutcome};
use crate::forms::schema::{CompiledSchema, FormValues, Violation};

/// One form session's lifecycle. The schema inside `Ready`/`Submitting`
/// is a derived value: every `QuestionsLoaded` replaces it wholesale.
#[derive(Debug)]
pub enum FormState {
    /// Entered once at mount, while the question list is in flight.
    LoadingQuestions,
    /// Question fetch (or compile) failed. Terminal for this page load.
    LoadFailed { message: String },
    Ready {
        schema: CompiledSchema,
        values: FormValues,
        violations: Vec<Violation>,
        /// Set after a transport failure on submit; the user may retry.
        retry_notice: Option<String>,
    },
    Submitting {
        schema: CompiledSchema,
        values: FormValues,
    },
    Accepted { score: Option<f64> },
    Rejected,
    /// The session was abandoned. Absorbs every later event, so a fetch
    /// that races with navigation can never resurrect the form.
    Closed,
}

#[derive(Debug)]
pub enum FormEvent {
    QuestionsLoaded(Vec<Question>),
    LoadFailed(String),
    ValuesChanged(FormValues),
    SubmitRequested,
    Outcome(SubmissionOutcome),
    TransportFailed(String),
    Abandoned,
}

impl FormState {
    pub fn new() -> Self {
        FormState::LoadingQuestions
    }

    pub fn apply(self, event: FormEvent) -> FormState {
        if matches!(self, FormState::Closed) {
            return FormState::Closed;
        }
        if matches!(event, FormEvent::Abandoned) {
            return FormState::Closed;
        }

        match (self, event) {
            (FormState::LoadingQuestions | FormState::Ready { .. }, FormEvent::QuestionsLoaded(questions)) => {
                match CompiledSchema::compile(&questions) {
                    Ok(schema) => FormState::Ready {
                        schema,
                        values: FormValues::default(),
                        violations: Vec::new(),
                        retry_notice: None,
                    },
                    Err(e) => FormState::LoadFailed {
                        message: e.to_string(),
                    },
                }
            }
            (FormState::LoadingQuestions, FormEvent::LoadFailed(message)) => {
                FormState::LoadFailed { message }
            }
            (FormState::Ready { schema, .. }, FormEvent::ValuesChanged(values)) => {
                FormState::Ready {
                    schema,
                    values,
                    violations: Vec::new(),
                    retry_notice: None,
                }
            }
            (FormState::Ready { schema, values, .. }, FormEvent::SubmitRequested) => {
                let violations = schema.validate(&values);
                if violations.is_empty() {
                    FormState::Submitting { schema, values }
                } else {
                    FormState::Ready {
                        schema,
                        values,
                        violations,
                        retry_notice: None,
                    }
                }
            }
            (FormState::Submitting { .. }, FormEvent::Outcome(outcome)) => match outcome.status {
                Decision::Accepted => FormState::Accepted { score: outcome.score },
                Decision::Rejected => FormState::Rejected,
            },
            (FormState::Submitting { schema, values }, FormEvent::TransportFailed(message)) => {
                FormState::Ready {
                    schema,
                    values,
                    violations: Vec::new(),
                    retry_notice: Some(message),
                }
            }
            // Anything else is a stale or out-of-order event.
            (state, event) => {
                tracing::debug!("ignoring form event {:?} in current state", event);
                state
            }
        }
    }
}

impl Default for FormState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{QuestionId, QuestionType};

    fn questions() -> Vec<Question> {
        vec![Question {
            id: QuestionId(1),
            text: "Why here?".to_string(),
            question_type: QuestionType::Text,
            display_order: 1,
            importance: 1,
            options: None,
        }]
    }

    fn filled_values() -> FormValues {
        FormValues {
            team_name: "crew".to_string(),
            email: None,
            phone: None,
            answers: [(QuestionId(1), "because".to_string())].into(),
        }
    }

    #[test]
    fn load_failure_is_terminal() {
        let state = FormState::new().apply(FormEvent::LoadFailed("boom".to_string()));
        assert!(matches!(state, FormState::LoadFailed { .. }));

        // No schema exists, so a submit request has nothing to act on.
        let state = state.apply(FormEvent::SubmitRequested);
        assert!(matches!(state, FormState::LoadFailed { .. }));
    }

    #[test]
    fn submit_with_violations_stays_ready_and_never_submits() {
        let state = FormState::new()
            .apply(FormEvent::QuestionsLoaded(questions()))
            .apply(FormEvent::SubmitRequested);
        match state {
            FormState::Ready { violations, .. } => assert!(!violations.is_empty()),
            other => panic!("expected Ready, got {other:?}"),
        }
    }

    #[test]
    fn valid_submit_reaches_backend_decision() {
        let state = FormState::new()
            .apply(FormEvent::QuestionsLoaded(questions()))
            .apply(FormEvent::ValuesChanged(filled_values()))
            .apply(FormEvent::SubmitRequested);
        assert!(matches!(state, FormState::Submitting { .. }));

        let rejected = state.apply(FormEvent::Outcome(SubmissionOutcome {
            status: Decision::Rejected,
            score: Some(41.0),
        }));
        assert!(matches!(rejected, FormState::Rejected));
    }

    #[test]
    fn transport_failure_returns_to_ready_with_notice() {
        let state = FormState::new()
            .apply(FormEvent::QuestionsLoaded(questions()))
            .apply(FormEvent::ValuesChanged(filled_values()))
            .apply(FormEvent::SubmitRequested)
            .apply(FormEvent::TransportFailed("502".to_string()));
        match state {
            FormState::Ready { retry_notice, .. } => assert!(retry_notice.is_some()),
            other => panic!("expected Ready, got {other:?}"),
        }
    }

    #[test]
    fn reloaded_questions_replace_schema_wholesale() {
        let state = FormState::new().apply(FormEvent::QuestionsLoaded(questions()));

        let replacement = vec![Question {
            id: QuestionId(2),
            text: "New one".to_string(),
            question_type: QuestionType::Text,
            display_order: 1,
            importance: 1,
            options: None,
        }];
        let state = state.apply(FormEvent::QuestionsLoaded(replacement));
        match state {
            FormState::Ready { schema, .. } => {
                assert!(schema.rule(QuestionId(1)).is_none());
                assert!(schema.rule(QuestionId(2)).is_some());
            }
            other => panic!("expected Ready, got {other:?}"),
        }
    }

    #[test]
    fn closed_absorbs_late_events() {
        let state = FormState::new().apply(FormEvent::Abandoned);
        assert!(matches!(state, FormState::Closed));

        // A fetch result landing after navigation away must not update state.
        let state = state.apply(FormEvent::QuestionsLoaded(questions()));
        assert!(matches!(state, FormState::Closed));

        let state = state.apply(FormEvent::Outcome(SubmissionOutcome {
            status: Decision::Accepted,
            score: None,
        }));
        assert!(matches!(state, FormState::Closed));
    }
}

use crate::domain::models::{Answer, Question, QuestionId, QuestionType};
use serde::Serialize;
use std::collections::HashMap;

/// Maximum length for free-text answers.
pub const MAX_TEXT_LEN: usize = 500;

/// Canonical tokens a yes/no field must resolve to.
pub const YES_TOKEN: &str = "yes";
pub const NO_TOKEN: &str = "no";

#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    #[error("dropdown question {0} has no options")]
    MissingOptions(QuestionId),
}

/// Per-type validation rule for one question.
#[derive(Debug, Clone, PartialEq)]
pub enum Rule {
    Text { max_len: usize },
    YesNo,
    Dropdown { options: Vec<String> },
}

#[derive(Debug, Clone)]
pub struct CompiledField {
    pub id: QuestionId,
    pub label: String,
    pub rule: Rule,
}

/// Where a violation points for per-field display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "field", content = "question_id")]
pub enum FieldKey {
    TeamName,
    Question(QuestionId),
}

#[derive(Debug, Clone, Serialize)]
pub struct Violation {
    #[serde(flatten)]
    pub key: FieldKey,
    pub message: String,
}

/// Current values of one form session, keyed by question identity.
#[derive(Debug, Clone, Default)]
pub struct FormValues {
    pub team_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub answers: HashMap<QuestionId, String>,
}

/// Validation ruleset derived from one fetched question list, in display
/// order. Rebuilt wholesale whenever the list changes; never patched in
/// place, so a deleted question can never leave a stale rule behind.
#[derive(Debug, Clone)]
pub struct CompiledSchema {
    fields: Vec<CompiledField>,
}

impl CompiledSchema {
    /// Build one rule per question, ordered by `display_order` ascending
    /// with ties broken by `id` ascending.
    pub fn compile(questions: &[Question]) -> Result<Self, SchemaError> {
        let mut sorted: Vec<&Question> = questions.iter().collect();
        sorted.sort_by_key(|q| (q.display_order, q.id));

        let mut fields = Vec::with_capacity(sorted.len());
        for question in sorted {
            let rule = match question.question_type {
                QuestionType::Text => Rule::Text { max_len: MAX_TEXT_LEN },
                QuestionType::YesNo => Rule::YesNo,
                QuestionType::Dropdown => {
                    let options = question
                        .options
                        .clone()
                        .filter(|opts| !opts.is_empty())
                        .ok_or(SchemaError::MissingOptions(question.id))?;
                    Rule::Dropdown { options }
                }
            };
            fields.push(CompiledField {
                id: question.id,
                label: question.text.clone(),
                rule,
            });
        }

        Ok(Self { fields })
    }

    pub fn fields(&self) -> &[CompiledField] {
        &self.fields
    }

    pub fn rule(&self, id: QuestionId) -> Option<&Rule> {
        self.fields.iter().find(|f| f.id == id).map(|f| &f.rule)
    }

    /// Check the per-question rules plus the fixed applicant rules.
    /// Returns one violation per failing field; empty means submittable.
    pub fn validate(&self, values: &FormValues) -> Vec<Violation> {
        let mut violations = Vec::new();

        if values.team_name.trim().is_empty() {
            violations.push(Violation {
                key: FieldKey::TeamName,
                message: "Team name is required".to_string(),
            });
        }

        for field in &self.fields {
            let value = values
                .answers
                .get(&field.id)
                .map(String::as_str)
                .unwrap_or("");

            let message = match &field.rule {
                Rule::Text { max_len } => {
                    if value.is_empty() {
                        Some(format!("\"{}\" requires an answer", field.label))
                    } else if value.chars().count() > *max_len {
                        Some(format!(
                            "\"{}\" must be at most {} characters",
                            field.label, max_len
                        ))
                    } else {
                        None
                    }
                }
                Rule::YesNo => {
                    if value == YES_TOKEN || value == NO_TOKEN {
                        None
                    } else {
                        Some(format!("\"{}\" must be answered yes or no", field.label))
                    }
                }
                Rule::Dropdown { options } => {
                    if value.is_empty() {
                        Some(format!("\"{}\" requires a selection", field.label))
                    } else if !options.iter().any(|o| o == value) {
                        Some(format!("\"{}\" has no option \"{}\"", field.label, value))
                    } else {
                        None
                    }
                }
            };

            if let Some(message) = message {
                violations.push(Violation {
                    key: FieldKey::Question(field.id),
                    message,
                });
            }
        }

        violations
    }

    /// Assemble the outbound answers in schema order. Yes/no values are
    /// normalized to the literal strings "Yes"/"No"; everything else
    /// passes through unchanged. Call after `validate` reports clean.
    pub fn answers(&self, values: &FormValues) -> Vec<Answer> {
        self.fields
            .iter()
            .map(|field| {
                let raw = values
                    .answers
                    .get(&field.id)
                    .map(String::as_str)
                    .unwrap_or("");
                let answer = match field.rule {
                    Rule::YesNo => match raw {
                        YES_TOKEN => "Yes".to_string(),
                        NO_TOKEN => "No".to_string(),
                        other => other.to_string(),
                    },
                    _ => raw.to_string(),
                };
                Answer {
                    question_id: field.id,
                    question_text: field.label.clone(),
                    answer,
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(id: i64, qtype: QuestionType, order: i32, options: Option<Vec<&str>>) -> Question {
        Question {
            id: QuestionId(id),
            text: format!("Question {id}"),
            question_type: qtype,
            display_order: order,
            importance: 1,
            options: options.map(|o| o.into_iter().map(String::from).collect()),
        }
    }

    fn values_with(team: &str, pairs: &[(i64, &str)]) -> FormValues {
        FormValues {
            team_name: team.to_string(),
            email: None,
            phone: None,
            answers: pairs
                .iter()
                .map(|(id, v)| (QuestionId(*id), v.to_string()))
                .collect(),
        }
    }

    #[test]
    fn compile_is_a_bijection_over_question_ids() {
        let questions = vec![
            question(1, QuestionType::Text, 2, None),
            question(2, QuestionType::YesNo, 1, None),
            question(3, QuestionType::Dropdown, 3, Some(vec!["A", "B"])),
        ];
        let schema = CompiledSchema::compile(&questions).unwrap();

        let mut keys: Vec<i64> = schema.fields().iter().map(|f| f.id.0).collect();
        keys.sort_unstable();
        assert_eq!(keys, vec![1, 2, 3]);
        assert!(schema.rule(QuestionId(4)).is_none());
    }

    #[test]
    fn compile_sorts_by_display_order_with_id_tiebreak() {
        let questions = vec![
            question(9, QuestionType::Text, 5, None),
            question(3, QuestionType::Text, 5, None),
            question(7, QuestionType::Text, 1, None),
        ];
        let schema = CompiledSchema::compile(&questions).unwrap();
        let order: Vec<i64> = schema.fields().iter().map(|f| f.id.0).collect();
        assert_eq!(order, vec![7, 3, 9]);
    }

    #[test]
    fn compile_rejects_dropdown_without_options() {
        let missing = vec![question(1, QuestionType::Dropdown, 1, None)];
        assert!(matches!(
            CompiledSchema::compile(&missing),
            Err(SchemaError::MissingOptions(QuestionId(1)))
        ));

        let empty = vec![question(1, QuestionType::Dropdown, 1, Some(vec![]))];
        assert!(CompiledSchema::compile(&empty).is_err());
    }

    #[test]
    fn text_rule_enforces_length_bounds() {
        let questions = vec![question(1, QuestionType::Text, 1, None)];
        let schema = CompiledSchema::compile(&questions).unwrap();

        let at_limit = "x".repeat(500);
        assert!(schema.validate(&values_with("team", &[(1, at_limit.as_str())])).is_empty());

        let over = "x".repeat(501);
        let violations = schema.validate(&values_with("team", &[(1, over.as_str())]));
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].key, FieldKey::Question(QuestionId(1)));

        let violations = schema.validate(&values_with("team", &[(1, "")]));
        assert_eq!(violations.len(), 1);
    }

    #[test]
    fn violation_message_references_question_text() {
        let questions = vec![question(1, QuestionType::Text, 1, None)];
        let schema = CompiledSchema::compile(&questions).unwrap();
        let violations = schema.validate(&values_with("team", &[]));
        assert!(violations[0].message.contains("Question 1"));
    }

    #[test]
    fn yes_no_rule_accepts_only_canonical_tokens() {
        let questions = vec![question(1, QuestionType::YesNo, 1, None)];
        let schema = CompiledSchema::compile(&questions).unwrap();

        assert!(schema.validate(&values_with("team", &[(1, "yes")])).is_empty());
        assert!(schema.validate(&values_with("team", &[(1, "no")])).is_empty());
        assert!(!schema.validate(&values_with("team", &[(1, "Yes")])).is_empty());
        assert!(!schema.validate(&values_with("team", &[(1, "maybe")])).is_empty());
        assert!(!schema.validate(&values_with("team", &[(1, "")])).is_empty());
    }

    #[test]
    fn dropdown_rule_checks_option_membership() {
        let questions = vec![question(1, QuestionType::Dropdown, 1, Some(vec!["A", "B"]))];
        let schema = CompiledSchema::compile(&questions).unwrap();

        assert!(schema.validate(&values_with("team", &[(1, "A")])).is_empty());
        assert!(!schema.validate(&values_with("team", &[(1, "C")])).is_empty());
        assert!(!schema.validate(&values_with("team", &[(1, "")])).is_empty());
    }

    #[test]
    fn empty_team_name_is_a_violation() {
        let schema = CompiledSchema::compile(&[]).unwrap();
        let violations = schema.validate(&values_with("   ", &[]));
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].key, FieldKey::TeamName);
    }

    #[test]
    fn answers_follow_schema_order_and_normalize_yes_no() {
        // Fetched out of display order on purpose.
        let questions = vec![
            question(1, QuestionType::Text, 2, None),
            question(2, QuestionType::YesNo, 1, None),
            question(3, QuestionType::Dropdown, 3, Some(vec!["A", "B"])),
        ];
        let schema = CompiledSchema::compile(&questions).unwrap();
        let values = values_with("team", &[(1, "hello"), (2, "yes"), (3, "A")]);

        assert!(schema.validate(&values).is_empty());
        let answers = schema.answers(&values);

        assert_eq!(answers.len(), 3);
        let ids: Vec<i64> = answers.iter().map(|a| a.question_id.0).collect();
        assert_eq!(ids, vec![2, 1, 3]);
        assert_eq!(answers[0].answer, "Yes");
        assert_eq!(answers[1].answer, "hello");
        assert_eq!(answers[2].answer, "A");
    }
}

use crate::domain::models::{
    AnalyticsSummary, ContactMessage, ContactRequest, Message, MessageThread, Question,
    QuestionDraft, QuestionId, SubmissionDetail, SubmissionOutcome, SubmissionRequest,
    SubmissionSummary,
};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Serialize;
use uuid::Uuid;

/// Failure taxonomy for backend calls. `Status` is the backend refusing
/// the request; `Transport` is the network or TLS layer; `Decode` is a
/// 2xx body that did not match the contract. A business-level "rejected"
/// decision is NOT an error — it arrives inside `SubmissionOutcome`.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("backend returned {status}")]
    Status { status: StatusCode },
    #[error("backend response did not decode: {0}")]
    Decode(String),
}

/// Thin client for the external backend API. All persistence, scoring
/// and message storage happen on the other side of this boundary.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiError> {
        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status { status });
        }
        response
            .json::<T>()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, token: Option<&str>) -> Result<T, ApiError> {
        let mut req = self.http.get(self.url(path));
        if let Some(token) = token {
            req = req.bearer_auth(token);
        }
        Self::decode(req.send().await?).await
    }

    async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        token: Option<&str>,
        body: &B,
    ) -> Result<T, ApiError> {
        let mut req = self.http.post(self.url(path)).json(body);
        if let Some(token) = token {
            req = req.bearer_auth(token);
        }
        Self::decode(req.send().await?).await
    }

    // ---- public ----

    /// Unauthenticated read of the configured question list.
    pub async fn questions(&self) -> Result<Vec<Question>, ApiError> {
        self.get("/api/v1/questions", None).await
    }

    pub async fn submit_contact(&self, contact: &ContactRequest) -> Result<(), ApiError> {
        let response = self
            .http
            .post(self.url("/api/v1/contacts"))
            .json(contact)
            .send()
            .await?;
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(ApiError::Status { status })
        }
    }

    // ---- applicant ----

    pub async fn submit_application(
        &self,
        token: &str,
        submission: &SubmissionRequest,
    ) -> Result<SubmissionOutcome, ApiError> {
        self.post("/api/v1/submissions", Some(token), submission).await
    }

    pub async fn my_submission(&self, token: &str) -> Result<Option<SubmissionDetail>, ApiError> {
        self.get("/api/v1/submissions/mine", Some(token)).await
    }

    pub async fn my_messages(&self, token: &str) -> Result<Vec<Message>, ApiError> {
        self.get("/api/v1/messages/mine", Some(token)).await
    }

    // ---- admin ----

    pub async fn submissions(&self, token: &str) -> Result<Vec<SubmissionSummary>, ApiError> {
        self.get("/api/v1/submissions", Some(token)).await
    }

    pub async fn submission(&self, token: &str, id: Uuid) -> Result<SubmissionDetail, ApiError> {
        self.get(&format!("/api/v1/submissions/{id}"), Some(token)).await
    }

    pub async fn contacts(&self, token: &str) -> Result<Vec<ContactMessage>, ApiError> {
        self.get("/api/v1/contacts", Some(token)).await
    }

    pub async fn create_question(
        &self,
        token: &str,
        draft: &QuestionDraft,
    ) -> Result<Question, ApiError> {
        self.post("/api/v1/questions", Some(token), draft).await
    }

    pub async fn update_question(
        &self,
        token: &str,
        id: QuestionId,
        draft: &QuestionDraft,
    ) -> Result<Question, ApiError> {
        let response = self
            .http
            .put(self.url(&format!("/api/v1/questions/{id}")))
            .bearer_auth(token)
            .json(draft)
            .send()
            .await?;
        Self::decode(response).await
    }

    pub async fn delete_question(&self, token: &str, id: QuestionId) -> Result<(), ApiError> {
        let response = self
            .http
            .delete(self.url(&format!("/api/v1/questions/{id}")))
            .bearer_auth(token)
            .send()
            .await?;
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(ApiError::Status { status })
        }
    }

    pub async fn messages(&self, token: &str, submission_id: Uuid) -> Result<Vec<Message>, ApiError> {
        self.get(&format!("/api/v1/submissions/{submission_id}/messages"), Some(token))
            .await
    }

    pub async fn send_message(
        &self,
        token: &str,
        submission_id: Uuid,
        body: &str,
    ) -> Result<Message, ApiError> {
        self.post(
            &format!("/api/v1/submissions/{submission_id}/messages"),
            Some(token),
            &serde_json::json!({ "body": body }),
        )
        .await
    }

    pub async fn inbox(&self, token: &str) -> Result<Vec<MessageThread>, ApiError> {
        self.get("/api/v1/messages/inbox", Some(token)).await
    }

    pub async fn analytics(&self, token: &str) -> Result<AnalyticsSummary, ApiError> {
        self.get("/api/v1/analytics/summary", Some(token)).await
    }
}

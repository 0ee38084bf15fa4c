use async_trait::async_trait;
use gloo_net::http::{Request, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config;
use crate::error::ApiError;

#[derive(Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Offer {
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Deserialize)]
struct OfferEnvelope {
    data: Offer,
}

/// Progress as the backend stores it. Every field may be missing or malformed.
#[derive(Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RemoteProgress {
    #[serde(default)]
    pub completed: Option<Vec<bool>>,
    #[serde(default)]
    pub unlocked_count: Option<i64>,
    #[serde(default)]
    pub active_index: Option<i64>,
}

#[derive(Serialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProgressRecord {
    pub user_id: String,
    pub benefits: Vec<String>,
    pub completed: Vec<bool>,
    pub unlocked_count: usize,
    pub active_index: usize,
}

#[derive(Serialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NudgeInit {
    pub user_id: String,
    pub to: String,
    pub full_name: String,
}

#[derive(Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NudgeInitResponse {
    #[serde(default)]
    pub immediate_message: Option<String>,
}

#[derive(Serialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SmsRequest {
    pub user_id: String,
    pub to: String,
    pub full_name: String,
    pub message: String,
}

#[derive(Serialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EmailSubmission {
    pub email: String,
    pub name: String,
    pub user_id: String,
}

#[derive(Deserialize)]
struct CreatedRecord {
    #[serde(alias = "_id")]
    id: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CheckoutRequest<'a> {
    variant_id: &'a str,
}

#[derive(Deserialize)]
struct CheckoutResponse {
    url: String,
}

/// Calls the funnel makes against the backend.
#[async_trait(?Send)]
pub trait Backend {
    async fn fetch_offer(&self, user_id: &str) -> Result<Offer, ApiError>;
    /// `Ok(None)` when the backend has no progress stored for the user.
    async fn load_progress(&self, user_id: &str) -> Result<Option<RemoteProgress>, ApiError>;
    async fn save_progress(&self, record: &ProgressRecord) -> Result<(), ApiError>;
    async fn init_nudges(&self, request: &NudgeInit) -> Result<NudgeInitResponse, ApiError>;
    async fn send_sms(&self, endpoint: &str, request: &SmsRequest) -> Result<Value, ApiError>;
    async fn submit_email(&self, endpoint: &str, submission: &EmailSubmission) -> Result<(), ApiError>;
    /// Returns the id of the stored response.
    async fn create_response(&self, payload: &Value) -> Result<String, ApiError>;
    /// Returns the payment page to redirect to.
    async fn create_checkout(&self, variant_id: &str) -> Result<String, ApiError>;
}

#[derive(Clone, PartialEq)]
pub struct HttpBackend {
    base_url: String,
}

impl Default for HttpBackend {
    fn default() -> Self {
        Self::new(config::get_backend_url())
    }
}

impl HttpBackend {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self { base_url: base_url.into() }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn post_json<T: Serialize>(&self, path: &str, body: &T) -> Result<Response, ApiError> {
        let response = Request::post(&self.url(path))
            .header("Content-Type", "application/json")
            .json(body)?
            .send()
            .await?;
        check_status(response).await
    }
}

async fn check_status(response: Response) -> Result<Response, ApiError> {
    if response.ok() {
        return Ok(response);
    }
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    Err(ApiError::Status { status, body })
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    response
        .json::<T>()
        .await
        .map_err(|e| ApiError::Decode(e.to_string()))
}

#[async_trait(?Send)]
impl Backend for HttpBackend {
    async fn fetch_offer(&self, user_id: &str) -> Result<Offer, ApiError> {
        let url = self.url(&format!("/check/offer?name={}", urlencoding::encode(user_id)));
        let response = check_status(Request::get(&url).send().await?).await?;
        let envelope: OfferEnvelope = decode(response).await?;
        Ok(envelope.data)
    }

    async fn load_progress(&self, user_id: &str) -> Result<Option<RemoteProgress>, ApiError> {
        let url = self.url(&format!("/progress?userId={}", urlencoding::encode(user_id)));
        let response = Request::get(&url).send().await?;
        if response.status() == 404 {
            return Ok(None);
        }
        let response = check_status(response).await?;
        let value: Value = decode(response).await?;
        if value.is_null() {
            return Ok(None);
        }
        serde_json::from_value(value)
            .map(Some)
            .map_err(|e| ApiError::Decode(e.to_string()))
    }

    async fn save_progress(&self, record: &ProgressRecord) -> Result<(), ApiError> {
        self.post_json("/progress", record).await?;
        Ok(())
    }

    async fn init_nudges(&self, request: &NudgeInit) -> Result<NudgeInitResponse, ApiError> {
        let response = self.post_json("/nudges/init", request).await?;
        // An empty ack is fine, there is just nothing to send right away.
        Ok(response.json::<NudgeInitResponse>().await.unwrap_or_default())
    }

    async fn send_sms(&self, endpoint: &str, request: &SmsRequest) -> Result<Value, ApiError> {
        let response = self.post_json(endpoint, request).await?;
        Ok(response.json::<Value>().await.unwrap_or(Value::Null))
    }

    async fn submit_email(&self, endpoint: &str, submission: &EmailSubmission) -> Result<(), ApiError> {
        self.post_json(endpoint, submission).await?;
        Ok(())
    }

    async fn create_response(&self, payload: &Value) -> Result<String, ApiError> {
        let response = self.post_json("/response/create", payload).await?;
        let created: CreatedRecord = decode(response).await?;
        Ok(created.id)
    }

    async fn create_checkout(&self, variant_id: &str) -> Result<String, ApiError> {
        let response = self
            .post_json("/api/create-checkout", &CheckoutRequest { variant_id })
            .await?;
        let checkout: CheckoutResponse = decode(response).await?;
        Ok(checkout.url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn offer_envelope_decodes_camel_case() {
        let envelope: OfferEnvelope = serde_json::from_value(json!({
            "data": { "fullName": "Ada Lovelace", "tags": ["Medicare", "Auto"] }
        }))
        .unwrap();
        assert_eq!(envelope.data.full_name, "Ada Lovelace");
        assert_eq!(envelope.data.tags, vec!["Medicare", "Auto"]);
    }

    #[test]
    fn remote_progress_tolerates_missing_fields() {
        let progress: RemoteProgress = serde_json::from_value(json!({ "unlockedCount": 2 })).unwrap();
        assert_eq!(progress.completed, None);
        assert_eq!(progress.unlocked_count, Some(2));
        assert_eq!(progress.active_index, None);
    }

    #[test]
    fn progress_record_serializes_backend_field_names() {
        let record = ProgressRecord {
            user_id: "u-1".to_string(),
            benefits: vec!["Debt".to_string()],
            completed: vec![true],
            unlocked_count: 1,
            active_index: 0,
        };
        assert_eq!(
            serde_json::to_value(&record).unwrap(),
            json!({
                "userId": "u-1",
                "benefits": ["Debt"],
                "completed": [true],
                "unlockedCount": 1,
                "activeIndex": 0
            })
        );
    }

    #[test]
    fn created_record_accepts_mongo_style_id() {
        let created: CreatedRecord = serde_json::from_value(json!({ "_id": "abc123" })).unwrap();
        assert_eq!(created.id, "abc123");
    }
}

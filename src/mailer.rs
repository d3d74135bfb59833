// Outbound mail collaborators
// The contact desk talks to two capabilities: an automated sender and the user's own mail client.

use async_trait::async_trait;
use parking_lot::RwLock;
use serde::Serialize;
use serde_json::json;
use thiserror::Error;
use tracing::debug;

pub const EMAILJS_SEND_URL: &str = "https://api.emailjs.com/api/v1.0/email/send";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SendError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Mail service error: {status_code} - {message}")]
    Rejected { status_code: u16, message: String },

    #[error("Mail service not initialised")]
    NotInitialised,

    #[error("Other error: {0}")]
    Other(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailerInit {
    pub public_key: String,
}

// Template parameters; the field names are what the mail template refers to
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MailPayload {
    pub from_name: String,
    pub reply_to: String,
    pub subject: String,
    pub message: String,
}

#[async_trait]
pub trait MailSender: Send + Sync + 'static {
    fn init(&self, init: MailerInit);

    async fn send(
        &self,
        service_id: &str,
        template_id: &str,
        payload: &MailPayload,
    ) -> Result<(), SendError>;
}

/// A pre-filled message for the user's own mail client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailDraft {
    pub address: String,
    pub subject: String,
    pub body: String,
}

impl MailDraft {
    pub fn mailto_url(&self) -> String {
        format!(
            "mailto:{}?subject={}&body={}",
            self.address,
            urlencoding::encode(&self.subject),
            urlencoding::encode(&self.body)
        )
    }
}

// Fire-and-forget hand-off; there is nothing to wait for or fail on
pub trait MailComposer: Send + Sync {
    fn open_composer(&self, draft: &MailDraft);
}

/// [`MailSender`] backed by the EmailJS REST API.
pub struct EmailJsSender {
    client: reqwest::Client,
    endpoint: String,
    public_key: RwLock<Option<String>>,
}

impl Default for EmailJsSender {
    fn default() -> Self {
        Self::new()
    }
}

impl EmailJsSender {
    pub fn new() -> Self {
        Self::with_endpoint(EMAILJS_SEND_URL)
    }

    pub fn with_endpoint(endpoint: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
            public_key: RwLock::new(None),
        }
    }

    fn request_body(
        &self,
        service_id: &str,
        template_id: &str,
        payload: &MailPayload,
    ) -> Result<serde_json::Value, SendError> {
        let public_key = self
            .public_key
            .read()
            .clone()
            .ok_or(SendError::NotInitialised)?;

        Ok(json!({
            "service_id": service_id,
            "template_id": template_id,
            "user_id": public_key,
            "template_params": payload,
        }))
    }
}

#[async_trait]
impl MailSender for EmailJsSender {
    fn init(&self, init: MailerInit) {
        *self.public_key.write() = Some(init.public_key);
    }

    async fn send(
        &self,
        service_id: &str,
        template_id: &str,
        payload: &MailPayload,
    ) -> Result<(), SendError> {
        let body = self.request_body(service_id, template_id, payload)?;
        debug!(endpoint = %self.endpoint, service_id, template_id, "posting message");

        let response = self
            .client
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await
            .map_err(|e| SendError::Network(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let message = response
            .text()
            .await
            .unwrap_or_else(|e| format!("unreadable response body: {}", e));
        Err(SendError::Rejected {
            status_code: status.as_u16(),
            message,
        })
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::assert_err;

    fn payload() -> MailPayload {
        MailPayload {
            from_name: "Sam".to_string(),
            reply_to: "sam@example.org".to_string(),
            subject: "Visa question".to_string(),
            message: "Do I need a visa for Tokyo?".to_string(),
        }
    }

    #[test]
    fn test_mailto_url_encodes_subject_and_body() {
        let draft = MailDraft {
            address: "hello@wanderlux.example".to_string(),
            subject: "Visa & passports".to_string(),
            body: "From: Sam <sam@example.org>\n\nHi!".to_string(),
        };

        assert_eq!(
            draft.mailto_url(),
            "mailto:hello@wanderlux.example?subject=Visa%20%26%20passports\
             &body=From%3A%20Sam%20%3Csam%40example.org%3E%0A%0AHi%21"
        );
    }

    #[test]
    fn test_request_body_requires_init() {
        let sender = EmailJsSender::new();
        assert_eq!(
            sender.request_body("service_a", "template_b", &payload()),
            Err(SendError::NotInitialised)
        );
    }

    #[test]
    fn test_request_body_shape() {
        let sender = EmailJsSender::new();
        sender.init(MailerInit {
            public_key: "pk_live_123".to_string(),
        });

        let body = sender
            .request_body("service_a", "template_b", &payload())
            .unwrap();
        assert_eq!(body["service_id"], "service_a");
        assert_eq!(body["template_id"], "template_b");
        assert_eq!(body["user_id"], "pk_live_123");
        assert_eq!(body["template_params"]["from_name"], "Sam");
        assert_eq!(body["template_params"]["reply_to"], "sam@example.org");
        assert_eq!(body["template_params"]["subject"], "Visa question");
    }

    #[tokio::test]
    async fn test_send_without_init_fails_before_network() {
        let sender = EmailJsSender::with_endpoint("http://127.0.0.1:9/unused");
        let result = sender.send("service_a", "template_b", &payload()).await;
        assert_eq!(assert_err!(result), SendError::NotInitialised);
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_a_network_error() {
        let sender = EmailJsSender::with_endpoint("http://127.0.0.1:9/api/v1.0/email/send");
        sender.init(MailerInit {
            public_key: "pk".to_string(),
        });

        let result = sender.send("service_a", "template_b", &payload()).await;
        match result {
            Err(SendError::Network(_)) => {}
            other => panic!("Expected network error, got {:?}", other),
        }
    }
}

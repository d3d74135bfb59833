// Contact form delivery
// Validates the message, then either sends it through the mail service or falls back to the user's mail client.

use crate::forms::{
    validate_contact, ContactSubmission, FieldErrors, FormKind, FormSurface, StatusMessage,
};
use crate::mailer::{MailComposer, MailDraft, MailPayload, MailSender, MailerInit, SendError};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info, warn};

pub const DEFAULT_SUPPORT_ADDRESS: &str = "hello@wanderlux.example";

pub const UNCONFIGURED_NOTICE: &str =
    "Email sending is not configured yet. Fallback: opening your email client...";
pub const SENDING_NOTICE: &str = "Sending your message\u{2026}";
pub const SENT_NOTICE: &str = "Message sent successfully! We will get back to you soon.";
pub const SEND_FAILED_NOTICE: &str =
    "Something went wrong while sending. Please try again or use the fallback email link.";
pub const SEND_IN_PROGRESS_NOTICE: &str =
    "Your previous message is still being sent. Please wait a moment.";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct MailerConfig {
    pub public_key: Option<String>,
    pub service_id: Option<String>,
    pub template_id: Option<String>,
    pub support_address: String,
}

impl Default for MailerConfig {
    fn default() -> Self {
        Self {
            public_key: None,
            service_id: None,
            template_id: None,
            support_address: DEFAULT_SUPPORT_ADDRESS.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub public_key: String,
    pub service_id: String,
    pub template_id: String,
}

impl MailerConfig {
    // All three values present and non-blank, or nothing
    pub fn credentials(&self) -> Option<Credentials> {
        let present = |value: &Option<String>| {
            value
                .as_deref()
                .map(str::trim)
                .filter(|value| !value.is_empty())
                .map(str::to_string)
        };

        Some(Credentials {
            public_key: present(&self.public_key)?,
            service_id: present(&self.service_id)?,
            template_id: present(&self.template_id)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryState {
    Unconfigured,
    Configured(Credentials),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryOutcome {
    Sent,
    FallbackComposed(MailDraft),
    SendFailed(SendError),
}

impl DeliveryOutcome {
    pub fn status(&self) -> StatusMessage {
        match self {
            DeliveryOutcome::Sent => StatusMessage::info(SENT_NOTICE),
            DeliveryOutcome::FallbackComposed(_) => StatusMessage::warn(UNCONFIGURED_NOTICE),
            DeliveryOutcome::SendFailed(_) => StatusMessage::warn(SEND_FAILED_NOTICE),
        }
    }

    pub fn clears_form(&self) -> bool {
        matches!(self, DeliveryOutcome::Sent)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ContactError {
    #[error("Contact form rejected: {0}")]
    Invalid(FieldErrors),

    #[error("A message is already being sent")]
    SendInProgress,
}

// Held for the duration of one send; dropping it frees the desk
struct InFlight<'a>(&'a AtomicBool);

impl<'a> InFlight<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

pub struct ContactDesk {
    config: MailerConfig,
    sender: Option<Arc<dyn MailSender>>,
    composer: Arc<dyn MailComposer>,
    in_flight: AtomicBool,
}

impl ContactDesk {
    pub fn new(
        config: MailerConfig,
        sender: Option<Arc<dyn MailSender>>,
        composer: Arc<dyn MailComposer>,
    ) -> Self {
        Self {
            config,
            sender,
            composer,
            in_flight: AtomicBool::new(false),
        }
    }

    pub fn config(&self) -> &MailerConfig {
        &self.config
    }

    // Configured only when the sender exists and every credential is filled in
    pub fn state(&self) -> DeliveryState {
        match (&self.sender, self.config.credentials()) {
            (Some(_), Some(credentials)) => DeliveryState::Configured(credentials),
            _ => DeliveryState::Unconfigured,
        }
    }

    pub fn is_sending(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    pub async fn submit(
        &self,
        submission: &ContactSubmission,
        surface: &dyn FormSurface,
    ) -> Result<DeliveryOutcome, ContactError> {
        surface.clear_errors(FormKind::Contact);

        let submission = submission.trimmed();
        let errors = validate_contact(&submission);
        if !errors.is_empty() {
            errors.render(surface);
            return Err(ContactError::Invalid(errors));
        }

        let outcome = match (&self.sender, self.state()) {
            (Some(sender), DeliveryState::Configured(credentials)) => {
                let _in_flight = InFlight::acquire(&self.in_flight).ok_or_else(|| {
                    warn!("contact submission refused, previous send still pending");
                    surface.set_status(&StatusMessage::warn(SEND_IN_PROGRESS_NOTICE));
                    ContactError::SendInProgress
                })?;
                self.deliver(sender.as_ref(), &credentials, &submission, surface)
                    .await
            }
            _ => {
                let draft = self.fallback_draft(&submission);
                surface.set_status(&StatusMessage::warn(UNCONFIGURED_NOTICE));
                self.composer.open_composer(&draft);
                info!(address = %draft.address, "mail service not configured, composed fallback draft");
                DeliveryOutcome::FallbackComposed(draft)
            }
        };

        Ok(outcome)
    }

    async fn deliver(
        &self,
        sender: &dyn MailSender,
        credentials: &Credentials,
        submission: &ContactSubmission,
        surface: &dyn FormSurface,
    ) -> DeliveryOutcome {
        sender.init(MailerInit {
            public_key: credentials.public_key.clone(),
        });
        surface.set_status(&StatusMessage::info(SENDING_NOTICE));

        let payload = MailPayload {
            from_name: submission.name.clone(),
            reply_to: submission.email.clone(),
            subject: submission.subject.clone(),
            message: submission.message.clone(),
        };

        let outcome = match sender
            .send(&credentials.service_id, &credentials.template_id, &payload)
            .await
        {
            Ok(()) => {
                info!(service_id = %credentials.service_id, "contact message sent");
                DeliveryOutcome::Sent
            }
            Err(err) => {
                error!(error = %err, service_id = %credentials.service_id, "contact message send failed");
                DeliveryOutcome::SendFailed(err)
            }
        };

        surface.set_status(&outcome.status());
        if outcome.clears_form() {
            surface.reset_form(FormKind::Contact);
        }
        outcome
    }

    pub fn fallback_draft(&self, submission: &ContactSubmission) -> MailDraft {
        MailDraft {
            address: self.config.support_address.clone(),
            subject: submission.subject.clone(),
            body: format!(
                "From: {} <{}>\n\n{}",
                submission.name, submission.email, submission.message
            ),
        }
    }
}

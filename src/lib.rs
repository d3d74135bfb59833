// Trip cost estimator and enquiry forms for the travel agency site

pub mod config;
pub mod contact;
pub mod estimator;
pub mod forms;
pub mod mailer;
pub mod rates;

// Re-export key types for convenience
pub use config::{ConfigError, SiteConfig};
pub use contact::{ContactDesk, ContactError, DeliveryOutcome, DeliveryState, MailerConfig};
pub use estimator::{CostEstimator, EstimateError, TripInput, TripQuote, TripRequest};
pub use forms::{
    review_appointment, validate_appointment, validate_contact, AppointmentSubmission,
    ContactSubmission, FieldErrors, FormField, FormKind, FormSurface, StatusLevel, StatusMessage,
};
pub use mailer::{EmailJsSender, MailComposer, MailDraft, MailPayload, MailSender, SendError};
pub use rates::{CurrencyFormat, Destination, RateTable, TravelStyle};

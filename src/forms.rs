// Appointment and contact form validation
// Every field is checked on its own so the user sees all problems at once.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use tracing::debug;

// Deliberately loose: something@something.something, no whitespace
static EMAIL_SHAPE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("Valid regex pattern"));

pub const MIN_NAME_LEN: usize = 2;
pub const MIN_PHONE_LEN: usize = 8;
pub const MIN_SUBJECT_LEN: usize = 3;
pub const MIN_MESSAGE_LEN: usize = 10;

pub fn is_email(value: &str) -> bool {
    EMAIL_SHAPE.is_match(value.trim())
}

// Length in characters after trimming surrounding whitespace
fn trimmed_len(value: &str) -> usize {
    value.trim().chars().count()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum FormKind {
    Appointment,
    Contact,
}

impl FormKind {
    fn element_prefix(&self) -> &'static str {
        match self {
            FormKind::Appointment => "appt",
            FormKind::Contact => "c",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum FormField {
    Name,
    Email,
    Phone,
    Date,
    Subject,
    Message,
}

impl FormField {
    pub fn label(&self) -> &'static str {
        match self {
            FormField::Name => "Name",
            FormField::Email => "Email",
            FormField::Phone => "Phone",
            FormField::Date => "Date",
            FormField::Subject => "Subject",
            FormField::Message => "Message",
        }
    }

    /// Identifier of the input element on the page, e.g. `apptEmail` or `cSubject`.
    pub fn element_id(&self, form: FormKind) -> String {
        format!("{}{}", form.element_prefix(), self.label())
    }
}

/// Accumulated per-field errors for one submission. At most one message per field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldErrors {
    form: FormKind,
    errors: BTreeMap<FormField, &'static str>,
}

impl FieldErrors {
    pub fn new(form: FormKind) -> Self {
        Self {
            form,
            errors: BTreeMap::new(),
        }
    }

    pub fn form(&self) -> FormKind {
        self.form
    }

    fn check(&mut self, field: FormField, ok: bool, message: &'static str) {
        if !ok {
            self.errors.insert(field, message);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn get(&self, field: FormField) -> Option<&'static str> {
        self.errors.get(&field).copied()
    }

    pub fn contains(&self, field: FormField) -> bool {
        self.errors.contains_key(&field)
    }

    pub fn fields(&self) -> impl Iterator<Item = FormField> + '_ {
        self.errors.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (FormField, &'static str)> + '_ {
        self.errors.iter().map(|(field, message)| (*field, *message))
    }

    pub fn render(&self, surface: &dyn FormSurface) {
        for (field, message) in self.iter() {
            surface.show_field_error(&field.element_id(self.form), message);
        }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fields: Vec<&str> = self.fields().map(|field| field.label()).collect();
        write!(f, "invalid fields: {}", fields.join(", "))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct AppointmentSubmission {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub date: String,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ContactSubmission {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
}

impl ContactSubmission {
    // Values as they are sent on: surrounding whitespace removed
    pub fn trimmed(&self) -> Self {
        Self {
            name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
            subject: self.subject.trim().to_string(),
            message: self.message.trim().to_string(),
        }
    }
}

pub fn validate_appointment(submission: &AppointmentSubmission) -> FieldErrors {
    let mut errors = FieldErrors::new(FormKind::Appointment);
    errors.check(
        FormField::Name,
        trimmed_len(&submission.name) >= MIN_NAME_LEN,
        "Please enter your full name.",
    );
    errors.check(
        FormField::Email,
        is_email(&submission.email),
        "Please enter a valid email address.",
    );
    errors.check(
        FormField::Phone,
        trimmed_len(&submission.phone) >= MIN_PHONE_LEN,
        "Please enter a valid phone number.",
    );
    errors.check(
        FormField::Date,
        !submission.date.trim().is_empty(),
        "Please choose a preferred date.",
    );
    errors.check(
        FormField::Message,
        trimmed_len(&submission.message) >= MIN_MESSAGE_LEN,
        "Please provide at least 10 characters.",
    );
    errors
}

pub fn validate_contact(submission: &ContactSubmission) -> FieldErrors {
    let mut errors = FieldErrors::new(FormKind::Contact);
    errors.check(
        FormField::Name,
        trimmed_len(&submission.name) >= MIN_NAME_LEN,
        "Please enter your name.",
    );
    errors.check(
        FormField::Email,
        is_email(&submission.email),
        "Please enter a valid email.",
    );
    errors.check(
        FormField::Subject,
        trimmed_len(&submission.subject) >= MIN_SUBJECT_LEN,
        "Please add a subject.",
    );
    errors.check(
        FormField::Message,
        trimmed_len(&submission.message) >= MIN_MESSAGE_LEN,
        "Please write at least 10 characters.",
    );
    errors
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StatusLevel {
    Info,
    Warn,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusMessage {
    pub level: StatusLevel,
    pub text: String,
}

impl StatusMessage {
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            level: StatusLevel::Info,
            text: text.into(),
        }
    }

    pub fn warn(text: impl Into<String>) -> Self {
        Self {
            level: StatusLevel::Warn,
            text: text.into(),
        }
    }
}

// The page the forms live on. Implementations only render; they never decide anything.
pub trait FormSurface: Send + Sync {
    fn clear_errors(&self, form: FormKind);

    fn show_field_error(&self, element_id: &str, message: &str);

    fn set_status(&self, status: &StatusMessage);

    fn reset_form(&self, form: FormKind);
}

// Clears stale errors, then either lets the booking request through or shows what is wrong
pub fn review_appointment(
    submission: &AppointmentSubmission,
    surface: &dyn FormSurface,
) -> Result<(), FieldErrors> {
    surface.clear_errors(FormKind::Appointment);

    let errors = validate_appointment(submission);
    if errors.is_empty() {
        debug!("appointment request accepted");
        return Ok(());
    }

    debug!(%errors, "appointment request blocked");
    errors.render(surface);
    Err(errors)
}

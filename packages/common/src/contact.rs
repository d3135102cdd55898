//! Field rules and spam heuristics for public contact-form submissions.

use std::sync::LazyLock;

use regex::Regex;

pub const NAME_MIN: usize = 2;
pub const NAME_MAX: usize = 100;
pub const MESSAGE_MIN: usize = 10;
pub const MESSAGE_MAX: usize = 5000;
pub const SUBJECT_MAX: usize = 200;

/// Trailing window for duplicate and volume checks.
pub const DEFAULT_WINDOW_MINUTES: u32 = 60;
/// Messages one address may store within the window.
pub const DEFAULT_MAX_PER_WINDOW: u32 = 5;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ContactError {
    #[error("Name, email, and message are required fields")]
    MissingFields,
    #[error("Name must be between 2 and 100 characters")]
    NameLength,
    #[error("Message must be between 10 and 5000 characters")]
    MessageLength,
    #[error("Subject must be at most 200 characters")]
    SubjectLength,
    #[error("Invalid email format")]
    InvalidEmail,
}

static EMAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid regex"));

/// A submission whose fields passed validation, in stored form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactSubmission {
    pub name: String,
    /// Trimmed and lowercased.
    pub email: String,
    pub message: String,
    /// `None` when absent or blank.
    pub subject: Option<String>,
}

impl ContactSubmission {
    /// Trim and validate raw form fields. Checks run in order: required
    /// fields, name, message, subject, email.
    pub fn normalize(
        name: &str,
        email: &str,
        message: &str,
        subject: Option<&str>,
    ) -> Result<Self, ContactError> {
        if name.is_empty() || email.is_empty() || message.is_empty() {
            return Err(ContactError::MissingFields);
        }

        let name = name.trim();
        let email = email.trim().to_lowercase();
        let message = message.trim();
        let subject = subject.map(str::trim).filter(|s| !s.is_empty());

        if !(NAME_MIN..=NAME_MAX).contains(&name.chars().count()) {
            return Err(ContactError::NameLength);
        }
        if !(MESSAGE_MIN..=MESSAGE_MAX).contains(&message.chars().count()) {
            return Err(ContactError::MessageLength);
        }
        if let Some(subject) = subject
            && subject.chars().count() > SUBJECT_MAX
        {
            return Err(ContactError::SubjectLength);
        }
        if !EMAIL.is_match(&email) {
            return Err(ContactError::InvalidEmail);
        }

        Ok(Self {
            name: name.to_string(),
            email,
            message: message.to_string(),
            subject: subject.map(str::to_string),
        })
    }

    /// Names of the spam heuristics this submission trips.
    pub fn spam_signals(&self) -> Vec<&'static str> {
        spam_matches(self.subject.as_deref(), &self.message)
    }
}

static SPAM_PATTERNS: LazyLock<Vec<(&'static str, Regex)>> = LazyLock::new(|| {
    [
        (
            "url_shortener",
            r"(?:https?://)?(?:www\.)?(?:bit\.ly|tinyurl|t\.co|goo\.gl|short\.link)",
        ),
        (
            "promotional",
            r"(?:buy|cheap|discount|offer|deal|sale).*(?:now|today|limited)",
        ),
        ("call_to_action", r"(?:click here|visit now|act now|order now)"),
        ("money_scheme", r"(?:free money|make money|earn money|get rich)"),
    ]
    .into_iter()
    .map(|(name, pattern)| (name, Regex::new(pattern).expect("valid regex")))
    .collect()
});

/// Match `subject + " " + message`, lowercased, against the spam patterns.
///
/// Matches are advisory; callers log them and still accept the submission.
pub fn spam_matches(subject: Option<&str>, message: &str) -> Vec<&'static str> {
    let combined = format!(
        "{} {}",
        subject.unwrap_or_default().to_lowercase(),
        message.to_lowercase()
    );

    SPAM_PATTERNS
        .iter()
        .filter(|(_, re)| re.is_match(&combined))
        .map(|(name, _)| *name)
        .collect()
}

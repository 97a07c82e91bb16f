//! Conclusion of a validation process
//!
//! A conclusion pairs an [`Indication`] (optionally refined by a
//! [`SubIndication`]) with the ordered messages recorded while reaching it.
//! Message keys are opaque; rendering them is left to report serializers.

use serde::{Deserialize, Serialize};

use crate::types::{Indication, SubIndication};

/// Severity of a recorded message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

/// A message key recorded on a conclusion
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub severity: Severity,

    /// Opaque message key
    pub key: String,

    /// Free-form detail, e.g. the offending algorithm
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl Message {
    /// Create a message without detail
    pub fn new(severity: Severity, key: impl Into<String>) -> Self {
        Self {
            severity,
            key: key.into(),
            detail: None,
        }
    }

    /// Attach a detail string
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

/// Outcome of a validation process
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conclusion {
    pub indication: Indication,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub_indication: Option<SubIndication>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub messages: Vec<Message>,
}

impl Default for Conclusion {
    fn default() -> Self {
        Self::valid()
    }
}

impl Conclusion {
    /// A `VALID` conclusion with no messages
    pub fn valid() -> Self {
        Self {
            indication: Indication::Valid,
            sub_indication: None,
            messages: Vec::new(),
        }
    }

    /// A non-valid conclusion
    pub fn new(indication: Indication, sub_indication: Option<SubIndication>) -> Self {
        Self {
            indication,
            sub_indication,
            messages: Vec::new(),
        }
    }

    /// `INDETERMINATE / UNEXPECTED_ERROR` carrying the error text as detail
    pub fn unexpected_error(detail: impl Into<String>) -> Self {
        let mut conclusion = Self::new(
            Indication::Indeterminate,
            Some(SubIndication::UnexpectedError),
        );
        conclusion.push(Message::new(Severity::Error, "unexpected_error").with_detail(detail));
        conclusion
    }

    pub fn is_valid(&self) -> bool {
        self.indication == Indication::Valid
    }

    /// True when the conclusion can only be resolved by a proof of existence
    pub fn requires_poe(&self) -> bool {
        self.indication == Indication::Indeterminate
            && self.sub_indication.map_or(false, SubIndication::requires_poe)
    }

    /// Append a message
    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub fn errors(&self) -> impl Iterator<Item = &Message> {
        self.by_severity(Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Message> {
        self.by_severity(Severity::Warning)
    }

    pub fn infos(&self) -> impl Iterator<Item = &Message> {
        self.by_severity(Severity::Info)
    }

    fn by_severity(&self, severity: Severity) -> impl Iterator<Item = &Message> {
        self.messages.iter().filter(move |m| m.severity == severity)
    }
}

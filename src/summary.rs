//! Summary struct - the text returned by the LLM for one request.

use chrono::{DateTime, Utc};
use std::fmt;

/// Generated summary, kept exactly as the provider returned it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    /// The generated text, verbatim
    pub text: String,
    /// Model that produced the text
    pub model: String,
    /// When the response arrived
    pub created_at: DateTime<Utc>,
}

impl Summary {
    /// Create a new summary
    pub fn new(text: String, model: impl Into<String>) -> Self {
        Self {
            text,
            model: model.into(),
            created_at: Utc::now(),
        }
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

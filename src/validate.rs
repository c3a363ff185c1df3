//! URL validation for user input.

use std::fmt;
use thiserror::Error;
use url::Url;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("no URL provided")]
    EmptyInput,
    #[error("malformed URL: {0}")]
    MalformedUrl(String),
}

/// A URL that passed validation: absolute, http(s), with a host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedUrl {
    raw: String,
    parsed: Url,
}

impl ValidatedUrl {
    /// The URL as the user typed it (minus surrounding whitespace)
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn parsed(&self) -> &Url {
        &self.parsed
    }

    pub fn host(&self) -> Option<&str> {
        self.parsed.host_str()
    }
}

impl fmt::Display for ValidatedUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Validate a raw user-supplied string
pub fn validate(raw: &str) -> Result<ValidatedUrl, ValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyInput);
    }

    let parsed =
        Url::parse(trimmed).map_err(|e| ValidationError::MalformedUrl(format!("{trimmed}: {e}")))?;

    match parsed.scheme() {
        "http" | "https" => {}
        other => {
            return Err(ValidationError::MalformedUrl(format!(
                "unsupported scheme '{other}'"
            )))
        }
    }

    if parsed.host_str().map_or(true, str::is_empty) {
        return Err(ValidationError::MalformedUrl(format!("{trimmed}: missing host")));
    }

    Ok(ValidatedUrl {
        raw: trimmed.to_string(),
        parsed,
    })
}

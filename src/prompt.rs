//! Prompt template used for every summarisation request.

use thiserror::Error;

/// Placeholder replaced by the document content
pub const PLACEHOLDER: &str = "{text}";

/// Default prompt: a 400-word summary of the whole document
pub const DEFAULT_TEMPLATE: &str = "
Provide a summary of the following content in 400 words

Content: {text}
";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TemplateError {
    #[error("prompt template must contain the {{text}} placeholder")]
    MissingPlaceholder,
    #[error("prompt template must contain the {{text}} placeholder exactly once, found {0}")]
    RepeatedPlaceholder(usize),
}

/// A template with a single `{text}` placeholder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    template: String,
}

impl PromptTemplate {
    pub fn new(template: impl Into<String>) -> Result<Self, TemplateError> {
        let template = template.into();
        match template.matches(PLACEHOLDER).count() {
            0 => Err(TemplateError::MissingPlaceholder),
            1 => Ok(Self { template }),
            n => Err(TemplateError::RepeatedPlaceholder(n)),
        }
    }

    /// Substitute the content into the placeholder.
    ///
    /// The content is inserted as-is, braces included.
    pub fn render(&self, text: &str) -> String {
        self.template.replacen(PLACEHOLDER, text, 1)
    }

    pub fn as_str(&self) -> &str {
        &self.template
    }
}

impl Default for PromptTemplate {
    fn default() -> Self {
        Self {
            template: DEFAULT_TEMPLATE.to_string(),
        }
    }
}

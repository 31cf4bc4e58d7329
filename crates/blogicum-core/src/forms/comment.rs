use serde::{Deserialize, Serialize};

use super::{FormErrors, required};
use crate::domain::Comment;

/// Raw comment form submission. Free text with no length limit.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CommentFormData {
    pub text: String,
}

impl CommentFormData {
    pub fn from_comment(comment: &Comment) -> Self {
        Self {
            text: comment.text.clone(),
        }
    }

    /// The cleaned comment text.
    pub fn validate(&self) -> Result<String, FormErrors> {
        let mut errors = FormErrors::new();
        let text = required(&mut errors, "text", &self.text).to_string();
        errors.finish(text)
    }
}

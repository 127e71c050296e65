//! The two-field post form and its field-level error messages.

use std::collections::BTreeMap;
use std::num::ParseIntError;

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError, ValidationErrors};

use super::Post;

pub const REQUIRED_MESSAGE: &str = "This field is required.";
pub const INVALID_CHOICE_MESSAGE: &str =
    "Select a valid choice. That choice is not one of the available choices.";

/// Submitted post fields. Anything besides `text` and `group` is dropped on deserialization.
///
/// `group` stays a raw string so that an unknown or malformed choice can be reported
/// against the field instead of failing the whole request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct PostForm {
    #[serde(default)]
    #[validate(custom(function = "not_blank"))]
    pub text: String,

    #[serde(default)]
    pub group: Option<String>,
}

impl PostForm {
    pub fn new(text: impl Into<String>, group: Option<i64>) -> Self {
        Self {
            text: text.into(),
            group: group.map(|id| id.to_string()),
        }
    }

    /// Pre-filled form for editing an existing post.
    pub fn from_post(post: &Post) -> Self {
        Self::new(post.text.clone(), post.group_id)
    }

    /// The selected group, `Ok(None)` when no group was chosen.
    pub fn group_choice(&self) -> Result<Option<i64>, ParseIntError> {
        match self.group.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(raw) => raw.parse().map(Some),
        }
    }
}

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("required").with_message(REQUIRED_MESSAGE.into()));
    }
    Ok(())
}

/// Field name to messages, in field order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_default().push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn into_map(self) -> BTreeMap<String, Vec<String>> {
        self.0
    }

    /// One line per field, for error responses that have no form to render.
    pub fn summary(&self) -> String {
        self.0
            .iter()
            .map(|(field, messages)| format!("{}: {}", field, messages.join(" ")))
            .collect::<Vec<_>>()
            .join("; ")
    }
}

impl From<ValidationErrors> for FieldErrors {
    fn from(errors: ValidationErrors) -> Self {
        let mut out = FieldErrors::new();
        for (field, field_errors) in errors.field_errors() {
            for error in field_errors {
                let message = error
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("Invalid value for {}", field));
                out.add(field.to_string(), message);
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_text_is_required() {
        let form = PostForm::new("   \n", None);
        let errors = FieldErrors::from(form.validate().unwrap_err());
        assert_eq!(errors.get("text"), Some(&[REQUIRED_MESSAGE.to_string()][..]));
    }

    #[test]
    fn test_group_choice_parsing() {
        assert_eq!(PostForm::new("a", None).group_choice(), Ok(None));
        assert_eq!(PostForm::new("a", Some(3)).group_choice(), Ok(Some(3)));

        let mut form = PostForm::new("a", None);
        form.group = Some(String::new());
        assert_eq!(form.group_choice(), Ok(None));
        form.group = Some("abc".into());
        assert!(form.group_choice().is_err());
    }
}

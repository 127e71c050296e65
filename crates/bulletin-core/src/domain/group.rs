use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

/// Group entity - a topical category posts may belong to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub description: String,
}

/// Data for creating a new group. The id is assigned by storage.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NewGroup {
    #[validate(length(min = 1, max = 200, message = "Title must be between 1 and 200 characters"))]
    pub title: String,

    #[validate(
        length(min = 1, max = 50, message = "Slug must be between 1 and 50 characters"),
        custom(function = "slug_chars")
    )]
    pub slug: String,

    #[validate(length(min = 1, message = "Description is required"))]
    pub description: String,
}

impl NewGroup {
    pub fn new(
        title: impl Into<String>,
        slug: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            slug: slug.into(),
            description: description.into(),
        }
    }
}

/// Slugs are lowercase ASCII letters, digits, hyphens and underscores.
fn slug_chars(value: &str) -> Result<(), ValidationError> {
    let valid = value
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_');
    if !valid {
        return Err(ValidationError::new("slug_chars").with_message(
            "Slug may contain only lowercase letters, digits, hyphens and underscores".into(),
        ));
    }
    Ok(())
}

//! Administrative group management.

use std::sync::Arc;

use validator::Validate;

use crate::domain::{FieldErrors, Group, NewGroup};
use crate::error::{DomainError, RepoError};
use crate::ports::GroupRepository;

#[derive(Clone)]
pub struct GroupAdminService {
    groups: Arc<dyn GroupRepository>,
}

impl GroupAdminService {
    pub fn new(groups: Arc<dyn GroupRepository>) -> Self {
        Self { groups }
    }

    pub async fn list(&self) -> Result<Vec<Group>, DomainError> {
        Ok(self.groups.list_all().await?)
    }

    pub async fn create(&self, group: NewGroup) -> Result<Group, DomainError> {
        if let Err(e) = group.validate() {
            return Err(DomainError::Validation(FieldErrors::from(e).summary()));
        }

        let slug = group.slug.clone();
        match self.groups.create(group).await {
            Ok(created) => {
                tracing::info!(group_id = created.id, slug = %created.slug, "Group created");
                Ok(created)
            }
            Err(RepoError::Constraint(_)) => Err(DomainError::Duplicate(format!(
                "group with slug '{}' already exists",
                slug
            ))),
            Err(e) => Err(e.into()),
        }
    }

    /// Delete a group by slug. Its posts stay, with their group cleared.
    pub async fn delete(&self, slug: &str) -> Result<(), DomainError> {
        let group = self
            .groups
            .find_by_slug(slug)
            .await?
            .ok_or_else(|| DomainError::not_found("group", slug))?;

        self.groups.delete(group.id).await?;
        tracing::info!(group_id = group.id, slug, "Group deleted");
        Ok(())
    }
}

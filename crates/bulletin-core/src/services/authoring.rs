//! Write side: the create/edit form flow.
//!
//! A form is either `Unsubmitted` (show it, empty or pre-filled) or `Submitted`. A submitted
//! form is validated; a valid one is applied and answered with a redirect, an invalid one is
//! rendered again with its messages and nothing is written.

use std::sync::Arc;

use validator::Validate;

use crate::domain::{
    Actor, FieldErrors, Group, INVALID_CHOICE_MESSAGE, NewPost, Post, PostForm,
};
use crate::error::{DomainError, RepoError};
use crate::ports::{GroupRepository, PostRepository};

/// What the client sent.
#[derive(Debug, Clone)]
pub enum Submission {
    Unsubmitted,
    Submitted(PostForm),
}

/// Where to send the client after an authoring request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Redirect {
    /// Anonymous actor; the caller appends the original target as `next`.
    Login,
    Profile { username: String },
    PostDetail { post_id: i64 },
}

/// Everything the presentation layer needs to draw the post form.
#[derive(Debug, Clone)]
pub struct FormView {
    pub form: PostForm,
    pub errors: FieldErrors,
    pub groups: Vec<Group>,
    pub is_edit: bool,
    pub post: Option<Post>,
}

#[derive(Debug, Clone)]
pub enum AuthoringOutcome {
    Render(FormView),
    Redirect(Redirect),
}

/// A form that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
struct CleanedPost {
    text: String,
    group_id: Option<i64>,
}

/// Creates and edits posts on behalf of an actor.
#[derive(Clone)]
pub struct AuthoringService {
    posts: Arc<dyn PostRepository>,
    groups: Arc<dyn GroupRepository>,
}

impl AuthoringService {
    pub fn new(posts: Arc<dyn PostRepository>, groups: Arc<dyn GroupRepository>) -> Self {
        Self { posts, groups }
    }

    pub async fn create(
        &self,
        actor: Option<&Actor>,
        submission: Submission,
    ) -> Result<AuthoringOutcome, DomainError> {
        let Some(actor) = actor else {
            tracing::debug!("Anonymous create attempt redirected to login");
            return Ok(AuthoringOutcome::Redirect(Redirect::Login));
        };

        let form = match submission {
            Submission::Unsubmitted => {
                return self.render(PostForm::default(), FieldErrors::new(), None).await;
            }
            Submission::Submitted(form) => form,
        };

        match self.clean(&form).await? {
            Ok(cleaned) => {
                let created = self
                    .posts
                    .create(NewPost::new(actor.user_id, cleaned.text, cleaned.group_id))
                    .await;
                let post = match created {
                    Ok(post) => post,
                    Err(RepoError::MissingReference(_)) => {
                        return self.render(form, group_vanished(), None).await;
                    }
                    Err(e) => return Err(e.into()),
                };
                tracing::info!(post_id = post.id, author = %actor.username, "Post created");

                Ok(AuthoringOutcome::Redirect(Redirect::Profile {
                    username: actor.username.clone(),
                }))
            }
            Err(errors) => self.render(form, errors, None).await,
        }
    }

    pub async fn edit(
        &self,
        actor: Option<&Actor>,
        post_id: i64,
        submission: Submission,
    ) -> Result<AuthoringOutcome, DomainError> {
        let Some(actor) = actor else {
            return Ok(AuthoringOutcome::Redirect(Redirect::Login));
        };

        let post = self
            .posts
            .find_by_id(post_id)
            .await?
            .ok_or_else(|| DomainError::not_found("post", post_id))?;

        if !post.is_authored_by(actor.user_id) {
            tracing::warn!(
                post_id,
                actor = %actor.username,
                "Edit attempt by non-author redirected to post"
            );
            return Ok(AuthoringOutcome::Redirect(Redirect::PostDetail { post_id }));
        }

        let form = match submission {
            Submission::Unsubmitted => {
                let form = PostForm::from_post(&post);
                return self.render(form, FieldErrors::new(), Some(post)).await;
            }
            Submission::Submitted(form) => form,
        };

        match self.clean(&form).await? {
            Ok(cleaned) => {
                let updated = self
                    .posts
                    .update_content(post.id, cleaned.text, cleaned.group_id)
                    .await;
                match updated {
                    Ok(_) => {}
                    Err(RepoError::MissingReference(_)) => {
                        return self.render(form, group_vanished(), Some(post)).await;
                    }
                    Err(e) => return Err(e.into()),
                }
                tracing::info!(post_id, "Post updated");

                Ok(AuthoringOutcome::Redirect(Redirect::PostDetail { post_id }))
            }
            Err(errors) => self.render(form, errors, Some(post)).await,
        }
    }

    /// Validate a submitted form. The outer error is a storage failure, the inner one a
    /// rejected form.
    async fn clean(
        &self,
        form: &PostForm,
    ) -> Result<Result<CleanedPost, FieldErrors>, DomainError> {
        let mut errors = match form.validate() {
            Ok(()) => FieldErrors::new(),
            Err(e) => FieldErrors::from(e),
        };

        let group_id = match form.group_choice() {
            Ok(None) => None,
            Ok(Some(id)) => {
                if self.groups.find_by_id(id).await?.is_none() {
                    errors.add("group", INVALID_CHOICE_MESSAGE);
                }
                Some(id)
            }
            Err(_) => {
                errors.add("group", INVALID_CHOICE_MESSAGE);
                None
            }
        };

        if !errors.is_empty() {
            tracing::debug!(fields = errors.len(), "Post form rejected");
            return Ok(Err(errors));
        }

        Ok(Ok(CleanedPost {
            text: form.text.trim().to_string(),
            group_id,
        }))
    }

    async fn render(
        &self,
        form: PostForm,
        errors: FieldErrors,
        post: Option<Post>,
    ) -> Result<AuthoringOutcome, DomainError> {
        let groups = self.groups.list_all().await?;
        Ok(AuthoringOutcome::Render(FormView {
            form,
            errors,
            groups,
            is_edit: post.is_some(),
            post,
        }))
    }
}

/// The chosen group was deleted between validation and the write.
fn group_vanished() -> FieldErrors {
    let mut errors = FieldErrors::new();
    errors.add("group", INVALID_CHOICE_MESSAGE);
    errors
}

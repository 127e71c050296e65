//! Group administration. Every route here needs a token with the `admin` role.

use actix_web::{HttpResponse, web};

use bulletin_core::domain::NewGroup;
use bulletin_shared::ApiResponse;
use bulletin_shared::dto::{CreateGroupRequest, GroupResponse};

use super::views;
use crate::middleware::auth::Identity;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

const ADMIN_ROLE: &str = "admin";

fn require_admin(identity: &Identity) -> AppResult<()> {
    if identity.has_role(ADMIN_ROLE) {
        Ok(())
    } else {
        tracing::warn!(user = %identity.username, "Admin route refused");
        Err(AppError::Forbidden)
    }
}

/// GET /admin/groups/
pub async fn list_groups(
    state: web::Data<AppState>,
    identity: Identity,
) -> AppResult<HttpResponse> {
    require_admin(&identity)?;

    let groups: Vec<GroupResponse> = state.groups.list().await?.iter().map(views::group).collect();
    Ok(HttpResponse::Ok().json(ApiResponse::ok(groups)))
}

/// POST /admin/groups/
pub async fn create_group(
    state: web::Data<AppState>,
    identity: Identity,
    body: web::Json<CreateGroupRequest>,
) -> AppResult<HttpResponse> {
    require_admin(&identity)?;

    let req = body.into_inner();
    let group = state
        .groups
        .create(NewGroup::new(req.title, req.slug, req.description))
        .await?;

    Ok(HttpResponse::Created().json(ApiResponse::ok(views::group(&group))))
}

/// DELETE /admin/groups/{slug}/
///
/// The group's posts are kept and lose their group.
pub async fn delete_group(
    state: web::Data<AppState>,
    identity: Identity,
    slug: web::Path<String>,
) -> AppResult<HttpResponse> {
    require_admin(&identity)?;

    state.groups.delete(&slug).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::message(format!("Group '{}' deleted", slug))))
}

//! Feed, detail and authoring pages.

use actix_web::{HttpRequest, HttpResponse, web};

use bulletin_core::PageRequest;
use bulletin_core::domain::{Actor, PostForm};
use bulletin_core::services::Submission;
use bulletin_shared::dto::{GroupListContext, IndexContext, PostDetailContext, ProfileContext};

use super::views;
use crate::middleware::auth::OptionalIdentity;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// Raw query pairs. `?page=` is read by hand so that garbage or repeated values fall back
/// to a page instead of a 400; the last `page` wins.
pub type PageQuery = web::Query<Vec<(String, String)>>;

fn page_request(query: &PageQuery) -> PageRequest {
    let raw = query
        .iter()
        .rev()
        .find(|(key, _)| key == "page")
        .map(|(_, value)| value.as_str());
    PageRequest::parse(raw)
}

/// A submitted body. An unreadable one is only an error for a caller who may write;
/// anonymous callers are sent to login whatever they posted.
fn submission(
    actor: Option<&Actor>,
    form: Result<web::Form<PostForm>, actix_web::Error>,
) -> AppResult<Submission> {
    match (form, actor) {
        (Ok(form), _) => Ok(Submission::Submitted(form.into_inner())),
        (Err(_), None) => Ok(Submission::Submitted(PostForm::default())),
        (Err(e), Some(actor)) => {
            tracing::debug!(actor = %actor.username, error = %e, "Unreadable post form");
            Err(AppError::BadRequest(e.to_string()))
        }
    }
}

/// GET /
pub async fn index(
    state: web::Data<AppState>,
    query: PageQuery,
) -> AppResult<HttpResponse> {
    let page = state.feed.index(page_request(&query)).await?;

    Ok(views::render(
        views::INDEX,
        IndexContext {
            page_obj: views::page(&page),
        },
    ))
}

/// GET /group/{slug}/
pub async fn group_list(
    state: web::Data<AppState>,
    slug: web::Path<String>,
    query: PageQuery,
) -> AppResult<HttpResponse> {
    let feed = state.feed.group_feed(&slug, page_request(&query)).await?;

    Ok(views::render(
        views::GROUP_LIST,
        GroupListContext {
            group: views::group(&feed.group),
            page_obj: views::page(&feed.page),
        },
    ))
}

/// GET /profile/{username}/
pub async fn profile(
    state: web::Data<AppState>,
    username: web::Path<String>,
    query: PageQuery,
) -> AppResult<HttpResponse> {
    let feed = state.feed.author_feed(&username, page_request(&query)).await?;

    Ok(views::render(
        views::PROFILE,
        ProfileContext {
            author: views::user(&feed.author),
            number_of_posts: feed.post_count,
            page_obj: views::page(&feed.page),
        },
    ))
}

/// GET /posts/{post_id}/
pub async fn post_detail(
    state: web::Data<AppState>,
    post_id: web::Path<i64>,
) -> AppResult<HttpResponse> {
    let detail = state.feed.post_detail(post_id.into_inner()).await?;

    Ok(views::render(
        views::POST_DETAIL,
        PostDetailContext {
            post: views::post(&detail.post),
            author: views::user(&detail.author),
            number_of_posts: detail.author_post_count,
        },
    ))
}

/// GET /create/
pub async fn create_form(
    req: HttpRequest,
    state: web::Data<AppState>,
    identity: OptionalIdentity,
) -> AppResult<HttpResponse> {
    let outcome = state
        .authoring
        .create(identity.actor().as_ref(), Submission::Unsubmitted)
        .await?;
    Ok(views::authoring(&req, &state.login_url, outcome))
}

/// POST /create/
///
/// Only `text` and `group` are read from the body; the author is always the caller.
pub async fn create_submit(
    req: HttpRequest,
    state: web::Data<AppState>,
    identity: OptionalIdentity,
    form: Result<web::Form<PostForm>, actix_web::Error>,
) -> AppResult<HttpResponse> {
    let actor = identity.actor();
    let outcome = state
        .authoring
        .create(actor.as_ref(), submission(actor.as_ref(), form)?)
        .await?;
    Ok(views::authoring(&req, &state.login_url, outcome))
}

/// GET /posts/{post_id}/edit/
pub async fn edit_form(
    req: HttpRequest,
    state: web::Data<AppState>,
    identity: OptionalIdentity,
    post_id: web::Path<i64>,
) -> AppResult<HttpResponse> {
    let outcome = state
        .authoring
        .edit(
            identity.actor().as_ref(),
            post_id.into_inner(),
            Submission::Unsubmitted,
        )
        .await?;
    Ok(views::authoring(&req, &state.login_url, outcome))
}

/// POST /posts/{post_id}/edit/
pub async fn edit_submit(
    req: HttpRequest,
    state: web::Data<AppState>,
    identity: OptionalIdentity,
    post_id: web::Path<i64>,
    form: Result<web::Form<PostForm>, actix_web::Error>,
) -> AppResult<HttpResponse> {
    let actor = identity.actor();
    let outcome = state
        .authoring
        .edit(
            actor.as_ref(),
            post_id.into_inner(),
            submission(actor.as_ref(), form)?,
        )
        .await?;
    Ok(views::authoring(&req, &state.login_url, outcome))
}

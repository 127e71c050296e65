//! Turning service results into HTTP responses: presentation documents and redirects.

use actix_web::{HttpRequest, HttpResponse, http::header};
use serde::Serialize;

use bulletin_core::Page;
use bulletin_core::domain::{Group, Post, User};
use bulletin_core::services::{AuthoringOutcome, FormView, Redirect};
use bulletin_shared::Rendered;
use bulletin_shared::dto::{
    GroupResponse, PageResponse, PostFormContext, PostFormResponse, PostResponse, UserResponse,
};

pub const INDEX: &str = "posts/index";
pub const GROUP_LIST: &str = "posts/group_list";
pub const PROFILE: &str = "posts/profile";
pub const POST_DETAIL: &str = "posts/post_detail";
pub const POST_FORM: &str = "posts/create_post";
pub const LOGIN: &str = "users/login";

/// 200 with a `{"view", "context"}` document.
pub fn render<C: Serialize>(view: &str, context: C) -> HttpResponse {
    HttpResponse::Ok().json(Rendered::new(view, context))
}

pub fn post(post: &Post) -> PostResponse {
    PostResponse {
        id: post.id,
        text: post.text.clone(),
        pub_date: post.pub_date.to_rfc3339(),
        author_id: post.author_id.to_string(),
        group_id: post.group_id,
    }
}

pub fn group(group: &Group) -> GroupResponse {
    GroupResponse {
        id: group.id,
        title: group.title.clone(),
        slug: group.slug.clone(),
        description: group.description.clone(),
    }
}

pub fn user(user: &User) -> UserResponse {
    UserResponse {
        id: user.id.to_string(),
        username: user.username.clone(),
        created_at: user.created_at.to_rfc3339(),
    }
}

pub fn page(page: &Page<Post>) -> PageResponse<PostResponse> {
    PageResponse {
        items: page.items.iter().map(post).collect(),
        number: page.number,
        num_pages: page.num_pages,
        total: page.total,
        has_next: page.has_next(),
        has_previous: page.has_previous(),
        next_page_number: page.next_page_number(),
        previous_page_number: page.previous_page_number(),
        start_index: page.start_index(),
        end_index: page.end_index(),
    }
}

pub fn post_form(view: FormView) -> PostFormContext {
    PostFormContext {
        form: PostFormResponse {
            text: view.form.text,
            group: view.form.group,
        },
        errors: view.errors.into_map(),
        groups: view.groups.iter().map(group).collect(),
        is_edit: view.is_edit,
        post: view.post.as_ref().map(post),
    }
}

/// Render the form or follow the redirect the authoring flow decided on.
pub fn authoring(req: &HttpRequest, login_url: &str, outcome: AuthoringOutcome) -> HttpResponse {
    match outcome {
        AuthoringOutcome::Render(view) => render(POST_FORM, post_form(view)),
        AuthoringOutcome::Redirect(target) => found(location(req, login_url, &target)),
    }
}

pub fn location(req: &HttpRequest, login_url: &str, target: &Redirect) -> String {
    match target {
        Redirect::Login => {
            let next = req
                .uri()
                .path_and_query()
                .map(|pq| pq.as_str())
                .unwrap_or_else(|| req.path());
            format!("{}?next={}", login_url, encode_next(next))
        }
        Redirect::Profile { username } => format!("/profile/{}/", urlencoding::encode(username)),
        Redirect::PostDetail { post_id } => format!("/posts/{}/", post_id),
    }
}

/// Percent-encode a return path, leaving `/` readable.
fn encode_next(path: &str) -> String {
    urlencoding::encode(path).replace("%2F", "/")
}

fn found(location: String) -> HttpResponse {
    HttpResponse::Found()
        .insert_header((header::LOCATION, location))
        .finish()
}

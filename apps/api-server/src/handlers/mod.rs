//! HTTP handlers and route configuration.

mod admin;
mod auth;
mod health;
mod posts;
mod views;

#[cfg(test)]
mod tests;

use actix_web::{HttpRequest, HttpResponse, web};

use bulletin_shared::ErrorResponse;

use crate::observability::RequestId;

/// Configure all application routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(posts::index))
        .route("/group/{slug}/", web::get().to(posts::group_list))
        .route("/profile/{username}/", web::get().to(posts::profile))
        .route("/posts/{post_id}/", web::get().to(posts::post_detail))
        .service(
            web::resource("/create/")
                .route(web::get().to(posts::create_form))
                .route(web::post().to(posts::create_submit)),
        )
        .service(
            web::resource("/posts/{post_id}/edit/")
                .route(web::get().to(posts::edit_form))
                .route(web::post().to(posts::edit_submit)),
        )
        .service(
            web::scope("/auth")
                .route("/signup/", web::post().to(auth::signup))
                .service(
                    web::resource("/login/")
                        .route(web::get().to(auth::login_page))
                        .route(web::post().to(auth::login)),
                ),
        )
        .service(
            web::scope("/admin")
                .service(
                    web::resource("/groups/")
                        .route(web::get().to(admin::list_groups))
                        .route(web::post().to(admin::create_group)),
                )
                .route("/groups/{slug}/", web::delete().to(admin::delete_group)),
        )
        .route("/api/health", web::get().to(health::health_check));
}

/// Fallback for unmatched paths.
pub async fn not_found(req: HttpRequest, request_id: RequestId) -> HttpResponse {
    HttpResponse::NotFound().json(
        ErrorResponse::not_found(format!("No page at {}", req.path()))
            .with_request_id(request_id.as_str()),
    )
}

//! HTTP handlers and route configuration.

mod auth;
mod comments;
mod health;
mod posts;
mod present;
mod profile;
pub mod urls;

#[cfg(test)]
mod tests;

use actix_web::{HttpResponse, http::header, web};
use chrono::Utc;
use serde::Deserialize;
use serde::de::DeserializeOwned;

use blogicum_core::domain::{Post, User};
use blogicum_core::pagination::Page;
use blogicum_core::visibility::{self, PostQuery, PostScope};
use blogicum_shared::dto::{PageResponse, PostResponse};

use crate::middleware::auth::Identity;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;
use present::Lookup;

/// Configure all application routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health::health_check))
        .route("/", web::get().to(posts::index))
        .service(
            web::resource("/posts/create/")
                .route(web::get().to(posts::create_post_form))
                .route(web::post().to(posts::create_post)),
        )
        .service(
            web::resource(r"/posts/{id:\d+}/")
                .route(web::get().to(posts::post_detail))
                .route(web::post().to(comments::add_comment)),
        )
        .service(
            web::resource(r"/posts/{id:\d+}/edit/")
                .route(web::get().to(posts::edit_post_form))
                .route(web::post().to(posts::edit_post)),
        )
        .service(
            web::resource(r"/posts/{id:\d+}/delete/")
                .route(web::get().to(posts::delete_post_confirm))
                .route(web::post().to(posts::delete_post)),
        )
        .service(
            web::resource(r"/posts/{id:\d+}/comment").route(web::post().to(comments::add_comment)),
        )
        .service(
            web::resource(r"/posts/{post_id:\d+}/edit_comment/{comment_id:\d+}/")
                .route(web::get().to(comments::edit_comment_form))
                .route(web::post().to(comments::edit_comment)),
        )
        .service(
            web::resource(r"/posts/{id:\d+}/delete_comment/{pk:\d+}/")
                .route(web::get().to(comments::delete_comment_confirm))
                .route(web::post().to(comments::delete_comment)),
        )
        .route("/category/{slug}/", web::get().to(posts::category_posts))
        .service(
            web::resource("/profile/edit_profile/")
                .route(web::get().to(profile::edit_profile_form))
                .route(web::post().to(profile::edit_profile)),
        )
        .route("/profile/{username}/", web::get().to(profile::profile))
        .service(
            web::scope("/auth")
                .service(
                    web::resource("/login/")
                        .route(web::get().to(auth::login_page))
                        .route(web::post().to(auth::login)),
                )
                .route("/registration/", web::post().to(auth::register)),
        );
}

/// `?page=` of paginated listings.
#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub page: Option<String>,
}

fn redirect(location: String) -> HttpResponse {
    HttpResponse::Found()
        .insert_header((header::LOCATION, location))
        .finish()
}

/// Decode an urlencoded form body read as raw bytes.
fn decode_form<T: DeserializeOwned>(body: &[u8]) -> AppResult<T> {
    serde_urlencoded::from_bytes(body).map_err(|e| AppError::BadRequest(e.to_string()))
}

/// One page of posts for a listing scope, evaluated now.
async fn post_page(
    state: &AppState,
    scope: PostScope,
    page: Option<&str>,
) -> AppResult<PageResponse<PostResponse>> {
    let query = PostQuery::new(scope, Utc::now());
    let total = state.posts.count(query).await?;
    let window = state.paginator.window(page, total);
    let cards = state.posts.list(query, window.offset, window.limit).await?;

    let lookup = Lookup::load(state, cards.iter().map(|card| card.post.author_id)).await?;

    Ok(present::page(Page::new(cards, window), |card| {
        lookup.post(&card.post, Some(card.comment_count))
    }))
}

async fn find_post(state: &AppState, id: i64) -> AppResult<Post> {
    state
        .posts
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Post {} not found", id)))
}

/// The post, if `viewer` may see it; otherwise not found.
async fn find_visible_post(state: &AppState, id: i64, viewer: Option<i64>) -> AppResult<Post> {
    let post = find_post(state, id).await?;
    let category = match post.category_id {
        Some(category_id) => state.categories.find_by_id(category_id).await?,
        None => None,
    };

    if !visibility::can_view(&post, category.as_ref(), viewer, Utc::now()) {
        tracing::debug!(post_id = id, ?viewer, "Post hidden from viewer");
        return Err(AppError::NotFound(format!("Post {} not found", id)));
    }

    Ok(post)
}

/// The stored record of the authenticated user.
async fn current_user(state: &AppState, identity: &Identity) -> AppResult<User> {
    state
        .users
        .find_by_id(identity.user_id)
        .await?
        .ok_or(AppError::Unauthorized)
}

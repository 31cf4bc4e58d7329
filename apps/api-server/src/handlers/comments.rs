//! Comment handlers.
//!
//! Comments are always addressed through their post. A comment that does not
//! belong to the post in the path is treated as missing.

use actix_web::{HttpResponse, web};

use blogicum_core::domain::{Comment, NewComment, Post};
use blogicum_core::forms::CommentFormData;
use blogicum_shared::dto::CommentPageResponse;

use super::present::Lookup;
use super::{decode_form, find_post, find_visible_post, redirect, urls};
use crate::middleware::auth::Identity;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

async fn find_comment(
    state: &AppState,
    post_id: i64,
    comment_id: i64,
) -> AppResult<(Post, Comment)> {
    let post = find_post(state, post_id).await?;
    let comment = state
        .comments
        .find_by_id(comment_id)
        .await?
        .filter(|c| c.post_id == post.id)
        .ok_or_else(|| AppError::NotFound(format!("Comment {} not found", comment_id)))?;

    Ok((post, comment))
}

async fn comment_page(
    state: &AppState,
    comment: &Comment,
    form: Option<CommentFormData>,
) -> AppResult<HttpResponse> {
    let lookup = Lookup::load(state, [comment.author_id]).await?;

    Ok(HttpResponse::Ok().json(CommentPageResponse {
        comment: lookup.comment(comment),
        form,
    }))
}

/// POST /posts/{id}/comment and POST /posts/{id}/
pub async fn add_comment(
    state: web::Data<AppState>,
    path: web::Path<i64>,
    identity: Identity,
    form: web::Form<CommentFormData>,
) -> AppResult<HttpResponse> {
    let post = find_visible_post(&state, path.into_inner(), Some(identity.user_id)).await?;

    let form = form.into_inner();
    let text = form
        .validate()
        .map_err(|errors| AppError::invalid_form(errors, &form))?;

    let comment = state
        .comments
        .create(NewComment {
            post_id: post.id,
            author_id: identity.user_id,
            text,
        })
        .await?;
    tracing::debug!(comment_id = comment.id, post_id = post.id, "Comment added");

    Ok(redirect(urls::post_detail(post.id)))
}

/// GET /posts/{post_id}/edit_comment/{comment_id}/
pub async fn edit_comment_form(
    state: web::Data<AppState>,
    path: web::Path<(i64, i64)>,
    identity: Identity,
) -> AppResult<HttpResponse> {
    let (post_id, comment_id) = path.into_inner();
    let (post, comment) = find_comment(&state, post_id, comment_id).await?;
    if !comment.is_authored_by(identity.user_id) {
        return Ok(redirect(urls::post_detail(post.id)));
    }

    let form = CommentFormData::from_comment(&comment);
    comment_page(&state, &comment, Some(form)).await
}

/// POST /posts/{post_id}/edit_comment/{comment_id}/
pub async fn edit_comment(
    state: web::Data<AppState>,
    path: web::Path<(i64, i64)>,
    identity: Identity,
    body: web::Bytes,
) -> AppResult<HttpResponse> {
    let (post_id, comment_id) = path.into_inner();
    let (post, comment) = find_comment(&state, post_id, comment_id).await?;
    if !comment.is_authored_by(identity.user_id) {
        tracing::debug!(comment_id, user = %identity.username, "Comment edit by non-author");
        return Ok(redirect(urls::post_detail(post.id)));
    }

    let form: CommentFormData = decode_form(&body)?;
    let text = form
        .validate()
        .map_err(|errors| AppError::invalid_form(errors, &form))?;

    state.comments.update_text(comment.id, text).await?;

    Ok(redirect(urls::post_detail(post.id)))
}

/// GET /posts/{id}/delete_comment/{pk}/
pub async fn delete_comment_confirm(
    state: web::Data<AppState>,
    path: web::Path<(i64, i64)>,
    identity: Identity,
) -> AppResult<HttpResponse> {
    let (post_id, comment_id) = path.into_inner();
    let (post, comment) = find_comment(&state, post_id, comment_id).await?;
    if !comment.is_authored_by(identity.user_id) {
        return Ok(redirect(urls::post_detail(post.id)));
    }

    comment_page(&state, &comment, None).await
}

/// POST /posts/{id}/delete_comment/{pk}/
pub async fn delete_comment(
    state: web::Data<AppState>,
    path: web::Path<(i64, i64)>,
    identity: Identity,
) -> AppResult<HttpResponse> {
    let (post_id, comment_id) = path.into_inner();
    let (post, comment) = find_comment(&state, post_id, comment_id).await?;
    if !comment.is_authored_by(identity.user_id) {
        tracing::debug!(comment_id, user = %identity.username, "Comment delete by non-author");
        return Ok(redirect(urls::post_detail(post.id)));
    }

    state.comments.delete(comment.id).await?;
    tracing::info!(comment_id, post_id, "Comment deleted");

    Ok(redirect(urls::post_detail(post.id)))
}

//! Post listing, detail and authoring handlers.

use actix_web::{HttpResponse, web};

use blogicum_core::forms::PostFormData;
use blogicum_core::visibility::PostScope;
use blogicum_shared::dto::{
    CategoryPageResponse, FormResponse, IndexResponse, PostDetailResponse, PostPageResponse,
};

use super::present::{self, Lookup};
use super::{
    PageQuery, current_user, decode_form, find_post, find_visible_post, post_page, redirect, urls,
};
use crate::middleware::auth::{Identity, OptionalIdentity};
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// GET /
pub async fn index(
    state: web::Data<AppState>,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    let page_obj = post_page(&state, PostScope::Public, query.page.as_deref()).await?;

    Ok(HttpResponse::Ok().json(IndexResponse { page_obj }))
}

/// GET /posts/{id}/
pub async fn post_detail(
    state: web::Data<AppState>,
    path: web::Path<i64>,
    viewer: OptionalIdentity,
) -> AppResult<HttpResponse> {
    let post = find_visible_post(&state, path.into_inner(), viewer.user_id()).await?;
    let comments = state.comments.find_by_post(post.id).await?;

    let authors = std::iter::once(post.author_id).chain(comments.iter().map(|c| c.author_id));
    let lookup = Lookup::load(&state, authors).await?;

    Ok(HttpResponse::Ok().json(PostDetailResponse {
        post: lookup.post(&post, Some(comments.len() as u64)),
        comments: comments.iter().map(|c| lookup.comment(c)).collect(),
    }))
}

/// GET /category/{slug}/
pub async fn category_posts(
    state: web::Data<AppState>,
    path: web::Path<String>,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    let slug = path.into_inner();
    let category = state
        .categories
        .find_by_slug(&slug)
        .await?
        .filter(|c| c.is_published)
        .ok_or_else(|| AppError::NotFound(format!("Category {} not found", slug)))?;

    let page_obj = post_page(
        &state,
        PostScope::Category(category.id),
        query.page.as_deref(),
    )
    .await?;

    Ok(HttpResponse::Ok().json(CategoryPageResponse {
        category: present::category(&category),
        page_obj,
    }))
}

/// GET /posts/create/
pub async fn create_post_form(
    state: web::Data<AppState>,
    _identity: Identity,
) -> AppResult<HttpResponse> {
    let (categories, locations) = present::post_choices(&state).await?;

    Ok(HttpResponse::Ok().json(FormResponse::with_choices(
        PostFormData::default(),
        present::choices(&categories, &locations),
    )))
}

/// POST /posts/create/
pub async fn create_post(
    state: web::Data<AppState>,
    identity: Identity,
    form: web::Form<PostFormData>,
) -> AppResult<HttpResponse> {
    let form = form.into_inner();
    let author = current_user(&state, &identity).await?;

    let (categories, locations) = present::post_choices(&state).await?;
    let draft = form
        .validate(&categories, &locations)
        .map_err(|errors| AppError::invalid_form(errors, &form))?;

    let post = state.posts.create(author.id, draft).await?;
    tracing::info!(post_id = post.id, author = %author.username, "Post published");

    Ok(redirect(urls::profile(&author.username)))
}

/// GET /posts/{id}/edit/
pub async fn edit_post_form(
    state: web::Data<AppState>,
    path: web::Path<i64>,
    identity: Identity,
) -> AppResult<HttpResponse> {
    let post = find_post(&state, path.into_inner()).await?;
    if !post.is_authored_by(identity.user_id) {
        return Ok(redirect(urls::post_detail(post.id)));
    }

    let (categories, locations) = present::post_choices(&state).await?;

    Ok(HttpResponse::Ok().json(FormResponse::with_choices(
        PostFormData::from_post(&post),
        present::choices(&categories, &locations),
    )))
}

/// POST /posts/{id}/edit/
pub async fn edit_post(
    state: web::Data<AppState>,
    path: web::Path<i64>,
    identity: Identity,
    body: web::Bytes,
) -> AppResult<HttpResponse> {
    let post = find_post(&state, path.into_inner()).await?;
    if !post.is_authored_by(identity.user_id) {
        tracing::debug!(post_id = post.id, user = %identity.username, "Edit by non-author");
        return Ok(redirect(urls::post_detail(post.id)));
    }

    let form: PostFormData = decode_form(&body)?;
    let (categories, locations) = present::post_choices(&state).await?;
    let draft = form
        .validate(&categories, &locations)
        .map_err(|errors| AppError::invalid_form(errors, &form))?;

    state.posts.update(post.id, draft).await?;

    Ok(redirect(urls::post_detail(post.id)))
}

/// GET /posts/{id}/delete/
pub async fn delete_post_confirm(
    state: web::Data<AppState>,
    path: web::Path<i64>,
    identity: Identity,
) -> AppResult<HttpResponse> {
    let post = find_post(&state, path.into_inner()).await?;
    if !post.is_authored_by(identity.user_id) {
        return Ok(redirect(urls::post_detail(post.id)));
    }

    let lookup = Lookup::load(&state, [post.author_id]).await?;

    Ok(HttpResponse::Ok().json(PostPageResponse {
        post: lookup.post(&post, None),
    }))
}

/// POST /posts/{id}/delete/
pub async fn delete_post(
    state: web::Data<AppState>,
    path: web::Path<i64>,
    identity: Identity,
) -> AppResult<HttpResponse> {
    let post = find_post(&state, path.into_inner()).await?;
    if !post.is_authored_by(identity.user_id) {
        tracing::debug!(post_id = post.id, user = %identity.username, "Delete by non-author");
        return Ok(redirect(urls::post_detail(post.id)));
    }

    state.posts.delete(post.id).await?;
    tracing::info!(post_id = post.id, "Post deleted");

    let author = current_user(&state, &identity).await?;
    Ok(redirect(urls::profile(&author.username)))
}

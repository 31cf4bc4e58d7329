//! User profile handlers.

use actix_web::{HttpResponse, web};

use blogicum_core::error::RepoError;
use blogicum_core::forms::{FormErrors, ProfileFormData, USERNAME_TAKEN_MESSAGE};
use blogicum_core::visibility::PostScope;
use blogicum_shared::dto::{FormResponse, ProfileResponse};

use super::present;
use super::{PageQuery, current_user, post_page, redirect, urls};
use crate::middleware::auth::{Identity, OptionalIdentity};
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// GET /profile/{username}/
///
/// The owner sees all of their posts; everybody else only the public ones.
pub async fn profile(
    state: web::Data<AppState>,
    path: web::Path<String>,
    query: web::Query<PageQuery>,
    viewer: OptionalIdentity,
) -> AppResult<HttpResponse> {
    let username = path.into_inner();
    let user = state
        .users
        .find_by_username(&username)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {} not found", username)))?;

    let scope = PostScope::profile(user.id, viewer.user_id());
    let page_obj = post_page(&state, scope, query.page.as_deref()).await?;

    Ok(HttpResponse::Ok().json(ProfileResponse {
        profile: present::user(&user),
        page_obj,
    }))
}

/// GET /profile/edit_profile/
pub async fn edit_profile_form(
    state: web::Data<AppState>,
    identity: Identity,
) -> AppResult<HttpResponse> {
    let user = current_user(&state, &identity).await?;

    Ok(HttpResponse::Ok().json(FormResponse::new(ProfileFormData::from_user(&user))))
}

/// POST /profile/edit_profile/
pub async fn edit_profile(
    state: web::Data<AppState>,
    identity: Identity,
    form: web::Form<ProfileFormData>,
) -> AppResult<HttpResponse> {
    let form = form.into_inner();
    let user = current_user(&state, &identity).await?;

    let update = form
        .validate()
        .map_err(|errors| AppError::invalid_form(errors, &form))?;

    if let Some(other) = state.users.find_by_username(&update.username).await? {
        if other.id != user.id {
            return Err(username_taken(&form));
        }
    }

    let updated = match state.users.update_profile(user.id, update).await {
        Ok(updated) => updated,
        Err(RepoError::Constraint(_)) => return Err(username_taken(&form)),
        Err(e) => return Err(e.into()),
    };
    tracing::info!(user_id = updated.id, username = %updated.username, "Profile updated");

    Ok(redirect(urls::profile(&updated.username)))
}

fn username_taken(form: &ProfileFormData) -> AppError {
    let mut errors = FormErrors::new();
    errors.add("username", USERNAME_TAKEN_MESSAGE);
    AppError::invalid_form(errors, form)
}

//! Authentication handlers.

use actix_web::{HttpResponse, web};
use serde::Deserialize;

use blogicum_core::domain::{NewUser, User};
use blogicum_core::error::RepoError;
use blogicum_core::forms::{FormErrors, RegistrationFormData, USERNAME_TAKEN_MESSAGE};
use blogicum_core::ports::AuthError;
use blogicum_shared::dto::{AuthResponse, LoginPageResponse, LoginRequest};

use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// `?next=` carried over from a login redirect.
#[derive(Debug, Deserialize)]
pub struct NextQuery {
    pub next: Option<String>,
}

fn issue_token(state: &AppState, user: &User, next: Option<String>) -> AppResult<AuthResponse> {
    let token = state
        .tokens
        .generate_token(user.id, &user.username)
        .map_err(|e| AppError::Internal(e.to_string()))?;

    Ok(AuthResponse {
        access_token: token,
        token_type: "Bearer".to_string(),
        expires_in: state.tokens.expiration_seconds().max(0) as u64,
        next,
    })
}

/// GET /auth/login/
pub async fn login_page(query: web::Query<NextQuery>) -> HttpResponse {
    HttpResponse::Ok().json(LoginPageResponse {
        next: query.into_inner().next,
    })
}

/// POST /auth/login/
pub async fn login(
    state: web::Data<AppState>,
    query: web::Query<NextQuery>,
    form: web::Form<LoginRequest>,
) -> AppResult<HttpResponse> {
    let req = form.into_inner();

    let user = state
        .users
        .find_by_username(&req.username)
        .await?
        .ok_or(AuthError::InvalidCredentials)?;

    if !state.passwords.verify(&req.password, &user.password_hash)? {
        tracing::debug!(username = %req.username, "Rejected login");
        return Err(AuthError::InvalidCredentials.into());
    }

    let response = issue_token(&state, &user, query.into_inner().next)?;
    tracing::info!(user_id = user.id, "User logged in");

    Ok(HttpResponse::Ok().json(response))
}

/// POST /auth/registration/
pub async fn register(
    state: web::Data<AppState>,
    form: web::Form<RegistrationFormData>,
) -> AppResult<HttpResponse> {
    let form = form.into_inner();
    let registration = form
        .validate()
        .map_err(|errors| AppError::invalid_form(errors, &form))?;

    if state
        .users
        .find_by_username(&registration.username)
        .await?
        .is_some()
    {
        return Err(username_taken(&form));
    }

    let password_hash = state.passwords.hash(&registration.password)?;

    let user = match state
        .users
        .create(NewUser {
            username: registration.username,
            email: registration.email,
            password_hash,
        })
        .await
    {
        Ok(user) => user,
        Err(RepoError::Constraint(_)) => return Err(username_taken(&form)),
        Err(e) => return Err(e.into()),
    };
    tracing::info!(user_id = user.id, username = %user.username, "User registered");

    Ok(HttpResponse::Created().json(issue_token(&state, &user, None)?))
}

fn username_taken(form: &RegistrationFormData) -> AppError {
    let mut errors = FormErrors::new();
    errors.add("username", USERNAME_TAKEN_MESSAGE);
    AppError::invalid_form(errors, form)
}

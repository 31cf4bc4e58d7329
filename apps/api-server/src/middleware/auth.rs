//! Authentication extractors.
//!
//! Protected handlers take an [`Identity`]. A request without a valid bearer
//! token is redirected to the login page, carrying the requested path in
//! `next`.

use actix_web::{FromRequest, HttpRequest, HttpResponse, dev::Payload, http::header, web};
use std::future::{Ready, ready};

use blogicum_core::ports::{AuthError, TokenClaims};

use crate::handlers::urls;
use crate::state::AppState;

/// Authenticated user identity extractor.
#[derive(Debug, Clone)]
pub struct Identity {
    pub user_id: i64,
    pub username: String,
}

impl From<TokenClaims> for Identity {
    fn from(claims: TokenClaims) -> Self {
        Self {
            user_id: claims.user_id,
            username: claims.username,
        }
    }
}

/// Rejection of an unauthenticated request.
#[derive(Debug)]
pub struct AuthenticationError {
    pub reason: AuthError,
    /// Login page URL including the `next` parameter.
    pub login_redirect: String,
}

impl std::fmt::Display for AuthenticationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.reason)
    }
}

impl actix_web::ResponseError for AuthenticationError {
    fn status_code(&self) -> actix_web::http::StatusCode {
        actix_web::http::StatusCode::FOUND
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::Found()
            .insert_header((header::LOCATION, self.login_redirect.as_str()))
            .finish()
    }
}

fn authenticate(req: &HttpRequest, state: &AppState) -> Result<Identity, AuthError> {
    let auth_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .ok_or(AuthError::MissingAuth)?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| AuthError::InvalidToken("Invalid authorization header".to_string()))?;

    let token = auth_str
        .strip_prefix("Bearer ")
        .ok_or_else(|| AuthError::InvalidToken("Expected Bearer token".to_string()))?;

    state.tokens.validate_token(token).map(Identity::from)
}

impl FromRequest for Identity {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let Some(state) = req.app_data::<web::Data<AppState>>() else {
            tracing::error!("AppState not found in app data");
            return ready(Err(actix_web::error::ErrorInternalServerError(
                "Server configuration error",
            )));
        };

        match authenticate(req, state) {
            Ok(identity) => ready(Ok(identity)),
            Err(reason) => {
                let next = match req.uri().path_and_query() {
                    Some(pq) => pq.as_str().to_string(),
                    None => req.path().to_string(),
                };
                tracing::debug!(%reason, %next, "Redirecting unauthenticated request to login");
                ready(Err(AuthenticationError {
                    reason,
                    login_redirect: urls::login(&state.login_url, &next),
                }
                .into()))
            }
        }
    }
}

/// Optional identity extractor - doesn't fail if not authenticated.
pub struct OptionalIdentity(pub Option<Identity>);

impl OptionalIdentity {
    pub fn user_id(&self) -> Option<i64> {
        self.0.as_ref().map(|identity| identity.user_id)
    }
}

impl FromRequest for OptionalIdentity {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let identity = req
            .app_data::<web::Data<AppState>>()
            .and_then(|state| authenticate(req, state).ok());

        ready(Ok(OptionalIdentity(identity)))
    }
}

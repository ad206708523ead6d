use async_trait::async_trait;
use axum::extract::{FromRequestParts, State};
use axum::http::{header, request::Parts};
use axum::response::{IntoResponse, Redirect, Response};

use crate::api::errors::ApiError;
use crate::core::{security, state::AppState};
use crate::db::models::Profile;
use crate::db::types::UserRole;
use crate::repositories;

pub(crate) const ACCESS_TOKEN_COOKIE: &str = "access_token";

pub(crate) struct CurrentUser(pub(crate) Profile);

/// Gate for the back-office: the browser-facing surface redirects instead of
/// answering 401/403 — to `/login` when unauthenticated, to `/` when the
/// profile is not an admin.
pub(crate) struct AdminUser(pub(crate) Profile);

#[derive(Debug)]
pub(crate) enum AdminRejection {
    ToLogin,
    ToHome,
    Internal(ApiError),
}

impl IntoResponse for AdminRejection {
    fn into_response(self) -> Response {
        match self {
            AdminRejection::ToLogin => Redirect::to("/login").into_response(),
            AdminRejection::ToHome => Redirect::to("/").into_response(),
            AdminRejection::Internal(err) => err.into_response(),
        }
    }
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let State(app_state) = State::<AppState>::from_request_parts(parts, state)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to access application state"))?;

        let token = extract_token(parts)
            .ok_or(ApiError::Unauthorized("Invalid authentication credentials"))?;

        let claims = security::verify_token(&token, app_state.settings())
            .map_err(|_| ApiError::Unauthorized("Invalid authentication credentials"))?;

        let profile = repositories::profiles::find_by_id(app_state.db(), &claims.sub)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to load profile"))?;

        let Some(profile) = profile else {
            return Err(ApiError::Unauthorized("Profile not found"));
        };

        Ok(CurrentUser(profile))
    }
}

#[async_trait]
impl FromRequestParts<AppState> for AdminUser {
    type Rejection = AdminRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        match CurrentUser::from_request_parts(parts, state).await {
            Ok(CurrentUser(profile)) => {
                if profile.role == UserRole::Admin {
                    Ok(AdminUser(profile))
                } else {
                    Err(AdminRejection::ToHome)
                }
            }
            Err(ApiError::Unauthorized(_)) => Err(AdminRejection::ToLogin),
            Err(other) => Err(AdminRejection::Internal(other)),
        }
    }
}

/// Bearer header first (API clients), `access_token` cookie second (the
/// form-driven admin pages).
fn extract_token(parts: &Parts) -> Option<String> {
    if let Some(value) = parts.headers.get(header::AUTHORIZATION) {
        if let Some(token) = value.to_str().ok().and_then(|raw| raw.strip_prefix("Bearer ")) {
            return Some(token.to_string());
        }
    }

    let cookies = parts.headers.get(header::COOKIE)?.to_str().ok()?;
    cookies.split(';').find_map(|pair| {
        let (name, value) = pair.trim().split_once('=')?;
        if name == ACCESS_TOKEN_COOKIE && !value.is_empty() {
            Some(value.to_string())
        } else {
            None
        }
    })
}

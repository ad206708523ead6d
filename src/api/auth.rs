use axum::{
    extract::State,
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use uuid::Uuid;
use validator::Validate;

use crate::api::errors::ApiError;
use crate::api::guards::{CurrentUser, ACCESS_TOKEN_COOKIE};
use crate::core::state::AppState;
use crate::core::{security, time};
use crate::db::models::Profile;
use crate::db::types::UserRole;
use crate::repositories;
use crate::schemas::auth::TokenResponse;
use crate::schemas::user::{LoginRequest, ProfileResponse, SignupRequest};

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/signup", post(signup))
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/me", get(me))
}

async fn signup(
    State(state): State<AppState>,
    Json(payload): Json<SignupRequest>,
) -> Result<(StatusCode, Response), ApiError> {
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let email = payload.email.trim().to_lowercase();

    let existing = repositories::profiles::find_by_email(state.db(), &email)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to check existing profile"))?;
    if existing.is_some() {
        return Err(ApiError::Conflict("Profile with this email already exists".to_string()));
    }

    let hashed_password = security::hash_password(&payload.password)
        .map_err(|e| ApiError::internal(e, "Failed to hash password"))?;

    let now = time::primitive_now_utc();
    let profile = repositories::profiles::create(
        state.db(),
        repositories::profiles::CreateProfile {
            id: &Uuid::new_v4().to_string(),
            email: &email,
            hashed_password: &hashed_password,
            display_name: payload.display_name.trim(),
            role: UserRole::User,
            created_at: now,
            updated_at: now,
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to create profile"))?;

    Ok((StatusCode::CREATED, token_response(&state, profile)?))
}

async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Response, ApiError> {
    let email = payload.email.trim().to_lowercase();

    let profile = repositories::profiles::find_by_email(state.db(), &email)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load profile"))?
        .ok_or(ApiError::Unauthorized("Incorrect email or password"))?;

    let verified = security::verify_password(&payload.password, &profile.hashed_password)
        .map_err(|_| ApiError::Unauthorized("Incorrect email or password"))?;
    if !verified {
        return Err(ApiError::Unauthorized("Incorrect email or password"));
    }

    token_response(&state, profile)
}

/// The cookie carries the same JWT the JSON body does; clearing it is all a
/// logout needs since the token itself stays valid until expiry.
async fn logout() -> Response {
    let mut response = StatusCode::NO_CONTENT.into_response();
    if let Ok(value) =
        HeaderValue::from_str(&format!("{ACCESS_TOKEN_COOKIE}=; Path=/; HttpOnly; Max-Age=0"))
    {
        response.headers_mut().insert(header::SET_COOKIE, value);
    }
    response
}

async fn me(CurrentUser(profile): CurrentUser) -> Json<ProfileResponse> {
    Json(ProfileResponse::from_db(profile))
}

fn token_response(state: &AppState, profile: Profile) -> Result<Response, ApiError> {
    let token = security::create_access_token(&profile.id, state.settings(), None)
        .map_err(|e| ApiError::internal(e, "Failed to create access token"))?;

    let max_age = state.settings().security().access_token_expire_minutes * 60;
    let cookie = format!(
        "{ACCESS_TOKEN_COOKIE}={token}; Path=/; HttpOnly; SameSite=Lax; Max-Age={max_age}"
    );

    let mut response = Json(TokenResponse {
        access_token: token,
        token_type: "bearer".to_string(),
        user: ProfileResponse::from_db(profile),
    })
    .into_response();

    let value = HeaderValue::from_str(&cookie)
        .map_err(|e| ApiError::internal(e, "Failed to build session cookie"))?;
    response.headers_mut().insert(header::SET_COOKIE, value);

    Ok(response)
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{header, Method, Request, StatusCode};
    use serde_json::json;
    use tower::ServiceExt;

    use crate::test_support;

    #[tokio::test]
    async fn signup_then_login_and_me() {
        let ctx = test_support::setup_test_context().await;

        let response = ctx
            .app
            .clone()
            .oneshot(test_support::json_request(
                Method::POST,
                "/api/v1/auth/signup",
                None,
                Some(json!({
                    "email": "Learner@Example.com",
                    "password": "learner-pass",
                    "display_name": "Learner"
                })),
            ))
            .await
            .expect("signup");
        let status = response.status();
        let cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string)
            .expect("set-cookie");
        let created = test_support::read_json(response).await;
        assert_eq!(status, StatusCode::CREATED, "response: {created}");
        assert!(cookie.starts_with("access_token="));
        assert_eq!(created["token_type"], "bearer");
        assert_eq!(created["user"]["email"], "learner@example.com");
        assert_eq!(created["user"]["role"], "user");

        let response = ctx
            .app
            .clone()
            .oneshot(test_support::json_request(
                Method::POST,
                "/api/v1/auth/login",
                None,
                Some(json!({"email": "learner@example.com", "password": "learner-pass"})),
            ))
            .await
            .expect("login");
        let status = response.status();
        let logged_in = test_support::read_json(response).await;
        assert_eq!(status, StatusCode::OK, "response: {logged_in}");
        let token = logged_in["access_token"].as_str().expect("token").to_string();

        let response = ctx
            .app
            .clone()
            .oneshot(test_support::json_request(
                Method::GET,
                "/api/v1/auth/me",
                Some(&token),
                None,
            ))
            .await
            .expect("me");
        let status = response.status();
        let me = test_support::read_json(response).await;
        assert_eq!(status, StatusCode::OK, "response: {me}");
        assert_eq!(me["display_name"], "Learner");
    }

    #[tokio::test]
    async fn login_with_wrong_password_is_401() {
        let ctx = test_support::setup_test_context().await;
        test_support::insert_profile(
            ctx.state.db(),
            "learner@example.com",
            "Learner",
            crate::db::types::UserRole::User,
            "learner-pass",
        )
        .await;

        let response = ctx
            .app
            .clone()
            .oneshot(test_support::json_request(
                Method::POST,
                "/api/v1/auth/login",
                None,
                Some(json!({"email": "learner@example.com", "password": "wrong"})),
            ))
            .await
            .expect("login");
        let status = response.status();
        let body = test_support::read_json(response).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["detail"], "Incorrect email or password");
    }

    #[tokio::test]
    async fn cookie_token_opens_the_admin_surface() {
        let ctx = test_support::setup_test_context().await;
        let admin = test_support::insert_admin(ctx.state.db()).await;
        let token = test_support::bearer_token(&admin.id, ctx.state.settings());

        let request = Request::builder()
            .method(Method::GET)
            .uri("/admin/courses")
            .header(header::COOKIE, format!("access_token={token}"))
            .body(Body::empty())
            .expect("request");

        let response = ctx.app.clone().oneshot(request).await.expect("admin list");
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn non_admin_is_sent_home() {
        let ctx = test_support::setup_test_context().await;
        let learner = test_support::insert_profile(
            ctx.state.db(),
            "learner@example.com",
            "Learner",
            crate::db::types::UserRole::User,
            "learner-pass",
        )
        .await;
        let token = test_support::bearer_token(&learner.id, ctx.state.settings());

        let response = ctx
            .app
            .clone()
            .oneshot(test_support::json_request(
                Method::GET,
                "/admin/courses",
                Some(&token),
                None,
            ))
            .await
            .expect("admin list");

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers().get(header::LOCATION).unwrap(), "/");
    }
}

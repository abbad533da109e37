use axum::extract::State;
use axum::Json;
use axum_extra::extract::cookie::{Cookie, SameSite};
use axum_extra::extract::CookieJar;
use serde::{Deserialize, Serialize};

use crate::auth::flow::{ForgotInput, LoginInput, ResetInput, SignupInput};
use crate::auth::jwt::{encode_token, Claims};
use crate::auth::AuthError;
use crate::error::AppError;
use crate::models::User;
use crate::state::SharedState;

#[derive(Deserialize)]
pub struct SignupRequest {
    pub identifier: String,
    pub password: String,
    pub confirm: String,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub identifier: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct ForgotPasswordRequest {
    pub identifier: String,
}

#[derive(Deserialize)]
pub struct ResetPasswordRequest {
    pub token: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub user: UserInfo,
}

#[derive(Serialize)]
pub struct UserInfo {
    pub id: i64,
    pub identifier: String,
}

#[derive(Serialize)]
pub struct MessageResponse {
    pub message: String,
}

const FORGOT_ACK: &str =
    "If an account exists with this identifier, you will receive password reset instructions.";

fn session_cookie(access_token: &str) -> CookieJar {
    let cookie = Cookie::build(("access_token", access_token.to_string()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build();

    CookieJar::new().add(cookie)
}

fn clear_session_cookie() -> CookieJar {
    let cookie = Cookie::build(("access_token", "")).path("/").build();
    CookieJar::new().remove(cookie)
}

fn auth_response(state: &SharedState, user: User) -> Result<(CookieJar, Json<AuthResponse>), AppError> {
    let claims = Claims::new(user.id, user.identifier.clone());
    let access_token =
        encode_token(&claims, &state.config.secret).map_err(AppError::Internal)?;

    let jar = session_cookie(&access_token);
    Ok((
        jar,
        Json(AuthResponse {
            access_token,
            user: UserInfo {
                id: user.id,
                identifier: user.identifier,
            },
        }),
    ))
}

pub async fn signup(
    State(state): State<SharedState>,
    Json(req): Json<SignupRequest>,
) -> Result<(CookieJar, Json<AuthResponse>), AppError> {
    let user = state
        .flow
        .signup(SignupInput {
            identifier: req.identifier,
            password: req.password,
            confirm: req.confirm,
        })
        .await?;

    tracing::info!(user_id = user.id, "New local account created");
    auth_response(&state, user)
}

pub async fn login(
    State(state): State<SharedState>,
    Json(req): Json<LoginRequest>,
) -> Result<(CookieJar, Json<AuthResponse>), AppError> {
    if state.login_limiter.check(&req.identifier).is_err() {
        return Err(AppError::RateLimited(
            "Too many login attempts. Please try again later.".to_string(),
        ));
    }

    let result = state
        .flow
        .login(LoginInput {
            identifier: req.identifier.clone(),
            password: req.password,
        })
        .await;

    match result {
        Ok(user) => auth_response(&state, user),
        Err(err) => {
            if matches!(err, AuthError::InvalidCredentials) {
                state.login_limiter.record_failure(&req.identifier);
            }
            Err(err.into())
        }
    }
}

pub async fn logout() -> (CookieJar, Json<MessageResponse>) {
    (
        clear_session_cookie(),
        Json(MessageResponse {
            message: "Logged out successfully".to_string(),
        }),
    )
}

/// The response body is byte-identical whether or not the identifier maps to
/// a user; the reset link only ever leaves via email or the server log.
pub async fn forgot_password(
    State(state): State<SharedState>,
    Json(req): Json<ForgotPasswordRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    let issued = state
        .flow
        .forgot_password(ForgotInput {
            identifier: req.identifier,
        })
        .await?;

    if let Some(issued) = issued {
        let reset_url = format!(
            "{}/reset-password?token={}",
            state.config.base_url, issued.token
        );

        match (&state.mailer, issued.identifier.contains('@')) {
            (Some(mailer), true) => {
                if let Err(e) = mailer.send_password_reset(&issued.identifier, &reset_url).await {
                    tracing::error!("Failed to send password reset email: {e}");
                }
            }
            _ => {
                tracing::info!(
                    identifier = %issued.identifier,
                    "SMTP not configured. Password reset link: {reset_url}"
                );
            }
        }
    }

    Ok(Json(MessageResponse {
        message: FORGOT_ACK.to_string(),
    }))
}

pub async fn reset_password(
    State(state): State<SharedState>,
    Json(req): Json<ResetPasswordRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    state
        .flow
        .reset_password(ResetInput {
            token: req.token,
            new_password: req.password,
        })
        .await?;

    Ok(Json(MessageResponse {
        message: "Password reset successfully".to_string(),
    }))
}

/// Session Routes
///
/// Register, login, logout, token refresh and the current-user lookup.
/// Tokens travel only in cookies; response bodies never contain them.

use actix_web::{web, HttpRequest, HttpResponse};
use serde::{Deserialize, Serialize};

use crate::auth::{
    clear_auth_cookies, hash_password, issue_tokens, set_auth_cookies, validate_refresh_token,
    verify_password, AuthenticatedUser, REFRESH_COOKIE,
};
use crate::configuration::JwtSettings;
use crate::domain::{NewUser, UserSummary};
use crate::error::{AppError, AuthError, ConflictError, ErrorContext};
use crate::logger::RequestId;
use crate::store::UserStore;
use crate::validators::{validate_credentials, validate_registration};

/// User registration request
#[derive(Deserialize)]
pub struct RegisterRequest {
    pub username: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

/// User login request; `username` also accepts an email address
#[derive(Deserialize)]
pub struct LoginRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

#[derive(Serialize)]
pub struct SessionResponse {
    pub message: &'static str,
    pub user: UserSummary,
}

/// POST /auth/register
///
/// # Errors
/// - 400: Missing fields, malformed email, short password, or the
///   username/email is already taken
/// - 500: Storage or hashing failure
pub async fn register(
    form: web::Json<RegisterRequest>,
    users: web::Data<dyn UserStore>,
    jwt_config: web::Data<JwtSettings>,
    request_id: RequestId,
) -> Result<HttpResponse, AppError> {
    let context = ErrorContext::new("user_registration").with_request_id(request_id);

    register_user(form.into_inner(), users.get_ref(), jwt_config.get_ref(), &context)
        .await
        .map_err(|e| context.summarize(e, "Error registering user"))
}

async fn register_user(
    form: RegisterRequest,
    users: &dyn UserStore,
    jwt_config: &JwtSettings,
    context: &ErrorContext,
) -> Result<HttpResponse, AppError> {
    let registration = validate_registration(
        form.username.as_deref(),
        form.name.as_deref(),
        form.email.as_deref(),
        form.password.as_deref(),
    )?;

    if let Some(existing) = users
        .find_by_username_or_email(&registration.username, &registration.email)
        .await?
    {
        let conflict = if existing.username == registration.username {
            ConflictError::UsernameTaken
        } else {
            ConflictError::EmailTaken
        };
        return Err(conflict.into());
    }

    let password_hash = hash_password(registration.password).await?;

    // A concurrent registration can still win the race; the store's
    // unique constraint turns that into the same conflict error.
    let user = users
        .insert(NewUser {
            username: registration.username,
            name: registration.name,
            email: Some(registration.email),
            password_hash: Some(password_hash),
        })
        .await?;

    let tokens = issue_tokens(&user, jwt_config)?;

    tracing::info!(
        request_id = %context.request_id,
        user_id = %user.id,
        "User registered successfully"
    );

    let mut response = HttpResponse::Created();
    set_auth_cookies(&mut response, &tokens, jwt_config);
    Ok(response.json(SessionResponse {
        message: "User registered successfully",
        user: user.summary(),
    }))
}

/// POST /auth/login
///
/// # Errors
/// - 400: Missing username or password
/// - 401: Unknown user, wrong password, or an account without a password
/// - 500: Storage failure
///
/// # Security Notes
/// Every credential failure gets the same message, including accounts that
/// only sign in through a social provider.
pub async fn login(
    form: web::Json<LoginRequest>,
    users: web::Data<dyn UserStore>,
    jwt_config: web::Data<JwtSettings>,
    request_id: RequestId,
) -> Result<HttpResponse, AppError> {
    let context = ErrorContext::new("user_login").with_request_id(request_id);

    login_user(form.into_inner(), users.get_ref(), jwt_config.get_ref(), &context)
        .await
        .map_err(|e| context.summarize(e, "Error logging in user"))
}

async fn login_user(
    form: LoginRequest,
    users: &dyn UserStore,
    jwt_config: &JwtSettings,
    context: &ErrorContext,
) -> Result<HttpResponse, AppError> {
    let credentials = validate_credentials(form.username.as_deref(), form.password.as_deref())?;

    let user = users
        .find_by_username_or_email(&credentials.login, &credentials.login)
        .await?
        .ok_or(AuthError::InvalidCredentials)?;

    let Some(password_hash) = user.password_hash.clone() else {
        tracing::info!(
            request_id = %context.request_id,
            user_id = %user.id,
            "Password login attempted on a social-login account"
        );
        return Err(AuthError::InvalidCredentials.into());
    };

    if !verify_password(credentials.password, password_hash).await? {
        return Err(AuthError::InvalidCredentials.into());
    }

    let tokens = issue_tokens(&user, jwt_config)?;

    tracing::info!(
        request_id = %context.request_id,
        user_id = %user.id,
        "User logged in successfully"
    );

    let mut response = HttpResponse::Ok();
    set_auth_cookies(&mut response, &tokens, jwt_config);
    Ok(response.json(SessionResponse {
        message: "Logged in successfully",
        user: user.summary(),
    }))
}

/// POST /auth/logout
///
/// Clears both cookies. Tokens already handed out stay valid until they
/// expire; there is no server-side session to invalidate.
pub async fn logout() -> HttpResponse {
    let mut response = HttpResponse::Ok();
    clear_auth_cookies(&mut response);
    response.json(MessageResponse {
        message: "Logged out successfully",
    })
}

/// POST /auth/refresh-token
///
/// Verifies the refresh cookie and rotates both tokens.
///
/// # Errors
/// - 401: Missing or invalid refresh token, or the user no longer exists
/// - 500: Storage failure
pub async fn refresh(
    req: HttpRequest,
    users: web::Data<dyn UserStore>,
    jwt_config: web::Data<JwtSettings>,
    request_id: RequestId,
) -> Result<HttpResponse, AppError> {
    let context = ErrorContext::new("token_refresh").with_request_id(request_id);

    let token = req
        .cookie(REFRESH_COOKIE)
        .map(|c| c.value().to_string())
        .filter(|v| !v.is_empty());

    rotate_tokens(token, users.get_ref(), jwt_config.get_ref(), &context)
        .await
        .map_err(|e| context.summarize(e, "Error refreshing token"))
}

async fn rotate_tokens(
    token: Option<String>,
    users: &dyn UserStore,
    jwt_config: &JwtSettings,
    context: &ErrorContext,
) -> Result<HttpResponse, AppError> {
    let token = token.ok_or(AuthError::MissingRefreshToken)?;
    let claims = validate_refresh_token(&token, jwt_config)?;

    let user = users
        .find_by_id(claims.id)
        .await?
        .ok_or(AuthError::UnknownUser)?;

    let tokens = issue_tokens(&user, jwt_config)?;

    tracing::info!(
        request_id = %context.request_id,
        user_id = %user.id,
        "Token refreshed successfully"
    );

    let mut response = HttpResponse::Ok();
    set_auth_cookies(&mut response, &tokens, jwt_config);
    Ok(response.json(MessageResponse {
        message: "Token refreshed successfully",
    }))
}

/// GET /auth/user
///
/// **Requires a valid `access_token` cookie** (checked by `JwtMiddleware`).
///
/// # Errors
/// - 403: Missing or invalid token (handled by middleware)
/// - 404: The user was deleted after the token was issued
/// - 500: Storage failure
pub async fn get_current_user(
    identity: web::ReqData<AuthenticatedUser>,
    users: web::Data<dyn UserStore>,
    request_id: RequestId,
) -> Result<HttpResponse, AppError> {
    let context = ErrorContext::new("fetch_profile")
        .with_request_id(request_id)
        .with_user_id(identity.id.to_string());

    let user = users
        .find_by_id(identity.id)
        .await
        .map_err(|e| context.summarize(e, "Error fetching profile"))?
        .ok_or(AppError::NotFound("User not found"))?;

    Ok(HttpResponse::Ok().json(user.profile()))
}

use actix_web::cookie::time::Duration as CookieDuration;
use actix_web::cookie::{Cookie, SameSite};
use actix_web::{web, HttpRequest, HttpResponse};
use serde::{Deserialize, Serialize};
use serde_json::json;
use crate::config::AuthConfig;
use crate::db::models::{Session, User};
use crate::error::AppError;
use crate::AppState;
use tracing::{error, info, warn};

// Request fields are optional so that a missing field and a body that is
// not JSON at all produce different 400 messages.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub password_confirm: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct UserView {
    pub id: i32,
    pub username: String,
    pub email: String,
}

impl From<&User> for UserView {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
        }
    }
}

// An absent field and an empty string are both "missing".
fn provided(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|value| !value.is_empty())
}

fn session_cookie(auth: &AuthConfig, session: &Session) -> Cookie<'static> {
    Cookie::build(auth.cookie_name.clone(), session.token.clone())
        .path("/")
        .http_only(true)
        .secure(auth.cookie_secure)
        .same_site(SameSite::Strict)
        .max_age(CookieDuration::hours(auth.session_ttl_hours))
        .finish()
}

fn clear_session_cookie(auth: &AuthConfig) -> Cookie<'static> {
    Cookie::build(auth.cookie_name.clone(), String::new())
        .path("/")
        .http_only(true)
        .secure(auth.cookie_secure)
        .same_site(SameSite::Strict)
        .max_age(CookieDuration::ZERO)
        .finish()
}

fn session_token(req: &HttpRequest, auth: &AuthConfig) -> Option<String> {
    req.cookie(&auth.cookie_name)
        .map(|cookie| cookie.value().to_string())
}

pub async fn login(
    req: web::Json<LoginRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let (username, password) = match (provided(&req.username), provided(&req.password)) {
        (Some(username), Some(password)) => (username, password),
        _ => {
            return Err(AppError::ValidationError(
                "Username and password are required".into(),
            ))
        }
    };

    info!("Received login request for username: {}", username);
    match state.auth_service.login(username, password).await {
        Ok((user, session)) => {
            info!("Login successful for username: {}", username);
            Ok(HttpResponse::Ok()
                .cookie(session_cookie(&state.config.auth, &session))
                .json(json!({
                    "success": true,
                    "message": "Login successful",
                    "user": UserView::from(&user),
                })))
        }
        Err(e) => {
            warn!("Login failed for username {}: {}", username, e);
            Err(e)
        }
    }
}

pub async fn signup(
    req: web::Json<SignupRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let fields = (
        provided(&req.username),
        provided(&req.email),
        provided(&req.password),
        provided(&req.password_confirm),
    );
    let (username, email, password, password_confirm) = match fields {
        (Some(username), Some(email), Some(password), Some(confirm)) => {
            (username, email, password, confirm)
        }
        _ => return Err(AppError::ValidationError("All fields are required".into())),
    };

    if password != password_confirm {
        return Err(AppError::ValidationError("Passwords do not match".into()));
    }

    info!("Received signup request for username: {}", username);
    match state.auth_service.signup(username, email, password).await {
        Ok((user, session)) => {
            info!("Signup successful for username: {}", username);
            Ok(HttpResponse::Ok()
                .cookie(session_cookie(&state.config.auth, &session))
                .json(json!({
                    "success": true,
                    "message": "Account created successfully",
                    "user": UserView::from(&user),
                })))
        }
        Err(e) => {
            warn!("Signup failed for username {}: {}", username, e);
            Err(e)
        }
    }
}

pub async fn logout(
    req: HttpRequest,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let token = session_token(&req, &state.config.auth);
    state.auth_service.logout(token.as_deref()).await?;

    Ok(HttpResponse::Ok()
        .cookie(clear_session_cookie(&state.config.auth))
        .json(json!({
            "success": true,
            "message": "Logged out successfully",
        })))
}

/// Never fails from the client's point of view: any server-side error is
/// reported as not authenticated.
pub async fn check_auth(
    req: HttpRequest,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let token = session_token(&req, &state.config.auth);
    match state.auth_service.check_auth(token.as_deref()).await {
        Ok(Some(user)) => Ok(HttpResponse::Ok().json(json!({
            "authenticated": true,
            "user": UserView::from(&user),
        }))),
        Ok(None) => Ok(HttpResponse::Ok().json(json!({
            "authenticated": false,
        }))),
        Err(e) => {
            error!("Auth check failed: {}", e);
            Ok(HttpResponse::InternalServerError().json(json!({
                "authenticated": false,
                "message": "An unexpected error occurred",
            })))
        }
    }
}

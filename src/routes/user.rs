use crate::Config;
use crate::auth::{CurrentUser, add_session_cookie, remove_session_cookie, session_id_from_cookies};
use crate::database::sqlite_repository::SqliteRepository;
use crate::error::app_error::AppError;
use crate::models::message::MessageResponse;
use crate::models::user::{LoginRequest, RegisterRequest, SessionStatusResponse, UserResponse};
use chrono::Utc;
use rocket::http::{CookieJar, Status};
use rocket::serde::json::Json;
use rocket::{State, get, post};
use rocket_okapi::openapi;
use sqlx::SqlitePool;
use tracing::info;
use validator::Validate;

fn session_status(current_user: Option<CurrentUser>) -> Json<SessionStatusResponse> {
    Json(SessionStatusResponse {
        authenticated: current_user.is_some(),
        username: current_user.map(|u| u.username),
    })
}

/// Whether the caller already holds a session; clients use it to skip the registration form.
#[openapi(tag = "Users")]
#[get("/register")]
pub async fn get_register(current_user: Option<CurrentUser>) -> Json<SessionStatusResponse> {
    session_status(current_user)
}

/// Create an account. Returns 409 if the username or email is already taken.
#[openapi(tag = "Users")]
#[post("/register", data = "<payload>")]
pub async fn post_register(pool: &State<SqlitePool>, payload: Json<RegisterRequest>) -> Result<(Status, Json<UserResponse>), AppError> {
    payload.validate()?;

    let repo = SqliteRepository { pool: pool.inner().clone() };
    let user = repo.create_user(&payload.username, &payload.email, &payload.password).await?;

    info!(user_id = %user.id, username = %user.username, "user registered");
    Ok((Status::Created, Json(UserResponse::from(&user))))
}

#[openapi(tag = "Users")]
#[get("/login")]
pub async fn get_login(current_user: Option<CurrentUser>) -> Json<SessionStatusResponse> {
    session_status(current_user)
}

/// Log in with email and password. Any failure answers 403 with the same message.
#[openapi(tag = "Users")]
#[post("/login", data = "<payload>")]
pub async fn post_login(
    pool: &State<SqlitePool>,
    config: &State<Config>,
    cookies: &CookieJar<'_>,
    payload: Json<LoginRequest>,
) -> Result<Json<UserResponse>, AppError> {
    payload.validate().map_err(|_| AppError::InvalidCredentials)?;

    let repo = SqliteRepository { pool: pool.inner().clone() };
    let user = repo.authenticate_user(&payload.email, &payload.password).await?;

    let lifetime = config.session.lifetime(payload.remember);
    let session = repo.create_session(&user.id, Utc::now() + lifetime).await?;
    add_session_cookie(cookies, &session.id, &user.id, lifetime);

    info!(user_id = %user.id, remember = payload.remember, "user logged in");
    Ok(Json(UserResponse::from(&user)))
}

#[openapi(tag = "Users")]
#[get("/logout")]
pub async fn get_logout(pool: &State<SqlitePool>, cookies: &CookieJar<'_>) -> Result<Json<MessageResponse>, AppError> {
    if let Some(session_id) = session_id_from_cookies(cookies) {
        let repo = SqliteRepository { pool: pool.inner().clone() };
        repo.delete_session(&session_id).await?;
    }
    remove_session_cookie(cookies);

    Ok(Json(MessageResponse::new("You have been logged out.")))
}

pub fn routes() -> (Vec<rocket::Route>, okapi::openapi3::OpenApi) {
    rocket_okapi::openapi_get_routes_spec![get_register, post_register, get_login, post_login, get_logout]
}

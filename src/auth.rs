use crate::database::sqlite_repository::SqliteRepository;
use crate::error::app_error::AppError;
use crate::models::budget::Budget;
use crate::models::expense::Expense;
use rocket::http::{Cookie, CookieJar, SameSite, Status};
use rocket::outcome::Outcome;
use rocket::request::{FromRequest, Outcome as RequestOutcome, Request};
use rocket_okapi::r#gen::OpenApiGenerator;
use rocket_okapi::okapi::openapi3::{Object, Responses, SecurityRequirement, SecurityScheme, SecuritySchemeData};
use rocket_okapi::request::{OpenApiFromRequest, RequestHeaderInput};
use serde::Serialize;
use sqlx::SqlitePool;
use tracing::warn;
use uuid::Uuid;

pub const SESSION_COOKIE: &str = "user";

#[derive(Debug, Clone, Serialize)]
pub struct CurrentUser {
    pub id: Uuid,
    pub username: String,
}

pub(crate) fn session_cookie_value(session_id: &Uuid, user_id: &Uuid) -> String {
    format!("{}:{}", session_id, user_id)
}

pub(crate) fn parse_session_cookie_value(value: &str) -> Option<(Uuid, Uuid)> {
    let (session_id_str, user_id_str) = value.split_once(':')?;
    let session_id = Uuid::parse_str(session_id_str).ok()?;
    let user_id = Uuid::parse_str(user_id_str).ok()?;
    Some((session_id, user_id))
}

pub(crate) fn add_session_cookie(cookies: &CookieJar<'_>, session_id: &Uuid, user_id: &Uuid, lifetime: chrono::Duration) {
    let cookie = Cookie::build((SESSION_COOKIE, session_cookie_value(session_id, user_id)))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(rocket::time::Duration::seconds(lifetime.num_seconds()))
        .build();
    cookies.add_private(cookie);
}

/// Session id carried by the request's cookie, if any.
pub(crate) fn session_id_from_cookies(cookies: &CookieJar<'_>) -> Option<Uuid> {
    cookies
        .get_private(SESSION_COOKIE)
        .and_then(|cookie| parse_session_cookie_value(cookie.value()))
        .map(|(session_id, _)| session_id)
}

pub(crate) fn remove_session_cookie(cookies: &CookieJar<'_>) {
    cookies.remove_private(Cookie::build(SESSION_COOKIE).path("/").build());
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for CurrentUser {
    type Error = AppError;

    async fn from_request(req: &'r Request<'_>) -> RequestOutcome<Self, Self::Error> {
        let cookies = req.cookies();
        if let Some(cookie) = cookies.get_private(SESSION_COOKIE)
            && let Some((session_id, user_id)) = parse_session_cookie_value(cookie.value())
        {
            let pool = match req.rocket().state::<SqlitePool>() {
                Some(pool) => pool,
                None => return Outcome::Error((Status::InternalServerError, AppError::Unauthorized)),
            };

            let repo = SqliteRepository { pool: pool.clone() };

            match repo.get_active_session_user(&session_id, &user_id).await {
                Ok(Some(user)) => {
                    let current_user = CurrentUser {
                        id: user.id,
                        username: user.username,
                    };
                    req.local_cache(|| Some(current_user.clone()));
                    return Outcome::Success(current_user);
                }
                Ok(None) => {
                    if let Err(err) = repo.delete_session_if_expired(&session_id).await {
                        warn!(error = ?err, session_id = %session_id, "failed to purge expired session");
                    }
                    return Outcome::Error((Status::Unauthorized, AppError::Unauthorized));
                }
                Err(err) => return Outcome::Error((Status::InternalServerError, err)),
            }
        }

        Outcome::Error((Status::Unauthorized, AppError::Unauthorized))
    }
}

impl<'a> OpenApiFromRequest<'a> for CurrentUser {
    fn from_request_input(_gen: &mut OpenApiGenerator, _name: String, _required: bool) -> rocket_okapi::Result<RequestHeaderInput> {
        let security_scheme = SecurityScheme {
            description: Some("Cookie-based authentication. Log in via POST /login to obtain the session cookie.".to_string()),
            data: SecuritySchemeData::ApiKey {
                name: SESSION_COOKIE.to_string(),
                location: "cookie".to_string(),
            },
            extensions: Object::default(),
        };

        let mut security_req = SecurityRequirement::new();
        security_req.insert("cookieAuth".to_string(), Vec::new());

        Ok(RequestHeaderInput::Security("cookieAuth".to_string(), security_scheme, security_req))
    }

    fn get_responses(_gen: &mut OpenApiGenerator) -> rocket_okapi::Result<Responses> {
        use rocket_okapi::okapi::openapi3::{RefOr, Response};
        let mut responses = Responses::default();
        responses.responses.insert(
            "401".to_string(),
            RefOr::Object(Response {
                description: "Unauthorized".to_string(),
                ..Default::default()
            }),
        );
        Ok(responses)
    }
}

/// Records that belong to exactly one user.
pub trait Owned {
    fn owner_id(&self) -> Uuid;
}

impl Owned for Expense {
    fn owner_id(&self) -> Uuid {
        self.user_id
    }
}

impl Owned for Budget {
    fn owner_id(&self) -> Uuid {
        self.user_id
    }
}

pub fn ensure_owner<T: Owned>(record: &T, user: &CurrentUser) -> Result<(), AppError> {
    if record.owner_id() == user.id {
        Ok(())
    } else {
        Err(AppError::PermissionDenied("Permission denied".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{sample_categories, sample_expense};
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    #[test]
    fn parse_session_cookie_value_valid() {
        let session_id = Uuid::new_v4();
        let user_id = Uuid::new_v4();
        let value = session_cookie_value(&session_id, &user_id);
        let parsed = parse_session_cookie_value(&value);
        assert!(matches!(parsed, Some((parsed_session_id, parsed_user_id)) if parsed_session_id == session_id && parsed_user_id == user_id));
    }

    #[test]
    fn parse_session_cookie_value_invalid_uuid() {
        assert!(parse_session_cookie_value("not-a-uuid:alice@x.com").is_none());
    }

    #[test]
    fn parse_session_cookie_value_missing_delimiter() {
        assert!(parse_session_cookie_value("missing-delimiter").is_none());
    }

    #[rocket::async_test]
    async fn expired_session_is_refused_and_purged() {
        use crate::test_utils::{register_and_login, test_client};
        use chrono::{Duration, Utc};

        let (client, _dir) = test_client().await;
        register_and_login(&client, "alice").await;
        let pool = client.rocket().state::<SqlitePool>().unwrap();

        sqlx::query("UPDATE user_session SET expires_at = ?")
            .bind(Utc::now() - Duration::hours(1))
            .execute(pool)
            .await
            .unwrap();

        assert_eq!(client.get("/expenses").dispatch().await.status(), Status::Unauthorized);
        let remaining: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM user_session").fetch_one(pool).await.unwrap();
        assert_eq!(remaining, 0);
    }

    #[test]
    fn guard_and_error_describe_401_identically() {
        use rocket_okapi::okapi::openapi3::RefOr;
        use rocket_okapi::response::OpenApiResponderInner;
        use rocket_okapi::settings::OpenApiSettings;

        let mut generator = OpenApiGenerator::new(&OpenApiSettings::default());
        let description = |responses: Responses| match responses.responses.get("401") {
            Some(RefOr::Object(response)) => response.description.clone(),
            _ => String::new(),
        };

        let from_guard = description(CurrentUser::get_responses(&mut generator).unwrap());
        let from_error = description(AppError::responses(&mut generator).unwrap());
        assert_eq!(from_guard, "Unauthorized");
        assert_eq!(from_guard, from_error);
    }

    #[test]
    fn only_the_owner_passes() {
        let categories = sample_categories();
        let mut expense = sample_expense(&categories[0], dec!(10), NaiveDate::from_ymd_opt(2024, 6, 1).unwrap());
        let owner = CurrentUser {
            id: Uuid::new_v4(),
            username: "alice".to_string(),
        };
        let intruder = CurrentUser {
            id: Uuid::new_v4(),
            username: "bob".to_string(),
        };
        expense.user_id = owner.id;

        assert!(ensure_owner(&expense, &owner).is_ok());
        assert!(matches!(ensure_owner(&expense, &intruder), Err(AppError::PermissionDenied(_))));
    }
}

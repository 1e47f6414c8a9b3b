mod auth;
mod config;
mod database;
mod db;
mod error;
mod middleware;
mod models;
mod routes;
mod service;

#[cfg(test)]
pub mod test_utils;

pub use config::Config;

use crate::db::stage_db;
use crate::middleware::RequestLogger;
use crate::routes as app_routes;
use rocket::{Build, Rocket, catchers};
use rocket_okapi::okapi::openapi3::OpenApi;
use rocket_okapi::swagger_ui::{SwaggerUIConfig, make_swagger_ui};
use rocket_okapi::{get_openapi_route, okapi::merge::marge_spec_list};
use tracing_subscriber::EnvFilter;

fn init_tracing(log_level: &str, json_format: bool) {
    // RUST_LOG takes precedence over the configured level, e.g.
    //   RUST_LOG=info,pocket_ledger::service=debug
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    let subscriber = tracing_subscriber::fmt().with_env_filter(filter).with_target(true).with_line_number(true);

    // A global subscriber may already be installed (tests build many rockets).
    let _ = if json_format { subscriber.json().try_init() } else { subscriber.try_init() };
}

fn check_rocket_secret_key() {
    let profile = std::env::var("ROCKET_PROFILE").unwrap_or_else(|_| "debug".to_string());

    if profile != "debug" && std::env::var("ROCKET_SECRET_KEY").is_err() {
        tracing::warn!(
            profile = %profile,
            "ROCKET_SECRET_KEY is not set; session cookies cannot be issued. Generate one with: openssl rand -base64 32"
        );
    }
}

fn collect_route_specs() -> Vec<(Vec<rocket::Route>, OpenApi)> {
    vec![
        app_routes::dashboard::routes(),
        app_routes::user::routes(),
        app_routes::expense::routes(),
        app_routes::budget::routes(),
        app_routes::report::routes(),
        app_routes::category::routes(),
        app_routes::health::routes(),
    ]
}

fn mount_routes(mut rocket: Rocket<Build>, enable_swagger: bool) -> Rocket<Build> {
    let mut openapi_list = Vec::new();
    for (routes, openapi) in collect_route_specs() {
        rocket = rocket.mount("/", routes);
        openapi_list.push(("", openapi));
    }

    if !enable_swagger {
        return rocket;
    }

    match marge_spec_list(&openapi_list) {
        Ok(docs) => {
            let settings = rocket_okapi::settings::OpenApiSettings::default();
            rocket
                .mount("/", vec![get_openapi_route(docs, &settings)])
                .mount(
                    "/docs",
                    make_swagger_ui(&SwaggerUIConfig {
                        url: "/openapi.json".to_string(),
                        ..Default::default()
                    }),
                )
        }
        Err(err) => {
            tracing::error!(error = %err, "Could not merge OpenAPI spec; API docs disabled");
            rocket
        }
    }
}

pub fn build_rocket(config: Config) -> Rocket<Build> {
    init_tracing(&config.logging.level, config.logging.json_format);
    check_rocket_secret_key();

    let figment = rocket::Config::figment()
        .merge(("port", config.server.port))
        .merge(("address", config.server.address.clone()));

    let rocket = rocket::custom(figment)
        .attach(RequestLogger)
        .attach(stage_db(config.database.clone()));

    let rocket = mount_routes(rocket, config.api.enable_swagger);

    rocket.manage(config).register(
        "/",
        catchers![
            app_routes::error::unauthorized,
            app_routes::error::forbidden,
            app_routes::error::not_found,
            app_routes::error::conflict,
            app_routes::error::unprocessable_entity,
            app_routes::error::internal_error
        ],
    )
}

use crate::models::message::MessageResponse;
use rocket::serde::json::Json;
use rocket::{Request, catch};

#[catch(401)]
pub fn unauthorized(_: &Request) -> Json<MessageResponse> {
    Json(MessageResponse::new("Please log in to access this page."))
}

#[catch(403)]
pub fn forbidden(_: &Request) -> Json<MessageResponse> {
    Json(MessageResponse::new("Permission denied"))
}

#[catch(404)]
pub fn not_found(_: &Request) -> Json<MessageResponse> {
    Json(MessageResponse::new("Not found"))
}

#[catch(409)]
pub fn conflict(_: &Request) -> Json<MessageResponse> {
    Json(MessageResponse::new("Conflict"))
}

#[catch(422)]
pub fn unprocessable_entity(_: &Request) -> Json<MessageResponse> {
    Json(MessageResponse::new("Malformed request body"))
}

#[catch(500)]
pub fn internal_error(_: &Request) -> Json<MessageResponse> {
    Json(MessageResponse::new("Internal server error"))
}

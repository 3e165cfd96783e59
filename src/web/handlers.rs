use actix_web::{web, HttpResponse, Responder};
use log::{debug, error, info, warn};
use serde_json::json;
use std::sync::Mutex;
use tera::Context;
use uuid::Uuid;

use crate::chat::{SendError, SessionStore};
use crate::web::models::{ChatRequest, ChatResponse, SessionView};
use crate::AppState;

const ASSISTANT_NAME: &str = "Shop Assistant";

fn lock_error() -> HttpResponse {
    HttpResponse::InternalServerError().json(json!({
        "error": "Internal server error"
    }))
}

// Chat panel page
pub async fn index(data: web::Data<AppState>) -> impl Responder {
    let mut context = Context::new();
    context.insert("assistant_name", ASSISTANT_NAME);
    context.insert("provider_label", data.model.provider_label());
    match data.tera.render("index.html", &context) {
        Ok(html) => HttpResponse::Ok().content_type("text/html").body(html),
        Err(e) => {
            error!("Template error: {}", e);
            HttpResponse::InternalServerError().body("Template error")
        }
    }
}

// Health check endpoint
pub async fn health_check() -> impl Responder {
    HttpResponse::Ok().json(json!({ "status": "ok" }))
}

/// Clears the loading flag of a session whose reply was never recorded,
/// e.g. because the client went away and actix dropped the handler.
struct PendingReply<'a> {
    sessions: &'a Mutex<SessionStore>,
    session_id: Uuid,
    settled: bool,
}

impl Drop for PendingReply<'_> {
    fn drop(&mut self) {
        if self.settled {
            return;
        }
        warn!("Reply for session {} was abandoned", self.session_id);
        if let Ok(mut sessions) = self.sessions.lock() {
            if let Some(panel) = sessions.get_mut(&self.session_id) {
                panel.abandon();
            }
        }
    }
}

// Send one message and wait for the assistant's reply
pub async fn chat(data: web::Data<AppState>, req: web::Json<ChatRequest>) -> impl Responder {
    let req = req.into_inner();

    if let Some(key) = &req.key {
        if !key.submits() {
            debug!("Ignoring non-submit key {:?}", key);
            return HttpResponse::BadRequest().json(json!({
                "error": "Only Enter without Shift sends a message"
            }));
        }
    }

    let session_id = req.session_id.unwrap_or_else(Uuid::new_v4);

    // Append the user turn and flag the panel as busy before calling out.
    let started = match data.sessions.lock() {
        Ok(mut sessions) => sessions.begin_send(session_id, req.message),
        Err(e) => {
            error!("Failed to lock sessions mutex: {}", e);
            return lock_error();
        }
    };
    let user_message = match started {
        Ok(message) => message,
        Err(SendError::Empty) => {
            return HttpResponse::BadRequest().json(json!({
                "error": "Message is empty"
            }));
        }
        Err(SendError::Busy) => {
            return HttpResponse::Conflict().json(json!({
                "error": "Still waiting for the previous reply",
                "session_id": session_id
            }));
        }
    };

    let mut pending = PendingReply {
        sessions: &data.sessions,
        session_id,
        settled: false,
    };

    info!("Chat request from session {}", session_id);
    debug!("Prompt: {}", user_message.content());

    let result = data.model.generate_response(user_message.content()).await;

    let outcome = {
        let mut sessions = match data.sessions.lock() {
            Ok(guard) => guard,
            Err(e) => {
                error!("Failed to lock sessions mutex: {}", e);
                return lock_error();
            }
        };
        match sessions.get_mut(&session_id) {
            Some(panel) => panel.finish(result),
            None => {
                error!("Session {} disappeared while waiting for a reply", session_id);
                return lock_error();
            }
        }
    };
    pending.settled = true;

    match outcome {
        Ok(reply) => HttpResponse::Ok().json(ChatResponse {
            session_id,
            user_message,
            reply,
        }),
        Err(toast) => HttpResponse::BadGateway().json(json!({
            "session_id": session_id,
            "title": toast.title,
            "error": toast.description,
            "detail": toast.detail
        })),
    }
}

// Current history of one panel
pub async fn session_messages(data: web::Data<AppState>, path: web::Path<Uuid>) -> impl Responder {
    let session_id = path.into_inner();
    let sessions = match data.sessions.lock() {
        Ok(guard) => guard,
        Err(e) => {
            error!("Failed to lock sessions mutex: {}", e);
            return lock_error();
        }
    };
    match sessions.get(&session_id) {
        Some(panel) => HttpResponse::Ok().json(SessionView {
            session_id,
            loading: panel.is_loading(),
            messages: panel.messages(),
        }),
        None => HttpResponse::NotFound().json(json!({
            "error": "Unknown session",
            "session_id": session_id
        })),
    }
}

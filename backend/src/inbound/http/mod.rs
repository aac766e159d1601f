//! Inbound HTTP adapter: handlers, request/response DTOs, bearer
//! authentication, and the domain-error mapping.

pub mod auth;
pub mod bearer;
pub mod chat;
pub mod error;
pub mod events;
pub mod schoolwork;
pub mod scores;
pub mod state;
mod validation;

pub use error::ApiResult;

use actix_web::web;

/// Register every HTTP endpoint on the given service config.
///
/// Shared between the server bootstrap and the test harness so routing
/// is exercised exactly as deployed. `/schoolwork/recents` must precede
/// the `/schoolwork/{id}` matcher.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(auth::register)
        .service(auth::login)
        .service(auth::my_info)
        .service(auth::change_password)
        .service(events::list_events)
        .service(events::create_event)
        .service(events::delete_event)
        .service(chat::chat_message)
        .service(chat::chat_history)
        .service(chat::extract_events)
        .service(chat::generate_test)
        .service(chat::analyze_schoolwork)
        .service(chat::exam_analyse)
        .service(scores::save_score)
        .service(scores::recent_scores)
        .service(schoolwork::recent_analyses)
        .service(schoolwork::get_analysis);
}

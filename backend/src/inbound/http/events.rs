//! Calendar event HTTP handlers.
//!
//! ```text
//! GET  /events
//! POST /events
//! POST /events/delete
//! ```

use std::collections::BTreeMap;

use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{CalendarEvent, Error, EventDraft, group_by_date, parse_event_date};

use super::bearer::Identity;
use super::error::ApiResult;
use super::state::HttpState;
use super::validation::{FieldName, require_field};

/// One event in the calendar listing.
#[derive(Debug, Serialize, ToSchema)]
pub struct EventBody {
    pub id: i32,
    #[serde(rename = "type")]
    #[schema(example = "homework")]
    pub kind: String,
    pub description: String,
}

impl From<&CalendarEvent> for EventBody {
    fn from(event: &CalendarEvent) -> Self {
        Self {
            id: event.id(),
            kind: event.kind().to_string(),
            description: event.description().to_owned(),
        }
    }
}

/// Request payload for creating an event.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateEventRequestBody {
    #[schema(example = "2026-01-10")]
    pub date: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub description: Option<String>,
}

/// Request payload for deleting an event by its (date, description) pair.
#[derive(Debug, Deserialize, ToSchema)]
pub struct DeleteEventRequestBody {
    pub date: Option<String>,
    pub description: Option<String>,
}

/// List the caller's events grouped by date.
#[utoipa::path(
    get,
    path = "/events",
    responses(
        (status = 200, description = "Events keyed by YYYY-MM-DD date"),
        (status = 401, description = "Missing or invalid token", body = Error)
    ),
    tags = ["events"],
    operation_id = "listEvents",
    security(("BearerToken" = []))
)]
#[get("/events")]
pub async fn list_events(
    state: web::Data<HttpState>,
    identity: Identity,
) -> ApiResult<web::Json<BTreeMap<String, Vec<EventBody>>>> {
    let events = state.events.list_for_owner(identity.user_id()).await?;
    let grouped = group_by_date(events)
        .into_iter()
        .map(|(date, events)| (date, events.iter().map(EventBody::from).collect()))
        .collect();
    Ok(web::Json(grouped))
}

/// Create an event for the caller.
#[utoipa::path(
    post,
    path = "/events",
    request_body = CreateEventRequestBody,
    responses(
        (status = 201, description = "Event created", body = EventBody),
        (status = 400, description = "Invalid payload", body = Error),
        (status = 401, description = "Missing or invalid token", body = Error)
    ),
    tags = ["events"],
    operation_id = "createEvent",
    security(("BearerToken" = []))
)]
#[post("/events")]
pub async fn create_event(
    state: web::Data<HttpState>,
    identity: Identity,
    payload: web::Json<CreateEventRequestBody>,
) -> ApiResult<HttpResponse> {
    let payload = payload.into_inner();
    let date = require_field(payload.date, FieldName::new("date"))?;
    let kind = require_field(payload.kind, FieldName::new("type"))?;
    let description = require_field(payload.description, FieldName::new("description"))?;
    let draft = EventDraft::from_parts(&date, &kind, &description)
        .map_err(|err| Error::invalid_request(err.to_string()))?;

    let event = state.events.insert(identity.user_id(), &draft).await?;
    Ok(HttpResponse::Created().json(EventBody::from(&event)))
}

/// Delete the caller's events matching an exact (date, description) pair.
#[utoipa::path(
    post,
    path = "/events/delete",
    request_body = DeleteEventRequestBody,
    responses(
        (status = 200, description = "Event deleted"),
        (status = 400, description = "Invalid payload", body = Error),
        (status = 401, description = "Missing or invalid token", body = Error),
        (status = 404, description = "No matching event", body = Error)
    ),
    tags = ["events"],
    operation_id = "deleteEvent",
    security(("BearerToken" = []))
)]
#[post("/events/delete")]
pub async fn delete_event(
    state: web::Data<HttpState>,
    identity: Identity,
    payload: web::Json<DeleteEventRequestBody>,
) -> ApiResult<web::Json<super::auth::MessageBody>> {
    let payload = payload.into_inner();
    let date = require_field(payload.date, FieldName::new("date"))?;
    let description = require_field(payload.description, FieldName::new("description"))?;
    let date = parse_event_date(&date).map_err(|err| Error::invalid_request(err.to_string()))?;

    let deleted = state
        .events
        .delete_matching(identity.user_id(), date, description.trim())
        .await?;
    if deleted == 0 {
        return Err(Error::not_found("Event not found"));
    }
    Ok(web::Json(super::auth::MessageBody::new("Event deleted")))
}

#[cfg(test)]
mod tests {
    //! Handler coverage over in-memory adapters.
    use actix_web::http::StatusCode;
    use actix_web::test;
    use rstest::rstest;
    use serde_json::json;

    use crate::test_support::{TestApp, TestStateBuilder};

    fn event_payload() -> serde_json::Value {
        json!({"date": "2026-01-10", "type": "homework", "description": "Read ch.3"})
    }

    #[actix_web::test]
    async fn created_events_come_back_grouped_by_date() {
        let app = TestApp::spawn(TestStateBuilder::new()).await;
        let token = app.register_and_login("a@x.com", "pw").await;

        let created = app
            .post_json_authed("/events", event_payload(), &token)
            .await;
        assert_eq!(created.status(), StatusCode::CREATED);

        let listing = app.get("/events", Some(&token)).await;
        assert_eq!(listing.status(), StatusCode::OK);
        let body: serde_json::Value = test::read_body_json(listing).await;
        assert_eq!(
            body,
            json!({"2026-01-10": [{"id": 1, "type": "homework", "description": "Read ch.3"}]})
        );
    }

    #[rstest]
    #[case(json!({"date": "2026-01-10", "type": "exam", "description": "x"}))]
    #[case(json!({"date": "someday", "type": "test", "description": "x"}))]
    #[case(json!({"type": "test", "description": "x"}))]
    #[case(json!({"date": "2026-01-10", "type": "test", "description": "  "}))]
    #[actix_web::test]
    async fn invalid_event_payloads_are_rejected(#[case] payload: serde_json::Value) {
        let app = TestApp::spawn(TestStateBuilder::new()).await;
        let token = app.register_and_login("a@x.com", "pw").await;

        let response = app.post_json_authed("/events", payload, &token).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn events_are_owner_scoped() {
        let app = TestApp::spawn(TestStateBuilder::new()).await;
        let owner = app.register_and_login("owner@x.com", "pw").await;
        let other = app.register_and_login("other@x.com", "pw").await;

        app.post_json_authed("/events", event_payload(), &owner)
            .await;

        let listing = app.get("/events", Some(&other)).await;
        let body: serde_json::Value = test::read_body_json(listing).await;
        assert_eq!(body, json!({}), "another user's calendar must be empty");
    }

    #[actix_web::test]
    async fn deletion_matches_the_exact_pair_and_spares_the_rest() {
        let app = TestApp::spawn(TestStateBuilder::new()).await;
        let token = app.register_and_login("a@x.com", "pw").await;
        app.post_json_authed("/events", event_payload(), &token)
            .await;
        app.post_json_authed(
            "/events",
            json!({"date": "2026-01-10", "type": "test", "description": "Algebra"}),
            &token,
        )
        .await;

        let miss = app
            .post_json_authed(
                "/events/delete",
                json!({"date": "2026-01-10", "description": "No such thing"}),
                &token,
            )
            .await;
        assert_eq!(miss.status(), StatusCode::NOT_FOUND);

        let hit = app
            .post_json_authed(
                "/events/delete",
                json!({"date": "2026-01-10", "description": "Read ch.3"}),
                &token,
            )
            .await;
        assert_eq!(hit.status(), StatusCode::OK);

        let listing = app.get("/events", Some(&token)).await;
        let body: serde_json::Value = test::read_body_json(listing).await;
        assert_eq!(body["2026-01-10"][0]["description"], "Algebra");
    }

    #[actix_web::test]
    async fn deleting_another_users_event_is_not_found() {
        let app = TestApp::spawn(TestStateBuilder::new()).await;
        let owner = app.register_and_login("owner@x.com", "pw").await;
        let other = app.register_and_login("other@x.com", "pw").await;
        app.post_json_authed("/events", event_payload(), &owner)
            .await;

        let response = app
            .post_json_authed(
                "/events/delete",
                json!({"date": "2026-01-10", "description": "Read ch.3"}),
                &other,
            )
            .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let listing = app.get("/events", Some(&owner)).await;
        let body: serde_json::Value = test::read_body_json(listing).await;
        assert_eq!(body["2026-01-10"].as_array().map(Vec::len), Some(1));
    }
}

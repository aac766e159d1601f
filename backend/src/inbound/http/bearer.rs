//! Bearer-token authentication for HTTP handlers.
//!
//! Handlers take an [`Identity`] parameter; extraction verifies the
//! `Authorization` header against the token service before the handler
//! body runs, so no handler can forget to authenticate.

use actix_web::http::header;
use actix_web::{FromRequest, HttpRequest, dev::Payload, web};
use futures_util::future::{Ready, ready};

use crate::domain::{Error, UserId};

use super::state::HttpState;

/// The authenticated caller of the current request.
#[derive(Debug, Clone)]
pub struct Identity(UserId);

impl Identity {
    /// The verified user id the token carries.
    pub fn user_id(&self) -> &UserId {
        &self.0
    }
}

fn authenticate(req: &HttpRequest) -> Result<Identity, Error> {
    let state = req
        .app_data::<web::Data<HttpState>>()
        .ok_or_else(|| Error::internal("authentication state is not configured"))?;

    let header = req
        .headers()
        .get(header::AUTHORIZATION)
        .ok_or_else(|| Error::unauthorized("missing bearer token"))?
        .to_str()
        .map_err(|_| Error::unauthorized("malformed authorization header"))?;
    let token = header
        .strip_prefix("Bearer ")
        .ok_or_else(|| Error::unauthorized("malformed authorization header"))?
        .trim();

    state
        .tokens
        .verify(token)
        .map(Identity)
        .map_err(|_| Error::unauthorized("invalid or expired token"))
}

impl FromRequest for Identity {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(authenticate(req))
    }
}

#[cfg(test)]
mod tests {
    //! Extraction coverage over a stub token service.
    use actix_web::http::StatusCode;
    use actix_web::{App, HttpResponse, test, web};
    use rstest::rstest;

    use super::*;
    use crate::inbound::http::ApiResult;
    use crate::test_support::{TestStateBuilder, issue_test_token};

    async fn whoami(identity: Identity) -> ApiResult<HttpResponse> {
        Ok(HttpResponse::Ok().body(identity.user_id().to_string()))
    }

    #[rstest]
    #[case(None, StatusCode::UNAUTHORIZED)]
    #[case(Some("Token abc"), StatusCode::UNAUTHORIZED)]
    #[case(Some("Bearer not-a-real-token"), StatusCode::UNAUTHORIZED)]
    #[actix_web::test]
    async fn bad_headers_are_rejected(
        #[case] header_value: Option<&str>,
        #[case] expected: StatusCode,
    ) {
        let state = TestStateBuilder::new().build();
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .route("/whoami", web::get().to(whoami)),
        )
        .await;

        let mut request = test::TestRequest::get().uri("/whoami");
        if let Some(value) = header_value {
            request = request.insert_header((header::AUTHORIZATION, value));
        }
        let response = test::call_service(&app, request.to_request()).await;
        assert_eq!(response.status(), expected);
    }

    #[actix_web::test]
    async fn valid_token_resolves_its_user() {
        let user_id = UserId::generate();
        let state = TestStateBuilder::new().build();
        let token = issue_test_token(&state, &user_id);
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .route("/whoami", web::get().to(whoami)),
        )
        .await;

        let request = test::TestRequest::get()
            .uri("/whoami")
            .insert_header((header::AUTHORIZATION, format!("Bearer {token}")))
            .to_request();
        let body = test::call_and_read_body(&app, request).await;
        assert_eq!(body, user_id.to_string().as_bytes());
    }
}

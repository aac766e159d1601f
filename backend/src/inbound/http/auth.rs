//! Account HTTP handlers.
//!
//! ```text
//! POST /auth/register
//! POST /auth/login
//! GET  /auth/myInfo
//! POST /auth/change_password
//! ```

use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{Credentials, Error, Password};

use super::bearer::Identity;
use super::error::ApiResult;
use super::state::HttpState;
use super::validation::{FieldName, require_field};

/// Request payload for registration and login.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CredentialsRequestBody {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Response payload for a successful login.
#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponseBody {
    pub access_token: String,
}

/// Response payload for profile reads.
#[derive(Debug, Serialize, ToSchema)]
pub struct ProfileResponseBody {
    #[schema(format = "uuid")]
    pub id: String,
    pub email: String,
}

/// Request payload for password changes.
#[derive(Debug, Deserialize, ToSchema)]
pub struct ChangePasswordRequestBody {
    pub password: Option<String>,
}

/// Simple acknowledgement body.
#[derive(Debug, Serialize, ToSchema)]
pub struct MessageBody {
    pub message: String,
}

impl MessageBody {
    pub(crate) fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

fn parse_credentials(body: CredentialsRequestBody) -> Result<Credentials, Error> {
    let email = require_field(body.email, FieldName::new("email"))?;
    let password = require_field(body.password, FieldName::new("password"))?;
    Credentials::try_from_parts(&email, &password)
        .map_err(|err| Error::invalid_request(err.to_string()))
}

/// Register a new account.
#[utoipa::path(
    post,
    path = "/auth/register",
    request_body = CredentialsRequestBody,
    responses(
        (status = 201, description = "Account created", body = MessageBody),
        (status = 400, description = "Invalid payload or duplicate user", body = Error)
    ),
    tags = ["auth"],
    operation_id = "register"
)]
#[post("/auth/register")]
pub async fn register(
    state: web::Data<HttpState>,
    payload: web::Json<CredentialsRequestBody>,
) -> ApiResult<HttpResponse> {
    let credentials = parse_credentials(payload.into_inner())?;
    state.accounts.register(&credentials).await?;
    Ok(HttpResponse::Created().json(MessageBody::new("User created successfully")))
}

/// Exchange credentials for a bearer token.
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = CredentialsRequestBody,
    responses(
        (status = 200, description = "Token issued", body = LoginResponseBody),
        (status = 400, description = "Invalid payload", body = Error),
        (status = 401, description = "Unknown user or wrong password", body = Error)
    ),
    tags = ["auth"],
    operation_id = "login"
)]
#[post("/auth/login")]
pub async fn login(
    state: web::Data<HttpState>,
    payload: web::Json<CredentialsRequestBody>,
) -> ApiResult<web::Json<LoginResponseBody>> {
    let credentials = parse_credentials(payload.into_inner())?;
    let user = state.accounts.verify(&credentials).await?;
    let access_token = state
        .tokens
        .issue(user.id())
        .map_err(|err| Error::internal(err.to_string()))?;
    Ok(web::Json(LoginResponseBody { access_token }))
}

/// Read the authenticated user's profile.
#[utoipa::path(
    get,
    path = "/auth/myInfo",
    responses(
        (status = 200, description = "Profile", body = ProfileResponseBody),
        (status = 401, description = "Missing or invalid token", body = Error),
        (status = 404, description = "Account no longer exists", body = Error)
    ),
    tags = ["auth"],
    operation_id = "myInfo",
    security(("BearerToken" = []))
)]
#[get("/auth/myInfo")]
pub async fn my_info(
    state: web::Data<HttpState>,
    identity: Identity,
) -> ApiResult<web::Json<ProfileResponseBody>> {
    let user = state.accounts.fetch(identity.user_id()).await?;
    Ok(web::Json(ProfileResponseBody {
        id: user.id().to_string(),
        email: user.email().as_str().to_owned(),
    }))
}

/// Replace the authenticated user's password.
#[utoipa::path(
    post,
    path = "/auth/change_password",
    request_body = ChangePasswordRequestBody,
    responses(
        (status = 200, description = "Password replaced", body = MessageBody),
        (status = 400, description = "Invalid payload", body = Error),
        (status = 401, description = "Missing or invalid token", body = Error),
        (status = 404, description = "Account no longer exists", body = Error)
    ),
    tags = ["auth"],
    operation_id = "changePassword",
    security(("BearerToken" = []))
)]
#[post("/auth/change_password")]
pub async fn change_password(
    state: web::Data<HttpState>,
    identity: Identity,
    payload: web::Json<ChangePasswordRequestBody>,
) -> ApiResult<web::Json<MessageBody>> {
    let raw = require_field(payload.into_inner().password, FieldName::new("password"))?;
    let password = Password::new(raw).map_err(|err| Error::invalid_request(err.to_string()))?;
    state
        .accounts
        .change_password(identity.user_id(), &password)
        .await?;
    Ok(web::Json(MessageBody::new("Password updated")))
}

//! Schoolwork analysis retrieval handlers.
//!
//! ```text
//! GET /schoolwork/recents
//! GET /schoolwork/{id}
//! ```

use actix_web::{get, web};
use chrono::SecondsFormat;
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::{Error, SchoolworkAnalysis};

use super::bearer::Identity;
use super::error::ApiResult;
use super::state::HttpState;

const RECENTS_LIMIT: i64 = 20;

/// Summary entry in the recents listing.
#[derive(Debug, Serialize, ToSchema)]
pub struct AnalysisSummaryBody {
    pub id: i32,
    #[serde(rename = "type")]
    pub kind: String,
    pub subject: String,
    pub topic: Option<String>,
    #[schema(format = "date-time")]
    pub created_at: String,
}

/// Full analysis payload.
#[derive(Debug, Serialize, ToSchema)]
pub struct AnalysisResponseBody {
    pub id: i32,
    #[serde(rename = "type")]
    pub kind: String,
    pub subject: String,
    pub topic: Option<String>,
    pub content: String,
    #[schema(format = "date-time")]
    pub created_at: String,
}

fn created_at_string(analysis: &SchoolworkAnalysis) -> String {
    analysis
        .created_at()
        .to_rfc3339_opts(SecondsFormat::Secs, true)
}

impl From<&SchoolworkAnalysis> for AnalysisSummaryBody {
    fn from(analysis: &SchoolworkAnalysis) -> Self {
        Self {
            id: analysis.id(),
            kind: analysis.kind().to_owned(),
            subject: analysis.subject().to_owned(),
            topic: analysis.topic().map(str::to_owned),
            created_at: created_at_string(analysis),
        }
    }
}

impl From<&SchoolworkAnalysis> for AnalysisResponseBody {
    fn from(analysis: &SchoolworkAnalysis) -> Self {
        Self {
            id: analysis.id(),
            kind: analysis.kind().to_owned(),
            subject: analysis.subject().to_owned(),
            topic: analysis.topic().map(str::to_owned),
            content: analysis.content().to_owned(),
            created_at: created_at_string(analysis),
        }
    }
}

/// List the caller's most recent analyses.
#[utoipa::path(
    get,
    path = "/schoolwork/recents",
    responses(
        (status = 200, description = "Summaries, newest first", body = [AnalysisSummaryBody]),
        (status = 401, description = "Missing or invalid token", body = Error)
    ),
    tags = ["schoolwork"],
    operation_id = "recentSchoolwork",
    security(("BearerToken" = []))
)]
#[get("/schoolwork/recents")]
pub async fn recent_analyses(
    state: web::Data<HttpState>,
    identity: Identity,
) -> ApiResult<web::Json<Vec<AnalysisSummaryBody>>> {
    let analyses = state
        .schoolwork
        .list_recent(identity.user_id(), RECENTS_LIMIT)
        .await?;
    Ok(web::Json(
        analyses.iter().map(AnalysisSummaryBody::from).collect(),
    ))
}

/// Fetch one of the caller's analyses.
#[utoipa::path(
    get,
    path = "/schoolwork/{id}",
    params(("id" = i32, Path, description = "Analysis id")),
    responses(
        (status = 200, description = "Analysis", body = AnalysisResponseBody),
        (status = 401, description = "Missing or invalid token", body = Error),
        (status = 404, description = "No such analysis for this user", body = Error)
    ),
    tags = ["schoolwork"],
    operation_id = "getSchoolwork",
    security(("BearerToken" = []))
)]
#[get("/schoolwork/{id}")]
pub async fn get_analysis(
    state: web::Data<HttpState>,
    identity: Identity,
    path: web::Path<i32>,
) -> ApiResult<web::Json<AnalysisResponseBody>> {
    let id = path.into_inner();
    let analysis = state
        .schoolwork
        .find_by_id(identity.user_id(), id)
        .await?
        .ok_or_else(|| Error::not_found("Analysis not found"))?;
    Ok(web::Json(AnalysisResponseBody::from(&analysis)))
}

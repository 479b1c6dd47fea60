//! Read-only views: dashboard figures, the monthly report, and renewal alerts.

use std::sync::Arc;

use axum::{
  Json,
  extract::{Query, State},
  http::header,
  response::{IntoResponse, Response},
};
use chrono::Utc;
use easystream_core::{
  Panel, dashboard::DashboardStats, purchase::Purchase, store::RecordStore,
};
use serde::Deserialize;

use crate::error::ApiError;

/// `GET /dashboard`
pub async fn dashboard<S>(
  State(panel): State<Arc<Panel<S>>>,
) -> Result<Json<DashboardStats>, ApiError>
where
  S: RecordStore + 'static,
{
  Ok(Json(panel.dashboard(Utc::now()).await?))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
  #[default]
  Json,
  Text,
}

#[derive(Debug, Deserialize)]
pub struct ReportParams {
  #[serde(default)]
  pub format: ReportFormat,
}

/// `GET /reports/monthly[?format=json|text]`
///
/// The text form is served as a download named after the month.
pub async fn monthly<S>(
  State(panel): State<Arc<Panel<S>>>,
  Query(params): Query<ReportParams>,
) -> Result<Response, ApiError>
where
  S: RecordStore + 'static,
{
  let report = panel.monthly_report(Utc::now()).await?;
  Ok(match params.format {
    ReportFormat::Json => Json(report).into_response(),
    ReportFormat::Text => (
      [
        (header::CONTENT_TYPE, "text/plain; charset=utf-8".to_owned()),
        (
          header::CONTENT_DISPOSITION,
          format!("attachment; filename=\"{}\"", report.file_name()),
        ),
      ],
      report.to_string(),
    )
      .into_response(),
  })
}

/// `GET /alerts/expiring`: purchases one to three days from expiry.
pub async fn expiring<S>(
  State(panel): State<Arc<Panel<S>>>,
) -> Result<Json<Vec<Purchase>>, ApiError>
where
  S: RecordStore + 'static,
{
  Ok(Json(panel.expiry_alerts(Utc::now()).await?))
}

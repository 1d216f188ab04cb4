use crate::cache::StatsCache;
use crate::permissions::Permission;
use crate::routes::api::v0::dashboard::error::DashboardError;
use crate::routes::attachment;
use crate::user::ExtractUserId;
use axum::extract::Query;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Extension, Json, Router};
use chrono::Local;
use praxis_core::dashboard::{DashboardStats, clamp_window_days, compute_dashboard_stats};
use praxis_core::export::{ExportFormat, render_dashboard_export};
use protect_axum::protect;
use sea_orm::{DatabaseConnection, DbErr};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

mod error;

pub(crate) fn create_router<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    Router::new()
        .route("/", get(get_dashboard))
        .route("/export", get(export_dashboard))
        .with_state(())
}

#[derive(Debug, Deserialize)]
pub(crate) struct DashboardParams {
    days: Option<String>,
    course: Option<String>,
    format: Option<String>,
}

/// Lenient query handling: a bad `days` becomes the default window, a bad
/// or non-positive `course` means "all offerings". Never rejects.
fn parse_filters(params: &DashboardParams) -> (u16, Option<i32>) {
    let days = clamp_window_days(params.days.as_deref().and_then(|v| v.parse::<i64>().ok()));
    let course = params
        .course
        .as_deref()
        .and_then(|v| v.parse::<i32>().ok())
        .filter(|id| *id > 0);
    (days, course)
}

async fn load_stats(
    conn: &DatabaseConnection,
    cache: &StatsCache,
    user_id: Uuid,
    days: u16,
    course: Option<i32>,
) -> Result<DashboardStats, DbErr> {
    let key = (user_id, days, course);
    if let Some(stats) = cache.get(&key).await {
        return Ok(stats);
    }
    let today = Local::now().date_naive();
    let stats = compute_dashboard_stats(conn, user_id, days, course, today).await?;
    cache.put(key, stats.clone()).await;
    Ok(stats)
}

#[derive(Debug, Serialize)]
struct DashboardResponse {
    filter_days: u16,
    filter_course: Option<i32>,
    #[serde(flatten)]
    stats: DashboardStats,
}

#[protect("Permission::Teacher", ty = "Permission")]
async fn get_dashboard(
    ExtractUserId(user_id): ExtractUserId,
    Extension(conn): Extension<DatabaseConnection>,
    Extension(cache): Extension<StatsCache>,
    Query(params): Query<DashboardParams>,
) -> Result<Response, DashboardError> {
    let (days, course) = parse_filters(&params);
    let stats = load_stats(&conn, &cache, user_id, days, course).await?;

    Ok(Json(DashboardResponse {
        filter_days: days,
        filter_course: course,
        stats,
    })
    .into_response())
}

#[protect("Permission::Teacher", ty = "Permission")]
async fn export_dashboard(
    ExtractUserId(user_id): ExtractUserId,
    Extension(conn): Extension<DatabaseConnection>,
    Extension(cache): Extension<StatsCache>,
    Query(params): Query<DashboardParams>,
) -> Result<Response, DashboardError> {
    let (days, course) = parse_filters(&params);
    let format = ExportFormat::parse(params.format.as_deref());
    let stats = load_stats(&conn, &cache, user_id, days, course).await?;

    let export = render_dashboard_export(&stats, days, course, format);
    Ok(attachment(export)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(days: Option<&str>, course: Option<&str>) -> DashboardParams {
        DashboardParams {
            days: days.map(str::to_owned),
            course: course.map(str::to_owned),
            format: None,
        }
    }

    #[test]
    fn invalid_days_fall_back_to_seven() {
        assert_eq!(parse_filters(&params(Some("abc"), None)), (7, None));
        assert_eq!(parse_filters(&params(Some("5"), None)), (7, None));
        assert_eq!(parse_filters(&params(None, None)), (7, None));
        assert_eq!(parse_filters(&params(Some("30"), None)), (30, None));
    }

    #[test]
    fn course_zero_or_garbage_means_all() {
        assert_eq!(parse_filters(&params(None, Some("0"))), (7, None));
        assert_eq!(parse_filters(&params(None, Some("-3"))), (7, None));
        assert_eq!(parse_filters(&params(None, Some("x"))), (7, None));
        assert_eq!(parse_filters(&params(None, Some("12"))), (7, Some(12)));
    }
}

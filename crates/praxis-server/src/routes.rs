use axum::body::Body;
use axum::response::Response;
use http::header;
use praxis_core::export::Export;

pub(crate) mod api;

/// Wraps a rendered export into a download response.
pub(crate) fn attachment(export: Export) -> Result<Response, http::Error> {
    Response::builder()
        .header(header::CONTENT_TYPE, export.content_type)
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename={}", export.filename),
        )
        .body(Body::from(export.bytes))
}

//! Endpoint handlers and rejection mapping.

use super::with_cors;
use crate::api::{HostScanRequest, PortScanRequest, ScanService};
use crate::error::RequestError;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::convert::Infallible;
use std::sync::Arc;
use tracing::{error, warn};
use warp::http::StatusCode;
use warp::hyper::body::Bytes;
use warp::reply::Response;
use warp::Rejection;

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
}

/// `POST /scan-hosts`
pub async fn scan_hosts(body: Bytes, service: Arc<ScanService>) -> Result<Response, Infallible> {
    let request: HostScanRequest = match parse_body(&body) {
        Ok(request) => request,
        Err(e) => return Ok(request_error(&e)),
    };

    Ok(match service.scan_hosts(&request).await {
        Ok(report) => with_cors(warp::reply::json(&report)),
        Err(e) => request_error(&e),
    })
}

/// `POST /scan-ports`
pub async fn scan_ports(body: Bytes, service: Arc<ScanService>) -> Result<Response, Infallible> {
    let request: PortScanRequest = match parse_body(&body) {
        Ok(request) => request,
        Err(e) => return Ok(request_error(&e)),
    };

    Ok(match service.scan_ports(&request).await {
        Ok(report) => with_cors(warp::reply::json(&report)),
        Err(e) => request_error(&e),
    })
}

/// Turn warp rejections into JSON errors carrying the CORS headers.
pub async fn rejection(rejection: Rejection) -> Result<Response, Infallible> {
    let (status, message) = if rejection.is_not_found() {
        (StatusCode::NOT_FOUND, "not found")
    } else if rejection.find::<warp::reject::PayloadTooLarge>().is_some() {
        (StatusCode::PAYLOAD_TOO_LARGE, "request body too large")
    } else if rejection.find::<warp::reject::LengthRequired>().is_some() {
        (StatusCode::LENGTH_REQUIRED, "content-length required")
    } else if rejection.find::<warp::reject::MethodNotAllowed>().is_some() {
        (StatusCode::METHOD_NOT_ALLOWED, "method not allowed")
    } else {
        error!(?rejection, "unhandled rejection");
        (StatusCode::INTERNAL_SERVER_ERROR, "internal error")
    };

    Ok(error_response(status, message))
}

/// An empty body counts as `{}`.
fn parse_body<T: DeserializeOwned + Default>(body: &[u8]) -> Result<T, RequestError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    serde_json::from_slice(body).map_err(|e| RequestError::InvalidBody(e.to_string()))
}

fn request_error(e: &RequestError) -> Response {
    warn!(error = %e, "request rejected");
    let status = StatusCode::from_u16(e.status_code()).unwrap_or(StatusCode::BAD_REQUEST);
    error_response(status, &e.to_string())
}

fn error_response(status: StatusCode, message: &str) -> Response {
    with_cors(warp::reply::with_status(
        warp::reply::json(&ErrorBody { error: message }),
        status,
    ))
}

//! HTTP surface: `POST /scan-hosts`, `POST /scan-ports` and CORS preflight.
//!
//! Every response, errors included, carries permissive CORS headers. No
//! authentication or rate limiting happens here.

mod handlers;

use crate::api::ScanService;
use crate::error::{CliError, CliResult};
use std::convert::Infallible;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;
use warp::http::header::{
    ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN,
};
use warp::http::{HeaderValue, Method};
use warp::reply::Response;
use warp::{Filter, Reply};

/// Largest accepted request body.
const MAX_BODY_BYTES: u64 = 16 * 1024;

/// Build the complete route tree.
pub fn routes(
    service: Arc<ScanService>,
) -> impl Filter<Extract = (Response,), Error = Infallible> + Clone {
    let preflight = warp::method()
        .and_then(|method: Method| async move {
            if method == Method::OPTIONS {
                Ok(())
            } else {
                Err(warp::reject::not_found())
            }
        })
        .untuple_one()
        .map(|| with_cors(warp::reply()));

    let scan_hosts = warp::path("scan-hosts")
        .and(warp::path::end())
        .and(warp::post())
        .and(warp::body::content_length_limit(MAX_BODY_BYTES))
        .and(warp::body::bytes())
        .and(with_service(service.clone()))
        .and_then(handlers::scan_hosts);

    let scan_ports = warp::path("scan-ports")
        .and(warp::path::end())
        .and(warp::post())
        .and(warp::body::content_length_limit(MAX_BODY_BYTES))
        .and(warp::body::bytes())
        .and(with_service(service))
        .and_then(handlers::scan_ports);

    preflight
        .or(scan_hosts)
        .unify()
        .or(scan_ports)
        .unify()
        .recover(handlers::rejection)
        .unify()
}

/// Serve the routes on `addr` until `shutdown` resolves.
pub async fn serve<S>(service: Arc<ScanService>, addr: SocketAddr, shutdown: S) -> CliResult<()>
where
    S: Future<Output = ()> + Send + 'static,
{
    let (bound, server) = warp::serve(routes(service))
        .try_bind_with_graceful_shutdown(addr, shutdown)
        .map_err(|e| CliError::Server(e.to_string()))?;

    info!(addr = %bound, "listening");
    server.await;
    info!("server stopped");
    Ok(())
}

fn with_service(
    service: Arc<ScanService>,
) -> impl Filter<Extract = (Arc<ScanService>,), Error = Infallible> + Clone {
    warp::any().map(move || service.clone())
}

fn with_cors(reply: impl Reply) -> Response {
    let mut response = reply.into_response();
    let headers = response.headers_mut();
    headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    headers.insert(ACCESS_CONTROL_ALLOW_METHODS, HeaderValue::from_static("POST, OPTIONS"));
    headers.insert(ACCESS_CONTROL_ALLOW_HEADERS, HeaderValue::from_static("Content-Type"));
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::scanner::{LivenessProber, PingFacility, PingOutcome};
    use async_trait::async_trait;
    use std::net::IpAddr;
    use std::time::Duration;
    use tokio::net::TcpListener;
    use warp::hyper::body::Bytes;

    struct AlwaysUp;

    #[async_trait]
    impl PingFacility for AlwaysUp {
        async fn ping(&self, _addr: IpAddr, _wait: Duration) -> PingOutcome {
            PingOutcome::Ran {
                reachable: true,
                rtt: Some(Duration::from_millis(3)),
            }
        }
    }

    fn service() -> Arc<ScanService> {
        let settings = Settings::default();
        let prober = Arc::new(LivenessProber::with_facility(&settings, Arc::new(AlwaysUp)));
        Arc::new(ScanService::with_prober(settings, prober))
    }

    fn json_body(body: &[u8]) -> serde_json::Value {
        serde_json::from_slice(body).unwrap()
    }

    fn assert_cors(response: &warp::http::Response<Bytes>) {
        assert_eq!(response.headers()["access-control-allow-origin"], "*");
        assert_eq!(response.headers()["access-control-allow-methods"], "POST, OPTIONS");
        assert_eq!(response.headers()["access-control-allow-headers"], "Content-Type");
    }

    #[tokio::test]
    async fn test_preflight() {
        let response = warp::test::request()
            .method("OPTIONS")
            .path("/scan-ports")
            .reply(&routes(service()))
            .await;

        assert_eq!(response.status(), 200);
        assert!(response.body().is_empty());
        assert_cors(&response);
    }

    #[tokio::test]
    async fn test_scan_hosts_success() {
        let response = warp::test::request()
            .method("POST")
            .path("/scan-hosts")
            .json(&serde_json::json!({"ipRange": "10.1.1.1-10.1.1.3", "batchSize": 2}))
            .reply(&routes(service()))
            .await;

        assert_eq!(response.status(), 200);
        assert_cors(&response);
        let body = json_body(response.body());
        assert_eq!(body["success"], true);
        assert_eq!(body["method"], "icmp");
        assert_eq!(body["totalHosts"], 3);
        assert_eq!(body["activeHosts"], 3);
        assert_eq!(body["results"][0]["address"], "10.1.1.1");
        assert_eq!(body["results"][2]["address"], "10.1.1.3");
        assert_eq!(body["results"][1]["responseTimeMs"], 3);
    }

    #[tokio::test]
    async fn test_scan_hosts_validation_error() {
        let response = warp::test::request()
            .method("POST")
            .path("/scan-hosts")
            .json(&serde_json::json!({"target": "192.168.0.0/16"}))
            .reply(&routes(service()))
            .await;

        assert_eq!(response.status(), 400);
        assert_cors(&response);
        let body = json_body(response.body());
        assert!(body["error"].as_str().unwrap().contains("/16"));

        let response = warp::test::request()
            .method("POST")
            .path("/scan-hosts")
            .json(&serde_json::json!({"ipRange": "10.1.1.3-10.1.1.1"}))
            .reply(&routes(service()))
            .await;
        assert_eq!(response.status(), 400);

        let response = warp::test::request()
            .method("POST")
            .path("/scan-hosts")
            .body("")
            .reply(&routes(service()))
            .await;
        assert_eq!(response.status(), 400);
        assert!(json_body(response.body())["error"]
            .as_str()
            .unwrap()
            .starts_with("missing target"));
    }

    #[tokio::test]
    async fn test_malformed_json() {
        let response = warp::test::request()
            .method("POST")
            .path("/scan-ports")
            .body("{not json")
            .reply(&routes(service()))
            .await;

        assert_eq!(response.status(), 400);
        assert!(json_body(response.body())["error"]
            .as_str()
            .unwrap()
            .starts_with("invalid request body"));
    }

    #[tokio::test]
    async fn test_scan_ports_success() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let open = listener.local_addr().unwrap().port();

        let response = warp::test::request()
            .method("POST")
            .path("/scan-ports")
            .json(&serde_json::json!({
                "ip": "127.0.0.1",
                "preset": "custom",
                "ports": open.to_string(),
                "timeout": 2000
            }))
            .reply(&routes(service()))
            .await;

        assert_eq!(response.status(), 200);
        assert_cors(&response);
        let body = json_body(response.body());
        assert_eq!(body["ip"], "127.0.0.1");
        assert_eq!(body["openCount"], 1);
        assert_eq!(body["closedCount"], 0);
        assert_eq!(body["ports"][0]["port"], open);
        assert_eq!(body["ports"][0]["status"], "open");
    }

    #[tokio::test]
    async fn test_scan_ports_missing_ip() {
        let response = warp::test::request()
            .method("POST")
            .path("/scan-ports")
            .json(&serde_json::json!({"preset": "web"}))
            .reply(&routes(service()))
            .await;

        assert_eq!(response.status(), 400);
        assert_eq!(json_body(response.body())["error"], "missing 'ip' field");
    }

    #[tokio::test]
    async fn test_unknown_route_and_method() {
        let response = warp::test::request()
            .method("POST")
            .path("/nope")
            .body("{}")
            .reply(&routes(service()))
            .await;
        assert_eq!(response.status(), 404);
        assert_cors(&response);

        let response = warp::test::request()
            .method("GET")
            .path("/scan-hosts")
            .reply(&routes(service()))
            .await;
        assert_eq!(response.status(), 405);
    }

    #[tokio::test]
    async fn test_wrong_method_on_unknown_path_is_not_found() {
        for method in ["GET", "DELETE"] {
            let response = warp::test::request()
                .method(method)
                .path("/unknown-path")
                .reply(&routes(service()))
                .await;
            assert_eq!(response.status(), 404, "{method}");
            assert_cors(&response);
        }
    }
}

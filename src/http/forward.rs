//! Forwarding resolved requests to instances.
//!
//! # Responsibilities
//! - POST the re-encoded payload to `base + path`
//! - Copy inbound headers onto the outbound request
//! - Bound every forward with the request timeout
//! - Relay a successful response untouched
//!
//! # Design Decisions
//! - Framing headers (`content-length`, `transfer-encoding`) describe the
//!   inbound body, not the re-encoded one, so they are recomputed
//! - No retries: a failed forward is reported to the caller
//! - Non-2xx instance responses are surfaced as errors, body dropped

use axum::body::Body;
use axum::http::{header, HeaderMap, HeaderValue, Method, Request, Response, Uri};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use std::time::Duration;
use url::Url;

use crate::config::TimeoutConfig;
use crate::http::error::RouteError;
use crate::versions::Version;

/// HTTP client used to reach instances.
#[derive(Clone)]
pub struct Forwarder {
    client: Client<HttpConnector, Body>,
    timeout: Duration,
}

impl Forwarder {
    pub fn new(timeouts: &TimeoutConfig) -> Self {
        let mut connector = HttpConnector::new();
        connector.set_connect_timeout(Some(Duration::from_secs(timeouts.connect_secs)));
        connector.set_nodelay(true);

        let client = Client::builder(TokioExecutor::new()).build(connector);
        Self {
            client,
            timeout: Duration::from_secs(timeouts.request_secs),
        }
    }

    /// Send `body` to the instance at `base`, on the same path as `uri`.
    pub async fn forward(
        &self,
        version: &Version,
        base: &Url,
        uri: &Uri,
        headers: &HeaderMap,
        body: Vec<u8>,
    ) -> Result<Response<Body>, RouteError> {
        let target = upstream_uri(base, uri).ok_or_else(|| RouteError::Target(version.clone()))?;

        let mut builder = Request::builder().method(Method::POST).uri(target);
        if let Some(out) = builder.headers_mut() {
            for (name, value) in headers {
                if *name == header::CONTENT_LENGTH || *name == header::TRANSFER_ENCODING {
                    continue;
                }
                out.append(name.clone(), value.clone());
            }
            out.insert(header::CONTENT_LENGTH, HeaderValue::from(body.len()));
        }
        let request = builder
            .body(Body::from(body))
            .map_err(|_| RouteError::Target(version.clone()))?;

        let response = match tokio::time::timeout(self.timeout, self.client.request(request)).await {
            Ok(Ok(response)) => response,
            Ok(Err(source)) => {
                return Err(RouteError::UpstreamUnavailable {
                    version: version.clone(),
                    source,
                })
            }
            Err(_) => {
                return Err(RouteError::UpstreamTimeout {
                    version: version.clone(),
                    timeout: self.timeout,
                })
            }
        };

        let status = response.status();
        if !status.is_success() {
            return Err(RouteError::UpstreamStatus {
                version: version.clone(),
                status,
            });
        }

        let (parts, body) = response.into_parts();
        Ok(Response::from_parts(parts, Body::new(body)))
    }
}

/// `base` with the path and query of the inbound `uri`.
fn upstream_uri(base: &Url, uri: &Uri) -> Option<Uri> {
    let path = uri.path_and_query().map(|pq| pq.as_str()).unwrap_or("/");
    let joined = base.join(path).ok()?;
    joined.as_str().parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::versions::local_base;

    #[test]
    fn test_upstream_uri_keeps_path_and_query() {
        let base = local_base(8082);
        let uri: Uri = "/getnodebootstrapdata?debug=1".parse().unwrap();
        assert_eq!(
            upstream_uri(&base, &uri).unwrap().to_string(),
            "http://localhost:8082/getnodebootstrapdata?debug=1"
        );

        let uri: Uri = "http://router.example:8080/getdistrosigimageconfig".parse().unwrap();
        assert_eq!(
            upstream_uri(&base, &uri).unwrap().to_string(),
            "http://localhost:8082/getdistrosigimageconfig"
        );
    }
}

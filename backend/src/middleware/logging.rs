use axum::{
    body::{to_bytes, Body, Bytes},
    http::{header::CONTENT_LENGTH, Request},
    middleware::Next,
    response::Response,
    Error as AxumError,
};
use std::time::Instant;

use super::request_id::RequestId;

const MAX_BUFFERED_BODY_BYTES: usize = 64 * 1024;
const MAX_LOGGED_BODY_BYTES: usize = 2048;

/// Logs every 4xx/5xx response with a preview of its body.
///
/// The body is buffered and forwarded unchanged.
pub async fn log_error_responses(req: Request<Body>, next: Next) -> Response {
    let context = RequestContext {
        method: req.method().to_string(),
        uri: req.uri().to_string(),
        request_id: req
            .extensions()
            .get::<RequestId>()
            .map(|id| id.0.clone())
            .unwrap_or_default(),
    };
    let start = Instant::now();

    let response = next.run(req).await;
    let status = response.status();

    if !(status.is_client_error() || status.is_server_error()) {
        return response;
    }

    let latency = start.elapsed();
    let (mut parts, body) = response.into_parts();
    match buffer_body(body).await {
        Ok((bytes, truncated_preview)) => {
            log_error_event(
                status.as_u16(),
                &context,
                latency.as_millis() as u64,
                &truncated_preview,
                None,
            );

            Response::from_parts(parts, Body::from(bytes))
        }
        Err(err) => {
            parts.headers.remove(CONTENT_LENGTH);
            log_error_event(
                status.as_u16(),
                &context,
                latency.as_millis() as u64,
                "",
                Some(err),
            );
            Response::from_parts(parts, Body::empty())
        }
    }
}

async fn buffer_body(body: Body) -> Result<(Bytes, String), AxumError> {
    let bytes = to_bytes(body, MAX_BUFFERED_BODY_BYTES).await?;
    let preview = if bytes.len() > MAX_LOGGED_BODY_BYTES {
        let slice = bytes.slice(0..MAX_LOGGED_BODY_BYTES);
        format!(
            "{}... (truncated, {} bytes total)",
            String::from_utf8_lossy(&slice),
            bytes.len()
        )
    } else {
        String::from_utf8_lossy(&bytes).to_string()
    };
    Ok((bytes, preview))
}

struct RequestContext {
    method: String,
    uri: String,
    request_id: String,
}

fn log_error_event(
    status: u16,
    ctx: &RequestContext,
    latency_ms: u64,
    body_preview: &str,
    body_error: Option<AxumError>,
) {
    let method = ctx.method.as_str();
    let uri = ctx.uri.as_str();
    let request_id = ctx.request_id.as_str();

    if let Some(err) = body_error {
        if status >= 500 {
            tracing::error!(
                status,
                method,
                uri,
                request_id,
                latency_ms,
                error = ?err,
                "Failed to read error response body"
            );
        } else {
            tracing::warn!(
                status,
                method,
                uri,
                request_id,
                latency_ms,
                error = ?err,
                "Failed to read error response body"
            );
        }
        return;
    }

    if status >= 500 {
        tracing::error!(
            status,
            method,
            uri,
            request_id,
            latency_ms,
            body = body_preview,
            "Request completed with error status"
        );
    } else {
        tracing::warn!(
            status,
            method,
            uri,
            request_id,
            latency_ms,
            body = body_preview,
            "Request completed with error status"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn buffer_body_truncates_long_previews() {
        let body = Body::from("x".repeat(MAX_LOGGED_BODY_BYTES + 10));
        let (bytes, preview) = buffer_body(body).await.expect("buffer");
        assert_eq!(bytes.len(), MAX_LOGGED_BODY_BYTES + 10);
        assert!(preview.ends_with(&format!("(truncated, {} bytes total)", bytes.len())));
    }

    #[tokio::test]
    async fn buffer_body_keeps_short_bodies_whole() {
        let (bytes, preview) = buffer_body(Body::from("{\"error\":\"x\"}"))
            .await
            .expect("buffer");
        assert_eq!(&bytes[..], b"{\"error\":\"x\"}");
        assert_eq!(preview, "{\"error\":\"x\"}");
    }
}

use axum::{
    body::Body,
    extract::{ConnectInfo, FromRequestParts, State},
    http::{Method, Request},
    middleware::Next,
    response::Response,
};
use axum_extra::{TypedHeader, headers::UserAgent};
use std::{net::SocketAddr, time::Instant};

use crate::auth::claims::AuthUser;
use crate::state::AppState;

/// Request log line, written once the response is ready.
///
/// Records method, path, client ip, the caller's user id (`0` when the
/// request carries no valid token), user agent, response status and latency.
/// CORS preflight requests are passed through unlogged.
///
/// ```ignore
/// let app = Router::new().layer(from_fn_with_state(state, log_request));
/// ```
pub async fn log_request(State(state): State<AppState>, req: Request<Body>, next: Next) -> Response {
    if req.method() == Method::OPTIONS {
        return next.run(req).await;
    }

    let (mut parts, body) = req.into_parts();
    let method = parts.method.clone();
    let path = parts.uri.path().to_owned();

    let ip = parts
        .extensions
        .get::<ConnectInfo<SocketAddr>>()
        .map_or_else(|| "unknown".to_string(), |ConnectInfo(addr)| addr.ip().to_string());

    let user = AuthUser::from_request_parts(&mut parts, &state)
        .await
        .map_or(0, |AuthUser(claims)| claims.sub);

    let user_agent = TypedHeader::<UserAgent>::from_request_parts(&mut parts, &state)
        .await
        .map_or_else(|_| "unknown".to_string(), |TypedHeader(ua)| ua.to_string());

    let started = Instant::now();
    let response = next.run(Request::from_parts(parts, body)).await;
    let status = response.status();

    tracing::info!(
        %method,
        path = %path,
        ip = %ip,
        user,
        user_agent = %user_agent,
        status = status.as_u16(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Handled request"
    );

    response
}

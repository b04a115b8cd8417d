//! Role guards, applied with `from_fn_with_state` on route groups.
//!
//! Each guard authenticates the request, checks the role carried in the
//! token and inserts the [`AuthUser`] into the request extensions for the
//! handlers downstream.

use axum::{
    body::Body,
    extract::{FromRequestParts, State},
    http::Request,
    middleware::Next,
    response::Response,
};
use db::models::user::Role;
use services::error::AppError;

use crate::auth::claims::AuthUser;
use crate::response::ApiError;
use crate::state::AppState;

async fn authenticate(
    state: &AppState,
    req: Request<Body>,
) -> Result<(Request<Body>, AuthUser), ApiError> {
    let (mut parts, body) = req.into_parts();
    let user = AuthUser::from_request_parts(&mut parts, state).await?;

    let mut req = Request::from_parts(parts, body);
    req.extensions_mut().insert(user.clone());
    Ok((req, user))
}

async fn allow_role(
    state: &AppState,
    req: Request<Body>,
    next: Next,
    role: Role,
    failure_msg: &str,
) -> Result<Response, ApiError> {
    let (req, user) = authenticate(state, req).await?;

    if user.0.role != role {
        tracing::warn!(user = user.0.sub, role = %user.0.role, required = %role, "Role check failed");
        return Err(AppError::forbidden(failure_msg).into());
    }

    Ok(next.run(req).await)
}

/// Any valid token.
pub async fn allow_authenticated(
    State(state): State<AppState>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let (req, _user) = authenticate(&state, req).await?;
    Ok(next.run(req).await)
}

pub async fn allow_teacher(
    State(state): State<AppState>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, ApiError> {
    allow_role(&state, req, next, Role::Teacher, "Teacher access required").await
}

pub async fn allow_student(
    State(state): State<AppState>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, ApiError> {
    allow_role(&state, req, next, Role::Student, "Student access required").await
}

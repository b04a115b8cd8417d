use db::models::user::Role;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// User id.
    pub sub: i64,
    pub role: Role,
    pub exp: usize,
}

#[derive(Debug, Clone)]
pub struct AuthUser(pub Claims);

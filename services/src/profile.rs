//! Identity lookups behind token verification, `/me` and device registration.

use db::models::{
    class::{self, Department, Semester},
    student, teacher,
    user::{self, Gender, Role},
};
use sea_orm::DatabaseConnection;
use serde::Serialize;

use crate::error::AppError;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub department: Department,
    pub role: Role,
    pub gender: Gender,
}

impl From<user::Model> for UserSummary {
    fn from(u: user::Model) -> Self {
        Self {
            id: u.id,
            name: u.name,
            email: u.email,
            department: u.department,
            role: u.role,
            gender: u.gender,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassInfo {
    pub id: i64,
    pub code: String,
    pub branch: Department,
    pub semester: Semester,
}

/// Role-specific profile. Teacher and student fields are omitted for other roles.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    #[serde(flatten)]
    pub user: UserSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub teacher_id_no: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reg_no: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class: Option<ClassInfo>,
}

async fn load_user(db: &DatabaseConnection, user_id: i64) -> Result<user::Model, AppError> {
    user::Model::find_by_id(db, user_id)
        .await?
        .ok_or_else(|| AppError::not_found("User not found"))
}

pub async fn summary(db: &DatabaseConnection, user_id: i64) -> Result<UserSummary, AppError> {
    Ok(load_user(db, user_id).await?.into())
}

pub async fn profile(db: &DatabaseConnection, user_id: i64) -> Result<Profile, AppError> {
    let user = load_user(db, user_id).await?;
    let role = user.role;
    let mut profile = Profile {
        user: user.into(),
        teacher_id_no: None,
        reg_no: None,
        year: None,
        class: None,
    };

    match role {
        Role::Teacher => {
            let t = teacher::Model::find_by_id(db, user_id)
                .await?
                .ok_or_else(|| AppError::not_found("Teacher profile not found"))?;
            profile.teacher_id_no = Some(t.teacher_id_no);
        }
        Role::Student => {
            let s = student::Model::find_by_id(db, user_id)
                .await?
                .ok_or_else(|| AppError::not_found("Student profile not found"))?;
            let c = class::Model::find_by_id(db, s.class_id)
                .await?
                .ok_or_else(|| AppError::not_found("Class not found"))?;
            profile.reg_no = Some(s.reg_no);
            profile.year = Some(s.year);
            profile.class = Some(ClassInfo {
                id: c.id,
                code: c.code,
                branch: c.branch,
                semester: c.semester,
            });
        }
        Role::Admin => {}
    }

    Ok(profile)
}

/// Stores (or clears, when blank) the push token for the user's device.
pub async fn set_device_token(
    db: &DatabaseConnection,
    user_id: i64,
    token: Option<&str>,
) -> Result<(), AppError> {
    load_user(db, user_id).await?;
    let token = token.map(str::trim).filter(|t| !t.is_empty());
    user::Model::set_fcm_token(db, user_id, token).await?;
    tracing::info!(user_id, registered = token.is_some(), "Device token updated");
    Ok(())
}

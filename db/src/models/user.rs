use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveModelTrait, ActiveValue::Set, DbErr, EntityTrait, QueryFilter};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Represents a user in the `users` table.
///
/// Teachers and students share this row; their role-specific data lives in
/// `teachers` / `students`, keyed by the same id.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    /// Primary key ID (auto-incremented).
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Display name.
    pub name: String,
    /// Unique, lower-cased email address used for OTP login.
    pub email: String,
    pub role: Role,
    pub gender: Gender,
    pub department: Department,
    /// Push device token, if the user has registered a device.
    #[serde(skip_serializing)]
    pub fcm_token: Option<String>,
    /// Pending login OTP.
    #[serde(skip_serializing)]
    pub otp: Option<String>,
    #[serde(skip_serializing)]
    pub otp_expiry: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Application-wide role carried in issued tokens.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[sea_orm(rs_type = "String", db_type = "Text")]
pub enum Role {
    #[sea_orm(string_value = "admin")]
    Admin,
    #[sea_orm(string_value = "teacher")]
    Teacher,
    #[sea_orm(string_value = "student")]
    Student,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[sea_orm(rs_type = "String", db_type = "Text")]
pub enum Gender {
    #[sea_orm(string_value = "male")]
    Male,
    #[sea_orm(string_value = "female")]
    Female,
    #[sea_orm(string_value = "other")]
    Other,
}

/// Academic department; also used as the `branch` of a class.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    EnumIter,
    DeriveActiveEnum,
    Display,
    EnumString,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
#[sea_orm(rs_type = "String", db_type = "Text")]
pub enum Department {
    #[sea_orm(string_value = "CSE")]
    Cse,
    #[sea_orm(string_value = "ECE")]
    Ece,
    #[sea_orm(string_value = "EEE")]
    Eee,
    #[sea_orm(string_value = "ME")]
    Me,
    #[sea_orm(string_value = "CE")]
    Ce,
    #[sea_orm(string_value = "IT")]
    It,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_one = "super::student::Entity")]
    Student,
    #[sea_orm(has_one = "super::teacher::Entity")]
    Teacher,
    #[sea_orm(has_many = "super::notification::Entity")]
    Notifications,
}

impl Related<super::student::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Student.def()
    }
}

impl Related<super::teacher::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Teacher.def()
    }
}

impl Related<super::notification::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Notifications.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub async fn create(
        db: &DbConn,
        name: &str,
        email: &str,
        role: Role,
        gender: Gender,
        department: Department,
    ) -> Result<Model, DbErr> {
        let now = Utc::now();
        let user = ActiveModel {
            name: Set(name.to_owned()),
            email: Set(email.trim().to_lowercase()),
            role: Set(role),
            gender: Set(gender),
            department: Set(department),
            fcm_token: Set(None),
            otp: Set(None),
            otp_expiry: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        user.insert(db).await
    }

    pub async fn find_by_id(db: &DbConn, id: i64) -> Result<Option<Model>, DbErr> {
        Entity::find_by_id(id).one(db).await
    }

    pub async fn find_by_ids(db: &DbConn, ids: Vec<i64>) -> Result<Vec<Model>, DbErr> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        Entity::find().filter(Column::Id.is_in(ids)).all(db).await
    }

    /// Case-insensitive lookup; emails are stored lower-cased.
    pub async fn find_by_email(db: &DbConn, email: &str) -> Result<Option<Model>, DbErr> {
        Entity::find()
            .filter(Column::Email.eq(email.trim().to_lowercase()))
            .one(db)
            .await
    }

    pub async fn set_otp(
        db: &DbConn,
        id: i64,
        otp: &str,
        expiry: DateTime<Utc>,
    ) -> Result<Model, DbErr> {
        ActiveModel {
            id: Set(id),
            otp: Set(Some(otp.to_owned())),
            otp_expiry: Set(Some(expiry)),
            updated_at: Set(Utc::now()),
            ..Default::default()
        }
        .update(db)
        .await
    }

    pub async fn clear_otp(db: &DbConn, id: i64) -> Result<Model, DbErr> {
        ActiveModel {
            id: Set(id),
            otp: Set(None),
            otp_expiry: Set(None),
            updated_at: Set(Utc::now()),
            ..Default::default()
        }
        .update(db)
        .await
    }

    pub async fn set_fcm_token(db: &DbConn, id: i64, token: Option<&str>) -> Result<Model, DbErr> {
        ActiveModel {
            id: Set(id),
            fcm_token: Set(token.map(str::to_owned)),
            updated_at: Set(Utc::now()),
            ..Default::default()
        }
        .update(db)
        .await
    }

    /// `true` if `candidate` matches the stored OTP and it has not expired at `now`.
    pub fn otp_matches(&self, candidate: &str, now: DateTime<Utc>) -> bool {
        match (&self.otp, self.otp_expiry) {
            (Some(otp), Some(expiry)) => otp == candidate.trim() && expiry >= now,
            _ => false,
        }
    }
}

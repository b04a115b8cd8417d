use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, DbErr, EntityTrait, FromJsonQueryResult, QueryFilter,
    QueryOrder,
};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Durable attendance record.
///
/// Written once (all absent) when a session starts and overwritten once with
/// the final status map when the session is finalized.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "attendance_records")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub class_id: i64,
    pub subject_id: i64,
    pub teacher_id: i64,
    pub teacher_latitude: f64,
    pub teacher_longitude: f64,
    /// Calendar day the session was held on.
    pub date: DateTime<Utc>,
    pub session_start: DateTime<Utc>,
    /// Declared end of the check-in window. Informational only.
    pub session_end: DateTime<Utc>,
    #[sea_orm(column_type = "Json")]
    pub student_records: StudentRecords,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Student identifier as used in the status map (the student's user id).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StudentId(pub i64);

impl fmt::Display for StudentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for StudentId {
    fn from(id: i64) -> Self {
        StudentId(id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum AttendanceStatus {
    #[serde(alias = "Present", alias = "PRESENT")]
    Present,
    #[serde(alias = "Absent", alias = "ABSENT")]
    Absent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentRecord {
    pub status: AttendanceStatus,
}

impl StudentRecord {
    pub fn new(status: AttendanceStatus) -> Self {
        Self { status }
    }
}

/// Per-student status map stored as a JSON object keyed by student id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult)]
#[serde(transparent)]
pub struct StudentRecords(pub BTreeMap<StudentId, StudentRecord>);

impl StudentRecords {
    /// Every listed student marked absent.
    pub fn all_absent<I>(students: I) -> Self
    where
        I: IntoIterator<Item = i64>,
    {
        Self(
            students
                .into_iter()
                .map(|id| (StudentId(id), StudentRecord::new(AttendanceStatus::Absent)))
                .collect(),
        )
    }

    pub fn status_of(&self, student_id: i64) -> Option<AttendanceStatus> {
        self.0.get(&StudentId(student_id)).map(|r| r.status)
    }

    pub fn contains(&self, student_id: i64) -> bool {
        self.0.contains_key(&StudentId(student_id))
    }

    /// Sets the status of an enrolled student. Returns `false` if the student is not in the map.
    pub fn set(&mut self, student_id: i64, status: AttendanceStatus) -> bool {
        match self.0.get_mut(&StudentId(student_id)) {
            Some(record) => {
                record.status = status;
                true
            }
            None => false,
        }
    }

    /// Applies teacher overrides. Ids outside the roster are ignored.
    pub fn merge_overrides<I>(&mut self, overrides: I)
    where
        I: IntoIterator<Item = (i64, AttendanceStatus)>,
    {
        for (student_id, status) in overrides {
            self.set(student_id, status);
        }
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn present_count(&self) -> usize {
        self.0
            .values()
            .filter(|r| r.status == AttendanceStatus::Present)
            .count()
    }

    pub fn absent_count(&self) -> usize {
        self.len() - self.present_count()
    }

    pub fn student_ids(&self) -> Vec<i64> {
        self.0.keys().map(|id| id.0).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (i64, AttendanceStatus)> + '_ {
        self.0.iter().map(|(id, r)| (id.0, r.status))
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::class::Entity",
        from = "Column::ClassId",
        to = "super::class::Column::Id",
        on_delete = "Cascade"
    )]
    Class,
    #[sea_orm(
        belongs_to = "super::subject::Entity",
        from = "Column::SubjectId",
        to = "super::subject::Column::Id",
        on_delete = "Cascade"
    )]
    Subject,
    #[sea_orm(
        belongs_to = "super::teacher::Entity",
        from = "Column::TeacherId",
        to = "super::teacher::Column::Id",
        on_delete = "Cascade"
    )]
    Teacher,
}

impl Related<super::class::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Class.def()
    }
}

impl Related<super::subject::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Subject.def()
    }
}

impl Related<super::teacher::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Teacher.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Values needed to open a new record.
#[derive(Debug, Clone)]
pub struct NewAttendanceRecord {
    pub class_id: i64,
    pub subject_id: i64,
    pub teacher_id: i64,
    pub teacher_latitude: f64,
    pub teacher_longitude: f64,
    pub session_start: DateTime<Utc>,
    pub session_end: DateTime<Utc>,
    pub student_records: StudentRecords,
}

impl Model {
    pub async fn create(db: &DbConn, new: NewAttendanceRecord) -> Result<Model, DbErr> {
        let now = Utc::now();
        ActiveModel {
            class_id: Set(new.class_id),
            subject_id: Set(new.subject_id),
            teacher_id: Set(new.teacher_id),
            teacher_latitude: Set(new.teacher_latitude),
            teacher_longitude: Set(new.teacher_longitude),
            date: Set(new.session_start),
            session_start: Set(new.session_start),
            session_end: Set(new.session_end),
            student_records: Set(new.student_records),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(db)
        .await
    }

    pub async fn find_by_id(db: &DbConn, id: i64) -> Result<Option<Model>, DbErr> {
        Entity::find_by_id(id).one(db).await
    }

    /// Replaces the stored status map with the finalized one.
    pub async fn overwrite_records(
        db: &DbConn,
        id: i64,
        records: StudentRecords,
    ) -> Result<Model, DbErr> {
        ActiveModel {
            id: Set(id),
            student_records: Set(records),
            updated_at: Set(Utc::now()),
            ..Default::default()
        }
        .update(db)
        .await
    }

    /// All records taken by a teacher, newest first.
    pub async fn for_teacher(db: &DbConn, teacher_id: i64) -> Result<Vec<Model>, DbErr> {
        Entity::find()
            .filter(Column::TeacherId.eq(teacher_id))
            .order_by_desc(Column::SessionStart)
            .all(db)
            .await
    }

    /// A teacher's records for one subject, oldest first.
    pub async fn for_teacher_subject(
        db: &DbConn,
        teacher_id: i64,
        subject_id: i64,
    ) -> Result<Vec<Model>, DbErr> {
        Entity::find()
            .filter(Column::TeacherId.eq(teacher_id))
            .filter(Column::SubjectId.eq(subject_id))
            .order_by_asc(Column::SessionStart)
            .all(db)
            .await
    }

    /// All records of a class, newest first.
    pub async fn for_class(db: &DbConn, class_id: i64) -> Result<Vec<Model>, DbErr> {
        Entity::find()
            .filter(Column::ClassId.eq(class_id))
            .order_by_desc(Column::SessionStart)
            .all(db)
            .await
    }

    /// Records of a class whose declared end lies after `now`, newest first.
    pub async fn open_for_class(
        db: &DbConn,
        class_id: i64,
        now: DateTime<Utc>,
    ) -> Result<Vec<Model>, DbErr> {
        Entity::find()
            .filter(Column::ClassId.eq(class_id))
            .filter(Column::SessionEnd.gt(now))
            .order_by_desc(Column::SessionStart)
            .all(db)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{class, subject, teacher, user};
    use crate::test_utils::setup_test_db;
    use chrono::Duration;

    #[test]
    fn status_map_serializes_as_keyed_object() {
        let mut records = StudentRecords::all_absent([7, 3]);
        assert!(records.set(7, AttendanceStatus::Present));
        assert!(!records.set(99, AttendanceStatus::Present));

        let json = serde_json::to_value(&records).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "3": { "status": "absent" }, "7": { "status": "present" } })
        );

        let back: StudentRecords = serde_json::from_value(json).unwrap();
        assert_eq!(back, records);
    }

    #[test]
    fn unknown_status_is_rejected() {
        let bad = serde_json::json!({ "1": { "status": "late" } });
        assert!(serde_json::from_value::<StudentRecords>(bad).is_err());
    }

    #[test]
    fn overrides_only_touch_roster() {
        let mut records = StudentRecords::all_absent([1, 2]);
        records.merge_overrides([(2, AttendanceStatus::Present), (5, AttendanceStatus::Present)]);
        assert_eq!(records.len(), 2);
        assert_eq!(records.present_count(), 1);
        assert_eq!(records.absent_count(), 1);
        assert!(!records.contains(5));
    }

    #[tokio::test]
    async fn create_and_overwrite_round_trip_through_json_column() {
        let db = setup_test_db().await;
        let t = user::Model::create(
            &db,
            "Prof",
            "prof@test.com",
            user::Role::Teacher,
            user::Gender::Male,
            user::Department::Cse,
        )
        .await
        .unwrap();
        teacher::Model::create(&db, t.id, "T001").await.unwrap();
        let class = class::Model::create(&db, "CSE-III", user::Department::Cse, class::Semester::III)
            .await
            .unwrap();
        let subject = subject::Model::create(&db, "CS301", "Operating Systems")
            .await
            .unwrap();

        let start = Utc::now();
        let record = Model::create(
            &db,
            NewAttendanceRecord {
                class_id: class.id,
                subject_id: subject.id,
                teacher_id: t.id,
                teacher_latitude: 12.9716,
                teacher_longitude: 77.5946,
                session_start: start,
                session_end: start + Duration::seconds(180),
                student_records: StudentRecords::all_absent([10, 11]),
            },
        )
        .await
        .unwrap();
        assert_eq!(record.student_records.absent_count(), 2);

        let open = Model::open_for_class(&db, class.id, start).await.unwrap();
        assert_eq!(open.len(), 1);
        let closed = Model::open_for_class(&db, class.id, start + Duration::seconds(181))
            .await
            .unwrap();
        assert!(closed.is_empty());

        let mut finalized = record.student_records.clone();
        finalized.set(10, AttendanceStatus::Present);
        Model::overwrite_records(&db, record.id, finalized.clone())
            .await
            .unwrap();

        let stored = Model::find_by_id(&db, record.id).await.unwrap().unwrap();
        assert_eq!(stored.student_records, finalized);
        assert_eq!(stored.teacher_latitude, 12.9716);
    }
}

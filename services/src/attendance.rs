//! Attendance session lifecycle: start, check-in, live roster, finalize, and
//! the student's view of the currently open session.
//!
//! The durable record is written at start (all absent) and overwritten once at
//! finalize. Everything in between lives in the [`SessionStore`].

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use db::models::{
    attendance_record::{self, AttendanceStatus, NewAttendanceRecord, StudentRecords},
    class::{self, Department, Semester},
    student, subject, teacher, teacher_class, user,
};
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};
use util::{config::AppConfig, geo};

use crate::error::AppError;
use crate::notifications::Notifier;
use crate::session_store::{CachedSession, MarkOutcome, SessionStore};

/// Geofence radius and declared session length.
#[derive(Debug, Clone, Copy)]
pub struct SessionPolicy {
    pub radius_km: f64,
    pub duration: Duration,
}

impl Default for SessionPolicy {
    fn default() -> Self {
        Self {
            radius_km: 1.0,
            duration: Duration::seconds(180),
        }
    }
}

impl SessionPolicy {
    pub fn from_config() -> Self {
        let cfg = AppConfig::global();
        Self {
            radius_km: cfg.geofence_radius_km,
            duration: Duration::seconds(cfg.session_duration_seconds as i64),
        }
    }
}

#[derive(Debug, Clone)]
pub struct StartSession {
    pub branch: Department,
    pub semester: Semester,
    pub subject_name: String,
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterEntry {
    pub student_id: i64,
    pub reg_no: String,
    pub name: String,
    pub status: AttendanceStatus,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StartedSession {
    pub attendance_id: i64,
    pub session_start: DateTime<Utc>,
    pub session_end: DateTime<Utc>,
    pub students: Vec<RosterEntry>,
}

/// Teacher correction applied at finalize time.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusOverride {
    pub student_id: i64,
    pub status: AttendanceStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveSession {
    pub attendance_id: i64,
    pub teacher_name: String,
    pub branch: Department,
    pub semester: Semester,
    pub subject_name: String,
    pub ends_at: String,
}

fn session_not_found() -> AppError {
    AppError::not_found("Attendance session not found or already closed")
}

fn ensure_coordinates(latitude: f64, longitude: f64) -> Result<(), AppError> {
    if geo::valid_coordinates(latitude, longitude) {
        Ok(())
    } else {
        Err(AppError::invalid(
            "Latitude must be within [-90, 90] and longitude within [-180, 180]",
        ))
    }
}

pub fn format_end_time(end: DateTime<Utc>) -> String {
    end.format("%-d %B %Y, %I:%M:%S %p UTC").to_string()
}

#[derive(Clone)]
pub struct AttendanceService {
    db: DatabaseConnection,
    store: Arc<dyn SessionStore>,
    notifier: Notifier,
    policy: SessionPolicy,
}

impl AttendanceService {
    pub fn new(
        db: DatabaseConnection,
        store: Arc<dyn SessionStore>,
        notifier: Notifier,
        policy: SessionPolicy,
    ) -> Self {
        Self {
            db,
            store,
            notifier,
            policy,
        }
    }

    pub fn policy(&self) -> SessionPolicy {
        self.policy
    }

    /// Opens a session for the class the teacher teaches `subject_name` to.
    ///
    /// Every enrolled student starts absent. The durable record is written
    /// first and its id becomes the session id.
    pub async fn start_session(
        &self,
        teacher_id: i64,
        req: StartSession,
    ) -> Result<StartedSession, AppError> {
        ensure_coordinates(req.latitude, req.longitude)?;
        let subject_name = req.subject_name.trim();
        if subject_name.is_empty() {
            return Err(AppError::invalid("Subject name is required"));
        }

        teacher::Model::find_by_id(&self.db, teacher_id)
            .await?
            .ok_or_else(|| AppError::not_found("Teacher not found"))?;

        let classes = class::Model::find_by_branch_semester(&self.db, req.branch, req.semester).await?;
        let subjects = subject::Model::find_by_name(&self.db, subject_name).await?;

        let assignment = teacher_class::Model::find_assignment(
            &self.db,
            teacher_id,
            classes.iter().map(|c| c.id).collect(),
            subjects.iter().map(|s| s.id).collect(),
        )
        .await?
        .ok_or_else(|| AppError::not_found("No class found for this branch, semester and subject"))?;

        let roster = student::Model::roster_for_class(&self.db, assignment.class_id).await?;
        let student_records = StudentRecords::all_absent(roster.iter().map(|(s, _)| s.id));

        let session_start = Utc::now();
        let session_end = session_start + self.policy.duration;
        let record = attendance_record::Model::create(
            &self.db,
            NewAttendanceRecord {
                class_id: assignment.class_id,
                subject_id: assignment.subject_id,
                teacher_id,
                teacher_latitude: req.latitude,
                teacher_longitude: req.longitude,
                session_start,
                session_end,
                student_records: student_records.clone(),
            },
        )
        .await?;

        self.store
            .put(&CachedSession {
                attendance_id: record.id,
                teacher_id,
                teacher_latitude: req.latitude,
                teacher_longitude: req.longitude,
                student_records,
            })
            .await?;

        info!(
            attendance_id = record.id,
            teacher_id,
            class_id = assignment.class_id,
            subject_id = assignment.subject_id,
            students = roster.len(),
            "Attendance session started"
        );

        let users: Vec<user::Model> = roster.iter().map(|(_, u)| u.clone()).collect();
        self.notifier
            .session_started(record.id, subject_name, &users)
            .await;

        Ok(StartedSession {
            attendance_id: record.id,
            session_start,
            session_end,
            students: roster
                .into_iter()
                .map(|(s, u)| RosterEntry {
                    student_id: s.id,
                    reg_no: s.reg_no,
                    name: u.name,
                    status: AttendanceStatus::Absent,
                })
                .collect(),
        })
    }

    /// Marks the student present if they are within the geofence.
    ///
    /// The declared session end is not enforced: check-ins are accepted for as
    /// long as the session is cached. Repeat check-ins succeed silently.
    pub async fn check_in(
        &self,
        student_id: i64,
        attendance_id: i64,
        latitude: f64,
        longitude: f64,
    ) -> Result<(), AppError> {
        ensure_coordinates(latitude, longitude)?;

        student::Model::find_by_id(&self.db, student_id)
            .await?
            .ok_or_else(|| AppError::not_found("Student not found"))?;

        let session = self
            .store
            .get(attendance_id)
            .await?
            .ok_or_else(session_not_found)?;

        if !geo::is_within_radius(
            session.teacher_latitude,
            session.teacher_longitude,
            latitude,
            longitude,
            self.policy.radius_km,
        ) {
            let distance_km = geo::haversine_km(
                session.teacher_latitude,
                session.teacher_longitude,
                latitude,
                longitude,
            );
            warn!(attendance_id, student_id, distance_km, "Check-in rejected: outside geofence");
            return Err(AppError::OutOfRange);
        }

        match self
            .store
            .mark(attendance_id, student_id, AttendanceStatus::Present)
            .await?
        {
            MarkOutcome::Marked => {
                info!(attendance_id, student_id, "Student checked in");
                Ok(())
            }
            MarkOutcome::NotEnrolled => Err(AppError::not_found(
                "You are not enrolled in this attendance session",
            )),
            MarkOutcome::SessionMissing => Err(session_not_found()),
        }
    }

    /// Current state of an open session, for the owning teacher.
    pub async fn roster(&self, teacher_id: i64, attendance_id: i64) -> Result<Vec<RosterEntry>, AppError> {
        let session = self
            .store
            .get(attendance_id)
            .await?
            .ok_or_else(session_not_found)?;
        if session.teacher_id != teacher_id {
            return Err(AppError::forbidden("This attendance session belongs to another teacher"));
        }
        self.roster_entries(&session.student_records).await
    }

    /// Closes the session: applies overrides, persists the final map, drops
    /// the cache entry, and notifies every student of their outcome.
    ///
    /// If the durable write fails the cached session is put back untouched,
    /// so check-ins survive and the teacher can finalize again.
    pub async fn finalize(
        &self,
        teacher_id: i64,
        attendance_id: i64,
        overrides: Vec<StatusOverride>,
    ) -> Result<Vec<RosterEntry>, AppError> {
        let owner = self
            .store
            .get(attendance_id)
            .await?
            .ok_or_else(session_not_found)?
            .teacher_id;
        if owner != teacher_id {
            return Err(AppError::forbidden(
                "Only the teacher who started this session can finalize it",
            ));
        }

        // A concurrent finalize may have won between the ownership check and here.
        let taken = self
            .store
            .take(attendance_id)
            .await?
            .ok_or_else(session_not_found)?;

        let mut session = taken.clone();
        session
            .student_records
            .merge_overrides(overrides.into_iter().map(|o| (o.student_id, o.status)));

        let record = match attendance_record::Model::overwrite_records(
            &self.db,
            attendance_id,
            session.student_records.clone(),
        )
        .await
        {
            Ok(record) => record,
            Err(err) => {
                // The cached copy stays authoritative until the durable write lands.
                if let Err(restore_err) = self.store.put(&taken).await {
                    error!(attendance_id, error = %restore_err, "Failed to restore session after finalize error");
                }
                return Err(err.into());
            }
        };

        let subject_name = subject::Model::find_by_id(&self.db, record.subject_id)
            .await?
            .map(|s| s.name)
            .unwrap_or_default();

        info!(
            attendance_id,
            teacher_id,
            present = session.student_records.present_count(),
            absent = session.student_records.absent_count(),
            "Attendance session finalized"
        );

        self.notifier
            .session_finalized(&subject_name, record.date, &session.student_records)
            .await;

        self.roster_entries(&session.student_records).await
    }

    /// The newest open session of the student's class in which they are still absent.
    pub async fn active_session(&self, student_id: i64) -> Result<Option<ActiveSession>, AppError> {
        let student = student::Model::find_by_id(&self.db, student_id)
            .await?
            .ok_or_else(|| AppError::not_found("Student profile not found"))?;

        let open = attendance_record::Model::open_for_class(&self.db, student.class_id, Utc::now()).await?;

        for record in open {
            // The cache is authoritative while the session is open.
            let status = match self.store.get(record.id).await? {
                Some(cached) => cached.student_records.status_of(student.id),
                None => record.student_records.status_of(student.id),
            };
            if status != Some(AttendanceStatus::Absent) {
                continue;
            }

            let teacher_name = user::Model::find_by_id(&self.db, record.teacher_id)
                .await?
                .map(|u| u.name)
                .unwrap_or_default();
            let class = class::Model::find_by_id(&self.db, record.class_id)
                .await?
                .ok_or_else(|| AppError::not_found("Class not found"))?;
            let subject_name = subject::Model::find_by_id(&self.db, record.subject_id)
                .await?
                .map(|s| s.name)
                .unwrap_or_default();

            return Ok(Some(ActiveSession {
                attendance_id: record.id,
                teacher_name,
                branch: class.branch,
                semester: class.semester,
                subject_name,
                ends_at: format_end_time(record.session_end),
            }));
        }

        Ok(None)
    }

    async fn roster_entries(&self, records: &StudentRecords) -> Result<Vec<RosterEntry>, AppError> {
        let students = student::Model::with_users(&self.db, records.student_ids()).await?;
        Ok(students
            .into_iter()
            .filter_map(|(s, u)| {
                records.status_of(s.id).map(|status| RosterEntry {
                    student_id: s.id,
                    reg_no: s.reg_no,
                    name: u.name,
                    status,
                })
            })
            .collect())
    }
}

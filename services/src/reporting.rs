//! Read-only projections over durable attendance records.
//!
//! Reports never consult the session cache. A session that is still open
//! reads as it was written at start, every student absent, until it is
//! finalized; check-ins made so far only show up after finalize.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use chrono::{DateTime, Datelike, Utc};
use db::models::{
    attendance_record::{self, AttendanceStatus},
    class::{self, Department, Semester},
    student, subject, teacher, teacher_class, user,
};
use sea_orm::DatabaseConnection;
use serde::Serialize;

use crate::error::AppError;

pub fn format_time(t: DateTime<Utc>) -> String {
    t.format("%H:%M:%S").to_string()
}

pub fn format_date(t: DateTime<Utc>) -> String {
    t.format("%Y-%m-%d").to_string()
}

/// Percentage rounded to two decimals; zero when nothing was held.
pub fn percentage(present: u32, total: u32) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (present as f64 * 10_000.0 / total as f64).round() / 100.0
}

fn validate_month(month: u32) -> Result<(), AppError> {
    if (1..=12).contains(&month) {
        Ok(())
    } else {
        Err(AppError::invalid("Month must be between 1 and 12"))
    }
}

fn in_period(t: DateTime<Utc>, month: Option<u32>, year: Option<i32>) -> bool {
    month.is_none_or(|m| t.month() == m) && year.is_none_or(|y| t.year() == y)
}

async fn load_student(db: &DatabaseConnection, student_id: i64) -> Result<student::Model, AppError> {
    student::Model::find_by_id(db, student_id)
        .await?
        .ok_or_else(|| AppError::not_found("Student profile not found"))
}

async fn load_teacher(db: &DatabaseConnection, teacher_id: i64) -> Result<teacher::Model, AppError> {
    teacher::Model::find_by_id(db, teacher_id)
        .await?
        .ok_or_else(|| AppError::not_found("Teacher not found"))
}

async fn classes_by_id(
    db: &DatabaseConnection,
    ids: impl IntoIterator<Item = i64>,
) -> Result<HashMap<i64, class::Model>, AppError> {
    let ids: BTreeSet<i64> = ids.into_iter().collect();
    Ok(class::Model::find_by_ids(db, ids.into_iter().collect())
        .await?
        .into_iter()
        .map(|c| (c.id, c))
        .collect())
}

async fn subjects_by_id(
    db: &DatabaseConnection,
    ids: impl IntoIterator<Item = i64>,
) -> Result<HashMap<i64, subject::Model>, AppError> {
    let ids: BTreeSet<i64> = ids.into_iter().collect();
    Ok(subject::Model::find_by_ids(db, ids.into_iter().collect())
        .await?
        .into_iter()
        .map(|s| (s.id, s))
        .collect())
}

// --- Teacher subjects ---

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeacherSubject {
    pub name: String,
    pub code: String,
    pub branch: Department,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SemesterSubjects {
    /// e.g. `Sem III`
    pub semester: String,
    pub subjects: Vec<TeacherSubject>,
}

/// Subjects a teacher is assigned to, grouped by semester in academic order.
pub async fn teacher_subjects(
    db: &DatabaseConnection,
    teacher_id: i64,
) -> Result<Vec<SemesterSubjects>, AppError> {
    load_teacher(db, teacher_id).await?;
    let assignments = teacher_class::Model::for_teacher(db, teacher_id).await?;
    let classes = classes_by_id(db, assignments.iter().map(|a| a.class_id)).await?;
    let subjects = subjects_by_id(db, assignments.iter().map(|a| a.subject_id)).await?;

    let mut by_semester: BTreeMap<Semester, Vec<TeacherSubject>> = BTreeMap::new();
    for a in &assignments {
        let (Some(c), Some(s)) = (classes.get(&a.class_id), subjects.get(&a.subject_id)) else {
            continue;
        };
        by_semester.entry(c.semester).or_default().push(TeacherSubject {
            name: s.name.clone(),
            code: s.code.clone(),
            branch: c.branch,
        });
    }

    Ok(by_semester
        .into_iter()
        .map(|(semester, subjects)| SemesterSubjects {
            semester: format!("Sem {semester}"),
            subjects,
        })
        .collect())
}

// --- Logs ---

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TeacherLog {
    pub attendance_id: i64,
    pub subject: String,
    pub branch: Department,
    pub semester: Semester,
    pub total: u32,
    pub present: u32,
    pub absent: u32,
    pub time: String,
    pub date: String,
}

/// Every session the teacher has taken, newest first.
///
/// Open sessions are listed with all students absent until finalized.
pub async fn teacher_logs(db: &DatabaseConnection, teacher_id: i64) -> Result<Vec<TeacherLog>, AppError> {
    let records = attendance_record::Model::for_teacher(db, teacher_id).await?;
    let classes = classes_by_id(db, records.iter().map(|r| r.class_id)).await?;
    let subjects = subjects_by_id(db, records.iter().map(|r| r.subject_id)).await?;

    Ok(records
        .iter()
        .filter_map(|r| {
            let c = classes.get(&r.class_id)?;
            let s = subjects.get(&r.subject_id)?;
            let total = r.student_records.len() as u32;
            let present = r.student_records.present_count() as u32;
            Some(TeacherLog {
                attendance_id: r.id,
                subject: s.name.clone(),
                branch: c.branch,
                semester: c.semester,
                total,
                present,
                absent: total - present,
                time: format_time(r.session_start),
                date: format_date(r.date),
            })
        })
        .collect())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogStatus {
    Success,
    Failed,
}

impl From<AttendanceStatus> for LogStatus {
    fn from(status: AttendanceStatus) -> Self {
        match status {
            AttendanceStatus::Present => LogStatus::Success,
            AttendanceStatus::Absent => LogStatus::Failed,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StudentLog {
    pub subject: String,
    pub status: LogStatus,
    pub time: String,
    pub date: String,
}

/// Sessions of the student's class in which the student was on the roster, newest first.
///
/// A session that is still open shows `FAILED` even after a successful
/// check-in; the durable status is only written at finalize.
pub async fn student_logs(db: &DatabaseConnection, student_id: i64) -> Result<Vec<StudentLog>, AppError> {
    let student = load_student(db, student_id).await?;
    let records = attendance_record::Model::for_class(db, student.class_id).await?;
    let subjects = subjects_by_id(db, records.iter().map(|r| r.subject_id)).await?;

    Ok(records
        .iter()
        .filter_map(|r| {
            let status = r.student_records.status_of(student.id)?;
            Some(StudentLog {
                subject: subjects.get(&r.subject_id).map(|s| s.name.clone()).unwrap_or_default(),
                status: status.into(),
                time: format_time(r.session_start),
                date: format_date(r.date),
            })
        })
        .collect())
}

// --- Student summaries ---

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubjectSummary {
    pub id: i64,
    pub name: String,
    pub code: String,
    pub professor: String,
    pub total: u32,
    pub present: u32,
}

/// Per-subject totals for the student across every session they were on the roster for.
///
/// Open sessions count towards `total` but not `present`.
pub async fn student_subjects(
    db: &DatabaseConnection,
    student_id: i64,
) -> Result<Vec<SubjectSummary>, AppError> {
    let student = load_student(db, student_id).await?;
    let records = attendance_record::Model::for_class(db, student.class_id).await?;
    let subjects = subjects_by_id(db, records.iter().map(|r| r.subject_id)).await?;
    let teachers: HashMap<i64, String> = user::Model::find_by_ids(
        db,
        records
            .iter()
            .map(|r| r.teacher_id)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect(),
    )
    .await?
    .into_iter()
    .map(|u| (u.id, u.name))
    .collect();

    let mut summaries: HashMap<i64, SubjectSummary> = HashMap::new();
    // Oldest first so the professor shown is whoever taught most recently.
    for r in records.iter().rev() {
        let Some(status) = r.student_records.status_of(student.id) else {
            continue;
        };
        let Some(s) = subjects.get(&r.subject_id) else {
            continue;
        };
        let entry = summaries.entry(s.id).or_insert_with(|| SubjectSummary {
            id: s.id,
            name: s.name.clone(),
            code: s.code.clone(),
            professor: String::new(),
            total: 0,
            present: 0,
        });
        entry.professor = teachers.get(&r.teacher_id).cloned().unwrap_or_default();
        entry.total += 1;
        if status == AttendanceStatus::Present {
            entry.present += 1;
        }
    }

    let mut out: Vec<SubjectSummary> = summaries.into_values().collect();
    out.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(out)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlySubjectStats {
    pub subject: String,
    pub code: String,
    pub total: u32,
    pub present: u32,
    pub percentage: f64,
}

/// Per-subject statistics for one calendar month.
pub async fn student_monthly(
    db: &DatabaseConnection,
    student_id: i64,
    month: u32,
    year: i32,
) -> Result<Vec<MonthlySubjectStats>, AppError> {
    validate_month(month)?;
    let student = load_student(db, student_id).await?;
    let records = attendance_record::Model::for_class(db, student.class_id).await?;
    let subjects = subjects_by_id(db, records.iter().map(|r| r.subject_id)).await?;

    let mut counts: BTreeMap<String, (String, u32, u32)> = BTreeMap::new();
    for r in records.iter().filter(|r| in_period(r.date, Some(month), Some(year))) {
        let Some(status) = r.student_records.status_of(student.id) else {
            continue;
        };
        let Some(s) = subjects.get(&r.subject_id) else {
            continue;
        };
        let entry = counts
            .entry(s.name.clone())
            .or_insert_with(|| (s.code.clone(), 0, 0));
        entry.1 += 1;
        if status == AttendanceStatus::Present {
            entry.2 += 1;
        }
    }

    Ok(counts
        .into_iter()
        .map(|(subject, (code, total, present))| MonthlySubjectStats {
            subject,
            code,
            total,
            present,
            percentage: percentage(present, total),
        })
        .collect())
}

// --- Teacher analytics & export ---

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentAnalytics {
    pub student_id: i64,
    pub reg_no: String,
    pub name: String,
    pub total: u32,
    pub present: u32,
    pub percentage: f64,
}

struct SubjectSheet {
    subject: subject::Model,
    records: Vec<attendance_record::Model>,
    students: Vec<(student::Model, user::Model)>,
}

/// Records (oldest first) and students for a subject the teacher is assigned to.
async fn subject_sheet(
    db: &DatabaseConnection,
    teacher_id: i64,
    subject_id: i64,
    month: Option<u32>,
    year: Option<i32>,
) -> Result<SubjectSheet, AppError> {
    if let Some(m) = month {
        validate_month(m)?;
    }
    load_teacher(db, teacher_id).await?;

    let assignments: Vec<_> = teacher_class::Model::for_teacher(db, teacher_id)
        .await?
        .into_iter()
        .filter(|a| a.subject_id == subject_id)
        .collect();
    if assignments.is_empty() {
        return Err(AppError::not_found("Subject is not assigned to this teacher"));
    }
    let subject = subject::Model::find_by_id(db, subject_id)
        .await?
        .ok_or_else(|| AppError::not_found("Subject not found"))?;

    let records: Vec<_> = attendance_record::Model::for_teacher_subject(db, teacher_id, subject_id)
        .await?
        .into_iter()
        .filter(|r| in_period(r.date, month, year))
        .collect();

    let mut ids: BTreeSet<i64> = BTreeSet::new();
    for a in &assignments {
        for (s, _) in student::Model::roster_for_class(db, a.class_id).await? {
            ids.insert(s.id);
        }
    }
    for r in &records {
        ids.extend(r.student_records.student_ids());
    }
    let students = student::Model::with_users(db, ids.into_iter().collect()).await?;

    Ok(SubjectSheet {
        subject,
        records,
        students,
    })
}

fn tally(records: &[attendance_record::Model], student_id: i64) -> (u32, u32) {
    records
        .iter()
        .filter_map(|r| r.student_records.status_of(student_id))
        .fold((0, 0), |(total, present), status| {
            (total + 1, present + u32::from(status == AttendanceStatus::Present))
        })
}

/// Attendance of every student taking `subject_id` with this teacher.
pub async fn student_analytics(
    db: &DatabaseConnection,
    teacher_id: i64,
    subject_id: i64,
) -> Result<Vec<StudentAnalytics>, AppError> {
    let sheet = subject_sheet(db, teacher_id, subject_id, None, None).await?;

    Ok(sheet
        .students
        .into_iter()
        .map(|(s, u)| {
            let (total, present) = tally(&sheet.records, s.id);
            StudentAnalytics {
                student_id: s.id,
                reg_no: s.reg_no,
                name: u.name,
                total,
                present,
                percentage: percentage(present, total),
            }
        })
        .collect())
}

#[derive(Debug, Clone)]
pub struct AttendanceExport {
    pub filename: String,
    pub content: String,
}

/// CSV sheet: one row per student, one column per session, then totals.
///
/// Cells are `P`, `A`, or `-` when the student was not on that session's roster.
pub async fn export_csv(
    db: &DatabaseConnection,
    teacher_id: i64,
    subject_id: i64,
    month: Option<u32>,
    year: Option<i32>,
) -> Result<AttendanceExport, AppError> {
    let sheet = subject_sheet(db, teacher_id, subject_id, month, year).await?;
    let csv_err = |e: csv::Error| AppError::internal(format!("Failed to write CSV: {e}"));

    let mut writer = csv::Writer::from_writer(Vec::new());

    let mut header = vec!["Reg No".to_string(), "Name".to_string()];
    header.extend(
        sheet
            .records
            .iter()
            .map(|r| r.session_start.format("%Y-%m-%d %H:%M").to_string()),
    );
    header.extend(["Total".into(), "Present".into(), "Percentage".into()]);
    writer.write_record(&header).map_err(csv_err)?;

    for (s, u) in &sheet.students {
        let mut row = vec![s.reg_no.clone(), u.name.clone()];
        row.extend(sheet.records.iter().map(|r| {
            match r.student_records.status_of(s.id) {
                Some(AttendanceStatus::Present) => "P",
                Some(AttendanceStatus::Absent) => "A",
                None => "-",
            }
            .to_string()
        }));
        let (total, present) = tally(&sheet.records, s.id);
        row.extend([
            total.to_string(),
            present.to_string(),
            format!("{:.2}", percentage(present, total)),
        ]);
        writer.write_record(&row).map_err(csv_err)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| AppError::internal(format!("Failed to finish CSV: {e}")))?;
    let content = String::from_utf8(bytes).map_err(|e| AppError::internal(e.to_string()))?;

    let period = match (month, year) {
        (Some(m), Some(y)) => format!("_{y}-{m:02}"),
        (None, Some(y)) => format!("_{y}"),
        (Some(m), None) => format!("_{m:02}"),
        (None, None) => String::new(),
    };

    Ok(AttendanceExport {
        filename: format!("{}_attendance{period}.csv", sheet.subject.code),
        content,
    })
}

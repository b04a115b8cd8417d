//! In-app and push notifications for session lifecycle events, plus the inbox view.

use std::sync::Arc;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use db::models::{
    attendance_record::{AttendanceStatus, StudentRecords},
    notification, user,
};
use sea_orm::DatabaseConnection;
use serde::Serialize;
use tracing::{info, warn};

use crate::error::AppError;
use crate::push::{PushGateway, PushMessage};

pub mod templates {
    pub fn session_started(subject: &str) -> String {
        format!("Attendance for {subject} has been started")
    }

    pub fn marked_present(subject: &str, date: &str) -> String {
        format!("You have been successfully marked present for subject {subject} on {date}")
    }

    pub fn marked_absent(subject: &str, date: &str) -> String {
        format!("You missed the attendance window for subject {subject} on {date}")
    }
}

/// Day format used in attendance notifications.
pub fn format_session_date(date: DateTime<Utc>) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Fans lifecycle events out to students.
///
/// In-app rows are written before returning. Push delivery is handed to a
/// background task. Individual failures are logged and never abort the fan-out.
#[derive(Clone)]
pub struct Notifier {
    db: DatabaseConnection,
    push: Arc<dyn PushGateway>,
}

impl Notifier {
    pub fn new(db: DatabaseConnection, push: Arc<dyn PushGateway>) -> Self {
        Self { db, push }
    }

    pub async fn session_started(&self, attendance_id: i64, subject: &str, students: &[user::Model]) {
        let tokens: Vec<(i64, String)> = students
            .iter()
            .filter_map(|s| s.fcm_token.clone().map(|t| (s.id, t)))
            .filter(|(_, t)| !t.trim().is_empty())
            .collect();

        if !tokens.is_empty() {
            let push = self.push.clone();
            let message = PushMessage::attendance_started(attendance_id);
            tokio::spawn(async move {
                for (user_id, token) in tokens {
                    if let Err(e) = push.send(&token, &message).await {
                        warn!(target: "services::notifications", user_id, attendance_id, error = %e, "Push delivery failed");
                    }
                }
            });
        }

        let message = templates::session_started(subject);
        for s in students {
            self.store(s.id, &message).await;
        }

        info!(
            target: "services::notifications",
            attendance_id,
            students = students.len(),
            "Session start notifications dispatched"
        );
    }

    /// One message per student: "marked present" or "missed the window".
    pub async fn session_finalized(&self, subject: &str, date: DateTime<Utc>, records: &StudentRecords) {
        let date = format_session_date(date);
        for (student_id, status) in records.iter() {
            let message = match status {
                AttendanceStatus::Present => templates::marked_present(subject, &date),
                AttendanceStatus::Absent => templates::marked_absent(subject, &date),
            };
            self.store(student_id, &message).await;
        }
    }

    async fn store(&self, user_id: i64, message: &str) {
        if let Err(e) = notification::Model::create(&self.db, user_id, message).await {
            warn!(target: "services::notifications", user_id, error = %e, "Failed to store notification");
        }
    }
}

/// Inbox entries sharing a day label, newest first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NotificationGroup {
    pub date: String,
    pub items: Vec<String>,
}

/// "Today", "Yesterday", or e.g. "Monday, March 3".
pub fn day_label(day: NaiveDate, today: NaiveDate) -> String {
    if day == today {
        "Today".to_string()
    } else if Some(day) == today.checked_sub_signed(Duration::days(1)) {
        "Yesterday".to_string()
    } else {
        day.format("%A, %B %-d").to_string()
    }
}

/// Groups notifications (already ordered newest first) by day label, preserving order.
pub fn group_by_day(notifications: &[notification::Model], today: NaiveDate) -> Vec<NotificationGroup> {
    let mut groups: Vec<NotificationGroup> = Vec::new();
    for n in notifications {
        let label = day_label(n.created_at.date_naive(), today);
        match groups.iter_mut().find(|g| g.date == label) {
            Some(group) => group.items.push(n.message.clone()),
            None => groups.push(NotificationGroup {
                date: label,
                items: vec![n.message.clone()],
            }),
        }
    }
    groups
}

pub async fn inbox(
    db: &DatabaseConnection,
    user_id: i64,
    now: DateTime<Utc>,
) -> Result<Vec<NotificationGroup>, AppError> {
    let notifications = notification::Model::for_user(db, user_id).await?;
    Ok(group_by_day(&notifications, now.date_naive()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn note(id: i64, message: &str, at: DateTime<Utc>) -> notification::Model {
        notification::Model {
            id,
            user_id: 1,
            message: message.into(),
            created_at: at,
        }
    }

    #[test]
    fn message_templates() {
        assert_eq!(
            templates::marked_present("Maths", "2026-03-02"),
            "You have been successfully marked present for subject Maths on 2026-03-02"
        );
        assert_eq!(
            templates::marked_absent("Maths {{date}}", "2026-03-02"),
            "You missed the attendance window for subject Maths {{date}} on 2026-03-02"
        );
        assert_eq!(templates::session_started("OS"), "Attendance for OS has been started");
    }

    #[test]
    fn day_labels() {
        let today = NaiveDate::from_ymd_opt(2026, 3, 5).unwrap();
        assert_eq!(day_label(today, today), "Today");
        assert_eq!(day_label(NaiveDate::from_ymd_opt(2026, 3, 4).unwrap(), today), "Yesterday");
        assert_eq!(
            day_label(NaiveDate::from_ymd_opt(2026, 3, 2).unwrap(), today),
            "Monday, March 2"
        );
    }

    #[test]
    fn grouping_preserves_newest_first_order() {
        let today = Utc.with_ymd_and_hms(2026, 3, 5, 12, 0, 0).unwrap();
        let items = vec![
            note(4, "d", today),
            note(3, "c", today - Duration::hours(2)),
            note(2, "b", today - Duration::days(1)),
            note(1, "a", today - Duration::days(3)),
        ];

        let groups = group_by_day(&items, today.date_naive());
        assert_eq!(groups.len(), 3);
        assert_eq!(groups[0].date, "Today");
        assert_eq!(groups[0].items, vec!["d", "c"]);
        assert_eq!(groups[1].date, "Yesterday");
        assert_eq!(groups[2].date, "Monday, March 2");
    }
}

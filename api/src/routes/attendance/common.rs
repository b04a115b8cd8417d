use db::models::class::Semester;
use serde::{Deserialize, Serialize};
use services::attendance::{StartSession, StatusOverride};
use services::error::AppError;
use validator::Validate;

use crate::routes::common::{parse_branch, parse_semester};

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct StartSessionRequest {
    #[validate(length(min = 1, message = "Branch is required"))]
    pub branch: String,

    /// `"III"`, `"3"` or `3`.
    pub semester: SemesterInput,

    #[validate(length(min = 1, message = "Subject name is required"))]
    pub subject_name: String,

    pub latitude: f64,
    pub longitude: f64,
}

impl TryFrom<StartSessionRequest> for StartSession {
    type Error = AppError;

    fn try_from(req: StartSessionRequest) -> Result<Self, Self::Error> {
        Ok(StartSession {
            branch: parse_branch(&req.branch)?,
            semester: req.semester.resolve()?,
            subject_name: req.subject_name,
            latitude: req.latitude,
            longitude: req.longitude,
        })
    }
}

/// Roman numeral (`"III"`), numeric string (`"3"`) or number (`3`).
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum SemesterInput {
    Number(u8),
    Name(String),
}

impl SemesterInput {
    pub fn resolve(&self) -> Result<Semester, AppError> {
        match self {
            SemesterInput::Number(n) => Semester::from_number(*n)
                .ok_or_else(|| AppError::invalid(format!("Unknown semester '{n}'"))),
            SemesterInput::Name(name) => parse_semester(name),
        }
    }
}

/// Coordinate bounds are checked by the attendance service.
#[derive(Debug, Deserialize, Validate)]
pub struct CheckInRequest {
    pub latitude: f64,
    pub longitude: f64,
}

/// Finalize body; an empty or missing `records` list keeps the cached statuses.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct FinalizeRequest {
    #[serde(default)]
    pub records: Vec<StatusOverride>,
}

#[derive(Debug, Serialize)]
pub struct CheckInResponse {
    pub success: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn semester_accepts_numbers_and_names() {
        let parsed: SemesterInput = serde_json::from_str("5").unwrap();
        assert_eq!(parsed.resolve().unwrap(), Semester::V);

        let parsed: SemesterInput = serde_json::from_str("\"vii\"").unwrap();
        assert_eq!(parsed.resolve().unwrap(), Semester::VII);

        let parsed: SemesterInput = serde_json::from_str("0").unwrap();
        assert!(parsed.resolve().is_err());
    }

    #[test]
    fn finalize_body_defaults_to_no_overrides() {
        let req: FinalizeRequest = serde_json::from_str("{}").unwrap();
        assert!(req.records.is_empty());
    }
}

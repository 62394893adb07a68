use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

pub type ApplicationId = i64;

pub const NOT_AVAILABLE: &str = "N/A";
pub const NOT_SPECIFIED: &str = "Not specified";

/// Review stage of an application. Closed set; every consumer matches exhaustively.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum ApplicationStatus {
    #[default]
    Pending,
    Reviewed,
    Shortlisted,
    Contacted,
    Rejected,
}

/// Badge colour used by the front end for a status.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BadgeTone {
    Amber,
    Blue,
    Indigo,
    Teal,
    Red,
}

impl ApplicationStatus {
    /// Fixed display order used by selectors and the dashboard.
    pub const ALL: [ApplicationStatus; 5] = [
        ApplicationStatus::Pending,
        ApplicationStatus::Reviewed,
        ApplicationStatus::Shortlisted,
        ApplicationStatus::Contacted,
        ApplicationStatus::Rejected,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "pending",
            ApplicationStatus::Reviewed => "reviewed",
            ApplicationStatus::Shortlisted => "shortlisted",
            ApplicationStatus::Contacted => "contacted",
            ApplicationStatus::Rejected => "rejected",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "Pending",
            ApplicationStatus::Reviewed => "Reviewed",
            ApplicationStatus::Shortlisted => "Shortlisted",
            ApplicationStatus::Contacted => "Contacted",
            ApplicationStatus::Rejected => "Rejected",
        }
    }

    pub fn tone(&self) -> BadgeTone {
        match self {
            ApplicationStatus::Pending => BadgeTone::Amber,
            ApplicationStatus::Reviewed => BadgeTone::Blue,
            ApplicationStatus::Shortlisted => BadgeTone::Indigo,
            ApplicationStatus::Contacted => BadgeTone::Teal,
            ApplicationStatus::Rejected => BadgeTone::Red,
        }
    }
}

/// A candidate's submission as returned by the applications backend.
/// Everything except the id is optional on the wire.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct JobApplication {
    pub id: ApplicationId,
    #[serde(default)]
    pub job_id: Option<i64>,
    #[serde(default)]
    pub job_title: Option<String>,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default, rename = "type")]
    pub employment_type: Option<String>,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub linkedin_url: Option<String>,
    #[serde(default)]
    pub portfolio_url: Option<String>,
    #[serde(default)]
    pub years_of_experience: Option<String>,
    #[serde(default)]
    pub current_company: Option<String>,
    #[serde(default)]
    pub current_role: Option<String>,
    #[serde(default)]
    pub notice_period: Option<String>,
    #[serde(default)]
    pub expected_salary: Option<String>,
    #[serde(default)]
    pub cover_letter: Option<String>,
    #[serde(default)]
    pub resume_path: Option<String>,
    #[serde(default, deserialize_with = "status_or_default")]
    pub status: ApplicationStatus,
    #[serde(default)]
    pub created_at: Option<String>,
}

// A JSON null status is treated the same as a missing one.
fn status_or_default<'de, D>(deserializer: D) -> Result<ApplicationStatus, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<ApplicationStatus>::deserialize(deserializer)?.unwrap_or_default())
}

impl JobApplication {
    pub fn name(&self) -> &str {
        self.full_name.as_deref().unwrap_or("")
    }

    pub fn display_name(&self) -> &str {
        non_empty(self.full_name.as_deref()).unwrap_or(NOT_AVAILABLE)
    }

    pub fn display_job_title(&self) -> &str {
        non_empty(self.job_title.as_deref()).unwrap_or(NOT_AVAILABLE)
    }

    /// Parses `created_at`, accepting RFC 3339 and `YYYY-MM-DD HH:MM:SS` (taken as UTC).
    pub fn created_at_parsed(&self) -> Option<DateTime<Utc>> {
        let raw = self.created_at.as_deref()?.trim();
        if raw.is_empty() {
            return None;
        }
        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Some(dt.with_timezone(&Utc));
        }
        NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
            .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f"))
            .ok()
            .map(|naive| naive.and_utc())
    }

    /// "Jan 5, 2024", or "-" when the timestamp is missing or unreadable.
    pub fn formatted_date(&self) -> String {
        self.created_at_parsed()
            .map(|dt| dt.format("%b %-d, %Y").to_string())
            .unwrap_or_else(|| "-".to_string())
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

/// Detail view of a single record with placeholders already applied.
#[derive(Debug, Clone, Serialize)]
pub struct ApplicationDetail {
    pub id: ApplicationId,
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub job_title: String,
    pub department: String,
    pub location: String,
    pub employment_type: String,
    pub years_of_experience: String,
    pub current_company: String,
    pub current_role: String,
    pub notice_period: String,
    pub expected_salary: String,
    pub cover_letter: Option<String>,
    pub linkedin_url: Option<String>,
    pub portfolio_url: Option<String>,
    pub status: ApplicationStatus,
    pub status_label: &'static str,
    pub status_tone: BadgeTone,
    pub applied_on: String,
}

impl From<&JobApplication> for ApplicationDetail {
    fn from(app: &JobApplication) -> Self {
        let or = |value: &Option<String>, placeholder: &str| {
            non_empty(value.as_deref()).unwrap_or(placeholder).to_string()
        };
        Self {
            id: app.id,
            full_name: app.display_name().to_string(),
            email: or(&app.email, NOT_AVAILABLE),
            phone: or(&app.phone, NOT_AVAILABLE),
            job_title: app.display_job_title().to_string(),
            department: or(&app.department, NOT_AVAILABLE),
            location: or(&app.location, NOT_AVAILABLE),
            employment_type: or(&app.employment_type, NOT_AVAILABLE),
            years_of_experience: or(&app.years_of_experience, NOT_AVAILABLE),
            current_company: or(&app.current_company, NOT_AVAILABLE),
            current_role: or(&app.current_role, NOT_AVAILABLE),
            notice_period: or(&app.notice_period, NOT_AVAILABLE),
            expected_salary: or(&app.expected_salary, NOT_SPECIFIED),
            cover_letter: app.cover_letter.clone().filter(|c| !c.is_empty()),
            linkedin_url: app.linkedin_url.clone().filter(|u| !u.is_empty()),
            portfolio_url: app.portfolio_url.clone().filter(|u| !u.is_empty()),
            status: app.status,
            status_label: app.status.label(),
            status_tone: app.status.tone(),
            applied_on: app.formatted_date(),
        }
    }
}

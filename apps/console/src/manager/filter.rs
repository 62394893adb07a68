use serde::{de::Error, Deserialize, Deserializer, Serialize, Serializer};

use crate::models::{ApplicationStatus, JobApplication};

/// Status filter: every status, or exactly one. Travels as `"all"` or a status name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Only(ApplicationStatus),
}

impl StatusFilter {
    pub fn matches(&self, status: ApplicationStatus) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Only(wanted) => *wanted == status,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StatusFilter::All => "all",
            StatusFilter::Only(status) => status.as_str(),
        }
    }
}

impl Serialize for StatusFilter {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for StatusFilter {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let tag = String::deserialize(deserializer)?;
        if tag == "all" {
            return Ok(StatusFilter::All);
        }
        ApplicationStatus::ALL
            .into_iter()
            .find(|s| s.as_str() == tag)
            .map(StatusFilter::Only)
            .ok_or_else(|| D::Error::custom(format!("unknown status filter '{tag}'")))
    }
}

/// Search text against name, email, job title (case-insensitive) and phone (exact substring).
pub fn matches_query(app: &JobApplication, query: &str) -> bool {
    if query.is_empty() {
        return true;
    }
    let needle = query.to_lowercase();
    let contains_folded =
        |field: &Option<String>| field.as_deref().unwrap_or("").to_lowercase().contains(&needle);

    contains_folded(&app.full_name)
        || contains_folded(&app.email)
        || contains_folded(&app.job_title)
        || app.phone.as_deref().unwrap_or("").contains(query)
}

/// Records matching both the search query and the status filter, in collection order.
pub fn filter_applications<'a>(
    applications: &'a [JobApplication],
    query: &str,
    status: StatusFilter,
) -> Vec<&'a JobApplication> {
    applications
        .iter()
        .filter(|app| matches_query(app, query) && status.matches(app.status))
        .collect()
}

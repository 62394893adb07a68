//! Dashboard statistics, derived from the loaded collection on every request.

use std::cmp::Reverse;

use serde::Serialize;

use crate::models::application::BadgeTone;
use crate::models::{ApplicationId, ApplicationStatus, JobApplication};

const MAX_DEPARTMENTS: usize = 6;
const RECENT_LIMIT: usize = 5;
const UNKNOWN_DEPARTMENT: &str = "Other";

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct StatusBucket {
    pub status: ApplicationStatus,
    pub label: &'static str,
    pub tone: BadgeTone,
    pub count: usize,
    pub percentage: f64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DepartmentCount {
    pub department: String,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RecentApplication {
    pub id: ApplicationId,
    pub full_name: String,
    pub job_title: String,
    pub status: ApplicationStatus,
    pub applied_on: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DashboardStats {
    pub total: usize,
    pub pending: usize,
    pub shortlisted: usize,
    /// Rounded whole percent of rejected records; 0 for an empty collection.
    pub rejection_rate: u32,
    pub by_status: Vec<StatusBucket>,
    pub departments: Vec<DepartmentCount>,
    pub recent: Vec<RecentApplication>,
}

pub fn compute_dashboard(applications: &[JobApplication]) -> DashboardStats {
    let total = applications.len();
    let count_of = |status: ApplicationStatus| {
        applications
            .iter()
            .filter(|a| a.status == status)
            .count()
    };

    let by_status: Vec<StatusBucket> = ApplicationStatus::ALL
        .into_iter()
        .map(|status| {
            let count = count_of(status);
            StatusBucket {
                status,
                label: status.label(),
                tone: status.tone(),
                count,
                percentage: percent(count, total),
            }
        })
        .collect();

    let bucket = |status: ApplicationStatus| {
        by_status
            .iter()
            .find(|b| b.status == status)
            .map(|b| b.count)
            .unwrap_or(0)
    };

    let rejection_rate = percent(bucket(ApplicationStatus::Rejected), total).round() as u32;

    DashboardStats {
        total,
        pending: bucket(ApplicationStatus::Pending),
        shortlisted: bucket(ApplicationStatus::Shortlisted),
        rejection_rate,
        departments: department_breakdown(applications),
        recent: most_recent(applications),
        by_status,
    }
}

fn percent(count: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 / total as f64 * 100.0
    }
}

/// Distinct departments in first-seen order, capped, with their record counts.
fn department_breakdown(applications: &[JobApplication]) -> Vec<DepartmentCount> {
    let mut departments: Vec<DepartmentCount> = Vec::new();
    for app in applications {
        let name = app
            .department
            .as_deref()
            .filter(|d| !d.is_empty())
            .unwrap_or(UNKNOWN_DEPARTMENT);
        match departments.iter_mut().find(|d| d.department == name) {
            Some(entry) => entry.count += 1,
            None => departments.push(DepartmentCount {
                department: name.to_string(),
                count: 1,
            }),
        }
    }
    departments.truncate(MAX_DEPARTMENTS);
    departments
}

/// Newest first by creation time; undated records sort last, ties keep collection order.
fn most_recent(applications: &[JobApplication]) -> Vec<RecentApplication> {
    let mut ordered: Vec<&JobApplication> = applications.iter().collect();
    ordered.sort_by_key(|a| Reverse(a.created_at_parsed()));
    ordered
        .into_iter()
        .take(RECENT_LIMIT)
        .map(|app| RecentApplication {
            id: app.id,
            full_name: app.display_name().to_string(),
            job_title: app.display_job_title().to_string(),
            status: app.status,
            applied_on: app.formatted_date(),
        })
        .collect()
}

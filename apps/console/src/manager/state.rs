use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::backend::BackendError;
use crate::manager::dashboard::{compute_dashboard, DashboardStats};
use crate::manager::filter::{filter_applications, StatusFilter};
use crate::manager::notifications::NotificationQueue;
use crate::manager::pagination::{clamp_page, paginate, PageInfo};
use crate::models::application::BadgeTone;
use crate::models::{ApplicationDetail, ApplicationId, ApplicationStatus, JobApplication};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    #[default]
    List,
    Dashboard,
}

/// Identifies one issued load. Only the most recent ticket may replace the collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct LoadTicket(u64);

#[derive(Debug, Clone, PartialEq)]
pub enum LoadOutcome {
    Applied(usize),
    /// A newer load was issued while this one was in flight.
    Stale,
    Unauthenticated,
    Failed(String),
}

/// Result of reconciling a single mutation with local state.
#[derive(Debug, Clone, PartialEq)]
pub enum Reconciled {
    Applied,
    Unauthenticated,
    Failed(String),
}

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct BulkDeleteReport {
    pub requested: usize,
    pub deleted: Vec<ApplicationId>,
    pub failed: Vec<ApplicationId>,
    /// Requested ids that are not in the loaded collection; never sent to the backend.
    pub not_found: Vec<ApplicationId>,
    pub unauthenticated: bool,
}

/// One row of the list view.
#[derive(Debug, Clone, Serialize)]
pub struct ApplicationRow {
    pub id: ApplicationId,
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub job_title: String,
    pub department: String,
    pub status: ApplicationStatus,
    pub status_label: &'static str,
    pub status_tone: BadgeTone,
    pub applied_on: String,
    pub selected: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ListView {
    pub items: Vec<ApplicationRow>,
    pub page: PageInfo,
    pub query: String,
    pub status: StatusFilter,
    pub selected: Vec<ApplicationId>,
    pub all_on_page_selected: bool,
    /// True when filters are active, so an empty page means "no matches" rather than "no data".
    pub filtered: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ConsoleSnapshot {
    pub mode: ViewMode,
    pub loading: bool,
    pub refreshing: bool,
    pub total: usize,
    pub selected_count: usize,
    pub detail: Option<ApplicationId>,
    pub redirect: Option<String>,
    pub pending_notifications: usize,
}

/// Local view state of the applications console.
///
/// The collection is a cache of backend state: every mutation here is applied
/// only after the backend confirmed it.
#[derive(Debug)]
pub struct ApplicationsManager {
    applications: Vec<JobApplication>,
    selected: BTreeSet<ApplicationId>,
    query: String,
    status_filter: StatusFilter,
    page: usize,
    page_size: usize,
    mode: ViewMode,
    detail: Option<ApplicationId>,
    loading: bool,
    refreshing: bool,
    latest_load: u64,
    login_path: String,
    redirect: Option<String>,
    pub notifications: NotificationQueue,
}

impl ApplicationsManager {
    pub fn new(page_size: usize, login_path: impl Into<String>) -> Self {
        Self {
            applications: Vec::new(),
            selected: BTreeSet::new(),
            query: String::new(),
            status_filter: StatusFilter::All,
            page: 1,
            page_size: page_size.max(1),
            mode: ViewMode::List,
            detail: None,
            // the first load is issued at startup
            loading: true,
            refreshing: false,
            latest_load: 0,
            login_path: login_path.into(),
            redirect: None,
            notifications: NotificationQueue::default(),
        }
    }

    pub fn applications(&self) -> &[JobApplication] {
        &self.applications
    }

    pub fn get(&self, id: ApplicationId) -> Option<&JobApplication> {
        self.applications.iter().find(|a| a.id == id)
    }

    pub fn selected(&self) -> Vec<ApplicationId> {
        self.selected.iter().copied().collect()
    }

    #[cfg(test)]
    pub fn mode(&self) -> ViewMode {
        self.mode
    }

    #[cfg(test)]
    pub fn redirect(&self) -> Option<&str> {
        self.redirect.as_deref()
    }

    pub fn login_path(&self) -> &str {
        &self.login_path
    }

    // ── Loading ────────────────────────────────────────────────────────────

    pub fn begin_load(&mut self, show_loading: bool) -> LoadTicket {
        self.latest_load += 1;
        if show_loading {
            self.loading = true;
        } else {
            self.refreshing = true;
        }
        LoadTicket(self.latest_load)
    }

    pub fn finish_load(
        &mut self,
        ticket: LoadTicket,
        result: Result<Vec<JobApplication>, BackendError>,
    ) -> LoadOutcome {
        if ticket.0 != self.latest_load {
            debug!(
                "Dropping stale load response (ticket {}, latest {})",
                ticket.0, self.latest_load
            );
            return LoadOutcome::Stale;
        }
        self.loading = false;
        self.refreshing = false;

        match result {
            Ok(applications) => {
                self.replace_collection(applications);
                self.redirect = None;
                LoadOutcome::Applied(self.applications.len())
            }
            Err(BackendError::Unauthenticated) => {
                self.require_login("Please login to access this page");
                LoadOutcome::Unauthenticated
            }
            Err(e) => {
                warn!("Loading job applications failed: {e}");
                self.replace_collection(Vec::new());
                let message = e
                    .backend_message()
                    .unwrap_or("Failed to load job applications")
                    .to_string();
                self.notifications.error(message.clone());
                LoadOutcome::Failed(message)
            }
        }
    }

    /// Drops any in-flight load; its response predates a confirmed mutation.
    fn invalidate_loads(&mut self) {
        self.latest_load += 1;
        self.loading = false;
        self.refreshing = false;
    }

    fn replace_collection(&mut self, applications: Vec<JobApplication>) {
        let mut seen = BTreeSet::new();
        self.applications = applications
            .into_iter()
            .filter(|app| {
                let first = seen.insert(app.id);
                if !first {
                    warn!("Ignoring duplicate job application id {}", app.id);
                }
                first
            })
            .collect();

        let present = |id: &ApplicationId| seen.contains(id);
        self.selected.retain(|id| present(id));
        if self.detail.is_some_and(|id| !present(&id)) {
            self.detail = None;
        }
    }

    fn require_login(&mut self, message: &str) {
        self.notifications.error(message);
        self.redirect = Some(self.login_path.clone());
    }

    /// Records a failed backend call: login redirect for auth failures, an error notification otherwise.
    pub fn reconcile_failure(&mut self, error: BackendError, fallback: &str) -> Reconciled {
        if error.is_unauthenticated() {
            self.require_login("Session expired. Please login again.");
            return Reconciled::Unauthenticated;
        }
        warn!("{fallback}: {error}");
        let message = error.backend_message().unwrap_or(fallback).to_string();
        self.notifications.error(message.clone());
        Reconciled::Failed(message)
    }

    // ── Mutations (applied after backend confirmation) ─────────────────────

    pub fn apply_status_update(
        &mut self,
        id: ApplicationId,
        status: ApplicationStatus,
        result: Result<(), BackendError>,
    ) -> Reconciled {
        match result {
            Ok(()) => {
                if let Some(app) = self.applications.iter_mut().find(|a| a.id == id) {
                    app.status = status;
                }
                self.invalidate_loads();
                self.notifications.success("Application status updated");
                Reconciled::Applied
            }
            Err(e) => self.reconcile_failure(e, "Failed to update status"),
        }
    }

    pub fn apply_delete(
        &mut self,
        id: ApplicationId,
        result: Result<(), BackendError>,
    ) -> Reconciled {
        match result {
            Ok(()) => {
                self.remove(&[id]);
                self.invalidate_loads();
                self.notifications.success("Application deleted successfully");
                Reconciled::Applied
            }
            Err(e) => self.reconcile_failure(e, "Failed to delete application"),
        }
    }

    /// Removes only the ids whose own deletion succeeded; failed ids stay selected.
    pub fn apply_bulk_delete(
        &mut self,
        results: Vec<(ApplicationId, Result<(), BackendError>)>,
    ) -> BulkDeleteReport {
        let mut report = BulkDeleteReport {
            requested: results.len(),
            ..Default::default()
        };
        for (id, result) in results {
            match result {
                Ok(()) => report.deleted.push(id),
                Err(e) => {
                    if e.is_unauthenticated() {
                        report.unauthenticated = true;
                    } else {
                        warn!("Bulk delete of application {id} failed: {e}");
                    }
                    report.failed.push(id);
                }
            }
        }
        report.deleted.sort_unstable();
        report.failed.sort_unstable();
        if !report.deleted.is_empty() {
            self.remove(&report.deleted);
            self.invalidate_loads();
        }

        if report.failed.is_empty() {
            self.notifications.success(format!(
                "Successfully deleted {} applications",
                report.deleted.len()
            ));
        } else if report.deleted.is_empty() {
            self.notifications.error("Failed to delete applications");
        } else {
            let failed: Vec<String> = report.failed.iter().map(|id| id.to_string()).collect();
            self.notifications.warning(format!(
                "Deleted {} of {} applications; failed ids: {}",
                report.deleted.len(),
                report.requested,
                failed.join(", ")
            ));
        }
        if report.unauthenticated {
            self.require_login("Session expired. Please login again.");
        }
        report
    }

    fn remove(&mut self, ids: &[ApplicationId]) {
        self.applications.retain(|a| !ids.contains(&a.id));
        self.selected.retain(|id| !ids.contains(id));
        if self.detail.is_some_and(|id| ids.contains(&id)) {
            self.detail = None;
        }
    }

    // ── Selection ─────────────────────────────────────────────────────────

    /// Returns whether `id` is selected afterwards. Ids not in the collection are ignored.
    pub fn toggle_select(&mut self, id: ApplicationId) -> bool {
        if self.get(id).is_none() {
            return false;
        }
        if !self.selected.remove(&id) {
            self.selected.insert(id);
        }
        self.selected.contains(&id)
    }

    /// Page-scoped "select all": clears the page if it is fully selected, otherwise selects it.
    pub fn toggle_select_all_on_page(&mut self) {
        let page_ids = self.page_ids();
        if page_ids.is_empty() {
            return;
        }
        if page_ids.iter().all(|id| self.selected.contains(id)) {
            for id in &page_ids {
                self.selected.remove(id);
            }
        } else {
            self.selected.extend(page_ids);
        }
    }

    fn page_ids(&self) -> Vec<ApplicationId> {
        let filtered = filter_applications(&self.applications, &self.query, self.status_filter);
        let (page, _) = paginate(&filtered, self.page, self.page_size);
        page.iter().map(|a| a.id).collect()
    }

    // ── Filters, paging, view mode ────────────────────────────────────────

    pub fn set_query(&mut self, query: impl Into<String>) {
        let query = query.into();
        if query != self.query {
            self.query = query;
            self.page = 1;
        }
    }

    pub fn set_status_filter(&mut self, status: StatusFilter) {
        self.status_filter = status;
        self.page = 1;
    }

    /// Moves to `page`, clamped to the current filtered page range. Returns the page now shown.
    pub fn set_page(&mut self, page: usize) -> usize {
        let total = filter_applications(&self.applications, &self.query, self.status_filter).len();
        self.page = clamp_page(page, total, self.page_size);
        self.page
    }

    pub fn set_mode(&mut self, mode: ViewMode) {
        self.mode = mode;
    }

    pub fn view_application(&mut self, id: ApplicationId) -> Option<ApplicationDetail> {
        let detail = self.get(id).map(ApplicationDetail::from)?;
        self.detail = Some(id);
        Some(detail)
    }

    pub fn close_detail(&mut self) {
        self.detail = None;
    }

    // ── Derived views ─────────────────────────────────────────────────────

    pub fn list_view(&self) -> ListView {
        let filtered = filter_applications(&self.applications, &self.query, self.status_filter);
        let (page_items, info) = paginate(&filtered, self.page, self.page_size);

        let items: Vec<ApplicationRow> = page_items
            .iter()
            .map(|app| ApplicationRow {
                id: app.id,
                full_name: app.display_name().to_string(),
                email: app.email.clone().unwrap_or_default(),
                phone: app.phone.clone().unwrap_or_default(),
                job_title: app.display_job_title().to_string(),
                department: app.department.clone().unwrap_or_default(),
                status: app.status,
                status_label: app.status.label(),
                status_tone: app.status.tone(),
                applied_on: app.formatted_date(),
                selected: self.selected.contains(&app.id),
            })
            .collect();

        ListView {
            all_on_page_selected: !items.is_empty() && items.iter().all(|row| row.selected),
            items,
            page: info,
            query: self.query.clone(),
            status: self.status_filter,
            selected: self.selected(),
            filtered: !self.query.is_empty() || self.status_filter != StatusFilter::All,
        }
    }

    pub fn dashboard(&self) -> DashboardStats {
        compute_dashboard(&self.applications)
    }

    pub fn snapshot(&self) -> ConsoleSnapshot {
        ConsoleSnapshot {
            mode: self.mode,
            loading: self.loading,
            refreshing: self.refreshing,
            total: self.applications.len(),
            selected_count: self.selected.len(),
            detail: self.detail,
            redirect: self.redirect.clone(),
            pending_notifications: self.notifications.len(),
        }
    }
}

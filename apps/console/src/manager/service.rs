//! Async orchestration of backend calls around the `ApplicationsManager`.
//!
//! Each backend call is bracketed by two short critical sections: one to
//! read/begin, one to reconcile the result. The state lock is never held
//! while a request is in flight.

use std::collections::BTreeSet;
use std::sync::Arc;

use bytes::Bytes;
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{error, info, warn};

use crate::backend::{ApplicationsBackend, BackendError};
use crate::contact::{mailto_uri, resume_filename, tel_uri};
use crate::errors::AppError;
use crate::manager::dashboard::DashboardStats;
use crate::manager::filter::StatusFilter;
use crate::manager::notifications::Notification;
use crate::manager::state::{
    ApplicationsManager, BulkDeleteReport, ConsoleSnapshot, ListView, LoadOutcome, Reconciled,
    ViewMode,
};
use crate::models::{ApplicationDetail, ApplicationId, ApplicationStatus, JobApplication};

#[derive(Debug, Clone, Serialize)]
pub struct LoadSummary {
    /// False when a newer load superseded this one.
    pub applied: bool,
    pub total: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResumeDownload {
    pub url: String,
    pub filename: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ContactLink {
    pub uri: String,
}

pub struct ApplicationsService {
    backend: Arc<dyn ApplicationsBackend>,
    manager: Mutex<ApplicationsManager>,
    company_name: String,
}

impl ApplicationsService {
    pub fn new(
        backend: Arc<dyn ApplicationsBackend>,
        manager: ApplicationsManager,
        company_name: impl Into<String>,
    ) -> Self {
        Self {
            backend,
            manager: Mutex::new(manager),
            company_name: company_name.into(),
        }
    }

    async fn unauthorized(&self) -> AppError {
        AppError::Unauthorized {
            redirect: self.manager.lock().await.login_path().to_string(),
        }
    }

    async fn reconciled(&self, outcome: Reconciled) -> Result<(), AppError> {
        match outcome {
            Reconciled::Applied => Ok(()),
            Reconciled::Unauthenticated => Err(self.unauthorized().await),
            Reconciled::Failed(message) => Err(AppError::Backend(message)),
        }
    }

    async fn require(&self, id: ApplicationId) -> Result<JobApplication, AppError> {
        self.manager
            .lock()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Job application {id} not found")))
    }

    // ── Backend-backed operations ─────────────────────────────────────────

    pub async fn load_applications(&self, show_loading: bool) -> Result<LoadSummary, AppError> {
        let ticket = self.manager.lock().await.begin_load(show_loading);
        let result = self.backend.get_all().await;

        let mut manager = self.manager.lock().await;
        match manager.finish_load(ticket, result) {
            LoadOutcome::Applied(total) => {
                info!("Loaded {total} job applications");
                Ok(LoadSummary {
                    applied: true,
                    total,
                })
            }
            LoadOutcome::Stale => Ok(LoadSummary {
                applied: false,
                total: manager.applications().len(),
            }),
            LoadOutcome::Unauthenticated => Err(AppError::Unauthorized {
                redirect: manager.login_path().to_string(),
            }),
            LoadOutcome::Failed(message) => Err(AppError::Backend(message)),
        }
    }

    pub async fn update_status(
        &self,
        id: ApplicationId,
        status: ApplicationStatus,
    ) -> Result<ApplicationDetail, AppError> {
        self.require(id).await?;
        let result = self.backend.update_status(id, status).await;
        let outcome = self
            .manager
            .lock()
            .await
            .apply_status_update(id, status, result);
        self.reconciled(outcome).await?;
        info!("Application {id} moved to {}", status.as_str());

        let app = self.require(id).await?;
        Ok(ApplicationDetail::from(&app))
    }

    pub async fn delete_application(&self, id: ApplicationId) -> Result<(), AppError> {
        self.require(id).await?;
        let result = self.backend.delete(id).await;
        let outcome = self.manager.lock().await.apply_delete(id, result);
        self.reconciled(outcome).await?;
        info!("Application {id} deleted");
        Ok(())
    }

    /// Deletes `ids` (or the current selection) concurrently and waits for the whole batch.
    /// Explicit ids outside the loaded collection are reported as `not_found`.
    pub async fn bulk_delete(
        &self,
        ids: Option<Vec<ApplicationId>>,
    ) -> Result<BulkDeleteReport, AppError> {
        let (ids, not_found): (Vec<ApplicationId>, Vec<ApplicationId>) = {
            let manager = self.manager.lock().await;
            match ids {
                Some(ids) => ids
                    .into_iter()
                    .collect::<BTreeSet<_>>()
                    .into_iter()
                    .partition(|id| manager.get(*id).is_some()),
                None => (manager.selected(), Vec::new()),
            }
        };
        if !not_found.is_empty() {
            warn!("Bulk delete skipping unknown application ids {not_found:?}");
        }
        if ids.is_empty() {
            return Ok(BulkDeleteReport {
                not_found,
                ..Default::default()
            });
        }

        let handles: Vec<_> = ids
            .into_iter()
            .map(|id| {
                let backend = Arc::clone(&self.backend);
                (id, tokio::spawn(async move { backend.delete(id).await }))
            })
            .collect();

        let mut results = Vec::with_capacity(handles.len());
        for (id, handle) in handles {
            let result = match handle.await {
                Ok(result) => result,
                Err(e) => {
                    error!("Deletion task for application {id} failed: {e}");
                    Err(BackendError::Rejected(None))
                }
            };
            results.push((id, result));
        }

        let mut report = self.manager.lock().await.apply_bulk_delete(results);
        report.not_found = not_found;
        info!(
            "Bulk delete: {} requested, {} deleted, {} failed",
            report.requested,
            report.deleted.len(),
            report.failed.len()
        );
        if report.unauthenticated {
            return Err(self.unauthorized().await);
        }
        Ok(report)
    }

    pub async fn download_resume(&self, id: ApplicationId) -> Result<ResumeDownload, AppError> {
        let app = self.require(id).await?;
        self.manager
            .lock()
            .await
            .notifications
            .success("Resume download started");
        Ok(ResumeDownload {
            url: self.backend.resume_download_url(id),
            filename: resume_filename(app.name()),
        })
    }

    /// Fetches the resume bytes for proxying; the payload is passed through unchecked.
    pub async fn fetch_resume(&self, id: ApplicationId) -> Result<(ResumeDownload, Bytes), AppError> {
        let download = self.download_resume(id).await?;
        match self.backend.fetch_resume(id).await {
            Ok(bytes) => Ok((download, bytes)),
            Err(e) => {
                let outcome = self
                    .manager
                    .lock()
                    .await
                    .reconcile_failure(e, "Failed to download resume");
                Err(match outcome {
                    Reconciled::Unauthenticated => self.unauthorized().await,
                    Reconciled::Failed(message) => AppError::Backend(message),
                    Reconciled::Applied => AppError::Backend("Failed to download resume".to_string()),
                })
            }
        }
    }

    // ── Local-only operations ─────────────────────────────────────────────

    pub async fn view_application(&self, id: ApplicationId) -> Result<ApplicationDetail, AppError> {
        self.manager
            .lock()
            .await
            .view_application(id)
            .ok_or_else(|| AppError::NotFound(format!("Job application {id} not found")))
    }

    pub async fn close_detail(&self) {
        self.manager.lock().await.close_detail();
    }

    pub async fn call_applicant(&self, id: ApplicationId) -> Result<ContactLink, AppError> {
        let app = self.require(id).await?;
        let phone = app
            .phone
            .as_deref()
            .filter(|p| !p.is_empty())
            .ok_or_else(|| AppError::Validation(format!("Application {id} has no phone number")))?;
        self.manager
            .lock()
            .await
            .notifications
            .success(format!("Calling {}...", app.display_name()));
        Ok(ContactLink {
            uri: tel_uri(phone),
        })
    }

    pub async fn email_applicant(&self, id: ApplicationId) -> Result<ContactLink, AppError> {
        let app = self.require(id).await?;
        let email = app
            .email
            .as_deref()
            .filter(|e| !e.is_empty())
            .ok_or_else(|| AppError::Validation(format!("Application {id} has no email address")))?;
        Ok(ContactLink {
            uri: mailto_uri(
                email,
                app.name(),
                app.job_title.as_deref().unwrap_or(""),
                &self.company_name,
            ),
        })
    }

    pub async fn toggle_select(&self, id: ApplicationId) -> Result<bool, AppError> {
        let mut manager = self.manager.lock().await;
        if manager.get(id).is_none() {
            return Err(AppError::NotFound(format!("Job application {id} not found")));
        }
        Ok(manager.toggle_select(id))
    }

    pub async fn toggle_select_all_on_page(&self) -> Vec<ApplicationId> {
        let mut manager = self.manager.lock().await;
        manager.toggle_select_all_on_page();
        manager.selected()
    }

    pub async fn set_filters(&self, query: Option<String>, status: Option<StatusFilter>) -> ListView {
        let mut manager = self.manager.lock().await;
        if let Some(query) = query {
            manager.set_query(query);
        }
        if let Some(status) = status {
            manager.set_status_filter(status);
        }
        manager.list_view()
    }

    pub async fn set_page(&self, page: usize) -> ListView {
        let mut manager = self.manager.lock().await;
        manager.set_page(page);
        manager.list_view()
    }

    pub async fn set_mode(&self, mode: ViewMode) -> ConsoleSnapshot {
        let mut manager = self.manager.lock().await;
        manager.set_mode(mode);
        manager.snapshot()
    }

    pub async fn list_view(&self) -> ListView {
        self.manager.lock().await.list_view()
    }

    pub async fn dashboard(&self) -> DashboardStats {
        self.manager.lock().await.dashboard()
    }

    pub async fn snapshot(&self) -> ConsoleSnapshot {
        self.manager.lock().await.snapshot()
    }

    pub async fn drain_notifications(&self) -> Vec<Notification> {
        self.manager.lock().await.notifications.drain()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::mock::{application, pending_applications, Failure, MockBackend};
    use crate::manager::notifications::NotificationLevel;
    use std::time::Duration;

    fn service_with(backend: Arc<MockBackend>) -> ApplicationsService {
        ApplicationsService::new(
            backend,
            ApplicationsManager::new(10, "/admin/login"),
            "Cybaem Tech",
        )
    }

    async fn loaded_service(records: Vec<JobApplication>) -> (Arc<MockBackend>, ApplicationsService) {
        let backend = Arc::new(MockBackend::with_records(records));
        let service = service_with(backend.clone());
        service.load_applications(true).await.unwrap();
        service.drain_notifications().await;
        (backend, service)
    }

    #[tokio::test]
    async fn test_load_success() {
        let (_, service) = loaded_service(pending_applications(12)).await;
        let snapshot = service.snapshot().await;
        assert_eq!(snapshot.total, 12);
        assert!(!snapshot.loading);
        let stats = service.dashboard().await;
        assert_eq!(stats.total, 12);
        assert_eq!(stats.pending, 12);
        assert_eq!(stats.rejection_rate, 0);
    }

    #[tokio::test]
    async fn test_load_unauthenticated_returns_redirect() {
        let backend = Arc::new(MockBackend::with_records(pending_applications(2)));
        backend.fail_load(Failure::Unauthenticated);
        let service = service_with(backend.clone());

        match service.load_applications(true).await {
            Err(AppError::Unauthorized { redirect }) => assert_eq!(redirect, "/admin/login"),
            other => panic!("expected Unauthorized, got {other:?}"),
        }
        assert_eq!(backend.call_count("get_all"), 1);
        assert_eq!(service.snapshot().await.redirect.as_deref(), Some("/admin/login"));
    }

    #[tokio::test]
    async fn test_load_failure_reports_backend_message() {
        let backend = Arc::new(MockBackend::with_records(pending_applications(2)));
        backend.fail_load(Failure::Rejected("Database offline"));
        let service = service_with(backend);
        match service.load_applications(false).await {
            Err(AppError::Backend(message)) => assert_eq!(message, "Database offline"),
            other => panic!("expected Backend error, got {other:?}"),
        }
        assert_eq!(service.snapshot().await.total, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_stale_load_does_not_overwrite_newer_result() {
        let backend = Arc::new(MockBackend::with_records(pending_applications(3)));
        *backend.load_delay.lock().unwrap() = Some(Duration::from_secs(5));
        let service = Arc::new(service_with(backend.clone()));

        let slow = {
            let service = Arc::clone(&service);
            tokio::spawn(async move { service.load_applications(true).await })
        };
        // let the slow load issue its ticket before the fast one starts
        tokio::time::sleep(Duration::from_millis(10)).await;

        *backend.load_delay.lock().unwrap() = None;
        backend.records.lock().unwrap().truncate(1);
        let fast = service.load_applications(false).await.unwrap();
        assert!(fast.applied);
        assert_eq!(fast.total, 1);

        let slow = slow.await.unwrap().unwrap();
        assert!(!slow.applied);
        assert_eq!(service.snapshot().await.total, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_confirmed_mutations_win_over_in_flight_refresh() {
        let (backend, service) = loaded_service(pending_applications(3)).await;
        *backend.load_delay.lock().unwrap() = Some(Duration::from_secs(5));
        let service = Arc::new(service);

        let refresh = {
            let service = Arc::clone(&service);
            tokio::spawn(async move { service.load_applications(false).await })
        };
        tokio::time::sleep(Duration::from_millis(10)).await;

        service.delete_application(2).await.unwrap();
        service
            .update_status(1, ApplicationStatus::Rejected)
            .await
            .unwrap();

        let refresh = refresh.await.unwrap().unwrap();
        assert!(!refresh.applied);

        let list = service.list_view().await;
        let ids: Vec<ApplicationId> = list.items.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![1, 3]);
        assert_eq!(list.items[0].status, ApplicationStatus::Rejected);
        assert!(!service.snapshot().await.refreshing);
    }

    #[tokio::test]
    async fn test_mutations_on_unknown_ids_never_reach_backend() {
        let (backend, service) = loaded_service(pending_applications(2)).await;
        assert!(matches!(
            service.update_status(9, ApplicationStatus::Shortlisted).await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            service.delete_application(9).await,
            Err(AppError::NotFound(_))
        ));
        assert_eq!(backend.call_count("update_status"), 0);
        assert_eq!(backend.call_count("delete:"), 0);
    }

    #[tokio::test]
    async fn test_bulk_delete_skips_ids_outside_collection() {
        let (backend, service) = loaded_service(pending_applications(3)).await;
        let report = service.bulk_delete(Some(vec![2, 42])).await.unwrap();
        assert_eq!(report.requested, 1);
        assert_eq!(report.deleted, vec![2]);
        assert_eq!(report.not_found, vec![42]);
        assert_eq!(backend.call_count("delete:42"), 0);

        let report = service.bulk_delete(Some(vec![77])).await.unwrap();
        assert_eq!(report.requested, 0);
        assert_eq!(report.not_found, vec![77]);
        assert_eq!(backend.call_count("delete:"), 1);
    }

    #[tokio::test]
    async fn test_update_status_applies_after_confirmation() {
        let (backend, service) = loaded_service(pending_applications(3)).await;
        let detail = service
            .update_status(2, ApplicationStatus::Contacted)
            .await
            .unwrap();
        assert_eq!(detail.status, ApplicationStatus::Contacted);
        assert_eq!(backend.call_count("update_status:2:contacted"), 1);

        let list = service.list_view().await;
        let statuses: Vec<ApplicationStatus> = list.items.iter().map(|r| r.status).collect();
        assert_eq!(
            statuses,
            vec![
                ApplicationStatus::Pending,
                ApplicationStatus::Contacted,
                ApplicationStatus::Pending
            ]
        );
    }

    #[tokio::test]
    async fn test_update_status_failure_leaves_state() {
        let (backend, service) = loaded_service(pending_applications(2)).await;
        backend.fail_update(Failure::Rejected("Invalid transition"));
        let err = service
            .update_status(1, ApplicationStatus::Rejected)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Backend(ref m) if m == "Invalid transition"));
        assert_eq!(service.dashboard().await.pending, 2);
    }

    #[tokio::test]
    async fn test_delete_and_selection_pruning() {
        let (_, service) = loaded_service(pending_applications(3)).await;
        service.toggle_select(1).await.unwrap();
        service.toggle_select(2).await.unwrap();
        service.delete_application(1).await.unwrap();

        let list = service.list_view().await;
        assert_eq!(list.page.total_items, 2);
        assert_eq!(list.selected, vec![2]);
        let notes = service.drain_notifications().await;
        assert_eq!(notes.last().unwrap().message, "Application deleted successfully");
    }

    #[tokio::test]
    async fn test_delete_unauthenticated() {
        let (backend, service) = loaded_service(pending_applications(2)).await;
        backend.fail_delete(2, Failure::Unauthenticated);
        let err = service.delete_application(2).await.unwrap_err();
        assert!(matches!(err, AppError::Unauthorized { .. }));
        assert_eq!(service.snapshot().await.total, 2);
    }

    #[tokio::test]
    async fn test_bulk_delete_selected() {
        let (backend, service) = loaded_service(pending_applications(12)).await;
        service.toggle_select_all_on_page().await;
        let report = service.bulk_delete(None).await.unwrap();
        assert_eq!(report.requested, 10);
        assert_eq!(report.deleted, (1..=10).collect::<Vec<_>>());
        assert_eq!(backend.call_count("delete:"), 10);

        let list = service.list_view().await;
        assert_eq!(list.page.total_items, 2);
        assert!(list.selected.is_empty());
    }

    #[tokio::test]
    async fn test_bulk_delete_partial_failure() {
        let (backend, service) = loaded_service(pending_applications(5)).await;
        backend.fail_delete(3, Failure::Rejected("locked"));
        let report = service.bulk_delete(Some(vec![2, 3, 4, 3])).await.unwrap();
        assert_eq!(report.requested, 3);
        assert_eq!(report.deleted, vec![2, 4]);
        assert_eq!(report.failed, vec![3]);
        assert_eq!(service.snapshot().await.total, 3);
        let notes = service.drain_notifications().await;
        assert_eq!(notes.last().unwrap().level, NotificationLevel::Warning);
    }

    #[tokio::test]
    async fn test_bulk_delete_empty_is_noop() {
        let (backend, service) = loaded_service(pending_applications(2)).await;
        let report = service.bulk_delete(None).await.unwrap();
        assert_eq!(report.requested, 0);
        assert_eq!(backend.call_count("delete:"), 0);
        assert!(service.drain_notifications().await.is_empty());
    }

    #[tokio::test]
    async fn test_download_resume() {
        let (backend, service) =
            loaded_service(vec![application(4, "Mary Ann Lee", ApplicationStatus::Pending)]).await;
        let download = service.download_resume(4).await.unwrap();
        assert_eq!(download.filename, "Resume_Mary_Ann_Lee.pdf");
        assert_eq!(download.url, backend.resume_download_url(4));

        let (_, bytes) = service.fetch_resume(4).await.unwrap();
        assert_eq!(&bytes[..], b"%PDF-resume-4");
        assert!(matches!(
            service.download_resume(99).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_contact_links() {
        let mut app = application(1, "Jane Doe", ApplicationStatus::Pending);
        app.phone = Some("+15550100".to_string());
        app.job_title = Some("Designer".to_string());
        let (_, service) = loaded_service(vec![app]).await;

        let call = service.call_applicant(1).await.unwrap();
        assert_eq!(call.uri, "tel:+15550100");
        let notes = service.drain_notifications().await;
        assert_eq!(notes[0].message, "Calling Jane Doe...");

        let email = service.email_applicant(1).await.unwrap();
        assert!(email.uri.starts_with("mailto:jane.doe@example.com?subject=Regarding"));
        assert!(email.uri.contains("Cybaem%20Tech"));
    }

    #[tokio::test]
    async fn test_view_and_close_detail() {
        let (_, service) = loaded_service(pending_applications(2)).await;
        let detail = service.view_application(2).await.unwrap();
        assert_eq!(detail.full_name, "Applicant 2");
        assert_eq!(service.snapshot().await.detail, Some(2));
        service.close_detail().await;
        assert_eq!(service.snapshot().await.detail, None);
        assert!(service.view_application(7).await.is_err());
    }
}

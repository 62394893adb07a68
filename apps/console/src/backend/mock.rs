use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;

use crate::backend::{ApplicationsBackend, BackendError};
use crate::models::{ApplicationId, ApplicationStatus, JobApplication};

/// Scripted failure for a backend call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Failure {
    Unauthenticated,
    Rejected(&'static str),
}

impl Failure {
    fn into_error(self) -> BackendError {
        match self {
            Failure::Unauthenticated => BackendError::Unauthenticated,
            Failure::Rejected(message) => BackendError::Rejected(Some(message.to_string())),
        }
    }
}

/// In-memory backend for tests.
#[derive(Default)]
pub struct MockBackend {
    pub records: Mutex<Vec<JobApplication>>,
    pub load_failure: Mutex<Option<Failure>>,
    pub update_failure: Mutex<Option<Failure>>,
    pub delete_failures: Mutex<HashMap<ApplicationId, Failure>>,
    pub load_delay: Mutex<Option<Duration>>,
    pub calls: Mutex<Vec<String>>,
}

impl MockBackend {
    pub fn with_records(records: Vec<JobApplication>) -> Self {
        Self {
            records: Mutex::new(records),
            ..Default::default()
        }
    }

    pub fn fail_load(&self, failure: Failure) {
        *self.load_failure.lock().unwrap() = Some(failure);
    }

    pub fn fail_update(&self, failure: Failure) {
        *self.update_failure.lock().unwrap() = Some(failure);
    }

    pub fn fail_delete(&self, id: ApplicationId, failure: Failure) {
        self.delete_failures.lock().unwrap().insert(id, failure);
    }

    pub fn call_count(&self, prefix: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.starts_with(prefix))
            .count()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl ApplicationsBackend for MockBackend {
    async fn get_all(&self) -> Result<Vec<JobApplication>, BackendError> {
        self.record("get_all".to_string());
        // the response reflects the records as they were when the request was issued
        let records = self.records.lock().unwrap().clone();
        let delay = *self.load_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(failure) = *self.load_failure.lock().unwrap() {
            return Err(failure.into_error());
        }
        Ok(records)
    }

    async fn update_status(
        &self,
        id: ApplicationId,
        status: ApplicationStatus,
    ) -> Result<(), BackendError> {
        self.record(format!("update_status:{id}:{}", status.as_str()));
        if let Some(failure) = *self.update_failure.lock().unwrap() {
            return Err(failure.into_error());
        }
        if let Some(app) = self.records.lock().unwrap().iter_mut().find(|a| a.id == id) {
            app.status = status;
        }
        Ok(())
    }

    async fn delete(&self, id: ApplicationId) -> Result<(), BackendError> {
        self.record(format!("delete:{id}"));
        if let Some(failure) = self.delete_failures.lock().unwrap().get(&id).copied() {
            return Err(failure.into_error());
        }
        self.records.lock().unwrap().retain(|a| a.id != id);
        Ok(())
    }

    fn resume_download_url(&self, id: ApplicationId) -> String {
        format!("http://backend.test/job-applications/{id}/resume")
    }

    async fn fetch_resume(&self, id: ApplicationId) -> Result<Bytes, BackendError> {
        self.record(format!("fetch_resume:{id}"));
        Ok(Bytes::from(format!("%PDF-resume-{id}")))
    }
}

/// Builds a record with the fields most tests care about.
pub fn application(id: ApplicationId, name: &str, status: ApplicationStatus) -> JobApplication {
    JobApplication {
        id,
        full_name: Some(name.to_string()),
        email: Some(format!("{}@example.com", name.to_lowercase().replace(' ', "."))),
        phone: Some(format!("+1555000{id:04}")),
        job_title: Some("Software Engineer".to_string()),
        department: Some("Engineering".to_string()),
        status,
        created_at: Some(format!("2024-01-{:02}T09:00:00Z", (id % 28) + 1)),
        ..Default::default()
    }
}

/// `count` pending records with ids 1..=count.
pub fn pending_applications(count: i64) -> Vec<JobApplication> {
    (1..=count)
        .map(|id| application(id, &format!("Applicant {id}"), ApplicationStatus::Pending))
        .collect()
}

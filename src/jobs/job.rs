use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::pipeline::ConversionResult;

/// Lifecycle of a conversion job: queued → running → {completed | failed}.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Queued,
    Running,
    Completed,
    Failed,
}

impl JobStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JobStatus::Queued => write!(f, "queued"),
            JobStatus::Running => write!(f, "running"),
            JobStatus::Completed => write!(f, "completed"),
            JobStatus::Failed => write!(f, "failed"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid job transition from {from} to {to}")]
pub struct InvalidTransition {
    pub from: JobStatus,
    pub to: JobStatus,
}

/// One submitted proof conversion.
///
/// Once terminal, exactly one of `result` and `error` is set; before that
/// neither is.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Job {
    pub id: String,
    pub status: JobStatus,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<ConversionResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Job {
    /// A fresh queued job with a random 32-hex-digit identifier.
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4().simple().to_string(),
            status: JobStatus::Queued,
            created_at: Utc::now(),
            started_at: None,
            completed_at: None,
            result: None,
            error: None,
        }
    }

    /// queued → running.
    pub fn start(&mut self) -> Result<(), InvalidTransition> {
        self.transition(JobStatus::Running)?;
        self.started_at = Some(Utc::now());
        Ok(())
    }

    /// running → completed, storing the result.
    pub fn complete(&mut self, result: ConversionResult) -> Result<(), InvalidTransition> {
        self.transition(JobStatus::Completed)?;
        self.completed_at = Some(Utc::now());
        self.result = Some(result);
        Ok(())
    }

    /// running → failed, storing the error message.
    pub fn fail(&mut self, error: impl Into<String>) -> Result<(), InvalidTransition> {
        self.transition(JobStatus::Failed)?;
        self.completed_at = Some(Utc::now());
        self.error = Some(error.into());
        Ok(())
    }

    fn transition(&mut self, to: JobStatus) -> Result<(), InvalidTransition> {
        let allowed = matches!(
            (self.status, to),
            (JobStatus::Queued, JobStatus::Running)
                | (JobStatus::Running, JobStatus::Completed)
                | (JobStatus::Running, JobStatus::Failed)
        );
        if !allowed {
            return Err(InvalidTransition {
                from: self.status,
                to,
            });
        }
        self.status = to;
        Ok(())
    }
}

impl Default for Job {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result() -> ConversionResult {
        ConversionResult {
            code: "theorem t : True := trivial".into(),
            valid: true,
        }
    }

    #[test]
    fn job_creation_defaults() {
        let job = Job::new();
        assert_eq!(job.status, JobStatus::Queued);
        assert_eq!(job.id.len(), 32);
        assert!(job.id.chars().all(|c| c.is_ascii_hexdigit()));
        assert!(job.started_at.is_none());
        assert!(job.completed_at.is_none());
        assert!(job.result.is_none());
        assert!(job.error.is_none());
    }

    #[test]
    fn identifiers_are_unique() {
        assert_ne!(Job::new().id, Job::new().id);
    }

    #[test]
    fn happy_path_sets_timestamps_and_result() {
        let mut job = Job::new();
        job.start().unwrap();
        assert_eq!(job.status, JobStatus::Running);
        assert!(job.started_at.is_some());

        job.complete(result()).unwrap();
        assert_eq!(job.status, JobStatus::Completed);
        assert!(job.completed_at.is_some());
        assert_eq!(job.result, Some(result()));
        assert!(job.error.is_none());
    }

    #[test]
    fn failure_sets_error_only() {
        let mut job = Job::new();
        job.start().unwrap();
        job.fail("boom").unwrap();
        assert_eq!(job.status, JobStatus::Failed);
        assert_eq!(job.error.as_deref(), Some("boom"));
        assert!(job.result.is_none());
    }

    #[test]
    fn queued_job_cannot_finish_directly() {
        let mut job = Job::new();
        let err = job.complete(result()).unwrap_err();
        assert_eq!(
            err,
            InvalidTransition {
                from: JobStatus::Queued,
                to: JobStatus::Completed
            }
        );
        assert!(job.result.is_none());
        assert!(job.fail("x").is_err());
    }

    #[test]
    fn terminal_states_never_transition() {
        let mut job = Job::new();
        job.start().unwrap();
        job.fail("first").unwrap();

        assert!(job.start().is_err());
        assert!(job.complete(result()).is_err());
        assert!(job.fail("second").is_err());
        assert_eq!(job.error.as_deref(), Some("first"));
        assert!(job.status.is_terminal());
    }

    #[test]
    fn serialization_omits_absent_fields() {
        let job = Job::new();
        let json = serde_json::to_value(&job).unwrap();
        assert_eq!(json["status"], "queued");
        assert_eq!(json["id"], job.id.as_str());
        let obj = json.as_object().unwrap();
        assert!(!obj.contains_key("result"));
        assert!(!obj.contains_key("error"));
        assert!(!obj.contains_key("started_at"));
    }

    #[test]
    fn completed_job_serializes_result() {
        let mut job = Job::new();
        job.start().unwrap();
        job.complete(result()).unwrap();
        let json = serde_json::to_value(&job).unwrap();
        assert_eq!(json["status"], "completed");
        assert_eq!(json["result"]["lean_code"], "theorem t : True := trivial");
        assert_eq!(json["result"]["valid"], true);
    }

    #[test]
    fn status_display() {
        assert_eq!(JobStatus::Queued.to_string(), "queued");
        assert_eq!(JobStatus::Running.to_string(), "running");
        assert_eq!(JobStatus::Completed.to_string(), "completed");
        assert_eq!(JobStatus::Failed.to_string(), "failed");
    }
}

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use super::job::Job;

/// In-memory table of jobs guarded by a single lock.
///
/// Callers only ever get clones out; updates go through [`JobStore::update`]
/// so a reader never sees a half-applied transition. Entries live for the
/// lifetime of the process.
#[derive(Debug, Default)]
pub struct JobStore {
    jobs: Mutex<HashMap<String, Job>>,
}

impl JobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, job: Job) {
        self.lock().insert(job.id.clone(), job);
    }

    /// Snapshot of one job.
    pub fn get(&self, id: &str) -> Option<Job> {
        self.lock().get(id).cloned()
    }

    /// Apply `f` to a job while holding the lock. `None` if the id is unknown.
    pub fn update<R>(&self, id: &str, f: impl FnOnce(&mut Job) -> R) -> Option<R> {
        self.lock().get_mut(id).map(f)
    }

    pub fn remove(&self, id: &str) -> Option<Job> {
        self.lock().remove(id)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    // Job transitions cannot panic halfway, so a poisoned table is still consistent.
    fn lock(&self) -> MutexGuard<'_, HashMap<String, Job>> {
        self.jobs.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jobs::JobStatus;
    use std::sync::Arc;

    #[test]
    fn get_returns_a_copy() {
        let store = JobStore::new();
        let job = Job::new();
        let id = job.id.clone();
        store.insert(job);

        let mut snapshot = store.get(&id).unwrap();
        snapshot.start().unwrap();

        assert_eq!(store.get(&id).unwrap().status, JobStatus::Queued);
    }

    #[test]
    fn unknown_id_is_none() {
        let store = JobStore::new();
        assert!(store.get("missing").is_none());
        assert!(store.update("missing", |job| job.start()).is_none());
    }

    #[test]
    fn update_applies_under_lock() {
        let store = JobStore::new();
        let job = Job::new();
        let id = job.id.clone();
        store.insert(job);

        store.update(&id, |job| job.start()).unwrap().unwrap();
        assert_eq!(store.get(&id).unwrap().status, JobStatus::Running);
    }

    #[test]
    fn remove_deletes_entry() {
        let store = JobStore::new();
        let job = Job::new();
        let id = job.id.clone();
        store.insert(job);
        assert!(store.remove(&id).is_some());
        assert_eq!(store.len(), 0);
    }

    #[test]
    fn concurrent_inserts_are_all_kept() {
        let store = Arc::new(JobStore::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || {
                    for _ in 0..25 {
                        store.insert(Job::new());
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(store.len(), 200);
    }
}

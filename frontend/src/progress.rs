use log::{info, warn};

use crate::api::{Backend, ProgressRecord, RemoteProgress};

/// Which benefits are unlocked and completed, and which one is highlighted.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressState {
    pub completed: Vec<bool>,
    pub unlocked_count: usize,
    pub active_index: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepStatus {
    Locked,
    Unlocked,
    Completed,
}

impl ProgressState {
    pub fn initial(len: usize) -> Self {
        Self {
            completed: vec![false; len],
            unlocked_count: len.min(1),
            active_index: 0,
        }
    }

    /// Fits stored progress onto the current benefit list.
    pub fn reconcile(remote: &RemoteProgress, len: usize) -> Self {
        let mut completed = remote.completed.clone().unwrap_or_default();
        completed.resize(len, false);

        let unlocked_count = if len <= 1 {
            len
        } else {
            let remote_unlocked = remote.unlocked_count.unwrap_or(1).max(1) as usize;
            remote_unlocked.min(len)
        };

        let last = len.saturating_sub(1);
        let active_index = remote
            .active_index
            .unwrap_or(0)
            .clamp(0, last as i64) as usize;
        // Never point at a step the user cannot open yet.
        let active_index = active_index.min(unlocked_count.saturating_sub(1));

        Self { completed, unlocked_count, active_index }
    }

    pub fn len(&self) -> usize {
        self.completed.len()
    }

    pub fn is_locked(&self, index: usize) -> bool {
        if self.len() <= 1 {
            return false;
        }
        index >= self.unlocked_count
    }

    pub fn status(&self, index: usize) -> StepStatus {
        if self.is_locked(index) {
            StepStatus::Locked
        } else if self.completed.get(index).copied().unwrap_or(false) {
            StepStatus::Completed
        } else {
            StepStatus::Unlocked
        }
    }

    /// Marks `index` complete and unlocks the next step. Returns false for an out of range index.
    pub fn advance(&mut self, index: usize) -> bool {
        let len = self.len();
        if index >= len {
            return false;
        }
        self.completed[index] = true;
        if len > 1 {
            self.unlocked_count = (self.unlocked_count + 1).min(len);
            if index + 1 < len {
                self.active_index = index + 1;
            }
        }
        true
    }
}

/// Progress for one user's benefit list, mirrored to the backend.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressTracker {
    user_id: String,
    benefit_keys: Vec<String>,
    state: ProgressState,
}

impl ProgressTracker {
    pub fn new(user_id: impl Into<String>, benefit_keys: Vec<String>) -> Self {
        let state = ProgressState::initial(benefit_keys.len());
        Self {
            user_id: user_id.into(),
            benefit_keys,
            state,
        }
    }

    /// Loads stored progress. Any failure leaves the default state in place.
    pub async fn load<B: Backend + ?Sized>(
        backend: &B,
        user_id: &str,
        benefit_keys: Vec<String>,
    ) -> Self {
        let mut tracker = Self::new(user_id, benefit_keys);
        match backend.load_progress(user_id).await {
            Ok(Some(remote)) => {
                tracker.state = ProgressState::reconcile(&remote, tracker.benefit_keys.len());
                info!(
                    "Restored progress for {}: {} of {} unlocked",
                    user_id,
                    tracker.state.unlocked_count,
                    tracker.benefit_keys.len()
                );
            }
            Ok(None) => {}
            Err(e) => warn!("Failed to load progress for {}, starting fresh: {}", user_id, e),
        }
        tracker
    }

    pub fn state(&self) -> &ProgressState {
        &self.state
    }

    pub fn is_locked(&self, index: usize) -> bool {
        self.state.is_locked(index)
    }

    /// Applies the completion locally and returns the record to persist.
    pub fn advance(&mut self, index: usize) -> Option<ProgressRecord> {
        if !self.state.advance(index) {
            return None;
        }
        Some(self.record())
    }

    pub fn record(&self) -> ProgressRecord {
        ProgressRecord {
            user_id: self.user_id.clone(),
            benefits: self.benefit_keys.clone(),
            completed: self.state.completed.clone(),
            unlocked_count: self.state.unlocked_count,
            active_index: self.state.active_index,
        }
    }
}

/// Best-effort save. The UI already shows the new state, so failures are only logged.
pub async fn persist<B: Backend + ?Sized>(backend: &B, record: &ProgressRecord) {
    if let Err(e) = backend.save_progress(record).await {
        warn!("Failed to save progress for {}: {}", record.user_id, e);
    }
}

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use crate::compare::CompareOutcome;
use crate::remote::RemoteIdentity;

/// Latest comparison outcome per remote.
#[derive(Debug, Default)]
pub struct UpdateRegistry {
    outcomes: Mutex<HashMap<RemoteIdentity, CompareOutcome>>,
}

impl UpdateRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace whatever was known about `remote`.
    pub fn record(&self, remote: RemoteIdentity, outcome: CompareOutcome) {
        self.outcomes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(remote, outcome);
    }

    #[must_use]
    pub fn get(&self, remote: &RemoteIdentity) -> Option<CompareOutcome> {
        self.outcomes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(remote)
            .cloned()
    }

    /// All recorded outcomes, ordered by remote.
    #[must_use]
    pub fn entries(&self) -> Vec<(RemoteIdentity, CompareOutcome)> {
        let mut entries: Vec<_> = self
            .outcomes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(remote, outcome)| (remote.clone(), outcome.clone()))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        entries
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.outcomes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

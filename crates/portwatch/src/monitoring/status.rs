use std::collections::HashMap;

use tracing::debug;

use super::types::{ProbeResult, TransitionEvent};

/// Last known probe result per endpoint key (`host:port`)
///
/// Owned by the scheduler loop and mutated only by [`StatusStore::diff_and_update`].
#[derive(Debug, Default)]
pub struct StatusStore {
    previous: HashMap<String, ProbeResult>,
}

impl StatusStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compare each result with the stored one, then store it.
    ///
    /// Endpoints seen for the first time only establish a baseline and yield no
    /// event. Every other endpoint yields an event, whether or not its
    /// reachability changed.
    pub fn diff_and_update(&mut self, results: Vec<ProbeResult>) -> Vec<TransitionEvent> {
        let mut events = Vec::with_capacity(results.len());

        for current in results {
            let previous = self.previous.insert(current.key(), current.clone());

            match previous {
                Some(previous) => events.push(TransitionEvent::new(current, Some(previous))),
                None => debug!(
                    "Baseline established for {} ({}): {}",
                    current.endpoint,
                    current.key(),
                    current.status()
                ),
            }
        }

        events
    }

    pub fn get(&self, key: &str) -> Option<&ProbeResult> {
        self.previous.get(key)
    }

    pub fn len(&self) -> usize {
        self.previous.len()
    }

    pub fn is_empty(&self) -> bool {
        self.previous.is_empty()
    }
}

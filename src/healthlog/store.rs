//! In-memory health log
//!
//! An ordered, append-only sequence of observations. Insertion order is
//! the only order the log knows about; dates are opaque labels.

use tracing::{debug, trace};

use crate::types::{NewObservation, Observation};

/// Ordered store of observations for one session
#[derive(Debug, Clone, Default)]
pub struct HealthLog {
    observations: Vec<Observation>,
}

impl HealthLog {
    /// Create an empty log
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a log from historical rows.
    ///
    /// Rows are taken as-is: no normalization and no ratio recomputation.
    pub fn initialize(seed: Vec<Observation>) -> Self {
        debug!(rows = seed.len(), "Health log initialized");
        Self { observations: seed }
    }

    /// Append one observation built from form values and return it.
    ///
    /// The log grows by exactly one row and earlier rows are untouched.
    pub fn append(&mut self, entry: NewObservation) -> &Observation {
        let observation = Observation::from_entry(entry);
        trace!(
            user = %observation.user,
            date = %observation.date,
            ratio = ?observation.ratio,
            "Appending observation"
        );
        self.observations.push(observation);
        let index = self.observations.len() - 1;
        &self.observations[index]
    }

    /// Observations recorded for `user`, in insertion order
    pub fn filter_by_user(&self, user: &str) -> Vec<&Observation> {
        self.observations
            .iter()
            .filter(|o| o.user == user)
            .collect()
    }

    /// Distinct users in order of first appearance
    pub fn users(&self) -> Vec<&str> {
        let mut users: Vec<&str> = Vec::new();
        for obs in &self.observations {
            if !users.contains(&obs.user.as_str()) {
                users.push(&obs.user);
            }
        }
        users
    }

    /// `preferred` if it has rows, otherwise the first known user
    pub fn default_user(&self, preferred: &str) -> Option<&str> {
        let users = self.users();
        if users.contains(&preferred) {
            return users.into_iter().find(|u| *u == preferred);
        }
        users.into_iter().next()
    }

    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }
}

impl<'a> IntoIterator for &'a HealthLog {
    type Item = &'a Observation;
    type IntoIter = std::slice::Iter<'a, Observation>;

    fn into_iter(self) -> Self::IntoIter {
        self.observations.iter()
    }
}

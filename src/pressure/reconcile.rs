//! Merging forecast and observation series

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashSet;
use tracing::debug;

use crate::models::PressureSample;

/// Chronologically ordered, deduplicated pressure series
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ReconciledSeries(Vec<PressureSample>);

impl ReconciledSeries {
    #[must_use]
    pub fn samples(&self) -> &[PressureSample] {
        &self.0
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PressureSample> {
        self.0.iter()
    }

    #[must_use]
    pub fn into_inner(self) -> Vec<PressureSample> {
        self.0
    }
}

impl<'a> IntoIterator for &'a ReconciledSeries {
    type Item = &'a PressureSample;
    type IntoIter = std::slice::Iter<'a, PressureSample>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Merge both series. Observations always win over a forecast sample at the
/// exact same instant; observations sharing an instant are all kept.
#[must_use]
pub fn reconcile(forecast: &[PressureSample], observations: &[PressureSample]) -> ReconciledSeries {
    let observed: HashSet<DateTime<Utc>> = observations.iter().map(|s| s.timestamp).collect();

    let mut combined: Vec<PressureSample> = observations.to_vec();
    let mut shadowed = 0usize;
    for sample in forecast {
        if observed.contains(&sample.timestamp) {
            shadowed += 1;
        } else {
            combined.push(sample.clone());
        }
    }

    combined.sort_by_key(|sample| sample.timestamp);
    debug!(
        "Reconciled {} samples ({} forecast samples replaced by observations)",
        combined.len(),
        shadowed
    );
    ReconciledSeries(combined)
}

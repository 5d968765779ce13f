//! Layer bookkeeping for a charm's element set
//!
//! Foreground elements occupy layers 1..=N with no gaps; the background sits
//! at layer 0. Reordering replaces the whole foreground layering in one step,
//! so the plan is computed here and applied atomically by the store.

use std::collections::HashSet;
use uuid::Uuid;

use crate::error::CharmError;

/// One element's target layer in a bulk rewrite
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayerAssignment {
    pub element_id: Uuid,
    pub layer: i32,
}

/// Plan a full reorder of a charm's foreground elements.
///
/// `current` is the set of foreground element IDs as stored; `requested` is
/// the caller's list, front-to-back. The request must be a permutation of
/// `current`: duplicates, missing IDs, and unknown IDs (including the
/// background element's) all fail with `ReorderMismatch` before anything is
/// written. On success, the element at position i receives layer i + 1 —
/// final layers are determined solely by list position.
pub fn plan_reorder(
    current: &[Uuid],
    requested: &[Uuid],
) -> Result<Vec<LayerAssignment>, CharmError> {
    let mut requested_set = HashSet::with_capacity(requested.len());
    for id in requested {
        if !requested_set.insert(*id) {
            return Err(CharmError::ReorderMismatch(format!(
                "element {id} appears more than once"
            )));
        }
    }

    let current_set: HashSet<Uuid> = current.iter().copied().collect();
    if requested_set != current_set {
        let missing = current_set.difference(&requested_set).count();
        let unknown = requested_set.difference(&current_set).count();
        return Err(CharmError::ReorderMismatch(format!(
            "{missing} element(s) missing, {unknown} not part of this charm's foreground"
        )));
    }

    Ok(requested
        .iter()
        .enumerate()
        .map(|(position, id)| LayerAssignment {
            element_id: *id,
            layer: position as i32 + 1,
        })
        .collect())
}

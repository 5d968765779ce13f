//! Publish-readiness rules for the charm lifecycle
//!
//! Charm states: Draft ⇄ Published. Publishing is guarded by the readiness
//! rules below; withdrawing to draft is always allowed. Both transitions are
//! idempotent when the charm is already in the target state.

use serde::{Deserialize, Serialize};

use crate::domain::entities::Charm;

/// A publish-readiness rule a draft charm can violate.
///
/// All rules are evaluated together so one response reports everything the
/// user still has to fix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PublishRule {
    ColorApplied,
    FrameApplied,
    HasForegroundElement,
}

impl PublishRule {
    /// Stable identifier reported to callers
    pub fn id(&self) -> &'static str {
        match self {
            PublishRule::ColorApplied => "color_applied",
            PublishRule::FrameApplied => "frame_applied",
            PublishRule::HasForegroundElement => "has_foreground_element",
        }
    }
}

impl std::fmt::Display for PublishRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.id())
    }
}

/// Evaluate every publish-readiness rule against a charm.
///
/// Returns the full set of violated rules, in declaration order; empty means
/// the charm may be published. `foreground_count` is the charm's current
/// non-background element count.
pub fn publish_violations(charm: &Charm, foreground_count: i64) -> Vec<PublishRule> {
    let mut violations = Vec::new();

    if charm.color_id.is_none() {
        violations.push(PublishRule::ColorApplied);
    }
    if charm.frame_id.is_none() {
        violations.push(PublishRule::FrameApplied);
    }
    if foreground_count == 0 {
        violations.push(PublishRule::HasForegroundElement);
    }

    violations
}

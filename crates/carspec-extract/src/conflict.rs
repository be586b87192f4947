//! Write policy for canonical slots that are set more than once per page.

use carspec_core::ConflictPolicy;

/// Outcome of offering a value to a slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// Slot was empty.
    Fill,
    /// Slot held a different value; the new one wins.
    Replace,
    /// Slot held a different value; the old one stays.
    Keep,
    /// Slot already held the same value.
    Unchanged,
}

impl Resolution {
    /// Whether the incoming value should be written.
    pub fn writes(&self) -> bool {
        matches!(self, Resolution::Fill | Resolution::Replace)
    }

    /// Whether two different values competed for the slot.
    pub fn is_conflict(&self) -> bool {
        matches!(self, Resolution::Replace | Resolution::Keep)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConflictResolver {
    policy: ConflictPolicy,
}

impl ConflictResolver {
    pub fn new(policy: ConflictPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> ConflictPolicy {
        self.policy
    }

    pub fn resolve(&self, current: Option<&str>, incoming: &str) -> Resolution {
        match current {
            None => Resolution::Fill,
            Some(existing) if existing == incoming => Resolution::Unchanged,
            Some(_) => match self.policy {
                ConflictPolicy::LastWriteWins => Resolution::Replace,
                ConflictPolicy::FirstWriteWins => Resolution::Keep,
            },
        }
    }
}

//! Per-kind in-flight guard for toggle mutations.
//!
//! While a like toggle is pending, further like clicks are ignored; same for
//! follows. The two kinds do not block each other.

use crate::model::relation::RelationKind;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[derive(Debug, Clone, Default)]
pub struct MutationGate {
    like: Arc<AtomicBool>,
    follow: Arc<AtomicBool>,
}

impl MutationGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims the slot for `kind`. Returns `None` while another mutation of
    /// the same kind holds it.
    pub fn try_begin(&self, kind: RelationKind) -> Option<InFlight> {
        let flag = self.flag(kind);
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()?;
        Some(InFlight {
            kind,
            flag: Arc::clone(flag),
        })
    }

    pub fn is_pending(&self, kind: RelationKind) -> bool {
        self.flag(kind).load(Ordering::Acquire)
    }

    fn flag(&self, kind: RelationKind) -> &Arc<AtomicBool> {
        match kind {
            RelationKind::Like => &self.like,
            RelationKind::Follow => &self.follow,
        }
    }
}

/// Held for the duration of one mutation; releases the slot on drop.
#[derive(Debug)]
pub struct InFlight {
    kind: RelationKind,
    flag: Arc<AtomicBool>,
}

impl InFlight {
    pub fn kind(&self) -> RelationKind {
        self.kind
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::MutationGate;
    use crate::model::relation::RelationKind;

    #[test]
    fn second_mutation_of_same_kind_is_rejected_until_release() {
        let gate = MutationGate::new();
        let first = gate.try_begin(RelationKind::Like).expect("slot should be free");
        assert!(gate.try_begin(RelationKind::Like).is_none());
        assert!(gate.is_pending(RelationKind::Like));

        drop(first);
        assert!(!gate.is_pending(RelationKind::Like));
        assert!(gate.try_begin(RelationKind::Like).is_some());
    }

    #[test]
    fn kinds_are_independent_and_clones_share_state() {
        let gate = MutationGate::new();
        let shared = gate.clone();
        let _like = gate.try_begin(RelationKind::Like).unwrap();
        let follow = shared.try_begin(RelationKind::Follow);
        assert!(follow.is_some());
        assert_eq!(follow.unwrap().kind(), RelationKind::Follow);
        assert!(shared.try_begin(RelationKind::Like).is_none());
    }
}

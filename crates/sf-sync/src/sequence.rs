//! Latest-intent-wins bookkeeping for overlapping requests.
//!
//! A key's current ticket is the newest one still able to change the page. A
//! failed request hands the key back to the newest older ticket in flight, so
//! a success that raced a later failure is still applied.

use sf_api_types::{ListKind, ProductId};
use std::cell::{Cell, RefCell};
use std::collections::{BTreeSet, HashMap};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SyncKey {
    Mutation(ListKind, ProductId),
    ClearCart,
    Menu(ListKind),
    Grid,
}

impl SyncKey {
    /// The list whose menu reflects requests under this key.
    pub fn list(&self) -> Option<ListKind> {
        match self {
            SyncKey::Mutation(kind, _) => Some(*kind),
            SyncKey::ClearCart => Some(ListKind::Cart),
            SyncKey::Menu(_) | SyncKey::Grid => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    key: SyncKey,
    seq: u64,
}

impl Ticket {
    pub fn key(&self) -> SyncKey {
        self.key
    }

    pub fn seq(&self) -> u64 {
        self.seq
    }
}

/// What retiring a failed ticket did to its key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Release {
    /// Nothing changed: a newer ticket owns the key, or nothing is pending.
    Idle,
    /// An older in-flight ticket is current again.
    FellBack(u64),
    /// A successful reply was dropped for this ticket's sake and nothing older
    /// is in flight; the page must be re-read from the server.
    Resync,
}

#[derive(Debug, Default)]
struct Slot {
    current: u64,
    in_flight: BTreeSet<u64>,
    dropped_success: bool,
}

#[derive(Debug, Default)]
pub struct RequestSequencer {
    next: Cell<u64>,
    slots: RefCell<HashMap<SyncKey, Slot>>,
}

impl RequestSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a ticket that supersedes every earlier ticket for `key`.
    pub fn issue(&self, key: SyncKey) -> Ticket {
        let seq = self.next.get() + 1;
        self.next.set(seq);
        let mut slots = self.slots.borrow_mut();
        let slot = slots.entry(key).or_default();
        slot.current = seq;
        slot.in_flight.insert(seq);
        Ticket { key, seq }
    }

    pub fn is_current(&self, ticket: &Ticket) -> bool {
        self.slots
            .borrow()
            .get(&ticket.key)
            .is_some_and(|slot| slot.current == ticket.seq)
    }

    /// Retire a ticket whose request succeeded. Returns whether its reply may
    /// be applied.
    pub fn complete(&self, ticket: &Ticket) -> bool {
        let mut slots = self.slots.borrow_mut();
        let Some(slot) = slots.get_mut(&ticket.key) else {
            return false;
        };
        slot.in_flight.remove(&ticket.seq);
        let current = slot.current == ticket.seq;
        slot.dropped_success = !current;
        Self::prune(&mut slots, ticket.key);
        current
    }

    /// Retire a ticket whose request failed.
    pub fn release(&self, ticket: &Ticket) -> Release {
        let mut slots = self.slots.borrow_mut();
        let Some(slot) = slots.get_mut(&ticket.key) else {
            return Release::Idle;
        };
        slot.in_flight.remove(&ticket.seq);
        let released = if slot.current != ticket.seq {
            Release::Idle
        } else if let Some(&older) = slot.in_flight.last() {
            slot.current = older;
            Release::FellBack(older)
        } else if slot.dropped_success {
            slot.dropped_success = false;
            Release::Resync
        } else {
            Release::Idle
        };
        Self::prune(&mut slots, ticket.key);
        released
    }

    fn prune(slots: &mut HashMap<SyncKey, Slot>, key: SyncKey) {
        if slots
            .get(&key)
            .is_some_and(|slot| slot.in_flight.is_empty() && !slot.dropped_success)
        {
            slots.remove(&key);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn later_ticket_supersedes_earlier_for_same_key() {
        let seq = RequestSequencer::new();
        let first = seq.issue(SyncKey::Grid);
        let second = seq.issue(SyncKey::Grid);
        assert!(!seq.is_current(&first));
        assert!(seq.is_current(&second));
        assert!(second.seq() > first.seq());
    }

    #[test]
    fn keys_are_independent() {
        let seq = RequestSequencer::new();
        let a = seq.issue(SyncKey::Mutation(ListKind::Wishlist, ProductId(1)));
        let b = seq.issue(SyncKey::Mutation(ListKind::Wishlist, ProductId(2)));
        let menu = seq.issue(SyncKey::Menu(ListKind::Wishlist));
        assert!(seq.is_current(&a));
        assert!(seq.is_current(&b));
        assert!(seq.is_current(&menu));
    }

    #[test]
    fn failed_newer_ticket_hands_key_back() {
        let seq = RequestSequencer::new();
        let key = SyncKey::Mutation(ListKind::Cart, ProductId(3));
        let first = seq.issue(key);
        let second = seq.issue(key);

        assert_eq!(seq.release(&second), Release::FellBack(first.seq()));
        assert!(seq.is_current(&first));
        assert!(seq.complete(&first));
    }

    #[test]
    fn failure_after_dropped_success_asks_for_resync() {
        let seq = RequestSequencer::new();
        let first = seq.issue(SyncKey::ClearCart);
        let second = seq.issue(SyncKey::ClearCart);

        assert!(!seq.complete(&first));
        assert_eq!(seq.release(&second), Release::Resync);
        assert_eq!(seq.release(&second), Release::Idle);
    }

    #[test]
    fn failure_of_a_superseded_ticket_changes_nothing() {
        let seq = RequestSequencer::new();
        let first = seq.issue(SyncKey::Grid);
        let second = seq.issue(SyncKey::Grid);

        assert_eq!(seq.release(&first), Release::Idle);
        assert!(seq.is_current(&second));
        assert!(seq.complete(&second));
        assert_eq!(seq.release(&seq.issue(SyncKey::Grid)), Release::Idle);
    }
}

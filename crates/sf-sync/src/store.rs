//! Observable mirror of the server's cart and wishlist.
//!
//! Every surface that shows a product (grid card, modal, dropdown row, cart
//! page) renders from this store by subscribing to [`StoreEvent`]s. Entries only
//! change in response to a successful server reply, so all mirrors of a product
//! converge on the same value.

use crate::money::Money;
use sf_api_types::{ListKind, ProductId};
use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Membership {
    /// Nothing heard from the server yet; keep the server-rendered markup.
    Unknown,
    In,
    Out,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartLine {
    pub product_id: ProductId,
    pub quantity: u32,
    pub unit_price: Option<Money>,
}

impl CartLine {
    pub fn subtotal(&self) -> Option<Money> {
        self.unit_price.and_then(|price| price.times(self.quantity))
    }
}

/// One row read back out of a freshly inserted menu fragment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuEntry {
    pub product_id: ProductId,
    pub quantity: Option<u32>,
    pub unit_price: Option<Money>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEvent {
    Membership {
        kind: ListKind,
        product: ProductId,
        member: bool,
    },
    Quantity {
        product: ProductId,
        quantity: u32,
        unit_price: Option<Money>,
    },
    Count {
        kind: ListKind,
        count: usize,
    },
}

type Listener = Rc<dyn Fn(&StoreEvent)>;

#[derive(Default)]
struct StoreState {
    members: HashMap<(ListKind, ProductId), bool>,
    lines: BTreeMap<ProductId, CartLine>,
    counts: HashMap<ListKind, usize>,
}

#[derive(Default)]
pub struct MirrorStore {
    state: RefCell<StoreState>,
    listeners: RefCell<Vec<Listener>>,
}

impl MirrorStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, listener: impl Fn(&StoreEvent) + 'static) {
        self.listeners.borrow_mut().push(Rc::new(listener));
    }

    pub fn membership(&self, kind: ListKind, product: ProductId) -> Membership {
        match self.state.borrow().members.get(&(kind, product)) {
            Some(true) => Membership::In,
            Some(false) => Membership::Out,
            None => Membership::Unknown,
        }
    }

    pub fn line(&self, product: ProductId) -> Option<CartLine> {
        self.state.borrow().lines.get(&product).cloned()
    }

    pub fn quantity(&self, product: ProductId) -> Option<u32> {
        self.state.borrow().lines.get(&product).map(|line| line.quantity)
    }

    pub fn lines(&self) -> Vec<CartLine> {
        self.state.borrow().lines.values().cloned().collect()
    }

    pub fn count(&self, kind: ListKind) -> Option<usize> {
        self.state.borrow().counts.get(&kind).copied()
    }

    /// Record a server verdict for one product. Always notifies, so every
    /// mirror replays the change even when the value is the same.
    pub fn set_membership(&self, kind: ListKind, product: ProductId, member: bool) {
        {
            let mut state = self.state.borrow_mut();
            state.members.insert((kind, product), member);
            if kind == ListKind::Cart && !member {
                state.lines.remove(&product);
            }
        }
        self.emit(vec![StoreEvent::Membership {
            kind,
            product,
            member,
        }]);
    }

    pub fn set_count(&self, kind: ListKind, count: usize) {
        self.state.borrow_mut().counts.insert(kind, count);
        self.emit(vec![StoreEvent::Count { kind, count }]);
    }

    /// Replace one list wholesale with the rows of a server-rendered menu.
    /// Only entries whose value actually changed are announced.
    pub fn replace_list(&self, kind: ListKind, entries: &[MenuEntry]) {
        let mut events = Vec::new();
        {
            let mut state = self.state.borrow_mut();

            let present: Vec<ProductId> = entries.iter().map(|e| e.product_id).collect();
            let known: Vec<ProductId> = state
                .members
                .iter()
                .filter(|((k, _), member)| *k == kind && **member)
                .map(|((_, id), _)| *id)
                .collect();
            for product in known {
                if !present.contains(&product) {
                    state.members.insert((kind, product), false);
                    events.push(StoreEvent::Membership {
                        kind,
                        product,
                        member: false,
                    });
                }
            }

            for entry in entries {
                let previous = state.members.insert((kind, entry.product_id), true);
                if previous != Some(true) {
                    events.push(StoreEvent::Membership {
                        kind,
                        product: entry.product_id,
                        member: true,
                    });
                }
            }

            if kind == ListKind::Cart {
                let mut lines = BTreeMap::new();
                for entry in entries {
                    let Some(quantity) = entry.quantity else {
                        continue;
                    };
                    let line = CartLine {
                        product_id: entry.product_id,
                        quantity,
                        unit_price: entry.unit_price,
                    };
                    if state.lines.get(&entry.product_id) != Some(&line) {
                        events.push(StoreEvent::Quantity {
                            product: entry.product_id,
                            quantity,
                            unit_price: entry.unit_price,
                        });
                    }
                    lines.insert(entry.product_id, line);
                }
                state.lines = lines;
            }
        }
        self.emit(events);
    }

    /// Mark every known member of `kind` as absent.
    pub fn clear(&self, kind: ListKind) {
        let mut events = Vec::new();
        {
            let mut state = self.state.borrow_mut();
            for ((k, product), member) in state.members.iter_mut() {
                if *k == kind && *member {
                    *member = false;
                    events.push(StoreEvent::Membership {
                        kind,
                        product: *product,
                        member: false,
                    });
                }
            }
            if kind == ListKind::Cart {
                state.lines.clear();
            }
        }
        self.emit(events);
    }

    /// Announce every known entry again, e.g. after new markup was inserted.
    pub fn resync(&self) {
        let events = {
            let state = self.state.borrow();
            let mut events: Vec<StoreEvent> = state
                .members
                .iter()
                .map(|((kind, product), member)| StoreEvent::Membership {
                    kind: *kind,
                    product: *product,
                    member: *member,
                })
                .collect();
            events.extend(state.lines.values().map(|line| StoreEvent::Quantity {
                product: line.product_id,
                quantity: line.quantity,
                unit_price: line.unit_price,
            }));
            events
        };
        self.emit(events);
    }

    fn emit(&self, events: Vec<StoreEvent>) {
        if events.is_empty() {
            return;
        }
        let listeners: Vec<Listener> = self.listeners.borrow().clone();
        for event in &events {
            for listener in &listeners {
                listener(event);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recorder(store: &MirrorStore) -> Rc<RefCell<Vec<StoreEvent>>> {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        store.subscribe(move |event| sink.borrow_mut().push(event.clone()));
        seen
    }

    #[test]
    fn unknown_until_server_answers() {
        let store = MirrorStore::new();
        assert_eq!(store.membership(ListKind::Wishlist, ProductId(1)), Membership::Unknown);
        store.set_membership(ListKind::Wishlist, ProductId(1), true);
        assert_eq!(store.membership(ListKind::Wishlist, ProductId(1)), Membership::In);
    }

    #[test]
    fn replace_list_drops_missing_and_reports_changes_only() {
        let store = MirrorStore::new();
        store.set_membership(ListKind::Cart, ProductId(1), true);
        store.set_membership(ListKind::Cart, ProductId(2), true);
        let seen = recorder(&store);

        store.replace_list(
            ListKind::Cart,
            &[MenuEntry {
                product_id: ProductId(2),
                quantity: Some(3),
                unit_price: Some(Money::from_cents(500)),
            }],
        );

        assert_eq!(store.membership(ListKind::Cart, ProductId(1)), Membership::Out);
        assert_eq!(store.quantity(ProductId(2)), Some(3));
        assert_eq!(
            *seen.borrow(),
            vec![
                StoreEvent::Membership {
                    kind: ListKind::Cart,
                    product: ProductId(1),
                    member: false
                },
                StoreEvent::Quantity {
                    product: ProductId(2),
                    quantity: 3,
                    unit_price: Some(Money::from_cents(500))
                },
            ]
        );
    }

    #[test]
    fn removing_from_cart_drops_the_line() {
        let store = MirrorStore::new();
        store.replace_list(
            ListKind::Cart,
            &[MenuEntry {
                product_id: ProductId(4),
                quantity: Some(2),
                unit_price: None,
            }],
        );
        store.set_membership(ListKind::Cart, ProductId(4), false);
        assert_eq!(store.line(ProductId(4)), None);
    }

    #[test]
    fn clear_only_touches_one_list() {
        let store = MirrorStore::new();
        store.set_membership(ListKind::Cart, ProductId(1), true);
        store.set_membership(ListKind::Wishlist, ProductId(1), true);
        store.clear(ListKind::Cart);
        assert_eq!(store.membership(ListKind::Cart, ProductId(1)), Membership::Out);
        assert_eq!(store.membership(ListKind::Wishlist, ProductId(1)), Membership::In);
    }

    #[test]
    fn listeners_may_read_the_store() {
        let store = Rc::new(MirrorStore::new());
        let reader = store.clone();
        let observed = Rc::new(RefCell::new(None));
        let sink = observed.clone();
        store.subscribe(move |event| {
            if let StoreEvent::Membership { kind, product, .. } = event {
                *sink.borrow_mut() = Some(reader.membership(*kind, *product));
            }
        });
        store.set_membership(ListKind::Wishlist, ProductId(9), false);
        assert_eq!(*observed.borrow(), Some(Membership::Out));
    }
}

//! Class arithmetic for cart/wishlist toggle buttons.
//!
//! The browser crate applies a [`ClassDelta`] to a live `classList`; tests apply
//! it to a plain set. The transient `pop` class is handled separately because it
//! is removed by a timer, not by the next state change.

use sf_api_types::{ListKind, ProductId};
use std::collections::BTreeSet;

pub const ACTIVE_CLASS: &str = "active";
pub const POP_CLASS: &str = "pop";
pub const POP_DURATION_MS: u32 = 350;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassDelta {
    pub button_add: &'static [&'static str],
    pub button_remove: &'static [&'static str],
    pub icon_add: &'static [&'static str],
    pub icon_remove: &'static [&'static str],
}

impl ClassDelta {
    pub fn apply(&self, button: &mut BTreeSet<String>, icon: Option<&mut BTreeSet<String>>) {
        for class in self.button_remove {
            button.remove(*class);
        }
        for class in self.button_add {
            button.insert((*class).to_owned());
        }
        if let Some(icon) = icon {
            for class in self.icon_remove {
                icon.remove(*class);
            }
            for class in self.icon_add {
                icon.insert((*class).to_owned());
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleLook {
    Wishlist,
    Cart,
}

impl ToggleLook {
    pub fn for_kind(kind: ListKind) -> Self {
        match kind {
            ListKind::Wishlist => ToggleLook::Wishlist,
            ListKind::Cart => ToggleLook::Cart,
        }
    }

    /// Every button class that mirrors this list on cards and modals.
    pub fn button_selectors(&self) -> &'static [&'static str] {
        match self {
            ToggleLook::Wishlist => &[".wishlist-btn", ".modal-wishlist-btn"],
            ToggleLook::Cart => &[".cart-btn", ".modal-cart-btn", "[data-action=\"add-cart\"]"],
        }
    }

    /// Selector matching every mirror of `product`.
    pub fn product_selector(&self, product: ProductId) -> String {
        self.button_selectors()
            .iter()
            .map(|sel| format!("{sel}[data-product-id=\"{product}\"]"))
            .collect::<Vec<_>>()
            .join(", ")
    }

    pub fn delta(&self, active: bool) -> ClassDelta {
        match (self, active) {
            (ToggleLook::Wishlist, true) => ClassDelta {
                button_add: &[ACTIVE_CLASS],
                button_remove: &[],
                icon_add: &["fas"],
                icon_remove: &["far"],
            },
            (ToggleLook::Wishlist, false) => ClassDelta {
                button_add: &[],
                button_remove: &[ACTIVE_CLASS],
                icon_add: &["far"],
                icon_remove: &["fas"],
            },
            (ToggleLook::Cart, true) => ClassDelta {
                button_add: &[ACTIVE_CLASS],
                button_remove: &[],
                icon_add: &["cart-filled"],
                icon_remove: &[],
            },
            (ToggleLook::Cart, false) => ClassDelta {
                button_add: &[],
                button_remove: &[ACTIVE_CLASS],
                icon_add: &[],
                icon_remove: &["cart-filled"],
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(classes: &[&str]) -> BTreeSet<String> {
        classes.iter().map(|c| (*c).to_owned()).collect()
    }

    #[test]
    fn wishlist_round_trip_restores_initial_classes() {
        let look = ToggleLook::Wishlist;
        let mut button = set(&["wishlist-btn"]);
        let mut icon = set(&["far", "fa-heart"]);
        let (button0, icon0) = (button.clone(), icon.clone());

        look.delta(true).apply(&mut button, Some(&mut icon));
        assert!(button.contains("active"));
        assert!(icon.contains("fas") && !icon.contains("far"));

        look.delta(false).apply(&mut button, Some(&mut icon));
        assert_eq!(button, button0);
        assert_eq!(icon, icon0);
    }

    #[test]
    fn repeated_state_is_idempotent() {
        let look = ToggleLook::Cart;
        let mut button = set(&["cart-btn"]);
        let mut icon = set(&["fa", "fa-cart-shopping"]);
        look.delta(true).apply(&mut button, Some(&mut icon));
        let once = (button.clone(), icon.clone());
        look.delta(true).apply(&mut button, Some(&mut icon));
        assert_eq!((button, icon), once);
    }

    #[test]
    fn product_selector_covers_every_surface() {
        let selector = ToggleLook::Cart.product_selector(ProductId(12));
        assert_eq!(
            selector,
            ".cart-btn[data-product-id=\"12\"], .modal-cart-btn[data-product-id=\"12\"], \
             [data-action=\"add-cart\"][data-product-id=\"12\"]"
        );
    }
}

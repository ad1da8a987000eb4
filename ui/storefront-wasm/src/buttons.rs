//! Store subscribers for toggle buttons and badges.

use crate::dom;
use gloo_timers::future::TimeoutFuture;
use sf_api_types::{ListKind, ProductId};
use sf_sync::StoreEvent;
use sf_sync::look::{ClassDelta, POP_CLASS, POP_DURATION_MS, ToggleLook};
use web_sys::Element;

fn apply(el: &Element, delta: &ClassDelta) {
    let classes = el.class_list();
    for class in delta.button_remove {
        let _ = classes.remove_1(class);
    }
    for class in delta.button_add {
        let _ = classes.add_1(class);
    }
    if let Some(icon) = dom::query_first_in(el, "i") {
        let icons = icon.class_list();
        for class in delta.icon_remove {
            let _ = icons.remove_1(class);
        }
        for class in delta.icon_add {
            let _ = icons.add_1(class);
        }
    }
}

/// Set every mirror of `product` in `kind` to `active`.
pub fn set_toggle_state(kind: ListKind, product: ProductId, active: bool) {
    let look = ToggleLook::for_kind(kind);
    let delta = look.delta(active);
    for el in dom::query_all(&look.product_selector(product)) {
        apply(&el, &delta);
    }
}

/// One-shot `pop` on every mirror after a user-triggered change.
pub fn pop(kind: ListKind, product: ProductId) {
    let buttons = dom::query_all(&ToggleLook::for_kind(kind).product_selector(product));
    for el in &buttons {
        dom::add_class(el, POP_CLASS);
    }
    wasm_bindgen_futures::spawn_local(async move {
        TimeoutFuture::new(POP_DURATION_MS).await;
        for el in &buttons {
            dom::remove_class(el, POP_CLASS);
        }
    });
}

fn badges(kind: ListKind) -> Vec<Element> {
    match kind {
        ListKind::Cart => dom::query_all("#cart-badge, .cart-count"),
        ListKind::Wishlist => dom::query_all("#wishlist-badge"),
    }
}

pub fn set_badge(kind: ListKind, count: usize) {
    for badge in badges(kind) {
        dom::set_text(&badge, &count.to_string());
        if count > 0 {
            dom::show(&badge, "flex");
        } else {
            dom::hide(&badge);
        }
    }
}

pub fn on_store_event(event: &StoreEvent) {
    match event {
        StoreEvent::Membership {
            kind,
            product,
            member,
        } => set_toggle_state(*kind, *product, *member),
        StoreEvent::Count { kind, count } => set_badge(*kind, *count),
        StoreEvent::Quantity { .. } => {}
    }
}

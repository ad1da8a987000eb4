//! Hover dropdowns in the navbar.

use crate::dom;
use gloo_timers::future::TimeoutFuture;
use std::cell::Cell;
use std::rc::Rc;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::Element;

const DROPDOWN_IDS: [&str; 3] = ["wishlistDropdown", "cartDropdown", "profileDropdown"];
const CLOSE_DELAY_MS: u32 = 80;

/// The stylesheet keys the open state off `.nav-dropdown.active`.
fn set_open(container: &Element, open: bool) {
    if open {
        dom::add_class(container, "active");
    } else {
        dom::remove_class(container, "active");
    }
}

fn on(el: &Element, event: &str, handler: impl FnMut(web_sys::MouseEvent) + 'static) {
    let cb = Closure::wrap(Box::new(handler) as Box<dyn FnMut(web_sys::MouseEvent)>);
    if el
        .add_event_listener_with_callback(event, cb.as_ref().unchecked_ref())
        .is_err()
    {
        gloo_console::warn!(format!("could not bind {event}"));
    }
    cb.forget();
}

fn bind(container: Element) {
    let Some(menu) = dom::query_first_in(&container, ".dropdown-menu") else {
        return;
    };
    // Bumped on every enter so a pending close from an earlier leave is void.
    let hover = Rc::new(Cell::new(0u64));

    {
        let hover = hover.clone();
        let target = container.clone();
        on(&container, "mouseenter", move |_| {
            hover.set(hover.get() + 1);
            set_open(&target, true);
        });
    }
    {
        let hover = hover.clone();
        let target = container.clone();
        on(&menu, "mouseenter", move |_| {
            hover.set(hover.get() + 1);
            set_open(&target, true);
        });
    }
    {
        let target = container.clone();
        on(&menu, "mouseleave", move |_| set_open(&target, false));
    }
    let target = container.clone();
    on(&container, "mouseleave", move |_| {
        let armed = hover.get();
        let hover = hover.clone();
        let target = target.clone();
        let menu = menu.clone();
        wasm_bindgen_futures::spawn_local(async move {
            TimeoutFuture::new(CLOSE_DELAY_MS).await;
            if hover.get() == armed && !menu.matches(":hover").unwrap_or(false) {
                set_open(&target, false);
            }
        });
    });
}

pub fn bind_all() {
    for id in DROPDOWN_IDS {
        if let Some(container) = dom::by_id(id) {
            bind(container);
        }
    }
}

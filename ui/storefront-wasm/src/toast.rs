//! The `#mensaje-carrito-aviso` notice.

use crate::dom;
use gloo_timers::future::TimeoutFuture;
use std::cell::Cell;

const TOAST_ID: &str = "mensaje-carrito-aviso";
const VISIBLE_MS: u32 = 1800;
const FADE_MS: u32 = 200;

thread_local! {
    static GENERATION: Cell<u64> = const { Cell::new(0) };
}

/// Show `message` for a moment, then fade out. A newer message takes over
/// the element and the older timer does nothing.
pub fn show(message: &str) {
    let Some(toast) = dom::by_id(TOAST_ID) else {
        gloo_console::log!(message);
        return;
    };
    let generation = GENERATION.with(|g| {
        g.set(g.get() + 1);
        g.get()
    });
    let current = move || GENERATION.with(|g| g.get()) == generation;

    dom::set_text(&toast, message);
    dom::set_style(&toast, "opacity", "1");
    dom::show(&toast, "block");

    wasm_bindgen_futures::spawn_local(async move {
        TimeoutFuture::new(VISIBLE_MS).await;
        if !current() {
            return;
        }
        dom::set_style(&toast, "opacity", "0");
        TimeoutFuture::new(FADE_MS).await;
        if current() {
            dom::hide(&toast);
        }
    });
}

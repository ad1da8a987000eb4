//! Storefront browser client.
//!
//! Wires the target-independent `sf-sync` engine to the live page: a
//! fetch-backed API, DOM surfaces, store subscribers for buttons, badges and
//! the cart page, and the small widgets around them (carousels, modals,
//! dropdowns, checkout buttons).

pub mod api;
pub mod buttons;
pub mod carousel;
pub mod cart_page;
pub mod checkout;
pub mod dom;
pub mod dropdown;
pub mod events;
pub mod grid;
pub mod modal;
pub mod state;
pub mod surfaces;
pub mod toast;

use sf_api_types::ListKind;
use sf_sync::SyncEngine;
use wasm_bindgen::prelude::*;

/// WASM entry point, called when the module is instantiated.
#[wasm_bindgen(start)]
pub async fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();

    init().await
}

async fn init() -> Result<(), JsValue> {
    let endpoints = state::endpoints();
    if api::csrf_sources().resolve().is_none() {
        gloo_console::warn!("no csrf token on this page; cart and wishlist actions will be refused");
    }

    let engine = state::install(SyncEngine::new(
        api::FetchApi::new(endpoints),
        surfaces::DomSurfaces,
    ));
    engine.store().subscribe(buttons::on_store_event);
    if let Some(rows) = cart_page::init() {
        engine.store().replace_list(ListKind::Cart, &rows);
        engine.store().subscribe(cart_page::on_store_event);
    }

    carousel::init_in(&gloo_utils::body());
    events::bind_events();
    dropdown::bind_all();
    checkout::bind();

    // Learn server quantities and badge counts from the menus.
    engine.refresh_all().await;
    Ok(())
}

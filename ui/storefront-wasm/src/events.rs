//! Event wiring.
//!
//! One delegated click listener on `<body>` serves every product button on
//! the page: grid cards, modals, carousels, menus, the cart page, and
//! standalone `[data-action="add-cart"]` buttons on detail or promo sections.
//! Fragments replace inner markup at any time, so nothing below binds to a
//! node that a refresh can destroy.

use crate::carousel::{self, Move};
use crate::state::{self, Engine};
use crate::{buttons, dom, grid, modal};
use sf_api_types::markup::ATTR_PRODUCT_ID;
use sf_api_types::{ListKind, ProductId};
use sf_sync::{Outcome, Step, SyncResult};
use std::rc::Rc;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Element, EventTarget};

const WISHLIST_TOGGLES: &str = ".wishlist-btn, .modal-wishlist-btn";
const CART_ADDS: &str = ".cart-btn, .modal-cart-btn, [data-action=\"add-cart\"]";

enum Action {
    ToggleWishlist(ProductId),
    AddToCart(ProductId),
    AddFromWishlist(ProductId),
    Step(ProductId, Step),
    Remove(ProductId),
    Clear,
    Filter(Element),
    Carousel(Element, Move),
    OpenModal(ProductId),
    CloseModal(Element),
}

fn product_of(el: &Element) -> Option<ProductId> {
    dom::attr(el, ATTR_PRODUCT_ID)?.parse().ok()
}

type MakeAction = fn(ProductId) -> Action;

fn with_id(target: &Option<EventTarget>, selector: &str, make: MakeAction) -> Option<Action> {
    let el = dom::closest(target.clone(), selector)?;
    product_of(&el).map(make)
}

/// Map a click target to at most one action. Buttons win over the card
/// they sit in.
fn route(target: Option<EventTarget>) -> Option<Action> {
    let hit = |selector: &str| dom::closest(target.clone(), selector);
    let by_product: [(&str, MakeAction); 7] = [
        (WISHLIST_TOGGLES, Action::ToggleWishlist),
        (CART_ADDS, Action::AddToCart),
        (".wishlist-cart-btn", Action::AddFromWishlist),
        (".wishlist-remove-btn", Action::ToggleWishlist),
        (".cart-qty-plus", |id| Action::Step(id, Step::Increase)),
        (".cart-qty-minus", |id| Action::Step(id, Step::Decrease)),
        (".cart-remove-btn", Action::Remove),
    ];

    if let Some(action) = by_product
        .iter()
        .find_map(|(selector, make)| with_id(&target, selector, *make))
    {
        return Some(action);
    }
    if hit(".cart-clear-btn, #vaciarCarrito").is_some() {
        return Some(Action::Clear);
    }
    if let Some(link) = hit(&format!("[{}]", grid::CATEGORY_ATTR)) {
        return Some(Action::Filter(link));
    }
    if let Some(control) = hit(".carousel-prev, .carousel-next, .image-dot") {
        let wrapper = control.closest(carousel::WRAPPER_SELECTOR).ok()??;
        return carousel::move_for(&control).map(|step| Action::Carousel(wrapper, step));
    }
    if let Some(close) = hit(".close-modal") {
        return close.closest(".modal").ok()?.map(Action::CloseModal);
    }
    if let Some(backdrop) = hit(".modal") {
        let on_backdrop = target
            .as_ref()
            .and_then(|t| t.dyn_ref::<Element>())
            .is_some_and(|t| backdrop.is_same_node(Some(t.as_ref())));
        return on_backdrop.then_some(Action::CloseModal(backdrop));
    }
    if hit("button, a").is_some() {
        return None;
    }
    with_id(&target, ".product-card.open-modal-btn", Action::OpenModal)
}

fn pop_on_success(kind: ListKind, id: ProductId, result: SyncResult<Outcome>) {
    if result == Ok(Outcome::Applied) {
        buttons::pop(kind, id);
    }
}

async fn perform(engine: Rc<Engine>, action: Action) {
    match action {
        Action::ToggleWishlist(id) => {
            let result = engine.toggle_wishlist(id).await;
            pop_on_success(ListKind::Wishlist, id, result);
        }
        Action::AddToCart(id) => {
            let result = engine.add_to_cart(id).await;
            pop_on_success(ListKind::Cart, id, result);
        }
        Action::AddFromWishlist(id) => {
            let result = engine.add_from_wishlist(id).await;
            pop_on_success(ListKind::Cart, id, result);
        }
        Action::Step(id, step) => {
            let _ = engine.step_quantity(id, step).await;
        }
        Action::Remove(id) => {
            let _ = engine.remove_from_cart(id).await;
        }
        Action::Clear => {
            let _ = engine.clear_cart().await;
        }
        Action::Filter(link) => grid::select_category(&engine, &link).await,
        Action::Carousel(wrapper, step) => carousel::navigate(&wrapper, step),
        Action::OpenModal(id) => modal::open(id),
        Action::CloseModal(el) => modal::close(&el),
    }
}

fn delegate(root: &Element, engine: Rc<Engine>) {
    let cb = Closure::wrap(Box::new(move |event: web_sys::MouseEvent| {
        let Some(action) = route(event.target()) else {
            return;
        };
        if matches!(action, Action::Filter(_)) {
            event.prevent_default();
        }
        wasm_bindgen_futures::spawn_local(perform(engine.clone(), action));
    }) as Box<dyn FnMut(_)>);
    if root
        .add_event_listener_with_callback("click", cb.as_ref().unchecked_ref())
        .is_err()
    {
        gloo_console::warn!("could not bind delegated click listener");
    }
    cb.forget();
}

fn bind_escape() {
    let cb = Closure::wrap(Box::new(move |event: web_sys::KeyboardEvent| {
        if event.key() == "Escape" {
            modal::close_all();
        }
    }) as Box<dyn FnMut(_)>);
    if dom::doc()
        .add_event_listener_with_callback("keydown", cb.as_ref().unchecked_ref())
        .is_err()
    {
        gloo_console::warn!("could not bind keydown listener");
    }
    cb.forget();
}

/// Bind all listeners. Call once after the engine is installed.
pub fn bind_events() {
    let Some(engine) = state::engine() else {
        gloo_console::error!("storefront engine not installed");
        return;
    };
    delegate(&gloo_utils::body(), engine);
    bind_escape();
}

//! Checkout buttons: cart page → address → confirm → payment, plus the
//! order summary email.

use crate::dom;
use crate::state::{self, Engine};
use sf_sync::Surfaces;
use sf_sync::checkout::{MSG_EMAIL_FAILED, MSG_PAYMENT_NETWORK, email_summary, start_payment};
use std::rc::Rc;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Element, HtmlButtonElement, HtmlInputElement};

const MSG_PICK_ADDRESS: &str = "Selecciona una dirección de envío.";
const PROCESSING_LABEL: &str = "Procesando...";

/// Attach a click handler that gets the engine and the clicked element.
macro_rules! on_click_async {
    ($el:expr, $engine:expr, $handler:expr) => {{
        let engine = $engine.clone();
        let el: Element = $el.clone();
        let cb = Closure::wrap(Box::new(move |_: web_sys::MouseEvent| {
            let engine = engine.clone();
            let el = el.clone();
            wasm_bindgen_futures::spawn_local(async move {
                $handler(&engine, &el).await;
            });
        }) as Box<dyn FnMut(_)>);
        if $el
            .add_event_listener_with_callback("click", cb.as_ref().unchecked_ref())
            .is_err()
        {
            gloo_console::warn!("could not bind checkout button");
        }
        cb.forget();
    }};
}

async fn proceed_to_address(engine: &Rc<Engine>, _: &Element) {
    dom::navigate(&engine.api().endpoints().select_address());
}

async fn continue_with_address(engine: &Rc<Engine>, _: &Element) {
    let checked = dom::query("input[name=\"direccion\"]:checked")
        .and_then(|el| el.dyn_into::<HtmlInputElement>().ok())
        .map(|input| input.value())
        .filter(|value| !value.is_empty());
    match checked {
        Some(id) => dom::navigate(&engine.api().endpoints().confirm_order(&id)),
        None => engine.surfaces().alert(MSG_PICK_ADDRESS),
    }
}

async fn pay(engine: &Rc<Engine>, el: &Element) {
    let button = el.dyn_ref::<HtmlButtonElement>();
    let label = el.text_content().unwrap_or_default();
    if let Some(button) = button {
        button.set_disabled(true);
    }
    dom::set_text(el, PROCESSING_LABEL);

    let query = dom::window().location().search().unwrap_or_default();
    match start_payment(engine.api(), &query).await {
        Ok(url) => dom::navigate(&url),
        Err(err) => {
            engine.report(err, MSG_PAYMENT_NETWORK);
            if let Some(button) = button {
                button.set_disabled(false);
            }
            dom::set_text(el, &label);
        }
    }
}

async fn send_summary(engine: &Rc<Engine>, el: &Element) {
    let Some(pedido_id) = dom::attr(el, "data-pedido-id").and_then(|id| id.trim().parse().ok())
    else {
        gloo_console::warn!("email-summary button without data-pedido-id");
        return;
    };
    match email_summary(engine.api(), pedido_id).await {
        Ok(message) => engine.surfaces().notify(&message),
        Err(err) => {
            engine.report(err, MSG_EMAIL_FAILED);
        }
    }
}

pub fn bind() {
    let Some(engine) = state::engine() else {
        return;
    };
    if let Some(el) = dom::by_id("btnProcederPago") {
        on_click_async!(el, engine, proceed_to_address);
    }
    if let Some(el) = dom::by_id("continuarDireccion") {
        on_click_async!(el, engine, continue_with_address);
    }
    if let Some(el) = dom::by_id("btnPagarConfirmar") {
        on_click_async!(el, engine, pay);
    }
    for el in dom::query_all("[data-action=\"email-summary\"]") {
        on_click_async!(el, engine, send_summary);
    }
}

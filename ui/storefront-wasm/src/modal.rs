//! Product detail modal.

use crate::dom;
use sf_api_types::ProductId;
use web_sys::Element;

const OPEN_CLASS: &str = "show";

pub fn open(product: ProductId) {
    let id = format!("modal-{product}");
    let Some(modal) = dom::by_id(&id) else {
        gloo_console::warn!(format!("no modal #{id}"));
        return;
    };
    dom::add_class(&modal, OPEN_CLASS);
    dom::show(&modal, "flex");
    dom::set_style(&gloo_utils::body(), "overflow", "hidden");
}

pub fn close(modal: &Element) {
    dom::remove_class(modal, OPEN_CLASS);
    dom::hide(modal);
    if dom::query(&format!(".modal.{OPEN_CLASS}")).is_none() {
        dom::set_style(&gloo_utils::body(), "overflow", "");
    }
}

pub fn close_all() {
    for modal in dom::query_all(&format!(".modal.{OPEN_CLASS}")) {
        close(&modal);
    }
}

//! The dedicated cart page (`.carrito-container`), rendered from store events.

use crate::dom;
use sf_api_types::markup::{ATTR_PRODUCT_ID, ATTR_QUANTITY, ATTR_UNIT_PRICE};
use sf_api_types::{ListKind, ProductId};
use sf_sync::cart_page::CartPageModel;
use sf_sync::{CartLine, MenuEntry, Money, StoreEvent};
use std::cell::RefCell;
use wasm_bindgen::JsCast;
use web_sys::{Element, HtmlButtonElement};

pub const CONTAINER_SELECTOR: &str = ".carrito-container";
const ROW_SELECTOR: &str = ".carrito-item";
const EMPTY_MARKUP: &str = r#"<div class="carrito-vacio">Tu carrito está vacío.</div>"#;

thread_local! {
    static MODEL: RefCell<Option<CartPageModel>> = const { RefCell::new(None) };
}

fn read_line(row: &Element) -> Option<CartLine> {
    Some(CartLine {
        product_id: dom::attr(row, ATTR_PRODUCT_ID)?.trim().parse().ok()?,
        quantity: dom::attr(row, ATTR_QUANTITY)?.trim().parse().ok()?,
        unit_price: dom::attr(row, ATTR_UNIT_PRICE).and_then(|p| Money::parse(&p)),
    })
}

fn row(product: ProductId) -> Option<Element> {
    dom::query(&format!("{ROW_SELECTOR}[{ATTR_PRODUCT_ID}=\"{product}\"]"))
}

/// Build the model from the server-rendered rows and return them as store
/// entries, so the stepper knows each quantity before any menu refresh.
/// `None` off the cart page.
pub fn init() -> Option<Vec<MenuEntry>> {
    let container = dom::query(CONTAINER_SELECTOR)?;
    let lines: Vec<CartLine> = dom::query_in(&container, ROW_SELECTOR)
        .iter()
        .filter_map(read_line)
        .collect();
    let mut model = CartPageModel::new(lines);
    // An already-empty page was rendered with its placeholder.
    if model.is_empty() {
        model.view();
    }
    let entries = model
        .lines()
        .iter()
        .map(|line| MenuEntry {
            product_id: line.product_id,
            quantity: Some(line.quantity),
            unit_price: line.unit_price,
        })
        .collect();
    MODEL.with(|slot| *slot.borrow_mut() = Some(model));
    Some(entries)
}

fn with_model<R>(f: impl FnOnce(&mut CartPageModel) -> R) -> Option<R> {
    MODEL.with(|slot| slot.borrow_mut().as_mut().map(f))
}

pub fn on_store_event(event: &StoreEvent) {
    let changed = match event {
        StoreEvent::Quantity {
            product, quantity, ..
        } => {
            let label = with_model(|m| m.set_quantity(*product, *quantity)).flatten();
            if let Some(row) = row(*product) {
                let _ = row.set_attribute(ATTR_QUANTITY, &quantity.to_string());
                if let Some(qty) = dom::query_first_in(&row, ".cantidad") {
                    dom::set_text(&qty, &quantity.to_string());
                }
                if let (Some(label), Some(subtotal)) =
                    (label, dom::query_first_in(&row, ".carrito-item-subtotal"))
                {
                    dom::set_text(&subtotal, &label);
                }
            }
            true
        }
        StoreEvent::Membership {
            kind: ListKind::Cart,
            product,
            member: false,
        } => {
            if let Some(row) = row(*product) {
                row.remove();
            }
            with_model(|m| m.remove(*product)).unwrap_or(false)
        }
        StoreEvent::Count {
            kind: ListKind::Cart,
            count: 0,
        } => {
            for row in dom::query_all(ROW_SELECTOR) {
                row.remove();
            }
            with_model(CartPageModel::clear);
            true
        }
        _ => false,
    };
    if changed {
        render();
    }
}

fn render() {
    let Some(view) = with_model(CartPageModel::view) else {
        return;
    };
    if let Some(total) = dom::query(".carrito-total-monto") {
        dom::set_text(&total, &view.total.to_string());
    }
    for button in dom::query_all(".carrito-btn-pagar") {
        if let Ok(button) = button.dyn_into::<HtmlButtonElement>() {
            button.set_disabled(!view.pay_enabled);
        }
    }
    if view.render_placeholder {
        for stale in dom::query_all(".carrito-lista, .carrito-total, .carrito-acciones") {
            stale.remove();
        }
        match dom::query(".carrito-links") {
            Some(links) => {
                let _ = links.insert_adjacent_html("beforebegin", EMPTY_MARKUP);
            }
            None => {
                if let Some(container) = dom::query(CONTAINER_SELECTOR) {
                    let _ = container.insert_adjacent_html("beforeend", EMPTY_MARKUP);
                }
            }
        }
    }
}

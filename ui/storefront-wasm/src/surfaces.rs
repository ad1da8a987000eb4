//! [`Surfaces`] over the live document.

use crate::{carousel, dom, toast};
use sf_api_types::ListKind;
use sf_api_types::markup::{
    ATTR_PRODUCT_ID, ATTR_QUANTITY, ATTR_UNIT_PRICE, CART_ROW, PRODUCT_CARD, WISHLIST_ROW,
};
use sf_sync::{MenuEntry, Money, Surfaces};
use web_sys::Element;

pub const GRID_CONTAINER_ID: &str = "productos-grid-container";

pub fn menu_container(kind: ListKind) -> Option<Element> {
    match kind {
        ListKind::Cart => dom::query(".dropdown-cart"),
        ListKind::Wishlist => dom::query(".dropdown-wishlist"),
    }
}

fn row_class(kind: ListKind) -> &'static str {
    match kind {
        ListKind::Cart => CART_ROW,
        ListKind::Wishlist => WISHLIST_ROW,
    }
}

fn read_row(row: &Element) -> Option<MenuEntry> {
    let product_id = dom::attr(row, ATTR_PRODUCT_ID)?.trim().parse().ok()?;
    Some(MenuEntry {
        product_id,
        quantity: dom::attr(row, ATTR_QUANTITY).and_then(|q| q.trim().parse().ok()),
        unit_price: dom::attr(row, ATTR_UNIT_PRICE).and_then(|p| Money::parse(&p)),
    })
}

#[derive(Default)]
pub struct DomSurfaces;

impl Surfaces for DomSurfaces {
    fn replace_menu(&self, kind: ListKind, html: &str) -> Vec<MenuEntry> {
        // Pages without the dropdown still need the rows for the store.
        let container = match menu_container(kind) {
            Some(container) => container,
            None => match dom::doc().create_element("div") {
                Ok(detached) => detached,
                Err(_) => return Vec::new(),
            },
        };
        container.set_inner_html(html);
        dom::query_in(&container, &format!(".{}", row_class(kind)))
            .iter()
            .filter_map(read_row)
            .collect()
    }

    fn replace_grid(&self, html: &str) -> usize {
        let Some(container) = dom::by_id(GRID_CONTAINER_ID) else {
            gloo_console::warn!("grid container missing; filter result dropped");
            return 0;
        };
        container.set_inner_html(html);
        carousel::init_in(&container);
        dom::query_in(&container, &format!(".{PRODUCT_CARD}")).len()
    }

    fn confirm(&self, message: &str) -> bool {
        dom::window().confirm_with_message(message).unwrap_or(false)
    }

    fn alert(&self, message: &str) {
        let _ = dom::window().alert_with_message(message);
    }

    fn notify(&self, message: &str) {
        toast::show(message);
    }
}

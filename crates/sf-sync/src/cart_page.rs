//! View model for the dedicated cart page.

use crate::money::Money;
use crate::store::CartLine;
use sf_api_types::ProductId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartPageView {
    pub total: Money,
    pub pay_enabled: bool,
    /// True exactly once: on the transition to an empty cart.
    pub render_placeholder: bool,
}

#[derive(Debug, Clone, Default)]
pub struct CartPageModel {
    lines: Vec<CartLine>,
    placeholder_rendered: bool,
}

impl CartPageModel {
    pub fn new(lines: Vec<CartLine>) -> Self {
        Self {
            lines,
            placeholder_rendered: false,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Apply a server-reported quantity. Returns the new subtotal label when
    /// the row is on this page and has a known unit price.
    pub fn set_quantity(&mut self, product: ProductId, quantity: u32) -> Option<String> {
        let line = self.lines.iter_mut().find(|l| l.product_id == product)?;
        line.quantity = quantity;
        line.subtotal().map(subtotal_label)
    }

    pub fn remove(&mut self, product: ProductId) -> bool {
        let before = self.lines.len();
        self.lines.retain(|l| l.product_id != product);
        before != self.lines.len()
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    pub fn total(&self) -> Money {
        self.lines.iter().filter_map(CartLine::subtotal).sum()
    }

    pub fn view(&mut self) -> CartPageView {
        let render_placeholder = self.lines.is_empty() && !self.placeholder_rendered;
        if render_placeholder {
            self.placeholder_rendered = true;
        }
        CartPageView {
            total: self.total(),
            pay_enabled: !self.lines.is_empty(),
            render_placeholder,
        }
    }
}

pub fn subtotal_label(subtotal: Money) -> String {
    format!("Subtotal: {subtotal}")
}

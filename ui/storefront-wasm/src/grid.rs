//! Category filter for the product grid.

use crate::dom;
use crate::state::Engine;
use web_sys::Element;

pub const CATEGORY_ATTR: &str = "data-categoria";

/// Highlight `link` and reload the grid for its category. An empty
/// `data-categoria` means all products.
pub async fn select_category(engine: &Engine, link: &Element) {
    if let Some(list) = link.parent_element() {
        for other in dom::query_in(&list, &format!("[{CATEGORY_ATTR}]")) {
            dom::remove_class(&other, "active");
        }
    }
    dom::add_class(link, "active");

    let category = dom::attr(link, CATEGORY_ATTR).filter(|c| !c.trim().is_empty());
    // Failures are logged by the engine; the old grid stays.
    let _ = engine.filter_grid(category.as_deref()).await;
}

//! DOM helpers.
//!
//! Everything here returns `Option`/`Vec` instead of panicking: storefront
//! pages differ in which regions they render, and a missing element only
//! means the page has nothing to update.

use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlElement, Window};

pub fn window() -> Window {
    gloo_utils::window()
}

pub fn doc() -> Document {
    gloo_utils::document()
}

pub fn by_id(id: &str) -> Option<Element> {
    doc().get_element_by_id(id)
}

pub fn query(selector: &str) -> Option<Element> {
    doc().query_selector(selector).ok()?
}

pub fn query_all(selector: &str) -> Vec<Element> {
    match doc().query_selector_all(selector) {
        Ok(list) => collect(&list),
        Err(_) => Vec::new(),
    }
}

/// `querySelectorAll` scoped to `root`.
pub fn query_in(root: &Element, selector: &str) -> Vec<Element> {
    match root.query_selector_all(selector) {
        Ok(list) => collect(&list),
        Err(_) => Vec::new(),
    }
}

pub fn query_first_in(root: &Element, selector: &str) -> Option<Element> {
    root.query_selector(selector).ok()?
}

fn collect(list: &web_sys::NodeList) -> Vec<Element> {
    (0..list.length())
        .filter_map(|i| list.item(i))
        .filter_map(|node| node.dyn_into::<Element>().ok())
        .collect()
}

/// Nearest ancestor-or-self of the event target matching `selector`.
pub fn closest(target: Option<web_sys::EventTarget>, selector: &str) -> Option<Element> {
    let el = target?.dyn_into::<Element>().ok()?;
    el.closest(selector).ok()?
}

pub fn attr(el: &Element, name: &str) -> Option<String> {
    el.get_attribute(name)
}

pub fn set_text(el: &Element, text: &str) {
    el.set_text_content(Some(text));
}

pub fn add_class(el: &Element, class: &str) {
    let _ = el.class_list().add_1(class);
}

pub fn remove_class(el: &Element, class: &str) {
    let _ = el.class_list().remove_1(class);
}

pub fn has_class(el: &Element, class: &str) -> bool {
    el.class_list().contains(class)
}

pub fn set_style(el: &Element, property: &str, value: &str) {
    if let Some(html) = el.dyn_ref::<HtmlElement>() {
        let _ = html.style().set_property(property, value);
    }
}

pub fn show(el: &Element, display: &str) {
    set_style(el, "display", display);
}

pub fn hide(el: &Element) {
    set_style(el, "display", "none");
}

/// `<meta name=... content=...>` lookup.
pub fn meta_content(name: &str) -> Option<String> {
    query(&format!("meta[name=\"{name}\"]"))?.get_attribute("content")
}

pub fn navigate(url: &str) {
    if let Err(err) = window().location().set_href(url) {
        gloo_console::error!("navigation failed", err);
    }
}

//! Card and modal image carousels.
//!
//! `init_in` only draws dots and arrows; clicks reach [`navigate`] through
//! the grid's delegated listener, so replaced grids need no rebinding.

use crate::dom;
use sf_api_types::markup::ATTR_IMAGES;
use sf_sync::carousel::{Carousel, parse_images};
use web_sys::Element;

pub const WRAPPER_SELECTOR: &str = ".product-image-wrapper, .modal-image-wrapper";
const IMAGE_SELECTOR: &str = "img[data-images]";
const CURRENT_ATTR: &str = "data-current-image";
const DOT_INDEX_ATTR: &str = "data-index";

#[derive(Debug, Clone, Copy)]
pub enum Move {
    Prev,
    Next,
    To(usize),
}

fn dots_of(wrapper: &Element) -> Option<Element> {
    dom::query_first_in(wrapper, ".image-dots, .modal-image-dots")
}

fn load(image: &Element) -> Option<(Vec<String>, Carousel)> {
    let raw = dom::attr(image, ATTR_IMAGES)?;
    let urls = match parse_images(&raw) {
        Ok(urls) => urls,
        Err(err) => {
            gloo_console::warn!(err.to_string());
            return None;
        }
    };
    let carousel = Carousel::resume(urls.len(), dom::attr(image, CURRENT_ATTR).as_deref())?;
    Some((urls, carousel))
}

fn render(wrapper: &Element, image: &Element, urls: &[String], carousel: &Carousel) {
    let index = carousel.current();
    if let Some(url) = urls.get(index) {
        let _ = image.set_attribute("src", url);
    }
    let _ = image.set_attribute(CURRENT_ATTR, &index.to_string());
    if let Some(dots) = dots_of(wrapper) {
        for dot in dom::query_in(&dots, ".image-dot") {
            let active = dom::attr(&dot, DOT_INDEX_ATTR).and_then(|i| i.parse().ok()) == Some(index);
            if active {
                dom::add_class(&dot, "active");
            } else {
                dom::remove_class(&dot, "active");
            }
        }
    }
}

fn draw_controls(wrapper: &Element, carousel: &Carousel) {
    if let Some(dots) = dots_of(wrapper) {
        let markup: String = (0..carousel.len())
            .map(|i| format!(r#"<span class="image-dot" {DOT_INDEX_ATTR}="{i}"></span>"#))
            .collect();
        dots.set_inner_html(&markup);
    }
    if dom::query_first_in(wrapper, ".carousel-prev").is_none() {
        let _ = wrapper.insert_adjacent_html(
            "beforeend",
            r#"<button type="button" class="carousel-prev">&#8249;</button><button type="button" class="carousel-next">&#8250;</button>"#,
        );
    }
}

/// Draw dots/arrows for every carousel under `root`. Safe on an empty root.
pub fn init_in(root: &Element) {
    for wrapper in dom::query_in(root, WRAPPER_SELECTOR) {
        let Some(image) = dom::query_first_in(&wrapper, IMAGE_SELECTOR) else {
            continue;
        };
        let Some((urls, carousel)) = load(&image) else {
            continue;
        };
        if carousel.has_controls() {
            draw_controls(&wrapper, &carousel);
        }
        render(&wrapper, &image, &urls, &carousel);
    }
}

pub fn navigate(wrapper: &Element, step: Move) {
    let Some(image) = dom::query_first_in(wrapper, IMAGE_SELECTOR) else {
        return;
    };
    let Some((urls, mut carousel)) = load(&image) else {
        return;
    };
    match step {
        Move::Prev => carousel.prev(),
        Move::Next => carousel.next(),
        Move::To(index) => carousel.go_to(index),
    };
    render(wrapper, &image, &urls, &carousel);
}

/// Map a click inside a carousel wrapper to a move, if it hit a control.
pub fn move_for(target: &Element) -> Option<Move> {
    if dom::has_class(target, "carousel-prev") {
        Some(Move::Prev)
    } else if dom::has_class(target, "carousel-next") {
        Some(Move::Next)
    } else if dom::has_class(target, "image-dot") {
        dom::attr(target, DOT_INDEX_ATTR)
            .and_then(|i| i.parse().ok())
            .map(Move::To)
    } else {
        None
    }
}

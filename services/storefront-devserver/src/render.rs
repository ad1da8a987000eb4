//! HTML for pages and the fragments the client swaps in.

use sf_api_types::markup::{
    ATTR_IMAGES, ATTR_PRODUCT_ID, ATTR_QUANTITY, ATTR_UNIT_PRICE, CART_EMPTY, CART_ROW,
    PRODUCT_CARD, WISHLIST_EMPTY, WISHLIST_ROW,
};
use sf_api_types::{CSRF_FORM_FIELD, Endpoints};
use sf_sync::cart_page::subtotal_label;
use std::fmt::Write as _;

use crate::catalog::{Catalog, OFFERS_SLUG, Product};
use crate::session::{Order, Session};

pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            other => out.push(other),
        }
    }
    out
}

fn images_attr(product: &Product) -> String {
    let images: Vec<serde_json::Value> = product
        .images
        .iter()
        .map(|url| serde_json::json!({ "url": url }))
        .collect();
    escape(&serde_json::Value::Array(images).to_string())
}

pub fn cart_menu(catalog: &Catalog, session: Option<&Session>, endpoints: &Endpoints) -> String {
    let Some(session) = session.filter(|s| !s.cart.is_empty()) else {
        return format!(r#"<div class="{CART_EMPTY}">No hay productos en el carrito.</div>"#);
    };

    let mut html = String::new();
    for (id, item) in &session.cart {
        let name = catalog.product(*id).map_or("Producto", |p| p.name);
        let _ = write!(
            html,
            r#"<div class="{CART_ROW}" {ATTR_PRODUCT_ID}="{id}" {ATTR_QUANTITY}="{qty}" {ATTR_UNIT_PRICE}="{price}">
  <span class="cart-item-name">{name}</span>
  <button type="button" class="cart-qty-minus" {ATTR_PRODUCT_ID}="{id}">&minus;</button>
  <span class="cart-qty">{qty}</span>
  <button type="button" class="cart-qty-plus" {ATTR_PRODUCT_ID}="{id}">+</button>
  <span class="cart-item-price">{display}</span>
  <button type="button" class="cart-remove-btn" {ATTR_PRODUCT_ID}="{id}">&times;</button>
</div>
"#,
            qty = item.quantity,
            price = item.unit_price.decimal(),
            display = item.unit_price,
            name = escape(name),
        );
    }
    let _ = write!(
        html,
        r#"<div class="cart-menu-footer">
  <span class="cart-menu-subtotal">{subtotal}</span>
  <a class="cart-menu-link" href="{base}/carrito/">Ver carrito</a>
  <button type="button" class="cart-clear-btn">Vaciar</button>
</div>
"#,
        subtotal = subtotal_label(session.cart_total()),
        base = endpoints.base(),
    );
    html
}

pub fn wishlist_menu(catalog: &Catalog, session: Option<&Session>) -> String {
    let Some(session) = session.filter(|s| !s.wishlist.is_empty()) else {
        return format!(r#"<div class="{WISHLIST_EMPTY}">No tienes favoritos aún.</div>"#);
    };

    let mut html = String::new();
    for id in &session.wishlist {
        let Some(product) = catalog.product(*id) else {
            continue;
        };
        let _ = write!(
            html,
            r#"<div class="{WISHLIST_ROW}" {ATTR_PRODUCT_ID}="{id}" {ATTR_UNIT_PRICE}="{price}">
  <span class="wishlist-item-name">{name}</span>
  <span class="wishlist-item-price">{display}</span>
  <button type="button" class="wishlist-cart-btn" {ATTR_PRODUCT_ID}="{id}">Agregar al carrito</button>
  <button type="button" class="wishlist-remove-btn" {ATTR_PRODUCT_ID}="{id}">&times;</button>
</div>
"#,
            price = product.current_price().decimal(),
            display = product.current_price(),
            name = escape(product.name),
        );
    }
    html
}

fn toggle_state(active: bool) -> (&'static str, &'static str) {
    if active { (" active", "fas") } else { ("", "far") }
}

fn product_card(product: &Product, session: Option<&Session>) -> String {
    let id = product.id;
    let in_wishlist = session.is_some_and(|s| s.wishlist.contains(&id));
    let in_cart = session.is_some_and(|s| s.cart.contains_key(&id));
    let (wish_active, heart) = toggle_state(in_wishlist);
    let cart_active = if in_cart { " active" } else { "" };
    let cart_icon = if in_cart { " cart-filled" } else { "" };
    let cover = product.images.first().map_or("/static/sin-imagen.png", String::as_str);
    let price = match product.sale_price {
        Some(sale) => format!(r#"<s>{}</s> <strong>{sale}</strong>"#, product.price),
        None => format!("<strong>{}</strong>", product.price),
    };
    let name = escape(product.name);

    format!(
        r#"<div class="{PRODUCT_CARD} open-modal-btn" {ATTR_PRODUCT_ID}="{id}">
  <div class="product-image-wrapper">
    <img class="product-image" src="{cover}" alt="{name}" {ATTR_IMAGES}="{images}" data-current-image="0">
    <div class="image-dots"></div>
  </div>
  <h3 class="product-name">{name}</h3>
  <div class="product-price">{price}</div>
  <button type="button" class="wishlist-btn{wish_active}" {ATTR_PRODUCT_ID}="{id}"><i class="{heart} fa-heart"></i></button>
  <button type="button" class="cart-btn{cart_active}" {ATTR_PRODUCT_ID}="{id}"><i class="fas fa-shopping-cart{cart_icon}"></i></button>
</div>
<div class="modal" id="modal-{id}">
  <div class="modal-content">
    <button type="button" class="close-modal">&times;</button>
    <div class="modal-image-wrapper">
      <img class="modal-product-image" src="{cover}" alt="{name}" {ATTR_IMAGES}="{images}" data-current-image="0">
      <div class="modal-image-dots"></div>
    </div>
    <h2>{name}</h2>
    <div class="product-price">{price}</div>
    <p class="product-stock">Disponibles: {stock}</p>
    <button type="button" class="modal-wishlist-btn{wish_active}" {ATTR_PRODUCT_ID}="{id}"><i class="{heart} fa-heart"></i></button>
    <button type="button" class="modal-cart-btn{cart_active}" {ATTR_PRODUCT_ID}="{id}"><i class="fas fa-shopping-cart{cart_icon}"></i> Agregar</button>
  </div>
</div>
"#,
        images = images_attr(product),
        stock = product.stock,
    )
}

/// Grid fragment: one card plus its modal per product. An empty selection
/// renders an empty string.
pub fn product_grid(products: &[&Product], session: Option<&Session>) -> String {
    products.iter().map(|p| product_card(p, session)).collect()
}

fn badge(id: &str, class: &str, count: usize) -> String {
    let display = if count > 0 { "flex" } else { "none" };
    format!(r#"<span id="{id}" class="{class}" style="display: {display}">{count}</span>"#)
}

fn layout(
    title: &str,
    catalog: &Catalog,
    session: Option<&Session>,
    endpoints: &Endpoints,
    body: &str,
) -> String {
    let csrf = session.map(|s| s.csrf_token.as_str()).unwrap_or_default();
    let base = endpoints.base();
    let cart_rows = session.map_or(0, |s| s.cart.len());
    let wishlist_rows = session.map_or(0, |s| s.wishlist.len());

    format!(
        r#"<!DOCTYPE html>
<html lang="es">
<head>
  <meta charset="utf-8">
  <meta name="csrf-token" content="{csrf}">
  <title>{title}</title>
</head>
<body data-storefront-base="{base}">
<header class="navbar">
  <a class="brand" href="{base}/">Tienda</a>
  <div class="nav-dropdown" id="wishlistDropdown">
    <a class="nav-icon" href="{base}/"><i class="far fa-heart"></i>{wishlist_badge}</a>
    <div class="dropdown-menu dropdown-wishlist">{wishlist_menu}</div>
  </div>
  <div class="nav-dropdown" id="cartDropdown">
    <a class="nav-icon" href="{base}/carrito/"><i class="fas fa-shopping-cart"></i>{cart_badge}</a>
    <div class="dropdown-menu dropdown-cart">{cart_menu}</div>
  </div>
  <div class="nav-dropdown" id="profileDropdown">
    <a class="nav-icon" href="{base}/carrito/">Cuenta</a>
    <div class="dropdown-menu"><a href="{base}/carrito/">Mi carrito</a></div>
  </div>
</header>
<input type="hidden" name="{CSRF_FORM_FIELD}" value="{csrf}">
<div id="mensaje-carrito-aviso" class="toast" style="display: none"></div>
<main>
{body}
</main>
<script type="module">
  import init from "/pkg/storefront_wasm.js";
  init();
</script>
</body>
</html>
"#,
        title = escape(title),
        wishlist_badge = badge("wishlist-badge", "badge", wishlist_rows),
        cart_badge = badge("cart-badge", "badge cart-count", cart_rows),
        wishlist_menu = wishlist_menu(catalog, session),
        cart_menu = cart_menu(catalog, session, endpoints),
    )
}

pub fn index_page(catalog: &Catalog, session: Option<&Session>, endpoints: &Endpoints) -> String {
    let mut links = String::from(r##"<a href="#" class="active" data-categoria="">Todos</a>"##);
    let _ = write!(links, r##"<a href="#" data-categoria="{OFFERS_SLUG}">Ofertas</a>"##);
    for category in catalog.categories() {
        let _ = write!(
            links,
            r##"<a href="#" data-categoria="{}">{}</a>"##,
            category.slug,
            escape(category.name)
        );
    }
    let products: Vec<&Product> = catalog.products().iter().collect();
    let body = format!(
        r#"<aside class="categorias-list">{links}</aside>
<section id="productos-grid-container" class="productos-grid">
{grid}</section>"#,
        grid = product_grid(&products, session),
    );
    layout("Productos", catalog, session, endpoints, &body)
}

pub fn cart_page(catalog: &Catalog, session: Option<&Session>, endpoints: &Endpoints) -> String {
    let base = endpoints.base();
    let mut body = String::from(r#"<div class="carrito-container"><h1>Tu carrito</h1>"#);

    match session.filter(|s| !s.cart.is_empty()) {
        Some(session) => {
            body.push_str(r#"<div class="carrito-lista">"#);
            for (id, item) in &session.cart {
                let name = catalog.product(*id).map_or("Producto", |p| p.name);
                let _ = write!(
                    body,
                    r#"<div class="carrito-item" data-id="{id}" {ATTR_PRODUCT_ID}="{id}" {ATTR_QUANTITY}="{qty}" {ATTR_UNIT_PRICE}="{price}">
  <span class="carrito-item-nombre">{name}</span>
  <span class="carrito-item-precio">{display}</span>
  <button type="button" class="cart-qty-minus" {ATTR_PRODUCT_ID}="{id}">&minus;</button>
  <span class="cantidad">{qty}</span>
  <button type="button" class="cart-qty-plus" {ATTR_PRODUCT_ID}="{id}">+</button>
  <span class="carrito-item-subtotal">{subtotal}</span>
  <button type="button" class="cart-remove-btn" {ATTR_PRODUCT_ID}="{id}">Eliminar</button>
</div>"#,
                    qty = item.quantity,
                    price = item.unit_price.decimal(),
                    display = item.unit_price,
                    subtotal = item.subtotal().map(subtotal_label).unwrap_or_default(),
                    name = escape(name),
                );
            }
            let _ = write!(
                body,
                r#"</div>
<div class="carrito-total">Total: <span class="carrito-total-monto">{total}</span></div>
<div class="carrito-acciones">
  <button type="button" id="vaciarCarrito">Vaciar carrito</button>
  <button type="button" id="btnProcederPago" class="carrito-btn-pagar">Proceder al pago</button>
</div>"#,
                total = session.cart_total(),
            );
        }
        None => body.push_str(r#"<div class="carrito-vacio">Tu carrito está vacío.</div>"#),
    }
    let _ = write!(
        body,
        r#"<div class="carrito-links"><a href="{base}/">Seguir comprando</a></div></div>"#
    );
    layout("Carrito", catalog, session, endpoints, &body)
}

pub fn address_page(catalog: &Catalog, session: Option<&Session>, endpoints: &Endpoints) -> String {
    let mut body = String::from(r#"<h1>Dirección de envío</h1><form class="direcciones-form">"#);
    for address in session.map(|s| s.addresses.as_slice()).unwrap_or_default() {
        let _ = write!(
            body,
            r#"<label class="direccion-opcion"><input type="radio" name="direccion" value="{}"> {}</label>"#,
            address.id,
            escape(&address.label)
        );
    }
    body.push_str(r#"<button type="button" id="continuarDireccion">Continuar</button></form>"#);
    layout("Dirección de envío", catalog, session, endpoints, &body)
}

pub fn confirm_page(
    catalog: &Catalog,
    session: Option<&Session>,
    endpoints: &Endpoints,
    address_label: &str,
) -> String {
    let total = session.map(Session::cart_total).unwrap_or_default();
    let body = format!(
        r#"<h1>Confirmar pedido</h1>
<p class="confirmar-direccion">Enviar a: {address}</p>
<p class="confirmar-total">Total: {total}</p>
<button type="button" id="btnPagarConfirmar">Pagar con Mercado Pago</button>"#,
        address = escape(address_label),
    );
    layout("Confirmar pedido", catalog, session, endpoints, &body)
}

pub fn payment_result_page(
    catalog: &Catalog,
    session: Option<&Session>,
    endpoints: &Endpoints,
    order: &Order,
) -> String {
    let body = format!(
        r#"<h1>Pago aprobado</h1>
<p>Pedido #{id}, total {total}.</p>
<button type="button" data-action="email-summary" data-pedido-id="{id}">Enviar resumen por email</button>"#,
        id = order.id,
        total = order.total(),
    );
    layout("Pago aprobado", catalog, session, endpoints, &body)
}

use axum::{
    Form, Json,
    extract::{Path, State, rejection::FormRejection},
    http::{HeaderMap, StatusCode},
    response::Html,
};
use serde::Deserialize;
use sf_api_types::{CartMutationResponse, ProductId};
use tracing::{debug, info};

use crate::session::{self, CartItem, require_shopper};
use crate::{ApiError, AppState, not_found, render};

type CartResult = Result<(StatusCode, Json<CartMutationResponse>), ApiError>;

#[derive(Debug, Deserialize)]
pub(crate) struct QuantityForm {
    cantidad: Option<String>,
}

fn accepted(count: u32, removed: bool) -> (StatusCode, Json<CartMutationResponse>) {
    (
        StatusCode::OK,
        Json(CartMutationResponse {
            ok: true,
            count: Some(count),
            removed,
            error: None,
        }),
    )
}

fn rejected(status: StatusCode, message: impl Into<String>) -> (StatusCode, Json<CartMutationResponse>) {
    (
        status,
        Json(CartMutationResponse {
            ok: false,
            error: Some(message.into()),
            ..CartMutationResponse::default()
        }),
    )
}

fn not_in_cart() -> (StatusCode, Json<CartMutationResponse>) {
    rejected(StatusCode::OK, "Producto no está en el carrito")
}

/// Missing or unparseable `cantidad` means one unit.
fn requested_quantity(form: Result<Form<QuantityForm>, FormRejection>) -> i64 {
    form.ok()
        .and_then(|Form(form)| form.cantidad)
        .and_then(|raw| raw.trim().parse::<i64>().ok())
        .unwrap_or(1)
}

/// `POST carrito/add/{id}/`: set the line to exactly `cantidad` units.
pub(crate) async fn add(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<u64>,
    form: Result<Form<QuantityForm>, FormRejection>,
) -> CartResult {
    let shopper = require_shopper(&state.sessions, &headers).await?;
    let id = ProductId(id);
    let product = state
        .catalog
        .product(id)
        .ok_or_else(|| not_found("Producto no encontrado."))?;

    let cantidad = requested_quantity(form);
    if cantidad < 1 {
        return Ok(rejected(StatusCode::BAD_REQUEST, "Cantidad inválida."));
    }
    if cantidad > i64::from(product.stock) {
        return Ok(rejected(
            StatusCode::BAD_REQUEST,
            format!("Solo hay {} unidades disponibles.", product.stock),
        ));
    }
    let quantity = u32::try_from(cantidad).unwrap_or(product.stock);

    let unit_price = product.current_price();
    let count = state
        .sessions
        .with(shopper, |session| {
            session.cart.insert(
                id,
                CartItem {
                    quantity,
                    unit_price,
                },
            );
            session.cart_units()
        })
        .await
        .ok_or_else(|| crate::unauthorized("login required"))?;

    info!(product = %id, quantity, count, "cart line set");
    Ok(accepted(count, false))
}

/// `POST carrito/decrease/{id}/`: one unit less; the last unit deletes the line.
pub(crate) async fn decrease(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<u64>,
) -> CartResult {
    let shopper = require_shopper(&state.sessions, &headers).await?;
    let id = ProductId(id);
    state
        .catalog
        .product(id)
        .ok_or_else(|| not_found("Producto no encontrado."))?;

    let outcome = state
        .sessions
        .with(shopper, |session| {
            let removed = match session.cart.get(&id).map(|item| item.quantity) {
                None => return None,
                Some(quantity) if quantity > 1 => {
                    if let Some(item) = session.cart.get_mut(&id) {
                        item.quantity = quantity - 1;
                    }
                    false
                }
                Some(_) => {
                    session.cart.remove(&id);
                    true
                }
            };
            Some((session.cart_units(), removed))
        })
        .await
        .ok_or_else(|| crate::unauthorized("login required"))?;

    match outcome {
        Some((count, removed)) => {
            debug!(product = %id, count, removed, "cart line decreased");
            Ok(accepted(count, removed))
        }
        None => Ok(not_in_cart()),
    }
}

/// `POST carrito/remove/{id}/`.
pub(crate) async fn remove(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<u64>,
) -> CartResult {
    let shopper = require_shopper(&state.sessions, &headers).await?;
    let id = ProductId(id);
    state
        .catalog
        .product(id)
        .ok_or_else(|| not_found("Producto no encontrado."))?;

    let count = state
        .sessions
        .with(shopper, |session| {
            session.cart.remove(&id).map(|_| session.cart_units())
        })
        .await
        .ok_or_else(|| crate::unauthorized("login required"))?;

    match count {
        Some(count) => Ok(accepted(count, true)),
        None => Ok(not_in_cart()),
    }
}

/// `POST carrito/clear/`.
pub(crate) async fn clear(State(state): State<AppState>, headers: HeaderMap) -> CartResult {
    let shopper = require_shopper(&state.sessions, &headers).await?;
    state
        .sessions
        .with(shopper, |session| session.cart.clear())
        .await
        .ok_or_else(|| crate::unauthorized("login required"))?;
    info!(session = %shopper, "cart cleared");
    Ok(accepted(0, false))
}

/// `GET carrito/menu/`. Anonymous visitors get the empty placeholder.
pub(crate) async fn menu(State(state): State<AppState>, headers: HeaderMap) -> Html<String> {
    let session = session::current(&state.sessions, &headers).await.map(|(_, s)| s);
    Html(render::cart_menu(&state.catalog, session.as_ref(), &state.endpoints))
}

#[cfg(test)]
mod tests {
    use crate::testing::*;
    use axum::http::StatusCode;

    #[tokio::test]
    async fn add_sets_absolute_quantity_and_counts_units() {
        let shopper = Shopper::new().await;
        let body = body_json(shopper.post_form("/productos/carrito/add/1/", "cantidad=2").await).await;
        assert_eq!(body["ok"], true);
        assert_eq!(body["count"], 2);

        let body = body_json(shopper.post_form("/productos/carrito/add/1/", "cantidad=3").await).await;
        assert_eq!(body["count"], 3);

        let body = body_json(shopper.post_form("/productos/carrito/add/2/", "").await).await;
        assert_eq!(body["count"], 4);
    }

    #[tokio::test]
    async fn add_rejects_invalid_and_excess_quantities() {
        let shopper = Shopper::new().await;

        let response = shopper.post_form("/productos/carrito/add/1/", "cantidad=0").await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["error"], "Cantidad inválida.");

        let response = shopper.post_form("/productos/carrito/add/1/", "cantidad=6").await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["ok"], false);
        assert_eq!(body["error"], "Solo hay 5 unidades disponibles.");
    }

    #[tokio::test]
    async fn decrease_at_one_removes_line() {
        let shopper = Shopper::new().await;
        shopper.post_form("/productos/carrito/add/1/", "cantidad=2").await;

        let body = body_json(shopper.post_form("/productos/carrito/decrease/1/", "").await).await;
        assert_eq!(body["count"], 1);
        assert!(body.get("removed").is_none());

        let body = body_json(shopper.post_form("/productos/carrito/decrease/1/", "").await).await;
        assert_eq!(body["count"], 0);
        assert_eq!(body["removed"], true);

        let body = body_json(shopper.post_form("/productos/carrito/decrease/1/", "").await).await;
        assert_eq!(body["ok"], false);
        assert_eq!(body["error"], "Producto no está en el carrito");
    }

    #[tokio::test]
    async fn remove_and_clear() {
        let shopper = Shopper::new().await;
        shopper.post_form("/productos/carrito/add/1/", "cantidad=1").await;
        shopper.post_form("/productos/carrito/add/3/", "cantidad=2").await;

        let body = body_json(shopper.post_form("/productos/carrito/remove/1/", "").await).await;
        assert_eq!(body["removed"], true);
        assert_eq!(body["count"], 2);

        let body = body_json(shopper.post_form("/productos/carrito/remove/1/", "").await).await;
        assert_eq!(body["ok"], false);

        let body = body_json(shopper.post_form("/productos/carrito/clear/", "").await).await;
        assert_eq!(body["ok"], true);
        assert_eq!(body["count"], 0);
        assert!(body_text(shopper.get("/productos/carrito/menu/").await).await.contains("cart-empty"));
    }

    #[tokio::test]
    async fn menu_rows_carry_quantity_and_price() {
        let shopper = Shopper::new().await;
        shopper.post_form("/productos/carrito/add/2/", "cantidad=3").await;
        let html = body_text(shopper.get("/productos/carrito/menu/").await).await;
        assert!(html.contains(r#"data-product-id="2" data-quantity="3" data-unit-price="3.99""#));
        assert!(html.contains("Subtotal: $11.97"));
    }

    #[tokio::test]
    async fn unknown_product_is_not_found() {
        let shopper = Shopper::new().await;
        let response = shopper.post_form("/productos/carrito/add/404/", "cantidad=1").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn missing_csrf_header_is_forbidden() {
        let shopper = Shopper::new().await;
        let request = axum::http::Request::post("/productos/carrito/clear/")
            .header(
                axum::http::header::COOKIE,
                format!("sessionid={}; csrftoken={}", shopper.id, shopper.token),
            )
            .body(axum::body::Body::empty())
            .unwrap();
        let response = tower::ServiceExt::oneshot(shopper.app.clone(), request).await.unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert!(shopper.state.sessions().snapshot(shopper.id).await.is_some());
    }
}

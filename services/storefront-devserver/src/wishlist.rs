use axum::{
    Json,
    extract::{Path, State},
    http::HeaderMap,
    response::Html,
};
use sf_api_types::{ProductId, WishlistToggleResponse};
use tracing::info;

use crate::session::{self, require_shopper};
use crate::{ApiResult, AppState, not_found, render, unauthorized};

/// `POST wishlist/toggle/{id}/`: flip membership and report the new state.
pub(crate) async fn toggle(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<u64>,
) -> ApiResult<WishlistToggleResponse> {
    let shopper = require_shopper(&state.sessions, &headers).await?;
    let id = ProductId(id);
    state
        .catalog
        .product(id)
        .ok_or_else(|| not_found("Producto no encontrado."))?;

    let added = state
        .sessions
        .with(shopper, |session| {
            if session.wishlist.remove(&id) {
                false
            } else {
                session.wishlist.insert(id)
            }
        })
        .await
        .ok_or_else(|| unauthorized("login required"))?;

    info!(product = %id, added, "wishlist toggled");
    Ok(Json(WishlistToggleResponse { added }))
}

pub(crate) async fn menu(State(state): State<AppState>, headers: HeaderMap) -> Html<String> {
    let session = session::current(&state.sessions, &headers).await.map(|(_, s)| s);
    Html(render::wishlist_menu(&state.catalog, session.as_ref()))
}

#[cfg(test)]
mod tests {
    use crate::testing::*;

    #[tokio::test]
    async fn toggle_round_trips() {
        let shopper = Shopper::new().await;
        let body = body_json(shopper.post_form("/productos/wishlist/toggle/3/", "").await).await;
        assert_eq!(body["added"], true);
        let menu = body_text(shopper.get("/productos/wishlist/menu/").await).await;
        assert!(menu.contains(r#"class="wishlist-item-row" data-product-id="3""#));

        let body = body_json(shopper.post_form("/productos/wishlist/toggle/3/", "").await).await;
        assert_eq!(body["added"], false);
        let menu = body_text(shopper.get("/productos/wishlist/menu/").await).await;
        assert!(menu.contains("wishlist-empty"));
    }

    #[tokio::test]
    async fn grid_reflects_wishlist_membership() {
        let shopper = Shopper::new().await;
        shopper.post_form("/productos/wishlist/toggle/1/", "").await;
        let body = body_json(shopper.get("/productos/filtrar/?categoria=sillas").await).await;
        let html = body["html"].as_str().unwrap();
        assert!(html.contains(r#"class="wishlist-btn active" data-product-id="1""#));
        assert!(html.contains(r#"class="wishlist-btn" data-product-id="2""#));
    }
}

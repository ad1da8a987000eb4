use axum::{
    Json,
    extract::{Query, State},
    http::{HeaderMap, header::SET_COOKIE},
    response::{AppendHeaders, Html, IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use sf_api_types::GridFragmentResponse;
use tracing::{debug, info};

use crate::session::{self, Session};
use crate::{ApiError, ApiResult, AppState, not_found, render};

#[derive(Debug, Deserialize)]
pub(crate) struct FilterQuery {
    categoria: Option<String>,
    q: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ConfirmQuery {
    direccion_id: Option<String>,
}

/// The request's session, or a fresh one plus the cookies announcing it.
async fn ensure_session(state: &AppState, headers: &HeaderMap) -> (Option<Session>, Option<[String; 2]>) {
    if let Some((_, session)) = session::current(&state.sessions, headers).await {
        return (Some(session), None);
    }
    let (id, token) = state.sessions.open().await;
    info!(session = %id, "opened shopper session");
    let session = state.sessions.snapshot(id).await;
    (session, Some(session::session_cookies(id, &token)))
}

fn with_cookies(cookies: Option<[String; 2]>, html: String) -> Response {
    match cookies {
        Some([sid, csrf]) => {
            (AppendHeaders([(SET_COOKIE, sid), (SET_COOKIE, csrf)]), Html(html)).into_response()
        }
        None => Html(html).into_response(),
    }
}

pub(crate) async fn index(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let (session, cookies) = ensure_session(&state, &headers).await;
    let html = render::index_page(&state.catalog, session.as_ref(), &state.endpoints);
    with_cookies(cookies, html)
}

pub(crate) async fn cart(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let (session, cookies) = ensure_session(&state, &headers).await;
    let html = render::cart_page(&state.catalog, session.as_ref(), &state.endpoints);
    with_cookies(cookies, html)
}

pub(crate) async fn select_address(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let (session, cookies) = ensure_session(&state, &headers).await;
    let html = render::address_page(&state.catalog, session.as_ref(), &state.endpoints);
    with_cookies(cookies, html)
}

pub(crate) async fn confirm(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<ConfirmQuery>,
) -> Result<Response, ApiError> {
    let Some((_, session)) = session::current(&state.sessions, &headers).await else {
        return Ok(Redirect::to(&format!("{}/", state.endpoints.base())).into_response());
    };
    if session.cart.is_empty() {
        return Ok(Redirect::to(&format!("{}/carrito/", state.endpoints.base())).into_response());
    }

    let address = query
        .direccion_id
        .as_deref()
        .and_then(|raw| raw.trim().parse::<u64>().ok())
        .and_then(|id| session.address(id))
        .ok_or_else(|| not_found("Dirección no encontrada."))?;

    let html = render::confirm_page(&state.catalog, Some(&session), &state.endpoints, &address.label);
    Ok(Html(html).into_response())
}

/// `GET filtrar/?categoria=<slug>&q=<text>`: the grid fragment as `{html}`.
pub(crate) async fn filter(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<FilterQuery>,
) -> ApiResult<GridFragmentResponse> {
    let session = session::current(&state.sessions, &headers).await.map(|(_, s)| s);
    let products = state
        .catalog
        .filter(query.categoria.as_deref(), query.q.as_deref())
        .ok_or_else(|| not_found("Categoría no encontrada."))?;

    debug!(
        category = query.categoria.as_deref().unwrap_or(""),
        products = products.len(),
        "grid filtered"
    );
    Ok(Json(GridFragmentResponse {
        html: Some(render::product_grid(&products, session.as_ref())),
    }))
}

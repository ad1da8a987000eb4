//! In-memory storefront backend.
//!
//! Serves the catalogue pages, the AJAX endpoints the storefront client talks
//! to, and the compiled browser bundle. State lives in process memory and is
//! lost on restart.

use anyhow::Context;
use axum::{
    Json, Router,
    http::StatusCode,
    response::Redirect,
    routing::{get, post},
};
use serde::Serialize;
use sf_api_types::{ADDRESSES_PATH, DEFAULT_BASE_PATH, Endpoints, ErrorResponse};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

mod addresses;
pub mod catalog;
mod cart;
mod checkout;
mod pages;
pub mod render;
pub mod session;
mod wishlist;

use catalog::Catalog;
use session::Sessions;

pub const DEFAULT_BIND: &str = "0.0.0.0:8000";
pub const DEFAULT_STATIC_DIR: &str = "ui/storefront-wasm/pkg";

pub(crate) type ApiError = (StatusCode, Json<ErrorResponse>);
pub(crate) type ApiResult<T> = Result<Json<T>, ApiError>;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind: SocketAddr,
    pub static_dir: PathBuf,
}

impl ServerConfig {
    /// Reads `STOREFRONT_BIND` (default `0.0.0.0:8000`) and
    /// `STOREFRONT_STATIC_DIR` (default `ui/storefront-wasm/pkg`).
    pub fn from_env() -> anyhow::Result<Self> {
        let bind = std::env::var("STOREFRONT_BIND").unwrap_or_else(|_| DEFAULT_BIND.to_owned());
        let bind = bind
            .parse()
            .with_context(|| format!("STOREFRONT_BIND is not a socket address: {bind}"))?;
        let static_dir = std::env::var("STOREFRONT_STATIC_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_STATIC_DIR));
        Ok(Self { bind, static_dir })
    }
}

#[derive(Clone)]
pub struct AppState {
    pub(crate) catalog: Arc<Catalog>,
    pub(crate) sessions: Sessions,
    pub(crate) endpoints: Endpoints,
    next_order: Arc<AtomicU64>,
}

impl AppState {
    pub fn new(catalog: Catalog) -> Self {
        Self {
            catalog: Arc::new(catalog),
            sessions: Sessions::default(),
            endpoints: Endpoints::default(),
            next_order: Arc::new(AtomicU64::new(1)),
        }
    }

    pub fn sessions(&self) -> &Sessions {
        &self.sessions
    }

    pub(crate) fn issue_order_id(&self) -> u64 {
        self.next_order.fetch_add(1, Ordering::Relaxed)
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(Catalog::seeded())
    }
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    service: &'static str,
    status: &'static str,
}

/// Every route: the storefront under `/productos`, saved addresses under
/// `/usuarios`, and `/pkg` for the browser bundle.
pub fn router(state: AppState, static_dir: &Path) -> Router {
    let p = |path: &str| format!("{DEFAULT_BASE_PATH}{path}");

    Router::new()
        .route("/", get(|| async { Redirect::to(&format!("{DEFAULT_BASE_PATH}/")) }))
        .route("/health", get(health))
        .route(&p("/"), get(pages::index))
        .route(&p("/filtrar/"), get(pages::filter))
        .route(&p("/wishlist/toggle/{id}/"), post(wishlist::toggle))
        .route(&p("/wishlist/menu/"), get(wishlist::menu))
        .route(&p("/carrito/"), get(pages::cart))
        .route(&p("/carrito/add/{id}/"), post(cart::add))
        .route(&p("/carrito/decrease/{id}/"), post(cart::decrease))
        .route(&p("/carrito/remove/{id}/"), post(cart::remove))
        .route(&p("/carrito/clear/"), post(cart::clear))
        .route(&p("/carrito/menu/"), get(cart::menu))
        .route(&p("/carrito/seleccionar-direccion/"), get(pages::select_address))
        .route(&p("/carrito/confirmar/"), get(pages::confirm))
        .route(&p("/carrito/pago-mercadopago/"), post(checkout::start_payment))
        .route(&p("/carrito/pago-prueba/"), get(checkout::payment_result))
        .route(&p("/enviar-resumen-email/"), post(checkout::email_summary))
        .route(&p("/resumen/{id}/subir_pdf/"), post(checkout::upload_summary_pdf))
        .route(ADDRESSES_PATH, get(addresses::list).post(addresses::create))
        .nest_service("/pkg", ServeDir::new(static_dir))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        service: "storefront-devserver",
        status: "ok",
    })
}

fn error(status: StatusCode, message: &str) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: message.to_owned(),
        }),
    )
}

pub(crate) fn bad_request(message: &str) -> ApiError {
    error(StatusCode::BAD_REQUEST, message)
}

pub(crate) fn unauthorized(message: &str) -> ApiError {
    error(StatusCode::UNAUTHORIZED, message)
}

pub(crate) fn forbidden(message: &str) -> ApiError {
    error(StatusCode::FORBIDDEN, message)
}

pub(crate) fn not_found(message: &str) -> ApiError {
    error(StatusCode::NOT_FOUND, message)
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, header};
    use axum::response::Response;
    use sf_api_types::{CSRF_COOKIE, CSRF_HEADER};
    use tower::ServiceExt;
    use uuid::Uuid;

    pub(crate) struct Shopper {
        pub(crate) app: Router,
        pub(crate) state: AppState,
        pub(crate) id: Uuid,
        pub(crate) token: String,
    }

    impl Shopper {
        pub(crate) async fn new() -> Self {
            let state = AppState::default();
            let (id, token) = state.sessions.open().await;
            let app = router(state.clone(), Path::new("does-not-exist"));
            Self {
                app,
                state,
                id,
                token,
            }
        }

        fn cookie(&self) -> String {
            format!("{}={}; {CSRF_COOKIE}={}", session::SESSION_COOKIE, self.id, self.token)
        }

        pub(crate) async fn get(&self, uri: &str) -> Response {
            let request = Request::get(uri)
                .header(header::COOKIE, self.cookie())
                .body(Body::empty())
                .unwrap();
            self.app.clone().oneshot(request).await.unwrap()
        }

        pub(crate) async fn post_form(&self, uri: &str, form: &str) -> Response {
            let request = Request::post(uri)
                .header(header::COOKIE, self.cookie())
                .header(CSRF_HEADER, &self.token)
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from(form.to_owned()))
                .unwrap();
            self.app.clone().oneshot(request).await.unwrap()
        }

        pub(crate) async fn post_json(&self, uri: &str, json: serde_json::Value) -> Response {
            let request = Request::post(uri)
                .header(header::COOKIE, self.cookie())
                .header(CSRF_HEADER, &self.token)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap();
            self.app.clone().oneshot(request).await.unwrap()
        }
    }

    pub(crate) async fn body_text(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    pub(crate) async fn body_json(response: Response) -> serde_json::Value {
        serde_json::from_str(&body_text(response).await).unwrap()
    }
}

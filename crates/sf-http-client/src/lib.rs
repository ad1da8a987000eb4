use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::cookie::{CookieStore, Jar};
use reqwest::{RequestBuilder, Url};
use serde::de::DeserializeOwned;
use sf_api_types::{
    CSRF_COOKIE, CSRF_HEADER, CartMutationResponse, CartQuantityForm, Endpoints,
    GridFragmentResponse, ListKind, PaymentRequest, PaymentResponse, ProductId,
    REQUESTED_WITH_AJAX, REQUESTED_WITH_HEADER, SuccessResponse, SummaryEmailRequest,
    WishlistToggleResponse,
};
use sf_sync::api::{decode_reply, fragment_reply};
use sf_sync::token::get_token;
use sf_sync::{StorefrontApi, SyncError, SyncResult};
use std::sync::Arc;
use tracing::{debug, warn};

pub const DEFAULT_ORIGIN: &str = "http://127.0.0.1:8000";

/// Session-holding HTTP client for the storefront endpoints.
///
/// Reads `STOREFRONT_URL` from environment at construction time
/// (default: `http://127.0.0.1:8000`). Cookies, including `csrftoken`, live in
/// an in-process jar, so one client is one shopper session.
pub struct StorefrontClient {
    origin: Url,
    endpoints: Endpoints,
    http: reqwest::Client,
    jar: Arc<Jar>,
}

impl StorefrontClient {
    pub fn new(origin: Option<String>) -> Result<Self> {
        Self::with_endpoints(origin, Endpoints::default())
    }

    pub fn with_endpoints(origin: Option<String>, endpoints: Endpoints) -> Result<Self> {
        let origin = origin
            .or_else(|| std::env::var("STOREFRONT_URL").ok())
            .unwrap_or_else(|| DEFAULT_ORIGIN.to_owned());
        let origin = Url::parse(origin.trim_end_matches('/'))
            .with_context(|| format!("invalid storefront origin {origin}"))?;

        let jar = Arc::new(Jar::default());
        let http = reqwest::Client::builder()
            .cookie_provider(jar.clone())
            .build()
            .context("building storefront http client")?;

        Ok(Self {
            origin,
            endpoints,
            http,
            jar,
        })
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    /// The `csrftoken` cookie currently held for the storefront origin.
    pub fn csrf_token(&self) -> Option<String> {
        let header = self.jar.cookies(&self.origin)?;
        get_token(header.to_str().ok()?, CSRF_COOKIE)
    }

    /// Load the catalogue page once so the server issues session and CSRF
    /// cookies.
    pub async fn open_session(&self) -> SyncResult<()> {
        let response = self
            .http
            .get(self.url(&format!("{}/", self.endpoints.base())))
            .send()
            .await
            .map_err(network)?;
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(SyncError::Http { status, body });
        }
        debug!(csrf = self.csrf_token().is_some(), "storefront session opened");
        Ok(())
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.origin.as_str().trim_end_matches('/'), path)
    }

    fn get(&self, path: &str) -> RequestBuilder {
        self.http
            .get(self.url(path))
            .header(REQUESTED_WITH_HEADER, REQUESTED_WITH_AJAX)
    }

    fn post(&self, path: &str) -> RequestBuilder {
        let builder = self
            .http
            .post(self.url(path))
            .header(REQUESTED_WITH_HEADER, REQUESTED_WITH_AJAX);
        match self.csrf_token() {
            Some(token) => builder.header(CSRF_HEADER, token),
            None => {
                warn!(path, "no csrf token held; request will likely be rejected");
                builder
            }
        }
    }
}

fn network(err: reqwest::Error) -> SyncError {
    SyncError::Network(err.to_string())
}

async fn send_json<T: DeserializeOwned>(request: RequestBuilder) -> SyncResult<T> {
    let response = request.send().await.map_err(network)?;
    let status = response.status().as_u16();
    let text = response.text().await.map_err(network)?;
    decode_reply(status, text)
}

async fn send_text(request: RequestBuilder) -> SyncResult<String> {
    let response = request.send().await.map_err(network)?;
    let status = response.status().as_u16();
    let text = response.text().await.map_err(network)?;
    fragment_reply(status, text)
}

#[async_trait(?Send)]
impl StorefrontApi for StorefrontClient {
    async fn toggle_wishlist(&self, id: ProductId) -> SyncResult<WishlistToggleResponse> {
        send_json(self.post(&self.endpoints.wishlist_toggle(id))).await
    }

    async fn add_to_cart(&self, id: ProductId, cantidad: u32) -> SyncResult<CartMutationResponse> {
        let form = CartQuantityForm { cantidad };
        send_json(self.post(&self.endpoints.cart_add(id)).form(&form)).await
    }

    async fn decrease_cart(&self, id: ProductId) -> SyncResult<CartMutationResponse> {
        send_json(self.post(&self.endpoints.cart_decrease(id))).await
    }

    async fn remove_from_cart(&self, id: ProductId) -> SyncResult<CartMutationResponse> {
        send_json(self.post(&self.endpoints.cart_remove(id))).await
    }

    async fn clear_cart(&self) -> SyncResult<CartMutationResponse> {
        send_json(self.post(&self.endpoints.cart_clear())).await
    }

    async fn menu_fragment(&self, kind: ListKind) -> SyncResult<String> {
        send_text(self.get(&self.endpoints.menu(kind))).await
    }

    async fn filter_grid(&self, category: Option<&str>) -> SyncResult<GridFragmentResponse> {
        send_json(self.get(&self.endpoints.filter(category))).await
    }

    async fn start_payment(&self, direccion_id: &str) -> SyncResult<PaymentResponse> {
        let body = PaymentRequest {
            direccion_id: direccion_id.to_owned(),
        };
        send_json(self.post(&self.endpoints.payment()).json(&body)).await
    }

    async fn send_summary_email(&self, pedido_id: u64) -> SyncResult<SuccessResponse> {
        let body = SummaryEmailRequest { pedido_id };
        send_json(self.post(&self.endpoints.summary_email()).json(&body)).await
    }

    async fn upload_summary_pdf(&self, resumen_id: u64, pdf: Vec<u8>) -> SyncResult<SuccessResponse> {
        let part = reqwest::multipart::Part::bytes(pdf)
            .file_name(format!("resumen_{resumen_id}.pdf"))
            .mime_str("application/pdf")
            .map_err(|e| SyncError::Precondition(e.to_string()))?;
        let form = reqwest::multipart::Form::new().part("pdf", part);
        send_json(self.post(&self.endpoints.summary_pdf_upload(resumen_id)).multipart(form)).await
    }
}

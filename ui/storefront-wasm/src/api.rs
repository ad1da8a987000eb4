//! Fetch-backed [`StorefrontApi`].
//!
//! Requests go to the page's own origin so the session cookie rides along.
//! The CSRF token is resolved per request because the server may rotate it.

use crate::dom;
use async_trait::async_trait;
use gloo_net::http::{Request, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use sf_api_types::{
    CSRF_FORM_FIELD, CSRF_HEADER, CartMutationResponse, Endpoints, GridFragmentResponse, ListKind,
    PaymentRequest, PaymentResponse, ProductId, REQUESTED_WITH_AJAX, REQUESTED_WITH_HEADER,
    SuccessResponse, SummaryEmailRequest, WishlistToggleResponse,
};
use sf_sync::api::{decode_reply, fragment_reply};
use sf_sync::token::CsrfSources;
use sf_sync::{StorefrontApi, SyncError, SyncResult};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Blob, BlobPropertyBag, FormData, HtmlDocument, HtmlInputElement};

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded; charset=UTF-8";

/// Every place the page may carry the anti-forgery token.
pub fn csrf_sources() -> CsrfSources {
    let cookie_header = dom::doc()
        .dyn_into::<HtmlDocument>()
        .ok()
        .and_then(|d| d.cookie().ok());
    let form_field = dom::query(&format!("input[name=\"{CSRF_FORM_FIELD}\"]"))
        .and_then(|el| el.dyn_into::<HtmlInputElement>().ok())
        .map(|input| input.value());
    CsrfSources {
        cookie_header,
        form_field,
        meta_tag: dom::meta_content("csrf-token"),
    }
}

pub struct FetchApi {
    endpoints: Endpoints,
}

impl FetchApi {
    pub fn new(endpoints: Endpoints) -> Self {
        Self { endpoints }
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    fn get(&self, path: &str) -> RequestBuilder {
        Request::get(path).header(REQUESTED_WITH_HEADER, REQUESTED_WITH_AJAX)
    }

    /// State-changing calls fail fast when the page carries no token.
    fn post(&self, path: &str) -> SyncResult<RequestBuilder> {
        let token = csrf_sources()
            .resolve()
            .ok_or_else(|| SyncError::Precondition("no csrf token on page".to_owned()))?;
        Ok(Request::post(path)
            .header(REQUESTED_WITH_HEADER, REQUESTED_WITH_AJAX)
            .header(CSRF_HEADER, &token))
    }
}

fn network(err: gloo_net::Error) -> SyncError {
    SyncError::Network(err.to_string())
}

fn js_error(err: JsValue) -> SyncError {
    SyncError::Precondition(format!("{err:?}"))
}

async fn reply(response: Response) -> SyncResult<(u16, String)> {
    let status = response.status();
    let body = response.text().await.map_err(network)?;
    Ok((status, body))
}

async fn send_json<T: DeserializeOwned>(request: Request) -> SyncResult<T> {
    let response = request.send().await.map_err(network)?;
    let (status, body) = reply(response).await?;
    decode_reply(status, body)
}

async fn send_empty<T: DeserializeOwned>(builder: RequestBuilder) -> SyncResult<T> {
    let response = builder.send().await.map_err(network)?;
    let (status, body) = reply(response).await?;
    decode_reply(status, body)
}

fn pdf_form(resumen_id: u64, pdf: &[u8]) -> Result<FormData, JsValue> {
    let bytes = js_sys::Uint8Array::from(pdf);
    let parts = js_sys::Array::of1(&bytes);
    let options = BlobPropertyBag::new();
    options.set_type("application/pdf");
    let blob = Blob::new_with_u8_array_sequence_and_options(&parts, &options)?;
    let form = FormData::new()?;
    form.append_with_blob_and_filename("pdf", &blob, &format!("resumen_{resumen_id}.pdf"))?;
    Ok(form)
}

#[async_trait(?Send)]
impl StorefrontApi for FetchApi {
    async fn toggle_wishlist(&self, id: ProductId) -> SyncResult<WishlistToggleResponse> {
        send_empty(self.post(&self.endpoints.wishlist_toggle(id))?).await
    }

    async fn add_to_cart(&self, id: ProductId, cantidad: u32) -> SyncResult<CartMutationResponse> {
        let request = self
            .post(&self.endpoints.cart_add(id))?
            .header("Content-Type", FORM_CONTENT_TYPE)
            .body(format!("cantidad={cantidad}"))
            .map_err(network)?;
        send_json(request).await
    }

    async fn decrease_cart(&self, id: ProductId) -> SyncResult<CartMutationResponse> {
        send_empty(self.post(&self.endpoints.cart_decrease(id))?).await
    }

    async fn remove_from_cart(&self, id: ProductId) -> SyncResult<CartMutationResponse> {
        send_empty(self.post(&self.endpoints.cart_remove(id))?).await
    }

    async fn clear_cart(&self) -> SyncResult<CartMutationResponse> {
        send_empty(self.post(&self.endpoints.cart_clear())?).await
    }

    async fn menu_fragment(&self, kind: ListKind) -> SyncResult<String> {
        let response = self
            .get(&self.endpoints.menu(kind))
            .send()
            .await
            .map_err(network)?;
        let (status, body) = reply(response).await?;
        fragment_reply(status, body)
    }

    async fn filter_grid(&self, category: Option<&str>) -> SyncResult<GridFragmentResponse> {
        send_empty(self.get(&self.endpoints.filter(category))).await
    }

    async fn start_payment(&self, direccion_id: &str) -> SyncResult<PaymentResponse> {
        let body = PaymentRequest {
            direccion_id: direccion_id.to_owned(),
        };
        let request = self
            .post(&self.endpoints.payment())?
            .json(&body)
            .map_err(network)?;
        send_json(request).await
    }

    async fn send_summary_email(&self, pedido_id: u64) -> SyncResult<SuccessResponse> {
        let request = self
            .post(&self.endpoints.summary_email())?
            .json(&SummaryEmailRequest { pedido_id })
            .map_err(network)?;
        send_json(request).await
    }

    async fn upload_summary_pdf(&self, resumen_id: u64, pdf: Vec<u8>) -> SyncResult<SuccessResponse> {
        let form = pdf_form(resumen_id, &pdf).map_err(js_error)?;
        let request = self
            .post(&self.endpoints.summary_pdf_upload(resumen_id))?
            .body(form)
            .map_err(network)?;
        send_json(request).await
    }
}

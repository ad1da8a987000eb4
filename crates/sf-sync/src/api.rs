use crate::error::{SyncError, SyncResult};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use sf_api_types::{
    CartMutationResponse, GridFragmentResponse, ListKind, PaymentResponse, ProductId,
    SuccessResponse, WishlistToggleResponse,
};

/// The storefront backend as seen by the client.
///
/// Implementations attach the CSRF and `X-Requested-With` headers to every
/// state-changing call. A non-2xx response whose body still decodes into the
/// expected payload (e.g. `400 {"ok": false, "error": ...}`) is returned as
/// `Ok` so the caller sees the server's message; anything else becomes
/// [`crate::SyncError::Http`].
#[async_trait(?Send)]
pub trait StorefrontApi {
    async fn toggle_wishlist(&self, id: ProductId) -> SyncResult<WishlistToggleResponse>;
    /// `cantidad` is the absolute line quantity.
    async fn add_to_cart(&self, id: ProductId, cantidad: u32) -> SyncResult<CartMutationResponse>;
    async fn decrease_cart(&self, id: ProductId) -> SyncResult<CartMutationResponse>;
    async fn remove_from_cart(&self, id: ProductId) -> SyncResult<CartMutationResponse>;
    async fn clear_cart(&self) -> SyncResult<CartMutationResponse>;
    async fn menu_fragment(&self, kind: ListKind) -> SyncResult<String>;
    async fn filter_grid(&self, category: Option<&str>) -> SyncResult<GridFragmentResponse>;
    async fn start_payment(&self, direccion_id: &str) -> SyncResult<PaymentResponse>;
    async fn send_summary_email(&self, pedido_id: u64) -> SyncResult<SuccessResponse>;
    async fn upload_summary_pdf(&self, resumen_id: u64, pdf: Vec<u8>) -> SyncResult<SuccessResponse>;
}

/// The page-side collaborators the engine drives.
pub trait Surfaces {
    /// Swap in a menu fragment and return the rows it renders. Implementations
    /// must read the rows even when the page has no dropdown for `kind`.
    fn replace_menu(&self, kind: ListKind, html: &str) -> Vec<crate::MenuEntry>;
    /// Swap in a grid fragment, initialise the new subtree and return the
    /// number of product cards it contains.
    fn replace_grid(&self, html: &str) -> usize;
    fn confirm(&self, message: &str) -> bool;
    fn alert(&self, message: &str);
    /// Non-blocking notice, e.g. a toast.
    fn notify(&self, message: &str);
}

/// Decode a reply body as `T` whatever the status. Error statuses whose body
/// is not a `T` become [`SyncError::Http`]; a 2xx body that is not a `T` is a
/// [`SyncError::Decode`].
pub fn decode_reply<T: DeserializeOwned>(status: u16, body: String) -> SyncResult<T> {
    match serde_json::from_str::<T>(&body) {
        Ok(value) => Ok(value),
        Err(_) if !(200..300).contains(&status) => Err(SyncError::Http { status, body }),
        Err(err) => Err(SyncError::Decode(format!("{err}; raw: {body}"))),
    }
}

/// Accept a fragment body only on a 2xx status.
pub fn fragment_reply(status: u16, body: String) -> SyncResult<String> {
    if (200..300).contains(&status) {
        Ok(body)
    } else {
        Err(SyncError::Http { status, body })
    }
}

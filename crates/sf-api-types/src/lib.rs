use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const DEFAULT_BASE_PATH: &str = "/productos";
pub const CSRF_COOKIE: &str = "csrftoken";
pub const CSRF_HEADER: &str = "X-CSRFToken";
pub const CSRF_FORM_FIELD: &str = "csrfmiddlewaretoken";
pub const REQUESTED_WITH_HEADER: &str = "X-Requested-With";
pub const REQUESTED_WITH_AJAX: &str = "XMLHttpRequest";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(pub u64);

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ProductId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse::<u64>().map(ProductId)
    }
}

/// The two server-owned product lists a session has.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListKind {
    Cart,
    Wishlist,
}

impl ListKind {
    pub const ALL: [ListKind; 2] = [ListKind::Cart, ListKind::Wishlist];

    pub fn as_str(&self) -> &'static str {
        match self {
            ListKind::Cart => "cart",
            ListKind::Wishlist => "wishlist",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WishlistToggleResponse {
    pub added: bool,
}

/// Body of `carrito/add/{id}/`. `cantidad` is the absolute line quantity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartQuantityForm {
    pub cantidad: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CartMutationResponse {
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<u32>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub removed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GridFragmentResponse {
    #[serde(default)]
    pub html: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentRequest {
    pub direccion_id: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PaymentResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryEmailRequest {
    pub pedido_id: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SuccessResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Saved shipping addresses, at `/usuarios/direcciones/`.
pub const ADDRESSES_PATH: &str = "/usuarios/direcciones/";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressEntry {
    pub id: u64,
    pub label: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AddressList {
    pub direcciones: Vec<AddressEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewAddressRequest {
    #[serde(default)]
    pub label: String,
}

/// Field-level validation errors ride along with `success: false`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AddressSaveResponse {
    pub success: bool,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<std::collections::BTreeMap<String, Vec<String>>>,
}

/// Path table for the storefront endpoints, rooted at the app prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    base: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_PATH)
    }
}

impl Endpoints {
    pub fn new(base: &str) -> Self {
        Self {
            base: base.trim_end_matches('/').to_owned(),
        }
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    /// `filtrar/`, with the `categoria` parameter omitted for "all".
    pub fn filter(&self, category: Option<&str>) -> String {
        match category.map(str::trim).filter(|c| !c.is_empty()) {
            Some(category) => format!(
                "{}/filtrar/?categoria={}",
                self.base,
                encode_query_value(category)
            ),
            None => format!("{}/filtrar/", self.base),
        }
    }

    pub fn wishlist_toggle(&self, id: ProductId) -> String {
        format!("{}/wishlist/toggle/{id}/", self.base)
    }

    pub fn menu(&self, kind: ListKind) -> String {
        match kind {
            ListKind::Cart => format!("{}/carrito/menu/", self.base),
            ListKind::Wishlist => format!("{}/wishlist/menu/", self.base),
        }
    }

    pub fn cart_add(&self, id: ProductId) -> String {
        format!("{}/carrito/add/{id}/", self.base)
    }

    pub fn cart_decrease(&self, id: ProductId) -> String {
        format!("{}/carrito/decrease/{id}/", self.base)
    }

    pub fn cart_remove(&self, id: ProductId) -> String {
        format!("{}/carrito/remove/{id}/", self.base)
    }

    pub fn cart_clear(&self) -> String {
        format!("{}/carrito/clear/", self.base)
    }

    pub fn payment(&self) -> String {
        format!("{}/carrito/pago-mercadopago/", self.base)
    }

    pub fn select_address(&self) -> String {
        format!("{}/carrito/seleccionar-direccion/", self.base)
    }

    pub fn confirm_order(&self, direccion_id: &str) -> String {
        format!(
            "{}/carrito/confirmar/?direccion_id={}",
            self.base,
            encode_query_value(direccion_id)
        )
    }

    pub fn summary_email(&self) -> String {
        format!("{}/enviar-resumen-email/", self.base)
    }

    pub fn summary_pdf_upload(&self, resumen_id: u64) -> String {
        format!("{}/resumen/{resumen_id}/subir_pdf/", self.base)
    }
}

/// Class and attribute names shared by the server-rendered fragments and the
/// client that reads them back.
pub mod markup {
    pub const CART_ROW: &str = "cart-item-row";
    pub const WISHLIST_ROW: &str = "wishlist-item-row";
    pub const CART_EMPTY: &str = "cart-empty";
    pub const WISHLIST_EMPTY: &str = "wishlist-empty";
    pub const PRODUCT_CARD: &str = "product-card";
    pub const ATTR_PRODUCT_ID: &str = "data-product-id";
    pub const ATTR_QUANTITY: &str = "data-quantity";
    /// Decimal unit price, e.g. `10.00`.
    pub const ATTR_UNIT_PRICE: &str = "data-unit-price";
    pub const ATTR_IMAGES: &str = "data-images";
}

/// Percent-encode everything outside the RFC 3986 unreserved set.
pub fn encode_query_value(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for byte in value.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char)
            }
            other => out.push_str(&format!("%{other:02X}")),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_path_omits_empty_category() {
        let endpoints = Endpoints::default();
        assert_eq!(endpoints.filter(None), "/productos/filtrar/");
        assert_eq!(endpoints.filter(Some("  ")), "/productos/filtrar/");
        assert_eq!(
            endpoints.filter(Some("sillas de jardin")),
            "/productos/filtrar/?categoria=sillas%20de%20jardin"
        );
    }

    #[test]
    fn endpoints_strip_trailing_slash_from_base() {
        let endpoints = Endpoints::new("/tienda/");
        assert_eq!(endpoints.cart_add(ProductId(7)), "/tienda/carrito/add/7/");
        assert_eq!(endpoints.menu(ListKind::Wishlist), "/tienda/wishlist/menu/");
    }

    #[test]
    fn cart_response_tolerates_missing_fields() {
        let parsed: CartMutationResponse =
            serde_json::from_str(r#"{"ok": false, "error": "Solo hay 2 unidades disponibles."}"#)
                .unwrap();
        assert!(!parsed.ok);
        assert_eq!(parsed.count, None);
        assert!(!parsed.removed);
        assert_eq!(parsed.error.as_deref(), Some("Solo hay 2 unidades disponibles."));
    }

    #[test]
    fn product_id_parses_attribute_text() {
        assert_eq!(" 42 ".parse::<ProductId>().unwrap(), ProductId(42));
        assert!("abc".parse::<ProductId>().is_err());
    }
}

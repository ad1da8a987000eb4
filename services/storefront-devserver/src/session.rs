use axum::http::HeaderMap;
use axum::http::header::COOKIE;
use sf_api_types::{CSRF_COOKIE, CSRF_HEADER, ProductId};
use sf_sync::Money;
use sf_sync::token::get_token;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::{ApiError, forbidden, unauthorized};

pub const SESSION_COOKIE: &str = "sessionid";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CartItem {
    pub quantity: u32,
    /// Price at the time the line was last written.
    pub unit_price: Money,
}

impl CartItem {
    pub fn subtotal(&self) -> Option<Money> {
        self.unit_price.times(self.quantity)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Address {
    pub id: u64,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub id: u64,
    pub address_id: u64,
    pub lines: BTreeMap<ProductId, CartItem>,
    pub summary_pdf: Option<usize>,
    pub emails_sent: u32,
}

impl Order {
    pub fn total(&self) -> Money {
        self.lines.values().filter_map(CartItem::subtotal).sum()
    }
}

/// Server-side state of one shopper.
#[derive(Debug, Clone)]
pub struct Session {
    pub csrf_token: String,
    pub cart: BTreeMap<ProductId, CartItem>,
    pub wishlist: BTreeSet<ProductId>,
    pub addresses: Vec<Address>,
    pub orders: BTreeMap<u64, Order>,
}

impl Session {
    fn new() -> Self {
        Self {
            csrf_token: Uuid::new_v4().simple().to_string(),
            cart: BTreeMap::new(),
            wishlist: BTreeSet::new(),
            addresses: vec![
                Address {
                    id: 1,
                    label: "Av. Juárez 120, Centro".to_owned(),
                },
                Address {
                    id: 2,
                    label: "Calle Roble 8, Jardines".to_owned(),
                },
            ],
            orders: BTreeMap::new(),
        }
    }

    /// Total units across all lines; the `count` of cart responses.
    pub fn cart_units(&self) -> u32 {
        self.cart.values().map(|item| item.quantity).sum()
    }

    pub fn cart_total(&self) -> Money {
        self.cart.values().filter_map(CartItem::subtotal).sum()
    }

    pub fn address(&self, id: u64) -> Option<&Address> {
        self.addresses.iter().find(|a| a.id == id)
    }
}

/// Shared in-memory session table.
#[derive(Clone, Default)]
pub struct Sessions {
    inner: Arc<Mutex<HashMap<Uuid, Session>>>,
}

impl Sessions {
    /// Start a new session; returns its id and CSRF token.
    pub async fn open(&self) -> (Uuid, String) {
        let id = Uuid::new_v4();
        let session = Session::new();
        let token = session.csrf_token.clone();
        self.inner.lock().await.insert(id, session);
        (id, token)
    }

    pub async fn csrf_token(&self, id: Uuid) -> Option<String> {
        self.inner.lock().await.get(&id).map(|s| s.csrf_token.clone())
    }

    pub async fn snapshot(&self, id: Uuid) -> Option<Session> {
        self.inner.lock().await.get(&id).cloned()
    }

    /// Run `f` against the session, if it exists.
    pub async fn with<R>(&self, id: Uuid, f: impl FnOnce(&mut Session) -> R) -> Option<R> {
        self.inner.lock().await.get_mut(&id).map(f)
    }
}

/// All `Cookie` headers of a request joined into one `a=1; b=2` string.
pub fn cookie_header(headers: &HeaderMap) -> String {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .collect::<Vec<_>>()
        .join("; ")
}

pub fn session_id(headers: &HeaderMap) -> Option<Uuid> {
    get_token(&cookie_header(headers), SESSION_COOKIE).and_then(|raw| Uuid::parse_str(&raw).ok())
}

/// The known session behind this request, for read-only views.
pub async fn current(sessions: &Sessions, headers: &HeaderMap) -> Option<(Uuid, Session)> {
    let id = session_id(headers)?;
    sessions.snapshot(id).await.map(|session| (id, session))
}

/// Gate for state-changing requests: a live session, and an `X-CSRFToken`
/// header matching both the `csrftoken` cookie and the session's token.
pub async fn require_shopper(sessions: &Sessions, headers: &HeaderMap) -> Result<Uuid, ApiError> {
    let id = session_id(headers).ok_or_else(|| unauthorized("login required"))?;
    let expected = sessions
        .csrf_token(id)
        .await
        .ok_or_else(|| unauthorized("login required"))?;

    let cookie = get_token(&cookie_header(headers), CSRF_COOKIE);
    let header = headers.get(CSRF_HEADER).and_then(|v| v.to_str().ok());
    match (cookie.as_deref(), header) {
        (Some(cookie), Some(header)) if cookie == expected && header == expected => Ok(id),
        _ => Err(forbidden("CSRF verification failed.")),
    }
}

pub fn session_cookies(id: Uuid, csrf_token: &str) -> [String; 2] {
    [
        format!("{SESSION_COOKIE}={id}; Path=/; HttpOnly; SameSite=Lax"),
        format!("{CSRF_COOKIE}={csrf_token}; Path=/; SameSite=Lax"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(cookie: &str, csrf: Option<&str>) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_str(cookie).unwrap());
        if let Some(csrf) = csrf {
            headers.insert(CSRF_HEADER, HeaderValue::from_str(csrf).unwrap());
        }
        headers
    }

    #[tokio::test]
    async fn csrf_must_match_cookie_and_session() {
        let sessions = Sessions::default();
        let (id, token) = sessions.open().await;
        let cookie = format!("{SESSION_COOKIE}={id}; {CSRF_COOKIE}={token}");

        assert_eq!(require_shopper(&sessions, &headers(&cookie, Some(&token))).await.ok(), Some(id));

        let (status, _) = require_shopper(&sessions, &headers(&cookie, Some("forged")))
            .await
            .unwrap_err();
        assert_eq!(status, axum::http::StatusCode::FORBIDDEN);

        let (status, _) = require_shopper(&sessions, &headers(&cookie, None)).await.unwrap_err();
        assert_eq!(status, axum::http::StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn unknown_session_is_unauthorized() {
        let sessions = Sessions::default();
        let cookie = format!("{SESSION_COOKIE}={}", Uuid::new_v4());
        let (status, _) = require_shopper(&sessions, &headers(&cookie, Some("x")))
            .await
            .unwrap_err();
        assert_eq!(status, axum::http::StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn cart_units_count_every_unit() {
        let mut session = Session::new();
        session.cart.insert(
            ProductId(1),
            CartItem {
                quantity: 2,
                unit_price: Money::from_cents(1000),
            },
        );
        session.cart.insert(
            ProductId(2),
            CartItem {
                quantity: 1,
                unit_price: Money::from_cents(399),
            },
        );
        assert_eq!(session.cart_units(), 3);
        assert_eq!(session.cart_total().to_string(), "$23.99");
    }
}

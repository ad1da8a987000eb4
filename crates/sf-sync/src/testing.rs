//! In-memory backend and page fakes shared by the unit tests.

use crate::api::{StorefrontApi, Surfaces};
use crate::engine::SyncEngine;
use crate::error::{SyncError, SyncResult};
use crate::money::Money;
use crate::store::MenuEntry;
use async_trait::async_trait;
use sf_api_types::{
    CartMutationResponse, GridFragmentResponse, ListKind, PaymentResponse, ProductId,
    SuccessResponse, WishlistToggleResponse,
};
use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, BTreeSet, VecDeque};

/// In-memory backend with the production server's cart semantics.
/// Menu fragments are encoded as `id:qty:cents;...`.
#[derive(Default)]
pub(crate) struct FakeApi {
    pub(crate) wishlist: RefCell<BTreeSet<ProductId>>,
    pub(crate) cart: RefCell<BTreeMap<ProductId, u32>>,
    pub(crate) prices: BTreeMap<ProductId, i64>,
    pub(crate) stock: u32,
    pub(crate) fail_next: RefCell<Option<SyncError>>,
    pub(crate) delays: RefCell<VecDeque<usize>>,
    pub(crate) grid: RefCell<Option<String>>,
    /// Per-category grid markup, consulted before `grid`.
    pub(crate) categories: RefCell<BTreeMap<String, String>>,
    pub(crate) payment: RefCell<PaymentResponse>,
    pub(crate) email: RefCell<SuccessResponse>,
}

impl FakeApi {
    pub(crate) fn new() -> Self {
        Self {
            prices: [(ProductId(1), 1000), (ProductId(2), 450)].into_iter().collect(),
            stock: 5,
            ..Self::default()
        }
    }

    pub(crate) async fn gate(&self) -> SyncResult<()> {
        let delay = self.delays.borrow_mut().pop_front().unwrap_or(0);
        for _ in 0..delay {
            tokio::task::yield_now().await;
        }
        match self.fail_next.borrow_mut().take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn count(&self) -> u32 {
        self.cart.borrow().values().sum()
    }

    fn response(&self, removed: bool) -> CartMutationResponse {
        CartMutationResponse {
            ok: true,
            count: Some(self.count()),
            removed,
            error: None,
        }
    }

    fn missing() -> CartMutationResponse {
        CartMutationResponse {
            ok: false,
            error: Some("Producto no está en el carrito".into()),
            ..CartMutationResponse::default()
        }
    }
}

#[async_trait(?Send)]
impl StorefrontApi for FakeApi {
    async fn toggle_wishlist(&self, id: ProductId) -> SyncResult<WishlistToggleResponse> {
        self.gate().await?;
        let mut wishlist = self.wishlist.borrow_mut();
        let added = if wishlist.remove(&id) {
            false
        } else {
            wishlist.insert(id);
            true
        };
        Ok(WishlistToggleResponse { added })
    }

    async fn add_to_cart(&self, id: ProductId, cantidad: u32) -> SyncResult<CartMutationResponse> {
        self.gate().await?;
        if cantidad > self.stock {
            return Ok(CartMutationResponse {
                ok: false,
                error: Some(format!("Solo hay {} unidades disponibles.", self.stock)),
                ..CartMutationResponse::default()
            });
        }
        self.cart.borrow_mut().insert(id, cantidad);
        Ok(self.response(false))
    }

    async fn decrease_cart(&self, id: ProductId) -> SyncResult<CartMutationResponse> {
        self.gate().await?;
        let current = self.cart.borrow().get(&id).copied();
        let removed = match current {
            None => return Ok(Self::missing()),
            Some(qty) if qty > 1 => {
                self.cart.borrow_mut().insert(id, qty - 1);
                false
            }
            Some(_) => {
                self.cart.borrow_mut().remove(&id);
                true
            }
        };
        Ok(self.response(removed))
    }

    async fn remove_from_cart(&self, id: ProductId) -> SyncResult<CartMutationResponse> {
        self.gate().await?;
        if self.cart.borrow_mut().remove(&id).is_none() {
            return Ok(Self::missing());
        }
        Ok(self.response(true))
    }

    async fn clear_cart(&self) -> SyncResult<CartMutationResponse> {
        self.gate().await?;
        self.cart.borrow_mut().clear();
        Ok(self.response(false))
    }

    async fn menu_fragment(&self, kind: ListKind) -> SyncResult<String> {
        self.gate().await?;
        let rows: Vec<String> = match kind {
            ListKind::Cart => self
                .cart
                .borrow()
                .iter()
                .map(|(id, qty)| format!("{id}:{qty}:{}", self.prices.get(id).unwrap_or(&0)))
                .collect(),
            ListKind::Wishlist => self.wishlist.borrow().iter().map(|id| id.to_string()).collect(),
        };
        Ok(rows.join(";"))
    }

    async fn filter_grid(&self, category: Option<&str>) -> SyncResult<GridFragmentResponse> {
        self.gate().await?;
        let html = category
            .and_then(|c| self.categories.borrow().get(c).cloned())
            .or_else(|| self.grid.borrow().clone());
        Ok(GridFragmentResponse { html })
    }

    async fn start_payment(&self, _direccion_id: &str) -> SyncResult<PaymentResponse> {
        self.gate().await?;
        Ok(self.payment.borrow().clone())
    }

    async fn send_summary_email(&self, _pedido_id: u64) -> SyncResult<SuccessResponse> {
        self.gate().await?;
        Ok(self.email.borrow().clone())
    }

    async fn upload_summary_pdf(&self, _resumen_id: u64, _pdf: Vec<u8>) -> SyncResult<SuccessResponse> {
        self.gate().await?;
        Ok(SuccessResponse::default())
    }
}

#[derive(Default)]
pub(crate) struct FakeSurfaces {
    pub(crate) alerts: RefCell<Vec<String>>,
    pub(crate) notices: RefCell<Vec<String>>,
    pub(crate) confirm_answer: Cell<bool>,
    pub(crate) menus: RefCell<BTreeMap<ListKind, String>>,
    pub(crate) grid_cards: Cell<usize>,
}

impl Surfaces for FakeSurfaces {
    fn replace_menu(&self, kind: ListKind, html: &str) -> Vec<MenuEntry> {
        self.menus.borrow_mut().insert(kind, html.to_owned());
        html.split(';')
            .filter(|row| !row.is_empty())
            .filter_map(|row| {
                let mut parts = row.split(':');
                let product_id = parts.next()?.parse().ok()?;
                let quantity = parts.next().and_then(|q| q.parse().ok());
                let unit_price = parts.next().and_then(|c| c.parse().ok()).map(Money::from_cents);
                Some(MenuEntry {
                    product_id,
                    quantity,
                    unit_price,
                })
            })
            .collect()
    }

    fn replace_grid(&self, html: &str) -> usize {
        let cards = html.matches("product-card").count();
        self.grid_cards.set(cards);
        cards
    }

    fn confirm(&self, _message: &str) -> bool {
        self.confirm_answer.get()
    }

    fn alert(&self, message: &str) {
        self.alerts.borrow_mut().push(message.to_owned());
    }

    fn notify(&self, message: &str) {
        self.notices.borrow_mut().push(message.to_owned());
    }
}

pub(crate) fn engine() -> SyncEngine<FakeApi, FakeSurfaces> {
    SyncEngine::new(FakeApi::new(), FakeSurfaces::default())
}

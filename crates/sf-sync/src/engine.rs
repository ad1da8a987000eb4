//! Action dispatcher.
//!
//! Each public method turns one user gesture into one server request, drops the
//! reply if a newer request for the same key was issued meanwhile, writes the
//! server's verdict into the [`MirrorStore`] and refreshes the affected menu
//! fragment. Failures leave the store untouched and hand the key back to any
//! older request still in flight.

use crate::api::{StorefrontApi, Surfaces};
use crate::error::{SyncError, SyncResult};
use crate::sequence::{Release, RequestSequencer, SyncKey, Ticket};
use crate::store::MirrorStore;
use sf_api_types::{CartMutationResponse, ListKind, ProductId};
use std::cell::RefCell;
use std::collections::HashMap;
use tracing::{debug, warn};

pub const MSG_WISHLIST_FAILED: &str = "Could not update your favorites.";
pub const MSG_CART_ADD_FAILED: &str = "Could not add the product to the cart.";
pub const MSG_CART_INCREASE_FAILED: &str = "Could not increase the quantity.";
pub const MSG_CART_DECREASE_FAILED: &str = "Could not decrease the quantity.";
pub const MSG_CART_REMOVE_FAILED: &str = "Could not remove the product.";
pub const MSG_CART_CLEAR_FAILED: &str = "Could not empty the cart.";
pub const MSG_CONFIRM_CLEAR: &str = "Empty the whole cart?";
pub const MSG_ADDED_TO_CART: &str = "The product was added to the cart";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Applied,
    /// A newer request for the same key was issued; this reply was dropped.
    Superseded,
    /// The user declined the confirmation prompt; nothing was sent.
    Declined,
    /// The server answered without anything to render.
    Skipped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Increase,
    Decrease,
}

/// Quantity a stepper request in flight will leave on the server.
#[derive(Debug, Clone, Copy)]
struct Intent {
    seq: u64,
    quantity: u32,
}

pub struct SyncEngine<A, S> {
    api: A,
    surfaces: S,
    store: MirrorStore,
    sequencer: RequestSequencer,
    intents: RefCell<HashMap<ProductId, Intent>>,
}

impl<A, S> SyncEngine<A, S>
where
    A: StorefrontApi,
    S: Surfaces,
{
    pub fn new(api: A, surfaces: S) -> Self {
        Self {
            api,
            surfaces,
            store: MirrorStore::new(),
            sequencer: RequestSequencer::new(),
            intents: RefCell::new(HashMap::new()),
        }
    }

    pub fn store(&self) -> &MirrorStore {
        &self.store
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn surfaces(&self) -> &S {
        &self.surfaces
    }

    /// `POST wishlist/toggle/{id}/`, then refresh the wishlist menu.
    pub async fn toggle_wishlist(&self, id: ProductId) -> SyncResult<Outcome> {
        let ticket = self.sequencer.issue(SyncKey::Mutation(ListKind::Wishlist, id));
        let response = match self.api.toggle_wishlist(id).await {
            Ok(response) => response,
            Err(err) => return Err(self.fail(&ticket, err, MSG_WISHLIST_FAILED).await),
        };
        if !self.still_current(&ticket) {
            return Ok(Outcome::Superseded);
        }

        self.store.set_membership(ListKind::Wishlist, id, response.added);
        if let Err(err) = self.refresh_menu(ListKind::Wishlist).await {
            warn!(product = %id, error = %err, "wishlist menu refresh failed");
        }
        Ok(Outcome::Applied)
    }

    /// Add one unit from a card, modal or `[data-action="add-cart"]` button.
    pub async fn add_to_cart(&self, id: ProductId) -> SyncResult<Outcome> {
        let ticket = self.sequencer.issue(SyncKey::Mutation(ListKind::Cart, id));
        let reply = self.api.add_to_cart(id, 1).await;
        let response = match reply.and_then(|r| accepted(r, MSG_CART_ADD_FAILED)) {
            Ok(response) => response,
            Err(err) => return Err(self.fail(&ticket, err, MSG_CART_ADD_FAILED).await),
        };
        if !self.still_current(&ticket) {
            return Ok(Outcome::Superseded);
        }

        self.store.set_membership(ListKind::Cart, id, true);
        self.settle_cart(response.count).await;
        Ok(Outcome::Applied)
    }

    /// The wishlist dropdown's "add to cart" button: same request, plus a toast.
    pub async fn add_from_wishlist(&self, id: ProductId) -> SyncResult<Outcome> {
        let outcome = self.add_to_cart(id).await?;
        if outcome == Outcome::Applied {
            self.surfaces.notify(MSG_ADDED_TO_CART);
        }
        Ok(outcome)
    }

    /// Quantity stepper. Increase sends an absolute quantity one above the
    /// newest known target: the quantity an increase still in flight will
    /// leave, else the last server-reported value. Decrease lets the server
    /// clamp or delete.
    pub async fn step_quantity(&self, id: ProductId, step: Step) -> SyncResult<Outcome> {
        let fallback = match step {
            Step::Increase => MSG_CART_INCREASE_FAILED,
            Step::Decrease => MSG_CART_DECREASE_FAILED,
        };
        let pending = self.intents.borrow().get(&id).map(|intent| intent.quantity);
        let target = match step {
            Step::Increase => {
                let Some(current) = pending.or_else(|| self.store.quantity(id)) else {
                    return Err(self.report(
                        SyncError::Precondition(format!("no server quantity for product {id}")),
                        fallback,
                    ));
                };
                Some(current.saturating_add(1))
            }
            Step::Decrease => None,
        };

        let ticket = self.sequencer.issue(SyncKey::Mutation(ListKind::Cart, id));
        if let Some(quantity) = target.or_else(|| pending.map(|q| q.saturating_sub(1))) {
            let intent = Intent {
                seq: ticket.seq(),
                quantity,
            };
            self.intents.borrow_mut().insert(id, intent);
        }

        let reply = match target {
            Some(quantity) => self.api.add_to_cart(id, quantity).await,
            None => self.api.decrease_cart(id).await,
        };
        let response = match reply.and_then(|r| accepted(r, fallback)) {
            Ok(response) => response,
            Err(err) => {
                self.drop_intent(id, &ticket);
                return Err(self.fail(&ticket, err, fallback).await);
            }
        };
        if !self.still_current(&ticket) {
            self.drop_intent(id, &ticket);
            return Ok(Outcome::Superseded);
        }

        if response.removed {
            self.store.set_membership(ListKind::Cart, id, false);
        }
        self.settle_cart(response.count).await;
        self.drop_intent(id, &ticket);
        Ok(Outcome::Applied)
    }

    pub async fn remove_from_cart(&self, id: ProductId) -> SyncResult<Outcome> {
        let ticket = self.sequencer.issue(SyncKey::Mutation(ListKind::Cart, id));
        let reply = self.api.remove_from_cart(id).await;
        let response = match reply.and_then(|r| accepted(r, MSG_CART_REMOVE_FAILED)) {
            Ok(response) => response,
            Err(err) => return Err(self.fail(&ticket, err, MSG_CART_REMOVE_FAILED).await),
        };
        if !self.still_current(&ticket) {
            return Ok(Outcome::Superseded);
        }

        self.store.set_membership(ListKind::Cart, id, false);
        self.settle_cart(response.count).await;
        Ok(Outcome::Applied)
    }

    /// Empty the cart after a blocking confirmation.
    pub async fn clear_cart(&self) -> SyncResult<Outcome> {
        if !self.surfaces.confirm(MSG_CONFIRM_CLEAR) {
            return Ok(Outcome::Declined);
        }
        let ticket = self.sequencer.issue(SyncKey::ClearCart);
        let reply = self.api.clear_cart().await;
        if let Err(err) = reply.and_then(|r| accepted(r, MSG_CART_CLEAR_FAILED)) {
            return Err(self.fail(&ticket, err, MSG_CART_CLEAR_FAILED).await);
        }
        if !self.still_current(&ticket) {
            return Ok(Outcome::Superseded);
        }

        self.store.clear(ListKind::Cart);
        self.settle_cart(Some(0)).await;
        Ok(Outcome::Applied)
    }

    /// Re-fetch a dropdown fragment, swap it in and re-read its rows into the
    /// store. The badge count is the number of rendered rows. Failures are
    /// logged, never alerted.
    pub async fn refresh_menu(&self, kind: ListKind) -> SyncResult<Outcome> {
        let ticket = self.sequencer.issue(SyncKey::Menu(kind));
        let html = match self.api.menu_fragment(kind).await {
            Ok(html) => html,
            Err(err) => {
                warn!(menu = kind.as_str(), error = %err, "menu fragment request failed");
                self.sequencer.release(&ticket);
                return Err(err);
            }
        };
        if !self.still_current(&ticket) {
            return Ok(Outcome::Superseded);
        }

        let entries = self.surfaces.replace_menu(kind, &html);
        self.store.replace_list(kind, &entries);
        self.store.set_count(kind, entries.len());
        Ok(Outcome::Applied)
    }

    /// Swap the product grid for `category` (`None` = all) and re-apply known
    /// button states to the new cards. Failures are logged only.
    pub async fn filter_grid(&self, category: Option<&str>) -> SyncResult<Outcome> {
        let ticket = self.sequencer.issue(SyncKey::Grid);
        let response = match self.api.filter_grid(category).await {
            Ok(response) => response,
            Err(err) => {
                warn!(category = category.unwrap_or(""), error = %err, "grid filter request failed");
                self.sequencer.release(&ticket);
                return Err(err);
            }
        };
        if !self.still_current(&ticket) {
            return Ok(Outcome::Superseded);
        }
        let Some(html) = response.html else {
            debug!("grid filter response had no html");
            return Ok(Outcome::Skipped);
        };

        let cards = self.surfaces.replace_grid(&html);
        debug!(category = category.unwrap_or(""), cards, "grid replaced");
        self.store.resync();
        Ok(Outcome::Applied)
    }

    /// Refresh both menus, e.g. once the page has loaded.
    pub async fn refresh_all(&self) {
        for kind in ListKind::ALL {
            let _ = self.refresh_menu(kind).await;
        }
    }

    /// Surface a failure to the user according to its class and hand it back.
    pub fn report(&self, err: SyncError, fallback: &str) -> SyncError {
        if !err.is_user_visible() {
            warn!(error = %err, "storefront action aborted");
            return err;
        }
        match &err {
            SyncError::Application(message) => self.surfaces.alert(message),
            _ => {
                warn!(error = %err, "storefront request failed");
                self.surfaces.alert(fallback);
            }
        }
        err
    }

    /// Report a failed mutation and retire its ticket. When the failure
    /// leaves a dropped success unaccounted for, the list is re-read.
    async fn fail(&self, ticket: &Ticket, err: SyncError, fallback: &str) -> SyncError {
        let err = self.report(err, fallback);
        match self.sequencer.release(ticket) {
            Release::Idle => {}
            Release::FellBack(seq) => {
                debug!(key = ?ticket.key(), seq, "older request is current again");
            }
            Release::Resync => {
                if let Some(kind) = ticket.key().list() {
                    if let Err(err) = self.refresh_menu(kind).await {
                        warn!(menu = kind.as_str(), error = %err, "resync after failure did not complete");
                    }
                }
            }
        }
        err
    }

    fn still_current(&self, ticket: &Ticket) -> bool {
        let current = self.sequencer.complete(ticket);
        if !current {
            debug!(key = ?ticket.key(), seq = ticket.seq(), "dropping superseded response");
        }
        current
    }

    fn drop_intent(&self, id: ProductId, ticket: &Ticket) {
        let mut intents = self.intents.borrow_mut();
        if intents.get(&id).is_some_and(|intent| intent.seq == ticket.seq()) {
            intents.remove(&id);
        }
    }

    /// Re-read the cart from the server; fall back to the reply's count when the
    /// fragment cannot be fetched.
    async fn settle_cart(&self, count: Option<u32>) {
        if let Err(err) = self.refresh_menu(ListKind::Cart).await {
            warn!(error = %err, "cart menu refresh failed");
            if let Some(count) = count {
                self.store.set_count(ListKind::Cart, count as usize);
            }
        }
    }
}

/// Turn `{ok: false}` into an application error carrying the server's message.
fn accepted(response: CartMutationResponse, fallback: &str) -> SyncResult<CartMutationResponse> {
    if response.ok {
        return Ok(response);
    }
    let message = response.error.unwrap_or_else(|| fallback.to_owned());
    Err(SyncError::Application(message))
}

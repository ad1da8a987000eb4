//! Global page state.
//!
//! WASM is single-threaded, so the engine lives in a `thread_local!` and
//! handlers clone the `Rc` before awaiting.

use crate::api::FetchApi;
use crate::surfaces::DomSurfaces;
use sf_api_types::{DEFAULT_BASE_PATH, Endpoints};
use sf_sync::SyncEngine;
use std::cell::RefCell;
use std::rc::Rc;

pub type Engine = SyncEngine<FetchApi, DomSurfaces>;

thread_local! {
    static ENGINE: RefCell<Option<Rc<Engine>>> = const { RefCell::new(None) };
}

/// Base path from `<body data-storefront-base>`, else `/productos`.
pub fn endpoints() -> Endpoints {
    let base = gloo_utils::body()
        .get_attribute("data-storefront-base")
        .filter(|b| !b.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_BASE_PATH.to_owned());
    Endpoints::new(&base)
}

pub fn install(engine: Engine) -> Rc<Engine> {
    let engine = Rc::new(engine);
    ENGINE.with(|slot| *slot.borrow_mut() = Some(engine.clone()));
    engine
}

pub fn engine() -> Option<Rc<Engine>> {
    ENGINE.with(|slot| slot.borrow().clone())
}

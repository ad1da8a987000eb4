use axum::{
    Json,
    extract::State,
    http::{HeaderMap, StatusCode},
};
use sf_api_types::{AddressEntry, AddressList, AddressSaveResponse, NewAddressRequest};
use std::collections::BTreeMap;
use tracing::info;

use crate::session::{self, Address, require_shopper};
use crate::{ApiError, ApiResult, AppState, unauthorized};

const MAX_LABEL_CHARS: usize = 200;

pub(crate) async fn list(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<AddressList> {
    let (_, session) = session::current(&state.sessions, &headers)
        .await
        .ok_or_else(|| unauthorized("login required"))?;
    let direcciones = session
        .addresses
        .iter()
        .map(|a| AddressEntry {
            id: a.id,
            label: a.label.clone(),
        })
        .collect();
    Ok(Json(AddressList { direcciones }))
}

fn validate(label: &str) -> Option<BTreeMap<String, Vec<String>>> {
    let problem = if label.is_empty() {
        "Este campo es obligatorio."
    } else if label.chars().count() > MAX_LABEL_CHARS {
        "La dirección es demasiado larga."
    } else {
        return None;
    };
    Some(BTreeMap::from([("label".to_owned(), vec![problem.to_owned()])]))
}

/// `POST /usuarios/direcciones/`. Validation failures are a 400 carrying
/// `success: false` and per-field `errors`.
pub(crate) async fn create(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<NewAddressRequest>,
) -> Result<(StatusCode, Json<AddressSaveResponse>), ApiError> {
    let shopper = require_shopper(&state.sessions, &headers).await?;
    let label = request.label.trim().to_owned();

    if let Some(errors) = validate(&label) {
        return Ok((
            StatusCode::BAD_REQUEST,
            Json(AddressSaveResponse {
                success: false,
                message: "Revisa los datos de la dirección.".to_owned(),
                errors: Some(errors),
            }),
        ));
    }

    let id = state
        .sessions
        .with(shopper, |session| {
            let id = session.addresses.iter().map(|a| a.id).max().unwrap_or(0) + 1;
            session.addresses.push(Address { id, label });
            id
        })
        .await
        .ok_or_else(|| unauthorized("login required"))?;

    info!(session = %shopper, address = id, "address saved");
    Ok((
        StatusCode::OK,
        Json(AddressSaveResponse {
            success: true,
            message: "Dirección guardada.".to_owned(),
            errors: None,
        }),
    ))
}

#[cfg(test)]
mod tests {
    use crate::testing::*;
    use axum::http::StatusCode;
    use serde_json::json;

    #[tokio::test]
    async fn new_address_shows_up_in_the_list() {
        let shopper = Shopper::new().await;
        let body = body_json(shopper.get("/usuarios/direcciones/").await).await;
        assert_eq!(body["direcciones"].as_array().unwrap().len(), 2);

        let response = shopper
            .post_json("/usuarios/direcciones/", json!({ "label": "Calle Pino 3" }))
            .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["success"], true);

        let body = body_json(shopper.get("/usuarios/direcciones/").await).await;
        assert_eq!(body["direcciones"][2]["id"], 3);
        assert_eq!(body["direcciones"][2]["label"], "Calle Pino 3");
    }

    #[tokio::test]
    async fn blank_label_reports_field_errors() {
        let shopper = Shopper::new().await;
        let response = shopper
            .post_json("/usuarios/direcciones/", json!({ "label": "   " }))
            .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["errors"]["label"][0], "Este campo es obligatorio.");
    }
}

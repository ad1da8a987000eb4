use axum::{
    Json,
    extract::{Multipart, Path, Query, State},
    http::HeaderMap,
    response::{Html, IntoResponse, Response},
};
use serde::Deserialize;
use sf_api_types::{PaymentRequest, PaymentResponse, SuccessResponse, SummaryEmailRequest};
use tracing::{info, warn};

use crate::session::{self, Order, require_shopper};
use crate::{ApiError, ApiResult, AppState, bad_request, not_found, render, unauthorized};

#[derive(Debug, Deserialize)]
pub(crate) struct PaymentResultQuery {
    pedido_id: Option<u64>,
}

/// `POST carrito/pago-mercadopago/`: turn the cart into a pending order and
/// hand back the URL the shopper pays at.
pub(crate) async fn start_payment(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<PaymentRequest>,
) -> ApiResult<PaymentResponse> {
    let shopper = require_shopper(&state.sessions, &headers).await?;
    let address_id = request.direccion_id.trim().parse::<u64>().ok();
    let order_id = state.issue_order_id();

    let created = state
        .sessions
        .with(shopper, |session| {
            let address_id = address_id.filter(|id| session.address(*id).is_some())?;
            if session.cart.is_empty() {
                return None;
            }
            session.orders.insert(
                order_id,
                Order {
                    id: order_id,
                    address_id,
                    lines: session.cart.clone(),
                    summary_pdf: None,
                    emails_sent: 0,
                },
            );
            Some(order_id)
        })
        .await
        .ok_or_else(|| unauthorized("login required"))?;

    let Some(order_id) = created else {
        warn!(session = %shopper, direccion_id = %request.direccion_id, "payment refused");
        return Err(bad_request("Datos incompletos para procesar el pago."));
    };

    info!(session = %shopper, order = order_id, "payment preference created");
    Ok(Json(PaymentResponse {
        url: Some(format!(
            "{}/carrito/pago-prueba/?pedido_id={order_id}",
            state.endpoints.base()
        )),
        error: None,
    }))
}

/// Landing page after a (simulated) approved payment. Empties the cart.
pub(crate) async fn payment_result(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<PaymentResultQuery>,
) -> Result<Response, ApiError> {
    let (id, _) = session::current(&state.sessions, &headers)
        .await
        .ok_or_else(|| unauthorized("login required"))?;
    let pedido_id = query.pedido_id.ok_or_else(|| bad_request("pedido_id is required"))?;

    let order = state
        .sessions
        .with(id, |session| {
            let order = session.orders.get(&pedido_id).cloned()?;
            session.cart.clear();
            Some(order)
        })
        .await
        .flatten()
        .ok_or_else(|| not_found("Pedido no encontrado."))?;

    let session = state.sessions.snapshot(id).await;
    let html = render::payment_result_page(&state.catalog, session.as_ref(), &state.endpoints, &order);
    Ok(Html(html).into_response())
}

/// `POST enviar-resumen-email/`.
pub(crate) async fn email_summary(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<SummaryEmailRequest>,
) -> ApiResult<SuccessResponse> {
    let shopper = require_shopper(&state.sessions, &headers).await?;
    let sent = state
        .sessions
        .with(shopper, |session| {
            session.orders.get_mut(&request.pedido_id).map(|order| {
                order.emails_sent += 1;
                order.emails_sent
            })
        })
        .await
        .flatten()
        .ok_or_else(|| not_found("Pedido no encontrado."))?;

    info!(order = request.pedido_id, sent, "order summary emailed");
    Ok(Json(SuccessResponse {
        success: true,
        message: Some("Resumen enviado exitosamente".to_owned()),
        error: None,
    }))
}

/// `POST resumen/{id}/subir_pdf/`: multipart with a `pdf` file part.
pub(crate) async fn upload_summary_pdf(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(resumen_id): Path<u64>,
    mut multipart: Multipart,
) -> ApiResult<SuccessResponse> {
    let shopper = require_shopper(&state.sessions, &headers).await?;

    let mut pdf = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| bad_request(&err.body_text()))?
    {
        if field.name() == Some("pdf") {
            let bytes = field.bytes().await.map_err(|err| bad_request(&err.body_text()))?;
            pdf = Some(bytes);
        }
    }
    let pdf = pdf
        .filter(|bytes| !bytes.is_empty())
        .ok_or_else(|| bad_request("No se recibió el archivo PDF."))?;

    state
        .sessions
        .with(shopper, |session| {
            session.orders.get_mut(&resumen_id).map(|order| {
                order.summary_pdf = Some(pdf.len());
            })
        })
        .await
        .flatten()
        .ok_or_else(|| not_found("Resumen no encontrado."))?;

    info!(order = resumen_id, bytes = pdf.len(), "summary pdf stored");
    Ok(Json(SuccessResponse {
        success: true,
        message: None,
        error: None,
    }))
}

use crate::api::StorefrontApi;
use crate::error::{SyncError, SyncResult};

pub const MSG_NO_ADDRESS: &str = "No shipping address was found.";
pub const MSG_PAYMENT_FAILED: &str = "Could not create the payment.";
pub const MSG_PAYMENT_NETWORK: &str = "Network error while processing the payment.";
pub const MSG_EMAIL_FAILED: &str = "Could not send the order summary.";
pub const MSG_EMAIL_SENT: &str = "Order summary sent.";

/// Digits of the first `name=` parameter in a query string (`?a=1&b=2`).
pub fn numeric_query_param(query: &str, name: &str) -> Option<String> {
    query
        .trim_start_matches('?')
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.chars().take_while(char::is_ascii_digit).collect::<String>())
        .filter(|digits| !digits.is_empty())
}

/// Ask the backend for a payment preference and return the redirect URL.
pub async fn start_payment<A: StorefrontApi + ?Sized>(api: &A, query: &str) -> SyncResult<String> {
    let direccion_id = numeric_query_param(query, "direccion_id")
        .ok_or_else(|| SyncError::Application(MSG_NO_ADDRESS.to_owned()))?;
    let response = api.start_payment(&direccion_id).await?;
    match response.url {
        Some(url) if !url.is_empty() => Ok(url),
        _ => Err(SyncError::Application(
            response.error.unwrap_or_else(|| MSG_PAYMENT_FAILED.to_owned()),
        )),
    }
}

/// Ask the backend to email the summary of order `pedido_id`.
pub async fn email_summary<A: StorefrontApi + ?Sized>(api: &A, pedido_id: u64) -> SyncResult<String> {
    let response = api.send_summary_email(pedido_id).await?;
    if response.success {
        Ok(response.message.unwrap_or_else(|| MSG_EMAIL_SENT.to_owned()))
    } else {
        Err(SyncError::Application(
            response.error.unwrap_or_else(|| MSG_EMAIL_FAILED.to_owned()),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeApi;
    use sf_api_types::{PaymentResponse, SuccessResponse};

    #[test]
    fn reads_numeric_param() {
        assert_eq!(numeric_query_param("?direccion_id=12&x=1", "direccion_id").as_deref(), Some("12"));
        assert_eq!(numeric_query_param("direccion_id=7abc", "direccion_id").as_deref(), Some("7"));
        assert_eq!(numeric_query_param("?direccion_id=", "direccion_id"), None);
        assert_eq!(numeric_query_param("?otra=3", "direccion_id"), None);
    }

    #[tokio::test]
    async fn payment_without_address_is_refused_locally() {
        let api = FakeApi::new();
        let err = start_payment(&api, "?pedido=4").await.unwrap_err();
        assert_eq!(err, SyncError::Application(MSG_NO_ADDRESS.to_owned()));
    }

    #[tokio::test]
    async fn payment_error_carries_server_message() {
        let api = FakeApi::new();
        *api.payment.borrow_mut() = PaymentResponse {
            url: None,
            error: Some("Dirección inválida".into()),
        };
        let err = start_payment(&api, "?direccion_id=3").await.unwrap_err();
        assert_eq!(err, SyncError::Application("Dirección inválida".into()));

        *api.payment.borrow_mut() = PaymentResponse {
            url: Some(String::new()),
            error: None,
        };
        let err = start_payment(&api, "?direccion_id=3").await.unwrap_err();
        assert_eq!(err, SyncError::Application(MSG_PAYMENT_FAILED.to_owned()));
    }

    #[tokio::test]
    async fn payment_network_failure_propagates() {
        let api = FakeApi::new();
        *api.fail_next.borrow_mut() = Some(SyncError::Network("offline".into()));
        let err = start_payment(&api, "?direccion_id=3").await.unwrap_err();
        assert!(matches!(err, SyncError::Network(_)));

        *api.payment.borrow_mut() = PaymentResponse {
            url: Some("https://pagos.example/checkout/1".into()),
            error: None,
        };
        assert_eq!(
            start_payment(&api, "?direccion_id=3").await.as_deref(),
            Ok("https://pagos.example/checkout/1")
        );
    }

    #[tokio::test]
    async fn summary_email_failure_uses_server_error_or_fallback() {
        let api = FakeApi::new();
        let err = email_summary(&api, 9).await.unwrap_err();
        assert_eq!(err, SyncError::Application(MSG_EMAIL_FAILED.to_owned()));

        *api.email.borrow_mut() = SuccessResponse {
            success: false,
            message: None,
            error: Some("Pedido no encontrado".into()),
        };
        let err = email_summary(&api, 9).await.unwrap_err();
        assert_eq!(err, SyncError::Application("Pedido no encontrado".into()));

        *api.email.borrow_mut() = SuccessResponse {
            success: true,
            message: None,
            error: None,
        };
        assert_eq!(email_summary(&api, 9).await.as_deref(), Ok(MSG_EMAIL_SENT));
    }
}

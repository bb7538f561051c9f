use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// How the customer paid for a confirmed reservation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
    Cash,
    Card,
    Transfer,
}

/// Proof of a captured charge, recorded alongside the reservation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentReceipt {
    pub reference: String,
    pub reservation_id: Uuid,
    pub amount_cents: i64,
    pub currency: String,
    pub captured_at: DateTime<Utc>,
}

#[derive(Debug, thiserror::Error)]
pub enum PaymentError {
    #[error("Payment declined: {0}")]
    Declined(String),

    #[error("Payment provider unavailable: {0}")]
    ProviderUnavailable(String),
}

#[async_trait]
pub trait PaymentAdapter: Send + Sync {
    /// Charge the full reservation total. Called before the reservation is
    /// promoted to confirmed.
    async fn charge(
        &self,
        reservation_id: Uuid,
        amount_cents: i64,
        currency: &str,
        method: PaymentMethod,
    ) -> Result<PaymentReceipt, PaymentError>;
}

/// Adapter that approves every charge. Stands in for a real gateway in
/// development and tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct MockPaymentAdapter;

#[async_trait]
impl PaymentAdapter for MockPaymentAdapter {
    async fn charge(
        &self,
        reservation_id: Uuid,
        amount_cents: i64,
        currency: &str,
        _method: PaymentMethod,
    ) -> Result<PaymentReceipt, PaymentError> {
        Ok(PaymentReceipt {
            // Encode the reservation id so the mock receipt is traceable
            reference: format!("mock_ch_{}", reservation_id.simple()),
            reservation_id,
            amount_cents,
            currency: currency.to_string(),
            captured_at: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_adapter_approves_charge() {
        let adapter = MockPaymentAdapter;
        let id = Uuid::new_v4();
        let receipt = adapter
            .charge(id, 2500, "USD", PaymentMethod::Card)
            .await
            .unwrap();

        assert_eq!(receipt.reservation_id, id);
        assert_eq!(receipt.amount_cents, 2500);
        assert!(receipt.reference.starts_with("mock_ch_"));
    }
}

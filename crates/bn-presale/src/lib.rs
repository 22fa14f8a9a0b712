//! BNM presale: payment instructions for an off-chain USDT purchase.
//!
//! Nothing here moves funds or verifies payments. Settlement is manual;
//! `check_payment_status` always reports `Pending` and `send_bnm_tokens` is
//! a best-effort POST with no confirmed server side.

use bn_chain_binomena::{HttpTransport, NodeConfig};
use bn_chain_client::{NodeRequest, NodeTransport};
use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;
use tracing::{info, warn};

pub const PURCHASE_ID_PREFIX: &str = "BNM";
const PURCHASE_ID_SUFFIX_LEN: usize = 9;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum UsdtNetwork {
    Trc20,
    Polygon,
}

impl UsdtNetwork {
    /// TRC20 first: it has the lower fees.
    pub const PREFERRED: Self = Self::Trc20;

    pub fn receiving_address(self) -> &'static str {
        match self {
            Self::Trc20 => "THuThsfwY4eJDpioegkTCHcFkihZurm5u4",
            Self::Polygon => "0xa5b06e68abc3750cbbce81df27806a05c82238a4",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Crypto,
    Bank,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresalePurchase {
    /// BNM requested.
    pub amount: f64,
    pub wallet_address: String,
    pub payment_method: PaymentMethod,
    /// USDT owed.
    pub total_cost: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usdt_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction_hash: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentDetails {
    pub usdt_address: String,
    pub amount: f64,
    pub purchase_id: String,
    pub instructions: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Confirmed,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentStatusReport {
    pub status: PaymentStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tx_hash: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenDelivery {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tx_hash: Option<String>,
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum PresaleError {
    #[error("Bank transfers not yet supported")]
    BankTransferUnsupported,
    #[error("invalid purchase: {0}")]
    InvalidPurchase(&'static str),
}

/// `BNM_{unix millis}_{9 lowercase base36 chars}`.
pub fn new_purchase_id() -> String {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis())
        .unwrap_or_default();
    let mut rng = rand::thread_rng();
    let suffix: String = (0..PURCHASE_ID_SUFFIX_LEN)
        .filter_map(|_| char::from_digit(rng.gen_range(0..36), 36))
        .collect();
    format!("{PURCHASE_ID_PREFIX}_{millis}_{suffix}")
}

pub fn payment_instructions(total_cost: f64, wallet_address: &str, purchase_id: &str) -> String {
    let trc20 = UsdtNetwork::Trc20.receiving_address();
    let polygon = UsdtNetwork::Polygon.receiving_address();
    format!(
        "Send exactly {total_cost} USDT to one of the addresses below:\n\
         \n\
         RECOMMENDED (Lower Fees):\n\
         TRC20 Network: {trc20}\n\
         \n\
         Alternative Option:\n\
         Polygon Network: {polygon}\n\
         \n\
         IMPORTANT INSTRUCTIONS:\n\
         • Send EXACTLY {total_cost} USDT (not more, not less)\n\
         • Choose TRC20 network for lowest fees (~$1)\n\
         • OR use Polygon network if you prefer\n\
         • Your BNM tokens will be sent to: {wallet_address}\n\
         • Tokens delivered within 2-4 hours after confirmation\n\
         • Purchase Reference: {purchase_id}\n\
         \n\
         WARNING: Only send USDT to these addresses. Do not send any other cryptocurrency."
    )
}

pub struct Presale {
    transport: Arc<dyn NodeTransport>,
}

impl Presale {
    pub fn new(transport: Arc<dyn NodeTransport>) -> Self {
        Self { transport }
    }

    pub fn from_config(config: &NodeConfig) -> Self {
        Self::new(Arc::new(HttpTransport::presale_from_config(config)))
    }

    pub fn base_url(&self) -> &str {
        self.transport.base_url()
    }

    /// Build payment instructions for a crypto purchase. No network call.
    pub fn submit_purchase(&self, purchase: &PresalePurchase) -> Result<PaymentDetails, PresaleError> {
        if purchase.payment_method == PaymentMethod::Bank {
            return Err(PresaleError::BankTransferUnsupported);
        }
        if purchase.wallet_address.trim().is_empty() {
            return Err(PresaleError::InvalidPurchase("wallet address is required"));
        }
        if !purchase.total_cost.is_finite() || purchase.total_cost <= 0.0 {
            return Err(PresaleError::InvalidPurchase("total cost must be positive"));
        }

        let purchase_id = new_purchase_id();
        // Settlement happens by email; the log line is the only record kept.
        info!(
            purchase_id = %purchase_id,
            wallet = %purchase.wallet_address,
            amount = purchase.amount,
            total_cost = purchase.total_cost,
            status = "pending_payment",
            "presale purchase requested"
        );

        Ok(PaymentDetails {
            usdt_address: UsdtNetwork::PREFERRED.receiving_address().to_owned(),
            amount: purchase.total_cost,
            instructions: payment_instructions(
                purchase.total_cost,
                &purchase.wallet_address,
                &purchase_id,
            ),
            purchase_id,
        })
    }

    /// Always `Pending`: there is no payment monitoring.
    pub fn check_payment_status(&self, purchase_id: &str) -> PaymentStatusReport {
        tracing::debug!(purchase_id, "payment status requested");
        PaymentStatusReport {
            status: PaymentStatus::Pending,
            tx_hash: None,
        }
    }

    /// Ask the presale backend to send BNM. Any failure reports
    /// `success: false` instead of an error.
    pub async fn send_bnm_tokens(&self, wallet_address: &str, amount: f64) -> TokenDelivery {
        let request = NodeRequest::post("send tokens", "/api/send-tokens").with_json(&json!({
            "to": wallet_address,
            "amount": amount,
            "token": "BNM",
        }));
        let result = match request {
            Ok(request) => self.transport.send(request).await,
            Err(err) => Err(err),
        };

        match result {
            Ok(body) => TokenDelivery {
                success: true,
                tx_hash: body
                    .get("transactionHash")
                    .and_then(|hash| hash.as_str())
                    .map(str::to_owned),
            },
            Err(err) => {
                warn!(error = %err, "BNM token delivery failed");
                TokenDelivery {
                    success: false,
                    tx_hash: None,
                }
            }
        }
    }
}

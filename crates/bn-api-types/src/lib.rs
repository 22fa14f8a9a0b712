use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;
use zeroize::Zeroize;

// ── Identity ─────────────────────────────────────────────────────────

/// Signing secret for a wallet.
///
/// The node signs on the caller's behalf, so the key travels as a plain
/// request field. It is redacted from every `Debug`/`Display` rendering and
/// wiped from memory on drop.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PrivateKey(String);

impl PrivateKey {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl Drop for PrivateKey {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PrivateKey(<redacted>)")
    }
}

impl fmt::Display for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("<redacted>")
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Wallet {
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub private_key: PrivateKey,
}

impl Wallet {
    pub fn new(address: impl Into<String>, private_key: PrivateKey) -> Self {
        Self {
            address: address.into(),
            private_key,
        }
    }

    pub fn is_complete(&self) -> bool {
        !self.address.trim().is_empty() && !self.private_key.is_empty()
    }
}

/// Client-generated token attached to transfer and mint submissions.
///
/// Only prevents double submission if the node deduplicates on it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(String);

impl RequestId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<String> for RequestId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ── Chain records ────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct Transaction {
    pub id: String,
    pub from: String,
    pub to: String,
    pub amount: f64,
    pub timestamp: i64,
    pub signature: String,
}

impl Transaction {
    pub fn involves(&self, address: &str) -> bool {
        self.from == address || self.to == address
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct Block {
    pub index: u64,
    pub previous_hash: String,
    pub timestamp: i64,
    pub data: Vec<Transaction>,
    pub hash: String,
    pub validator: String,
    pub signature: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BlockList {
    pub blocks: Vec<Block>,
    pub count: usize,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BlockchainStatus {
    pub node_id: String,
    pub status: String,
    pub blocks: u64,
    pub peers: u64,
    pub wallets: u64,
    pub token_supply: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct WalletBalance {
    pub address: String,
    pub balance: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct SmartContract {
    pub contract_id: String,
    pub owner: String,
    pub name: String,
    pub address: String,
    pub created_at: i64,
    pub status: String,
}

impl SmartContract {
    pub fn is_active(&self) -> bool {
        self.status == "active"
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractList {
    #[serde(default)]
    pub contracts: Vec<SmartContract>,
    pub count: Option<usize>,
}

// ── Operation envelopes ──────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TxReceipt {
    pub status: Option<String>,
    pub tx_id: Option<String>,
    pub node: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FaucetReceipt {
    pub status: Option<String>,
    pub message: Option<String>,
    pub balance: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeployReceipt {
    pub contract_id: Option<String>,
    pub id: Option<String>,
    pub address: Option<String>,
    pub name: Option<String>,
    pub owner: Option<String>,
    pub status: Option<String>,
    pub tx_id: Option<String>,
}

impl DeployReceipt {
    pub fn contract_id(&self) -> Option<&str> {
        self.contract_id.as_deref().or(self.id.as_deref())
    }
}

// ── Request bodies ───────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportWalletRequest {
    pub private_key: PrivateKey,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRequest {
    pub from: String,
    pub to: String,
    pub amount: f64,
    pub private_key: PrivateKey,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FaucetRequest {
    pub address: String,
    pub amount: f64,
    pub admin_key: PrivateKey,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DistributionRequest {
    pub admin_key: PrivateKey,
    pub founder_address: String,
    pub treasury_address: String,
    pub community_address: String,
    pub founder_percent: f64,
    pub treasury_percent: f64,
    pub community_percent: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeployContractRequest {
    pub owner: String,
    pub name: String,
    pub code: String,
    pub private_key: PrivateKey,
    pub fee: u64,
}

/// Envelope for the generic contract-call RPC. `privateKey` is only present
/// for state-mutating calls.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractCallRequest {
    pub contract_id: String,
    pub function: String,
    pub args: Vec<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub private_key: Option<PrivateKey>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaprdTransferRequest {
    pub from: String,
    pub to: String,
    pub amount: f64,
    pub private_key: PrivateKey,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaprdMintRequest {
    pub caller: String,
    pub to: String,
    pub amount: f64,
    pub private_key: PrivateKey,
}

// ── PAPRD results ────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaprdSupply {
    pub total_supply: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PaprdOwner {
    pub owner: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PaprdPaused {
    pub paused: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PaprdBalance {
    pub address: Option<String>,
    pub balance: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CollateralRatio {
    pub ratio: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CollateralBalance {
    pub balance: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BlacklistStatus {
    pub blacklisted: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MinterStatus {
    pub is_minter: Option<bool>,
}

/// Outcome of a state-mutating PAPRD operation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TxOutcome {
    pub success: Option<bool>,
    pub tx_id: Option<String>,
    pub status: Option<String>,
    pub message: Option<String>,
}

/// Collateral kinds accepted by `addCollateral`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CollateralType {
    Fiat,
    Bnm,
}

impl CollateralType {
    pub fn code(self) -> u8 {
        match self {
            Self::Fiat => 0,
            Self::Bnm => 1,
        }
    }
}

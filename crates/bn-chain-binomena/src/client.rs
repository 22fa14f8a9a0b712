use base64::{Engine as _, engine::general_purpose::STANDARD};
use bn_api_types::{
    Block, BlockList, BlockchainStatus, ContractCallRequest, ContractList, DeployContractRequest,
    DeployReceipt, DistributionRequest, FaucetReceipt, FaucetRequest, ImportWalletRequest,
    PrivateKey, RequestId, SmartContract, Transaction, TransactionRequest, TxReceipt, Wallet,
    WalletBalance,
};
use bn_chain_client::{ClientError, NodeRequest, NodeTransport, decode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

use crate::config::NodeConfig;
use crate::contract::SchemaRegistry;
use crate::transport::HttpTransport;

pub const HEALTH_CHECK_TIMEOUT: Duration = Duration::from_secs(5);
pub const EXPLORER_BLOCK_LIMIT: usize = 10;

/// Typed operations against a Binomena node.
///
/// Cheap to clone; every clone shares the same transport.
#[derive(Clone)]
pub struct BinomenaClient {
    transport: Arc<dyn NodeTransport>,
    schemas: Arc<SchemaRegistry>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum HealthStatus {
    Connected,
    Error,
    #[serde(rename = "API URL not configured")]
    NotConfigured,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeHealth {
    pub api_url: String,
    pub status: HealthStatus,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExplorerOverview {
    pub status: BlockchainStatus,
    pub latest_blocks: Vec<Block>,
}

impl BinomenaClient {
    pub fn new(transport: Arc<dyn NodeTransport>) -> Self {
        Self {
            transport,
            schemas: Arc::new(SchemaRegistry::new()),
        }
    }

    pub fn from_config(config: &NodeConfig) -> Self {
        Self::new(Arc::new(HttpTransport::from_config(config)))
    }

    pub fn with_schemas(mut self, schemas: SchemaRegistry) -> Self {
        self.schemas = Arc::new(schemas);
        self
    }

    pub fn schemas(&self) -> &SchemaRegistry {
        &self.schemas
    }

    pub fn base_url(&self) -> &str {
        self.transport.base_url()
    }

    pub(crate) async fn fetch<T: DeserializeOwned>(&self, request: NodeRequest) -> Result<T, ClientError> {
        let value = self.transport.send(request).await?;
        decode(value)
    }

    // ── Wallets ──────────────────────────────────────────────────────

    /// The node generates the keypair and returns both halves.
    pub async fn create_wallet(&self) -> Result<Wallet, ClientError> {
        let wallet: Wallet = self
            .fetch(NodeRequest::post("create wallet", "/wallet"))
            .await?;
        info!(address = %wallet.address, "wallet created");
        Ok(wallet)
    }

    pub async fn import_wallet(&self, private_key: &PrivateKey) -> Result<Wallet, ClientError> {
        let request = NodeRequest::post("import wallet", "/wallet/import").with_json(&ImportWalletRequest {
            private_key: private_key.clone(),
        })?;
        let wallet: Wallet = self.fetch(request).await?;
        info!(address = %wallet.address, "wallet imported");
        Ok(wallet)
    }

    /// Never-seen addresses are answered however the node chooses: a zero
    /// balance or a rejection. Nothing is synthesised here.
    pub async fn wallet_balance(&self, address: &str) -> Result<WalletBalance, ClientError> {
        self.fetch(NodeRequest::get("get balance", format!("/balance/{address}")))
            .await
    }

    // ── Transfers ────────────────────────────────────────────────────

    /// Submits a native transfer, signed by the node with `private_key`.
    ///
    /// `amount` is passed through unchecked. A network failure leaves the
    /// outcome unknown; retry with [`Self::send_transaction_with_request_id`]
    /// and the same id rather than calling this again.
    pub async fn send_transaction(
        &self,
        from: &str,
        to: &str,
        amount: f64,
        private_key: &PrivateKey,
    ) -> Result<TxReceipt, ClientError> {
        self.send_transaction_with_request_id(from, to, amount, private_key, &RequestId::new())
            .await
    }

    pub async fn send_transaction_with_request_id(
        &self,
        from: &str,
        to: &str,
        amount: f64,
        private_key: &PrivateKey,
        request_id: &RequestId,
    ) -> Result<TxReceipt, ClientError> {
        let request = NodeRequest::post("send transaction", "/transaction")
            .with_json(&TransactionRequest {
                from: from.to_owned(),
                to: to.to_owned(),
                amount,
                private_key: private_key.clone(),
            })?
            .with_idempotency_key(request_id.as_str());

        let receipt: TxReceipt = self.fetch(request).await?;
        info!(
            from,
            to,
            request_id = %request_id,
            tx_id = receipt.tx_id.as_deref().unwrap_or("-"),
            "transaction submitted"
        );
        Ok(receipt)
    }

    /// Admin-only grant of native tokens.
    pub async fn request_faucet_tokens(
        &self,
        address: &str,
        amount: f64,
        admin_key: &PrivateKey,
    ) -> Result<FaucetReceipt, ClientError> {
        let request = NodeRequest::post("request tokens", "/faucet").with_json(&FaucetRequest {
            address: address.to_owned(),
            amount,
            admin_key: admin_key.clone(),
        })?;
        self.fetch(request).await
    }

    pub async fn distribute_initial_tokens(&self, distribution: &DistributionRequest) -> Result<Value, ClientError> {
        let request = NodeRequest::post("distribute tokens", "/admin/distribute-initial-tokens")
            .with_json(distribution)?;
        self.transport.send(request).await
    }

    // ── Chain queries ────────────────────────────────────────────────

    pub async fn blockchain_status(&self) -> Result<BlockchainStatus, ClientError> {
        self.fetch(NodeRequest::get("get blockchain status", "/status"))
            .await
    }

    pub async fn all_blocks(&self) -> Result<BlockList, ClientError> {
        self.fetch(NodeRequest::get("get blocks", "/blocks")).await
    }

    pub async fn block_by_index(&self, index: u64) -> Result<Block, ClientError> {
        self.fetch(NodeRequest::get("get block", format!("/blocks/{index}")))
            .await
    }

    /// Every transaction touching `address`, in block order.
    pub async fn transaction_history(&self, address: &str) -> Result<Vec<Transaction>, ClientError> {
        let list = self.all_blocks().await?;
        Ok(list
            .blocks
            .into_iter()
            .flat_map(|block| block.data)
            .filter(|tx| tx.involves(address))
            .collect())
    }

    /// Status and the newest blocks, fetched concurrently. Both must succeed.
    pub async fn explorer_overview(&self) -> Result<ExplorerOverview, ClientError> {
        let (status, list) = tokio::try_join!(self.blockchain_status(), self.all_blocks())?;

        let mut latest_blocks = list.blocks;
        latest_blocks.sort_by(|a, b| b.index.cmp(&a.index));
        latest_blocks.truncate(EXPLORER_BLOCK_LIMIT);

        Ok(ExplorerOverview { status, latest_blocks })
    }

    /// Diagnostic probe of `/status` with a fixed timeout. Never fails.
    pub async fn check_health(&self, api_url_configured: bool) -> NodeHealth {
        let api_url = self.base_url().to_owned();

        if !api_url_configured {
            return NodeHealth {
                api_url,
                status: HealthStatus::NotConfigured,
                error: Some(format!(
                    "{} environment variable is not set",
                    crate::config::API_URL_VAR
                )),
            };
        }

        let request = NodeRequest::get("check node health", "/status").with_timeout(HEALTH_CHECK_TIMEOUT);
        match self.transport.send(request).await {
            Ok(_) => NodeHealth {
                api_url,
                status: HealthStatus::Connected,
                error: None,
            },
            Err(ClientError::Rejected { status, .. }) => NodeHealth {
                api_url,
                status: HealthStatus::Error,
                error: Some(format!("API returned status: {status}")),
            },
            Err(err) => NodeHealth {
                api_url,
                status: HealthStatus::Error,
                error: Some(err.to_string()),
            },
        }
    }

    // ── Contracts ────────────────────────────────────────────────────

    /// `code` is the base64 encoding of the WASM module.
    pub async fn deploy_contract(
        &self,
        owner: &str,
        name: &str,
        code: &str,
        private_key: &PrivateKey,
        fee: u64,
    ) -> Result<DeployReceipt, ClientError> {
        let request = NodeRequest::post("deploy contract", "/contracts/deploy").with_json(&DeployContractRequest {
            owner: owner.to_owned(),
            name: name.to_owned(),
            code: code.to_owned(),
            private_key: private_key.clone(),
            fee,
        })?;
        let receipt: DeployReceipt = self.fetch(request).await?;
        info!(
            owner,
            name,
            contract_id = receipt.contract_id().unwrap_or("-"),
            "contract deployed"
        );
        Ok(receipt)
    }

    pub async fn deploy_wasm(
        &self,
        owner: &str,
        name: &str,
        wasm: &[u8],
        private_key: &PrivateKey,
        fee: u64,
    ) -> Result<DeployReceipt, ClientError> {
        if wasm.is_empty() {
            return Err(ClientError::Precondition("contract code cannot be empty".to_owned()));
        }
        let code = STANDARD.encode(wasm);
        self.deploy_contract(owner, name, &code, private_key, fee).await
    }

    pub async fn contracts(&self) -> Result<ContractList, ClientError> {
        self.fetch(NodeRequest::get("get contracts", "/contracts")).await
    }

    pub async fn contract(&self, contract_id: &str) -> Result<SmartContract, ClientError> {
        self.fetch(NodeRequest::get("get contract", format!("/contracts/{contract_id}")))
            .await
    }

    /// Invoke `function` on a deployed contract and return its JSON result as-is.
    ///
    /// Pass `private_key` only for state-mutating functions; views omit it.
    pub async fn call_contract(
        &self,
        contract_id: &str,
        function: &str,
        args: Vec<Value>,
        private_key: Option<&PrivateKey>,
    ) -> Result<Value, ClientError> {
        self.submit_contract_call(contract_id, function, args, private_key, None)
            .await
    }

    pub(crate) async fn submit_contract_call(
        &self,
        contract_id: &str,
        function: &str,
        args: Vec<Value>,
        private_key: Option<&PrivateKey>,
        request_id: Option<&RequestId>,
    ) -> Result<Value, ClientError> {
        self.schemas.validate(contract_id, function, &args)?;

        let mut request = NodeRequest::post("call contract", "/contracts/call").with_json(&ContractCallRequest {
            contract_id: contract_id.to_owned(),
            function: function.to_owned(),
            args,
            private_key: private_key.cloned(),
        })?;
        if let Some(id) = request_id {
            request = request.with_idempotency_key(id.as_str());
        }

        debug!(contract_id, function, signed = private_key.is_some(), "contract call");
        self.transport.send(request).await
    }
}

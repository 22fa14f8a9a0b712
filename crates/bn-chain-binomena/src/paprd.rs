//! PAPRD stablecoin operations.
//!
//! Every operation is bound to exactly one [`Backing`] when the facade is
//! built: a contract call, a dedicated node endpoint, or nothing at all.
//! Unbacked operations fail with [`ClientError::Unavailable`] before any
//! request is made; that failure is permanent for the configured node and
//! must not be retried.

use bn_api_types::{
    BlacklistStatus, CollateralBalance, CollateralRatio, CollateralType, MinterStatus,
    PaprdBalance, PaprdMintRequest, PaprdOwner, PaprdPaused, PaprdSupply, PaprdTransferRequest,
    RequestId, TxOutcome, Wallet,
};
use bn_chain_client::{ClientError, Method, NodeRequest};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use tracing::{debug, info};

use crate::client::BinomenaClient;
use crate::config::NodeConfig;
use crate::contract::{ArgKind, SchemaRegistry};

use crate::contract::ArgKind::{Address, Amount, Integer};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PaprdOperation {
    TotalSupply,
    Balance,
    Transfer,
    Mint,
    Burn,
    AddCollateral,
    RemoveCollateral,
    CollateralBalance,
    CollateralRatio,
    AddMinter,
    RemoveMinter,
    Blacklist,
    Unblacklist,
    Pause,
    Unpause,
    SetCollateralRatio,
    TransferOwnership,
    Owner,
    Paused,
    IsBlacklisted,
    IsMinter,
}

impl PaprdOperation {
    pub const ALL: [Self; 21] = [
        Self::TotalSupply,
        Self::Balance,
        Self::Transfer,
        Self::Mint,
        Self::Burn,
        Self::AddCollateral,
        Self::RemoveCollateral,
        Self::CollateralBalance,
        Self::CollateralRatio,
        Self::AddMinter,
        Self::RemoveMinter,
        Self::Blacklist,
        Self::Unblacklist,
        Self::Pause,
        Self::Unpause,
        Self::SetCollateralRatio,
        Self::TransferOwnership,
        Self::Owner,
        Self::Paused,
        Self::IsBlacklisted,
        Self::IsMinter,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::TotalSupply => "PAPRD total supply",
            Self::Balance => "PAPRD balance",
            Self::Transfer => "PAPRD transfer",
            Self::Mint => "PAPRD mint",
            Self::Burn => "PAPRD burn",
            Self::AddCollateral => "PAPRD add collateral",
            Self::RemoveCollateral => "PAPRD remove collateral",
            Self::CollateralBalance => "PAPRD collateral balance",
            Self::CollateralRatio => "PAPRD collateral ratio",
            Self::AddMinter => "PAPRD add minter",
            Self::RemoveMinter => "PAPRD remove minter",
            Self::Blacklist => "PAPRD blacklist",
            Self::Unblacklist => "PAPRD unblacklist",
            Self::Pause => "PAPRD pause",
            Self::Unpause => "PAPRD unpause",
            Self::SetCollateralRatio => "PAPRD set collateral ratio",
            Self::TransferOwnership => "PAPRD transfer ownership",
            Self::Owner => "PAPRD owner",
            Self::Paused => "PAPRD paused check",
            Self::IsBlacklisted => "PAPRD blacklist check",
            Self::IsMinter => "PAPRD minter check",
        }
    }

    /// Exported function name on the PAPRD contract.
    pub fn contract_function(self) -> &'static str {
        match self {
            Self::TotalSupply => "total_supply",
            Self::Balance => "balance_of",
            Self::Transfer => "transfer",
            Self::Mint => "mint",
            Self::Burn => "burn",
            Self::AddCollateral => "add_collateral",
            Self::RemoveCollateral => "remove_collateral",
            Self::CollateralBalance => "collateral_balance",
            Self::CollateralRatio => "collateral_ratio",
            Self::AddMinter => "add_minter",
            Self::RemoveMinter => "remove_minter",
            Self::Blacklist => "blacklist",
            Self::Unblacklist => "unblacklist",
            Self::Pause => "pause",
            Self::Unpause => "unpause",
            Self::SetCollateralRatio => "set_collateral_ratio",
            Self::TransferOwnership => "transfer_ownership",
            Self::Owner => "owner",
            Self::Paused => "paused",
            Self::IsBlacklisted => "is_blacklisted",
            Self::IsMinter => "is_minter",
        }
    }

    /// Positional contract arguments. Mutations lead with the caller's address.
    pub fn params(self) -> &'static [ArgKind] {
        match self {
            Self::TotalSupply | Self::CollateralRatio | Self::Owner | Self::Paused => &[],
            Self::Balance | Self::CollateralBalance | Self::IsBlacklisted | Self::IsMinter => &[Address],
            Self::Transfer | Self::Mint => &[Address, Address, Amount],
            Self::Burn | Self::RemoveCollateral | Self::SetCollateralRatio => &[Address, Amount],
            Self::AddCollateral => &[Address, Amount, Integer],
            Self::AddMinter
            | Self::RemoveMinter
            | Self::Blacklist
            | Self::Unblacklist
            | Self::TransferOwnership => &[Address, Address],
            Self::Pause | Self::Unpause => &[Address],
        }
    }

    pub fn is_mutation(self) -> bool {
        !matches!(
            self,
            Self::TotalSupply
                | Self::Balance
                | Self::CollateralBalance
                | Self::CollateralRatio
                | Self::Owner
                | Self::Paused
                | Self::IsBlacklisted
                | Self::IsMinter
        )
    }

    /// Endpoint this operation occupies (or would occupy) on the node.
    pub fn endpoint(self) -> &'static str {
        match self {
            Self::TotalSupply | Self::Owner | Self::Paused => "/paprd/info",
            Self::Balance => "/paprd/balance",
            Self::Transfer => "/paprd/transfer",
            Self::Mint => "/paprd/mint",
            Self::Burn => "/paprd/burn",
            Self::AddCollateral => "/paprd/collateral/add",
            Self::RemoveCollateral => "/paprd/collateral/remove",
            Self::CollateralBalance => "/paprd/collateral/balance",
            Self::CollateralRatio => "/paprd/collateral/ratio",
            Self::SetCollateralRatio => "/paprd/collateral/ratio/set",
            Self::AddMinter => "/paprd/minters/add",
            Self::RemoveMinter => "/paprd/minters/remove",
            Self::Blacklist => "/paprd/blacklist/add",
            Self::Unblacklist => "/paprd/blacklist/remove",
            Self::Pause => "/paprd/pause",
            Self::Unpause => "/paprd/unpause",
            Self::TransferOwnership => "/paprd/ownership/transfer",
            Self::IsBlacklisted => "/paprd/blacklist",
            Self::IsMinter => "/paprd/minters",
        }
    }

    fn native_route(self) -> Backing {
        match self {
            Self::TotalSupply | Self::Owner | Self::Paused | Self::Balance => Backing::Direct {
                method: Method::Get,
                path: self.endpoint(),
            },
            Self::Transfer | Self::Mint => Backing::Direct {
                method: Method::Post,
                path: self.endpoint(),
            },
            _ => Backing::Unavailable {
                endpoint: self.endpoint(),
            },
        }
    }
}

impl fmt::Display for PaprdOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// How one operation reaches the node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Backing {
    ContractCall {
        contract_id: String,
        function: &'static str,
    },
    Direct {
        method: Method,
        path: &'static str,
    },
    Unavailable {
        endpoint: &'static str,
    },
}

/// Node revision the PAPRD routes are built for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaprdBackend {
    /// Dedicated `/paprd/*` endpoints; everything else unavailable.
    Direct,
    /// Every operation through the generic contract-call RPC.
    ContractCall,
}

impl FromStr for PaprdBackend {
    type Err = ClientError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "direct" => Ok(Self::Direct),
            "contract-call" | "contract_call" => Ok(Self::ContractCall),
            other => Err(ClientError::Precondition(format!(
                "unknown PAPRD backend '{other}'; expected 'direct' or 'contract-call'"
            ))),
        }
    }
}

impl fmt::Display for PaprdBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Direct => f.write_str("direct"),
            Self::ContractCall => f.write_str("contract-call"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PaprdRoutes {
    routes: HashMap<PaprdOperation, Backing>,
}

impl PaprdRoutes {
    pub fn resolve(backend: PaprdBackend, contract_id: &str) -> Self {
        let routes = PaprdOperation::ALL
            .into_iter()
            .map(|op| {
                let backing = match backend {
                    PaprdBackend::Direct => op.native_route(),
                    PaprdBackend::ContractCall => Backing::ContractCall {
                        contract_id: contract_id.to_owned(),
                        function: op.contract_function(),
                    },
                };
                (op, backing)
            })
            .collect();
        Self { routes }
    }

    pub fn from_config(config: &NodeConfig) -> Self {
        Self::resolve(config.paprd_backend, &config.paprd_contract_id)
    }

    pub fn with_override(mut self, op: PaprdOperation, backing: Backing) -> Self {
        self.routes.insert(op, backing);
        self
    }

    pub fn backing(&self, op: PaprdOperation) -> Backing {
        self.routes.get(&op).cloned().unwrap_or(Backing::Unavailable {
            endpoint: op.endpoint(),
        })
    }

    pub fn unavailable(&self) -> Vec<PaprdOperation> {
        PaprdOperation::ALL
            .into_iter()
            .filter(|op| matches!(self.backing(*op), Backing::Unavailable { .. }))
            .collect()
    }

    fn contract_schemas(&self, mut schemas: SchemaRegistry) -> SchemaRegistry {
        for op in PaprdOperation::ALL {
            if let Backing::ContractCall { contract_id, function } = self.backing(op) {
                schemas.register(&contract_id, function, op.params());
            }
        }
        schemas
    }
}

/// Independently settled results of the PAPRD dashboard reads.
#[derive(Debug)]
pub struct PaprdOverview {
    pub total_supply: Result<PaprdSupply, ClientError>,
    pub owner: Result<PaprdOwner, ClientError>,
    pub paused: Result<PaprdPaused, ClientError>,
    pub collateral_ratio: Result<CollateralRatio, ClientError>,
}

#[derive(Clone)]
pub struct PaprdFacade {
    client: BinomenaClient,
    routes: PaprdRoutes,
}

impl PaprdFacade {
    pub fn new(client: BinomenaClient, routes: PaprdRoutes) -> Self {
        let schemas = routes.contract_schemas(client.schemas().clone());
        Self {
            client: client.with_schemas(schemas),
            routes,
        }
    }

    pub fn from_config(client: BinomenaClient, config: &NodeConfig) -> Self {
        Self::new(client, PaprdRoutes::from_config(config))
    }

    pub fn routes(&self) -> &PaprdRoutes {
        &self.routes
    }

    async fn invoke<T: DeserializeOwned>(
        &self,
        op: PaprdOperation,
        signer: Option<&Wallet>,
        args: Vec<Value>,
        request_id: Option<&RequestId>,
        direct: impl FnOnce(Method, &'static str) -> Result<NodeRequest, ClientError>,
    ) -> Result<T, ClientError> {
        let backing = self.routes.backing(op);

        if let Backing::Unavailable { endpoint } = backing {
            debug!(operation = op.label(), endpoint, "operation unavailable on this node");
            return Err(ClientError::Unavailable {
                operation: op.label(),
                endpoint,
            });
        }

        if let Some(wallet) = signer {
            if wallet.address.trim().is_empty() {
                return Err(ClientError::wallet_not_connected());
            }
            if wallet.private_key.is_empty() {
                return Err(ClientError::Precondition(format!(
                    "{} requires the wallet's private key",
                    op.label()
                )));
            }
        }

        match backing {
            Backing::ContractCall { contract_id, function } => {
                let value = self
                    .client
                    .submit_contract_call(
                        &contract_id,
                        function,
                        args,
                        signer.map(|wallet| &wallet.private_key),
                        request_id,
                    )
                    .await?;
                bn_chain_client::decode(value)
            }
            Backing::Direct { method, path } => {
                let mut request = direct(method, path)?;
                if let Some(id) = request_id {
                    request = request.with_idempotency_key(id.as_str());
                }
                self.client.fetch(request).await
            }
            Backing::Unavailable { endpoint } => Err(ClientError::Unavailable {
                operation: op.label(),
                endpoint,
            }),
        }
    }

    async fn view<T: DeserializeOwned>(&self, op: PaprdOperation) -> Result<T, ClientError> {
        self.invoke(op, None, Vec::new(), None, |method, path| {
            Ok(NodeRequest::new(method, op.label(), path))
        })
        .await
    }

    async fn view_of<T: DeserializeOwned>(&self, op: PaprdOperation, address: &str) -> Result<T, ClientError> {
        self.invoke(op, None, vec![json!(address)], None, |method, path| {
            Ok(NodeRequest::new(method, op.label(), format!("{path}/{address}")))
        })
        .await
    }

    async fn mutate(
        &self,
        op: PaprdOperation,
        wallet: &Wallet,
        args: Vec<Value>,
        fields: Value,
    ) -> Result<TxOutcome, ClientError> {
        let outcome: TxOutcome = self
            .invoke(op, Some(wallet), args, None, |method, path| {
                NodeRequest::new(method, op.label(), path).with_json(&signed_body(wallet, fields))
            })
            .await?;
        info!(operation = op.label(), caller = %wallet.address, "PAPRD operation submitted");
        Ok(outcome)
    }

    // ── Reads ────────────────────────────────────────────────────────

    pub async fn total_supply(&self) -> Result<PaprdSupply, ClientError> {
        self.view(PaprdOperation::TotalSupply).await
    }

    pub async fn owner(&self) -> Result<PaprdOwner, ClientError> {
        self.view(PaprdOperation::Owner).await
    }

    pub async fn is_paused(&self) -> Result<PaprdPaused, ClientError> {
        self.view(PaprdOperation::Paused).await
    }

    pub async fn collateral_ratio(&self) -> Result<CollateralRatio, ClientError> {
        self.view(PaprdOperation::CollateralRatio).await
    }

    pub async fn balance(&self, address: &str) -> Result<PaprdBalance, ClientError> {
        self.view_of(PaprdOperation::Balance, address).await
    }

    pub async fn collateral_balance(&self, address: &str) -> Result<CollateralBalance, ClientError> {
        self.view_of(PaprdOperation::CollateralBalance, address).await
    }

    pub async fn is_blacklisted(&self, address: &str) -> Result<BlacklistStatus, ClientError> {
        self.view_of(PaprdOperation::IsBlacklisted, address).await
    }

    pub async fn is_minter(&self, address: &str) -> Result<MinterStatus, ClientError> {
        self.view_of(PaprdOperation::IsMinter, address).await
    }

    /// Supply, owner, pause flag and collateral ratio, fetched concurrently.
    /// One failing read does not hide the others.
    pub async fn overview(&self) -> PaprdOverview {
        let (total_supply, owner, paused, collateral_ratio) = tokio::join!(
            self.total_supply(),
            self.owner(),
            self.is_paused(),
            self.collateral_ratio()
        );
        PaprdOverview {
            total_supply,
            owner,
            paused,
            collateral_ratio,
        }
    }

    // ── Transfers ────────────────────────────────────────────────────

    pub async fn transfer(&self, wallet: &Wallet, to: &str, amount: f64) -> Result<TxOutcome, ClientError> {
        self.transfer_with_request_id(wallet, to, amount, &RequestId::new())
            .await
    }

    /// Reuse `request_id` when retrying after a network failure.
    pub async fn transfer_with_request_id(
        &self,
        wallet: &Wallet,
        to: &str,
        amount: f64,
        request_id: &RequestId,
    ) -> Result<TxOutcome, ClientError> {
        let op = PaprdOperation::Transfer;
        let args = vec![json!(wallet.address), json!(to), json!(amount)];
        let outcome: TxOutcome = self
            .invoke(op, Some(wallet), args, Some(request_id), |method, path| {
                NodeRequest::new(method, op.label(), path).with_json(&PaprdTransferRequest {
                    from: wallet.address.clone(),
                    to: to.to_owned(),
                    amount,
                    private_key: wallet.private_key.clone(),
                })
            })
            .await?;
        info!(from = %wallet.address, to, request_id = %request_id, "PAPRD transfer submitted");
        Ok(outcome)
    }

    pub async fn mint(&self, wallet: &Wallet, to: &str, amount: f64) -> Result<TxOutcome, ClientError> {
        self.mint_with_request_id(wallet, to, amount, &RequestId::new())
            .await
    }

    pub async fn mint_with_request_id(
        &self,
        wallet: &Wallet,
        to: &str,
        amount: f64,
        request_id: &RequestId,
    ) -> Result<TxOutcome, ClientError> {
        let op = PaprdOperation::Mint;
        let args = vec![json!(wallet.address), json!(to), json!(amount)];
        let outcome: TxOutcome = self
            .invoke(op, Some(wallet), args, Some(request_id), |method, path| {
                NodeRequest::new(method, op.label(), path).with_json(&PaprdMintRequest {
                    caller: wallet.address.clone(),
                    to: to.to_owned(),
                    amount,
                    private_key: wallet.private_key.clone(),
                })
            })
            .await?;
        info!(caller = %wallet.address, to, request_id = %request_id, "PAPRD mint submitted");
        Ok(outcome)
    }

    pub async fn burn(&self, wallet: &Wallet, amount: f64) -> Result<TxOutcome, ClientError> {
        self.mutate(
            PaprdOperation::Burn,
            wallet,
            vec![json!(wallet.address), json!(amount)],
            json!({ "amount": amount }),
        )
        .await
    }

    // ── Collateral ───────────────────────────────────────────────────

    pub async fn add_collateral(
        &self,
        wallet: &Wallet,
        amount: f64,
        collateral: CollateralType,
    ) -> Result<TxOutcome, ClientError> {
        self.mutate(
            PaprdOperation::AddCollateral,
            wallet,
            vec![json!(wallet.address), json!(amount), json!(collateral.code())],
            json!({ "amount": amount, "collateralType": collateral.code() }),
        )
        .await
    }

    pub async fn remove_collateral(&self, wallet: &Wallet, amount: f64) -> Result<TxOutcome, ClientError> {
        self.mutate(
            PaprdOperation::RemoveCollateral,
            wallet,
            vec![json!(wallet.address), json!(amount)],
            json!({ "amount": amount }),
        )
        .await
    }

    pub async fn set_collateral_ratio(&self, wallet: &Wallet, ratio: f64) -> Result<TxOutcome, ClientError> {
        self.mutate(
            PaprdOperation::SetCollateralRatio,
            wallet,
            vec![json!(wallet.address), json!(ratio)],
            json!({ "ratio": ratio }),
        )
        .await
    }

    // ── Administration ───────────────────────────────────────────────

    pub async fn add_minter(&self, wallet: &Wallet, minter: &str) -> Result<TxOutcome, ClientError> {
        self.targeted(PaprdOperation::AddMinter, wallet, minter).await
    }

    pub async fn remove_minter(&self, wallet: &Wallet, minter: &str) -> Result<TxOutcome, ClientError> {
        self.targeted(PaprdOperation::RemoveMinter, wallet, minter).await
    }

    pub async fn blacklist(&self, wallet: &Wallet, address: &str) -> Result<TxOutcome, ClientError> {
        self.targeted(PaprdOperation::Blacklist, wallet, address).await
    }

    pub async fn unblacklist(&self, wallet: &Wallet, address: &str) -> Result<TxOutcome, ClientError> {
        self.targeted(PaprdOperation::Unblacklist, wallet, address).await
    }

    pub async fn transfer_ownership(&self, wallet: &Wallet, new_owner: &str) -> Result<TxOutcome, ClientError> {
        self.targeted(PaprdOperation::TransferOwnership, wallet, new_owner)
            .await
    }

    pub async fn pause(&self, wallet: &Wallet) -> Result<TxOutcome, ClientError> {
        self.mutate(PaprdOperation::Pause, wallet, vec![json!(wallet.address)], json!({}))
            .await
    }

    pub async fn unpause(&self, wallet: &Wallet) -> Result<TxOutcome, ClientError> {
        self.mutate(PaprdOperation::Unpause, wallet, vec![json!(wallet.address)], json!({}))
            .await
    }

    async fn targeted(&self, op: PaprdOperation, wallet: &Wallet, target: &str) -> Result<TxOutcome, ClientError> {
        self.mutate(
            op,
            wallet,
            vec![json!(wallet.address), json!(target)],
            json!({ "address": target }),
        )
        .await
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SignedBody<'a> {
    caller: &'a str,
    #[serde(flatten)]
    fields: Value,
    private_key: &'a bn_api_types::PrivateKey,
}

fn signed_body(wallet: &Wallet, fields: Value) -> SignedBody<'_> {
    SignedBody {
        caller: &wallet.address,
        fields,
        private_key: &wallet.private_key,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn native_revision_routes() {
        let routes = PaprdRoutes::resolve(PaprdBackend::Direct, "paprd_stablecoin");

        assert_eq!(
            routes.backing(PaprdOperation::Balance),
            Backing::Direct {
                method: Method::Get,
                path: "/paprd/balance"
            }
        );
        assert_eq!(
            routes.backing(PaprdOperation::Mint),
            Backing::Direct {
                method: Method::Post,
                path: "/paprd/mint"
            }
        );

        let unavailable = routes.unavailable();
        assert_eq!(unavailable.len(), 15);
        assert!(unavailable.contains(&PaprdOperation::Burn));
        assert!(unavailable.contains(&PaprdOperation::IsMinter));
        assert!(!unavailable.contains(&PaprdOperation::Owner));
    }

    #[test]
    fn contract_revision_routes_everything() {
        let routes = PaprdRoutes::resolve(PaprdBackend::ContractCall, "paprd_v1");
        assert!(routes.unavailable().is_empty());
        assert_eq!(
            routes.backing(PaprdOperation::Burn),
            Backing::ContractCall {
                contract_id: "paprd_v1".to_owned(),
                function: "burn"
            }
        );
    }

    #[test]
    fn override_replaces_single_route() {
        let routes = PaprdRoutes::resolve(PaprdBackend::Direct, "paprd")
            .with_override(
                PaprdOperation::Burn,
                Backing::ContractCall {
                    contract_id: "paprd".to_owned(),
                    function: "burn",
                },
            );
        assert!(!routes.unavailable().contains(&PaprdOperation::Burn));
        assert_eq!(routes.unavailable().len(), 14);
    }

    #[test]
    fn every_mutation_takes_caller_first() {
        for op in PaprdOperation::ALL.into_iter().filter(|op| op.is_mutation()) {
            assert_eq!(op.params().first(), Some(&Address), "{op}");
        }
    }

    #[test]
    fn backend_parses_from_config_text() {
        assert_eq!("Direct".parse::<PaprdBackend>().unwrap(), PaprdBackend::Direct);
        assert_eq!(
            "contract_call".parse::<PaprdBackend>().unwrap(),
            PaprdBackend::ContractCall
        );
        assert!("rest".parse::<PaprdBackend>().is_err());
    }
}

use bn_chain_client::ClientError;

use crate::paprd::PaprdBackend;

pub const DEFAULT_NODE_URL: &str = "https://binomena-node.onrender.com";
pub const DEFAULT_PAPRD_CONTRACT_ID: &str = "paprd_stablecoin";

pub const API_URL_VAR: &str = "BINOMENA_API_URL";
pub const PRESALE_URL_VAR: &str = "BINOMENA_PRESALE_API_URL";
pub const PAPRD_BACKEND_VAR: &str = "PAPRD_BACKEND";
pub const PAPRD_CONTRACT_VAR: &str = "PAPRD_CONTRACT_ID";

/// Node connection settings, resolved once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeConfig {
    pub api_url: String,
    /// False when `api_url` is the built-in default rather than an explicit setting.
    pub api_url_configured: bool,
    pub presale_url: String,
    pub paprd_backend: PaprdBackend,
    pub paprd_contract_id: String,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_NODE_URL.to_owned(),
            api_url_configured: false,
            presale_url: DEFAULT_NODE_URL.to_owned(),
            paprd_backend: PaprdBackend::Direct,
            paprd_contract_id: DEFAULT_PAPRD_CONTRACT_ID.to_owned(),
        }
    }
}

impl NodeConfig {
    pub fn from_env() -> Result<Self, ClientError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ClientError> {
        let non_empty = |key: &str| lookup(key).map(|v| v.trim().to_owned()).filter(|v| !v.is_empty());

        let configured_url = non_empty(API_URL_VAR).map(|url| normalize_url(&url));
        let api_url_configured = configured_url.is_some();
        let api_url = configured_url.unwrap_or_else(|| DEFAULT_NODE_URL.to_owned());

        let presale_url = non_empty(PRESALE_URL_VAR)
            .map(|url| normalize_url(&url))
            .unwrap_or_else(|| api_url.clone());

        let paprd_backend = match non_empty(PAPRD_BACKEND_VAR) {
            Some(raw) => raw.parse()?,
            None => PaprdBackend::Direct,
        };

        let paprd_contract_id =
            non_empty(PAPRD_CONTRACT_VAR).unwrap_or_else(|| DEFAULT_PAPRD_CONTRACT_ID.to_owned());

        Ok(Self {
            api_url,
            api_url_configured,
            presale_url,
            paprd_backend,
            paprd_contract_id,
        })
    }
}

fn normalize_url(url: &str) -> String {
    url.trim_end_matches('/').to_owned()
}

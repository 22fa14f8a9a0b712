//! Static token metadata for the Binomena ecosystem.
//!
//! Decimals and logo paths here drive every displayed balance; keep them in
//! step with the chain.

use serde::Serialize;

pub const DEFAULT_LOGO: &str = "/tokens/default.png";
pub const LOGO_BASE_URL: &str = "https://www.binomchainapp.fyi";
pub const TOKEN_LIST_NAME: &str = "Binomena Token List";
pub const CHAIN_ID: u64 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Native,
    Stablecoin,
    Utility,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Socials {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub twitter: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub telegram: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discord: Option<&'static str>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenInfo {
    pub symbol: &'static str,
    pub name: &'static str,
    pub decimals: u8,
    pub logo: &'static str,
    pub description: &'static str,
    pub total_supply: &'static str,
    #[serde(rename = "type")]
    pub token_type: TokenType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contract_address: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub socials: Option<Socials>,
}

pub static TOKENS: &[TokenInfo] = &[
    TokenInfo {
        symbol: "BNM",
        name: "Binomena",
        decimals: 18,
        logo: "/tokens/bnm.png",
        description: "Native utility token of the Binomena blockchain ecosystem",
        total_supply: "1,000,000,000",
        token_type: TokenType::Native,
        contract_address: None,
        website: Some("https://www.binomchainapp.fyi"),
        socials: Some(Socials {
            twitter: None,
            telegram: None,
            discord: None,
        }),
    },
    TokenInfo {
        symbol: "PAPRD",
        name: "PAPRD Stablecoin",
        decimals: 18,
        logo: "/tokens/paprd.png",
        description: "USD-pegged stablecoin with 150% collateral backing",
        total_supply: "Variable",
        token_type: TokenType::Stablecoin,
        contract_address: Some("paprd_contract_address_here"),
        website: Some("https://www.binomchainapp.fyi/wallet/paprd"),
        socials: None,
    },
];

/// Case-insensitive lookup; `None` for unknown symbols.
pub fn token_info(symbol: &str) -> Option<&'static TokenInfo> {
    TOKENS
        .iter()
        .find(|token| token.symbol.eq_ignore_ascii_case(symbol))
}

pub fn all_tokens() -> &'static [TokenInfo] {
    TOKENS
}

pub fn token_logo(symbol: &str) -> &'static str {
    token_info(symbol).map_or(DEFAULT_LOGO, |token| token.logo)
}

// ── Exchange token list ──────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenListVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenListEntry {
    pub chain_id: u64,
    pub address: String,
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
    #[serde(rename = "logoURI")]
    pub logo_uri: String,
    pub tags: Vec<TokenType>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenList {
    pub name: String,
    pub version: TokenListVersion,
    pub keywords: Vec<String>,
    #[serde(rename = "logoURI")]
    pub logo_uri: String,
    pub tokens: Vec<TokenListEntry>,
}

impl From<&TokenInfo> for TokenListEntry {
    fn from(token: &TokenInfo) -> Self {
        Self {
            chain_id: CHAIN_ID,
            address: token.contract_address.unwrap_or("native").to_owned(),
            name: token.name.to_owned(),
            symbol: token.symbol.to_owned(),
            decimals: token.decimals,
            logo_uri: format!("{LOGO_BASE_URL}{}", token.logo),
            tags: vec![token.token_type],
        }
    }
}

/// The registry projected into the standard token-list document, in
/// registry order.
pub fn token_list() -> TokenList {
    TokenList {
        name: TOKEN_LIST_NAME.to_owned(),
        version: TokenListVersion {
            major: 1,
            minor: 0,
            patch: 0,
        },
        keywords: ["binomena", "blockchain", "defi"]
            .into_iter()
            .map(str::to_owned)
            .collect(),
        logo_uri: "/tokens/bnm.png".to_owned(),
        tokens: TOKENS.iter().map(TokenListEntry::from).collect(),
    }
}

pub fn token_list_json() -> serde_json::Value {
    serde_json::to_value(token_list()).unwrap_or_default()
}

//! Client for a Binomena node: wallets, transfers, blocks, WASM contracts
//! and the PAPRD stablecoin.

pub mod client;
pub mod config;
pub mod contract;
pub mod paprd;
pub mod transport;

pub use client::{BinomenaClient, ExplorerOverview, HealthStatus, NodeHealth};
pub use config::NodeConfig;
pub use contract::{ArgKind, SchemaRegistry};
pub use paprd::{Backing, PaprdBackend, PaprdFacade, PaprdOperation, PaprdOverview, PaprdRoutes};
pub use transport::HttpTransport;

use anyhow::{Result, anyhow};
use bn_api_types::{PrivateKey, TxOutcome, TxReceipt, Wallet};
use bn_chain_binomena::{BinomenaClient, PaprdFacade};
use bn_chain_client::ClientError;
use bn_storage::KeyValueStore;
use tracing::info;

pub const WALLET_ADDRESS_KEY: &str = "wallet_address";
pub const WALLET_PRIVATE_KEY_KEY: &str = "wallet_private_key";
pub const LEGACY_PAPRD_ADDRESS_KEY: &str = "paprd_wallet_address";
pub const LEGACY_PAPRD_PRIVATE_KEY_KEY: &str = "paprd_wallet_private_key";

const ALL_KEYS: [&str; 4] = [
    WALLET_ADDRESS_KEY,
    WALLET_PRIVATE_KEY_KEY,
    LEGACY_PAPRD_ADDRESS_KEY,
    LEGACY_PAPRD_PRIVATE_KEY_KEY,
];

/// The locally remembered wallet.
///
/// Holds no session on the node; "connected" only means a credential pair
/// is in the store. Signing operations read the pair here and hand it to
/// the facade explicitly.
pub struct WalletSession<K> {
    store: K,
}

impl<K> WalletSession<K>
where
    K: KeyValueStore,
{
    pub fn new(store: K) -> Self {
        Self { store }
    }

    pub async fn connect(&self, wallet: &Wallet) -> Result<()> {
        if !wallet.is_complete() {
            return Err(anyhow!(ClientError::Precondition(
                "both wallet address and private key are required".to_owned()
            )));
        }

        // Address last: a failed write leaves no active wallet, never a
        // stale legacy pair or a mismatched one.
        for key in [
            WALLET_ADDRESS_KEY,
            LEGACY_PAPRD_ADDRESS_KEY,
            LEGACY_PAPRD_PRIVATE_KEY_KEY,
        ] {
            self.store.remove(key).await?;
        }
        self.store
            .set(WALLET_PRIVATE_KEY_KEY, wallet.private_key.expose())
            .await?;
        self.store.set(WALLET_ADDRESS_KEY, &wallet.address).await?;
        info!(address = %wallet.address, "wallet connected");
        Ok(())
    }

    /// Connect only after the node has answered a PAPRD balance query for
    /// the address.
    pub async fn connect_checked(&self, paprd: &PaprdFacade, wallet: &Wallet) -> Result<()> {
        if !wallet.is_complete() {
            return self.connect(wallet).await;
        }
        paprd.balance(&wallet.address).await?;
        self.connect(wallet).await
    }

    /// The stored pair, preferring the current keys over the legacy PAPRD ones.
    pub async fn active(&self) -> Result<Option<Wallet>> {
        if let Some(wallet) = self.pair(WALLET_ADDRESS_KEY, WALLET_PRIVATE_KEY_KEY).await? {
            return Ok(Some(wallet));
        }
        self.pair(LEGACY_PAPRD_ADDRESS_KEY, LEGACY_PAPRD_PRIVATE_KEY_KEY)
            .await
    }

    pub async fn require_active(&self) -> Result<Wallet> {
        self.active()
            .await?
            .ok_or_else(|| anyhow!(ClientError::wallet_not_connected()))
    }

    /// Clears the current and legacy entries together.
    pub async fn disconnect(&self) -> Result<()> {
        for key in ALL_KEYS {
            self.store.remove(key).await?;
        }
        info!("wallet disconnected");
        Ok(())
    }

    pub async fn create_and_connect(&self, client: &BinomenaClient) -> Result<Wallet> {
        let wallet = client.create_wallet().await?;
        self.connect(&wallet).await?;
        Ok(wallet)
    }

    pub async fn import_and_connect(&self, client: &BinomenaClient, private_key: &PrivateKey) -> Result<Wallet> {
        let wallet = client.import_wallet(private_key).await?;
        self.connect(&wallet).await?;
        Ok(wallet)
    }

    pub async fn send(&self, client: &BinomenaClient, to: &str, amount: f64) -> Result<TxReceipt> {
        let wallet = self.require_active().await?;
        Ok(client
            .send_transaction(&wallet.address, to, amount, &wallet.private_key)
            .await?)
    }

    pub async fn transfer_paprd(&self, paprd: &PaprdFacade, to: &str, amount: f64) -> Result<TxOutcome> {
        let wallet = self.require_active().await?;
        Ok(paprd.transfer(&wallet, to, amount).await?)
    }

    pub async fn mint_paprd(&self, paprd: &PaprdFacade, to: &str, amount: f64) -> Result<TxOutcome> {
        let wallet = self.require_active().await?;
        Ok(paprd.mint(&wallet, to, amount).await?)
    }

    async fn pair(&self, address_key: &str, private_key_key: &str) -> Result<Option<Wallet>> {
        let address = self.store.get(address_key).await?;
        let private_key = self.store.get(private_key_key).await?;
        match (address, private_key) {
            (Some(address), Some(private_key)) if !address.is_empty() && !private_key.is_empty() => {
                Ok(Some(Wallet::new(address, PrivateKey::new(private_key))))
            }
            _ => Ok(None),
        }
    }
}

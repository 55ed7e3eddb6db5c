use std::{str::FromStr, sync::Arc};

use anyhow::{anyhow, bail, Result};
use ethers::abi::Detokenize;
use ethers::contract::ContractCall;
use ethers::middleware::SignerMiddleware;
use ethers::providers::{Http, JsonRpcClient, Middleware, PendingTransaction, Provider};
use ethers::signers::{LocalWallet, Signer};
use ethers::types::{TransactionReceipt, TransactionRequest, TxHash};
use tracing::info;

pub type Client = SignerMiddleware<Provider<Http>, LocalWallet>;

/// Binds a signing wallet to an HTTP provider for the chain reported by
/// the endpoint. Malformed keys or unreachable endpoints are fatal.
pub async fn connect(rpc_url: &str, private_key: &str) -> Result<Arc<Client>> {
    let provider = Provider::<Http>::try_from(rpc_url)
        .map_err(|e| anyhow!("invalid RPC URL {rpc_url}: {e}"))?;
    let chain_id = provider
        .get_chainid()
        .await
        .map_err(|e| anyhow!("failed to query chain id from {rpc_url}: {e}"))?;

    let wallet = LocalWallet::from_str(private_key.trim())
        .map_err(|e| anyhow!("failed to parse wallet private key: {e}"))?
        .with_chain_id(chain_id.as_u64());

    Ok(Arc::new(SignerMiddleware::new(provider, wallet)))
}

/// Submits a contract call and blocks until it is mined, failing when
/// the transaction is dropped or reverts.
pub async fn send_and_confirm<M, D>(label: &str, call: ContractCall<M, D>) -> Result<TransactionReceipt>
where
    M: Middleware + 'static,
    D: Detokenize,
{
    let pending = call
        .send()
        .await
        .map_err(|e| anyhow!("failed to submit {label} transaction: {e}"))?;
    confirm(label, pending).await
}

/// Same as [`send_and_confirm`] for a raw transaction request.
pub async fn send_raw_and_confirm<M>(
    label: &str,
    client: &M,
    tx: TransactionRequest,
) -> Result<TransactionReceipt>
where
    M: Middleware + 'static,
{
    let pending = client
        .send_transaction(tx, None)
        .await
        .map_err(|e| anyhow!("failed to submit {label} transaction: {e}"))?;
    confirm(label, pending).await
}

async fn confirm<P: JsonRpcClient>(
    label: &str,
    pending: PendingTransaction<'_, P>,
) -> Result<TransactionReceipt> {
    let tx_hash: TxHash = *pending;
    info!(%label, ?tx_hash, "transaction submitted");

    let receipt = pending
        .await
        .map_err(|e| anyhow!("failed while waiting for {label} receipt: {e}"))?
        .ok_or_else(|| anyhow!("{label} transaction {tx_hash:?} was dropped before being mined"))?;

    if receipt.status != Some(1u64.into()) {
        bail!(
            "{label} transaction {:?} reverted in block {:?}",
            receipt.transaction_hash,
            receipt.block_number
        );
    }

    info!(
        %label,
        tx_hash = ?receipt.transaction_hash,
        block = ?receipt.block_number,
        gas_used = ?receipt.gas_used,
        "transaction confirmed"
    );
    Ok(receipt)
}

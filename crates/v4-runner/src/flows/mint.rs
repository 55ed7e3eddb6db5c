use std::sync::Arc;

use anyhow::Result;
use ethers::types::{Address, U256};
use tracing::info;

use crate::abi::PythMinter;
use crate::chain::{self, Client};
use crate::hermes::HermesClient;

pub struct MintArgs {
    pub contract: Address,
    pub feed_ids: Vec<String>,
    /// Native value attached to the call to cover the on-chain Pyth
    /// update fee.
    pub fee_value: U256,
}

/// Fetches the latest signed price update for the configured feeds and
/// calls `updateAndMint` with the payloads attached.
pub async fn run(client: Arc<Client>, hermes: &HermesClient, args: MintArgs) -> Result<()> {
    let updates = hermes.latest_price_updates(&args.feed_ids).await?;
    info!(
        feeds = args.feed_ids.len(),
        bytes = updates.iter().map(|u| u.len()).sum::<usize>(),
        "retrieved Pyth price update"
    );

    let minter = PythMinter::new(args.contract, client);
    let call = minter.update_and_mint(updates).value(args.fee_value);
    let receipt = chain::send_and_confirm("updateAndMint", call).await?;

    info!(tx_hash = ?receipt.transaction_hash, "mint completed");
    Ok(())
}

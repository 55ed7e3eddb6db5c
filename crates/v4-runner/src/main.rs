mod abi;
mod chain;
mod flows;
mod hermes;

use anyhow::{anyhow, ensure, Context, Result};
use clap::{Parser, Subcommand};
use ethers::types::{Address, U256};
use ethers::utils::parse_ether;
use tracing::info;

use v4_common::{deadline_after_secs, PoolKey};

use flows::approve::{ApproveSwapArgs, RouterSwap};
use flows::mint::MintArgs;
use flows::universal::UniversalSwapArgs;
use hermes::HermesClient;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Submit Uniswap V4 swaps and Pyth-backed mints to EVM test networks"
)]
struct Cli {
    /// JSON-RPC endpoint of the target chain
    #[arg(long, env = "RPC_URL")]
    rpc_url: String,

    /// Hex-encoded private key of the submitting wallet
    #[arg(long, env = "PRIVATE_KEY", hide_env_values = true)]
    private_key: String,

    /// Pyth Hermes price service endpoint
    #[arg(long, env = "HERMES_URL", default_value = hermes::DEFAULT_HERMES_URL)]
    hermes_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch a Pyth price update and call updateAndMint on the mint contract
    Mint {
        /// Mint contract address
        #[arg(long, env = "DEPLOYMENT_ADDRESS")]
        contract: Address,

        /// Pyth price feed id (e.g. the ETH/USD feed)
        #[arg(long, env = "ETH_USD_ID")]
        feed_id: String,

        /// Native value attached to cover the Pyth update fee, in ether
        #[arg(long, default_value = "0.0005")]
        fee_eth: String,
    },

    /// Swap through the Universal Router with an encoded V4 action plan
    Swap {
        /// Universal Router address
        #[arg(long, env = "UNIVERSAL_ROUTER_ADDRESS")]
        router: Address,

        /// Pool currency0 (the zero address for the native currency)
        #[arg(long)]
        currency0: Address,

        /// Pool currency1
        #[arg(long)]
        currency1: Address,

        /// Pool fee tier in hundredths of a bip
        #[arg(long, default_value_t = 3000)]
        fee: u32,

        #[arg(long, default_value_t = 60)]
        tick_spacing: i32,

        /// Hook contract attached to the pool
        #[arg(long, default_value = "0x0000000000000000000000000000000000000000")]
        hooks: Address,

        /// Swap currency1 for currency0 instead of currency0 for currency1
        #[arg(long, default_value_t = false)]
        one_for_zero: bool,

        /// Input amount in ether units
        #[arg(long, default_value = "0.0001")]
        amount_in: String,

        /// Minimum acceptable output in base units (0 disables slippage protection)
        #[arg(long, default_value = "0")]
        amount_out_minimum: String,

        /// Seconds until the router deadline expires
        #[arg(long, default_value_t = 3600)]
        deadline_secs: u64,

        /// Pyth price feed id whose latest update is forwarded as hook data
        #[arg(long)]
        feed_id: Option<String>,
    },

    /// Approve both pool currencies, then swap directly on a V4 swap router
    ApproveSwap {
        /// V4 swap router address
        #[arg(long, env = "SWAP_ROUTER_ADDRESS")]
        router: Address,

        #[arg(long)]
        currency0: Address,

        #[arg(long)]
        currency1: Address,

        #[arg(long, default_value_t = 3000)]
        fee: u32,

        #[arg(long, default_value_t = 60)]
        tick_spacing: i32,

        #[arg(long, default_value = "0x0000000000000000000000000000000000000000")]
        hooks: Address,

        /// Swap currency1 for currency0 instead of currency0 for currency1
        #[arg(long, default_value_t = false)]
        one_for_zero: bool,

        /// Input amount in ether units
        #[arg(long, default_value = "1")]
        amount_in: String,

        /// Minimum acceptable output in base units (0 disables slippage protection)
        #[arg(long, default_value = "0")]
        amount_out_min: String,

        /// Allowance granted to the router per pool currency, in ether units
        #[arg(long, default_value = "1000")]
        approve_amount: String,

        /// Receiver of the swap output (defaults to the wallet address)
        #[arg(long)]
        receiver: Option<Address>,

        #[arg(long, default_value_t = 30)]
        deadline_secs: u64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();

    let client = chain::connect(&cli.rpc_url, &cli.private_key).await?;
    let wallet_address = client.address();
    info!(wallet = ?wallet_address, "connected to chain");

    match cli.command {
        Command::Mint {
            contract,
            feed_id,
            fee_eth,
        } => {
            let hermes = HermesClient::new(&cli.hermes_url)?;
            flows::mint::run(
                client,
                &hermes,
                MintArgs {
                    contract,
                    feed_ids: vec![feed_id],
                    fee_value: parse_ether_amount(&fee_eth)?,
                },
            )
            .await
        }
        Command::Swap {
            router,
            currency0,
            currency1,
            fee,
            tick_spacing,
            hooks,
            one_for_zero,
            amount_in,
            amount_out_minimum,
            deadline_secs,
            feed_id,
        } => {
            let hermes = HermesClient::new(&cli.hermes_url)?;
            flows::universal::run(
                client,
                &hermes,
                UniversalSwapArgs {
                    router,
                    pool_key: PoolKey {
                        currency0,
                        currency1,
                        fee,
                        tick_spacing,
                        hooks,
                    },
                    zero_for_one: !one_for_zero,
                    amount_in: parse_ether_u128(&amount_in)?,
                    amount_out_minimum: parse_base_u128(&amount_out_minimum)?,
                    deadline_secs,
                    feed_ids: feed_id.into_iter().collect(),
                },
            )
            .await
        }
        Command::ApproveSwap {
            router,
            currency0,
            currency1,
            fee,
            tick_spacing,
            hooks,
            one_for_zero,
            amount_in,
            amount_out_min,
            approve_amount,
            receiver,
            deadline_secs,
        } => {
            flows::approve::run(
                client,
                ApproveSwapArgs {
                    swap: RouterSwap {
                        router,
                        pool_key: PoolKey {
                            currency0,
                            currency1,
                            fee,
                            tick_spacing,
                            hooks,
                        },
                        zero_for_one: !one_for_zero,
                        amount_in: parse_ether_amount(&amount_in)?,
                        amount_out_min: parse_base_amount(&amount_out_min)?,
                        hook_data: Default::default(),
                        receiver: receiver.unwrap_or(wallet_address),
                        deadline: deadline_after_secs(deadline_secs),
                    },
                    approve_amount: parse_ether_amount(&approve_amount)?,
                },
            )
            .await
        }
    }
}

fn parse_ether_amount(raw: &str) -> Result<U256> {
    parse_ether(raw).map_err(|e| anyhow!("invalid ether amount '{raw}': {e}"))
}

fn parse_base_amount(raw: &str) -> Result<U256> {
    U256::from_dec_str(raw).with_context(|| format!("invalid base-unit amount '{raw}'"))
}

fn parse_ether_u128(raw: &str) -> Result<u128> {
    let amount = parse_ether_amount(raw)?;
    ensure!(amount.bits() <= 128, "amount '{raw}' exceeds uint128");
    Ok(amount.as_u128())
}

fn parse_base_u128(raw: &str) -> Result<u128> {
    let amount = parse_base_amount(raw)?;
    ensure!(amount.bits() <= 128, "amount '{raw}' exceeds uint128");
    Ok(amount.as_u128())
}

use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use ethers::abi::{self, Token};
use ethers::types::{Address, Bytes, TransactionRequest, U256};
use ethers::utils::id;
use tracing::{info, warn};

use v4_common::{ensure_live_deadline, PoolKey};

use crate::abi::Erc20;
use crate::chain::{self, Client};

/// Function signature of the direct V4 swap router. The pool key tuple
/// widens fee/tickSpacing to uint256/int256, matching the deployed ABI.
const SWAP_EXACT_TOKENS_SIG: &str =
    "swapExactTokensForTokens(uint256,uint256,bool,(address,address,uint256,int256,address),bytes,address,uint256)";

#[derive(Debug, Clone)]
pub struct RouterSwap {
    pub router: Address,
    pub pool_key: PoolKey,
    pub zero_for_one: bool,
    pub amount_in: U256,
    pub amount_out_min: U256,
    pub hook_data: Bytes,
    pub receiver: Address,
    pub deadline: U256,
}

pub struct ApproveSwapArgs {
    pub swap: RouterSwap,
    /// Allowance granted to the router per pool currency.
    pub approve_amount: U256,
}

/// Submission seam for the approve/approve/swap sequence, so ordering
/// can be exercised without a live chain.
#[allow(async_fn_in_trait)]
pub trait SwapSink {
    async fn approve(&mut self, token: Address, spender: Address, amount: U256) -> Result<()>;
    async fn swap(&mut self, swap: &RouterSwap) -> Result<()>;
}

/// Approves both pool currencies for the router, then swaps. Each step
/// is confirmed before the next is submitted; a failed approval stops
/// the sequence before the swap is ever attempted. Allowances already
/// granted are not revoked on failure.
pub async fn run_swap_sequence<S: SwapSink>(
    sink: &mut S,
    swap: &RouterSwap,
    approve_amount: U256,
) -> Result<()> {
    ensure_live_deadline(swap.deadline)?;

    sink.approve(swap.pool_key.currency0, swap.router, approve_amount)
        .await
        .context("token0 approval failed")?;
    sink.approve(swap.pool_key.currency1, swap.router, approve_amount)
        .await
        .context("token1 approval failed")?;
    sink.swap(swap).await.context("router swap failed")?;

    Ok(())
}

/// ABI-encodes the `swapExactTokensForTokens` call.
pub fn swap_calldata(swap: &RouterSwap) -> Bytes {
    let mut data = id(SWAP_EXACT_TOKENS_SIG).to_vec();
    data.extend(abi::encode(&[
        Token::Uint(swap.amount_in),
        Token::Uint(swap.amount_out_min),
        Token::Bool(swap.zero_for_one),
        swap.pool_key.to_token(),
        Token::Bytes(swap.hook_data.to_vec()),
        Token::Address(swap.receiver),
        Token::Uint(swap.deadline),
    ]));
    Bytes::from(data)
}

/// Sink that submits each step as a confirmed on-chain transaction.
pub struct ChainSink {
    client: Arc<Client>,
}

impl ChainSink {
    pub fn new(client: Arc<Client>) -> Self {
        Self { client }
    }
}

impl SwapSink for ChainSink {
    async fn approve(&mut self, token: Address, spender: Address, amount: U256) -> Result<()> {
        let erc20 = Erc20::new(token, self.client.clone());
        let call = erc20.approve(spender, amount);
        let receipt = chain::send_and_confirm("approve", call).await?;
        info!(?token, ?spender, %amount, tx_hash = ?receipt.transaction_hash, "approval confirmed");
        Ok(())
    }

    async fn swap(&mut self, swap: &RouterSwap) -> Result<()> {
        let tx = TransactionRequest::new()
            .to(swap.router)
            .data(swap_calldata(swap));
        let receipt =
            chain::send_raw_and_confirm("swapExactTokensForTokens", self.client.as_ref(), tx)
                .await?;
        info!(tx_hash = ?receipt.transaction_hash, "swap completed");
        Ok(())
    }
}

/// Logs pool-currency balances, then runs the approval/swap sequence.
pub async fn run(client: Arc<Client>, args: ApproveSwapArgs) -> Result<()> {
    if args.swap.amount_out_min.is_zero() {
        warn!("amountOutMin is 0; the swap executes with no slippage protection");
    }

    for token in [args.swap.pool_key.currency0, args.swap.pool_key.currency1] {
        let erc20 = Erc20::new(token, client.clone());
        let balance = erc20
            .balance_of(args.swap.receiver)
            .call()
            .await
            .map_err(|e| anyhow!("failed to read balance of {token:?}: {e}"))?;
        info!(?token, %balance, "pool currency balance");
    }

    let mut sink = ChainSink::new(client);
    run_swap_sequence(&mut sink, &args.swap, args.approve_amount).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::bail;
    use ethers::abi::ParamType;
    use v4_common::deadline_after_secs;

    #[derive(Default)]
    struct MockSink {
        approvals: Vec<Address>,
        swaps: usize,
        fail_first_approval: bool,
    }

    impl SwapSink for MockSink {
        async fn approve(&mut self, token: Address, _spender: Address, _amount: U256) -> Result<()> {
            if self.fail_first_approval && self.approvals.is_empty() {
                bail!("approval reverted");
            }
            self.approvals.push(token);
            Ok(())
        }

        async fn swap(&mut self, _swap: &RouterSwap) -> Result<()> {
            self.swaps += 1;
            Ok(())
        }
    }

    fn sample_swap(deadline: U256) -> RouterSwap {
        RouterSwap {
            router: Address::repeat_byte(0x71),
            pool_key: PoolKey {
                currency0: Address::repeat_byte(0x0c),
                currency1: Address::repeat_byte(0x28),
                fee: 3000,
                tick_spacing: 60,
                hooks: Address::repeat_byte(0xbb),
            },
            zero_for_one: true,
            amount_in: U256::exp10(18),
            amount_out_min: U256::zero(),
            hook_data: Bytes::new(),
            receiver: Address::repeat_byte(0x23),
            deadline,
        }
    }

    #[tokio::test]
    async fn approvals_precede_swap() {
        let swap = sample_swap(deadline_after_secs(30));
        let mut sink = MockSink::default();

        run_swap_sequence(&mut sink, &swap, U256::exp10(21))
            .await
            .unwrap();

        assert_eq!(
            sink.approvals,
            vec![swap.pool_key.currency0, swap.pool_key.currency1]
        );
        assert_eq!(sink.swaps, 1);
    }

    #[tokio::test]
    async fn failed_first_approval_stops_the_sequence() {
        let swap = sample_swap(deadline_after_secs(30));
        let mut sink = MockSink {
            fail_first_approval: true,
            ..MockSink::default()
        };

        let err = run_swap_sequence(&mut sink, &swap, U256::exp10(21))
            .await
            .unwrap_err();

        assert!(err.to_string().contains("token0 approval failed"));
        assert!(sink.approvals.is_empty());
        assert_eq!(sink.swaps, 0);
    }

    #[tokio::test]
    async fn expired_deadline_stops_before_any_submission() {
        let swap = sample_swap(U256::one());
        let mut sink = MockSink::default();

        assert!(run_swap_sequence(&mut sink, &swap, U256::exp10(21))
            .await
            .is_err());
        assert!(sink.approvals.is_empty());
        assert_eq!(sink.swaps, 0);
    }

    #[test]
    fn swap_calldata_encodes_selector_and_arguments() {
        let swap = sample_swap(U256::from(1_700_000_000u64));
        let data = swap_calldata(&swap);

        assert_eq!(&data[0..4], id(SWAP_EXACT_TOKENS_SIG).as_slice());

        let pool_key = ParamType::Tuple(vec![
            ParamType::Address,
            ParamType::Address,
            ParamType::Uint(256),
            ParamType::Int(256),
            ParamType::Address,
        ]);
        let decoded = abi::decode(
            &[
                ParamType::Uint(256),
                ParamType::Uint(256),
                ParamType::Bool,
                pool_key,
                ParamType::Bytes,
                ParamType::Address,
                ParamType::Uint(256),
            ],
            &data[4..],
        )
        .unwrap();

        assert_eq!(decoded[0], Token::Uint(swap.amount_in));
        assert_eq!(decoded[2], Token::Bool(true));
        assert_eq!(decoded[5], Token::Address(swap.receiver));
        assert_eq!(decoded[6], Token::Uint(swap.deadline));
    }
}

use std::sync::Arc;

use anyhow::Result;
use ethers::types::{Address, Bytes, U256};
use ethers::utils::hex;
use tracing::{info, warn};

use v4_common::{
    deadline_after_secs, ensure_live_deadline, CommandType, PoolKey, RoutePlanner, SwapExactInSingle,
    V4Planner,
};

use crate::abi::UniversalRouter;
use crate::chain::{self, Client};
use crate::hermes::HermesClient;

pub struct UniversalSwapArgs {
    pub router: Address,
    pub pool_key: PoolKey,
    pub zero_for_one: bool,
    pub amount_in: u128,
    pub amount_out_minimum: u128,
    pub deadline_secs: u64,
    /// Price feeds whose latest update is forwarded to the pool hook.
    pub feed_ids: Vec<String>,
}

/// The fully encoded `(commands, inputs, deadline)` triple plus the
/// native value to attach, ready for `UniversalRouter.execute`.
#[derive(Debug)]
pub struct RouterExecution {
    pub commands: Bytes,
    pub inputs: Vec<Bytes>,
    pub deadline: U256,
    pub value: U256,
}

/// Builds the V4 action plan for an exact-input single swap and wraps
/// it in a `V4_SWAP` router command.
///
/// Settlement is order-dependent: the swap must come first, then the
/// input currency is settled, then the output currency taken.
pub fn build_execution(swap: &SwapExactInSingle, deadline: U256) -> Result<RouterExecution> {
    ensure_live_deadline(deadline)?;

    let mut planner = V4Planner::new();
    planner.add_swap_exact_in_single(swap)?;
    planner.add_settle_all(swap.input_currency(), U256::from(swap.amount_in))?;
    planner.add_take_all(swap.output_currency(), U256::from(swap.amount_out_minimum))?;
    let encoded_actions = planner.finalize()?;

    let mut route = RoutePlanner::new();
    route.add_command(CommandType::V4Swap, encoded_actions);
    let (commands, inputs) = route.into_parts();

    Ok(RouterExecution {
        commands,
        inputs,
        deadline,
        value: swap.attached_value(),
    })
}

/// Performs a Uniswap V4 swap through the Universal Router, optionally
/// forwarding a Pyth price update as hook data.
pub async fn run(client: Arc<Client>, hermes: &HermesClient, args: UniversalSwapArgs) -> Result<()> {
    let hook_data = if args.feed_ids.is_empty() {
        Bytes::new()
    } else {
        let mut payloads = hermes.latest_price_updates(&args.feed_ids).await?;
        info!(
            feeds = args.feed_ids.len(),
            bytes = payloads[0].len(),
            "retrieved Pyth price update for hook data"
        );
        payloads.remove(0)
    };

    if args.amount_out_minimum == 0 {
        warn!("amountOutMinimum is 0; the swap executes with no slippage protection");
    }

    let swap = SwapExactInSingle {
        pool_key: args.pool_key,
        zero_for_one: args.zero_for_one,
        amount_in: args.amount_in,
        amount_out_minimum: args.amount_out_minimum,
        hook_data,
    };

    let deadline = deadline_after_secs(args.deadline_secs);
    let execution = build_execution(&swap, deadline)?;
    info!(
        commands = %format!("0x{}", hex::encode(&execution.commands)),
        inputs = execution.inputs.len(),
        deadline = %execution.deadline,
        value = %execution.value,
        "built universal router execution"
    );

    let router = UniversalRouter::new(args.router, client);
    let call = router
        .execute(execution.commands, execution.inputs, execution.deadline)
        .value(execution.value);
    let receipt = chain::send_and_confirm("universal router execute", call).await?;

    info!(tx_hash = ?receipt.transaction_hash, "swap completed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hermes::PriceUpdateResponse;
    use ethers::utils::parse_ether;
    use serde_json::json;
    use v4_common::{decode_finalized, unix_now, DeadlineError, V4Action};

    fn native_pool() -> PoolKey {
        PoolKey {
            currency0: Address::zero(),
            currency1: "0x1c7D4B196Cb0C7B01d743Fbc6116a902379C7238"
                .parse()
                .unwrap(),
            fee: 3000,
            tick_spacing: 60,
            hooks: "0x16303a8923f56eB57843a856ACf2FCEC80adcac0"
                .parse()
                .unwrap(),
        }
    }

    fn mocked_hook_data() -> Bytes {
        // Mocked Hermes response for the ETH/USD feed.
        let response: PriceUpdateResponse = serde_json::from_value(json!({
            "binary": {"encoding": "hex", "data": ["deadbeef"]},
            "parsed": [
                {"id": "ff61491a931112ddf1bd8147cd1b641375f79f5825126d665480874634fd0ace"}
            ]
        }))
        .unwrap();
        response.update_payloads().unwrap().remove(0)
    }

    #[test]
    fn native_input_swap_plans_three_actions_and_attaches_value() {
        let amount_in: u128 = parse_ether("0.0001").unwrap().as_u128();
        let swap = SwapExactInSingle {
            pool_key: native_pool(),
            zero_for_one: true,
            amount_in,
            amount_out_minimum: 0,
            hook_data: mocked_hook_data(),
        };

        let execution = build_execution(&swap, deadline_after_secs(3600)).unwrap();

        assert_eq!(execution.commands.to_vec(), vec![0x10]);
        assert_eq!(execution.inputs.len(), 1);
        assert_eq!(execution.value, U256::from(amount_in));

        let decoded = decode_finalized(&execution.inputs[0]).unwrap();
        let kinds: Vec<V4Action> = decoded.iter().map(|(kind, _)| *kind).collect();
        assert_eq!(
            kinds,
            vec![
                V4Action::SwapExactInSingle,
                V4Action::SettleAll,
                V4Action::TakeAll
            ]
        );
    }

    #[test]
    fn erc20_input_swap_attaches_no_value() {
        let swap = SwapExactInSingle {
            pool_key: PoolKey {
                currency0: Address::repeat_byte(0x0c),
                ..native_pool()
            },
            zero_for_one: true,
            amount_in: 1_000_000,
            amount_out_minimum: 0,
            hook_data: Bytes::new(),
        };

        let execution = build_execution(&swap, deadline_after_secs(3600)).unwrap();
        assert_eq!(execution.value, U256::zero());
    }

    #[test]
    fn expired_deadline_fails_before_submission() {
        let swap = SwapExactInSingle {
            pool_key: native_pool(),
            zero_for_one: true,
            amount_in: 1,
            amount_out_minimum: 0,
            hook_data: Bytes::new(),
        };

        let err = build_execution(&swap, U256::from(unix_now().saturating_sub(60))).unwrap_err();
        assert!(err.root_cause().downcast_ref::<DeadlineError>().is_some());
    }
}

use ethers::abi::Token;
use ethers::types::{Address, Bytes, I256, U256};
use serde::{Deserialize, Serialize};

/// Identifies a Uniswap V4 liquidity venue: currency pair, fee tier,
/// tick spacing and optional hook contract.
///
/// No internal consistency check (e.g. currency ordering) is performed
/// here; the pool manager rejects malformed keys on-chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoolKey {
    pub currency0: Address,
    pub currency1: Address,
    /// Fee tier in hundredths of a bip (3000 = 0.3%).
    pub fee: u32,
    pub tick_spacing: i32,
    pub hooks: Address,
}

impl PoolKey {
    pub fn to_token(&self) -> Token {
        Token::Tuple(vec![
            Token::Address(self.currency0),
            Token::Address(self.currency1),
            Token::Uint(U256::from(self.fee)),
            Token::Int(I256::from(self.tick_spacing).into_raw()),
            Token::Address(self.hooks),
        ])
    }
}

/// Parameters for a single-hop exact-input swap, mirroring the
/// `IV4Router.ExactInputSingleParams` struct.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapExactInSingle {
    pub pool_key: PoolKey,
    pub zero_for_one: bool,
    pub amount_in: u128,
    pub amount_out_minimum: u128,
    /// Opaque bytes forwarded to the pool's hook contract.
    pub hook_data: Bytes,
}

impl SwapExactInSingle {
    /// The currency paid into the pool for this swap direction.
    pub fn input_currency(&self) -> Address {
        if self.zero_for_one {
            self.pool_key.currency0
        } else {
            self.pool_key.currency1
        }
    }

    /// The currency received from the pool for this swap direction.
    pub fn output_currency(&self) -> Address {
        if self.zero_for_one {
            self.pool_key.currency1
        } else {
            self.pool_key.currency0
        }
    }

    /// V4 represents the chain's native currency as the zero address.
    pub fn has_native_input(&self) -> bool {
        self.input_currency().is_zero()
    }

    /// Native value that must accompany the router call: the full input
    /// amount for native-currency swaps, zero for ERC-20 inputs.
    pub fn attached_value(&self) -> U256 {
        if self.has_native_input() {
            U256::from(self.amount_in)
        } else {
            U256::zero()
        }
    }

    pub fn to_token(&self) -> Token {
        Token::Tuple(vec![
            self.pool_key.to_token(),
            Token::Bool(self.zero_for_one),
            Token::Uint(U256::from(self.amount_in)),
            Token::Uint(U256::from(self.amount_out_minimum)),
            Token::Bytes(self.hook_data.to_vec()),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pool(currency0: Address, currency1: Address) -> PoolKey {
        PoolKey {
            currency0,
            currency1,
            fee: 3000,
            tick_spacing: 60,
            hooks: Address::zero(),
        }
    }

    fn swap(zero_for_one: bool) -> SwapExactInSingle {
        SwapExactInSingle {
            pool_key: pool(Address::zero(), Address::repeat_byte(0x22)),
            zero_for_one,
            amount_in: 100_000_000_000_000,
            amount_out_minimum: 0,
            hook_data: Bytes::new(),
        }
    }

    #[test]
    fn native_input_attaches_amount_in() {
        let swap = swap(true);
        assert!(swap.has_native_input());
        assert_eq!(swap.attached_value(), U256::from(swap.amount_in));
    }

    #[test]
    fn erc20_input_attaches_nothing() {
        let swap = swap(false);
        assert!(!swap.has_native_input());
        assert_eq!(swap.attached_value(), U256::zero());
    }

    #[test]
    fn direction_selects_currencies() {
        let forward = swap(true);
        assert_eq!(forward.input_currency(), forward.pool_key.currency0);
        assert_eq!(forward.output_currency(), forward.pool_key.currency1);

        let reverse = swap(false);
        assert_eq!(reverse.input_currency(), reverse.pool_key.currency1);
        assert_eq!(reverse.output_currency(), reverse.pool_key.currency0);
    }

    #[test]
    fn negative_tick_spacing_encodes_twos_complement() {
        let key = PoolKey {
            tick_spacing: -60,
            ..pool(Address::zero(), Address::repeat_byte(0x22))
        };
        let Token::Tuple(fields) = key.to_token() else {
            panic!("pool key must encode as a tuple");
        };
        let Token::Int(raw) = &fields[3] else {
            panic!("tick spacing must encode as int");
        };
        assert_eq!(I256::from_raw(*raw), I256::from(-60));
    }

    #[test]
    fn pool_key_serializes_camel_case() {
        let value = serde_json::to_value(pool(Address::zero(), Address::repeat_byte(0x22))).unwrap();
        assert!(value.get("tickSpacing").is_some());
        assert!(value.get("currency0").is_some());
    }
}

use ethers::abi::{self, ParamType, Token};
use ethers::types::{Address, Bytes, U256};
use thiserror::Error;

use crate::pool::SwapExactInSingle;

/// V4 router action identifiers, matching the v4-periphery `Actions`
/// constants for the subset of actions the runner uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum V4Action {
    SwapExactInSingle = 0x06,
    SettleAll = 0x0c,
    TakeAll = 0x0f,
}

impl V4Action {
    pub fn byte(self) -> u8 {
        self as u8
    }

    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0x06 => Some(V4Action::SwapExactInSingle),
            0x0c => Some(V4Action::SettleAll),
            0x0f => Some(V4Action::TakeAll),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            V4Action::SwapExactInSingle => "swap_exact_in_single",
            V4Action::SettleAll => "settle_all",
            V4Action::TakeAll => "take_all",
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PlanError {
    /// Finalize is terminal: the serialized plan must be used unchanged,
    /// so neither further actions nor a second finalize are accepted.
    #[error("action plan already finalized")]
    AlreadyFinalized,
    #[error("malformed action payload: {0}")]
    Malformed(String),
}

/// Accumulates V4 actions in caller order and serializes them once.
///
/// The order of `add_*` calls is semantically meaningful: settlement on
/// chain happens in exactly the sequence encoded here (swap before
/// settle before take for an exact-input swap).
#[derive(Debug, Default)]
pub struct V4Planner {
    actions: Vec<u8>,
    params: Vec<Bytes>,
    finalized: bool,
}

impl V4Planner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an exact-input single-hop swap action.
    pub fn add_swap_exact_in_single(&mut self, swap: &SwapExactInSingle) -> Result<(), PlanError> {
        let params = abi::encode(&[swap.to_token()]);
        self.push(V4Action::SwapExactInSingle, params)
    }

    /// Appends a settle action paying at most `max_amount` of `currency`
    /// into the pool manager.
    pub fn add_settle_all(&mut self, currency: Address, max_amount: U256) -> Result<(), PlanError> {
        let params = abi::encode(&[Token::Address(currency), Token::Uint(max_amount)]);
        self.push(V4Action::SettleAll, params)
    }

    /// Appends a take action collecting at least `min_amount` of
    /// `currency` owed to the caller.
    pub fn add_take_all(&mut self, currency: Address, min_amount: U256) -> Result<(), PlanError> {
        let params = abi::encode(&[Token::Address(currency), Token::Uint(min_amount)]);
        self.push(V4Action::TakeAll, params)
    }

    fn push(&mut self, action: V4Action, params: Vec<u8>) -> Result<(), PlanError> {
        if self.finalized {
            return Err(PlanError::AlreadyFinalized);
        }
        self.actions.push(action.byte());
        self.params.push(Bytes::from(params));
        Ok(())
    }

    /// Packed action identifier bytes, one per action, in insertion order.
    pub fn actions(&self) -> &[u8] {
        &self.actions
    }

    /// ABI-encoded parameter blob per action, parallel to `actions()`.
    pub fn params(&self) -> &[Bytes] {
        &self.params
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Serializes the accumulated sequence into
    /// `abi.encode(bytes actions, bytes[] params)` and seals the planner.
    pub fn finalize(&mut self) -> Result<Bytes, PlanError> {
        if self.finalized {
            return Err(PlanError::AlreadyFinalized);
        }
        self.finalized = true;
        let encoded = abi::encode(&[
            Token::Bytes(self.actions.clone()),
            Token::Array(
                self.params
                    .iter()
                    .map(|params| Token::Bytes(params.to_vec()))
                    .collect(),
            ),
        ]);
        Ok(Bytes::from(encoded))
    }
}

/// Recovers the ordered `(action, params)` sequence from a finalized
/// plan payload.
pub fn decode_finalized(payload: &Bytes) -> Result<Vec<(V4Action, Bytes)>, PlanError> {
    let mut tokens = abi::decode(
        &[
            ParamType::Bytes,
            ParamType::Array(Box::new(ParamType::Bytes)),
        ],
        payload,
    )
    .map_err(|err| PlanError::Malformed(err.to_string()))?;

    let params = match tokens.pop() {
        Some(Token::Array(entries)) => entries,
        _ => return Err(PlanError::Malformed("missing params array".to_string())),
    };
    let actions = match tokens.pop() {
        Some(Token::Bytes(bytes)) => bytes,
        _ => return Err(PlanError::Malformed("missing actions bytes".to_string())),
    };

    if actions.len() != params.len() {
        return Err(PlanError::Malformed(format!(
            "{} action bytes but {} parameter entries",
            actions.len(),
            params.len()
        )));
    }

    actions
        .into_iter()
        .zip(params)
        .map(|(byte, params)| {
            let action = V4Action::from_byte(byte)
                .ok_or_else(|| PlanError::Malformed(format!("unknown action byte {byte:#04x}")))?;
            let params = match params {
                Token::Bytes(bytes) => Bytes::from(bytes),
                _ => return Err(PlanError::Malformed("non-bytes parameter entry".to_string())),
            };
            Ok((action, params))
        })
        .collect()
}

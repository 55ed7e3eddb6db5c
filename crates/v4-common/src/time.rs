use chrono::Utc;
use ethers::types::U256;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DeadlineError {
    #[error("deadline {deadline} is not after the current time {now}")]
    Expired { deadline: U256, now: u64 },
}

/// Returns the current unix timestamp in seconds.
pub fn unix_now() -> u64 {
    Utc::now().timestamp().max(0) as u64
}

/// Absolute unix deadline `secs` seconds from now.
pub fn deadline_after_secs(secs: u64) -> U256 {
    U256::from(unix_now() + secs)
}

/// Rejects a deadline at or before the current time before any
/// transaction is built, so an expired deadline surfaces as a
/// configuration error rather than an on-chain revert.
pub fn ensure_live_deadline(deadline: U256) -> Result<(), DeadlineError> {
    let now = unix_now();
    if deadline <= U256::from(now) {
        return Err(DeadlineError::Expired { deadline, now });
    }
    Ok(())
}

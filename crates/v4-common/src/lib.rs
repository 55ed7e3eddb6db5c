pub mod commands;
pub mod plan;
pub mod pool;
pub mod time;

pub use commands::{CommandType, RoutePlanner};
pub use plan::{decode_finalized, PlanError, V4Action, V4Planner};
pub use pool::{PoolKey, SwapExactInSingle};
pub use time::{deadline_after_secs, ensure_live_deadline, unix_now, DeadlineError};

pub mod approve;
pub mod mint;
pub mod universal;

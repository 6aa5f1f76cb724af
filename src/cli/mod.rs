pub mod rebalance;
pub mod refresh;
pub mod setup;
pub mod shares;
pub mod show;
pub mod ui;

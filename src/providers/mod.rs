pub mod manual;
pub mod util;
pub mod yahoo_finance;

pub use manual::{ManualBalanceSource, ManualPriceSource};
pub use yahoo_finance::YahooPriceSource;

use super::ui::{self, DISPLAY_PRECISION};
use crate::core::WeightedIndex;
use crate::core::fixed::{self, PRICE_DECIMALS};
use anyhow::Result;
use comfy_table::Cell;
use primitive_types::U256;

fn format_price(price: U256) -> String {
    fixed::format_fixed(price, PRICE_DECIMALS, DISPLAY_PRECISION)
}

/// Pulls fresh prices into the cache and prints old and new prices.
pub async fn run(index: &WeightedIndex) -> Result<()> {
    let before = index.snapshot().await.portfolio;

    let pb = ui::new_spinner("Fetching prices...");
    let result = index.refresh_prices().await;
    pb.finish_and_clear();
    result?;

    let after = index.snapshot().await.portfolio;
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Asset"),
        ui::header_cell("Previous Price"),
        ui::header_cell("Price"),
    ]);
    for (old, new) in before.entries().iter().zip(after.entries()) {
        table.add_row(vec![
            Cell::new(new.asset.as_str()),
            ui::number_cell(format_price(old.cached_price)),
            ui::number_cell(format_price(new.cached_price)),
        ]);
    }
    println!("{table}");
    println!(
        "{}",
        ui::style_text(
            &format!("Prices cached at revision {}", after.revision()),
            ui::StyleType::Subtle
        )
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_price_uses_display_precision() {
        let price = fixed::parse_decimal("150.123456", PRICE_DECIMALS).unwrap();
        assert_eq!(format_price(price), "150.1234");
        assert_eq!(format_price(U256::zero()), "0.0000");
    }
}

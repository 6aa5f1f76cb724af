use super::show::SHARE_DECIMALS;
use super::ui::{self, DISPLAY_PRECISION};
use crate::core::fixed;
use crate::core::{Holder, WeightedIndex};
use anyhow::{Context, Result};

fn parse_shares(amount: &str) -> Result<primitive_types::U256> {
    fixed::parse_decimal(amount, SHARE_DECIMALS)
        .with_context(|| format!("Invalid share amount: {amount}"))
}

pub async fn mint(index: &WeightedIndex, holder: &str, amount: &str) -> Result<()> {
    let holder = Holder::new(holder);
    index.mint(parse_shares(amount)?, &holder).await?;
    print_balance(index, &holder).await;
    Ok(())
}

pub async fn burn(index: &WeightedIndex, holder: &str, amount: &str) -> Result<()> {
    let holder = Holder::new(holder);
    index.burn(parse_shares(amount)?, &holder).await?;
    print_balance(index, &holder).await;
    Ok(())
}

async fn print_balance(index: &WeightedIndex, holder: &Holder) {
    let balance = index.share_balance(holder).await;
    let supply = index.total_supply().await;
    println!(
        "{} {}",
        ui::style_text(&format!("{holder}:"), ui::StyleType::TotalLabel),
        ui::style_text(
            &fixed::format_fixed(balance, SHARE_DECIMALS, DISPLAY_PRECISION),
            ui::StyleType::TotalValue
        ),
    );
    println!(
        "{}",
        ui::style_text(
            &format!(
                "Total supply {}",
                fixed::format_fixed(supply, SHARE_DECIMALS, DISPLAY_PRECISION)
            ),
            ui::StyleType::Subtle
        )
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use primitive_types::U256;

    #[test]
    fn test_parse_shares() {
        assert_eq!(
            parse_shares("1.5").unwrap(),
            U256::from(15u64) * U256::exp10(17)
        );
        let err = parse_shares("-2").unwrap_err();
        assert!(err.to_string().contains("Invalid share amount: -2"));
    }
}

use super::ui;
use crate::core::fixed;
use crate::core::{PortfolioState, WeightedIndex};
use anyhow::{Context, Result};
use comfy_table::Cell;

/// Reweights the index from cached prices and prints the weight changes.
pub async fn run(index: &WeightedIndex) -> Result<()> {
    let before = index.snapshot().await.portfolio;
    index.rebalance().await?;
    let after = index.snapshot().await.portfolio;
    print_changes(&before, &after, "Rebalanced");
    Ok(())
}

/// Assigns weights by hand, e.g. `6000,4000` for a 60/40 split.
pub async fn set_weights(index: &WeightedIndex, weights: &str) -> Result<()> {
    let weights = parse_weights(weights)?;
    let before = index.snapshot().await.portfolio;
    index.set_weights(weights).await?;
    let after = index.snapshot().await.portfolio;
    print_changes(&before, &after, "Weights set");
    Ok(())
}

fn parse_weights(text: &str) -> Result<Vec<u16>> {
    text.split(',')
        .map(|w| {
            w.trim()
                .parse::<u16>()
                .with_context(|| format!("Invalid weight in basis points: {w}"))
        })
        .collect()
}

fn print_changes(before: &PortfolioState, after: &PortfolioState, what: &str) {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Asset"),
        ui::header_cell("Previous Weight"),
        ui::header_cell("Weight"),
        ui::header_cell("Change"),
    ]);
    for (old, new) in before.entries().iter().zip(after.entries()) {
        table.add_row(vec![
            Cell::new(new.asset.as_str()),
            ui::number_cell(fixed::format_bps(old.weight)),
            ui::number_cell(fixed::format_bps(new.weight)),
            ui::weight_change_cell(old.weight, new.weight),
        ]);
    }
    println!("{table}");
    println!(
        "{}",
        ui::style_text(
            &format!(
                "{what} at revision {} (weight sum {} bps)",
                after.revision(),
                after.weight_sum()
            ),
            ui::StyleType::Subtle
        )
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_weights() {
        assert_eq!(parse_weights("6000, 4000").unwrap(), vec![6000, 4000]);
        assert_eq!(parse_weights("10000").unwrap(), vec![10_000]);

        let err = parse_weights("6000,forty").unwrap_err();
        assert!(err.to_string().contains("Invalid weight in basis points: forty"));
        assert!(parse_weights("70000,0").is_err());
    }
}

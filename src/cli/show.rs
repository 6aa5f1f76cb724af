use super::ui::{self, DISPLAY_PRECISION};
use crate::core::config::IndexConfig;
use crate::core::fixed::{self, PRICE_DECIMALS};
use crate::core::{IndexSnapshot, WeightedIndex, valuation};
use anyhow::Result;
use comfy_table::Cell;
use primitive_types::U256;

/// Decimal places of index shares as entered on the command line.
pub const SHARE_DECIMALS: u32 = 18;

/// A consistent view of one index revision together with current holdings.
pub struct IndexView {
    pub name: String,
    pub snapshot: IndexSnapshot,
    pub balances: Vec<U256>,
    pub balance_decimals: u32,
}

impl IndexView {
    pub async fn collect(index: &WeightedIndex, config: &IndexConfig) -> Result<Self> {
        let snapshot = index.snapshot().await;
        let balances = index.balances().await?;
        Ok(Self {
            name: config.name.clone(),
            snapshot,
            balances,
            balance_decimals: config.balance_decimals,
        })
    }

    fn value_decimals(&self) -> u32 {
        PRICE_DECIMALS + self.balance_decimals
    }

    pub fn display_as_table(&self) -> String {
        let mut table = ui::new_styled_table();
        table.set_header(vec![
            ui::header_cell("Asset"),
            ui::header_cell("Weight"),
            ui::header_cell("Price"),
            ui::header_cell("Balance"),
            ui::header_cell("Weighted Value"),
        ]);

        let entries = self.snapshot.portfolio.entries();
        for (entry, balance) in entries.iter().zip(&self.balances) {
            let weighted = match valuation::index_value(std::slice::from_ref(entry), &[*balance]) {
                Ok(v) => ui::number_cell(fixed::format_fixed(
                    v,
                    self.value_decimals(),
                    DISPLAY_PRECISION,
                )),
                Err(e) => Cell::new(ui::style_text(&e.to_string(), ui::StyleType::Error)),
            };
            table.add_row(vec![
                Cell::new(entry.asset.as_str()),
                ui::number_cell(fixed::format_bps(entry.weight)),
                ui::number_cell(fixed::format_fixed(
                    entry.cached_price,
                    PRICE_DECIMALS,
                    DISPLAY_PRECISION,
                )),
                ui::number_cell(fixed::format_fixed(
                    *balance,
                    self.balance_decimals,
                    DISPLAY_PRECISION,
                )),
                weighted,
            ]);
        }

        let portfolio = &self.snapshot.portfolio;
        let value = match valuation::index_value(portfolio.entries(), &self.balances) {
            Ok(v) => ui::style_text(
                &fixed::format_fixed(v, self.value_decimals(), DISPLAY_PRECISION),
                ui::StyleType::TotalValue,
            ),
            Err(e) => ui::style_text(&e.to_string(), ui::StyleType::Error),
        };
        let refreshed = portfolio
            .refreshed_at()
            .map_or_else(|| "never".to_string(), |t| t.to_rfc3339());

        format!(
            "{}\n{}\n{} {}\n{}",
            ui::style_text(&self.name, ui::StyleType::Title),
            table,
            ui::style_text("Index Value:", ui::StyleType::TotalLabel),
            value,
            ui::style_text(
                &format!(
                    "revision {} · weight sum {} bps · prices refreshed {} · share supply {}",
                    portfolio.revision(),
                    portfolio.weight_sum(),
                    refreshed,
                    fixed::format_fixed(
                        self.snapshot.ledger.total_supply(),
                        SHARE_DECIMALS,
                        DISPLAY_PRECISION
                    ),
                ),
                ui::StyleType::Subtle
            ),
        )
    }

    /// Share holders table, `None` when nothing is issued.
    pub fn display_holders(&self) -> Option<String> {
        let mut holders = self.snapshot.ledger.holders().peekable();
        holders.peek()?;

        let mut table = ui::new_styled_table();
        table.set_header(vec![ui::header_cell("Holder"), ui::header_cell("Shares")]);
        for (holder, shares) in holders {
            table.add_row(vec![
                Cell::new(holder.as_str()),
                ui::number_cell(fixed::format_fixed(
                    *shares,
                    SHARE_DECIMALS,
                    DISPLAY_PRECISION,
                )),
            ]);
        }
        Some(table.to_string())
    }
}

pub async fn run(index: &WeightedIndex, config: &IndexConfig) -> Result<()> {
    let view = IndexView::collect(index, config).await?;
    println!("{}", view.display_as_table());
    if let Some(holders) = view.display_holders() {
        println!("\n{holders}");
    }
    Ok(())
}

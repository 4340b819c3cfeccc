//! Realized profit and loss for a single leg, net of slippage and charges.

use std::fmt;

/// Side of a single leg.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Buy,
    Sell,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Buy => write!(f, "buy"),
            Direction::Sell => write!(f, "sell"),
        }
    }
}

/// Lot size, flat charges and slippage applied to every leg.
#[derive(Debug, Clone, PartialEq)]
pub struct CostModel {
    pub lot_size: f64,
    pub charges_per_trade: f64,
    /// Fraction of price lost to slippage on each fill, e.g. 0.001 for 0.1%.
    pub slippage: f64,
}

impl Default for CostModel {
    fn default() -> Self {
        CostModel {
            lot_size: 25.0,
            charges_per_trade: 150.0,
            slippage: 0.001,
        }
    }
}

/// Round to two decimal places on the exact binary value, ties to even.
///
/// Formatting rounds the true decimal expansion of `value`, so `0.125`
/// becomes `0.12` and `1.005` (stored just below) becomes `1.0`.
pub fn round2(value: f64) -> f64 {
    format!("{value:.2}").parse().unwrap_or(value)
}

/// Entry fill: buys pay up, sells receive less.
pub fn apply_slippage_entry(price: f64, direction: Direction, slippage: f64) -> f64 {
    match direction {
        Direction::Buy => price * (1.0 + slippage),
        Direction::Sell => price * (1.0 - slippage),
    }
}

/// Exit fill: a long sells lower, a short buys back higher.
pub fn apply_slippage_exit(price: f64, direction: Direction, slippage: f64) -> f64 {
    match direction {
        Direction::Buy => price * (1.0 - slippage),
        Direction::Sell => price * (1.0 + slippage),
    }
}

/// Net PnL of one leg: slippage-adjusted price move times lot size, minus
/// the entry and exit charges, rounded to 2 decimals.
pub fn calculate_pnl(entry_price: f64, exit_price: f64, direction: Direction, costs: &CostModel) -> f64 {
    let entry = apply_slippage_entry(entry_price, direction, costs.slippage);
    let exit = apply_slippage_exit(exit_price, direction, costs.slippage);

    let gross = match direction {
        Direction::Buy => (exit - entry) * costs.lot_size,
        Direction::Sell => (entry - exit) * costs.lot_size,
    };

    round2(gross - 2.0 * costs.charges_per_trade)
}

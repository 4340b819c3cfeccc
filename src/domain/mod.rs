//! Core domain types and logic.

pub mod backtest;
pub mod bar;
pub mod config_validation;
pub mod error;
pub mod metrics;
pub mod pnl;
pub mod series;
pub mod simulator;
pub mod trading_day;

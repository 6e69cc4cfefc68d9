//! Pure computation engines for cap-table economics.
//!
//! Every function here is deterministic and side-effect free: inputs are
//! borrowed, never mutated, and results are fresh values.

use thiserror::Error;

pub mod convertible;
pub mod exit;
pub mod fd;
pub mod options;
pub mod purchase;
pub mod rounds;
pub mod vesting;
pub mod waterfall;

pub use convertible::{compute_convertible_amount, compute_convertible_conversion, ConvertibleConversion};
pub use exit::{
    compute_exit_snapshots, exit_holdings, ExitInputs, ExitOptionSnapshot, ExitPurchaseSnapshot,
    ExitSnapshots,
};
pub use fd::{compute_fd, compute_share_price};
pub use options::{compute_options_snapshot, grant_position, GrantPosition, OptionsSnapshot};
pub use purchase::{
    compute_purchase_plan_snapshot, generate_monthly_purchase_dates, get_monthly_amount_effective,
    get_purchase_share_price, plan_purchases, PlannedPurchase, PurchasePlanSnapshot,
};
pub use rounds::{compute_financing_rounds, FinancingRoundResult};
pub use vesting::{compute_vesting, VestingSnapshot};
pub use waterfall::{
    compute_waterfall_exit_distribution, WaterfallClassResult, WaterfallDecision,
    WaterfallExitDistribution, WaterfallHoldingResult,
};

/// Caller contract violations inside a calculation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CalcError {
    #[error("FD must be greater than zero")]
    NonPositiveFd,
    #[error("purchaseSharePriceFixed is required for fixed pricing")]
    MissingFixedPrice,
    #[error("Purchase share price must be greater than zero")]
    NonPositivePurchasePrice,
    #[error(transparent)]
    InvalidDate(#[from] crate::domain::DateError),
}

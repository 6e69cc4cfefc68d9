//! Dollar-cost-averaging purchase plans.

use crate::domain::{Decimal, Ymd};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PurchasePriceMode {
    /// Every purchase executes at `purchaseSharePriceFixed`.
    FixedSharePrice,
    /// Every purchase executes at entry equity value / entry FD.
    EntryValuationAnchored,
}

/// New monthly amount from `effective_date` onward; 0 pauses the plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContributionChange {
    pub effective_date: Ymd,
    pub monthly_amount: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchasePlan {
    pub start_date: Ymd,
    pub purchase_day_of_month: u32,
    pub monthly_amount: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contribution_changes: Option<Vec<ContributionChange>>,
    pub purchase_price_mode: PurchasePriceMode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purchase_share_price_fixed: Option<Decimal>,
}

impl PurchasePlan {
    pub fn contribution_changes(&self) -> &[ContributionChange] {
        self.contribution_changes.as_deref().unwrap_or(&[])
    }

    /// Copy with contribution changes sorted by effective date.
    pub fn normalized(&self) -> Self {
        let mut plan = self.clone();
        if let Some(changes) = plan.contribution_changes.as_mut() {
            changes.sort_by_key(|change| change.effective_date);
        }
        plan
    }
}

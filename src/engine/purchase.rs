use crate::domain::date::add_months_keep_day_clamped;
use crate::domain::{
    CapTableBase, Decimal, DilutionEvent, PurchasePlan, PurchasePriceMode, ValuationPoint, Ymd,
};
use serde::Serialize;

use super::fd::{compute_fd, compute_share_price};
use super::CalcError;

/// Every purchase date in `start..=as_of`, anchored on `day_of_month`.
///
/// The first date is `start`'s month when `start` falls on or before the
/// anchor day, otherwise the following month.
pub fn generate_monthly_purchase_dates(start: Ymd, as_of: Ymd, day_of_month: u32) -> Vec<Ymd> {
    let first_offset = if start.day() > day_of_month { 1 } else { 0 };
    let mut cursor = add_months_keep_day_clamped(start, first_offset, day_of_month);

    let mut dates = Vec::new();
    while cursor <= as_of {
        dates.push(cursor);
        cursor = add_months_keep_day_clamped(cursor, 1, day_of_month);
    }
    dates
}

/// Contribution in effect on `date`: the latest change effective on or
/// before it, else the plan's baseline amount.
pub fn get_monthly_amount_effective(plan: &PurchasePlan, date: Ymd) -> Decimal {
    let mut changes: Vec<_> = plan.contribution_changes().iter().collect();
    changes.sort_by_key(|change| change.effective_date);

    changes
        .into_iter()
        .take_while(|change| change.effective_date <= date)
        .last()
        .map_or(plan.monthly_amount, |change| change.monthly_amount)
}

/// Price every purchase of the plan executes at.
///
/// # Errors
/// `MissingFixedPrice` in fixed mode without a price, `NonPositiveFd` when
/// anchored on a non-positive entry FD.
pub fn get_purchase_share_price(
    plan: &PurchasePlan,
    entry: &ValuationPoint,
    entry_fd: Decimal,
) -> Result<Decimal, CalcError> {
    match plan.purchase_price_mode {
        PurchasePriceMode::FixedSharePrice => {
            plan.purchase_share_price_fixed.ok_or(CalcError::MissingFixedPrice)
        }
        PurchasePriceMode::EntryValuationAnchored => {
            compute_share_price(entry.equity_value, entry_fd)
        }
    }
}

/// One scheduled month of a plan. Paused months carry a zero amount.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlannedPurchase {
    pub date: Ymd,
    pub amount: Decimal,
    pub shares: Decimal,
}

impl PlannedPurchase {
    pub fn executed(&self) -> bool {
        self.amount.is_positive()
    }
}

/// Every scheduled month of `plan` through `as_of`, bought at `price`.
///
/// # Errors
/// `NonPositivePurchasePrice` when `price <= 0`.
pub fn plan_purchases(
    plan: &PurchasePlan,
    price: Decimal,
    as_of: Ymd,
) -> Result<Vec<PlannedPurchase>, CalcError> {
    if !price.is_positive() {
        return Err(CalcError::NonPositivePurchasePrice);
    }
    let purchases = generate_monthly_purchase_dates(plan.start_date, as_of, plan.purchase_day_of_month)
        .into_iter()
        .map(|date| {
            let amount = get_monthly_amount_effective(plan, date);
            let shares = if amount.is_positive() {
                amount / price
            } else {
                Decimal::ZERO
            };
            PlannedPurchase {
                date,
                amount,
                shares,
            }
        })
        .collect();
    Ok(purchases)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchasePlanSnapshot {
    pub num_purchases_executed: u32,
    pub num_months_evaluated: u32,
    pub purchase_share_price: Decimal,
    pub invested_total: Decimal,
    pub shares_total: Decimal,
    pub avg_cost: Decimal,
    pub current_share_price: Decimal,
    pub current_value: Decimal,
    pub gain: Decimal,
    pub multiple: Decimal,
}

/// Accumulated plan economics through `as_of`, marked to `current`.
///
/// # Errors
/// Propagates price failures from [`get_purchase_share_price`] and
/// `NonPositiveFd` when FD at `as_of` is not positive.
pub fn compute_purchase_plan_snapshot(
    plan: &PurchasePlan,
    entry: &ValuationPoint,
    current: &ValuationPoint,
    base: &CapTableBase,
    events: &[DilutionEvent],
    as_of: Ymd,
) -> Result<PurchasePlanSnapshot, CalcError> {
    let entry_fd = compute_fd(base, events, entry.date);
    let current_fd = compute_fd(base, events, as_of);
    let purchase_share_price = get_purchase_share_price(plan, entry, entry_fd)?;
    let purchases = plan_purchases(plan, purchase_share_price, as_of)?;

    let invested_total: Decimal = purchases.iter().map(|p| p.amount).sum();
    let shares_total: Decimal = purchases.iter().map(|p| p.shares).sum();
    let num_purchases_executed = purchases.iter().filter(|p| p.executed()).count() as u32;

    let avg_cost = if shares_total.is_positive() {
        invested_total / shares_total
    } else {
        Decimal::ZERO
    };
    let current_share_price = compute_share_price(current.equity_value, current_fd)?;
    let current_value = shares_total * current_share_price;
    let multiple = if invested_total.is_positive() {
        current_value / invested_total
    } else {
        Decimal::ZERO
    };

    Ok(PurchasePlanSnapshot {
        num_purchases_executed,
        num_months_evaluated: purchases.len() as u32,
        purchase_share_price,
        invested_total,
        shares_total,
        avg_cost,
        current_share_price,
        current_value,
        gain: current_value - invested_total,
        multiple,
    })
}

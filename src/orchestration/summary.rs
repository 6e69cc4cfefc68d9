//! Dashboard aggregation over a whole state.
//!
//! Each figure is produced only when its inputs make it computable; an
//! individual plan or grant that cannot be valued is reported as `null`
//! instead of failing the whole summary.

use crate::domain::{AppState, Decimal, Holding, Ymd};
use crate::engine::{
    compute_exit_snapshots, compute_fd, compute_options_snapshot, compute_purchase_plan_snapshot,
    compute_share_price, compute_waterfall_exit_distribution, exit_holdings,
    get_purchase_share_price, plan_purchases, ExitInputs, ExitSnapshots, OptionsSnapshot,
    PurchasePlanSnapshot, WaterfallExitDistribution,
};
use serde::Serialize;
use std::collections::BTreeMap;

/// Which prerequisites of the dashboard are met.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Readiness {
    /// FD at the current valuation date is positive.
    pub has_cap_table: bool,
    pub has_current_valuation: bool,
    /// At least one grant, plan, convertible, round, or an exit scenario.
    pub has_dashboard_inputs: bool,
}

impl Readiness {
    pub fn is_ready(&self) -> bool {
        self.has_cap_table && self.has_current_valuation && self.has_dashboard_inputs
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Totals {
    pub total_invested: Decimal,
    pub total_shares: Decimal,
    pub total_current_value: Decimal,
    pub total_gain: Decimal,
    pub multiple: Decimal,
    pub total_intrinsic: Decimal,
    pub total_exit_payout: Decimal,
}

/// Cumulative purchase position on one purchase date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelinePoint {
    pub date: Ymd,
    pub invested: Decimal,
    pub current: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exit: Option<Decimal>,
    pub shares: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardReport {
    pub fd: Decimal,
    pub entry_fd: Decimal,
    pub current_share_price: Decimal,
    pub exit_fd: Decimal,
    pub exit_share_price: Decimal,
    pub purchases: Vec<Option<PurchasePlanSnapshot>>,
    pub options: Vec<Option<OptionsSnapshot>>,
    pub totals: Totals,
    pub exit: Option<ExitSnapshots>,
    pub exit_holdings: Vec<Holding>,
    pub waterfall: Option<WaterfallExitDistribution>,
    pub timeline: Vec<TimelinePoint>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub readiness: Readiness,
    /// Present only when every prerequisite is met.
    pub report: Option<DashboardReport>,
}

pub fn readiness(state: &AppState) -> Readiness {
    let current = &state.valuations.current;
    let fd = compute_fd(&state.cap_table_base, &state.dilution_events, current.date);
    let has_instruments = !state.option_grants.is_empty()
        || !state.purchase_plans.is_empty()
        || !state.convertibles.is_empty()
        || !state.financing_rounds.is_empty();
    Readiness {
        has_cap_table: fd.is_positive(),
        has_current_valuation: current.equity_value.is_positive(),
        has_dashboard_inputs: has_instruments || state.exit_scenario.is_some(),
    }
}

fn price_or_zero(equity: Decimal, fd: Decimal) -> Decimal {
    compute_share_price(equity, fd).unwrap_or(Decimal::ZERO)
}

fn timeline(state: &AppState, current_price: Decimal, exit_price: Option<Decimal>) -> Vec<TimelinePoint> {
    let entry = &state.valuations.entry;
    if !entry.equity_value.is_positive() {
        return Vec::new();
    }
    let entry_fd = compute_fd(&state.cap_table_base, &state.dilution_events, entry.date);
    if !entry_fd.is_positive() {
        return Vec::new();
    }

    let mut by_date: BTreeMap<Ymd, (Decimal, Decimal)> = BTreeMap::new();
    for plan in &state.purchase_plans {
        let Ok(price) = get_purchase_share_price(plan, entry, entry_fd) else {
            continue;
        };
        let Ok(purchases) = plan_purchases(plan, price, state.valuations.current.date) else {
            continue;
        };
        for purchase in purchases {
            let slot = by_date.entry(purchase.date).or_default();
            slot.0 += purchase.amount;
            slot.1 += purchase.shares;
        }
    }

    let mut invested = Decimal::ZERO;
    let mut shares = Decimal::ZERO;
    by_date
        .into_iter()
        .map(|(date, (amount, bought))| {
            invested += amount;
            shares += bought;
            TimelinePoint {
                date,
                invested,
                current: shares * current_price,
                exit: exit_price.map(|price| shares * price),
                shares,
            }
        })
        .collect()
}

fn report(state: &AppState) -> DashboardReport {
    let base = &state.cap_table_base;
    let events = &state.dilution_events;
    let entry = &state.valuations.entry;
    let current = &state.valuations.current;

    let fd = compute_fd(base, events, current.date);
    let entry_fd = compute_fd(base, events, entry.date);
    let current_share_price = price_or_zero(current.equity_value, fd);
    let exit_fd = state
        .exit_scenario
        .as_ref()
        .map_or(Decimal::ZERO, |exit| compute_fd(base, events, exit.date));
    let exit_equity_value = state
        .exit_scenario
        .as_ref()
        .map_or(Decimal::ZERO, |exit| exit.exit_equity_value());
    let exit_share_price = price_or_zero(exit_equity_value, exit_fd);

    let purchases: Vec<Option<PurchasePlanSnapshot>> = state
        .purchase_plans
        .iter()
        .map(|plan| {
            if !entry_fd.is_positive() {
                return None;
            }
            compute_purchase_plan_snapshot(plan, entry, current, base, events, current.date)
                .map_err(|err| tracing::warn!(error = %err, "purchase plan not computable"))
                .ok()
        })
        .collect();

    let total_invested: Decimal = purchases.iter().flatten().map(|s| s.invested_total).sum();
    let total_shares: Decimal = purchases.iter().flatten().map(|s| s.shares_total).sum();
    let total_current_value = total_shares * current_share_price;
    let multiple = if total_invested.is_positive() {
        total_current_value / total_invested
    } else {
        Decimal::ZERO
    };

    let options: Vec<Option<OptionsSnapshot>> = state
        .option_grants
        .iter()
        .map(|grant| {
            compute_options_snapshot(grant, current, base, events, current.date)
                .map_err(|err| tracing::warn!(error = %err, "option grant not computable"))
                .ok()
        })
        .collect();
    let total_intrinsic: Decimal = options.iter().flatten().map(|s| s.intrinsic_value_vested).sum();

    let exit = state.exit_scenario.as_ref().and_then(|scenario| {
        if !exit_fd.is_positive() || !entry_fd.is_positive() {
            return None;
        }
        compute_exit_snapshots(ExitInputs::from_state(state, scenario))
            .map_err(|err| tracing::warn!(error = %err, "exit snapshots not computable"))
            .ok()
    });
    let total_exit_payout: Decimal = exit
        .iter()
        .flat_map(|snapshots| snapshots.options.iter())
        .map(|option| option.payout)
        .sum();

    let holdings_at_exit = exit_holdings(state, exit_share_price, exit_fd);
    let waterfall = (state.exit_scenario.is_some() && exit_equity_value.is_positive()).then(|| {
        compute_waterfall_exit_distribution(&state.share_classes, &holdings_at_exit, exit_equity_value)
    });

    let exit_price = state.exit_scenario.as_ref().map(|_| exit_share_price);
    let timeline = timeline(state, current_share_price, exit_price);

    DashboardReport {
        fd,
        entry_fd,
        current_share_price,
        exit_fd,
        exit_share_price,
        purchases,
        options,
        totals: Totals {
            total_invested,
            total_shares,
            total_current_value,
            total_gain: total_current_value - total_invested,
            multiple,
            total_intrinsic,
            total_exit_payout,
        },
        exit,
        exit_holdings: holdings_at_exit,
        waterfall,
        timeline,
    }
}

/// Everything the dashboard shows, or just the unmet prerequisites.
pub fn compute_dashboard_summary(state: &AppState) -> DashboardSummary {
    let readiness = readiness(state);
    let report = readiness.is_ready().then(|| report(state));
    DashboardSummary { readiness, report }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ExitScenario, OptionGrant, PurchasePlan, PurchasePriceMode};

    fn d(s: &str) -> Decimal {
        Decimal::from_str_canonical(s).unwrap()
    }

    fn ymd(s: &str) -> Ymd {
        Ymd::parse(s).unwrap()
    }

    fn state() -> AppState {
        let mut state = AppState::default();
        state.cap_table_base.common_outstanding = d("1000000");
        state.cap_table_base.option_pool_reserved = d("100000");
        state.holdings[0].shares = d("1000000");
        state.valuations.entry.equity_value = d("11000000");
        state.valuations.current.date = ymd("2024-04-01");
        state.valuations.current.equity_value = d("22000000");
        state
    }

    fn plan() -> PurchasePlan {
        PurchasePlan {
            start_date: ymd("2024-01-01"),
            purchase_day_of_month: 1,
            monthly_amount: d("100"),
            contribution_changes: None,
            purchase_price_mode: PurchasePriceMode::EntryValuationAnchored,
            purchase_share_price_fixed: None,
        }
    }

    #[test]
    fn empty_state_lists_missing_inputs() {
        let summary = compute_dashboard_summary(&AppState::default());
        assert_eq!(
            summary.readiness,
            Readiness {
                has_cap_table: false,
                has_current_valuation: false,
                has_dashboard_inputs: false,
            }
        );
        assert!(summary.report.is_none());
    }

    #[test]
    fn purchase_totals_and_timeline() {
        let mut state = state();
        state.purchase_plans.push(plan());
        let report = compute_dashboard_summary(&state).report.unwrap();

        assert_eq!(report.current_share_price, d("20"));
        let totals = &report.totals;
        assert_eq!(totals.total_invested, d("400"));
        assert_eq!(totals.total_shares, d("40"));
        assert_eq!(totals.total_current_value, d("800"));
        assert_eq!(totals.total_gain, d("400"));
        assert_eq!(totals.multiple, d("2"));

        assert_eq!(report.timeline.len(), 4);
        let last = report.timeline.last().unwrap();
        assert_eq!(last.date, ymd("2024-04-01"));
        assert_eq!(last.invested, d("400"));
        assert_eq!(last.current, d("800"));
        assert_eq!(last.exit, None);
    }

    #[test]
    fn exit_figures_and_waterfall() {
        let mut state = state();
        state.option_grants.push(OptionGrant::new(d("1000"), d("1"), ymd("2020-01-01")));
        state.exit_scenario = Some(ExitScenario::with_equity_value(ymd("2025-01-01"), d("33000000")));
        let report = compute_dashboard_summary(&state).report.unwrap();

        assert_eq!(report.exit_share_price, d("30"));
        assert_eq!(report.totals.total_exit_payout, d("29000"));
        assert_eq!(report.totals.total_intrinsic, d("19000"));
        let waterfall = report.waterfall.unwrap();
        assert_eq!(waterfall.class_payout("common"), Some(d("33000000")));
    }

    #[test]
    fn unpriceable_plan_is_null() {
        let mut state = state();
        let mut fixed = plan();
        fixed.purchase_price_mode = PurchasePriceMode::FixedSharePrice;
        state.purchase_plans.push(fixed);
        state.purchase_plans.push(plan());
        let report = compute_dashboard_summary(&state).report.unwrap();
        assert!(report.purchases[0].is_none());
        assert!(report.purchases[1].is_some());
    }
}

use crate::domain::provenance::{convertible_holder_id, CONVERTIBLE_HOLDER_PREFIX};
use crate::domain::{
    AppState, CapTableBase, Decimal, DerivedSource, DilutionEvent, ExitScenario, Holding,
    OptionGrant, PurchasePlan, ValuationPoint,
};
use serde::Serialize;
use std::collections::HashSet;

use super::convertible::compute_convertible_conversion;
use super::fd::{compute_fd, compute_share_price};
use super::options::grant_position;
use super::purchase::{get_purchase_share_price, plan_purchases};
use super::CalcError;

/// Borrowed inputs for exit reporting.
#[derive(Debug, Clone, Copy)]
pub struct ExitInputs<'a> {
    pub exit_scenario: &'a ExitScenario,
    pub option_grants: &'a [OptionGrant],
    pub purchase_plans: &'a [PurchasePlan],
    pub cap_table_base: &'a CapTableBase,
    pub dilution_events: &'a [DilutionEvent],
    pub entry_valuation: &'a ValuationPoint,
}

impl<'a> ExitInputs<'a> {
    pub fn from_state(state: &'a AppState, exit_scenario: &'a ExitScenario) -> Self {
        Self {
            exit_scenario,
            option_grants: &state.option_grants,
            purchase_plans: &state.purchase_plans,
            cap_table_base: &state.cap_table_base,
            dilution_events: &state.dilution_events,
            entry_valuation: &state.valuations.entry,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExitOptionSnapshot {
    pub grant: OptionGrant,
    pub vested_qty: Decimal,
    pub exercisable_qty: Decimal,
    pub intrinsic_per_option: Decimal,
    pub payout: Decimal,
    pub expired: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExitPurchaseSnapshot {
    pub plan: PurchasePlan,
    pub shares_total: Decimal,
    pub exit_value: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExitSnapshots {
    pub exit_fd: Decimal,
    pub exit_equity_value: Decimal,
    pub exit_share_price: Decimal,
    pub options: Vec<ExitOptionSnapshot>,
    pub purchases: Vec<ExitPurchaseSnapshot>,
}

/// Option payouts and purchase-plan values at the exit date and price.
///
/// Vesting freezes at termination and is floored by acceleration; purchases
/// accumulate through the exit date at each plan's own price.
///
/// # Errors
/// `NonPositiveFd` when exit or entry FD is not positive, plus any purchase
/// price failure.
pub fn compute_exit_snapshots(inputs: ExitInputs<'_>) -> Result<ExitSnapshots, CalcError> {
    let exit_date = inputs.exit_scenario.date;
    let exit_fd = compute_fd(inputs.cap_table_base, inputs.dilution_events, exit_date);
    let exit_equity_value = inputs.exit_scenario.exit_equity_value();
    let exit_share_price = compute_share_price(exit_equity_value, exit_fd)?;

    let options = inputs
        .option_grants
        .iter()
        .map(|grant| {
            let position = grant_position(grant, exit_date)?;
            let intrinsic_per_option = (exit_share_price - grant.strike_price).max_zero();
            let payout = if position.expired {
                Decimal::ZERO
            } else {
                intrinsic_per_option * position.exercisable_qty
            };
            Ok(ExitOptionSnapshot {
                grant: grant.clone(),
                vested_qty: position.vested_qty,
                exercisable_qty: position.exercisable_qty,
                intrinsic_per_option,
                payout,
                expired: position.expired,
            })
        })
        .collect::<Result<Vec<_>, CalcError>>()?;

    let entry_fd = compute_fd(
        inputs.cap_table_base,
        inputs.dilution_events,
        inputs.entry_valuation.date,
    );
    let purchases = inputs
        .purchase_plans
        .iter()
        .map(|plan| {
            let price = get_purchase_share_price(plan, inputs.entry_valuation, entry_fd)?;
            let shares_total: Decimal = plan_purchases(plan, price, exit_date)?
                .iter()
                .map(|purchase| purchase.shares)
                .sum();
            Ok(ExitPurchaseSnapshot {
                plan: plan.clone(),
                shares_total,
                exit_value: shares_total * exit_share_price,
            })
        })
        .collect::<Result<Vec<_>, CalcError>>()?;

    Ok(ExitSnapshots {
        exit_fd,
        exit_equity_value,
        exit_share_price,
        options,
        purchases,
    })
}

/// Holdings as they stand at exit.
///
/// Convertibles that convert on exit and were not already converted by a
/// round become holdings in the first COMMON class (or the first class if
/// none is COMMON), priced at the exit share price against exit FD.
pub fn exit_holdings(state: &AppState, exit_share_price: Decimal, exit_fd: Decimal) -> Vec<Holding> {
    let mut holdings = state.holdings.clone();
    let Some(exit) = state.exit_scenario.as_ref() else {
        return holdings;
    };
    if !exit_share_price.is_positive() || !exit_fd.is_positive() {
        return holdings;
    }
    let Some(target) = state
        .share_classes
        .iter()
        .find(|class| class.is_common())
        .or_else(|| state.share_classes.first())
    else {
        return holdings;
    };

    let already_converted: HashSet<&str> = state
        .holdings
        .iter()
        .filter_map(|holding| {
            holding
                .source
                .as_ref()
                .and_then(DerivedSource::convertible_id)
                .or_else(|| holding.holder_id.strip_prefix(CONVERTIBLE_HOLDER_PREFIX))
        })
        .collect();

    for convertible in &state.convertibles {
        if !convertible.converts_on.on_exit() || already_converted.contains(convertible.id.as_str()) {
            continue;
        }
        let Some(conversion) =
            compute_convertible_conversion(convertible, exit_share_price, exit_fd, exit.date)
        else {
            continue;
        };
        holdings.push(Holding {
            holder_id: convertible_holder_id(&convertible.id),
            class_id: target.id.clone(),
            shares: conversion.shares_issued,
            source: Some(DerivedSource::convertible(&convertible.id)),
        });
    }
    holdings
}

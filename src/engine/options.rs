use crate::domain::date::add_days_ymd;
use crate::domain::{CapTableBase, Decimal, DilutionEvent, OptionGrant, ValuationPoint, Ymd};
use serde::Serialize;

use super::fd::{compute_fd, compute_share_price};
use super::vesting::compute_vesting;
use super::CalcError;

/// Vested and exercisable quantities of a grant at a date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GrantPosition {
    pub vested_percent: Decimal,
    pub vested_qty: Decimal,
    pub exercisable_qty: Decimal,
    pub expired: bool,
    pub exercise_window_closed: bool,
}

/// Vesting frozen at termination, raised by acceleration, and zeroed for
/// exercise once the grant expires or the post-termination window lapses.
///
/// # Errors
/// Fails only if the exercise-window end date is unrepresentable.
pub fn grant_position(grant: &OptionGrant, as_of: Ymd) -> Result<GrantPosition, CalcError> {
    let vesting_cutoff = match grant.termination_date {
        Some(terminated) if terminated < as_of => terminated,
        _ => as_of,
    };
    let vesting = compute_vesting(&grant.vesting_schedule, grant.quantity_granted, vesting_cutoff)
        .with_acceleration(grant.quantity_granted, grant.acceleration.as_ref());

    let expired = grant
        .expiration_date
        .is_some_and(|expiration| expiration < as_of);

    let exercise_window_closed = match grant.termination_date {
        Some(terminated) if terminated < as_of => {
            let window = grant.post_termination_exercise_window_days.unwrap_or(0);
            as_of > add_days_ymd(terminated, i64::from(window))?
        }
        _ => false,
    };

    let exercisable_qty = if expired || exercise_window_closed {
        Decimal::ZERO
    } else {
        vesting.vested_qty
    };

    Ok(GrantPosition {
        vested_percent: vesting.vested_percent,
        vested_qty: vesting.vested_qty,
        exercisable_qty,
        expired,
        exercise_window_closed,
    })
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionsSnapshot {
    pub fd_as_of: Decimal,
    pub share_price_as_of: Decimal,
    pub fd_at_grant: Decimal,
    pub equity_percent_fd_at_grant: Decimal,
    pub vested_percent: Decimal,
    pub vested_qty: Decimal,
    pub exercisable_qty: Decimal,
    pub intrinsic_per_option: Decimal,
    pub intrinsic_value_vested: Decimal,
    pub expired: bool,
    pub exercise_window_closed: bool,
}

/// Per-grant economics as of a date, priced off `valuation`.
///
/// # Errors
/// `CalcError::NonPositiveFd` when FD at `as_of` is not positive.
pub fn compute_options_snapshot(
    grant: &OptionGrant,
    valuation: &ValuationPoint,
    base: &CapTableBase,
    events: &[DilutionEvent],
    as_of: Ymd,
) -> Result<OptionsSnapshot, CalcError> {
    let fd_as_of = compute_fd(base, events, as_of);
    let share_price_as_of = compute_share_price(valuation.equity_value, fd_as_of)?;
    let fd_at_grant = compute_fd(base, events, grant.grant_date);
    let equity_percent_fd_at_grant = if fd_at_grant.is_positive() {
        grant.quantity_granted / fd_at_grant
    } else {
        Decimal::ZERO
    };

    let position = grant_position(grant, as_of)?;
    let intrinsic_per_option = (share_price_as_of - grant.strike_price).max_zero();
    let intrinsic_value_vested = if position.expired {
        Decimal::ZERO
    } else {
        intrinsic_per_option * position.exercisable_qty
    };

    Ok(OptionsSnapshot {
        fd_as_of,
        share_price_as_of,
        fd_at_grant,
        equity_percent_fd_at_grant,
        vested_percent: position.vested_percent,
        vested_qty: position.vested_qty,
        exercisable_qty: position.exercisable_qty,
        intrinsic_per_option,
        intrinsic_value_vested,
        expired: position.expired,
        exercise_window_closed: position.exercise_window_closed,
    })
}

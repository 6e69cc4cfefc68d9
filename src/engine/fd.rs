use crate::domain::{CapTableBase, Decimal, DilutionEvent, Ymd};

use super::CalcError;

/// Fully-diluted share count as of `as_of`: the base table plus every
/// dilution event dated on or before it.
pub fn compute_fd(base: &CapTableBase, events: &[DilutionEvent], as_of: Ymd) -> Decimal {
    let dilution: Decimal = events
        .iter()
        .filter(|event| event.date <= as_of)
        .map(|event| event.shares_issued)
        .sum();
    base.total() + dilution
}

/// Equity value per fully-diluted share.
///
/// # Errors
/// `CalcError::NonPositiveFd` when `fd <= 0`.
pub fn compute_share_price(equity_value: Decimal, fd: Decimal) -> Result<Decimal, CalcError> {
    if !fd.is_positive() {
        return Err(CalcError::NonPositiveFd);
    }
    Ok(equity_value / fd)
}

use crate::domain::date::months_between_floor;
use crate::domain::{ConvertibleInstrument, ConvertibleType, Decimal, Ymd};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConvertibleConversion {
    pub conversion_price: Decimal,
    pub shares_issued: Decimal,
    pub amount_converted: Decimal,
}

/// Principal converting at `as_of`.
///
/// SAFEs convert their face amount. Notes with a rate accrue simple
/// interest over full elapsed months: `amount × (1 + rate × months / 12)`.
pub fn compute_convertible_amount(convertible: &ConvertibleInstrument, as_of: Ymd) -> Decimal {
    let rate = match (convertible.kind, convertible.interest_rate) {
        (ConvertibleType::Note, Some(rate)) if !rate.is_zero() => rate,
        _ => return convertible.amount,
    };
    let months = Decimal::from(months_between_floor(convertible.date_issued, as_of));
    convertible.amount * (Decimal::ONE + rate * months / Decimal::from(12u32))
}

/// Convert at the lowest positive price among the base price, the
/// discounted price, and the cap price (`cap / pre_round_fd`).
///
/// Returns `None` when there is no positive base price or FD to convert
/// against.
pub fn compute_convertible_conversion(
    convertible: &ConvertibleInstrument,
    base_price: Decimal,
    pre_round_fd: Decimal,
    as_of: Ymd,
) -> Option<ConvertibleConversion> {
    if !base_price.is_positive() || !pre_round_fd.is_positive() {
        return None;
    }

    let discounted = convertible
        .discount
        .map(|discount| base_price * (Decimal::ONE - discount));
    let capped = convertible.cap.map(|cap| cap / pre_round_fd);

    let conversion_price = [Some(base_price), discounted, capped]
        .into_iter()
        .flatten()
        .filter(Decimal::is_positive)
        .min()?;

    let amount_converted = compute_convertible_amount(convertible, as_of);
    Some(ConvertibleConversion {
        conversion_price,
        shares_issued: amount_converted / conversion_price,
        amount_converted,
    })
}

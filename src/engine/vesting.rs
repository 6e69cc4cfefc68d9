use crate::domain::date::months_between_floor;
use crate::domain::{Acceleration, AccelerationType, Decimal, VestingSchedule, Ymd};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VestingSnapshot {
    pub vested_percent: Decimal,
    pub vested_qty: Decimal,
}

impl VestingSnapshot {
    fn unvested() -> Self {
        Self {
            vested_percent: Decimal::ZERO,
            vested_qty: Decimal::ZERO,
        }
    }

    /// Raise vesting to the acceleration floor. Never lowers it.
    pub fn with_acceleration(self, quantity: Decimal, acceleration: Option<&Acceleration>) -> Self {
        let Some(acceleration) = acceleration else {
            return self;
        };
        if acceleration.kind == AccelerationType::None || acceleration.percent <= self.vested_percent
        {
            return self;
        }
        let percent = acceleration.percent.min(Decimal::ONE);
        Self {
            vested_percent: percent,
            vested_qty: (quantity * percent).floor(),
        }
    }
}

/// Step-function vesting at period boundaries.
///
/// Nothing vests before the cliff; crossing it vests the first period, and
/// each further full period adds one more, up to
/// `ceil(total_months / period)` periods.
pub fn compute_vesting(schedule: &VestingSchedule, quantity: Decimal, as_of: Ymd) -> VestingSnapshot {
    let elapsed = months_between_floor(schedule.start_date, as_of);
    if as_of < schedule.start_date || elapsed < schedule.cliff_months {
        return VestingSnapshot::unvested();
    }

    let period = schedule.frequency.period_months();
    let periods_total = schedule.total_months.div_ceil(period);
    if periods_total == 0 {
        return VestingSnapshot {
            vested_percent: Decimal::ONE,
            vested_qty: quantity.floor(),
        };
    }

    let periods_elapsed = ((elapsed - schedule.cliff_months) / period + 1).min(periods_total);
    let elapsed = Decimal::from(periods_elapsed);
    let total = Decimal::from(periods_total);

    VestingSnapshot {
        vested_percent: elapsed / total,
        // Multiply first so whole-period fractions floor exactly.
        vested_qty: quantity.mul_div(elapsed, total).floor(),
    }
}

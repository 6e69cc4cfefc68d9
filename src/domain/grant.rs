//! Option grants, vesting schedules, and acceleration terms.

use crate::domain::{Decimal, Ymd};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VestingFrequency {
    Monthly,
    Quarterly,
}

impl VestingFrequency {
    /// Length of one vesting period in months.
    pub fn period_months(&self) -> u32 {
        match self {
            VestingFrequency::Monthly => 1,
            VestingFrequency::Quarterly => 3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VestingSchedule {
    pub start_date: Ymd,
    pub cliff_months: u32,
    pub total_months: u32,
    pub frequency: VestingFrequency,
}

impl VestingSchedule {
    /// 12-month cliff, 36 months monthly: the shape legacy documents imply.
    pub fn standard(start_date: Ymd) -> Self {
        Self {
            start_date,
            cliff_months: 12,
            total_months: 36,
            frequency: VestingFrequency::Monthly,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccelerationType {
    None,
    SingleTrigger,
    DoubleTrigger,
}

/// Floor on vested percent applied at a trigger event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Acceleration {
    #[serde(rename = "type")]
    pub kind: AccelerationType,
    pub percent: Decimal,
}

impl Acceleration {
    pub fn none() -> Self {
        Self {
            kind: AccelerationType::None,
            percent: Decimal::ZERO,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionGrant {
    pub quantity_granted: Decimal,
    pub strike_price: Decimal,
    pub grant_date: Ymd,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiration_date: Option<Ymd>,
    pub vesting_schedule: VestingSchedule,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub termination_date: Option<Ymd>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post_termination_exercise_window_days: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub acceleration: Option<Acceleration>,
}

impl OptionGrant {
    /// Grant vesting on the standard schedule from its grant date.
    pub fn new(quantity_granted: Decimal, strike_price: Decimal, grant_date: Ymd) -> Self {
        Self {
            quantity_granted,
            strike_price,
            grant_date,
            expiration_date: None,
            vesting_schedule: VestingSchedule::standard(grant_date),
            termination_date: None,
            post_termination_exercise_window_days: None,
            acceleration: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn acceleration_uses_type_key() {
        let json = serde_json::json!({"type": "SINGLE_TRIGGER", "percent": 1});
        let parsed: Acceleration = serde_json::from_value(json).unwrap();
        assert_eq!(parsed.kind, AccelerationType::SingleTrigger);
        assert_eq!(parsed.percent, Decimal::ONE);
    }

    #[test]
    fn frequency_period_lengths() {
        assert_eq!(VestingFrequency::Monthly.period_months(), 1);
        assert_eq!(VestingFrequency::Quarterly.period_months(), 3);
    }
}

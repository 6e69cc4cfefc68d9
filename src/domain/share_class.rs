//! Share classes and the holdings that reference them.

use crate::domain::{Decimal, DerivedSource};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ShareClassType {
    Common,
    Preferred,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Participation {
    None,
    Full,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareClass {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ShareClassType,
    /// Lower is more senior (paid first).
    pub seniority: u32,
    pub preference_multiple: Decimal,
    pub invested_amount: Decimal,
    pub participation: Participation,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub participation_cap_multiple: Option<Decimal>,
    /// Portion of `invested_amount` added by round application to a class the
    /// user defined; taken back out before rounds are re-applied.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub round_contribution: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<DerivedSource>,
}

impl ShareClass {
    pub fn common(id: &str, name: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            kind: ShareClassType::Common,
            seniority: 0,
            preference_multiple: Decimal::ZERO,
            invested_amount: Decimal::ZERO,
            participation: Participation::None,
            participation_cap_multiple: None,
            round_contribution: None,
            source: None,
        }
    }

    pub fn is_common(&self) -> bool {
        self.kind == ShareClassType::Common
    }

    pub fn is_preferred(&self) -> bool {
        self.kind == ShareClassType::Preferred
    }

    /// `investedAmount × preferenceMultiple`.
    pub fn preference_amount(&self) -> Decimal {
        self.invested_amount * self.preference_multiple
    }

    /// Total-payout cap for participating classes; `None` means unbounded.
    pub fn participation_cap_total(&self) -> Option<Decimal> {
        self.participation_cap_multiple
            .map(|multiple| self.invested_amount * multiple)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Holding {
    pub holder_id: String,
    pub class_id: String,
    pub shares: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<DerivedSource>,
}

impl Holding {
    pub fn new(holder_id: &str, class_id: &str, shares: Decimal) -> Self {
        Self {
            holder_id: holder_id.to_string(),
            class_id: class_id.to_string(),
            shares,
            source: None,
        }
    }

    pub fn is_derived(&self) -> bool {
        self.source.is_some()
    }
}

//! Cap-table base, dated dilution, and valuation points.

use crate::domain::{Decimal, DerivedSource, Ymd};
use serde::{Deserialize, Serialize};

/// Static share-count snapshot that fully-diluted counts start from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapTableBase {
    pub common_outstanding: Decimal,
    pub option_pool_reserved: Decimal,
    pub other_dilutive_shares: Decimal,
}

impl CapTableBase {
    pub fn total(&self) -> Decimal {
        self.common_outstanding + self.option_pool_reserved + self.other_dilutive_shares
    }
}

/// Shares issued on a given date; included in FD on and after that date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DilutionEvent {
    pub date: Ymd,
    pub shares_issued: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Set only on events synthesized by round application.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<DerivedSource>,
}

impl DilutionEvent {
    pub fn new(date: Ymd, shares_issued: Decimal) -> Self {
        Self {
            date,
            shares_issued,
            description: None,
            source: None,
        }
    }

    pub fn is_derived(&self) -> bool {
        self.source.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValuationPoint {
    pub date: Ymd,
    pub equity_value: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Valuations {
    pub entry: ValuationPoint,
    pub current: ValuationPoint,
}

/// Hypothetical exit, valued either directly or from enterprise value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExitScenario {
    pub date: Ymd,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exit_equity_value: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enterprise_value: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub net_debt: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fees: Option<Decimal>,
}

impl ExitScenario {
    pub fn with_equity_value(date: Ymd, value: Decimal) -> Self {
        Self {
            date,
            exit_equity_value: Some(value),
            enterprise_value: None,
            net_debt: None,
            fees: None,
        }
    }

    /// Equity value at exit: `max(0, EV - netDebt - fees)` when an enterprise
    /// value is given, else the direct equity value (0 if neither is set).
    pub fn exit_equity_value(&self) -> Decimal {
        match self.enterprise_value {
            Some(ev) => {
                let net_debt = self.net_debt.unwrap_or(Decimal::ZERO);
                let fees = self.fees.unwrap_or(Decimal::ZERO);
                (ev - net_debt - fees).max_zero()
            }
            None => self.exit_equity_value.unwrap_or(Decimal::ZERO),
        }
    }
}

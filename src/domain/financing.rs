//! Priced financing rounds and convertible instruments.

use crate::domain::{Decimal, Ymd};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancingRound {
    pub date: Ymd,
    pub pre_money: Decimal,
    pub investment_amount: Decimal,
    /// Option pool target as a fraction of post-round FD (0..=0.99).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_option_pool_post_percent: Option<Decimal>,
    pub series_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creates_share_class_id: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConvertibleType {
    Safe,
    Note,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConvertsOn {
    NextEquityRound,
    Exit,
    Both,
}

fn slug(value: &str) -> String {
    let lowered = value.to_lowercase();
    let mut slug = String::with_capacity(lowered.len());
    for ch in lowered.chars() {
        if ch.is_ascii_lowercase() || ch.is_ascii_digit() {
            slug.push(ch);
        } else if !slug.ends_with('-') {
            slug.push('-');
        }
    }
    slug.trim_matches('-').to_string()
}

impl FinancingRound {
    /// Class the round issues into: `createsShareClassId`, else
    /// `series-<slug>`, else `series-<n>` for the round at `index`.
    pub fn share_class_id(&self, index: usize) -> String {
        if let Some(id) = self.creates_share_class_id.as_deref() {
            return id.to_string();
        }
        match slug(&self.series_name) {
            s if s.is_empty() => format!("series-{}", index + 1),
            s => format!("series-{s}"),
        }
    }
}

impl ConvertsOn {
    pub fn on_equity_round(&self) -> bool {
        matches!(self, ConvertsOn::NextEquityRound | ConvertsOn::Both)
    }

    pub fn on_exit(&self) -> bool {
        matches!(self, ConvertsOn::Exit | ConvertsOn::Both)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConvertibleInstrument {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: ConvertibleType,
    pub date_issued: Ymd,
    pub amount: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cap: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discount: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interest_rate: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maturity_date: Option<Ymd>,
    pub converts_on: ConvertsOn,
}

impl ConvertibleInstrument {
    pub fn safe(id: &str, date_issued: Ymd, amount: Decimal, converts_on: ConvertsOn) -> Self {
        Self {
            id: id.to_string(),
            kind: ConvertibleType::Safe,
            date_issued,
            amount,
            cap: None,
            discount: None,
            interest_rate: None,
            maturity_date: None,
            converts_on,
        }
    }
}

//! The legacy `v1` state shape, kept only so old documents can be migrated.

use crate::domain::{
    CapTableBase, Decimal, DilutionEvent, PurchasePlan, Settings, Valuations, Ymd,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::checker::Checker;
use super::v2::{
    check_cap_table_base, check_dilution_event, check_purchase_plan, check_settings,
    check_valuations,
};
use super::{into_typed, DocumentError, ParseOutcome};

/// The only vesting rule `v1` knew: 25% / 25% / 50%.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LegacyVesting {
    #[serde(rename = "25_25_50")]
    TwentyFiveTwentyFiveFifty,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionGrantV1 {
    pub quantity_granted: Decimal,
    pub strike_price: Decimal,
    pub grant_date: Ymd,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiration_date: Option<Ymd>,
    pub vesting: LegacyVesting,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExitScenarioV1 {
    pub date: Ymd,
    pub exit_equity_value: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppStateV1 {
    pub cap_table_base: CapTableBase,
    pub dilution_events: Vec<DilutionEvent>,
    pub valuations: Valuations,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exit_scenario: Option<ExitScenarioV1>,
    pub option_grants: Vec<OptionGrantV1>,
    pub purchase_plans: Vec<PurchasePlan>,
    pub settings: Settings,
}

fn check_exit_scenario(c: &mut Checker, value: &Value) -> Option<()> {
    let map = c.object(value)?;
    c.required(map, "date", |c, v| c.date(v));
    c.required(map, "exitEquityValue", |c, v| c.non_negative(v));
    Some(())
}

fn check_option_grant(c: &mut Checker, value: &Value) {
    let Some(map) = c.object(value) else { return };
    c.required(map, "quantityGranted", |c, v| c.positive(v));
    c.required(map, "strikePrice", |c, v| c.non_negative(v));
    c.required(map, "grantDate", |c, v| c.date(v));
    c.optional(map, "expirationDate", |c, v| c.date(v));
    c.required(map, "vesting", |c, v| c.literal(v, "25_25_50"));
}

pub(super) fn check_state(c: &mut Checker, value: &Value) {
    let Some(map) = c.object(value) else { return };
    c.required(map, "schemaVersion", |c, v| c.literal(v, "v1"));
    c.required(map, "capTableBase", check_cap_table_base);
    c.required(map, "dilutionEvents", |c, v| c.each(v, None, check_dilution_event));
    c.required(map, "valuations", check_valuations);
    c.optional(map, "exitScenario", check_exit_scenario);
    c.required(map, "optionGrants", |c, v| c.each(v, None, check_option_grant));
    c.required(map, "purchasePlans", |c, v| c.each(v, None, check_purchase_plan));
    c.required(map, "settings", check_settings);
}

/// Validate and type a legacy `v1` state object.
///
/// # Errors
/// `DocumentError::Invalid` listing every violation found.
pub fn parse_app_state_v1(value: &Value) -> ParseOutcome<AppStateV1> {
    let mut checker = Checker::new();
    check_state(&mut checker, value);
    if !checker.is_clean() {
        return Err(DocumentError::Invalid(checker.finish()));
    }
    into_typed(value.clone())
}

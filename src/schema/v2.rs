//! Rules for the current (`v2`) state shape.

use crate::domain::AppState;
use serde_json::{Map, Value};
use std::collections::HashSet;

use super::checker::Checker;
use super::{into_typed, DocumentError, ParseOutcome};

pub(super) fn check_cap_table_base(c: &mut Checker, value: &Value) -> Option<()> {
    let map = c.object(value)?;
    c.required(map, "commonOutstanding", |c, v| c.non_negative(v));
    c.required(map, "optionPoolReserved", |c, v| c.non_negative(v));
    c.required(map, "otherDilutiveShares", |c, v| c.non_negative(v));
    Some(())
}

fn check_valuation_point(c: &mut Checker, value: &Value) -> Option<()> {
    let map = c.object(value)?;
    c.required(map, "date", |c, v| c.date(v));
    c.required(map, "equityValue", |c, v| c.non_negative(v));
    Some(())
}

pub(super) fn check_valuations(c: &mut Checker, value: &Value) -> Option<()> {
    let map = c.object(value)?;
    c.required(map, "entry", check_valuation_point);
    c.required(map, "current", check_valuation_point);
    Some(())
}

pub(super) fn check_dilution_event(c: &mut Checker, value: &Value) {
    let Some(map) = c.object(value) else { return };
    c.required(map, "date", |c, v| c.date(v));
    c.required(map, "sharesIssued", |c, v| c.non_negative(v));
    c.optional(map, "description", |c, v| c.non_empty(v));
}

/// Valued either directly or from enterprise value, never both.
fn check_exit_scenario(c: &mut Checker, value: &Value) -> Option<()> {
    let map = c.object(value)?;
    c.required(map, "date", |c, v| c.date(v));
    c.optional(map, "exitEquityValue", |c, v| c.non_negative(v));
    c.optional(map, "enterpriseValue", |c, v| c.non_negative(v));
    c.optional(map, "netDebt", |c, v| c.non_negative(v));
    c.optional(map, "fees", |c, v| c.non_negative(v));

    match (map.contains_key("exitEquityValue"), map.contains_key("enterpriseValue")) {
        (false, false) => c.issue_at("exitEquityValue", "exitEquityValue or enterpriseValue is required"),
        (true, true) => c.issue_at(
            "enterpriseValue",
            "exitEquityValue and enterpriseValue are mutually exclusive",
        ),
        _ => {}
    }
    Some(())
}

fn check_vesting_schedule(c: &mut Checker, value: &Value) -> Option<()> {
    let map = c.object(value)?;
    c.required(map, "startDate", |c, v| c.date(v));
    let cliff = c.required(map, "cliffMonths", |c, v| c.integer(v, 0, None));
    let total = c.required(map, "totalMonths", |c, v| c.integer(v, 1, None));
    c.required(map, "frequency", |c, v| c.one_of(v, &["MONTHLY", "QUARTERLY"]));
    if let (Some(cliff), Some(total)) = (cliff, total) {
        if cliff > total {
            c.issue_at("cliffMonths", "cliffMonths must be <= totalMonths");
        }
    }
    Some(())
}

fn check_acceleration(c: &mut Checker, value: &Value) -> Option<()> {
    let map = c.object(value)?;
    c.required(map, "type", |c, v| {
        c.one_of(v, &["NONE", "SINGLE_TRIGGER", "DOUBLE_TRIGGER"])
    });
    c.required(map, "percent", |c, v| c.between(v, 0.0, 1.0));
    Some(())
}

fn check_option_grant(c: &mut Checker, value: &Value) {
    let Some(map) = c.object(value) else { return };
    c.required(map, "quantityGranted", |c, v| c.positive(v));
    c.required(map, "strikePrice", |c, v| c.non_negative(v));
    c.required(map, "grantDate", |c, v| c.date(v));
    c.optional(map, "expirationDate", |c, v| c.date(v));
    c.required(map, "vestingSchedule", check_vesting_schedule);
    c.optional(map, "terminationDate", |c, v| c.date(v));
    c.optional(map, "postTerminationExerciseWindowDays", |c, v| {
        c.integer(v, 0, Some(u64::from(u32::MAX)))
    });
    c.optional(map, "acceleration", check_acceleration);
}

fn check_contribution_changes(c: &mut Checker, value: &Value) -> Option<()> {
    let items = c.each(value, Some(5), |c, item| {
        let Some(map) = c.object(item) else { return };
        c.required(map, "effectiveDate", |c, v| c.date(v));
        c.required(map, "monthlyAmount", |c, v| c.non_negative(v));
    })?;
    let dates: Vec<&str> = items
        .iter()
        .filter_map(|item| item.get("effectiveDate").and_then(Value::as_str))
        .map(str::trim)
        .collect();
    let unique: HashSet<&str> = dates.iter().copied().collect();
    if unique.len() != dates.len() {
        c.issue("contributionChanges effectiveDate must be unique");
    }
    Some(())
}

pub(super) fn check_purchase_plan(c: &mut Checker, value: &Value) {
    let Some(map) = c.object(value) else { return };
    c.required(map, "startDate", |c, v| c.date(v));
    c.required(map, "purchaseDayOfMonth", |c, v| c.integer(v, 1, Some(28)));
    c.required(map, "monthlyAmount", |c, v| c.positive(v));
    c.optional(map, "contributionChanges", check_contribution_changes);
    let mode = c.required(map, "purchasePriceMode", |c, v| {
        c.one_of(v, &["FIXED_SHARE_PRICE", "ENTRY_VALUATION_ANCHORED"])
    });
    let fixed = c.optional(map, "purchaseSharePriceFixed", |c, v| c.non_negative(v));
    if mode == Some("FIXED_SHARE_PRICE") && !fixed.is_some_and(|price| price > 0.0) {
        c.issue_at(
            "purchaseSharePriceFixed",
            "purchaseSharePriceFixed is required and must be > 0",
        );
    }
}

pub(super) fn check_settings(c: &mut Checker, value: &Value) -> Option<()> {
    let map = c.object(value)?;
    c.required(map, "persistenceOptIn", |c, v| c.boolean(v));
    c.required(map, "currency", |c, v| c.literal(v, "BRL"));
    Some(())
}

fn check_share_class(c: &mut Checker, value: &Value) {
    let Some(map) = c.object(value) else { return };
    c.required(map, "id", |c, v| c.non_empty(v));
    c.required(map, "name", |c, v| c.non_empty(v));
    let kind = c.required(map, "type", |c, v| c.one_of(v, &["COMMON", "PREFERRED"]));
    c.required(map, "seniority", |c, v| c.integer(v, 0, Some(u64::from(u32::MAX))));
    let multiple = c.required(map, "preferenceMultiple", |c, v| c.non_negative(v));
    c.required(map, "investedAmount", |c, v| c.non_negative(v));
    let participation = c.required(map, "participation", |c, v| c.one_of(v, &["NONE", "FULL"]));
    let cap = c.optional(map, "participationCapMultiple", |c, v| c.non_negative(v));
    c.optional(map, "roundContribution", |c, v| c.non_negative(v));

    if kind == Some("PREFERRED") && multiple.is_some_and(|m| m <= 0.0) {
        c.issue_at(
            "preferenceMultiple",
            "preferenceMultiple must be > 0 for preferred classes",
        );
    }
    if cap.is_some_and(|cap| cap <= 0.0) {
        c.issue_at(
            "participationCapMultiple",
            "participationCapMultiple must be > 0 when provided",
        );
    }
    if kind == Some("COMMON") && participation.is_some_and(|p| p != "NONE") {
        c.issue_at("participation", "common classes must use participation NONE");
    }
}

fn check_holding(c: &mut Checker, value: &Value) {
    let Some(map) = c.object(value) else { return };
    c.required(map, "holderId", |c, v| c.non_empty(v));
    c.required(map, "classId", |c, v| c.non_empty(v));
    c.required(map, "shares", |c, v| c.non_negative(v));
}

fn check_financing_round(c: &mut Checker, value: &Value) {
    let Some(map) = c.object(value) else { return };
    c.required(map, "date", |c, v| c.date(v));
    c.required(map, "preMoney", |c, v| c.positive(v));
    c.required(map, "investmentAmount", |c, v| c.positive(v));
    c.optional(map, "targetOptionPoolPostPercent", |c, v| c.between(v, 0.0, 0.99));
    c.required(map, "seriesName", |c, v| c.non_empty(v));
    c.optional(map, "createsShareClassId", |c, v| c.non_empty(v));
}

fn check_convertible(c: &mut Checker, value: &Value) {
    let Some(map) = c.object(value) else { return };
    c.required(map, "id", |c, v| c.non_empty(v));
    let kind = c.required(map, "type", |c, v| c.one_of(v, &["SAFE", "NOTE"]));
    c.required(map, "dateIssued", |c, v| c.date(v));
    c.required(map, "amount", |c, v| c.positive(v));
    c.optional(map, "cap", |c, v| c.positive(v));
    c.optional(map, "discount", |c, v| c.between(v, 0.0, 0.99));
    c.optional(map, "interestRate", |c, v| c.between(v, 0.0, 1.0));
    c.optional(map, "maturityDate", |c, v| c.date(v));
    c.required(map, "convertsOn", |c, v| {
        c.one_of(v, &["NEXT_EQUITY_ROUND", "EXIT", "BOTH"])
    });

    if kind == Some("NOTE") {
        if !map.contains_key("interestRate") {
            c.issue_at("interestRate", "interestRate is required for NOTE");
        }
        if !map.get("maturityDate").is_some_and(|v| v.as_str().is_some_and(|s| !s.is_empty())) {
            c.issue_at("maturityDate", "maturityDate is required for NOTE");
        }
    }
}

/// Unique class ids, at least one COMMON class, resolvable holdings.
fn check_cross_references(c: &mut Checker, map: &Map<String, Value>) {
    let classes = map.get("shareClasses").and_then(Value::as_array);
    let class_ids: Vec<&str> = classes
        .into_iter()
        .flatten()
        .filter_map(|class| class.get("id").and_then(Value::as_str))
        .collect();

    if let Some(classes) = classes {
        let unique: HashSet<&str> = class_ids.iter().copied().collect();
        if unique.len() != class_ids.len() {
            c.issue_at("shareClasses", "shareClasses id must be unique");
        }
        let has_common = classes
            .iter()
            .any(|class| class.get("type").and_then(Value::as_str) == Some("COMMON"));
        if !has_common {
            c.issue_at("shareClasses", "shareClasses must include at least one COMMON class");
        }
    }

    let known: HashSet<&str> = class_ids.into_iter().collect();
    if let Some(holdings) = map.get("holdings").and_then(Value::as_array) {
        for (index, holding) in holdings.iter().enumerate() {
            let class_id = holding.get("classId").and_then(Value::as_str);
            if !class_id.is_some_and(|id| known.contains(id)) {
                c.at("holdings", |c| {
                    c.issue_at(index, "holding classId must reference a share class");
                });
            }
        }
    }
}

/// Structural and cross-field rules for a `v2` state object.
pub(super) fn check_state(c: &mut Checker, value: &Value) {
    let Some(map) = c.object(value) else { return };
    c.required(map, "schemaVersion", |c, v| c.literal(v, "v2"));
    c.required(map, "capTableBase", check_cap_table_base);
    c.required(map, "dilutionEvents", |c, v| c.each(v, None, check_dilution_event));
    c.required(map, "valuations", check_valuations);
    c.optional(map, "exitScenario", check_exit_scenario);
    c.required(map, "optionGrants", |c, v| c.each(v, None, check_option_grant));
    c.required(map, "purchasePlans", |c, v| c.each(v, None, check_purchase_plan));
    c.required(map, "shareClasses", |c, v| c.each(v, None, check_share_class));
    c.required(map, "holdings", |c, v| c.each(v, None, check_holding));
    c.optional(map, "financingRounds", |c, v| c.each(v, None, check_financing_round));
    c.optional(map, "convertibles", |c, v| c.each(v, None, check_convertible));
    c.required(map, "settings", check_settings);
    check_cross_references(c, map);
}

/// Validate and type a `v2` state object.
///
/// # Errors
/// `DocumentError::Invalid` listing every violation found.
pub fn parse_app_state(value: &Value) -> ParseOutcome<AppState> {
    let mut checker = Checker::new();
    check_state(&mut checker, value);
    if !checker.is_clean() {
        return Err(DocumentError::Invalid(checker.finish()));
    }
    into_typed::<AppState>(value.clone()).map(|state| state.normalized())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn valid() -> Value {
        serde_json::to_value(AppState::default()).unwrap()
    }

    fn errors(value: &Value) -> Vec<String> {
        parse_app_state(value).unwrap_err().messages()
    }

    #[test]
    fn default_state_is_valid() {
        assert_eq!(parse_app_state(&valid()).unwrap(), AppState::default());
    }

    #[test]
    fn missing_rounds_default_to_empty() {
        let mut value = valid();
        value.as_object_mut().unwrap().remove("financingRounds");
        assert!(parse_app_state(&value).unwrap().financing_rounds.is_empty());
    }

    #[test]
    fn reports_every_violation_with_paths() {
        let mut value = valid();
        value["capTableBase"]["commonOutstanding"] = json!(-5);
        value["valuations"]["entry"]["date"] = json!("2025-02-30");
        value["holdings"] = json!([{"holderId": "You", "classId": "ghost", "shares": 1}]);
        value["settings"]["currency"] = json!("USD");
        let errs = errors(&value);
        assert!(errs.contains(&"capTableBase.commonOutstanding: Number must be greater than or equal to 0".to_string()));
        assert!(errs.contains(&"valuations.entry.date: Invalid YYYY-MM-DD date".to_string()));
        assert!(errs.contains(&"holdings.0.classId: holding classId must reference a share class".to_string()));
        assert!(errs.contains(&"settings.currency: Invalid literal value, expected \"BRL\"".to_string()));
        assert_eq!(errs.len(), 4);
    }

    #[test]
    fn share_class_rules() {
        let mut value = valid();
        value["shareClasses"] = json!([
            {"id": "a", "name": "A", "type": "PREFERRED", "seniority": 1, "preferenceMultiple": 0,
             "investedAmount": 0, "participation": "FULL", "participationCapMultiple": 0},
            {"id": "a", "name": "B", "type": "PREFERRED", "seniority": 2, "preferenceMultiple": 1,
             "investedAmount": 0, "participation": "NONE"}
        ]);
        value["holdings"] = json!([]);
        let errs = errors(&value);
        assert!(errs.contains(&"shareClasses.0.preferenceMultiple: preferenceMultiple must be > 0 for preferred classes".to_string()));
        assert!(errs.contains(&"shareClasses.0.participationCapMultiple: participationCapMultiple must be > 0 when provided".to_string()));
        assert!(errs.contains(&"shareClasses: shareClasses id must be unique".to_string()));
        assert!(errs.contains(&"shareClasses: shareClasses must include at least one COMMON class".to_string()));
    }

    #[test]
    fn common_must_not_participate() {
        let mut value = valid();
        value["shareClasses"][0]["participation"] = json!("FULL");
        assert_eq!(
            errors(&value),
            vec!["shareClasses.0.participation: common classes must use participation NONE"]
        );
    }

    #[test]
    fn note_requires_rate_and_maturity() {
        let mut value = valid();
        value["convertibles"] = json!([{
            "id": "n1", "type": "NOTE", "dateIssued": "2024-01-01", "amount": 100,
            "convertsOn": "BOTH"
        }]);
        assert_eq!(
            errors(&value),
            vec![
                "convertibles.0.interestRate: interestRate is required for NOTE",
                "convertibles.0.maturityDate: maturityDate is required for NOTE",
            ]
        );
    }

    #[test]
    fn purchase_plan_rules() {
        let mut value = valid();
        value["purchasePlans"] = json!([{
            "startDate": "2024-01-01", "purchaseDayOfMonth": 29, "monthlyAmount": 100,
            "contributionChanges": [
                {"effectiveDate": "2024-02-01", "monthlyAmount": 0},
                {"effectiveDate": "2024-02-01", "monthlyAmount": 10}
            ],
            "purchasePriceMode": "FIXED_SHARE_PRICE"
        }]);
        assert_eq!(
            errors(&value),
            vec![
                "purchasePlans.0.purchaseDayOfMonth: Number must be less than or equal to 28",
                "purchasePlans.0.contributionChanges: contributionChanges effectiveDate must be unique",
                "purchasePlans.0.purchaseSharePriceFixed: purchaseSharePriceFixed is required and must be > 0",
            ]
        );
    }

    #[test]
    fn exit_scenario_needs_exactly_one_value_source() {
        let mut value = valid();
        value["exitScenario"] = json!({"date": "2025-01-01"});
        assert_eq!(
            errors(&value),
            vec!["exitScenario.exitEquityValue: exitEquityValue or enterpriseValue is required"]
        );

        value["exitScenario"] = json!({"date": "2025-01-01", "exitEquityValue": 1, "enterpriseValue": 2});
        assert_eq!(
            errors(&value),
            vec!["exitScenario.enterpriseValue: exitEquityValue and enterpriseValue are mutually exclusive"]
        );
    }

    #[test]
    fn vesting_cliff_cannot_exceed_total() {
        let mut value = valid();
        value["optionGrants"] = json!([{
            "quantityGranted": 100, "strikePrice": 1, "grantDate": "2024-01-01",
            "vestingSchedule": {"startDate": "2024-01-01", "cliffMonths": 24, "totalMonths": 12,
                                "frequency": "MONTHLY"}
        }]);
        assert_eq!(
            errors(&value),
            vec!["optionGrants.0.vestingSchedule.cliffMonths: cliffMonths must be <= totalMonths"]
        );
    }

    #[test]
    fn non_object_root() {
        assert_eq!(errors(&json!([])), vec!["Expected object, received array"]);
    }
}

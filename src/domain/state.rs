//! The aggregate application state persisted as a document.

use crate::domain::provenance::{legacy_event_source, legacy_holder_source, ROUND_HOLDER_PREFIX};
use crate::domain::{
    CapTableBase, ConvertibleInstrument, Decimal, DerivedSource, DilutionEvent, ExitScenario,
    FinancingRound, Holding, OptionGrant, PurchasePlan, ShareClass, ValuationPoint, Valuations,
    Ymd,
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SchemaVersion {
    #[serde(rename = "v1")]
    V1,
    #[serde(rename = "v2")]
    V2,
}

impl SchemaVersion {
    pub fn as_str(&self) -> &'static str {
        match self {
            SchemaVersion::V1 => "v1",
            SchemaVersion::V2 => "v2",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Currency {
    #[default]
    #[serde(rename = "BRL")]
    Brl,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub persistence_opt_in: bool,
    pub currency: Currency,
}

/// Everything the calculations read, plus user settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppState {
    pub schema_version: SchemaVersion,
    pub cap_table_base: CapTableBase,
    pub dilution_events: Vec<DilutionEvent>,
    pub valuations: Valuations,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exit_scenario: Option<ExitScenario>,
    pub option_grants: Vec<OptionGrant>,
    pub purchase_plans: Vec<PurchasePlan>,
    pub share_classes: Vec<ShareClass>,
    pub holdings: Vec<Holding>,
    #[serde(default)]
    pub financing_rounds: Vec<FinancingRound>,
    #[serde(default)]
    pub convertibles: Vec<ConvertibleInstrument>,
    pub settings: Settings,
}

fn default_date() -> Ymd {
    Ymd::from_ymd(2024, 1, 1).unwrap_or_default()
}

impl Default for AppState {
    /// Empty company: zero cap table, one COMMON class, a zero holding for
    /// `You`, persistence off.
    fn default() -> Self {
        let date = default_date();
        let zero_point = ValuationPoint {
            date,
            equity_value: Decimal::ZERO,
        };
        Self {
            schema_version: SchemaVersion::V2,
            cap_table_base: CapTableBase::default(),
            dilution_events: Vec::new(),
            valuations: Valuations {
                entry: zero_point.clone(),
                current: zero_point,
            },
            exit_scenario: None,
            option_grants: Vec::new(),
            purchase_plans: Vec::new(),
            share_classes: vec![ShareClass::common("common", "Common")],
            holdings: vec![Holding::new("You", "common", Decimal::ZERO)],
            financing_rounds: Vec::new(),
            convertibles: Vec::new(),
            settings: Settings::default(),
        }
    }
}

impl AppState {
    /// Copy with every purchase plan's contribution changes date-ordered and
    /// untagged round output adopted as derived.
    pub fn normalized(&self) -> Self {
        let mut state = self.clone();
        state.purchase_plans = state.purchase_plans.iter().map(PurchasePlan::normalized).collect();
        state.adopt_legacy_provenance();
        state
    }

    /// Tag round output written without a `source` (holders named
    /// `Round Investors - ...` or `Convertible Investors - ...`, events
    /// described `Round: ...`) so the next round application replaces it.
    ///
    /// A class a legacy round holding sits in is adopted as derived when a
    /// round would have created it under its own series name; otherwise the
    /// targeting rounds' investment is recorded as its round contribution.
    fn adopt_legacy_provenance(&mut self) {
        let legacy_round_classes: HashSet<&str> = self
            .holdings
            .iter()
            .filter(|holding| holding.source.is_none())
            .filter(|holding| holding.holder_id.starts_with(ROUND_HOLDER_PREFIX))
            .map(|holding| holding.class_id.as_str())
            .collect();
        let rounds = &self.financing_rounds;

        for class in self.share_classes.iter_mut() {
            if class.source.is_some()
                || class.round_contribution.is_some()
                || !legacy_round_classes.contains(class.id.as_str())
            {
                continue;
            }
            let targeting: Vec<&FinancingRound> = rounds
                .iter()
                .enumerate()
                .filter(|(index, round)| round.share_class_id(*index) == class.id)
                .map(|(_, round)| round)
                .collect();
            if targeting.is_empty() {
                continue;
            }
            let created = targeting.iter().find(|round| {
                round.creates_share_class_id.is_none() && round.series_name == class.name
            });
            match created {
                Some(round) => class.source = Some(DerivedSource::round(&round.series_name)),
                None => {
                    let invested: Decimal =
                        targeting.iter().map(|round| round.investment_amount).sum();
                    class.round_contribution = Some(invested.min(class.invested_amount));
                }
            }
            tracing::debug!(class_id = %class.id, "adopted legacy round share class");
        }

        for holding in self.holdings.iter_mut().filter(|h| h.source.is_none()) {
            holding.source = legacy_holder_source(&holding.holder_id);
        }
        for event in self.dilution_events.iter_mut().filter(|e| e.source.is_none()) {
            event.source = event.description.as_deref().and_then(legacy_event_source);
        }
    }

    pub fn share_class(&self, id: &str) -> Option<&ShareClass> {
        self.share_classes.iter().find(|class| class.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_state_shape() {
        let state = AppState::default();
        assert_eq!(state.schema_version, SchemaVersion::V2);
        assert_eq!(state.valuations.entry.date.to_string(), "2024-01-01");
        assert_eq!(state.share_classes.len(), 1);
        assert!(state.share_class("common").is_some_and(|c| c.is_common()));
        assert_eq!(state.holdings[0].holder_id, "You");
        assert!(!state.settings.persistence_opt_in);
    }

    #[test]
    fn serializes_camel_case_with_literal_tags() {
        let json = serde_json::to_value(AppState::default()).unwrap();
        assert_eq!(json["schemaVersion"], "v2");
        assert_eq!(json["settings"]["currency"], "BRL");
        assert_eq!(json["settings"]["persistenceOptIn"], false);
        assert!(json["financingRounds"].as_array().unwrap().is_empty());
        assert!(json.get("exitScenario").is_none());
    }

    #[test]
    fn missing_rounds_and_convertibles_default_to_empty() {
        let mut json = serde_json::to_value(AppState::default()).unwrap();
        let object = json.as_object_mut().unwrap();
        object.remove("financingRounds");
        object.remove("convertibles");
        let state: AppState = serde_json::from_value(json).unwrap();
        assert!(state.financing_rounds.is_empty());
        assert!(state.convertibles.is_empty());
    }
}

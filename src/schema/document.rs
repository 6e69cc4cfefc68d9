//! The import/export boundary: `{schemaVersion, state}` envelopes.

use crate::domain::{AppState, SchemaVersion};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::checker::Checker;
use super::migrate::migrate_v1_to_v2;
use super::{v1, v2, DocumentError, ParseOutcome};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppDocument {
    pub schema_version: SchemaVersion,
    pub state: AppState,
}

/// Raw input to [`parse_document`]: JSON text or an already-parsed value.
#[derive(Debug, Clone)]
pub enum DocumentSource<'a> {
    Text(&'a str),
    Json(Value),
}

impl<'a> From<&'a str> for DocumentSource<'a> {
    fn from(text: &'a str) -> Self {
        DocumentSource::Text(text)
    }
}

impl From<Value> for DocumentSource<'_> {
    fn from(value: Value) -> Self {
        DocumentSource::Json(value)
    }
}

/// Wrap a state in a current-version envelope.
pub fn create_document(state: AppState) -> AppDocument {
    AppDocument {
        schema_version: SchemaVersion::V2,
        state,
    }
}

/// Pretty JSON for download or persistence.
///
/// # Errors
/// Only if serialization itself fails.
pub fn export_document(state: &AppState) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&create_document(state.clone()))
}

fn state_version(state: &Value) -> Option<&str> {
    state.get("schemaVersion").and_then(Value::as_str)
}

/// Validate an imported document, migrating `v1` states on the way in.
///
/// The envelope may declare either version; the state is checked against
/// the shape its own `schemaVersion` names, and the result is always `v2`.
///
/// # Errors
/// `InvalidJson` for unparseable text, otherwise `Invalid` with every
/// envelope and state issue (state issues under `state.`).
pub fn parse_document<'a>(source: impl Into<DocumentSource<'a>>) -> ParseOutcome<AppDocument> {
    let raw = match source.into() {
        DocumentSource::Text(text) => serde_json::from_str::<Value>(text)
            .map_err(|err| DocumentError::InvalidJson(err.to_string()))?,
        DocumentSource::Json(value) => value,
    };

    let mut checker = Checker::new();
    let Some(envelope) = checker.object(&raw) else {
        return Err(DocumentError::Invalid(checker.finish()));
    };
    checker.required(envelope, "schemaVersion", |c, v| c.one_of(v, &["v1", "v2"]));
    let state = checker.required(envelope, "state", |_, v| Some(v));
    let mut issues = checker.finish();

    let Some(state) = state else {
        return Err(DocumentError::Invalid(issues));
    };

    let parsed = if state_version(state) == Some(SchemaVersion::V1.as_str()) {
        v1::parse_app_state_v1(state).map(|legacy| {
            tracing::info!("migrating v1 document to v2");
            migrate_v1_to_v2(legacy)
        })
    } else {
        v2::parse_app_state(state)
    };

    match parsed {
        Ok(state) if issues.is_empty() => Ok(create_document(state)),
        Ok(_) => Err(DocumentError::Invalid(issues)),
        Err(DocumentError::Invalid(state_issues)) => {
            issues.extend(state_issues.into_iter().map(|issue| issue.prefixed("state")));
            Err(DocumentError::Invalid(issues))
        }
        Err(err) => Err(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Decimal, ExitScenario, OptionGrant, Ymd};
    use serde_json::json;

    fn d(s: &str) -> Decimal {
        Decimal::from_str_canonical(s).unwrap()
    }

    fn sample_state() -> AppState {
        let mut state = AppState::default();
        state.cap_table_base.common_outstanding = d("1000000");
        state.cap_table_base.option_pool_reserved = d("100000");
        state.valuations.current.equity_value = d("20000000");
        state.option_grants.push(OptionGrant::new(
            d("1000"),
            d("1.5"),
            Ymd::parse("2024-02-01").unwrap(),
        ));
        state.exit_scenario = Some(ExitScenario::with_equity_value(
            Ymd::parse("2027-01-01").unwrap(),
            d("50000000"),
        ));
        state.settings.persistence_opt_in = true;
        state
    }

    #[test]
    fn export_then_import_is_identity() {
        let state = sample_state();
        let text = export_document(&state).unwrap();
        let document = parse_document(text.as_str()).unwrap();
        assert_eq!(document, create_document(state));
    }

    #[test]
    fn accepts_parsed_values() {
        let value = serde_json::to_value(create_document(sample_state())).unwrap();
        assert!(parse_document(value).is_ok());
    }

    #[test]
    fn invalid_json_is_a_single_error() {
        let err = parse_document("{not json").unwrap_err();
        let messages = err.messages();
        assert_eq!(messages.len(), 1);
        assert!(messages[0].starts_with("Invalid JSON: "));
    }

    #[test]
    fn state_issues_are_prefixed() {
        let mut value = serde_json::to_value(create_document(sample_state())).unwrap();
        value["state"]["capTableBase"]["commonOutstanding"] = json!(-1);
        value["schemaVersion"] = json!("v3");
        assert_eq!(
            parse_document(value).unwrap_err().messages(),
            vec![
                "schemaVersion: Invalid enum value. Expected 'v1' | 'v2', received 'v3'",
                "state.capTableBase.commonOutstanding: Number must be greater than or equal to 0",
            ]
        );
    }

    #[test]
    fn missing_state() {
        assert_eq!(
            parse_document(r#"{"schemaVersion": "v2"}"#).unwrap_err().messages(),
            vec!["state: Required"]
        );
    }

    #[test]
    fn legacy_documents_come_back_current() {
        let legacy = json!({
            "schemaVersion": "v1",
            "state": {
                "schemaVersion": "v1",
                "capTableBase": {"commonOutstanding": 100, "optionPoolReserved": 0, "otherDilutiveShares": 0},
                "dilutionEvents": [],
                "valuations": {
                    "entry": {"date": "2024-01-01", "equityValue": 1000},
                    "current": {"date": "2025-01-01", "equityValue": 2000}
                },
                "optionGrants": [
                    {"quantityGranted": 10, "strikePrice": 1, "grantDate": "2024-01-01", "vesting": "25_25_50"}
                ],
                "purchasePlans": [],
                "settings": {"persistenceOptIn": false, "currency": "BRL"}
            }
        });
        let document = parse_document(legacy).unwrap();
        assert_eq!(document.schema_version, SchemaVersion::V2);
        assert_eq!(document.state.schema_version, SchemaVersion::V2);
        assert_eq!(document.state.option_grants[0].vesting_schedule.cliff_months, 12);
    }
}

use equity_console::domain::{AccelerationType, Decimal, SchemaVersion, Ymd};
use equity_console::schema::migrate::MIGRATED_HOLDER_ID;
use equity_console::schema::DocumentError;
use equity_console::{compute_dashboard_summary, export_document, parse_document};
use serde_json::json;

fn d(s: &str) -> Decimal {
    Decimal::from_str_canonical(s).unwrap()
}

fn legacy_document() -> serde_json::Value {
    json!({
        "schemaVersion": "v1",
        "state": {
            "schemaVersion": "v1",
            "capTableBase": {"commonOutstanding": 900000, "optionPoolReserved": 100000, "otherDilutiveShares": 0},
            "dilutionEvents": [{"date": "2024-06-01", "sharesIssued": 100000, "description": "Advisor grant"}],
            "valuations": {
                "entry": {"date": "2024-01-01", "equityValue": 10000000},
                "current": {"date": "2025-01-01", "equityValue": 22000000}
            },
            "exitScenario": {"date": "2027-01-01", "exitEquityValue": 55000000},
            "optionGrants": [
                {"quantityGranted": 1200, "strikePrice": 2, "grantDate": "2023-01-01", "vesting": "25_25_50"}
            ],
            "purchasePlans": [{
                "startDate": "2024-01-01",
                "purchaseDayOfMonth": 1,
                "monthlyAmount": 1000,
                "purchasePriceMode": "ENTRY_VALUATION_ANCHORED",
                "contributionChanges": [
                    {"effectiveDate": "2024-09-01", "monthlyAmount": 0},
                    {"effectiveDate": "2024-03-01", "monthlyAmount": 2000}
                ]
            }],
            "settings": {"persistenceOptIn": true, "currency": "USD"}
        }
    })
}

#[test]
fn legacy_document_is_upgraded() {
    let document = parse_document(legacy_document()).unwrap();
    let state = &document.state;

    assert_eq!(document.schema_version, SchemaVersion::V2);
    assert_eq!(state.schema_version, SchemaVersion::V2);
    assert_eq!(state.share_classes.len(), 1);
    assert_eq!(state.holdings.len(), 1);
    assert_eq!(state.holdings[0].holder_id, MIGRATED_HOLDER_ID);
    assert_eq!(state.holdings[0].shares, d("1000000"));

    let grant = &state.option_grants[0];
    assert_eq!(grant.vesting_schedule.start_date, grant.grant_date);
    assert_eq!(grant.vesting_schedule.cliff_months, 12);
    assert_eq!(
        grant.acceleration.as_ref().map(|a| a.kind),
        Some(AccelerationType::None)
    );

    let changes = state.purchase_plans[0].contribution_changes();
    assert_eq!(changes[0].effective_date, Ymd::parse("2024-03-01").unwrap());
    assert_eq!(changes[1].effective_date, Ymd::parse("2024-09-01").unwrap());
    assert_eq!(
        state.exit_scenario.as_ref().map(|exit| exit.exit_equity_value()),
        Some(d("55000000"))
    );
}

#[test]
fn upgraded_document_exports_as_current() {
    let document = parse_document(legacy_document()).unwrap();
    let text = export_document(&document.state).unwrap();
    let value: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(value["schemaVersion"], "v2");
    assert_eq!(value["state"]["schemaVersion"], "v2");

    let again = parse_document(text.as_str()).unwrap();
    assert_eq!(again, document);
}

#[test]
fn upgraded_document_drives_the_dashboard() {
    let document = parse_document(legacy_document()).unwrap();
    let report = compute_dashboard_summary(&document.state).report.unwrap();

    // 1.1M FD at the current date, 22M equity.
    assert_eq!(report.fd, d("1100000"));
    assert_eq!(report.current_share_price, d("20"));
    // Purchases run Jan..Dec 2024 + Jan 2025: 2 x 1000, 6 x 2000, then paused.
    assert_eq!(report.totals.total_invested, d("14000"));
    assert_eq!(report.exit_share_price, d("50"));
}

#[test]
fn legacy_state_errors_use_legacy_rules() {
    let mut value = legacy_document();
    value["state"]["optionGrants"][0]["vesting"] = json!("monthly");
    match parse_document(value) {
        Err(DocumentError::Invalid(issues)) => {
            let messages: Vec<String> = issues.iter().map(ToString::to_string).collect();
            assert_eq!(messages.len(), 1);
            assert!(messages[0].starts_with("state.optionGrants.0.vesting: "));
        }
        other => panic!("expected validation failure, got {other:?}"),
    }
}

#[test]
fn current_document_with_legacy_envelope_is_accepted() {
    let state = equity_console::AppState::default();
    let value = json!({"schemaVersion": "v1", "state": serde_json::to_value(&state).unwrap()});
    assert_eq!(parse_document(value).unwrap().state, state);
}

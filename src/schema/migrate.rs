use crate::domain::{
    Acceleration, AppState, ExitScenario, Holding, OptionGrant, SchemaVersion, ShareClass,
    VestingSchedule,
};

use super::v1::{AppStateV1, ExitScenarioV1, OptionGrantV1};

pub const MIGRATED_HOLDER_ID: &str = "common-holders";

fn migrate_grant(grant: OptionGrantV1) -> OptionGrant {
    OptionGrant {
        quantity_granted: grant.quantity_granted,
        strike_price: grant.strike_price,
        grant_date: grant.grant_date,
        expiration_date: grant.expiration_date,
        vesting_schedule: VestingSchedule::standard(grant.grant_date),
        termination_date: None,
        post_termination_exercise_window_days: None,
        acceleration: Some(Acceleration::none()),
    }
}

fn migrate_exit(exit: ExitScenarioV1) -> ExitScenario {
    ExitScenario::with_equity_value(exit.date, exit.exit_equity_value)
}

/// Upgrade a legacy state to the current shape.
///
/// The flat vesting rule becomes a 12-month cliff over 36 monthly periods,
/// and the whole base FD is owned by one holder of a single COMMON class.
pub fn migrate_v1_to_v2(state: AppStateV1) -> AppState {
    let base_total = state.cap_table_base.total();
    let common = ShareClass::common("common", "Common");
    let holding = Holding::new(MIGRATED_HOLDER_ID, &common.id, base_total);

    AppState {
        schema_version: SchemaVersion::V2,
        cap_table_base: state.cap_table_base,
        dilution_events: state.dilution_events,
        valuations: state.valuations,
        exit_scenario: state.exit_scenario.map(migrate_exit),
        option_grants: state.option_grants.into_iter().map(migrate_grant).collect(),
        purchase_plans: state.purchase_plans,
        share_classes: vec![common],
        holdings: vec![holding],
        financing_rounds: Vec::new(),
        convertibles: Vec::new(),
        settings: state.settings,
    }
    .normalized()
}

//! Folding financing rounds and round-converted instruments into the cap
//! table.

use crate::domain::provenance::{convertible_holder_id, round_holder_id};
use crate::domain::{
    AppState, ConvertibleInstrument, Decimal, DerivedSource, DilutionEvent, Holding,
    Participation, ShareClass, ShareClassType, Ymd,
};
use crate::engine::{compute_convertible_conversion, compute_financing_rounds};
use std::collections::HashSet;

fn derived_event(
    date: Ymd,
    shares: Decimal,
    description: String,
    source: DerivedSource,
) -> DilutionEvent {
    DilutionEvent {
        date,
        shares_issued: shares,
        description: Some(description),
        source: Some(source),
    }
}

fn credit_holding(
    holdings: &mut Vec<Holding>,
    holder_id: String,
    class_id: &str,
    shares: Decimal,
    source: DerivedSource,
) {
    match holdings
        .iter_mut()
        .find(|holding| holding.class_id == class_id && holding.holder_id == holder_id)
    {
        Some(existing) => existing.shares += shares,
        None => holdings.push(Holding {
            holder_id,
            class_id: class_id.to_string(),
            shares,
            source: Some(source),
        }),
    }
}

/// Convertibles that convert at a round dated `date`, oldest first.
fn eligible_convertibles<'a>(
    convertibles: &'a [ConvertibleInstrument],
    converted: &HashSet<String>,
    date: Ymd,
) -> Vec<&'a ConvertibleInstrument> {
    let mut eligible: Vec<&ConvertibleInstrument> = convertibles
        .iter()
        .filter(|c| c.converts_on.on_equity_round())
        .filter(|c| !converted.contains(&c.id))
        .filter(|c| c.date_issued <= date)
        .collect();
    eligible.sort_by_key(|c| c.date_issued);
    eligible
}

/// Re-derive round and conversion entities from the state's rounds.
///
/// Everything previously derived (tagged with a `source`, or adopted from
/// legacy labels) is dropped first, so applying twice yields the same state.
/// Derived share classes keep any edited terms but have their invested
/// amount rebuilt; derived classes no round produces anymore are removed.
/// User-defined classes a round targets get the investment on top of their
/// own amount, tracked in `round_contribution`. A state without rounds is
/// returned unchanged.
pub fn apply_financing_rounds(state: &AppState) -> AppState {
    if state.financing_rounds.is_empty() {
        return state.clone();
    }
    let state = &state.normalized();

    let mut events: Vec<DilutionEvent> = state
        .dilution_events
        .iter()
        .filter(|event| !event.is_derived())
        .cloned()
        .collect();
    let mut holdings: Vec<Holding> = state
        .holdings
        .iter()
        .filter(|holding| !holding.is_derived())
        .cloned()
        .collect();
    let mut classes: Vec<ShareClass> = state
        .share_classes
        .iter()
        .cloned()
        .map(|mut class| {
            if class.source.is_some() {
                class.invested_amount = Decimal::ZERO;
            } else if let Some(contribution) = class.round_contribution.take() {
                class.invested_amount = (class.invested_amount - contribution).max_zero();
            }
            class
        })
        .collect();
    let max_seniority = classes
        .iter()
        .filter(|class| class.source.is_none())
        .map(|class| class.seniority)
        .max()
        .unwrap_or(0);

    let results = compute_financing_rounds(&state.financing_rounds, &state.cap_table_base, &events);
    let mut produced: HashSet<String> = HashSet::new();
    let mut converted: HashSet<String> = HashSet::new();

    for (index, result) in results.iter().enumerate() {
        let round = &result.round;
        let class_id = round.share_class_id(index);
        let source = DerivedSource::round(&round.series_name);
        produced.insert(class_id.clone());

        match classes.iter_mut().find(|class| class.id == class_id) {
            Some(existing) => {
                existing.invested_amount += round.investment_amount;
                if existing.source.is_none() {
                    let contribution = existing.round_contribution.unwrap_or_default();
                    existing.round_contribution = Some(contribution + round.investment_amount);
                }
                if existing.is_preferred() && !existing.preference_multiple.is_positive() {
                    existing.preference_multiple = Decimal::ONE;
                }
            }
            None => classes.push(ShareClass {
                id: class_id.clone(),
                name: round.series_name.clone(),
                kind: ShareClassType::Preferred,
                seniority: max_seniority + index as u32 + 1,
                preference_multiple: Decimal::ONE,
                invested_amount: round.investment_amount,
                participation: Participation::None,
                participation_cap_multiple: None,
                round_contribution: None,
                source: Some(source.clone()),
            }),
        }

        credit_holding(
            &mut holdings,
            round_holder_id(&round.series_name),
            &class_id,
            result.new_shares,
            source.clone(),
        );

        if result.new_shares.is_positive() {
            events.push(derived_event(
                round.date,
                result.new_shares,
                format!("Round: {} new shares", round.series_name),
                source.clone(),
            ));
        }
        if result.pool_increase.is_positive() {
            events.push(derived_event(
                round.date,
                result.pool_increase,
                format!("Round: {} pool top-up", round.series_name),
                source.clone(),
            ));
        }

        for convertible in eligible_convertibles(&state.convertibles, &converted, round.date) {
            let Some(conversion) = compute_convertible_conversion(
                convertible,
                result.price_per_share,
                result.pre_round_fd,
                round.date,
            ) else {
                continue;
            };
            let source = DerivedSource::convertible(&convertible.id);
            credit_holding(
                &mut holdings,
                convertible_holder_id(&convertible.id),
                &class_id,
                conversion.shares_issued,
                source.clone(),
            );
            events.push(derived_event(
                round.date,
                conversion.shares_issued,
                format!("Round: {} convertible {}", round.series_name, convertible.id),
                source,
            ));
            tracing::debug!(
                convertible = %convertible.id,
                series = %round.series_name,
                shares = %conversion.shares_issued,
                "convertible converted at round"
            );
            converted.insert(convertible.id.clone());
        }
    }

    classes.retain(|class| class.source.is_none() || produced.contains(&class.id));

    tracing::debug!(
        rounds = results.len(),
        converted = converted.len(),
        "applied financing rounds"
    );

    AppState {
        share_classes: classes,
        holdings,
        dilution_events: events,
        ..state.clone()
    }
}

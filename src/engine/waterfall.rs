//! Exit proceeds distribution across share classes.
//!
//! Preferences are paid in seniority order first. Whatever is left is split
//! pro rata by share count among common, converting preferred, and
//! participating preferred classes, with participation caps enforced by
//! re-spreading any capped excess over the uncapped remainder.

use crate::domain::{Decimal, Holding, Participation, ShareClass, ShareClassType};
use serde::Serialize;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WaterfallDecision {
    Preference,
    Convert,
    Common,
    Participating,
}

impl WaterfallDecision {
    fn rationale(&self, preference_shortfall: bool) -> &'static str {
        match self {
            WaterfallDecision::Common => "Residual after preferences.",
            WaterfallDecision::Preference if preference_shortfall => {
                "Preference limited by available equity."
            }
            WaterfallDecision::Preference => "Preference beats conversion.",
            WaterfallDecision::Participating => "Preference plus participation in the residual.",
            WaterfallDecision::Convert => "Conversion beats preference.",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WaterfallClassResult {
    pub class_id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ShareClassType,
    pub seniority: u32,
    pub shares: Decimal,
    pub preference_amount: Decimal,
    pub conversion_value: Decimal,
    pub decision: WaterfallDecision,
    pub payout: Decimal,
    pub rationale: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WaterfallHoldingResult {
    pub holder_id: String,
    pub class_id: String,
    pub class_name: String,
    pub shares: Decimal,
    pub payout: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WaterfallExitDistribution {
    pub exit_equity_value: Decimal,
    /// Residual left undistributed once every pool entry hit its cap.
    pub remaining_equity: Decimal,
    pub class_results: Vec<WaterfallClassResult>,
    pub holding_results: Vec<WaterfallHoldingResult>,
}

impl WaterfallExitDistribution {
    pub fn total_payout(&self) -> Decimal {
        self.class_results.iter().map(|result| result.payout).sum()
    }

    pub fn class_payout(&self, class_id: &str) -> Option<Decimal> {
        self.class_results
            .iter()
            .find(|result| result.class_id == class_id)
            .map(|result| result.payout)
    }
}

struct PreferredTerms<'a> {
    class: &'a ShareClass,
    shares: Decimal,
    preference_amount: Decimal,
    conversion_value: Decimal,
    decision: WaterfallDecision,
}

#[derive(Debug, Clone)]
struct PoolEntry<'a> {
    class_id: &'a str,
    shares: Decimal,
    /// `None` is uncapped.
    max_additional: Option<Decimal>,
}

/// Spread `residual` pro rata over `entries`, capping and re-spreading until
/// a pass caps nobody. Returns per-class payouts and the undistributed rest.
fn distribute_residual<'a>(
    entries: Vec<PoolEntry<'a>>,
    residual: Decimal,
) -> (HashMap<&'a str, Decimal>, Decimal) {
    let mut payouts: HashMap<&str, Decimal> = HashMap::new();
    let mut residual = residual;
    let max_passes = entries.len() + 1;
    let mut active = entries;

    for pass in 0..max_passes {
        if !residual.is_positive() || active.is_empty() {
            break;
        }
        let total_shares: Decimal = active.iter().map(|entry| entry.shares).sum();
        if !total_shares.is_positive() {
            break;
        }

        let start = residual;
        let mut paid = Decimal::ZERO;
        let mut capped = false;
        let mut next = Vec::with_capacity(active.len());

        for entry in active {
            let pro_rata = entry.shares.mul_div(start, total_shares);
            let payout = entry.max_additional.map_or(pro_rata, |max| pro_rata.min(max));
            paid += payout;
            *payouts.entry(entry.class_id).or_default() += payout;

            match entry.max_additional {
                None => next.push(entry),
                Some(max) if max > pro_rata => next.push(PoolEntry {
                    max_additional: Some((max - payout).max_zero()),
                    ..entry
                }),
                Some(max) if max < pro_rata => capped = true,
                Some(_) => {}
            }
        }

        residual = (start - paid).max_zero();
        if !capped {
            break;
        }
        tracing::debug!(pass, residual = %residual, "participation cap reached, re-spreading residual");

        active = next
            .into_iter()
            .filter(|entry| entry.max_additional.map_or(true, |max| max.is_positive()))
            .collect();
    }

    (payouts, residual)
}

/// Distribute `exit_equity_value` over `share_classes` per the holdings.
pub fn compute_waterfall_exit_distribution(
    share_classes: &[ShareClass],
    holdings: &[Holding],
    exit_equity_value: Decimal,
) -> WaterfallExitDistribution {
    let mut class_shares: HashMap<&str, Decimal> = HashMap::new();
    for holding in holdings {
        *class_shares.entry(holding.class_id.as_str()).or_default() += holding.shares;
    }
    let shares_of = |id: &str| class_shares.get(id).copied().unwrap_or_default();
    let total_converted_shares: Decimal = share_classes.iter().map(|c| shares_of(&c.id)).sum();

    let preferred: Vec<PreferredTerms> = share_classes
        .iter()
        .filter(|class| class.is_preferred())
        .map(|class| {
            let shares = shares_of(&class.id);
            let preference_amount = class.preference_amount();
            let conversion_value = if total_converted_shares.is_positive() {
                shares.mul_div(exit_equity_value, total_converted_shares)
            } else {
                Decimal::ZERO
            };
            let decision = if class.participation == Participation::Full {
                WaterfallDecision::Participating
            } else if conversion_value > preference_amount {
                WaterfallDecision::Convert
            } else {
                WaterfallDecision::Preference
            };
            PreferredTerms {
                class,
                shares,
                preference_amount,
                conversion_value,
                decision,
            }
        })
        .collect();

    let mut by_seniority: Vec<&PreferredTerms> = preferred.iter().collect();
    by_seniority.sort_by(|a, b| {
        a.class
            .seniority
            .cmp(&b.class.seniority)
            .then_with(|| {
                a.class
                    .name
                    .to_lowercase()
                    .cmp(&b.class.name.to_lowercase())
            })
            .then_with(|| a.class.name.cmp(&b.class.name))
    });

    let mut remaining_equity = exit_equity_value;
    let mut preference_paid: HashMap<&str, Decimal> = HashMap::new();
    for terms in by_seniority {
        if !matches!(
            terms.decision,
            WaterfallDecision::Preference | WaterfallDecision::Participating
        ) {
            continue;
        }
        let payout = remaining_equity.min(terms.preference_amount);
        preference_paid.insert(terms.class.id.as_str(), payout);
        remaining_equity -= payout;
    }

    let common_entries = share_classes
        .iter()
        .filter(|class| class.is_common())
        .map(|class| PoolEntry {
            class_id: &class.id,
            shares: shares_of(&class.id),
            max_additional: None,
        });
    let preferred_entries = preferred.iter().filter_map(|terms| match terms.decision {
        WaterfallDecision::Convert => Some(PoolEntry {
            class_id: &terms.class.id,
            shares: terms.shares,
            max_additional: None,
        }),
        WaterfallDecision::Participating => {
            let paid = preference_paid
                .get(terms.class.id.as_str())
                .copied()
                .unwrap_or_default();
            Some(PoolEntry {
                class_id: &terms.class.id,
                shares: terms.shares,
                max_additional: terms
                    .class
                    .participation_cap_total()
                    .map(|cap| (cap - paid).max_zero()),
            })
        }
        _ => None,
    });
    let pool: Vec<PoolEntry> = common_entries
        .chain(preferred_entries)
        .filter(|entry| entry.shares.is_positive())
        .collect();

    let (additional, residual) = distribute_residual(pool, remaining_equity);
    let additional_of = |id: &str| additional.get(id).copied().unwrap_or_default();
    let preference_of = |id: &str| preference_paid.get(id).copied().unwrap_or_default();

    let class_results: Vec<WaterfallClassResult> = share_classes
        .iter()
        .filter_map(|class| {
            let shares = shares_of(&class.id);
            let (preference_amount, conversion_value, decision) = if class.is_common() {
                (Decimal::ZERO, Decimal::ZERO, WaterfallDecision::Common)
            } else {
                let terms = preferred.iter().find(|terms| terms.class.id == class.id)?;
                (terms.preference_amount, terms.conversion_value, terms.decision)
            };
            let payout = match decision {
                WaterfallDecision::Common | WaterfallDecision::Convert => additional_of(&class.id),
                WaterfallDecision::Preference => preference_of(&class.id),
                WaterfallDecision::Participating => {
                    preference_of(&class.id) + additional_of(&class.id)
                }
            };
            let shortfall = payout < preference_amount;
            Some(WaterfallClassResult {
                class_id: class.id.clone(),
                name: class.name.clone(),
                kind: class.kind,
                seniority: class.seniority,
                shares,
                preference_amount,
                conversion_value,
                decision,
                payout,
                rationale: decision.rationale(shortfall).to_string(),
            })
        })
        .collect();

    let class_totals: HashMap<&str, (Decimal, Decimal)> = class_results
        .iter()
        .map(|result| (result.class_id.as_str(), (result.shares, result.payout)))
        .collect();
    let holding_results = holdings
        .iter()
        .map(|holding| {
            let (class_shares, class_payout) = class_totals
                .get(holding.class_id.as_str())
                .copied()
                .unwrap_or_default();
            let payout = if class_shares.is_positive() {
                holding.shares.mul_div(class_payout, class_shares)
            } else {
                Decimal::ZERO
            };
            let class_name = share_classes
                .iter()
                .find(|class| class.id == holding.class_id)
                .map_or_else(|| holding.class_id.clone(), |class| class.name.clone());
            WaterfallHoldingResult {
                holder_id: holding.holder_id.clone(),
                class_id: holding.class_id.clone(),
                class_name,
                shares: holding.shares,
                payout,
            }
        })
        .collect();

    WaterfallExitDistribution {
        exit_equity_value,
        remaining_equity: residual,
        class_results,
        holding_results,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> Decimal {
        Decimal::from_str_canonical(s).unwrap()
    }

    fn preferred(id: &str, seniority: u32, invested: &str) -> ShareClass {
        ShareClass {
            id: id.to_string(),
            name: id.to_uppercase(),
            kind: ShareClassType::Preferred,
            seniority,
            preference_multiple: Decimal::ONE,
            invested_amount: d(invested),
            participation: Participation::None,
            participation_cap_multiple: None,
            round_contribution: None,
            source: None,
        }
    }

    fn setup(invested: &str) -> (Vec<ShareClass>, Vec<Holding>) {
        (
            vec![ShareClass::common("common", "Common"), preferred("series-a", 1, invested)],
            vec![
                Holding::new("Founders", "common", d("1000000")),
                Holding::new("Investors A", "series-a", d("200000")),
            ],
        )
    }

    fn assert_close(actual: Decimal, expected: &str) {
        let diff = (actual - d(expected)).abs();
        assert!(diff < d("0.01"), "expected {expected}, got {actual}");
    }

    #[test]
    fn undersubscribed_preference_takes_everything() {
        let (classes, holdings) = setup("5000000");
        let result = compute_waterfall_exit_distribution(&classes, &holdings, d("4000000"));
        assert_eq!(result.class_payout("common"), Some(Decimal::ZERO));
        assert_eq!(result.class_payout("series-a"), Some(d("4000000")));
        assert_eq!(result.class_results[1].decision, WaterfallDecision::Preference);
        assert_eq!(result.class_results[1].rationale, "Preference limited by available equity.");
    }

    #[test]
    fn preference_beats_conversion_at_medium_exit() {
        let (classes, holdings) = setup("5000000");
        let result = compute_waterfall_exit_distribution(&classes, &holdings, d("7000000"));
        assert_eq!(result.class_payout("common"), Some(d("2000000")));
        assert_eq!(result.class_payout("series-a"), Some(d("5000000")));
        assert_eq!(result.total_payout(), d("7000000"));
    }

    #[test]
    fn conversion_wins_at_high_exit() {
        let (classes, holdings) = setup("5000000");
        let result = compute_waterfall_exit_distribution(&classes, &holdings, d("40000000"));
        assert_eq!(result.class_results[1].decision, WaterfallDecision::Convert);
        assert_close(result.class_payout("common").unwrap(), "33333333.33");
        assert_close(result.class_payout("series-a").unwrap(), "6666666.67");
        assert_close(result.total_payout(), "40000000");
    }

    #[test]
    fn capped_participation_respreads_excess() {
        let (mut classes, mut holdings) = setup("5000000");
        classes[1].participation = Participation::Full;
        classes[1].participation_cap_multiple = Some(d("2"));
        let mut b = preferred("series-b", 2, "4000000");
        b.participation = Participation::Full;
        classes.push(b);
        holdings.push(Holding::new("Investors B", "series-b", d("150000")));

        let result = compute_waterfall_exit_distribution(&classes, &holdings, d("50000000"));
        assert_close(result.class_payout("common").unwrap(), "31304347.83");
        assert_close(result.class_payout("series-a").unwrap(), "10000000");
        assert_close(result.class_payout("series-b").unwrap(), "8695652.17");
        assert_close(result.remaining_equity, "0");
    }

    #[test]
    fn holdings_share_class_payout_per_share() {
        let (classes, _) = setup("5000000");
        let holdings = vec![
            Holding::new("You", "common", d("500000")),
            Holding::new("Team", "common", d("500000")),
            Holding::new("Investors A", "series-a", d("200000")),
        ];
        let result = compute_waterfall_exit_distribution(&classes, &holdings, d("9000000"));
        assert_eq!(result.holding_results[0].payout, d("2000000"));
        assert_eq!(result.holding_results[1].payout, d("2000000"));
        assert_eq!(result.holding_results[2].class_name, "SERIES-A");
    }

    #[test]
    fn no_shares_means_no_conversion_value() {
        let classes = vec![ShareClass::common("common", "Common"), preferred("series-a", 1, "100")];
        let result = compute_waterfall_exit_distribution(&classes, &[], d("1000"));
        assert_eq!(result.class_results[1].conversion_value, Decimal::ZERO);
        assert_eq!(result.class_payout("series-a"), Some(d("100")));
        assert_eq!(result.remaining_equity, d("900"));
    }

    #[test]
    fn equal_seniority_orders_names_case_insensitively() {
        let mut alpha = preferred("alpha", 1, "600");
        alpha.name = "alpha".to_string();
        let mut beta = preferred("beta", 1, "600");
        beta.name = "Beta".to_string();
        let classes = vec![beta, alpha];
        let holdings = vec![
            Holding::new("A", "alpha", d("10")),
            Holding::new("B", "beta", d("10")),
        ];
        let result = compute_waterfall_exit_distribution(&classes, &holdings, d("1000"));
        assert_eq!(result.class_payout("alpha"), Some(d("600")));
        assert_eq!(result.class_payout("beta"), Some(d("400")));
    }

    #[test]
    fn very_large_exit_does_not_overflow() {
        let classes = vec![ShareClass::common("common", "Common")];
        let holdings = vec![Holding::new("Founders", "common", d("10000000000000"))];
        let exit = d("10000000000000000");
        let result = compute_waterfall_exit_distribution(&classes, &holdings, exit);
        assert_eq!(result.class_payout("common"), Some(exit));
        assert_eq!(result.holding_results[0].payout, exit);
        assert_eq!(result.remaining_equity, Decimal::ZERO);
    }

    #[test]
    fn conservation_when_uncapped() {
        for value in ["1", "123456", "5000000", "9999999", "250000000"] {
            let (classes, holdings) = setup("5000000");
            let result = compute_waterfall_exit_distribution(&classes, &holdings, d(value));
            assert_close(result.total_payout(), value);
            assert!(result.remaining_equity < d("0.000001"));
        }
    }
}

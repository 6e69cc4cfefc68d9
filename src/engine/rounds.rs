use crate::domain::{CapTableBase, Decimal, DilutionEvent, FinancingRound};
use serde::Serialize;

use super::fd::compute_fd;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancingRoundResult {
    pub round: FinancingRound,
    pub pre_round_fd: Decimal,
    pub price_per_share: Decimal,
    pub new_shares: Decimal,
    pub pool_increase: Decimal,
    pub post_round_fd: Decimal,
    pub post_option_pool_reserved: Decimal,
}

/// Pool top-up so the pool is `target` of post-round FD:
/// `max(0, (t × (preFd + newShares) - pool) / (1 - t))`.
fn pool_increase(target: Decimal, pre_round_fd: Decimal, new_shares: Decimal, pool: Decimal) -> Decimal {
    let denominator = Decimal::ONE - target;
    if !denominator.is_positive() {
        return Decimal::ZERO;
    }
    ((target * (pre_round_fd + new_shares) - pool) / denominator).max_zero()
}

/// Walk rounds in date order; each round's post-round FD and pool feed the
/// next round.
pub fn compute_financing_rounds(
    rounds: &[FinancingRound],
    base: &CapTableBase,
    events: &[DilutionEvent],
) -> Vec<FinancingRoundResult> {
    let mut ordered: Vec<&FinancingRound> = rounds.iter().collect();
    ordered.sort_by_key(|round| round.date);

    let Some(first) = ordered.first() else {
        return Vec::new();
    };
    let mut current_fd = compute_fd(base, events, first.date);
    let mut current_pool = base.option_pool_reserved;

    ordered
        .into_iter()
        .map(|round| {
            let pre_round_fd = current_fd;
            let price_per_share = if round.pre_money.is_positive() && pre_round_fd.is_positive() {
                round.pre_money / pre_round_fd
            } else {
                Decimal::ZERO
            };
            // investment / price, multiplied out to keep whole-share results exact.
            let new_shares = if price_per_share.is_positive() {
                round.investment_amount.mul_div(pre_round_fd, round.pre_money)
            } else {
                Decimal::ZERO
            };
            let pool_increase = round
                .target_option_pool_post_percent
                .map_or(Decimal::ZERO, |target| {
                    pool_increase(target, pre_round_fd, new_shares, current_pool)
                });

            let post_round_fd = pre_round_fd + new_shares + pool_increase;
            current_fd = post_round_fd;
            current_pool += pool_increase;

            FinancingRoundResult {
                round: round.clone(),
                pre_round_fd,
                price_per_share,
                new_shares,
                pool_increase,
                post_round_fd,
                post_option_pool_reserved: current_pool,
            }
        })
        .collect()
}

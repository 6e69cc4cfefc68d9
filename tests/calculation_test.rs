use equity_console::domain::{
    CapTableBase, ConvertibleInstrument, ConvertsOn, Decimal, FinancingRound, Holding,
    Participation, ShareClass, ShareClassType, Ymd,
};
use equity_console::engine::{
    compute_convertible_conversion, compute_fd, compute_financing_rounds,
    compute_waterfall_exit_distribution, WaterfallDecision,
};

fn d(s: &str) -> Decimal {
    Decimal::from_str_canonical(s).unwrap()
}

fn ymd(s: &str) -> Ymd {
    Ymd::parse(s).unwrap()
}

fn base() -> CapTableBase {
    CapTableBase {
        common_outstanding: d("9000000"),
        option_pool_reserved: d("1000000"),
        other_dilutive_shares: Decimal::ZERO,
    }
}

fn round(date: &str, series: &str, pre_money: &str, investment: &str) -> FinancingRound {
    FinancingRound {
        date: ymd(date),
        pre_money: d(pre_money),
        investment_amount: d(investment),
        target_option_pool_post_percent: None,
        series_name: series.to_string(),
        creates_share_class_id: None,
    }
}

fn preferred(id: &str, invested: &str, participation: Participation, cap: Option<&str>) -> ShareClass {
    ShareClass {
        id: id.to_string(),
        name: id.to_string(),
        kind: ShareClassType::Preferred,
        seniority: 1,
        preference_multiple: Decimal::ONE,
        invested_amount: d(invested),
        participation,
        participation_cap_multiple: cap.map(d),
        round_contribution: None,
        source: None,
    }
}

fn two_class_table() -> Vec<Holding> {
    vec![
        Holding::new("founders", "common", d("8000000")),
        Holding::new("investors", "series-a", d("2000000")),
    ]
}

#[test]
fn rounds_chain_with_pool_top_up() {
    let mut series_a = round("2024-06-01", "A", "20000000", "5000000");
    series_a.target_option_pool_post_percent = Some(d("0.2"));
    // Out of order on purpose; rounds are walked by date.
    let rounds = vec![round("2025-06-01", "B", "28750000", "5750000"), series_a];

    let results = compute_financing_rounds(&rounds, &base(), &[]);
    assert_eq!(results.len(), 2);

    let a = &results[0];
    assert_eq!(a.round.series_name, "A");
    assert_eq!(a.pre_round_fd, d("10000000"));
    assert_eq!(a.price_per_share, d("2"));
    assert_eq!(a.new_shares, d("2500000"));
    assert_eq!(a.pool_increase, d("1875000"));
    assert_eq!(a.post_round_fd, d("14375000"));
    assert_eq!(a.post_option_pool_reserved, d("2875000"));

    let b = &results[1];
    assert_eq!(b.pre_round_fd, d("14375000"));
    assert_eq!(b.price_per_share, d("2"));
    assert_eq!(b.new_shares, d("2875000"));
    assert_eq!(b.pool_increase, Decimal::ZERO);
    assert_eq!(b.post_round_fd, d("17250000"));
}

#[test]
fn round_without_pre_money_issues_nothing() {
    let results = compute_financing_rounds(&[round("2024-06-01", "A", "0", "5000000")], &base(), &[]);
    assert_eq!(results[0].price_per_share, Decimal::ZERO);
    assert_eq!(results[0].new_shares, Decimal::ZERO);
    assert_eq!(results[0].post_round_fd, d("10000000"));
}

#[test]
fn fd_counts_events_on_their_date() {
    let events = vec![
        equity_console::domain::DilutionEvent::new(ymd("2024-06-01"), d("500")),
        equity_console::domain::DilutionEvent::new(ymd("2024-07-01"), d("250")),
    ];
    assert_eq!(compute_fd(&base(), &events, ymd("2024-05-31")), d("10000000"));
    assert_eq!(compute_fd(&base(), &events, ymd("2024-06-01")), d("10000500"));
    assert_eq!(compute_fd(&base(), &events, ymd("2024-12-31")), d("10000750"));
}

#[test]
fn convertible_takes_lowest_price() {
    let mut safe = ConvertibleInstrument::safe(
        "safe-1",
        ymd("2023-01-01"),
        d("500000"),
        ConvertsOn::NextEquityRound,
    );
    safe.cap = Some(d("5000000"));
    safe.discount = Some(d("0.2"));

    // Cap price 0.5 beats the discounted 1.6.
    let conversion = compute_convertible_conversion(&safe, d("2"), d("10000000"), ymd("2024-06-01")).unwrap();
    assert_eq!(conversion.conversion_price, d("0.5"));
    assert_eq!(conversion.shares_issued, d("1000000"));

    safe.cap = Some(d("50000000"));
    let conversion = compute_convertible_conversion(&safe, d("2"), d("10000000"), ymd("2024-06-01")).unwrap();
    assert_eq!(conversion.conversion_price, d("1.6"));
    assert_eq!(conversion.shares_issued, d("312500"));

    assert!(compute_convertible_conversion(&safe, Decimal::ZERO, d("10000000"), ymd("2024-06-01")).is_none());
}

#[test]
fn non_participating_preference_or_conversion() {
    let classes = vec![
        ShareClass::common("common", "Common"),
        preferred("series-a", "10000000", Participation::None, None),
    ];

    let low = compute_waterfall_exit_distribution(&classes, &two_class_table(), d("20000000"));
    assert_eq!(low.class_payout("series-a"), Some(d("10000000")));
    assert_eq!(low.class_payout("common"), Some(d("10000000")));
    let a = low.class_results.iter().find(|r| r.class_id == "series-a").unwrap();
    assert_eq!(a.decision, WaterfallDecision::Preference);
    assert_eq!(a.conversion_value, d("4000000"));

    let high = compute_waterfall_exit_distribution(&classes, &two_class_table(), d("100000000"));
    assert_eq!(high.class_payout("series-a"), Some(d("20000000")));
    assert_eq!(high.class_payout("common"), Some(d("80000000")));
    assert_eq!(high.total_payout(), d("100000000"));
}

#[test]
fn preference_shortfall_leaves_common_nothing() {
    let classes = vec![
        ShareClass::common("common", "Common"),
        preferred("series-a", "10000000", Participation::None, None),
    ];
    let result = compute_waterfall_exit_distribution(&classes, &two_class_table(), d("5000000"));
    let a = result.class_results.iter().find(|r| r.class_id == "series-a").unwrap();
    assert_eq!(a.payout, d("5000000"));
    assert_eq!(a.rationale, "Preference limited by available equity.");
    assert_eq!(result.class_payout("common"), Some(Decimal::ZERO));
}

#[test]
fn participating_with_cap() {
    let classes = vec![
        ShareClass::common("common", "Common"),
        preferred("series-a", "10000000", Participation::Full, Some("2")),
    ];

    let below_cap = compute_waterfall_exit_distribution(&classes, &two_class_table(), d("50000000"));
    assert_eq!(below_cap.class_payout("series-a"), Some(d("18000000")));
    assert_eq!(below_cap.class_payout("common"), Some(d("32000000")));

    let capped = compute_waterfall_exit_distribution(&classes, &two_class_table(), d("200000000"));
    assert_eq!(capped.class_payout("series-a"), Some(d("20000000")));
    assert_eq!(capped.class_payout("common"), Some(d("180000000")));
    assert_eq!(capped.remaining_equity, Decimal::ZERO);
}

#[test]
fn holdings_share_their_class_payout() {
    let classes = vec![ShareClass::common("common", "Common")];
    let holdings = vec![
        Holding::new("a", "common", d("3000")),
        Holding::new("b", "common", d("1000")),
    ];
    let result = compute_waterfall_exit_distribution(&classes, &holdings, d("4000000"));
    let payouts: Vec<Decimal> = result.holding_results.iter().map(|h| h.payout).collect();
    assert_eq!(payouts, vec![d("3000000"), d("1000000")]);
}

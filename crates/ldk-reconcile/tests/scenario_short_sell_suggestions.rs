use ldk_keys::normalize_product;
use ldk_reconcile::*;
use ldk_schemas::{Buy, Sell, TradeStatus};

fn buy(id: &str, ord: &str, product: &str, vol: f64, price: f64, date: &str) -> Buy {
    Buy {
        id: id.into(),
        order_num: Some(ord.into()),
        product: normalize_product(product),
        length: "16".into(),
        volume: vol,
        price,
        date: date.into(),
        ..Default::default()
    }
}

fn short_sell() -> Sell {
    Sell {
        id: "short".into(),
        product: normalize_product("2x4#2"),
        length: "16".into(),
        volume: 23.0,
        price: 450.0,
        freight: Some(69.0),
        date: "2026-02-10".into(),
        ..Default::default()
    }
}

#[test]
fn scenario_suggestions_rank_by_score_and_skip_poor_candidates() {
    let mut cancelled = buy("b-cancelled", "PO-9", "2x4#2", 23.0, 400.0, "2026-02-09");
    cancelled.status = TradeStatus::Cancelled;

    let book = TradeBook::new(
        vec![
            // same product, old date: loses date points
            buy("b-old", "PO-1", "2x4#2", 23.0, 400.0, "2025-11-01"),
            // perfect
            buy("b-best", "PO-2", "2X4 #2", 30.0, 400.0, "2026-02-08"),
            // wrong product entirely
            buy("b-2x6", "PO-3", "2x6#2", 23.0, 400.0, "2026-02-08"),
            // not enough volume left once its own sell is counted
            buy("b-thin", "PO-4", "2x4#2", 23.0, 400.0, "2026-02-08"),
            cancelled,
        ],
        vec![
            Sell {
                id: "s-thin".into(),
                order_num: Some("PO-4".into()),
                volume: 10.0,
                ..Default::default()
            },
            short_sell(),
        ],
    );

    let sell = book.sell("short").unwrap();
    let cfg = AutoMatchConfig::default();
    let suggestions = suggest_matches_for_short(sell, &book, &cfg);

    let ids: Vec<&str> = suggestions.iter().map(|m| m.buy.id.as_str()).collect();
    assert_eq!(ids, vec!["b-best", "b-old"]);
    assert_eq!(suggestions[0].score, 100);
    assert_eq!(suggestions[1].score, 90);
    assert_eq!(suggestions[0].available_volume, 30.0);
    assert_eq!(suggestions[0].margin.margin_per_mbf, 47.0);
}

#[test]
fn scenario_min_score_filters_everything() {
    let book = TradeBook::new(
        vec![buy("b1", "PO-1", "2x4#2", 23.0, 400.0, "2026-02-09")],
        vec![short_sell()],
    );
    let cfg = AutoMatchConfig {
        min_score: 101,
        ..Default::default()
    };
    assert!(suggest_matches_for_short(&book.sells[0], &book, &cfg).is_empty());
}

#[test]
fn scenario_at_most_five_suggestions() {
    let buys: Vec<Buy> = (0..8)
        .map(|i| buy(&format!("b{i}"), &format!("PO-{i}"), "2x4#2", 23.0, 400.0, "2026-02-09"))
        .collect();
    let book = TradeBook::new(buys, vec![short_sell()]);
    let out = suggest_matches_for_short(&book.sells[0], &book, &AutoMatchConfig::default());
    assert_eq!(out.len(), MAX_SUGGESTIONS);
    // equal scores keep book order
    assert_eq!(out[0].buy.id, "b0");
    assert_eq!(out[4].buy.id, "b4");
}

#[test]
fn scenario_confirming_a_suggestion_clears_the_short() {
    let mut book = TradeBook::new(
        vec![buy("b1", "PO-77", "2x4#2", 23.0, 400.0, "2026-02-09")],
        vec![short_sell()],
    );
    assert_eq!(unmatched_sells(&book).len(), 1);

    let best = suggest_matches_for_short(&book.sells[0], &book, &AutoMatchConfig::default())
        .first()
        .map(|m| m.buy.id.clone())
        .unwrap();
    book.confirm_match("short", &best).unwrap();

    assert!(unmatched_sells(&book).is_empty());
    assert_eq!(book.available_volume(&book.buys[0]), 0.0);
    assert!(is_clean_book(&book));
}

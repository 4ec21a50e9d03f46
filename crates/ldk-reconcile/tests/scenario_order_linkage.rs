use ldk_reconcile::*;
use ldk_schemas::{Buy, Sell, TradeStatus};

fn buy(id: &str, ord: Option<&str>, po: Option<&str>, vol: f64) -> Buy {
    Buy {
        id: id.into(),
        order_num: ord.map(Into::into),
        po: po.map(Into::into),
        volume: vol,
        ..Default::default()
    }
}

fn sell(id: &str, ord: Option<&str>, linked: Option<&str>, oc: Option<&str>, vol: f64) -> Sell {
    Sell {
        id: id.into(),
        order_num: ord.map(Into::into),
        linked_po: linked.map(Into::into),
        oc: oc.map(Into::into),
        volume: vol,
        ..Default::default()
    }
}

#[test]
fn scenario_differently_typed_references_link_to_one_buy() {
    let book = TradeBook::new(
        vec![buy("b1", None, Some("PO-123"), 46.0)],
        vec![
            sell("s1", Some("po123"), None, None, 10.0),
            sell("s2", None, Some("PO_123"), None, 12.0),
            sell("s3", None, None, Some("PO 123"), 8.0),
        ],
    );

    let sold = book.order_sold();
    assert_eq!(sold.len(), 1);
    assert_eq!(sold.values().copied().sum::<f64>(), 30.0);
    assert_eq!(book.available_volume(&book.buys[0]), 16.0);
    assert!(unmatched_sells(&book).is_empty());
    assert!(is_clean_book(&book));
}

#[test]
fn scenario_cancelled_sell_releases_volume() {
    let mut book = TradeBook::new(
        vec![buy("b1", Some("PO-1"), None, 23.0)],
        vec![sell("s1", Some("PO-1"), None, None, 23.0)],
    );
    assert_eq!(book.available_volume(&book.buys[0]), 0.0);

    book.sells[0].status = TradeStatus::Cancelled;
    assert_eq!(book.available_volume(&book.buys[0]), 23.0);
}

#[test]
fn scenario_over_sold_order_is_reported_not_clamped() {
    let book = TradeBook::new(
        vec![buy("b1", Some("PO-1"), None, 23.0)],
        vec![
            sell("s1", Some("PO-1"), None, None, 20.0),
            sell("s2", Some("po-1"), None, None, 10.0),
        ],
    );
    assert_eq!(book.available_volume(&book.buys[0]), -7.0);

    let r = reconcile_book(&book);
    assert_eq!(r.status, BookStatus::NeedsAttention);
    assert_eq!(r.reasons, vec![ReconcileReason::OverSold]);
    match &r.diffs[0] {
        ReconcileDiff::OverSold { buy_id, available, .. } => {
            assert_eq!(buy_id, "b1");
            assert_eq!(*available, -7.0);
        }
        other => panic!("unexpected diff: {other:?}"),
    }
}

#[test]
fn scenario_report_is_deterministically_ordered() {
    let book = TradeBook::new(
        vec![
            buy("b1", Some("PO-2"), None, 5.0),
            buy("b2", Some("po2"), None, 5.0),
        ],
        vec![
            sell("s9", None, None, None, 3.0),
            sell("s1", Some("ZZ-1"), None, None, 3.0),
            sell("s2", Some("PO-2"), None, None, 9.0),
        ],
    );

    let a = reconcile_book(&book);
    let b = reconcile_book(&book);
    assert_eq!(a, b);
    assert_eq!(
        a.reasons,
        vec![
            ReconcileReason::OverSold,
            ReconcileReason::ShortSell,
            ReconcileReason::DuplicateBuyKey
        ]
    );

    let short_ids: Vec<&str> = a
        .diffs
        .iter()
        .filter_map(|d| match d {
            ReconcileDiff::ShortSell { sell_id, .. } => Some(sell_id.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(short_ids, vec!["s1", "s9"]);

    assert!(a.diffs.iter().any(|d| matches!(
        d,
        ReconcileDiff::DuplicateBuyKey { buy_ids, .. } if buy_ids == &vec!["b1".to_string(), "b2".to_string()]
    )));
}

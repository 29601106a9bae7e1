//! Property tests for settlement arithmetic.

use bazaar_core::{CoreError, OrderDraft, Product};
use chrono::Utc;
use proptest::prelude::*;

fn product(id: i64, price: i64, stock: i64) -> Product {
    let now = Utc::now();
    Product {
        id,
        store_id: 1,
        category_id: 1,
        name: format!("P{id}"),
        slug: format!("p-{id}"),
        reseller_price_cents: price,
        consumer_price_cents: price,
        stock,
        description: String::new(),
        created_at: now,
        updated_at: now,
    }
}

/// (price, stock, quantity)
fn arb_line() -> impl Strategy<Value = (i64, i64, i64)> {
    (0i64..1_000_000, 0i64..500, 1i64..500)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    /// Order total equals the sum of line totals, and each line total is
    /// quantity × consumer price.
    #[test]
    fn total_is_sum_of_lines(lines in prop::collection::vec(arb_line(), 1..20)) {
        let mut draft = OrderDraft::new(1, 1, "COD");
        let mut expected = 0i64;

        for (i, (price, stock, qty)) in lines.iter().enumerate() {
            let p = product(i as i64 + 1, *price, *stock);
            if draft.add_line(&p, *qty).is_ok() {
                expected += price * qty;
            }
        }

        prop_assert_eq!(draft.total().cents(), expected);
        for dl in draft.lines() {
            prop_assert_eq!(
                dl.line.line_total_cents,
                dl.line.quantity * dl.snapshot.consumer_price_cents
            );
        }
        let sum: i64 = draft.lines().iter().map(|l| l.line.line_total_cents).sum();
        prop_assert_eq!(sum, draft.total().cents());
    }

    /// An accepted line always removes exactly its quantity from stock, and a
    /// rejected one is always an insufficient-stock rejection.
    #[test]
    fn stock_is_conserved((price, stock, qty) in arb_line()) {
        let mut draft = OrderDraft::new(1, 1, "COD");
        let p = product(1, price, stock);

        match draft.add_line(&p, qty) {
            Ok(change) => {
                prop_assert!(qty <= stock);
                prop_assert_eq!(change.previous - change.remaining, qty);
                prop_assert!(change.remaining >= 0);
            }
            Err(CoreError::InsufficientStock { available, requested, .. }) => {
                prop_assert!(qty > stock);
                prop_assert_eq!(available, stock);
                prop_assert_eq!(requested, qty);
                prop_assert!(draft.is_empty());
            }
            Err(other) => prop_assert!(false, "unexpected error: {other}"),
        }
    }
}

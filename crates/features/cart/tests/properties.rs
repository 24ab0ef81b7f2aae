use proptest::prelude::*;
use sapp_cart::{Cart, Decrement};
use sapp_kernel::domain::config::DecrementPolicy;
use sapp_kernel::domain::model::{Item, Money};

#[derive(Debug, Clone)]
enum Op {
    Add(usize),
    Inc(usize),
    Dec(usize),
    Remove(usize),
}

const PRICES: [u64; 5] = [1_000, 550, 199_999, 1, 0];

fn item(index: usize) -> Item {
    Item::new(index.to_string(), format!("Item {index}"), Money::from_minor(PRICES[index]))
}

fn op_strategy() -> impl Strategy<Value = Op> {
    let index = 0..PRICES.len();
    prop_oneof![
        index.clone().prop_map(Op::Add),
        index.clone().prop_map(Op::Inc),
        index.clone().prop_map(Op::Dec),
        index.prop_map(Op::Remove),
    ]
}

fn policy_strategy() -> impl Strategy<Value = DecrementPolicy> {
    prop_oneof![Just(DecrementPolicy::RemoveAtZero), (0u32..4).prop_map(DecrementPolicy::clamp)]
}

fn apply(cart: &mut Cart, op: &Op) {
    match op {
        Op::Add(i) => {
            cart.add_or_increment(item(*i));
        },
        Op::Inc(i) => {
            cart.increment(&i.to_string());
        },
        Op::Dec(i) => {
            cart.decrement(&i.to_string());
        },
        Op::Remove(i) => {
            cart.remove(&i.to_string());
        },
    }
}

proptest! {
    #[test]
    fn totals_equal_fold_over_lines(policy in policy_strategy(), ops in prop::collection::vec(op_strategy(), 0..64)) {
        let mut cart = Cart::new(policy);
        for op in &ops {
            apply(&mut cart, op);

            let totals = cart.totals();
            let amount: u64 = cart.lines().map(|l| l.item.price.minor() * u64::from(l.quantity)).sum();
            let quantity: u64 = cart.lines().map(|l| u64::from(l.quantity)).sum();

            prop_assert_eq!(totals.line_count, cart.len());
            prop_assert_eq!(totals.total_quantity, quantity);
            prop_assert_eq!(totals.total_amount, Money::from_minor(amount));
        }
    }

    #[test]
    fn identities_stay_unique_and_quantities_positive(
        policy in policy_strategy(),
        ops in prop::collection::vec(op_strategy(), 0..64),
    ) {
        let mut cart = Cart::new(policy);
        for op in &ops {
            apply(&mut cart, op);
        }

        let mut ids: Vec<_> = cart.lines().map(|l| l.item.id.to_string()).collect();
        let before = ids.len();
        ids.sort();
        ids.dedup();
        prop_assert_eq!(ids.len(), before);
        prop_assert!(cart.lines().all(|l| l.quantity >= 1));
    }

    #[test]
    fn clamp_never_drops_below_floor(floor in 1u32..5, adds in 1usize..8, decs in 0usize..16) {
        let mut cart = Cart::new(DecrementPolicy::clamp(floor));
        for _ in 0..adds {
            cart.add_or_increment(item(0));
        }
        let start = cart.quantity("0").unwrap_or_default();

        for _ in 0..decs {
            let outcome = cart.decrement("0");
            prop_assert_ne!(outcome, Decrement::Removed);
        }

        let expected = if start <= floor {
            start
        } else {
            start.saturating_sub(u32::try_from(decs).unwrap_or(u32::MAX)).max(floor)
        };
        prop_assert_eq!(cart.quantity("0"), Some(expected));
    }
}

//! Property-based tests for ledger invariants
//!
//! - System fee totals never decrease with height
//! - Once an output is spent, any transaction reusing it is a double spend
//! - Outputs that were not spent remain spendable

mod common;

use chain_core::{governing_token, Fixed8, Transaction, TransactionInput};
use chain_db::Blockchain;
use common::*;
use proptest::prelude::*;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_sys_fee_monotonic(enrollments_per_block in prop::collection::vec(0usize..4, 1..8)) {
        let ledger = memory_ledger();
        let mut seed = 0u16;
        for count in &enrollments_per_block {
            let txs = (0..*count)
                .map(|_| {
                    seed += 1;
                    // unpaid, so only the storage layer accepts it
                    Transaction::enrollment(key(seed), Vec::new(), Vec::new())
                })
                .collect();
            commit(&ledger, txs);
        }

        let fees: Vec<Fixed8> = (0..=ledger.height())
            .map(|h| ledger.get_sys_fee_amount_by_height(h).unwrap().unwrap())
            .collect();
        prop_assert!(fees.windows(2).all(|pair| pair[0] <= pair[1]));

        let total: i64 = enrollments_per_block.iter().map(|c| *c as i64).sum();
        prop_assert_eq!(*fees.last().unwrap(), Fixed8::from_units(total * 1000).unwrap());
    }

    #[test]
    fn prop_spent_outputs_are_double_spends(
        parts in prop::collection::vec(1i64..1_000_000, 1..6),
        pick in any::<prop::sample::Index>(),
    ) {
        let ledger = memory_ledger();
        let remainder = 100_000_000 - parts.iter().sum::<i64>();
        let mut outputs: Vec<_> = parts.iter().map(|units| governing(*units)).collect();
        outputs.push(governing(remainder));
        let count = outputs.len();

        let split = Transaction::contract(vec![issue_input()], outputs);
        commit(&ledger, vec![split.clone()]);
        prop_assert_eq!(
            ledger.get_quantity_issued(&governing_token().hash()).unwrap(),
            Fixed8::from_units(100_000_000).unwrap()
        );

        let respend_genesis = Transaction::contract(vec![issue_input()], vec![governing(100_000_000)]);
        prop_assert!(ledger.is_double_spend(&respend_genesis).unwrap());

        let spent = pick.index(count) as u16;
        let input = TransactionInput::new(split.hash(), spent);
        let value = ledger.get_unspent(&split.hash(), spent).unwrap().unwrap().value;
        let spend = Transaction::contract(vec![input], vec![governing(value.raw() / 100_000_000)]);
        commit(&ledger, vec![spend]);

        for index in 0..count as u16 {
            let reuse = Transaction::contract(
                vec![TransactionInput::new(split.hash(), index)],
                Vec::new(),
            );
            prop_assert_eq!(ledger.is_double_spend(&reuse).unwrap(), index == spent);
            prop_assert_eq!(ledger.contains_unspent(&split.hash(), index).unwrap(), index != spent);
        }
    }
}

//! Pure balance arithmetic.
//!
//! This module never touches the database and never fails: it maps a group's
//! member set and transaction set to signed per-member balances, and splits
//! an amount into exact equal shares. Shares referencing non-members are a
//! data-integrity problem that the loading layer surfaces before reaching
//! this code.

use std::collections::HashMap;

use uuid::Uuid;

use crate::{
    MoneyCents,
    transactions::{Transaction, TransactionKind, TransactionStatus},
};

/// Net position per member: positive = is owed money, negative = owes money.
pub type Balances = HashMap<Uuid, MoneyCents>;

/// Computes the net balance of every group member.
///
/// - Every member gets an entry, zero if untouched by any transaction.
/// - An expense credits the payer with the full amount and debits each share
///   holder with their owed portion. The share's `paid` flag is ignored: the
///   balance reflects who should end up owing what, not settlement progress.
/// - A payment moves money only once `completed`: the payer is debited and
///   the recipient credited. Pending payments contribute nothing.
///
/// The sum over all entries is always exactly zero.
pub fn balances(member_ids: &[Uuid], transactions: &[Transaction]) -> Balances {
    let mut balances: Balances = member_ids
        .iter()
        .map(|id| (*id, MoneyCents::ZERO))
        .collect();

    for tx in transactions {
        match tx.kind {
            TransactionKind::Expense => {
                *balances.entry(tx.payer_id).or_default() += tx.amount;
                for share in &tx.shares {
                    *balances.entry(share.member_id).or_default() -= share.owed;
                }
            }
            TransactionKind::Payment => {
                if tx.status != TransactionStatus::Completed {
                    continue;
                }
                *balances.entry(tx.payer_id).or_default() -= tx.amount;
                if let Some(recipient_id) = tx.recipient_id {
                    *balances.entry(recipient_id).or_default() += tx.amount;
                }
            }
        }
    }

    balances
}

/// Splits `amount` into `n` shares that sum to `amount` exactly.
///
/// Floor division in cents; the remainder is distributed one cent each to
/// the first `remainder` shares (largest-remainder assignment for an equal
/// split). Returns an empty vec for `n == 0`; callers reject empty groups
/// before splitting.
pub fn split_even(amount: MoneyCents, n: usize) -> Vec<MoneyCents> {
    if n == 0 {
        return Vec::new();
    }
    let cents = amount.cents();
    let n_i64 = n as i64;
    let base = cents.div_euclid(n_i64);
    let remainder = cents.rem_euclid(n_i64);

    (0..n_i64)
        .map(|i| MoneyCents::new(if i < remainder { base + 1 } else { base }))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shares::Share;

    fn member() -> Uuid {
        Uuid::new_v4()
    }

    fn expense(payer: Uuid, amount: i64, shares: &[(Uuid, i64)]) -> Transaction {
        let mut tx = Transaction::new(
            Uuid::new_v4(),
            TransactionKind::Expense,
            "test".to_string(),
            MoneyCents::new(amount),
            payer,
            None,
        )
        .unwrap();
        tx.shares = shares
            .iter()
            .map(|(id, owed)| Share::new(tx.id, *id, MoneyCents::new(*owed), false))
            .collect();
        tx
    }

    fn payment(payer: Uuid, recipient: Uuid, amount: i64, status: TransactionStatus) -> Transaction {
        let mut tx = Transaction::new(
            Uuid::new_v4(),
            TransactionKind::Payment,
            "settle".to_string(),
            MoneyCents::new(amount),
            payer,
            Some(recipient),
        )
        .unwrap();
        tx.status = status;
        tx
    }

    #[test]
    fn every_member_gets_an_entry() {
        let (a, b, c) = (member(), member(), member());
        let result = balances(&[a, b, c], &[]);
        assert_eq!(result.len(), 3);
        assert!(result.values().all(|v| v.is_zero()));
    }

    #[test]
    fn expense_credits_payer_and_debits_shares() {
        let (a, b, c) = (member(), member(), member());
        let tx = expense(a, 3000, &[(a, 1000), (b, 1000), (c, 1000)]);
        let result = balances(&[a, b, c], &[tx]);

        assert_eq!(result[&a], MoneyCents::new(2000));
        assert_eq!(result[&b], MoneyCents::new(-1000));
        assert_eq!(result[&c], MoneyCents::new(-1000));
    }

    #[test]
    fn paid_flag_does_not_change_balances() {
        let (a, b) = (member(), member());
        let mut tx = expense(a, 2000, &[(a, 1000), (b, 1000)]);
        for share in &mut tx.shares {
            share.paid = true;
        }
        let result = balances(&[a, b], &[tx]);
        assert_eq!(result[&a], MoneyCents::new(1000));
        assert_eq!(result[&b], MoneyCents::new(-1000));
    }

    #[test]
    fn pending_payment_has_no_effect() {
        let (a, b) = (member(), member());
        let tx = payment(a, b, 1000, TransactionStatus::Pending);
        let result = balances(&[a, b], &[tx]);
        assert!(result[&a].is_zero());
        assert!(result[&b].is_zero());
    }

    #[test]
    fn completed_payment_debits_payer_credits_recipient() {
        let (a, b) = (member(), member());
        let tx = payment(a, b, 1000, TransactionStatus::Completed);
        let result = balances(&[a, b], &[tx]);
        assert_eq!(result[&a], MoneyCents::new(-1000));
        assert_eq!(result[&b], MoneyCents::new(1000));
    }

    #[test]
    fn conservation_over_mixed_history() {
        let (a, b, c) = (member(), member(), member());
        let txs = vec![
            expense(a, 3000, &[(a, 1000), (b, 1000), (c, 1000)]),
            expense(b, 1001, &[(a, 334), (b, 334), (c, 333)]),
            payment(c, a, 500, TransactionStatus::Completed),
            payment(b, a, 250, TransactionStatus::Pending),
        ];
        let result = balances(&[a, b, c], &txs);
        let total: MoneyCents = result.values().copied().sum();
        assert!(total.is_zero());
    }

    #[test]
    fn split_even_sums_exactly_for_all_small_n() {
        for n in 1..=13 {
            for amount in [1, 99, 100, 1000, 3000, 10_001] {
                let shares = split_even(MoneyCents::new(amount), n);
                assert_eq!(shares.len(), n);
                let total: MoneyCents = shares.iter().copied().sum();
                assert_eq!(total.cents(), amount, "n={n} amount={amount}");
            }
        }
    }

    #[test]
    fn split_even_puts_remainder_on_first_shares() {
        let shares = split_even(MoneyCents::new(1000), 3);
        assert_eq!(
            shares,
            vec![
                MoneyCents::new(334),
                MoneyCents::new(333),
                MoneyCents::new(333)
            ]
        );
    }

    #[test]
    fn split_even_single_member_takes_all() {
        assert_eq!(split_even(MoneyCents::new(777), 1), vec![MoneyCents::new(777)]);
    }
}

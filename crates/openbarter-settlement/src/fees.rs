//! Fee splitting — a pure function from (price, schedule) to payouts.
//!
//! Each fee takes `floor(price * rate / 10000)`; whatever remains after
//! all fees goes to the seller. Rounding dust therefore always accrues to
//! the seller, never disappears: `sum(payouts) + seller_proceeds == price`
//! holds exactly for every schedule the validator admits.

use openbarter_types::{
    constants::INVERSE_BASIS_POINT, Fee, FeePayout, OpenbarterError, Result,
};

/// The outcome of splitting a settlement price across a fee schedule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeeSplit {
    /// One payout per schedule entry, in schedule order. Zero-amount
    /// entries (floor rounding) are kept so receipts stay complete.
    pub payouts: Vec<FeePayout>,
    /// What the seller receives: price minus total fees.
    pub seller_proceeds: u128,
}

impl FeeSplit {
    /// Sum of all fee payouts.
    #[must_use]
    pub fn total_fees(&self) -> u128 {
        self.payouts.iter().map(|payout| payout.amount).sum()
    }
}

/// Split `price` across `fees`.
///
/// # Errors
/// Returns `FeeOverflow` if any single computation overflows u128 or the
/// accumulated fees would exceed the price. The sum-of-rates invariant is
/// enforced upstream by the validator; this is the defensive double-check
/// guaranteeing no transfer can over-collect.
pub fn split(price: u128, fees: &[Fee]) -> Result<FeeSplit> {
    let mut payouts = Vec::with_capacity(fees.len());
    let mut total: u128 = 0;

    for fee in fees {
        let amount = price
            .checked_mul(u128::from(fee.rate))
            .ok_or_else(|| OpenbarterError::FeeOverflow {
                reason: format!("price {price} times rate {} overflows", fee.rate),
            })?
            / u128::from(INVERSE_BASIS_POINT);
        total = total
            .checked_add(amount)
            .ok_or_else(|| OpenbarterError::FeeOverflow {
                reason: "accumulated fees overflow".to_string(),
            })?;
        payouts.push(FeePayout {
            recipient: fee.recipient,
            amount,
        });
    }

    if total > price {
        return Err(OpenbarterError::FeeOverflow {
            reason: format!("fees {total} exceed price {price}"),
        });
    }

    Ok(FeeSplit {
        payouts,
        seller_proceeds: price - total,
    })
}

#[cfg(test)]
mod tests {
    use openbarter_types::Address;

    use super::*;

    const ETH: u128 = 1_000_000_000_000_000_000;

    fn fee(rate: u16, byte: u8) -> Fee {
        Fee {
            rate,
            recipient: Address([byte; 32]),
        }
    }

    #[test]
    fn no_fees_all_to_seller() {
        let split = split(10 * ETH, &[]).unwrap();
        assert!(split.payouts.is_empty());
        assert_eq!(split.seller_proceeds, 10 * ETH);
    }

    #[test]
    fn marketplace_and_royalty_example() {
        // price 10 units, 500 bps marketplace + 1000 bps royalty:
        // cal gets 0.5, abe gets 1.0, seller keeps 8.5.
        let split = split(10 * ETH, &[fee(500, 0xca), fee(1000, 0xab)]).unwrap();
        assert_eq!(split.payouts[0].amount, ETH / 2);
        assert_eq!(split.payouts[1].amount, ETH);
        assert_eq!(split.seller_proceeds, 8 * ETH + ETH / 2);
        assert_eq!(split.total_fees() + split.seller_proceeds, 10 * ETH);
    }

    #[test]
    fn rounding_dust_accrues_to_seller() {
        // 3 bps of 999: floor(999 * 3 / 10000) = 0 — the payout rounds to
        // zero and the full price stays with the seller.
        let split = split(999, &[fee(3, 1)]).unwrap();
        assert_eq!(split.payouts[0].amount, 0);
        assert_eq!(split.seller_proceeds, 999);
    }

    #[test]
    fn conservation_across_schedules() {
        let schedules: Vec<Vec<Fee>> = vec![
            vec![fee(1, 1)],
            vec![fee(250, 1), fee(250, 2), fee(500, 3)],
            vec![fee(9_999, 1)],
            vec![fee(10_000, 1)],
            vec![fee(3_333, 1), fee(3_333, 2), fee(3_334, 3)],
        ];
        for fees in &schedules {
            for price in [1u128, 7, 999, 10_000, 123_456_789, 10 * ETH] {
                let split = split(price, fees).unwrap();
                assert_eq!(
                    split.total_fees() + split.seller_proceeds,
                    price,
                    "conservation violated for price {price} fees {fees:?}"
                );
            }
        }
    }

    #[test]
    fn full_price_in_fees_leaves_seller_nothing() {
        let split = split(10_000, &[fee(10_000, 1)]).unwrap();
        assert_eq!(split.payouts[0].amount, 10_000);
        assert_eq!(split.seller_proceeds, 0);
    }

    #[test]
    fn overflow_rejected_before_any_transfer() {
        let err = split(u128::MAX, &[fee(2, 1)]).unwrap_err();
        assert!(matches!(err, OpenbarterError::FeeOverflow { .. }));
    }

    #[test]
    fn over_collection_rejected() {
        // Rates summing past 10000 are stopped by the validator; if one
        // sneaks through, the split itself refuses.
        let err = split(10_000, &[fee(10_000, 1), fee(5_000, 2)]).unwrap_err();
        assert!(matches!(err, OpenbarterError::FeeOverflow { .. }));
    }
}

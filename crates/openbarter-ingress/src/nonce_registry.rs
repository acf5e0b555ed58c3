//! Replay and cancellation bookkeeping.
//!
//! Two mechanisms together make order processing idempotent:
//!
//! - a per-maker monotonic **nonce**: bumping it invalidates every order
//!   the maker signed under the prior value in one operation;
//! - a per-hash **consumed-set**: settlement and explicit cancellation
//!   both mark the order hash, and a marked order can never settle again.
//!
//! An order is settleable only while
//! `order.nonce == current_nonce(maker) && !is_consumed(hash)`.

use std::collections::{HashMap, HashSet};

use chrono::Utc;
use openbarter_types::{
    Address, CancellationRecord, NonceBumpRecord, OpenbarterError, Order, OrderHash, Result,
};

/// Per-maker nonce counters plus the consumed-set of order hashes.
#[derive(Debug, Default)]
pub struct NonceRegistry {
    nonces: HashMap<Address, u64>,
    consumed: HashSet<OrderHash>,
}

impl NonceRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The maker's current nonce. Orders must be signed under this value.
    #[must_use]
    pub fn current_nonce(&self, maker: &Address) -> u64 {
        self.nonces.get(maker).copied().unwrap_or(0)
    }

    /// Bump the caller's nonce, invalidating every order they signed
    /// under the prior value. Maker-authorized by construction: the
    /// counter bumped is always the caller's own.
    pub fn increment_nonce(&mut self, caller: Address) -> NonceBumpRecord {
        let counter = self.nonces.entry(caller).or_insert(0);
        *counter += 1;
        let record = NonceBumpRecord {
            maker: caller,
            new_nonce: *counter,
            bumped_at: Utc::now(),
        };
        tracing::info!(maker = %caller, new_nonce = record.new_nonce, "Nonce bumped");
        record
    }

    /// Cancel a specific order without settling it.
    ///
    /// # Errors
    /// - `Unauthorized` if the caller is not the order's maker
    /// - `OrderConsumed` if the order was already settled or cancelled
    pub fn cancel(&mut self, caller: Address, order: &Order) -> Result<CancellationRecord> {
        if caller != order.maker {
            return Err(OpenbarterError::Unauthorized {
                reason: format!("cancel by {caller} on order made by {}", order.maker),
            });
        }
        let hash = order.digest();
        if self.consumed.contains(&hash) {
            return Err(OpenbarterError::OrderConsumed(hash));
        }
        self.consumed.insert(hash);
        tracing::info!(order_hash = %hash, maker = %caller, "Order cancelled");
        Ok(CancellationRecord {
            order_hash: hash,
            maker: caller,
            cancelled_at: Utc::now(),
        })
    }

    /// Mark an order hash consumed. Called by the settlement path after
    /// transfers succeed.
    pub fn mark_consumed(&mut self, hash: OrderHash) {
        self.consumed.insert(hash);
    }

    /// Whether an order hash has been settled or cancelled.
    #[must_use]
    pub fn is_consumed(&self, hash: &OrderHash) -> bool {
        self.consumed.contains(hash)
    }

    /// Number of consumed order hashes tracked.
    #[must_use]
    pub fn consumed_len(&self) -> usize {
        self.consumed.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn maker() -> Address {
        Address([1u8; 32])
    }

    #[test]
    fn fresh_maker_nonce_is_zero() {
        let registry = NonceRegistry::new();
        assert_eq!(registry.current_nonce(&maker()), 0);
    }

    #[test]
    fn increment_is_monotonic() {
        let mut registry = NonceRegistry::new();
        let r1 = registry.increment_nonce(maker());
        let r2 = registry.increment_nonce(maker());
        assert_eq!(r1.new_nonce, 1);
        assert_eq!(r2.new_nonce, 2);
        assert_eq!(registry.current_nonce(&maker()), 2);
    }

    #[test]
    fn increment_scoped_per_maker() {
        let mut registry = NonceRegistry::new();
        registry.increment_nonce(maker());
        assert_eq!(registry.current_nonce(&Address([2u8; 32])), 0);
    }

    #[test]
    fn cancel_marks_consumed() {
        let mut registry = NonceRegistry::new();
        let order = Order::dummy_sell(maker(), 1, 1_000);
        let record = registry.cancel(maker(), &order).unwrap();
        assert_eq!(record.order_hash, order.digest());
        assert!(registry.is_consumed(&order.digest()));
    }

    #[test]
    fn cancel_by_non_maker_rejected() {
        let mut registry = NonceRegistry::new();
        let order = Order::dummy_sell(maker(), 1, 1_000);
        let err = registry.cancel(Address([9u8; 32]), &order).unwrap_err();
        assert!(matches!(err, OpenbarterError::Unauthorized { .. }));
        assert!(!registry.is_consumed(&order.digest()));
    }

    #[test]
    fn double_cancel_rejected() {
        let mut registry = NonceRegistry::new();
        let order = Order::dummy_sell(maker(), 1, 1_000);
        registry.cancel(maker(), &order).unwrap();
        let err = registry.cancel(maker(), &order).unwrap_err();
        assert!(matches!(err, OpenbarterError::OrderConsumed(_)));
    }

    #[test]
    fn mark_consumed_is_idempotent_set_insert() {
        let mut registry = NonceRegistry::new();
        let hash = OrderHash([5u8; 32]);
        registry.mark_consumed(hash);
        registry.mark_consumed(hash);
        assert!(registry.is_consumed(&hash));
        assert_eq!(registry.consumed_len(), 1);
    }
}

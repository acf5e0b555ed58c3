//! Per-order validation pipeline — hard gate for settlement.
//!
//! Every order entering the settlement path goes through [`OrderValidator::validate`]
//! before any asset moves. Checks run in a fixed sequence and fail closed:
//! structure, listing window, consumption, nonce, authorization. A failure
//! at any step aborts with the specific error for that step and no state
//! change anywhere.

use chrono::{DateTime, Utc};
use openbarter_types::{
    constants::INVERSE_BASIS_POINT, Address, Authorization, OpenbarterError, OrderHash, Result,
    SignedOrder,
};

use crate::nonce_registry::NonceRegistry;
use crate::signature;

/// Validates a single signed order against structure, lifecycle state,
/// and authorization.
#[derive(Debug, Clone)]
pub struct OrderValidator {
    /// Maximum fee entries accepted per order.
    max_fees_per_order: usize,
}

impl OrderValidator {
    #[must_use]
    pub fn new(max_fees_per_order: usize) -> Self {
        Self { max_fees_per_order }
    }

    /// Run the full validation sequence. Returns the order's canonical
    /// hash on success.
    ///
    /// # Errors
    /// - `InvalidOrder` for structural failures (zero quantity, oversized
    ///   or over-limit fee schedule)
    /// - `OrderExpired` when `now` is outside the listing window
    /// - `OrderConsumed` when the hash is already settled or cancelled
    /// - `NonceMismatch` when the order was signed under a stale nonce
    /// - `SignatureInvalid` when authorization fails
    pub fn validate(
        &self,
        signed: &SignedOrder,
        caller: &Address,
        registry: &NonceRegistry,
        now: DateTime<Utc>,
    ) -> Result<OrderHash> {
        let order = &signed.order;

        // 1. Structure
        if order.amount == 0 {
            return Err(OpenbarterError::InvalidOrder {
                reason: "quantity must be positive".to_string(),
            });
        }
        if order.fees.len() > self.max_fees_per_order {
            return Err(OpenbarterError::InvalidOrder {
                reason: format!(
                    "{} fee entries exceeds maximum {}",
                    order.fees.len(),
                    self.max_fees_per_order,
                ),
            });
        }
        if order.total_fee_rate() > INVERSE_BASIS_POINT {
            return Err(OpenbarterError::InvalidOrder {
                reason: format!(
                    "fee rates sum to {} basis points, ceiling is {INVERSE_BASIS_POINT}",
                    order.total_fee_rate(),
                ),
            });
        }

        let hash = order.digest();

        // 2. Listing window
        if !order.is_live(now) {
            return Err(OpenbarterError::OrderExpired(hash));
        }

        // 3. Consumption
        if registry.is_consumed(&hash) {
            return Err(OpenbarterError::OrderConsumed(hash));
        }

        // 4. Nonce
        let registry_nonce = registry.current_nonce(&order.maker);
        if order.nonce != registry_nonce {
            return Err(OpenbarterError::NonceMismatch {
                maker: order.maker,
                order_nonce: order.nonce,
                registry_nonce,
            });
        }

        // 5. Authorization
        match &signed.authorization {
            Authorization::Caller => {
                if caller != &order.maker {
                    return Err(OpenbarterError::SignatureInvalid { maker: order.maker });
                }
                // Explicit bypass: the settling caller is the maker.
                tracing::debug!(
                    order_hash = %hash,
                    maker = %order.maker,
                    "Self-authorized order accepted without signature"
                );
            }
            Authorization::Signature(sig) => {
                if !signature::verify(&hash, sig, &order.maker) {
                    return Err(OpenbarterError::SignatureInvalid { maker: order.maker });
                }
            }
        }

        Ok(hash)
    }
}

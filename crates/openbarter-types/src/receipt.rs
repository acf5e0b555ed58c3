//! Settlement and cancellation records emitted by the engine.
//!
//! Every successful settlement produces a [`SettlementReceipt`]; explicit
//! cancellations and nonce bumps produce their own records. Together they
//! form the engine's append-only audit trail.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    Address, AssetClass, CollectionId, OrderHash, PaymentToken, SettlementId, TokenId,
};

/// One fee recipient's cut of a settlement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeePayout {
    pub recipient: Address,
    /// Amount actually paid, in the payment token's smallest unit.
    pub amount: u128,
}

/// Record of one settled trade.
///
/// Conservation invariant: `fee_payouts` amounts plus `seller_proceeds`
/// sum exactly to `price`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementReceipt {
    pub id: SettlementId,
    pub sell_hash: OrderHash,
    pub buy_hash: OrderHash,
    /// The seller (the sell order's maker).
    pub maker: Address,
    /// The buyer (the buy order's maker).
    pub taker: Address,
    pub collection: CollectionId,
    pub token_id: TokenId,
    pub amount: u64,
    pub asset_class: AssetClass,
    pub payment_token: PaymentToken,
    /// The policy-adjudicated settlement price.
    pub price: u128,
    /// Every entry of the charged fee schedule, including zero-amount
    /// payouts from floor rounding.
    pub fee_payouts: Vec<FeePayout>,
    /// What the seller received: price minus total fees.
    pub seller_proceeds: u128,
    pub settled_at: DateTime<Utc>,
}

impl SettlementReceipt {
    /// Sum of all fee payouts.
    #[must_use]
    pub fn total_fees(&self) -> u128 {
        self.fee_payouts.iter().map(|payout| payout.amount).sum()
    }
}

/// Record of an explicit single-order cancellation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CancellationRecord {
    pub order_hash: OrderHash,
    pub maker: Address,
    pub cancelled_at: DateTime<Utc>,
}

/// Record of a maker-wide nonce bump (bulk cancellation).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NonceBumpRecord {
    pub maker: Address,
    pub new_nonce: u64,
    pub bumped_at: DateTime<Utc>,
}

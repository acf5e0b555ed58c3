//! The matching-policy capability.
//!
//! A policy is pure adjudication: given a sell order and a buy order it
//! either derives the agreed trade terms or judges the pair incompatible.
//! It never touches engine state, so the same inputs always produce the
//! same terms.

use serde::{Deserialize, Serialize};

use openbarter_types::{AssetClass, Order, PaymentToken, PolicyId, TokenId};

/// The adjudicated final terms of a trade.
///
/// May differ from either order's literal price field under future
/// policies (auction decay); under the standard policies it echoes the
/// shared fields exactly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchTerms {
    pub price: u128,
    pub token_id: TokenId,
    pub amount: u64,
    pub payment_token: PaymentToken,
    pub asset_class: AssetClass,
}

/// Decides whether a sell order and a buy order are compatible and at
/// what terms.
///
/// Policies are selected per order by the [`PolicyId`] the order carries
/// and dispatched through the registry, so new policies (auction decay,
/// criteria-based collection offers) can be added without touching the
/// settlement engine.
pub trait MatchingPolicy: Send + Sync {
    /// The identifier orders use to select this policy.
    fn id(&self) -> PolicyId;

    /// `Some(terms)` if the pair is compatible, `None` otherwise.
    fn matches(&self, sell: &Order, buy: &Order) -> Option<MatchTerms>;
}

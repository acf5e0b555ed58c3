//! Policy registry — dispatch by the [`PolicyId`] carried in the order.

use std::collections::HashMap;
use std::sync::Arc;

use openbarter_types::{OpenbarterError, Order, OrderHash, PolicyId, Result};

use crate::matching::{MatchTerms, MatchingPolicy};
use crate::standard::{StandardErc1155Policy, StandardErc721Policy};

/// Maps policy identifiers to policy implementations.
///
/// Only registered policies can adjudicate a pair; an order naming an
/// unknown policy is rejected before any matching happens.
pub struct PolicyRegistry {
    policies: HashMap<PolicyId, Arc<dyn MatchingPolicy>>,
}

impl PolicyRegistry {
    /// An empty registry. Useful for engines that whitelist policies
    /// one by one.
    #[must_use]
    pub fn new() -> Self {
        Self {
            policies: HashMap::new(),
        }
    }

    /// A registry with both standard fixed-price policies registered.
    #[must_use]
    pub fn with_standard_policies() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(StandardErc721Policy));
        registry.register(Arc::new(StandardErc1155Policy));
        registry
    }

    /// Register (whitelist) a policy under its own id.
    pub fn register(&mut self, policy: Arc<dyn MatchingPolicy>) {
        self.policies.insert(policy.id(), policy);
    }

    #[must_use]
    pub fn is_registered(&self, id: &PolicyId) -> bool {
        self.policies.contains_key(id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.policies.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.policies.is_empty()
    }

    /// Adjudicate a pair under the policy both orders selected.
    ///
    /// # Errors
    /// - `OrdersDoNotMatch` if the orders name different policies, or the
    ///   policy judges them incompatible
    /// - `PolicyNotRegistered` if the named policy is unknown
    pub fn adjudicate(
        &self,
        sell: &Order,
        buy: &Order,
        sell_hash: OrderHash,
        buy_hash: OrderHash,
    ) -> Result<MatchTerms> {
        if sell.policy != buy.policy {
            tracing::debug!(
                sell_policy = %sell.policy,
                buy_policy = %buy.policy,
                "Orders name different policies"
            );
            return Err(OpenbarterError::OrdersDoNotMatch { sell_hash, buy_hash });
        }
        let policy = self
            .policies
            .get(&sell.policy)
            .ok_or_else(|| OpenbarterError::PolicyNotRegistered(sell.policy.clone()))?;
        policy
            .matches(sell, buy)
            .ok_or(OpenbarterError::OrdersDoNotMatch { sell_hash, buy_hash })
    }
}

impl Default for PolicyRegistry {
    fn default() -> Self {
        Self::with_standard_policies()
    }
}

impl std::fmt::Debug for PolicyRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PolicyRegistry")
            .field("policies", &self.policies.keys().collect::<Vec<_>>())
            .finish()
    }
}

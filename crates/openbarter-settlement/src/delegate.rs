//! Execution delegate — the sole authorized conduit for moving assets.
//!
//! Owners grant the delegate a per-asset-class transfer approval once,
//! out of band; revocation is a single action. The settlement engine only
//! ever holds a reference to this capability, never raw ledger-mutation
//! rights.
//!
//! ## Atomicity
//!
//! A settlement's asset and payment movements are gathered into a
//! [`TransferPlan`]. [`ExecutionDelegate::execute_plan`] validates every
//! leg (aggregating multi-leg outflows per source, so cumulative balances
//! are checked) before applying any of them: a plan either applies fully
//! or leaves the ledgers untouched.

use std::collections::{HashMap, HashSet};

use openbarter_types::{
    Address, AssetClass, CollectionId, OpenbarterError, PaymentToken, Result, TokenId,
};

/// One asset or payment movement inside a settlement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransferStep {
    Asset {
        asset_class: AssetClass,
        collection: CollectionId,
        token_id: TokenId,
        from: Address,
        to: Address,
        amount: u64,
    },
    Payment {
        token: PaymentToken,
        from: Address,
        to: Address,
        amount: u128,
    },
}

/// The buffered effects of one settlement, applied all-or-nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransferPlan {
    steps: Vec<TransferStep>,
}

impl TransferPlan {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, step: TransferStep) {
        self.steps.push(step);
    }

    #[must_use]
    pub fn steps(&self) -> &[TransferStep] {
        &self.steps
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

/// Approval table plus the in-memory asset and payment ledgers.
///
/// The approval table is mutated only by the owning identity's explicit
/// grant/revoke calls and is read (never written) during settlement.
#[derive(Debug, Default)]
pub struct ExecutionDelegate {
    /// (owner, asset class) pairs that may be moved on the owner's behalf.
    asset_approvals: HashSet<(Address, AssetClass)>,
    /// (owner, token) pairs the delegate may pull payments from. Native
    /// currency needs no approval — it is covered by attached value.
    payment_approvals: HashSet<(Address, PaymentToken)>,
    /// ERC721: one owner per (collection, token).
    erc721_owners: HashMap<(CollectionId, TokenId), Address>,
    /// ERC1155: per-holder balances per (collection, token).
    erc1155_balances: HashMap<(CollectionId, TokenId, Address), u64>,
    /// Payment balances per (token, holder), native included.
    payment_balances: HashMap<(PaymentToken, Address), u128>,
}

impl ExecutionDelegate {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // -----------------------------------------------------------------
    // Approvals
    // -----------------------------------------------------------------

    /// Owner grants the delegate transfer rights for one asset class.
    pub fn grant_approval(&mut self, owner: Address, asset_class: AssetClass) {
        self.asset_approvals.insert((owner, asset_class));
    }

    /// Owner revokes an asset-class approval. One action, immediately
    /// visible to all subsequent settlements.
    pub fn revoke_approval(&mut self, owner: Address, asset_class: AssetClass) {
        self.asset_approvals.remove(&(owner, asset_class));
    }

    #[must_use]
    pub fn has_approval(&self, owner: &Address, asset_class: AssetClass) -> bool {
        self.asset_approvals.contains(&(*owner, asset_class))
    }

    /// Owner allows the delegate to pull a fungible payment token.
    pub fn grant_payment_approval(&mut self, owner: Address, token: PaymentToken) {
        self.payment_approvals.insert((owner, token));
    }

    pub fn revoke_payment_approval(&mut self, owner: Address, token: &PaymentToken) {
        self.payment_approvals.remove(&(owner, token.clone()));
    }

    #[must_use]
    pub fn has_payment_approval(&self, owner: &Address, token: &PaymentToken) -> bool {
        token.is_native() || self.payment_approvals.contains(&(*owner, token.clone()))
    }

    // -----------------------------------------------------------------
    // Ledger seeding & queries
    // -----------------------------------------------------------------

    /// Record a freshly minted ERC721 token.
    pub fn mint_erc721(&mut self, collection: CollectionId, token_id: TokenId, owner: Address) {
        self.erc721_owners.insert((collection, token_id), owner);
    }

    /// Credit a holder with ERC1155 units.
    pub fn mint_erc1155(
        &mut self,
        collection: CollectionId,
        token_id: TokenId,
        owner: Address,
        amount: u64,
    ) {
        let balance = self
            .erc1155_balances
            .entry((collection, token_id, owner))
            .or_insert(0);
        *balance = balance.saturating_add(amount);
    }

    /// Credit a holder with payment funds (native or fungible).
    pub fn deposit(&mut self, token: PaymentToken, owner: Address, amount: u128) {
        let balance = self.payment_balances.entry((token, owner)).or_insert(0);
        *balance = balance.saturating_add(amount);
    }

    #[must_use]
    pub fn owner_of(&self, collection: &CollectionId, token_id: TokenId) -> Option<Address> {
        self.erc721_owners
            .get(&(collection.clone(), token_id))
            .copied()
    }

    #[must_use]
    pub fn erc1155_balance(
        &self,
        collection: &CollectionId,
        token_id: TokenId,
        owner: &Address,
    ) -> u64 {
        self.erc1155_balances
            .get(&(collection.clone(), token_id, *owner))
            .copied()
            .unwrap_or(0)
    }

    #[must_use]
    pub fn payment_balance(&self, token: &PaymentToken, owner: &Address) -> u128 {
        self.payment_balances
            .get(&(token.clone(), *owner))
            .copied()
            .unwrap_or(0)
    }

    // -----------------------------------------------------------------
    // Transfers
    // -----------------------------------------------------------------

    /// Move a non-fungible or semi-fungible asset on the owner's behalf.
    ///
    /// # Errors
    /// `TransferFailed` if the owner has not approved the delegate for
    /// this asset class, the token does not exist, `from` does not own
    /// (enough of) it, or the quantity is invalid for the class.
    pub fn transfer(
        &mut self,
        asset_class: AssetClass,
        collection: &CollectionId,
        from: Address,
        to: Address,
        token_id: TokenId,
        amount: u64,
    ) -> Result<()> {
        self.check_asset(asset_class, collection, from, token_id, amount)?;
        self.apply_asset(asset_class, collection, from, to, token_id, amount);
        Ok(())
    }

    /// Move payment funds on the payer's behalf.
    ///
    /// # Errors
    /// `TransferFailed` on missing fungible approval or insufficient
    /// balance.
    pub fn transfer_payment(
        &mut self,
        token: &PaymentToken,
        from: Address,
        to: Address,
        amount: u128,
    ) -> Result<()> {
        self.check_payment(token, from, amount)?;
        self.apply_payment(token, from, to, amount);
        Ok(())
    }

    /// Apply a whole settlement plan atomically: validate every leg with
    /// per-source aggregation, then apply. On any validation failure the
    /// ledgers are untouched.
    pub fn execute_plan(&mut self, plan: &TransferPlan) -> Result<()> {
        // Phase 1: validate. Outflows are aggregated per source so that
        // several legs drawing on the same balance are checked against
        // their cumulative total, and a token may appear in at most one
        // ERC721 leg per plan.
        let mut payment_outflows: HashMap<(PaymentToken, Address), u128> = HashMap::new();
        let mut erc1155_outflows: HashMap<(CollectionId, TokenId, Address), u64> = HashMap::new();
        let mut erc721_moved: HashSet<(CollectionId, TokenId)> = HashSet::new();

        for step in plan.steps() {
            match step {
                TransferStep::Asset {
                    asset_class,
                    collection,
                    token_id,
                    from,
                    amount,
                    ..
                } => {
                    self.check_asset(*asset_class, collection, *from, *token_id, *amount)?;
                    match asset_class {
                        AssetClass::Erc721 => {
                            if !erc721_moved.insert((collection.clone(), *token_id)) {
                                return Err(OpenbarterError::TransferFailed {
                                    reason: format!(
                                        "token {collection}{token_id} moved twice in one plan"
                                    ),
                                });
                            }
                        }
                        AssetClass::Erc1155 => {
                            let outflow = erc1155_outflows
                                .entry((collection.clone(), *token_id, *from))
                                .or_insert(0);
                            *outflow = outflow.checked_add(*amount).ok_or_else(|| {
                                OpenbarterError::TransferFailed {
                                    reason: "ERC1155 outflow overflow".to_string(),
                                }
                            })?;
                            if *outflow > self.erc1155_balance(collection, *token_id, from) {
                                return Err(OpenbarterError::TransferFailed {
                                    reason: format!(
                                        "cumulative ERC1155 outflow exceeds balance of {from} \
                                         for {collection}{token_id}"
                                    ),
                                });
                            }
                        }
                    }
                }
                TransferStep::Payment {
                    token,
                    from,
                    amount,
                    ..
                } => {
                    self.check_payment(token, *from, *amount)?;
                    let outflow = payment_outflows
                        .entry((token.clone(), *from))
                        .or_insert(0);
                    *outflow = outflow.checked_add(*amount).ok_or_else(|| {
                        OpenbarterError::TransferFailed {
                            reason: "payment outflow overflow".to_string(),
                        }
                    })?;
                    if *outflow > self.payment_balance(token, from) {
                        return Err(OpenbarterError::TransferFailed {
                            reason: format!(
                                "cumulative {token} outflow exceeds balance of {from}: \
                                 need {outflow}, have {}",
                                self.payment_balance(token, from),
                            ),
                        });
                    }
                }
            }
        }

        // Phase 2: apply. Every precondition was just checked, so no
        // step can fail and no partial state is ever observable.
        for step in plan.steps() {
            match step {
                TransferStep::Asset {
                    asset_class,
                    collection,
                    token_id,
                    from,
                    to,
                    amount,
                } => self.apply_asset(*asset_class, collection, *from, *to, *token_id, *amount),
                TransferStep::Payment {
                    token,
                    from,
                    to,
                    amount,
                } => self.apply_payment(token, *from, *to, *amount),
            }
        }

        tracing::debug!(steps = plan.len(), "Transfer plan applied");
        Ok(())
    }

    // -----------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------

    fn check_asset(
        &self,
        asset_class: AssetClass,
        collection: &CollectionId,
        from: Address,
        token_id: TokenId,
        amount: u64,
    ) -> Result<()> {
        if !self.has_approval(&from, asset_class) {
            return Err(OpenbarterError::TransferFailed {
                reason: format!("{from} has not approved {asset_class} transfers"),
            });
        }
        match asset_class {
            AssetClass::Erc721 => {
                if amount != 1 {
                    return Err(OpenbarterError::TransferFailed {
                        reason: format!("ERC721 quantity must be 1, got {amount}"),
                    });
                }
                match self.owner_of(collection, token_id) {
                    None => Err(OpenbarterError::TransferFailed {
                        reason: format!("token {collection}{token_id} does not exist"),
                    }),
                    Some(owner) if owner != from => Err(OpenbarterError::TransferFailed {
                        reason: format!("{from} does not own {collection}{token_id}"),
                    }),
                    Some(_) => Ok(()),
                }
            }
            AssetClass::Erc1155 => {
                let balance = self.erc1155_balance(collection, token_id, &from);
                if balance < amount {
                    return Err(OpenbarterError::TransferFailed {
                        reason: format!(
                            "{from} holds {balance} of {collection}{token_id}, need {amount}"
                        ),
                    });
                }
                Ok(())
            }
        }
    }

    fn apply_asset(
        &mut self,
        asset_class: AssetClass,
        collection: &CollectionId,
        from: Address,
        to: Address,
        token_id: TokenId,
        amount: u64,
    ) {
        match asset_class {
            AssetClass::Erc721 => {
                self.erc721_owners
                    .insert((collection.clone(), token_id), to);
            }
            AssetClass::Erc1155 => {
                if let Some(balance) = self
                    .erc1155_balances
                    .get_mut(&(collection.clone(), token_id, from))
                {
                    *balance -= amount;
                }
                let balance = self
                    .erc1155_balances
                    .entry((collection.clone(), token_id, to))
                    .or_insert(0);
                *balance = balance.saturating_add(amount);
            }
        }
    }

    fn check_payment(&self, token: &PaymentToken, from: Address, amount: u128) -> Result<()> {
        if !self.has_payment_approval(&from, token) {
            return Err(OpenbarterError::TransferFailed {
                reason: format!("{from} has not approved {token} payment pulls"),
            });
        }
        let balance = self.payment_balance(token, &from);
        if balance < amount {
            return Err(OpenbarterError::TransferFailed {
                reason: format!("insufficient {token} balance of {from}: need {amount}, have {balance}"),
            });
        }
        Ok(())
    }

    fn apply_payment(&mut self, token: &PaymentToken, from: Address, to: Address, amount: u128) {
        if let Some(balance) = self.payment_balances.get_mut(&(token.clone(), from)) {
            *balance -= amount;
        }
        let balance = self
            .payment_balances
            .entry((token.clone(), to))
            .or_insert(0);
        *balance = balance.saturating_add(amount);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ETH: u128 = 1_000_000_000_000_000_000;

    fn alice() -> Address {
        Address([1u8; 32])
    }

    fn bob() -> Address {
        Address([2u8; 32])
    }

    fn coll() -> CollectionId {
        CollectionId::new("mock-721")
    }

    fn seeded() -> ExecutionDelegate {
        let mut delegate = ExecutionDelegate::new();
        delegate.grant_approval(alice(), AssetClass::Erc721);
        delegate.grant_approval(alice(), AssetClass::Erc1155);
        delegate.mint_erc721(coll(), TokenId(1), alice());
        delegate.mint_erc1155(coll(), TokenId(7), alice(), 10);
        delegate.deposit(PaymentToken::Native, bob(), 100 * ETH);
        delegate
    }

    #[test]
    fn erc721_transfer_moves_ownership() {
        let mut delegate = seeded();
        delegate
            .transfer(AssetClass::Erc721, &coll(), alice(), bob(), TokenId(1), 1)
            .unwrap();
        assert_eq!(delegate.owner_of(&coll(), TokenId(1)), Some(bob()));
    }

    #[test]
    fn transfer_without_approval_fails() {
        let mut delegate = seeded();
        delegate.revoke_approval(alice(), AssetClass::Erc721);
        let err = delegate
            .transfer(AssetClass::Erc721, &coll(), alice(), bob(), TokenId(1), 1)
            .unwrap_err();
        assert!(matches!(err, OpenbarterError::TransferFailed { .. }));
        assert_eq!(delegate.owner_of(&coll(), TokenId(1)), Some(alice()));
    }

    #[test]
    fn transfer_by_non_owner_fails() {
        let mut delegate = seeded();
        delegate.grant_approval(bob(), AssetClass::Erc721);
        let err = delegate
            .transfer(AssetClass::Erc721, &coll(), bob(), alice(), TokenId(1), 1)
            .unwrap_err();
        assert!(matches!(err, OpenbarterError::TransferFailed { .. }));
    }

    #[test]
    fn nonexistent_token_fails() {
        let mut delegate = seeded();
        let err = delegate
            .transfer(AssetClass::Erc721, &coll(), alice(), bob(), TokenId(99), 1)
            .unwrap_err();
        assert!(matches!(err, OpenbarterError::TransferFailed { .. }));
    }

    #[test]
    fn erc1155_transfer_moves_balance() {
        let mut delegate = seeded();
        delegate
            .transfer(AssetClass::Erc1155, &coll(), alice(), bob(), TokenId(7), 4)
            .unwrap();
        assert_eq!(delegate.erc1155_balance(&coll(), TokenId(7), &alice()), 6);
        assert_eq!(delegate.erc1155_balance(&coll(), TokenId(7), &bob()), 4);
    }

    #[test]
    fn erc1155_insufficient_balance_fails() {
        let mut delegate = seeded();
        let err = delegate
            .transfer(AssetClass::Erc1155, &coll(), alice(), bob(), TokenId(7), 11)
            .unwrap_err();
        assert!(matches!(err, OpenbarterError::TransferFailed { .. }));
    }

    #[test]
    fn native_payment_needs_no_approval() {
        let mut delegate = seeded();
        delegate
            .transfer_payment(&PaymentToken::Native, bob(), alice(), 10 * ETH)
            .unwrap();
        assert_eq!(
            delegate.payment_balance(&PaymentToken::Native, &alice()),
            10 * ETH
        );
        assert_eq!(
            delegate.payment_balance(&PaymentToken::Native, &bob()),
            90 * ETH
        );
    }

    #[test]
    fn fungible_payment_needs_approval() {
        let mut delegate = ExecutionDelegate::new();
        let weth = PaymentToken::fungible("WETH");
        delegate.deposit(weth.clone(), bob(), 50 * ETH);

        let err = delegate
            .transfer_payment(&weth, bob(), alice(), ETH)
            .unwrap_err();
        assert!(matches!(err, OpenbarterError::TransferFailed { .. }));

        delegate.grant_payment_approval(bob(), weth.clone());
        delegate.transfer_payment(&weth, bob(), alice(), ETH).unwrap();
        assert_eq!(delegate.payment_balance(&weth, &alice()), ETH);
    }

    #[test]
    fn plan_applies_fully() {
        let mut delegate = seeded();
        let mut plan = TransferPlan::new();
        plan.push(TransferStep::Asset {
            asset_class: AssetClass::Erc721,
            collection: coll(),
            token_id: TokenId(1),
            from: alice(),
            to: bob(),
            amount: 1,
        });
        plan.push(TransferStep::Payment {
            token: PaymentToken::Native,
            from: bob(),
            to: alice(),
            amount: 10 * ETH,
        });
        delegate.execute_plan(&plan).unwrap();
        assert_eq!(delegate.owner_of(&coll(), TokenId(1)), Some(bob()));
        assert_eq!(
            delegate.payment_balance(&PaymentToken::Native, &alice()),
            10 * ETH
        );
    }

    #[test]
    fn failing_plan_leaves_ledgers_untouched() {
        let mut delegate = seeded();
        let mut plan = TransferPlan::new();
        plan.push(TransferStep::Payment {
            token: PaymentToken::Native,
            from: bob(),
            to: alice(),
            amount: 10 * ETH,
        });
        // Second leg overdraws: whole plan must be rejected, including
        // the valid first leg.
        plan.push(TransferStep::Payment {
            token: PaymentToken::Native,
            from: bob(),
            to: alice(),
            amount: 95 * ETH,
        });
        let err = delegate.execute_plan(&plan).unwrap_err();
        assert!(matches!(err, OpenbarterError::TransferFailed { .. }));
        assert_eq!(
            delegate.payment_balance(&PaymentToken::Native, &bob()),
            100 * ETH
        );
        assert_eq!(delegate.payment_balance(&PaymentToken::Native, &alice()), 0);
    }

    #[test]
    fn plan_checks_cumulative_outflow() {
        let mut delegate = seeded();
        let mut plan = TransferPlan::new();
        // Each leg alone is covered; together they overdraw 10 units of
        // the ERC1155 balance.
        for _ in 0..2 {
            plan.push(TransferStep::Asset {
                asset_class: AssetClass::Erc1155,
                collection: coll(),
                token_id: TokenId(7),
                from: alice(),
                to: bob(),
                amount: 6,
            });
        }
        let err = delegate.execute_plan(&plan).unwrap_err();
        assert!(matches!(err, OpenbarterError::TransferFailed { .. }));
        assert_eq!(delegate.erc1155_balance(&coll(), TokenId(7), &alice()), 10);
    }

    #[test]
    fn plan_rejects_double_erc721_move() {
        let mut delegate = seeded();
        let mut plan = TransferPlan::new();
        for target in [bob(), Address([3u8; 32])] {
            plan.push(TransferStep::Asset {
                asset_class: AssetClass::Erc721,
                collection: coll(),
                token_id: TokenId(1),
                from: alice(),
                to: target,
                amount: 1,
            });
        }
        let err = delegate.execute_plan(&plan).unwrap_err();
        assert!(matches!(err, OpenbarterError::TransferFailed { .. }));
        assert_eq!(delegate.owner_of(&coll(), TokenId(1)), Some(alice()));
    }
}

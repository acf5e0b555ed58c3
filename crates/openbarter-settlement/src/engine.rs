//! The settlement orchestrator.
//!
//! `execute` runs the full pipeline for one sell/buy pair:
//! decode → validate each order → match → split fees → check payment →
//! apply transfers → mark consumed → emit the receipt. Nothing mutates
//! until the transfer plan commits, so a failure at any step leaves no
//! partial effect.
//!
//! `bulk_execute` runs the same pipeline per pair with **per-item
//! isolation**: one stale listing in a sweep fails in its own slot while
//! the rest of the batch settles. Whole-call failures are limited to
//! batch-shape problems (size cap, aggregate attached value).

use chrono::Utc;
use serde::{Deserialize, Serialize};

use openbarter_ingress::{codec, NonceRegistry, OrderValidator};
use openbarter_policy::PolicyRegistry;
use openbarter_types::{
    Address, CancellationRecord, EngineConfig, NonceBumpRecord, OpenbarterError, Order, Result,
    SettlementId, SettlementReceipt, Side, SignedOrder,
};

use crate::delegate::{ExecutionDelegate, TransferPlan, TransferStep};
use crate::fees;

/// One sell/buy pair in a bulk submission, in packed transport form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Execution {
    pub sell: Vec<u8>,
    pub buy: Vec<u8>,
}

/// Validates, matches, and atomically settles signed order pairs.
pub struct SettlementEngine {
    config: EngineConfig,
    validator: OrderValidator,
    nonces: NonceRegistry,
    policies: PolicyRegistry,
    delegate: ExecutionDelegate,
}

impl SettlementEngine {
    #[must_use]
    pub fn new(config: EngineConfig, policies: PolicyRegistry, delegate: ExecutionDelegate) -> Self {
        let validator = OrderValidator::new(config.max_fees_per_order);
        Self {
            config,
            validator,
            nonces: NonceRegistry::new(),
            policies,
            delegate,
        }
    }

    /// Default configuration, standard policies, empty ledgers.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(
            EngineConfig::default(),
            PolicyRegistry::with_standard_policies(),
            ExecutionDelegate::new(),
        )
    }

    /// The transfer conduit, for out-of-band grants and ledger seeding.
    #[must_use]
    pub fn delegate(&self) -> &ExecutionDelegate {
        &self.delegate
    }

    pub fn delegate_mut(&mut self) -> &mut ExecutionDelegate {
        &mut self.delegate
    }

    /// Replay bookkeeping, read-only.
    #[must_use]
    pub fn nonces(&self) -> &NonceRegistry {
        &self.nonces
    }

    /// Cancel one order without settling it. Maker-only.
    pub fn cancel(&mut self, caller: Address, order: &Order) -> Result<CancellationRecord> {
        self.nonces.cancel(caller, order)
    }

    /// Bump the caller's nonce, invalidating every order they signed
    /// under the prior value.
    pub fn increment_nonce(&mut self, caller: Address) -> NonceBumpRecord {
        self.nonces.increment_nonce(caller)
    }

    /// Settle a single sell/buy pair.
    ///
    /// `attached_value` must equal the settlement price for native legs
    /// and zero for fungible-token legs (those draw on balance plus
    /// allowance instead).
    pub fn execute(
        &mut self,
        caller: Address,
        sell_input: &[u8],
        buy_input: &[u8],
        attached_value: u128,
    ) -> Result<SettlementReceipt> {
        let sell = codec::unpack(sell_input)?;
        let buy = codec::unpack(buy_input)?;
        self.settle_pair(caller, &sell, &buy, attached_value)
    }

    /// Settle a batch of pairs with per-item isolation.
    ///
    /// The outer `Result` covers batch-shape failures: an oversized batch
    /// (`BulkLimitExceeded`) or an `attached_value` that does not equal
    /// the sum of the batch's native-leg prices (`InsufficientPayment`).
    /// The inner vector reports each pair's receipt or error in
    /// submission order; a failing item never disturbs its neighbours.
    pub fn bulk_execute(
        &mut self,
        caller: Address,
        executions: &[Execution],
        attached_value: u128,
    ) -> Result<Vec<Result<SettlementReceipt>>> {
        if executions.len() > self.config.max_bulk_executions {
            return Err(OpenbarterError::BulkLimitExceeded {
                count: executions.len(),
                max: self.config.max_bulk_executions,
            });
        }

        let decoded: Vec<Result<(SignedOrder, SignedOrder)>> = executions
            .iter()
            .map(|execution| {
                let sell = codec::unpack(&execution.sell)?;
                let buy = codec::unpack(&execution.buy)?;
                Ok((sell, buy))
            })
            .collect();

        // Aggregate value rule: the attached value must equal the sum of
        // the decodable native-leg prices. (Items that fail to decode are
        // reported in their slot and contribute nothing to the sum.)
        let mut required: u128 = 0;
        for (sell, _) in decoded.iter().flatten() {
            if sell.order.payment_token.is_native() {
                required = required.checked_add(sell.order.price).ok_or_else(|| {
                    OpenbarterError::InvalidOrder {
                        reason: "aggregate native value overflows".to_string(),
                    }
                })?;
            }
        }
        if attached_value != required {
            return Err(OpenbarterError::InsufficientPayment {
                needed: required,
                attached: attached_value,
            });
        }

        let results: Vec<Result<SettlementReceipt>> = decoded
            .into_iter()
            .enumerate()
            .map(|(index, item)| {
                item.and_then(|(sell, buy)| {
                    let slice = if sell.order.payment_token.is_native() {
                        sell.order.price
                    } else {
                        0
                    };
                    self.settle_pair(caller, &sell, &buy, slice).inspect_err(|err| {
                        tracing::warn!(index, error = %err, "Bulk item failed, skipping");
                    })
                })
            })
            .collect();

        let settled = results.iter().filter(|result| result.is_ok()).count();
        tracing::info!(
            total = executions.len(),
            settled,
            failed = executions.len() - settled,
            "Bulk execution complete"
        );
        Ok(results)
    }

    /// The single-pair pipeline. Everything before `execute_plan` is
    /// read-only, so any failure aborts with zero observable effect.
    fn settle_pair(
        &mut self,
        caller: Address,
        sell: &SignedOrder,
        buy: &SignedOrder,
        attached_value: u128,
    ) -> Result<SettlementReceipt> {
        let now = Utc::now();

        if sell.order.side != Side::Sell || buy.order.side != Side::Buy {
            return Err(OpenbarterError::OrdersDoNotMatch {
                sell_hash: sell.order.digest(),
                buy_hash: buy.order.digest(),
            });
        }

        // 1-2. Hash + validate each order independently.
        let sell_hash = self.validator.validate(sell, &caller, &self.nonces, now)?;
        let buy_hash = self.validator.validate(buy, &caller, &self.nonces, now)?;

        // 3. Match.
        let terms = self
            .policies
            .adjudicate(&sell.order, &buy.order, sell_hash, buy_hash)?;

        // 4. Fees, on the adjudicated price, seller-borne.
        let split = fees::split(terms.price, &sell.order.fees)?;

        // 5. Payment coverage.
        if terms.payment_token.is_native() {
            if attached_value != terms.price {
                return Err(OpenbarterError::InsufficientPayment {
                    needed: terms.price,
                    attached: attached_value,
                });
            }
        } else if attached_value != 0 {
            // Token legs draw on balance + allowance; attaching value
            // here is a caller mistake that would otherwise be lost.
            return Err(OpenbarterError::InsufficientPayment {
                needed: 0,
                attached: attached_value,
            });
        }

        let seller = sell.order.maker;
        let buyer = buy.order.maker;

        // 6-7. Buffer the transfers, then apply all-or-nothing.
        let mut plan = TransferPlan::new();
        plan.push(TransferStep::Asset {
            asset_class: terms.asset_class,
            collection: sell.order.collection.clone(),
            token_id: terms.token_id,
            from: seller,
            to: buyer,
            amount: terms.amount,
        });
        for payout in &split.payouts {
            if payout.amount > 0 {
                plan.push(TransferStep::Payment {
                    token: terms.payment_token.clone(),
                    from: buyer,
                    to: payout.recipient,
                    amount: payout.amount,
                });
            }
        }
        if split.seller_proceeds > 0 {
            plan.push(TransferStep::Payment {
                token: terms.payment_token.clone(),
                from: buyer,
                to: seller,
                amount: split.seller_proceeds,
            });
        }
        self.delegate.execute_plan(&plan)?;

        // 8. Consume both orders.
        self.nonces.mark_consumed(sell_hash);
        self.nonces.mark_consumed(buy_hash);

        // 9. Record.
        let receipt = SettlementReceipt {
            id: SettlementId::deterministic(&sell_hash, &buy_hash),
            sell_hash,
            buy_hash,
            maker: seller,
            taker: buyer,
            collection: sell.order.collection.clone(),
            token_id: terms.token_id,
            amount: terms.amount,
            asset_class: terms.asset_class,
            payment_token: terms.payment_token.clone(),
            price: terms.price,
            fee_payouts: split.payouts,
            seller_proceeds: split.seller_proceeds,
            settled_at: now,
        };
        tracing::info!(
            sell = %sell_hash,
            buy = %buy_hash,
            seller = %seller,
            buyer = %buyer,
            price = receipt.price,
            token = %receipt.payment_token,
            "Trade settled"
        );
        Ok(receipt)
    }
}

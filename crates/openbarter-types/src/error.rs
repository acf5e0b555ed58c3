//! Error types for the OpenBarter settlement engine.
//!
//! All errors use the `OB_ERR_` prefix convention for easy grepping in
//! logs. Error codes are grouped by subsystem:
//! - 1xx: Order lifecycle errors
//! - 2xx: Authorization errors
//! - 3xx: Matching errors
//! - 4xx: Fee / payment errors
//! - 5xx: Transfer errors
//! - 6xx: Bulk execution errors
//! - 9xx: General / internal errors

use thiserror::Error;

use crate::{Address, OrderHash, PolicyId};

/// Central error enum for all OpenBarter operations.
#[derive(Debug, Error)]
pub enum OpenbarterError {
    // =================================================================
    // Order Lifecycle Errors (1xx)
    // =================================================================
    /// The order's listing window has passed (or not yet opened).
    #[error("OB_ERR_100: Order expired or not listed: {0}")]
    OrderExpired(OrderHash),

    /// The order was already settled or cancelled.
    #[error("OB_ERR_101: Order already consumed: {0}")]
    OrderConsumed(OrderHash),

    /// The order was signed under a superseded maker nonce.
    #[error("OB_ERR_102: Nonce mismatch for {maker}: order has {order_nonce}, registry at {registry_nonce}")]
    NonceMismatch {
        maker: Address,
        order_nonce: u64,
        registry_nonce: u64,
    },

    /// The order failed structural validation (bad quantity, oversized
    /// fee schedule, fee rates exceeding the basis-point ceiling, etc.).
    #[error("OB_ERR_103: Invalid order: {reason}")]
    InvalidOrder { reason: String },

    // =================================================================
    // Authorization Errors (2xx)
    // =================================================================
    /// The authorizing signature did not verify against the maker.
    #[error("OB_ERR_200: Signature invalid for maker {maker}")]
    SignatureInvalid { maker: Address },

    /// A maker-only operation was attempted by someone else.
    #[error("OB_ERR_201: Unauthorized: {reason}")]
    Unauthorized { reason: String },

    // =================================================================
    // Matching Errors (3xx)
    // =================================================================
    /// The matching policy judged the pair incompatible.
    #[error("OB_ERR_300: Orders do not match: sell {sell_hash}, buy {buy_hash}")]
    OrdersDoNotMatch {
        sell_hash: OrderHash,
        buy_hash: OrderHash,
    },

    /// An order referenced a policy the registry does not know.
    #[error("OB_ERR_301: Matching policy not registered: {0}")]
    PolicyNotRegistered(PolicyId),

    // =================================================================
    // Fee / Payment Errors (4xx)
    // =================================================================
    /// The fee schedule would collect more than the settlement price, or
    /// a fee computation overflowed.
    #[error("OB_ERR_400: Fee overflow: {reason}")]
    FeeOverflow { reason: String },

    /// The attached value does not cover (or does not equal) what the
    /// settlement requires.
    #[error("OB_ERR_401: Insufficient payment: need {needed}, attached {attached}")]
    InsufficientPayment { needed: u128, attached: u128 },

    // =================================================================
    // Transfer Errors (5xx)
    // =================================================================
    /// The underlying ledger rejected an asset or payment movement.
    #[error("OB_ERR_500: Transfer failed: {reason}")]
    TransferFailed { reason: String },

    // =================================================================
    // Bulk Execution Errors (6xx)
    // =================================================================
    /// The batch exceeds the configured execution cap.
    #[error("OB_ERR_600: Bulk limit exceeded: {count} executions, max {max}")]
    BulkLimitExceeded { count: usize, max: usize },

    // =================================================================
    // General / Internal (9xx)
    // =================================================================
    /// Unrecoverable internal error.
    #[error("OB_ERR_900: Internal error: {0}")]
    Internal(String),

    /// Transport encoding / decoding error.
    #[error("OB_ERR_901: Serialization error: {0}")]
    Serialization(String),
}

/// Crate-wide `Result` alias.
pub type Result<T> = std::result::Result<T, OpenbarterError>;

//! # openbarter-ingress
//!
//! **Authorization envelope**: transport codec, signature verification,
//! replay/cancellation bookkeeping, and the per-order validation
//! pipeline.
//!
//! ## Architecture
//!
//! The envelope sits between the caller and the settlement engine:
//! 1. **codec**: `pack` / `pack_no_sigs` / `unpack` transport forms
//! 2. **signature**: ed25519 verification of the maker's authorization
//! 3. **NonceRegistry**: per-maker nonce counters + consumed-set
//! 4. **OrderValidator**: hard gate — structure, window, consumption,
//!    nonce, authorization, in that order
//!
//! ## Order Flow
//!
//! ```text
//! bytes → codec::unpack → OrderValidator::validate → SettlementEngine
//!                             │
//!                             ├── NonceRegistry (consumed? nonce fresh?)
//!                             └── signature::verify (or caller == maker)
//! ```
//!
//! No order reaches a transfer without passing the validator.

pub mod codec;
pub mod nonce_registry;
pub mod signature;
pub mod validator;

pub use nonce_registry::NonceRegistry;
pub use validator::OrderValidator;

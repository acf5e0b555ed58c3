//! # openbarter-types
//!
//! Shared types, errors, and configuration for the **OpenBarter**
//! settlement engine.
//!
//! This crate is the leaf dependency of the workspace — every other crate
//! depends on it. It defines:
//!
//! - **Identifiers**: [`Address`], [`CollectionId`], [`TokenId`], [`PaymentToken`], [`OrderHash`], [`PolicyId`], [`SettlementId`]
//! - **Order model**: [`Order`], [`Side`], [`AssetClass`], [`Fee`], [`Authorization`], [`SignedOrder`]
//! - **Record model**: [`SettlementReceipt`], [`FeePayout`], [`CancellationRecord`], [`NonceBumpRecord`]
//! - **Configuration**: [`EngineConfig`]
//! - **Errors**: [`OpenbarterError`] with `OB_ERR_` prefix codes
//! - **Constants**: basis-point scale, digest domain tags, default limits

pub mod config;
pub mod constants;
pub mod error;
pub mod ids;
pub mod order;
pub mod receipt;

// Re-export all primary types at crate root for ergonomic imports:
//   use openbarter_types::{Order, Side, SettlementReceipt, ...};

pub use config::*;
pub use error::*;
pub use ids::*;
pub use order::*;
pub use receipt::*;

// Constants are accessed via `openbarter_types::constants::FOO`
// (not re-exported to avoid name collisions).

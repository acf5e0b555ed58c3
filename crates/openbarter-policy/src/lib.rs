//! # openbarter-policy
//!
//! **Pure matching plane for OpenBarter.**
//!
//! A [`MatchingPolicy`] takes a sell order and a buy order and either
//! derives the agreed trade terms or judges the pair incompatible. It
//! has:
//!
//! - **Zero side effects**: no registry writes, no balance checks
//! - **Deterministic output**: same pair -> same terms, everywhere
//! - **Per-order dispatch**: each order names its policy by [`PolicyId`];
//!   the [`PolicyRegistry`] resolves it, so new policies plug in without
//!   touching the settlement engine
//!
//! [`PolicyId`]: openbarter_types::PolicyId

pub mod matching;
pub mod registry;
pub mod standard;

pub use matching::{MatchTerms, MatchingPolicy};
pub use registry::PolicyRegistry;
pub use standard::{StandardErc1155Policy, StandardErc721Policy};

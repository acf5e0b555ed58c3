//! Identifiers used throughout OpenBarter.
//!
//! Accounts are addressed by their raw ed25519 public key (32 bytes),
//! the same way signing identities are addressed on the wire. Settlement
//! receipts use UUIDv7 for time-ordered lexicographic sorting.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Address
// ---------------------------------------------------------------------------

/// An account identity: maker, taker, or fee recipient.
///
/// For makers that authorize orders by signature this is the raw ed25519
/// public key. Counterparties that only ever self-authorize (caller ==
/// maker) may use any unique 32-byte value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct Address(pub [u8; 32]);

impl Address {
    /// The all-zero address. Used as a placeholder in fixtures; never a
    /// valid signing identity.
    pub const ZERO: Self = Self([0u8; 32]);

    #[must_use]
    pub fn from_pubkey(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 32]
    }

    #[must_use]
    pub fn short(&self) -> String {
        hex::encode(&self.0[..4])
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "acct:{}", hex::encode(&self.0[..8]))
    }
}

// ---------------------------------------------------------------------------
// CollectionId
// ---------------------------------------------------------------------------

/// Identifier of an asset collection (the asset-contract analog).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct CollectionId(pub String);

impl CollectionId {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CollectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// TokenId
// ---------------------------------------------------------------------------

/// Identifier of a token within a collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct TokenId(pub u128);

impl fmt::Display for TokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// PaymentToken
// ---------------------------------------------------------------------------

/// The currency a trade settles in: the native currency of the host
/// environment, or a named fungible token.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub enum PaymentToken {
    /// Native currency. Covered by the value attached to the call;
    /// requires no allowance.
    Native,
    /// A fungible token, identified by symbol (e.g., "WETH").
    Fungible(String),
}

impl PaymentToken {
    #[must_use]
    pub fn fungible(symbol: impl Into<String>) -> Self {
        Self::Fungible(symbol.into())
    }

    #[must_use]
    pub fn is_native(&self) -> bool {
        matches!(self, Self::Native)
    }
}

impl fmt::Display for PaymentToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Native => write!(f, "NATIVE"),
            Self::Fungible(symbol) => write!(f, "{symbol}"),
        }
    }
}

// ---------------------------------------------------------------------------
// OrderHash
// ---------------------------------------------------------------------------

/// Canonical content digest of an order's semantic fields.
///
/// Serves both as the message signed by the maker and as the order's
/// identity in the consumed-set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct OrderHash(pub [u8; 32]);

impl OrderHash {
    #[must_use]
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for OrderHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "order:{}", hex::encode(&self.0[..8]))
    }
}

// ---------------------------------------------------------------------------
// PolicyId
// ---------------------------------------------------------------------------

/// Selector for the matching policy an order wants to be adjudicated
/// under. Carried in the order and resolved via the policy registry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct PolicyId(pub String);

impl PolicyId {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The standard fixed-price ERC721 policy.
    #[must_use]
    pub fn standard_erc721() -> Self {
        Self::new("standard-erc721")
    }

    /// The standard fixed-price ERC1155 policy.
    #[must_use]
    pub fn standard_erc1155() -> Self {
        Self::new("standard-erc1155")
    }
}

impl fmt::Display for PolicyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// SettlementId
// ---------------------------------------------------------------------------

/// Globally unique settlement-receipt identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct SettlementId(pub Uuid);

impl SettlementId {
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Deterministic `SettlementId` from the pair of consumed order hashes.
    ///
    /// The same (sell, buy) pair always produces the same receipt id, so
    /// replayed records can be deduplicated by off-engine tooling.
    #[must_use]
    pub fn deterministic(sell_hash: &OrderHash, buy_hash: &OrderHash) -> Self {
        use sha2::{Digest, Sha256};
        let mut hasher = Sha256::new();
        hasher.update(b"openbarter:settlement_id:v1:");
        hasher.update(sell_hash.as_bytes());
        hasher.update(buy_hash.as_bytes());
        let hash = hasher.finalize();
        let bytes: [u8; 16] = hash[..16].try_into().expect("SHA-256 produces 32 bytes");
        Self(Uuid::from_bytes(bytes))
    }
}

impl Default for SettlementId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SettlementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn address_display_and_short() {
        let addr = Address([0xab; 32]);
        assert_eq!(addr.short(), "abababab");
        assert!(format!("{addr}").starts_with("acct:abab"));
    }

    #[test]
    fn zero_address() {
        assert!(Address::ZERO.is_zero());
        assert!(!Address([1u8; 32]).is_zero());
    }

    #[test]
    fn payment_token_native() {
        assert!(PaymentToken::Native.is_native());
        assert!(!PaymentToken::fungible("WETH").is_native());
        assert_eq!(format!("{}", PaymentToken::fungible("WETH")), "WETH");
    }

    #[test]
    fn settlement_id_deterministic() {
        let sell = OrderHash([1u8; 32]);
        let buy = OrderHash([2u8; 32]);
        let a = SettlementId::deterministic(&sell, &buy);
        let b = SettlementId::deterministic(&sell, &buy);
        assert_eq!(a, b);
        let c = SettlementId::deterministic(&buy, &sell);
        assert_ne!(a, c, "hash order is part of the identity");
    }

    #[test]
    fn settlement_id_uniqueness() {
        let a = SettlementId::new();
        let b = SettlementId::new();
        assert_ne!(a, b);
    }

    #[test]
    fn serde_roundtrips() {
        let addr = Address([7u8; 32]);
        let json = serde_json::to_string(&addr).unwrap();
        let back: Address = serde_json::from_str(&json).unwrap();
        assert_eq!(addr, back);

        let token = PaymentToken::fungible("WETH");
        let json = serde_json::to_string(&token).unwrap();
        let back: PaymentToken = serde_json::from_str(&json).unwrap();
        assert_eq!(token, back);
    }
}

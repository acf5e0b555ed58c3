//! Order types for the OpenBarter settlement engine.
//!
//! An [`Order`] is an immutable intent record created and signed by a
//! maker off-engine. Its canonical digest ([`Order::digest`]) is both the
//! message the maker signs and the order's identity in the consumed-set;
//! mutating any field after hashing invalidates the signature.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::constants::ORDER_DOMAIN_TAG;
use crate::{Address, CollectionId, OrderHash, PaymentToken, PolicyId, TokenId};

/// Which side of a trade this order takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub enum Side {
    Sell,
    Buy,
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sell => write!(f, "SELL"),
            Self::Buy => write!(f, "BUY"),
        }
    }
}

/// The ledger family an asset belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub enum AssetClass {
    /// Non-fungible: one owner per (collection, token), quantity always 1.
    Erc721,
    /// Semi-fungible: per-holder balances per (collection, token).
    Erc1155,
}

impl std::fmt::Display for AssetClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Erc721 => write!(f, "ERC721"),
            Self::Erc1155 => write!(f, "ERC1155"),
        }
    }
}

/// A fee schedule entry: `rate` basis points of the settlement price,
/// routed to `recipient`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Fee {
    /// Basis points (1/10000) of the settlement price.
    pub rate: u16,
    /// Who receives this cut.
    pub recipient: Address,
}

/// An immutable trade intent. Read-only once hashed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    /// The identity that authored (and authorizes) this order.
    pub maker: Address,
    pub side: Side,
    /// Matching policy this order wants to be adjudicated under.
    pub policy: PolicyId,
    pub collection: CollectionId,
    pub token_id: TokenId,
    /// Quantity. Always 1 for non-fungible assets.
    pub amount: u64,
    pub payment_token: PaymentToken,
    /// Price in the smallest unit of `payment_token`.
    pub price: u128,
    pub listing_time: DateTime<Utc>,
    pub expiration_time: DateTime<Utc>,
    /// Fee schedule. Seller-borne under the standard policies; a buy
    /// order conventionally carries none.
    pub fees: Vec<Fee>,
    /// Anti-collision nonce distinguishing otherwise identical orders
    /// from the same maker.
    pub salt: u64,
    /// Opaque policy-specific data.
    pub extra_params: Vec<u8>,
    /// The maker's registry nonce at signing time.
    pub nonce: u64,
}

impl Order {
    /// Canonical content digest over every semantic field.
    ///
    /// Domain-separated (tagged) and length-prefixed on variable-width
    /// fields, so two distinct field layouts can never encode to the same
    /// byte stream. Two orders with identical field values always hash
    /// identically; any field change changes the hash.
    #[must_use]
    pub fn digest(&self) -> OrderHash {
        let mut hasher = Sha256::new();
        hasher.update(ORDER_DOMAIN_TAG);
        hasher.update(self.maker.as_bytes());
        hasher.update(match self.side {
            Side::Sell => &[0u8],
            Side::Buy => &[1u8],
        });
        hash_bytes(&mut hasher, self.policy.0.as_bytes());
        hash_bytes(&mut hasher, self.collection.0.as_bytes());
        hasher.update(self.token_id.0.to_le_bytes());
        hasher.update(self.amount.to_le_bytes());
        match &self.payment_token {
            PaymentToken::Native => hasher.update([0u8]),
            PaymentToken::Fungible(symbol) => {
                hasher.update([1u8]);
                hash_bytes(&mut hasher, symbol.as_bytes());
            }
        }
        hasher.update(self.price.to_le_bytes());
        hasher.update(self.listing_time.timestamp_millis().to_le_bytes());
        hasher.update(self.expiration_time.timestamp_millis().to_le_bytes());
        hasher.update((self.fees.len() as u64).to_le_bytes());
        for fee in &self.fees {
            hasher.update(fee.rate.to_le_bytes());
            hasher.update(fee.recipient.as_bytes());
        }
        hasher.update(self.salt.to_le_bytes());
        hash_bytes(&mut hasher, &self.extra_params);
        hasher.update(self.nonce.to_le_bytes());

        let result = hasher.finalize();
        let mut hash = [0u8; 32];
        hash.copy_from_slice(&result);
        OrderHash(hash)
    }

    /// Whether `now` falls inside the order's listing window.
    #[must_use]
    pub fn is_live(&self, now: DateTime<Utc>) -> bool {
        self.listing_time <= now && now < self.expiration_time
    }

    /// Sum of the fee schedule's rates, in basis points.
    #[must_use]
    pub fn total_fee_rate(&self) -> u32 {
        self.fees.iter().map(|fee| u32::from(fee.rate)).sum()
    }
}

/// How an order's maker authorized it for settlement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Authorization {
    /// Ed25519 signature by the maker over the order digest.
    Signature(Vec<u8>),
    /// No signature: the settling caller *is* the maker. Accepted only
    /// when `caller == order.maker`.
    Caller,
}

/// An order plus its authorization — the unit `execute` consumes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedOrder {
    pub order: Order,
    pub authorization: Authorization,
}

fn hash_bytes(hasher: &mut Sha256, bytes: &[u8]) {
    hasher.update((bytes.len() as u64).to_le_bytes());
    hasher.update(bytes);
}

/// Test helpers.
#[cfg(any(test, feature = "test-helpers"))]
impl Order {
    /// A live sell listing for one ERC721 token under the standard policy.
    pub fn dummy_sell(maker: Address, token_id: u128, price: u128) -> Self {
        Self {
            maker,
            side: Side::Sell,
            policy: PolicyId::standard_erc721(),
            collection: CollectionId::new("mock-721"),
            token_id: TokenId(token_id),
            amount: 1,
            payment_token: PaymentToken::Native,
            price,
            listing_time: Utc::now() - chrono::Duration::minutes(1),
            expiration_time: Utc::now() + chrono::Duration::days(365),
            fees: Vec::new(),
            salt: rand::random::<u64>(),
            extra_params: Vec::new(),
            nonce: 0,
        }
    }

    /// The matching buy order for [`Order::dummy_sell`].
    pub fn dummy_buy(maker: Address, token_id: u128, price: u128) -> Self {
        Self {
            side: Side::Buy,
            ..Self::dummy_sell(maker, token_id, price)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_order() -> Order {
        let mut order = Order::dummy_sell(Address([1u8; 32]), 42, 1_000);
        order.salt = 7; // pin for determinism
        order
    }

    #[test]
    fn side_display() {
        assert_eq!(format!("{}", Side::Sell), "SELL");
        assert_eq!(format!("{}", Side::Buy), "BUY");
    }

    #[test]
    fn digest_deterministic() {
        let order = make_order();
        assert_eq!(order.digest(), order.digest());
    }

    #[test]
    fn digest_changes_with_every_field() {
        let base = make_order();
        let mutations: Vec<Order> = vec![
            Order { maker: Address([9u8; 32]), ..base.clone() },
            Order { side: Side::Buy, ..base.clone() },
            Order { policy: PolicyId::new("other"), ..base.clone() },
            Order { collection: CollectionId::new("mock-1155"), ..base.clone() },
            Order { token_id: TokenId(43), ..base.clone() },
            Order { amount: 2, ..base.clone() },
            Order { payment_token: PaymentToken::fungible("WETH"), ..base.clone() },
            Order { price: 1_001, ..base.clone() },
            Order { listing_time: base.listing_time - chrono::Duration::seconds(1), ..base.clone() },
            Order { expiration_time: base.expiration_time + chrono::Duration::seconds(1), ..base.clone() },
            Order {
                fees: vec![Fee { rate: 500, recipient: Address([3u8; 32]) }],
                ..base.clone()
            },
            Order { salt: 8, ..base.clone() },
            Order { extra_params: vec![1], ..base.clone() },
            Order { nonce: 1, ..base.clone() },
        ];
        for mutated in mutations {
            assert_ne!(
                base.digest(),
                mutated.digest(),
                "field change must change the digest"
            );
        }
    }

    #[test]
    fn digest_no_cross_field_ambiguity() {
        // Shifting a byte between adjacent variable-width fields must not
        // produce the same encoding. Policy and collection are encoded
        // back to back; without length prefixes "ab"+"c" and "a"+"bc"
        // would collide.
        let mut a = make_order();
        a.policy = PolicyId::new("ab");
        a.collection = CollectionId::new("c");
        let mut b = make_order();
        b.policy = PolicyId::new("a");
        b.collection = CollectionId::new("bc");
        assert_ne!(a.digest(), b.digest());
    }

    #[test]
    fn listing_window() {
        let order = make_order();
        assert!(order.is_live(Utc::now()));
        assert!(!order.is_live(order.listing_time - chrono::Duration::seconds(1)));
        assert!(!order.is_live(order.expiration_time));
    }

    #[test]
    fn total_fee_rate_sums() {
        let mut order = make_order();
        order.fees = vec![
            Fee { rate: 500, recipient: Address([2u8; 32]) },
            Fee { rate: 1000, recipient: Address([3u8; 32]) },
        ];
        assert_eq!(order.total_fee_rate(), 1500);
    }

    #[test]
    fn serde_roundtrip() {
        let signed = SignedOrder {
            order: make_order(),
            authorization: Authorization::Caller,
        };
        let json = serde_json::to_string(&signed).unwrap();
        let back: SignedOrder = serde_json::from_str(&json).unwrap();
        assert_eq!(signed, back);
        assert_eq!(signed.order.digest(), back.order.digest());
    }
}

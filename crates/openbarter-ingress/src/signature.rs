//! Signature verification for order authorization.
//!
//! A maker's [`Address`] is their raw ed25519 public key; the signed
//! message is the order's canonical digest. Verification never panics or
//! propagates an error past this boundary — a malformed key or signature
//! is simply not a valid authorization, and the caller converts `false`
//! into [`OpenbarterError::SignatureInvalid`].

use ed25519_dalek::{Signature, VerifyingKey};
use openbarter_types::{Address, OrderHash};

/// Verify `signature` over `order_hash` against `expected_signer`.
///
/// Returns `false` for anything that is not a valid ed25519 signature by
/// the expected signer: wrong key, wrong message, truncated signature, or
/// an address that is not a valid curve point.
#[must_use]
pub fn verify(order_hash: &OrderHash, signature: &[u8], expected_signer: &Address) -> bool {
    let Ok(key) = VerifyingKey::from_bytes(expected_signer.as_bytes()) else {
        return false;
    };
    let Ok(sig) = Signature::from_slice(signature) else {
        return false;
    };
    key.verify_strict(order_hash.as_bytes(), &sig).is_ok()
}

/// Test helpers: keypair generation and order signing.
///
/// Signing is the maker's job, done off-engine by the key-management
/// component; these exist so tests can mint authorized orders.
#[cfg(any(test, feature = "test-helpers"))]
pub mod signing {
    use ed25519_dalek::{Signer, SigningKey};
    use openbarter_types::{Address, Authorization, Order, SignedOrder};

    /// Generate a fresh ed25519 keypair and its account address.
    pub fn generate_keypair() -> (SigningKey, Address) {
        let key = SigningKey::generate(&mut rand::rngs::OsRng);
        let address = Address::from_pubkey(key.verifying_key().to_bytes());
        (key, address)
    }

    /// Sign an order's digest, producing a settleable [`SignedOrder`].
    pub fn sign_order(key: &SigningKey, order: &Order) -> SignedOrder {
        let signature = key.sign(order.digest().as_bytes());
        SignedOrder {
            order: order.clone(),
            authorization: Authorization::Signature(signature.to_bytes().to_vec()),
        }
    }
}

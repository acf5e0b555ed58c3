//! Transport codec for signed orders.
//!
//! `execute` / `bulk_execute` consume byte forms produced here. A maker
//! that authorizes by signature packs with [`pack`]; a maker that will be
//! the settling caller packs with [`pack_no_sigs`], which marks the order
//! [`Authorization::Caller`] so the engine takes the explicit
//! self-authorization branch instead of signature recovery.

use openbarter_types::{Authorization, OpenbarterError, Order, Result, SignedOrder};

/// Encode an order together with its authorization signature.
pub fn pack(signed: &SignedOrder) -> Result<Vec<u8>> {
    serde_json::to_vec(signed).map_err(|err| OpenbarterError::Serialization(err.to_string()))
}

/// Encode an order with no signature, for a maker who authorizes
/// implicitly by being the settling caller.
pub fn pack_no_sigs(order: &Order) -> Result<Vec<u8>> {
    let signed = SignedOrder {
        order: order.clone(),
        authorization: Authorization::Caller,
    };
    pack(&signed)
}

/// Decode a transport form back into a [`SignedOrder`].
pub fn unpack(bytes: &[u8]) -> Result<SignedOrder> {
    serde_json::from_slice(bytes).map_err(|err| OpenbarterError::Serialization(err.to_string()))
}

#[cfg(test)]
mod tests {
    use openbarter_types::Address;

    use super::*;

    #[test]
    fn pack_unpack_roundtrip() {
        let order = Order::dummy_sell(Address([1u8; 32]), 1, 1_000);
        let signed = SignedOrder {
            order: order.clone(),
            authorization: Authorization::Signature(vec![0u8; 64]),
        };
        let bytes = pack(&signed).unwrap();
        let back = unpack(&bytes).unwrap();
        assert_eq!(signed, back);
        assert_eq!(order.digest(), back.order.digest());
    }

    #[test]
    fn pack_no_sigs_marks_caller_authorization() {
        let order = Order::dummy_buy(Address([2u8; 32]), 1, 1_000);
        let bytes = pack_no_sigs(&order).unwrap();
        let back = unpack(&bytes).unwrap();
        assert_eq!(back.authorization, Authorization::Caller);
        assert_eq!(back.order, order);
    }

    #[test]
    fn unpack_rejects_garbage() {
        let err = unpack(b"not json").unwrap_err();
        assert!(matches!(err, OpenbarterError::Serialization(_)));
    }
}

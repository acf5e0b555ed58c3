//! Standard fixed-price policies.
//!
//! A pair is compatible iff both orders describe the same asset, the same
//! quantity, the same payment token, and exactly the same price. The
//! terms echo the shared fields; nothing is derived.

use openbarter_types::{AssetClass, Order, PolicyId, Side};

use crate::matching::{MatchTerms, MatchingPolicy};

/// Fixed-price matching for non-fungible (ERC721-style) assets.
/// Quantity is always exactly 1.
#[derive(Debug, Default)]
pub struct StandardErc721Policy;

impl MatchingPolicy for StandardErc721Policy {
    fn id(&self) -> PolicyId {
        PolicyId::standard_erc721()
    }

    fn matches(&self, sell: &Order, buy: &Order) -> Option<MatchTerms> {
        let compatible = fields_agree(sell, buy) && sell.amount == 1;
        compatible.then(|| MatchTerms {
            price: sell.price,
            token_id: sell.token_id,
            amount: 1,
            payment_token: sell.payment_token.clone(),
            asset_class: AssetClass::Erc721,
        })
    }
}

/// Fixed-price matching for semi-fungible (ERC1155-style) assets.
/// The full quantity moves as one unit; no partial fills.
#[derive(Debug, Default)]
pub struct StandardErc1155Policy;

impl MatchingPolicy for StandardErc1155Policy {
    fn id(&self) -> PolicyId {
        PolicyId::standard_erc1155()
    }

    fn matches(&self, sell: &Order, buy: &Order) -> Option<MatchTerms> {
        let compatible = fields_agree(sell, buy) && sell.amount >= 1;
        compatible.then(|| MatchTerms {
            price: sell.price,
            token_id: sell.token_id,
            amount: sell.amount,
            payment_token: sell.payment_token.clone(),
            asset_class: AssetClass::Erc1155,
        })
    }
}

fn fields_agree(sell: &Order, buy: &Order) -> bool {
    sell.side == Side::Sell
        && buy.side == Side::Buy
        && sell.collection == buy.collection
        && sell.token_id == buy.token_id
        && sell.amount == buy.amount
        && sell.payment_token == buy.payment_token
        && sell.price == buy.price
}

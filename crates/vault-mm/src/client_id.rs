//! Client id encoding for vault orders.
//!
//! Layout (high → low):
//! - bit 31: side (1 = sell, 0 = buy)
//! - bit 30: low bit of the block height's two's-complement pattern
//! - bits 29..22: layer
//! - bits 21..0: zero
//!
//! The id carries no counter, so the id a slot used one block ago is
//! recomputed by encoding at `height - 1`. That is how last block's
//! quotes are found without storing them.

use vault_core::{BlockContext, OrderFlags, OrderId, OrderSide, VaultId};

use crate::collaborators::ClobPairSource;
use crate::error::MmResult;
use crate::params::VaultParams;

const SIDE_SHIFT: u32 = 31;
const PARITY_SHIFT: u32 = 30;
const LAYER_SHIFT: u32 = 22;

/// Encode `(side, height parity, layer)` into a client id.
pub fn encode(side: OrderSide, block_height: i64, layer: u8) -> u32 {
    let side_bit: u32 = match side {
        OrderSide::Sell => 1,
        OrderSide::Buy => 0,
    };
    // Bitwise, so negative heights share their two's-complement parity.
    let parity_bit = (block_height & 1) as u32;
    (side_bit << SIDE_SHIFT) | (parity_bit << PARITY_SHIFT) | (u32::from(layer) << LAYER_SHIFT)
}

/// Fields recovered from a client id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodedClientId {
    pub side: OrderSide,
    pub parity: u8,
    pub layer: u8,
}

pub fn decode(client_id: u32) -> DecodedClientId {
    let side = if (client_id >> SIDE_SHIFT) & 1 == 1 {
        OrderSide::Sell
    } else {
        OrderSide::Buy
    };
    DecodedClientId {
        side,
        parity: ((client_id >> PARITY_SHIFT) & 1) as u8,
        layer: ((client_id >> LAYER_SHIFT) & 0xff) as u8,
    }
}

/// Ladder slots in placement order: ask then bid for each layer.
pub fn ladder_slots(layers: u32) -> impl Iterator<Item = (u8, OrderSide)> {
    (0..layers)
        .filter_map(|layer| u8::try_from(layer).ok())
        .flat_map(|layer| [(layer, OrderSide::Sell), (layer, OrderSide::Buy)])
}

/// Order id for one slot of a vault's ladder at `block_height`.
pub fn vault_order_id(vault: VaultId, side: OrderSide, block_height: i64, layer: u8) -> OrderId {
    OrderId {
        subaccount_id: vault.to_subaccount_id(),
        client_id: encode(side, block_height, layer),
        order_flags: OrderFlags::LONG_TERM,
        clob_pair_id: vault.clob_pair_id(),
    }
}

/// Every order id of a vault's ladder at `ctx`, in ladder order.
///
/// Fails with `ClobPairNotFound` when the vault's pair does not exist.
pub fn vault_order_ids(
    clob_pairs: &dyn ClobPairSource,
    vault: VaultId,
    params: &VaultParams,
    ctx: &BlockContext,
) -> MmResult<Vec<OrderId>> {
    clob_pairs.clob_pair(vault.clob_pair_id())?;
    Ok(ladder_slots(params.layers)
        .map(|(layer, side)| vault_order_id(vault, side, ctx.height, layer))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collaborators::MockClobPairSource;
    use crate::error::MmError;
    use chrono::{TimeZone, Utc};
    use vault_core::{ClobPairConfig, QUOTE_ATOMIC_RESOLUTION};

    #[test]
    fn test_encode_known_values() {
        let cases = [
            (OrderSide::Buy, 1, 1, (1 << 30) | (1 << 22)),
            (OrderSide::Buy, 2, 1, 1 << 22),
            (OrderSide::Sell, 1, 2, (1 << 31) | (1 << 30) | (2 << 22)),
            (OrderSide::Sell, 2, 2, (1 << 31) | (2 << 22)),
            (OrderSide::Buy, 123_456, u8::MAX, 255 << 22),
            (OrderSide::Sell, 12_345_654_321, 0, (1 << 31) | (1 << 30)),
            (OrderSide::Sell, -678_987, 202, (1 << 31) | (1 << 30) | (202 << 22)),
            (OrderSide::Sell, 0, 157, (1 << 31) | (157 << 22)),
        ];
        for (side, height, layer, expected) in cases {
            assert_eq!(
                encode(side, height, layer),
                expected,
                "side={side} height={height} layer={layer}"
            );
        }
    }

    #[test]
    fn test_encode_sell_odd_layer_one() {
        assert_eq!(
            encode(OrderSide::Sell, 1, 1),
            (1u32 << 31) | (1 << 30) | (1 << 22)
        );
    }

    #[test]
    fn test_parity_round_trip() {
        for height in [-7i64, -2, -1, 0, 1, 2, 99, i64::MAX - 3] {
            for side in [OrderSide::Buy, OrderSide::Sell] {
                for layer in [0u8, 1, 128, 255] {
                    let id = encode(side, height, layer);
                    assert_eq!(id, encode(side, height - 2, layer));
                    assert_ne!(id, encode(side, height - 1, layer));
                }
            }
        }
    }

    #[test]
    fn test_negative_height_matches_bit_pattern() {
        // -1 is all ones in two's complement, so it is odd.
        assert_eq!(encode(OrderSide::Buy, -1, 0), encode(OrderSide::Buy, 1, 0));
        assert_eq!(encode(OrderSide::Buy, -2, 0), encode(OrderSide::Buy, 0, 0));
    }

    #[test]
    fn test_decode_inverts_encode() {
        let id = encode(OrderSide::Sell, 7, 42);
        assert_eq!(
            decode(id),
            DecodedClientId {
                side: OrderSide::Sell,
                parity: 1,
                layer: 42,
            }
        );
        assert_eq!(id & ((1 << 22) - 1), 0);
    }

    #[test]
    fn test_ladder_slots_order() {
        let slots: Vec<_> = ladder_slots(2).collect();
        assert_eq!(
            slots,
            vec![
                (0, OrderSide::Sell),
                (0, OrderSide::Buy),
                (1, OrderSide::Sell),
                (1, OrderSide::Buy),
            ]
        );
        assert_eq!(ladder_slots(0).count(), 0);
    }

    fn pair(id: u32) -> ClobPairConfig {
        ClobPairConfig {
            id,
            market_id: id,
            subticks_per_tick: 5,
            step_base_quantums: 5,
            quantum_conversion_exponent: -8,
            base_atomic_resolution: -10,
            quote_atomic_resolution: QUOTE_ATOMIC_RESOLUTION,
        }
    }

    #[test]
    fn test_vault_order_ids() {
        let mut pairs = MockClobPairSource::new();
        pairs.expect_clob_pair().returning(|id| Ok(pair(id)));
        let params = VaultParams {
            layers: 7,
            ..Default::default()
        };
        let ctx = BlockContext::new(5, Utc.timestamp_opt(1_700_000_000, 0).unwrap());
        let vault = VaultId::clob(1);

        let ids = vault_order_ids(&pairs, vault, &params, &ctx).unwrap();

        assert_eq!(ids.len(), 14);
        for (i, id) in ids.iter().enumerate() {
            let side = if i % 2 == 0 {
                OrderSide::Sell
            } else {
                OrderSide::Buy
            };
            assert_eq!(*id, vault_order_id(vault, side, 5, (i / 2) as u8));
            assert_eq!(id.order_flags, OrderFlags::LONG_TERM);
            assert_eq!(id.clob_pair_id, 1);
            assert_eq!(id.subaccount_id, vault.to_subaccount_id());
        }
    }

    #[test]
    fn test_vault_order_ids_zero_layers() {
        let mut pairs = MockClobPairSource::new();
        pairs.expect_clob_pair().returning(|id| Ok(pair(id)));
        let params = VaultParams {
            layers: 0,
            ..Default::default()
        };
        let ctx = BlockContext::new(5, Utc.timestamp_opt(1_700_000_000, 0).unwrap());
        assert!(vault_order_ids(&pairs, VaultId::clob(0), &params, &ctx)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_vault_order_ids_unknown_pair() {
        let mut pairs = MockClobPairSource::new();
        pairs
            .expect_clob_pair()
            .returning(|id| Err(MmError::ClobPairNotFound(id)));
        let ctx = BlockContext::new(5, Utc.timestamp_opt(1_700_000_000, 0).unwrap());
        let result = vault_order_ids(&pairs, VaultId::clob(797), &VaultParams::default(), &ctx);
        assert_eq!(result, Err(MmError::ClobPairNotFound(797)));
    }
}

//! Pool fixtures for unit tests.

use {
    crate::model::{Pool, PoolId, PoolToken, PoolType},
    alloy_primitives::{Address, B256},
    bigdecimal::BigDecimal,
    number::decimal,
};

pub fn token_address(byte: u8) -> Address {
    Address::repeat_byte(byte)
}

pub fn token(byte: u8, balance: &str) -> PoolToken {
    PoolToken {
        address: token_address(byte),
        balance: decimal::parse(balance).unwrap(),
        weight: None,
        decimals: 18,
        symbol: None,
    }
}

pub fn weighted_token(byte: u8, balance: &str, weight: &str) -> PoolToken {
    PoolToken {
        weight: Some(weight.to_string()),
        ..token(byte, balance)
    }
}

/// A pool at address `0xeeee..ee` whose ID embeds its address, holding
/// `tokens` in the given order.
pub fn pool(pool_type: PoolType, tokens: Vec<PoolToken>) -> Pool {
    let address = Address::repeat_byte(0xee);
    Pool {
        id: pool_id(address),
        address,
        pool_type,
        tokens_list: tokens.iter().map(|token| token.address).collect(),
        tokens,
        total_shares: BigDecimal::from(100),
        total_liquidity: BigDecimal::from(0),
        total_swap_fee: BigDecimal::from(0),
        total_swap_volume: BigDecimal::from(0),
        create_time: 0,
    }
}

pub fn pool_id(address: Address) -> PoolId {
    let mut id = B256::ZERO;
    id[..20].copy_from_slice(address.as_slice());
    id[31] = 0x42;
    id
}

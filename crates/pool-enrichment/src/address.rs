//! Address canonicalization.
//!
//! Subgraphs return lower-case addresses while token lists and UIs use
//! EIP-55 checksums. Everything is parsed into [`Address`] as early as
//! possible so that equality is always canonical; strings only reappear when
//! serializing, in checksum form.

use {
    crate::model::PoolId,
    alloy_primitives::Address,
    anyhow::{Context, Result},
    serde::{Deserialize, Deserializer, Serializer},
    serde_with::{DeserializeAs, SerializeAs},
    std::str::FromStr,
};

/// Parses an address regardless of its hex casing.
pub fn canonical(address: &str) -> Result<Address> {
    Address::from_str(address.trim()).with_context(|| format!("invalid address {address:?}"))
}

/// Returns the EIP-55 checksummed representation of an address.
pub fn checksum(address: &Address) -> String {
    address.to_checksum(None)
}

/// Address equality on raw strings, for callers that never parsed them into
/// [`Address`]. Strings that don't parse as addresses are compared
/// case-insensitively.
pub fn eq(a: &str, b: &str) -> bool {
    match (canonical(a), canonical(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => a.trim().eq_ignore_ascii_case(b.trim()),
    }
}

/// Balancer pool IDs embed the pool contract address in their first 20
/// bytes.
pub fn pool_address_from_id(pool_id: PoolId) -> Address {
    Address::from_slice(&pool_id[..20])
}

/// Serde adapter reading addresses in any casing and writing them
/// checksummed.
pub struct Checksummed;

impl SerializeAs<Address> for Checksummed {
    fn serialize_as<S: Serializer>(source: &Address, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&checksum(source))
    }
}

impl<'de> DeserializeAs<'de, Address> for Checksummed {
    fn deserialize_as<D>(deserializer: D) -> Result<Address, D::Error>
    where
        D: Deserializer<'de>,
    {
        let address = String::deserialize(deserializer)?;
        canonical(&address).map_err(|err| serde::de::Error::custom(format!("{err:#}")))
    }
}

// Copyright 2024 Scout Contributors
// SPDX-License-Identifier: Apache-2.0, MIT
//! Fixed-width 32-byte identifiers used throughout the harness.
//!
//! Both [`Address`] and [`StateRoot`] are opaque byte blobs: equality and
//! ordering are byte-wise, and neither type ascribes any structural meaning
//! to its contents.

use std::fmt;
use std::str::FromStr;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A 32-byte, opaque account identifier.
///
/// The reference harness synthesizes addresses by writing a small integer
/// in little-endian order into the leading bytes and zero-filling the rest;
/// callers that need such an address should build one with
/// [`Address::from_index`].
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Address(pub [u8; 32]);

/// A 32-byte, opaque state fingerprint. Nothing in this crate computes a
/// Merkle root; the bytes are stored and compared verbatim.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Default)]
pub struct StateRoot(pub [u8; 32]);

impl Address {
    pub const fn zero() -> Self {
        Address([0u8; 32])
    }

    /// Builds an address by writing `index` in little-endian order into the
    /// leading bytes, zero-filling the rest. Matches the synthesis scheme
    /// the reference harness uses for scenario addresses.
    pub fn from_index(index: u32) -> Self {
        let mut bytes = [0u8; 32];
        bytes[..4].copy_from_slice(&index.to_le_bytes());
        Address(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl StateRoot {
    pub const fn zero() -> Self {
        StateRoot([0u8; 32])
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for StateRoot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Error returned when a `0x`-prefixed hex string does not decode to exactly
/// 32 bytes.
#[derive(thiserror::Error, Debug)]
pub enum HexParseError {
    #[error("expected a 0x-prefixed hex string, got {0:?}")]
    MissingPrefix(String),
    #[error("invalid hex: {0}")]
    Hex(#[from] hex::FromHexError),
    #[error("expected 32 bytes, got {0}")]
    WrongLength(usize),
}

fn parse_fixed_hex(s: &str) -> Result<[u8; 32], HexParseError> {
    let stripped = s
        .strip_prefix("0x")
        .ok_or_else(|| HexParseError::MissingPrefix(s.to_owned()))?;
    let bytes = hex::decode(stripped)?;
    let len = bytes.len();
    bytes
        .try_into()
        .map_err(|_| HexParseError::WrongLength(len))
}

impl FromStr for Address {
    type Err = HexParseError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Address(parse_fixed_hex(s)?))
    }
}

impl FromStr for StateRoot {
    type Err = HexParseError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(StateRoot(parse_fixed_hex(s)?))
    }
}

macro_rules! impl_hex_serde {
    ($ty:ident) => {
        impl Serialize for $ty {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: Serializer,
            {
                serializer.serialize_str(&format!("0x{}", hex::encode(self.0)))
            }
        }

        impl<'de> Deserialize<'de> for $ty {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: Deserializer<'de>,
            {
                struct HexVisitor;
                impl<'de> Visitor<'de> for HexVisitor {
                    type Value = $ty;
                    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                        write!(f, "a 0x-prefixed hex string of 32 bytes")
                    }
                    fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
                    where
                        E: de::Error,
                    {
                        v.parse().map_err(de::Error::custom)
                    }
                }
                deserializer.deserialize_str(HexVisitor)
            }
        }
    };
}

impl_hex_serde!(Address);
impl_hex_serde!(StateRoot);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn synthesized_address_round_trips() {
        let a = Address::from_index(1);
        assert_eq!(a.0[0], 1);
        assert!(a.0[1..].iter().all(|&b| b == 0));
    }

    #[test]
    fn hex_parse_strips_prefix() {
        let s = format!("0x{}", "11".repeat(32));
        let root: StateRoot = s.parse().unwrap();
        assert_eq!(root.0, [0x11u8; 32]);
    }

    #[test]
    fn hex_parse_rejects_missing_prefix() {
        let s = "11".repeat(32);
        assert!(s.parse::<StateRoot>().is_err());
    }

    #[test]
    fn hex_parse_rejects_wrong_length() {
        let s = "0x1122";
        assert!(s.parse::<Address>().is_err());
    }
}

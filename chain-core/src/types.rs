//! Basic ledger types

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Block height type
pub type BlockHeight = u32;

/// Timestamp in seconds since Unix epoch
pub type Timestamp = u32;

macro_rules! fixed_hash {
    ($(#[$doc:meta])* $name:ident, $len:expr) => {
        $(#[$doc])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        pub struct $name([u8; $len]);

        impl $name {
            /// Length of the identifier in bytes
            pub const LEN: usize = $len;

            /// Create from a byte array (wire order)
            pub const fn new(bytes: [u8; $len]) -> Self {
                Self(bytes)
            }

            /// Create from a slice, `None` if the length is wrong
            pub fn from_slice(slice: &[u8]) -> Option<Self> {
                <[u8; $len]>::try_from(slice).ok().map(Self)
            }

            /// Get the underlying byte array (wire order)
            pub fn as_bytes(&self) -> &[u8; $len] {
                &self.0
            }

            /// Hex string in display order (bytes reversed)
            pub fn to_hex(&self) -> String {
                let mut reversed = self.0;
                reversed.reverse();
                hex::encode(reversed)
            }

            /// Parse a display-order hex string, with or without a `0x` prefix
            pub fn from_hex(s: &str) -> Result<Self, hex::FromHexError> {
                let s = s.strip_prefix("0x").unwrap_or(s);
                let mut bytes = [0u8; $len];
                hex::decode_to_slice(s, &mut bytes)?;
                bytes.reverse();
                Ok(Self(bytes))
            }

            /// All-zero identifier
            pub const fn zero() -> Self {
                Self([0u8; $len])
            }

            /// Check whether every byte is zero
            pub fn is_zero(&self) -> bool {
                self.0.iter().all(|b| *b == 0)
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::zero()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "0x{}", self.to_hex())
            }
        }

        impl FromStr for $name {
            type Err = hex::FromHexError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::from_hex(s)
            }
        }

        impl From<[u8; $len]> for $name {
            fn from(bytes: [u8; $len]) -> Self {
                Self(bytes)
            }
        }

        impl AsRef<[u8]> for $name {
            fn as_ref(&self) -> &[u8] {
                &self.0
            }
        }
    };
}

fixed_hash!(
    /// 256-bit identifier of blocks, transactions and assets
    Hash256,
    32
);

fixed_hash!(
    /// 160-bit identifier, used for script hashes (addresses)
    Hash160,
    20
);

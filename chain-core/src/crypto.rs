//! Hash functions and elliptic-curve public keys

use crate::io::{BinaryReader, BinaryWriter, Serializable};
use crate::{CoreError, CoreResult, Hash160, Hash256};
use p256::elliptic_curve::sec1::ToEncodedPoint;
use ripemd::Ripemd160;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// SHA-256 applied twice
pub fn hash256(data: &[u8]) -> Hash256 {
    let first = Sha256::digest(data);
    let second = Sha256::digest(first);
    Hash256::new(second.into())
}

/// RIPEMD-160 of SHA-256
pub fn hash160(data: &[u8]) -> Hash160 {
    let sha = Sha256::digest(data);
    let ripe = Ripemd160::digest(sha);
    Hash160::new(ripe.into())
}

/// Public key on the secp256r1 curve, held in compressed form.
///
/// Keys order by X coordinate and then by Y coordinate, which is the
/// order used when building multi-signature scripts. The point at
/// infinity sorts first.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct PublicKey(Option<CurvePoint>);

#[derive(Clone, Copy, PartialEq, Eq, Hash)]
struct CurvePoint {
    compressed: [u8; 33],
    y: [u8; 32],
}

impl PublicKey {
    /// Encoded length of a compressed key
    pub const COMPRESSED_LEN: usize = 33;

    /// The point at infinity
    pub const fn infinity() -> Self {
        Self(None)
    }

    pub fn is_infinity(&self) -> bool {
        self.0.is_none()
    }

    /// Decode from compressed, uncompressed/hybrid or infinity encoding.
    /// Points off the curve are rejected.
    pub fn decode(bytes: &[u8]) -> CoreResult<Self> {
        match bytes.first() {
            Some(0x00) if bytes.len() == 1 => Ok(Self::infinity()),
            Some(0x02) | Some(0x03) if bytes.len() == 33 => Self::from_sec1(bytes),
            Some(0x04) if bytes.len() == 65 => Self::from_sec1(bytes),
            Some(prefix @ (0x06 | 0x07)) if bytes.len() == 65 => {
                if prefix & 1 != bytes[64] & 1 {
                    return Err(CoreError::InvalidPublicKey(format!(
                        "hybrid prefix 0x{:02x} disagrees with Y parity",
                        prefix
                    )));
                }
                let mut uncompressed = bytes.to_vec();
                uncompressed[0] = 0x04;
                Self::from_sec1(&uncompressed)
            }
            Some(prefix) => Err(CoreError::InvalidPublicKey(format!(
                "prefix 0x{:02x} with length {}",
                prefix,
                bytes.len()
            ))),
            None => Err(CoreError::InvalidPublicKey("empty encoding".to_string())),
        }
    }

    fn from_sec1(bytes: &[u8]) -> CoreResult<Self> {
        let point = p256::PublicKey::from_sec1_bytes(bytes)
            .map_err(|_| CoreError::InvalidPublicKey("point is not on the curve".to_string()))?;

        let mut compressed = [0u8; 33];
        compressed.copy_from_slice(point.to_encoded_point(true).as_bytes());
        let uncompressed = point.to_encoded_point(false);
        let y = uncompressed
            .y()
            .ok_or_else(|| CoreError::InvalidPublicKey("missing Y coordinate".to_string()))?;
        let mut y_bytes = [0u8; 32];
        y_bytes.copy_from_slice(y.as_slice());

        Ok(Self(Some(CurvePoint {
            compressed,
            y: y_bytes,
        })))
    }

    /// Compressed encoding, or a single zero byte for infinity
    pub fn encode(&self) -> Vec<u8> {
        match &self.0 {
            Some(point) => point.compressed.to_vec(),
            None => vec![0x00],
        }
    }

    /// X coordinate bytes (big-endian)
    pub fn x(&self) -> Option<&[u8]> {
        self.0.as_ref().map(|point| &point.compressed[1..])
    }

    /// Y coordinate bytes (big-endian)
    pub fn y(&self) -> Option<&[u8]> {
        self.0.as_ref().map(|point| &point.y[..])
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.encode())
    }

    pub fn from_hex(s: &str) -> CoreResult<Self> {
        Self::decode(&hex::decode(s)?)
    }
}

impl Ord for PublicKey {
    fn cmp(&self, other: &Self) -> Ordering {
        match (&self.0, &other.0) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Less,
            (Some(_), None) => Ordering::Greater,
            (Some(a), Some(b)) => a.compressed[1..]
                .cmp(&b.compressed[1..])
                .then_with(|| a.y.cmp(&b.y)),
        }
    }
}

impl PartialOrd for PublicKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey({})", self.to_hex())
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for PublicKey {
    type Err = CoreError;

    fn from_str(s: &str) -> CoreResult<Self> {
        Self::from_hex(s)
    }
}

impl Serialize for PublicKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for PublicKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

impl Serializable for PublicKey {
    fn serialize(&self, writer: &mut BinaryWriter) {
        writer.write_bytes(&self.encode());
    }

    fn deserialize(reader: &mut BinaryReader<'_>) -> CoreResult<Self> {
        let prefix = reader.read_u8()?;
        let rest = match prefix {
            0x00 => 0,
            0x02 | 0x03 => 32,
            0x04 | 0x06 | 0x07 => 64,
            other => {
                return Err(CoreError::InvalidPublicKey(format!(
                    "unknown prefix 0x{:02x}",
                    other
                )))
            }
        };
        let mut bytes = vec![prefix];
        bytes.extend(reader.read_bytes(rest)?);
        Self::decode(&bytes)
    }
}

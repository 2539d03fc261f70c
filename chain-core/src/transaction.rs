//! Transaction data structures and operations

use crate::crypto::{hash256, PublicKey};
use crate::io::{BinaryReader, BinaryWriter, Serializable};
use crate::script::Script;
use crate::{CoreError, CoreResult, Fixed8, Hash160, Hash256};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Maximum number of attributes per transaction
pub const MAX_ATTRIBUTES: usize = 16;
/// Maximum number of witnesses per transaction
pub const MAX_SCRIPTS: usize = 255;
/// Maximum number of enrollments a single vote may endorse
pub const MAX_VOTE_ENROLLMENTS: usize = 1024;
/// Maximum length of an asset name in bytes
pub const MAX_ASSET_NAME: usize = 1024;
/// Maximum length of attribute data in bytes
pub const MAX_ATTRIBUTE_DATA: usize = 65535;

/// Fee charged for enrolling as a bookkeeper candidate, in whole units
pub const ENROLLMENT_FEE_UNITS: i64 = 1000;
/// Fee charged for registering a non-native asset, in whole units
pub const REGISTER_FEE_UNITS: i64 = 10000;

/// Transaction kind discriminator (first byte on the wire)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum TransactionType {
    /// Block reward, first transaction of every block
    Miner = 0x00,
    /// Issues units of a registered asset
    Issue = 0x01,
    /// Claims utility tokens generated by spent governing-token outputs
    Claim = 0x02,
    /// Enrolls a public key as a bookkeeper candidate
    Enrollment = 0x20,
    /// Endorses a set of enrollments with the stake of its outputs
    Voting = 0x24,
    /// Registers a new asset
    Register = 0x40,
    /// Generic transfer
    Contract = 0x80,
}

impl TryFrom<u8> for TransactionType {
    type Error = CoreError;

    fn try_from(value: u8) -> CoreResult<Self> {
        match value {
            0x00 => Ok(TransactionType::Miner),
            0x01 => Ok(TransactionType::Issue),
            0x02 => Ok(TransactionType::Claim),
            0x20 => Ok(TransactionType::Enrollment),
            0x24 => Ok(TransactionType::Voting),
            0x40 => Ok(TransactionType::Register),
            0x80 => Ok(TransactionType::Contract),
            other => Err(CoreError::UnknownTransactionType(other)),
        }
    }
}

/// Kind of registered asset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum AssetType {
    /// Native equity-like asset whose holders vote and earn generation
    GoverningToken = 0x00,
    /// Native fee-paying asset
    UtilityToken = 0x01,
    Currency = 0x08,
    Token = 0x60,
    Share = 0x90,
    Invoice = 0x98,
}

impl AssetType {
    /// Whether this is one of the two assets defined by the genesis block
    pub fn is_native(self) -> bool {
        matches!(self, AssetType::GoverningToken | AssetType::UtilityToken)
    }
}

impl TryFrom<u8> for AssetType {
    type Error = CoreError;

    fn try_from(value: u8) -> CoreResult<Self> {
        match value {
            0x00 => Ok(AssetType::GoverningToken),
            0x01 => Ok(AssetType::UtilityToken),
            0x08 => Ok(AssetType::Currency),
            0x60 => Ok(AssetType::Token),
            0x90 => Ok(AssetType::Share),
            0x98 => Ok(AssetType::Invoice),
            other => Err(CoreError::UnknownAssetType(other)),
        }
    }
}

/// Reference to an output of an earlier transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TransactionInput {
    pub prev_hash: Hash256,
    pub prev_index: u16,
}

impl TransactionInput {
    pub fn new(prev_hash: Hash256, prev_index: u16) -> Self {
        Self {
            prev_hash,
            prev_index,
        }
    }
}

impl Serializable for TransactionInput {
    fn serialize(&self, writer: &mut BinaryWriter) {
        writer.write_hash256(&self.prev_hash);
        writer.write_u16(self.prev_index);
    }

    fn deserialize(reader: &mut BinaryReader<'_>) -> CoreResult<Self> {
        Ok(Self {
            prev_hash: reader.read_hash256()?,
            prev_index: reader.read_u16()?,
        })
    }
}

/// Spendable unit: an amount of one asset locked to a script hash
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TransactionOutput {
    pub asset_id: Hash256,
    pub value: Fixed8,
    pub script_hash: Hash160,
}

impl TransactionOutput {
    pub fn new(asset_id: Hash256, value: Fixed8, script_hash: Hash160) -> Self {
        Self {
            asset_id,
            value,
            script_hash,
        }
    }
}

impl Serializable for TransactionOutput {
    fn serialize(&self, writer: &mut BinaryWriter) {
        writer.write_hash256(&self.asset_id);
        writer.write_fixed8(self.value);
        writer.write_hash160(&self.script_hash);
    }

    fn deserialize(reader: &mut BinaryReader<'_>) -> CoreResult<Self> {
        Ok(Self {
            asset_id: reader.read_hash256()?,
            value: reader.read_fixed8()?,
            script_hash: reader.read_hash160()?,
        })
    }
}

/// Opaque tagged attribute
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionAttribute {
    pub usage: u8,
    pub data: Vec<u8>,
}

impl Serializable for TransactionAttribute {
    fn serialize(&self, writer: &mut BinaryWriter) {
        writer.write_u8(self.usage);
        writer.write_var_bytes(&self.data);
    }

    fn deserialize(reader: &mut BinaryReader<'_>) -> CoreResult<Self> {
        Ok(Self {
            usage: reader.read_u8()?,
            data: reader.read_var_bytes(MAX_ATTRIBUTE_DATA)?,
        })
    }
}

/// Payload of an asset registration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetRegistration {
    pub asset_type: AssetType,
    pub name: String,
    /// Maximum issuance of the asset
    pub amount: Fixed8,
    pub issuer: PublicKey,
    /// Script hash allowed to administer the asset
    pub admin: Hash160,
}

/// Kind-specific transaction payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransactionPayload {
    Miner { nonce: u32 },
    Issue { nonce: u32 },
    Claim { claims: Vec<TransactionInput> },
    Enrollment { public_key: PublicKey },
    Voting { enrollments: Vec<Hash256> },
    Register(AssetRegistration),
    Contract,
}

impl TransactionPayload {
    pub fn transaction_type(&self) -> TransactionType {
        match self {
            TransactionPayload::Miner { .. } => TransactionType::Miner,
            TransactionPayload::Issue { .. } => TransactionType::Issue,
            TransactionPayload::Claim { .. } => TransactionType::Claim,
            TransactionPayload::Enrollment { .. } => TransactionType::Enrollment,
            TransactionPayload::Voting { .. } => TransactionType::Voting,
            TransactionPayload::Register(_) => TransactionType::Register,
            TransactionPayload::Contract => TransactionType::Contract,
        }
    }

    fn serialize(&self, writer: &mut BinaryWriter) {
        match self {
            TransactionPayload::Miner { nonce } | TransactionPayload::Issue { nonce } => {
                writer.write_u32(*nonce);
            }
            TransactionPayload::Claim { claims } => writer.write_array(claims),
            TransactionPayload::Enrollment { public_key } => {
                Serializable::serialize(public_key, writer)
            }
            TransactionPayload::Voting { enrollments } => {
                writer.write_var_int(enrollments.len() as u64);
                for hash in enrollments {
                    writer.write_hash256(hash);
                }
            }
            TransactionPayload::Register(asset) => {
                writer.write_u8(asset.asset_type as u8);
                writer.write_var_string(&asset.name);
                writer.write_fixed8(asset.amount);
                Serializable::serialize(&asset.issuer, writer);
                writer.write_hash160(&asset.admin);
            }
            TransactionPayload::Contract => {}
        }
    }

    fn deserialize(tx_type: TransactionType, reader: &mut BinaryReader<'_>) -> CoreResult<Self> {
        Ok(match tx_type {
            TransactionType::Miner => TransactionPayload::Miner {
                nonce: reader.read_u32()?,
            },
            TransactionType::Issue => TransactionPayload::Issue {
                nonce: reader.read_u32()?,
            },
            TransactionType::Claim => {
                let claims: Vec<TransactionInput> = reader.read_array(u16::MAX as usize)?;
                if claims.is_empty() {
                    return Err(CoreError::Format("claim without claims".to_string()));
                }
                TransactionPayload::Claim { claims }
            }
            TransactionType::Enrollment => TransactionPayload::Enrollment {
                public_key: <PublicKey as Serializable>::deserialize(reader)?,
            },
            TransactionType::Voting => {
                let count = reader.read_var_int(MAX_VOTE_ENROLLMENTS as u64)? as usize;
                let mut enrollments = Vec::with_capacity(count);
                for _ in 0..count {
                    enrollments.push(reader.read_hash256()?);
                }
                TransactionPayload::Voting { enrollments }
            }
            TransactionType::Register => TransactionPayload::Register(AssetRegistration {
                asset_type: AssetType::try_from(reader.read_u8()?)?,
                name: reader.read_var_string(MAX_ASSET_NAME)?,
                amount: reader.read_fixed8()?,
                issuer: <PublicKey as Serializable>::deserialize(reader)?,
                admin: reader.read_hash160()?,
            }),
            TransactionType::Contract => TransactionPayload::Contract,
        })
    }
}

/// Immutable transaction. The hash covers everything except the
/// witnesses and is computed once at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    payload: TransactionPayload,
    attributes: Vec<TransactionAttribute>,
    inputs: Vec<TransactionInput>,
    outputs: Vec<TransactionOutput>,
    scripts: Vec<Script>,
    hash: Hash256,
}

impl Transaction {
    /// Create an unsigned transaction
    pub fn new(
        payload: TransactionPayload,
        attributes: Vec<TransactionAttribute>,
        inputs: Vec<TransactionInput>,
        outputs: Vec<TransactionOutput>,
    ) -> Self {
        let mut tx = Self {
            payload,
            attributes,
            inputs,
            outputs,
            scripts: Vec::new(),
            hash: Hash256::zero(),
        };
        tx.hash = hash256(&tx.unsigned_data());
        tx
    }

    /// Generic transfer
    pub fn contract(inputs: Vec<TransactionInput>, outputs: Vec<TransactionOutput>) -> Self {
        Self::new(TransactionPayload::Contract, Vec::new(), inputs, outputs)
    }

    /// Bookkeeper candidate enrollment; the first output is the deposit
    /// that keeps the enrollment active while unspent
    pub fn enrollment(
        public_key: PublicKey,
        inputs: Vec<TransactionInput>,
        outputs: Vec<TransactionOutput>,
    ) -> Self {
        Self::new(
            TransactionPayload::Enrollment { public_key },
            Vec::new(),
            inputs,
            outputs,
        )
    }

    /// Vote for `enrollments` with the stake held in `outputs`
    pub fn voting(
        enrollments: Vec<Hash256>,
        inputs: Vec<TransactionInput>,
        outputs: Vec<TransactionOutput>,
    ) -> Self {
        Self::new(
            TransactionPayload::Voting { enrollments },
            Vec::new(),
            inputs,
            outputs,
        )
    }

    /// Attach witnesses; the hash is unaffected
    pub fn with_scripts(mut self, scripts: Vec<Script>) -> Self {
        self.scripts = scripts;
        self
    }

    pub fn hash(&self) -> Hash256 {
        self.hash
    }

    pub fn transaction_type(&self) -> TransactionType {
        self.payload.transaction_type()
    }

    pub fn payload(&self) -> &TransactionPayload {
        &self.payload
    }

    pub fn attributes(&self) -> &[TransactionAttribute] {
        &self.attributes
    }

    pub fn inputs(&self) -> &[TransactionInput] {
        &self.inputs
    }

    pub fn outputs(&self) -> &[TransactionOutput] {
        &self.outputs
    }

    pub fn scripts(&self) -> &[Script] {
        &self.scripts
    }

    /// Asset registration payload, if this registers an asset
    pub fn registration(&self) -> Option<&AssetRegistration> {
        match &self.payload {
            TransactionPayload::Register(asset) => Some(asset),
            _ => None,
        }
    }

    /// Enrolled public key, if this is an enrollment
    pub fn enrolled_key(&self) -> Option<&PublicKey> {
        match &self.payload {
            TransactionPayload::Enrollment { public_key } => Some(public_key),
            _ => None,
        }
    }

    /// Endorsed enrollment hashes, if this is a vote
    pub fn voted_enrollments(&self) -> Option<&[Hash256]> {
        match &self.payload {
            TransactionPayload::Voting { enrollments } => Some(enrollments),
            _ => None,
        }
    }

    /// Spent outputs claimed by a claim transaction (empty otherwise)
    pub fn claims(&self) -> &[TransactionInput] {
        match &self.payload {
            TransactionPayload::Claim { claims } => claims,
            _ => &[],
        }
    }

    /// Fee burned by including this transaction
    pub fn system_fee(&self) -> Fixed8 {
        let units = match &self.payload {
            TransactionPayload::Enrollment { .. } => ENROLLMENT_FEE_UNITS,
            TransactionPayload::Register(asset) if !asset.asset_type.is_native() => {
                REGISTER_FEE_UNITS
            }
            _ => 0,
        };
        Fixed8::from_raw(units * crate::FIXED8_ONE)
    }

    /// True if the same output is referenced twice by this transaction
    pub fn has_duplicate_inputs(&self) -> bool {
        let mut seen = HashSet::with_capacity(self.inputs.len());
        !self.inputs.iter().all(|input| seen.insert(*input))
    }

    /// Encoding covered by the hash
    pub fn unsigned_data(&self) -> Vec<u8> {
        let mut writer = BinaryWriter::new();
        self.serialize_unsigned(&mut writer);
        writer.into_bytes()
    }

    fn serialize_unsigned(&self, writer: &mut BinaryWriter) {
        writer.write_u8(self.transaction_type() as u8);
        self.payload.serialize(writer);
        writer.write_array(&self.attributes);
        writer.write_array(&self.inputs);
        writer.write_array(&self.outputs);
    }
}

impl Serializable for Transaction {
    fn serialize(&self, writer: &mut BinaryWriter) {
        self.serialize_unsigned(writer);
        writer.write_array(&self.scripts);
    }

    fn deserialize(reader: &mut BinaryReader<'_>) -> CoreResult<Self> {
        let tx_type = TransactionType::try_from(reader.read_u8()?)?;
        let payload = TransactionPayload::deserialize(tx_type, reader)?;
        let attributes = reader.read_array(MAX_ATTRIBUTES)?;
        let inputs = reader.read_array(u16::MAX as usize)?;
        let outputs = reader.read_array(u16::MAX as usize + 1)?;
        let scripts = reader.read_array(MAX_SCRIPTS)?;
        Ok(Transaction::new(payload, attributes, inputs, outputs).with_scripts(scripts))
    }
}

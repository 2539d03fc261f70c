//! Witness scripts and redeem-script construction

use crate::crypto::{hash160, PublicKey};
use crate::io::{BinaryReader, BinaryWriter, Serializable};
use crate::{CoreError, CoreResult, Hash160};
use serde::{Deserialize, Serialize};

/// Opcodes needed to build standard redeem scripts
pub mod opcode {
    pub const PUSH0: u8 = 0x00;
    pub const PUSHDATA1: u8 = 0x4c;
    pub const PUSHDATA2: u8 = 0x4d;
    pub const PUSHDATA4: u8 = 0x4e;
    pub const PUSH1: u8 = 0x51;
    pub const PUSH16: u8 = 0x60;
    pub const CHECKSIG: u8 = 0xac;
    pub const CHECKMULTISIG: u8 = 0xae;
}

/// Maximum number of keys in a multi-signature script
pub const MAX_MULTISIG_KEYS: usize = 1024;

/// Maximum encoded size of either half of a witness script
pub const MAX_SCRIPT_SIZE: usize = 65536;

/// Witness attached to a block header or transaction: the stack script
/// pushes signatures, the redeem script checks them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Script {
    pub stack_script: Vec<u8>,
    pub redeem_script: Vec<u8>,
}

impl Script {
    pub fn new(stack_script: Vec<u8>, redeem_script: Vec<u8>) -> Self {
        Self {
            stack_script,
            redeem_script,
        }
    }

    /// Address the witness unlocks
    pub fn script_hash(&self) -> Hash160 {
        hash160(&self.redeem_script)
    }
}

impl Serializable for Script {
    fn serialize(&self, writer: &mut BinaryWriter) {
        writer.write_var_bytes(&self.stack_script);
        writer.write_var_bytes(&self.redeem_script);
    }

    fn deserialize(reader: &mut BinaryReader<'_>) -> CoreResult<Self> {
        Ok(Self {
            stack_script: reader.read_var_bytes(MAX_SCRIPT_SIZE)?,
            redeem_script: reader.read_var_bytes(MAX_SCRIPT_SIZE)?,
        })
    }
}

/// Script hash of a redeem script
pub fn to_script_hash(script: &[u8]) -> Hash160 {
    hash160(script)
}

fn emit_push_bytes(script: &mut Vec<u8>, data: &[u8]) {
    let len = data.len();
    if len < opcode::PUSHDATA1 as usize {
        script.push(len as u8);
    } else if len <= 0xff {
        script.push(opcode::PUSHDATA1);
        script.push(len as u8);
    } else if len <= 0xffff {
        script.push(opcode::PUSHDATA2);
        script.extend_from_slice(&(len as u16).to_le_bytes());
    } else {
        script.push(opcode::PUSHDATA4);
        script.extend_from_slice(&(len as u32).to_le_bytes());
    }
    script.extend_from_slice(data);
}

fn emit_push_int(script: &mut Vec<u8>, value: usize) {
    match value {
        0 => script.push(opcode::PUSH0),
        1..=16 => script.push(opcode::PUSH1 - 1 + value as u8),
        _ => {
            // minimal little-endian two's complement
            let mut bytes = (value as u64).to_le_bytes().to_vec();
            while bytes.len() > 1 && bytes[bytes.len() - 1] == 0 {
                bytes.pop();
            }
            if bytes[bytes.len() - 1] & 0x80 != 0 {
                bytes.push(0);
            }
            emit_push_bytes(script, &bytes);
        }
    }
}

/// Single-key redeem script: `<key> CHECKSIG`
pub fn create_signature_redeem_script(key: &PublicKey) -> Vec<u8> {
    let mut script = Vec::with_capacity(35);
    emit_push_bytes(&mut script, &key.encode());
    script.push(opcode::CHECKSIG);
    script
}

/// `m`-of-`n` redeem script over `keys`, sorted into canonical key order
pub fn create_multisig_redeem_script(m: usize, keys: &[PublicKey]) -> CoreResult<Vec<u8>> {
    let n = keys.len();
    if m == 0 || m > n || n > MAX_MULTISIG_KEYS {
        return Err(CoreError::Script(format!(
            "invalid multisig threshold {} of {}",
            m, n
        )));
    }
    if keys.iter().any(PublicKey::is_infinity) {
        return Err(CoreError::Script(
            "multisig key cannot be the point at infinity".to_string(),
        ));
    }

    let mut sorted = keys.to_vec();
    sorted.sort();

    let mut script = Vec::with_capacity(n * 34 + 3);
    emit_push_int(&mut script, m);
    for key in &sorted {
        emit_push_bytes(&mut script, &key.encode());
    }
    emit_push_int(&mut script, n);
    script.push(opcode::CHECKMULTISIG);
    Ok(script)
}

//! EIP-712 typed structured data hashing.
//!
//! This module implements [EIP-712] hashing the way wallets do for
//! `eth_signTypedData_v3` and `eth_signTypedData_v4`, so a device signature
//! over typed data can be checked locally.
//!
//! # Hash Computation
//!
//! The final hash to sign is:
//! ```text
//! keccak256("\x19\x01" || hashStruct(EIP712Domain, domain) || hashStruct(primaryType, message))
//! ```
//!
//! The message part is left out when `primaryType` is `EIP712Domain`. If the
//! payload does not declare `EIP712Domain` in `types`, it is treated as a
//! struct without fields.
//!
//! # Versions
//!
//! - **V3**: no arrays; fields absent from the data are skipped.
//! - **V4**: arrays of any element type (dynamic `T[]` or fixed `T[n]`); a
//!   `null` nested struct encodes as 32 zero bytes; absent fields are errors.
//!
//! # Example
//!
//! ```
//! use keycard_verifier_core::TypedData;
//!
//! let typed_data = TypedData::from_json(r#"{
//!     "types": {
//!         "EIP712Domain": [{"name": "name", "type": "string"}],
//!         "Person": [
//!             {"name": "name", "type": "string"},
//!             {"name": "wallet", "type": "address"}
//!         ]
//!     },
//!     "primaryType": "Person",
//!     "domain": {"name": "My DApp"},
//!     "message": {"name": "Alice", "wallet": "0x0000000000000000000000000000000000000001"}
//! }"#).unwrap();
//!
//! let hash = typed_data.signing_hash().unwrap();
//! assert!(!hash.is_zero());
//! ```
//!
//! [EIP-712]: https://eips.ethereum.org/EIPS/eip-712

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use alloy_primitives::{B256, U256, keccak256};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Error, Result};

/// The name of the domain struct.
pub const DOMAIN_TYPE: &str = "EIP712Domain";

/// The typed-data hashing rules to apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TypedDataVersion {
    /// `eth_signTypedData_v3`.
    V3,
    /// `eth_signTypedData_v4`.
    #[default]
    V4,
}

impl TypedDataVersion {
    /// Returns the version tag, e.g. `"V4"`.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::V3 => "V3",
            Self::V4 => "V4",
        }
    }
}

impl fmt::Display for TypedDataVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A type field definition for EIP-712.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeField {
    /// The name of the field.
    pub name: String,

    /// The type of the field (e.g., "string", "uint256", "Person[]").
    #[serde(rename = "type")]
    pub field_type: String,
}

/// Typed structured data for EIP-712 signing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypedData {
    /// The type definitions, keyed by struct name.
    pub types: BTreeMap<String, Vec<TypeField>>,

    /// The primary type being signed.
    pub primary_type: String,

    /// The domain values, encoded as an `EIP712Domain` struct.
    #[serde(default = "empty_object")]
    pub domain: Value,

    /// The message data.
    #[serde(default = "empty_object")]
    pub message: Value,
}

impl TypedData {
    /// Creates a typed data instance from JSON parts.
    ///
    /// # Errors
    ///
    /// Returns [`Error::JsonError`] if `types` is not an object of field lists.
    pub fn new(types: Value, primary_type: String, domain: Value, message: Value) -> Result<Self> {
        Ok(Self {
            types: serde_json::from_value(types)?,
            primary_type,
            domain,
            message,
        })
    }

    /// Parses typed data from a JSON string.
    ///
    /// # Errors
    ///
    /// Returns [`Error::JsonError`] if parsing fails.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serializes the typed data to JSON.
    ///
    /// # Errors
    ///
    /// Returns [`Error::JsonError`] if serialization fails.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Computes the V4 signing hash.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidTypedData`] or [`Error::UndefinedType`] if the
    /// type definitions or data are malformed.
    pub fn signing_hash(&self) -> Result<B256> {
        self.signing_hash_with_version(TypedDataVersion::V4)
    }

    /// Computes the signing hash under the given version's rules.
    ///
    /// # Errors
    ///
    /// As [`TypedData::signing_hash`], plus [`Error::UnsupportedByVersion`]
    /// for constructs the version cannot encode.
    pub fn signing_hash_with_version(&self, version: TypedDataVersion) -> Result<B256> {
        let domain_separator = self.domain_separator(version)?;

        let mut data = Vec::with_capacity(2 + 32 + 32);
        data.extend_from_slice(&[0x19, 0x01]);
        data.extend_from_slice(domain_separator.as_slice());

        if self.primary_type != DOMAIN_TYPE {
            let message_hash = self.hash_struct(&self.primary_type, &self.message, version)?;
            data.extend_from_slice(message_hash.as_slice());
        }

        Ok(keccak256(&data))
    }

    /// Computes `hashStruct(EIP712Domain, domain)`.
    ///
    /// # Errors
    ///
    /// Returns an error if the domain does not match its declared fields.
    pub fn domain_separator(&self, version: TypedDataVersion) -> Result<B256> {
        self.hash_struct(DOMAIN_TYPE, &self.domain, version)
    }

    /// Computes `keccak256(typeHash || encodeData(data))` for a struct type.
    ///
    /// # Errors
    ///
    /// Returns an error if the type is undefined or the data does not match it.
    pub fn hash_struct(&self, type_name: &str, data: &Value, version: TypedDataVersion) -> Result<B256> {
        Encoder {
            typed_data: self,
            version,
        }
        .hash_struct(type_name, data)
    }

    /// Encodes the type string: the type itself, then every struct it
    /// references (transitively) in alphabetical order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UndefinedType`] if `type_name` is not declared.
    pub fn encode_type(&self, type_name: &str) -> Result<String> {
        let mut dependencies = BTreeSet::new();
        self.collect_dependencies(type_name, &mut dependencies);
        dependencies.remove(type_name);

        let mut result = self.encode_single_type(type_name)?;
        for dependency in dependencies {
            result.push_str(&self.encode_single_type(dependency)?);
        }
        Ok(result)
    }

    fn encode_single_type(&self, type_name: &str) -> Result<String> {
        let fields = self.fields(type_name)?;
        let members: Vec<String> = fields
            .iter()
            .map(|f| format!("{} {}", f.field_type, f.name))
            .collect();
        Ok(format!("{type_name}({})", members.join(",")))
    }

    fn collect_dependencies<'a>(&'a self, field_type: &'a str, found: &mut BTreeSet<&'a str>) {
        let base = base_type(field_type);
        if found.contains(base) {
            return;
        }
        let Some(fields) = self.struct_fields(base) else {
            return;
        };

        found.insert(base);
        for field in fields {
            self.collect_dependencies(&field.field_type, found);
        }
    }

    /// Looks up a struct's fields, with an implicit empty `EIP712Domain`.
    fn struct_fields(&self, type_name: &str) -> Option<&[TypeField]> {
        match self.types.get(type_name) {
            Some(fields) => Some(fields.as_slice()),
            None if type_name == DOMAIN_TYPE => Some(&[]),
            None => None,
        }
    }

    fn fields(&self, type_name: &str) -> Result<&[TypeField]> {
        self.struct_fields(type_name)
            .ok_or_else(|| Error::UndefinedType(type_name.to_string()))
    }
}

/// An absent `domain` or `message` reads as `{}`; an explicit `null` is kept
/// and rejected when hashed.
fn empty_object() -> Value {
    Value::Object(Map::new())
}

/// Strips array suffixes: `Person[][3]` -> `Person`.
fn base_type(field_type: &str) -> &str {
    let end = field_type
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .unwrap_or(field_type.len());
    &field_type[..end]
}

/// Walks a payload and produces the 32-byte word encodings.
struct Encoder<'a> {
    typed_data: &'a TypedData,
    version: TypedDataVersion,
}

impl Encoder<'_> {
    fn hash_struct(&self, type_name: &str, data: &Value) -> Result<B256> {
        let type_hash = keccak256(self.typed_data.encode_type(type_name)?.as_bytes());
        let encoded = self.encode_data(type_name, data)?;

        let mut buf = Vec::with_capacity(32 + encoded.len());
        buf.extend_from_slice(type_hash.as_slice());
        buf.extend_from_slice(&encoded);

        Ok(keccak256(&buf))
    }

    fn encode_data(&self, type_name: &str, data: &Value) -> Result<Vec<u8>> {
        let fields = self.typed_data.fields(type_name)?;

        let obj = match data {
            Value::Object(obj) => obj,
            _ => {
                return Err(Error::InvalidTypedData(format!(
                    "expected object for {type_name}"
                )));
            }
        };

        let mut encoded = Vec::with_capacity(32 * fields.len());
        for field in fields {
            match obj.get(&field.name) {
                Some(value) => {
                    let word = self.encode_field(&field.name, &field.field_type, value)?;
                    encoded.extend_from_slice(word.as_slice());
                }
                None if self.version == TypedDataVersion::V3 => {}
                None if self.typed_data.types.contains_key(&field.field_type) => {
                    encoded.extend_from_slice(B256::ZERO.as_slice());
                }
                None => {
                    return Err(Error::InvalidTypedData(format!(
                        "missing value for field {} of type {}",
                        field.name, field.field_type
                    )));
                }
            }
        }

        Ok(encoded)
    }

    fn encode_field(&self, name: &str, field_type: &str, value: &Value) -> Result<B256> {
        if self.typed_data.types.contains_key(field_type) {
            if value.is_null() {
                return match self.version {
                    TypedDataVersion::V4 => Ok(B256::ZERO),
                    TypedDataVersion::V3 => Err(Error::UnsupportedByVersion {
                        feature: format!("null struct field {name}"),
                        version: self.version.as_str(),
                    }),
                };
            }
            return self.hash_struct(field_type, value);
        }

        if value.is_null() {
            return Err(Error::InvalidTypedData(format!(
                "missing value for field {name} of type {field_type}"
            )));
        }

        if let Some(open) = field_type.strip_suffix(']').and_then(|t| t.rfind('[')) {
            if self.version == TypedDataVersion::V3 {
                return Err(Error::UnsupportedByVersion {
                    feature: format!("array type {field_type}"),
                    version: self.version.as_str(),
                });
            }

            let items = value
                .as_array()
                .ok_or_else(|| Error::InvalidTypedData(format!("expected array for {name}")))?;

            let element_type = &field_type[..open];
            let mut encoded = Vec::with_capacity(32 * items.len());
            for item in items {
                encoded.extend_from_slice(self.encode_field(name, element_type, item)?.as_slice());
            }
            return Ok(keccak256(&encoded));
        }

        encode_primitive(field_type, value)
    }
}

/// Encodes an atomic or dynamic primitive as one 32-byte word.
fn encode_primitive(field_type: &str, value: &Value) -> Result<B256> {
    match field_type {
        "string" => {
            let s = value
                .as_str()
                .ok_or_else(|| Error::InvalidTypedData("expected string".to_string()))?;
            Ok(keccak256(s.as_bytes()))
        }
        "bytes" => {
            let s = value
                .as_str()
                .ok_or_else(|| Error::InvalidTypedData("expected bytes string".to_string()))?;
            let bytes = match s.strip_prefix("0x") {
                Some(hex_digits) => hex::decode(hex_digits)?,
                None => s.as_bytes().to_vec(),
            };
            Ok(keccak256(&bytes))
        }
        "bool" => {
            let b = match value {
                Value::Bool(b) => *b,
                Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
                _ => return Err(Error::InvalidTypedData("expected bool".to_string())),
            };
            Ok(to_word(U256::from(u8::from(b))))
        }
        "address" => {
            let (negative, magnitude) = parse_integer(value)?;
            if negative || magnitude.bit_len() > 160 {
                return Err(Error::InvalidTypedData(format!("invalid address: {value}")));
            }
            Ok(to_word(magnitude))
        }
        t if t.starts_with("bytes") => {
            let size = type_width(t, "bytes", 0)?;
            if !(1..=32).contains(&size) {
                return Err(Error::InvalidTypedData(format!("invalid bytes type: {t}")));
            }

            let s = value
                .as_str()
                .ok_or_else(|| Error::InvalidTypedData("expected hex string".to_string()))?;
            let bytes = hex::decode(s.strip_prefix("0x").unwrap_or(s))?;
            if bytes.len() > size {
                return Err(Error::InvalidTypedData(format!(
                    "bytes too long for {t}: {} > {size}",
                    bytes.len()
                )));
            }

            let mut word = B256::ZERO;
            word[..bytes.len()].copy_from_slice(&bytes);
            Ok(word)
        }
        t if t.starts_with("uint") => {
            let bits = integer_width(t, "uint")?;
            let (negative, magnitude) = parse_integer(value)?;
            if negative || magnitude.bit_len() > bits {
                return Err(Error::InvalidTypedData(format!(
                    "value {value} does not fit {t}"
                )));
            }
            Ok(to_word(magnitude))
        }
        t if t.starts_with("int") => {
            let bits = integer_width(t, "int")?;
            let (negative, magnitude) = parse_integer(value)?;
            let limit = U256::from(1u8) << (bits - 1);
            let fits = if negative {
                magnitude <= limit
            } else {
                magnitude < limit
            };
            if !fits {
                return Err(Error::InvalidTypedData(format!(
                    "value {value} does not fit {t}"
                )));
            }
            let word = if negative {
                U256::ZERO.wrapping_sub(magnitude)
            } else {
                magnitude
            };
            Ok(to_word(word))
        }
        _ => Err(Error::InvalidTypedData(format!(
            "unsupported type: {field_type}"
        ))),
    }
}

fn to_word(value: U256) -> B256 {
    B256::from(value.to_be_bytes::<32>())
}

/// Reads the bit width of `uintN` / `intN`; a bare `uint` / `int` is 256.
fn integer_width(field_type: &str, prefix: &str) -> Result<usize> {
    let bits = type_width(field_type, prefix, 256)?;
    if bits == 0 || bits > 256 || bits % 8 != 0 {
        return Err(Error::InvalidTypedData(format!(
            "invalid integer type: {field_type}"
        )));
    }
    Ok(bits)
}

fn type_width(field_type: &str, prefix: &str, default: usize) -> Result<usize> {
    let suffix = &field_type[prefix.len()..];
    if suffix.is_empty() {
        return Ok(default);
    }
    suffix
        .parse()
        .map_err(|_| Error::InvalidTypedData(format!("unsupported type: {field_type}")))
}

/// Parses a JSON integer (number, decimal string or `0x` hex string) into a
/// sign and magnitude.
fn parse_integer(value: &Value) -> Result<(bool, U256)> {
    match value {
        Value::Number(n) => {
            if let Some(u) = n.as_u64() {
                Ok((false, U256::from(u)))
            } else if let Some(i) = n.as_i64() {
                Ok((i < 0, U256::from(i.unsigned_abs())))
            } else {
                Err(Error::InvalidTypedData(format!(
                    "expected integer, got {n}"
                )))
            }
        }
        Value::String(s) => {
            let (negative, digits) = match s.trim().strip_prefix('-') {
                Some(rest) => (true, rest),
                None => (false, s.trim()),
            };
            let magnitude = match digits.strip_prefix("0x") {
                Some(hex_digits) => U256::from_str_radix(hex_digits, 16),
                None => U256::from_str_radix(digits, 10),
            }
            .map_err(|_| Error::InvalidTypedData(format!("invalid integer: {s}")))?;
            Ok((negative && !magnitude.is_zero(), magnitude))
        }
        _ => Err(Error::InvalidTypedData(format!(
            "expected integer, got {value}"
        ))),
    }
}

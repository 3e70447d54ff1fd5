//! Domain value objects: variable types, data values, content hashes.
//!
//! # Design
//!
//! These are pure value types with equality-by-value and no identity. They
//! define their string representations and `FromStr` parsers; coercion rules
//! for user-supplied answers live next to the type they coerce into.

use crate::domain::error::DomainError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;

// ── VariableType ─────────────────────────────────────────────────────────────

/// Declared type of a template variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VariableType {
    #[serde(alias = "string")]
    Str,
    #[serde(alias = "boolean")]
    Bool,
    #[serde(alias = "integer")]
    Int,
    Float,
}

impl VariableType {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Str => "str",
            Self::Bool => "bool",
            Self::Int => "int",
            Self::Float => "float",
        }
    }
}

impl fmt::Display for VariableType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VariableType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "str" | "string" => Ok(Self::Str),
            "bool" | "boolean" => Ok(Self::Bool),
            "int" | "integer" => Ok(Self::Int),
            "float" => Ok(Self::Float),
            other => Err(DomainError::InvalidTemplate(format!(
                "unknown variable type: {other}"
            ))),
        }
    }
}

// ── DataValue ────────────────────────────────────────────────────────────────

/// A single answer in a data context.
///
/// Untagged so that provenance files and manifests read naturally
/// (`include_docs = true`, `project_name = "demo"`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DataValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl DataValue {
    pub fn type_of(&self) -> VariableType {
        match self {
            Self::Bool(_) => VariableType::Bool,
            Self::Int(_) => VariableType::Int,
            Self::Float(_) => VariableType::Float,
            Self::Str(_) => VariableType::Str,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Truthiness as used by conditional inclusion: `false`, `0`, and the
    /// empty string are falsy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Bool(b) => *b,
            Self::Int(i) => *i != 0,
            Self::Float(f) => *f != 0.0,
            Self::Str(s) => !s.is_empty(),
        }
    }

    /// Convert this value into `target`.
    ///
    /// Strings coming from the command line (`--data include_docs=true`) are
    /// parsed; already-typed values only convert losslessly.
    pub fn coerce(&self, target: VariableType) -> Result<DataValue, String> {
        match (self, target) {
            (v, t) if v.type_of() == t => Ok(v.clone()),
            (Self::Str(raw), VariableType::Bool) => parse_bool(raw)
                .map(Self::Bool)
                .ok_or_else(|| format!("'{raw}' is not a boolean (expected true/false)")),
            (Self::Str(raw), VariableType::Int) => raw
                .trim()
                .parse::<i64>()
                .map(Self::Int)
                .map_err(|_| format!("'{raw}' is not an integer")),
            (Self::Str(raw), VariableType::Float) => raw
                .trim()
                .parse::<f64>()
                .map(Self::Float)
                .map_err(|_| format!("'{raw}' is not a number")),
            (Self::Int(i), VariableType::Float) => Ok(Self::Float(*i as f64)),
            (v, VariableType::Str) => Ok(Self::Str(v.to_string())),
            (v, t) => Err(format!("cannot use {} value '{v}' as {t}", v.type_of())),
        }
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "y" | "on" | "1" => Some(true),
        "false" | "no" | "n" | "off" | "0" | "" => Some(false),
        _ => None,
    }
}

impl fmt::Display for DataValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::Str(s) => f.write_str(s),
        }
    }
}

impl From<&str> for DataValue {
    fn from(s: &str) -> Self {
        Self::Str(s.to_string())
    }
}

impl From<String> for DataValue {
    fn from(s: String) -> Self {
        Self::Str(s)
    }
}

impl From<bool> for DataValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for DataValue {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

// ── ContentHash ──────────────────────────────────────────────────────────────

/// SHA-256 fingerprint of rendered file content.
///
/// Serialized as lowercase hex so provenance files stay diffable.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ContentHash([u8; 32]);

impl ContentHash {
    pub fn of(content: &[u8]) -> Self {
        Self(Sha256::digest(content).into())
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    pub fn from_hex(s: &str) -> Result<Self, DomainError> {
        let bytes = hex::decode(s)
            .map_err(|e| DomainError::InvalidProvenance(format!("bad hash '{s}': {e}")))?;
        let arr: [u8; 32] = bytes.try_into().map_err(|v: Vec<u8>| {
            DomainError::InvalidProvenance(format!(
                "bad hash '{s}': expected 32 bytes, got {}",
                v.len()
            ))
        })?;
        Ok(Self(arr))
    }

    /// Whether `content` hashes to this value.
    pub fn matches(&self, content: &[u8]) -> bool {
        Self::of(content) == *self
    }
}

impl fmt::Debug for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentHash({})", &self.to_hex()[..12])
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Serialize for ContentHash {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for ContentHash {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

/// Incremental fingerprint over a whole template source.
///
/// Entries must be fed in a stable order (the loader walks sorted by name).
/// Path and content are length-prefixed so `("ab", "c")` and `("a", "bc")`
/// never collide.
#[derive(Default)]
pub struct Fingerprint {
    hasher: Sha256,
}

impl Fingerprint {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, path: &str, content: &[u8]) {
        self.hasher.update((path.len() as u64).to_le_bytes());
        self.hasher.update(path.as_bytes());
        self.hasher.update((content.len() as u64).to_le_bytes());
        self.hasher.update(content);
    }

    pub fn finish(self) -> ContentHash {
        ContentHash(self.hasher.finalize().into())
    }
}

// ── ConflictMode ─────────────────────────────────────────────────────────────

/// What the updater does with template changes to files the user edited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConflictMode {
    /// Write the incoming content next to the file as `<path>.rej`.
    #[default]
    Rej,
    /// Keep the user's file and only report the advisory.
    Skip,
}

impl ConflictMode {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Rej => "rej",
            Self::Skip => "skip",
        }
    }
}

impl fmt::Display for ConflictMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConflictMode {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "rej" | "reject" => Ok(Self::Rej),
            "skip" | "ignore" => Ok(Self::Skip),
            other => Err(DomainError::InvalidDataContext {
                variable: "conflict".into(),
                reason: format!("unknown conflict mode: {other}"),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn variable_type_parses_aliases() {
        assert_eq!("string".parse::<VariableType>().unwrap(), VariableType::Str);
        assert_eq!("BOOL".parse::<VariableType>().unwrap(), VariableType::Bool);
        assert_eq!("integer".parse::<VariableType>().unwrap(), VariableType::Int);
        assert!("list".parse::<VariableType>().is_err());
    }

    #[test]
    fn string_coerces_to_bool() {
        let v = DataValue::from("true").coerce(VariableType::Bool).unwrap();
        assert_eq!(v, DataValue::Bool(true));

        let v = DataValue::from("No").coerce(VariableType::Bool).unwrap();
        assert_eq!(v, DataValue::Bool(false));

        assert!(DataValue::from("maybe").coerce(VariableType::Bool).is_err());
    }

    #[test]
    fn empty_string_is_false_for_bool() {
        let v = DataValue::from("").coerce(VariableType::Bool).unwrap();
        assert_eq!(v, DataValue::Bool(false));
    }

    #[test]
    fn string_coerces_to_numbers() {
        assert_eq!(
            DataValue::from("42").coerce(VariableType::Int).unwrap(),
            DataValue::Int(42)
        );
        assert_eq!(
            DataValue::from("1.5").coerce(VariableType::Float).unwrap(),
            DataValue::Float(1.5)
        );
        assert!(DataValue::from("4x").coerce(VariableType::Int).is_err());
    }

    #[test]
    fn typed_values_stringify_for_str() {
        assert_eq!(
            DataValue::Bool(true).coerce(VariableType::Str).unwrap(),
            DataValue::from("true")
        );
    }

    #[test]
    fn bool_does_not_become_int() {
        assert!(DataValue::Bool(true).coerce(VariableType::Int).is_err());
    }

    #[test]
    fn truthiness() {
        assert!(DataValue::from("x").is_truthy());
        assert!(!DataValue::from("").is_truthy());
        assert!(!DataValue::Int(0).is_truthy());
        assert!(DataValue::Bool(true).is_truthy());
    }

    #[test]
    fn content_hash_hex_round_trips() {
        let h = ContentHash::of(b"hello");
        assert_eq!(
            h.to_hex(),
            "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824"
        );
        assert_eq!(ContentHash::from_hex(&h.to_hex()).unwrap(), h);
        assert!(h.matches(b"hello"));
        assert!(!h.matches(b"hello\n"));
    }

    #[test]
    fn content_hash_rejects_short_hex() {
        assert!(ContentHash::from_hex("abcd").is_err());
        assert!(ContentHash::from_hex("zz").is_err());
    }

    #[test]
    fn fingerprint_is_order_sensitive_and_unambiguous() {
        let mut a = Fingerprint::new();
        a.add("ab", b"c");
        let mut b = Fingerprint::new();
        b.add("a", b"bc");
        assert_ne!(a.finish(), b.finish());
    }

    #[test]
    fn conflict_mode_parses() {
        assert_eq!("rej".parse::<ConflictMode>().unwrap(), ConflictMode::Rej);
        assert_eq!("SKIP".parse::<ConflictMode>().unwrap(), ConflictMode::Skip);
        assert!("merge".parse::<ConflictMode>().is_err());
    }
}

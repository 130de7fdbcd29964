// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Field type system for dataset schemas
//!
//! Declared field types form a closed set of primitives plus an explicit
//! `Opaque` variant (never cast). Backends can register additional named
//! types through [`TypeRegistry`].

pub mod casting;

pub use casting::{CastFn, TypeCaster, TypeRegistry};

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use thiserror::Error;

/// Declared type of a dataset field
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FieldType {
    Boolean,
    Integer,
    Float,
    String,
    /// No cast is enforced on load or dump
    Opaque,
    /// Backend-specific type resolved through a [`TypeRegistry`]
    Custom(String),
}

impl FieldType {
    pub fn is_opaque(&self) -> bool {
        matches!(self, FieldType::Opaque)
    }

    pub fn name(&self) -> &str {
        match self {
            FieldType::Boolean => "bool",
            FieldType::Integer => "int",
            FieldType::Float => "float",
            FieldType::String => "str",
            FieldType::Opaque => "opaque",
            FieldType::Custom(name) => name,
        }
    }
}

impl Default for FieldType {
    fn default() -> Self {
        FieldType::Opaque
    }
}

impl std::str::FromStr for FieldType {
    type Err = std::convert::Infallible;

    /// Unrecognised names become [`FieldType::Custom`]
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.to_lowercase().as_str() {
            "bool" | "boolean" => FieldType::Boolean,
            "int" | "int8" | "int16" | "int32" | "int64" | "integer" => FieldType::Integer,
            "float" | "float32" | "float64" | "double" => FieldType::Float,
            "str" | "string" | "object" | "text" => FieldType::String,
            "obj" | "opaque" | "any" | "unknown" => FieldType::Opaque,
            _ => FieldType::Custom(s.to_string()),
        })
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl Serialize for FieldType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for FieldType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(raw.parse().unwrap_or(FieldType::Opaque))
    }
}

/// Type system errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TypeError {
    #[error("Cannot cast {value} ({from}) to {to}")]
    InvalidCast {
        value: String,
        from: String,
        to: String,
    },

    #[error("Unknown field type: {0}")]
    UnknownType(String),
}

pub type TypeResult<T> = Result<T, TypeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_type_names() {
        assert_eq!("int64".parse::<FieldType>().unwrap(), FieldType::Integer);
        assert_eq!("obj".parse::<FieldType>().unwrap(), FieldType::Opaque);
        assert_eq!("Float".parse::<FieldType>().unwrap(), FieldType::Float);
        assert_eq!(
            "category".parse::<FieldType>().unwrap(),
            FieldType::Custom("category".to_string())
        );
    }

    #[test]
    fn test_serde_uses_type_names() {
        let json = serde_json::to_string(&FieldType::Integer).unwrap();
        assert_eq!(json, "\"int\"");
        let back: FieldType = serde_json::from_str("\"str\"").unwrap();
        assert_eq!(back, FieldType::String);
    }
}

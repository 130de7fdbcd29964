// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Value casting for schema enforcement
//!
//! Implements the conversions applied when a dataset is loaded or dumped
//! against its declared field types.

use super::{FieldType, TypeError, TypeResult};
use crate::storage::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Conversion function for a registered custom type
pub type CastFn = Arc<dyn Fn(&Value) -> TypeResult<Value> + Send + Sync>;

/// Registry of backend-specific field types
#[derive(Clone, Default)]
pub struct TypeRegistry {
    casts: HashMap<String, CastFn>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) the conversion for a custom type name
    pub fn register<F>(&mut self, name: impl Into<String>, cast: F)
    where
        F: Fn(&Value) -> TypeResult<Value> + Send + Sync + 'static,
    {
        self.casts.insert(name.into(), Arc::new(cast));
    }

    pub fn get(&self, name: &str) -> Option<&CastFn> {
        self.casts.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.casts.contains_key(name)
    }
}

impl fmt::Debug for TypeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.casts.keys().collect();
        names.sort();
        f.debug_struct("TypeRegistry").field("types", &names).finish()
    }
}

/// Casts values to declared field types
#[derive(Debug)]
pub struct TypeCaster;

impl TypeCaster {
    /// Cast a value to `to`. Nulls pass through for every type.
    pub fn cast(value: &Value, to: &FieldType, registry: &TypeRegistry) -> TypeResult<Value> {
        if value.is_null() {
            return Ok(Value::Null);
        }

        match to {
            FieldType::Opaque => Ok(value.clone()),
            FieldType::Boolean => Self::to_boolean(value),
            FieldType::Integer => Self::to_integer(value),
            FieldType::Float => Self::to_float(value),
            FieldType::String => Ok(Value::String(value.to_string())),
            FieldType::Custom(name) => {
                let cast = registry
                    .get(name)
                    .ok_or_else(|| TypeError::UnknownType(name.clone()))?;
                cast(value)
            }
        }
    }

    fn to_boolean(value: &Value) -> TypeResult<Value> {
        match value {
            Value::Boolean(b) => Ok(Value::Boolean(*b)),
            Value::Integer(i) => Ok(Value::Boolean(*i != 0)),
            Value::Float(f) => Ok(Value::Boolean(*f != 0.0)),
            Value::String(s) => match s.trim().to_lowercase().as_str() {
                "true" | "1" | "yes" | "y" | "t" => Ok(Value::Boolean(true)),
                "false" | "0" | "no" | "n" | "f" => Ok(Value::Boolean(false)),
                _ => Err(Self::invalid(value, &FieldType::Boolean)),
            },
            Value::Null => Ok(Value::Null),
        }
    }

    fn to_integer(value: &Value) -> TypeResult<Value> {
        match value {
            Value::Integer(i) => Ok(Value::Integer(*i)),
            // Truncates toward zero
            Value::Float(f) if f.is_finite() => Ok(Value::Integer(f.trunc() as i64)),
            Value::Boolean(b) => Ok(Value::Integer(i64::from(*b))),
            Value::String(s) => {
                let s = s.trim();
                if let Ok(i) = s.parse::<i64>() {
                    return Ok(Value::Integer(i));
                }
                match s.parse::<f64>() {
                    Ok(f) if f.is_finite() && f.fract() == 0.0 => Ok(Value::Integer(f as i64)),
                    _ => Err(Self::invalid(value, &FieldType::Integer)),
                }
            }
            _ => Err(Self::invalid(value, &FieldType::Integer)),
        }
    }

    fn to_float(value: &Value) -> TypeResult<Value> {
        match value {
            Value::Float(f) => Ok(Value::Float(*f)),
            Value::Integer(i) => Ok(Value::Float(*i as f64)),
            Value::Boolean(b) => Ok(Value::Float(if *b { 1.0 } else { 0.0 })),
            Value::String(s) => s
                .trim()
                .parse::<f64>()
                .map(Value::Float)
                .map_err(|_| Self::invalid(value, &FieldType::Float)),
            Value::Null => Ok(Value::Null),
        }
    }

    fn invalid(value: &Value, to: &FieldType) -> TypeError {
        TypeError::InvalidCast {
            value: value.to_string(),
            from: value.type_name().to_string(),
            to: to.to_string(),
        }
    }
}

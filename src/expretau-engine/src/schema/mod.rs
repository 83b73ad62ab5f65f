// Copyright 2026 The Expretau Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

//! Record schemas.
//!
//! A [`Schema`] is the declarative, JSON-Schema-like description of a
//! record as written by users.  [`compile_schema`] turns it into a
//! [`SchemaRoot`]: a tree of [`SchemaNode`]s where every leaf owns one slot
//! of a flat value array.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::common::{Result, TypeCode};
use crate::data::DataFormat;
use crate::schema_err;

mod compiled;

pub use self::compiled::{SchemaNode, SchemaRoot, compile_schema};

#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Schema {
    Integer {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        format: Option<String>,
    },
    Number {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        format: Option<String>,
    },
    String,
    Boolean,
    Array {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        items: Option<Items>,
        #[serde(
            default,
            rename = "additionalItems",
            skip_serializing_if = "Option::is_none"
        )]
        additional_items: Option<bool>,
    },
    Object {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        properties: Option<BTreeMap<String, Schema>>,
        #[serde(
            default,
            rename = "additionalProperties",
            skip_serializing_if = "Option::is_none"
        )]
        additional_properties: Option<bool>,
    },
}

/// The `items` of an array schema: one schema for every element, or one
/// per position.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Items {
    Each(Box<Schema>),
    Positional(Vec<Schema>),
}

impl Schema {
    /// scalar_type is the tag of a schema describing a single scalar.
    pub fn scalar_type(&self) -> Option<TypeCode> {
        match self {
            Schema::Integer { format } if format.as_deref() == Some("int32") => Some(TypeCode::Int),
            Schema::Integer { .. } => Some(TypeCode::Long),
            Schema::Number { format } if format.as_deref() == Some("decimal") => {
                Some(TypeCode::Decimal)
            }
            Schema::Number { .. } => Some(TypeCode::Double),
            Schema::String => Some(TypeCode::String),
            Schema::Boolean => Some(TypeCode::Bool),
            Schema::Array { .. } | Schema::Object { .. } => None,
        }
    }
}

/// SchemaParser reads and writes schema documents in one format.
#[derive(Clone, Copy, Debug)]
pub struct SchemaParser {
    format: DataFormat,
}

impl SchemaParser {
    pub fn new(format: DataFormat) -> Self {
        SchemaParser { format }
    }

    pub fn json() -> Self {
        Self::new(DataFormat::Json)
    }

    pub fn yaml() -> Self {
        Self::new(DataFormat::Yaml)
    }

    pub fn parse_schema(&self, text: &str) -> Result<Schema> {
        let parsed = match self.format {
            DataFormat::Json => serde_json::from_str(text).map_err(|e| e.to_string()),
            DataFormat::Yaml => serde_yml::from_str(text).map_err(|e| e.to_string()),
        };
        match parsed {
            Ok(schema) => Ok(schema),
            Err(err) => schema_err!(BadSchema, err),
        }
    }

    /// parse reads a schema document and compiles it.
    pub fn parse(&self, text: &str) -> Result<SchemaRoot> {
        Ok(compile_schema(&self.parse_schema(text)?))
    }

    pub fn serialize(&self, schema: &Schema) -> Result<String> {
        let text = match self.format {
            DataFormat::Json => serde_json::to_string_pretty(schema).map_err(|e| e.to_string()),
            DataFormat::Yaml => serde_yml::to_string(schema).map_err(|e| e.to_string()),
        };
        match text {
            Ok(text) => Ok(text),
            Err(err) => schema_err!(BadSchema, err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::ErrorCode;

    #[test]
    fn test_parse_yaml_schema() {
        let schema = SchemaParser::yaml()
            .parse_schema(
                "type: object\n\
                 properties:\n  \
                   a: {type: integer, format: int32}\n  \
                   b: {type: number}\n  \
                   c:\n    \
                     type: array\n    \
                     items: [{type: string}, {type: boolean}]\n    \
                     additionalItems: false\n\
                 additionalProperties: false\n",
            )
            .unwrap();
        let Schema::Object {
            properties: Some(properties),
            additional_properties: Some(false),
        } = &schema
        else {
            panic!("expected a closed object, got {schema:?}");
        };
        assert_eq!(Some(TypeCode::Int), properties["a"].scalar_type());
        assert_eq!(Some(TypeCode::Double), properties["b"].scalar_type());
        assert!(matches!(
            &properties["c"],
            Schema::Array {
                items: Some(Items::Positional(items)),
                additional_items: Some(false),
            } if items.len() == 2
        ));
    }

    #[test]
    fn test_schema_text_round_trip() {
        let schema = SchemaParser::json()
            .parse_schema(
                r#"{"type": "array", "items": {"type": "number", "format": "decimal"},
                    "description": "ignored"}"#,
            )
            .unwrap();
        let text = SchemaParser::yaml().serialize(&schema).unwrap();
        assert_eq!(schema, SchemaParser::yaml().parse_schema(&text).unwrap());
    }

    #[test]
    fn test_bad_schema() {
        let err = SchemaParser::json()
            .parse_schema(r#"{"type": "tensor"}"#)
            .unwrap_err();
        assert_eq!(ErrorCode::BadSchema, err.code);
        assert_eq!(crate::common::ErrorKind::Schema, err.kind);
    }
}

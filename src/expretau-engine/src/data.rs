// Copyright 2026 The Expretau Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

//! Records: reading JSON and YAML documents into slot arrays laid out by a
//! schema, and writing them back.

use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use bigdecimal::BigDecimal;
use serde_json::Value as Json;

use crate::common::{Result, TypeCode};
use crate::runtime::EvalContext;
use crate::schema::{SchemaNode, SchemaRoot};
use crate::value::Value;
use crate::{data_err, eval_err};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum DataFormat {
    Json,
    Yaml,
}

impl DataFormat {
    /// from_extension picks the format of a file from its name.
    pub fn from_extension(path: &Path) -> Result<DataFormat> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Ok(DataFormat::Json),
            Some("yml") | Some("yaml") => Ok(DataFormat::Yaml),
            _ => data_err!(UnsupportedFormat, format!("{}", path.display())),
        }
    }

    pub fn read_document(self, text: &str) -> Result<Json> {
        let parsed = match self {
            DataFormat::Json => serde_json::from_str(text).map_err(|e| e.to_string()),
            DataFormat::Yaml => serde_yml::from_str(text).map_err(|e| e.to_string()),
        };
        match parsed {
            Ok(doc) => Ok(doc),
            Err(err) => data_err!(BadData, err),
        }
    }

    pub fn write_document(self, doc: &Json) -> Result<String> {
        let text = match self {
            DataFormat::Json => serde_json::to_string(doc).map_err(|e| e.to_string()),
            DataFormat::Yaml => serde_yml::to_string(doc).map_err(|e| e.to_string()),
        };
        match text {
            Ok(text) => Ok(text),
            Err(err) => data_err!(BadData, err),
        }
    }
}

/// RtData is a record: one value per schema leaf.
#[derive(Clone, PartialEq, Debug)]
pub struct RtData {
    slots: Box<[Value]>,
}

impl RtData {
    pub fn new(len: usize) -> Self {
        RtData {
            slots: vec![Value::Null; len].into_boxed_slice(),
        }
    }

    pub fn get(&self, slot: usize) -> Option<&Value> {
        self.slots.get(slot)
    }

    pub fn set(&mut self, slot: usize, value: Value) -> Result<()> {
        let len = self.slots.len();
        match self.slots.get_mut(slot) {
            Some(v) => {
                *v = value;
                Ok(())
            }
            None => eval_err!(IndexOutOfBounds, format!("slot {slot} of {len}")),
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn slots(&self) -> &[Value] {
        &self.slots
    }
}

impl EvalContext for RtData {
    fn get(&self, slot: usize) -> Option<&Value> {
        RtData::get(self, slot)
    }

    fn set(&mut self, slot: usize, value: Value) -> Result<()> {
        RtData::set(self, slot, value)
    }

    fn len(&self) -> usize {
        RtData::len(self)
    }
}

impl fmt::Display for RtData {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (i, value) in self.slots.iter().enumerate() {
            writeln!(f, "{i:03}: {value}")?;
        }
        Ok(())
    }
}

// Leaves read document nodes leniently: a node of the wrong kind is
// coerced where that makes sense and defaults to zero, false or the empty
// string otherwise.

fn as_i64(node: &Json) -> i64 {
    match node {
        Json::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .unwrap_or(0),
        Json::String(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().map(|f| f as i64))
                .unwrap_or(0)
        }
        Json::Bool(b) => i64::from(*b),
        _ => 0,
    }
}

fn as_i32(node: &Json) -> i32 {
    as_i64(node) as i32
}

fn as_f64(node: &Json) -> f64 {
    match node {
        Json::Number(n) => n.as_f64().unwrap_or(0.0),
        Json::String(s) => s.trim().parse::<f64>().unwrap_or(0.0),
        Json::Bool(b) => f64::from(u8::from(*b)),
        _ => 0.0,
    }
}

fn as_decimal(node: &Json) -> BigDecimal {
    let text = match node {
        Json::Number(n) => n.to_string(),
        Json::String(s) => s.trim().to_owned(),
        _ => return BigDecimal::from(0),
    };
    BigDecimal::from_str(&text).unwrap_or_else(|_| BigDecimal::from(0))
}

fn as_text(node: &Json) -> Arc<str> {
    match node {
        Json::String(s) => s.as_str().into(),
        Json::Number(n) => n.to_string().into(),
        Json::Bool(b) => b.to_string().into(),
        Json::Null => "null".into(),
        Json::Array(_) | Json::Object(_) => "".into(),
    }
}

fn as_bool(node: &Json) -> bool {
    match node {
        Json::Bool(b) => *b,
        Json::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Json::String(s) => s.trim() == "true",
        _ => false,
    }
}

fn array<T>(node: &Json, each: impl Fn(&Json) -> T) -> Option<Arc<[T]>> {
    match node {
        Json::Array(items) => Some(items.iter().map(each).collect()),
        _ => None,
    }
}

/// read_leaf converts a document node to a value of `type_code`.  None
/// leaves the slot unset.
fn read_leaf(type_code: TypeCode, node: &Json) -> Option<Value> {
    if node.is_null() {
        return None;
    }
    let value = match type_code {
        TypeCode::Bool => Value::Bool(as_bool(node)),
        TypeCode::Int => Value::Int(as_i32(node)),
        TypeCode::Long => Value::Long(as_i64(node)),
        TypeCode::Double => Value::Double(as_f64(node)),
        TypeCode::Decimal => Value::Decimal(as_decimal(node)),
        TypeCode::String => Value::String(as_text(node)),
        TypeCode::BoolArray => Value::BoolArray(array(node, as_bool)?),
        TypeCode::IntArray => Value::IntArray(array(node, as_i32)?),
        TypeCode::LongArray => Value::LongArray(array(node, as_i64)?),
        TypeCode::DoubleArray => Value::DoubleArray(array(node, as_f64)?),
        TypeCode::DecimalArray => Value::DecimalArray(array(node, as_decimal)?),
        TypeCode::StringArray => Value::StringArray(array(node, as_text)?),
        TypeCode::ObjectArray => Value::ObjectArray(array(node, Value::from_json)?),
        TypeCode::List if node.is_array() => Value::from_json(node),
        TypeCode::Map if node.is_object() => Value::from_json(node),
        TypeCode::Object => Value::from_json(node),
        _ => return None,
    };
    Some(value)
}

/// DataParser reads documents into records laid out by a compiled schema,
/// and writes records back out.
#[derive(Clone, Debug)]
pub struct DataParser {
    format: DataFormat,
    schema: Arc<SchemaRoot>,
}

impl DataParser {
    pub fn new(format: DataFormat, schema: Arc<SchemaRoot>) -> Self {
        DataParser { format, schema }
    }

    pub fn json(schema: Arc<SchemaRoot>) -> Self {
        Self::new(DataFormat::Json, schema)
    }

    pub fn yaml(schema: Arc<SchemaRoot>) -> Self {
        Self::new(DataFormat::Yaml, schema)
    }

    pub fn schema(&self) -> &SchemaRoot {
        &self.schema
    }

    pub fn parse(&self, text: &str) -> Result<RtData> {
        let doc = self.format.read_document(text)?;
        Ok(self.read(&doc))
    }

    /// read fills a new record from an already parsed document.
    pub fn read(&self, doc: &Json) -> RtData {
        let mut data = self.schema.create_data();
        fill(self.schema.schema(), doc, &mut data.slots);
        data
    }

    pub fn serialize(&self, data: &RtData) -> Result<String> {
        self.format.write_document(&self.write(data))
    }

    /// write rebuilds a document from a record.
    pub fn write(&self, data: &RtData) -> Json {
        to_document(self.schema.schema(), data)
    }
}

fn fill(node: &SchemaNode, doc: &Json, slots: &mut [Value]) {
    match node {
        SchemaNode::Leaf { type_code, slot } => {
            if let (Some(value), Some(dest)) = (read_leaf(*type_code, doc), slots.get_mut(*slot)) {
                *dest = value;
            }
        }
        SchemaNode::Tuple(elements) => {
            if let Json::Array(items) = doc {
                for (element, item) in elements.iter().zip(items.iter()) {
                    fill(element, item, slots);
                }
            }
        }
        SchemaNode::Dict(children) => {
            if let Json::Object(entries) = doc {
                for (name, child) in children.iter() {
                    if let Some(entry) = entries.get(name) {
                        fill(child, entry, slots);
                    }
                }
            }
        }
    }
}

fn to_document(node: &SchemaNode, data: &RtData) -> Json {
    match node {
        SchemaNode::Leaf { slot, .. } => data.get(*slot).map_or(Json::Null, Value::to_json),
        SchemaNode::Tuple(elements) => {
            Json::Array(elements.iter().map(|e| to_document(e, data)).collect())
        }
        SchemaNode::Dict(children) => Json::Object(
            children
                .iter()
                .map(|(name, child)| (name.clone(), to_document(child, data)))
                .collect(),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::ErrorCode;

    #[test]
    fn test_lenient_leaves() {
        let doc: Json = serde_json::from_str(
            r#"[3.9, "12", true, "abc", 1.5, "x", [1, "2", 3.5], {"k": 1}, [1], 2]"#,
        )
        .unwrap();
        let Json::Array(nodes) = doc else {
            unreachable!()
        };
        assert_eq!(Some(Value::Long(3)), read_leaf(TypeCode::Long, &nodes[0]));
        assert_eq!(Some(Value::Int(12)), read_leaf(TypeCode::Int, &nodes[1]));
        assert_eq!(Some(Value::Long(1)), read_leaf(TypeCode::Long, &nodes[2]));
        assert_eq!(Some(Value::Double(0.0)), read_leaf(TypeCode::Double, &nodes[3]));
        assert_eq!(Some(Value::from("1.5")), read_leaf(TypeCode::String, &nodes[4]));
        assert_eq!(Some(Value::Bool(false)), read_leaf(TypeCode::Bool, &nodes[5]));
        assert_eq!(
            Some(Value::LongArray(vec![1, 2, 3].into())),
            read_leaf(TypeCode::LongArray, &nodes[6])
        );
        // containers only accept the matching document kind
        assert!(read_leaf(TypeCode::Map, &nodes[7]).is_some());
        assert_eq!(None, read_leaf(TypeCode::Map, &nodes[8]));
        assert_eq!(None, read_leaf(TypeCode::IntArray, &nodes[9]));
        assert_eq!(None, read_leaf(TypeCode::Long, &Json::Null));
    }

    #[test]
    fn test_rt_data() {
        let mut data = RtData::new(2);
        data.set(1, Value::Long(5)).unwrap();
        assert_eq!(Some(&Value::Long(5)), data.get(1));
        assert_eq!(
            ErrorCode::IndexOutOfBounds,
            data.set(2, Value::Null).unwrap_err().code
        );
        assert_eq!("000: null\n001: 5\n", data.to_string());
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(
            DataFormat::Yaml,
            DataFormat::from_extension(Path::new("a/b.yml")).unwrap()
        );
        assert_eq!(
            DataFormat::Json,
            DataFormat::from_extension(Path::new("b.json")).unwrap()
        );
        assert_eq!(
            ErrorCode::UnsupportedFormat,
            DataFormat::from_extension(Path::new("b.xml")).unwrap_err().code
        );
    }
}

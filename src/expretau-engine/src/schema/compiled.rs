// Copyright 2026 The Expretau Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

use std::collections::BTreeMap;

use tracing::debug;

use super::{Items, Schema};
use crate::common::TypeCode;
use crate::compiler::CompileContext;
use crate::data::RtData;

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum SchemaNode {
    Leaf { type_code: TypeCode, slot: usize },
    Tuple(Vec<SchemaNode>),
    Dict(BTreeMap<String, SchemaNode>),
}

impl SchemaNode {
    fn leaf(type_code: TypeCode) -> Self {
        SchemaNode::Leaf { type_code, slot: 0 }
    }

    fn from_schema(schema: &Schema) -> Self {
        if let Some(t) = schema.scalar_type() {
            return SchemaNode::leaf(t);
        }
        match schema {
            Schema::Array {
                items,
                additional_items,
            } => match items {
                Some(Items::Each(item)) => {
                    match item.scalar_type().and_then(TypeCode::array_of) {
                        Some(t) => SchemaNode::leaf(t),
                        None => SchemaNode::leaf(TypeCode::List),
                    }
                }
                Some(Items::Positional(items)) if *additional_items == Some(false) => {
                    SchemaNode::Tuple(items.iter().map(SchemaNode::from_schema).collect())
                }
                _ => SchemaNode::leaf(TypeCode::List),
            },
            Schema::Object {
                properties,
                additional_properties,
            } => match (properties, additional_properties) {
                (_, None | Some(true)) => SchemaNode::leaf(TypeCode::Map),
                (None, Some(false)) => SchemaNode::leaf(TypeCode::Object),
                (Some(properties), Some(false)) => SchemaNode::Dict(
                    properties
                        .iter()
                        .map(|(name, s)| (name.clone(), SchemaNode::from_schema(s)))
                        .collect(),
                ),
            },
            // scalars were handled above
            _ => SchemaNode::leaf(TypeCode::Object),
        }
    }

    /// assign_slots numbers the leaves depth first, left to right.
    fn assign_slots(&mut self, next: &mut usize) {
        match self {
            SchemaNode::Leaf { slot, .. } => {
                *slot = *next;
                *next += 1;
            }
            SchemaNode::Tuple(elements) => {
                for element in elements.iter_mut() {
                    element.assign_slots(next);
                }
            }
            SchemaNode::Dict(children) => {
                for child in children.values_mut() {
                    child.assign_slots(next);
                }
            }
        }
    }

    pub fn type_code(&self) -> TypeCode {
        match self {
            SchemaNode::Leaf { type_code, .. } => *type_code,
            SchemaNode::Tuple(_) => TypeCode::Tuple,
            SchemaNode::Dict(_) => TypeCode::Dict,
        }
    }

    pub fn slot(&self) -> Option<usize> {
        match self {
            SchemaNode::Leaf { slot, .. } => Some(*slot),
            _ => None,
        }
    }

    pub fn child(&self, name: &str) -> Option<&SchemaNode> {
        match self {
            SchemaNode::Dict(children) => children.get(name),
            _ => None,
        }
    }

    pub fn element(&self, index: usize) -> Option<&SchemaNode> {
        match self {
            SchemaNode::Tuple(elements) => elements.get(index),
            _ => None,
        }
    }
}

impl CompileContext for SchemaNode {
    fn slot(&self) -> Option<usize> {
        SchemaNode::slot(self)
    }

    fn type_code(&self) -> TypeCode {
        SchemaNode::type_code(self)
    }

    fn child(&self, name: &str) -> Option<&dyn CompileContext> {
        SchemaNode::child(self, name).map(|node| node as &dyn CompileContext)
    }

    fn element(&self, index: usize) -> Option<&dyn CompileContext> {
        SchemaNode::element(self, index).map(|node| node as &dyn CompileContext)
    }
}

/// A compiled schema: the node tree and the number of slots a record
/// conforming to it needs.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct SchemaRoot {
    schema: SchemaNode,
    max_index: usize,
}

impl SchemaRoot {
    pub fn schema(&self) -> &SchemaNode {
        &self.schema
    }

    pub fn max_index(&self) -> usize {
        self.max_index
    }

    /// create_data allocates an empty record with a slot per leaf.
    pub fn create_data(&self) -> RtData {
        RtData::new(self.max_index)
    }
}

/// compile_schema lays out `schema` onto slots.  The same schema always
/// gets the same layout.
pub fn compile_schema(schema: &Schema) -> SchemaRoot {
    let mut node = SchemaNode::from_schema(schema);
    let mut max_index = 0;
    node.assign_slots(&mut max_index);
    debug!(slots = max_index, "compiled schema");
    SchemaRoot {
        schema: node,
        max_index,
    }
}

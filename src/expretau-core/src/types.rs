// Copyright 2026 The Expretau Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

//! The fixed catalogue of value kinds.
//!
//! Every value, schema leaf and evaluator parameter is tagged with one of
//! these codes.  The discriminants are stable: they are part of the public
//! contract and may be persisted by embedders.

use std::fmt;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum TypeCode {
    Bool = 1,
    Int = 2,
    Long = 3,
    Double = 4,
    Decimal = 5,
    String = 6,
    Object = 7,
    BoolArray = 8,
    IntArray = 9,
    LongArray = 10,
    DoubleArray = 11,
    DecimalArray = 12,
    StringArray = 13,
    ObjectArray = 14,
    List = 15,
    Map = 16,
    Tuple = 17,
    Dict = 18,
    Time = 19,
    Null = 20,
}

impl TypeCode {
    pub const ALL: [TypeCode; 20] = [
        TypeCode::Bool,
        TypeCode::Int,
        TypeCode::Long,
        TypeCode::Double,
        TypeCode::Decimal,
        TypeCode::String,
        TypeCode::Object,
        TypeCode::BoolArray,
        TypeCode::IntArray,
        TypeCode::LongArray,
        TypeCode::DoubleArray,
        TypeCode::DecimalArray,
        TypeCode::StringArray,
        TypeCode::ObjectArray,
        TypeCode::List,
        TypeCode::Map,
        TypeCode::Tuple,
        TypeCode::Dict,
        TypeCode::Time,
        TypeCode::Null,
    ];

    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn from_code(code: u8) -> Option<TypeCode> {
        TypeCode::ALL.iter().copied().find(|t| t.code() == code)
    }

    /// name is the diagnostic name of a tag, as used in error messages.
    pub fn name(self) -> &'static str {
        use TypeCode::*;
        match self {
            Bool => "BOOLEAN",
            Int => "INTEGER",
            Long => "LONG",
            Double => "DOUBLE",
            Decimal => "DECIMAL",
            String => "STRING",
            Object => "OBJECT",
            BoolArray => "BOOLEAN_ARRAY",
            IntArray => "INTEGER_ARRAY",
            LongArray => "LONG_ARRAY",
            DoubleArray => "DOUBLE_ARRAY",
            DecimalArray => "DECIMAL_ARRAY",
            StringArray => "STRING_ARRAY",
            ObjectArray => "OBJECT_ARRAY",
            List => "LIST",
            Map => "MAP",
            Tuple => "TUPLE",
            Dict => "DICT",
            Time => "TIME",
            Null => "NULL",
        }
    }

    pub fn is_structural(self) -> bool {
        matches!(self, TypeCode::Tuple | TypeCode::Dict)
    }

    /// The element tag of a typed array, or None for anything else.
    pub fn element(self) -> Option<TypeCode> {
        use TypeCode::*;
        match self {
            BoolArray => Some(Bool),
            IntArray => Some(Int),
            LongArray => Some(Long),
            DoubleArray => Some(Double),
            DecimalArray => Some(Decimal),
            StringArray => Some(String),
            ObjectArray => Some(Object),
            _ => None,
        }
    }

    /// The typed array tag holding elements of this scalar tag.
    pub fn array_of(self) -> Option<TypeCode> {
        use TypeCode::*;
        match self {
            Bool => Some(BoolArray),
            Int => Some(IntArray),
            Long => Some(LongArray),
            Double => Some(DoubleArray),
            Decimal => Some(DecimalArray),
            String => Some(StringArray),
            Object => Some(ObjectArray),
            _ => None,
        }
    }
}

impl fmt::Display for TypeCode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[test]
fn test_type_codes_are_distinct() {
    for (i, a) in TypeCode::ALL.iter().enumerate() {
        for b in TypeCode::ALL[i + 1..].iter() {
            assert_ne!(a.code(), b.code());
            assert_ne!(a.name(), b.name());
        }
    }
}

#[test]
fn test_type_code_round_trip() {
    for t in TypeCode::ALL.iter() {
        assert_eq!(Some(*t), TypeCode::from_code(t.code()));
    }
    assert_eq!(None, TypeCode::from_code(0));
    assert_eq!(None, TypeCode::from_code(200));
}

#[test]
fn test_array_element_pairs() {
    for t in TypeCode::ALL.iter() {
        if let Some(elem) = t.element() {
            assert_eq!(Some(*t), elem.array_of());
        }
    }
    assert_eq!(None, TypeCode::List.element());
    assert_eq!(Some(TypeCode::LongArray), TypeCode::Long.array_of());
}

// Copyright 2026 The Expretau Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

use std::cmp::Reverse;
use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use super::{Evaluator, EvaluatorFactory, EvaluatorKey, Implementation};
use crate::common::TypeCode;

/// FactoryBuilder collects the implementations of one operator and builds
/// its dispatch table.
///
/// The induce sequence lists tags from widest to narrowest.  An
/// implementation declaring a parameter of the tag at position `i` also
/// accepts, through conversion, any tag at a position after `i`.
/// Concrete registrations always win over induced entries, and when two
/// implementations could induce the same key the more specific one (the
/// one whose parameters sit later in the sequence) gets it.
#[derive(Clone, Debug)]
pub struct FactoryBuilder {
    name: String,
    induce: Vec<TypeCode>,
    impls: Vec<Arc<Implementation>>,
    universal: bool,
}

impl FactoryBuilder {
    pub fn new(name: &str, induce: &[TypeCode]) -> Self {
        FactoryBuilder {
            name: name.to_owned(),
            induce: induce.to_vec(),
            impls: Vec::new(),
            universal: true,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_induce(&mut self, induce: &[TypeCode]) -> &mut Self {
        self.induce = induce.to_vec();
        self
    }

    /// add registers an implementation.  A later registration with the
    /// same parameter tags replaces an earlier one.
    pub fn add(&mut self, imp: Implementation) -> &mut Self {
        self.impls.push(Arc::new(imp));
        self
    }

    /// without_universal makes unmatched keys a compile error instead of
    /// deferring them to runtime dispatch.
    pub fn without_universal(&mut self) -> &mut Self {
        self.universal = false;
        self
    }

    fn position(&self, t: TypeCode) -> Option<usize> {
        self.induce.iter().position(|&s| s == t)
    }

    /// specificity sums the sequence positions of the parameters; tags
    /// outside the sequence count as -1.
    fn specificity(&self, imp: &Implementation) -> i64 {
        imp.params
            .types()
            .iter()
            .map(|&t| self.position(t).map_or(-1, |i| i as i64))
            .sum()
    }

    pub fn build(&self) -> EvaluatorFactory {
        let mut table: HashMap<EvaluatorKey, Evaluator> = HashMap::new();
        let mut concrete: HashMap<EvaluatorKey, Arc<Implementation>> = HashMap::new();
        for imp in self.impls.iter() {
            concrete.insert(imp.params.clone(), imp.clone());
        }

        let mut ordered: Vec<Arc<Implementation>> = concrete.into_values().collect();
        // ties fall back to key order so the table never depends on hash
        // iteration order
        ordered.sort_by(|a, b| {
            (Reverse(self.specificity(a)), &a.params).cmp(&(Reverse(self.specificity(b)), &b.params))
        });
        for imp in ordered.iter() {
            table.insert(imp.params.clone(), Evaluator::Native(imp.clone()));
        }

        for imp in ordered.iter() {
            let mut key: Vec<TypeCode> = imp.params.types().to_vec();
            self.induce_from(imp, 0, &mut key, &mut table);
        }

        debug!(
            factory = %self.name,
            implementations = ordered.len(),
            evaluators = table.len(),
            "built dispatch table"
        );

        EvaluatorFactory {
            name: self.name.clone(),
            induce: self.induce.clone(),
            table,
            universal: self.universal,
        }
    }

    fn induce_from(
        &self,
        imp: &Arc<Implementation>,
        pos: usize,
        key: &mut Vec<TypeCode>,
        table: &mut HashMap<EvaluatorKey, Evaluator>,
    ) {
        if pos == key.len() {
            let actual = EvaluatorKey::new(key);
            table
                .entry(actual.clone())
                .or_insert_with(|| Evaluator::Induced {
                    target: imp.clone(),
                    actual,
                });
            return;
        }
        self.induce_from(imp, pos + 1, key, table);
        let declared = key[pos];
        if let Some(i) = self.position(declared) {
            for &narrower in self.induce[i + 1..].iter() {
                key[pos] = narrower;
                self.induce_from(imp, pos + 1, key, table);
            }
            key[pos] = declared;
        }
    }
}

// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

use std::sync::Arc;

use log::debug;

use crate::error::Error;
use crate::types::TypeKey;

use super::registry::Registry;
use super::{AnyValue, Replicated};

pub type ConvertFn = Arc<dyn Fn(&Registry, AnyValue) -> Result<AnyValue, Error> + Send + Sync>;

/// Bidirectional conversion between a type and its wire stand-in.
#[derive(Clone)]
pub struct ConvertPair {
    pub to: ConvertFn,
    pub from: ConvertFn,
}

/// Surrogate link attached to a registered type. `convert: None` selects the
/// structural member copy fallback.
pub struct SurrogateEntry {
    pub target: TypeKey,
    pub convert: Option<ConvertPair>,
}

impl Registry {
    /// Marks `S` as the wire stand-in for `A`, converting through the
    /// `From` impls in both directions.
    pub fn register_surrogate<A, S>(&mut self) -> Result<(), Error>
    where
        A: Replicated + From<S>,
        S: Replicated + From<A>,
    {
        let to: ConvertFn = Arc::new(|_registry, value| {
            let a = value
                .downcast::<A>()
                .map_err(|_| Error::serialization("surrogate conversion got a foreign value"))?;
            Ok(Box::new(S::from(*a)) as AnyValue)
        });
        let from: ConvertFn = Arc::new(|_registry, value| {
            let s = value
                .downcast::<S>()
                .map_err(|_| Error::serialization("surrogate conversion got a foreign value"))?;
            Ok(Box::new(A::from(*s)) as AnyValue)
        });
        self.register_surrogate_pair::<A, S>(Some(ConvertPair { to, from }))
    }

    /// Marks `S` as the wire stand-in for `A` with explicit conversion
    /// functions.
    pub fn register_surrogate_with<A, S, TF, FF>(&mut self, to: TF, from: FF) -> Result<(), Error>
    where
        A: Replicated,
        S: Replicated,
        TF: Fn(A) -> S + Send + Sync + 'static,
        FF: Fn(S) -> A + Send + Sync + 'static,
    {
        let to: ConvertFn = Arc::new(move |_registry, value| {
            let a = value
                .downcast::<A>()
                .map_err(|_| Error::serialization("surrogate conversion got a foreign value"))?;
            Ok(Box::new(to(*a)) as AnyValue)
        });
        let from: ConvertFn = Arc::new(move |_registry, value| {
            let s = value
                .downcast::<S>()
                .map_err(|_| Error::serialization("surrogate conversion got a foreign value"))?;
            Ok(Box::new(from(*s)) as AnyValue)
        });
        self.register_surrogate_pair::<A, S>(Some(ConvertPair { to, from }))
    }

    /// Marks `S` as the wire stand-in for `A`, converting by structural
    /// member copy: a default instance of the target shape is built and
    /// same-named members of matching type are copied across.
    pub fn register_surrogate_structural<A, S>(&mut self) -> Result<(), Error>
    where
        A: Replicated,
        S: Replicated,
    {
        self.register_surrogate_pair::<A, S>(None)
    }

    fn register_surrogate_pair<A: Replicated, S: Replicated>(
        &mut self,
        convert: Option<ConvertPair>,
    ) -> Result<(), Error> {
        A::ensure_registered(self)?;
        S::ensure_registered(self)?;
        self.set_surrogate(A::type_key(), S::type_key(), convert)
    }

    /// Attaches a surrogate link to an already-registered type. May happen
    /// once per type; chains and cycles are rejected here rather than
    /// surfacing as ambiguity at traversal time.
    pub fn set_surrogate(
        &mut self,
        original: TypeKey,
        target: TypeKey,
        convert: Option<ConvertPair>,
    ) -> Result<(), Error> {
        self.accessor(&original)?;
        self.accessor(&target)?;
        if original == target {
            return Err(Error::invalid_operation(format!(
                "{original} cannot be its own surrogate"
            )));
        }
        if self.surrogates.contains_key(&original) {
            return Err(Error::invalid_operation(format!(
                "{original} already has a surrogate"
            )));
        }
        if self.surrogates.values().any(|e| e.target == original) {
            return Err(Error::invalid_operation(format!(
                "{original} is already in use as a surrogate"
            )));
        }
        if self.surrogates.values().any(|e| e.target == target) {
            return Err(Error::invalid_operation(format!(
                "{target} is already in use as a surrogate"
            )));
        }
        if self.surrogates.contains_key(&target) {
            return Err(Error::invalid_operation(format!(
                "{target} has a surrogate of its own"
            )));
        }
        debug!("surrogate {original} -> {target}");
        self.surrogates
            .insert(original, SurrogateEntry { target, convert });
        Ok(())
    }
}

/// Conversion route between a type and its surrogate, resolved at node
/// construction: a registered pair when one exists, structural copy
/// otherwise.
pub(crate) enum Conversion<'r> {
    Pair(&'r ConvertPair),
    Structural { from: TypeKey, to: TypeKey },
}

impl Conversion<'_> {
    pub(crate) fn apply_to(&self, registry: &Registry, value: AnyValue) -> Result<AnyValue, Error> {
        match self {
            Conversion::Pair(pair) => (pair.to)(registry, value),
            Conversion::Structural { from, to } => structural_convert(registry, from, to, value),
        }
    }

    pub(crate) fn apply_from(
        &self,
        registry: &Registry,
        value: AnyValue,
    ) -> Result<AnyValue, Error> {
        match self {
            Conversion::Pair(pair) => (pair.from)(registry, value),
            Conversion::Structural { from, to } => structural_convert(registry, to, from, value),
        }
    }
}

pub(crate) fn resolve_conversion<'r>(
    registry: &'r Registry,
    original: &TypeKey,
    target: &TypeKey,
) -> Conversion<'r> {
    if let Some(entry) = registry.surrogates.get(original) {
        if &entry.target == target {
            if let Some(pair) = &entry.convert {
                return Conversion::Pair(pair);
            }
        }
    }
    Conversion::Structural {
        from: original.clone(),
        to: target.clone(),
    }
}

/// Structural member copy: builds a default instance of `to` and copies
/// same-named members whose types match. Mismatched or read-only members are
/// left at their defaults.
pub(crate) fn structural_convert(
    registry: &Registry,
    from: &TypeKey,
    to: &TypeKey,
    value: AnyValue,
) -> Result<AnyValue, Error> {
    let from_acc = registry.accessor(from)?;
    let to_acc = registry.accessor(to)?;
    let mut out = to_acc.construct().ok_or_else(|| {
        Error::invalid_operation(format!("surrogate {to} has no constructor for structural copy"))
    })?;
    for tm in to_acc.members() {
        if !tm.can_set() {
            continue;
        }
        let Some(fm) = from_acc.member_by_name(&tm.name) else {
            continue;
        };
        if fm.value_type != tm.value_type {
            continue;
        }
        if let Some(v) = fm.get(&*value) {
            tm.set(&mut *out, Some(v))?;
        }
    }
    Ok(out)
}

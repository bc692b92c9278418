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

use std::collections::HashMap;
use std::sync::Arc;

use log::debug;

use crate::error::Error;
use crate::types::TypeKey;

use super::accessor::TypeAccessor;
use super::surrogate::SurrogateEntry;
use super::{builtin, TypeData};

/// Owns the set of known types and their compiled accessors.
///
/// Registration takes `&mut self` and lookups take `&self`: populate the
/// registry up front, then share it freely — a frozen registry is read-only
/// and safe to use from any number of threads in parallel.
pub struct Registry {
    types: HashMap<TypeKey, Arc<TypeAccessor>>,
    ids: HashMap<u32, TypeKey>,
    ids_rev: HashMap<TypeKey, u32>,
    pub(crate) surrogates: HashMap<TypeKey, SurrogateEntry>,
}

impl Default for Registry {
    fn default() -> Self {
        Registry::new()
    }
}

impl Registry {
    /// New registry with the built-in primitives (fixed-width integers,
    /// floats, bool, string, date, timestamp) and the dynamic marker
    /// pre-registered.
    pub fn new() -> Registry {
        let mut registry = Registry {
            types: HashMap::new(),
            ids: HashMap::new(),
            ids_rev: HashMap::new(),
            surrogates: HashMap::new(),
        };
        builtin::seed(&mut registry);
        registry
    }

    pub fn contains(&self, key: &TypeKey) -> bool {
        match key {
            TypeKey::Index(id) => self.ids.contains_key(id),
            _ => self.types.contains_key(key),
        }
    }

    /// Registers a compiled descriptor. Idempotent: re-adding an existing
    /// key returns the existing entry untouched.
    pub fn add(&mut self, data: TypeData) -> Result<TypeKey, Error> {
        let key = data.key.clone();
        if let TypeKey::Index(_) = key {
            return Err(Error::invalid_operation(
                "cannot register a type under a bare index; assign an index alias instead",
            ));
        }
        if self.types.contains_key(&key) {
            return Ok(key);
        }
        let accessor = TypeAccessor::compile(data, self)?;
        debug!(
            "registered type {} ({:?}, {} members)",
            key,
            accessor.marshal,
            accessor.members().len()
        );
        self.types.insert(key.clone(), Arc::new(accessor));
        Ok(key)
    }

    /// Resolves an index alias to the named key it was assigned to.
    pub fn resolve(&self, key: &TypeKey) -> Result<TypeKey, Error> {
        match key {
            TypeKey::Index(id) => self
                .ids
                .get(id)
                .cloned()
                .ok_or_else(|| Error::type_not_registered(format!("#{id}"))),
            other => Ok(other.clone()),
        }
    }

    pub fn get(&self, key: &TypeKey) -> Option<&Arc<TypeAccessor>> {
        match key {
            TypeKey::Index(id) => self.ids.get(id).and_then(|k| self.types.get(k)),
            _ => self.types.get(key),
        }
    }

    pub fn accessor(&self, key: &TypeKey) -> Result<&Arc<TypeAccessor>, Error> {
        self.get(key)
            .ok_or_else(|| Error::type_not_registered(key.render()))
    }

    /// Assigns a compact numeric alias to an already-registered type, the
    /// wire-stable identifier preferred by polymorphic slots.
    pub fn assign_id(&mut self, key: &TypeKey, id: u32) -> Result<(), Error> {
        if !self.types.contains_key(key) {
            return Err(Error::type_not_registered(key.render()));
        }
        if let Some(existing) = self.ids.get(&id) {
            if existing == key {
                return Ok(());
            }
            return Err(Error::invalid_operation(format!(
                "type id {id} is already assigned to {existing}"
            )));
        }
        if let Some(existing) = self.ids_rev.get(key) {
            return Err(Error::invalid_operation(format!(
                "type {key} already has id {existing}"
            )));
        }
        self.ids.insert(id, key.clone());
        self.ids_rev.insert(key.clone(), id);
        Ok(())
    }

    pub fn id_of(&self, key: &TypeKey) -> Option<u32> {
        self.ids_rev.get(key).copied()
    }

    pub fn key_of(&self, id: u32) -> Option<&TypeKey> {
        self.ids.get(&id)
    }

    /// Accessor of a collection type's element type.
    pub fn collection_value_accessor(&self, key: &TypeKey) -> Result<&Arc<TypeAccessor>, Error> {
        let elem = self.accessor(key)?.collection_ops()?.elem.clone();
        self.accessor(&elem)
    }

    pub fn surrogate_for(&self, key: &TypeKey) -> Option<&SurrogateEntry> {
        self.surrogates.get(key)
    }

    /// Replaces a compiled accessor. Only used by schema import, which
    /// appends phantom members.
    pub(crate) fn replace(&mut self, key: TypeKey, accessor: TypeAccessor) {
        self.types.insert(key, Arc::new(accessor));
    }
}

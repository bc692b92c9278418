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

//! Type description exchange. A peer that serializes with a wider schema
//! exports its member table; applying it locally appends phantom members so
//! binary readers can discard wire members the local type does not declare.

use log::debug;

use crate::error::Error;
use crate::types::{MarshalMethod, TypeKey};

use super::accessor::MemberAccessor;
use super::registry::Registry;

/// Shape of one member as seen by a peer.
#[derive(Clone, Debug, PartialEq)]
pub struct MemberSchema {
    pub index: u16,
    pub name: String,
    pub value_type: TypeKey,
    pub nullable: bool,
}

/// Exportable description of a registered type's member table.
#[derive(Clone, Debug, PartialEq)]
pub struct TypeSchema {
    pub key: TypeKey,
    pub marshal: MarshalMethod,
    pub members: Vec<MemberSchema>,
}

impl Registry {
    pub fn export_schema(&self, key: &TypeKey) -> Result<TypeSchema, Error> {
        let accessor = self.accessor(key)?;
        Ok(TypeSchema {
            key: accessor.key.clone(),
            marshal: accessor.marshal,
            members: accessor
                .members()
                .iter()
                .map(|m| MemberSchema {
                    index: m.index,
                    name: m.name.clone(),
                    value_type: m.value_type.clone(),
                    nullable: m.nullable,
                })
                .collect(),
        })
    }

    /// Merges a peer's description into the local accessor for the same key.
    /// Members the local type does not declare become phantoms; members it
    /// does declare are left untouched.
    pub fn apply_schema(&mut self, schema: &TypeSchema) -> Result<(), Error> {
        let key = self.resolve(&schema.key)?;
        let replacement = {
            let accessor = self.accessor(&key)?;
            let phantoms: Vec<MemberAccessor> = schema
                .members
                .iter()
                .filter(|m| {
                    accessor.member_by_index(m.index).is_none()
                        && accessor.member_by_name(&m.name).is_none()
                })
                .map(|m| {
                    MemberAccessor::phantom(
                        m.index,
                        m.name.clone(),
                        m.value_type.clone(),
                        m.nullable,
                    )
                })
                .collect();
            if phantoms.is_empty() {
                return Ok(());
            }
            debug!("schema for {key}: {} phantom member(s)", phantoms.len());
            accessor.with_phantoms(phantoms)?
        };
        self.replace(key, replacement);
        Ok(())
    }
}

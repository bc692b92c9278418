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

use crate::codec::{binary, json, proto, BinaryConfig, JsonConfig, ProtoConfig, UnknownMembers};
use crate::error::Error;
use crate::model::{Registry, Replicated, TypeSchema};
use crate::node::Untyped;
use crate::types::TypeKey;

/// The serialization context: an explicitly constructed registry plus
/// per-codec configuration. There is no process-wide default instance;
/// construct one, register your types, then share it.
///
/// Registration takes `&mut self`; every serialize/deserialize entry point
/// takes `&self` and is safe to call concurrently once registration is done.
///
/// # Examples
///
/// ```rust, ignore
/// use replica::{Replica, Replicate};
///
/// #[derive(Replicate, Clone, Default, Debug, PartialEq)]
/// struct Point {
///     x: i32,
///     y: i32,
/// }
///
/// let mut replica = Replica::new();
/// replica.register::<Point>()?;
/// let bytes = replica.to_bytes(&Point { x: 1, y: 2 })?;
/// let point: Point = replica.from_bytes(&bytes)?;
/// ```
#[derive(Default)]
pub struct Replica {
    registry: Registry,
    binary: BinaryConfig,
    json: JsonConfig,
    proto: ProtoConfig,
}

impl Replica {
    pub fn new() -> Replica {
        Replica::default()
    }

    /// Lower-cases member names on JSON write and lookup, symmetrically.
    pub fn json_lower_case(mut self, enabled: bool) -> Self {
        self.json.lower_case_names = enabled;
        self
    }

    pub fn json_unknown_members(mut self, policy: UnknownMembers) -> Self {
        self.json.unknown_members = policy;
        self
    }

    pub fn binary_unknown_members(mut self, policy: UnknownMembers) -> Self {
        self.binary.unknown_members = policy;
        self
    }

    pub fn proto_unknown_members(mut self, policy: UnknownMembers) -> Self {
        self.proto.unknown_members = policy;
        self
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut Registry {
        &mut self.registry
    }

    /// Registers `T` and everything reachable from its member table.
    pub fn register<T: Replicated>(&mut self) -> Result<TypeKey, Error> {
        T::ensure_registered(&mut self.registry)
    }

    /// Registers `T` and assigns it a compact wire id, the identifier
    /// preferred by polymorphic slots and peer schema exchange.
    pub fn register_with_id<T: Replicated>(&mut self, id: u32) -> Result<TypeKey, Error> {
        let key = T::ensure_registered(&mut self.registry)?;
        self.registry.assign_id(&key, id)?;
        Ok(key)
    }

    pub fn register_surrogate<A, S>(&mut self) -> Result<(), Error>
    where
        A: Replicated + From<S>,
        S: Replicated + From<A>,
    {
        self.registry.register_surrogate::<A, S>()
    }

    pub fn register_surrogate_with<A, S, TF, FF>(&mut self, to: TF, from: FF) -> Result<(), Error>
    where
        A: Replicated,
        S: Replicated,
        TF: Fn(A) -> S + Send + Sync + 'static,
        FF: Fn(S) -> A + Send + Sync + 'static,
    {
        self.registry.register_surrogate_with::<A, S, TF, FF>(to, from)
    }

    pub fn register_surrogate_structural<A, S>(&mut self) -> Result<(), Error>
    where
        A: Replicated,
        S: Replicated,
    {
        self.registry.register_surrogate_structural::<A, S>()
    }

    pub fn export_schema(&self, key: &TypeKey) -> Result<TypeSchema, Error> {
        self.registry.export_schema(key)
    }

    pub fn apply_schema(&mut self, schema: &TypeSchema) -> Result<(), Error> {
        self.registry.apply_schema(schema)
    }

    // ---- binary ----

    /// Serializes to the length-prefixed binary format. Never partial:
    /// either the full encoding is returned or an error is raised.
    pub fn to_bytes<T: Replicated>(&self, value: &T) -> Result<Vec<u8>, Error> {
        binary::to_bytes(
            &self.registry,
            &T::type_key(),
            value.boxed_inner(),
            T::nullable(),
        )
    }

    pub fn from_bytes<T: Replicated>(&self, bytes: &[u8]) -> Result<T, Error> {
        let value = binary::from_bytes(
            &self.registry,
            &self.binary,
            &T::type_key(),
            T::nullable(),
            bytes,
            None,
        )?;
        T::from_inner(value)
    }

    /// Deserializes into an existing instance, avoiding a fresh allocation
    /// of the top-level object.
    pub fn from_bytes_into<T: Replicated>(&self, bytes: &[u8], target: &mut T) -> Result<(), Error> {
        let value = binary::from_bytes(
            &self.registry,
            &self.binary,
            &T::type_key(),
            T::nullable(),
            bytes,
            target.boxed_inner(),
        )?;
        *target = T::from_inner(value)?;
        Ok(())
    }

    // ---- json ----

    pub fn to_json<T: Replicated>(&self, value: &T) -> Result<String, Error> {
        json::to_json(
            &self.registry,
            &self.json,
            &T::type_key(),
            value.boxed_inner(),
            T::nullable(),
        )
    }

    pub fn from_json<T: Replicated>(&self, input: &str) -> Result<T, Error> {
        let value = json::from_json(
            &self.registry,
            &self.json,
            &T::type_key(),
            T::nullable(),
            input,
            None,
        )?;
        T::from_inner(value)
    }

    pub fn from_json_into<T: Replicated>(&self, input: &str, target: &mut T) -> Result<(), Error> {
        let value = json::from_json(
            &self.registry,
            &self.json,
            &T::type_key(),
            T::nullable(),
            input,
            target.boxed_inner(),
        )?;
        *target = T::from_inner(value)?;
        Ok(())
    }

    /// Parses arbitrary JSON into the untyped tree with no schema; the tree
    /// infers its shape from the data.
    pub fn parse_dynamic(&self, input: &str) -> Result<Untyped, Error> {
        json::parse_dynamic(input)
    }

    // ---- proto ----

    pub fn to_proto<T: Replicated>(&self, value: &T) -> Result<Vec<u8>, Error> {
        proto::to_proto(
            &self.registry,
            &T::type_key(),
            value.boxed_inner(),
            T::nullable(),
        )
    }

    pub fn from_proto<T: Replicated>(&self, bytes: &[u8]) -> Result<T, Error> {
        let value = proto::from_proto(
            &self.registry,
            &self.proto,
            &T::type_key(),
            T::nullable(),
            bytes,
            None,
        )?;
        T::from_inner(value)
    }

    pub fn from_proto_into<T: Replicated>(&self, bytes: &[u8], target: &mut T) -> Result<(), Error> {
        let value = proto::from_proto(
            &self.registry,
            &self.proto,
            &T::type_key(),
            T::nullable(),
            bytes,
            target.boxed_inner(),
        )?;
        *target = T::from_inner(value)?;
        Ok(())
    }
}

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

//! Uniform traversal view over a live value. A codec asks the node for its
//! marshal method, dispatches to the matching read/write shape and recurses
//! into child nodes; it never touches the concrete backing type.

use std::sync::Arc;

use crate::dynamic::Dynamic;
use crate::error::Error;
use crate::model::surrogate::{resolve_conversion, Conversion};
use crate::model::{AnyValue, CollectionOps, MemberAccessor, Registry, TypeAccessor};
use crate::types::{MarshalMethod, MemberKey, ScalarKind, TypeKey};
use crate::value::Scalar;

/// Traversal node over one value slot: the resolved accessor (surrogate
/// substitution already applied), the boxed backing value (absent for null
/// slots and for read-side nodes not yet constructed) and the slot's
/// nullability.
pub struct Node<'r> {
    registry: &'r Registry,
    accessor: Arc<TypeAccessor>,
    conversion: Option<Conversion<'r>>,
    dynamic_key: Option<TypeKey>,
    value: Option<AnyValue>,
    nullable: bool,
}

impl<'r> Node<'r> {
    /// Wraps `value` as declared type `declared`, substituting the surrogate
    /// accessor when one applies (member-level before type-level, exactly
    /// one) and resolving dynamic slots to their runtime type.
    pub fn over(
        registry: &'r Registry,
        declared: &TypeKey,
        member: Option<&MemberAccessor>,
        value: Option<AnyValue>,
        nullable: bool,
    ) -> Result<Node<'r>, Error> {
        let mut accessor = registry.accessor(declared)?.clone();
        let mut value = value;
        let mut dynamic_key = None;
        if accessor.is_dynamic() {
            if let Some(v) = value.take() {
                let slot = v
                    .downcast::<Dynamic>()
                    .map_err(|_| Error::serialization("dynamic slot holds a foreign value"))?;
                if let Some((key, inner)) = slot.clone_parts() {
                    accessor = registry.accessor(&key)?.clone();
                    dynamic_key = Some(registry.resolve(&key)?);
                    value = Some(inner);
                }
            }
        }
        let surrogate = member
            .and_then(|m| m.surrogate.clone())
            .or_else(|| registry.surrogate_for(&accessor.key).map(|e| e.target.clone()));
        let mut conversion = None;
        if let Some(target) = surrogate {
            let conv = resolve_conversion(registry, &accessor.key, &target);
            if let Some(v) = value.take() {
                value = Some(conv.apply_to(registry, v)?);
            }
            accessor = registry.accessor(&target)?.clone();
            conversion = Some(conv);
        }
        Ok(Node {
            registry,
            accessor,
            conversion,
            dynamic_key,
            value,
            nullable,
        })
    }

    /// Read-side node with no backing yet.
    pub fn empty(
        registry: &'r Registry,
        declared: &TypeKey,
        member: Option<&MemberAccessor>,
        nullable: bool,
    ) -> Result<Node<'r>, Error> {
        Node::over(registry, declared, member, None, nullable)
    }

    pub fn registry(&self) -> &'r Registry {
        self.registry
    }

    pub fn accessor(&self) -> &TypeAccessor {
        &self.accessor
    }

    pub fn marshal(&self) -> MarshalMethod {
        self.accessor.marshal
    }

    pub fn is_null(&self) -> bool {
        self.value.is_none()
    }

    pub fn nullable(&self) -> bool {
        self.nullable
    }

    pub fn is_dynamic(&self) -> bool {
        self.accessor.is_dynamic()
    }

    /// Runtime key of a resolved dynamic slot, to be written ahead of the
    /// payload by codecs that support polymorphism.
    pub fn dynamic_key(&self) -> Option<&TypeKey> {
        self.dynamic_key.as_ref()
    }

    /// Materializes the backing value, converting back out of surrogate
    /// space when a surrogate was substituted at construction.
    pub fn into_value(self) -> Result<Option<AnyValue>, Error> {
        match self.value {
            None => Ok(None),
            Some(v) => match &self.conversion {
                Some(conv) => Ok(Some(conv.apply_from(self.registry, v)?)),
                None => Ok(Some(v)),
            },
        }
    }

    fn backing(&self) -> Result<&AnyValue, Error> {
        self.value
            .as_ref()
            .ok_or_else(|| Error::serialization("null node has no backing value"))
    }

    // ---- primitive view ----

    pub fn scalar_kind(&self) -> Result<ScalarKind, Error> {
        self.accessor.scalar_kind()
    }

    pub fn get_scalar(&self) -> Result<Scalar, Error> {
        self.accessor.get_scalar(&**self.backing()?)
    }

    pub fn set_scalar(&mut self, scalar: Scalar) -> Result<(), Error> {
        self.value = Some(self.accessor.make_scalar(scalar)?);
        Ok(())
    }

    // ---- object view ----

    pub fn object_members(&self) -> Result<&[Arc<MemberAccessor>], Error> {
        match self.marshal() {
            MarshalMethod::Object | MarshalMethod::Tuple => Ok(self.accessor.members()),
            actual => Err(Error::wrong_view(MarshalMethod::Object, actual)),
        }
    }

    pub fn find_member(&self, key: &MemberKey) -> Result<Option<&Arc<MemberAccessor>>, Error> {
        match self.marshal() {
            MarshalMethod::Object | MarshalMethod::Tuple => Ok(self.accessor.member(key)),
            actual => Err(Error::wrong_view(MarshalMethod::Object, actual)),
        }
    }

    /// Whether `key` maps to a settable member. Readers consult this to
    /// decide between filling a member and discarding its wire bytes.
    pub fn can_set(&self, key: &MemberKey) -> bool {
        self.accessor.member(key).is_some_and(|m| m.can_set())
    }

    /// Child node over one member's current value.
    pub fn child(&self, member: &MemberAccessor) -> Result<Node<'r>, Error> {
        let value = self.value.as_ref().and_then(|v| member.get(&**v));
        Node::over(
            self.registry,
            &member.value_type,
            Some(member),
            value,
            member.nullable,
        )
    }

    /// Allocates a default backing when the slot is currently empty, so a
    /// reader can fill members into it.
    pub fn ensure_constructed(&mut self) -> Result<(), Error> {
        if self.value.is_none() {
            self.value = Some(self.accessor.construct().ok_or_else(|| {
                Error::serialization(format!("type {} has no constructor", self.accessor.key))
            })?);
        }
        Ok(())
    }

    /// Adopts a caller-provided backing for in-place population.
    pub fn adopt(&mut self, existing: AnyValue) {
        self.value = Some(existing);
    }

    pub fn set_child(
        &mut self,
        member: &MemberAccessor,
        value: Option<AnyValue>,
    ) -> Result<(), Error> {
        let backing = self
            .value
            .as_mut()
            .ok_or_else(|| Error::serialization("object node was not constructed before set"))?;
        member.set(&mut **backing, value)
    }

    // ---- collection view ----

    pub fn collection_ops(&self) -> Result<&CollectionOps, Error> {
        self.accessor.collection_ops()
    }

    pub fn children(&self) -> Result<Vec<Node<'r>>, Error> {
        let ops = self.accessor.collection_ops()?;
        let elems = (ops.iter)(&**self.backing()?)?;
        elems
            .into_iter()
            .map(|v| Node::over(self.registry, &ops.elem, None, v, ops.elem_nullable))
            .collect()
    }

    /// Replaces the backing storage wholesale with the given element values.
    pub fn set_values(&mut self, values: Vec<Option<AnyValue>>) -> Result<(), Error> {
        let ops = self.accessor.collection_ops()?;
        self.value = Some((ops.build)(values)?);
        Ok(())
    }

    // ---- blob view ----

    pub fn blob_bytes(&self) -> Result<Vec<u8>, Error> {
        (self.accessor.blob_ops()?.get)(&**self.backing()?)
    }

    pub fn set_blob(&mut self, bytes: Vec<u8>) -> Result<(), Error> {
        self.value = Some((self.accessor.blob_ops()?.make)(bytes));
        Ok(())
    }
}

/// Untyped value tree, produced when parsing dynamic JSON with no
/// registry-known target type. Its marshal method is inferred from the data
/// encountered rather than a schema.
#[derive(Clone, Debug, PartialEq)]
pub enum Untyped {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Array(Vec<Untyped>),
    Object(Vec<(String, Untyped)>),
}

impl Untyped {
    /// Inferred classification; `None` for null, which has no shape.
    pub fn marshal(&self) -> Option<MarshalMethod> {
        match self {
            Untyped::Null => None,
            Untyped::Bool(_) | Untyped::Int(_) | Untyped::Float(_) | Untyped::Str(_) => {
                Some(MarshalMethod::Primitive)
            }
            Untyped::Array(_) => Some(MarshalMethod::Collection),
            Untyped::Object(_) => Some(MarshalMethod::Object),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Untyped::Null)
    }

    /// Member lookup on an object tree.
    pub fn get(&self, name: &str) -> Option<&Untyped> {
        match self {
            Untyped::Object(members) => members
                .iter()
                .find_map(|(n, v)| (n == name).then_some(v)),
            _ => None,
        }
    }
}

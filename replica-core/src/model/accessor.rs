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

use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

use crate::error::Error;
use crate::types::{AutoMembers, IntFormat, MarshalMethod, MemberKey, ScalarKind, TypeKey};
use crate::value::Scalar;

use super::registry::Registry;
use super::{
    AnyValue, BuildFn, BytesGetFn, BytesMakeFn, CloneFn, CtorFn, GetFn, IterFn, ScalarGetFn,
    ScalarMakeFn, SetFn, TypeData,
};

/// Scalar get/make pair of a primitive type.
#[derive(Clone)]
pub struct ScalarOps {
    pub kind: ScalarKind,
    pub get: ScalarGetFn,
    pub make: ScalarMakeFn,
}

/// Element iterate/build pair of a collection type.
#[derive(Clone)]
pub struct CollectionOps {
    pub elem: TypeKey,
    pub elem_nullable: bool,
    pub iter: IterFn,
    pub build: BuildFn,
}

/// Raw-bytes get/make pair of a blob type.
#[derive(Clone)]
pub struct BlobOps {
    pub get: BytesGetFn,
    pub make: BytesMakeFn,
}

/// Bound getter/setter pair for one member of one declaring type, resolved
/// once when the type is compiled.
///
/// A member with no getter is a *phantom*: its shape is known (imported from
/// a peer's schema description) but it has no local backing, so readers can
/// only discard its wire bytes. A member with no setter cannot be written
/// (`can_set` is false) and unknown-member skipping applies to it as well.
pub struct MemberAccessor {
    pub index: u16,
    pub name: String,
    pub value_type: TypeKey,
    pub nullable: bool,
    pub int_format: IntFormat,
    pub surrogate: Option<TypeKey>,
    getter: Option<GetFn>,
    setter: Option<SetFn>,
}

impl MemberAccessor {
    pub(crate) fn phantom(index: u16, name: String, value_type: TypeKey, nullable: bool) -> Self {
        MemberAccessor {
            index,
            name,
            value_type,
            nullable,
            int_format: IntFormat::Default,
            surrogate: None,
            getter: None,
            setter: None,
        }
    }

    pub fn is_phantom(&self) -> bool {
        self.getter.is_none()
    }

    pub fn can_set(&self) -> bool {
        self.setter.is_some()
    }

    /// Reads the member off `owner`. Tolerates an incompatible or absent
    /// backing by yielding null instead of propagating an error.
    pub fn get(&self, owner: &(dyn Any + Send + Sync)) -> Option<AnyValue> {
        self.getter.as_ref().and_then(|g| g(owner))
    }

    pub fn set(
        &self,
        owner: &mut (dyn Any + Send + Sync),
        value: Option<AnyValue>,
    ) -> Result<(), Error> {
        match &self.setter {
            Some(s) => s(owner, value),
            None => Err(Error::invalid_operation(format!(
                "member {} has no setter",
                self.name
            ))),
        }
    }
}

/// Realized, cached view of a registered type: ordered member accessors with
/// name/index lookup, a constructor thunk and the marshal-method-specific
/// operations. Immutable once compiled; surrogate attachment lives in the
/// registry's side table.
pub struct TypeAccessor {
    pub key: TypeKey,
    pub marshal: MarshalMethod,
    pub auto_members: AutoMembers,
    pub(crate) dynamic: bool,
    members: Vec<Arc<MemberAccessor>>,
    by_name: HashMap<String, usize>,
    by_index: HashMap<u16, usize>,
    ctor: Option<CtorFn>,
    cloner: Option<CloneFn>,
    scalar: Option<ScalarOps>,
    collection: Option<CollectionOps>,
    blob: Option<BlobOps>,
}

impl TypeAccessor {
    /// Compiles a declarative descriptor into a bound accessor, splicing
    /// base members in place of `base`-flagged entries.
    pub(crate) fn compile(data: TypeData, registry: &Registry) -> Result<TypeAccessor, Error> {
        let mut members: Vec<MemberAccessor> = Vec::new();
        for def in data.members {
            if def.base {
                let base_acc = registry.accessor(&def.value_type)?;
                if base_acc.marshal != MarshalMethod::Object {
                    return Err(Error::invalid_operation(format!(
                        "base member {} must be an object type",
                        def.name
                    )));
                }
                let base_set = def.setter.clone().ok_or_else(|| {
                    Error::invalid_operation(format!("base member {} has no setter", def.name))
                })?;
                for bm in base_acc.members() {
                    if bm.is_phantom() {
                        continue;
                    }
                    let bm_get = bm.clone();
                    let base_get = def.getter.clone();
                    let getter: GetFn =
                        Arc::new(move |owner| base_get(owner).and_then(|b| bm_get.get(&*b)));
                    let bm_set = bm.clone();
                    let base_get2 = def.getter.clone();
                    let base_set2 = base_set.clone();
                    let base_ctor = base_acc.ctor.clone();
                    let setter: SetFn = Arc::new(move |owner, value| {
                        let mut backing = match base_get2(owner) {
                            Some(b) => b,
                            None => base_ctor
                                .as_ref()
                                .map(|c| c())
                                .ok_or_else(|| {
                                    Error::invalid_operation("base type has no constructor")
                                })?,
                        };
                        bm_set.set(&mut *backing, value)?;
                        base_set2(owner, Some(backing))
                    });
                    members.push(MemberAccessor {
                        index: 0,
                        name: bm.name.clone(),
                        value_type: bm.value_type.clone(),
                        nullable: bm.nullable,
                        int_format: bm.int_format,
                        surrogate: bm.surrogate.clone(),
                        getter: Some(getter),
                        setter: Some(setter),
                    });
                }
            } else {
                members.push(MemberAccessor {
                    index: 0,
                    name: def.name.into_owned(),
                    value_type: def.value_type,
                    nullable: def.nullable,
                    int_format: def.int_format,
                    surrogate: def.surrogate,
                    getter: Some(def.getter),
                    setter: def.setter,
                });
            }
        }
        if members.len() > 256 {
            return Err(Error::invalid_operation(format!(
                "type {} has {} members, the wire member index is a single byte",
                data.key,
                members.len()
            )));
        }
        let members: Vec<Arc<MemberAccessor>> = members
            .into_iter()
            .enumerate()
            .map(|(i, mut m)| {
                m.index = i as u16;
                Arc::new(m)
            })
            .collect();
        let mut accessor = TypeAccessor {
            key: data.key,
            marshal: data.marshal,
            auto_members: data.auto_members,
            dynamic: data.dynamic,
            members,
            by_name: HashMap::new(),
            by_index: HashMap::new(),
            ctor: data.ctor,
            cloner: data.cloner,
            scalar: data.scalar,
            collection: data.collection,
            blob: data.blob,
        };
        accessor.rebuild_lookup()?;
        Ok(accessor)
    }

    fn rebuild_lookup(&mut self) -> Result<(), Error> {
        self.by_name.clear();
        self.by_index.clear();
        for (i, m) in self.members.iter().enumerate() {
            if self.by_name.insert(m.name.clone(), i).is_some() {
                return Err(Error::invalid_operation(format!(
                    "duplicate member name {} on {}",
                    m.name, self.key
                )));
            }
            if self.by_index.insert(m.index, i).is_some() {
                return Err(Error::invalid_operation(format!(
                    "duplicate member index {} on {}",
                    m.index, self.key
                )));
            }
        }
        Ok(())
    }

    /// Copy of this accessor with extra phantom members appended. Used when
    /// a peer's schema description declares wire members the local type does
    /// not have.
    pub(crate) fn with_phantoms(
        &self,
        phantoms: Vec<MemberAccessor>,
    ) -> Result<TypeAccessor, Error> {
        let mut members = self.members.clone();
        members.extend(phantoms.into_iter().map(Arc::new));
        let mut accessor = TypeAccessor {
            key: self.key.clone(),
            marshal: self.marshal,
            auto_members: self.auto_members,
            dynamic: self.dynamic,
            members,
            by_name: HashMap::new(),
            by_index: HashMap::new(),
            ctor: self.ctor.clone(),
            cloner: self.cloner.clone(),
            scalar: self.scalar.clone(),
            collection: self.collection.clone(),
            blob: self.blob.clone(),
        };
        accessor.rebuild_lookup()?;
        Ok(accessor)
    }

    pub fn members(&self) -> &[Arc<MemberAccessor>] {
        &self.members
    }

    pub fn member_by_index(&self, index: u16) -> Option<&Arc<MemberAccessor>> {
        self.by_index.get(&index).map(|i| &self.members[*i])
    }

    pub fn member_by_name(&self, name: &str) -> Option<&Arc<MemberAccessor>> {
        self.by_name.get(name).map(|i| &self.members[*i])
    }

    pub fn member(&self, key: &MemberKey) -> Option<&Arc<MemberAccessor>> {
        match key {
            MemberKey::Index(i) => self.member_by_index(*i),
            MemberKey::Name(n) => self.member_by_name(n),
        }
    }

    /// Converts between the two member key forms within this type.
    pub fn member_key(&self, key: &MemberKey) -> Option<MemberKey> {
        self.member(key).map(|m| match key {
            MemberKey::Index(_) => MemberKey::Name(m.name.clone()),
            MemberKey::Name(_) => MemberKey::Index(m.index),
        })
    }

    pub fn construct(&self) -> Option<AnyValue> {
        self.ctor.as_ref().map(|c| c())
    }

    pub(crate) fn clone_fn(&self) -> Option<CloneFn> {
        self.cloner.clone()
    }

    pub fn is_dynamic(&self) -> bool {
        self.dynamic
    }

    pub fn scalar_ops(&self) -> Result<&ScalarOps, Error> {
        self.scalar
            .as_ref()
            .ok_or_else(|| Error::wrong_view(MarshalMethod::Primitive, self.marshal))
    }

    pub fn collection_ops(&self) -> Result<&CollectionOps, Error> {
        self.collection
            .as_ref()
            .ok_or_else(|| Error::wrong_view(MarshalMethod::Collection, self.marshal))
    }

    pub fn blob_ops(&self) -> Result<&BlobOps, Error> {
        self.blob
            .as_ref()
            .ok_or_else(|| Error::wrong_view(MarshalMethod::Blob, self.marshal))
    }

    pub fn scalar_kind(&self) -> Result<ScalarKind, Error> {
        Ok(self.scalar_ops()?.kind)
    }

    pub fn get_scalar(&self, value: &(dyn Any + Send + Sync)) -> Result<Scalar, Error> {
        (self.scalar_ops()?.get)(value)
    }

    pub fn make_scalar(&self, scalar: Scalar) -> Result<AnyValue, Error> {
        (self.scalar_ops()?.make)(scalar)
    }
}

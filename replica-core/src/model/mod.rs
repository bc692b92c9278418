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

//! The type model: registry, per-type descriptors, compiled accessors and
//! surrogate resolution. Everything a codec knows about a type it learns
//! here; the codecs themselves never downcast a backing value.

use std::any::Any;
use std::borrow::Cow;
use std::sync::Arc;

use crate::error::Error;
use crate::types::{AutoMembers, IntFormat, MarshalMethod, ScalarKind, TypeKey};
use crate::value::Scalar;

pub mod accessor;
mod builtin;
pub mod registry;
pub mod schema;
pub mod surrogate;

pub use accessor::{BlobOps, CollectionOps, MemberAccessor, ScalarOps, TypeAccessor};
pub use builtin::MapEntry;
pub use registry::Registry;
pub use schema::{MemberSchema, TypeSchema};
pub use surrogate::ConvertPair;

/// A backing value in transit between accessors and codecs.
pub type AnyValue = Box<dyn Any + Send + Sync>;

pub type GetFn = Arc<dyn Fn(&(dyn Any + Send + Sync)) -> Option<AnyValue> + Send + Sync>;
pub type SetFn =
    Arc<dyn Fn(&mut (dyn Any + Send + Sync), Option<AnyValue>) -> Result<(), Error> + Send + Sync>;
pub type CtorFn = Arc<dyn Fn() -> AnyValue + Send + Sync>;
pub type CloneFn = Arc<dyn Fn(&(dyn Any + Send + Sync)) -> AnyValue + Send + Sync>;
pub type ScalarGetFn =
    Arc<dyn Fn(&(dyn Any + Send + Sync)) -> Result<Scalar, Error> + Send + Sync>;
pub type ScalarMakeFn = Arc<dyn Fn(Scalar) -> Result<AnyValue, Error> + Send + Sync>;
pub type IterFn =
    Arc<dyn Fn(&(dyn Any + Send + Sync)) -> Result<Vec<Option<AnyValue>>, Error> + Send + Sync>;
pub type BuildFn = Arc<dyn Fn(Vec<Option<AnyValue>>) -> Result<AnyValue, Error> + Send + Sync>;
pub type BytesGetFn =
    Arc<dyn Fn(&(dyn Any + Send + Sync)) -> Result<Vec<u8>, Error> + Send + Sync>;
pub type BytesMakeFn = Arc<dyn Fn(Vec<u8>) -> AnyValue + Send + Sync>;

/// The replicate marker: a type the registry knows how to decompose.
///
/// Implemented by `#[derive(Replicate)]` for user types and built in for
/// primitives, `Option`, collections, maps and tuples. `ensure_registered`
/// is idempotent and recursively registers every type reachable from the
/// member table, so registering the roots of an object graph registers the
/// whole graph.
pub trait Replicated: Any + Send + Sync + Sized + Clone + Default {
    fn type_key() -> TypeKey;

    fn ensure_registered(registry: &mut Registry) -> Result<TypeKey, Error>;

    /// Whether a slot of this type may legally hold null.
    fn nullable() -> bool {
        false
    }

    fn is_null(&self) -> bool {
        false
    }

    /// Boxed clone of the underlying value, or `None` when this value is the
    /// null of a nullable slot.
    fn boxed_inner(&self) -> Option<AnyValue> {
        Some(Box::new(self.clone()))
    }

    /// Rebuilds a value of this type from a traversal result. Null maps to
    /// the type's default, matching the tolerant-read policy of the graph
    /// walk.
    fn from_inner(value: Option<AnyValue>) -> Result<Self, Error> {
        match value {
            None => Ok(Self::default()),
            Some(v) => match v.downcast::<Self>() {
                Ok(v) => Ok(*v),
                Err(_) => Err(Error::serialization(format!(
                    "backing value is not a {}",
                    Self::type_key()
                ))),
            },
        }
    }
}

impl<T: Replicated> Replicated for Option<T> {
    fn type_key() -> TypeKey {
        T::type_key()
    }

    fn ensure_registered(registry: &mut Registry) -> Result<TypeKey, Error> {
        T::ensure_registered(registry)
    }

    fn nullable() -> bool {
        true
    }

    fn is_null(&self) -> bool {
        self.is_none()
    }

    fn boxed_inner(&self) -> Option<AnyValue> {
        self.as_ref().and_then(Replicated::boxed_inner)
    }

    fn from_inner(value: Option<AnyValue>) -> Result<Self, Error> {
        match value {
            None => Ok(None),
            Some(v) => Ok(Some(T::from_inner(Some(v))?)),
        }
    }
}

/// One entry of a type's declarative member table, produced by the derive
/// (or by hand for built-in shapes) and compiled into a bound
/// [`MemberAccessor`].
pub struct MemberDef {
    pub name: Cow<'static, str>,
    pub value_type: TypeKey,
    pub nullable: bool,
    pub int_format: IntFormat,
    /// Member-level surrogate; takes precedence over the value type's own
    /// surrogate.
    pub surrogate: Option<TypeKey>,
    /// Splice the members of this (object-typed) field into the owning
    /// type's member table instead of declaring the field itself.
    pub base: bool,
    pub getter: GetFn,
    pub setter: Option<SetFn>,
}

/// Per-type descriptor handed to [`Registry::add`]: classification, member
/// table and the marshal-method-specific operations. Compiled once into a
/// [`TypeAccessor`] and cached for the lifetime of the registry.
pub struct TypeData {
    pub key: TypeKey,
    pub marshal: MarshalMethod,
    pub auto_members: AutoMembers,
    pub members: Vec<MemberDef>,
    pub ctor: Option<CtorFn>,
    pub cloner: Option<CloneFn>,
    pub scalar: Option<ScalarOps>,
    pub collection: Option<CollectionOps>,
    pub blob: Option<BlobOps>,
    /// Marker for the polymorphic slot type; resolved against the runtime
    /// value's key at traversal time.
    pub dynamic: bool,
}

impl TypeData {
    fn base_for<T: Replicated>(key: TypeKey, marshal: MarshalMethod) -> TypeData {
        TypeData {
            key,
            marshal,
            auto_members: AutoMembers::default(),
            members: Vec::new(),
            ctor: Some(Arc::new(|| Box::new(T::default()) as AnyValue)),
            cloner: Some(Arc::new(|v: &(dyn Any + Send + Sync)| {
                v.downcast_ref::<T>()
                    .map(|v| Box::new(v.clone()) as AnyValue)
                    .unwrap_or_else(|| Box::new(T::default()) as AnyValue)
            })),
            scalar: None,
            collection: None,
            blob: None,
            dynamic: false,
        }
    }

    pub fn object<T: Replicated>(
        key: TypeKey,
        auto_members: AutoMembers,
        members: Vec<MemberDef>,
    ) -> TypeData {
        let mut data = Self::base_for::<T>(key, MarshalMethod::Object);
        data.auto_members = auto_members;
        data.members = members;
        data
    }

    pub fn tuple<T: Replicated>(key: TypeKey, members: Vec<MemberDef>) -> TypeData {
        let mut data = Self::base_for::<T>(key, MarshalMethod::Tuple);
        data.members = members;
        data
    }

    pub fn scalar<T: Replicated>(
        key: TypeKey,
        kind: ScalarKind,
        get: ScalarGetFn,
        make: ScalarMakeFn,
    ) -> TypeData {
        let mut data = Self::base_for::<T>(key, MarshalMethod::Primitive);
        data.scalar = Some(ScalarOps { kind, get, make });
        data
    }

    pub fn collection<T: Replicated>(
        key: TypeKey,
        elem: TypeKey,
        elem_nullable: bool,
        iter: IterFn,
        build: BuildFn,
    ) -> TypeData {
        let mut data = Self::base_for::<T>(key, MarshalMethod::Collection);
        data.collection = Some(CollectionOps {
            elem,
            elem_nullable,
            iter,
            build,
        });
        data
    }

    pub fn blob<T: Replicated>(key: TypeKey, get: BytesGetFn, make: BytesMakeFn) -> TypeData {
        let mut data = Self::base_for::<T>(key, MarshalMethod::Blob);
        data.blob = Some(BlobOps { get, make });
        data
    }

    pub fn dynamic_marker<T: Replicated>(key: TypeKey) -> TypeData {
        let mut data = Self::base_for::<T>(key, MarshalMethod::Object);
        data.dynamic = true;
        data
    }
}

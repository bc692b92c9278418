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

use std::fmt;
use std::sync::Arc;

use crate::error::Error;
use crate::model::{AnyValue, CloneFn, Registry, Replicated, TypeData};
use crate::types::TypeKey;

/// Strongly-typed polymorphic slot: a boxed value tagged with its runtime
/// [`TypeKey`], re-resolved through the registry on read.
///
/// The binary codec prefixes the payload with the key (compact index when one
/// is assigned, canonical name otherwise). The runtime type must itself be
/// registered before a `Dynamic` holding it is serialized.
#[derive(Clone, Default)]
pub struct Dynamic {
    inner: Option<DynamicInner>,
}

struct DynamicInner {
    key: TypeKey,
    value: AnyValue,
    clone_fn: CloneFn,
}

impl Clone for DynamicInner {
    fn clone(&self) -> Self {
        DynamicInner {
            key: self.key.clone(),
            value: (self.clone_fn)(&*self.value),
            clone_fn: self.clone_fn.clone(),
        }
    }
}

impl Dynamic {
    pub fn new<T: Replicated>(value: T) -> Dynamic {
        let clone_fn: CloneFn = Arc::new(|v| {
            v.downcast_ref::<T>()
                .map(|x| Box::new(x.clone()) as AnyValue)
                .unwrap_or_else(|| Box::new(T::default()) as AnyValue)
        });
        Dynamic {
            inner: Some(DynamicInner {
                key: T::type_key(),
                value: Box::new(value),
                clone_fn,
            }),
        }
    }

    pub fn empty() -> Dynamic {
        Dynamic { inner: None }
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_none()
    }

    pub fn key(&self) -> Option<&TypeKey> {
        self.inner.as_ref().map(|i| &i.key)
    }

    pub fn get<T: Replicated>(&self) -> Option<&T> {
        self.inner.as_ref().and_then(|i| i.value.downcast_ref())
    }

    pub(crate) fn clone_parts(&self) -> Option<(TypeKey, AnyValue)> {
        self.inner
            .as_ref()
            .map(|i| (i.key.clone(), (i.clone_fn)(&*i.value)))
    }

    pub(crate) fn from_raw(key: TypeKey, value: AnyValue, clone_fn: CloneFn) -> Dynamic {
        Dynamic {
            inner: Some(DynamicInner {
                key,
                value,
                clone_fn,
            }),
        }
    }
}

impl fmt::Debug for Dynamic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.inner {
            Some(i) => write!(f, "Dynamic({})", i.key),
            None => write!(f, "Dynamic(empty)"),
        }
    }
}

impl Replicated for Dynamic {
    fn type_key() -> TypeKey {
        TypeKey::named("dynamic")
    }

    fn ensure_registered(registry: &mut Registry) -> Result<TypeKey, Error> {
        registry.add(TypeData::dynamic_marker::<Dynamic>(Self::type_key()))
    }

    fn nullable() -> bool {
        true
    }

    fn is_null(&self) -> bool {
        self.inner.is_none()
    }

    fn boxed_inner(&self) -> Option<AnyValue> {
        if self.inner.is_none() {
            None
        } else {
            Some(Box::new(self.clone()))
        }
    }

    fn from_inner(value: Option<AnyValue>) -> Result<Self, Error> {
        match value {
            None => Ok(Dynamic::empty()),
            Some(v) => match v.downcast::<Dynamic>() {
                Ok(d) => Ok(*d),
                Err(_) => Err(Error::serialization("backing value is not a dynamic slot")),
            },
        }
    }
}

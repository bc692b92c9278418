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

//! Built-in `Replicated` implementations: primitives, strings, dates,
//! `Vec`, `HashSet`, `HashMap` and tuples.

use std::any::{Any, TypeId};
use std::borrow::Cow;
use std::collections::{HashMap, HashSet};
use std::hash::Hash;
use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime};

use crate::dynamic::Dynamic;
use crate::error::Error;
use crate::types::{AutoMembers, IntFormat, ScalarKind, TypeKey};
use crate::value::Scalar;

use super::registry::Registry;
use super::{AnyValue, MemberDef, Replicated, TypeData};

macro_rules! impl_scalar {
    ($ty:ty, $kind:ident, $name:literal) => {
        impl Replicated for $ty {
            fn type_key() -> TypeKey {
                TypeKey::named($name)
            }

            fn ensure_registered(registry: &mut Registry) -> Result<TypeKey, Error> {
                registry.add(TypeData::scalar::<$ty>(
                    Self::type_key(),
                    ScalarKind::$kind,
                    Arc::new(|v: &(dyn Any + Send + Sync)| {
                        v.downcast_ref::<$ty>()
                            .map(|v| Scalar::$kind(v.clone()))
                            .ok_or_else(|| {
                                Error::serialization(concat!("backing value is not a ", $name))
                            })
                    }),
                    Arc::new(|s: Scalar| match s.coerce(ScalarKind::$kind)? {
                        Scalar::$kind(v) => Ok(Box::new(v) as AnyValue),
                        _ => Err(Error::serialization("scalar coercion changed kind")),
                    }),
                ))
            }
        }
    };
}

impl_scalar!(bool, Bool, "bool");
impl_scalar!(i8, I8, "i8");
impl_scalar!(i16, I16, "i16");
impl_scalar!(i32, I32, "i32");
impl_scalar!(i64, I64, "i64");
impl_scalar!(u8, U8, "u8");
impl_scalar!(u16, U16, "u16");
impl_scalar!(u32, U32, "u32");
impl_scalar!(u64, U64, "u64");
impl_scalar!(f32, F32, "f32");
impl_scalar!(f64, F64, "f64");
impl_scalar!(String, Str, "String");
impl_scalar!(NaiveDate, Date, "NaiveDate");
impl_scalar!(NaiveDateTime, Timestamp, "NaiveDateTime");

impl<T: Replicated> Replicated for Vec<T> {
    fn type_key() -> TypeKey {
        TypeKey::generic("Vec", vec![T::type_key()])
    }

    fn ensure_registered(registry: &mut Registry) -> Result<TypeKey, Error> {
        let key = Self::type_key();
        if registry.contains(&key) {
            return Ok(key);
        }
        T::ensure_registered(registry)?;
        // Vec<u8> is the blob fast path, not an element-wise collection.
        if TypeId::of::<T>() == TypeId::of::<u8>() {
            return registry.add(TypeData::blob::<Vec<u8>>(
                key,
                Arc::new(|v: &(dyn Any + Send + Sync)| {
                    v.downcast_ref::<Vec<u8>>().cloned().ok_or_else(|| {
                        Error::serialization("backing value is not a byte vector")
                    })
                }),
                Arc::new(|bytes| Box::new(bytes) as AnyValue),
            ));
        }
        registry.add(TypeData::collection::<Vec<T>>(
            key,
            T::type_key(),
            T::nullable(),
            Arc::new(|v: &(dyn Any + Send + Sync)| {
                let vec = v
                    .downcast_ref::<Vec<T>>()
                    .ok_or_else(|| Error::serialization("backing value is not a vector"))?;
                Ok(vec.iter().map(Replicated::boxed_inner).collect())
            }),
            Arc::new(|values| {
                let mut out: Vec<T> = Vec::with_capacity(values.len());
                for v in values {
                    out.push(T::from_inner(v)?);
                }
                Ok(Box::new(out) as AnyValue)
            }),
        ))
    }
}

impl<T: Replicated + Eq + Hash> Replicated for HashSet<T> {
    fn type_key() -> TypeKey {
        TypeKey::generic("HashSet", vec![T::type_key()])
    }

    fn ensure_registered(registry: &mut Registry) -> Result<TypeKey, Error> {
        let key = Self::type_key();
        if registry.contains(&key) {
            return Ok(key);
        }
        T::ensure_registered(registry)?;
        registry.add(TypeData::collection::<HashSet<T>>(
            key,
            T::type_key(),
            T::nullable(),
            Arc::new(|v: &(dyn Any + Send + Sync)| {
                let set = v
                    .downcast_ref::<HashSet<T>>()
                    .ok_or_else(|| Error::serialization("backing value is not a set"))?;
                Ok(set.iter().map(Replicated::boxed_inner).collect())
            }),
            Arc::new(|values| {
                let mut out: HashSet<T> = HashSet::with_capacity(values.len());
                for v in values {
                    out.insert(T::from_inner(v)?);
                }
                Ok(Box::new(out) as AnyValue)
            }),
        ))
    }
}

/// One dictionary entry on the wire: dictionaries serialize as collections
/// of these key/value records.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MapEntry<K, V> {
    pub key: K,
    pub value: V,
}

impl<K: Replicated, V: Replicated> Replicated for MapEntry<K, V> {
    fn type_key() -> TypeKey {
        TypeKey::generic("MapEntry", vec![K::type_key(), V::type_key()])
    }

    fn ensure_registered(registry: &mut Registry) -> Result<TypeKey, Error> {
        let key = Self::type_key();
        if registry.contains(&key) {
            return Ok(key);
        }
        K::ensure_registered(registry)?;
        V::ensure_registered(registry)?;
        let members = vec![
            MemberDef {
                name: Cow::Borrowed("key"),
                value_type: K::type_key(),
                nullable: K::nullable(),
                int_format: IntFormat::Default,
                surrogate: None,
                base: false,
                getter: Arc::new(|owner: &(dyn Any + Send + Sync)| {
                    owner
                        .downcast_ref::<Self>()
                        .and_then(|e| e.key.boxed_inner())
                }),
                setter: Some(Arc::new(
                    |owner: &mut (dyn Any + Send + Sync), value: Option<AnyValue>| {
                        let e = owner.downcast_mut::<Self>().ok_or_else(|| {
                            Error::serialization("member set on incompatible backing")
                        })?;
                        e.key = K::from_inner(value)?;
                        Ok(())
                    },
                )),
            },
            MemberDef {
                name: Cow::Borrowed("value"),
                value_type: V::type_key(),
                nullable: V::nullable(),
                int_format: IntFormat::Default,
                surrogate: None,
                base: false,
                getter: Arc::new(|owner: &(dyn Any + Send + Sync)| {
                    owner
                        .downcast_ref::<Self>()
                        .and_then(|e| e.value.boxed_inner())
                }),
                setter: Some(Arc::new(
                    |owner: &mut (dyn Any + Send + Sync), value: Option<AnyValue>| {
                        let e = owner.downcast_mut::<Self>().ok_or_else(|| {
                            Error::serialization("member set on incompatible backing")
                        })?;
                        e.value = V::from_inner(value)?;
                        Ok(())
                    },
                )),
            },
        ];
        registry.add(TypeData::object::<Self>(key, AutoMembers::All, members))
    }
}

impl<K: Replicated + Eq + Hash, V: Replicated> Replicated for HashMap<K, V> {
    fn type_key() -> TypeKey {
        TypeKey::generic("HashMap", vec![K::type_key(), V::type_key()])
    }

    fn ensure_registered(registry: &mut Registry) -> Result<TypeKey, Error> {
        let key = Self::type_key();
        if registry.contains(&key) {
            return Ok(key);
        }
        MapEntry::<K, V>::ensure_registered(registry)?;
        registry.add(TypeData::collection::<HashMap<K, V>>(
            key,
            MapEntry::<K, V>::type_key(),
            false,
            Arc::new(|v: &(dyn Any + Send + Sync)| {
                let map = v
                    .downcast_ref::<HashMap<K, V>>()
                    .ok_or_else(|| Error::serialization("backing value is not a map"))?;
                Ok(map
                    .iter()
                    .map(|(k, val)| {
                        MapEntry {
                            key: k.clone(),
                            value: val.clone(),
                        }
                        .boxed_inner()
                    })
                    .collect())
            }),
            Arc::new(|values| {
                let mut out: HashMap<K, V> = HashMap::with_capacity(values.len());
                for v in values {
                    let entry = MapEntry::<K, V>::from_inner(v)?;
                    out.insert(entry.key, entry.value);
                }
                Ok(Box::new(out) as AnyValue)
            }),
        ))
    }
}

macro_rules! impl_tuple {
    ($(($idx:tt, $T:ident, $name:literal)),+) => {
        impl<$($T: Replicated),+> Replicated for ($($T,)+) {
            fn type_key() -> TypeKey {
                TypeKey::generic("Tuple", vec![$($T::type_key()),+])
            }

            fn ensure_registered(registry: &mut Registry) -> Result<TypeKey, Error> {
                let key = Self::type_key();
                if registry.contains(&key) {
                    return Ok(key);
                }
                $($T::ensure_registered(registry)?;)+
                let members = vec![
                    $(MemberDef {
                        name: Cow::Borrowed($name),
                        value_type: $T::type_key(),
                        nullable: $T::nullable(),
                        int_format: IntFormat::Default,
                        surrogate: None,
                        base: false,
                        getter: Arc::new(|owner: &(dyn Any + Send + Sync)| {
                            owner.downcast_ref::<Self>().and_then(|t| t.$idx.boxed_inner())
                        }),
                        setter: Some(Arc::new(
                            |owner: &mut (dyn Any + Send + Sync), value: Option<AnyValue>| {
                                let t = owner.downcast_mut::<Self>().ok_or_else(|| {
                                    Error::serialization("member set on incompatible backing")
                                })?;
                                t.$idx = $T::from_inner(value)?;
                                Ok(())
                            },
                        )),
                    }),+
                ];
                registry.add(TypeData::tuple::<Self>(key, members))
            }
        }
    };
}

impl_tuple!((0, T0, "0"), (1, T1, "1"));
impl_tuple!((0, T0, "0"), (1, T1, "1"), (2, T2, "2"));
impl_tuple!((0, T0, "0"), (1, T1, "1"), (2, T2, "2"), (3, T3, "3"));

/// Pre-registers the built-in primitives and the dynamic marker on a fresh
/// registry.
pub(crate) fn seed(registry: &mut Registry) {
    let seeded = [
        bool::ensure_registered(registry),
        i8::ensure_registered(registry),
        i16::ensure_registered(registry),
        i32::ensure_registered(registry),
        i64::ensure_registered(registry),
        u8::ensure_registered(registry),
        u16::ensure_registered(registry),
        u32::ensure_registered(registry),
        u64::ensure_registered(registry),
        f32::ensure_registered(registry),
        f64::ensure_registered(registry),
        String::ensure_registered(registry),
        NaiveDate::ensure_registered(registry),
        NaiveDateTime::ensure_registered(registry),
        Dynamic::ensure_registered(registry),
    ];
    for entry in seeded {
        entry.expect("builtin registration on a fresh registry cannot fail");
    }
}

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

//! Length-prefixed binary format.
//!
//! Every value is `[presence u8]` then, if present, the payload. Collections
//! are an `i32` little-endian count followed by the elements; objects are an
//! `i32` member count followed by `[u8 member index][value]` records.
//! Integers up to 32 bits travel as 4-byte little-endian `i32` and are
//! narrowed or widened on assignment; 64-bit integers travel at declared
//! width. These layout constants are part of the wire contract.

use crate::buffer::{Reader, Writer};
use crate::dynamic::Dynamic;
use crate::ensure;
use crate::error::Error;
use crate::model::{AnyValue, MemberAccessor, Registry};
use crate::node::Node;
use crate::types::{MarshalMethod, MemberKey, ScalarKind, TypeKey};
use crate::value::{days_from_date, millis_from_timestamp, Scalar};

use super::{BinaryConfig, UnknownMembers};

const KEY_FORM_INDEX: u8 = 0;
const KEY_FORM_NAME: u8 = 1;

pub fn to_bytes(
    registry: &Registry,
    declared: &TypeKey,
    value: Option<AnyValue>,
    nullable: bool,
) -> Result<Vec<u8>, Error> {
    let node = Node::over(registry, declared, None, value, nullable)?;
    let mut writer = Writer::default();
    write_value(registry, &mut writer, &node)?;
    Ok(writer.dump())
}

pub fn from_bytes(
    registry: &Registry,
    config: &BinaryConfig,
    declared: &TypeKey,
    nullable: bool,
    bytes: &[u8],
    existing: Option<AnyValue>,
) -> Result<Option<AnyValue>, Error> {
    let mut reader = Reader::new(bytes);
    let value = read_value(
        registry,
        config,
        &mut reader,
        declared,
        None,
        nullable,
        existing,
    )?;
    ensure!(
        reader.remaining() == 0,
        Error::serialization(format!(
            "{} trailing byte(s) after value",
            reader.remaining()
        ))
    );
    Ok(value)
}

fn write_value(registry: &Registry, writer: &mut Writer, node: &Node) -> Result<(), Error> {
    if node.is_null() {
        writer.write_u8(0);
        return Ok(());
    }
    writer.write_u8(1);
    if let Some(key) = node.dynamic_key() {
        write_type_key(registry, writer, key);
    }
    write_payload(registry, writer, node)
}

fn write_payload(registry: &Registry, writer: &mut Writer, node: &Node) -> Result<(), Error> {
    match node.marshal() {
        MarshalMethod::Primitive => {
            write_scalar(writer, node.get_scalar()?);
            Ok(())
        }
        MarshalMethod::Blob => {
            let bytes = node.blob_bytes()?;
            writer.write_i32(bytes.len() as i32);
            writer.write_bytes(&bytes);
            Ok(())
        }
        MarshalMethod::Collection => {
            let children = node.children()?;
            writer.write_i32(children.len() as i32);
            for child in &children {
                write_value(registry, writer, child)?;
            }
            Ok(())
        }
        MarshalMethod::Object | MarshalMethod::Tuple => {
            let members: Vec<_> = node
                .object_members()?
                .iter()
                .filter(|m| !m.is_phantom())
                .cloned()
                .collect();
            writer.write_i32(members.len() as i32);
            for member in &members {
                writer.write_u8(member.index as u8);
                let child = node.child(member)?;
                write_value(registry, writer, &child)?;
            }
            Ok(())
        }
    }
}

fn write_scalar(writer: &mut Writer, scalar: Scalar) {
    match scalar {
        Scalar::Bool(v) => writer.write_i32(v as i32),
        Scalar::I8(v) => writer.write_i32(v as i32),
        Scalar::I16(v) => writer.write_i32(v as i32),
        Scalar::I32(v) => writer.write_i32(v),
        Scalar::U8(v) => writer.write_i32(v as i32),
        Scalar::U16(v) => writer.write_i32(v as i32),
        Scalar::U32(v) => writer.write_i32(v as i32),
        Scalar::I64(v) => writer.write_i64(v),
        Scalar::U64(v) => writer.write_u64(v),
        Scalar::F32(v) => writer.write_f32(v),
        Scalar::F64(v) => writer.write_f64(v),
        Scalar::Str(s) => write_str(writer, &s),
        Scalar::Date(d) => writer.write_i32(days_from_date(d) as i32),
        Scalar::Timestamp(t) => writer.write_i64(millis_from_timestamp(t)),
    }
}

fn write_str(writer: &mut Writer, s: &str) {
    writer.write_i32(s.len() as i32);
    writer.write_bytes(s.as_bytes());
}

fn write_type_key(registry: &Registry, writer: &mut Writer, key: &TypeKey) {
    match registry.id_of(key) {
        Some(id) => {
            writer.write_u8(KEY_FORM_INDEX);
            writer.write_varuint32(id);
        }
        None => {
            writer.write_u8(KEY_FORM_NAME);
            write_str(writer, &key.render());
        }
    }
}

fn read_type_key(registry: &Registry, reader: &mut Reader) -> Result<TypeKey, Error> {
    match reader.read_u8()? {
        KEY_FORM_INDEX => {
            let id = reader.read_varuint32()?;
            registry
                .key_of(id)
                .cloned()
                .ok_or_else(|| Error::type_not_registered(format!("#{id}")))
        }
        KEY_FORM_NAME => TypeKey::parse(&read_str(reader)?),
        other => Err(Error::serialization(format!(
            "bad type key form byte {other}"
        ))),
    }
}

fn read_value(
    registry: &Registry,
    config: &BinaryConfig,
    reader: &mut Reader,
    declared: &TypeKey,
    member: Option<&MemberAccessor>,
    nullable: bool,
    existing: Option<AnyValue>,
) -> Result<Option<AnyValue>, Error> {
    match reader.read_u8()? {
        0 => return Ok(None),
        1 => {}
        other => {
            return Err(Error::serialization(format!("bad presence byte {other}")));
        }
    }
    let mut node = Node::empty(registry, declared, member, nullable)?;
    if node.is_dynamic() {
        let key = read_type_key(registry, reader)?;
        let mut inner = Node::empty(registry, &key, None, false)?;
        if !read_payload(registry, config, reader, &mut inner, None)? {
            return Ok(None);
        }
        let value = inner
            .into_value()?
            .ok_or_else(|| Error::serialization("dynamic payload was empty"))?;
        let clone_fn = registry
            .accessor(&key)?
            .clone_fn()
            .ok_or_else(|| Error::serialization("dynamic target cannot be cloned"))?;
        let slot = Dynamic::from_raw(registry.resolve(&key)?, value, clone_fn);
        return Ok(Some(Box::new(slot) as AnyValue));
    }
    if !read_payload(registry, config, reader, &mut node, existing)? {
        return Ok(None);
    }
    node.into_value()
}

/// Fills the node from the stream. Returns false when the payload turned out
/// to be the legacy `-1`-count null encoding.
fn read_payload(
    registry: &Registry,
    config: &BinaryConfig,
    reader: &mut Reader,
    node: &mut Node,
    existing: Option<AnyValue>,
) -> Result<bool, Error> {
    match node.marshal() {
        MarshalMethod::Primitive => {
            let kind = node.scalar_kind()?;
            let scalar = read_scalar(reader, kind)?;
            node.set_scalar(scalar)?;
            Ok(true)
        }
        MarshalMethod::Blob => {
            let len = reader.read_i32()?;
            if len < 0 {
                return Ok(false);
            }
            let bytes = reader.read_bytes(len as usize)?.to_vec();
            node.set_blob(bytes)?;
            Ok(true)
        }
        MarshalMethod::Collection => {
            let count = reader.read_i32()?;
            if count < 0 {
                return Ok(false);
            }
            let (elem, elem_nullable) = {
                let ops = node.collection_ops()?;
                (ops.elem.clone(), ops.elem_nullable)
            };
            let mut values = Vec::with_capacity(count as usize);
            for _ in 0..count {
                values.push(read_value(
                    registry,
                    config,
                    reader,
                    &elem,
                    None,
                    elem_nullable,
                    None,
                )?);
            }
            node.set_values(values)?;
            Ok(true)
        }
        MarshalMethod::Object | MarshalMethod::Tuple => {
            let count = reader.read_i32()?;
            if count < 0 {
                return Ok(false);
            }
            match existing {
                Some(e) => node.adopt(e),
                None => node.ensure_constructed()?,
            }
            for _ in 0..count {
                let index = reader.read_u8()? as u16;
                let member = node.find_member(&MemberKey::Index(index))?.cloned();
                match member {
                    Some(m) if m.can_set() => {
                        let value = read_value(
                            registry,
                            config,
                            reader,
                            &m.value_type,
                            Some(&m),
                            m.nullable,
                            None,
                        )?;
                        node.set_child(&m, value)?;
                    }
                    Some(m) => match config.unknown_members {
                        UnknownMembers::Skip => {
                            skip_value(registry, reader, &m.value_type, Some(&m))?;
                        }
                        UnknownMembers::Error => {
                            return Err(Error::serialization(format!(
                                "member {} of {} cannot be set",
                                m.name,
                                node.accessor().key
                            )));
                        }
                    },
                    // The format is not self-describing: without at least a
                    // phantom shape for this index there is nothing to align
                    // the stream against.
                    None => {
                        return Err(Error::serialization(format!(
                            "unknown member index {index} on {}",
                            node.accessor().key
                        )));
                    }
                }
            }
            Ok(true)
        }
    }
}

fn read_scalar(reader: &mut Reader, kind: ScalarKind) -> Result<Scalar, Error> {
    let raw = match kind {
        ScalarKind::Bool
        | ScalarKind::I8
        | ScalarKind::I16
        | ScalarKind::I32
        | ScalarKind::U8
        | ScalarKind::U16
        | ScalarKind::U32
        | ScalarKind::Date => Scalar::I32(reader.read_i32()?),
        ScalarKind::I64 | ScalarKind::Timestamp => Scalar::I64(reader.read_i64()?),
        ScalarKind::U64 => Scalar::U64(reader.read_u64()?),
        ScalarKind::F32 => Scalar::F32(reader.read_f32()?),
        ScalarKind::F64 => Scalar::F64(reader.read_f64()?),
        ScalarKind::Str => Scalar::Str(read_str(reader)?),
    };
    raw.coerce(kind)
}

fn read_str(reader: &mut Reader) -> Result<String, Error> {
    let len = reader.read_i32()?;
    ensure!(
        len >= 0,
        Error::serialization(format!("negative string length {len}"))
    );
    let bytes = reader.read_bytes(len as usize)?;
    String::from_utf8(bytes.to_vec())
        .map_err(|_| Error::serialization("string payload is not valid UTF-8"))
}

/// Reads and discards one value of the declared shape, leaving the stream
/// aligned on the next record.
fn skip_value(
    registry: &Registry,
    reader: &mut Reader,
    declared: &TypeKey,
    member: Option<&MemberAccessor>,
) -> Result<(), Error> {
    match reader.read_u8()? {
        0 => return Ok(()),
        1 => {}
        other => {
            return Err(Error::serialization(format!("bad presence byte {other}")));
        }
    }
    let node = Node::empty(registry, declared, member, true)?;
    if node.is_dynamic() {
        let key = read_type_key(registry, reader)?;
        let inner = Node::empty(registry, &key, None, false)?;
        return skip_payload(registry, reader, &inner);
    }
    skip_payload(registry, reader, &node)
}

fn skip_payload(registry: &Registry, reader: &mut Reader, node: &Node) -> Result<(), Error> {
    match node.marshal() {
        MarshalMethod::Primitive => {
            match node.scalar_kind()? {
                ScalarKind::Str => {
                    read_str(reader)?;
                }
                ScalarKind::I64 | ScalarKind::U64 | ScalarKind::F64 | ScalarKind::Timestamp => {
                    reader.skip(8)?;
                }
                _ => reader.skip(4)?,
            }
            Ok(())
        }
        MarshalMethod::Blob => {
            let len = reader.read_i32()?;
            if len > 0 {
                reader.skip(len as usize)?;
            }
            Ok(())
        }
        MarshalMethod::Collection => {
            let count = reader.read_i32()?;
            let elem = node.collection_ops()?.elem.clone();
            for _ in 0..count.max(0) {
                skip_value(registry, reader, &elem, None)?;
            }
            Ok(())
        }
        MarshalMethod::Object | MarshalMethod::Tuple => {
            let count = reader.read_i32()?;
            for _ in 0..count.max(0) {
                let index = reader.read_u8()? as u16;
                let member = node
                    .find_member(&MemberKey::Index(index))?
                    .cloned()
                    .ok_or_else(|| {
                        Error::serialization(format!(
                            "unknown member index {index} on {} while skipping",
                            node.accessor().key
                        ))
                    })?;
                skip_value(registry, reader, &member.value_type, Some(&member))?;
            }
            Ok(())
        }
    }
}

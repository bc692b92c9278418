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

//! Protobuf-compatible wire format.
//!
//! Tag = `((member index + 1) << 3) | wire_type`. Integer primitives travel
//! as LEB128 varints (zig-zag for members flagged as explicitly signed),
//! floats as fixed 4/8-byte little-endian, strings/blobs/nested messages
//! length-prefixed. Collections are only valid as repeated fields of a
//! message, and repeated tags accumulate into the same member on read.
//! Unknown tags are skipped by wire type, so the format is forward
//! compatible by design.

use std::collections::HashMap;

use num_enum::TryFromPrimitive;

use crate::buffer::{Reader, Writer};
use crate::ensure;
use crate::error::Error;
use crate::model::{AnyValue, MemberAccessor, Registry};
use crate::node::Node;
use crate::types::{IntFormat, MarshalMethod, MemberKey, ScalarKind, TypeKey};
use crate::value::{days_from_date, millis_from_timestamp, Scalar};

use super::{ProtoConfig, UnknownMembers};

#[derive(Clone, Copy, Debug, PartialEq, Eq, TryFromPrimitive)]
#[repr(u8)]
enum WireType {
    VarInt = 0,
    Bit64 = 1,
    Length = 2,
    Bit32 = 5,
}

fn tag(index: u16, wire: WireType) -> u32 {
    ((index as u32 + 1) << 3) | wire as u32
}

pub fn to_proto(
    registry: &Registry,
    declared: &TypeKey,
    value: Option<AnyValue>,
    nullable: bool,
) -> Result<Vec<u8>, Error> {
    let node = Node::over(registry, declared, None, value, nullable)?;
    if node.is_null() {
        return Ok(Vec::new());
    }
    ensure_message(&node)?;
    let mut writer = Writer::default();
    write_message(registry, &mut writer, &node)?;
    Ok(writer.dump())
}

pub fn from_proto(
    registry: &Registry,
    config: &ProtoConfig,
    declared: &TypeKey,
    nullable: bool,
    bytes: &[u8],
    existing: Option<AnyValue>,
) -> Result<Option<AnyValue>, Error> {
    if bytes.is_empty() && nullable {
        return Ok(None);
    }
    let mut node = Node::empty(registry, declared, None, nullable)?;
    ensure_message(&node)?;
    let mut reader = Reader::new(bytes);
    read_message(registry, config, &mut reader, &mut node, bytes.len(), existing)?;
    node.into_value()
}

fn ensure_message(node: &Node) -> Result<(), Error> {
    if node.is_dynamic() || node.dynamic_key().is_some() {
        return Err(Error::serialization(
            "dynamic slots are not supported by the proto codec",
        ));
    }
    match node.marshal() {
        MarshalMethod::Object | MarshalMethod::Tuple => Ok(()),
        actual => Err(Error::serialization(format!(
            "{actual:?} values are not independently serializable as proto; only message types are"
        ))),
    }
}

fn write_message(registry: &Registry, writer: &mut Writer, node: &Node) -> Result<(), Error> {
    for member in node.object_members()?.iter() {
        if member.is_phantom() {
            continue;
        }
        let child = node.child(member)?;
        if child.is_null() {
            continue;
        }
        write_member(registry, writer, member, &child)?;
    }
    Ok(())
}

fn write_member(
    registry: &Registry,
    writer: &mut Writer,
    member: &MemberAccessor,
    child: &Node,
) -> Result<(), Error> {
    if child.dynamic_key().is_some() {
        return Err(Error::serialization(
            "dynamic slots are not supported by the proto codec",
        ));
    }
    match child.marshal() {
        MarshalMethod::Primitive => {
            write_scalar_field(writer, member, child.get_scalar()?)
        }
        MarshalMethod::Blob => {
            writer.write_varuint32(tag(member.index, WireType::Length));
            let bytes = child.blob_bytes()?;
            writer.write_varuint32(bytes.len() as u32);
            writer.write_bytes(&bytes);
            Ok(())
        }
        MarshalMethod::Object | MarshalMethod::Tuple => {
            writer.write_varuint32(tag(member.index, WireType::Length));
            write_nested(registry, writer, child)
        }
        MarshalMethod::Collection => {
            for elem in child.children()? {
                if elem.is_null() {
                    return Err(Error::serialization(format!(
                        "null element in repeated field {}; proto cannot encode it",
                        member.name
                    )));
                }
                match elem.marshal() {
                    MarshalMethod::Primitive => {
                        write_scalar_field(writer, member, elem.get_scalar()?)?;
                    }
                    MarshalMethod::Object | MarshalMethod::Tuple => {
                        writer.write_varuint32(tag(member.index, WireType::Length));
                        write_nested(registry, writer, &elem)?;
                    }
                    MarshalMethod::Blob => {
                        writer.write_varuint32(tag(member.index, WireType::Length));
                        let bytes = elem.blob_bytes()?;
                        writer.write_varuint32(bytes.len() as u32);
                        writer.write_bytes(&bytes);
                    }
                    MarshalMethod::Collection => {
                        return Err(Error::serialization(format!(
                            "nested repeated field {} is not representable as proto",
                            member.name
                        )));
                    }
                }
            }
            Ok(())
        }
    }
}

fn write_nested(registry: &Registry, writer: &mut Writer, node: &Node) -> Result<(), Error> {
    let mut nested = Writer::default();
    write_message(registry, &mut nested, node)?;
    let bytes = nested.dump();
    writer.write_varuint32(bytes.len() as u32);
    writer.write_bytes(&bytes);
    Ok(())
}

fn write_scalar_field(
    writer: &mut Writer,
    member: &MemberAccessor,
    scalar: Scalar,
) -> Result<(), Error> {
    match scalar {
        Scalar::F32(v) => {
            writer.write_varuint32(tag(member.index, WireType::Bit32));
            writer.write_f32(v);
        }
        Scalar::F64(v) => {
            writer.write_varuint32(tag(member.index, WireType::Bit64));
            writer.write_f64(v);
        }
        Scalar::Str(s) => {
            writer.write_varuint32(tag(member.index, WireType::Length));
            writer.write_varuint32(s.len() as u32);
            writer.write_bytes(s.as_bytes());
        }
        Scalar::U64(v) => {
            writer.write_varuint32(tag(member.index, WireType::VarInt));
            writer.write_varuint64(v);
        }
        Scalar::Date(d) => {
            writer.write_varuint32(tag(member.index, WireType::VarInt));
            write_int(writer, member.int_format, days_from_date(d));
        }
        Scalar::Timestamp(t) => {
            writer.write_varuint32(tag(member.index, WireType::VarInt));
            write_int(writer, member.int_format, millis_from_timestamp(t));
        }
        other => {
            writer.write_varuint32(tag(member.index, WireType::VarInt));
            write_int(writer, member.int_format, other.as_i64()?);
        }
    }
    Ok(())
}

fn write_int(writer: &mut Writer, format: IntFormat, value: i64) {
    match format {
        IntFormat::ZigZag => writer.write_varint64(value),
        IntFormat::Default => writer.write_varuint64(value as u64),
    }
}

fn read_message(
    registry: &Registry,
    config: &ProtoConfig,
    reader: &mut Reader,
    node: &mut Node,
    end: usize,
    existing: Option<AnyValue>,
) -> Result<(), Error> {
    match existing {
        Some(e) => node.adopt(e),
        None => node.ensure_constructed()?,
    }
    let mut repeated: HashMap<u16, Vec<Option<AnyValue>>> = HashMap::new();
    while reader.cursor() < end {
        let raw_tag = reader.read_varuint32()?;
        let field = raw_tag >> 3;
        ensure!(
            field >= 1,
            Error::serialization(format!("bad field number in tag {raw_tag:#x}"))
        );
        let index = (field - 1) as u16;
        let wire = WireType::try_from((raw_tag & 7) as u8).map_err(|_| {
            Error::serialization(format!("bad wire type in tag {raw_tag:#x}"))
        })?;
        let member = node.find_member(&MemberKey::Index(index))?.cloned();
        match member {
            Some(m) if m.can_set() => {
                let probe = Node::empty(registry, &m.value_type, Some(&m), m.nullable)?;
                if probe.marshal() == MarshalMethod::Collection {
                    let (elem, elem_nullable) = {
                        let ops = probe.collection_ops()?;
                        (ops.elem.clone(), ops.elem_nullable)
                    };
                    let value = read_field_value(
                        registry,
                        config,
                        reader,
                        wire,
                        &elem,
                        Some(&m),
                        elem_nullable,
                    )?;
                    repeated.entry(index).or_default().push(value);
                } else {
                    let value = read_field_value(
                        registry,
                        config,
                        reader,
                        wire,
                        &m.value_type,
                        Some(&m),
                        m.nullable,
                    )?;
                    node.set_child(&m, value)?;
                }
            }
            _ => match config.unknown_members {
                UnknownMembers::Skip => skip_field(reader, wire)?,
                UnknownMembers::Error => {
                    return Err(Error::serialization(format!(
                        "unknown field number {field} on {}",
                        node.accessor().key
                    )));
                }
            },
        }
    }
    ensure!(
        reader.cursor() == end,
        Error::serialization("message ran past its declared length")
    );
    for (index, values) in repeated {
        if let Some(m) = node.find_member(&MemberKey::Index(index))?.cloned() {
            let mut child = Node::empty(registry, &m.value_type, Some(&m), m.nullable)?;
            child.set_values(values)?;
            let value = child.into_value()?;
            node.set_child(&m, value)?;
        }
    }
    Ok(())
}

/// Reads one field payload. For repeated members this is called once per
/// tag occurrence with the element type; the caller accumulates.
fn read_field_value(
    registry: &Registry,
    config: &ProtoConfig,
    reader: &mut Reader,
    wire: WireType,
    declared: &TypeKey,
    member: Option<&MemberAccessor>,
    nullable: bool,
) -> Result<Option<AnyValue>, Error> {
    let mut node = Node::empty(registry, declared, member, nullable)?;
    if node.is_dynamic() {
        return Err(Error::serialization(
            "dynamic slots are not supported by the proto codec",
        ));
    }
    match node.marshal() {
        MarshalMethod::Primitive => {
            let kind = node.scalar_kind()?;
            let format = member.map(|m| m.int_format).unwrap_or_default();
            let scalar = read_scalar(reader, wire, kind, format)?;
            node.set_scalar(scalar)?;
        }
        MarshalMethod::Blob => {
            expect_wire(wire, WireType::Length)?;
            let len = reader.read_varuint32()? as usize;
            let bytes = reader.read_bytes(len)?.to_vec();
            node.set_blob(bytes)?;
        }
        MarshalMethod::Object | MarshalMethod::Tuple => {
            expect_wire(wire, WireType::Length)?;
            let len = reader.read_varuint32()? as usize;
            let end = reader.cursor() + len;
            read_message(registry, config, reader, &mut node, end, None)?;
        }
        MarshalMethod::Collection => {
            return Err(Error::serialization(
                "repeated field nested inside a repeated field",
            ));
        }
    }
    node.into_value()
}

fn expect_wire(actual: WireType, expected: WireType) -> Result<(), Error> {
    ensure!(
        actual == expected,
        Error::serialization(format!(
            "wire type mismatch: expected {expected:?}, found {actual:?}"
        ))
    );
    Ok(())
}

fn read_scalar(
    reader: &mut Reader,
    wire: WireType,
    kind: ScalarKind,
    format: IntFormat,
) -> Result<Scalar, Error> {
    match kind {
        ScalarKind::F32 => {
            expect_wire(wire, WireType::Bit32)?;
            Ok(Scalar::F32(reader.read_f32()?))
        }
        ScalarKind::F64 => {
            expect_wire(wire, WireType::Bit64)?;
            Ok(Scalar::F64(reader.read_f64()?))
        }
        ScalarKind::Str => {
            expect_wire(wire, WireType::Length)?;
            let len = reader.read_varuint32()? as usize;
            let bytes = reader.read_bytes(len)?;
            String::from_utf8(bytes.to_vec())
                .map(Scalar::Str)
                .map_err(|_| Error::serialization("string payload is not valid UTF-8"))
        }
        ScalarKind::U64 => {
            expect_wire(wire, WireType::VarInt)?;
            Ok(Scalar::U64(reader.read_varuint64()?))
        }
        _ => {
            expect_wire(wire, WireType::VarInt)?;
            let value = match format {
                IntFormat::ZigZag => reader.read_varint64()?,
                IntFormat::Default => reader.read_varuint64()? as i64,
            };
            Scalar::I64(value).coerce(kind)
        }
    }
}

fn skip_field(reader: &mut Reader, wire: WireType) -> Result<(), Error> {
    match wire {
        WireType::VarInt => {
            reader.read_varuint64()?;
            Ok(())
        }
        WireType::Bit64 => reader.skip(8),
        WireType::Bit32 => reader.skip(4),
        WireType::Length => {
            let len = reader.read_varuint32()? as usize;
            reader.skip(len)
        }
    }
}

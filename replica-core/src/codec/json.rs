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

//! Hand-rolled recursive-descent JSON reader/writer.
//!
//! The escape table is fixed (`\\`, `\"`, `\n`, `\t`); other escape
//! sequences pass through undecoded. `null` is accepted at any value
//! position and yields a null node regardless of the expected shape.
//! Numbers are scanned with the permissive class `[0-9.+-eE]` and parsed as
//! i64/u64/f64 depending on the target primitive.

use chrono::{NaiveDate, NaiveDateTime};

use crate::ensure;
use crate::error::Error;
use crate::model::{AnyValue, MemberAccessor, Registry};
use crate::node::{Node, Untyped};
use crate::types::{MarshalMethod, ScalarKind, TypeKey};
use crate::value::Scalar;

use super::{JsonConfig, UnknownMembers};

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIMESTAMP_WRITE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3f";
const TIMESTAMP_READ_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

pub fn to_json(
    registry: &Registry,
    config: &JsonConfig,
    declared: &TypeKey,
    value: Option<AnyValue>,
    nullable: bool,
) -> Result<String, Error> {
    let node = Node::over(registry, declared, None, value, nullable)?;
    let mut out = String::new();
    write_value(registry, config, &mut out, &node)?;
    Ok(out)
}

pub fn from_json(
    registry: &Registry,
    config: &JsonConfig,
    declared: &TypeKey,
    nullable: bool,
    input: &str,
    existing: Option<AnyValue>,
) -> Result<Option<AnyValue>, Error> {
    let mut scanner = Scanner::new(input.as_bytes());
    let value = read_value(
        registry,
        config,
        &mut scanner,
        declared,
        None,
        nullable,
        existing,
    )?;
    scanner.skip_ws();
    ensure!(
        scanner.at_end(),
        Error::serialization(format!(
            "trailing content at offset {}",
            scanner.position()
        ))
    );
    Ok(value)
}

/// Parses arbitrary JSON into the untyped tree, with no registry-known
/// target type; the tree infers its shape from the data.
pub fn parse_dynamic(input: &str) -> Result<Untyped, Error> {
    let mut scanner = Scanner::new(input.as_bytes());
    let value = read_untyped(&mut scanner)?;
    scanner.skip_ws();
    ensure!(
        scanner.at_end(),
        Error::serialization(format!(
            "trailing content at offset {}",
            scanner.position()
        ))
    );
    Ok(value)
}

fn member_wire_name(config: &JsonConfig, name: &str) -> String {
    if config.lower_case_names {
        name.to_lowercase()
    } else {
        name.to_owned()
    }
}

fn write_value(
    registry: &Registry,
    config: &JsonConfig,
    out: &mut String,
    node: &Node,
) -> Result<(), Error> {
    if node.is_null() {
        out.push_str("null");
        return Ok(());
    }
    if node.dynamic_key().is_some() {
        return Err(Error::serialization(
            "dynamic slots are not supported by the json codec",
        ));
    }
    match node.marshal() {
        MarshalMethod::Primitive => write_scalar(out, node.get_scalar()?),
        MarshalMethod::Blob => {
            let bytes = node.blob_bytes()?;
            out.push('[');
            for (i, b) in bytes.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                out.push_str(&b.to_string());
            }
            out.push(']');
            Ok(())
        }
        MarshalMethod::Collection | MarshalMethod::Tuple => {
            let children = match node.marshal() {
                MarshalMethod::Collection => node.children()?,
                _ => node
                    .object_members()?
                    .to_vec()
                    .iter()
                    .map(|m| node.child(m))
                    .collect::<Result<Vec<_>, Error>>()?,
            };
            out.push('[');
            for (i, child) in children.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                write_value(registry, config, out, child)?;
            }
            out.push(']');
            Ok(())
        }
        MarshalMethod::Object => {
            out.push('{');
            let mut first = true;
            for member in node.object_members()?.to_vec().iter() {
                if member.is_phantom() {
                    continue;
                }
                if !first {
                    out.push_str(", ");
                }
                first = false;
                write_string(out, &member_wire_name(config, &member.name));
                out.push_str(": ");
                let child = node.child(member)?;
                write_value(registry, config, out, &child)?;
            }
            out.push('}');
            Ok(())
        }
    }
}

fn write_scalar(out: &mut String, scalar: Scalar) -> Result<(), Error> {
    match scalar {
        Scalar::Bool(v) => out.push_str(if v { "true" } else { "false" }),
        Scalar::I8(v) => out.push_str(&v.to_string()),
        Scalar::I16(v) => out.push_str(&v.to_string()),
        Scalar::I32(v) => out.push_str(&v.to_string()),
        Scalar::I64(v) => out.push_str(&v.to_string()),
        Scalar::U8(v) => out.push_str(&v.to_string()),
        Scalar::U16(v) => out.push_str(&v.to_string()),
        Scalar::U32(v) => out.push_str(&v.to_string()),
        Scalar::U64(v) => out.push_str(&v.to_string()),
        Scalar::F32(v) => out.push_str(&v.to_string()),
        Scalar::F64(v) => out.push_str(&v.to_string()),
        Scalar::Str(s) => write_string(out, &s),
        Scalar::Date(d) => write_string(out, &d.format(DATE_FORMAT).to_string()),
        Scalar::Timestamp(t) => write_string(out, &t.format(TIMESTAMP_WRITE_FORMAT).to_string()),
    }
    Ok(())
}

fn write_string(out: &mut String, s: &str) {
    out.push('"');
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            other => out.push(other),
        }
    }
    out.push('"');
}

struct Scanner<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Scanner<'a> {
    fn new(bytes: &'a [u8]) -> Scanner<'a> {
        Scanner { bytes, pos: 0 }
    }

    fn position(&self) -> usize {
        self.pos
    }

    fn at_end(&self) -> bool {
        self.pos >= self.bytes.len()
    }

    fn skip_ws(&mut self) {
        while self
            .bytes
            .get(self.pos)
            .is_some_and(|b| matches!(b, b' ' | b'\t' | b'\n' | b'\r'))
        {
            self.pos += 1;
        }
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn next_byte(&mut self) -> Result<u8, Error> {
        let b = self
            .peek()
            .ok_or_else(|| Error::serialization("unexpected end of input"))?;
        self.pos += 1;
        Ok(b)
    }

    fn expect(&mut self, expected: u8) -> Result<(), Error> {
        self.skip_ws();
        let b = self.next_byte()?;
        ensure!(
            b == expected,
            Error::serialization(format!(
                "expected {:?} at offset {}, found {:?}",
                expected as char,
                self.pos - 1,
                b as char
            ))
        );
        Ok(())
    }

    /// Consumes the literal when it is next in the input.
    fn try_literal(&mut self, literal: &str) -> bool {
        self.skip_ws();
        if self.bytes[self.pos..].starts_with(literal.as_bytes()) {
            self.pos += literal.len();
            true
        } else {
            false
        }
    }

    fn read_string(&mut self) -> Result<String, Error> {
        self.expect(b'"')?;
        let mut out = String::new();
        loop {
            let b = self.next_byte()?;
            match b {
                b'"' => return Ok(out),
                b'\\' => {
                    let escaped = self.next_byte()?;
                    match escaped {
                        b'\\' => out.push('\\'),
                        b'"' => out.push('"'),
                        b'n' => out.push('\n'),
                        b't' => out.push('\t'),
                        // outside the fixed table escapes pass through
                        // undecoded
                        other => {
                            out.push('\\');
                            out.push(other as char);
                        }
                    }
                }
                _ => {
                    // re-scan from the byte we already consumed so multi-byte
                    // UTF-8 sequences stay intact
                    let start = self.pos - 1;
                    while self
                        .bytes
                        .get(self.pos)
                        .is_some_and(|b| !matches!(b, b'"' | b'\\'))
                    {
                        self.pos += 1;
                    }
                    let chunk = std::str::from_utf8(&self.bytes[start..self.pos])
                        .map_err(|_| Error::serialization("string is not valid UTF-8"))?;
                    out.push_str(chunk);
                }
            }
        }
    }

    fn read_number_token(&mut self) -> Result<&'a str, Error> {
        self.skip_ws();
        let start = self.pos;
        while self
            .bytes
            .get(self.pos)
            .is_some_and(|b| matches!(b, b'0'..=b'9' | b'.' | b'+' | b'-' | b'e' | b'E'))
        {
            self.pos += 1;
        }
        ensure!(
            self.pos > start,
            Error::serialization(format!("expected a number at offset {start}"))
        );
        std::str::from_utf8(&self.bytes[start..self.pos])
            .map_err(|_| Error::serialization("number token is not valid UTF-8"))
    }
}

fn read_value(
    registry: &Registry,
    config: &JsonConfig,
    scanner: &mut Scanner,
    declared: &TypeKey,
    member: Option<&MemberAccessor>,
    nullable: bool,
    existing: Option<AnyValue>,
) -> Result<Option<AnyValue>, Error> {
    if scanner.try_literal("null") {
        return Ok(None);
    }
    let mut node = Node::empty(registry, declared, member, nullable)?;
    if node.is_dynamic() {
        return Err(Error::serialization(
            "dynamic slots are not supported by the json codec",
        ));
    }
    match node.marshal() {
        MarshalMethod::Primitive => {
            let kind = node.scalar_kind()?;
            let scalar = read_scalar(scanner, kind)?;
            node.set_scalar(scalar)?;
        }
        MarshalMethod::Blob => {
            scanner.expect(b'[')?;
            let mut bytes = Vec::new();
            scanner.skip_ws();
            if scanner.peek() == Some(b']') {
                scanner.pos += 1;
            } else {
                loop {
                    let token = scanner.read_number_token()?;
                    let v: i64 = token.parse().map_err(|_| {
                        Error::serialization(format!("bad byte value {token:?}"))
                    })?;
                    bytes.push(v as u8);
                    scanner.skip_ws();
                    match scanner.next_byte()? {
                        b',' => continue,
                        b']' => break,
                        other => {
                            return Err(Error::serialization(format!(
                                "expected ',' or ']' in byte array, found {:?}",
                                other as char
                            )));
                        }
                    }
                }
            }
            node.set_blob(bytes)?;
        }
        MarshalMethod::Collection => {
            let (elem, elem_nullable) = {
                let ops = node.collection_ops()?;
                (ops.elem.clone(), ops.elem_nullable)
            };
            scanner.expect(b'[')?;
            let mut values = Vec::new();
            scanner.skip_ws();
            if scanner.peek() == Some(b']') {
                scanner.pos += 1;
            } else {
                loop {
                    values.push(read_value(
                        registry,
                        config,
                        scanner,
                        &elem,
                        None,
                        elem_nullable,
                        None,
                    )?);
                    scanner.skip_ws();
                    match scanner.next_byte()? {
                        b',' => continue,
                        b']' => break,
                        other => {
                            return Err(Error::serialization(format!(
                                "expected ',' or ']' in array, found {:?}",
                                other as char
                            )));
                        }
                    }
                }
            }
            node.set_values(values)?;
        }
        MarshalMethod::Tuple => {
            let members: Vec<_> = node.object_members()?.to_vec();
            match existing {
                Some(e) => node.adopt(e),
                None => node.ensure_constructed()?,
            }
            scanner.expect(b'[')?;
            for (i, m) in members.iter().enumerate() {
                if i > 0 {
                    scanner.expect(b',')?;
                }
                let value = read_value(
                    registry,
                    config,
                    scanner,
                    &m.value_type,
                    Some(m),
                    m.nullable,
                    None,
                )?;
                node.set_child(m, value)?;
            }
            scanner.expect(b']')?;
        }
        MarshalMethod::Object => {
            match existing {
                Some(e) => node.adopt(e),
                None => node.ensure_constructed()?,
            }
            scanner.expect(b'{')?;
            scanner.skip_ws();
            if scanner.peek() == Some(b'}') {
                scanner.pos += 1;
            } else {
                loop {
                    scanner.skip_ws();
                    let name = scanner.read_string()?;
                    scanner.expect(b':')?;
                    let member = lookup_member(config, &node, &name).cloned();
                    match member {
                        Some(m) if m.can_set() => {
                            let value = read_value(
                                registry,
                                config,
                                scanner,
                                &m.value_type,
                                Some(&m),
                                m.nullable,
                                None,
                            )?;
                            node.set_child(&m, value)?;
                        }
                        _ => match config.unknown_members {
                            UnknownMembers::Skip => skip_json_value(scanner)?,
                            UnknownMembers::Error => {
                                return Err(Error::serialization(format!(
                                    "unknown member name {name:?} on {}",
                                    node.accessor().key
                                )));
                            }
                        },
                    }
                    scanner.skip_ws();
                    match scanner.next_byte()? {
                        b',' => continue,
                        b'}' => break,
                        other => {
                            return Err(Error::serialization(format!(
                                "expected ',' or '}}' in object, found {:?}",
                                other as char
                            )));
                        }
                    }
                }
            }
        }
    }
    node.into_value()
}

fn lookup_member<'n, 'r>(
    config: &JsonConfig,
    node: &'n Node<'r>,
    name: &str,
) -> Option<&'n std::sync::Arc<MemberAccessor>> {
    if config.lower_case_names {
        let lowered = name.to_lowercase();
        node.accessor()
            .members()
            .iter()
            .find(|m| m.name.to_lowercase() == lowered)
    } else {
        node.accessor().member_by_name(name)
    }
}

fn read_scalar(scanner: &mut Scanner, kind: ScalarKind) -> Result<Scalar, Error> {
    match kind {
        ScalarKind::Str => Ok(Scalar::Str(scanner.read_string()?)),
        ScalarKind::Bool => {
            if scanner.try_literal("true") {
                Ok(Scalar::Bool(true))
            } else if scanner.try_literal("false") {
                Ok(Scalar::Bool(false))
            } else {
                Err(Error::serialization(format!(
                    "expected a boolean at offset {}",
                    scanner.position()
                )))
            }
        }
        ScalarKind::Date => {
            let s = scanner.read_string()?;
            NaiveDate::parse_from_str(&s, DATE_FORMAT)
                .map(Scalar::Date)
                .map_err(|_| Error::serialization(format!("bad date literal {s:?}")))
        }
        ScalarKind::Timestamp => {
            let s = scanner.read_string()?;
            NaiveDateTime::parse_from_str(&s, TIMESTAMP_READ_FORMAT)
                .map(Scalar::Timestamp)
                .map_err(|_| Error::serialization(format!("bad timestamp literal {s:?}")))
        }
        ScalarKind::F32 | ScalarKind::F64 => {
            let token = scanner.read_number_token()?;
            let v: f64 = token
                .parse()
                .map_err(|_| Error::serialization(format!("bad number {token:?}")))?;
            Scalar::F64(v).coerce(kind)
        }
        ScalarKind::U64 => {
            let token = scanner.read_number_token()?;
            let v: u64 = token
                .parse()
                .map_err(|_| Error::serialization(format!("bad number {token:?}")))?;
            Ok(Scalar::U64(v))
        }
        _ => {
            let token = scanner.read_number_token()?;
            let v: i64 = token
                .parse()
                .map_err(|_| Error::serialization(format!("bad number {token:?}")))?;
            Scalar::I64(v).coerce(kind)
        }
    }
}

/// Reads and discards one complete JSON value.
fn skip_json_value(scanner: &mut Scanner) -> Result<(), Error> {
    if scanner.try_literal("null")
        || scanner.try_literal("true")
        || scanner.try_literal("false")
    {
        return Ok(());
    }
    scanner.skip_ws();
    match scanner.peek() {
        Some(b'"') => {
            scanner.read_string()?;
            Ok(())
        }
        Some(b'[') => {
            scanner.pos += 1;
            scanner.skip_ws();
            if scanner.peek() == Some(b']') {
                scanner.pos += 1;
                return Ok(());
            }
            loop {
                skip_json_value(scanner)?;
                scanner.skip_ws();
                match scanner.next_byte()? {
                    b',' => continue,
                    b']' => return Ok(()),
                    other => {
                        return Err(Error::serialization(format!(
                            "expected ',' or ']' in array, found {:?}",
                            other as char
                        )));
                    }
                }
            }
        }
        Some(b'{') => {
            scanner.pos += 1;
            scanner.skip_ws();
            if scanner.peek() == Some(b'}') {
                scanner.pos += 1;
                return Ok(());
            }
            loop {
                scanner.skip_ws();
                scanner.read_string()?;
                scanner.expect(b':')?;
                skip_json_value(scanner)?;
                scanner.skip_ws();
                match scanner.next_byte()? {
                    b',' => continue,
                    b'}' => return Ok(()),
                    other => {
                        return Err(Error::serialization(format!(
                            "expected ',' or '}}' in object, found {:?}",
                            other as char
                        )));
                    }
                }
            }
        }
        _ => {
            scanner.read_number_token()?;
            Ok(())
        }
    }
}

fn read_untyped(scanner: &mut Scanner) -> Result<Untyped, Error> {
    if scanner.try_literal("null") {
        return Ok(Untyped::Null);
    }
    if scanner.try_literal("true") {
        return Ok(Untyped::Bool(true));
    }
    if scanner.try_literal("false") {
        return Ok(Untyped::Bool(false));
    }
    scanner.skip_ws();
    match scanner.peek() {
        Some(b'"') => Ok(Untyped::Str(scanner.read_string()?)),
        Some(b'[') => {
            scanner.pos += 1;
            let mut items = Vec::new();
            scanner.skip_ws();
            if scanner.peek() == Some(b']') {
                scanner.pos += 1;
                return Ok(Untyped::Array(items));
            }
            loop {
                items.push(read_untyped(scanner)?);
                scanner.skip_ws();
                match scanner.next_byte()? {
                    b',' => continue,
                    b']' => return Ok(Untyped::Array(items)),
                    other => {
                        return Err(Error::serialization(format!(
                            "expected ',' or ']' in array, found {:?}",
                            other as char
                        )));
                    }
                }
            }
        }
        Some(b'{') => {
            scanner.pos += 1;
            let mut members = Vec::new();
            scanner.skip_ws();
            if scanner.peek() == Some(b'}') {
                scanner.pos += 1;
                return Ok(Untyped::Object(members));
            }
            loop {
                scanner.skip_ws();
                let name = scanner.read_string()?;
                scanner.expect(b':')?;
                members.push((name, read_untyped(scanner)?));
                scanner.skip_ws();
                match scanner.next_byte()? {
                    b',' => continue,
                    b'}' => return Ok(Untyped::Object(members)),
                    other => {
                        return Err(Error::serialization(format!(
                            "expected ',' or '}}' in object, found {:?}",
                            other as char
                        )));
                    }
                }
            }
        }
        _ => {
            let token = scanner.read_number_token()?;
            if token.contains(['.', 'e', 'E']) {
                token
                    .parse::<f64>()
                    .map(Untyped::Float)
                    .map_err(|_| Error::serialization(format!("bad number {token:?}")))
            } else {
                token
                    .parse::<i64>()
                    .map(Untyped::Int)
                    .map_err(|_| Error::serialization(format!("bad number {token:?}")))
            }
        }
    }
}

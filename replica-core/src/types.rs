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

use std::borrow::Cow;
use std::fmt;

use num_enum::{IntoPrimitive, TryFromPrimitive};

use crate::error::Error;

/// Wire-stable identity of a registered type: a library-string name with
/// recursively represented generic arguments, or a compact numeric alias
/// assigned at registration time.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TypeKey {
    Named {
        name: Cow<'static, str>,
        args: Vec<TypeKey>,
    },
    Index(u32),
}

impl TypeKey {
    pub fn named(name: impl Into<Cow<'static, str>>) -> TypeKey {
        TypeKey::Named {
            name: name.into(),
            args: Vec::new(),
        }
    }

    pub fn generic(name: impl Into<Cow<'static, str>>, args: Vec<TypeKey>) -> TypeKey {
        TypeKey::Named {
            name: name.into(),
            args,
        }
    }

    pub fn index(id: u32) -> TypeKey {
        TypeKey::Index(id)
    }

    /// Canonical rendering, e.g. `Holder<Vec<i32>>`. This is the wire form
    /// used by polymorphic slots when no compact index is assigned.
    pub fn render(&self) -> String {
        let mut out = String::new();
        self.render_into(&mut out);
        out
    }

    fn render_into(&self, out: &mut String) {
        match self {
            TypeKey::Named { name, args } => {
                out.push_str(name);
                if !args.is_empty() {
                    out.push('<');
                    for (i, arg) in args.iter().enumerate() {
                        if i > 0 {
                            out.push_str(", ");
                        }
                        arg.render_into(out);
                    }
                    out.push('>');
                }
            }
            TypeKey::Index(id) => {
                out.push('#');
                out.push_str(&id.to_string());
            }
        }
    }

    /// Parses the canonical rendering back into a key.
    pub fn parse(s: &str) -> Result<TypeKey, Error> {
        let mut parser = KeyParser { s, pos: 0 };
        let key = parser.parse_key()?;
        parser.skip_spaces();
        if parser.pos != s.len() {
            return Err(Error::serialization(format!(
                "trailing content in type key: {s:?}"
            )));
        }
        Ok(key)
    }
}

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

struct KeyParser<'a> {
    s: &'a str,
    pos: usize,
}

impl KeyParser<'_> {
    fn skip_spaces(&mut self) {
        while self.s[self.pos..].starts_with(' ') {
            self.pos += 1;
        }
    }

    fn parse_key(&mut self) -> Result<TypeKey, Error> {
        self.skip_spaces();
        if self.s[self.pos..].starts_with('#') {
            self.pos += 1;
            let start = self.pos;
            while self
                .s
                .as_bytes()
                .get(self.pos)
                .is_some_and(|b| b.is_ascii_digit())
            {
                self.pos += 1;
            }
            let id: u32 = self.s[start..self.pos]
                .parse()
                .map_err(|_| Error::serialization("bad index in type key"))?;
            return Ok(TypeKey::Index(id));
        }
        let start = self.pos;
        while self
            .s
            .as_bytes()
            .get(self.pos)
            .is_some_and(|b| !matches!(b, b'<' | b'>' | b','))
        {
            self.pos += 1;
        }
        let name = self.s[start..self.pos].trim();
        if name.is_empty() {
            return Err(Error::serialization(format!(
                "empty name in type key: {:?}",
                self.s
            )));
        }
        let name = name.to_owned();
        let mut args = Vec::new();
        if self.s[self.pos..].starts_with('<') {
            self.pos += 1;
            loop {
                args.push(self.parse_key()?);
                self.skip_spaces();
                match self.s.as_bytes().get(self.pos) {
                    Some(b',') => self.pos += 1,
                    Some(b'>') => {
                        self.pos += 1;
                        break;
                    }
                    _ => return Err(Error::serialization("unterminated type key arguments")),
                }
            }
        }
        Ok(TypeKey::Named {
            name: Cow::Owned(name),
            args,
        })
    }
}

/// Identifies one member of a type, by declaration order or by name. Both
/// forms are unique within a type and interconvertible through its accessor.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MemberKey {
    Index(u16),
    Name(String),
}

/// Structural classification of a registered type. Drives which codec path a
/// node takes; fixed before traversal enters a value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MarshalMethod {
    Primitive,
    Object,
    Collection,
    Tuple,
    Blob,
}

/// Tag of a raw scalar carried by a primitive node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, TryFromPrimitive, IntoPrimitive)]
#[repr(u8)]
pub enum ScalarKind {
    Bool = 0,
    I8 = 1,
    I16 = 2,
    I32 = 3,
    I64 = 4,
    U8 = 5,
    U16 = 6,
    U32 = 7,
    U64 = 8,
    F32 = 9,
    F64 = 10,
    Str = 11,
    Date = 12,
    Timestamp = 13,
}

impl ScalarKind {
    pub fn is_integer(self) -> bool {
        matches!(
            self,
            ScalarKind::I8
                | ScalarKind::I16
                | ScalarKind::I32
                | ScalarKind::I64
                | ScalarKind::U8
                | ScalarKind::U16
                | ScalarKind::U32
                | ScalarKind::U64
        )
    }
}

/// Integer wire format of a member under the proto codec.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum IntFormat {
    #[default]
    Default,
    ZigZag,
}

/// Which members are auto-included when compiling a type's member table.
/// Explicitly tagged members are always included; ignored members never are.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AutoMembers {
    None,
    AllPublic,
    #[default]
    All,
}

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

//! # Replica
//!
//! Cross-format object serialization driven by a single declarative type
//! model. One registration makes a type serializable to three structurally
//! different wire encodings:
//!
//! - a length-prefixed **binary** format with presence bytes and byte member
//!   indices, bit-exact for interop between independently built endpoints
//! - a hand-rolled **JSON** reader/writer matching members by name
//! - a protobuf-compatible **proto** format with varint/zig-zag integers and
//!   length-prefixed nested messages
//!
//! The type model handles flattened inheritance, generics, nullability
//! through `Option`, surrogate substitution (one type transparently carried
//! as another on the wire), dictionaries, and polymorphic slots, all from
//! one `#[derive(Replicate)]` schema. Round-trip fidelity is the core
//! contract: bytes in, identical object out.
//!
//! ## Getting started
//!
//! ```rust
//! use replica::{Replica, Replicate};
//!
//! #[derive(Replicate, Clone, Default, Debug, PartialEq)]
//! struct Address {
//!     street: String,
//!     city: String,
//! }
//!
//! #[derive(Replicate, Clone, Default, Debug, PartialEq)]
//! struct Person {
//!     name: String,
//!     age: i32,
//!     address: Address,
//!     hobbies: Vec<String>,
//! }
//!
//! # fn main() -> Result<(), replica::Error> {
//! let mut replica = Replica::new();
//! replica.register::<Person>()?;
//!
//! let person = Person {
//!     name: "Ada".to_string(),
//!     age: 36,
//!     address: Address {
//!         street: "12 Crescent".to_string(),
//!         city: "London".to_string(),
//!     },
//!     hobbies: vec!["chess".to_string(), "telescopes".to_string()],
//! };
//!
//! let bytes = replica.to_bytes(&person)?;
//! let back: Person = replica.from_bytes(&bytes)?;
//! assert_eq!(person, back);
//!
//! let json = replica.to_json(&person)?;
//! let back: Person = replica.from_json(&json)?;
//! assert_eq!(person, back);
//!
//! let proto = replica.to_proto(&person)?;
//! let back: Person = replica.from_proto(&proto)?;
//! assert_eq!(person, back);
//! # Ok(())
//! # }
//! ```
//!
//! Registration takes `&mut self` and happens once, up front; a populated
//! [`Replica`] is read-only and safe to share across threads for parallel
//! serialization of independent buffers.

pub use replica_core::codec::UnknownMembers;
pub use replica_core::dynamic::Dynamic;
pub use replica_core::error::Error;
pub use replica_core::model::{
    MapEntry, MemberSchema, Registry, Replicated, TypeAccessor, TypeSchema,
};
pub use replica_core::node::Untyped;
pub use replica_core::replica::Replica;
pub use replica_core::types::{MarshalMethod, MemberKey, TypeKey};
pub use replica_derive::Replicate;

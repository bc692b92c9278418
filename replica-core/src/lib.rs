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

//! # Replica Core
//!
//! Core of the replica serialization framework: one declarative type model
//! drives three wire encodings (length-prefixed binary, JSON, and a
//! protobuf-compatible varint format).
//!
//! ## Architecture
//!
//! - **`replica`**: the [`replica::Replica`] context — registry plus per-codec
//!   configuration and the serialize/deserialize entry points
//! - **`model`**: type registry, per-type descriptors, compiled accessors and
//!   surrogate resolution
//! - **`node`**: the uniform primitive/object/collection traversal view that
//!   all codecs walk
//! - **`codec`**: the three wire formats, written purely against the node
//!   abstraction
//! - **`buffer`**: little-endian Writer/Reader pair with varint support
//! - **`dynamic`**: the polymorphic slot carrying a runtime type key
//! - **`types`**: type/member keys and the wire classification enums
//! - **`value`**: the raw scalar moved between accessors and codecs
//! - **`error`**: the shared error type
//!
//! ## Usage
//!
//! This crate is typically used through the higher-level `replica` crate,
//! which re-exports the public API together with the `Replicate` derive
//! macro. Construct a [`replica::Replica`], register your types, then
//! serialize with any of the three codecs:
//!
//! ```rust, ignore
//! let mut replica = Replica::new();
//! replica.register::<MyData>()?;
//! let bytes = replica.to_bytes(&data)?;
//! let json = replica.to_json(&data)?;
//! let proto = replica.to_proto(&data)?;
//! ```
//!
//! Registration takes `&mut self`; once the registry is populated, every
//! serialize/deserialize call is read-only with respect to it and safe to
//! run fully in parallel.

pub mod buffer;
pub mod codec;
pub mod dynamic;
pub mod error;
pub mod model;
pub mod node;
pub mod replica;
pub mod types;
pub mod value;

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

//! # Replica Derive Macros
//!
//! This crate provides the `#[derive(Replicate)]` macro for the replica
//! serialization framework. The macro generates the declarative schema a
//! `Registry` compiles into accessors: a member table with bound
//! getter/setter closures for structs, and an integer-normalized primitive
//! registration for unit-variant enums. All member access is resolved at
//! compile time; there is no runtime reflection.
//!
//! ## Supported shapes
//!
//! - Structs with named fields (fields must themselves be `Replicated`)
//! - Unit structs
//! - Enums whose variants are all unit variants, with optional explicit
//!   integer discriminants
//!
//! Derived types must also be `Clone` and `Default`; the `Replicated` trait
//! bounds enforce this at compile time, so a member whose type lacks the
//! derive fails the build instead of drifting out of the schema.
//!
//! ## Attributes
//!
//! Type level:
//!
//! - `#[replica(name = "WireName")]` — wire name of the type key
//! - `#[replica(members = "all" | "public" | "none")]` — which fields are
//!   auto-included (default `all`)
//!
//! Field level:
//!
//! - `#[replica(name = "WireName")]` — wire name of the member
//! - `#[replica(include)]` / `#[replica(ignore)]` — override the policy
//! - `#[replica(base)]` — splice this object-typed field's members into the
//!   owning type's member table (flattened inheritance)
//! - `#[replica(zigzag)]` — zig-zag varint encoding under the proto codec
//! - `#[replica(surrogate = "SomeType")]` — member-level wire stand-in,
//!   taking precedence over any type-level surrogate
//!
//! ## Example
//!
//! ```rust
//! use replica_core::replica::Replica;
//! use replica_derive::Replicate;
//!
//! #[derive(Replicate, Clone, Default, Debug, PartialEq)]
//! struct Person {
//!     name: String,
//!     age: i32,
//!     hobbies: Vec<String>,
//! }
//!
//! let mut replica = Replica::new();
//! replica.register::<Person>().unwrap();
//!
//! let person = Person {
//!     name: "Ada".to_string(),
//!     age: 36,
//!     hobbies: vec!["chess".to_string()],
//! };
//! let bytes = replica.to_bytes(&person).unwrap();
//! let back: Person = replica.from_bytes(&bytes).unwrap();
//! assert_eq!(person, back);
//! ```

use proc_macro::TokenStream;
use syn::{parse_macro_input, Data, DeriveInput};

mod attrs;
mod enum_;
mod object;

/// Derive macro generating the declarative serialization schema for a type.
///
/// Implements `Replicated` for the annotated struct or unit-variant enum:
/// `type_key()` names the type on the wire and `ensure_registered()`
/// idempotently registers the type, everything reachable from its member
/// table, and the member accessors themselves.
#[proc_macro_derive(Replicate, attributes(replica))]
pub fn derive_replicate(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

fn expand(input: &DeriveInput) -> syn::Result<proc_macro2::TokenStream> {
    let type_attrs = attrs::parse_type_attrs(&input.attrs)?;
    match &input.data {
        Data::Struct(data) => object::derive_struct(input, data, &type_attrs),
        Data::Enum(data) => enum_::derive_enum(input, data, &type_attrs),
        Data::Union(_) => Err(syn::Error::new_spanned(
            &input.ident,
            "Replicate cannot be derived for unions",
        )),
    }
}

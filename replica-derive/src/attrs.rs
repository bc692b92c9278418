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

//! Parsing of `#[replica(...)]` attributes.
//!
//! Type level: `name = "WireName"`, `members = "all" | "public" | "none"`.
//! Field level: `name = "WireName"`, `include`, `ignore`, `base`, `zigzag`,
//! `surrogate = "SomeType"`.

use syn::spanned::Spanned;
use syn::{Attribute, Field, Type, Visibility};

/// Which fields are auto-included when no explicit tag says otherwise.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MembersPolicy {
    None,
    AllPublic,
    #[default]
    All,
}

#[derive(Default)]
pub struct TypeAttrs {
    pub name: Option<String>,
    pub members: MembersPolicy,
}

pub fn parse_type_attrs(attrs: &[Attribute]) -> syn::Result<TypeAttrs> {
    let mut out = TypeAttrs::default();
    for attr in attrs {
        if !attr.path().is_ident("replica") {
            continue;
        }
        attr.parse_nested_meta(|nested| {
            if nested.path.is_ident("name") {
                let lit: syn::LitStr = nested.value()?.parse()?;
                out.name = Some(lit.value());
            } else if nested.path.is_ident("members") {
                let lit: syn::LitStr = nested.value()?.parse()?;
                out.members = match lit.value().as_str() {
                    "none" => MembersPolicy::None,
                    "public" => MembersPolicy::AllPublic,
                    "all" => MembersPolicy::All,
                    other => {
                        return Err(syn::Error::new(
                            lit.span(),
                            format!("unknown members policy {other:?}; expected \"all\", \"public\" or \"none\""),
                        ));
                    }
                };
            } else {
                return Err(syn::Error::new(
                    nested.path.span(),
                    "unknown replica attribute; expected `name` or `members`",
                ));
            }
            Ok(())
        })?;
    }
    Ok(out)
}

#[derive(Default)]
pub struct FieldAttrs {
    pub name: Option<String>,
    pub include: bool,
    pub ignore: bool,
    pub base: bool,
    pub zigzag: bool,
    pub surrogate: Option<Type>,
}

pub fn parse_field_attrs(field: &Field) -> syn::Result<FieldAttrs> {
    let mut out = FieldAttrs::default();
    for attr in &field.attrs {
        if !attr.path().is_ident("replica") {
            continue;
        }
        attr.parse_nested_meta(|nested| {
            if nested.path.is_ident("name") {
                let lit: syn::LitStr = nested.value()?.parse()?;
                out.name = Some(lit.value());
            } else if nested.path.is_ident("include") {
                out.include = true;
            } else if nested.path.is_ident("ignore") {
                out.ignore = true;
            } else if nested.path.is_ident("base") {
                out.base = true;
            } else if nested.path.is_ident("zigzag") {
                out.zigzag = true;
            } else if nested.path.is_ident("surrogate") {
                let lit: syn::LitStr = nested.value()?.parse()?;
                out.surrogate = Some(lit.parse()?);
            } else {
                return Err(syn::Error::new(
                    nested.path.span(),
                    "unknown replica attribute; expected `name`, `include`, `ignore`, `base`, `zigzag` or `surrogate`",
                ));
            }
            Ok(())
        })?;
    }
    if out.include && out.ignore {
        return Err(syn::Error::new(
            field.span(),
            "a field cannot be both `include` and `ignore`",
        ));
    }
    Ok(out)
}

/// Inclusion decision for one field: explicit tags win, then the type's
/// auto-member policy applies.
pub fn is_included(policy: MembersPolicy, attrs: &FieldAttrs, vis: &Visibility) -> bool {
    if attrs.ignore {
        return false;
    }
    if attrs.include || attrs.base {
        return true;
    }
    match policy {
        MembersPolicy::All => true,
        MembersPolicy::AllPublic => matches!(vis, Visibility::Public(_)),
        MembersPolicy::None => false,
    }
}

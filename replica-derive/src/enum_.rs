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

//! Codegen for unit-variant enums: registered as a primitive normalized to
//! its underlying integer kind. Explicit discriminants are honored,
//! otherwise declaration order assigns them; an unknown discriminant on read
//! is a serialization error.

use proc_macro2::TokenStream;
use quote::quote;
use syn::spanned::Spanned;
use syn::{DataEnum, DeriveInput, Expr, Fields, Lit, UnOp};

use crate::attrs::TypeAttrs;

fn discriminant_value(expr: &Expr) -> syn::Result<i32> {
    match expr {
        Expr::Lit(lit) => match &lit.lit {
            Lit::Int(int) => int.base10_parse::<i32>(),
            other => Err(syn::Error::new(
                other.span(),
                "enum discriminant must be an integer literal",
            )),
        },
        Expr::Unary(unary) if matches!(unary.op, UnOp::Neg(_)) => {
            Ok(-discriminant_value(&unary.expr)?)
        }
        other => Err(syn::Error::new(
            other.span(),
            "enum discriminant must be an integer literal",
        )),
    }
}

pub fn derive_enum(
    input: &DeriveInput,
    data: &DataEnum,
    type_attrs: &TypeAttrs,
) -> syn::Result<TokenStream> {
    let ident = &input.ident;
    if !input.generics.params.is_empty() {
        return Err(syn::Error::new(
            input.generics.span(),
            "Replicate enums cannot be generic",
        ));
    }
    let type_name = type_attrs.name.clone().unwrap_or_else(|| ident.to_string());

    let mut idents = Vec::new();
    let mut values = Vec::new();
    let mut next = 0i32;
    for variant in &data.variants {
        if !matches!(variant.fields, Fields::Unit) {
            return Err(syn::Error::new(
                variant.span(),
                "Replicate supports unit enum variants only",
            ));
        }
        if let Some((_, expr)) = &variant.discriminant {
            next = discriminant_value(expr)?;
        }
        idents.push(variant.ident.clone());
        values.push(next);
        next += 1;
    }
    let values_i64: Vec<i64> = values.iter().map(|v| *v as i64).collect();

    let not_backing = format!("backing value is not a {type_name}");
    let unknown = format!("unknown discriminant {{}} for {type_name}");

    Ok(quote! {
        impl replica_core::model::Replicated for #ident {
            fn type_key() -> replica_core::types::TypeKey {
                replica_core::types::TypeKey::named(#type_name)
            }

            fn ensure_registered(
                registry: &mut replica_core::model::Registry,
            ) -> ::std::result::Result<replica_core::types::TypeKey, replica_core::error::Error> {
                registry.add(replica_core::model::TypeData::scalar::<Self>(
                    <Self as replica_core::model::Replicated>::type_key(),
                    replica_core::types::ScalarKind::I32,
                    ::std::sync::Arc::new(
                        |v: &(dyn ::std::any::Any + ::std::marker::Send + ::std::marker::Sync)| {
                            v.downcast_ref::<Self>()
                                .map(|v| {
                                    replica_core::value::Scalar::I32(match v {
                                        #(Self::#idents => #values,)*
                                    })
                                })
                                .ok_or_else(|| {
                                    replica_core::error::Error::serialization(#not_backing)
                                })
                        },
                    ),
                    ::std::sync::Arc::new(|s: replica_core::value::Scalar| {
                        match s.as_i64()? {
                            #(#values_i64 => ::std::result::Result::Ok(
                                ::std::boxed::Box::new(Self::#idents)
                                    as replica_core::model::AnyValue,
                            ),)*
                            other => ::std::result::Result::Err(
                                replica_core::error::Error::serialization(::std::format!(
                                    #unknown, other
                                )),
                            ),
                        }
                    }),
                ))
            }
        }
    })
}

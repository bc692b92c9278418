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

//! Codegen for structs: a `Replicated` impl whose `ensure_registered` builds
//! the declarative member table (one `MemberDef` with bound getter/setter
//! closures per included field) and hands it to the registry.

use proc_macro2::TokenStream;
use quote::quote;
use syn::spanned::Spanned;
use syn::{DataStruct, DeriveInput, Fields, GenericParam};

use crate::attrs::{is_included, parse_field_attrs, MembersPolicy, TypeAttrs};

pub fn derive_struct(
    input: &DeriveInput,
    data: &DataStruct,
    type_attrs: &TypeAttrs,
) -> syn::Result<TokenStream> {
    let ident = &input.ident;
    let type_name = type_attrs.name.clone().unwrap_or_else(|| ident.to_string());

    let fields = match &data.fields {
        Fields::Named(named) => named.named.iter().collect::<Vec<_>>(),
        Fields::Unit => Vec::new(),
        Fields::Unnamed(_) => {
            return Err(syn::Error::new(
                data.fields.span(),
                "Replicate supports named-field structs; tuple shapes serialize as built-in tuples",
            ));
        }
    };

    let mut registrations = Vec::new();
    let mut member_defs = Vec::new();
    for field in fields {
        let field_attrs = parse_field_attrs(field)?;
        if !is_included(type_attrs.members, &field_attrs, &field.vis) {
            continue;
        }
        let field_ident = field.ident.as_ref().expect("named field");
        let ty = &field.ty;
        let wire_name = field_attrs
            .name
            .clone()
            .unwrap_or_else(|| field_ident.to_string());

        registrations.push(quote! {
            <#ty as replica_core::model::Replicated>::ensure_registered(registry)?;
        });

        let int_format = if field_attrs.zigzag {
            quote! { replica_core::types::IntFormat::ZigZag }
        } else {
            quote! { replica_core::types::IntFormat::Default }
        };
        let surrogate = match &field_attrs.surrogate {
            Some(sty) => {
                registrations.push(quote! {
                    <#sty as replica_core::model::Replicated>::ensure_registered(registry)?;
                });
                quote! {
                    ::std::option::Option::Some(
                        <#sty as replica_core::model::Replicated>::type_key(),
                    )
                }
            }
            None => quote! { ::std::option::Option::None },
        };
        let base = field_attrs.base;

        member_defs.push(quote! {
            replica_core::model::MemberDef {
                name: ::std::borrow::Cow::Borrowed(#wire_name),
                value_type: <#ty as replica_core::model::Replicated>::type_key(),
                nullable: <#ty as replica_core::model::Replicated>::nullable(),
                int_format: #int_format,
                surrogate: #surrogate,
                base: #base,
                getter: ::std::sync::Arc::new(
                    |owner: &(dyn ::std::any::Any + ::std::marker::Send + ::std::marker::Sync)| {
                        owner
                            .downcast_ref::<Self>()
                            .and_then(|o| replica_core::model::Replicated::boxed_inner(&o.#field_ident))
                    },
                ),
                setter: ::std::option::Option::Some(::std::sync::Arc::new(
                    |owner: &mut (dyn ::std::any::Any + ::std::marker::Send + ::std::marker::Sync),
                     value: ::std::option::Option<replica_core::model::AnyValue>| {
                        let o = owner.downcast_mut::<Self>().ok_or_else(|| {
                            replica_core::error::Error::serialization(
                                "member set on incompatible backing",
                            )
                        })?;
                        o.#field_ident =
                            <#ty as replica_core::model::Replicated>::from_inner(value)?;
                        ::std::result::Result::Ok(())
                    },
                )),
            }
        });
    }

    let auto_members = match type_attrs.members {
        MembersPolicy::None => quote! { replica_core::types::AutoMembers::None },
        MembersPolicy::AllPublic => quote! { replica_core::types::AutoMembers::AllPublic },
        MembersPolicy::All => quote! { replica_core::types::AutoMembers::All },
    };

    let type_params: Vec<_> = input
        .generics
        .params
        .iter()
        .filter_map(|p| match p {
            GenericParam::Type(tp) => Some(tp.ident.clone()),
            _ => None,
        })
        .collect();
    let key_expr = if type_params.is_empty() {
        quote! { replica_core::types::TypeKey::named(#type_name) }
    } else {
        quote! {
            replica_core::types::TypeKey::generic(
                #type_name,
                ::std::vec![
                    #( <#type_params as replica_core::model::Replicated>::type_key() ),*
                ],
            )
        }
    };

    let mut generics = input.generics.clone();
    for param in generics.params.iter_mut() {
        if let GenericParam::Type(tp) = param {
            tp.bounds
                .push(syn::parse_quote!(replica_core::model::Replicated));
        }
    }
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    Ok(quote! {
        impl #impl_generics replica_core::model::Replicated for #ident #ty_generics #where_clause {
            fn type_key() -> replica_core::types::TypeKey {
                #key_expr
            }

            fn ensure_registered(
                registry: &mut replica_core::model::Registry,
            ) -> ::std::result::Result<replica_core::types::TypeKey, replica_core::error::Error> {
                let key = <Self as replica_core::model::Replicated>::type_key();
                if registry.contains(&key) {
                    return ::std::result::Result::Ok(key);
                }
                #(#registrations)*
                let members = ::std::vec![#(#member_defs),*];
                registry.add(replica_core::model::TypeData::object::<Self>(
                    key,
                    #auto_members,
                    members,
                ))
            }
        }
    })
}

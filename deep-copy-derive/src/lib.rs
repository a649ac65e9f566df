/*
 * SPDX-FileCopyrightText: 2023 Inria
 * SPDX-FileCopyrightText: 2023 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! Derive procedural macro for the [`deep-copy`](https://crates.io/crates/deep-copy) crate.

use proc_macro_error::{abort, proc_macro_error};
use quote::{ToTokens, quote};
use std::collections::HashSet;
use syn::{
    Data, DeriveInput, Fields, GenericParam, WhereClause, WherePredicate, parse_macro_input,
    parse_quote, punctuated::Punctuated,
};

/// Returns whether the type carries `#[deep_copy(immutable)]` and/or
/// `#[deep_copy(shallow)]`.
///
/// # Panics
///
/// Aborts compilation if both attributes are present: a type cannot be
/// simultaneously aliased unconditionally and byte-duplicated, the two
/// annotations are mutually exclusive.
fn check_attrs(input: &DeriveInput) -> (bool, bool) {
    let mut is_immutable = false;
    let mut is_shallow = false;
    for attr in &input.attrs {
        if !attr.path().is_ident("deep_copy") {
            continue;
        }
        let _ = attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("immutable") {
                is_immutable = true;
            } else if meta.path.is_ident("shallow") {
                is_shallow = true;
            }
            Ok(())
        });
    }

    if is_immutable && is_shallow {
        abort!(
            input.ident,
            "Type {} is declared as both #[deep_copy(immutable)] and #[deep_copy(shallow)]",
            input.ident
        );
    }

    (is_immutable, is_shallow)
}

/// Returns a field's binding identifier, synthesizing a positional one
/// (`f0`, `f1`, …) for unnamed (tuple) fields so every field has a stable
/// name to sort and copy by.
fn field_binding(field: &syn::Field, idx: usize) -> syn::Ident {
    field
        .ident
        .clone()
        .unwrap_or_else(|| quote::format_ident!("f{idx}"))
}

/// Returns the key used to sort fields in lexicographic, ordinal order:
/// named fields sort by identifier, unnamed fields
/// sort by their positional index (formatted so it still compares as a
/// string, which is fine since within one tuple struct/variant the index
/// already determines declaration order).
fn field_sort_key(field: &syn::Field, idx: usize) -> String {
    field
        .ident
        .as_ref()
        .map(|id| id.to_string())
        .unwrap_or_else(|| format!("{idx:08}"))
}

/// A field together with the binding/index the generated code copies it
/// through, ordered by [`field_sort_key`].
struct FieldPlan {
    binding: syn::Ident,
    index: usize,
    ty: syn::Type,
}

fn collect_fields(fields: &Fields) -> Vec<FieldPlan> {
    let mut plans: Vec<(String, FieldPlan)> = fields
        .iter()
        .enumerate()
        .map(|(idx, field)| {
            (
                field_sort_key(field, idx),
                FieldPlan {
                    binding: field_binding(field, idx),
                    index: idx,
                    ty: field.ty.clone(),
                },
            )
        })
        .collect();
    plans.sort_by(|a, b| a.0.cmp(&b.0));
    plans.into_iter().map(|(_, plan)| plan).collect()
}

/// Collects the identifiers of type parameters that are used as the type of
/// at least one field, so we only add `DeepCopy`/`CopyPolicy` bounds where
/// they are actually needed.
fn type_params_in_fields<'a>(
    generics: &'a syn::Generics,
    field_types: &[syn::Type],
) -> HashSet<&'a syn::Ident> {
    let declared: HashSet<&syn::Ident> = generics
        .params
        .iter()
        .filter_map(|p| match p {
            GenericParam::Type(t) => Some(&t.ident),
            _ => None,
        })
        .collect();

    field_types
        .iter()
        .filter_map(|ty| match ty {
            syn::Type::Path(p) if p.qself.is_none() && p.path.segments.len() == 1 => {
                declared.get(&p.path.segments[0].ident).copied()
            }
            _ => None,
        })
        .collect()
}

fn add_bound(where_clause: &mut WhereClause, ty: &syn::Ident, trait_path: syn::Path) {
    let mut bounds = Punctuated::new();
    bounds.push(syn::TypeParamBound::Trait(syn::TraitBound {
        paren_token: None,
        modifier: syn::TraitBoundModifier::None,
        lifetimes: None,
        path: trait_path,
    }));
    where_clause
        .predicates
        .push(WherePredicate::Type(syn::PredicateType {
            lifetimes: None,
            bounded_ty: parse_quote!(#ty),
            colon_token: Default::default(),
            bounds,
        }));
}

fn empty_where_clause() -> WhereClause {
    WhereClause {
        where_token: Default::default(),
        predicates: Punctuated::new(),
    }
}

/// Generates the `CopyPolicy` const expression for a set of field types: the
/// container is `ShallowCopyable` iff every field is `Immutable`, otherwise
/// `Mutable`, realized as an `&&`-chain of associated-const booleans.
fn policy_expr(field_types: &[syn::Type]) -> proc_macro2::TokenStream {
    if field_types.is_empty() {
        return quote!(::deep_copy::policy::Policy::Immutable);
    }
    let checks = field_types
        .iter()
        .map(|ty| quote!(<#ty as ::deep_copy::policy::CopyPolicy>::IS_IMMUTABLE));
    quote! {
        if #(#checks)&&* {
            ::deep_copy::policy::Policy::ShallowCopyable
        } else {
            ::deep_copy::policy::Policy::Mutable
        }
    }
}

/// Like [`policy_expr`], but for enums: an enum has no storage of its own to
/// shallow-copy byte-wise (each variant's own fields do), so an enum whose
/// variants are all built from `Immutable` fields is itself `Immutable`
/// rather than `ShallowCopyable`.
fn enum_policy_expr(field_types: &[syn::Type]) -> proc_macro2::TokenStream {
    if field_types.is_empty() {
        return quote!(::deep_copy::policy::Policy::Immutable);
    }
    let checks = field_types
        .iter()
        .map(|ty| quote!(<#ty as ::deep_copy::policy::CopyPolicy>::IS_IMMUTABLE));
    quote! {
        if #(#checks)&&* {
            ::deep_copy::policy::Policy::Immutable
        } else {
            ::deep_copy::policy::Policy::Mutable
        }
    }
}

#[proc_macro_error]
#[proc_macro_derive(DeepCopy, attributes(deep_copy))]
pub fn deep_copy_derive(input: proc_macro::TokenStream) -> proc_macro::TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let (is_immutable, is_shallow) = check_attrs(&input);
    let name = &input.ident;
    let generics = &input.generics;
    let (impl_generics, ty_generics, _) = generics.split_for_impl();

    let all_field_types: Vec<syn::Type> = match &input.data {
        Data::Struct(s) => s.fields.iter().map(|f| f.ty.clone()).collect(),
        Data::Enum(e) => e
            .variants
            .iter()
            .flat_map(|v| v.fields.iter().map(|f| f.ty.clone()))
            .collect(),
        Data::Union(_) => abort!(name, "#[derive(DeepCopy)] does not support unions"),
    };

    let type_params = type_params_in_fields(generics, &all_field_types);

    let mut policy_where = generics
        .where_clause
        .clone()
        .unwrap_or_else(empty_where_clause);
    let mut copy_where = policy_where.clone();
    for param in &type_params {
        add_bound(
            &mut policy_where,
            param,
            parse_quote!(::deep_copy::policy::CopyPolicy),
        );
        add_bound(&mut copy_where, param, parse_quote!(::deep_copy::DeepCopy));
    }

    let policy_const = if is_immutable {
        quote!(::deep_copy::policy::Policy::Immutable)
    } else if is_shallow {
        quote!(::deep_copy::policy::Policy::ShallowCopyable)
    } else {
        match &input.data {
            Data::Struct(_) => policy_expr(&all_field_types),
            Data::Enum(_) => enum_policy_expr(&all_field_types),
            Data::Union(_) => unreachable!(),
        }
    };

    let policy_impl = quote! {
        impl #impl_generics ::deep_copy::policy::CopyPolicy for #name #ty_generics #policy_where {
            const POLICY: ::deep_copy::policy::Policy = #policy_const;
        }
    };

    let deep_copy_body = match &input.data {
        Data::Struct(s) => gen_struct_body(name, &s.fields, is_immutable, is_shallow),
        Data::Enum(e) => gen_enum_body(name, e, is_immutable, is_shallow),
        Data::Union(_) => unreachable!(),
    };

    let copy_impl = quote! {
        impl #impl_generics ::deep_copy::DeepCopy for #name #ty_generics #copy_where {
            fn deep_copy(&self, ctx: &mut ::deep_copy::CopyContext) -> Self {
                #deep_copy_body
            }
        }
    };

    // Every derived type can also appear as the element of a `Vec`/array/
    // `VecDeque`. It always takes the `Element` path: we cannot assume the
    // user's type is `Copy`, which the `Block` path
    // (array.rs's `ArrayCopyHelper<Block>`) requires.
    let array_element_impl = quote! {
        impl #impl_generics ::deep_copy::array::ArrayElement for #name #ty_generics #copy_where {
            type Kind = ::deep_copy::array::Element;
        }
    };

    quote! {
        #policy_impl
        #copy_impl
        #array_element_impl
    }
    .into()
}

/// Emits `let <binding> = copy_field(&self.<access>, ctx);` statements in
/// field-name-sorted order, then a constructor expression that only
/// reassembles the value (construction order does not have to match copy
/// order; only the recursive calls above must happen in the sorted order).
fn gen_struct_body(
    name: &syn::Ident,
    fields: &Fields,
    is_immutable: bool,
    is_shallow: bool,
) -> proc_macro2::TokenStream {
    if is_immutable || is_shallow {
        return quote!(::core::clone::Clone::clone(self));
    }
    match fields {
        Fields::Named(named) => {
            let plans = collect_fields(&Fields::Named(named.clone()));
            let lets = plans.iter().map(|p| {
                let binding = &p.binding;
                quote!(let #binding = ::deep_copy::policy::copy_field(&self.#binding, ctx);)
            });
            let field_inits = named
                .named
                .iter()
                .map(|f| f.ident.as_ref().unwrap().to_token_stream());
            quote! {
                #(#lets)*
                #name { #(#field_inits),* }
            }
        }
        Fields::Unnamed(unnamed) => {
            let plans = collect_fields(&Fields::Unnamed(unnamed.clone()));
            let lets = plans.iter().map(|p| {
                let binding = &p.binding;
                let index = syn::Index::from(p.index);
                quote!(let #binding = ::deep_copy::policy::copy_field(&self.#index, ctx);)
            });
            let bindings = (0..unnamed.unnamed.len()).map(|idx| {
                let field = &unnamed.unnamed[idx];
                field_binding(field, idx)
            });
            quote! {
                #(#lets)*
                #name( #(#bindings),* )
            }
        }
        Fields::Unit => quote!(#name),
    }
}

fn gen_enum_body(
    name: &syn::Ident,
    data: &syn::DataEnum,
    is_immutable: bool,
    is_shallow: bool,
) -> proc_macro2::TokenStream {
    if is_immutable || is_shallow {
        return quote!(::core::clone::Clone::clone(self));
    }
    let arms = data.variants.iter().map(|variant| {
        let vname = &variant.ident;
        match &variant.fields {
            Fields::Named(named) => {
                let pattern_fields = named
                    .named
                    .iter()
                    .map(|f| f.ident.as_ref().unwrap().to_token_stream());
                let plans = collect_fields(&Fields::Named(named.clone()));
                let lets = plans.iter().map(|p| {
                    let binding = &p.binding;
                    quote!(let #binding = ::deep_copy::policy::copy_field(#binding, ctx);)
                });
                let field_inits = named
                    .named
                    .iter()
                    .map(|f| f.ident.as_ref().unwrap().to_token_stream());
                quote! {
                    #name::#vname { #(#pattern_fields),* } => {
                        #(#lets)*
                        #name::#vname { #(#field_inits),* }
                    }
                }
            }
            Fields::Unnamed(unnamed) => {
                let bindings: Vec<syn::Ident> = (0..unnamed.unnamed.len())
                    .map(|idx| field_binding(&unnamed.unnamed[idx], idx))
                    .collect();
                let plans = collect_fields(&Fields::Unnamed(unnamed.clone()));
                let lets = plans.iter().map(|p| {
                    let binding = &p.binding;
                    quote!(let #binding = ::deep_copy::policy::copy_field(#binding, ctx);)
                });
                quote! {
                    #name::#vname( #(#bindings),* ) => {
                        #(#lets)*
                        #name::#vname( #(#bindings),* )
                    }
                }
            }
            Fields::Unit => quote! {
                #name::#vname => #name::#vname,
            },
        }
    });
    quote! {
        match self {
            #(#arms)*
        }
    }
}

//! Procedural macros for flowrest
//!
//! This crate provides macros to reduce boilerplate in the flowrest command layer:
//!
//! - `#[derive(SelectorGroup)]` - Generate the selector enum and exclusivity check for a command DTO

use convert_case::{Case, Casing};
use proc_macro::TokenStream;
use quote::{format_ident, quote};
use syn::{parse_macro_input, Data, DeriveInput, Fields, Ident, LitStr};

/// Derive the selector group of a command DTO.
///
/// Every named field is a selector slot unless it carries `#[selector(skip)]`.
/// The wire name of a slot is the camelCase field name, or the value of
/// `#[selector(rename = "...")]`.
///
/// # Usage
///
/// ```ignore
/// #[derive(Deserialize, SelectorGroup)]
/// #[selector(name = "JobSelector", purpose = "update the suspension state")]
/// pub struct JobSuspensionStateDto {
///     #[selector(skip)]
///     pub suspended: bool,
///     pub job_id: Option<String>,
///     pub job_definition_id: Option<String>,
/// }
/// ```
///
/// # Generated Code
///
/// ```ignore
/// #[derive(Debug, Clone, Copy, PartialEq)]
/// pub enum JobSelector<'a> {
///     JobId(&'a String),
///     JobDefinitionId(&'a String),
/// }
///
/// impl SelectorGroup for JobSuspensionStateDto {
///     const NAMES: &'static [&'static str] = &["jobId", "jobDefinitionId"];
///     const PURPOSE: &'static str = "update the suspension state";
/// }
///
/// impl JobSuspensionStateDto {
///     pub fn selected(&self) -> Result<JobSelector<'_>, SelectorViolation> { ... }
/// }
/// ```
#[proc_macro_derive(SelectorGroup, attributes(selector))]
pub fn derive_selector_group(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand(input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

/// A selector slot collected from the struct fields
struct Slot {
    field: Ident,
    variant: Ident,
    wire_name: String,
    ty: syn::Type,
}

fn expand(input: DeriveInput) -> syn::Result<proc_macro2::TokenStream> {
    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.generics,
            "SelectorGroup cannot be derived for generic structs",
        ));
    }

    let (enum_name, purpose) = group_attributes(&input)?;

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(named) => &named.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    &input.ident,
                    "SelectorGroup requires named fields",
                ))
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                &input.ident,
                "SelectorGroup can only be derived for structs",
            ))
        }
    };

    let mut slots = Vec::new();
    for field in fields {
        let Some(ident) = field.ident.clone() else {
            continue;
        };
        let mut skip = false;
        let mut rename = None;
        for attr in &field.attrs {
            if !attr.path().is_ident("selector") {
                continue;
            }
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("skip") {
                    skip = true;
                    Ok(())
                } else if meta.path.is_ident("rename") {
                    let value: LitStr = meta.value()?.parse()?;
                    rename = Some(value.value());
                    Ok(())
                } else {
                    Err(meta.error("expected `skip` or `rename`"))
                }
            })?;
        }
        if skip {
            continue;
        }

        let snake = ident.to_string();
        slots.push(Slot {
            variant: format_ident!("{}", snake.to_case(Case::Pascal)),
            wire_name: rename.unwrap_or_else(|| snake.to_case(Case::Camel)),
            field: ident,
            ty: field.ty.clone(),
        });
    }

    if slots.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.ident,
            "SelectorGroup needs at least one selector slot",
        ));
    }

    let struct_name = &input.ident;
    let vis = &input.vis;
    let selector = quote!(::flowrest::compiler::selector);

    let variants = slots.iter().map(|slot| {
        let variant = &slot.variant;
        let ty = &slot.ty;
        quote! {
            #variant(&'a <#ty as #selector::SelectorSlot>::Value)
        }
    });

    let names = slots.iter().map(|slot| &slot.wire_name);

    let collect = slots.iter().map(|slot| {
        let field = &slot.field;
        let variant = &slot.variant;
        quote! {
            if let ::core::option::Option::Some(value) =
                #selector::SelectorSlot::selected_value(&self.#field)
            {
                present.push(#enum_name::#variant(value));
            }
        }
    });

    let enum_doc = format!("The selector chosen from a [`{struct_name}`]");

    Ok(quote! {
        #[doc = #enum_doc]
        #[derive(Debug, Clone, Copy, PartialEq)]
        #vis enum #enum_name<'a> {
            #(#variants,)*
        }

        impl #selector::SelectorGroup for #struct_name {
            const NAMES: &'static [&'static str] = &[#(#names),*];
            const PURPOSE: &'static str = #purpose;
        }

        impl #struct_name {
            /// Resolve the single selector set on this request.
            #vis fn selected(
                &self,
            ) -> ::core::result::Result<#enum_name<'_>, #selector::SelectorViolation> {
                let mut present = ::std::vec::Vec::new();
                #(#collect)*
                #selector::exactly_one_of::<Self, _>(present)
            }
        }
    })
}

/// Read `#[selector(name = "...", purpose = "...")]` from the struct
fn group_attributes(input: &DeriveInput) -> syn::Result<(Ident, LitStr)> {
    let mut name = None;
    let mut purpose = None;

    for attr in &input.attrs {
        if !attr.path().is_ident("selector") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("name") {
                let value: LitStr = meta.value()?.parse()?;
                name = Some(Ident::new(&value.value(), value.span()));
                Ok(())
            } else if meta.path.is_ident("purpose") {
                purpose = Some(meta.value()?.parse::<LitStr>()?);
                Ok(())
            } else {
                Err(meta.error("expected `name` or `purpose`"))
            }
        })?;
    }

    let name = name.ok_or_else(|| {
        syn::Error::new_spanned(&input.ident, "missing #[selector(name = \"...\")]")
    })?;
    let purpose = purpose.ok_or_else(|| {
        syn::Error::new_spanned(&input.ident, "missing #[selector(purpose = \"...\")]")
    })?;
    Ok((name, purpose))
}

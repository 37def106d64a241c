//! DBSet Derive — procedural macros for the DBSet engine.
//!
//! Provides `#[derive(Record)]` for binding DataSet rows onto structs.

use proc_macro::TokenStream;
use quote::quote;
use syn::{Data, DeriveInput, Fields, Type, parse_macro_input};

/// Derive macro for row-to-record binding.
///
/// # Example
///
/// ```ignore
/// #[derive(Default, Record)]
/// pub struct User {
///     pub id: i64,
///     #[dbset(column = "USER_NAME")]
///     pub name: String,
///     pub email: Option<String>,
///     #[dbset(skip)]
///     pub cache: u32,
/// }
/// ```
///
/// Each field is read from the column named by `#[dbset(column = "...")]`,
/// or from the column with the field's own name (case-insensitive). Fields
/// marked `#[dbset(skip)]` and fields of `Vec` or array type are left alone.
///
/// Generates:
/// - `FromRow` trait implementation
/// - `BindTarget` trait implementation (single record)
#[proc_macro_derive(Record, attributes(dbset))]
pub fn derive_record(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand_record(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

fn expand_record(input: &DeriveInput) -> syn::Result<proc_macro2::TokenStream> {
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    name,
                    "Record can only be derived for structs with named fields",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                name,
                "Record can only be derived for structs",
            ));
        }
    };

    let mut bindings = Vec::new();
    for field in fields {
        let Some(ident) = &field.ident else {
            continue;
        };
        let attrs = FieldAttrs::parse(field)?;
        if attrs.skip || is_sequence(&field.ty) {
            continue;
        }

        let field_name = ident.to_string().trim_start_matches("r#").to_string();
        let column = attrs.column.unwrap_or_else(|| field_name.clone());
        bindings.push(quote! {
            ::dbset_core::api::bind_column(&mut self.#ident, row, #column, #field_name)?;
        });
    }

    Ok(quote! {
        impl #impl_generics ::dbset_core::api::FromRow for #name #ty_generics #where_clause {
            #[allow(unused_variables)]
            fn bind_row(
                &mut self,
                row: &::dbset_core::api::RowView<'_>,
            ) -> ::dbset_core::DbsetResult<()> {
                #(#bindings)*
                Ok(())
            }
        }

        impl #impl_generics ::dbset_core::api::BindTarget for #name #ty_generics #where_clause {
            fn bind_from(
                &mut self,
                ds: &mut ::dbset_core::DataSet<'_>,
            ) -> ::dbset_core::DbsetResult<()> {
                ds.bind_record(self)
            }
        }
    })
}

#[derive(Default)]
struct FieldAttrs {
    column: Option<String>,
    skip: bool,
}

impl FieldAttrs {
    fn parse(field: &syn::Field) -> syn::Result<Self> {
        let mut attrs = FieldAttrs::default();
        for attr in &field.attrs {
            if !attr.path().is_ident("dbset") {
                continue;
            }
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("skip") {
                    attrs.skip = true;
                    Ok(())
                } else if meta.path.is_ident("column") {
                    let lit: syn::LitStr = meta.value()?.parse()?;
                    attrs.column = Some(lit.value());
                    Ok(())
                } else {
                    Err(meta.error("expected `column = \"...\"` or `skip`"))
                }
            })?;
        }
        Ok(attrs)
    }
}

/// `Vec<_>`, arrays and slices are never bound from a column.
fn is_sequence(ty: &Type) -> bool {
    match ty {
        Type::Array(_) | Type::Slice(_) => true,
        Type::Path(path) => path
            .path
            .segments
            .last()
            .is_some_and(|segment| segment.ident == "Vec"),
        _ => false,
    }
}

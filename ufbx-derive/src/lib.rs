//! Derive macro for `ufbx_data::validation::Validate`.
//!
//! Expands to a per-field call of `validate_minimally`/
//! `validate_completely`, so a struct only needs to name its fields to
//! get structural validation for free.

use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_macro_input, Data, DeriveInput, Fields};

#[proc_macro_derive(Validate)]
pub fn derive_validate(input: TokenStream) -> TokenStream {
    let ast = parse_macro_input!(input as DeriveInput);
    expand(&ast).into()
}

fn expand(ast: &DeriveInput) -> proc_macro2::TokenStream {
    let fields = match &ast.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => panic!("#[derive(Validate)] only supports structs with named fields"),
        },
        _ => panic!("#[derive(Validate)] only supports structs"),
    };

    let ident = &ast.ident;
    let (impl_generics, ty_generics, where_clause) = ast.generics.split_for_impl();

    let field_idents: Vec<_> = fields.iter().map(|f| f.ident.as_ref().unwrap()).collect();
    let field_names: Vec<_> = field_idents.iter().map(|id| id.to_string()).collect();

    quote! {
        impl #impl_generics ufbx_data::validation::Validate for #ident #ty_generics #where_clause {
            fn validate_minimally<P, R>(&self, _root: &ufbx_data::Root, _path: P, _report: &mut R)
            where
                P: Fn() -> ufbx_data::Path,
                R: FnMut(&dyn Fn() -> ufbx_data::Path, ufbx_data::validation::Error),
            {
                #(
                    ufbx_data::validation::Validate::validate_minimally(
                        &self.#field_idents,
                        _root,
                        || _path().field(#field_names),
                        _report,
                    );
                )*
            }

            fn validate_completely<P, R>(&self, _root: &ufbx_data::Root, _path: P, _report: &mut R)
            where
                P: Fn() -> ufbx_data::Path,
                R: FnMut(&dyn Fn() -> ufbx_data::Path, ufbx_data::validation::Error),
            {
                #(
                    ufbx_data::validation::Validate::validate_completely(
                        &self.#field_idents,
                        _root,
                        || _path().field(#field_names),
                        _report,
                    );
                )*
            }
        }
    }
}

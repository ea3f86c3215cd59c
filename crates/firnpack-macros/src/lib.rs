use proc_macro::TokenStream;
use quote::{format_ident, quote};
use syn::{parse_macro_input, Data, DeriveInput, Fields, Lit, Meta};

/// Derive macro that generates a companion `*Profile` struct holding one
/// `Vec<f64>` per field, i.e. the struct-of-arrays view of a column of
/// per-layer values. All fields in the source struct must be `f64`.
///
/// The generated profile struct has `with_capacity`, `push`, `get`,
/// `truncate`, `len` and `is_empty` methods. A `field_names()` associated
/// function is also added to the original struct.
///
/// Options, given as `#[profile(...)]`:
/// - `profile_name = "CustomName"` overrides the default name
///   (`{StructName}Profile`).
/// - `derive(A, B)` adds derives to the generated struct on top of the
///   built-in `Debug, Clone, Default, PartialEq`.
/// - `attr(...)` copies an outer attribute onto the generated struct, e.g.
///   `attr(serde(default))` so missing columns deserialize as empty.
#[proc_macro_derive(Profile, attributes(profile))]
pub fn derive_profile(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    let name = &input.ident;

    let options = match ProfileOptions::from_attrs(&input) {
        Ok(options) => options,
        Err(err) => return err.to_compile_error().into(),
    };
    let profile_name = options
        .profile_name
        .unwrap_or_else(|| format_ident!("{}Profile", name));
    let extra_derives = options.derives;
    let extra_attrs = options.attrs;

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(named) => &named.named,
            _ => {
                return syn::Error::new_spanned(
                    name,
                    "Profile can only be derived for structs with named fields",
                )
                .to_compile_error()
                .into();
            }
        },
        _ => {
            return syn::Error::new_spanned(name, "Profile can only be derived for structs")
                .to_compile_error()
                .into();
        }
    };

    if fields.is_empty() {
        return syn::Error::new_spanned(name, "Profile struct must have at least one field")
            .to_compile_error()
            .into();
    }

    let mut field_names = Vec::new();
    let mut field_idents = Vec::new();
    for field in fields {
        let Some(ident) = field.ident.as_ref() else {
            continue;
        };
        if !is_f64_type(&field.ty) {
            return syn::Error::new_spanned(&field.ty, "Profile derive: all fields must be f64")
                .to_compile_error()
                .into();
        }
        field_names.push(ident.to_string());
        field_idents.push(ident);
    }

    let first_field = &field_idents[0];

    let field_name_strs: Vec<&str> = field_names.iter().map(|s| s.as_str()).collect();

    let profile_fields = field_idents.iter().map(|f| {
        quote! { pub #f: Vec<f64> }
    });

    let with_cap_fields = field_idents.iter().map(|f| {
        quote! { #f: Vec::with_capacity(n) }
    });

    let push_fields = field_idents.iter().map(|f| {
        quote! { self.#f.push(v.#f); }
    });

    let get_fields = field_idents.iter().map(|f| {
        quote! { #f: *self.#f.get(idx)? }
    });

    let truncate_fields = field_idents.iter().map(|f| {
        quote! { self.#f.truncate(n); }
    });

    let shortest_fields = field_idents.iter().map(|f| {
        quote! { self.#f.len() }
    });

    let extra_derive_attr = if extra_derives.is_empty() {
        quote! {}
    } else {
        quote! { #[derive(#(#extra_derives),*)] }
    };

    let expanded = quote! {
        /// Auto-generated struct-of-arrays profile, one entry per layer.
        #[derive(Debug, Clone, Default, PartialEq)]
        #extra_derive_attr
        #(#[#extra_attrs])*
        pub struct #profile_name {
            #(#profile_fields,)*
        }

        impl #profile_name {
            /// Pre-allocate all vectors for `n` layers.
            pub fn with_capacity(n: usize) -> Self {
                Self {
                    #(#with_cap_fields,)*
                }
            }

            /// Append one layer's values.
            pub fn push(&mut self, v: &#name) {
                #(#push_fields)*
            }

            /// Values of layer `idx`, or `None` if any array is too short.
            pub fn get(&self, idx: usize) -> Option<#name> {
                Some(#name {
                    #(#get_fields,)*
                })
            }

            /// Shorten every array to at most `n` entries.
            pub fn truncate(&mut self, n: usize) {
                #(#truncate_fields)*
            }

            /// Length of the shortest array.
            pub fn min_len(&self) -> usize {
                [#(#shortest_fields),*].into_iter().min().unwrap_or(0)
            }

            /// Number of layers stored.
            pub fn len(&self) -> usize {
                self.#first_field.len()
            }

            /// Returns `true` if no layers have been stored.
            pub fn is_empty(&self) -> bool {
                self.#first_field.is_empty()
            }
        }

        impl #name {
            /// Returns the field names of this profile row.
            pub fn field_names() -> &'static [&'static str] {
                &[#(#field_name_strs),*]
            }
        }
    };

    expanded.into()
}

#[derive(Default)]
struct ProfileOptions {
    profile_name: Option<proc_macro2::Ident>,
    derives: Vec<syn::Path>,
    attrs: Vec<proc_macro2::TokenStream>,
}

impl ProfileOptions {
    fn from_attrs(input: &DeriveInput) -> syn::Result<Self> {
        let mut options = Self::default();
        for attr in &input.attrs {
            if !attr.path().is_ident("profile") {
                continue;
            }
            let nested = attr.parse_args_with(
                syn::punctuated::Punctuated::<Meta, syn::Token![,]>::parse_terminated,
            )?;
            for meta in nested {
                match meta {
                    Meta::NameValue(nv) if nv.path.is_ident("profile_name") => {
                        if let syn::Expr::Lit(expr_lit) = &nv.value {
                            if let Lit::Str(lit_str) = &expr_lit.lit {
                                options.profile_name = Some(format_ident!("{}", lit_str.value()));
                                continue;
                            }
                        }
                        return Err(syn::Error::new_spanned(
                            nv.value,
                            "profile_name must be a string literal",
                        ));
                    }
                    Meta::List(list) if list.path.is_ident("derive") => {
                        let paths = list.parse_args_with(
                            syn::punctuated::Punctuated::<syn::Path, syn::Token![,]>::parse_terminated,
                        )?;
                        options.derives.extend(paths);
                    }
                    Meta::List(list) if list.path.is_ident("attr") => {
                        options.attrs.push(list.tokens);
                    }
                    other => {
                        return Err(syn::Error::new_spanned(other, "unknown profile option"));
                    }
                }
            }
        }
        Ok(options)
    }
}

fn is_f64_type(ty: &syn::Type) -> bool {
    if let syn::Type::Path(type_path) = ty {
        type_path.path.is_ident("f64")
    } else {
        false
    }
}

//! Procedural macros for geowatch

use darling::{FromDeriveInput, FromVariant};
use proc_macro::TokenStream;
use proc_macro2::Ident;
use quote::{format_ident, quote};
use std::collections::BTreeMap;
use syn::{parse_macro_input, DeriveInput};

/// Container-level attributes for #[derive(Action)]
#[derive(Debug, FromDeriveInput)]
#[darling(attributes(action), supports(enum_any))]
struct ActionOpts {
    ident: syn::Ident,
    data: darling::ast::Data<ActionVariant, ()>,

    /// Enable automatic category inference from variant name prefixes
    #[darling(default)]
    infer_categories: bool,
}

/// Variant-level attributes
#[derive(Debug, FromVariant)]
#[darling(attributes(action))]
struct ActionVariant {
    ident: syn::Ident,
    fields: darling::ast::Fields<()>,

    /// Explicit category override
    #[darling(default)]
    category: Option<String>,

    /// Exclude from category inference
    #[darling(default)]
    skip_category: bool,
}

// Verbs that END an action name. Nouns ("User", "Status") must not be here.
const ACTION_VERBS: &[&str] = &[
    "Start", "End", "Open", "Close", "Submit", "Confirm", "Cancel", "Add", "Remove", "Clear",
    "Update", "Set", "Get", "Load", "Save", "Delete", "Create", "Fetch", "Refresh", "Select",
    "Enable", "Disable", "Toggle", "Reset", "Acknowledge", "Resolve",
];

/// Split a PascalCase string into parts
fn split_pascal_case(s: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();

    for ch in s.chars() {
        if ch.is_uppercase() && !current.is_empty() {
            parts.push(std::mem::take(&mut current));
        }
        current.push(ch);
    }
    if !current.is_empty() {
        parts.push(current);
    }
    parts
}

/// Convert PascalCase parts to snake_case
fn to_snake_case(parts: &[String]) -> String {
    parts
        .iter()
        .map(|part| part.to_lowercase())
        .collect::<Vec<_>>()
        .join("_")
}

/// Infer category from a variant name using naming patterns
///
/// - `DidLoadUser` → `async_result`
/// - `SessionSetUser` → `session` (prefix before the first verb)
/// - `ClearError` → none (starts with a verb)
fn infer_category(name: &str) -> Option<String> {
    let parts = split_pascal_case(name);
    let first = parts.first()?;

    if first == "Did" {
        return Some("async_result".to_string());
    }

    if parts.len() < 2 || ACTION_VERBS.contains(&first.as_str()) {
        return None;
    }

    let verb_at = parts
        .iter()
        .skip(1)
        .position(|part| ACTION_VERBS.contains(&part.as_str()))?
        + 1;

    Some(to_snake_case(&parts[..verb_at]))
}

/// Derive macro for the Action trait
///
/// Generates `name()` returning the variant name.
///
/// With `#[action(infer_categories)]`, also generates:
/// - an `ActionCategory` impl (`category() -> Option<&'static str>`)
/// - `is_{category}()` predicates for each discovered category
///
/// # Example
/// ```ignore
/// #[derive(Action, Clone, Debug)]
/// #[action(infer_categories)]
/// enum RootAction {
///     SessionSetUser(User),
///     StatusSet(SystemStatus),
///     #[action(category = "session")]
///     Logout,
/// }
///
/// let action = RootAction::Logout;
/// assert_eq!(action.name(), "Logout");
/// assert_eq!(action.category(), Some("session"));
/// assert!(action.is_session());
/// ```
#[proc_macro_derive(Action, attributes(action))]
pub fn derive_action(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    let opts = match ActionOpts::from_derive_input(&input) {
        Ok(opts) => opts,
        Err(e) => return e.write_errors().into(),
    };

    let name = &opts.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let variants = match &opts.data {
        darling::ast::Data::Enum(variants) => variants,
        _ => {
            return syn::Error::new_spanned(&input, "Action can only be derived for enums")
                .to_compile_error()
                .into();
        }
    };

    let name_arms = variants.iter().map(|v| {
        let variant_name = &v.ident;
        let variant_str = variant_name.to_string();

        match &v.fields.style {
            darling::ast::Style::Unit => quote! {
                #name::#variant_name => #variant_str
            },
            darling::ast::Style::Tuple => quote! {
                #name::#variant_name(..) => #variant_str
            },
            darling::ast::Style::Struct => quote! {
                #name::#variant_name { .. } => #variant_str
            },
        }
    });

    let mut expanded = quote! {
        impl #impl_generics ::geowatch::Action for #name #ty_generics #where_clause {
            fn name(&self) -> &'static str {
                match self {
                    #(#name_arms),*
                }
            }
        }
    };

    if opts.infer_categories {
        // BTreeMap keeps generated predicates in a deterministic order
        let mut categories: BTreeMap<String, Vec<&Ident>> = BTreeMap::new();
        let mut category_arms = Vec::with_capacity(variants.len());

        for v in variants.iter() {
            let cat = if v.skip_category {
                None
            } else if let Some(explicit) = &v.category {
                Some(explicit.clone())
            } else {
                infer_category(&v.ident.to_string())
            };

            let variant = &v.ident;
            let cat_expr = match &cat {
                Some(c) => quote! { ::core::option::Option::Some(#c) },
                None => quote! { ::core::option::Option::None },
            };
            category_arms.push(quote! { #name::#variant { .. } => #cat_expr });

            if let Some(category) = cat {
                categories.entry(category).or_default().push(&v.ident);
            }
        }

        let predicates = categories.iter().map(|(cat, members)| {
            let predicate_name = format_ident!("is_{}", cat);
            let patterns = members.iter().map(|v| quote! { #name::#v { .. } });
            let doc = format!(
                "Returns true if this action belongs to the `{}` category.",
                cat
            );

            quote! {
                #[doc = #doc]
                pub fn #predicate_name(&self) -> bool {
                    matches!(self, #(#patterns)|*)
                }
            }
        });

        expanded.extend(quote! {
            impl #impl_generics ::geowatch::ActionCategory for #name #ty_generics #where_clause {
                fn category(&self) -> ::core::option::Option<&'static str> {
                    match self {
                        #(#category_arms),*
                    }
                }
            }

            impl #impl_generics #name #ty_generics #where_clause {
                #(#predicates)*
            }
        });
    }

    expanded.into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_pascal_case() {
        assert_eq!(split_pascal_case("SessionSetUser"), vec!["Session", "Set", "User"]);
    }

    #[test]
    fn test_infer_category() {
        assert_eq!(infer_category("SessionSetUser").as_deref(), Some("session"));
        assert_eq!(infer_category("SystemStatusSet").as_deref(), Some("system_status"));
        assert_eq!(infer_category("DidLoadUser").as_deref(), Some("async_result"));
        assert_eq!(infer_category("ClearError"), None);
        assert_eq!(infer_category("Tick"), None);
        assert_eq!(infer_category("UserProfile"), None);
    }
}

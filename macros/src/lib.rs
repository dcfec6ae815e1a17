//! Derive macros for todo store action enums
//!
//! # Available Macros
//!
//! - `#[derive(Action)]` - Generates the action tag and intent helpers
//!
//! # Example
//!
//! ```ignore
//! use todo_store_macros::Action;
//!
//! #[derive(Action, Clone, Debug)]
//! enum TodoAction {
//!     #[intent]
//!     AddTodoWithNotification { id: String, name: String },
//!
//!     AddTodo { id: String, name: String },
//! }
//!
//! // Generated methods:
//! assert_eq!(TodoAction::AddTodo { id: "1".into(), name: "a".into() }.action_type(), "ADD_TODO");
//! assert!(TodoAction::AddTodoWithNotification { id: "1".into(), name: "a".into() }.is_intent());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_macro_input, Attribute, Data, DeriveInput, Fields, Ident};

/// Derive macro for Action enums
///
/// Generates helper methods for action enums:
/// - `action_type()` - The variant's tag in `SCREAMING_SNAKE_CASE`
///   (`ToggleTodo` becomes `"TOGGLE_TODO"`), used in logs and metrics
/// - `is_intent()` - Returns true if the variant starts a workflow instead of
///   describing a single state change
/// - `ACTION_TYPES` - Every tag, in declaration order
///
/// # Attributes
///
/// - `#[intent]` - Mark a variant as an intent
///
/// # Errors
///
/// Produces a compile error if applied to a non-enum type.
#[proc_macro_derive(Action, attributes(intent))]
pub fn derive_action(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let name = &input.ident;

    let Data::Enum(data_enum) = &input.data else {
        return syn::Error::new_spanned(input, "#[derive(Action)] can only be used on enums")
            .to_compile_error()
            .into();
    };

    let mut action_type_arms = Vec::new();
    let mut intent_arms = Vec::new();
    let mut tags = Vec::new();

    for variant in &data_enum.variants {
        let pattern = variant_pattern(&variant.ident, &variant.fields);
        let tag = screaming_snake_case(&variant.ident.to_string());

        action_type_arms.push(quote! { #pattern => #tag, });
        if has_attribute(&variant.attrs, "intent") {
            intent_arms.push(quote! { #pattern => true, });
        }
        tags.push(tag);
    }

    let expanded = quote! {
        impl #name {
            /// Every action tag, in declaration order
            pub const ACTION_TYPES: &'static [&'static str] = &[#(#tags),*];

            /// Returns the action's tag, e.g. `"ADD_TODO"`
            #[must_use]
            pub const fn action_type(&self) -> &'static str {
                match self {
                    #(#action_type_arms)*
                }
            }

            /// Returns true if this action is an intent that starts a workflow
            #[must_use]
            pub const fn is_intent(&self) -> bool {
                match self {
                    #(#intent_arms)*
                    #[allow(unreachable_patterns)]
                    _ => false,
                }
            }
        }
    };

    TokenStream::from(expanded)
}

fn variant_pattern(variant: &Ident, fields: &Fields) -> proc_macro2::TokenStream {
    match fields {
        Fields::Named(_) => quote! { Self::#variant { .. } },
        Fields::Unnamed(_) => quote! { Self::#variant(..) },
        Fields::Unit => quote! { Self::#variant },
    }
}

/// `AddTodoWithNotification` -> `ADD_TODO_WITH_NOTIFICATION`
fn screaming_snake_case(ident: &str) -> String {
    let mut out = String::with_capacity(ident.len() + 4);
    let chars: Vec<char> = ident.chars().collect();

    for (i, &c) in chars.iter().enumerate() {
        if c.is_uppercase() && i > 0 {
            let prev = chars[i - 1];
            let next_is_lower = chars.get(i + 1).is_some_and(|n| n.is_lowercase());
            if prev.is_lowercase() || prev.is_ascii_digit() || (prev.is_uppercase() && next_is_lower) {
                out.push('_');
            }
        }
        out.extend(c.to_uppercase());
    }

    out
}

/// Helper function to check if an attribute list contains a specific attribute
fn has_attribute(attrs: &[Attribute], name: &str) -> bool {
    attrs.iter().any(|attr| attr.path().is_ident(name))
}

#[cfg(test)]
mod tests {
    use super::screaming_snake_case;

    #[test]
    fn converts_variant_names_to_tags() {
        assert_eq!(screaming_snake_case("AddTodo"), "ADD_TODO");
        assert_eq!(screaming_snake_case("AddTodoWithNotification"), "ADD_TODO_WITH_NOTIFICATION");
        assert_eq!(screaming_snake_case("SetFilter"), "SET_FILTER");
        assert_eq!(screaming_snake_case("Reset"), "RESET");
        assert_eq!(screaming_snake_case("HTTPRequest"), "HTTP_REQUEST");
        assert_eq!(screaming_snake_case("Retry2Times"), "RETRY2_TIMES");
    }
}

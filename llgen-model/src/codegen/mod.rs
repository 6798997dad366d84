//! Code generation.
//!
//! [`lower`] turns factored parse functions into a small statement IR and
//! performs every check that can fail. [`printer`] renders that IR with
//! `quote` and cannot fail.

pub mod ir;
pub mod lower;
pub mod printer;

use crate::error::Result;
use crate::first::FirstSets;
use crate::model::{Grammar, ParseFunction};
use proc_macro2::TokenStream;

#[derive(Debug, Clone)]
pub struct CodegenOptions {
    /// Path of the runtime support module as seen from the generated code.
    pub runtime: syn::Path,
}

impl Default for CodegenOptions {
    fn default() -> Self {
        Self {
            runtime: syn::parse_quote!(::llgen::rt),
        }
    }
}

pub fn generate(
    grammar: &Grammar,
    functions: &[ParseFunction],
    first: &mut FirstSets,
    options: &CodegenOptions,
) -> Result<TokenStream> {
    let module = lower::lower(grammar, functions, first)?;
    Ok(printer::Printer::new(&options.runtime).print(&module))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::Dialect;
    use crate::factoring::factor;
    use crate::loader::load;

    fn generate_text(text: &str, options: &CodegenOptions) -> String {
        let g = load(text, &Dialect::default()).unwrap();
        let functions = factor(&g);
        let mut first = FirstSets::new(&g);
        let tokens = generate(&g, &functions, &mut first, options).unwrap();
        syn::parse2::<syn::File>(tokens.clone()).unwrap();
        tokens.to_string().chars().filter(|c| !c.is_whitespace()).collect()
    }

    #[test]
    fn test_one_function_per_rule() {
        let code = generate_text(
            "%tokens\na, b\n%rules\n<S> -> a <T> | ε\n<T> -> b\n",
            &CodegenOptions::default(),
        );
        assert!(code.contains("pubfnparse_S<T,I>"));
        assert!(code.contains("pubfnparse_T<T,I>"));
        assert!(code.contains("pubenumNodeType{S,T,}"));
        assert!(code.contains("pubuseself::parse_Sasstart;"));
    }

    #[test]
    fn test_three_way_choice_uses_match() {
        let code = generate_text(
            "%tokens\na, b, c\n%rules\n<S> -> a | b | c\n",
            &CodegenOptions::default(),
        );
        assert!(code.contains("matchlookahead.as_ref()"));
        for kind in ["a", "b", "c"] {
            assert!(code.contains(&format!("Some(::llgen::rt::Key{{kind:\"{}\",..}})", kind)));
        }
    }

    #[test]
    fn test_two_way_choice_uses_if_chain() {
        let code = generate_text(
            "%tokens\na, b\n%rules\n<S> -> a | b\n",
            &CodegenOptions::default(),
        );
        assert!(!code.contains("matchlookahead"));
        assert!(code.contains("if::llgen::rt::lookahead_in"));
        assert!(code.contains("elseif::llgen::rt::lookahead_in"));
        assert!(code.contains("::llgen::rt::unexpected(\"S\""));
    }

    #[test]
    fn test_custom_runtime_path() {
        let options = CodegenOptions {
            runtime: syn::parse_quote!(crate::support),
        };
        let code = generate_text("%tokens\na\n%rules\n<S> -> a\n", &options);
        assert!(code.contains("crate::support::expect(\"S\""));
        assert!(!code.contains("::llgen::rt"));
    }
}

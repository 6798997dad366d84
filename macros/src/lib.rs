extern crate proc_macro;

use derive_syn_parse::Parse;
use llgen_model::{CodegenOptions, Dialect};
use proc_macro::TokenStream;
use quote::quote;
use std::path::{Path, PathBuf};
use syn::{parse_macro_input, Ident, LitStr, Token, Visibility};

#[derive(Parse)]
struct GrammarInput {
    vis: Visibility,
    name: Ident,
    _comma: Token![,],
    source: LitStr,
    #[peek(Token![,])]
    _trailing: Option<Token![,]>,
}

impl GrammarInput {
    /// `source` is the grammar file, if any, which rustc then tracks for
    /// rebuilds.
    fn expand(&self, text: &str, source: Option<&Path>) -> proc_macro2::TokenStream {
        let Self { vis, name, .. } = self;
        let tracked = source.map(|path| {
            let path = LitStr::new(&path.to_string_lossy(), self.source.span());
            quote!(const _: &str = include_str!(#path);)
        });
        match llgen_model::compile(text, &Dialect::default(), &CodegenOptions::default()) {
            Ok(body) => quote! {
                #vis mod #name {
                    #tracked
                    #body
                }
            },
            Err(e) => syn::Error::new(self.source.span(), e).to_compile_error(),
        }
    }
}

/// Compiles an LL(1) grammar into a parser module at build time.
///
/// The module contains one `parse_<Rule>` function per rule, a `NodeType`
/// enum, `start` (the first rule's function) and `parse`, which runs
/// `start` over a whole token sequence.
///
/// # Example
///
/// ```rust,ignore
/// use llgen::grammar;
///
/// grammar!(pub list, r#"
///     %tokens
///     item, comma
///     %rules
///     <List> -> item <Rest>
///     <Rest> -> comma item <Rest> | ε
/// "#);
/// ```
#[proc_macro]
pub fn grammar(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as GrammarInput);
    input.expand(&input.source.value(), None).into()
}

/// Like [`grammar!`], but reads the grammar from a file relative to the
/// crate's `Cargo.toml`.
#[proc_macro]
pub fn include_grammar(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as GrammarInput);
    let root = std::env::var_os("CARGO_MANIFEST_DIR").map(PathBuf::from).unwrap_or_default();
    let path = root.join(input.source.value());
    match std::fs::read_to_string(&path) {
        // include_str! resolves relative paths against the calling file.
        Ok(text) => input.expand(&text, Some(path.as_path()).filter(|p| p.is_absolute())).into(),
        Err(e) => syn::Error::new(
            input.source.span(),
            format!("cannot read grammar {}: {}", path.display(), e),
        )
        .to_compile_error()
        .into(),
    }
}

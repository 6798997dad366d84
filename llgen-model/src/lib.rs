//! # llgen-model
//!
//! Grammar model, LL(1) analysis and code generation for `llgen`. Shared by
//! the `grammar!` macro and the `llgen` command line tool.
//!
//! ## Pipeline
//!
//! 1. **[loader]**: Read grammar text into a [`Grammar`](model::Grammar).
//! 2. **[modifiers]**: Expand token macros such as `AnythingBut@x`.
//! 3. **[validator]**: Check token and rule references and that alternatives
//!    led by different rules can be told apart by one token.
//! 4. **[factoring]**: Left-factor each rule into a decision tree.
//! 5. **[codegen]**: Lower the trees to parse functions and print them.
//!
//! FIRST sets ([first]) are computed on demand and shared by steps 3 and 5.

use proc_macro2::TokenStream;

pub mod codegen;
pub mod dialect;
pub mod error;
pub mod factoring;
pub mod first;
pub mod loader;
pub mod model;
pub mod modifiers;
pub mod validator;

pub use codegen::CodegenOptions;
pub use dialect::Dialect;
pub use error::{ErrorKind, GrammarError, Result};
pub use first::FirstSets;
pub use model::{Grammar, ParseFunction};

/// Runs every step up to and including factoring.
///
/// Returns the expanded grammar together with one factored parse function
/// per rule, in declaration order.
pub fn analyze(text: &str, dialect: &Dialect) -> Result<(Grammar, Vec<ParseFunction>)> {
    let grammar = modifiers::expand(loader::load(text, dialect)?, dialect);
    validator::validate(&grammar, &mut FirstSets::new(&grammar))?;
    let functions = factoring::factor(&grammar);
    Ok((grammar, functions))
}

/// Full pipeline: grammar text in, parser source tokens out.
pub fn compile(text: &str, dialect: &Dialect, options: &CodegenOptions) -> Result<TokenStream> {
    let (grammar, functions) = analyze(text, dialect)?;
    let mut first = FirstSets::new(&grammar);
    codegen::generate(&grammar, &functions, &mut first, options)
}

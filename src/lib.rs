//! # llgen
//!
//! An LL(1) parser generator. Grammars are written as plain text:
//!
//! ```text
//! %tokens
//! id, plus
//! %rules
//! <Sum> -> id <More>
//! <More> -> plus id <More> | ε
//! ```
//!
//! [`grammar!`] compiles such a grammar at build time into a module of
//! recursive-descent parse functions; [`Generator`] and the `llgen` binary do
//! the same for grammar files and emit the source instead. Generated parsers
//! consume any [`rt::Lexeme`] iterator and build [`rt::ParseTree`]s.

mod generator;
pub mod rt;
pub mod testing;

pub use generator::{read_dialect, GenerateError, Generator};
pub use llgen_macros::{grammar, include_grammar};
pub use llgen_model::{CodegenOptions, Dialect, ErrorKind, GrammarError};

#[cfg(test)]
mod tests {
    use super::*;

    fn normalize(s: &str) -> String {
        s.chars().filter(|c| !c.is_whitespace()).collect()
    }

    #[test]
    fn test_generator_reads_relative_to_root() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("list.grammar"),
            "%tokens\nitem, comma\n%rules\n<List> -> item <Rest>\n<Rest> -> comma item <Rest> | ε\n",
        )
        .unwrap();

        let code = Generator::new(dir.path()).generate("list.grammar").unwrap();
        let code = normalize(&code.to_string());
        assert!(code.contains("pubfnparse_List<T,I>"));
        assert!(code.contains("pubfnparse_Rest<T,I>"));
        assert!(code.contains("pubuseself::parse_Listasstart;"));
    }

    #[test]
    fn test_generator_options_and_dialect() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("g.txt"), "TOKENS:\nx\nRULES:\n<A> ::= x\n").unwrap();
        std::fs::write(
            dir.path().join("dialect.json"),
            r#"{ "tokens-header": "TOKENS:", "rules-header": "RULES:", "arrow": "::=" }"#,
        )
        .unwrap();

        let dialect = read_dialect(&dir.path().join("dialect.json")).unwrap();
        assert_eq!(dialect.epsilon, Dialect::default().epsilon);

        let code = Generator::new(dir.path())
            .with_dialect(dialect)
            .with_options(CodegenOptions {
                runtime: syn::parse_quote!(crate::rt),
            })
            .generate("g.txt")
            .unwrap();
        assert!(normalize(&code.to_string()).contains("crate::rt::expect(\"A\""));
    }

    #[test]
    fn test_generator_errors() {
        let dir = tempfile::tempdir().unwrap();
        let generator = Generator::new(dir.path());
        match generator.generate("missing.grammar") {
            Err(GenerateError::Io { path, .. }) => assert!(path.ends_with("missing.grammar")),
            other => panic!("Expected I/O error, got {:?}", other.map(|c| c.to_string())),
        }

        std::fs::write(dir.path().join("bad.grammar"), "%tokens\na\n%rules\n<S> -> <T>\n").unwrap();
        match generator.generate("bad.grammar") {
            Err(GenerateError::Grammar(e)) => assert_eq!(e.kind(), ErrorKind::Reference),
            other => panic!("Expected grammar error, got {:?}", other.map(|c| c.to_string())),
        }
    }

    #[test]
    fn test_branches_for_dump() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("g.grammar"), "%tokens\na, b\n%rules\n<S> -> a b | a\n").unwrap();
        let functions = Generator::new(dir.path()).branches("g.grammar").unwrap();
        assert_eq!(functions[0].to_string(), "<S>\n  a\n    b\n    ε\n");
    }
}

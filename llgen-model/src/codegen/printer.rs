//! Parser IR -> Rust tokens.

use super::ir::*;
use crate::model::Terminal;
use proc_macro2::{Span, TokenStream};
use quote::{format_ident, quote};
use syn::Ident;

pub struct Printer<'a> {
    runtime: &'a syn::Path,
}

impl<'a> Printer<'a> {
    /// `runtime` is the path under which the generated code finds the
    /// runtime support module, e.g. `::llgen::rt`.
    pub fn new(runtime: &'a syn::Path) -> Self {
        Self { runtime }
    }

    pub fn print(&self, module: &Module) -> TokenStream {
        let rt = self.runtime;
        let variants: Vec<Ident> = module.node_types.iter().map(|n| variant_ident(n)).collect();
        let names = &module.node_types;
        let functions = module.functions.iter().map(|f| self.function(f));
        let start = fn_ident(&module.start);

        quote! {
            /// One tag per grammar rule, carried by every inner node.
            #[allow(non_camel_case_types)]
            #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
            pub enum NodeType {
                #(#variants,)*
            }

            impl NodeType {
                /// The rule name as written in the grammar.
                pub fn name(self) -> &'static str {
                    match self {
                        #(NodeType::#variants => #names,)*
                    }
                }
            }

            pub type Node<T> = #rt::ParseTree<NodeType, T>;

            #(#functions)*

            pub use self::#start as start;

            /// Parses the whole token sequence from the start rule.
            pub fn parse<T, I>(tokens: I) -> #rt::Result<Node<T>>
            where
                T: #rt::Lexeme,
                I: IntoIterator<Item = T>,
            {
                #rt::parse_all(tokens, #start::<T, I::IntoIter>)
            }
        }
    }

    fn function(&self, function: &Function) -> TokenStream {
        let rt = self.runtime;
        let name = fn_ident(&function.rule);
        let doc = format!("Parses `<{}>`.", function.rule);
        let body = self.block(&function.rule, &function.body);

        quote! {
            #[doc = #doc]
            #[allow(non_snake_case, unused_mut, unused_variables)]
            pub fn #name<T, I>(lookahead: Option<T>, tokens: &mut I) -> #rt::Result<(Node<T>, Option<T>)>
            where
                T: #rt::Lexeme,
                I: Iterator<Item = T>,
            {
                let mut children: Vec<Node<T>> = Vec::new();
                #body
            }
        }
    }

    fn block(&self, rule: &str, block: &Block) -> TokenStream {
        let rt = self.runtime;
        let steps = block.steps.iter().map(|step| self.step(rule, step));
        let tail = match &block.tail {
            Tail::Finish => {
                let tag = variant_ident(rule);
                quote! {
                    Ok((#rt::ParseTree::finish(NodeType::#tag, children), lookahead))
                }
            }
            Tail::Dispatch(dispatch) => self.dispatch(rule, dispatch),
        };
        quote! {
            #(#steps)*
            #tail
        }
    }

    fn step(&self, rule: &str, step: &Step) -> TokenStream {
        let rt = self.runtime;
        match step {
            Step::Match(terminal) => {
                let expected = self.expected(terminal);
                quote! {
                    let (child, lookahead) = #rt::expect(#rule, lookahead, tokens, #expected)?;
                    children.push(child);
                }
            }
            Step::Call(callee) => {
                let callee = fn_ident(callee);
                quote! {
                    let (child, lookahead) = #callee(lookahead, tokens)?;
                    children.push(child);
                }
            }
        }
    }

    fn dispatch(&self, rule: &str, dispatch: &Dispatch) -> TokenStream {
        let rt = self.runtime;
        let fallback = match &dispatch.fallback {
            Fallback::Body(body) => self.block(rule, body),
            Fallback::Error { expected } => {
                let expected = expected.iter().map(|t| self.expected(t));
                quote! {
                    Err(#rt::unexpected(#rule, lookahead.as_ref(), &[#(#expected),*]))
                }
            }
        };
        if dispatch.arms.is_empty() {
            return fallback;
        }

        let bodies = dispatch.arms.iter().map(|arm| self.block(rule, &arm.body));
        match dispatch.style {
            DispatchStyle::IfChain => {
                let conditions = dispatch.arms.iter().map(|arm| {
                    let expected = arm.lookahead.iter().map(|t| self.expected(t));
                    quote!(#rt::lookahead_in(lookahead.as_ref(), &[#(#expected),*]))
                });
                quote! {
                    #(if #conditions { #bodies } else)* {
                        #fallback
                    }
                }
            }
            DispatchStyle::Match => {
                let patterns = dispatch.arms.iter().map(|arm| {
                    let keys = arm.lookahead.iter().map(|t| self.key_pattern(t));
                    quote!(#(Some(#keys))|*)
                });
                quote! {
                    match lookahead.as_ref().map(|token| #rt::Lexeme::key(token)) {
                        #(#patterns => { #bodies })*
                        _ => { #fallback }
                    }
                }
            }
        }
    }

    fn expected(&self, terminal: &Terminal) -> TokenStream {
        let rt = self.runtime;
        match &terminal.keyword {
            Some(keyword) => quote!(#rt::Expected::Keyword(#keyword)),
            None => {
                let kind = &terminal.name;
                quote!(#rt::Expected::Kind(#kind))
            }
        }
    }

    fn key_pattern(&self, terminal: &Terminal) -> TokenStream {
        let rt = self.runtime;
        match &terminal.keyword {
            Some(keyword) => quote!(#rt::Key { keyword: Some(#keyword), .. }),
            None => {
                let kind = &terminal.name;
                quote!(#rt::Key { kind: #kind, keyword: None })
            }
        }
    }
}

fn fn_ident(rule: &str) -> Ident {
    format_ident!("parse_{}", rule)
}

/// Rule names that collide with Rust keywords become raw identifiers.
fn variant_ident(rule: &str) -> Ident {
    if syn::parse_str::<Ident>(rule).is_ok() {
        Ident::new(rule, Span::call_site())
    } else {
        Ident::new_raw(rule, Span::call_site())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn normalize(s: &str) -> String {
        s.chars().filter(|c| !c.is_whitespace()).collect()
    }

    fn print(module: &Module) -> String {
        let runtime: syn::Path = syn::parse_quote!(::llgen::rt);
        let tokens = Printer::new(&runtime).print(module);
        syn::parse2::<syn::File>(tokens.clone()).expect("generated code should parse");
        normalize(&tokens.to_string())
    }

    fn module(functions: Vec<Function>) -> Module {
        Module {
            node_types: functions.iter().map(|f| f.rule.clone()).collect(),
            start: functions[0].rule.clone(),
            functions,
        }
    }

    #[test]
    fn test_finish_only_function() {
        let code = print(&module(vec![Function {
            rule: "E".into(),
            body: Block::finish(),
        }]));
        assert!(code.contains("pubenumNodeType{E,}"));
        assert!(code.contains("NodeType::E=>\"E\""));
        assert!(code.contains("pubfnparse_E<T,I>(lookahead:Option<T>,tokens:&mutI)"));
        assert!(code.contains("Ok((::llgen::rt::ParseTree::finish(NodeType::E,children),lookahead))"));
        assert!(code.contains("pubuseself::parse_Easstart;"));
        assert!(code.contains("::llgen::rt::parse_all(tokens,parse_E::<T,I::IntoIter>)"));
    }

    #[test]
    fn test_steps_and_if_chain() {
        let body = Block {
            steps: vec![Step::Match(Terminal::keyword("KW_if", "if"))],
            tail: Tail::Dispatch(Dispatch {
                style: DispatchStyle::IfChain,
                arms: vec![Arm {
                    lookahead: vec![Terminal::new("a")],
                    body: Block {
                        steps: vec![Step::Match(Terminal::new("a")), Step::Call("S".into())],
                        tail: Tail::Finish,
                    },
                }],
                fallback: Fallback::Body(Box::new(Block::finish())),
            }),
        };
        let code = print(&module(vec![Function { rule: "S".into(), body }]));
        assert!(code.contains(
            "::llgen::rt::expect(\"S\",lookahead,tokens,::llgen::rt::Expected::Keyword(\"if\"))?;"
        ));
        assert!(code.contains(
            "if::llgen::rt::lookahead_in(lookahead.as_ref(),&[::llgen::rt::Expected::Kind(\"a\")])"
        ));
        assert!(code.contains("let(child,lookahead)=parse_S(lookahead,tokens)?;children.push(child);"));
        assert!(code.contains("}else{Ok("));
    }

    #[test]
    fn test_match_dispatch_with_error_fallback() {
        let arm = |name: &str| Arm {
            lookahead: vec![Terminal::new(name)],
            body: Block {
                steps: vec![Step::Match(Terminal::new(name))],
                tail: Tail::Finish,
            },
        };
        let body = Block {
            steps: vec![],
            tail: Tail::Dispatch(Dispatch {
                style: DispatchStyle::Match,
                arms: vec![arm("a"), arm("b"), arm("c")],
                fallback: Fallback::Error {
                    expected: vec![Terminal::new("a"), Terminal::new("b"), Terminal::new("c")],
                },
            }),
        };
        let code = print(&module(vec![Function { rule: "S".into(), body }]));
        assert!(code.contains("matchlookahead.as_ref().map(|token|::llgen::rt::Lexeme::key(token))"));
        assert!(code.contains("Some(::llgen::rt::Key{kind:\"b\",keyword:None})=>{"));
        assert!(code.contains("_=>{Err(::llgen::rt::unexpected(\"S\",lookahead.as_ref(),&["));
    }

    #[test]
    fn test_keyword_rule_name_becomes_raw_ident() {
        let code = print(&module(vec![Function {
            rule: "type".into(),
            body: Block::finish(),
        }]));
        assert!(code.contains("r#type"));
        assert!(code.contains("parse_type"));
    }
}

//! Statement-level description of the generated parser.

use crate::model::Terminal;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Module {
    /// Rule names in declaration order, one node-type tag each.
    pub node_types: Vec<String>,
    pub functions: Vec<Function>,
    /// Rule bound as the parser's entry point.
    pub start: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Function {
    pub rule: String,
    pub body: Block,
}

/// Consume `steps` in order, then finish or decide.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub steps: Vec<Step>,
    pub tail: Tail,
}

impl Block {
    pub fn finish() -> Self {
        Self {
            steps: Vec::new(),
            tail: Tail::Finish,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// Match-and-consume one terminal.
    Match(Terminal),
    /// Call the parse function of a rule.
    Call(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Tail {
    /// Build the rule's node from the collected children.
    Finish,
    Dispatch(Dispatch),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchStyle {
    IfChain,
    Match,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dispatch {
    pub style: DispatchStyle,
    pub arms: Vec<Arm>,
    pub fallback: Fallback,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Arm {
    /// Lookahead tokens selecting this arm.
    pub lookahead: Vec<Terminal>,
    pub body: Block,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fallback {
    Body(Box<Block>),
    /// Unexpected token; `expected` lists every arm's lookahead.
    Error { expected: Vec<Terminal> },
}

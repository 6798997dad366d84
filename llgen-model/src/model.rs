use std::fmt;
use std::hash::{Hash, Hasher};

/// A declared token category.
///
/// `keyword` is set when the terminal stands for one specific keyword
/// rather than a whole category. Equality and hashing only look at the name.
#[derive(Debug, Clone)]
pub struct Terminal {
    pub name: String,
    pub keyword: Option<String>,
}

impl Terminal {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            keyword: None,
        }
    }

    pub fn keyword(name: impl Into<String>, keyword: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            keyword: Some(keyword.into()),
        }
    }
}

impl PartialEq for Terminal {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for Terminal {}

impl Hash for Terminal {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

impl fmt::Display for Terminal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Symbol {
    Terminal(Terminal),
    NonTerminal(String),
    Epsilon,
}

impl Symbol {
    pub fn terminal(name: impl Into<String>) -> Self {
        Symbol::Terminal(Terminal::new(name))
    }

    pub fn non_terminal(name: impl Into<String>) -> Self {
        Symbol::NonTerminal(name.into())
    }

    pub fn is_epsilon(&self) -> bool {
        matches!(self, Symbol::Epsilon)
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            Symbol::Terminal(t) => Some(&t.name),
            Symbol::NonTerminal(n) => Some(n),
            Symbol::Epsilon => None,
        }
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Symbol::Terminal(t) => write!(f, "{}", t),
            Symbol::NonTerminal(n) => write!(f, "<{}>", n),
            Symbol::Epsilon => write!(f, "ε"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alternative {
    pub symbols: Vec<Symbol>,
}

impl Alternative {
    pub fn new(symbols: Vec<Symbol>) -> Self {
        Self { symbols }
    }

    pub fn epsilon() -> Self {
        Self {
            symbols: vec![Symbol::Epsilon],
        }
    }

    pub fn is_epsilon(&self) -> bool {
        matches!(self.symbols.as_slice(), [Symbol::Epsilon])
    }

    /// The symbol deciding whether this alternative applies.
    pub fn leading(&self) -> &Symbol {
        self.symbols.first().unwrap_or(&Symbol::Epsilon)
    }
}

impl fmt::Display for Alternative {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, sym) in self.symbols.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{}", sym)?;
        }
        Ok(())
    }
}

/// All alternatives of one non-terminal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductionRule {
    pub name: String,
    pub alternatives: Vec<Alternative>,
}

impl ProductionRule {
    pub fn new(name: impl Into<String>, alternatives: Vec<Alternative>) -> Self {
        Self {
            name: name.into(),
            alternatives,
        }
    }

    pub fn symbol(&self) -> Symbol {
        Symbol::NonTerminal(self.name.clone())
    }
}

impl fmt::Display for ProductionRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}> ->", self.name)?;
        for (i, alt) in self.alternatives.iter().enumerate() {
            if i > 0 {
                write!(f, " |")?;
            }
            write!(f, " {}", alt)?;
        }
        Ok(())
    }
}

/// A loaded grammar: declared tokens plus rules in declaration order.
/// The first rule is the start rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grammar {
    pub tokens: Vec<Terminal>,
    pub rules: Vec<ProductionRule>,
}

impl Grammar {
    pub fn rule(&self, name: &str) -> Option<&ProductionRule> {
        self.rules.iter().find(|r| r.name == name)
    }

    pub fn token(&self, name: &str) -> Option<&Terminal> {
        self.tokens.iter().find(|t| t.name == name)
    }

    pub fn start(&self) -> Option<&ProductionRule> {
        self.rules.first()
    }
}

/// A node of the factored decision tree.
///
/// `first` and `common` are consumed in sequence; afterwards, if
/// `sub_branches` is non-empty, one lookahead token picks the sub-branch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Branch {
    pub first: Symbol,
    pub common: Vec<Symbol>,
    pub sub_branches: Vec<Branch>,
}

impl Branch {
    /// Builds an unfactored branch from a symbol sequence. An empty
    /// sequence becomes the epsilon branch.
    pub fn leaf(symbols: &[Symbol]) -> Self {
        match symbols.split_first() {
            Some((first, rest)) => Self {
                first: first.clone(),
                common: rest.to_vec(),
                sub_branches: Vec::new(),
            },
            None => Self::epsilon(),
        }
    }

    pub fn epsilon() -> Self {
        Self {
            first: Symbol::Epsilon,
            common: Vec::new(),
            sub_branches: Vec::new(),
        }
    }

    pub fn is_epsilon(&self) -> bool {
        self.first.is_epsilon() && self.common.is_empty()
    }

    fn fmt_indented(&self, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
        write!(f, "{:indent$}{}", "", self.first, indent = depth * 2)?;
        for sym in &self.common {
            write!(f, " {}", sym)?;
        }
        writeln!(f)?;
        for sub in &self.sub_branches {
            sub.fmt_indented(f, depth + 1)?;
        }
        Ok(())
    }
}

impl fmt::Display for Branch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_indented(f, 0)
    }
}

/// Generation-ready form of one production rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseFunction {
    pub name: String,
    pub branches: Vec<Branch>,
}

impl fmt::Display for ParseFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "<{}>", self.name)?;
        for branch in &self.branches {
            branch.fmt_indented(f, 1)?;
        }
        Ok(())
    }
}

use llgen_model::{CodegenOptions, Dialect, GrammarError, ParseFunction};
use log::info;
use proc_macro2::TokenStream;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("cannot read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid dialect {}: {source}", .path.display())]
    Dialect {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error(transparent)]
    Grammar(#[from] GrammarError),
}

/// Generates parser source from grammar files below a root directory.
pub struct Generator {
    root: PathBuf,
    dialect: Dialect,
    options: CodegenOptions,
}

impl Generator {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            dialect: Dialect::default(),
            options: CodegenOptions::default(),
        }
    }

    pub fn with_dialect(mut self, dialect: Dialect) -> Self {
        self.dialect = dialect;
        self
    }

    pub fn with_options(mut self, options: CodegenOptions) -> Self {
        self.options = options;
        self
    }

    pub fn generate(&self, filename: &str) -> Result<TokenStream, GenerateError> {
        let text = self.read(filename)?;
        let code = llgen_model::compile(&text, &self.dialect, &self.options)?;
        info!("Generated parser for {}", filename);
        Ok(code)
    }

    /// The factored decision trees, one per rule, without generating code.
    pub fn branches(&self, filename: &str) -> Result<Vec<ParseFunction>, GenerateError> {
        let text = self.read(filename)?;
        let (_, functions) = llgen_model::analyze(&text, &self.dialect)?;
        Ok(functions)
    }

    fn read(&self, filename: &str) -> Result<String, GenerateError> {
        let path = self.root.join(filename);
        fs::read_to_string(&path).map_err(|source| GenerateError::Io { path, source })
    }
}

/// Reads a JSON dialect file. Missing keys keep their defaults.
pub fn read_dialect(path: &Path) -> Result<Dialect, GenerateError> {
    let text = fs::read_to_string(path).map_err(|source| GenerateError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| GenerateError::Dialect {
        path: path.to_path_buf(),
        source,
    })
}

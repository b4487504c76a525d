//! Declare, from and load tokens

use crate::error::{BuildError, BuildResult};
use crate::field::write_field;

#[derive(Debug, Clone, PartialEq)]
enum Source {
    Collection(String),
    Index(String),
}

/// The `from` clause; a query targets exactly one collection or index.
#[derive(Debug, Clone, PartialEq)]
pub struct FromToken {
    source: Source,
    alias: Option<String>,
}

impl FromToken {
    /// Query a collection through a server-managed (dynamic) index.
    pub fn collection(name: impl Into<String>, alias: Option<String>) -> BuildResult<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(BuildError::InvalidArgument(
                "collection name cannot be blank".to_string(),
            ));
        }
        if name.contains('"') && name.chars().any(char::is_whitespace) {
            return Err(BuildError::InvalidCollectionName(name));
        }
        Ok(Self {
            source: Source::Collection(name),
            alias,
        })
    }

    pub fn index(name: impl Into<String>, alias: Option<String>) -> BuildResult<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(BuildError::InvalidArgument(
                "index name cannot be blank".to_string(),
            ));
        }
        Ok(Self {
            source: Source::Index(name),
            alias,
        })
    }

    pub fn collection_name(&self) -> Option<&str> {
        match &self.source {
            Source::Collection(name) => Some(name),
            Source::Index(_) => None,
        }
    }

    pub fn index_name(&self) -> Option<&str> {
        match &self.source {
            Source::Index(name) => Some(name),
            Source::Collection(_) => None,
        }
    }

    pub fn alias(&self) -> Option<&str> {
        self.alias.as_deref()
    }

    /// Collection queries run against an index the server creates on demand.
    pub fn is_dynamic(&self) -> bool {
        matches!(self.source, Source::Collection(_))
    }

    pub fn write_to(&self, out: &mut String) {
        out.push_str("from ");
        match &self.source {
            Source::Collection(name) if name.chars().any(char::is_whitespace) => {
                out.push('"');
                out.push_str(name);
                out.push('"');
            }
            Source::Collection(name) => write_field(out, name),
            Source::Index(name) => {
                out.push_str("index '");
                out.push_str(name);
                out.push('\'');
            }
        }
        if let Some(alias) = &self.alias {
            out.push_str(" as ");
            out.push_str(alias);
        }
    }
}

/// A JavaScript function declared ahead of the query.
#[derive(Debug, Clone, PartialEq)]
pub struct DeclareToken {
    name: String,
    parameters: String,
    body: String,
}

impl DeclareToken {
    pub fn create(
        name: impl Into<String>,
        parameters: impl Into<String>,
        body: impl Into<String>,
    ) -> BuildResult<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(BuildError::InvalidArgument(
                "function name cannot be blank".to_string(),
            ));
        }
        Ok(Self {
            name,
            parameters: parameters.into(),
            body: body.into(),
        })
    }

    pub fn write_to(&self, out: &mut String) {
        out.push_str("declare function ");
        out.push_str(&self.name);
        out.push('(');
        out.push_str(&self.parameters);
        out.push_str(") {\n");
        out.push_str(&self.body);
        out.push_str("\n}\n");
    }
}

/// `load` clause entry: `argument as alias`
#[derive(Debug, Clone, PartialEq)]
pub struct LoadToken {
    argument: String,
    alias: String,
}

impl LoadToken {
    pub fn create(argument: impl Into<String>, alias: impl Into<String>) -> BuildResult<Self> {
        let argument = argument.into();
        let alias = alias.into();
        if argument.trim().is_empty() || alias.trim().is_empty() {
            return Err(BuildError::InvalidArgument(
                "load requires an argument and an alias".to_string(),
            ));
        }
        Ok(Self { argument, alias })
    }

    pub fn write_to(&self, out: &mut String) {
        out.push_str(&self.argument);
        out.push_str(" as ");
        out.push_str(&self.alias);
    }
}

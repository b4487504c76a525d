//! Tokens of the include section: counters, highlights, explanations

use serde::Serialize;

use crate::field::write_field;

/// `counters(...)`
#[derive(Debug, Clone, PartialEq)]
pub struct CounterIncludesToken {
    source_path: Option<String>,
    parameter: Option<String>,
}

impl CounterIncludesToken {
    /// Include the counters whose names are bound under `parameter`.
    pub fn named(source_path: Option<String>, parameter: impl Into<String>) -> Self {
        Self {
            source_path,
            parameter: Some(parameter.into()),
        }
    }

    /// Include every counter of the matched (or referenced) documents.
    pub fn all(source_path: Option<String>) -> Self {
        Self {
            source_path,
            parameter: None,
        }
    }

    pub fn write_to(&self, out: &mut String) {
        out.push_str("counters(");
        if let Some(path) = &self.source_path {
            write_field(out, path);
            if self.parameter.is_some() {
                out.push_str(", ");
            }
        }
        if let Some(parameter) = &self.parameter {
            out.push('$');
            out.push_str(parameter);
        }
        out.push(')');
    }
}

/// Options for highlighted fragments
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct HighlightingOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_key: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub pre_tags: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub post_tags: Vec<String>,
}

/// `highlight(field,length,count[,$options])`
#[derive(Debug, Clone, PartialEq)]
pub struct HighlightingToken {
    field: String,
    fragment_length: u32,
    fragment_count: u32,
    options_parameter: Option<String>,
}

impl HighlightingToken {
    pub fn create(
        field: impl Into<String>,
        fragment_length: u32,
        fragment_count: u32,
        options_parameter: Option<String>,
    ) -> Self {
        Self {
            field: field.into(),
            fragment_length,
            fragment_count,
            options_parameter,
        }
    }

    pub fn write_to(&self, out: &mut String) {
        out.push_str("highlight(");
        write_field(out, &self.field);
        out.push_str(&format!(",{},{}", self.fragment_length, self.fragment_count));
        if let Some(options) = &self.options_parameter {
            out.push_str(",$");
            out.push_str(options);
        }
        out.push(')');
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ExplanationOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_key: Option<String>,
}

/// `explanations([$options])`
#[derive(Debug, Clone, PartialEq)]
pub struct ExplanationToken {
    options_parameter: Option<String>,
}

impl ExplanationToken {
    pub fn create(options_parameter: Option<String>) -> Self {
        Self { options_parameter }
    }

    pub fn write_to(&self, out: &mut String) {
        out.push_str("explanations(");
        if let Some(options) = &self.options_parameter {
            out.push('$');
            out.push_str(options);
        }
        out.push(')');
    }
}

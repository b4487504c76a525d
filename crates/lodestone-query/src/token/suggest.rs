//! Suggestion token

use serde::Serialize;

use crate::field::write_field;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
pub enum StringDistanceType {
    None,
    #[default]
    Levenshtein,
    JaroWinkler,
    NGram,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
pub enum SuggestionSortMode {
    None,
    #[default]
    Popularity,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct SuggestionOptions {
    pub page_size: u32,
    pub distance: StringDistanceType,
    pub accuracy: f32,
    pub sort_mode: SuggestionSortMode,
}

impl Default for SuggestionOptions {
    fn default() -> Self {
        Self {
            page_size: 15,
            distance: StringDistanceType::Levenshtein,
            accuracy: 0.5,
            sort_mode: SuggestionSortMode::Popularity,
        }
    }
}

/// Caller-facing suggestion request for one field
#[derive(Debug, Clone, PartialEq)]
pub struct Suggestion {
    pub field: String,
    pub terms: Vec<String>,
    pub display_name: Option<String>,
    pub options: Option<SuggestionOptions>,
}

impl Suggestion {
    pub fn term(field: impl Into<String>, term: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            terms: vec![term.into()],
            display_name: None,
            options: None,
        }
    }

    pub fn terms(field: impl Into<String>, terms: Vec<String>) -> Self {
        Self {
            field: field.into(),
            terms,
            display_name: None,
            options: None,
        }
    }

    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    pub fn with_options(mut self, options: SuggestionOptions) -> Self {
        self.options = Some(options);
        self
    }
}

/// `suggest(field, $term[, $options]) as alias`
#[derive(Debug, Clone, PartialEq)]
pub struct SuggestToken {
    field: String,
    alias: Option<String>,
    term_parameter: String,
    options_parameter: Option<String>,
}

impl SuggestToken {
    pub fn create(
        field: impl Into<String>,
        alias: Option<String>,
        term_parameter: impl Into<String>,
        options_parameter: Option<String>,
    ) -> Self {
        Self {
            field: field.into(),
            alias,
            term_parameter: term_parameter.into(),
            options_parameter,
        }
    }

    pub fn write_to(&self, out: &mut String) {
        out.push_str("suggest(");
        write_field(out, &self.field);
        out.push_str(", $");
        out.push_str(&self.term_parameter);
        if let Some(options) = &self.options_parameter {
            out.push_str(", $");
            out.push_str(options);
        }
        out.push(')');
        if let Some(alias) = &self.alias {
            if alias != &self.field {
                out.push_str(" as ");
                write_field(out, alias);
            }
        }
    }
}

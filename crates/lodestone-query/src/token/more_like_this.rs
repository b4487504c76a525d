//! More-like-this token

use serde::Serialize;

use super::{write_where_tokens, QueryToken};

/// Tuning for similarity queries; unset fields use server defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct MoreLikeThisOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum_term_frequency: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maximum_query_terms: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maximum_number_of_tokens_parsed: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum_word_length: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maximum_word_length: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum_document_frequency: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maximum_document_frequency: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maximum_document_frequency_percentage: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub boost: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub boost_factor: Option<f32>,
    #[serde(rename = "StopWordsDocumentId", skip_serializing_if = "Option::is_none")]
    pub stop_words_document_id: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<String>,
}

/// `moreLikeThis(<clauses> | $document[, $options])`
#[derive(Debug, Clone, PartialEq)]
pub struct MoreLikeThisToken {
    document_parameter: Option<String>,
    options_parameter: Option<String>,
    where_tokens: Vec<QueryToken>,
}

impl MoreLikeThisToken {
    pub fn create(
        document_parameter: Option<String>,
        options_parameter: Option<String>,
        where_tokens: Vec<QueryToken>,
    ) -> Self {
        Self {
            document_parameter,
            options_parameter,
            where_tokens,
        }
    }

    pub fn where_tokens(&self) -> &[QueryToken] {
        &self.where_tokens
    }

    pub fn write_to(&self, out: &mut String) {
        out.push_str("moreLikeThis(");
        match &self.document_parameter {
            Some(document) => {
                out.push('$');
                out.push_str(document);
            }
            None => write_where_tokens(&self.where_tokens, out),
        }
        if let Some(options) = &self.options_parameter {
            out.push_str(", $");
            out.push_str(options);
        }
        out.push(')');
    }
}

//! Projection of selected fields

use crate::error::{BuildError, BuildResult};
use crate::field::write_field;

/// Fields to project, optionally renamed.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryData {
    pub fields: Vec<String>,
    pub projections: Vec<String>,
    /// Fields are JavaScript expressions rather than plain paths
    pub custom_function: bool,
}

impl QueryData {
    /// Project fields under their own names.
    pub fn fields<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let fields: Vec<String> = fields.into_iter().map(Into::into).collect();
        Self {
            projections: fields.clone(),
            fields,
            custom_function: false,
        }
    }

    /// Project `fields[i]` as `projections[i]`.
    pub fn renamed(fields: Vec<String>, projections: Vec<String>) -> Self {
        Self {
            fields,
            projections,
            custom_function: false,
        }
    }

    pub fn custom_function(expression: impl Into<String>) -> Self {
        Self {
            fields: vec![expression.into()],
            projections: Vec::new(),
            custom_function: true,
        }
    }
}

/// The projection list of the select section
#[derive(Debug, Clone, PartialEq)]
pub struct FieldsToFetchToken {
    fields: Vec<String>,
    projections: Vec<String>,
    custom_function: bool,
}

impl FieldsToFetchToken {
    pub fn create(data: &QueryData) -> BuildResult<Self> {
        if data.fields.is_empty() {
            return Err(BuildError::InvalidArgument(
                "fields to fetch cannot be empty".to_string(),
            ));
        }
        if !data.custom_function && data.projections.len() != data.fields.len() {
            return Err(BuildError::InvalidArgument(
                "length of projections must be the same as length of field to fetch".to_string(),
            ));
        }
        Ok(Self {
            fields: data.fields.clone(),
            projections: data.projections.clone(),
            custom_function: data.custom_function,
        })
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    pub fn projections(&self) -> &[String] {
        &self.projections
    }

    pub fn is_custom_function(&self) -> bool {
        self.custom_function
    }

    pub fn write_to(&self, out: &mut String) {
        for (i, field) in self.fields.iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            if self.custom_function {
                out.push_str(field);
                continue;
            }
            write_field(out, field);
            if let Some(projection) = self.projections.get(i) {
                if projection != field {
                    out.push_str(" as ");
                    write_field(out, projection);
                }
            }
        }
    }
}

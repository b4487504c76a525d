//! Conversion of raw result documents into entities

use std::borrow::Cow;

use lodestone_query::token::FieldsToFetchToken;
use serde_json::Value;
use tracing::trace;

use crate::error::{OperationError, OperationResult};
use crate::metadata::DocumentMetadata;
use crate::shape::{EntityShape, ShapeKind};

/// An entity together with the metadata it was read with
#[derive(Debug, Clone)]
pub struct Hydrated<T> {
    pub entity: T,
    pub metadata: DocumentMetadata,
}

/// Convert one raw result document into `T`.
///
/// Projections of a single field are unwrapped first. The document id is
/// written into `identity_property` when the raw document has no such field.
pub fn hydrate<T: EntityShape>(
    document: &Value,
    fields_to_fetch: Option<&FieldsToFetchToken>,
    identity_property: &str,
) -> OperationResult<Hydrated<T>> {
    let metadata = DocumentMetadata::from_document(document);
    let id = metadata.non_empty_id().unwrap_or_default().to_string();

    let mut source = Cow::Borrowed(document);

    if metadata.projection {
        if let Some(fields) = fields_to_fetch.filter(|f| f.projections().len() == 1) {
            let projection = &fields.projections()[0];
            let inner = document.get(projection.as_str());

            if T::KIND == ShapeKind::Scalar {
                let value = inner.cloned().unwrap_or(Value::Null);
                if !value.is_object() {
                    trace!(id = %id, field = %projection, "Unwrapping single projected field");
                    let entity = convert(value, &id)?;
                    return Ok(Hydrated { entity, metadata });
                }
            }

            let same_field = fields.fields()[0] == *projection;
            if let Some(nested) = inner.filter(|n| n.is_object() && same_field) {
                source = Cow::Owned(nested.clone());
            }
        }
    }

    let mut value = source.into_owned();
    if !id.is_empty() {
        if let Value::Object(map) = &mut value {
            if !map.contains_key(identity_property) {
                map.insert(identity_property.to_string(), Value::String(id.clone()));
            }
        }
    }

    let entity = convert(value, &id)?;
    Ok(Hydrated { entity, metadata })
}

fn convert<T: EntityShape>(value: Value, id: &str) -> OperationResult<T> {
    serde_json::from_value(value).map_err(|e| OperationError::hydration(id, e))
}

//! Target shapes for hydrated results

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeKind {
    /// Numbers, strings, booleans, dates and unit enums
    Scalar,
    Structure,
}

/// A type query results can be hydrated into.
///
/// Structures get the blanket behaviour; scalar shapes opt in through
/// `KIND` so a single projected field converts directly.
///
/// ```
/// use lodestone_client::{EntityShape, ShapeKind};
/// use serde::Deserialize;
///
/// #[derive(Debug, Clone, Deserialize)]
/// struct User {
///     id: String,
///     name: String,
/// }
///
/// impl EntityShape for User {}
///
/// #[derive(Debug, Clone, Deserialize)]
/// enum Status {
///     Active,
///     Retired,
/// }
///
/// impl EntityShape for Status {
///     const KIND: ShapeKind = ShapeKind::Scalar;
/// }
/// ```
pub trait EntityShape: DeserializeOwned + Clone + Send + Sync + 'static {
    const KIND: ShapeKind = ShapeKind::Structure;
}

macro_rules! scalar_shapes {
    ($($ty:ty),* $(,)?) => {
        $(
            impl EntityShape for $ty {
                const KIND: ShapeKind = ShapeKind::Scalar;
            }
        )*
    };
}

scalar_shapes!(
    bool,
    i8,
    i16,
    i32,
    i64,
    u8,
    u16,
    u32,
    u64,
    usize,
    f32,
    f64,
    String,
    DateTime<Utc>,
);

impl EntityShape for Value {}

impl<T: EntityShape> EntityShape for Option<T> {
    const KIND: ShapeKind = T::KIND;
}

impl<T: EntityShape> EntityShape for Vec<T> {}

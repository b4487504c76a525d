//! # Lodestone Query
//!
//! Fluent query builder and compiler. Builder calls accumulate immutable
//! tokens per section; compiling walks the sections in a fixed order and
//! produces query text plus an ordered table of bound parameters.
//!
//! ```rust
//! use lodestone_config::Conventions;
//! use lodestone_query::QueryBuilder;
//!
//! let mut query = QueryBuilder::for_collection(Conventions::default(), "Users").unwrap();
//! query
//!     .where_equals("name", "Ann").unwrap()
//!     .or_else().unwrap()
//!     .where_greater_than("age", 30).unwrap();
//!
//! let compiled = query.compile().unwrap();
//! assert_eq!(compiled.text(), "from Users where name = $p0 or age > $p1");
//! ```

#![warn(clippy::all)]

mod builder;
mod compiled;
mod compiler;
mod error;
mod field;
mod hash;
mod parameters;
pub mod token;
mod value;

pub use builder::QueryBuilder;
pub use compiled::{format_time_span, CompiledQuery, QueryRequestBody};
pub use error::{BuildError, BuildResult, RenderError};
pub use field::escape_field;
pub use hash::QueryHashCalculator;
pub use parameters::Parameters;
pub use value::{duration_to_ticks, format_date_time, MethodCall, QueryValue, COMPARE_EXCHANGE_METHOD};

//! # Lodestone Configuration Library
//!
//! Conventions shared by the query builder and the execution layer, plus the
//! client configuration that carries them.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use lodestone_config::ConfigLoader;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ConfigLoader::load_from_file("lodestone.toml").await?;
//!     println!("identity property: {}", config.conventions.identity_property);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

mod client;
mod conventions;
mod error;
mod loader;

pub use client::*;
pub use conventions::*;
pub use error::*;
pub use loader::*;

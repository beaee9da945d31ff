//! Typed configuration from environment variables and `.env` files.
//!
//! This crate resolves a declarative `Schema` of typed fields against the
//! process environment (or an injected map) and an optional env file, with
//! defaults, optionality, name remapping, ephemeral and derived entries, and
//! `$NAME` / `${NAME}` interpolation inside env file values.
//!
//! ```no_run
//! use envcraft::{LoadOptions, Schema, load, number, string};
//!
//! let schema = Schema::new()
//!     .field("databaseUrl", string())
//!     .field("port", number::<u16>().default(3000));
//!
//! let config = load(&schema, LoadOptions::new().with_env_file(".env"))?;
//! let port: u16 = config.require("port")?;
//! # Ok::<(), envcraft::ConfigError>(())
//! ```

pub mod builders;
pub mod constants;
pub mod env_file;
pub mod environment;
mod error;
pub mod field;
pub mod interpolate;
mod loader;
pub mod naming;
pub mod record;
pub mod sample;
pub mod schema;

pub use builders::{array, array_with, boolean, custom, json, number, string, url};
pub use env_file::{Encoding, EnvFile, parse_env_str, read_env_file};
pub use environment::EnvironmentGuard;
pub use error::{CoercionError, ConfigError, EnvironmentError};
pub use field::{AnyField, Field};
pub use interpolate::{InterpolationOptions, LookupPolicy, MissingPolicy, interpolate};
pub use loader::{LoadOptions, load, load_into};
pub use naming::{resolve_env_key, to_env_key};
pub use record::{Record, Slot};
pub use sample::generate_sample;
pub use schema::{Derived, Entry, Ephemeral, Schema, derived, ephemeral};

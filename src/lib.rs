//! pokeload - one-shot loader for the Pokémon stats CSV into BigQuery
//!
//! Reads a CSV of Pokémon stats, reshapes its columns for the battle
//! tracker, creates the destination dataset, and bulk-loads the rows into a
//! BigQuery table under an explicit schema. Strictly sequential: loader,
//! then transformer, then publisher, failing fast on any error.

pub mod config;
pub mod error;
pub mod loader;
pub mod model;
pub mod publish;
pub mod transform;

pub use config::Config;
pub use error::{PokeloadError, PokeloadResult};
pub use model::RecordSet;

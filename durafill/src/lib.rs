//! durafill library interface
//!
//! Fills missing durations in a JSON collection of audio records by
//! downloading each referenced file and probing its length.
//!
//! Components, leaf-first:
//! - [`schema`]: which duration field the collection uses
//! - [`selector`]: entries with a null duration and an audio URL
//! - [`fetcher`]: HTTP download into a scoped temp file
//! - [`prober`]: duration of a local audio file
//! - [`merger`]: locked write-back into the shared collection
//! - [`pool`]: bounded concurrent fetch → probe → merge
//! - [`pipeline`]: the whole run, from file to file

pub mod collection;
pub mod error;
pub mod fetcher;
pub mod merger;
pub mod pipeline;
pub mod pool;
pub mod prober;
pub mod schema;
pub mod selector;

pub use crate::collection::{Collection, Entry};
pub use crate::error::{EnrichError, Result, TaskError};
pub use crate::pipeline::{Enricher, RunReport, RunSummary};
pub use crate::schema::FieldSpec;

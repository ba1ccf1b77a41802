//! Tabular summaries of DICOM series.
//!
//! Three batch stages, each a standalone binary exchanging CSV files:
//!
//! 1. [`extract::extract`] samples one file per series directory and writes
//!    a row of metadata per series.
//! 2. [`aggregate::aggregate`] groups series rows by patient and study date
//!    and sorts them into [`modality::Modality`] buckets.
//! 3. [`presence::reduce_presence`] turns each study row into 0/1 flags.

pub mod aggregate;
pub mod attributes;
pub mod error;
pub mod extract;
pub mod logging;
pub mod modality;
pub mod presence;
pub mod record;
pub mod table;

pub use crate::aggregate::aggregate;
pub use crate::error::{Error, Result};
pub use crate::extract::extract;
pub use crate::presence::reduce_presence;

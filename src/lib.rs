pub mod config;
pub mod error;
pub mod extract;
pub mod load;
pub mod logging;
pub mod metrics;
pub mod pipeline;
pub mod table;
pub mod transform;

pub use config::Config;
pub use error::{EtlError, Result};
pub use pipeline::{Pipeline, RunOptions, RunReport};
pub use table::{Column, Table, Value};

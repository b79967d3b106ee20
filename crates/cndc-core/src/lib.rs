pub mod acquisition;
pub mod aggregate;
pub mod cache;
pub mod config;
pub mod discovery;
pub mod error;
pub mod frame;
pub mod ingestion;
pub mod outputs;
pub mod selection;

pub use cndc_parser::{CanonicalPeriod, FieldSpec, LongDataset, LongRecord, PeriodDecoder};
pub use config::{Aggregate, Layout, MetricFamily, PipelineConfig};
pub use error::{PipelineError, Result};
pub use ingestion::{ingest_family, FileReport, FileStatus, IngestionBatch};

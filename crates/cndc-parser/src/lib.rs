pub mod errors;
pub mod extract;
pub mod model;
pub mod numeric;
pub mod period;
pub mod reshape;
pub mod schema;
mod workbook;

pub use errors::{InvalidPeriod, InvalidPeriodReason, ParserError, UnresolvedFields};
pub use extract::{extract, metric_columns};
pub use model::{CanonicalPeriod, Cell, LongDataset, LongRecord, RawTable, PERIOD_COLUMN};
pub use numeric::{normalize, normalize_str};
pub use period::{period_token, PeriodDecoder, PeriodLayout, DEFAULT_CENTURY_BASE};
pub use reshape::{reshape, reshape_period_column};
pub use schema::{resolve, FieldSpec, SchemaMap};
pub use workbook::read_workbook;

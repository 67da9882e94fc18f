mod record;

pub use record::{excerpt, AnalysisRecord, TIMESTAMP_FORMAT};

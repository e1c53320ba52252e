pub mod extractor;
pub mod set;

pub use extractor::{MeasureError, MeasurementExtractor};
pub use set::{MeasurementKind, MeasurementSet};

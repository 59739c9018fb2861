pub mod export;

pub use export::{CurveRecord, ExportContext, ExportRecord, ExportRef};

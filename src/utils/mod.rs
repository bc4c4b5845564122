pub mod export_sink;
pub mod logger;
pub mod parsers;
pub mod progress;
pub mod time;

pub use export_sink::{ExportKind, ExportSink, ExportSinkOptions};
pub use logger::init_logging;
pub use parsers::parse_target_datetime;
pub use progress::{ProgressEvent, ProgressReporter};
pub use time::{format_elapsed, ledger_now};

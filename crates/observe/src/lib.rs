pub mod logger;
pub mod truncate;

pub use logger::{normalize_indent, ErrorLogger, LogEntry, LoggerRegistry};
pub use truncate::{truncate_html, HtmlTruncator, DEFAULT_MAX_LEN};

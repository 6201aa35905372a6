// runner-sdk: Foundation layer for the runner worker.
// This crate has ZERO dependencies on other workspace crates and provides
// argument validation, trace abstractions and string/URL helpers.

pub mod arg_util;
pub mod string_util;
pub mod trace;
pub mod url_util;

pub use arg_util::{ArgError, ArgUtil};
pub use string_util::StringUtil;
pub use trace::{CollectingTraceWriter, TraceLevel, TraceWriter};
pub use url_util::UrlUtil;

//! Session records, the registry client that caches them, and pure
//! time-window helpers over them

pub mod registry;
pub mod types;
pub mod window;

pub use registry::{Notice, NoticeLevel, RegistrySnapshot, SessionRegistry};
pub use types::{parse_datetime, Session, SessionId, SessionPatch};
pub use window::{
    filter_by_window, sort_by_start, time_until, window_counts, TimeUntil, Window, WindowCounts,
};

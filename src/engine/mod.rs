pub mod error;
pub use self::error::{Error, Result};

pub mod change;
pub use change::{Change, ChangeKind, Diff};

pub mod collection;
pub use collection::{Collection, Iter, Representation};

pub mod config;
pub use config::Config;

pub mod timestamp;
pub use timestamp::Timestamp;

pub mod trace;
pub use trace::{TimestampedChange, Trace};

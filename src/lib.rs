pub mod executor;
pub mod planner;
pub mod storage;
pub mod types;
pub mod utils;

pub use types::error::{DatabaseError, Result, ResultCode, error_string};

/// Library version as a string, e.g. "0.1.0".
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

/// Library version encoded as major * 1_000_000 + minor * 1_000 + patch.
pub fn version_number() -> u32 {
    let mut parts = env!("CARGO_PKG_VERSION").split('.');
    let mut next = || {
        parts
            .next()
            .and_then(|p| p.parse::<u32>().ok())
            .unwrap_or(0)
    };
    next() * 1_000_000 + next() * 1_000 + next()
}

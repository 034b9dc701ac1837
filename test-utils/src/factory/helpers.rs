use std::sync::atomic::{AtomicU64, Ordering};

/// Starts well above zero so generated ids look like Discord snowflakes in test output.
static COUNTER: AtomicU64 = AtomicU64::new(100_000);

/// Returns the next unique id for factory defaults.
pub fn next_id() -> u64 {
    COUNTER.fetch_add(1, Ordering::SeqCst)
}

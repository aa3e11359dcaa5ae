//! Process exit codes. Scripts depend on these; do not renumber.

pub const SUCCESS: i32 = 0;
pub const DIFFERENCES_FOUND: i32 = 1; // only with --fail-on-diff
pub const FAILURE: i32 = 2; // config or decode failure
pub const CANCELLED: i32 = 130; // 128 + SIGINT

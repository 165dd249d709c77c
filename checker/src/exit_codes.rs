//! Stable exit codes for the `check-homework` command.

/// Every trial computed the reference value.
pub const OK: i32 = 0;
/// Bad arguments or configuration; no trials ran. Matches clap's usage-error code.
pub const CONFIG: i32 = 2;
/// The workflow definition does not have the expected shape; no trials ran.
pub const SHAPE: i32 = 3;
/// The engine failed, timed out, or did not produce the expected output.
pub const EXECUTION: i32 = 4;
/// The workflow produced a value different from the reference value.
pub const MISMATCH: i32 = 5;

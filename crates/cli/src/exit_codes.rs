//! CLI Exit Code Registry
//!
//! This is the single source of truth for all `rindex` exit codes.
//! Exit codes are part of the shell contract; scripts rely on them.
//!
//! | Code | Description                                        |
//! |------|----------------------------------------------------|
//! | 0    | Success                                            |
//! | 2    | CLI usage error (bad args)                         |
//! | 3    | Invalid run config or special-case table           |
//! | 4    | Runtime I/O (unreadable source, unwritable output) |
//! | 5    | Clean-key coverage below `--fail-under`            |
//!
//! # Adding New Exit Codes
//!
//! 1. Add the constant
//! 2. Document what triggers it
//! 3. Update the table above

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// Usage error - bad arguments, missing required options.
pub const EXIT_USAGE: u8 = 2;

/// Config TOML or special-case JSON failed to parse or validate.
/// Raised before any source is normalized.
pub const EXIT_INDEX_INVALID_CONFIG: u8 = 3;

/// A source, config or output path could not be read or written, or a
/// source table is missing its key column.
pub const EXIT_INDEX_RUNTIME: u8 = 4;

/// Outputs were written, but total clean percentage is below `--fail-under`.
pub const EXIT_INDEX_LOW_COVERAGE: u8 = 5;

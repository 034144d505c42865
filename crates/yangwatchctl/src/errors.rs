//! Exit codes for yangwatchctl

/// Every selected check passed on every device
pub const EXIT_SUCCESS: i32 = 0;

/// At least one check failed or one document could not be evaluated
pub const EXIT_CHECKS_FAILED: i32 = 1;

/// Bad inventory, unreadable input, or invalid arguments.
/// Matches clap's own usage-error status.
pub const EXIT_CONFIG_ERROR: i32 = 2;

/// Exit status for a finished run
pub fn exit_code(success: bool) -> i32 {
    if success {
        EXIT_SUCCESS
    } else {
        EXIT_CHECKS_FAILED
    }
}

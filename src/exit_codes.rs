//! Process exit codes for the `mdpress` binary

/// Every document converted
pub const SUCCESS: i32 = 0;

/// An input could not be read or converted
pub const CONVERSION_FAILED: i32 = 1;

/// Bad arguments or configuration
pub const TOOL_ERROR: i32 = 2;

pub mod exit {
    use super::*;

    pub fn conversion_failed() -> ! {
        std::process::exit(CONVERSION_FAILED);
    }

    pub fn tool_error() -> ! {
        std::process::exit(TOOL_ERROR);
    }
}

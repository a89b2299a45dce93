// SPDX-License-Identifier: PMPL-1.0-or-later
//! Exit codes for the harvest CLI.
//!
//! Standardized exit codes for workflow automation, so CI jobs can tell a
//! missing repository apart from an exhausted rate limit.
//!
//! # Exit Code Categories
//!
//! | Range     | Category                  | Description                                    |
//! |-----------|---------------------------|------------------------------------------------|
//! | 0         | Success                   | Operation completed successfully               |
//! | 1-9       | General errors            | Configuration, argument, IO errors             |
//! | 20-29     | Hosting API results       | Releases missing, rate limits                  |
//! | 30-39     | Repository errors         | Repository not found                           |

use harvest_adapters::AdapterError;
use harvest_metadata::HarvestError;

// ============================================================================
// SUCCESS
// ============================================================================

/// Operation completed successfully
pub const SUCCESS: i32 = 0;

// ============================================================================
// GENERAL ERRORS (1-9)
// ============================================================================

/// General/unspecified error
pub const GENERAL_ERROR: i32 = 1;

/// Invalid command line arguments
pub const INVALID_ARGUMENTS: i32 = 2;

/// Configuration file error (missing, invalid, or inaccessible)
pub const CONFIG_ERROR: i32 = 3;

/// IO error (file read/write, invalid plugin list)
pub const IO_ERROR: i32 = 4;

// ============================================================================
// HOSTING API RESULTS (20-29)
// ============================================================================

/// Repository publishes no releases
pub const NO_RELEASES: i32 = 22;

/// Hosting API rate limit exceeded
pub const RATE_LIMITED: i32 = 25;

// ============================================================================
// REPOSITORY ERRORS (30-39)
// ============================================================================

/// Repository does not exist or is private
pub const REPO_NOT_FOUND: i32 = 31;

/// Every code with its name and description, in ascending order
pub const ALL: &[(i32, &str)] = &[
    (SUCCESS, "SUCCESS"),
    (GENERAL_ERROR, "GENERAL_ERROR"),
    (INVALID_ARGUMENTS, "INVALID_ARGUMENTS"),
    (CONFIG_ERROR, "CONFIG_ERROR"),
    (IO_ERROR, "IO_ERROR"),
    (NO_RELEASES, "NO_RELEASES"),
    (RATE_LIMITED, "RATE_LIMITED"),
    (REPO_NOT_FOUND, "REPO_NOT_FOUND"),
];

// ============================================================================
// HELPER FUNCTIONS
// ============================================================================

/// Get a human-readable description of an exit code
pub fn describe(code: i32) -> &'static str {
    match code {
        SUCCESS => "Success",
        GENERAL_ERROR => "General error",
        INVALID_ARGUMENTS => "Invalid command line arguments",
        CONFIG_ERROR => "Configuration error",
        IO_ERROR => "IO error",
        NO_RELEASES => "Repository has no releases",
        RATE_LIMITED => "Hosting API rate limit exceeded",
        REPO_NOT_FOUND => "Repository not found",
        _ => "Unknown error",
    }
}

/// Pick the exit code for an error that ended a command
pub fn for_error(err: &anyhow::Error) -> i32 {
    for cause in err.chain() {
        if let Some(e) = cause.downcast_ref::<HarvestError>() {
            return match e {
                HarvestError::Read { .. } | HarvestError::Write { .. } | HarvestError::Json { .. } => {
                    IO_ERROR
                }
                HarvestError::InvalidRepository(_) => INVALID_ARGUMENTS,
                HarvestError::Adapter(a) => for_adapter_error(a),
                HarvestError::Serialize(_) => GENERAL_ERROR,
            };
        }
        if let Some(e) = cause.downcast_ref::<AdapterError>() {
            return for_adapter_error(e);
        }
    }
    GENERAL_ERROR
}

fn for_adapter_error(err: &AdapterError) -> i32 {
    match err {
        AdapterError::NotFound(_) => REPO_NOT_FOUND,
        AdapterError::RateLimited(_) => RATE_LIMITED,
        AdapterError::ConfigError(_) => CONFIG_ERROR,
        _ => GENERAL_ERROR,
    }
}

//! Domain-level constants.
//!
//! These constants define business rules and validation requirements.

// =============================================================================
// Credentials
// =============================================================================

/// Length of the passwords issued on signup and recovery
pub const GENERATED_PASSWORD_LENGTH: usize = 8;

/// Length of a hex-encoded MD5 digest imported from the legacy store
pub const LEGACY_DIGEST_LENGTH: usize = 32;

// =============================================================================
// Pagination
// =============================================================================

/// Default number of items per page
pub const DEFAULT_PAGE_SIZE: u64 = 20;

/// Maximum allowed items per page to prevent excessive queries
pub const MAX_PAGE_SIZE: u64 = 100;

/// Default starting page number (1-indexed)
pub const DEFAULT_PAGE_NUMBER: u64 = 1;

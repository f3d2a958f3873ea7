/// Minimum accepted password length at registration
pub const MIN_PASSWORD_LEN: usize = 8;

/// Maximum accepted length for usernames, names and emails
pub const MAX_FIELD_LEN: usize = 255;

// =============================================================================
// Error Messages
// =============================================================================

/// Error message for an update payload with no fields set
pub const ERR_MISSING_FIELDS: &str = "Missing fields";

/// Error message for a duplicate username or email at registration
pub const ERR_DUPLICATE_USER: &str = "This username or email is already in use";

/// Error message for attempting to change own privileges
pub const ERR_SELF_PRIVILEGE: &str = "Cannot manage privileges of itself.";

// src/constants.rs
//
// Application-wide constants. Each is documented with its purpose and where it is used.

/// Directory under the platform config dir that holds the config file.
///
/// Used in: `infrastructure/config.rs`
pub const CONFIG_DIR_NAME: &str = "personal-notes";

/// Config file name inside `CONFIG_DIR_NAME`.
///
/// Used in: `infrastructure/config.rs`
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Environment variable that overrides `api.auth_token`.
///
/// Lets a freshly issued user-pool token be passed without editing the config file.
///
/// Used in: `infrastructure/config.rs`
pub const AUTH_TOKEN_ENV_VAR: &str = "PERSONAL_NOTES_AUTH_TOKEN";

/// Transport timeout for GraphQL and storage requests, in seconds.
///
/// Used in: `infrastructure/config.rs`
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

/// Lifetime of a resolved image URL, in seconds. Matches the platform's default.
///
/// Used in: `infrastructure/config.rs`, `infrastructure/storage.rs`
pub const DEFAULT_URL_EXPIRY_SECS: u64 = 900;

/// Delay in milliseconds after launching the browser before the process may exit.
///
/// The preview lives in a temp directory that is removed on exit; the browser needs
/// a moment to load the file first.
///
/// Used in: `infrastructure/renderer.rs`
pub const BROWSER_LAUNCH_DELAY_MS: u64 = 500;

//! Environment-driven settings.

use std::env;
use std::time::Duration;

use tracing::warn;

/// Environment variable holding the Anthropic API key.
pub const API_KEY_ENV_VAR: &str = "ANTHROPIC_API_KEY";

/// Environment variable that turns on debug logging.
pub const DEBUG_ENV_VAR: &str = "AUTOPR_DEBUG";

/// Environment variable to override the Claude timeout (seconds).
pub const TIMEOUT_ENV_VAR: &str = "AUTOPR_CLAUDE_TIMEOUT";

/// Default timeout for a Claude invocation (2 minutes).
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Remote every push, fetch and base-branch lookup targets.
pub const REMOTE: &str = "origin";

/// Get the configured Claude timeout.
///
/// Reads from AUTOPR_CLAUDE_TIMEOUT if set, otherwise uses the default of
/// 120 seconds. Logs a warning if the variable is set but is not a positive
/// integer.
pub fn claude_timeout() -> Duration {
    match env::var(TIMEOUT_ENV_VAR) {
        Ok(v) if !v.is_empty() => match v.parse::<u64>() {
            Ok(secs) if secs > 0 => Duration::from_secs(secs),
            _ => {
                warn!(
                    "Invalid {} value '{}', using default {}s",
                    TIMEOUT_ENV_VAR, v, DEFAULT_TIMEOUT_SECS
                );
                Duration::from_secs(DEFAULT_TIMEOUT_SECS)
            }
        },
        _ => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
    }
}

/// Whether AUTOPR_DEBUG asks for verbose diagnostics.
///
/// Any non-empty value other than `0` or `false` counts.
pub fn debug_enabled() -> bool {
    match env::var(DEBUG_ENV_VAR) {
        Ok(v) => {
            let v = v.trim().to_ascii_lowercase();
            !v.is_empty() && v != "0" && v != "false"
        }
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claude_timeout_default() {
        temp_env::with_var_unset(TIMEOUT_ENV_VAR, || {
            assert_eq!(claude_timeout(), Duration::from_secs(DEFAULT_TIMEOUT_SECS));
        });
    }

    #[test]
    fn test_claude_timeout_from_env() {
        temp_env::with_var(TIMEOUT_ENV_VAR, Some("45"), || {
            assert_eq!(claude_timeout(), Duration::from_secs(45));
        });
    }

    #[test]
    fn test_claude_timeout_invalid_env_uses_default() {
        temp_env::with_var(TIMEOUT_ENV_VAR, Some("soon"), || {
            assert_eq!(claude_timeout(), Duration::from_secs(DEFAULT_TIMEOUT_SECS));
        });
    }

    #[test]
    fn test_claude_timeout_zero_uses_default() {
        temp_env::with_var(TIMEOUT_ENV_VAR, Some("0"), || {
            assert_eq!(claude_timeout(), Duration::from_secs(DEFAULT_TIMEOUT_SECS));
        });
    }

    #[test]
    fn test_debug_enabled_values() {
        temp_env::with_var_unset(DEBUG_ENV_VAR, || assert!(!debug_enabled()));
        temp_env::with_var(DEBUG_ENV_VAR, Some("1"), || assert!(debug_enabled()));
        temp_env::with_var(DEBUG_ENV_VAR, Some("true"), || assert!(debug_enabled()));
        temp_env::with_var(DEBUG_ENV_VAR, Some("0"), || assert!(!debug_enabled()));
        temp_env::with_var(DEBUG_ENV_VAR, Some("FALSE"), || assert!(!debug_enabled()));
        temp_env::with_var(DEBUG_ENV_VAR, Some(""), || assert!(!debug_enabled()));
    }
}

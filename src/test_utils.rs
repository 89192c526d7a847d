//! Test utilities for Scribe
//!
//! This module provides common test utilities including temporary data
//! directories, sample configuration, and assertion helpers.

use crate::error::Result;
use crate::storage::StoreLocation;
use tempfile::TempDir;

/// Create a temporary directory for testing
///
/// # Returns
///
/// Returns a TempDir that will be cleaned up when dropped
pub fn temp_dir() -> TempDir {
    TempDir::new().expect("Failed to create temporary directory")
}

/// Store location inside a fresh temporary directory
///
/// Keep the returned TempDir alive for as long as the store is used.
pub fn temp_location() -> (StoreLocation, TempDir) {
    let dir = temp_dir();
    (StoreLocation::Directory(dir.path().to_path_buf()), dir)
}

/// Assert that an error contains the expected message
///
/// # Arguments
///
/// * `result` - Result to check
/// * `expected` - Expected error message substring
///
/// # Panics
///
/// Panics if the result is Ok or if the error doesn't contain the expected message
pub fn assert_error_contains<T>(result: Result<T>, expected: &str) {
    match result {
        Ok(_) => panic!("Expected error containing '{}' but got Ok", expected),
        Err(e) => {
            let error_msg = e.to_string();
            assert!(
                error_msg.contains(expected),
                "Error message '{}' does not contain '{}'",
                error_msg,
                expected
            );
        }
    }
}

/// Create a test configuration YAML string
///
/// # Returns
///
/// Returns a YAML string with test configuration
pub fn test_config_yaml() -> String {
    r#"
storage:
  data_dir: /tmp/scribe-test
chat:
  api_base: http://localhost:8080/api/v1
  default_model: openai/gpt-4o-mini
  timeout_seconds: 30
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::error::ScribeError;

    #[test]
    fn test_temp_dir_creation() {
        let dir = temp_dir();
        assert!(dir.path().exists());
    }

    #[test]
    fn test_temp_location_points_into_dir() {
        let (location, dir) = temp_location();
        assert_eq!(location, StoreLocation::Directory(dir.path().to_path_buf()));
    }

    #[test]
    fn test_assert_error_contains_success() {
        let result: Result<()> = Err(ScribeError::Config("test error message".to_string()).into());
        assert_error_contains(result, "test error");
    }

    #[test]
    #[should_panic(expected = "Expected error containing")]
    fn test_assert_error_contains_ok() {
        let result: Result<()> = Ok(());
        assert_error_contains(result, "error");
    }

    #[test]
    #[should_panic(expected = "does not contain")]
    fn test_assert_error_contains_wrong_message() {
        let result: Result<()> = Err(ScribeError::Config("different error".to_string()).into());
        assert_error_contains(result, "not present");
    }

    #[test]
    fn test_test_config_yaml() {
        let yaml = test_config_yaml();
        let config: Config = serde_yaml::from_str(&yaml).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.chat.default_model, "openai/gpt-4o-mini");
    }
}

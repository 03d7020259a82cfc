use crate::utils::error::{HarnessError, Result};
use regex::Regex;
use std::collections::HashSet;
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(HarnessError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: "URL cannot be empty".to_string(),
        });
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(HarnessError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: url_str.to_string(),
                reason: format!("Unsupported URL scheme: {}", scheme),
            }),
        },
        Err(e) => Err(HarnessError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: format!("Invalid URL format: {}", e),
        }),
    }
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(HarnessError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(HarnessError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

/// Package and service names follow the universe naming rules: lowercase
/// alphanumerics and dashes, starting and ending with an alphanumeric.
pub fn validate_package_name(field_name: &str, name: &str) -> Result<()> {
    let pattern =
        Regex::new(r"^[a-z0-9]([a-z0-9-]*[a-z0-9])?(/[a-z0-9]([a-z0-9-]*[a-z0-9])?)*$").map_err(
            |e| HarnessError::ConfigError {
                message: format!("Invalid package name pattern: {}", e),
            },
        )?;

    if !pattern.is_match(name) {
        return Err(HarnessError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: name.to_string(),
            reason: "Expected lowercase alphanumerics and dashes, e.g. my-service".to_string(),
        });
    }

    Ok(())
}

pub fn validate_positive_number(field_name: &str, value: usize, min_value: usize) -> Result<()> {
    if value < min_value {
        return Err(HarnessError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be at least {}", min_value),
        });
    }
    Ok(())
}

pub fn validate_file_extensions(
    field_name: &str,
    files: &[String],
    allowed_extensions: &[&str],
) -> Result<()> {
    let allowed_set: HashSet<&str> = allowed_extensions.iter().copied().collect();

    for file in files {
        if let Some(extension) = std::path::Path::new(file)
            .extension()
            .and_then(|ext| ext.to_str())
        {
            if !allowed_set.contains(extension) {
                return Err(HarnessError::InvalidConfigValueError {
                    field: field_name.to_string(),
                    value: file.clone(),
                    reason: format!(
                        "Unsupported file extension: {}. Allowed extensions: {}",
                        extension,
                        allowed_extensions.join(", ")
                    ),
                });
            }
        } else {
            return Err(HarnessError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: file.clone(),
                reason: "File has no extension or invalid filename".to_string(),
            });
        }
    }

    Ok(())
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(HarnessError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(HarnessError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be between {} and {}", min, max),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url() {
        assert!(validate_url("cluster_url", "https://example.com").is_ok());
        assert!(validate_url("cluster_url", "http://127.0.0.1").is_ok());
        assert!(validate_url("cluster_url", "").is_err());
        assert!(validate_url("cluster_url", "invalid-url").is_err());
        assert!(validate_url("cluster_url", "ftp://example.com").is_err());
    }

    #[test]
    fn test_validate_package_name() {
        assert!(validate_package_name("package", "keystore").is_ok());
        assert!(validate_package_name("package", "my-service-2").is_ok());
        assert!(validate_package_name("service", "folder/my-service").is_ok());
        assert!(validate_package_name("package", "Keystore").is_err());
        assert!(validate_package_name("package", "-leading-dash").is_err());
        assert!(validate_package_name("package", "trailing-").is_err());
        assert!(validate_package_name("package", "").is_err());
    }

    #[test]
    fn test_validate_positive_number() {
        assert!(validate_positive_number("expected_running_tasks", 5, 1).is_ok());
        assert!(validate_positive_number("expected_running_tasks", 0, 1).is_err());
    }

    #[test]
    fn test_validate_file_extensions() {
        let files = vec!["svc.yml".to_string(), "options.json".to_string()];
        assert!(validate_file_extensions("config", &files, &["yml", "yaml", "json"]).is_ok());

        let invalid_files = vec!["config.txt".to_string()];
        assert!(validate_file_extensions("config", &invalid_files, &["yml", "yaml", "json"]).is_err());
    }

    #[test]
    fn test_validate_range() {
        assert!(validate_range("timeout_seconds", 1500u64, 1, 86_400).is_ok());
        assert!(validate_range("timeout_seconds", 0u64, 1, 86_400).is_err());
    }
}

//! Validation of node identifiers from the run configuration.
//!
//! Aliases end up in log lines, failure reports and generated config files;
//! hosts end up on the `ssh` command line. Both are checked before any node
//! handle is built.

use anyhow::{bail, Result};

/// Maximum allowed length for node aliases.
pub const MAX_ALIAS_LENGTH: usize = 64;

/// Maximum allowed length for hosts and addresses.
pub const MAX_HOST_LENGTH: usize = 253;

/// Validates a node alias.
///
/// An alias is valid if:
/// - It is not empty
/// - It is no longer than MAX_ALIAS_LENGTH characters
/// - It contains only alphanumeric characters, dashes, underscores and dots
/// - It does not start with a dash or a dot
///
/// # Examples
///
/// ```
/// use clusterforge::validation::validate_alias;
///
/// assert!(validate_alias("master").is_ok());
/// assert!(validate_alias("data-node_2").is_ok());
/// assert!(validate_alias("").is_err());
/// assert!(validate_alias("-oProxyCommand").is_err());
/// ```
pub fn validate_alias(alias: &str) -> Result<()> {
    if alias.is_empty() {
        bail!("Node alias cannot be empty");
    }

    if alias.len() > MAX_ALIAS_LENGTH {
        bail!(
            "Node alias too long: {} characters (max {})",
            alias.len(),
            MAX_ALIAS_LENGTH
        );
    }

    let valid_chars = alias
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.');
    if !valid_chars {
        bail!("Node alias '{alias}' contains invalid characters. Use only alphanumeric characters, dashes (-), underscores (_) and dots (.)");
    }

    if alias.starts_with('-') || alias.starts_with('.') {
        bail!("Node alias '{alias}' cannot start with '-' or '.'");
    }

    Ok(())
}

/// Validates a host name or IP address.
///
/// Rejects whitespace, shell metacharacters and a leading dash, which ssh
/// would parse as an option.
pub fn validate_host(host: &str) -> Result<()> {
    if host.is_empty() {
        bail!("Host cannot be empty");
    }

    if host.len() > MAX_HOST_LENGTH {
        bail!(
            "Host too long: {} characters (max {})",
            host.len(),
            MAX_HOST_LENGTH
        );
    }

    if host.starts_with('-') {
        bail!("Host '{host}' cannot start with '-'");
    }

    let valid_chars = host
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | ':' | '[' | ']'));
    if !valid_chars {
        bail!("Host '{host}' contains invalid characters");
    }

    Ok(())
}

/// Validates a database credential value.
///
/// Credentials are spliced into scripts line by line, so line breaks and NUL
/// are rejected. The value itself never appears in the error.
pub fn validate_credential(field: &str, value: &str) -> Result<()> {
    if value.contains(['\n', '\r', '\0']) {
        bail!("{field} cannot contain line breaks or NUL characters");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_aliases() {
        assert!(validate_alias("master").is_ok());
        assert!(validate_alias("data-1").is_ok());
        assert!(validate_alias("node_001").is_ok());
        assert!(validate_alias("sql.eu-west").is_ok());
        assert!(validate_alias(&"a".repeat(MAX_ALIAS_LENGTH)).is_ok());
    }

    #[test]
    fn test_empty_alias() {
        let err = validate_alias("").unwrap_err();
        assert!(err.to_string().contains("cannot be empty"));
    }

    #[test]
    fn test_alias_too_long() {
        let err = validate_alias(&"a".repeat(MAX_ALIAS_LENGTH + 1)).unwrap_err();
        assert!(err.to_string().contains("too long"));
    }

    #[test]
    fn test_alias_invalid_characters() {
        for alias in ["data 1", "data/1", "data;rm", "$(id)", "node\n"] {
            assert!(validate_alias(alias).is_err(), "{alias:?} should be rejected");
        }
    }

    #[test]
    fn test_alias_leading_dash_or_dot() {
        assert!(validate_alias("-node").is_err());
        assert!(validate_alias(".hidden").is_err());
    }

    #[test]
    fn test_valid_hosts() {
        assert!(validate_host("10.0.0.12").is_ok());
        assert!(validate_host("ip-10-0-0-12.ec2.internal").is_ok());
        assert!(validate_host("[fe80::1]").is_ok());
        assert!(validate_host("fe80::1").is_ok());
    }

    #[test]
    fn test_invalid_hosts() {
        assert!(validate_host("").is_err());
        assert!(validate_host("-oProxyCommand=sh").is_err());
        assert!(validate_host("host name").is_err());
        assert!(validate_host("host;reboot").is_err());
        assert!(validate_host(&"h".repeat(MAX_HOST_LENGTH + 1)).is_err());
    }

    #[test]
    fn test_credential_line_breaks_rejected() {
        assert!(validate_credential("db_password", "it's s3cret; $(x)").is_ok());
        for value in ["pw\nSQL\nreboot", "pw\r", "pw\0"] {
            let err = validate_credential("db_password", value).unwrap_err();
            assert!(err.to_string().contains("db_password"));
            assert!(!err.to_string().contains("pw"));
        }
    }
}

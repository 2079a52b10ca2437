//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, bounded retry budget)
//! - Check URLs parse and use a web scheme
//!
//! Returns all violations, not just the first.

use crate::config::schema::AppConfig;

/// A single semantic configuration violation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigViolation {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ConfigViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Largest retry budget we accept; anything bigger is a misconfiguration.
const MAX_RETRY_BUDGET: u32 = 10;

/// Validate semantics of a parsed configuration.
pub fn validate_config(config: &AppConfig) -> Result<(), Vec<ConfigViolation>> {
    let mut violations = Vec::new();

    check_web_url(&mut violations, "ledger.base_url", &config.ledger.base_url);
    for (i, url) in config.ledger.failover_urls.iter().enumerate() {
        check_web_url(&mut violations, &format!("ledger.failover_urls[{i}]"), url);
    }
    check_nonzero(
        &mut violations,
        "ledger.request_timeout_secs",
        config.ledger.request_timeout_secs,
    );

    check_nonzero(
        &mut violations,
        "wallet.signature_timeout_secs",
        config.wallet.signature_timeout_secs,
    );
    if config.wallet.session_file.trim().is_empty() {
        violations.push(ConfigViolation {
            field: "wallet.session_file".to_string(),
            message: "must not be empty".to_string(),
        });
    }

    if config.submission.max_retries > MAX_RETRY_BUDGET {
        violations.push(ConfigViolation {
            field: "submission.max_retries".to_string(),
            message: format!("must be at most {MAX_RETRY_BUDGET}"),
        });
    }
    check_nonzero(
        &mut violations,
        "submission.poll_interval_ms",
        config.submission.poll_interval_ms,
    );
    check_nonzero(
        &mut violations,
        "submission.max_wait_secs",
        config.submission.max_wait_secs,
    );
    check_nonzero(
        &mut violations,
        "submission.backoff_base_ms",
        config.submission.backoff_base_ms,
    );

    check_web_url(
        &mut violations,
        "verification.base_url",
        &config.verification.base_url,
    );

    if violations.is_empty() {
        Ok(())
    } else {
        Err(violations)
    }
}

fn check_nonzero(violations: &mut Vec<ConfigViolation>, field: &str, value: u64) {
    if value == 0 {
        violations.push(ConfigViolation {
            field: field.to_string(),
            message: "must be greater than zero".to_string(),
        });
    }
}

fn check_web_url(violations: &mut Vec<ConfigViolation>, field: &str, value: &str) {
    match value.parse::<url::Url>() {
        Ok(url) if url.scheme() == "http" || url.scheme() == "https" => {}
        Ok(url) => violations.push(ConfigViolation {
            field: field.to_string(),
            message: format!("unsupported scheme '{}'", url.scheme()),
        }),
        Err(e) => violations.push(ConfigViolation {
            field: field.to_string(),
            message: format!("invalid URL: {e}"),
        }),
    }
}

//! Check job and submission handle

use crate::types::{AppError, CheckType, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::sync::OnceLock;

fn hostname_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9_]([A-Za-z0-9_-]*[A-Za-z0-9_])?(\.[A-Za-z0-9_]([A-Za-z0-9_-]*[A-Za-z0-9_])?)*\.?$")
            .expect("hostname pattern compiles")
    })
}

fn invalid_host(host: &str) -> AppError {
    AppError::invalid_request(format!("Invalid host format: {}", host))
}

/// Split a trailing `:port` off a host name or IPv4 address
fn split_port(host: &str) -> Result<(&str, Option<u16>)> {
    match host.rsplit_once(':') {
        Some((name, port)) if !name.contains(':') && !port.is_empty() && port.chars().all(|c| c.is_ascii_digit()) => {
            match port.parse::<u16>() {
                Ok(port) if port > 0 => Ok((name, Some(port))),
                _ => Err(invalid_host(host)),
            }
        }
        _ => Ok((host, None)),
    }
}

/// Validate a probe target: an IP literal, an http(s) URL, or a dotted
/// host name, each optionally followed by `:port`.
///
/// Internationalized names are converted to their punycode form.
pub fn validate_host(host: &str) -> Result<String> {
    let host = host.trim();

    if host.parse::<IpAddr>().is_ok() {
        return Ok(host.to_string());
    }

    if host.starts_with("http://") || host.starts_with("https://") {
        let parsed = url::Url::parse(host)
            .map_err(|e| AppError::invalid_request(format!("Invalid host format: {} ({})", host, e)))?;
        if parsed.host_str().is_some() {
            return Ok(host.to_string());
        }
        return Err(invalid_host(host));
    }

    let (name, port) = split_port(host)?;
    let with_port = |name: &str| match port {
        Some(port) => format!("{}:{}", name, port),
        None => name.to_string(),
    };

    if name.parse::<IpAddr>().is_ok() {
        return Ok(with_port(name));
    }

    match url::Host::parse(name) {
        Ok(url::Host::Domain(ascii)) if ascii.contains('.') && hostname_pattern().is_match(&ascii) => {
            Ok(with_port(&ascii))
        }
        _ => Err(invalid_host(host)),
    }
}

/// A validated probe request, immutable once built
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckJob {
    check_type: CheckType,
    target_host: String,
    requested_nodes: Vec<String>,
}

impl CheckJob {
    /// Build a job, rejecting malformed hosts and empty node sets.
    ///
    /// Duplicate node identifiers are dropped, keeping first occurrence order.
    pub fn new<I, S>(check_type: CheckType, target_host: &str, nodes: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let target_host = validate_host(target_host)?;

        let mut requested_nodes: Vec<String> = Vec::new();
        for node in nodes {
            let node = node.into();
            let node = node.trim();
            if !node.is_empty() && !requested_nodes.iter().any(|existing| existing == node) {
                requested_nodes.push(node.to_string());
            }
        }

        if requested_nodes.is_empty() {
            return Err(AppError::invalid_request("Node selection is empty"));
        }

        Ok(Self {
            check_type,
            target_host,
            requested_nodes,
        })
    }

    pub fn check_type(&self) -> CheckType {
        self.check_type
    }

    pub fn target_host(&self) -> &str {
        &self.target_host
    }

    pub fn requested_nodes(&self) -> &[String] {
        &self.requested_nodes
    }

    pub fn node_count(&self) -> usize {
        self.requested_nodes.len()
    }
}

/// Identifier returned by the service for a submitted job
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobHandle {
    pub request_id: String,
    #[serde(default)]
    pub permanent_link: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_host_accepts_ip_domain_and_url() {
        assert_eq!(validate_host("1.1.1.1").unwrap(), "1.1.1.1");
        assert_eq!(validate_host("2001:db8::1").unwrap(), "2001:db8::1");
        assert_eq!(validate_host(" example.com ").unwrap(), "example.com");
        assert_eq!(validate_host("https://example.com/path").unwrap(), "https://example.com/path");
    }

    #[test]
    fn test_validate_host_accepts_port_and_idn() {
        assert_eq!(validate_host("example.com:8080").unwrap(), "example.com:8080");
        assert_eq!(validate_host("1.1.1.1:53").unwrap(), "1.1.1.1:53");
        assert_eq!(validate_host("bücher.de").unwrap(), "xn--bcher-kva.de");
        assert_eq!(validate_host("Bücher.de:443").unwrap(), "xn--bcher-kva.de:443");

        for bad in ["example.com:0", "example.com:99999", "example.com:", "bücher"] {
            assert!(validate_host(bad).is_err(), "host {:?} should be rejected", bad);
        }
    }

    #[test]
    fn test_validate_host_rejects_garbage() {
        for bad in ["", "localhost", "exa mple.com", "http://", "..."] {
            let err = validate_host(bad).unwrap_err();
            assert_eq!(err.category(), "REQUEST", "host {:?} should be rejected", bad);
            assert!(err.to_string().contains("Invalid host format"));
        }
    }

    #[test]
    fn test_check_job_dedups_nodes_in_order() {
        let job = CheckJob::new(
            CheckType::Ping,
            "example.com",
            vec!["b.node", "a.node", "b.node", "c.node"],
        )
        .unwrap();

        assert_eq!(job.requested_nodes(), ["b.node", "a.node", "c.node"]);
        assert_eq!(job.node_count(), 3);
        assert_eq!(job.check_type(), CheckType::Ping);
        assert_eq!(job.target_host(), "example.com");
    }

    #[test]
    fn test_check_job_rejects_empty_nodes() {
        let err = CheckJob::new(CheckType::Http, "example.com", Vec::<String>::new()).unwrap_err();
        assert_eq!(err.category(), "REQUEST");

        let err = CheckJob::new(CheckType::Http, "example.com", vec!["  "]).unwrap_err();
        assert!(err.to_string().contains("empty"));
    }

    #[test]
    fn test_job_handle_deserializes_without_link() {
        let handle: JobHandle = serde_json::from_str(r#"{"request_id": "abc"}"#).unwrap();
        assert_eq!(handle.request_id, "abc");
        assert!(handle.permanent_link.is_empty());
    }
}

//! Sanity checks for a loaded configuration.

use std::collections::HashSet;

use anyhow::{Result, anyhow};
use portwatch::{DestinationConfig, EndpointConfig};
use url::Url;

/// Inclusive bounds for a setting measured in seconds
struct SecondsRange {
    label: &'static str,
    min: u64,
    max: u64,
}

impl SecondsRange {
    fn check(&self, seconds: u64) -> Result<()> {
        if seconds < self.min {
            return Err(anyhow!("{} too short: {} seconds (minimum: {})", self.label, seconds, self.min));
        }
        if seconds > self.max {
            return Err(anyhow!("{} too long: {} seconds (maximum: {})", self.label, seconds, self.max));
        }
        Ok(())
    }
}

const CHECK_INTERVAL: SecondsRange = SecondsRange { label: "Check interval", min: 1, max: 86400 };
const PROBE_TIMEOUT: SecondsRange = SecondsRange { label: "Timeout", min: 1, max: 300 };

pub fn validate_check_interval(interval_seconds: u64) -> Result<()> {
    CHECK_INTERVAL.check(interval_seconds)
}

/// The probe timeout may not exceed five minutes
pub fn validate_timeout(timeout_seconds: u64) -> Result<()> {
    PROBE_TIMEOUT.check(timeout_seconds)
}

/// Endpoints need a name, a host and a non-zero port. Names and `host:port`
/// pairs must be unique.
pub fn validate_endpoints(endpoints: &[EndpointConfig]) -> Result<()> {
    let mut names = HashSet::new();
    let mut keys = HashSet::new();

    for endpoint in endpoints {
        let name = endpoint.name.trim();
        if name.is_empty() {
            return Err(anyhow!("Endpoint name cannot be empty ({})", endpoint.key()));
        }
        if endpoint.host.trim().is_empty() {
            return Err(anyhow!("Endpoint {} has no host", name));
        }
        if endpoint.port == 0 {
            return Err(anyhow!("Endpoint {}: port 0 is not valid", name));
        }
        if !names.insert(name.to_lowercase()) {
            return Err(anyhow!("Duplicate endpoint name: {}", name));
        }
        if !keys.insert(endpoint.key()) {
            return Err(anyhow!("Endpoint {} duplicates address {}", name, endpoint.key()));
        }
    }

    Ok(())
}

/// Validate a destination's base URL
pub fn validate_destination(destination: &DestinationConfig) -> Result<()> {
    let base_url = destination.base_url.trim();
    if base_url.is_empty() {
        return Err(anyhow!("Destination base URL cannot be empty"));
    }

    let url = Url::parse(base_url).map_err(|e| {
        if base_url.contains("://") {
            anyhow!("Invalid destination URL {}: {}", base_url, e)
        } else {
            anyhow!("Destination URL must include scheme (http:// or https://): {}", base_url)
        }
    })?;

    match url.scheme() {
        "http" | "https" => {}
        other => return Err(anyhow!("Invalid scheme '{}' for destination {}", other, base_url)),
    }

    if url.host_str().is_none() {
        return Err(anyhow!("Destination URL must have a valid host: {}", base_url));
    }

    if destination.enabled && destination.token.trim().is_empty() {
        return Err(anyhow!("Destination {} has no token", destination.display_name()));
    }

    Ok(())
}

/// Allow-list entries of enabled, filtered destinations that name no configured endpoint
pub fn unmatched_allow_list_entries(
    endpoints: &[EndpointConfig],
    destinations: &[DestinationConfig],
) -> Vec<(String, String)> {
    let names: HashSet<String> = endpoints.iter().map(|e| e.name.trim().to_lowercase()).collect();
    let known = &names;

    destinations
        .iter()
        .filter(|d| d.enabled && !d.monitor_all)
        .flat_map(|d| {
            d.monitored_endpoints
                .iter()
                .filter(move |entry| !known.contains(&entry.trim().to_lowercase()))
                .map(move |entry| (d.display_name().to_string(), entry.trim().to_string()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_check_interval() {
        assert!(validate_check_interval(1).is_ok()); // Min
        assert!(validate_check_interval(30).is_ok()); // Normal
        assert!(validate_check_interval(86400).is_ok()); // Max

        assert!(validate_check_interval(0).is_err()); // Too short
        assert!(validate_check_interval(100000).is_err()); // Too long
    }

    #[test]
    fn test_validate_timeout() {
        assert!(validate_timeout(1).is_ok());
        assert!(validate_timeout(300).is_ok());

        assert!(validate_timeout(0).is_err());
        assert!(validate_timeout(301).is_err());
    }

    #[test]
    fn test_range_errors_name_the_setting() {
        let short = validate_check_interval(0).unwrap_err().to_string();
        assert_eq!(short, "Check interval too short: 0 seconds (minimum: 1)");

        let long = validate_timeout(301).unwrap_err().to_string();
        assert_eq!(long, "Timeout too long: 301 seconds (maximum: 300)");
    }

    #[test]
    fn test_validate_endpoints() {
        let api = EndpointConfig::new("api", "api.internal", 443);
        let db = EndpointConfig::new("db", "10.0.0.5", 5432);
        assert!(validate_endpoints(&[api.clone(), db.clone()]).is_ok());
        assert!(validate_endpoints(&[]).is_ok());

        // Invalid - empty name or host, port 0
        assert!(validate_endpoints(&[EndpointConfig::new(" ", "h", 1)]).is_err());
        assert!(validate_endpoints(&[EndpointConfig::new("a", "", 1)]).is_err());
        assert!(validate_endpoints(&[EndpointConfig::new("a", "h", 0)]).is_err());

        // Invalid - duplicates
        assert!(validate_endpoints(&[api.clone(), EndpointConfig::new("API", "other", 1)]).is_err());
        assert!(validate_endpoints(&[api, EndpointConfig::new("mirror", "api.internal", 443)]).is_err());
    }

    #[test]
    fn test_validate_destination() {
        assert!(validate_destination(&DestinationConfig::new("https://gotify.example.com", "t")).is_ok());
        assert!(validate_destination(&DestinationConfig::new("http://10.0.0.2:8080/", "t")).is_ok());

        // Invalid - scheme, missing scheme, empty
        assert!(validate_destination(&DestinationConfig::new("ftp://gotify.example.com", "t")).is_err());
        assert!(validate_destination(&DestinationConfig::new("gotify.example.com", "t")).is_err());
        assert!(validate_destination(&DestinationConfig::new("", "t")).is_err());

        // Missing token only matters for enabled destinations
        assert!(validate_destination(&DestinationConfig::new("https://gotify.example.com", "")).is_err());
        assert!(
            validate_destination(&DestinationConfig::new("https://gotify.example.com", "").disabled()).is_ok()
        );
    }

    #[test]
    fn test_unmatched_allow_list_entries() {
        let endpoints = vec![EndpointConfig::new("Api", "a", 1), EndpointConfig::new("db", "b", 2)];
        let destinations = vec![
            DestinationConfig::new("https://a", "t").named("team").monitoring([" api ", "cache"]),
            DestinationConfig::new("https://b", "t").monitoring_all().monitoring(["ghost"]),
            DestinationConfig::new("https://c", "t").disabled().monitoring(["ghost"]),
        ];

        let unmatched = unmatched_allow_list_entries(&endpoints, &destinations);

        assert_eq!(unmatched, vec![("team".to_string(), "cache".to_string())]);
    }
}

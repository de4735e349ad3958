/// Request-layer configuration handed to the rendering subsystem as an
/// explicit object rather than process-wide mutable state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestConfig {
    pub portal_url: Option<String>,
    pub proxy_url: Option<String>,
    pub geometry_service_url: Option<String>,
    pub trusted_servers: Vec<TrustedHost>,
}

/// A cross-origin host requests may send credentials to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrustedHost {
    pub host: String,
    pub with_credentials: bool,
}

impl RequestConfig {
    /// Register a trusted, credentialed host. Empty names are ignored.
    pub fn add_trusted_host(&mut self, host: &str) {
        if host.is_empty() {
            return;
        }
        self.trusted_servers.push(TrustedHost {
            host: host.to_string(),
            with_credentials: true,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_hosts_are_ignored() {
        let mut config = RequestConfig::default();
        config.add_trusted_host("a.example.net");
        config.add_trusted_host("");
        config.add_trusted_host("b.example.net");

        assert_eq!(config.trusted_servers.len(), 2);
        assert!(config.trusted_servers.iter().all(|h| h.with_credentials));
    }
}

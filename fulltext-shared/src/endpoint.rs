//! Search engine endpoint descriptors.

use serde::{Deserialize, Serialize};

/// Protocol used when a catalog record does not name one.
pub const DEFAULT_PROTOCOL: &str = "http";

/// One external search engine node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceEndpoint {
    /// `http` or `https`.
    pub protocol: String,
    /// `host:port` of the node.
    pub address: String,
    /// Basic auth user, if the node requires one.
    pub user: Option<String>,
    /// Basic auth password.
    pub password: Option<String>,
}

impl ServiceEndpoint {
    /// Create an endpoint without credentials.
    pub fn new(protocol: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            protocol: protocol.into(),
            address: address.into(),
            user: None,
            password: None,
        }
    }

    /// Parse `protocol://host:port` or a bare `host:port`.
    pub fn parse(spec: &str) -> Self {
        match spec.trim().split_once("://") {
            Some((protocol, address)) => Self::new(protocol, address.trim_end_matches('/')),
            None => Self::new(DEFAULT_PROTOCOL, spec.trim().trim_end_matches('/')),
        }
    }

    /// Attach basic auth credentials.
    pub fn with_credentials(
        mut self,
        user: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.user = Some(user.into());
        self.password = Some(password.into());
        self
    }

    /// Base URL of the node, e.g. `http://127.0.0.1:9200`.
    pub fn url(&self) -> String {
        format!("{}://{}", self.protocol, self.address)
    }

    /// Credentials are only usable when both halves are present.
    pub fn credentials(&self) -> Option<(&str, &str)> {
        match (&self.user, &self.password) {
            (Some(user), Some(password)) => Some((user.as_str(), password.as_str())),
            _ => None,
        }
    }
}

/// A search service record as stored in the schema catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceClient {
    pub host: String,
    pub conn_type: Option<String>,
    pub user: Option<String>,
    pub pwd: Option<String>,
}

impl From<&ServiceClient> for ServiceEndpoint {
    fn from(client: &ServiceClient) -> Self {
        let protocol = client
            .conn_type
            .clone()
            .unwrap_or_else(|| DEFAULT_PROTOCOL.to_string());
        let mut endpoint = ServiceEndpoint::new(protocol, client.host.clone());
        if let Some(user) = &client.user {
            endpoint.user = Some(user.clone());
            endpoint.password = client.pwd.clone();
        }
        endpoint
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_with_protocol() {
        let endpoint = ServiceEndpoint::parse("https://search.local:9200/");
        assert_eq!(endpoint.protocol, "https");
        assert_eq!(endpoint.address, "search.local:9200");
        assert_eq!(endpoint.url(), "https://search.local:9200");
    }

    #[test]
    fn test_parse_bare_address() {
        let endpoint = ServiceEndpoint::parse(" 127.0.0.1:9200 ");
        assert_eq!(endpoint.protocol, "http");
        assert_eq!(endpoint.url(), "http://127.0.0.1:9200");
        assert!(endpoint.credentials().is_none());
    }

    #[test]
    fn test_from_service_client() {
        let client = ServiceClient {
            host: "10.0.0.1:9200".to_string(),
            conn_type: None,
            user: Some("elastic".to_string()),
            pwd: Some("secret".to_string()),
        };

        let endpoint = ServiceEndpoint::from(&client);
        assert_eq!(endpoint.protocol, DEFAULT_PROTOCOL);
        assert_eq!(endpoint.credentials(), Some(("elastic", "secret")));
    }

    #[test]
    fn test_user_without_password_has_no_credentials() {
        let client = ServiceClient {
            host: "10.0.0.1:9200".to_string(),
            conn_type: Some("https".to_string()),
            user: Some("elastic".to_string()),
            pwd: None,
        };

        let endpoint = ServiceEndpoint::from(&client);
        assert_eq!(endpoint.protocol, "https");
        assert!(endpoint.credentials().is_none());
    }
}

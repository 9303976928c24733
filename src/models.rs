// Core data structures for the reachability service

use serde::{Deserialize, Serialize};

/// Candidate server endpoint
///
/// A server has no identity beyond its URL. Duplicate entries are allowed
/// and each one is probed on its own.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Server {
    pub url: String,   // e.g. "https://github.com"
    pub priority: i64, // lower value sorts first
}

impl Server {
    /// Create a server entry
    pub fn new(url: impl Into<String>, priority: i64) -> Self {
        Self {
            url: url.into(),
            priority,
        }
    }

    /// Check whether this server belongs to the requested priority tier
    ///
    /// `None` matches every tier.
    pub fn matches_priority(&self, priority: Option<i64>) -> bool {
        match priority {
            Some(p) => self.priority == p,
            None => true,
        }
    }
}

/// Response body for `GET /servers`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetServersResponse {
    pub servers: Vec<Server>,
}

impl GetServersResponse {
    /// Wrap an already ordered list of reachable servers
    pub fn new(servers: Vec<Server>) -> Self {
        Self { servers }
    }

    /// Response with no servers
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.servers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.servers.is_empty()
    }
}

impl From<Vec<Server>> for GetServersResponse {
    fn from(servers: Vec<Server>) -> Self {
        Self::new(servers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matches_priority() {
        let server = Server::new("https://github.com", 4);

        assert!(server.matches_priority(None));
        assert!(server.matches_priority(Some(4)));
        assert!(!server.matches_priority(Some(1)));
    }

    #[test]
    fn test_zero_priority_is_a_real_filter() {
        let server = Server::new("https://github.com", 4);
        assert!(!server.matches_priority(Some(0)));

        let zero = Server::new("https://gitlab.com", 0);
        assert!(zero.matches_priority(Some(0)));
    }

    #[test]
    fn test_response_serialization() {
        let response = GetServersResponse::new(vec![Server::new("https://github.com", 1)]);
        let json = serde_json::to_string(&response).unwrap();

        assert_eq!(
            json,
            r#"{"servers":[{"url":"https://github.com","priority":1}]}"#
        );
    }

    #[test]
    fn test_empty_response() {
        let response = GetServersResponse::empty();
        assert!(response.is_empty());
        assert_eq!(serde_json::to_string(&response).unwrap(), r#"{"servers":[]}"#);
    }
}

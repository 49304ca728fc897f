//! Admin credentials
//!
//! The dashboard's login is a convenience gate for the admin forms: the
//! backend checks the username/password pair once, and afterwards every write
//! carries it as an HTTP Basic `Authorization` header.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::api::ApiClient;
use crate::error::{Error, Result};

#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    username: String,
    header: String,
}

impl Credential {
    pub fn basic(username: &str, password: &str) -> Self {
        let token = STANDARD.encode(format!("{}:{}", username, password));
        Self {
            username: username.to_string(),
            header: format!("Basic {}", token),
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    /// Value for the `Authorization` header
    pub fn header_value(&self) -> &str {
        &self.header
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

/// Check a username/password pair against the backend and build the
/// credential used for subsequent writes.
pub async fn login(client: &ApiClient, username: &str, password: &str) -> Result<Credential> {
    let username = username.trim();
    if username.is_empty() || password.is_empty() {
        return Err(Error::InvalidInput(
            "Username and password are required".to_string(),
        ));
    }

    if !client.verify_credentials(username, password).await? {
        return Err(Error::Unauthorized("Authentication failed".to_string()));
    }

    tracing::info!(username, "admin login verified");
    Ok(Credential::basic(username, password))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_header() {
        let credential = Credential::basic("admin", "secret");
        assert_eq!(credential.header_value(), "Basic YWRtaW46c2VjcmV0");
        assert_eq!(credential.username(), "admin");
    }

    #[test]
    fn test_debug_hides_header() {
        let credential = Credential::basic("admin", "secret");
        let printed = format!("{:?}", credential);
        assert!(printed.contains("admin"));
        assert!(!printed.contains("YWRtaW46c2VjcmV0"));
    }

    #[tokio::test]
    async fn test_login_rejects_blank_fields_without_network() {
        // Port 9 is discard; nothing is sent because validation fails first.
        let client = ApiClient::new("http://127.0.0.1:9/api").unwrap();

        let err = login(&client, "   ", "secret").await.unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));

        let err = login(&client, "admin", "").await.unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }
}

/// Synchronous integration with the authentication service
///
/// The remote token check is the other half of the two-factor authorization
/// on task endpoints: the authentication service confirms that a presented
/// token still belongs to the claimed identity, while the local role check
/// reads the mirror.
///
/// The call is fail-closed and fail-fast: a bounded timeout, no retry, and
/// every failure mode — non-200, timeout, DNS, refused connection — denies.
/// An ambiguous answer must never grant.
///
/// # Example
///
/// ```no_run
/// use std::time::Duration;
/// use taskmesh_tracker::integrations::AuthClient;
/// use uuid::Uuid;
///
/// # async fn example() -> anyhow::Result<()> {
/// let client = AuthClient::new("http://localhost:8080", Duration::from_secs(3))?;
///
/// let ok = client.check_token(Uuid::new_v4(), "some-token").await;
/// assert!(!ok); // unknown identity denies
/// # Ok(())
/// # }
/// ```

use std::time::Duration;
use uuid::Uuid;

/// HTTP client for the authentication service's check endpoint
#[derive(Clone)]
pub struct AuthClient {
    http: reqwest::Client,
    base_url: String,
}

impl AuthClient {
    /// Creates a client with the given base URL and request timeout
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Verifies that `token` is the live token for `public_user_id`
    ///
    /// Calls `GET /auth/check?public_user_id=<uuid>&token=<t>` and returns
    /// true iff the response is 200. Every error — transport, timeout, or
    /// any non-200 status — returns false.
    pub async fn check_token(&self, public_user_id: Uuid, token: &str) -> bool {
        let url = format!("{}/auth/check", self.base_url);

        let result = self
            .http
            .get(&url)
            .query(&[
                ("public_user_id", public_user_id.to_string().as_str()),
                ("token", token),
            ])
            .send()
            .await;

        match result {
            Ok(response) if response.status() == reqwest::StatusCode::OK => true,
            Ok(response) => {
                tracing::debug!(
                    public_id = %public_user_id,
                    status = %response.status(),
                    "Remote token check denied"
                );
                false
            }
            Err(e) => {
                tracing::warn!(
                    public_id = %public_user_id,
                    error = %e,
                    "Remote token check failed, denying"
                );
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A dead endpoint denies rather than erroring out (fail-closed).
    #[tokio::test]
    async fn test_refused_connection_denies() {
        // Port 1 is never listening
        let client = AuthClient::new("http://127.0.0.1:1", Duration::from_secs(1)).unwrap();

        assert!(!client.check_token(Uuid::new_v4(), "token").await);
    }

    #[test]
    fn test_trailing_slash_normalized() {
        let client = AuthClient::new("http://localhost:8080/", Duration::from_secs(1)).unwrap();
        assert_eq!(client.base_url, "http://localhost:8080");
    }

    // 500 and timeout responses are covered in tests/fail_closed.rs
    // against a throwaway local server.
}

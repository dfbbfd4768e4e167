//! Upstream credentials and a per-session cache around their acquisition.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::OnceCell;

use crate::DashError;
use crate::status::StatusSink;

/// Secrets needed by both upstream sources.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    /// Token sent verbatim in the `authorization` header of point requests.
    pub bearer_token: String,
    /// HTTP Basic user for the statistics export.
    pub basic_user: String,
    /// HTTP Basic password for the statistics export.
    pub basic_pass: String,
}

impl Credentials {
    /// Bundle the three secrets.
    pub fn new(
        bearer_token: impl Into<String>,
        basic_user: impl Into<String>,
        basic_pass: impl Into<String>,
    ) -> Self {
        Self {
            bearer_token: bearer_token.into(),
            basic_user: basic_user.into(),
            basic_pass: basic_pass.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("bearer_token", &"<redacted>")
            .field("basic_user", &self.basic_user)
            .field("basic_pass", &"<redacted>")
            .finish()
    }
}

/// Anything that can produce [`Credentials`], possibly over the network.
#[async_trait]
pub trait CredentialProvider: Send + Sync {
    /// Resolve credentials.
    ///
    /// # Errors
    /// Returns `Auth` (or the transport error) when they cannot be obtained.
    async fn credentials(&self) -> Result<Credentials, DashError>;
}

/// Fixed credentials, e.g. read from the environment at startup.
#[derive(Debug, Clone)]
pub struct StaticCredentials(Credentials);

impl StaticCredentials {
    /// Wrap already known credentials.
    #[must_use]
    pub const fn new(credentials: Credentials) -> Self {
        Self(credentials)
    }
}

#[async_trait]
impl CredentialProvider for StaticCredentials {
    async fn credentials(&self) -> Result<Credentials, DashError> {
        Ok(self.0.clone())
    }
}

/// Resolves an inner provider at most once per session.
///
/// Concurrent first calls share one resolution. A failed resolution is not
/// cached: the next call tries again. While resolving, `Login..` is shown on
/// the status sink.
pub struct SessionCredentials {
    inner: Arc<dyn CredentialProvider>,
    status: Arc<dyn StatusSink>,
    cell: OnceCell<Credentials>,
}

impl SessionCredentials {
    /// Cache `inner` for the lifetime of this value.
    pub fn new(inner: Arc<dyn CredentialProvider>, status: Arc<dyn StatusSink>) -> Self {
        Self {
            inner,
            status,
            cell: OnceCell::new(),
        }
    }

    /// Whether credentials have been resolved already.
    #[must_use]
    pub fn is_resolved(&self) -> bool {
        self.cell.initialized()
    }
}

#[async_trait]
impl CredentialProvider for SessionCredentials {
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "pvdash::credentials::session", skip(self))
    )]
    async fn credentials(&self) -> Result<Credentials, DashError> {
        let creds = self
            .cell
            .get_or_try_init(|| async {
                let id = self.status.notify("Login..");
                #[cfg(feature = "tracing")]
                tracing::debug!("resolving session credentials");
                let out = self.inner.credentials().await;
                self.status.clear(id);
                if let Err(e) = &out {
                    self.status.error(&e.to_string());
                }
                out
            })
            .await?;
        Ok(creds.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::StatusBoard;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    struct Counting {
        calls: AtomicUsize,
        fail_first: bool,
    }

    #[async_trait]
    impl CredentialProvider for Counting {
        async fn credentials(&self) -> Result<Credentials, DashError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(20)).await;
            if self.fail_first && n == 0 {
                return Err(DashError::auth("bad key"));
            }
            Ok(Credentials::new("tok", "user", "pass"))
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_callers_share_one_resolution() {
        let inner = Arc::new(Counting {
            calls: AtomicUsize::new(0),
            fail_first: false,
        });
        let board = Arc::new(StatusBoard::new());
        let session = Arc::new(SessionCredentials::new(inner.clone(), board.clone()));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let s = Arc::clone(&session);
            handles.push(tokio::spawn(async move { s.credentials().await }));
        }
        for h in handles {
            assert_eq!(h.await.unwrap().unwrap().bearer_token, "tok");
        }
        assert_eq!(inner.calls.load(Ordering::SeqCst), 1);
        assert!(session.is_resolved());
        assert_eq!(board.current(), None);
    }

    #[tokio::test]
    async fn failure_is_not_cached() {
        let inner = Arc::new(Counting {
            calls: AtomicUsize::new(0),
            fail_first: true,
        });
        let board = Arc::new(StatusBoard::new());
        let session = SessionCredentials::new(inner.clone(), board.clone());

        let err = session.credentials().await.unwrap_err();
        assert!(matches!(err, DashError::Auth(_)));
        assert!(board.current().unwrap().starts_with("[ERROR]"));

        let ok = session.credentials().await.unwrap();
        assert_eq!(ok.basic_user, "user");
        assert_eq!(inner.calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn debug_redacts_secrets() {
        let text = format!("{:?}", Credentials::new("tok", "user", "hunter2"));
        assert!(!text.contains("tok\""));
        assert!(!text.contains("hunter2"));
        assert!(text.contains("user"));
    }
}

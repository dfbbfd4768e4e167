use std::sync::Arc;
use std::time::Duration;

use pvdash_core::{
    BulkSourceConfig, CredentialProvider, DashConfig, DashError, NoopStatus, PointSourceConfig,
    RetryConfig, SessionCredentials, StatusSink,
};
use reqwest::Client;

use crate::{BulkAcquirer, PointAcquirer, RetryingFetcher, TokenLogin};

enum CredentialSource {
    Provider(Arc<dyn CredentialProvider>),
    Login {
        user_name: String,
        password: String,
        basic_user: String,
        basic_pass: String,
        login_url: Option<String>,
    },
}

/// Both HTTP acquirers, sharing one client, retry budget and credential session.
pub struct HttpSources {
    /// Daily balcony production.
    pub point: Arc<PointAcquirer>,
    /// Monthly roof, consumption and grid statistics.
    pub bulk: Arc<BulkAcquirer>,
    /// The shared fetcher.
    pub fetcher: Arc<RetryingFetcher>,
}

impl HttpSources {
    /// Start configuring the HTTP sources.
    #[must_use]
    pub fn builder() -> HttpSourcesBuilder {
        HttpSourcesBuilder::new()
    }
}

/// Builder for [`HttpSources`].
pub struct HttpSourcesBuilder {
    client: Option<Client>,
    request_timeout: Option<Duration>,
    retry: RetryConfig,
    status: Arc<dyn StatusSink>,
    credentials: Option<CredentialSource>,
    point: PointSourceConfig,
    bulk: BulkSourceConfig,
}

impl Default for HttpSourcesBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpSourcesBuilder {
    /// Defaults: upstream endpoints from [`PointSourceConfig`] and
    /// [`BulkSourceConfig`], three immediate attempts, no status output.
    #[must_use]
    pub fn new() -> Self {
        Self {
            client: None,
            request_timeout: Some(Duration::from_secs(30)),
            retry: RetryConfig::default(),
            status: Arc::new(NoopStatus),
            credentials: None,
            point: PointSourceConfig::default(),
            bulk: BulkSourceConfig::default(),
        }
    }

    /// Take retry budget and both source configurations from `cfg`.
    #[must_use]
    pub fn config(mut self, cfg: &DashConfig) -> Self {
        self.retry = cfg.retry;
        self.point = cfg.point.clone();
        self.bulk = cfg.bulk.clone();
        self
    }

    /// Use a preconfigured client. Overrides [`Self::request_timeout`].
    #[must_use]
    pub fn client(mut self, client: Client) -> Self {
        self.client = Some(client);
        self
    }

    /// Per-request timeout of the default client. `None` disables it.
    #[must_use]
    pub const fn request_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Retry budget for every upstream request.
    #[must_use]
    pub const fn retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Sink for `Loading ..` progress and exhausted-retry errors.
    #[must_use]
    pub fn status(mut self, status: Arc<dyn StatusSink>) -> Self {
        self.status = status;
        self
    }

    /// Point source settings.
    #[must_use]
    pub fn point_config(mut self, cfg: PointSourceConfig) -> Self {
        self.point = cfg;
        self
    }

    /// Bulk source settings.
    #[must_use]
    pub fn bulk_config(mut self, cfg: BulkSourceConfig) -> Self {
        self.bulk = cfg;
        self
    }

    /// Resolve credentials through `provider`.
    #[must_use]
    pub fn credentials(mut self, provider: Arc<dyn CredentialProvider>) -> Self {
        self.credentials = Some(CredentialSource::Provider(provider));
        self
    }

    /// Log in to the inverter cloud with the shared fetcher for the bearer
    /// token; the Basic pair is used for the statistics server as is.
    #[must_use]
    pub fn login(
        mut self,
        user_name: impl Into<String>,
        password: impl Into<String>,
        basic_user: impl Into<String>,
        basic_pass: impl Into<String>,
    ) -> Self {
        self.credentials = Some(CredentialSource::Login {
            user_name: user_name.into(),
            password: password.into(),
            basic_user: basic_user.into(),
            basic_pass: basic_pass.into(),
            login_url: None,
        });
        self
    }

    /// Login endpoint used by [`Self::login`].
    #[must_use]
    pub fn login_url(mut self, url: impl Into<String>) -> Self {
        if let Some(CredentialSource::Login { login_url, .. }) = &mut self.credentials {
            *login_url = Some(url.into());
        }
        self
    }

    /// Assemble the sources.
    ///
    /// Credentials are resolved lazily, once per built value.
    ///
    /// # Errors
    /// `InvalidArg` when no credentials were configured, `Other` when the
    /// default client cannot be built.
    pub fn build(self) -> Result<HttpSources, DashError> {
        let client = match self.client {
            Some(c) => c,
            None => {
                let mut b = Client::builder();
                if let Some(t) = self.request_timeout {
                    b = b.timeout(t);
                }
                b.build()
                    .map_err(|e| DashError::Other(format!("http client: {e}")))?
            }
        };
        let fetcher = Arc::new(RetryingFetcher::new(
            client,
            self.retry,
            Arc::clone(&self.status),
        ));

        let inner: Arc<dyn CredentialProvider> = match self.credentials {
            Some(CredentialSource::Provider(p)) => p,
            Some(CredentialSource::Login {
                user_name,
                password,
                basic_user,
                basic_pass,
                login_url,
            }) => {
                let mut login = TokenLogin::new(
                    Arc::clone(&fetcher),
                    user_name,
                    password,
                    basic_user,
                    basic_pass,
                );
                if let Some(url) = login_url {
                    login = login.login_url(url);
                }
                Arc::new(login)
            }
            None => {
                return Err(DashError::InvalidArg(
                    "http sources need credentials".into(),
                ));
            }
        };
        let session: Arc<dyn CredentialProvider> =
            Arc::new(SessionCredentials::new(inner, Arc::clone(&self.status)));

        Ok(HttpSources {
            point: Arc::new(PointAcquirer::new(
                Arc::clone(&fetcher),
                Arc::clone(&session),
                self.point,
            )),
            bulk: Arc::new(BulkAcquirer::new(
                Arc::clone(&fetcher),
                session,
                self.bulk,
            )),
            fetcher,
        })
    }
}

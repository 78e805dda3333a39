use std::future::Future;
use std::time::Duration;

use anyhow::Context;
use home_shared::MutationForm;
use reqwest::redirect::Policy;
use tracing::debug;
use url::Url;

/// Result of one round trip to the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchOutcome {
    pub endpoint: String,
    pub status: u16,
    /// Target of a redirect response.
    pub location: Option<String>,
}

impl DispatchOutcome {
    pub fn is_success(&self) -> bool {
        (200..400).contains(&self.status)
    }

    pub fn is_redirect(&self) -> bool {
        (300..400).contains(&self.status)
    }
}

/// Carries mutation forms and plain navigations to the server.
pub trait Transport: Send + Sync {
    fn submit(
        &self,
        form: &MutationForm,
    ) -> impl Future<Output = anyhow::Result<DispatchOutcome>> + Send;

    fn navigate(&self, path: &str) -> impl Future<Output = anyhow::Result<DispatchOutcome>> + Send;
}

/// Form-encoded HTTP transport with a per-client cookie session.
///
/// Redirects are not followed, so the `Location` the server answers with is
/// reported in the outcome.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpTransport {
    pub fn new(base_url: Url, timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .cookie_store(true)
            .redirect(Policy::none())
            .user_agent(concat!("home/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("failed building HTTP client")?;

        Ok(Self {
            client,
            base_url: with_trailing_slash(base_url),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn endpoint_url(&self, path: &str) -> anyhow::Result<Url> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .with_context(|| format!("invalid endpoint path: {path}"))
    }
}

impl Transport for HttpTransport {
    #[tracing::instrument(skip(self, form), fields(action = %form.action))]
    async fn submit(&self, form: &MutationForm) -> anyhow::Result<DispatchOutcome> {
        let url = self.endpoint_url(&form.action)?;
        debug!(url = %url, fields = form.len(), "posting mutation form");

        let response = self
            .client
            .post(url.clone())
            .form(&form.fields())
            .send()
            .await
            .with_context(|| format!("failed posting {url}"))?;

        Ok(outcome_of(&form.action, &response))
    }

    #[tracing::instrument(skip(self))]
    async fn navigate(&self, path: &str) -> anyhow::Result<DispatchOutcome> {
        let url = self.endpoint_url(path)?;
        debug!(url = %url, "navigating");

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .with_context(|| format!("failed requesting {url}"))?;

        Ok(outcome_of(path, &response))
    }
}

fn outcome_of(endpoint: &str, response: &reqwest::Response) -> DispatchOutcome {
    let location = response
        .headers()
        .get(reqwest::header::LOCATION)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);

    DispatchOutcome {
        endpoint: endpoint.to_string(),
        status: response.status().as_u16(),
        location,
    }
}

fn with_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use url::Url;

    use super::{DispatchOutcome, HttpTransport};

    #[test]
    fn endpoints_resolve_under_base_path() {
        let base = Url::parse("http://tablet.lan/home-app").expect("url");
        let transport = HttpTransport::new(base, Duration::from_secs(1)).expect("transport");

        assert_eq!(
            transport.endpoint_url("/mark_task").expect("join").as_str(),
            "http://tablet.lan/home-app/mark_task"
        );
        assert_eq!(
            transport.endpoint_url("/login/3").expect("join").as_str(),
            "http://tablet.lan/home-app/login/3"
        );
    }

    #[test]
    fn redirects_count_as_success() {
        let outcome = DispatchOutcome {
            endpoint: "/star_all".to_string(),
            status: 302,
            location: Some("/home?date=2024-01-01".to_string()),
        };
        assert!(outcome.is_success());
        assert!(outcome.is_redirect());

        let rejected = DispatchOutcome {
            status: 500,
            ..outcome
        };
        assert!(!rejected.is_success());
    }
}

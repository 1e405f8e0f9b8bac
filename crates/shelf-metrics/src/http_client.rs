use std::time::Duration;

use ureq::Agent;

#[derive(Clone, Debug)]
pub struct ClientConfig {
    pub user_agent: Option<String>,
    pub timeout: Option<Duration>,
}

impl Default for ClientConfig {
    /// Defaults to a `shelf/<version>` user agent and a 30 second timeout.
    fn default() -> Self {
        Self {
            user_agent: Some(concat!("shelf/", env!("CARGO_PKG_VERSION")).into()),
            timeout: Some(Duration::from_secs(30)),
        }
    }
}

impl ClientConfig {
    /// Builds an HTTP `Agent` configured from this `ClientConfig`.
    ///
    /// Non-success statuses are returned as regular responses so callers can
    /// report the status code.
    pub fn build(&self) -> Agent {
        let mut config = ureq::Agent::config_builder()
            .timeout_global(self.timeout)
            .http_status_as_error(false);

        if let Some(user_agent) = &self.user_agent {
            config = config.user_agent(user_agent);
        }

        config.build().into()
    }
}

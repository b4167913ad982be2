use std::time::Duration;

use tracing::debug_span;
use ureq::http::Response;
use ureq::Body;

use super::wire::{self, OrderBody, TextBody};
use super::{Endpoint, ModelService, ServiceError};
use crate::session::{ModelStatus, NgramOrder};
use crate::settings::ServiceSettings;

/// Blocking JSON-over-HTTP client for the model service.
pub struct HttpModelService {
    agent: ureq::Agent,
    base_url: String,
}

impl HttpModelService {
    pub fn new(base_url: &str, timeout: Duration) -> Self {
        let agent: ureq::Agent = ureq::Agent::config_builder()
            .timeout_global(Some(timeout))
            .http_status_as_error(false)
            .build()
            .into();
        Self {
            agent,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn from_settings(s: &ServiceSettings) -> Self {
        Self::new(&s.base_url, s.timeout())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, endpoint: Endpoint) -> String {
        format!("{}{}", self.base_url, endpoint.path())
    }

    /// Check the status code and read the body. Non-2xx is an error even when
    /// the server sent a body.
    fn finish(
        endpoint: Endpoint,
        result: Result<Response<Body>, ureq::Error>,
    ) -> Result<String, ServiceError> {
        let response = result.map_err(|e| ServiceError::Transport {
            endpoint,
            msg: e.to_string(),
        })?;
        let status = response.status().as_u16();
        if !(200..300).contains(&status) {
            return Err(ServiceError::Status { endpoint, status });
        }
        response
            .into_body()
            .read_to_string()
            .map_err(|e| ServiceError::Transport {
                endpoint,
                msg: e.to_string(),
            })
    }

    fn post_text(&self, endpoint: Endpoint, text: &str) -> Result<String, ServiceError> {
        let _span = debug_span!("post", %endpoint).entered();
        let result = self
            .agent
            .post(&self.url(endpoint))
            .send_json(&TextBody { text });
        Self::finish(endpoint, result)
    }
}

impl ModelService for HttpModelService {
    fn predict(&self, text: &str) -> Result<Vec<String>, ServiceError> {
        let body = self.post_text(Endpoint::Predict, text)?;
        wire::parse_predictions(&body).map_err(|reason| ServiceError::Malformed {
            endpoint: Endpoint::Predict,
            reason,
        })
    }

    fn train(&self, text: &str) -> Result<(), ServiceError> {
        self.post_text(Endpoint::Train, text).map(|_| ())
    }

    fn clear(&self) -> Result<(), ServiceError> {
        let _span = debug_span!("post", endpoint = %Endpoint::Clear).entered();
        let result = self.agent.post(&self.url(Endpoint::Clear)).send_empty();
        Self::finish(Endpoint::Clear, result).map(|_| ())
    }

    fn set_order(&self, order: NgramOrder) -> Result<(), ServiceError> {
        let _span = debug_span!("post", endpoint = %Endpoint::Settings).entered();
        let result = self
            .agent
            .post(&self.url(Endpoint::Settings))
            .send_json(&OrderBody { n: order.value() });
        Self::finish(Endpoint::Settings, result).map(|_| ())
    }

    fn status(&self) -> Result<ModelStatus, ServiceError> {
        let _span = debug_span!("get", endpoint = %Endpoint::Status).entered();
        let result = self.agent.get(&self.url(Endpoint::Status)).call();
        let body = Self::finish(Endpoint::Status, result)?;
        wire::parse_status(&body).map_err(|reason| ServiceError::Malformed {
            endpoint: Endpoint::Status,
            reason,
        })
    }
}

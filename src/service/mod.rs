//! Boundary to the remote model service.
//!
//! `ModelService` is the seam: `HttpModelService` talks JSON over HTTP,
//! tests plug in an in-process fake.

mod http;
mod wire;

use std::fmt;

pub use http::HttpModelService;
pub use wire::{parse_predictions, parse_status};

use crate::session::{ModelStatus, NgramOrder, ServiceOutcome, ServiceRequest};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Predict,
    Train,
    Clear,
    Settings,
    Status,
}

impl Endpoint {
    pub fn path(self) -> &'static str {
        match self {
            Self::Predict => "/api/predict",
            Self::Train => "/api/train",
            Self::Clear => "/api/clear",
            Self::Settings => "/api/settings",
            Self::Status => "/api/status",
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ServiceError {
    #[error("{endpoint}: transport error: {msg}")]
    Transport { endpoint: Endpoint, msg: String },
    #[error("{endpoint}: HTTP {status}")]
    Status { endpoint: Endpoint, status: u16 },
    #[error("{endpoint}: malformed response: {reason}")]
    Malformed { endpoint: Endpoint, reason: String },
}

impl ServiceError {
    pub fn is_malformed(&self) -> bool {
        matches!(self, Self::Malformed { .. })
    }
}

/// The five calls the widget makes against the model.
pub trait ModelService: Send + Sync {
    fn predict(&self, text: &str) -> Result<Vec<String>, ServiceError>;
    fn train(&self, text: &str) -> Result<(), ServiceError>;
    fn clear(&self) -> Result<(), ServiceError>;
    fn set_order(&self, order: NgramOrder) -> Result<(), ServiceError>;
    fn status(&self) -> Result<ModelStatus, ServiceError>;
}

/// Run one request to completion (blocking) and wrap its result.
pub fn execute(service: &dyn ModelService, request: ServiceRequest) -> ServiceOutcome {
    match request {
        ServiceRequest::Predict(req) => ServiceOutcome::Predicted {
            seq: req.seq,
            result: service.predict(&req.text),
        },
        ServiceRequest::Train { text, origin } => ServiceOutcome::Trained {
            origin,
            result: service.train(&text),
        },
        ServiceRequest::Clear => ServiceOutcome::Cleared {
            result: service.clear(),
        },
        ServiceRequest::SetOrder(order) => ServiceOutcome::OrderSet {
            order,
            result: service.set_order(order),
        },
        ServiceRequest::FetchStatus { seq } => ServiceOutcome::Status {
            seq,
            result: service.status(),
        },
    }
}

//! Explicit ordered pipeline of request stages.
//!
//! # Responsibilities
//! - Compose stages (auth, retry, ...) in front of a transport
//! - Give each stage a handle to the rest of the chain
//!
//! # Design Decisions
//! - A stage is a function of (request, next) → response
//! - Composition is a plain ordered list, outermost stage first
//! - `Next` is `Copy`, so a stage can invoke the remainder more than once

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::{NavigatorResult, TransportError};
use crate::http::request::HttpRequest;
use crate::http::response::HttpResponse;

/// Sends a request over the wire. Innermost element of every pipeline.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}

/// A request-transforming stage.
#[async_trait]
pub trait Stage: Send + Sync {
    async fn handle(&self, request: HttpRequest, next: Next<'_>) -> NavigatorResult<HttpResponse>;
}

/// The remainder of a pipeline, as seen from a stage.
#[derive(Clone, Copy)]
pub struct Next<'a> {
    stages: &'a [Arc<dyn Stage>],
    transport: &'a dyn Transport,
}

impl<'a> Next<'a> {
    /// Run the remaining stages and finally the transport.
    pub async fn run(self, request: HttpRequest) -> NavigatorResult<HttpResponse> {
        match self.stages.split_first() {
            Some((stage, rest)) => {
                let next = Next {
                    stages: rest,
                    transport: self.transport,
                };
                stage.handle(request, next).await
            }
            None => Ok(self.transport.send(request).await?),
        }
    }
}

/// Stages in front of a transport.
#[derive(Clone)]
pub struct Pipeline {
    stages: Vec<Arc<dyn Stage>>,
    transport: Arc<dyn Transport>,
}

impl Pipeline {
    /// A pipeline that sends straight to the transport.
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            stages: Vec::new(),
            transport,
        }
    }

    /// Append a stage. Stages added first run first.
    pub fn with_stage(mut self, stage: Arc<dyn Stage>) -> Self {
        self.stages.push(stage);
        self
    }

    /// Number of stages in front of the transport.
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Send a request through every stage.
    pub async fn send(&self, request: HttpRequest) -> NavigatorResult<HttpResponse> {
        let next = Next {
            stages: &self.stages,
            transport: self.transport.as_ref(),
        };
        next.run(request).await
    }
}

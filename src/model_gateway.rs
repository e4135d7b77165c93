use anyhow::Result;
use reqwest::Client;
use std::future::Future;
use std::pin::Pin;

use crate::config::Config;
use crate::model::{self, GenerationRequest};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelGatewayResponse {
    pub content: String,
}

pub type ModelGatewayFuture<'a> = Pin<Box<dyn Future<Output = Result<ModelGatewayResponse>> + 'a>>;

/// The `generate(prompt, image) -> text` boundary a session talks to.
pub trait ModelGateway {
    fn generate<'a>(&'a self, request: GenerationRequest) -> ModelGatewayFuture<'a>;
}

/// Sends requests to whichever provider `Config` names.
pub struct HostModelGateway<'a> {
    client: &'a Client,
    cfg: &'a Config,
}

impl<'a> HostModelGateway<'a> {
    pub fn new(client: &'a Client, cfg: &'a Config) -> Self {
        Self { client, cfg }
    }
}

impl ModelGateway for HostModelGateway<'_> {
    fn generate<'a>(&'a self, request: GenerationRequest) -> ModelGatewayFuture<'a> {
        Box::pin(async move {
            let content = model::generate(self.client, self.cfg, &request).await?;
            Ok(ModelGatewayResponse { content })
        })
    }
}

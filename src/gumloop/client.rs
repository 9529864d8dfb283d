use std::future::Future;
use std::time::Duration;

use reqwest::Client;
use tokio::time::{Instant, sleep};
use tracing::{debug, info};

use super::error::GumloopError;
use super::types::{PipelineInput, PipelineRun, RunPhase, StartPipelineRequest, StartPipelineResponse};
use crate::config::GumloopConfig;

/// Converts proof text into Lean source. Implemented by [`GumloopClient`]
/// and by test doubles.
pub trait Transformer {
    /// Report missing credentials or identifiers before any call is made.
    fn check_configured(&self) -> Result<(), String> {
        Ok(())
    }

    fn transform(&self, proof_text: &str) -> impl Future<Output = Result<String, GumloopError>> + Send;
}

pub struct GumloopClient {
    config: GumloopConfig,
    client: Client,
}

impl GumloopClient {
    pub fn new(config: GumloopConfig) -> Result<Self, GumloopError> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(60))
            .build()?;
        Ok(Self { config, client })
    }

    /// Start a run of the configured flow and return its identifier.
    pub async fn start_run(&self, proof_text: &str) -> Result<String, GumloopError> {
        let req = StartPipelineRequest {
            user_id: self.config.user_id.clone(),
            saved_item_id: self.config.flow_id.clone(),
            pipeline_inputs: vec![PipelineInput {
                input_name: self.config.input_name.clone(),
                value: proof_text.to_string(),
            }],
        };

        let response = self
            .client
            .post(format!("{}/start_pipeline", self.config.base_url))
            .bearer_auth(&self.config.api_key)
            .json(&req)
            .send()
            .await?;

        let body: StartPipelineResponse = Self::check_status(response).await?.json().await?;
        if let Some(url) = &body.url {
            debug!(run_id = %body.run_id, url = %url, "gumloop run url");
        }
        Ok(body.run_id)
    }

    /// Fetch the current state of a run.
    pub async fn get_run(&self, run_id: &str) -> Result<PipelineRun, GumloopError> {
        let response = self
            .client
            .get(format!("{}/get_pl_run", self.config.base_url))
            .bearer_auth(&self.config.api_key)
            .query(&[("run_id", run_id), ("user_id", self.config.user_id.as_str())])
            .send()
            .await?;

        let run = Self::check_status(response).await?.json::<PipelineRun>().await?;
        Ok(run)
    }

    /// Poll a run until it reaches a terminal state or the deadline passes.
    pub async fn wait_for_run(&self, run_id: &str) -> Result<PipelineRun, GumloopError> {
        let timeout = Duration::from_secs(self.config.run_timeout_secs);
        let interval = Duration::from_millis(self.config.poll_interval_ms);
        let deadline = Instant::now() + timeout;

        loop {
            let run = self.get_run(run_id).await?;
            debug!(run_id, state = %run.state, log_lines = run.log.len(), "polled gumloop run");
            match run.phase() {
                RunPhase::Done => return Ok(run),
                RunPhase::Failed => {
                    return Err(GumloopError::RunFailed {
                        run_id: run_id.to_string(),
                        state: run.state,
                    });
                }
                RunPhase::InProgress => {}
            }

            if Instant::now() + interval > deadline {
                return Err(GumloopError::Timeout {
                    run_id: run_id.to_string(),
                    secs: self.config.run_timeout_secs,
                });
            }
            sleep(interval).await;
        }
    }

    async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, GumloopError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let message = response
            .text()
            .await
            .unwrap_or_else(|_| "unknown error".to_string());
        Err(GumloopError::Api {
            status: status.as_u16(),
            message,
        })
    }
}

impl Transformer for GumloopClient {
    fn check_configured(&self) -> Result<(), String> {
        let missing: Vec<&str> = [
            ("api key", &self.config.api_key),
            ("user id", &self.config.user_id),
            ("flow id", &self.config.flow_id),
        ]
        .into_iter()
        .filter(|(_, value)| value.is_empty())
        .map(|(name, _)| name)
        .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(missing.join(", "))
        }
    }

    async fn transform(&self, proof_text: &str) -> Result<String, GumloopError> {
        let run_id = self.start_run(proof_text).await?;
        info!(run_id = %run_id, "started gumloop run");

        let run = self.wait_for_run(&run_id).await?;
        let output = run
            .output_text(&self.config.output_name)
            .ok_or_else(|| GumloopError::MissingOutput(self.config.output_name.clone()))?;
        info!(run_id = %run_id, bytes = output.len(), "gumloop run finished");
        Ok(output.to_string())
    }
}

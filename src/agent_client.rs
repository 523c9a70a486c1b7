use reqwest::Client;
use serde::Serialize;
use serde_json::Value;

use crate::config::Config;
use crate::error::UpstreamError;

#[derive(Serialize, Debug)]
struct AgentRequestBody<'a> {
    request: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    conversation_id: Option<&'a str>,
}

/// Client for `POST {base_url}{agent_id}` on the Headless Agents API.
#[derive(Clone)]
pub struct AgentClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl AgentClient {
    pub fn new(config: &Config) -> Result<Self, UpstreamError> {
        let client = Client::builder().timeout(config.request_timeout).build()?;
        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            api_key: config.api_key.clone(),
        })
    }

    pub fn agent_url(&self, agent_id: &str) -> String {
        format!("{}{}", self.base_url, agent_id)
    }

    /// Single attempt, no retries. Any 2xx status is success.
    pub async fn call_agent(
        &self,
        agent_id: &str,
        request: &str,
        conversation_id: Option<&str>,
    ) -> Result<Value, UpstreamError> {
        let url = self.agent_url(agent_id);
        let body = AgentRequestBody {
            request,
            conversation_id,
        };

        log::info!("Calling agent {} via {}", agent_id, url);

        let resp = self
            .client
            .post(&url)
            .header("X-API-Key", &self.api_key)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            log::warn!("Agent {} returned HTTP {}", agent_id, status.as_u16());
            return Err(UpstreamError::Status(status.as_u16()));
        }

        let bytes = resp.bytes().await?;
        let data = serde_json::from_slice::<Value>(&bytes)?;
        Ok(data)
    }
}

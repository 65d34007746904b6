use anyhow::Context;
use async_trait::async_trait;
use serde::Deserialize;

use super::AuthProvider;

pub struct HttpAuthProvider {
    verify_url: String,
    client: reqwest::Client,
}

impl HttpAuthProvider {
    pub fn new(verify_url: String) -> Self {
        Self {
            verify_url,
            client: reqwest::Client::new(),
        }
    }
}

#[derive(Deserialize)]
struct VerifyResponse {
    valid: bool,
}

#[async_trait]
impl AuthProvider for HttpAuthProvider {
    async fn verify(&self, username: &str, password: &str) -> anyhow::Result<bool> {
        let response = self
            .client
            .post(&self.verify_url)
            .json(&serde_json::json!({
                "username": username,
                "password": password,
            }))
            .send()
            .await
            .context("failed to reach auth service")?;

        if response.status() == reqwest::StatusCode::UNAUTHORIZED {
            return Ok(false);
        }

        let body: VerifyResponse = response
            .error_for_status()
            .context("auth service returned error")?
            .json()
            .await
            .context("invalid auth service response")?;

        Ok(body.valid)
    }
}

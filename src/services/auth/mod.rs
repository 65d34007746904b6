pub mod http;

use async_trait::async_trait;

/// Verifies staff credentials against an external identity collaborator.
/// Nothing in this service stores or compares a password itself.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    async fn verify(&self, username: &str, password: &str) -> anyhow::Result<bool>;
}

//! Transient-failure retry loop shared by both provider clients.

use std::future::Future;

use oddplate_core::retry::RetryPolicy;

use crate::error::OpenAiError;

/// Run `operation` until it succeeds, fails non-transiently, or exhausts
/// the policy's attempts. Delays between attempts follow the policy's
/// exponential backoff. Only the owning request waits; no cross-request
/// state is involved.
pub async fn with_retry<T, F, Fut>(
    policy: &RetryPolicy,
    op_name: &str,
    mut operation: F,
) -> Result<T, OpenAiError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, OpenAiError>>,
{
    let mut attempt: u32 = 0;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(e) if e.is_transient() && attempt + 1 < policy.max_attempts => {
                tracing::warn!(
                    op = op_name,
                    attempt = attempt + 1,
                    max_attempts = policy.max_attempts,
                    error = %e,
                    "Transient provider failure, retrying"
                );
                tokio::time::sleep(policy.delay_for(attempt)).await;
                attempt += 1;
            }
            Err(e) => {
                if e.is_transient() {
                    tracing::error!(op = op_name, error = %e, "Provider failed after all retries");
                }
                return Err(e);
            }
        }
    }
}

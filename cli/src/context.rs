//! State context setup and task draining.

use anyhow::{Context as _, Result};
use roster_business::BusinessConfig;
use roster_states::StateCtx;
use tracing::instrument;

pub use roster_business::build_state_ctx;

/// `--api-url` (or `ROSTER_API_BASE_URL`, which clap already folds in) wins over the
/// business default.
pub fn resolve_config(api_url: Option<&str>) -> Result<BusinessConfig> {
    match api_url {
        Some(url) => BusinessConfig::from_vars([("ROSTER_API_BASE_URL", url)]),
        None => BusinessConfig::from_env(),
    }
    .context("Invalid API configuration")
}

/// Flush queued commands and await them, follow-ups included.
#[instrument(skip_all, name = "flush")]
pub async fn flush_and_await(ctx: &mut StateCtx) {
    ctx.run_until_idle().await;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_url_is_used() {
        let config = resolve_config(Some("http://10.1.1.1:4000/")).unwrap();
        assert_eq!(config.api_base_url, "http://10.1.1.1:4000");
    }

    #[test]
    fn malformed_url_is_an_error() {
        let err = resolve_config(Some("::nope")).unwrap_err();
        assert!(err.to_string().contains("Invalid API configuration"));
    }
}

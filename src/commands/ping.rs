//! The ping command.

use crate::api::{self, ReadChannel};
use crate::commands::{plural, Out};
use crate::error::{ErrorType, IntoResult};
use crate::{Config, Mode, Result};
use serde::Serialize;
use std::time::Instant;
use tracing::debug;

/// What `kas ping` returns.
#[derive(Debug, Clone, Serialize)]
pub struct PingOutput {
    pub endpoint: String,
    pub members: usize,
    pub elapsed_ms: u128,
}

/// Checks that the endpoint answers by fetching the member list. No session is needed.
///
/// # Errors
/// - Remote, when the endpoint cannot be reached or does not answer with members.
pub async fn ping(config: Config, mode: Mode) -> Result<Out<PingOutput>> {
    let gateway = api::gateway(&config, mode).pub_result(ErrorType::Config)?;
    let output = check(&*gateway, config.endpoint().as_str()).await?;
    let message = format!(
        "{} answered in {} ms with {} member{}",
        output.endpoint,
        output.elapsed_ms,
        output.members,
        plural(output.members)
    );
    Ok(Out::new(message, output))
}

async fn check<R>(reads: &R, endpoint: &str) -> Result<PingOutput>
where
    R: ReadChannel + ?Sized,
{
    debug!("Pinging {endpoint}");
    let start = Instant::now();
    let members = reads.members(None).await.pub_result(ErrorType::Remote)?;
    Ok(PingOutput {
        endpoint: endpoint.to_string(),
        members: members.len(),
        elapsed_ms: start.elapsed().as_millis(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::TestGateway;
    use crate::test::TestEnv;

    #[tokio::test]
    async fn test_ping_without_session() {
        let env = TestEnv::new().await;
        let out = ping(env.config(), Mode::Test).await.unwrap();
        let output = out.structure().unwrap();
        assert_eq!(output.members, 8);
        assert_eq!(output.endpoint, env.config().endpoint().as_str());
        assert!(out.message().contains("with 8 members"));
    }

    #[tokio::test]
    async fn test_ping_unreachable() {
        let gateway = TestGateway::default();
        gateway.set_fail_reads(true);
        let err = check(&gateway, "https://example.com/exec").await.unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Remote);
    }
}

//! Line-oriented transport standing in for the chat front end.
//!
//! Every input line `<user> <token>` is routed as an independent request and
//! answered with one JSON line. A bare `reload` line re-reads the catalog.
//! Finished requests are written out as soon as the next line arrives, so
//! only requests still in flight are held.

use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::task::{JoinError, JoinSet};
use tracing::warn;

use crate::router::NavigationRouter;
use crate::types::UserIdentity;

/// Serve requests from `input` until it closes. Returns the number of
/// responses written.
pub async fn serve<R, W>(router: Arc<NavigationRouter>, input: R, mut output: W) -> Result<usize>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = input.lines();
    let mut requests = JoinSet::new();
    let mut written = 0;

    while let Some(line) = lines.next_line().await.context("Failed to read input")? {
        while let Some(finished) = requests.try_join_next() {
            written += write_response(&mut output, finished).await?;
        }

        if line.trim() == "reload" {
            router.catalog().reload().await;
            continue;
        }

        let mut parts = line.split_whitespace();
        let (Some(raw_user), Some(token)) = (parts.next(), parts.next()) else {
            if !line.trim().is_empty() {
                warn!(line = %line, "Expected `<user> <token>`");
            }
            continue;
        };

        let user = UserIdentity::sanitize(raw_user);
        let token = token.to_string();
        let router = Arc::clone(&router);

        requests.spawn(async move {
            let transition = router.dispatch(&user, &token).await;
            serde_json::json!({
                "user": user,
                "token": token,
                "transition": transition,
            })
            .to_string()
        });
    }

    while let Some(finished) = requests.join_next().await {
        written += write_response(&mut output, finished).await?;
    }
    output.flush().await.context("Failed to flush output")?;

    Ok(written)
}

async fn write_response<W>(output: &mut W, finished: Result<String, JoinError>) -> Result<usize>
where
    W: AsyncWrite + Unpin,
{
    let response = match finished {
        Ok(response) => response,
        Err(e) => {
            warn!(error = %e, "Request task failed");
            return Ok(0);
        }
    };

    output
        .write_all(format!("{}\n", response).as_bytes())
        .await
        .context("Failed to write response")?;
    Ok(1)
}

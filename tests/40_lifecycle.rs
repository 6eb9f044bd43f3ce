mod common;

use std::time::{Duration, Instant};

use anyhow::{Context, Result};

#[tokio::test]
async fn server_exits_when_its_stdin_closes() -> Result<()> {
    let port = portpicker::pick_unused_port().context("failed to pick free port")?;
    let mut child = common::spawn_server(port)?;
    if let Err(e) = common::wait_ready(&common::base_url(port), Duration::from_secs(15)).await {
        let _ = child.kill();
        return Err(e);
    }

    drop(child.stdin.take());

    let deadline = Instant::now() + Duration::from_secs(10);
    let status = loop {
        if let Some(status) = child.try_wait()? {
            break Some(status);
        }
        if Instant::now() > deadline {
            break None;
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
    };

    if status.is_none() {
        let _ = child.kill();
        anyhow::bail!("server was still running 10s after its stdin closed");
    }
    assert!(status.unwrap().success());

    Ok(())
}

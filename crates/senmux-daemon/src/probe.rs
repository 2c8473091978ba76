//! One-shot inspection utilities.
//!
//! `run_stream_probe` tails the raw sensor streams; `run_udp_probe` binds
//! the control port and decodes whatever actuation frames arrive;
//! `run_read_sweep` walks read commands across a small object/property
//! range against the control endpoint for property discovery. All exist
//! purely for eyeballing a deployment.

use std::ops::RangeInclusive;
use std::time::Duration;

use senmux_core::command::ActuationCommand;
use tokio::net::UdpSocket;
use tokio::time::sleep;
use tracing::{info, warn};

use crate::config::DaemonConfig;
use crate::emitter::CommandEmitter;
use crate::error::DaemonError;
use crate::poll::poll_ready;
use crate::source::{DataSource, ReadOutcome};

/// Object/property range walked by the discovery sweep.
const SWEEP_OBJECTS: RangeInclusive<u16> = 1..=2;
const SWEEP_PROPERTIES: RangeInclusive<u16> = 1..=255;
/// Pacing between probe frames, so the endpoint is not flooded.
const SWEEP_PACE: Duration = Duration::from_millis(150);

/// Print each source's reads as they arrive, tagged with its label.
pub async fn run_stream_probe(config: &DaemonConfig) -> Result<(), DaemonError> {
    let connect_timeout = Duration::from_millis(config.connect_timeout_ms);
    let poll_timeout = Duration::from_millis(config.poll_timeout_ms);
    let mut sources: Vec<DataSource> = config
        .sources
        .iter()
        .enumerate()
        .map(|(index, s)| {
            DataSource::new(
                index,
                s.label.clone(),
                config.source_addr(index),
                connect_timeout,
            )
        })
        .collect();

    loop {
        for source in &mut sources {
            source.ensure_connected().await;
        }
        let ready = poll_ready(&sources, poll_timeout)
            .await
            .map_err(DaemonError::Poll)?;
        for index in ready {
            match sources[index].read_latest() {
                ReadOutcome::Token(token) => {
                    println!("[{}] {token}", sources[index].label);
                }
                ReadOutcome::NoUpdate => {}
                ReadOutcome::Closed => sources[index].ensure_connected().await,
            }
        }
    }
}

/// Sweep read commands across the discovery range against the control
/// endpoint. No responses are read; pair with a packet capture or the
/// endpoint's own logs.
pub async fn run_read_sweep(config: &DaemonConfig) -> Result<(), DaemonError> {
    let emitter = CommandEmitter::bind(
        config.control_addr(),
        Duration::from_millis(config.control.retry_backoff_ms),
    )
    .await?;
    info!(target = %config.control_addr(), "sweeping read commands");
    sweep_reads(&emitter, SWEEP_OBJECTS, SWEEP_PROPERTIES, SWEEP_PACE).await;
    Ok(())
}

/// Emit one read command per object/property pair, paced.
async fn sweep_reads(
    emitter: &CommandEmitter,
    objects: RangeInclusive<u16>,
    properties: RangeInclusive<u16>,
    pace: Duration,
) {
    for object in objects {
        for property in properties.clone() {
            emitter.send(ActuationCommand::read(object, property)).await;
            println!("sent READ object={object} property={property}");
            sleep(pace).await;
        }
    }
}

/// Bind the control port and log every decoded actuation frame.
pub async fn run_udp_probe(port: u16) -> Result<(), DaemonError> {
    let socket = UdpSocket::bind(("0.0.0.0", port)).await?;
    info!(port, "listening for actuation frames");
    let mut buf = [0u8; 64];
    loop {
        let (n, peer) = socket.recv_from(&mut buf).await?;
        match ActuationCommand::decode(&buf[..n]) {
            Ok(cmd) => println!(
                "{peer} {:?} object={} property={} value={}",
                cmd.op, cmd.object, cmd.property, cmd.value
            ),
            Err(e) => warn!(%peer, "undecodable frame ({n} bytes): {e}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use senmux_core::command::OpKind;
    use tokio::time::timeout;

    #[tokio::test]
    async fn sweep_emits_one_read_frame_per_pair_in_order() {
        let receiver = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let target = receiver.local_addr().unwrap().to_string();
        let emitter = CommandEmitter::bind(target, Duration::from_millis(10))
            .await
            .unwrap();

        // Tiny range and pacing; the deployed sweep only differs in bounds.
        sweep_reads(&emitter, 1..=2, 1..=3, Duration::from_millis(1)).await;

        let mut buf = [0u8; 64];
        let mut seen = Vec::new();
        for _ in 0..6 {
            let (n, _) = timeout(Duration::from_secs(2), receiver.recv_from(&mut buf))
                .await
                .expect("timed out waiting for probe frame")
                .unwrap();
            seen.push(ActuationCommand::decode(&buf[..n]).unwrap());
        }

        assert!(seen.iter().all(|c| c.op == OpKind::Read && c.value == 0));
        assert_eq!(seen[0], ActuationCommand::read(1, 1));
        assert_eq!(seen[2], ActuationCommand::read(1, 3));
        assert_eq!(seen[3], ActuationCommand::read(2, 1));
        assert_eq!(seen[5], ActuationCommand::read(2, 3));
    }
}

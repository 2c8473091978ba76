//! UDP actuation command emitter.
//!
//! Fire-and-forget with one bounded retry: a failed or short send waits a
//! fixed backoff and is attempted exactly once more, then the command is
//! dropped with a warning. No queue, no caller-visible error; worst-case
//! blocking is a single backoff interval. Commands are rare relative to the
//! window cadence, so blocking the loop for the backoff is an accepted
//! tradeoff.

use std::io;
use std::time::Duration;

use senmux_core::command::{ActuationCommand, FRAME_LEN};
use tokio::net::UdpSocket;
use tokio::time::sleep;
use tracing::{debug, warn};

pub struct CommandEmitter {
    socket: UdpSocket,
    target: String,
    backoff: Duration,
}

impl CommandEmitter {
    /// Bind an ephemeral local socket aimed at the control endpoint.
    pub async fn bind(target: String, backoff: Duration) -> io::Result<Self> {
        let socket = UdpSocket::bind("0.0.0.0:0").await?;
        Ok(Self {
            socket,
            target,
            backoff,
        })
    }

    /// Transmit one command. Never returns an error: delivery is best
    /// effort by design.
    pub async fn send(&self, cmd: ActuationCommand) {
        let frame = cmd.encode();
        match self.socket.send_to(&frame, self.target.as_str()).await {
            Ok(n) if n == FRAME_LEN => {
                debug!(?cmd, "command sent");
                return;
            }
            Ok(n) => warn!(sent = n, "short command send, retrying once"),
            Err(e) => warn!("command send failed ({e}), retrying once"),
        }

        sleep(self.backoff).await;
        match self.socket.send_to(&frame, self.target.as_str()).await {
            Ok(n) if n == FRAME_LEN => debug!(?cmd, "command sent on retry"),
            Ok(n) => warn!(sent = n, ?cmd, "short send on retry, command dropped"),
            Err(e) => warn!(?cmd, "retry failed ({e}), command dropped"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use senmux_core::command::OpKind;
    use senmux_core::decision::PROP_AMPLITUDE;

    #[tokio::test]
    async fn frame_arrives_at_control_endpoint() {
        let receiver = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let target = receiver.local_addr().unwrap().to_string();
        let emitter = CommandEmitter::bind(target, Duration::from_millis(10))
            .await
            .unwrap();

        let cmd = ActuationCommand::write(1, PROP_AMPLITUDE, 8000);
        emitter.send(cmd).await;

        let mut buf = [0u8; 64];
        let (n, _) = receiver.recv_from(&mut buf).await.unwrap();
        assert_eq!(n, FRAME_LEN);
        let decoded = ActuationCommand::decode(&buf[..n]).unwrap();
        assert_eq!(decoded.op, OpKind::Write);
        assert_eq!(decoded, cmd);
    }
}

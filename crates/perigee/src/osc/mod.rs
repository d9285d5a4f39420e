//! OSC network listener.
//!
//! A UDP socket on localhost receives the messages the audio engine emits
//! for every played event. `/play` messages are rendered to text and
//! offered to a bounded queue; when the queue is full the message is
//! dropped (see [`crate::queue::LineSender::offer`]) so a stalled UI never
//! backs up the socket.

pub mod decode;

use std::net::{Ipv4Addr, SocketAddr, UdpSocket};
use std::thread;

use tracing::{debug, info, warn};

use crate::error::ListenerError;
use crate::queue::{LineSender, Offer};

pub use decode::{decode_packet, OscArg, OscMessage};

pub const DEFAULT_OSC_PORT: u16 = 9191;
pub const PLAY_ADDRESS: &str = "/play";

const MAX_PACKET: usize = 8192;

/// Bind `127.0.0.1:port` and start the listener thread. Returns the bound
/// address (useful when `port` is 0).
pub fn spawn_listener(port: u16, output: LineSender) -> Result<SocketAddr, ListenerError> {
    let addr = SocketAddr::from((Ipv4Addr::LOCALHOST, port));
    let socket = UdpSocket::bind(addr).map_err(|source| ListenerError::Bind {
        addr: addr.to_string(),
        source,
    })?;
    let local = socket.local_addr().unwrap_or(addr);
    info!("OSC listener bound on {local}");

    let spawned = thread::Builder::new()
        .name("osc-listener".to_string())
        .spawn(move || run_listener(socket, output));
    if let Err(err) = spawned {
        warn!("failed to spawn OSC listener thread: {err}");
    }
    Ok(local)
}

fn run_listener(socket: UdpSocket, output: LineSender) {
    let mut buffer = [0u8; MAX_PACKET];
    loop {
        let size = match socket.recv_from(&mut buffer) {
            Ok((size, _peer)) => size,
            Err(err) => {
                warn!("OSC receive failed: {err}");
                break;
            }
        };
        let messages = match decode_packet(&buffer[..size]) {
            Ok(messages) => messages,
            Err(err) => {
                debug!("ignoring malformed OSC packet: {err}");
                continue;
            }
        };
        for message in messages
            .into_iter()
            .filter(|message| message.address == PLAY_ADDRESS)
        {
            if output.offer(message.to_string()) == Offer::Closed {
                debug!("OSC queue closed, listener exiting");
                return;
            }
        }
    }
}

/// A network event as consumed by visuals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OscEvent {
    pub text: String,
    pub instrument: Option<String>,
}

impl OscEvent {
    pub fn parse(text: &str) -> Self {
        Self {
            text: text.to_string(),
            instrument: instrument_name(text).map(str::to_string),
        }
    }
}

/// The instrument is the third whitespace token of a `/play` message
/// (`"/play ,ss kalimba a"` -> `kalimba`).
pub fn instrument_name(text: &str) -> Option<&str> {
    if !text.contains(PLAY_ADDRESS) {
        return None;
    }
    text.split_whitespace().nth(2)
}

#[cfg(test)]
mod tests {
    use super::decode::tests::encode;
    use super::{instrument_name, spawn_listener, OscArg, OscEvent};
    use crate::queue::{line_queue, QUEUE_CAPACITY};
    use std::net::UdpSocket;
    use std::time::Duration;

    #[test]
    fn instrument_is_third_token_of_play_messages() {
        assert_eq!(instrument_name("/play ,ssffii kalimba a 0.5"), Some("kalimba"));
        assert_eq!(instrument_name("/play ,s"), None);
        assert_eq!(instrument_name("/status ,s x y"), None);

        let event = OscEvent::parse("/play ,ss bd 1");
        assert_eq!(event.instrument.as_deref(), Some("bd"));
    }

    #[test]
    fn listener_queues_play_messages_only() {
        let (tx, sub) = line_queue("osc", QUEUE_CAPACITY);
        let addr = spawn_listener(0, tx).expect("bind listener");

        let client = UdpSocket::bind("127.0.0.1:0").expect("client socket");
        let ignored = encode("/status", &[OscArg::Int(1)]);
        let play = encode(
            "/play",
            &[OscArg::Str("superpiano".to_string()), OscArg::Float(0.25)],
        );
        client.send_to(&ignored, addr).expect("send status");
        client.send_to(&play, addr).expect("send play");

        let line = sub.next_timeout(Duration::from_secs(5));
        assert_eq!(line.as_deref(), Some("/play ,sf superpiano 0.25"));
        assert_eq!(sub.next_timeout(Duration::from_millis(50)), None);
    }
}

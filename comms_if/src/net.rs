//! # Network Module
//!
//! This module provides a thin blocking abstraction over WebSocket connections, which is how the
//! driving simulator talks to the controller.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::{net::{SocketAddr, TcpStream}, time::Duration};
use log::debug;
use serde::Deserialize;
use tungstenite::{
    error::ProtocolError,
    Message, WebSocket
};

// Export tungstenite
pub use tungstenite;

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Endpoint the simulator connects to by default.
pub const DEFAULT_SIM_ENDPOINT: &str = "0.0.0.0:4567";

/// How long to wait for the remote end to acknowledge a close.
const CLOSE_TIMEOUT: Duration = Duration::from_secs(1);

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Network parameters.
#[derive(Debug, Clone, Deserialize)]
pub struct NetParams {
    /// Address the simulator server listens on, for example `"0.0.0.0:4567"`.
    pub sim_endpoint: String
}

/// A blocking text WebSocket connection.
///
/// Control frames are handled internally: pings are answered by tungstenite as part of the next
/// read or write, and a close or reset is reported as the end of the connection.
pub struct WsConnection {
    socket: WebSocket<TcpStream>,

    peer: Option<SocketAddr>
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(thiserror::Error, Debug)]
pub enum WsError {
    #[error("Could not connect to {0}: {1}")]
    ConnectError(String, std::io::Error),

    #[error("WebSocket handshake failed: {0}")]
    HandshakeError(String),

    #[error("Could not read from the connection: {0}")]
    RecvError(tungstenite::Error),

    #[error("Could not send to the connection: {0}")]
    SendError(tungstenite::Error)
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Default for NetParams {
    fn default() -> Self {
        Self {
            sim_endpoint: String::from(DEFAULT_SIM_ENDPOINT)
        }
    }
}

impl WsConnection {
    /// Perform the server side handshake on a freshly accepted stream.
    pub fn accept(stream: TcpStream) -> Result<Self, WsError> {
        let peer = stream.peer_addr().ok();

        let socket = tungstenite::accept(stream)
            .map_err(|e| WsError::HandshakeError(e.to_string()))?;

        Ok(Self { socket, peer })
    }

    /// Connect to a server as a client.
    ///
    /// ## Arguments
    /// - `addr`: the address of the server, such as `"127.0.0.1:4567"`
    /// - `path`: the request path, such as `"/socket.io/?EIO=4&transport=websocket"`
    pub fn connect(addr: &str, path: &str) -> Result<Self, WsError> {
        let stream = TcpStream::connect(addr)
            .map_err(|e| WsError::ConnectError(addr.to_owned(), e))?;
        let peer = stream.peer_addr().ok();

        let url = format!("ws://{}{}", addr, path);
        let (socket, _response) = tungstenite::client(url.as_str(), stream)
            .map_err(|e| WsError::HandshakeError(e.to_string()))?;

        Ok(Self { socket, peer })
    }

    /// Address of the remote end, if known.
    pub fn peer(&self) -> Option<SocketAddr> {
        self.peer
    }

    /// Block until the next text message is received.
    ///
    /// Returns `Ok(None)` once the remote end has closed or dropped the connection. Binary
    /// messages are ignored.
    pub fn recv_text(&mut self) -> Result<Option<String>, WsError> {
        loop {
            match self.socket.read() {
                Ok(Message::Text(text)) => return Ok(Some(text)),
                Ok(Message::Close(frame)) => {
                    debug!("Close frame received: {:?}", frame);

                    // Push out the queued close acknowledgement
                    self.socket.flush().ok();
                    return Ok(None)
                },
                Ok(_) => continue,
                Err(tungstenite::Error::ConnectionClosed)
                | Err(tungstenite::Error::AlreadyClosed)
                | Err(tungstenite::Error::Protocol(ProtocolError::ResetWithoutClosingHandshake)) =>
                    return Ok(None),
                Err(e) => return Err(WsError::RecvError(e))
            }
        }
    }

    /// Send a text message.
    pub fn send_text(&mut self, text: &str) -> Result<(), WsError> {
        self.socket
            .send(Message::Text(text.to_owned()))
            .map_err(WsError::SendError)
    }

    /// Start the closing handshake.
    ///
    /// Errors are ignored since the connection is being thrown away anyway.
    pub fn close(&mut self) {
        if let Err(e) = self.socket.close(None) {
            debug!("Error while closing connection: {}", e);
        }

        // Drive the handshake until the remote answers or the read times out
        self.socket.get_ref().set_read_timeout(Some(CLOSE_TIMEOUT)).ok();
        while self.socket.read().is_ok() {}
    }
}

//! # Simulator Server Module
//!
//! This module abstracts over the networking side of the controller. The simulator connects to
//! the server over a WebSocket and streams telemetry frames, each one of which is answered with a
//! command frame before the next one is read.
//!
//! Connections are served one at a time. Controller state is kept across connections, a
//! reconnecting simulator continues where the previous connection left off.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::net::{SocketAddr, TcpListener};
use comms_if::{
    net::{NetParams, WsConnection, WsError},
    sim::{self, SimEvent, SimFrameError, SimReply}
};
use log::{debug, info, trace};
use util::module::State;

use crate::pid_ctrl::{PidCtrl, PidCtrlError};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Number of characters of an offending frame kept in errors.
const MAX_FRAME_EXCERPT: usize = 128;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Server accepting connections from the simulator.
pub struct SimServer {
    listener: TcpListener
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Errors which can occur in the [`SimServer`]
#[derive(thiserror::Error, Debug)]
pub enum SimServerError {
    #[error("Could not listen on {0}: {1}")]
    BindError(String, std::io::Error),

    #[error("Could not accept a connection: {0}")]
    AcceptError(std::io::Error),

    #[error("Connection error: {0}")]
    ConnectionError(#[from] WsError),

    #[error("Could not handle frame {frame:?}: {source}")]
    FrameError {
        frame: String,
        source: SimFrameError
    },

    #[error("PidCtrl error: {0}")]
    CtrlError(#[from] PidCtrlError)
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl SimServer {

    /// Create a new server listening on the endpoint in the parameters.
    ///
    /// This function will not wait for a connection from the simulator before returning.
    pub fn new(params: &NetParams) -> Result<Self, SimServerError> {
        let listener = TcpListener::bind(&params.sim_endpoint)
            .map_err(|e| SimServerError::BindError(params.sim_endpoint.clone(), e))?;

        Ok(Self { listener })
    }

    /// The address the server is listening on.
    pub fn local_addr(&self) -> Result<SocketAddr, SimServerError> {
        self.listener.local_addr().map_err(SimServerError::AcceptError)
    }

    /// Block until a simulator connects.
    pub fn accept(&self) -> Result<WsConnection, SimServerError> {
        let (stream, addr) = self.listener.accept()
            .map_err(SimServerError::AcceptError)?;

        debug!("TCP connection from {}, starting handshake", addr);

        Ok(WsConnection::accept(stream)?)
    }

    /// Accept one connection and serve it until the simulator disconnects.
    ///
    /// A hard error on the connection closes it and is returned to the caller.
    pub fn serve(&self, ctrl: &mut PidCtrl) -> Result<(), SimServerError> {
        let mut conn = self.accept()?;

        info!("Connected to {:?}", conn.peer());

        let result = serve_connection(&mut conn, ctrl);

        info!("Disconnected from {:?}", conn.peer());

        result
    }
}

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Answer the frames on a connection until it is closed by the remote.
pub fn serve_connection(
    conn: &mut WsConnection,
    ctrl: &mut PidCtrl
) -> Result<(), SimServerError> {
    while let Some(frame) = conn.recv_text()? {
        let reply = match process_frame(ctrl, &frame) {
            Ok(r) => r,
            Err(e) => {
                conn.close();
                return Err(e)
            }
        };

        if let Some(msg) = reply {
            conn.send_text(&msg)?;
        }
    }

    Ok(())
}

/// Handle a single frame from the simulator, returning the frame to send back if any.
///
/// Telemetry drives the controllers, a frame without data is answered with the manual command
/// and leaves the controllers untouched, anything else is ignored.
pub fn process_frame(
    ctrl: &mut PidCtrl,
    frame: &str
) -> Result<Option<String>, SimServerError> {
    let event = sim::parse_frame(frame)
        .map_err(|source| SimServerError::FrameError {
            frame: frame.chars().take(MAX_FRAME_EXCERPT).collect(),
            source
        })?;

    let reply = match event {
        Some(SimEvent::Telemetry(sample)) => {
            let (cmd, _) = ctrl.proc_archived(&sample)?;

            SimReply::Steer(cmd)
        },
        Some(SimEvent::Manual) => SimReply::Manual,
        Some(SimEvent::Other(name)) => {
            debug!("Ignoring \"{}\" event", name);
            return Ok(None)
        },
        None => {
            trace!("Ignoring non-event frame");
            return Ok(None)
        }
    };

    let msg = reply.to_frame()
        .map_err(|source| SimServerError::FrameError {
            frame: frame.chars().take(MAX_FRAME_EXCERPT).collect(),
            source
        })?;

    debug!("{}", msg);

    Ok(Some(msg))
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

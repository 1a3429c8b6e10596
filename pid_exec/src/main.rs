//! Controller executable entry point.
//!
//! # Architecture
//!
//! The execution methodology consists of:
//!
//!     - Initialise the session, logging and parameters
//!     - Initialise PidCtrl
//!     - Start the simulator server
//!     - Main loop, once per simulator connection:
//!         - For every frame received:
//!             - Decode telemetry
//!             - PidCtrl processing
//!             - Send the commands back to the simulator
//!
//! Controller state is kept for the whole run, across simulator reconnections.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use color_eyre::{Report, eyre::WrapErr};
use log::{debug, error, info, warn};
use std::path::PathBuf;
use structopt::StructOpt;

// Internal
use comms_if::net::NetParams;
use pid_lib::{
    pid_ctrl::{Params, PidCtrl},
    sim_server::{SimServer, SimServerError}
};
use util::{
    logger::{logger_init, LevelFilter},
    module::State,
    session::Session
};

// ---------------------------------------------------------------------------
// STRUCTS
// ---------------------------------------------------------------------------

/// PID lane keeping controller for the driving simulator.
#[derive(Debug, StructOpt)]
#[structopt(name = "pid_exec")]
struct Opts {
    /// Load the PidCtrl parameters from this file instead of `params/pid_ctrl.toml`
    #[structopt(long, parse(from_os_str))]
    pid_params: Option<PathBuf>,

    /// Listen on this address instead of the one in `params/net.toml`
    #[structopt(long)]
    endpoint: Option<String>,

    /// Minimum log level, one of `trace`, `debug` or `info`
    #[structopt(long, default_value = "debug")]
    log_level: LevelFilter
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Executable main function, entry point.
fn main() -> Result<(), Report> {

    color_eyre::install()?;

    let opts = Opts::from_args();

    // ---- EARLY INITIALISATION ----

    // Initialise session
    let session = Session::new(
        "pid_exec",
        "sessions"
    ).wrap_err("Failed to create the session")?;

    // Initialise logger
    logger_init(opts.log_level, &session)
        .wrap_err("Failed to initialise logging")?;

    info!("PID Controller Executable\n");
    info!("Session directory: {:?}\n", session.session_root);
    debug!("CLI arguments: {:?}", opts);

    // ---- LOAD PARAMETERS ----

    let mut net_params = util::params::load::<NetParams>(
        "net.toml"
    ).wrap_err("Could not load net params")?;

    if let Some(endpoint) = opts.endpoint {
        net_params.sim_endpoint = endpoint;
    }

    let pid_params = match opts.pid_params {
        Some(ref path) => util::params::load_from_path::<Params, _>(path),
        None => util::params::load::<Params>("pid_ctrl.toml")
    }.wrap_err("Could not load PidCtrl params")?;

    info!("Exec parameters loaded");

    // ---- INITIALISE MODULES ----

    let mut pid_ctrl = PidCtrl::default();

    pid_ctrl.init(pid_params, &session)
        .wrap_err("Failed to initialise PidCtrl")?;
    info!("PidCtrl init complete");

    // ---- INITIALISE NETWORK ----

    let server = SimServer::new(&net_params)
        .wrap_err("Failed to initialise SimServer")?;

    info!("Listening on {}", server.local_addr()?);

    // ---- MAIN LOOP ----

    loop {
        match server.serve(&mut pid_ctrl) {
            Ok(()) => (),
            Err(SimServerError::AcceptError(e)) =>
                warn!("Could not accept a connection: {}", e),
            Err(SimServerError::ConnectionError(e)) =>
                warn!("Connection lost: {}", e),
            // Anything else means we couldn't answer a frame, the connection has been dropped
            Err(e) => error!("{}", e)
        }
    }
}

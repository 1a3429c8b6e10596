//! Drives the simulator server over a loopback WebSocket, the way the simulator would.

use std::thread::{self, JoinHandle};

use comms_if::{
    net::{NetParams, WsConnection},
    sim::{self, CommandPair, TelemetrySample}
};
use pid_lib::{
    pid_ctrl::{Params, PidCtrl},
    sim_server::{SimServer, SimServerError}
};

/// Request path used by the simulator's socket.io client.
const SIM_PATH: &str = "/socket.io/?EIO=4&transport=websocket";

type ServerResult = (PidCtrl, Result<(), SimServerError>);

/// Start a server on an ephemeral port which serves a single connection.
fn start_server() -> (String, JoinHandle<ServerResult>) {
    let server = SimServer::new(&NetParams {
        sim_endpoint: String::from("127.0.0.1:0")
    }).unwrap();
    let addr = server.local_addr().unwrap().to_string();

    let jh = thread::spawn(move || {
        let mut ctrl = PidCtrl::new(Params::default()).unwrap();
        let result = server.serve(&mut ctrl);
        (ctrl, result)
    });

    (addr, jh)
}

fn decode_steer(frame: &str) -> CommandPair {
    assert!(frame.starts_with(sim::EVENT_MARKER));

    let (name, cmd): (String, CommandPair) =
        serde_json::from_str(&frame[sim::EVENT_MARKER.len()..]).unwrap();
    assert_eq!(name, sim::STEER_EVENT);

    cmd
}

#[test]
fn test_telemetry_round_trip() {
    let (addr, jh) = start_server();
    let mut client = WsConnection::connect(&addr, SIM_PATH).unwrap();

    // Engine.IO chatter gets no answer
    client.send_text("2probe").unwrap();

    client.send_text(&sim::telemetry_frame(&TelemetrySample {
        cte: 0.5,
        speed: 30.0,
        steering_angle: 0.0
    }).unwrap()).unwrap();

    let cmd = decode_steer(&client.recv_text().unwrap().unwrap());
    assert_eq!(cmd.steering_angle, -0.5);
    assert!((cmd.throttle - (0.4 - 0.375)).abs() < 1e-12);

    // No data means manual driving
    client.send_text(r#"42["telemetry",null]"#).unwrap();
    assert_eq!(client.recv_text().unwrap().as_deref(), Some(r#"42["manual",{}]"#));

    // Slow enough to trigger recovery
    client.send_text(&sim::telemetry_frame(&TelemetrySample {
        cte: -0.25,
        speed: 5.0,
        steering_angle: 0.0
    }).unwrap()).unwrap();

    let cmd = decode_steer(&client.recv_text().unwrap().unwrap());
    let params = Params::default();
    assert_eq!(cmd.throttle, params.throt_bias - params.recovery_throt);

    client.close();

    let (ctrl, result) = jh.join().unwrap();
    assert!(result.is_ok());

    // Only the two telemetry frames reached the controllers
    let policy = ctrl.policy().unwrap();
    assert_eq!(policy.steer_ctrl().p_error(), -0.25);
    assert_eq!(policy.steer_ctrl().i_error(), 0.25);
    assert_eq!(policy.throt_ctrl().i_error(), 0.75);
}

#[test]
fn test_bad_telemetry_drops_connection() {
    let (addr, jh) = start_server();
    let mut client = WsConnection::connect(&addr, SIM_PATH).unwrap();

    client.send_text(
        r#"42["telemetry",{"cte":"not a number","speed":"30","steering_angle":"0"}]"#
    ).unwrap();

    // The server closes instead of replying
    assert_eq!(client.recv_text().unwrap(), None);

    let (ctrl, result) = jh.join().unwrap();
    assert!(matches!(result, Err(SimServerError::FrameError { .. })));
    assert_eq!(ctrl.policy().unwrap().steer_ctrl().i_error(), 0.0);
}

#[test]
fn test_state_kept_across_connections() {
    let server = SimServer::new(&NetParams {
        sim_endpoint: String::from("127.0.0.1:0")
    }).unwrap();
    let addr = server.local_addr().unwrap().to_string();

    let jh = thread::spawn(move || {
        let mut ctrl = PidCtrl::new(Params::default()).unwrap();
        let first = server.serve(&mut ctrl);
        let second = server.serve(&mut ctrl);
        (ctrl, first, second)
    });

    for &cte in [0.5, 0.25].iter() {
        let mut client = WsConnection::connect(&addr, SIM_PATH).unwrap();

        client.send_text(&sim::telemetry_frame(&TelemetrySample {
            cte,
            speed: 30.0,
            steering_angle: 0.0
        }).unwrap()).unwrap();

        decode_steer(&client.recv_text().unwrap().unwrap());

        client.close();
    }

    let (ctrl, first, second) = jh.join().unwrap();
    assert!(first.is_ok());
    assert!(second.is_ok());

    // The second connection continued from the first one's history
    let steer = ctrl.policy().unwrap().steer_ctrl();
    assert_eq!(steer.p_error(), 0.25);
    assert_eq!(steer.i_error(), 0.75);
    assert_eq!(steer.d_error(), -0.25);
}

//! Fake simulator client
//!
//! Connects to a running controller, sends synthetic telemetry and prints the replies. The cross
//! track error follows a sine wave so both signs and the saturation limits get exercised.

use comms_if::{
    net::WsConnection,
    sim::{self, SimReply, TelemetrySample}
};
use structopt::StructOpt;

#[derive(Debug, StructOpt)]
#[structopt(name = "test_sim_client")]
struct Opts {
    /// Address of the controller
    #[structopt(long, default_value = "127.0.0.1:4567")]
    addr: String,

    /// Number of telemetry frames to send
    #[structopt(long, default_value = "100")]
    count: usize,

    /// Amplitude of the cross track error
    #[structopt(long, default_value = "1.0")]
    cte_amplitude: f64,

    /// Reported vehicle speed
    #[structopt(long, default_value = "30.0")]
    speed: f64,

    /// Delay between frames in milliseconds
    #[structopt(long, default_value = "50")]
    period_ms: u64
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let opts = Opts::from_args();

    let mut conn = match WsConnection::connect(&opts.addr, "/socket.io/?EIO=4&transport=websocket") {
        Ok(c) => c,
        Err(e) => {
            println!("Could not connect to the controller");
            return Err(e.into())
        }
    };

    // A frame with no data should always get the manual reply
    conn.send_text(r#"42["telemetry",null]"#)?;
    match conn.recv_text()? {
        Some(r) => println!("null frame -> {}", r),
        None => return Err("Connection closed by the controller".into())
    }

    for i in 0..opts.count {
        let sample = TelemetrySample {
            cte: opts.cte_amplitude * (i as f64 * 0.1).sin(),
            speed: opts.speed,
            steering_angle: 0.0
        };

        conn.send_text(&sim::telemetry_frame(&sample)?)?;

        let reply = match conn.recv_text()? {
            Some(r) => r,
            None => {
                println!("Connection closed by the controller");
                break
            }
        };

        println!("cte {:+.4} -> {}", sample.cte, reply);

        std::thread::sleep(std::time::Duration::from_millis(opts.period_ms));
    }

    println!("Expected manual reply: {}", SimReply::Manual.to_frame()?);

    conn.close();

    Ok(())
}

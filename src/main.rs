//! Deskball - a desktop novelty ball with spring/decay physics
//!
//! Main entry point: runs the scripted demo session headless and reports
//! what happened. A deployment embeds the same plugin stack under a
//! windowed front-end; the simulation does not change.
//!
//! Usage:
//!   cargo run                  # Demo session, event log under logs/
//!   cargo run -- --no-log      # Demo session without the log file

use deskball::simulation::run_demo_session;

fn main() {
    let args: Vec<String> = std::env::args().collect();

    if args.iter().any(|a| a == "--help" || a == "-h") {
        print_usage();
        return;
    }

    let log_events = !args.iter().any(|a| a == "--no-log");

    let report = run_demo_session(log_events);

    println!("Demo session");
    println!("============");
    println!("Frames simulated: {}", report.frames);
    println!("Wall contacts:    {}", report.wall_contacts);
    println!("Flicks applied:   {}", report.flicks);
    println!("Ball docked:      {}", report.docked);
    match &report.session_id {
        Some(id) => println!("Session:          {}", id),
        None => println!("Session:          not logged"),
    }
    if let Some(ball) = &report.final_snapshot.ball {
        println!(
            "Final ball:       ({:.1}, {:.1})",
            ball.position.0, ball.position.1
        );
    } else {
        println!("Final ball:       docked away");
    }
}

fn print_usage() {
    println!(
        "Deskball demo session

USAGE:
    cargo run -- [OPTIONS]

OPTIONS:
    --no-log    Skip writing the session event log under logs/
    --help      Show this help"
    );
}

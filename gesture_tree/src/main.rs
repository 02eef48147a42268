//! gesture_tree — interactive entry point.

use gesture_tree::app::{run, AppConfig};
use tracing::{error, Level};

const USAGE: &str = "\
usage: gesture_tree [--seed <u64>] [--verbose]

  --seed <u64>   reproducible particle layout and effects
  --verbose      debug-level logging
  --help         show this message";

fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();

    if args.iter().any(|a| a == "--help" || a == "-h") {
        println!("{}", USAGE);
        return;
    }

    let level = if args.iter().any(|a| a == "--verbose" || a == "-v") {
        Level::DEBUG
    } else {
        Level::INFO
    };
    tracing_subscriber::fmt().with_max_level(level).init();

    let seed = match parse_seed(&args) {
        Ok(seed) => seed,
        Err(msg) => {
            eprintln!("Error: {}\n\n{}", msg, USAGE);
            std::process::exit(2);
        }
    };

    println!();
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║        Gesture Tree — Hand-Sculpted Particle Display         ║");
    println!("╚══════════════════════════════════════════════════════════════╝");
    println!();

    #[cfg(feature = "leap")]
    println!("  Mode: LeapMotion hardware");
    #[cfg(not(feature = "leap"))]
    println!("  Mode: Keyboard simulation  (use --features leap for hardware)");
    if let Some(seed) = seed {
        println!("  Seed: {}", seed);
    }
    println!();
    println!("  Opening visualizer window…");
    println!();

    let cfg = AppConfig { seed, ..AppConfig::default() };
    if let Err(e) = run(cfg) {
        error!(error = %e, "gesture_tree exited with an error");
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn parse_seed(args: &[String]) -> Result<Option<u64>, String> {
    let Some(pos) = args.iter().position(|a| a == "--seed") else {
        return Ok(None);
    };
    let raw = args.get(pos + 1).ok_or("--seed needs a value")?;
    raw.parse()
        .map(Some)
        .map_err(|_| format!("--seed expects an unsigned integer, got {:?}", raw))
}

//! Run one arena scenario and print the outcome.
//!
//! Usage:
//!   cargo run -p zumo_cup_sitl --bin arena_run -- [OPTIONS] <SCENARIO.json>
//!
//! Options:
//!   -t, --duration <SECONDS>   Simulated run time (default: 60)
//!   --calibrate                Run the compass calibration sweep first
//!   --seed <N>                 Override the scenario noise seed
//!   --json                     Print the summary as JSON
//!   -v, --verbose              Print mode transitions and status lines

use std::env;
use std::process;

use zumo_cup_firmware::robot::CalibrationConfig;
use zumo_cup_sitl::{ArenaRunner, Scenario};

struct Args {
    scenario: String,
    duration_s: u64,
    calibrate: bool,
    seed: Option<u64>,
    json: bool,
    verbose: bool,
}

fn parse_args() -> Args {
    let mut args = Args {
        scenario: String::new(),
        duration_s: 60,
        calibrate: false,
        seed: None,
        json: false,
        verbose: false,
    };

    let raw: Vec<String> = env::args().collect();
    let mut i = 1;
    while i < raw.len() {
        match raw[i].as_str() {
            "-t" | "--duration" => {
                i += 1;
                args.duration_s = parse_u64_arg(&raw, i, "duration");
            }
            "--seed" => {
                i += 1;
                args.seed = Some(parse_u64_arg(&raw, i, "seed"));
            }
            "--calibrate" => args.calibrate = true,
            "--json" => args.json = true,
            "-v" | "--verbose" => args.verbose = true,
            "-h" | "--help" => {
                print_usage();
                process::exit(0);
            }
            other if other.starts_with('-') => {
                eprintln!("Unknown option: {other}");
                print_usage();
                process::exit(1);
            }
            path => args.scenario = path.to_string(),
        }
        i += 1;
    }

    if args.scenario.is_empty() {
        eprintln!("Error: a scenario file is required");
        print_usage();
        process::exit(1);
    }

    args
}

fn parse_u64_arg(raw: &[String], i: usize, name: &str) -> u64 {
    raw.get(i)
        .unwrap_or_else(|| {
            eprintln!("Error: --{name} requires a value");
            process::exit(1);
        })
        .parse()
        .unwrap_or_else(|_| {
            eprintln!("Error: invalid value for --{name}");
            process::exit(1);
        })
}

fn print_usage() {
    eprintln!(
        "Usage: arena_run [OPTIONS] <SCENARIO.json>\n\
         \n\
         Options:\n\
         \x20 -t, --duration <SECONDS>  Simulated run time (default: 60)\n\
         \x20 --calibrate               Run the compass calibration sweep first\n\
         \x20 --seed <N>                Override the scenario noise seed\n\
         \x20 --json                    Print the summary as JSON\n\
         \x20 -v, --verbose             Print mode transitions and status lines\n\
         \x20 -h, --help                Show this help"
    );
}

fn main() {
    let args = parse_args();

    let mut scenario = Scenario::load(&args.scenario).unwrap_or_else(|e| {
        eprintln!("Error: {e}");
        process::exit(1);
    });
    if let Some(seed) = args.seed {
        scenario.seed = seed;
    }

    if !args.json {
        println!("=== zumo_cup arena: {} ===", scenario.name);
    }
    let mut runner = ArenaRunner::new(scenario);

    if args.calibrate {
        match runner.calibrate_compass(CalibrationConfig::default()) {
            Ok(cal) if !args.json => println!(
                "Compass calibrated: offset ({:.3}, {:.3}) scale ({:.3}, {:.3})",
                cal.offset.x, cal.offset.y, cal.scale.x, cal.scale.y
            ),
            Ok(_) => {}
            Err(e) => eprintln!("Warning: {e}, continuing uncalibrated"),
        }
    }

    if let Err(e) = runner.start() {
        eprintln!("Error: {e}");
        process::exit(1);
    }

    let deadline = runner.now_ms() + args.duration_s * 1000;
    let mut next_status = runner.now_ms();
    while runner.now_ms() < deadline {
        let transition = runner.step();
        if !args.verbose {
            continue;
        }
        if let Some(t) = transition {
            println!("[{:>7}] {} -> {}", t.at_ms, t.from, t.to);
        }
        if runner.now_ms() >= next_status {
            println!("[{:>7}] {}", runner.now_ms(), runner.status());
            next_status += 1000;
        }
    }

    let summary = runner.summary();
    if args.json {
        match serde_json::to_string_pretty(&summary) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                eprintln!("Error: {e}");
                process::exit(1);
            }
        }
    } else {
        println!();
        println!("{summary}");
    }
}

//! exec-gatekeeper - Allowlist-gated native messaging host
//!
//! # Usage
//!
//! ```bash
//! # Started by the browser; talks length-prefixed JSON over stdin/stdout
//! exec-gatekeeper --config /etc/exec-gatekeeper.yaml
//!
//! # Validate a config file and list its rules
//! exec-gatekeeper --config exec-gatekeeper.yaml --check
//! ```

use std::env;
use std::io;
use std::path::Path;
use std::process;

use exec_gatekeeper::{
    audit::HostLogger,
    config::{Config, DEFAULT_LOG_FILE},
    engine,
    exec::SystemExecutor,
    handlers::{BUILD, VERSION},
    host::Host,
};

/// Print version information
fn print_version() {
    println!("exec-gatekeeper {} (build {})", VERSION, BUILD);
}

/// Print help message
fn print_help() {
    println!(
        r#"exec-gatekeeper - Allowlist-gated native messaging host

USAGE:
    exec-gatekeeper [OPTIONS] [ORIGIN]

OPTIONS:
    -h, --help              Print this help message
    -v, --version           Print version information
    -c, --config PATH       Path to config file (default: ./exec-gatekeeper.yaml)
        --check             Load the config, list its rules and exit

The browser passes the calling extension's origin as a positional argument;
it is ignored.

CONFIG (YAML, or TOML for any other extension):
    allowed:
      - cmd: notepad
        arguments:
          - type: list          # string | list | url
            values: [a.txt, b.txt]
            trimLeft: []
            trimRight: []
            insertBefore: []
            insertAfter: []
            splitSpace: false
    host:
      max_payload: 8192
      byte_order: native        # native | little | big
      strict_frames: false
      log_path: exec-gatekeeper.log
"#
    );
}

/// Parse command line arguments
struct Args {
    help: bool,
    version: bool,
    check: bool,
    config_path: Option<String>,
}

impl Args {
    fn parse() -> Self {
        let args: Vec<String> = env::args().collect();
        let mut result = Args {
            help: false,
            version: false,
            check: false,
            config_path: None,
        };

        let mut i = 1;
        while i < args.len() {
            match args[i].as_str() {
                "-h" | "--help" => result.help = true,
                "-v" | "--version" => result.version = true,
                "--check" => result.check = true,
                "-c" | "--config" => {
                    if i + 1 < args.len() {
                        i += 1;
                        result.config_path = Some(args[i].clone());
                    }
                }
                arg if arg.starts_with("--config=") => {
                    let path = arg.trim_start_matches("--config=");
                    result.config_path = Some(path.to_string());
                }
                _ => {}
            }
            i += 1;
        }

        result
    }
}

/// List the loaded rules (`--check`)
fn print_rules(config: &Config) {
    println!("Loaded configuration with {} rules", config.allowed.len());
    for (idx, rule) in config.allowed.iter().enumerate() {
        println!("  {}: {}", idx, rule.summary());
    }
    println!(
        "Commands: {}",
        engine::known_commands(&config.allowed).join(", ")
    );
}

fn main() {
    let args = Args::parse();

    if args.help {
        print_help();
        return;
    }

    if args.version {
        print_version();
        return;
    }

    let config_path = args
        .config_path
        .as_deref()
        .map(Config::expand_path)
        .unwrap_or_else(Config::default_path);

    // A bad config is fatal; never serve with a partial allowlist
    let config = match Config::load_from(&config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            HostLogger::new(Some(Path::new(DEFAULT_LOG_FILE))).error("config", e.to_string());
            process::exit(1);
        }
    };

    if args.check {
        print_rules(&config);
        return;
    }

    let mut logger = HostLogger::new(config.log_path().as_deref());
    let codec = config.codec();
    logger.trace(
        "startup",
        format!(
            "native messaging host started. Byte order: {}. Version {} build {}",
            codec.byte_order(),
            VERSION,
            BUILD
        ),
    );
    logger.trace(
        "config",
        format!(
            "loaded {} with {} rules",
            config_path.display(),
            config.allowed.len()
        ),
    );

    let mut host = Host::new(config.allowed, codec, SystemExecutor, logger);

    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut reader = stdin.lock();
    let mut writer = stdout.lock();
    host.run(&mut reader, &mut writer);
}

// Command-line interface for mml
//
// Thin wrapper over mml-babel: it reads JSON and text from files, runs the codec and prints JSON.
//
// Usage:
//  mml render <tree.json>                                        - Document tree to legacy text + entities
//  mml parse <message.txt> [--entities F] [--media F] [--users F] - Legacy text + entities to document tree
//
// Configuration is read from ./mml.toml when present, then from --config. Logs go to stderr,
// filtered by RUST_LOG or raised with -v.

use clap::{Arg, ArgAction, ArgMatches, Command, ValueHint};
use mml_babel::ir::nodes::Document;
use mml_babel::{MarkdownParser, StaticDirectory};
use mml_config::{Loader, MmlConfig};
use serde_json::{json, Value};
use std::fs;
use tracing_subscriber::EnvFilter;

fn build_cli() -> Command {
    Command::new("mml")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Convert between MessageML trees and legacy markdown with entities")
        .long_about(
            "mml converts between a structured message tree and the legacy plain-text\n\
            markdown format, where mentions, hashtags, links and tables travel in a\n\
            separate JSON entity index addressed by UTF-16 offsets.\n\n\
            Examples:\n  \
            mml render message.json                       # Tree to text + entities\n  \
            mml parse message.txt --entities ents.json    # Text + entities to tree\n  \
            mml parse message.txt --users users.json      # Resolve mentions from a directory",
        )
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("config")
                .long("config")
                .value_name("PATH")
                .help("Path to an mml.toml configuration file")
                .value_hint(ValueHint::FilePath)
                .global(true),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Increase log verbosity (-v debug, -vv trace)")
                .action(ArgAction::Count)
                .global(true),
        )
        .subcommand(
            Command::new("render")
                .about("Render a document tree (JSON) to legacy text and entities")
                .arg(
                    Arg::new("input")
                        .help("Path to the document tree JSON")
                        .required(true)
                        .index(1)
                        .value_hint(ValueHint::FilePath),
                ),
        )
        .subcommand(
            Command::new("parse")
                .about("Parse legacy text and entities into a document tree (JSON)")
                .arg(
                    Arg::new("input")
                        .help("Path to the message text")
                        .required(true)
                        .index(1)
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("entities")
                        .long("entities")
                        .value_name("PATH")
                        .help("Entity index JSON")
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("media")
                        .long("media")
                        .value_name("PATH")
                        .help("Media (tables) JSON")
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("users")
                        .long("users")
                        .value_name("PATH")
                        .help("User directory JSON: [{\"id\", \"screenName\", \"prettyName\", \"email\"}]")
                        .value_hint(ValueHint::FilePath),
                ),
        )
}

fn main() {
    let matches = build_cli().get_matches();

    init_logging(matches.get_count("verbose"));
    let config = load_cli_config(matches.get_one::<String>("config").map(|s| s.as_str()));

    match matches.subcommand() {
        Some(("render", sub_matches)) => {
            let input = sub_matches
                .get_one::<String>("input")
                .expect("input is required");
            handle_render_command(input, &config);
        }
        Some(("parse", sub_matches)) => handle_parse_command(sub_matches, &config),
        _ => {
            eprintln!("Unknown subcommand. Use --help for usage information.");
            std::process::exit(1);
        }
    }
}

fn init_logging(verbosity: u8) {
    let default_level = match verbosity {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Handle the render command
fn handle_render_command(input: &str, config: &MmlConfig) {
    let source = read_file(input);
    let document: Document = serde_json::from_str(&source).unwrap_or_else(|e| {
        eprintln!("Invalid document tree in '{input}': {e}");
        std::process::exit(1);
    });

    let rendered = mml_babel::render_with_options(&document, &(&config.render).into());
    print_json(&render_output(&rendered.text, &rendered.entities));
}

/// Handle the parse command
fn handle_parse_command(matches: &ArgMatches, config: &MmlConfig) {
    let input = matches
        .get_one::<String>("input")
        .expect("input is required");
    let text = read_file(input);
    let entities = matches.get_one::<String>("entities").map(|p| read_json(p));
    let media = matches.get_one::<String>("media").map(|p| read_json(p));
    let directory = match matches.get_one::<String>("users") {
        Some(path) => serde_json::from_value::<StaticDirectory>(read_json(path)).unwrap_or_else(|e| {
            eprintln!("Invalid user directory in '{path}': {e}");
            std::process::exit(1);
        }),
        None => StaticDirectory::new(),
    };

    let parser = MarkdownParser::with_options(&directory, (&config.parse).into());
    let parsed = parser
        .parse(&text, entities.as_ref(), media.as_ref())
        .unwrap_or_else(|e| {
            eprintln!("Parse error: {e}");
            std::process::exit(1);
        });

    for degradation in &parsed.degradations {
        tracing::warn!("{degradation}");
    }
    print_json(&parsed.document);
}

fn render_output(text: &str, entities: &mml_babel::Entities) -> Value {
    json!({ "text": text, "entities": entities })
}

fn load_cli_config(explicit_path: Option<&str>) -> MmlConfig {
    let loader = Loader::new().with_optional_file("mml.toml");
    let loader = if let Some(path) = explicit_path {
        loader.with_file(path)
    } else {
        loader
    };

    loader.build().unwrap_or_else(|err| {
        eprintln!("Failed to load configuration: {err}");
        std::process::exit(1);
    })
}

fn read_file(path: &str) -> String {
    fs::read_to_string(path).unwrap_or_else(|e| {
        eprintln!("Error reading file '{path}': {e}");
        std::process::exit(1);
    })
}

fn read_json(path: &str) -> Value {
    serde_json::from_str(&read_file(path)).unwrap_or_else(|e| {
        eprintln!("Invalid JSON in '{path}': {e}");
        std::process::exit(1);
    })
}

fn print_json<T: serde::Serialize + ?Sized>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(out) => println!("{out}"),
        Err(e) => {
            eprintln!("Serialization error: {e}");
            std::process::exit(1);
        }
    }
}

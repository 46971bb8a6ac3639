use clap::{Parser, Subcommand};
use colored::Colorize;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process;

use showparse_core::canonical::fingerprint;
use showparse_core::value::record_to_json;
use showparse_core::{builtin, CommandParser, DeviceError, Error, ParserConfig, Registry};
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// showparse — schema-validated parsing of device show-command output
///
/// Parse captured command output into validated JSON records.
#[derive(Parser)]
#[command(name = "showparse", version, about, long_about = None)]
struct Cli {
    /// Enable debug logging on stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse captured output of a show command
    Parse {
        /// Concrete command, e.g. "show controllers optics 0/0/0/0"
        command: String,
        /// File holding the command output ("-" for stdin)
        #[arg(long)]
        input: PathBuf,
        /// Output as JSON (record, diagnostics, fingerprint)
        #[arg(long)]
        json: bool,
        /// Parser configuration file (JSON)
        #[arg(long)]
        config: Option<PathBuf>,
        /// Accept record keys the schema does not declare
        #[arg(long)]
        lenient: bool,
    },

    /// List supported command templates
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the schema a command's record must satisfy
    Schema {
        /// Command template or concrete command
        command: String,
    },

    /// Compute the SHA-256 fingerprint of a parsed record
    Hash {
        /// Concrete command
        command: String,
        /// File holding the command output ("-" for stdin)
        #[arg(long)]
        input: PathBuf,
    },

    /// Show version information
    Version,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let registry = builtin();
    let exit_code = match cli.command {
        Commands::Parse {
            command,
            input,
            json,
            config,
            lenient,
        } => cmd_parse(&registry, &command, &input, json, config.as_deref(), lenient),
        Commands::List { json } => cmd_list(&registry, json),
        Commands::Schema { command } => cmd_schema(&registry, &command),
        Commands::Hash { command, input } => cmd_hash(&registry, &command, &input),
        Commands::Version => {
            println!(
                "showparse {} (showparse-core {})",
                env!("CARGO_PKG_VERSION"),
                env!("CARGO_PKG_VERSION")
            );
            println!("Commands: {}", registry.len());
            0
        }
    };

    process::exit(exit_code);
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

// ── Commands ──────────────────────────────────────────────

fn cmd_parse(
    registry: &Registry,
    command: &str,
    input: &Path,
    json: bool,
    config: Option<&Path>,
    lenient: bool,
) -> i32 {
    let config = match load_config(config, lenient) {
        Ok(c) => c,
        Err(e) => return fail(&e, json),
    };
    let output = match read_input(input) {
        Ok(o) => o,
        Err(e) => return fail(&e, json),
    };
    debug!(command, input = %input.display(), strict = config.strict, "parse");

    match registry.parse_output(command, &output, &config) {
        Ok(parsed) => {
            let record = record_to_json(&parsed.record);
            if json {
                let result = serde_json::json!({
                    "ok": true,
                    "command": parsed.command,
                    "record": record,
                    "diagnostics": parsed
                        .diagnostics
                        .iter()
                        .map(|d| serde_json::json!({
                            "line": d.line,
                            "text": d.text,
                            "near": d.near,
                        }))
                        .collect::<Vec<_>>(),
                    "fingerprint": fingerprint(&parsed.record),
                });
                println!("{}", pretty(&result));
            } else {
                println!("{}", pretty(&record));
                let summary = format!(
                    "parsed {} ({} top-level keys, {} warnings)",
                    parsed.command,
                    parsed.record.len(),
                    parsed.diagnostics.len()
                );
                eprintln!("{} {}", "✓".green(), summary);
            }
            0
        }
        Err(e) => fail(&e, json),
    }
}

fn cmd_list(registry: &Registry, json: bool) -> i32 {
    let commands = registry.commands();
    if json {
        println!("{}", pretty(&serde_json::json!(commands)));
    } else {
        for command in commands {
            println!("{}", command);
        }
    }
    0
}

fn cmd_schema(registry: &Registry, command: &str) -> i32 {
    match find_parser(registry, command) {
        Ok(parser) => {
            println!("{}", pretty(&parser.schema().to_json()));
            0
        }
        Err(e) => fail(&e, false),
    }
}

fn cmd_hash(registry: &Registry, command: &str, input: &Path) -> i32 {
    let output = match read_input(input) {
        Ok(o) => o,
        Err(e) => return fail(&e, false),
    };
    debug!(command, input = %input.display(), "hash");
    match registry.parse_output(command, &output, &ParserConfig::default()) {
        Ok(parsed) => {
            println!("{}", fingerprint(&parsed.record));
            0
        }
        Err(e) => fail(&e, false),
    }
}

// ── Helpers ───────────────────────────────────────────────

/// Failure kind → exit code: 1 when the output did not parse into a
/// valid record, 2 for usage, input, and device problems
fn exit_code(error: &Error) -> i32 {
    match error {
        Error::EmptyParser { .. }
        | Error::Validation(_)
        | Error::Coercion { .. }
        | Error::PathConflict { .. }
        | Error::UnsetSlot { .. }
        | Error::EmptyKey { .. } => 1,
        Error::UnknownCommand(_)
        | Error::MissingParameter { .. }
        | Error::Config(_)
        | Error::Device(_) => 2,
    }
}

fn fail(error: &Error, json: bool) -> i32 {
    let code = exit_code(error);
    debug!(code, error = ?error, "command failed");
    if json {
        let result = serde_json::json!({
            "ok": false,
            "error": error.to_string(),
        });
        println!("{}", pretty(&result));
    } else {
        eprintln!("{} {}", "✗".red(), error);
    }
    code
}

fn find_parser<'a>(registry: &Registry<'a>, command: &str) -> Result<&'a CommandParser, Error> {
    match registry.get(command) {
        Some(parser) => Ok(parser),
        None => registry.lookup(command).map(|(parser, _)| parser),
    }
}

fn load_config(path: Option<&Path>, lenient: bool) -> Result<ParserConfig, Error> {
    let config = match path {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
            debug!(path = %path.display(), "loading parser configuration");
            ParserConfig::from_json(&text)?
        }
        None => ParserConfig::default(),
    };
    Ok(if lenient { config.lenient() } else { config })
}

fn read_input(path: &Path) -> Result<String, Error> {
    if path == Path::new("-") {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .map_err(|e| Error::Device(DeviceError::Execution(format!("stdin: {}", e))))?;
        return Ok(text);
    }
    std::fs::read_to_string(path).map_err(|e| {
        Error::Device(DeviceError::NoOutput(format!(
            "{}: {}",
            path.display(),
            e
        )))
    })
}

fn pretty(value: &serde_json::Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

//! TeamCity Test Reporter CLI
//!
//! The `tc-report` command turns test lifecycle events into TeamCity service
//! messages.
//!
//! ## Commands
//!
//! - `replay`: Replay a JSON-lines lifecycle log as service messages
//! - `message`: Encode a single service message
//!
//! Service messages go to stdout (or `--output`); logs always go to stderr.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use tracing::{info, Level};

use teamcity_core::{
    replay, FlowId, ListenerConfig, MessageEncoder, MessageType, RunSpan, Subject,
    TeamCityListener, METRICS,
};

#[derive(Parser)]
#[command(name = "tc-report")]
#[command(author = "Stevedores Org")]
#[command(version = teamcity_core::VERSION)]
#[command(about = "TeamCity service message reporter for test runs", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a recorded lifecycle log (one JSON event per line)
    Replay {
        /// Event log to read; `-` reads stdin
        #[arg(default_value = "-")]
        input: PathBuf,

        /// File to write service messages to (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Flow id to report (default: TEAMCITY_FLOW_ID or the process id)
        #[arg(long)]
        flow_id: Option<FlowId>,
    },

    /// Encode a single service message
    Message {
        /// Message type, e.g. testStarted
        kind: MessageType,

        /// Subject name
        #[arg(short, long)]
        name: String,

        /// Extra attribute as key=value (repeatable, emitted in order)
        #[arg(short, long = "param", value_parser = parse_param)]
        params: Vec<(String, String)>,

        /// Flow id to report (default: TEAMCITY_FLOW_ID or the process id)
        #[arg(long)]
        flow_id: Option<FlowId>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    teamcity_core::init_tracing(cli.json, level);

    match cli.command {
        Commands::Replay {
            input,
            output,
            flow_id,
        } => cmd_replay(&input, output.as_deref(), flow_id),
        Commands::Message {
            kind,
            name,
            params,
            flow_id,
        } => cmd_message(kind, &name, params, flow_id),
    }
}

/// Parse a `key=value` attribute.
fn parse_param(raw: &str) -> std::result::Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{}'", raw))?;
    let key = key.trim();
    if key.is_empty() || !key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(format!("invalid attribute name '{}'", key));
    }
    Ok((key.to_string(), value.to_string()))
}

fn load_config(flow_id: Option<FlowId>) -> Result<ListenerConfig> {
    let config = ListenerConfig::from_env().context("Invalid reporter environment")?;
    Ok(match flow_id {
        Some(id) => config.with_flow_id(id),
        None => config,
    })
}

fn open_input(path: &Path) -> Result<Box<dyn BufRead>> {
    if path == Path::new("-") {
        return Ok(Box::new(BufReader::new(io::stdin())));
    }
    let file = File::open(path)
        .with_context(|| format!("Failed to open event log {}", path.display()))?;
    Ok(Box::new(BufReader::new(file)))
}

fn open_output(path: Option<&Path>) -> Result<Box<dyn Write>> {
    match path {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create output {}", path.display()))?;
            Ok(Box::new(file))
        }
        None => Ok(Box::new(io::stdout())),
    }
}

fn cmd_replay(input: &Path, output: Option<&Path>, flow_id: Option<FlowId>) -> Result<()> {
    let config = load_config(flow_id)?;
    let _span = RunSpan::enter(config.flow_id);

    let reader = open_input(input)?;
    let mut listener = TeamCityListener::new(open_output(output)?, config);

    // flush whatever was written even when the log is cut short
    let result = replay(reader, &mut listener);
    let mut sink = listener.into_inner();
    sink.flush().context("Failed to flush service messages")?;
    METRICS.flush();

    let count = result.with_context(|| format!("Replay of {} failed", input.display()))?;
    info!(events = count, "Replay complete");
    Ok(())
}

fn cmd_message(
    kind: MessageType,
    name: &str,
    params: Vec<(String, String)>,
    flow_id: Option<FlowId>,
) -> Result<()> {
    let config = load_config(flow_id)?;
    let line = render_message(&MessageEncoder::new(config.flow_id), kind, name, params);

    let mut stdout = io::stdout().lock();
    stdout
        .write_all(line.as_bytes())
        .and_then(|_| stdout.flush())
        .context("Failed to write service message")?;
    Ok(())
}

fn render_message(
    encoder: &MessageEncoder,
    kind: MessageType,
    name: &str,
    params: Vec<(String, String)>,
) -> String {
    let subject = match kind {
        MessageType::TestSuiteStarted | MessageType::TestSuiteFinished => Subject::suite(name),
        _ => Subject::test(name),
    };
    encoder.encode(kind, &subject, params)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_param() {
        assert_eq!(
            parse_param("message=it failed = badly").unwrap(),
            ("message".to_string(), "it failed = badly".to_string())
        );
        assert_eq!(
            parse_param("duration=").unwrap(),
            ("duration".to_string(), String::new())
        );
        assert!(parse_param("no-equals").is_err());
        assert!(parse_param("=value").is_err());
        assert!(parse_param("bad key=value").is_err());
    }

    #[test]
    fn test_cli_parses_message_command() {
        let cli = Cli::try_parse_from([
            "tc-report",
            "message",
            "testIgnored",
            "--name",
            "T",
            "--param",
            "message=later",
            "--flow-id",
            "9",
        ])
        .unwrap();
        match cli.command {
            Commands::Message {
                kind,
                name,
                params,
                flow_id,
            } => {
                assert_eq!(kind, MessageType::TestIgnored);
                assert_eq!(name, "T");
                assert_eq!(params, vec![("message".to_string(), "later".to_string())]);
                assert_eq!(flow_id, Some(FlowId(9)));
            }
            _ => panic!("expected message command"),
        }
    }

    #[test]
    fn test_cli_reports_library_version() {
        use clap::CommandFactory;
        assert_eq!(Cli::command().get_version(), Some(teamcity_core::VERSION));
    }

    #[test]
    fn test_cli_rejects_unknown_message_type() {
        let parsed = Cli::try_parse_from(["tc-report", "message", "testExploded", "--name", "T"]);
        assert!(parsed.is_err());
    }

    #[test]
    fn test_render_message_picks_suite_subject() {
        let encoder = MessageEncoder::new(FlowId(3));
        let line = render_message(&encoder, MessageType::TestSuiteStarted, "All", Vec::new());
        assert!(line.starts_with("##teamcity[testSuiteStarted name='All' timestamp='"));
        assert!(line.ends_with(" flowId='3']\n"));

        let line = render_message(
            &encoder,
            MessageType::TestIgnored,
            "T",
            vec![("message".to_string(), "later".to_string())],
        );
        assert!(line.starts_with("##teamcity[testIgnored message='later' name='T' "));
    }

    #[test]
    fn test_replay_to_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let input = dir.path().join("events.jsonl");
        let output = dir.path().join("messages.log");
        std::fs::write(
            &input,
            concat!(
                r#"{"event":"suite_started","suite":{"name":"S"}}"#,
                "\n",
                r#"{"event":"test_skipped","test":{"kind":"test_case","name":"t"},"message":"later"}"#,
                "\n",
                r#"{"event":"suite_finished","suite":{"name":"S"}}"#,
                "\n",
            ),
        )
        .unwrap();

        cmd_replay(&input, Some(&output), Some(FlowId(11))).expect("replay");

        let written = std::fs::read_to_string(&output).unwrap();
        let lines: Vec<&str> = written.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("##teamcity[testSuiteStarted name='S' "));
        assert!(lines[1].starts_with("##teamcity[testIgnored message='later' name='t' "));
        assert!(lines.iter().all(|l| l.ends_with(" flowId='11']")));
    }

    #[test]
    fn test_replay_keeps_partial_output_on_bad_line() {
        let dir = tempfile::tempdir().expect("tempdir");
        let input = dir.path().join("events.jsonl");
        let output = dir.path().join("messages.log");
        std::fs::write(
            &input,
            concat!(r#"{"event":"suite_started","suite":{"name":"S"}}"#, "\n", "oops\n"),
        )
        .unwrap();

        let err = cmd_replay(&input, Some(&output), Some(FlowId(1))).unwrap_err();
        assert!(format!("{err:#}").contains("line 2"));
        assert_eq!(std::fs::read_to_string(&output).unwrap().lines().count(), 1);
    }
}

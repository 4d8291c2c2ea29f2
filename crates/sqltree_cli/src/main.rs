//! sqltree: Parse SQL query text and print the syntax tree.
//!
//! Usage:
//!   sqltree [options] [file]
//!
//! The query is read from `file`, from `-c`, or from standard input. The
//! parse result is printed as JSON on standard output; diagnostics and
//! errors go to standard error.

use clap::Parser as ClapParser;
use indexmap::IndexMap;
use miette::{LabeledSpan, MietteDiagnostic, NamedSource, Report};
use sqltree_ast::{collect_nodes, NodeList};
use sqltree_diagnostics::{DiagnosticCategory, ErrorCategory, ErrorInfo};
use sqltree_query::{ParseMode, ParseOptions, QueryParser};
use std::io::{IsTerminal, Read};
use std::process;
use tracing_subscriber::EnvFilter;

#[derive(ClapParser, Debug)]
#[command(name = "sqltree", about = "sqltree - Parse SQL query text into a syntax tree", version)]
struct Cli {
    /// File containing the query. Reads standard input when absent or `-`.
    #[arg(value_name = "FILE")]
    file: Option<String>,

    /// Query text given inline.
    #[arg(short = 'c', long = "command", conflicts_with = "file")]
    command: Option<String>,

    /// What the input contains: default, typeName, plpgsqlExpr, plpgsqlAssign1..3.
    #[arg(short = 'm', long)]
    mode: Option<ParseMode>,

    /// JSON file with parse options.
    #[arg(long = "options", value_name = "FILE")]
    options_file: Option<String>,

    /// Set one parse option, e.g. `-o validate=true`. Repeatable.
    #[arg(short = 'o', long = "option", value_name = "KEY=VALUE")]
    overrides: Vec<String>,

    /// Print the byte range and text of each statement instead of the tree.
    #[arg(long, conflicts_with = "stats")]
    split: bool,

    /// Print node counts per kind instead of the tree.
    #[arg(long)]
    stats: bool,

    /// Print single-line JSON.
    #[arg(long)]
    compact: bool,
}

/// Why a run produced no output.
enum Failure {
    Parse(ErrorInfo),
    Output(String),
}

fn main() {
    init_tracing();
    let cli = Cli::parse();
    process::exit(run(&cli));
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("SQLTREE_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr);
    if let Err(err) = builder.try_init() {
        eprintln!("failed to install tracing subscriber: {err}");
    }
}

fn run(cli: &Cli) -> i32 {
    let options = match build_options(cli) {
        Ok(options) => options,
        Err(message) => {
            print_error(&message);
            return 1;
        }
    };
    let (name, text) = match read_input(cli) {
        Ok(input) => input,
        Err(message) => {
            print_error(&message);
            return 1;
        }
    };
    tracing::debug!(input = %name, bytes = text.len(), mode = %options.mode, "parsing");

    let parser = QueryParser::new(options);
    let output = parser.parse(&text, |result| {
        for diagnostic in &result.diagnostics {
            let severity = match diagnostic.category {
                DiagnosticCategory::Notice => miette::Severity::Advice,
                DiagnosticCategory::Warning => miette::Severity::Warning,
                DiagnosticCategory::Error => miette::Severity::Error,
            };
            let report = MietteDiagnostic::new(diagnostic.message_text.clone())
                .with_code(diagnostic.code)
                .with_severity(severity);
            render(&name, &text, report, diagnostic.location.offset());
        }
        if let Some(error) = &result.error {
            return Err(Failure::Parse(error.clone()));
        }
        if cli.split {
            let spans: Vec<_> = result
                .statements()
                .map(|raw| {
                    let span = sqltree_query::StatementSpan::of(raw, text.len());
                    serde_json::json!({ "offset": span.offset, "length": span.length, "text": span.text(&text) })
                })
                .collect();
            to_json(&spans, cli.compact)
        } else if cli.stats {
            let counts = node_counts(result.tree).map_err(Failure::Parse)?;
            to_json(&counts, cli.compact)
        } else {
            to_json(result, cli.compact)
        }
    });

    match output {
        Ok(json) => {
            println!("{json}");
            0
        }
        Err(Failure::Parse(error)) => {
            render_error(&name, &text, &error);
            2
        }
        Err(Failure::Output(message)) => {
            print_error(&message);
            1
        }
    }
}

/// Options file first, then `-o` overrides in order, then `--mode`.
fn build_options(cli: &Cli) -> Result<ParseOptions, String> {
    let mut options = match &cli.options_file {
        Some(path) => ParseOptions::from_file(path).map_err(|e| format!("{path}: {e}"))?,
        None => ParseOptions::default(),
    };
    for assignment in &cli.overrides {
        let Some((key, value)) = assignment.split_once('=') else {
            return Err(format!("expected KEY=VALUE, got '{assignment}'"));
        };
        options.set(key.trim(), value.trim()).map_err(|e| e.to_string())?;
    }
    if let Some(mode) = cli.mode {
        options.mode = mode;
    }
    Ok(options)
}

/// The input's display name and its text, checked to be UTF-8.
fn read_input(cli: &Cli) -> Result<(String, String), String> {
    if let Some(command) = &cli.command {
        return Ok(("<command>".to_string(), command.clone()));
    }
    let (name, bytes) = match cli.file.as_deref() {
        None | Some("-") => {
            let mut bytes = Vec::new();
            std::io::stdin()
                .read_to_end(&mut bytes)
                .map_err(|e| format!("cannot read standard input: {e}"))?;
            ("<stdin>".to_string(), bytes)
        }
        Some(path) => {
            let bytes = std::fs::read(path).map_err(|e| format!("cannot read {path}: {e}"))?;
            (path.to_string(), bytes)
        }
    };
    match simdutf8::compat::from_utf8(&bytes) {
        Ok(text) => Ok((name, text.to_owned())),
        Err(e) => Err(format!("{name}: invalid UTF-8 at byte {}", e.valid_up_to())),
    }
}

/// Occurrences of each node kind, in the order kinds are first met.
fn node_counts(tree: NodeList<'_>) -> Result<IndexMap<&'static str, usize>, ErrorInfo> {
    let mut counts = IndexMap::new();
    for &top in tree {
        for node in collect_nodes(top).map_err(ErrorInfo::from)? {
            *counts.entry(node.tag().name()).or_insert(0) += 1;
        }
    }
    Ok(counts)
}

fn to_json<T: serde::Serialize + ?Sized>(value: &T, compact: bool) -> Result<String, Failure> {
    let json = if compact {
        serde_json::to_string(value)
    } else {
        serde_json::to_string_pretty(value)
    };
    json.map_err(|e| Failure::Output(format!("cannot encode output: {e}")))
}

fn render_error(name: &str, text: &str, error: &ErrorInfo) {
    let mut report = MietteDiagnostic::new(error.message.clone()).with_code(error.sqlstate);
    report = match error.category {
        ErrorCategory::Syntax => report,
        ErrorCategory::Resource => report.with_help("the input nests too deeply; -o maxStackDepth=<levels> only raises the level ceiling"),
        ErrorCategory::Internal => report.with_help("this is a bug in sqltree"),
    };
    render(name, text, report, error.cursor_offset);
}

fn render(name: &str, text: &str, mut report: MietteDiagnostic, offset: Option<usize>) {
    if let Some(offset) = offset {
        report = report.with_label(LabeledSpan::at_offset(offset, "here"));
    }
    let report = Report::new(report).with_source_code(NamedSource::new(name, text.to_string()));
    eprintln!("{report:?}");
}

fn print_error(message: &str) {
    if std::io::stderr().is_terminal() {
        eprintln!("\x1b[1m\x1b[31merror\x1b[0m: {message}");
    } else {
        eprintln!("error: {message}");
    }
}

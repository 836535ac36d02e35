//! The resaddr Command-Line Interface.
//!
//! A thin wrapper over the library: it owns argument handling, I/O and error
//! display, and calls [`crate::parse`] for everything else.

use std::{
    fs,
    io::{self, BufRead, Write},
    path::{Path, PathBuf},
    process,
};

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use miette::{IntoDiagnostic, Report, WrapErr};
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use crate::{parse, Address};

// ============================================================================
// CLI ARGUMENTS - Command-line argument definitions
// ============================================================================

/// The main CLI argument structure.
#[derive(Debug, Parser)]
#[command(
    name = "resaddr",
    version,
    about = "Parse, validate and canonicalize resource addresses."
)]
pub struct ResaddrArgs {
    #[command(subcommand)]
    pub command: ArgsCommand,

    /// Output format for `parse`.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text, global = true)]
    pub output: OutputFormat,

    /// When to colour terminal output.
    #[arg(long, value_enum, default_value_t = ColorMode::Auto, global = true)]
    pub color: ColorMode,

    /// Increase log verbosity (-v debug, -vv trace). `RUST_LOG` takes precedence.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,
}

/// An enumeration of all available CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum ArgsCommand {
    /// Parse addresses and print their structure.
    Parse {
        #[arg(required = true)]
        addresses: Vec<String>,
    },
    /// Print the canonical form of each address.
    Fmt {
        #[arg(required = true)]
        addresses: Vec<String>,
    },
    /// Validate a file of addresses, one per line (stdin when omitted or `-`).
    Check { file: Option<PathBuf> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
    Yaml,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ColorMode {
    Auto,
    Always,
    Never,
}

impl ColorMode {
    fn choice(self, stream: atty::Stream) -> ColorChoice {
        match self {
            ColorMode::Always => ColorChoice::Always,
            ColorMode::Never => ColorChoice::Never,
            ColorMode::Auto if atty::is(stream) => ColorChoice::Auto,
            ColorMode::Auto => ColorChoice::Never,
        }
    }
}

// ============================================================================
// MAIN ENTRY POINT
// ============================================================================

/// The main entry point for the CLI.
pub fn run() {
    let args = ResaddrArgs::parse();
    init_tracing(args.verbose);

    let result = match &args.command {
        ArgsCommand::Parse { addresses } => handle_parse(addresses, args.output),
        ArgsCommand::Fmt { addresses } => handle_fmt(addresses),
        ArgsCommand::Check { file } => handle_check(file.as_deref(), args.color),
    };

    match result {
        Ok(true) => {}
        Ok(false) => process::exit(1),
        Err(report) => {
            eprintln!("{report:?}");
            process::exit(1);
        }
    }
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    // A subscriber may already be installed when embedded; keep the existing one.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

// ============================================================================
// COMMAND HANDLERS
// ============================================================================

type CliResult = miette::Result<bool>;

fn parse_or_report(text: &str, name: &str) -> miette::Result<Address> {
    parse(text).map_err(|e| Report::new(e.with_source(name, text)))
}

fn handle_parse(addresses: &[String], format: OutputFormat) -> CliResult {
    let mut parsed = Vec::with_capacity(addresses.len());
    for (i, text) in addresses.iter().enumerate() {
        parsed.push(parse_or_report(text, &format!("argument {}", i + 1))?);
    }
    debug!(count = parsed.len(), "parsed addresses");

    let stdout = io::stdout();
    let mut out = stdout.lock();
    match format {
        OutputFormat::Text => {
            for addr in &parsed {
                write_tree(&mut out, addr).into_diagnostic()?;
            }
        }
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&parsed).into_diagnostic()?;
            writeln!(out, "{}", json).into_diagnostic()?;
        }
        OutputFormat::Yaml => {
            let yaml = serde_yaml::to_string(&parsed).into_diagnostic()?;
            write!(out, "{}", yaml).into_diagnostic()?;
        }
    }
    Ok(true)
}

fn handle_fmt(addresses: &[String]) -> CliResult {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    for (i, text) in addresses.iter().enumerate() {
        let addr = parse_or_report(text, &format!("argument {}", i + 1))?;
        writeln!(out, "{}", addr).into_diagnostic()?;
    }
    Ok(true)
}

fn handle_check(file: Option<&Path>, color: ColorMode) -> CliResult {
    let (name, lines) = match file {
        None => ("<stdin>".to_string(), read_lines(io::stdin().lock())?),
        Some(path) if path == Path::new("-") => ("<stdin>".to_string(), read_lines(io::stdin().lock())?),
        Some(path) => {
            let content = fs::read_to_string(path)
                .into_diagnostic()
                .wrap_err_with(|| format!("failed to read {}", path.display()))?;
            (path.display().to_string(), content.lines().map(String::from).collect())
        }
    };

    let mut checked = 0usize;
    let mut failed = 0usize;
    for (line_no, line) in lines.iter().enumerate() {
        let text = line.trim();
        if text.is_empty() || text.starts_with('#') {
            continue;
        }
        checked += 1;
        if let Err(e) = parse(text) {
            failed += 1;
            let report = Report::new(e.with_source(format!("{}:{}", name, line_no + 1), text));
            eprintln!("{report:?}");
        }
    }
    info!(checked, failed, source = %name, "check finished");

    print_summary(checked, failed, color.choice(atty::Stream::Stdout)).into_diagnostic()?;
    Ok(failed == 0)
}

fn read_lines(reader: impl BufRead) -> miette::Result<Vec<String>> {
    reader
        .lines()
        .collect::<Result<Vec<_>, _>>()
        .into_diagnostic()
        .wrap_err("failed to read standard input")
}

// ============================================================================
// OUTPUT FUNCTIONS
// ============================================================================

fn write_tree(out: &mut impl Write, addr: &Address) -> io::Result<()> {
    writeln!(out, "{}", addr)?;
    writeln!(out, "  mode: {}", addr.mode)?;
    if addr.module_path.is_empty() {
        writeln!(out, "  module_path: (root)")?;
    } else {
        writeln!(out, "  module_path:")?;
        for module in &addr.module_path {
            if module.index.is_absent() {
                writeln!(out, "    - {}", module.name)?;
            } else {
                writeln!(out, "    - {} [{}]", module.name, module.index)?;
            }
        }
    }
    let spec = &addr.resource_spec;
    writeln!(out, "  type: {}", spec.resource_type)?;
    writeln!(out, "  name: {}", spec.name)?;
    if !spec.index.is_absent() {
        writeln!(out, "  index: {}", spec.index)?;
    }
    Ok(())
}

fn print_summary(checked: usize, failed: usize, choice: ColorChoice) -> io::Result<()> {
    let mut stdout = StandardStream::stdout(choice);
    let color = if failed == 0 { Color::Green } else { Color::Red };
    stdout.set_color(ColorSpec::new().set_fg(Some(color)).set_bold(true))?;
    write!(stdout, "{}", if failed == 0 { "ok" } else { "failed" })?;
    stdout.reset()?;
    writeln!(stdout, ": {} checked, {} invalid", checked, failed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_parse_subcommands() {
        let args = ResaddrArgs::try_parse_from(["resaddr", "fmt", "a.b", "c.d"]).unwrap();
        match args.command {
            ArgsCommand::Fmt { addresses } => assert_eq!(addresses, vec!["a.b", "c.d"]),
            other => panic!("unexpected command: {:?}", other),
        }
        assert_eq!(args.output, OutputFormat::Text);
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let args =
            ResaddrArgs::try_parse_from(["resaddr", "parse", "a.b", "--output", "json", "-vv"])
                .unwrap();
        assert_eq!(args.output, OutputFormat::Json);
        assert_eq!(args.verbose, 2);
    }

    #[test]
    fn test_write_tree() {
        let addr = parse(r#"module.foo[1].data.aws_ami.baz["k"]"#).unwrap();
        let mut buf = Vec::new();
        write_tree(&mut buf, &addr).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.starts_with("module.foo[1].data.aws_ami.baz[\"k\"]\n"));
        assert!(text.contains("  mode: data\n"));
        assert!(text.contains("    - foo [1]\n"));
        assert!(text.contains("  index: \"k\"\n"));
    }

    #[test]
    fn test_color_mode_never() {
        assert!(matches!(
            ColorMode::Never.choice(atty::Stream::Stdout),
            ColorChoice::Never
        ));
    }
}

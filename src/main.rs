use anyhow::{Context, Error, Result};
use camino::Utf8PathBuf;
use clap::{ArgAction, Parser, ValueEnum};
use std::io::{self, IsTerminal, Write};
use std::process::ExitCode;
use termcolor::{ColorChoice, StandardStream};
use tracing_subscriber::EnvFilter;

use geolocator::input::FileOrStdin;
use geolocator::output::{OutputFormat, Printer};
use geolocator::{GeoLocation, GeoLocator, Template, DEFAULT_BASE_URL};

/// Check if the error chain contains a broken pipe error.
fn is_broken_pipe(err: &Error) -> bool {
    err.chain().any(|cause| {
        cause
            .downcast_ref::<io::Error>()
            .is_some_and(|io_err| io_err.kind() == io::ErrorKind::BrokenPipe)
    })
}

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// Format each result with a template. Use --list-fields to see which
    /// fields are available. Field names are enclosed in {}, for example
    /// "{ip} is in {city}, {country_code}"
    #[clap(short, long)]
    template: Option<String>,

    /// Print each result as a JSON object on its own line
    #[clap(long, conflicts_with = "template")]
    json: bool,

    /// Use markers to highlight the output
    #[clap(short = 'C', long, value_enum, default_value_t = ArgsColorChoice::Auto)]
    color: ArgsColorChoice,

    /// Read targets from a file, one per line. Use "-" to read from stdin
    #[clap(short, long, value_name = "FILE", value_hint = clap::ValueHint::FilePath)]
    file: Vec<Utf8PathBuf>,

    /// Geolocation API endpoint
    #[clap(
        long,
        value_name = "URL",
        env = "GEOLOCATOR_BASE_URL",
        default_value = DEFAULT_BASE_URL
    )]
    base_url: String,

    /// Display the fields available in --template format strings
    #[clap(short = 'L', long)]
    list_fields: bool,

    /// Increase logging verbosity (-v debug, -vv trace). RUST_LOG overrides
    #[clap(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// IP addresses or host names to look up. With none, the location of
    /// this machine's public address is shown
    #[clap(value_name = "TARGET")]
    targets: Vec<String>,
}

#[derive(Copy, Clone, PartialEq, Eq, Debug, ValueEnum)]
enum ArgsColorChoice {
    Always,
    Never,
    Auto,
}

fn main() -> ExitCode {
    let err = match run_main() {
        Ok(code) => return code,
        Err(err) => err,
    };

    if is_broken_pipe(&err) {
        return ExitCode::SUCCESS;
    }

    if std::env::var("RUST_BACKTRACE").is_ok_and(|v| v == "1") {
        let _ = writeln!(io::stderr(), "{:?}", err);
    } else {
        let _ = writeln!(io::stderr(), "error: {:#}", err);
    }

    ExitCode::FAILURE
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("geolocator={default_level}")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn run_main() -> Result<ExitCode> {
    let args = Args::parse();
    init_logging(args.verbose);

    if args.list_fields {
        let mut out = io::stdout().lock();
        writeln!(out, "Available template fields:")?;
        for field in GeoLocation::FIELDS {
            writeln!(
                out,
                "{{{}}}\t{}\t(example: {})",
                field.name, field.description, field.example
            )?;
        }
        return Ok(ExitCode::SUCCESS);
    }

    let format = if args.json {
        OutputFormat::Json
    } else {
        match &args.template {
            Some(t) => OutputFormat::Template(Template::for_locations(t)?),
            None => OutputFormat::default(),
        }
    };

    // auto colors only when stdout is a terminal
    let colormode = match args.color {
        ArgsColorChoice::Auto => {
            if io::stdout().is_terminal() {
                ColorChoice::Always
            } else {
                ColorChoice::Never
            }
        }
        ArgsColorChoice::Always => ColorChoice::Always,
        ArgsColorChoice::Never => ColorChoice::Never,
    };

    let locator = GeoLocator::with_base_url(&args.base_url)
        .with_context(|| format!("cannot use endpoint {}", args.base_url))?;

    // only a bare invocation looks up this machine; files without targets print nothing
    let targets = if args.targets.is_empty() && args.file.is_empty() {
        None
    } else {
        let mut targets = args.targets;
        for path in args.file {
            targets.extend(FileOrStdin::from_path(path).targets()?);
        }
        Some(targets)
    };

    let mut printer = Printer::new(StandardStream::stdout(colormode), format);
    let failures = run(&locator, targets.as_deref(), &mut printer)?;
    printer.flush()?;

    if failures > 0 {
        tracing::debug!(failures, "some lookups failed");
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}

/// Look up every target in order and print each result as it arrives.
///
/// `None` looks up this machine's own address instead. Lookup failures are
/// reported on stderr and counted; output errors abort.
fn run(
    locator: &GeoLocator,
    targets: Option<&[String]>,
    printer: &mut Printer<StandardStream>,
) -> Result<usize> {
    let Some(targets) = targets else {
        let location = locator
            .get_location()
            .context("failed to look up this machine's location")?;
        printer.print(&location)?;
        return Ok(0);
    };

    let mut failures = 0;
    for target in targets {
        match locator.get_location_for(target) {
            Ok(location) => printer.print(&location)?,
            Err(err) => {
                failures += 1;
                let err = Error::new(err).context(format!("failed to look up {target}"));
                writeln!(io::stderr(), "error: {:#}", err)?;
            }
        }
    }
    Ok(failures)
}

// ==============================================================================
// `threft` Command Line
// ==============================================================================
//
//   threft -i <file|dir>... [-g "<generator> [args]"] [-o <dir>] [--dump-model <file>]
//
// Builds the model from every input, prints warnings, optionally dumps the
// encoded model to a file, and then either hands it to `threft-gen-<generator>`
// or prints it to stdout.

use std::fs;
use std::io::{self, IsTerminal};
use std::path::PathBuf;
use std::process::ExitCode;

use miette::{Context, IntoDiagnostic};

use threft::{Config, GeneratorSpec, Threft, encode, sink, write_model};

const USAGE: &str = "\
Usage: threft -i <file|dir>... [-g \"<generator> [args]\"] [-o <dir>] [--dump-model <file>]

Options:
  -i, --input <path>       .thrift file or directory to read (repeatable)
  -g, --gen <spec>         run threft-gen-<generator> with the model on stdin
  -o, --output <dir>       working directory for the generator (default: .)
      --dump-model <file>  also write the encoded model to <file>
  -h, --help               print this help

Without -g the encoded model is written to stdout.
Set RUST_LOG (e.g. RUST_LOG=threft=debug) for progress logging.";

fn main() -> ExitCode {
    if let Err(e) = miette::set_hook(Box::new(|_| {
        Box::new(miette::MietteHandlerOpts::new().build())
    })) {
        eprintln!("failed to install diagnostic handler: {e}");
    }

    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .init();

    let config = match parse_args() {
        Ok(Some(config)) => config,
        Ok(None) => {
            println!("{USAGE}");
            return ExitCode::SUCCESS;
        }
        Err(e) => {
            eprintln!("{e:?}");
            eprintln!("{USAGE}");
            return ExitCode::from(2);
        }
    };

    match run(config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{e:?}");
            ExitCode::FAILURE
        }
    }
}

/// Parse the command line. `Ok(None)` means help was requested.
fn parse_args() -> miette::Result<Option<Config>> {
    use lexopt::prelude::*;

    let mut config = Config::new();
    let mut parser = lexopt::Parser::from_env();
    while let Some(arg) = parser.next().into_diagnostic()? {
        match arg {
            Short('i') | Long("input") => {
                config = config.input(PathBuf::from(parser.value().into_diagnostic()?));
            }
            Short('g') | Long("gen") => {
                let raw = parser.value().into_diagnostic()?.string().into_diagnostic()?;
                let spec = GeneratorSpec::parse(&raw)
                    .ok_or_else(|| miette::miette!("generator spec must not be blank"))?;
                config = config.generator(spec);
            }
            Short('o') | Long("output") => {
                config = config.output_dir(PathBuf::from(parser.value().into_diagnostic()?));
            }
            Long("dump-model") => {
                config = config.dump_model(PathBuf::from(parser.value().into_diagnostic()?));
            }
            Short('h') | Long("help") => return Ok(None),
            Value(path) => config = config.input(PathBuf::from(path)),
            _ => return Err(arg.unexpected()).into_diagnostic(),
        }
    }

    if config.inputs.is_empty() {
        return Err(miette::miette!("at least one input is required"));
    }
    Ok(Some(config))
}

fn run(config: Config) -> miette::Result<()> {
    let mut threft = Threft::new(config);
    let built = threft.build();
    for warning in threft.drain_warnings() {
        eprintln!("{:?}", miette::Report::new(warning));
    }
    let model = built?;
    let config = threft.config();

    if let Some(path) = &config.dump_model {
        fs::write(path, encode(&model))
            .into_diagnostic()
            .wrap_err_with(|| format!("write model dump {}", path.display()))?;
    }

    match &config.generator {
        Some(spec) => {
            fs::create_dir_all(&config.output_dir)
                .into_diagnostic()
                .wrap_err_with(|| format!("create {}", config.output_dir.display()))?;
            sink::run_generator(spec, &config.output_dir, encode(&model))
                .wrap_err_with(|| format!("generator `{}`", spec.name))?;
        }
        None => {
            let stdout = io::stdout().lock();
            if let Err(e) = write_model(&model, stdout) {
                // A closed pipe (`threft ... | head`) is not an error.
                if e.kind() != io::ErrorKind::BrokenPipe {
                    return Err(e).into_diagnostic().wrap_err("write model to stdout");
                }
            }
        }
    }
    Ok(())
}

//! Capture a chat transcript from a saved HTML page and print it as JSON.
//!
//! Reads the snapshot from a file or stdin. Logs go to stderr and respect
//! `RUST_LOG` (default `warn`); `-v` raises the default to `info`.

use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process::ExitCode;

use chat_capture::host::SnapshotPage;
use chat_capture::{CaptureSession, Options, PlatformProfile, ProgressEvent};
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use url::Url;

/// Capture a chat transcript from an HTML snapshot
#[derive(Parser, Debug)]
#[command(name = "chat-capture")]
#[command(version)]
#[command(about = "Capture chat messages from a saved HTML page as JSON")]
pub struct Args {
    /// HTML snapshot to read (reads from stdin if not provided)
    pub input: Option<PathBuf>,

    /// Platform profile JSON with selector overrides
    #[arg(short, long)]
    pub profile: Option<PathBuf>,

    /// Capture options JSON; missing fields keep their defaults
    #[arg(short, long)]
    pub options: Option<PathBuf>,

    /// Page URL used to resolve relative artifact links
    #[arg(long)]
    pub url: Option<Url>,

    /// Pretty-print the JSON output
    #[arg(long)]
    pub pretty: bool,

    /// Log progress to stderr
    #[arg(short, long)]
    pub verbose: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose);

    match run(&args) {
        Ok(json) => {
            println!("{json}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!(%err, "capture failed");
            eprintln!("chat-capture: {err}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "info" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

fn run(args: &Args) -> chat_capture::Result<String> {
    let profile = match &args.profile {
        Some(path) => PlatformProfile::from_json(&fs::read_to_string(path)?)?,
        None => PlatformProfile::generic(),
    };
    let options = match &args.options {
        Some(path) => Options::from_json(&fs::read_to_string(path)?)?,
        None => Options::default(),
    };

    let html = match &args.input {
        Some(path) => fs::read(path)?,
        None => {
            let mut buf = Vec::new();
            io::stdin().read_to_end(&mut buf)?;
            buf
        }
    };
    let mut page = SnapshotPage::from_bytes(&html);
    if let Some(url) = &args.url {
        page = page.with_location(url.clone());
    }

    let report = CaptureSession::new(options).run(&mut page, &profile, &mut |event: &ProgressEvent| {
        info!(phase = ?event.phase, progress = event.progress, count = ?event.count, "{}", event.message);
    })?;

    let json = if args.pretty {
        serde_json::to_string_pretty(&report.messages)
    } else {
        serde_json::to_string(&report.messages)
    };
    Ok(json.map_err(io::Error::from)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_args() {
        let args = Args::try_parse_from(["chat-capture", "--pretty", "-p", "claude.json", "page.html"]).unwrap();
        assert!(args.pretty);
        assert_eq!(args.profile, Some(PathBuf::from("claude.json")));
        assert_eq!(args.input, Some(PathBuf::from("page.html")));
        assert!(args.options.is_none());
    }

    #[test]
    fn test_rejects_bad_url() {
        let err = Args::try_parse_from(["chat-capture", "--url", "not a url"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
    }
}

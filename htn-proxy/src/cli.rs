use std::{env, net::SocketAddr, path::PathBuf, time::Duration};

use getopts::{Matches, Options};
use htn_schedule::source::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT};

const ADDR_VAR: &str = "HTN_PROXY_ADDR";
const UPSTREAM_VAR: &str = "HTN_UPSTREAM";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Args {
    pub address: SocketAddr,
    pub upstream: String,
    pub timeout: Duration,
    pub session_file: PathBuf,
    pub refresh: bool,
    pub refresh_ttl: Duration,
}

pub enum Parsed {
    Run(Args),
    Help(String),
}

fn opts() -> Options {
    let mut opts = Options::new();
    opts.optflag(
        "h",
        "help",
        concat!("Print the help output of ", env!("CARGO_PKG_NAME")),
    );
    opts.optopt(
        "a",
        "address",
        "Socket address (IP and port) to listen on [Default: $HTN_PROXY_ADDR or 127.0.0.1:8080]",
        "SOCKET_ADDRESS",
    );
    opts.optopt(
        "u",
        "upstream",
        "Base URL of the event API [Default: $HTN_UPSTREAM or https://api.hackthenorth.com/v3]",
        "URL",
    );
    opts.optopt(
        "t",
        "timeout",
        "Connection timeout for upstream requests [Default: 10]",
        "SECONDS",
    );
    opts.optopt(
        "s",
        "session-file",
        "File the visitor session is persisted in [Default: .htn-session.json]",
        "PATH",
    );
    opts.optflag(
        "r",
        "refresh",
        "Refetch the schedule once it is older than --refresh-ttl instead of loading it once [Default: false]",
    );
    opts.optopt(
        "",
        "refresh-ttl",
        "Age after which the schedule is refetched [Default: 3600]",
        "SECONDS",
    );
    opts
}

fn seconds(matches: &Matches, name: &str, default: u64) -> Result<Duration, String> {
    matches
        .opt_get_default(name, default)
        .map(Duration::from_secs)
        .map_err(|err| format!("Provided value for option '{name}' is invalid: {err}"))
}

/// Parses `args` (without the program name). Environment variables fill in
/// for options that are not given.
pub fn parse<I: IntoIterator<Item = String>>(args: I) -> Result<Parsed, String> {
    let opts = opts();
    let matches = opts.parse(args).map_err(|fail| fail.to_string())?;

    if matches.opt_present("help") {
        return Ok(Parsed::Help(
            opts.usage(&opts.short_usage(env!("CARGO_PKG_NAME"))),
        ));
    }

    let address = match matches.opt_str("address").or_else(|| env::var(ADDR_VAR).ok()) {
        Some(raw) => raw
            .parse()
            .map_err(|err| format!("Provided value for option 'address' is invalid: {err}"))?,
        None => SocketAddr::from(([127, 0, 0, 1], 8080)),
    };

    let upstream = matches
        .opt_str("upstream")
        .or_else(|| env::var(UPSTREAM_VAR).ok())
        .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

    let session_file = matches
        .opt_str("session-file")
        .map_or_else(|| PathBuf::from(".htn-session.json"), PathBuf::from);

    Ok(Parsed::Run(Args {
        address,
        upstream,
        timeout: seconds(&matches, "timeout", DEFAULT_TIMEOUT.as_secs())?,
        session_file,
        refresh: matches.opt_present("refresh"),
        refresh_ttl: seconds(&matches, "refresh-ttl", 3600)?,
    }))
}

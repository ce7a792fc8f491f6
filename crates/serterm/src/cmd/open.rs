use std::io::BufReader;

use serterm_session::{spawn_line_reader, CancellationToken, Session, SessionConfig, SessionReport};
use serterm_transport::{open_serial, LinkConfig};
use tracing::info;

use crate::cmd::{parse_duration, OpenArgs};
use crate::exit::{io_error, session_error, transport_error, CliError, CliResult, SUCCESS};

pub fn run(args: OpenArgs) -> CliResult<i32> {
    let read_timeout = parse_duration(&args.read_timeout)?;
    let poll_interval = parse_duration(&args.poll_interval)?;

    let config = LinkConfig::new(&args.port, args.baud_rate).with_read_timeout(read_timeout);
    let link = open_serial(&config).map_err(|err| transport_error("open failed", err))?;
    info!(port = %args.port, "opened port; type `exit` to quit, `OFF`/`ON` to toggle raw mode");

    let session = Session::new(SessionConfig {
        poll_interval,
        ..SessionConfig::default()
    });
    install_ctrlc_handler(session.context().cancellation_token())?;

    let lines = spawn_line_reader(BufReader::new(std::io::stdin()))
        .map_err(|err| io_error("console setup failed", err))?;
    let report = session
        .run(link, lines, std::io::stdout())
        .map_err(|err| session_error("session failed", err))?;

    exit_status(report)
}

/// First loop error becomes the exit status; any other is printed here.
fn exit_status(report: SessionReport) -> CliResult<i32> {
    let SessionReport { writer, reader } = report;
    let mut errors = [
        writer.err().map(|err| session_error("send failed", err)),
        reader.err().map(|err| session_error("receive failed", err)),
    ]
    .into_iter()
    .flatten();

    let Some(first) = errors.next() else {
        return Ok(SUCCESS);
    };
    for other in errors {
        eprintln!("error: {other}");
    }
    Err(first)
}

fn install_ctrlc_handler(token: CancellationToken) -> CliResult<()> {
    ctrlc::set_handler(move || {
        token.cancel();
    })
    .map_err(|err| {
        CliError::new(
            crate::exit::INTERNAL,
            format!("signal handler setup failed: {err}"),
        )
    })
}

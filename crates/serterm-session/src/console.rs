use std::io::BufRead;
use std::sync::mpsc::{self, Receiver};
use std::thread;

use tracing::{debug, warn};

/// Pump console lines into a channel from a background thread.
///
/// Reading a terminal cannot be interrupted, so the thread is detached: it ends
/// on end of input, on a read error, or at the first line sent after the
/// receiver is dropped. Line terminators (`\n`, `\r\n`) are stripped.
pub fn spawn_line_reader<R>(mut input: R) -> std::io::Result<Receiver<String>>
where
    R: BufRead + Send + 'static,
{
    let (tx, rx) = mpsc::channel();

    thread::Builder::new()
        .name("serterm-console".to_string())
        .spawn(move || {
            let mut line = String::new();
            loop {
                line.clear();
                match input.read_line(&mut line) {
                    Ok(0) => {
                        debug!("console input reached end of stream");
                        break;
                    }
                    Ok(_) => {
                        if tx.send(trim_line_ending(&line).to_string()).is_err() {
                            break;
                        }
                    }
                    Err(err) => {
                        warn!(error = %err, "console read failed");
                        break;
                    }
                }
            }
        })?;

    Ok(rx)
}

fn trim_line_ending(line: &str) -> &str {
    let line = line.strip_suffix('\n').unwrap_or(line);
    line.strip_suffix('\r').unwrap_or(line)
}

use tracing::error;

fn main() {
    // The exit status is deliberately not part of the contract: scheduled
    // runs have nobody watching them, so every failure ends in a log line
    // and a zero exit. The log file is the interface.
    if let Err(err) = repopulse::cli::run() {
        error!("run aborted: {err:#}");
    }
}

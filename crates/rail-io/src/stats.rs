//! Statistics writer.
//!
//! The single consumer of the traffic-event channel: renders each event as
//! one line and flushes immediately, so the file is current even if the
//! process is killed.  Runs until every producer is gone.

use std::io::Write;
use std::path::PathBuf;

use rail_sim::TrafficEvent;

use crate::error::IoResult;

/// Drain `events` into the file at `path` (created or truncated), one line
/// per event.  Returns once the sending side has shut down.
pub async fn write_stream(path: PathBuf, events: flume::Receiver<TrafficEvent>) -> IoResult<()> {
    let mut file = std::fs::File::create(&path)?;
    while let Ok(event) = events.recv_async().await {
        writeln!(file, "{event}")?;
        file.flush()?;
    }
    Ok(())
}

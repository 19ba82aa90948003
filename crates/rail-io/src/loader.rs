//! Scenario file parser.
//!
//! # File format
//!
//! Line-oriented; blank lines and lines starting with `#` are skipped.  In
//! order:
//!
//! ```text
//! <seconds-per-hour>
//! <start-hour> <start-minute>
//! <#teams> <#trains> <#junctions> <#segments> <#platforms> <#workers>
//! #junctions ×  (id rotate-min repair-min)
//! #segments  ×  (id length-km speed-kmh repair-min junctionA junctionB)
//! #platforms ×  (id name dwell-min repair-min junctionA junctionB)
//! #teams     ×  (id speed home-platform)
//! #trains    ×  (id speed capacity repair-min name route-length)
//!               (route-length × junction index, one line)
//! #workers   ×  (id home-platform)
//! ```
//!
//! All cross-references are positional indexes into the preceding lists.
//! Every malformed line fails with its line number; reference validation
//! happens later, in `rail-sim`'s assembly.

use std::fmt::Display;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;
use std::str::FromStr;

use rail_core::{
    JunctionSpec, PlatformSpec, Scenario, SegmentSpec, SimParams, TeamSpec, TrainSpec, WorkerSpec,
};

use crate::error::{IoError, IoResult};

// ── Field cursor ──────────────────────────────────────────────────────────────

/// Walks the input line by line, skipping comments and blanks, yielding
/// whitespace-separated fields with the expected arity.
struct FieldReader<R: BufRead> {
    lines: std::io::Lines<R>,
    line_no: usize,
}

impl<R: BufRead> FieldReader<R> {
    fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            line_no: 0,
        }
    }

    /// The next meaningful line, split into exactly `expected` fields.
    fn fields(&mut self, expected: usize) -> IoResult<Vec<String>> {
        loop {
            let line = match self.lines.next() {
                Some(line) => line?,
                None => {
                    return Err(IoError::Parse {
                        line: self.line_no,
                        message: format!("unexpected end of file, expected {expected} more field(s)"),
                    })
                }
            };
            self.line_no += 1;

            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }

            let fields: Vec<String> = trimmed.split_whitespace().map(String::from).collect();
            if fields.len() != expected {
                return Err(IoError::Parse {
                    line: self.line_no,
                    message: format!("expected {} field(s), found {}", expected, fields.len()),
                });
            }
            return Ok(fields);
        }
    }

    /// Parse one field, reporting the current line on failure.
    fn parse<T>(&self, field: &str, what: &str) -> IoResult<T>
    where
        T: FromStr,
        T::Err: Display,
    {
        field.parse().map_err(|e| IoError::Parse {
            line: self.line_no,
            message: format!("bad {what} {field:?}: {e}"),
        })
    }
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Load a scenario from a file.
pub fn load_scenario(path: &Path) -> IoResult<Scenario> {
    let file = std::fs::File::open(path)?;
    read_scenario(BufReader::new(file))
}

/// Like [`load_scenario`] but accepts any `Read` source.
///
/// Useful for testing (pass a `std::io::Cursor`).
pub fn read_scenario<R: Read>(reader: R) -> IoResult<Scenario> {
    let mut r = FieldReader::new(BufReader::new(reader));

    // ── Timing and counts ─────────────────────────────────────────────────
    let f = r.fields(1)?;
    let seconds_per_hour = r.parse(&f[0], "seconds-per-hour")?;

    let f = r.fields(2)?;
    let params = SimParams {
        seconds_per_hour,
        clock_hour: r.parse(&f[0], "start hour")?,
        clock_minute: r.parse(&f[1], "start minute")?,
        seed: 0,
    };

    let f = r.fields(6)?;
    let teams: usize = r.parse(&f[0], "repair-team count")?;
    let trains: usize = r.parse(&f[1], "train count")?;
    let junctions: usize = r.parse(&f[2], "junction count")?;
    let segments: usize = r.parse(&f[3], "segment count")?;
    let platforms: usize = r.parse(&f[4], "platform count")?;
    let workers: usize = r.parse(&f[5], "worker count")?;

    // ── Resources ─────────────────────────────────────────────────────────
    let mut scenario = Scenario {
        params,
        junctions: Vec::with_capacity(junctions),
        segments: Vec::with_capacity(segments),
        platforms: Vec::with_capacity(platforms),
        teams: Vec::with_capacity(teams),
        trains: Vec::with_capacity(trains),
        workers: Vec::with_capacity(workers),
    };

    for _ in 0..junctions {
        let f = r.fields(3)?;
        scenario.junctions.push(JunctionSpec {
            id: r.parse(&f[0], "junction id")?,
            rotate_min: r.parse(&f[1], "rotate time")?,
            repair_min: r.parse(&f[2], "repair time")?,
        });
    }

    for _ in 0..segments {
        let f = r.fields(6)?;
        scenario.segments.push(SegmentSpec {
            id: r.parse(&f[0], "segment id")?,
            length_km: r.parse(&f[1], "length")?,
            speed_limit: r.parse(&f[2], "speed limit")?,
            repair_min: r.parse(&f[3], "repair time")?,
            first: r.parse(&f[4], "junction index")?,
            second: r.parse(&f[5], "junction index")?,
        });
    }

    for _ in 0..platforms {
        let f = r.fields(6)?;
        scenario.platforms.push(PlatformSpec {
            id: r.parse(&f[0], "platform id")?,
            name: f[1].clone(),
            dwell_min: r.parse(&f[2], "dwell time")?,
            repair_min: r.parse(&f[3], "repair time")?,
            first: r.parse(&f[4], "junction index")?,
            second: r.parse(&f[5], "junction index")?,
        });
    }

    // ── Agents ────────────────────────────────────────────────────────────
    for _ in 0..teams {
        let f = r.fields(3)?;
        scenario.teams.push(TeamSpec {
            id: r.parse(&f[0], "team id")?,
            speed: r.parse(&f[1], "team speed")?,
            home_platform: r.parse(&f[2], "home platform index")?,
        });
    }

    for _ in 0..trains {
        let f = r.fields(6)?;
        let route_len: usize = r.parse(&f[5], "route length")?;
        let mut spec = TrainSpec {
            id: r.parse(&f[0], "train id")?,
            speed: r.parse(&f[1], "train speed")?,
            capacity: r.parse(&f[2], "capacity")?,
            repair_min: r.parse(&f[3], "repair time")?,
            name: f[4].clone(),
            route: Vec::with_capacity(route_len),
        };
        let route = r.fields(route_len)?;
        for field in &route {
            spec.route.push(r.parse(field, "route junction index")?);
        }
        scenario.trains.push(spec);
    }

    for _ in 0..workers {
        let f = r.fields(2)?;
        scenario.workers.push(WorkerSpec {
            id: r.parse(&f[0], "worker id")?,
            home_platform: r.parse(&f[1], "home platform index")?,
        });
    }

    Ok(scenario)
}

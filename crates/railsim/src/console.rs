//! Interactive console for non-verbose runs.
//!
//! Single-character commands on stdin; runs on a blocking thread so the
//! simulation tasks are untouched by stdin waits.

use std::io::BufRead;

use log::LevelFilter;

use rail_sim::{Railway, Whereabouts};

const INSTRUCTIONS: &str = "\
Input char for action, available commands:
\t'c' - simulation clock,
\t'p' - current positions,
\t't' - list trains,
\t'r' - list repair teams,
\t'u' - list junctions,
\t'n' - list segments,
\t's' - list stations with platforms,
\t'w' - list workers,
\t'h' - print this menu again,
\t'v' - enter verbose mode (YOU WILL NOT BE ABLE TO TURN IT OFF),
\t'q' - quit simulation.
";

/// Read commands until `q`, `v`, or end of input.
pub fn run(railway: &Railway) {
    print!("{INSTRUCTIONS}");

    let stdin = std::io::stdin();
    for line in stdin.lock().lines() {
        let Ok(line) = line else { return };
        let Some(command) = line.trim().chars().next() else {
            continue;
        };

        match command.to_ascii_uppercase() {
            'C' => println!("{}", railway.clock.now()),
            'P' => {
                for train in &railway.trains {
                    println!("{}: {}", train, railway.network.track(train.position()));
                }
                for team in &railway.teams {
                    println!("{}: {}", team, railway.network.track(team.position()));
                }
            }
            'T' => {
                for train in &railway.trains {
                    println!(
                        "{}, position: {}",
                        train,
                        railway.network.track(train.position())
                    );
                }
            }
            'R' => {
                for team in &railway.teams {
                    println!(
                        "{}, position: {}",
                        team,
                        railway.network.track(team.position())
                    );
                }
            }
            'U' => {
                for track in &railway.network.tracks {
                    if track.is_junction() {
                        println!("{track}");
                    }
                }
            }
            'N' => {
                for track in &railway.network.tracks {
                    if !track.is_junction() && !track.is_platform() {
                        println!("{track}");
                    }
                }
            }
            'S' => {
                for station in &railway.network.stations {
                    println!("{station}:");
                    for &platform in &station.platforms {
                        println!("\t{}", railway.network.track(platform));
                    }
                }
            }
            'W' => {
                for worker in &railway.workers {
                    match worker.whereabouts() {
                        Whereabouts::AtStation(s) => {
                            println!("{}, at {}", worker, railway.network.station(s));
                        }
                        Whereabouts::Aboard(t) => {
                            println!("{}, aboard {}", worker, railway.train(t));
                        }
                    }
                }
            }
            'H' => print!("{INSTRUCTIONS}"),
            'V' => {
                log::set_max_level(LevelFilter::Info);
                return;
            }
            'Q' => std::process::exit(0),
            _ => {}
        }
    }
}

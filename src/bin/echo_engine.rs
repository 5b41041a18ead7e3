//! Minimal scripted UCI engine used by the integration tests.
//!
//! Answers `uci`, `isready` and `go` like a real engine and echoes any other
//! line back on stdout. A few extra commands exercise stream handling:
//!
//! - `stderr <text>`: write `<text>` to stderr
//! - `partial <text>`: write `<text>` to stdout without a newline
//! - `env <KEY>`: print `env KEY=value` or `env KEY unset`
//! - `pwd`: print the working directory
//! - `exit <code>`: exit immediately with `<code>`

use std::env;
use std::io::{self, BufRead, Write};
use std::process;

use uci_host::notation::Move;
use uci_host::{Info, Score};

fn moves(list: &[&str]) -> Vec<Move> {
    list.iter().filter_map(|m| Move::decode(m)).collect()
}

fn search_report(depth: u32) -> Info {
    Info {
        depth: Some(depth),
        seldepth: Some(depth + 2),
        score: Some(Score {
            cp: Some(20 + depth as i32),
            ..Score::default()
        }),
        nodes: Some(u64::from(depth) * 1000),
        nps: Some(500_000),
        time: Some(u64::from(depth) * 2),
        pv: Some(moves(&["e2e4", "e7e5", "g1f3"][..depth.min(3) as usize])),
        ..Info::default()
    }
}

fn respond(line: &str, out: &mut impl Write) -> io::Result<()> {
    let (head, rest) = line.split_once(' ').unwrap_or((line, ""));
    match head {
        "uci" => {
            writeln!(out, "id name EchoEngine")?;
            writeln!(out, "id author uci_host")?;
            writeln!(out, "option name Hash type spin default 16 min 1 max 1024")?;
            writeln!(out, "option name Ponder type check default false")?;
            writeln!(out, "uciok")?;
        }
        "isready" => writeln!(out, "readyok")?,
        "go" => {
            for depth in 1..=3 {
                writeln!(out, "{}", search_report(depth))?;
            }
            writeln!(out, "info string search finished")?;
            writeln!(out, "bestmove e2e4 ponder e7e5")?;
        }
        "stderr" => eprintln!("{rest}"),
        "partial" => write!(out, "{rest}")?,
        "env" => match env::var(rest) {
            Ok(value) => writeln!(out, "env {rest}={value}")?,
            Err(_) => writeln!(out, "env {rest} unset")?,
        },
        "pwd" => writeln!(out, "{}", env::current_dir()?.display())?,
        "exit" => {
            out.flush()?;
            process::exit(rest.trim().parse().unwrap_or(1));
        }
        "quit" => {
            out.flush()?;
            process::exit(0);
        }
        _ => writeln!(out, "{line}")?,
    }
    out.flush()
}

fn main() {
    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut out = stdout.lock();

    for line in stdin.lock().lines() {
        let Ok(line) = line else {
            break;
        };
        if respond(line.trim_end_matches('\r'), &mut out).is_err() {
            break;
        }
    }
}

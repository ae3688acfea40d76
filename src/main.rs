use cmdup::{Options, SayMode, Updater};

use clap::{Parser, ValueEnum};
use std::io::{self, BufRead};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum SayArg {
    /// Leave /say commands unchanged.
    No,
    /// Convert /say to /tellraw with plain text components.
    Text,
    /// Convert /say to /tellraw with translate components.
    Translate,
}

/// Rewrite Minecraft 1.8 commands to 1.9, one per line of stdin.
#[derive(Parser)]
#[command(version)]
struct Args {
    /// Convert /say commands to /tellraw.
    #[arg(long, value_enum, default_value = "no")]
    say: SayArg,

    /// Keep legacy numeric item ids instead of namespaced names.
    #[arg(long)]
    keep_numeric_ids: bool,
}

fn main() {
    let args = Args::parse();
    let updater = Updater::new(Options {
        say_mode: match args.say {
            SayArg::No => SayMode::Keep,
            SayArg::Text => SayMode::Text,
            SayArg::Translate => SayMode::Translate,
        },
        remap_ids: !args.keep_numeric_ids,
    });

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = match line {
            Ok(line) => line,
            Err(err) => {
                eprintln!("read error: {}", err);
                std::process::exit(1);
            }
        };
        match updater.format_command(&line) {
            Ok(updated) => println!("{}", updated),
            Err(err) => {
                eprintln!("skipping command: {}", err);
                println!("{}", line);
            }
        }
    }
}

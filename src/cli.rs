use anyhow::{bail, Result};

use crate::layout::Profile;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// One sync pass for a profile.
    Sync { profile: String },
    /// Sync on an interval until interrupted.
    Watch { profile: String },
    Profiles,
    Help,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cli {
    pub command: Command,
    pub verbose: bool,
}

/// Parse arguments (without the program name).
///
/// Supported forms:
///   ticketsync seindia
///   ticketsync watch landt
///   ticketsync profiles
///   ticketsync -v seindia
pub fn parse_args(args: &[String]) -> Result<Cli> {
    let mut verbose = false;
    let mut words: Vec<&str> = Vec::new();

    for arg in args {
        match arg.as_str() {
            "-v" | "--verbose" => verbose = true,
            "-h" | "--help" | "help" => {
                return Ok(Cli {
                    command: Command::Help,
                    verbose,
                })
            }
            flag if flag.starts_with('-') => bail!("Unknown option: {flag}\n\n{}", usage()),
            word => words.push(word),
        }
    }

    let command = match words.as_slice() {
        [] => Command::Help,
        ["profiles"] => Command::Profiles,
        ["watch"] => bail!("Missing profile for watch\n\n{}", usage()),
        ["watch", profile] => Command::Watch {
            profile: profile.to_string(),
        },
        [profile] => Command::Sync {
            profile: profile.to_string(),
        },
        _ => bail!("Too many arguments\n\n{}", usage()),
    };

    Ok(Cli { command, verbose })
}

fn usage() -> String {
    let names: Vec<&str> = Profile::ALL.iter().map(|p| p.name).collect();
    format!(
        "Usage: ticketsync [-v] [watch] <profile>\n\nProfiles: {}",
        names.join(", ")
    )
}

pub fn print_help() {
    println!("ticketsync: keep a client's ticket sheet in step with the helpdesk\n");
    println!("USAGE:");
    println!("  ticketsync <profile>        Sync the profile's sheet once");
    println!("  ticketsync watch <profile>  Sync on the configured interval until Ctrl-C");
    println!("  ticketsync profiles         List known profiles");
    println!();
    println!("OPTIONS:");
    println!("  -v, --verbose  Debug logging (RUST_LOG overrides)");
    println!("  -h, --help     Show this help");
    println!();
    println!("CONFIG:");
    println!("  ~/.ticketsync/config.toml, or the file named by TICKETSYNC_CONFIG");
}

pub fn print_profiles() {
    for profile in Profile::ALL {
        println!(
            "{:<8} client \"{}\", {} columns (layout v{}){}",
            profile.name,
            profile.client_tag,
            profile.layout.width(),
            profile.layout.version,
            if profile.colors_status() {
                ", colored status"
            } else {
                ""
            }
        );
    }
}

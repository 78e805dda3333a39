use std::ffi::OsString;
use std::io::IsTerminal;
use std::path::PathBuf;

use anyhow::anyhow;
use clap::{ArgAction, Args, Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone)]
pub struct PreprocessedArgs {
    pub cleaned_args: Vec<OsString>,
    pub rc_overrides: Vec<(String, String)>,
}

#[derive(Debug, Clone)]
pub struct KeyVal {
    pub key: String,
    pub value: String,
}

impl std::str::FromStr for KeyVal {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (k, v) = s
            .split_once('=')
            .ok_or_else(|| anyhow!("expected KEY=VALUE, got: {s}"))?;
        Ok(Self {
            key: k.trim().to_string(),
            value: v.trim().to_string(),
        })
    }
}

#[derive(Parser, Debug, Clone)]
#[command(
    name = "home",
    version,
    about = "Command-line client for the home task tracker",
    disable_help_subcommand = true
)]
pub struct GlobalCli {
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[arg(short = 'q', long = "quiet", action = ArgAction::Count, global = true)]
    pub quiet: u8,

    #[arg(
        long = "rc",
        value_parser = clap::builder::ValueParser::new(|s: &str| s.parse::<KeyVal>()),
        action = ArgAction::Append,
        global = true
    )]
    pub rc_overrides: Vec<KeyVal>,

    #[arg(long = "homerc", global = true)]
    pub homerc: Option<PathBuf>,

    /// Base URL of the home app server.
    #[arg(long = "server", global = true)]
    pub server: Option<String>,

    /// Passcode used to log in before mutating.
    #[arg(long = "passcode", global = true)]
    pub passcode: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct DayArgs {
    /// Day in YYYY-MM-DD form; defaults to today.
    #[arg(long)]
    pub date: Option<String>,

    /// User whose tasks are changed; defaults to user.id.
    #[arg(long)]
    pub user: Option<String>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Mark a task complete for a day.
    Mark {
        task_id: String,
        #[command(flatten)]
        day: DayArgs,
        /// Clear the completion instead.
        #[arg(long)]
        undo: bool,
    },
    /// Toggle the star on a task.
    Star {
        task_id: String,
        #[command(flatten)]
        day: DayArgs,
        /// The task is currently starred.
        #[arg(long)]
        starred: bool,
    },
    /// Star every completed task of a day.
    StarAll {
        #[command(flatten)]
        day: DayArgs,
    },
    /// Rename a task; an unchanged name sends nothing.
    Rename {
        task_id: String,
        /// Current name of the task.
        original: String,
        #[arg(required = true, num_args = 1..)]
        new_name: Vec<String>,
    },
    /// Check a passcode against the server.
    Login { user_id: String },
    /// End the server session.
    Logout,
    /// Show the day header and whether it can be edited.
    Day {
        #[arg(long)]
        date: Option<String>,
        /// Apply the kid editing window.
        #[arg(long)]
        kid: bool,
    },
    /// Read commands from stdin until the session goes idle.
    Shell,
}

/// One line typed into the interactive shell.
#[derive(Parser, Debug, Clone)]
#[command(no_binary_name = true, disable_help_subcommand = true)]
pub struct ShellLine {
    #[command(subcommand)]
    pub command: Command,
}

impl ShellLine {
    pub fn parse_line(line: &str) -> anyhow::Result<Command> {
        let words = shell_words::split(line).map_err(|e| anyhow!("{e}"))?;
        let parsed = Self::try_parse_from(words).map_err(|e| anyhow!("{e}"))?;
        Ok(parsed.command)
    }
}

pub fn init_tracing(verbose: u8, quiet: u8) -> anyhow::Result<()> {
    let default_level = if quiet >= 2 {
        "error"
    } else if quiet == 1 {
        "warn"
    } else if verbose >= 3 {
        "trace"
    } else if verbose == 2 {
        "debug"
    } else if verbose == 1 {
        "info"
    } else {
        "warn"
    };

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .map_err(|e| anyhow!("invalid RUST_LOG / log filter: {e}"))?;

    let init_result = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .with_level(true)
        .with_thread_ids(true)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .try_init();

    if let Err(err) = init_result {
        debug!(error = %err, "tracing subscriber already set, continuing");
    }

    Ok(())
}

/// Pulls positional `rc.KEY=VALUE` / `rc.KEY:VALUE` overrides out of the
/// argument list before clap sees it.
#[tracing::instrument(skip_all)]
pub fn preprocess_args(raw: &[OsString]) -> anyhow::Result<PreprocessedArgs> {
    let mut cleaned = Vec::with_capacity(raw.len());
    let mut overrides: Vec<(String, String)> = Vec::new();

    let mut iter = raw.iter().cloned();
    if let Some(bin) = iter.next() {
        cleaned.push(bin);
    }

    for arg in iter {
        let s = arg.to_string_lossy();
        if let Some(rest) = s.strip_prefix("rc.") {
            let parsed = if let Some((k, v)) = rest.split_once('=') {
                Some((format!("rc.{k}"), v.to_string()))
            } else if let Some((k, v)) = rest.split_once(':') {
                Some((format!("rc.{k}"), v.to_string()))
            } else {
                None
            };

            if let Some((k, v)) = parsed {
                debug!(key = %k, "captured positional rc override");
                overrides.push((k, v));
                continue;
            }
        }

        cleaned.push(arg);
    }

    Ok(PreprocessedArgs {
        cleaned_args: cleaned,
        rc_overrides: overrides,
    })
}

#[cfg(test)]
mod tests {
    use std::ffi::OsString;

    use clap::Parser;

    use super::{Command, DayArgs, GlobalCli, ShellLine, preprocess_args};

    fn os(args: &[&str]) -> Vec<OsString> {
        args.iter().map(OsString::from).collect()
    }

    #[test]
    fn positional_rc_overrides_are_extracted() {
        let pre = preprocess_args(&os(&[
            "home",
            "rc.server.url=http://tablet:5000",
            "mark",
            "7",
            "rc.user.id:3",
        ]))
        .expect("preprocess");

        assert_eq!(pre.cleaned_args, os(&["home", "mark", "7"]));
        assert_eq!(
            pre.rc_overrides,
            vec![
                ("rc.server.url".to_string(), "http://tablet:5000".to_string()),
                ("rc.user.id".to_string(), "3".to_string()),
            ]
        );
    }

    #[test]
    fn global_flags_parse_after_subcommand() {
        let cli = GlobalCli::try_parse_from([
            "home", "star", "5", "--date", "2024-02-02", "--starred", "-vv", "--rc", "user.id=1",
        ])
        .expect("parse");

        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.rc_overrides[0].key, "user.id");
        assert_eq!(
            cli.command,
            Command::Star {
                task_id: "5".to_string(),
                day: DayArgs {
                    date: Some("2024-02-02".to_string()),
                    user: None,
                },
                starred: true,
            }
        );
    }

    #[test]
    fn shell_lines_honour_quotes() {
        let command =
            ShellLine::parse_line(r#"rename 4 "Buy milk" Buy bread"#).expect("parse line");

        assert_eq!(
            command,
            Command::Rename {
                task_id: "4".to_string(),
                original: "Buy milk".to_string(),
                new_name: vec!["Buy".to_string(), "bread".to_string()],
            }
        );
    }

    #[test]
    fn shell_rejects_unknown_commands() {
        assert!(ShellLine::parse_line("delete 4").is_err());
        assert!(ShellLine::parse_line(r#"rename 4 "unterminated"#).is_err());
    }
}

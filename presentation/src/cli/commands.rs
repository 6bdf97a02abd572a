//! CLI command definitions

use clap::Parser;
use std::path::PathBuf;

/// CLI arguments for roundtable
#[derive(Parser, Debug)]
#[command(name = "roundtable")]
#[command(author, version, about = "Moderated panel chat - a moderator LLM decides which specialists speak")]
#[command(long_about = r#"
Roundtable puts a panel of specialist LLMs in front of you, steered by a
moderator LLM.

Each message you send goes to the moderator first. It answers with commands
such as `!allowspeak planner` or `!yield`, and the granted specialists then
reply in order.

Lines starting with `!` are applied as if the moderator had sent them, so you
can grant, deny or add notes yourself.

Configuration files are loaded from (in priority order):
1. --config <path>              Explicit config file
2. ./roundtable.toml            Project-level config
3. ~/.config/roundtable/config.toml   Global config

Example:
  roundtable
  roundtable --new-session --attach brief.md
  roundtable --list-sessions
"#)]
pub struct Cli {
    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress progress indicators
    #[arg(short, long)]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long)]
    pub no_config: bool,

    /// Show configuration file locations and exit
    #[arg(long)]
    pub show_config: bool,

    /// Session to resume (list number, id, or id prefix)
    #[arg(short, long, value_name = "SESSION", conflicts_with = "new_session")]
    pub session: Option<String>,

    /// Start a new session
    #[arg(short, long)]
    pub new_session: bool,

    /// List saved sessions and exit
    #[arg(long)]
    pub list_sessions: bool,

    /// Attach a text document to the session before the prompt opens
    #[arg(short, long, value_name = "PATH")]
    pub attach: Vec<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_flags() {
        let cli = Cli::try_parse_from([
            "roundtable",
            "-vv",
            "--new-session",
            "--attach",
            "a.md",
            "--attach",
            "b.txt",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        assert!(cli.new_session);
        assert_eq!(cli.attach.len(), 2);
    }

    #[test]
    fn test_session_conflicts_with_new_session() {
        assert!(Cli::try_parse_from(["roundtable", "--session", "1", "--new-session"]).is_err());
    }
}

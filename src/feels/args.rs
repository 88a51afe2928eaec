use clap::{Parser, Subcommand, ValueEnum};
use feels::publish::Channel;
use std::path::PathBuf;

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("GIT_HASH"),
    " ",
    env!("GIT_COMMIT_DATE"),
    ")"
);

#[derive(Parser, Debug)]
#[command(name = "feels")]
#[command(about = "Record your feels, one plain-text entry per day", long_about = None)]
#[command(version, long_version = LONG_VERSION)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Home directory to operate on (defaults to yours)
    #[arg(long, global = true, env = "FEELS_HOME")]
    pub home: Option<PathBuf>,

    /// Owner name (defaults to the name of the home directory)
    #[arg(long, global = true, env = "FEELS_USER")]
    pub user: Option<String>,

    /// File listing every user on this host, one per line
    #[arg(long, global = true, env = "FEELS_USERS_FILE")]
    pub users_file: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Record feels for today (or --date); reads stdin when TEXT is omitted
    #[command(alias = "w")]
    Write {
        /// Day to write to, as YYYYMMDD
        #[arg(short, long)]
        date: Option<String>,

        /// What to record
        text: Option<String>,
    },

    /// List your entries, newest first
    #[command(alias = "ls")]
    List {
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Print one entry
    #[command(alias = "v")]
    Show { id: String },

    /// Print the file path of an entry
    Path { id: String },

    /// Toggle an entry between public and nopub
    Nopub { id: String },

    /// Delete an entry for good
    #[command(alias = "rm")]
    Delete {
        id: String,

        /// Confirm the deletion
        #[arg(long)]
        yes: bool,
    },

    /// Move an entry out of sight without deleting it
    Bury {
        id: String,

        /// Confirm the burial
        #[arg(long)]
        yes: bool,
    },

    /// Regenerate every public channel
    Sync,

    /// Turn publishing on or off
    Publishing {
        state: Switch,

        /// Directory under ~/public_html to publish to
        #[arg(long)]
        dir: Option<String>,
    },

    /// Turn the atom or gopher channel on or off
    Channel { channel: ChannelArg, state: Switch },

    /// Archive your entries
    Backup,

    /// List your backups
    Backups,

    /// Merge a backup archive into your entries
    Restore { archive: PathBuf },

    /// Recent public entries from everyone
    Feed {
        /// Page number, starting at 1
        #[arg(short, long, default_value_t = 1)]
        page: usize,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Everyone who keeps feels, most recently active first
    Neighbors {
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Read someone else's public feels
    Browse {
        /// Whose feels to read (a leading ~ is fine)
        user: String,

        /// Entry to print; lists their entries when omitted
        id: Option<String>,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Switch {
    On,
    Off,
}

impl Switch {
    pub fn is_on(self) -> bool {
        self == Switch::On
    }
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChannelArg {
    Atom,
    Gopher,
}

impl From<ChannelArg> for Channel {
    fn from(arg: ChannelArg) -> Self {
        match arg {
            ChannelArg::Atom => Channel::Atom,
            ChannelArg::Gopher => Channel::Gopher,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["feels", "list", "--json", "--home", "/tmp/h"]).unwrap();
        assert_eq!(cli.home, Some(PathBuf::from("/tmp/h")));
        assert!(matches!(cli.command, Some(Commands::List { json: true })));
    }

    #[test]
    fn parses_channel_switch() {
        let cli = Cli::try_parse_from(["feels", "channel", "gopher", "off"]).unwrap();
        match cli.command {
            Some(Commands::Channel { channel, state }) => {
                assert_eq!(Channel::from(channel), Channel::Gopher);
                assert!(!state.is_on());
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn browse_takes_an_optional_id() {
        let cli = Cli::try_parse_from(["feels", "browse", "~endorphant"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Browse { id: None, .. })));

        let cli = Cli::try_parse_from(["feels", "browse", "endorphant", "20240603"]).unwrap();
        match cli.command {
            Some(Commands::Browse { user, id }) => {
                assert_eq!(user, "endorphant");
                assert_eq!(id.as_deref(), Some("20240603"));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn feed_page_defaults_to_one() {
        let cli = Cli::try_parse_from(["feels", "feed"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Feed { page: 1, json: false })));
    }
}

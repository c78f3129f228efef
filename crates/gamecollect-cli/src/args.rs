//! Command line definition

use clap::{Parser, Subcommand, ValueEnum};
use gamecollect_catalog::MetacriticOrder;
use gamecollect_library::SortKey;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "gamecollect")]
#[command(about = "Search the game catalog, scan barcodes and manage your collection", long_about = None)]
pub struct Cli {
    /// Configuration file (defaults to ~/.gamecollect/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, PartialEq, Subcommand)]
pub enum Command {
    /// List catalog platforms
    Platforms,

    /// Search the catalog
    Search {
        /// Search text; several words are joined with spaces
        #[arg(required = true, num_args = 1..)]
        term: Vec<String>,

        /// Match the title exactly
        #[arg(long)]
        exact: bool,

        /// Only games on this platform (as listed by `platforms`)
        #[arg(long)]
        platform: Option<String>,

        /// Order results by metacritic score
        #[arg(long, value_enum)]
        metacritic: Option<MetacriticArg>,
    },

    /// Identify a game from its barcode
    Scan {
        upc: String,

        /// Add the identified game to the collection
        #[arg(long)]
        add: bool,
    },

    /// Add a catalog game to the collection
    Add { id: i64 },

    /// Show the collection
    List {
        #[arg(long, value_enum)]
        sort: Option<SortArg>,

        /// Group games under each of their platforms
        #[arg(long)]
        by_platform: bool,
    },

    /// Search titles in the collection
    Find {
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },

    /// Remove games by their number in `list`
    Remove {
        /// One-based list numbers, stored zero-based
        #[arg(required = true, num_args = 1.., value_parser = parse_list_number)]
        indices: Vec<usize>,
    },

    /// Remove every game
    Wipe,

    /// Show the last viewed game, or view another one
    Last { id: Option<i64> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum MetacriticArg {
    Higher,
    Lower,
}

impl From<MetacriticArg> for MetacriticOrder {
    fn from(arg: MetacriticArg) -> Self {
        match arg {
            MetacriticArg::Higher => MetacriticOrder::Higher,
            MetacriticArg::Lower => MetacriticOrder::Lower,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SortArg {
    Title,
    Date,
}

impl From<SortArg> for SortKey {
    fn from(arg: SortArg) -> Self {
        match arg {
            SortArg::Title => SortKey::Title,
            SortArg::Date => SortKey::DateAdded,
        }
    }
}

/// List numbers start at 1 on the command line
fn parse_list_number(text: &str) -> Result<usize, String> {
    match text.parse::<usize>() {
        Ok(n) if n > 0 => Ok(n - 1),
        _ => Err(format!("expected a list number starting at 1, got {:?}", text)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(line: &str) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(std::iter::once("gamecollect").chain(line.split_whitespace()))
    }

    #[test]
    fn test_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_subcommand_is_required() {
        assert!(parse("").is_err());
    }

    #[test]
    fn test_config_flag_is_global() {
        let cli = parse("--config /tmp/gc.toml platforms").unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/gc.toml")));
        assert_eq!(cli.command, Command::Platforms);

        let cli = parse("wipe --config /tmp/gc.toml").unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/gc.toml")));
    }

    #[test]
    fn test_search_options() {
        let cli = parse("search super mario --exact --platform PC --metacritic higher").unwrap();
        assert_eq!(
            cli.command,
            Command::Search {
                term: vec!["super".into(), "mario".into()],
                exact: true,
                platform: Some("PC".into()),
                metacritic: Some(MetacriticArg::Higher),
            }
        );
    }

    #[test]
    fn test_search_platform_with_spaces() {
        let args = ["gamecollect", "search", "zelda", "--platform", "Nintendo Switch"];
        let cli = Cli::try_parse_from(args).unwrap();
        let Command::Search { platform, .. } = cli.command else {
            panic!("expected search");
        };
        assert_eq!(platform.as_deref(), Some("Nintendo Switch"));
    }

    #[test]
    fn test_search_errors() {
        assert!(parse("search").is_err());
        assert!(parse("search mario --metacritic best").is_err());
        assert!(parse("search mario --fuzzy").is_err());
    }

    #[test]
    fn test_scan() {
        assert_eq!(
            parse("scan 045496590420 --add").unwrap().command,
            Command::Scan {
                upc: "045496590420".into(),
                add: true,
            }
        );
        assert!(parse("scan").is_err());
        assert!(parse("scan 1 2").is_err());
    }

    #[test]
    fn test_list_options() {
        let cli = parse("list --sort date --by-platform").unwrap();
        assert_eq!(
            cli.command,
            Command::List {
                sort: Some(SortArg::Date),
                by_platform: true,
            }
        );
        assert_eq!(SortKey::from(SortArg::Date), SortKey::DateAdded);
        assert!(parse("list --sort rating").is_err());
    }

    #[test]
    fn test_remove_is_one_based() {
        assert_eq!(
            parse("remove 1 3").unwrap().command,
            Command::Remove {
                indices: vec![0, 2]
            }
        );
        assert!(parse("remove 0").is_err());
        assert!(parse("remove two").is_err());
        assert!(parse("remove").is_err());
    }

    #[test]
    fn test_add_and_last() {
        assert_eq!(parse("add 3498").unwrap().command, Command::Add { id: 3498 });
        assert!(parse("add zelda").is_err());
        assert_eq!(parse("last").unwrap().command, Command::Last { id: None });
        assert_eq!(
            parse("last 7").unwrap().command,
            Command::Last { id: Some(7) }
        );
    }

    #[test]
    fn test_metacritic_mapping() {
        assert_eq!(
            MetacriticOrder::from(MetacriticArg::Lower),
            MetacriticOrder::Lower
        );
    }

    #[test]
    fn test_unknown_command() {
        assert!(parse("launch").is_err());
    }
}

use clap::error::ErrorKind;
use clap::{CommandFactory, Parser, ValueEnum};
use sapp::domain::config::{AppConfig, DecrementPolicy};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

#[derive(Parser, Debug)]
#[command(name = "superapp", version, about = "Replay cart commands against a product catalog")]
pub(crate) struct Cli {
    #[arg(long, help = "Configuration file (TOML, JSON or YAML)")]
    pub(crate) config: Option<PathBuf>,
    #[arg(long, help = "Catalog seed file; overrides `catalog.seed`")]
    pub(crate) catalog: Option<PathBuf>,
    #[arg(long, value_enum, help = "Decrement policy; overrides `cart.policy`")]
    pub(crate) policy: Option<PolicyArg>,
    #[arg(
        long,
        help = "Clamp floor (implies --policy clamp when no policy is given; not valid with remove-at-zero)"
    )]
    pub(crate) floor: Option<u32>,
    #[arg(long, help = "Print the final cart as JSON")]
    pub(crate) json: bool,
    #[arg(
        required = true,
        value_name = "COMMAND",
        help = "add:<id> inc:<id> dec:<id> rm:<id> save:<id> move:<id> similar:<id> search:<text> show"
    )]
    pub(crate) commands: Vec<Command>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub(crate) enum PolicyArg {
    Clamp,
    RemoveAtZero,
}

impl Cli {
    /// Parses the command line and exits with a usage error on conflicting flags.
    pub(crate) fn parse_checked() -> Self {
        let cli = Self::parse();
        if let Err(err) = cli.check() {
            err.exit();
        }
        cli
    }

    /// Rejects value-dependent flag conflicts clap cannot express, like `--floor` with remove-at-zero.
    pub(crate) fn check(&self) -> Result<(), clap::Error> {
        if self.floor.is_some() && self.policy == Some(PolicyArg::RemoveAtZero) {
            return Err(Self::command().error(
                ErrorKind::ArgumentConflict,
                "--floor cannot be used with --policy remove-at-zero",
            ));
        }
        Ok(())
    }

    /// Applies command-line overrides on top of the loaded configuration.
    pub(crate) fn apply(&self, config: &mut AppConfig) {
        if let Some(seed) = &self.catalog {
            config.catalog.seed = Some(seed.clone());
        }

        let floor = self.floor.unwrap_or_else(|| config.cart.policy.floor());
        match (self.policy, self.floor) {
            (Some(PolicyArg::RemoveAtZero), _) => config.cart.policy = DecrementPolicy::RemoveAtZero,
            (Some(PolicyArg::Clamp), _) | (None, Some(_)) => {
                config.cart.policy = DecrementPolicy::clamp(floor);
            },
            (None, None) => {},
        }
    }
}

/// One step replayed against the session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Command {
    Add(String),
    Inc(String),
    Dec(String),
    Remove(String),
    Save(String),
    Move(String),
    Similar(String),
    Search(String),
    Show,
}

impl FromStr for Command {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        if raw == "show" {
            return Ok(Self::Show);
        }

        let (verb, arg) =
            raw.split_once(':').ok_or_else(|| format!("expected <verb>:<arg>, got '{raw}'"))?;
        if verb == "search" {
            return Ok(Self::Search(arg.trim().to_owned()));
        }

        let id = arg.trim();
        if id.is_empty() {
            return Err(format!("missing item id in '{raw}'"));
        }
        let id = id.to_owned();

        match verb {
            "add" => Ok(Self::Add(id)),
            "inc" => Ok(Self::Inc(id)),
            "dec" => Ok(Self::Dec(id)),
            "rm" => Ok(Self::Remove(id)),
            "save" => Ok(Self::Save(id)),
            "move" => Ok(Self::Move(id)),
            "similar" => Ok(Self::Similar(id)),
            other => Err(format!("unknown command '{other}'")),
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Add(id) => write!(f, "add:{id}"),
            Self::Inc(id) => write!(f, "inc:{id}"),
            Self::Dec(id) => write!(f, "dec:{id}"),
            Self::Remove(id) => write!(f, "rm:{id}"),
            Self::Save(id) => write!(f, "save:{id}"),
            Self::Move(id) => write!(f, "move:{id}"),
            Self::Similar(id) => write!(f, "similar:{id}"),
            Self::Search(text) => write!(f, "search:{text}"),
            Self::Show => f.write_str("show"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commands_parse() {
        assert_eq!("add:1".parse(), Ok(Command::Add("1".to_owned())));
        assert_eq!("rm: 7 ".parse(), Ok(Command::Remove("7".to_owned())));
        assert_eq!("search:galaxy ultra".parse(), Ok(Command::Search("galaxy ultra".to_owned())));
        assert_eq!("search:".parse(), Ok(Command::Search(String::new())));
        assert_eq!("similar:levis-501".parse(), Ok(Command::Similar("levis-501".to_owned())));
        assert_eq!("show".parse(), Ok(Command::Show));
    }

    #[test]
    fn malformed_commands_are_rejected() {
        assert!("add".parse::<Command>().is_err());
        assert!("add:".parse::<Command>().is_err());
        assert!("buy:1".parse::<Command>().is_err());
    }

    #[test]
    fn floor_alone_selects_clamp() {
        let cli = Cli::parse_from(["superapp", "--floor", "2", "show"]);
        let mut config = AppConfig::default();
        cli.apply(&mut config);
        assert_eq!(config.cart.policy, DecrementPolicy::Clamp { floor: 2 });
    }

    #[test]
    fn clamp_without_floor_defaults_to_one() {
        let cli = Cli::parse_from(["superapp", "--policy", "clamp", "show"]);
        let mut config = AppConfig::default();
        cli.apply(&mut config);
        assert_eq!(config.cart.policy, DecrementPolicy::Clamp { floor: 1 });
    }

    #[test]
    fn floor_conflicts_with_remove_at_zero() {
        let cli = Cli::parse_from(["superapp", "--policy", "remove-at-zero", "--floor", "2", "show"]);
        let err = cli.check().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ArgumentConflict);

        let cli = Cli::parse_from(["superapp", "--policy", "clamp", "--floor", "2", "show"]);
        assert!(cli.check().is_ok());
    }

    #[test]
    fn catalog_flag_overrides_seed() {
        let cli = Cli::parse_from(["superapp", "--catalog", "seed.json", "--policy", "remove-at-zero", "show"]);
        let mut config = AppConfig::default();
        config.cart.policy = DecrementPolicy::clamp(3);
        cli.apply(&mut config);
        assert_eq!(config.catalog.seed, Some(PathBuf::from("seed.json")));
        assert_eq!(config.cart.policy, DecrementPolicy::RemoveAtZero);
    }
}

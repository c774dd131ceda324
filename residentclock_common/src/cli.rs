use clap::{arg, command, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to config.toml
    #[arg(short, long, value_hint = clap::ValueHint::FilePath, env, default_value(".config/config.toml"))]
    pub config: String,
    /// Subcommands
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, PartialOrd, PartialEq)]
pub enum Commands {
    /// Checks the server config file and the weather provider, prints the results as json and exits.
    Healthcheck,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn healthcheck_subcommand_is_parsed() {
        let args = Args::parse_from(["residentclock", "--config", "bot.toml", "healthcheck"]);

        assert_eq!(args.config, "bot.toml");
        assert_eq!(args.command, Some(Commands::Healthcheck));
    }

    #[test]
    fn no_subcommand_runs_the_bot() {
        let args = Args::parse_from(["residentclock", "-c", "bot.toml"]);

        assert!(args.command.is_none());
    }
}

use clap::{Parser, Subcommand};

/// kafka-init - prepares rack id, node addresses and JAAS config for a broker
#[derive(Parser, Debug)]
#[command(name = "kafka-init")]
#[command(about = "Init container helper writing broker bootstrap files from cluster state")]
#[command(version)]
pub struct Cli {
    /// Dry-run mode: print generated files instead of writing them.
    ///
    /// Cluster reads still happen so the output is realistic. The JAAS
    /// configuration is shown by length only.
    #[arg(long, global = true)]
    pub dry_run: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Commands {
    /// Query the cluster and write the enabled files (default)
    Run,
    /// Resolve the configuration from the environment, print it and exit
    Validate,
    /// List the recognized environment variables with defaults
    Params,
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Subcommand to execute, `run` when none was given
    pub fn command(&self) -> Commands {
        self.command.unwrap_or(Commands::Run)
    }
}

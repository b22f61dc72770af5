pub mod string;

#[derive(clap::Subcommand)]
pub enum Commands {
    /// Handle localized STRING files
    String {
        #[command(subcommand)]
        command: string::StringCommands,
    },
}

impl Commands {
    pub fn handle(&self) -> miette::Result<()> {
        match self {
            Commands::String { command } => command.handle(),
        }
    }
}

pub mod convert;
pub mod verify;

#[derive(clap::Subcommand)]
pub enum StringCommands {
    /// Convert a STRING file to JSON, or a JSON file back to a STRING file
    Convert(convert::ConvertArgs),
    /// Check that a STRING file survives a rewrite unchanged
    Verify(verify::VerifyArgs),
}

impl StringCommands {
    pub fn handle(&self) -> miette::Result<()> {
        match self {
            StringCommands::Convert(convert) => convert.handle(),
            StringCommands::Verify(verify) => verify.handle(),
        }
    }
}

use clap::Args;
use miette::{miette, Context, IntoDiagnostic, Result};
use owo_colors::OwoColorize;
use std::{io::Cursor, path::PathBuf};
use swg_string::{StringFile, StringFileReader};
use tracing::info;

#[derive(Args)]
pub struct VerifyArgs {
    /// An input STRING file
    #[arg(value_name = "FILE")]
    file: PathBuf,
}

impl VerifyArgs {
    pub fn handle(&self) -> Result<()> {
        let expected = std::fs::read(&self.file)
            .into_diagnostic()
            .context(format!("path: {}", &self.file.display()))?;

        let strings = StringFileReader::new(Cursor::new(&expected))?;
        info!("read {} entries", strings.len());

        for anomaly in strings.anomalies() {
            println!("⚠️ {}", anomaly.yellow());
        }

        let mut intact = true;

        let actual = strings.file().to_bytes()?;
        match first_difference(&expected, &actual) {
            None => println!("✅ {}", "binary rewrite is identical".green()),
            Some(offset) => {
                intact = false;
                println!(
                    "❌ {} at byte {} ({} vs {} bytes)",
                    "binary rewrite differs".red(),
                    offset,
                    expected.len(),
                    actual.len()
                );
            }
        }

        let parsed = StringFile::from_json_str(&strings.file().to_json_string()?)?;
        if &parsed == strings.file() {
            println!("✅ {}", "json round trip is identical".green());
        } else {
            intact = false;
            println!("❌ {}", "json round trip differs".red());
        }

        if intact {
            Ok(())
        } else {
            Err(miette!("{} did not survive a rewrite", self.file.display()))
        }
    }
}

/// Position of the first byte that differs, including one buffer being a prefix of the other
fn first_difference(left: &[u8], right: &[u8]) -> Option<usize> {
    left.iter()
        .zip(right)
        .position(|(l, r)| l != r)
        .or_else(|| (left.len() != right.len()).then(|| left.len().min(right.len())))
}

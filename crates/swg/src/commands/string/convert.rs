use clap::Args;
use miette::{miette, Context, IntoDiagnostic, Result};
use std::{
    ffi::OsString,
    fs::File,
    io::{Cursor, Write},
    path::{Path, PathBuf},
};
use swg_string::{StringFile, StringFileReader};
use tracing::{info, warn};
use walkdir::WalkDir;

/// Direction of a conversion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Conversion {
    /// STRING file to JSON
    ToJson,
    /// JSON to STRING file
    ToBinary,
}

impl Conversion {
    /// Pick the conversion from the last four characters of the path, `ring` or `json`
    pub fn detect(path: &Path) -> Option<Conversion> {
        let name = path.to_string_lossy();
        let chars = name.chars().collect::<Vec<_>>();
        if chars.len() <= 4 {
            return None;
        }

        match String::from_iter(&chars[chars.len() - 4..]).as_str() {
            "ring" => Some(Conversion::ToJson),
            "json" => Some(Conversion::ToBinary),
            _ => None,
        }
    }

    /// Output path for `input`, the new extension is appended to the whole input path.
    ///
    /// Converting `foo.string.json` back therefore produces `foo.string.json.string`.
    pub fn output_path(self, input: &Path) -> PathBuf {
        let mut name = OsString::from(input.as_os_str());
        name.push(match self {
            Conversion::ToJson => ".json",
            Conversion::ToBinary => ".string",
        });
        PathBuf::from(name)
    }
}

#[derive(Args)]
pub struct ConvertArgs {
    /// A STRING file, a JSON file, or a directory of STRING files
    #[arg(value_name = "PATH")]
    path: PathBuf,

    /// A target file, defaults to the input path with `.json` or `.string` appended
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Allow overwriting the target
    #[arg(long, default_value_t = false)]
    overwrite: bool,
}

impl ConvertArgs {
    pub fn handle(&self) -> Result<()> {
        if self.path.is_dir() {
            return self.handle_directory();
        }

        let conversion = Conversion::detect(&self.path).ok_or(miette!(
            "unable to pick a conversion for {}, expected a .string or .json file",
            self.path.display()
        ))?;

        let output = self
            .output
            .clone()
            .unwrap_or_else(|| conversion.output_path(&self.path));

        self.convert(&self.path, conversion, &output)
    }

    fn handle_directory(&self) -> Result<()> {
        if self.output.is_some() {
            return Err(miette!("--output can't be used when converting a directory"));
        }

        let files = WalkDir::new(&self.path)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| !e.file_type().is_dir())
            .filter(|e| e.path().extension().is_some_and(|ext| ext == "string"))
            .collect::<Vec<_>>();

        if files.is_empty() {
            return Err(miette!("no .string files in {}", self.path.display()));
        }

        for file in files {
            let output = Conversion::ToJson.output_path(file.path());
            self.convert(file.path(), Conversion::ToJson, &output)?;
        }

        Ok(())
    }

    fn convert(&self, input: &Path, conversion: Conversion, output: &Path) -> Result<()> {
        info!("converting {} to {}", input.display(), output.display());

        // Nothing is created until the whole conversion succeeded
        let data = match conversion {
            Conversion::ToJson => to_json(input)?,
            Conversion::ToBinary => to_binary(input)?,
        };

        let out = if !self.overwrite {
            File::create_new(output)
                .into_diagnostic()
                .context(format!("creating {}", output.display()))?
        } else {
            File::create(output)
                .into_diagnostic()
                .context(format!("creating {}", output.display()))?
        };

        write_or_discard(out, &data, output)
    }
}

/// Write `data` to the freshly created `output`, removing the file again if that fails
fn write_or_discard(mut out: impl Write, data: &[u8], output: &Path) -> Result<()> {
    let result = out.write_all(data).and_then(|_| out.flush());
    drop(out);

    if let Err(e) = result {
        if let Err(remove) = std::fs::remove_file(output) {
            warn!("unable to remove {}: {}", output.display(), remove);
        }
        return Err(e)
            .into_diagnostic()
            .context(format!("writing {}", output.display()));
    }

    Ok(())
}

fn to_json(input: &Path) -> Result<Vec<u8>> {
    let data = std::fs::read(input)
        .into_diagnostic()
        .context(format!("path: {}", input.display()))?;

    let strings = StringFileReader::new(Cursor::new(data))
        .context(format!("reading {}", input.display()))?;

    if !strings.anomalies().is_empty() {
        warn!(
            "{} string(s) in {} were damaged, see the warnings above",
            strings.anomalies().len(),
            input.display()
        );
    }

    let mut json = Vec::new();
    strings.file().to_json_writer(&mut json)?;
    Ok(json)
}

fn to_binary(input: &Path) -> Result<Vec<u8>> {
    let text = std::fs::read_to_string(input)
        .into_diagnostic()
        .context(format!("path: {}", input.display()))?;

    let strings =
        StringFile::from_json_str(&text).context(format!("parsing {}", input.display()))?;

    Ok(strings.to_bytes()?)
}

//! Reading asset files from the command line

use std::path::{Path, PathBuf};

use assetport_api::ImportAsset;
use assetport_transform::{FieldMapping, assets_from_csv, assets_from_json};
use clap::{Args, ValueEnum};
use eyre::{WrapErr, eyre};
use serde_json::Value;

/// Format of an asset file
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum InputFormat {
    Csv,
    Json,
}

impl InputFormat {
    /// Guess the format from a file extension
    ///
    /// # Errors
    /// Returns error for an extension other than `.csv` or `.json`
    pub fn from_path(path: &Path) -> eyre::Result<Self> {
        let ext = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("csv") => Ok(Self::Csv),
            Some("json") => Ok(Self::Json),
            _ => Err(eyre!(
                "cannot tell the format of {}; pass --format csv or --format json",
                path.display()
            )),
        }
    }
}

/// Asset file and how to map its fields
#[derive(Args, Debug, Clone)]
pub struct InputArgs {
    /// CSV or JSON file holding asset records
    pub file: PathBuf,

    /// Input format (default: from the file extension)
    #[arg(long, value_enum)]
    pub format: Option<InputFormat>,

    /// Take a field from a differently named column
    #[arg(long = "map", value_name = "TARGET=SOURCE")]
    pub map: Vec<String>,

    /// JSON object of target field to source column
    #[arg(long, value_name = "FILE")]
    pub mapping_file: Option<PathBuf>,
}

impl InputArgs {
    /// Mapping from `--mapping-file` followed by every `--map` entry
    ///
    /// # Errors
    /// Returns error for an unreadable mapping file or a bad `--map` entry
    pub fn mapping(&self) -> eyre::Result<FieldMapping> {
        let mut mapping = match &self.mapping_file {
            Some(path) => {
                let raw = std::fs::read(path)
                    .wrap_err_with(|| format!("failed to read mapping {}", path.display()))?;
                let value: Value = serde_json::from_slice(&raw)
                    .wrap_err_with(|| format!("invalid mapping {}", path.display()))?;
                FieldMapping::from_json(&value)
            }
            None => FieldMapping::new(),
        };

        for (target, source) in FieldMapping::parse_args(&self.map)?.iter() {
            mapping = mapping.map(target, source);
        }
        Ok(mapping)
    }

    /// Read and validate every record in the file
    ///
    /// # Errors
    /// Returns error if the file cannot be read or any record is invalid
    pub fn read_assets(&self) -> eyre::Result<Vec<ImportAsset>> {
        let mapping = self.mapping()?;
        let format = match self.format {
            Some(format) => format,
            None => InputFormat::from_path(&self.file)?,
        };

        let assets = match format {
            InputFormat::Csv => assets_from_csv(&self.file, Some(&mapping))?,
            InputFormat::Json => {
                let raw = std::fs::read(&self.file)
                    .wrap_err_with(|| format!("failed to read {}", self.file.display()))?;
                assets_from_json(raw, Some(&mapping))?
            }
        };
        Ok(assets)
    }
}

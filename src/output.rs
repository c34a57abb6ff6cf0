use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::generation::GenerationOutput;

/// Writes generation results as pretty JSON, one file per scenario and seed.
pub struct OutputWriter {
    output_dir: PathBuf,
}

impl OutputWriter {
    pub fn new(output_dir: impl AsRef<Path>) -> Self {
        Self {
            output_dir: output_dir.as_ref().to_path_buf(),
        }
    }

    pub fn path_for(&self, output: &GenerationOutput) -> PathBuf {
        self.output_dir
            .join(format!("{}_{}.json", output.scenario, output.seed))
    }

    pub fn write(&self, output: &GenerationOutput) -> Result<PathBuf> {
        fs::create_dir_all(&self.output_dir).with_context(|| {
            format!("Failed to create output directory {}", self.output_dir.display())
        })?;
        let path = self.path_for(output);
        let json = serde_json::to_string_pretty(output)?;
        fs::write(&path, json)
            .with_context(|| format!("Failed to write output {}", path.display()))?;
        Ok(path)
    }

    pub fn read(path: impl AsRef<Path>) -> Result<GenerationOutput> {
        let path = path.as_ref();
        let data = fs::read_to_string(path)
            .with_context(|| format!("Failed to read output {}", path.display()))?;
        serde_json::from_str(&data).with_context(|| format!("Failed to parse {}", path.display()))
    }
}

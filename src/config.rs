//! Run configuration for the `threft` driver.
//!
//! A [`Config`] is assembled once (by the CLI or by library callers) and then
//! only read. The core model pipeline never sees it.

use std::path::{Path, PathBuf};

/// Prefix of every generator executable: generator `go` runs `threft-gen-go`.
pub const GENERATOR_PREFIX: &str = "threft-gen-";

/// Which generator to run and the arguments to pass it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorSpec {
    pub name: String,
    pub args: Vec<String>,
}

impl GeneratorSpec {
    /// Parse `"<name> [args...]"`, split on whitespace. Returns `None` for a
    /// blank spec.
    pub fn parse(spec: &str) -> Option<Self> {
        let mut parts = spec.split_whitespace();
        let name = parts.next()?.to_string();
        Some(GeneratorSpec {
            name,
            args: parts.map(str::to_string).collect(),
        })
    }

    /// The executable to spawn.
    pub fn program(&self) -> String {
        format!("{GENERATOR_PREFIX}{}", self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// `.thrift` files or directories to search for them.
    pub inputs: Vec<PathBuf>,
    /// Generator to hand the model to. Without one, the model is printed.
    pub generator: Option<GeneratorSpec>,
    /// Working directory of the generator process.
    pub output_dir: PathBuf,
    /// Also write the encoded model to this file.
    pub dump_model: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            inputs: Vec::new(),
            generator: None,
            output_dir: PathBuf::from("."),
            dump_model: None,
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn input(mut self, path: impl AsRef<Path>) -> Self {
        self.inputs.push(path.as_ref().to_path_buf());
        self
    }

    #[must_use]
    pub fn generator(mut self, spec: GeneratorSpec) -> Self {
        self.generator = Some(spec);
        self
    }

    #[must_use]
    pub fn output_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.output_dir = dir.as_ref().to_path_buf();
        self
    }

    #[must_use]
    pub fn dump_model(mut self, path: impl AsRef<Path>) -> Self {
        self.dump_model = Some(path.as_ref().to_path_buf());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generator_spec_splits_name_and_args() {
        let spec = GeneratorSpec::parse("  go  --package models -v ").expect("non-blank spec");
        assert_eq!(spec.name, "go");
        assert_eq!(spec.args, vec!["--package", "models", "-v"]);
        assert_eq!(spec.program(), "threft-gen-go");
    }

    #[test]
    fn blank_generator_spec_is_rejected() {
        assert_eq!(GeneratorSpec::parse(""), None);
        assert_eq!(GeneratorSpec::parse("   "), None);
    }

    #[test]
    fn builder_collects_settings() {
        let config = Config::new()
            .input("a.thrift")
            .input("idl/")
            .output_dir("out")
            .dump_model("model.json");
        assert_eq!(
            config.inputs,
            vec![PathBuf::from("a.thrift"), PathBuf::from("idl/")]
        );
        assert_eq!(config.output_dir, PathBuf::from("out"));
        assert_eq!(config.dump_model, Some(PathBuf::from("model.json")));
        assert_eq!(config.generator, None);
        assert_eq!(Config::default().output_dir, PathBuf::from("."));
    }
}

// ==============================================================================
// Library Entry Point: Building a Model from Files
// ==============================================================================
//
// `Threft` ties the pieces together for callers that start from paths rather
// than strings: it discovers `.thrift` documents, reads them into a fresh
// `Model`, and parses it. Like the model itself, it keeps the warnings of the
// most recent build around even when the build fails, so a CLI can print them
// before the error.

use std::fs::File;
use std::path::{Path, PathBuf};

use miette::Context;
use walkdir::WalkDir;

use crate::config::Config;
use crate::error::Warning;
use crate::model::Model;

/// File extension of IDL documents picked up from directories.
pub const THRIFT_EXTENSION: &str = "thrift";

/// A discovered document: the name it gets in the model and where to read it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub name: String,
    pub path: PathBuf,
}

/// Builds models according to a [`Config`].
///
/// ```no_run
/// use threft::{Config, Threft};
///
/// let mut threft = Threft::new(Config::new().input("idl/"));
/// let model = threft.build()?;
/// for warning in threft.drain_warnings() {
///     eprintln!("warning: {warning}");
/// }
/// println!("{} targets", model.targets().count());
/// # Ok::<(), miette::Report>(())
/// ```
pub struct Threft {
    config: Config,
    /// Warnings from the most recent build, kept even when it failed.
    accumulated_warnings: Vec<Warning>,
}

impl Threft {
    pub fn new(config: Config) -> Self {
        Threft {
            config,
            accumulated_warnings: Vec::new(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Take the warnings produced by the most recent build.
    pub fn drain_warnings(&mut self) -> Vec<Warning> {
        std::mem::take(&mut self.accumulated_warnings)
    }

    /// Discover, read and parse every configured input.
    pub fn build(&mut self) -> miette::Result<Model> {
        self.accumulated_warnings.clear();
        let sources = discover(&self.config.inputs)?;

        let mut model = Model::new();
        for source in &sources {
            let file = File::open(&source.path)
                .map_err(|e| miette::miette!("{e}"))
                .with_context(|| format!("open {}", source.path.display()))?;
            model.add_document_from_reader(source.name.clone(), file)?;
        }
        self.parse(model)
    }

    /// Parse in-memory `(name, source)` documents instead of files.
    pub fn build_sources<'a>(
        &mut self,
        sources: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> miette::Result<Model> {
        self.accumulated_warnings.clear();
        let mut model = Model::new();
        for (name, source) in sources {
            model.add_document(name, source)?;
        }
        self.parse(model)
    }

    fn parse(&mut self, mut model: Model) -> miette::Result<Model> {
        let result = model.parse();
        self.accumulated_warnings = model.drain_warnings();
        result?;
        Ok(model)
    }
}

/// Expand `inputs` into documents.
///
/// A file must carry the `.thrift` extension and is named by its file name.
/// A directory is walked recursively in file-name order for `*.thrift` files,
/// each named by its path relative to that directory.
pub fn discover(inputs: &[PathBuf]) -> miette::Result<Vec<SourceFile>> {
    let mut sources = Vec::new();
    for input in inputs {
        if input.is_dir() {
            let before = sources.len();
            for entry in WalkDir::new(input).sort_by_file_name() {
                let entry = entry
                    .map_err(|e| miette::miette!("{e}"))
                    .with_context(|| format!("walk {}", input.display()))?;
                let path = entry.path();
                if entry.file_type().is_file() && has_thrift_extension(path) {
                    let relative = path.strip_prefix(input).unwrap_or(path);
                    sources.push(SourceFile {
                        name: relative.to_string_lossy().into_owned(),
                        path: path.to_path_buf(),
                    });
                }
            }
            tracing::debug!(
                dir = %input.display(),
                found = sources.len() - before,
                "scanned input directory"
            );
        } else if input.is_file() {
            if !has_thrift_extension(input) {
                return Err(miette::miette!(
                    "invalid file extension for `{}`, expected .{THRIFT_EXTENSION}",
                    input.display()
                ));
            }
            let name = input
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .ok_or_else(|| miette::miette!("input `{}` has no file name", input.display()))?;
            sources.push(SourceFile {
                name,
                path: input.clone(),
            });
        } else {
            return Err(miette::miette!(
                "input `{}` is neither a file nor a directory",
                input.display()
            ));
        }
    }

    if sources.is_empty() {
        return Err(miette::miette!(
            help = "pass `.thrift` files or directories containing them with `-i`",
            "no .{THRIFT_EXTENSION} documents found"
        ));
    }
    Ok(sources)
}

fn has_thrift_extension(path: &Path) -> bool {
    path.extension().and_then(|e| e.to_str()) == Some(THRIFT_EXTENSION)
}

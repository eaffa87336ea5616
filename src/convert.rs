use crate::error::ConvertError;
use crate::parser::{ParseOpts, Parser};
use crate::serialiser::{self, ScriptOpts};

use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::{info, warn};
use tempfile::Builder;

/// Where subtitles are read from.
#[derive(Debug, Clone, PartialEq)]
pub enum Source {
    Stdin,
    File(PathBuf),
}

/// Where the generated script is written to.
#[derive(Debug, Clone, PartialEq)]
pub enum Destination {
    Stdout,
    File(PathBuf),
}

impl Source {
    pub fn from_arg(arg: &str) -> Self {
        if arg == "-" {
            Source::Stdin
        } else {
            Source::File(PathBuf::from(arg))
        }
    }
}

impl Destination {
    /// Resolves the output argument; without one a file input gets a
    /// sibling `<stem>_ae_import.jsx` and stdin goes to stdout.
    pub fn resolve(arg: Option<&str>, source: &Source) -> Self {
        match (arg, source) {
            (Some("-"), _) | (None, Source::Stdin) => Destination::Stdout,
            (Some(path), _) => Destination::File(PathBuf::from(path)),
            (None, Source::File(input)) => Destination::File(default_output_path(input)),
        }
    }
}

fn default_output_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "captions".to_string());
    input.with_file_name(format!("{}_ae_import.jsx", stem))
}

#[derive(Debug, Clone, Default)]
pub struct ConvertOpts {
    pub parse: ParseOpts,
    pub script: ScriptOpts,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub captions: usize,
    pub skipped: usize,
}

/// Runs one conversion: read, parse, render, write.
///
/// Nothing is written unless the whole script rendered successfully.
pub fn convert(source: &Source, destination: &Destination, opts: &ConvertOpts) -> Result<Summary> {
    let data = read_source(source)?;

    let parser = Parser::new(opts.parse.clone())?;
    let parsed = parser
        .parse(&data)
        .with_context(|| format!("Failed to parse SRT input: {}", describe_source(source)))?;

    for skipped in &parsed.skipped {
        warn!(
            "Skipped block {} ('{}'): {}",
            skipped.position, skipped.first_line, skipped.error
        );
    }
    if !parsed.skipped.is_empty() {
        warn!("Skipped {} malformed entries", parsed.skipped.len());
    }
    if parsed.captions.is_empty() {
        return Err(ConvertError::NoCaptionsFound.into());
    }
    info!("Found {} subtitle entries", parsed.captions.len());

    let script = serialiser::render(&parsed.captions, &opts.script)?;
    write_destination(destination, &script)?;

    Ok(Summary {
        captions: parsed.captions.len(),
        skipped: parsed.skipped.len(),
    })
}

fn describe_source(source: &Source) -> String {
    match source {
        Source::Stdin => "<stdin>".to_string(),
        Source::File(path) => format!("'{}'", path.display()),
    }
}

fn read_source(source: &Source) -> Result<String> {
    match source {
        Source::Stdin => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .context("Failed to read from stdin")?;
            Ok(buffer)
        }
        Source::File(path) => {
            if !path.exists() {
                return Err(ConvertError::InputNotFound(path.clone()).into());
            }
            std::fs::read_to_string(path)
                .with_context(|| format!("Failed to open input file: '{}'", path.display()))
        }
    }
}

fn write_destination(destination: &Destination, script: &str) -> Result<()> {
    match destination {
        Destination::Stdout => {
            let mut out = io::stdout();
            out.write_all(script.as_bytes())
                .and_then(|_| out.flush())
                .context("Failed to write to stdout")?;
        }
        Destination::File(path) => {
            write_atomically(path, script)
                .with_context(|| ConvertError::WriteFailure(path.clone()))?;
        }
    }
    Ok(())
}

/// Writes into a temporary sibling file and renames it over `path`, so a
/// failed write never leaves a truncated script behind.
///
/// A new file gets the permissions `File::create` would give it; an
/// existing file keeps its own.
fn write_atomically(path: &Path, contents: &str) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut builder = Builder::new();
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        // The umask still applies on creation.
        builder.permissions(fs::Permissions::from_mode(0o666));
    }
    let mut file = builder
        .tempfile_in(dir)
        .with_context(|| format!("Failed to create temporary file in '{}'", dir.display()))?;
    if let Ok(existing) = fs::metadata(path) {
        file.as_file()
            .set_permissions(existing.permissions())
            .context("Failed to copy permissions of the existing output file")?;
    }
    file.write_all(contents.as_bytes())
        .and_then(|_| file.flush())
        .context("Failed to write temporary file")?;
    file.persist(path)
        .map_err(|e| e.error)
        .context("Failed to move temporary file into place")?;
    Ok(())
}

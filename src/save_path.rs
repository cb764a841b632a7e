//! # Destination Path Resolution
//!
//! Template-based resolution of where an optimized file ends up. The
//! destination is a `${token}` template expanded per input file; callers can
//! inject extra variables (the pipeline passes `${encoder}`). Template
//! problems surface as `TemplateError`, a separate type from I/O errors, and
//! can be checked ahead of any encoding work.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Tokens every template may use, independent of extra variables.
const KNOWN_TOKENS: [&str; 5] = ["dirname", "basename", "filename", "srcext", "ext"];

/// Errors specific to destination templates.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum TemplateError {
    #[error("unknown token \"${{{0}}}\"")]
    UnknownToken(String),

    #[error("unterminated \"${{\" sequence")]
    Unterminated,

    #[error("destination template is empty")]
    EmptyTemplate,
}

/// Where and how optimized files get saved.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SavingOptions {
    /// Destination template. Available tokens: `${dirname}` (input's parent
    /// directory), `${basename}` (input file name), `${filename}` (input
    /// stem), `${srcext}` (input extension), `${ext}` (output extension),
    /// plus per-call extras such as `${encoder}`.
    pub destination: String,
    /// Remove the input file after saving, when the destination differs.
    pub delete_original: bool,
    /// Replace an existing file at the destination instead of picking a
    /// free " (n)" name.
    pub overwrite: bool,
}

impl Default for SavingOptions {
    fn default() -> Self {
        Self {
            destination: "${dirname}/${filename}.${ext}".to_string(),
            delete_original: false,
            overwrite: false,
        }
    }
}

impl SavingOptions {
    /// Validate the template without touching the filesystem. Runs before
    /// any encode work so malformed templates fail fast.
    pub fn check_template(&self, extra_names: &[&str]) -> Result<(), TemplateError> {
        if self.destination.trim().is_empty() {
            return Err(TemplateError::EmptyTemplate);
        }
        expand(&self.destination, &|name| {
            if KNOWN_TOKENS.contains(&name) || extra_names.contains(&name) {
                Some(String::new())
            } else {
                None
            }
        })
        .map(|_| ())
    }

    /// Expand the template for one input file and apply the collision
    /// policy: a path equal to the original means replace in place, an
    /// occupied path gets " (1)", " (2)"... appended to the stem unless
    /// `overwrite` is set.
    pub fn resolve_destination(
        &self,
        original: &Path,
        extension: &str,
        extra: &[(&str, &str)],
    ) -> Result<PathBuf, TemplateError> {
        if self.destination.trim().is_empty() {
            return Err(TemplateError::EmptyTemplate);
        }

        let dirname = match original.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.display().to_string(),
            _ => ".".to_string(),
        };
        let basename = original
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let filename = original
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();
        let srcext = original
            .extension()
            .map(|ext| ext.to_string_lossy().into_owned())
            .unwrap_or_default();

        let expanded = expand(&self.destination, &|name| match name {
            "dirname" => Some(dirname.clone()),
            "basename" => Some(basename.clone()),
            "filename" => Some(filename.clone()),
            "srcext" => Some(srcext.clone()),
            "ext" => Some(extension.to_string()),
            other => extra
                .iter()
                .find(|(key, _)| *key == other)
                .map(|(_, value)| value.to_string()),
        })?;

        let candidate = PathBuf::from(expanded);
        if candidate == original || self.overwrite {
            return Ok(candidate);
        }
        Ok(next_free_path(candidate))
    }
}

/// Expand every `${name}` in `template` through `lookup`.
fn expand(
    template: &str,
    lookup: &dyn Fn(&str) -> Option<String>,
) -> Result<String, TemplateError> {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let end = after.find('}').ok_or(TemplateError::Unterminated)?;
        let name = &after[..end];
        match lookup(name) {
            Some(value) => out.push_str(&value),
            None => return Err(TemplateError::UnknownToken(name.to_string())),
        }
        rest = &after[end + 1..];
    }

    out.push_str(rest);
    Ok(out)
}

/// Probe for the first non-existing " (n)" variant of `candidate`.
fn next_free_path(candidate: PathBuf) -> PathBuf {
    if !candidate.exists() {
        return candidate;
    }

    let stem = candidate
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();
    let extension = candidate
        .extension()
        .map(|ext| ext.to_string_lossy().into_owned());

    let mut counter: u32 = 1;
    loop {
        let name = match &extension {
            Some(ext) => format!("{} ({}).{}", stem, counter, ext),
            None => format!("{} ({})", stem, counter),
        };
        let probe = candidate.with_file_name(name);
        if !probe.exists() {
            return probe;
        }
        counter += 1;
    }
}

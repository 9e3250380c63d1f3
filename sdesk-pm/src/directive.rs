use std::{fs, path::Path};

use tracing::debug;

use crate::{PmError, PmResult};

/// Prefix that turns a line into a removal request
pub const REMOVE_MARKER: &str = "[remove]";

/// One line of the base package list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directive {
    raw_text: String,
    is_removal: bool,
    package_name: String,
}

impl Directive {
    /// Parse a single line.
    ///
    /// Returns `None` for blank lines and for a bare removal marker. Anything
    /// else becomes a directive: a line without the marker is an install target
    /// whatever it contains.
    pub fn parse(line: &str) -> Option<Self> {
        let trimmed = line.trim();

        let (is_removal, name) = match trimmed.strip_prefix(REMOVE_MARKER) {
            Some(rest) => (true, rest.trim()),
            None => (false, trimmed),
        };

        if name.is_empty() {
            return None;
        }

        Some(Self {
            raw_text: line.to_string(),
            is_removal,
            package_name: name.to_string(),
        })
    }

    pub fn raw_text(&self) -> &str {
        &self.raw_text
    }

    pub fn is_removal(&self) -> bool {
        self.is_removal
    }

    pub fn package_name(&self) -> &str {
        &self.package_name
    }
}

/// Parse every line of `content`, in order, dropping the ones without a directive.
pub fn parse_directives(content: &str) -> Vec<Directive> {
    content
        .lines()
        .enumerate()
        .filter_map(|(no, line)| {
            let directive = Directive::parse(line);
            if directive.is_none() && !line.trim().is_empty() {
                debug!("Line {} has no package name: {line:?}", no + 1);
            }
            directive
        })
        .collect()
}

/// Read and parse the base package list at `path`.
pub fn read_directives(path: &Path) -> PmResult<Vec<Directive>> {
    let content = fs::read_to_string(path).map_err(|e| PmError::ReadDirectives {
        path: path.to_path_buf(),
        source: e,
    })?;

    Ok(parse_directives(&content))
}

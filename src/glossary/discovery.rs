//! Project and glossary discovery.
//!
//! The repository layout is the registry:
//!
//! ```text
//! <root>/projects/<project>/glossary/<name>.<src>.<tgt>.<yml|csv|tsv>
//! ```

use crate::error::{GlossaryError, Result};
use crate::glossary::record::GlossaryKey;
use crate::glossary::source::SourceFormat;
use globset::{Glob, GlobMatcher};
use ignore::WalkBuilder;
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

pub const PROJECTS_DIR: &str = "projects";
pub const GLOSSARY_DIR: &str = "glossary";

/// A glossary source file found in a project
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlossaryFile {
    pub project: String,
    pub path: PathBuf,
    pub key: GlossaryKey,
    pub format: SourceFormat,
}

impl GlossaryFile {
    pub fn file_name(&self) -> String {
        glossary_file_name(&self.key, self.format)
    }
}

/// Result of scanning a repository
#[derive(Debug, Default)]
pub struct Discovery {
    /// Well-formed glossary files, sorted by project then file name
    pub files: Vec<GlossaryFile>,
    /// Files with a glossary extension whose name does not parse
    pub malformed: Vec<PathBuf>,
}

fn filename_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(?P<name>.+)\.(?P<src>[^.\s]+)\.(?P<tgt>[^.\s]+)\.(?P<ext>yml|csv|tsv)$")
            .expect("static glossary filename pattern")
    })
}

fn source_glob() -> &'static GlobMatcher {
    static GLOB: OnceLock<GlobMatcher> = OnceLock::new();
    GLOB.get_or_init(|| {
        Glob::new("*.{yml,csv,tsv}")
            .expect("static glossary glob")
            .compile_matcher()
    })
}

/// Parse `<name>.<src>.<tgt>.<ext>` into a glossary identity and format
pub fn parse_glossary_filename(path: &Path) -> Result<(GlossaryKey, SourceFormat)> {
    let malformed = || GlossaryError::MalformedGlossaryFilename {
        path: path.to_path_buf(),
    };

    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(malformed)?;
    let caps = filename_regex().captures(file_name).ok_or_else(malformed)?;
    let format = SourceFormat::from_extension(&caps["ext"]).ok_or_else(malformed)?;

    Ok((GlossaryKey::new(&caps["name"], &caps["src"], &caps["tgt"]), format))
}

/// File name for a glossary identity in the given format
pub fn glossary_file_name(key: &GlossaryKey, format: SourceFormat) -> String {
    format!(
        "{}.{}.{}.{}",
        key.name,
        key.source_language,
        key.target_language,
        format.extension()
    )
}

pub fn projects_dir(root: &Path) -> PathBuf {
    root.join(PROJECTS_DIR)
}

pub fn project_glossary_dir(root: &Path, project: &str) -> PathBuf {
    projects_dir(root).join(project).join(GLOSSARY_DIR)
}

/// List project directory names, sorted
pub fn list_projects(root: &Path) -> Result<Vec<String>> {
    let dir = projects_dir(root);
    if !dir.is_dir() {
        return Ok(Vec::new());
    }

    let mut projects = Vec::new();
    for entry in fs::read_dir(&dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_dir() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        if !name.starts_with('.') {
            projects.push(name);
        }
    }

    projects.sort();
    Ok(projects)
}

/// Walk `root/projects/*/glossary/` and resolve every glossary source file
pub fn discover(root: &Path) -> Result<Discovery> {
    let projects = projects_dir(root);
    if !projects.is_dir() {
        tracing::debug!(path = %projects.display(), "no projects directory");
        return Ok(Discovery::default());
    }

    let walker = WalkBuilder::new(&projects)
        .standard_filters(false)
        .hidden(true)
        .max_depth(Some(3))
        .sort_by_file_name(|a, b| a.cmp(b))
        .build();

    let mut discovery = Discovery::default();

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                tracing::warn!("skipping unreadable entry: {err}");
                continue;
            }
        };
        if !entry.file_type().is_some_and(|t| t.is_file()) {
            continue;
        }

        let path = entry.path();
        let Ok(rel) = path.strip_prefix(&projects) else {
            continue;
        };
        let parts: Vec<_> = rel.components().collect();
        if parts.len() != 3 || parts[1].as_os_str() != GLOSSARY_DIR {
            continue;
        }
        if !source_glob().is_match(parts[2].as_os_str()) {
            continue;
        }

        let project = parts[0].as_os_str().to_string_lossy().into_owned();
        match parse_glossary_filename(path) {
            Ok((key, format)) => discovery.files.push(GlossaryFile {
                project,
                path: path.to_path_buf(),
                key,
                format,
            }),
            Err(_) => discovery.malformed.push(path.to_path_buf()),
        }
    }

    Ok(discovery)
}

/// Find the file for a glossary identity, optionally within one project
pub fn find_glossary(
    root: &Path,
    key: &GlossaryKey,
    project: Option<&str>,
) -> Result<GlossaryFile> {
    let mut matches: Vec<GlossaryFile> = discover(root)?
        .files
        .into_iter()
        .filter(|f| &f.key == key)
        .filter(|f| project.is_none_or(|p| f.project == p))
        .collect();

    match matches.len() {
        0 => Err(GlossaryError::UnknownGlossary(key.to_string())),
        1 => Ok(matches.remove(0)),
        _ => Err(GlossaryError::AmbiguousGlossary {
            name: key.to_string(),
            projects: matches
                .iter()
                .map(|f| f.project.as_str())
                .collect::<Vec<_>>()
                .join(", "),
        }),
    }
}

//! Project lifecycle: create, register, unregister.
//!
//! Projects exist only as directories; there is no manifest to keep in sync.

use crate::error::{GlossaryError, Result};
use crate::glossary::discovery::{
    GlossaryFile, glossary_file_name, parse_glossary_filename, project_glossary_dir, projects_dir,
};
use crate::glossary::record::GlossaryKey;
use crate::glossary::source::{SourceFormat, read_rows, write_rows};
use std::fs;
use std::path::{Component, Path, PathBuf};

/// Project names become directory names: one normal path component, not hidden
fn validate_project_name(project: &str) -> Result<()> {
    let mut components = Path::new(project).components();
    let single_normal = matches!(components.next(), Some(Component::Normal(_)))
        && components.next().is_none();

    if project.is_empty() || project.starts_with('.') || !single_normal {
        return Err(GlossaryError::InvalidProjectName(project.to_string()));
    }
    Ok(())
}

pub fn project_dir(root: &Path, project: &str) -> Result<PathBuf> {
    validate_project_name(project)?;
    Ok(projects_dir(root).join(project))
}

/// Create an empty project with its `glossary/` folder
pub fn create_project(root: &Path, project: &str) -> Result<PathBuf> {
    let dir = project_dir(root, project)?;
    if dir.exists() {
        return Err(GlossaryError::ProjectExists(project.to_string()));
    }

    let glossary_dir = project_glossary_dir(root, project);
    fs::create_dir_all(&glossary_dir)?;
    tracing::info!(project, "project created");
    Ok(glossary_dir)
}

/// Create an empty glossary file, creating the project if needed
pub fn create_glossary(
    root: &Path,
    project: &str,
    key: &GlossaryKey,
    format: SourceFormat,
) -> Result<GlossaryFile> {
    validate_project_name(project)?;
    let glossary_dir = project_glossary_dir(root, project);
    let path = glossary_dir.join(glossary_file_name(key, format));

    // Round-trip the generated name so keys with stray dots are rejected
    let (parsed, _) = parse_glossary_filename(&path)?;
    if &parsed != key {
        return Err(GlossaryError::MalformedGlossaryFilename { path });
    }
    ensure_absent(&glossary_dir, key)?;

    fs::create_dir_all(&glossary_dir)?;
    write_rows(&path, format, &[])?;
    tracing::info!(project, glossary = %key, "glossary created");

    Ok(GlossaryFile {
        project: project.to_string(),
        path,
        key: key.clone(),
        format,
    })
}

/// A key may exist in one format only per project
fn ensure_absent(glossary_dir: &Path, key: &GlossaryKey) -> Result<()> {
    for format in SourceFormat::ALL {
        let path = glossary_dir.join(glossary_file_name(key, format));
        if path.exists() {
            return Err(GlossaryError::GlossaryExists { path });
        }
    }
    Ok(())
}

/// Copy an existing glossary file into a project.
///
/// The file must follow the naming convention and parse cleanly.
pub fn register(root: &Path, project: &str, source: &Path) -> Result<GlossaryFile> {
    validate_project_name(project)?;
    let (key, format) = parse_glossary_filename(source)?;
    read_rows(source, format)?;

    let glossary_dir = project_glossary_dir(root, project);
    ensure_absent(&glossary_dir, &key)?;
    let path = glossary_dir.join(glossary_file_name(&key, format));

    fs::create_dir_all(&glossary_dir)?;
    fs::copy(source, &path)?;
    tracing::info!(project, glossary = %key, "glossary registered");

    Ok(GlossaryFile {
        project: project.to_string(),
        path,
        key,
        format,
    })
}

/// Remove a whole project, or a single glossary file inside it
pub fn unregister(root: &Path, project: &str, glossary: Option<&GlossaryKey>) -> Result<()> {
    let dir = project_dir(root, project)?;
    if !dir.is_dir() {
        return Err(GlossaryError::UnknownProject(project.to_string()));
    }

    match glossary {
        None => {
            fs::remove_dir_all(&dir)?;
            tracing::info!(project, "project unregistered");
        }
        Some(key) => {
            let glossary_dir = project_glossary_dir(root, project);
            let mut removed = false;
            for format in SourceFormat::ALL {
                let path = glossary_dir.join(glossary_file_name(key, format));
                if path.exists() {
                    fs::remove_file(&path)?;
                    removed = true;
                }
            }
            if !removed {
                return Err(GlossaryError::UnknownGlossary(key.to_string()));
            }
            tracing::info!(project, glossary = %key, "glossary unregistered");
        }
    }

    Ok(())
}

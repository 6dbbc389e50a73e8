//! Shared fixtures for integration tests.

#![allow(dead_code)]

use glossa::glossary::{GlossaryKey, GlossarySource, find_glossary};
use glossa::index::{RebuildSummary, rebuild};
use glossa::query::{LookupHit, LookupRequest, lookup};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A throwaway glossary repository with its own index directory
pub struct Repo {
    dir: TempDir,
}

impl Repo {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        fs::create_dir_all(dir.path().join("repo/projects")).unwrap();
        Self { dir }
    }

    pub fn root(&self) -> PathBuf {
        self.dir.path().join("repo")
    }

    pub fn index_dir(&self) -> PathBuf {
        self.dir.path().join("index")
    }

    /// Write a glossary file as `projects/<project>/glossary/<file_name>`
    pub fn write(&self, project: &str, file_name: &str, content: &str) -> PathBuf {
        let dir = self.root().join("projects").join(project).join("glossary");
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join(file_name);
        fs::write(&path, content).unwrap();
        path
    }

    pub fn rebuild(&self) -> RebuildSummary {
        rebuild(&self.root(), &self.index_dir()).expect("rebuild failed")
    }

    pub fn lookup(&self, request: &LookupRequest) -> Vec<LookupHit> {
        lookup(&self.index_dir(), request).expect("lookup failed")
    }

    /// Open a glossary by `<name>.<src>.<tgt>`
    pub fn open(&self, glossary: &str) -> GlossarySource {
        let key: GlossaryKey = glossary.parse().unwrap();
        GlossarySource::open(find_glossary(&self.root(), &key, None).unwrap()).unwrap()
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }
}

/// (glossary, source, target) of each hit, in order
pub fn summarize(hits: &[LookupHit]) -> Vec<(String, String, String)> {
    hits.iter()
        .map(|h| {
            (
                h.record.glossary_name.clone(),
                h.record.source_term.clone(),
                h.record.target_term.clone(),
            )
        })
        .collect()
}

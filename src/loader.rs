//! Folder loader.
//!
//! Walks a folder with `walkdir`, keeps files whose name matches the
//! include globs, and turns each `.txt`/`.md` file into a [`Document`]
//! whose text starts with a `📄 {file name}:` title line. Files with any
//! other extension are reported as skipped.

use anyhow::{bail, Context, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

use finrag_core::models::Document;

use crate::config::LoaderConfig;

const SUPPORTED_EXTENSIONS: &[&str] = &["txt", "md"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub reason: String,
}

#[derive(Debug, Default)]
pub struct LoadedFolder {
    pub documents: Vec<Document>,
    pub skipped: Vec<SkippedFile>,
}

/// Load every matching file under `folder`.
///
/// `patterns` overrides `config.include_globs` when non-empty. Patterns
/// match paths relative to `folder`.
///
/// # Errors
///
/// Fails when the folder does not exist, is not a directory, or no file
/// matches.
pub fn load_folder(folder: &Path, patterns: &[String], config: &LoaderConfig) -> Result<LoadedFolder> {
    if !folder.exists() {
        bail!("Folder does not exist: {}", folder.display());
    }
    if !folder.is_dir() {
        bail!("Not a folder: {}", folder.display());
    }

    let globs = if patterns.is_empty() {
        config.include_globs.as_slice()
    } else {
        patterns
    };
    let include_set = build_globset(globs)?;

    let mut walker = WalkDir::new(folder).sort_by_file_name();
    if !config.recursive {
        walker = walker.max_depth(1);
    }

    let mut loaded = LoadedFolder::default();
    let mut matched = 0usize;

    for entry in walker {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        let relative = path.strip_prefix(folder).unwrap_or(path);
        let rel_str = relative.to_string_lossy().replace('\\', "/");

        if !include_set.is_match(&rel_str) {
            continue;
        }
        matched += 1;

        let extension = path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        if !SUPPORTED_EXTENSIONS.contains(&extension.as_str()) {
            warn!(file = %rel_str, "skipping unsupported file type");
            loaded.skipped.push(SkippedFile {
                path: path.to_path_buf(),
                reason: format!("unsupported file type '.{}'", extension),
            });
            continue;
        }

        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                warn!(file = %rel_str, error = %e, "skipping unreadable file");
                loaded.skipped.push(SkippedFile {
                    path: path.to_path_buf(),
                    reason: e.to_string(),
                });
                continue;
            }
        };

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| rel_str.clone());
        debug!(file = %rel_str, chars = content.chars().count(), "loaded file");
        loaded
            .documents
            .push(Document::from_file(rel_str.clone(), &file_name, &content));
    }

    if matched == 0 {
        bail!(
            "No files matching {} found in {}",
            globs.join(", "),
            folder.display()
        );
    }

    Ok(loaded)
}

/// Read a single file as a document with its title line.
pub fn load_file(path: &Path) -> Result<Document> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string());
    Ok(Document::from_file(path.display().to_string(), &file_name, &content))
}

fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        builder.add(Glob::new(pattern).with_context(|| format!("Invalid pattern: {}", pattern))?);
    }
    Ok(builder.build()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn folder_with(files: &[(&str, &str)]) -> TempDir {
        let tmp = TempDir::new().unwrap();
        for (name, body) in files {
            let path = tmp.path().join(name);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).unwrap();
            }
            fs::write(path, body).unwrap();
        }
        tmp
    }

    #[test]
    fn test_loads_txt_and_md_with_title() {
        let tmp = folder_with(&[
            ("b.md", "# Banco B\nLucro de R$ 2 bilhões"),
            ("a.txt", "Receita de R$ 10 milhões"),
        ]);
        let loaded = load_folder(tmp.path(), &[], &LoaderConfig::default()).unwrap();
        assert_eq!(loaded.documents.len(), 2);
        assert!(loaded.skipped.is_empty());

        let first = &loaded.documents[0];
        assert_eq!(first.identifier(), "a.txt");
        assert_eq!(first.raw(), "📄 a.txt:\nReceita de R$ 10 milhões");
        assert_eq!(first.title(), Some("📄 a.txt:"));
    }

    #[test]
    fn test_pattern_override_and_skipped_types() {
        let tmp = folder_with(&[("a.txt", "x"), ("r.pdf", "%PDF"), ("n.csv", "a,b")]);
        let loaded =
            load_folder(tmp.path(), &["*.pdf".to_string()], &LoaderConfig::default()).unwrap();
        assert!(loaded.documents.is_empty());
        assert_eq!(loaded.skipped.len(), 1);
        assert!(loaded.skipped[0].reason.contains(".pdf"));
    }

    #[test]
    fn test_recursion_is_opt_in() {
        let tmp = folder_with(&[("top.txt", "a"), ("sub/deep.txt", "b")]);
        let flat = load_folder(tmp.path(), &[], &LoaderConfig::default()).unwrap();
        assert_eq!(flat.documents.len(), 1);

        let config = LoaderConfig {
            include_globs: vec!["**/*.txt".to_string()],
            recursive: true,
        };
        let deep = load_folder(tmp.path(), &[], &config).unwrap();
        assert_eq!(deep.documents.len(), 2);
    }

    #[test]
    fn test_folder_errors() {
        let tmp = folder_with(&[("a.csv", "x")]);
        let missing = tmp.path().join("nope");
        assert!(load_folder(&missing, &[], &LoaderConfig::default())
            .unwrap_err()
            .to_string()
            .contains("does not exist"));

        let file = tmp.path().join("a.csv");
        assert!(load_folder(&file, &[], &LoaderConfig::default())
            .unwrap_err()
            .to_string()
            .contains("Not a folder"));

        assert!(load_folder(tmp.path(), &[], &LoaderConfig::default())
            .unwrap_err()
            .to_string()
            .contains("No files matching"));
    }
}

//! Discovery of plain-text source documents.

use std::{
    fs,
    path::{Path, PathBuf},
};

use tracing::{debug, trace, warn};

use crate::errors::RagError;
use crate::record::SourceDocument;

/// Lists `*.txt` files directly inside `dir`, sorted by file name.
pub fn text_files_in(dir: impl AsRef<Path>) -> Result<Vec<PathBuf>, std::io::Error> {
    let dir = dir.as_ref();
    trace!("discovery::text_files_in dir={:?}", dir);

    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        let is_txt = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("txt"));
        if is_txt && entry.file_type()?.is_file() {
            files.push(path);
        }
    }
    files.sort();
    debug!("discovery::text_files_in found={}", files.len());
    Ok(files)
}

/// Reads every text file under `source` (a directory or a single file).
///
/// Unreadable files and blank documents are skipped with a warning; a missing
/// source yields an empty list.
pub fn read_documents(source: impl AsRef<Path>) -> Vec<SourceDocument> {
    let source = source.as_ref();
    let paths = if source.is_file() {
        vec![source.to_path_buf()]
    } else {
        match text_files_in(source) {
            Ok(p) => p,
            Err(e) => {
                warn!("cannot list documents under {:?}: {e}", source);
                return Vec::new();
            }
        }
    };

    let mut out = Vec::with_capacity(paths.len());
    for path in paths {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        match fs::read_to_string(&path) {
            Ok(text) if text.trim().is_empty() => {
                warn!("skipping empty document {:?}", path);
            }
            Ok(text) => out.push(SourceDocument { source: name, text }),
            Err(e) => warn!("skipping unreadable document {:?}: {e}", path),
        }
    }
    out
}

/// Like [`read_documents`], but an empty result is an error.
///
/// # Errors
/// [`RagError::EmptyCorpus`] when nothing readable was found.
pub fn load_documents(source: impl AsRef<Path>) -> Result<Vec<SourceDocument>, RagError> {
    let docs = read_documents(&source);
    if docs.is_empty() {
        return Err(RagError::EmptyCorpus {
            path: source.as_ref().to_path_buf(),
        });
    }
    Ok(docs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_sorted_txt_files_only() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("b.txt"), "second").unwrap();
        fs::write(dir.path().join("a.txt"), "first").unwrap();
        fs::write(dir.path().join("notes.md"), "ignored").unwrap();
        fs::write(dir.path().join("blank.txt"), "  \n").unwrap();

        let docs = read_documents(dir.path());
        let names: Vec<&str> = docs.iter().map(|d| d.source.as_str()).collect();
        assert_eq!(names, vec!["a.txt", "b.txt"]);
    }

    #[test]
    fn single_file_source() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("resume.txt");
        fs::write(&path, "Rust engineer").unwrap();

        let docs = load_documents(&path).unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].source, "resume.txt");
    }

    #[test]
    fn missing_source_is_empty_corpus() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_documents(dir.path().join("nope")).unwrap_err();
        assert!(matches!(err, RagError::EmptyCorpus { .. }));
    }
}

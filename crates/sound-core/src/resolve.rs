use std::fs;
use std::path::{Path, PathBuf};

use crate::backend::ResolvedSource;

/// Maps a source string to a playable file.
///
/// Bundled resources are addressed by bare name: `"beep"` and `"beep.wav"`
/// both find `<resource_dir>/beep.wav`. Anything else is tried as a path.
#[derive(Debug, Clone, Default)]
pub struct SourceResolver {
    resource_dir: Option<PathBuf>,
}

impl SourceResolver {
    pub fn new(resource_dir: Option<PathBuf>) -> Self {
        Self { resource_dir }
    }

    pub fn resolve(&self, source: &str) -> Option<ResolvedSource> {
        if source.is_empty() {
            return None;
        }

        if let Some(path) = self.find_bundled(source) {
            return Some(ResolvedSource::Bundled(path));
        }

        let path = Path::new(source);
        if path.is_file() {
            return Some(ResolvedSource::File(path.to_path_buf()));
        }

        None
    }

    fn find_bundled(&self, name: &str) -> Option<PathBuf> {
        let dir = self.resource_dir.as_ref()?;
        if name.contains('/') || name.contains('\\') {
            return None;
        }

        let entries = fs::read_dir(dir).ok()?;
        let mut matches: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.is_file())
            .filter(|path| {
                let file_name = path.file_name().and_then(|n| n.to_str());
                let stem = path.file_stem().and_then(|s| s.to_str());
                file_name == Some(name) || stem == Some(name)
            })
            .collect();

        // read_dir order is unspecified; pick deterministically
        matches.sort();
        matches.into_iter().next()
    }
}

//! Candidate file discovery.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use ignore::WalkBuilder;

use crate::composer::{normalise_path, relative_slash_path};
use crate::config::Config;
use crate::error::Result;

/// Supplies the ordered list of PHP files to diagram.
pub trait FileProvider {
    /// Candidate files, sorted and deduplicated, with every include and
    /// exclude rule already applied.
    fn list(&self) -> Result<Vec<PathBuf>>;
}

/// Lists the PHP files under the enabled category directories of a
/// Laravel project.
#[derive(Debug, Clone)]
pub struct WorkspaceFiles<'a> {
    root: PathBuf,
    config: &'a Config,
}

impl<'a> WorkspaceFiles<'a> {
    pub fn new(root: &Path, config: &'a Config) -> Self {
        Self {
            root: root.to_path_buf(),
            config,
        }
    }

    fn app_dir(&self) -> PathBuf {
        self.root.join(normalise_path(&self.config.app_path))
    }

    fn is_excluded(&self, app_dir: &Path, path: &Path, excluded: &HashSet<String>) -> bool {
        excluded.contains(&relative_slash_path(app_dir, path))
    }
}

impl FileProvider for WorkspaceFiles<'_> {
    fn list(&self) -> Result<Vec<PathBuf>> {
        let app_dir = self.app_dir();
        let excluded: HashSet<String> = self
            .config
            .exclude_files
            .iter()
            .map(|f| f.replace('\\', "/").trim_start_matches("./").to_string())
            .collect();

        let mut files = Vec::new();
        for category in self.config.enabled_categories() {
            let dir = app_dir.join(normalise_path(self.config.directory(category)));
            if !dir.is_dir() {
                tracing::debug!(category = category.key(), dir = %dir.display(), "category directory missing");
                continue;
            }

            let walker = WalkBuilder::new(&dir)
                .standard_filters(false)
                .hidden(true)
                .follow_links(false)
                .build();

            for entry in walker {
                let entry = match entry {
                    Ok(entry) => entry,
                    Err(e) => {
                        tracing::warn!(error = %e, "skipping unreadable directory entry");
                        continue;
                    }
                };
                let path = entry.path();
                if !entry.file_type().is_some_and(|t| t.is_file()) {
                    continue;
                }
                if path.extension().and_then(|e| e.to_str()) != Some("php") {
                    continue;
                }
                if self.is_excluded(&app_dir, path, &excluded) {
                    tracing::debug!(path = %path.display(), "excluded");
                    continue;
                }
                files.push(path.to_path_buf());
            }
        }

        files.sort();
        files.dedup();
        tracing::info!(count = files.len(), "candidate files listed");
        Ok(files)
    }
}

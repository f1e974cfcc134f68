//! Bridge from real filesystem events to the program host.
//!
//! Disk-level changes under the source root are translated into the host's
//! `handle_fs_event` pipeline, so a file saved outside the editor flows
//! through exactly the same settle-then-notify path as a programmatic
//! update.

use std::path::Path;
use std::sync::{Arc, Mutex};

use notify::{EventKind, RecommendedWatcher, RecursiveMode, Watcher};

use crate::host::{FsEventKind, ProgramHost};

/// A running filesystem watcher feeding a shared host.
///
/// Dropping the watcher stops event delivery.
pub struct SourceWatcher {
    _watcher: RecommendedWatcher,
}

impl SourceWatcher {
    /// Watch `root` recursively and forward source-file events to `host`.
    pub fn spawn(root: &Path, host: Arc<Mutex<ProgramHost>>) -> notify::Result<SourceWatcher> {
        let mut watcher =
            notify::recommended_watcher(move |result: notify::Result<notify::Event>| {
                let Ok(event) = result else { return };
                let kind = match event.kind {
                    EventKind::Create(_) => FsEventKind::Created,
                    EventKind::Modify(_) => FsEventKind::Modified,
                    EventKind::Remove(_) => FsEventKind::Removed,
                    _ => return,
                };
                let Ok(mut host) = host.lock() else { return };
                for path in event.paths {
                    if host.config().is_source_file(&path) {
                        host.handle_fs_event(kind, path);
                    }
                }
            })?;
        watcher.watch(root, RecursiveMode::Recursive)?;
        Ok(SourceWatcher { _watcher: watcher })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WorkspaceConfig;
    use crate::vfs::OsVfs;
    use std::path::PathBuf;

    #[test]
    fn spawn_on_real_directory() {
        let dir = tempfile::tempdir().unwrap();
        let config = WorkspaceConfig {
            src_root: dir.path().to_path_buf(),
            ..WorkspaceConfig::default()
        };
        let host = Arc::new(Mutex::new(ProgramHost::new(config, Box::new(OsVfs))));
        let watcher = SourceWatcher::spawn(dir.path(), Arc::clone(&host));
        assert!(watcher.is_ok());
    }

    #[test]
    fn spawn_on_missing_directory_fails() {
        let config = WorkspaceConfig {
            src_root: PathBuf::from("/definitely/not/here"),
            ..WorkspaceConfig::default()
        };
        let host = Arc::new(Mutex::new(ProgramHost::new(config, Box::new(OsVfs))));
        let watcher = SourceWatcher::spawn(Path::new("/definitely/not/here"), host);
        assert!(watcher.is_err());
    }
}

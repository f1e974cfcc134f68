//! Incremental program host.
//!
//! The host owns the root file set, the overlay store, and the current
//! semantic snapshot ([`Program`]). Every mutation entry point follows the
//! same settle-then-notify pipeline: apply the change, rebuild the snapshot
//! (recompiling only files whose text changed), atomically swap the
//! readable `Arc<Program>`, and only then deliver change notifications --
//! so a subscriber querying the program inside its handler always sees a
//! snapshot that already reflects the change.
//!
//! Real filesystem events and programmatic calls go through the same
//! pipeline; callers cannot distinguish a user edit from a disk change.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use rustc_hash::{FxHashMap, FxHashSet};

use flux_parser::Parse;
use flux_types::FileSemantics;

use crate::config::WorkspaceConfig;
use crate::overlay::{self, OverlayFile};
use crate::vfs::Vfs;

/// One compiled file: source text, syntax tree, and semantic tables.
pub struct SourceUnit {
    /// The compiled path (may be an overlay path).
    pub path: PathBuf,
    /// Full source text the unit was compiled from.
    pub text: String,
    /// The parse result (lossless CST + errors).
    pub parse: Parse,
    /// Per-file semantic tables.
    pub semantics: FileSemantics,
}

impl SourceUnit {
    /// The unit's real path (overlay marker stripped).
    pub fn real_path(&self) -> PathBuf {
        overlay::to_real_file_name(&self.path)
    }
}

/// An immutable semantic snapshot over the compiled file set.
///
/// Snapshots are swapped wholesale behind an `Arc`; readers holding an old
/// snapshot keep a consistent view while the host moves on.
#[derive(Default)]
pub struct Program {
    files: FxHashMap<PathBuf, Arc<SourceUnit>>,
}

impl Program {
    /// Look up a compiled unit by its exact path.
    pub fn file(&self, path: &Path) -> Option<&Arc<SourceUnit>> {
        self.files.get(path)
    }

    /// Look up a unit by logical identity, preferring the overlay version
    /// when both the overlay and the disk file are compiled.
    pub fn file_by_logical(&self, path: &Path) -> Option<&Arc<SourceUnit>> {
        let overlay_path = overlay::to_overlay_file_name(path);
        self.files
            .get(&overlay_path)
            .or_else(|| self.files.get(path))
    }

    /// Iterate all compiled units.
    pub fn files(&self) -> impl Iterator<Item = &Arc<SourceUnit>> {
        self.files.values()
    }

    /// Number of compiled units.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Whether the snapshot has no compiled units.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

/// Change kind delivered to file-level watch hooks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileWatchKind {
    Created,
    Changed,
}

/// A filesystem event translated into host terms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FsEventKind {
    Created,
    Modified,
    Removed,
}

/// Payload delivered to file-change subscribers.
#[derive(Debug, Clone, PartialEq)]
pub struct FileChangeEvent {
    pub path: PathBuf,
}

/// Handler invoked once per changed path, after the snapshot has settled.
/// The settled program is passed alongside so handlers need not re-enter
/// the host.
pub type FileChangeHandler = Box<dyn Fn(&FileChangeEvent, &Program) + Send>;

/// Callback invoked when an overlay matching a watch hook changes.
pub type WatchCallback = Box<dyn Fn(&Path, FileWatchKind) + Send>;

/// Identifies a file-change subscription for later removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscriptionId(u64);

/// Identifies a watch hook for later removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WatchId(u64);

enum WatchTarget {
    /// Fires on any overlay path containing the watched directory.
    Directory(PathBuf),
    /// Fires only on an exact overlay path match.
    File(PathBuf),
}

struct WatchHook {
    id: WatchId,
    target: WatchTarget,
    callback: WatchCallback,
}

/// A host-level anomaly: logged, never fatal.
#[derive(Debug, Clone, PartialEq)]
pub struct HostLogEntry {
    pub path: PathBuf,
    pub message: String,
}

/// The incremental program host.
pub struct ProgramHost {
    config: WorkspaceConfig,
    vfs: Box<dyn Vfs>,
    /// Ordered root set; replace-on-add keeps most recently touched last.
    roots: Vec<PathBuf>,
    /// Overlay store keyed by overlay path.
    overlays: FxHashMap<PathBuf, OverlayFile>,
    program: Arc<Program>,
    hooks: Vec<WatchHook>,
    subscribers: Vec<(SubscriptionId, FileChangeHandler)>,
    /// Paths changed since the last settle point.
    pending: Vec<PathBuf>,
    log: Vec<HostLogEntry>,
    next_watch: u64,
    next_subscription: u64,
}

impl ProgramHost {
    /// Create a host over the given configuration and file access layer.
    pub fn new(config: WorkspaceConfig, vfs: Box<dyn Vfs>) -> Self {
        Self {
            config,
            vfs,
            roots: Vec::new(),
            overlays: FxHashMap::default(),
            program: Arc::new(Program::default()),
            hooks: Vec::new(),
            subscribers: Vec::new(),
            pending: Vec::new(),
            log: Vec::new(),
            next_watch: 0,
            next_subscription: 0,
        }
    }

    pub fn config(&self) -> &WorkspaceConfig {
        &self.config
    }

    /// Replace the workspace configuration.
    ///
    /// Intended for the window between construction and the first file
    /// registration (e.g. once the editor reports the workspace root);
    /// already-compiled units are left as they are.
    pub fn set_config(&mut self, config: WorkspaceConfig) {
        self.config = config;
    }

    /// The current root file set, in order.
    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    /// Insert paths into the root set with replace-on-add ordering: an
    /// added path first removes any existing equal entry, then appends, so
    /// the most recently touched file sorts last.
    pub fn add_files(&mut self, paths: &[PathBuf]) {
        for path in paths {
            self.roots.retain(|r| r != path);
            self.roots.push(path.clone());
        }
        self.rebuild();
    }

    /// Remove paths from the root set.
    pub fn remove_files(&mut self, paths: &[PathBuf]) {
        self.roots.retain(|r| !paths.contains(r));
        self.rebuild();
    }

    /// Upsert overlay content for a logical file.
    ///
    /// The overlay is stored under its derived path and always compiled,
    /// whether or not the real path was ever added as a root. Watch hooks
    /// fire synchronously (Created on first introduction, Changed after),
    /// then the snapshot settles, then change subscribers are notified.
    pub fn update_overlay(&mut self, path: &Path, text: &str) {
        let overlay_path = overlay::to_overlay_file_name(path);
        let created = !self.overlays.contains_key(&overlay_path);
        self.overlays.insert(
            overlay_path.clone(),
            OverlayFile {
                path: overlay_path.clone(),
                text: text.to_string(),
                exists: true,
            },
        );

        let kind = if created {
            FileWatchKind::Created
        } else {
            FileWatchKind::Changed
        };
        self.fire_watch_hooks(&overlay_path, kind);

        self.pending.push(overlay_path);
        self.rebuild();
        self.notify();
    }

    /// The latest fully-settled snapshot. Never triggers a rebuild; the
    /// mutation entry points keep the value current.
    pub fn program(&self) -> Arc<Program> {
        Arc::clone(&self.program)
    }

    /// Register a file-change handler. Handlers run strictly after the
    /// snapshot has incorporated the change they are being told about.
    pub fn subscribe_file_change(&mut self, handler: FileChangeHandler) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.subscribers.push((id, handler));
        id
    }

    /// Remove a file-change subscription.
    pub fn unsubscribe(&mut self, id: SubscriptionId) {
        self.subscribers.retain(|(sub_id, _)| *sub_id != id);
    }

    /// Watch a directory: the callback fires for any overlay change whose
    /// path contains the directory.
    pub fn watch_directory(&mut self, path: impl Into<PathBuf>, callback: WatchCallback) -> WatchId {
        self.insert_hook(WatchTarget::Directory(path.into()), callback)
    }

    /// Watch a single file: the callback fires only on an exact overlay
    /// path match.
    pub fn watch_file(&mut self, path: impl Into<PathBuf>, callback: WatchCallback) -> WatchId {
        self.insert_hook(WatchTarget::File(path.into()), callback)
    }

    /// Remove a watch hook.
    pub fn remove_watch(&mut self, id: WatchId) {
        self.hooks.retain(|h| h.id != id);
    }

    /// Ingest a real filesystem event through the same pipeline as
    /// programmatic calls.
    pub fn handle_fs_event(&mut self, kind: FsEventKind, path: PathBuf) {
        match kind {
            FsEventKind::Created => self.add_files(std::slice::from_ref(&path)),
            FsEventKind::Removed => self.remove_files(std::slice::from_ref(&path)),
            FsEventKind::Modified => {
                self.pending.push(path);
                self.rebuild();
                self.notify();
            }
        }
    }

    /// Drain accumulated host-level anomalies (unreadable files, parse
    /// failures in tracked files).
    pub fn take_log(&mut self) -> Vec<HostLogEntry> {
        std::mem::take(&mut self.log)
    }

    fn insert_hook(&mut self, target: WatchTarget, callback: WatchCallback) -> WatchId {
        let id = WatchId(self.next_watch);
        self.next_watch += 1;
        self.hooks.push(WatchHook {
            id,
            target,
            callback,
        });
        id
    }

    fn fire_watch_hooks(&self, changed: &Path, kind: FileWatchKind) {
        let changed_str = changed.to_string_lossy();
        for hook in &self.hooks {
            let matches = match &hook.target {
                WatchTarget::Directory(dir) => {
                    changed_str.contains(&*dir.to_string_lossy())
                }
                WatchTarget::File(file) => file.as_path() == changed,
            };
            if matches {
                (hook.callback)(changed, kind);
            }
        }
    }

    /// Recompute the snapshot, recompiling only files whose text changed.
    ///
    /// Unreadable paths are logged and excluded; a malformed file never
    /// aborts the cycle -- its parse errors ride along inside the unit and
    /// are logged once per recompilation.
    fn rebuild(&mut self) {
        let mut targets: Vec<PathBuf> = Vec::new();
        let mut seen: FxHashSet<PathBuf> = FxHashSet::default();
        for path in self.roots.iter().chain(self.overlays.keys()) {
            if seen.insert(path.clone()) {
                targets.push(path.clone());
            }
        }

        let mut files: FxHashMap<PathBuf, Arc<SourceUnit>> = FxHashMap::default();
        for path in targets {
            let text = if let Some(overlay) = self.overlays.get(&path) {
                overlay.text.clone()
            } else {
                match self.vfs.read(&path) {
                    Ok(text) => text,
                    Err(err) => {
                        self.log.push(HostLogEntry {
                            path: path.clone(),
                            message: format!("failed to read file: {err}"),
                        });
                        continue;
                    }
                }
            };

            // Incremental reuse: identical text keeps the compiled unit.
            if let Some(unit) = self.program.files.get(&path) {
                if unit.text == text {
                    files.insert(path, Arc::clone(unit));
                    continue;
                }
            }

            let parse = flux_parser::parse(&text);
            if !parse.errors().is_empty() {
                self.log.push(HostLogEntry {
                    path: path.clone(),
                    message: format!("{} parse error(s)", parse.errors().len()),
                });
            }
            let semantics = FileSemantics::analyze(&parse);
            files.insert(
                path.clone(),
                Arc::new(SourceUnit {
                    path,
                    text,
                    parse,
                    semantics,
                }),
            );
        }

        self.program = Arc::new(Program { files });
    }

    /// Deliver one notification round: every path changed since the last
    /// settle point, addressed individually per path, against the settled
    /// snapshot.
    fn notify(&mut self) {
        if self.pending.is_empty() {
            return;
        }
        let pending = std::mem::take(&mut self.pending);
        let mut seen: FxHashSet<PathBuf> = FxHashSet::default();
        let program = Arc::clone(&self.program);
        for path in pending {
            if !seen.insert(path.clone()) {
                continue;
            }
            let event = FileChangeEvent { path };
            for (_, handler) in &self.subscribers {
                handler(&event, &program);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vfs::MemoryVfs;
    use std::sync::Mutex;

    fn host_with(files: &[(&str, &str)]) -> (ProgramHost, MemoryVfs) {
        let vfs = MemoryVfs::new();
        for (path, text) in files {
            vfs.insert(*path, *text);
        }
        let config = WorkspaceConfig {
            src_root: PathBuf::from("/ws/src"),
            ..WorkspaceConfig::default()
        };
        let host = ProgramHost::new(config, Box::new(vfs.clone()));
        (host, vfs)
    }

    #[test]
    fn add_files_compiles_them() {
        let (mut host, _vfs) = host_with(&[("/ws/src/a.ts", "const x = 1;")]);
        host.add_files(&[PathBuf::from("/ws/src/a.ts")]);

        let program = host.program();
        let unit = program.file(Path::new("/ws/src/a.ts")).expect("unit");
        assert_eq!(unit.text, "const x = 1;");
    }

    #[test]
    fn replace_on_add_keeps_most_recent_last() {
        let (mut host, _vfs) = host_with(&[
            ("/ws/src/a.ts", ""),
            ("/ws/src/b.ts", ""),
        ]);
        host.add_files(&[PathBuf::from("/ws/src/a.ts"), PathBuf::from("/ws/src/b.ts")]);
        host.add_files(&[PathBuf::from("/ws/src/a.ts")]);

        assert_eq!(
            host.roots(),
            &[PathBuf::from("/ws/src/b.ts"), PathBuf::from("/ws/src/a.ts")]
        );
    }

    #[test]
    fn remove_files_drops_units() {
        let (mut host, _vfs) = host_with(&[("/ws/src/a.ts", "")]);
        host.add_files(&[PathBuf::from("/ws/src/a.ts")]);
        assert_eq!(host.program().len(), 1);

        host.remove_files(&[PathBuf::from("/ws/src/a.ts")]);
        assert!(host.program().is_empty());
    }

    #[test]
    fn unreadable_root_is_logged_not_fatal() {
        let (mut host, _vfs) = host_with(&[("/ws/src/ok.ts", "")]);
        host.add_files(&[
            PathBuf::from("/ws/src/missing.ts"),
            PathBuf::from("/ws/src/ok.ts"),
        ]);

        let program = host.program();
        assert!(program.file(Path::new("/ws/src/missing.ts")).is_none());
        assert!(program.file(Path::new("/ws/src/ok.ts")).is_some());

        let log = host.take_log();
        assert!(log.iter().any(|e| e.path.ends_with("missing.ts")));
    }

    #[test]
    fn overlay_becomes_effective_root() {
        let (mut host, _vfs) = host_with(&[]);
        host.update_overlay(Path::new("/ws/src/a.ts"), "const y = 2;");

        let program = host.program();
        // The overlay is compiled under its derived path.
        let unit = program
            .file(Path::new("/ws/src/a.flux-buf.ts"))
            .expect("overlay unit");
        assert_eq!(unit.text, "const y = 2;");
        assert_eq!(unit.real_path(), PathBuf::from("/ws/src/a.ts"));
        // Logical lookup by real path resolves to the overlay.
        assert!(program.file_by_logical(Path::new("/ws/src/a.ts")).is_some());
    }

    #[test]
    fn overlay_shadows_disk_on_logical_lookup() {
        let (mut host, _vfs) = host_with(&[("/ws/src/a.ts", "const old = 1;")]);
        host.add_files(&[PathBuf::from("/ws/src/a.ts")]);
        host.update_overlay(Path::new("/ws/src/a.ts"), "const new_ = 2;");

        let program = host.program();
        // Both compiled units coexist.
        assert_eq!(program.len(), 2);
        let logical = program
            .file_by_logical(Path::new("/ws/src/a.ts"))
            .expect("logical");
        assert_eq!(logical.text, "const new_ = 2;");
        // Exact lookup still reaches the disk unit.
        assert_eq!(
            program.file(Path::new("/ws/src/a.ts")).unwrap().text,
            "const old = 1;"
        );
    }

    #[test]
    fn settle_then_notify_ordering() {
        // The §8-style ordering property: inside a subscriber, the passed
        // program must already reflect the overlay content.
        let (mut host, _vfs) = host_with(&[]);
        let observed: Arc<Mutex<Vec<(PathBuf, Option<String>)>>> =
            Arc::new(Mutex::new(Vec::new()));
        let observed_in_handler = Arc::clone(&observed);

        host.subscribe_file_change(Box::new(move |event, program| {
            let text = program.file(&event.path).map(|u| u.text.clone());
            observed_in_handler
                .lock()
                .unwrap()
                .push((event.path.clone(), text));
        }));

        host.update_overlay(Path::new("/ws/src/models/app.ts"), "export default {};");

        let observed = observed.lock().unwrap();
        assert_eq!(observed.len(), 1);
        let (path, text) = &observed[0];
        assert_eq!(path, &PathBuf::from("/ws/src/models/app.flux-buf.ts"));
        assert_eq!(text.as_deref(), Some("export default {};"));
    }

    #[test]
    fn unsubscribe_stops_notifications() {
        let (mut host, _vfs) = host_with(&[]);
        let count = Arc::new(Mutex::new(0usize));
        let count_in_handler = Arc::clone(&count);
        let id = host.subscribe_file_change(Box::new(move |_event, _program| {
            *count_in_handler.lock().unwrap() += 1;
        }));

        host.update_overlay(Path::new("/ws/src/a.ts"), "1;");
        host.unsubscribe(id);
        host.update_overlay(Path::new("/ws/src/a.ts"), "2;");

        assert_eq!(*count.lock().unwrap(), 1);
    }

    #[test]
    fn watch_hooks_fire_with_created_then_changed() {
        let (mut host, _vfs) = host_with(&[]);
        let events: Arc<Mutex<Vec<(PathBuf, FileWatchKind)>>> =
            Arc::new(Mutex::new(Vec::new()));

        let dir_events = Arc::clone(&events);
        host.watch_directory(
            "/ws/src",
            Box::new(move |path, kind| {
                dir_events.lock().unwrap().push((path.to_path_buf(), kind));
            }),
        );

        host.update_overlay(Path::new("/ws/src/a.ts"), "1;");
        host.update_overlay(Path::new("/ws/src/a.ts"), "2;");

        let events = events.lock().unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].1, FileWatchKind::Created);
        assert_eq!(events[1].1, FileWatchKind::Changed);
    }

    #[test]
    fn file_watch_requires_exact_match() {
        let (mut host, _vfs) = host_with(&[]);
        let hits = Arc::new(Mutex::new(0usize));

        let exact_hits = Arc::clone(&hits);
        host.watch_file(
            "/ws/src/a.flux-buf.ts",
            Box::new(move |_path, _kind| {
                *exact_hits.lock().unwrap() += 1;
            }),
        );

        host.update_overlay(Path::new("/ws/src/a.ts"), "1;");
        host.update_overlay(Path::new("/ws/src/b.ts"), "1;");

        assert_eq!(*hits.lock().unwrap(), 1);
    }

    #[test]
    fn incremental_rebuild_reuses_unchanged_units() {
        let (mut host, _vfs) = host_with(&[("/ws/src/a.ts", "const x = 1;")]);
        host.add_files(&[PathBuf::from("/ws/src/a.ts")]);
        let before = Arc::as_ptr(host.program().file(Path::new("/ws/src/a.ts")).unwrap());

        // An unrelated overlay update must not recompile a.ts.
        host.update_overlay(Path::new("/ws/src/b.ts"), "const y = 2;");
        let after = Arc::as_ptr(host.program().file(Path::new("/ws/src/a.ts")).unwrap());
        assert_eq!(before, after);
    }

    #[test]
    fn fs_modified_event_notifies_after_settle() {
        let (mut host, vfs) = host_with(&[("/ws/src/a.ts", "const x = 1;")]);
        host.add_files(&[PathBuf::from("/ws/src/a.ts")]);

        let observed: Arc<Mutex<Option<String>>> = Arc::new(Mutex::new(None));
        let observed_in_handler = Arc::clone(&observed);
        host.subscribe_file_change(Box::new(move |event, program| {
            *observed_in_handler.lock().unwrap() =
                program.file(&event.path).map(|u| u.text.clone());
        }));

        vfs.insert("/ws/src/a.ts", "const x = 99;");
        host.handle_fs_event(FsEventKind::Modified, PathBuf::from("/ws/src/a.ts"));

        assert_eq!(
            observed.lock().unwrap().as_deref(),
            Some("const x = 99;")
        );
    }
}

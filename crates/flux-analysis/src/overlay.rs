//! Overlay file naming and storage.
//!
//! An overlay is an in-memory, unsaved version of a file. Its identity is a
//! derived path: the real path with a fixed marker segment inserted before
//! the final extension (`foo.ts` -> `foo.flux-buf.ts`). The marker makes
//! overlay and disk versions of the same logical file distinct compiled
//! units, while the real path stays recoverable for diagnostic attribution.

use std::path::{Path, PathBuf};

/// Marker segment inserted before the extension of overlay paths.
pub const OVERLAY_MARKER: &str = ".flux-buf";

/// An in-memory overlay of a file's content.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayFile {
    /// The derived overlay path (contains [`OVERLAY_MARKER`]).
    pub path: PathBuf,
    /// The overlay's full text.
    pub text: String,
    /// Existence flag; overlays are never written to disk.
    pub exists: bool,
}

/// Derive the overlay path for a real path.
///
/// Idempotent: a path already carrying the marker is returned unchanged.
pub fn to_overlay_file_name(path: &Path) -> PathBuf {
    let s = path.to_string_lossy();
    if s.contains(OVERLAY_MARKER) {
        return path.to_path_buf();
    }
    match s.rfind('.') {
        Some(idx) => PathBuf::from(format!("{}{}{}", &s[..idx], OVERLAY_MARKER, &s[idx..])),
        None => PathBuf::from(format!("{}{}", s, OVERLAY_MARKER)),
    }
}

/// Recover the real path from an overlay path.
///
/// Paths without the marker are returned unchanged.
pub fn to_real_file_name(path: &Path) -> PathBuf {
    let s = path.to_string_lossy();
    if s.contains(OVERLAY_MARKER) {
        PathBuf::from(s.replacen(OVERLAY_MARKER, "", 1))
    } else {
        path.to_path_buf()
    }
}

/// Whether a path is an overlay path.
pub fn is_overlay_file_name(path: &Path) -> bool {
    path.to_string_lossy().contains(OVERLAY_MARKER)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overlay_name_inserts_marker_before_extension() {
        assert_eq!(
            to_overlay_file_name(Path::new("/src/models/app.ts")),
            PathBuf::from("/src/models/app.flux-buf.ts")
        );
        assert_eq!(
            to_overlay_file_name(Path::new("/src/pages/home.tsx")),
            PathBuf::from("/src/pages/home.flux-buf.tsx")
        );
    }

    #[test]
    fn overlay_name_is_idempotent() {
        let overlay = to_overlay_file_name(Path::new("/a/b.ts"));
        assert_eq!(to_overlay_file_name(&overlay), overlay);
    }

    #[test]
    fn real_name_round_trips() {
        // to_real(to_overlay(p)) == p for marker-free paths.
        let real = Path::new("/src/models/app.ts");
        assert_eq!(to_real_file_name(&to_overlay_file_name(real)), real);

        // to_overlay(to_real(overlay)) == overlay.
        let overlay = Path::new("/src/models/app.flux-buf.ts");
        assert_eq!(
            to_overlay_file_name(&to_real_file_name(overlay)),
            overlay
        );
    }

    #[test]
    fn extensionless_path_gets_suffix_marker() {
        assert_eq!(
            to_overlay_file_name(Path::new("/src/Makefile")),
            PathBuf::from("/src/Makefile.flux-buf")
        );
        assert_eq!(
            to_real_file_name(Path::new("/src/Makefile.flux-buf")),
            PathBuf::from("/src/Makefile")
        );
    }

    #[test]
    fn overlay_detection() {
        assert!(is_overlay_file_name(Path::new("/a/b.flux-buf.ts")));
        assert!(!is_overlay_file_name(Path::new("/a/b.ts")));
    }
}

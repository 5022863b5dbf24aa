/// Per-tool staged file lists.
///
/// One `SelectionStore` instance owns the staged files of every tool,
/// keyed by `ToolId`. Each mutation also recomputes the visibility of
/// that tool's options and results panels, so the UI never has to derive
/// those flags itself: an empty list hides both panels, a non-empty list
/// shows the options, and results only appear once a pipeline completes.
use std::collections::HashMap;

use crate::error::{ToolboxError, ToolboxResult};
use crate::tools::ToolId;

/// A file the user has picked or dropped but not yet processed.
/// Belongs to exactly one tool's list at a time; destroyed on removal
/// or on section switch.
#[derive(Debug, Clone, PartialEq)]
pub struct StagedFile {
    pub name: String,
    pub size: u64,
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl StagedFile {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let name = name.into();
        let mime = crate::tools::mime_for(&name);
        Self {
            size: bytes.len() as u64,
            name,
            mime,
            bytes,
        }
    }

    /// Display size in megabytes, formatted like the file list rows.
    pub fn size_mb(&self) -> String {
        format!("{:.2} MB", self.size as f64 / 1024.0 / 1024.0)
    }
}

#[derive(Debug, Default)]
struct ToolEntry {
    files: Vec<StagedFile>,
    options_visible: bool,
    results_visible: bool,
}

/// Ordered staged-file lists for every tool, plus the derived panel
/// visibility flags.
#[derive(Debug, Default)]
pub struct SelectionStore {
    entries: HashMap<ToolId, ToolEntry>,
}

impl SelectionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the tool's current list with `files`. Single-file tools
    /// keep only the first entry; the rest are silently dropped, matching
    /// a single-file picker's behavior.
    pub fn stage(&mut self, tool: ToolId, mut files: Vec<StagedFile>, allow_multiple: bool) {
        if !allow_multiple {
            files.truncate(1);
        }
        let entry = self.entries.entry(tool).or_default();
        entry.files = files;
        entry.refresh_visibility();
    }

    /// Remove the staged file at `index`. Other tools' lists are never
    /// affected. An out-of-bounds index is an internal bug, not user error.
    pub fn remove(&mut self, tool: ToolId, index: usize) -> ToolboxResult<()> {
        let entry = self.entries.entry(tool).or_default();
        if index >= entry.files.len() {
            return Err(ToolboxError::IndexOutOfRange {
                index,
                len: entry.files.len(),
            });
        }
        entry.files.remove(index);
        entry.refresh_visibility();
        Ok(())
    }

    /// Empty one tool's list and hide its panels.
    pub fn clear(&mut self, tool: ToolId) {
        let entry = self.entries.entry(tool).or_default();
        entry.files.clear();
        entry.refresh_visibility();
    }

    /// Empty every tool's list. The section router calls this on every
    /// section switch, for all tools, not just the one being left.
    pub fn clear_all(&mut self) {
        for tool in ToolId::ALL {
            self.clear(tool);
        }
    }

    /// The current ordered list for a tool (possibly empty).
    pub fn list_for(&self, tool: ToolId) -> &[StagedFile] {
        self.entries
            .get(&tool)
            .map(|e| e.files.as_slice())
            .unwrap_or(&[])
    }

    pub fn options_visible(&self, tool: ToolId) -> bool {
        self.entries.get(&tool).is_some_and(|e| e.options_visible)
    }

    pub fn results_visible(&self, tool: ToolId) -> bool {
        self.entries.get(&tool).is_some_and(|e| e.results_visible)
    }

    /// Mark the tool's results panel visible. Called when a pipeline
    /// completes successfully.
    pub fn show_results(&mut self, tool: ToolId) {
        self.entries.entry(tool).or_default().results_visible = true;
    }
}

impl ToolEntry {
    fn refresh_visibility(&mut self) {
        self.options_visible = !self.files.is_empty();
        if self.files.is_empty() {
            self.results_visible = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(name: &str) -> StagedFile {
        StagedFile::new(name, vec![0u8; 16])
    }

    #[test]
    fn test_single_file_tool_keeps_first_only() {
        let mut store = SelectionStore::new();
        store.stage(ToolId::ImageCompressor, vec![file("a.png"), file("b.png")], false);

        let list = store.list_for(ToolId::ImageCompressor);
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].name, "a.png");
    }

    #[test]
    fn test_multi_file_tool_keeps_all() {
        let mut store = SelectionStore::new();
        store.stage(ToolId::GifMaker, vec![file("1.png"), file("2.png")], true);
        assert_eq!(store.list_for(ToolId::GifMaker).len(), 2);
    }

    #[test]
    fn test_remove_out_of_range() {
        let mut store = SelectionStore::new();
        store.stage(ToolId::GifMaker, vec![file("1.png"), file("2.png")], true);

        let err = store.remove(ToolId::GifMaker, 5).unwrap_err();
        assert_eq!(err, ToolboxError::IndexOutOfRange { index: 5, len: 2 });
        // The list is untouched after the failed removal.
        assert_eq!(store.list_for(ToolId::GifMaker).len(), 2);
    }

    #[test]
    fn test_remove_does_not_shift_other_tools() {
        let mut store = SelectionStore::new();
        store.stage(ToolId::GifMaker, vec![file("1.png"), file("2.png")], true);
        store.stage(ToolId::ImageResizer, vec![file("r.png")], false);

        store.remove(ToolId::GifMaker, 0).unwrap();
        assert_eq!(store.list_for(ToolId::GifMaker).len(), 1);
        assert_eq!(store.list_for(ToolId::ImageResizer).len(), 1);
    }

    #[test]
    fn test_visibility_follows_mutations() {
        let mut store = SelectionStore::new();
        assert!(!store.options_visible(ToolId::ImageCompressor));

        store.stage(ToolId::ImageCompressor, vec![file("a.png")], false);
        assert!(store.options_visible(ToolId::ImageCompressor));
        assert!(!store.results_visible(ToolId::ImageCompressor));

        store.show_results(ToolId::ImageCompressor);
        assert!(store.results_visible(ToolId::ImageCompressor));

        // Removing the last file hides both panels again.
        store.remove(ToolId::ImageCompressor, 0).unwrap();
        assert!(!store.options_visible(ToolId::ImageCompressor));
        assert!(!store.results_visible(ToolId::ImageCompressor));
    }

    #[test]
    fn test_clear_all_empties_every_tool() {
        let mut store = SelectionStore::new();
        store.stage(ToolId::GifMaker, vec![file("1.png")], true);
        store.stage(ToolId::PdfCompressor, vec![file("d.pdf")], false);

        store.clear_all();
        for tool in ToolId::ALL {
            assert!(store.list_for(tool).is_empty());
        }
    }
}

/// Section routing and per-tool transient state.
///
/// Exactly one section (the home screen or one tool) is active at a time.
/// `Workspace` owns everything that must not survive a section switch:
/// staged files, produced artifacts and comparison sliders. Switching
/// sections is the single bulk-invalidation point, so a tool can never
/// leak its files, previews or results into the next view.
use std::collections::HashMap;

use crate::state::compare::{CompareState, COMPARE_WIDTH};
use crate::state::selection::SelectionStore;
use crate::tools::{ProcessedArtifact, ToolId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Home,
    Tool(ToolId),
}

#[derive(Debug)]
pub struct Workspace {
    active: Section,
    pub selections: SelectionStore,
    results: HashMap<ToolId, ProcessedArtifact>,
    compares: HashMap<ToolId, CompareState>,
    epoch: u64,
}

impl Workspace {
    /// Initial state: the home section is active, every tool is empty.
    pub fn new() -> Self {
        Self {
            active: Section::Home,
            selections: SelectionStore::new(),
            results: HashMap::new(),
            compares: HashMap::new(),
            epoch: 0,
        }
    }

    pub fn active(&self) -> Section {
        self.active
    }

    /// Bumped on every section switch. A pipeline run captures the epoch
    /// when it starts; a completion whose epoch no longer matches belongs
    /// to state the router has since invalidated and must be discarded.
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Switch the active section, resetting the transient state of every
    /// known tool: staged files are cleared (hiding options/results
    /// panels), artifacts and previews are dropped, and any mounted
    /// comparison slider goes back to its 50 % mount state.
    pub fn activate(&mut self, section: Section) {
        self.active = section;
        self.epoch += 1;
        self.selections.clear_all();
        self.results.clear();
        self.compares.clear();
    }

    /// Record a completed pipeline run: exactly one artifact per tool,
    /// replacing the previous one, with a freshly mounted comparison.
    pub fn set_result(&mut self, tool: ToolId, artifact: ProcessedArtifact) {
        self.results.insert(tool, artifact);
        self.compares.insert(tool, CompareState::mount(COMPARE_WIDTH));
        self.selections.show_results(tool);
    }

    pub fn result_for(&self, tool: ToolId) -> Option<&ProcessedArtifact> {
        self.results.get(&tool)
    }

    pub fn compare_for(&self, tool: ToolId) -> Option<&CompareState> {
        self.compares.get(&tool)
    }

    pub fn compare_mut(&mut self, tool: ToolId) -> Option<&mut CompareState> {
        self.compares.get_mut(&tool)
    }
}

impl Default for Workspace {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::selection::StagedFile;

    fn artifact() -> ProcessedArtifact {
        ProcessedArtifact {
            bytes: vec![1, 2, 3],
            filename: "compressed_photo.jpeg".into(),
            mime: "image/jpeg".into(),
        }
    }

    #[test]
    fn test_initial_section_is_home() {
        let ws = Workspace::new();
        assert_eq!(ws.active(), Section::Home);
    }

    #[test]
    fn test_switch_resets_all_tool_state() {
        let mut ws = Workspace::new();

        // Section A: two staged files and a visible result.
        let tool_a = ToolId::GifMaker;
        ws.selections.stage(
            tool_a,
            vec![
                StagedFile::new("1.png", vec![0; 8]),
                StagedFile::new("2.png", vec![0; 8]),
            ],
            true,
        );
        ws.set_result(tool_a, artifact());
        assert!(ws.selections.results_visible(tool_a));

        // Drag the comparison away from its mount position.
        let compare = ws.compare_mut(tool_a).unwrap();
        compare.begin_drag();
        compare.drag_to(10.0);
        compare.end_drag();

        // Activate section B.
        let tool_b = ToolId::ImageResizer;
        ws.activate(Section::Tool(tool_b));

        assert_eq!(ws.active(), Section::Tool(tool_b));
        assert!(ws.selections.list_for(tool_a).is_empty());
        assert!(!ws.selections.options_visible(tool_a));
        assert!(!ws.selections.results_visible(tool_a));
        assert!(ws.result_for(tool_a).is_none());
        assert!(ws.compare_for(tool_a).is_none());
    }

    #[test]
    fn test_new_result_remounts_comparison_at_half() {
        let mut ws = Workspace::new();
        let tool = ToolId::ImageCompressor;
        ws.selections
            .stage(tool, vec![StagedFile::new("a.png", vec![0; 8])], false);

        ws.set_result(tool, artifact());
        let compare = ws.compare_mut(tool).unwrap();
        compare.begin_drag();
        compare.drag_to(0.0);
        compare.end_drag();
        assert_eq!(ws.compare_for(tool).unwrap().fraction(), 0.0);

        // The next run of the same pipeline replaces the artifact and
        // resets the slider.
        ws.set_result(tool, artifact());
        assert_eq!(ws.compare_for(tool).unwrap().fraction(), 0.5);
    }

    #[test]
    fn test_activation_bumps_the_epoch() {
        let mut ws = Workspace::new();
        let before = ws.epoch();
        ws.activate(Section::Tool(ToolId::GifMaker));
        assert!(ws.epoch() > before);
        ws.activate(Section::Home);
        assert!(ws.epoch() > before + 1);
    }
}

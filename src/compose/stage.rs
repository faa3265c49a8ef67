use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::compose::compositor::DotFrame;

/// Handle to a presentation element owned by a [`Stage`].
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct ElementId(pub u64);

/// Handle to a registered host event listener.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ListenerId(pub u64);

/// Host events the effect subscribes to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HostEvent {
    /// Viewport resized.
    Resize,
    /// Page scrolled.
    Scroll,
}

/// Presentation layer the compositor writes to.
///
/// Implementations own the visual elements; the effect only holds [`ElementId`]s.
pub trait Stage {
    /// Locate a pre-existing element by name.
    fn find_anchor(&self, name: &str) -> Option<ElementId>;

    /// Create an element for a dynamic dot and insert it into the container.
    fn spawn_element(&mut self, dot_id: &str) -> ElementId;

    /// Detach an element; unknown ids are ignored.
    fn remove_element(&mut self, element: ElementId);

    /// Write one dot's composed attributes to its element.
    fn apply(&mut self, element: ElementId, frame: &DotFrame);

    /// Register a host event listener.
    fn listen(&mut self, event: HostEvent) -> ListenerId;

    /// Remove a host event listener; unknown ids are ignored.
    fn unlisten(&mut self, listener: ListenerId);

    /// Number of registered listeners.
    fn listener_count(&self) -> usize;
}

#[derive(Clone, Debug)]
struct ElementSlot {
    name: String,
    synthesized: bool,
    last: Option<DotFrame>,
}

/// In-memory stage that records the last frame applied to each element.
#[derive(Clone, Debug, Default)]
pub struct RecordingStage {
    elements: BTreeMap<ElementId, ElementSlot>,
    listeners: BTreeMap<ListenerId, HostEvent>,
    next_id: u64,
    applied: u64,
}

impl RecordingStage {
    /// Empty stage with no anchors.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stage pre-populated with named anchor elements.
    pub fn with_anchors<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut stage = Self::new();
        for name in names {
            let id = stage.alloc();
            stage.elements.insert(
                id,
                ElementSlot {
                    name: name.into(),
                    synthesized: false,
                    last: None,
                },
            );
        }
        stage
    }

    fn alloc(&mut self) -> ElementId {
        let id = ElementId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Last frame applied to `element`.
    pub fn frame_of(&self, element: ElementId) -> Option<&DotFrame> {
        self.elements.get(&element).and_then(|s| s.last.as_ref())
    }

    /// Last applied frames of every attached element, in element order.
    pub fn live_frames(&self) -> Vec<&DotFrame> {
        self.elements
            .values()
            .filter_map(|s| s.last.as_ref())
            .collect()
    }

    /// Number of attached elements synthesized for dynamic dots.
    pub fn synthesized_count(&self) -> usize {
        self.elements.values().filter(|s| s.synthesized).count()
    }

    /// Number of attached elements.
    pub fn element_count(&self) -> usize {
        self.elements.len()
    }

    /// Total `apply` calls received.
    pub fn applied_count(&self) -> u64 {
        self.applied
    }

    /// Name an element was created under (anchor name or dot id).
    pub fn element_name(&self, element: ElementId) -> Option<&str> {
        self.elements.get(&element).map(|s| s.name.as_str())
    }
}

impl Stage for RecordingStage {
    fn find_anchor(&self, name: &str) -> Option<ElementId> {
        self.elements
            .iter()
            .find(|(_, s)| !s.synthesized && s.name == name)
            .map(|(id, _)| *id)
    }

    fn spawn_element(&mut self, dot_id: &str) -> ElementId {
        let id = self.alloc();
        self.elements.insert(
            id,
            ElementSlot {
                name: dot_id.to_owned(),
                synthesized: true,
                last: None,
            },
        );
        id
    }

    fn remove_element(&mut self, element: ElementId) {
        self.elements.remove(&element);
    }

    fn apply(&mut self, element: ElementId, frame: &DotFrame) {
        if let Some(slot) = self.elements.get_mut(&element) {
            slot.last = Some(frame.clone());
            self.applied += 1;
        }
    }

    fn listen(&mut self, event: HostEvent) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners.insert(id, event);
        id
    }

    fn unlisten(&mut self, listener: ListenerId) {
        self.listeners.remove(&listener);
    }

    fn listener_count(&self) -> usize {
        self.listeners.len()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/compose/stage.rs"]
mod tests;

use std::collections::BTreeMap;

use crate::{
    compose::stage::{ElementId, Stage},
    foundation::error::{DotError, DotResult},
    scene::dot::{Dot, DotAttrs},
};

/// Longest allowed parent chain. Observed choreographies only use depth 1.
pub const MAX_PARENT_DEPTH: usize = 4;

/// Entity registry: dot id to dot state, iterated in id order.
#[derive(Clone, Debug, Default)]
pub struct DotRegistry {
    dots: BTreeMap<String, Dot>,
}

impl DotRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create and register a dot.
    ///
    /// With `element: None` the stage synthesizes an element and the dot is dynamic;
    /// otherwise the dot is an anchor bound to the supplied element.
    pub fn create(
        &mut self,
        id: &str,
        attrs: DotAttrs,
        element: Option<ElementId>,
        stage: &mut dyn Stage,
    ) -> DotResult<&Dot> {
        if id.trim().is_empty() {
            return Err(DotError::registry("dot id must be non-empty"));
        }
        if self.dots.contains_key(id) {
            return Err(DotError::registry(format!("dot '{id}' already exists")));
        }
        attrs
            .validate()
            .map_err(|e| DotError::registry(format!("dot '{id}': {e}")))?;
        if let Some(parent) = attrs.parent.as_deref() {
            self.check_parent_chain(id, parent)?;
        }

        let (element, anchor) = match element {
            Some(el) => (el, true),
            None => (stage.spawn_element(id), false),
        };
        let dot = Dot::new(id, attrs, element, anchor);
        tracing::debug!(id, anchor, element = element.0, "dot created");
        Ok(self.dots.entry(id.to_owned()).or_insert(dot))
    }

    /// Detach the dot's element and delete the entry; `None` if absent.
    pub fn remove(&mut self, id: &str, stage: &mut dyn Stage) -> Option<Dot> {
        let dot = self.dots.remove(id)?;
        stage.remove_element(dot.element);
        tracing::debug!(id, element = dot.element.0, "dot removed");
        Some(dot)
    }

    /// Look up a dot.
    pub fn get(&self, id: &str) -> Option<&Dot> {
        self.dots.get(id)
    }

    /// Look up a dot mutably.
    pub fn get_mut(&mut self, id: &str) -> Option<&mut Dot> {
        self.dots.get_mut(id)
    }

    /// Return `true` when `id` is registered.
    pub fn contains(&self, id: &str) -> bool {
        self.dots.contains_key(id)
    }

    /// Dots in id order.
    pub fn iter(&self) -> impl Iterator<Item = &Dot> {
        self.dots.values()
    }

    /// Mutable dots in id order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Dot> {
        self.dots.values_mut()
    }

    /// Number of registered dots.
    pub fn len(&self) -> usize {
        self.dots.len()
    }

    /// Return `true` when no dots are registered.
    pub fn is_empty(&self) -> bool {
        self.dots.is_empty()
    }

    /// Ids of dots created without a pre-existing element.
    pub fn dynamic_ids(&self) -> Vec<String> {
        self.dots
            .values()
            .filter(|d| !d.anchor)
            .map(|d| d.id.clone())
            .collect()
    }

    /// Number of ancestors reachable from `id`, capped at [`MAX_PARENT_DEPTH`].
    pub fn depth_of(&self, id: &str) -> usize {
        let mut depth = 0;
        let mut cur = self.dots.get(id).and_then(|d| d.parent.as_deref());
        while let Some(p) = cur {
            depth += 1;
            if depth >= MAX_PARENT_DEPTH {
                break;
            }
            cur = self.dots.get(p).and_then(|d| d.parent.as_deref());
        }
        depth
    }

    fn check_parent_chain(&self, id: &str, parent: &str) -> DotResult<()> {
        let mut cur = Some(parent);
        let mut depth = 0;
        while let Some(p) = cur {
            depth += 1;
            if p == id {
                return Err(DotError::registry(format!(
                    "dot '{id}' would be its own ancestor"
                )));
            }
            if depth > MAX_PARENT_DEPTH {
                return Err(DotError::registry(format!(
                    "dot '{id}' parent chain exceeds depth {MAX_PARENT_DEPTH}"
                )));
            }
            cur = self.dots.get(p).and_then(|d| d.parent.as_deref());
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/registry.rs"]
mod tests;

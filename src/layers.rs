//! Owned display-layer state for the rendering boundary.
//!
//! Layers refresh independently and the last completed refresh wins, but
//! only within its generation: a fetch that resolves after its layer was
//! toggled off or refreshed again must not resurrect stale data.

use std::collections::HashMap;

/// The independently toggled map layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayerKind {
    Cycling,
    BusStops,
    BusRoutes,
    Pollution,
    CityAir,
    Schools,
    HistoricalPollution,
}

/// Token tying an in-flight refresh to the registry state it started from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Generation(u64);

#[derive(Debug)]
struct LayerState<T> {
    generation: u64,
    visible: bool,
    data: Option<T>,
}

/// Registry of per-layer payloads, passed into the rendering boundary
/// instead of living as module-level globals, so multiple map instances can
/// coexist and the transforms stay unit-testable.
#[derive(Debug)]
pub struct LayerRegistry<T> {
    layers: HashMap<LayerKind, LayerState<T>>,
}

impl<T> LayerRegistry<T> {
    pub fn new() -> Self {
        Self {
            layers: HashMap::new(),
        }
    }

    fn state_mut(&mut self, kind: LayerKind) -> &mut LayerState<T> {
        self.layers.entry(kind).or_insert_with(|| LayerState {
            generation: 0,
            visible: true,
            data: None,
        })
    }

    /// Starts a refresh for a layer, invalidating any still-running one.
    pub fn begin_refresh(&mut self, kind: LayerKind) -> Generation {
        let state = self.state_mut(kind);
        state.generation += 1;
        Generation(state.generation)
    }

    /// Installs `data` if `token` still matches the layer's current
    /// generation and the layer is visible. Returns whether it was applied;
    /// late completions are simply discarded.
    pub fn apply(&mut self, kind: LayerKind, token: Generation, data: T) -> bool {
        let state = self.state_mut(kind);
        if state.generation != token.0 || !state.visible {
            return false;
        }
        state.data = Some(data);
        true
    }

    /// Toggles visibility. Turning a layer off drops its payload and bumps
    /// the generation, so in-flight refreshes land nowhere.
    pub fn set_visible(&mut self, kind: LayerKind, visible: bool) {
        let state = self.state_mut(kind);
        state.visible = visible;
        if !visible {
            state.generation += 1;
            state.data = None;
        }
    }

    pub fn is_visible(&self, kind: LayerKind) -> bool {
        self.layers.get(&kind).map(|s| s.visible).unwrap_or(true)
    }

    pub fn data(&self, kind: LayerKind) -> Option<&T> {
        self.layers.get(&kind).and_then(|s| s.data.as_ref())
    }
}

impl<T> Default for LayerRegistry<T> {
    fn default() -> Self {
        Self::new()
    }
}

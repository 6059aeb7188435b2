//! The Visualizer: unified API over export, view, and viewer sessions.

use rbviz_export::{DebugStrings, ExportOptions, RedBlackGraph, Validator};
use rbviz_view::Snapshot;

use crate::error::Result;
use crate::session::{SessionId, SessionRegistry, Viewer, DEFAULT_MAX_SESSIONS};

/// Configuration for the Visualizer.
#[derive(Debug, Clone)]
pub struct VisualizerConfig {
    /// Cap on simultaneously open viewer sessions.
    pub max_sessions: usize,
    /// Options applied to every export.
    pub export: ExportOptions,
}

impl Default for VisualizerConfig {
    fn default() -> Self {
        Self {
            max_sessions: DEFAULT_MAX_SESSIONS,
            export: ExportOptions::default(),
        }
    }
}

/// The main Visualizer struct.
///
/// Provides a unified API for:
/// - Exporting a node's tree as wire text
/// - Loading wire text into a fully derived snapshot
/// - Opening viewers, bounded by the session cap
pub struct Visualizer {
    config: VisualizerConfig,
    sessions: SessionRegistry,
}

impl Visualizer {
    pub fn new(config: VisualizerConfig) -> Self {
        Self {
            sessions: SessionRegistry::new(config.max_sessions),
            config,
        }
    }

    pub fn config(&self) -> &VisualizerConfig {
        &self.config
    }

    pub fn sessions(&self) -> &SessionRegistry {
        &self.sessions
    }

    /// Export the tree containing `node` using the configured options.
    pub fn export<G, V, D>(
        &self,
        graph: &G,
        node: G::Node,
        validator: &V,
        debug_strings: &D,
    ) -> Result<String>
    where
        G: RedBlackGraph,
        V: Validator<G> + ?Sized,
        D: DebugStrings<G> + ?Sized,
    {
        Ok(rbviz_export::export(
            graph,
            node,
            &self.config.export,
            validator,
            debug_strings,
        )?)
    }

    /// Decode wire text and compute every derived field.
    pub fn load(&self, text: &str) -> Result<Snapshot> {
        Ok(rbviz_view::load(text)?)
    }

    /// Open a viewer on `wire`, or on an empty viewer when `None`.
    ///
    /// Returns `Ok(None)` when the session cap is reached.
    pub fn show<V: Viewer + ?Sized>(
        &self,
        viewer: &V,
        wire: Option<&str>,
    ) -> Result<Option<SessionId>> {
        Ok(self.sessions.open(viewer, wire)?)
    }

    /// Report that a viewer session has closed.
    pub fn closed(&self, session: &SessionId) -> bool {
        self.sessions.close(session)
    }
}

impl Default for Visualizer {
    fn default() -> Self {
        Self::new(VisualizerConfig::default())
    }
}

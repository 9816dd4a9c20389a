//! View model
//!
//! Owns the requirement cache and the active view mode. Every load is tagged with a generation; only the newest load may replace
//! the cache.

use log::debug;
use std::collections::HashSet;
use std::fmt;

use crate::api::{Api, ApiError};
use crate::graph::GraphModel;
use crate::matrix::TraceMatrix;
use crate::models::{Requirement, RequirementId};
use crate::render::requirement_grid_html;

/// The three ways of looking at the requirement set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ViewMode {
    #[default]
    Grid,
    Matrix,
    MindMap,
}

impl ViewMode {
    pub fn all() -> [ViewMode; 3] {
        [ViewMode::Grid, ViewMode::Matrix, ViewMode::MindMap]
    }

    pub fn label(&self) -> &'static str {
        match self {
            ViewMode::Grid => "Requirements",
            ViewMode::Matrix => "Matrix",
            ViewMode::MindMap => "Mind map",
        }
    }
}

impl fmt::Display for ViewMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Issued by [`ViewModel::begin_load`]; identifies one load request
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LoadTicket(u64);

impl LoadTicket {
    pub fn generation(&self) -> u64 {
        self.0
    }
}

/// Output of rendering the active view.
///
/// The grid is drawn straight from the cache; its HTML is built on request
/// through [`ViewModel::grid_html`].
#[derive(Debug, Clone, PartialEq)]
pub enum RenderedView {
    Grid,
    Matrix(TraceMatrix),
    MindMap(GraphModel),
}

impl RenderedView {
    pub fn mode(&self) -> ViewMode {
        match self {
            RenderedView::Grid => ViewMode::Grid,
            RenderedView::Matrix(_) => ViewMode::Matrix,
            RenderedView::MindMap(_) => ViewMode::MindMap,
        }
    }
}

#[derive(Debug, Default)]
pub struct ViewModel {
    requirements: Vec<Requirement>,
    mode: ViewMode,
    issued: u64,
}

impl ViewModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> ViewMode {
        self.mode
    }

    pub fn requirements(&self) -> &[Requirement] {
        &self.requirements
    }

    pub fn find(&self, id: RequirementId) -> Option<&Requirement> {
        self.requirements.iter().find(|r| r.id == id)
    }

    /// Card grid of the cached requirements as an HTML fragment
    pub fn grid_html(&self) -> String {
        requirement_grid_html(&self.requirements)
    }

    pub fn begin_load(&mut self) -> LoadTicket {
        self.issued += 1;
        LoadTicket(self.issued)
    }

    pub fn is_current(&self, ticket: LoadTicket) -> bool {
        ticket.0 == self.issued
    }

    /// Replace the cache with a load result.
    ///
    /// Returns the re-rendered active view, or `None` when a newer load has
    /// been issued since `ticket`.
    pub fn apply_load(
        &mut self,
        ticket: LoadTicket,
        requirements: Vec<Requirement>,
    ) -> Option<RenderedView> {
        if !self.is_current(ticket) {
            debug!(
                "Discarding stale load {} (newest is {})",
                ticket.0, self.issued
            );
            return None;
        }

        let mut seen = HashSet::new();
        self.requirements = requirements
            .into_iter()
            .filter(|r| seen.insert(r.id))
            .collect();
        Some(self.render())
    }

    /// Fetch the requirement list and apply it
    pub fn load_requirements<A: Api + ?Sized>(
        &mut self,
        api: &A,
    ) -> Result<Option<RenderedView>, ApiError> {
        let ticket = self.begin_load();
        let requirements = api.list_requirements()?;
        Ok(self.apply_load(ticket, requirements))
    }

    pub fn switch_view(&mut self, mode: ViewMode) -> RenderedView {
        self.mode = mode;
        self.render()
    }

    /// Render the active view from the cache
    pub fn render(&self) -> RenderedView {
        match self.mode {
            ViewMode::Grid => RenderedView::Grid,
            ViewMode::Matrix => {
                RenderedView::Matrix(TraceMatrix::from_requirements(&self.requirements))
            }
            ViewMode::MindMap => {
                RenderedView::MindMap(GraphModel::from_requirements(&self.requirements))
            }
        }
    }
}

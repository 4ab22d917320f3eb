use serde::{Deserialize, Serialize};

use crate::catalog::{ItemCategory, LocalityCatalog, Remote};
use crate::config::{EndpointConfig, Endpoints};
use crate::selection::{Coordinate, RegionCode, SelectionState};
use crate::submission::SubmissionPayload;
use crate::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToastKind {
    Success,
}

impl ToastKind {
    #[must_use]
    pub const fn default_duration_ms(self) -> u64 {
        match self {
            Self::Success => 2000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ToastMessage {
    pub message: String,
    pub kind: ToastKind,
    pub duration_ms: u64,
}

impl ToastMessage {
    #[must_use]
    pub fn new(message: impl Into<String>, kind: ToastKind) -> Self {
        Self {
            message: message.into(),
            kind,
            duration_ms: kind.default_duration_ms(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum SubmissionState {
    #[default]
    Idle,
    /// The snapshot that was sent; kept until the backend answers.
    Submitting(Box<SubmissionPayload>),
    Succeeded,
    Failed(AppError),
}

impl SubmissionState {
    #[must_use]
    pub const fn is_in_flight(&self) -> bool {
        matches!(self, Self::Submitting(_))
    }

    /// A point is created at most once per form; only idle or failed
    /// submissions may send.
    #[must_use]
    pub const fn accepts_submit(&self) -> bool {
        matches!(self, Self::Idle | Self::Failed(_))
    }
}

#[derive(Debug, Default)]
pub struct Model {
    pub config: EndpointConfig,
    /// Set once on mount; `None` means the form has not started loading.
    pub endpoints: Option<Endpoints>,

    pub initial_position: Remote<Coordinate>,
    pub regions: Remote<Vec<RegionCode>>,
    pub items: Remote<Vec<ItemCategory>>,
    pub localities: LocalityCatalog,

    pub selection: SelectionState,
    pub submission: SubmissionState,

    pub active_error: Option<AppError>,
    pub active_toast: Option<ToastMessage>,
}

impl Model {
    #[must_use]
    pub fn is_mounted(&self) -> bool {
        self.endpoints.is_some()
    }

    /// Map center: first geolocation fix, or the origin until one arrives.
    #[must_use]
    pub fn map_center(&self) -> Coordinate {
        self.initial_position
            .loaded()
            .copied()
            .unwrap_or(Coordinate::ORIGIN)
    }

    /// Marker position: last map click, or the origin ("not yet chosen").
    #[must_use]
    pub fn marker(&self) -> Coordinate {
        self.selection.position().unwrap_or(Coordinate::ORIGIN)
    }

    pub fn set_error(&mut self, error: AppError) {
        self.active_error = Some(error);
    }

    pub fn clear_error(&mut self) {
        self.active_error = None;
    }

    pub fn show_toast(&mut self, message: impl Into<String>, kind: ToastKind) {
        self.active_toast = Some(ToastMessage::new(message, kind));
    }

    pub fn clear_toast(&mut self) {
        self.active_toast = None;
    }
}

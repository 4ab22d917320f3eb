use serde::{Deserialize, Serialize};

use crate::catalog::{ItemId, Remote};
use crate::model::{SubmissionState, ToastKind, ToastMessage};
use crate::{AppError, ErrorSeverity, UNSELECTED};

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
}

impl SelectOption {
    #[must_use]
    pub fn placeholder(label: &str) -> Self {
        Self {
            value: UNSELECTED.to_string(),
            label: label.to_string(),
        }
    }

    #[must_use]
    pub fn plain(value: &str) -> Self {
        Self {
            value: value.to_string(),
            label: value.to_string(),
        }
    }
}

/// Placeholder first, then the entries in catalog order.
#[must_use]
pub fn select_options<'a>(
    placeholder: &str,
    values: impl IntoIterator<Item = &'a str>,
) -> Vec<SelectOption> {
    std::iter::once(SelectOption::placeholder(placeholder))
        .chain(values.into_iter().map(SelectOption::plain))
        .collect()
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CatalogStatus {
    Idle,
    Loading,
    Ready,
    Failed { message: String, is_retryable: bool },
}

impl<T> From<&Remote<T>> for CatalogStatus {
    fn from(remote: &Remote<T>) -> Self {
        match remote {
            Remote::Idle => Self::Idle,
            Remote::Loading => Self::Loading,
            Remote::Loaded(_) => Self::Ready,
            Remote::Failed(error) => Self::Failed {
                message: error.user_facing_message(),
                is_retryable: error.is_retryable(),
            },
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ItemTile {
    pub id: ItemId,
    pub title: String,
    pub image: String,
    pub selected: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct MapView {
    pub center: [f64; 2],
    pub marker: [f64; 2],
    pub zoom: f64,
    pub has_selection: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SubmissionView {
    Idle,
    Submitting,
    Succeeded,
    Failed { message: String, is_retryable: bool },
}

impl From<&SubmissionState> for SubmissionView {
    fn from(state: &SubmissionState) -> Self {
        match state {
            SubmissionState::Idle => Self::Idle,
            SubmissionState::Submitting(_) => Self::Submitting,
            SubmissionState::Succeeded => Self::Succeeded,
            SubmissionState::Failed(error) => Self::Failed {
                message: error.user_facing_message(),
                is_retryable: error.is_retryable(),
            },
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct UserFacingError {
    pub message: String,
    pub is_transient: bool,
    pub is_retryable: bool,
    pub error_code: String,
}

impl From<&AppError> for UserFacingError {
    fn from(e: &AppError) -> Self {
        Self {
            message: e.user_facing_message(),
            is_transient: e.severity == ErrorSeverity::Transient,
            is_retryable: e.is_retryable(),
            error_code: e.code().to_string(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ToastView {
    pub message: String,
    pub kind: ToastKind,
    pub duration_ms: u64,
}

impl From<&ToastMessage> for ToastView {
    fn from(t: &ToastMessage) -> Self {
        Self {
            message: t.message.clone(),
            kind: t.kind,
            duration_ms: t.duration_ms,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ViewModel {
    pub name: String,
    pub email: String,
    pub whatsapp: String,

    pub region_options: Vec<SelectOption>,
    pub selected_region: String,
    pub locality_options: Vec<SelectOption>,
    pub selected_locality: String,

    pub map: MapView,
    pub items: Vec<ItemTile>,

    pub regions_status: CatalogStatus,
    pub localities_status: CatalogStatus,
    pub items_status: CatalogStatus,

    pub can_submit: bool,
    pub submission: SubmissionView,
    pub error: Option<UserFacingError>,
    pub toast: Option<ToastView>,
}

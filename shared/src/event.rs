use serde::{Deserialize, Serialize};

use crate::capabilities::GeolocationResult;
use crate::catalog::{ItemCategory, ItemId, LocalityRecord, LocalityRequest, RegionRecord};
use crate::config::EndpointConfig;
use crate::selection::ContactField;

type HttpJson<T> = Box<crux_http::Result<crux_http::Response<T>>>;

#[derive(Serialize, Deserialize, Debug)]
pub enum Event {
    Noop,

    /// Replaces the endpoint config; only honoured before `Mount`.
    Configure(EndpointConfig),
    /// The form became visible: start every independent load.
    Mount,

    // Inputs
    ContactChanged {
        field: ContactField,
        value: String,
    },
    RegionSelected {
        value: String,
    },
    LocalitySelected {
        value: String,
    },
    MapClicked {
        lat: f64,
        lng: f64,
    },
    ItemToggled {
        id: ItemId,
    },
    SubmitRequested,

    DismissError,
    DismissToast,

    // Capability responses
    PositionResolved(GeolocationResult),
    #[serde(skip)]
    RegionsLoaded(HttpJson<Vec<RegionRecord>>),
    #[serde(skip)]
    ItemsLoaded(HttpJson<Vec<ItemCategory>>),
    #[serde(skip)]
    LocalitiesLoaded {
        request: LocalityRequest,
        result: HttpJson<Vec<LocalityRecord>>,
    },
    #[serde(skip)]
    SubmissionCompleted(HttpJson<Vec<u8>>),
}

impl Event {
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Noop => "noop",
            Self::Configure(_) => "configure",
            Self::Mount => "mount",
            Self::ContactChanged { .. } => "contact_changed",
            Self::RegionSelected { .. } => "region_selected",
            Self::LocalitySelected { .. } => "locality_selected",
            Self::MapClicked { .. } => "map_clicked",
            Self::ItemToggled { .. } => "item_toggled",
            Self::SubmitRequested => "submit_requested",
            Self::DismissError => "dismiss_error",
            Self::DismissToast => "dismiss_toast",
            Self::PositionResolved(_) => "position_resolved",
            Self::RegionsLoaded(_) => "regions_loaded",
            Self::ItemsLoaded(_) => "items_loaded",
            Self::LocalitiesLoaded { .. } => "localities_loaded",
            Self::SubmissionCompleted(_) => "submission_completed",
        }
    }

    #[must_use]
    pub const fn is_user_initiated(&self) -> bool {
        matches!(
            self,
            Self::ContactChanged { .. }
                | Self::RegionSelected { .. }
                | Self::LocalitySelected { .. }
                | Self::MapClicked { .. }
                | Self::ItemToggled { .. }
                | Self::SubmitRequested
                | Self::DismissError
                | Self::DismissToast
        )
    }
}

impl Default for Event {
    fn default() -> Self {
        Self::Noop
    }
}

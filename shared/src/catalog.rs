use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, info};

use crate::selection::{Choice, LocalityName, RegionCode};
use crate::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(pub u32);

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A recyclable-material class a collection point may accept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemCategory {
    pub id: ItemId,
    pub title: String,
    #[serde(alias = "image_url")]
    pub image: String,
}

/// Wire shape of the region list (`sigla` on the geodata service).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionRecord {
    #[serde(rename = "sigla", alias = "code")]
    pub code: String,
}

/// Wire shape of the locality list (`nome` on the geodata service).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalityRecord {
    #[serde(rename = "nome", alias = "name")]
    pub name: String,
}

#[must_use]
pub fn region_codes(records: Vec<RegionRecord>) -> Vec<RegionCode> {
    records.into_iter().map(|r| RegionCode(r.code)).collect()
}

#[must_use]
pub fn locality_names(records: Vec<LocalityRecord>) -> Vec<LocalityName> {
    records.into_iter().map(|r| LocalityName(r.name)).collect()
}

/// Load state of one asynchronous data source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Remote<T> {
    Idle,
    Loading,
    Loaded(T),
    Failed(AppError),
}

impl<T> Default for Remote<T> {
    fn default() -> Self {
        Self::Idle
    }
}

impl<T> Remote<T> {
    #[must_use]
    pub const fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    #[must_use]
    pub const fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    #[must_use]
    pub const fn loaded(&self) -> Option<&T> {
        match self {
            Self::Loaded(value) => Some(value),
            _ => None,
        }
    }

    #[must_use]
    pub const fn error(&self) -> Option<&AppError> {
        match self {
            Self::Failed(error) => Some(error),
            _ => None,
        }
    }

    /// Applies a completed load, replacing whatever was held before.
    pub fn settle(&mut self, result: Result<T, AppError>) {
        *self = match result {
            Ok(value) => Self::Loaded(value),
            Err(error) => Self::Failed(error),
        };
    }
}

impl<T> Remote<Vec<T>> {
    /// Loaded entries, or nothing while idle, loading or failed.
    #[must_use]
    pub fn entries(&self) -> &[T] {
        self.loaded().map_or(&[], Vec::as_slice)
    }
}

/// Identifies one locality fetch. Only the most recently issued request
/// may write into the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalityRequest {
    pub region: RegionCode,
    pub epoch: u64,
}

/// Localities of the currently chosen region.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LocalityCatalog {
    state: Remote<Vec<LocalityName>>,
    latest: Option<LocalityRequest>,
    epoch: u64,
}

impl LocalityCatalog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn state(&self) -> &Remote<Vec<LocalityName>> {
        &self.state
    }

    #[must_use]
    pub fn names(&self) -> &[LocalityName] {
        self.state.entries()
    }

    #[must_use]
    pub fn latest_request(&self) -> Option<&LocalityRequest> {
        self.latest.as_ref()
    }

    #[must_use]
    pub fn contains(&self, name: &LocalityName) -> bool {
        self.names().contains(name)
    }

    /// Reacts to a new region choice. Returns the request to issue, if any.
    /// Clearing the region empties the list without a request and orphans
    /// any fetch still in flight.
    pub fn observe_region(&mut self, region: &Choice<RegionCode>) -> Option<LocalityRequest> {
        match region {
            Choice::Unselected => {
                self.state = Remote::Idle;
                self.latest = None;
                None
            }
            Choice::Chosen(code) => {
                self.epoch += 1;
                let request = LocalityRequest {
                    region: code.clone(),
                    epoch: self.epoch,
                };
                self.state = Remote::Loading;
                self.latest = Some(request.clone());
                Some(request)
            }
        }
    }

    /// Applies a completed fetch if it answers the latest request. Returns
    /// whether the result was applied.
    pub fn complete(
        &mut self,
        request: &LocalityRequest,
        result: Result<Vec<LocalityName>, AppError>,
    ) -> bool {
        if self.latest.as_ref() != Some(request) {
            debug!(
                region = %request.region,
                epoch = request.epoch,
                "discarding stale locality response"
            );
            return false;
        }

        if let Ok(names) = &result {
            info!(region = %request.region, count = names.len(), "localities loaded");
        }
        self.state.settle(result);
        self.latest = None;
        true
    }

    /// Marks the latest request failed before it reached the shell.
    pub fn fail(&mut self, error: AppError) {
        self.state = Remote::Failed(error);
        self.latest = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;

    fn sp() -> Choice<RegionCode> {
        Choice::Chosen(RegionCode::new("SP"))
    }

    fn rj() -> Choice<RegionCode> {
        Choice::Chosen(RegionCode::new("RJ"))
    }

    fn names(list: &[&str]) -> Vec<LocalityName> {
        list.iter().map(|n| LocalityName::new(*n)).collect()
    }

    #[test]
    fn test_region_records_decode_from_geodata_shape() {
        let json = r#"[{"id":35,"sigla":"SP","nome":"São Paulo"},{"sigla":"RJ"}]"#;
        let records: Vec<RegionRecord> = serde_json::from_str(json).unwrap();
        assert_eq!(
            region_codes(records),
            vec![RegionCode::new("SP"), RegionCode::new("RJ")]
        );

        let records: Vec<RegionRecord> = serde_json::from_str(r#"[{"code":"MG"}]"#).unwrap();
        assert_eq!(region_codes(records), vec![RegionCode::new("MG")]);
    }

    #[test]
    fn test_locality_records_decode() {
        let json = r#"[{"id":1,"nome":"Campinas"},{"name":"Santos"}]"#;
        let records: Vec<LocalityRecord> = serde_json::from_str(json).unwrap();
        assert_eq!(locality_names(records), names(&["Campinas", "Santos"]));
    }

    #[test]
    fn test_item_category_accepts_image_url_alias() {
        let json = r#"{"id":3,"title":"Batteries","image_url":"http://cdn/b.svg"}"#;
        let item: ItemCategory = serde_json::from_str(json).unwrap();
        assert_eq!(item.id, ItemId(3));
        assert_eq!(item.image, "http://cdn/b.svg");
    }

    #[test]
    fn test_unselected_region_clears_without_request() {
        let mut catalog = LocalityCatalog::new();
        let request = catalog.observe_region(&sp()).unwrap();
        assert!(catalog.complete(&request, Ok(names(&["Santos"]))));

        assert_eq!(catalog.observe_region(&Choice::Unselected), None);
        assert!(catalog.names().is_empty());
        assert!(catalog.state().is_idle());
    }

    #[test]
    fn test_chosen_region_issues_tagged_request() {
        let mut catalog = LocalityCatalog::new();
        let request = catalog.observe_region(&sp()).unwrap();
        assert_eq!(request.region, RegionCode::new("SP"));
        assert!(catalog.state().is_loading());
        assert_eq!(catalog.latest_request(), Some(&request));
    }

    #[test]
    fn test_stale_response_is_discarded() {
        let mut catalog = LocalityCatalog::new();
        let stale = catalog.observe_region(&sp()).unwrap();
        let fresh = catalog.observe_region(&rj()).unwrap();

        assert!(!catalog.complete(&stale, Ok(names(&["Campinas"]))));
        assert!(catalog.state().is_loading());

        assert!(catalog.complete(&fresh, Ok(names(&["Niterói"]))));
        assert_eq!(catalog.names(), names(&["Niterói"]).as_slice());
    }

    #[test]
    fn test_same_region_twice_only_latest_applies() {
        let mut catalog = LocalityCatalog::new();
        let first = catalog.observe_region(&sp()).unwrap();
        let second = catalog.observe_region(&sp()).unwrap();
        assert_ne!(first, second);
        assert!(!catalog.complete(&first, Ok(names(&["Campinas"]))));
        assert!(catalog.complete(&second, Ok(names(&["Santos"]))));
    }

    #[test]
    fn test_response_after_clearing_is_discarded() {
        let mut catalog = LocalityCatalog::new();
        let request = catalog.observe_region(&sp()).unwrap();
        catalog.observe_region(&Choice::Unselected);
        assert!(!catalog.complete(&request, Ok(names(&["Santos"]))));
        assert!(catalog.names().is_empty());
    }

    #[test]
    fn test_failure_is_recorded() {
        let mut catalog = LocalityCatalog::new();
        let request = catalog.observe_region(&sp()).unwrap();
        let error = AppError::new(ErrorKind::Network, "offline");
        assert!(catalog.complete(&request, Err(error.clone())));
        assert_eq!(catalog.state().error(), Some(&error));
        assert!(catalog.names().is_empty());
    }
}

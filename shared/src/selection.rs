use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::catalog::ItemId;
use crate::{AppError, ErrorKind, UNSELECTED};

macro_rules! text_id {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(s: impl Into<String>) -> Self {
                Self(s.into())
            }

            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

text_id!(RegionCode);
text_id!(LocalityName);

/// A single-valued `<select>` choice. The shell reports [`UNSELECTED`]
/// while the placeholder option is showing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Choice<T> {
    Unselected,
    Chosen(T),
}

impl<T> Default for Choice<T> {
    fn default() -> Self {
        Self::Unselected
    }
}

impl<T> Choice<T> {
    #[must_use]
    pub const fn is_chosen(&self) -> bool {
        matches!(self, Self::Chosen(_))
    }

    #[must_use]
    pub const fn chosen(&self) -> Option<&T> {
        match self {
            Self::Chosen(value) => Some(value),
            Self::Unselected => None,
        }
    }
}

impl<T: From<String>> Choice<T> {
    /// Maps the raw select value; the sentinel and blank input both mean
    /// "nothing chosen".
    #[must_use]
    pub fn from_input(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed == UNSELECTED {
            Self::Unselected
        } else {
            Self::Chosen(T::from(trimmed.to_string()))
        }
    }
}

impl<T: AsRef<str>> Choice<T> {
    /// The value the select control should show.
    #[must_use]
    pub fn as_input(&self) -> &str {
        match self {
            Self::Chosen(value) => value.as_ref(),
            Self::Unselected => UNSELECTED,
        }
    }
}

impl From<String> for RegionCode {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<String> for LocalityName {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl AsRef<str> for RegionCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for LocalityName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum CoordinateError {
    #[error("Latitude {0} is out of valid range [-90, 90]")]
    LatitudeOutOfRange(f64),
    #[error("Longitude {0} is out of valid range [-180, 180]")]
    LongitudeOutOfRange(f64),
    #[error("Coordinate contains a non-finite value")]
    NonFinite,
}

impl From<CoordinateError> for AppError {
    fn from(e: CoordinateError) -> Self {
        AppError::new(ErrorKind::Validation, e.to_string())
    }
}

/// Validated WGS84 point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    lat: f64,
    lng: f64,
}

impl Coordinate {
    /// Rendered wherever no position is known yet.
    pub const ORIGIN: Self = Self { lat: 0.0, lng: 0.0 };

    pub fn new(lat: f64, lng: f64) -> Result<Self, CoordinateError> {
        if !lat.is_finite() || !lng.is_finite() {
            return Err(CoordinateError::NonFinite);
        }
        if !(-90.0..=90.0).contains(&lat) {
            return Err(CoordinateError::LatitudeOutOfRange(lat));
        }
        if !(-180.0..=180.0).contains(&lng) {
            return Err(CoordinateError::LongitudeOutOfRange(lng));
        }
        Ok(Self { lat, lng })
    }

    /// Position reported by a map click. The map may hand back unwrapped
    /// longitudes once panned across the antimeridian, so only non-finite
    /// values are refused and the value is stored as given.
    pub fn from_click(lat: f64, lng: f64) -> Result<Self, CoordinateError> {
        if !lat.is_finite() || !lng.is_finite() {
            return Err(CoordinateError::NonFinite);
        }
        Ok(Self { lat, lng })
    }

    #[must_use]
    pub const fn lat(&self) -> f64 {
        self.lat
    }

    #[must_use]
    pub const fn lng(&self) -> f64 {
        self.lng
    }

    /// `[lat, lng]`, the shape the map widget takes for center and marker.
    #[must_use]
    pub const fn as_pair(&self) -> [f64; 2] {
        [self.lat, self.lng]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContactField {
    Name,
    Email,
    Whatsapp,
}

impl ContactField {
    pub const ALL: [Self; 3] = [Self::Name, Self::Email, Self::Whatsapp];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Email => "email",
            Self::Whatsapp => "whatsapp",
        }
    }

    /// Parses the `name` attribute of the text input that changed.
    #[must_use]
    pub fn from_input_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.as_str() == name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ContactFields {
    pub name: String,
    pub email: String,
    pub whatsapp: String,
}

impl ContactFields {
    #[must_use]
    pub fn get(&self, field: ContactField) -> &str {
        match field {
            ContactField::Name => &self.name,
            ContactField::Email => &self.email,
            ContactField::Whatsapp => &self.whatsapp,
        }
    }

    fn slot_mut(&mut self, field: ContactField) -> &mut String {
        match field {
            ContactField::Name => &mut self.name,
            ContactField::Email => &mut self.email,
            ContactField::Whatsapp => &mut self.whatsapp,
        }
    }
}

/// Accepted item categories, kept in first-insertion order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SelectedItemSet(Vec<ItemId>);

impl SelectedItemSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Removes `id` if present, appends it otherwise.
    pub fn toggle(&mut self, id: ItemId) {
        if let Some(index) = self.0.iter().position(|existing| *existing == id) {
            self.0.remove(index);
        } else {
            self.0.push(id);
        }
    }

    #[must_use]
    pub fn contains(&self, id: ItemId) -> bool {
        self.0.contains(&id)
    }

    #[must_use]
    pub fn as_slice(&self) -> &[ItemId] {
        &self.0
    }

    #[must_use]
    pub fn to_vec(&self) -> Vec<ItemId> {
        self.0.clone()
    }
}

/// Everything the user has entered so far. Each `with_*` call returns a
/// fresh snapshot and leaves `self` untouched.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SelectionState {
    contact: ContactFields,
    region: Choice<RegionCode>,
    locality: Choice<LocalityName>,
    position: Option<Coordinate>,
    items: SelectedItemSet,
}

impl SelectionState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn contact(&self) -> &ContactFields {
        &self.contact
    }

    #[must_use]
    pub fn region(&self) -> &Choice<RegionCode> {
        &self.region
    }

    #[must_use]
    pub fn locality(&self) -> &Choice<LocalityName> {
        &self.locality
    }

    #[must_use]
    pub fn position(&self) -> Option<Coordinate> {
        self.position
    }

    #[must_use]
    pub fn items(&self) -> &SelectedItemSet {
        &self.items
    }

    #[must_use]
    pub fn with_contact(&self, field: ContactField, value: impl Into<String>) -> Self {
        let mut next = self.clone();
        *next.contact.slot_mut(field) = value.into();
        next
    }

    /// Changing the region always drops the locality choice in the same
    /// snapshot.
    #[must_use]
    pub fn with_region(&self, region: Choice<RegionCode>) -> Self {
        if region == self.region {
            return self.clone();
        }
        Self {
            region,
            locality: Choice::Unselected,
            ..self.clone()
        }
    }

    #[must_use]
    pub fn with_locality(&self, locality: Choice<LocalityName>) -> Self {
        Self {
            locality,
            ..self.clone()
        }
    }

    #[must_use]
    pub fn with_position(&self, position: Coordinate) -> Self {
        Self {
            position: Some(position),
            ..self.clone()
        }
    }

    #[must_use]
    pub fn with_item_toggled(&self, id: ItemId) -> Self {
        let mut next = self.clone();
        next.items.toggle(id);
        next
    }
}

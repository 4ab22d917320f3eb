use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog::ItemId;
use crate::selection::{Choice, ContactField, SelectionState};
use crate::{AppError, ErrorKind};

/// Body of the point-creation request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmissionPayload {
    pub name: String,
    pub email: String,
    pub whatsapp: String,
    pub uf: String,
    pub city: String,
    pub latitude: f64,
    pub longitude: f64,
    pub items: Vec<ItemId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequiredField {
    Name,
    Email,
    Whatsapp,
    Region,
    Locality,
    Position,
}

impl RequiredField {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Email => "email",
            Self::Whatsapp => "whatsapp",
            Self::Region => "state",
            Self::Locality => "city",
            Self::Position => "map position",
        }
    }
}

impl From<ContactField> for RequiredField {
    fn from(field: ContactField) -> Self {
        match field {
            ContactField::Name => Self::Name,
            ContactField::Email => Self::Email,
            ContactField::Whatsapp => Self::Whatsapp,
        }
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SubmissionError {
    #[error("Missing fields: {}", labels(.0))]
    MissingFields(Vec<RequiredField>),
}

fn labels(fields: &[RequiredField]) -> String {
    fields
        .iter()
        .map(|f| f.label())
        .collect::<Vec<_>>()
        .join(", ")
}

impl From<SubmissionError> for AppError {
    fn from(e: SubmissionError) -> Self {
        let SubmissionError::MissingFields(fields) = &e;
        AppError::new(ErrorKind::Validation, e.to_string())
            .with_context("missing", labels(fields))
    }
}

/// Fields a snapshot still lacks, in form order.
#[must_use]
pub fn missing_fields(snapshot: &SelectionState) -> Vec<RequiredField> {
    let mut missing: Vec<RequiredField> = ContactField::ALL
        .into_iter()
        .filter(|f| snapshot.contact().get(*f).trim().is_empty())
        .map(RequiredField::from)
        .collect();

    if !snapshot.region().is_chosen() {
        missing.push(RequiredField::Region);
    }
    if !snapshot.locality().is_chosen() {
        missing.push(RequiredField::Locality);
    }
    if snapshot.position().is_none() {
        missing.push(RequiredField::Position);
    }
    missing
}

impl SubmissionPayload {
    /// Builds the payload from one snapshot. An empty item selection is
    /// accepted.
    pub fn from_snapshot(snapshot: &SelectionState) -> Result<Self, SubmissionError> {
        let missing = missing_fields(snapshot);
        let (Choice::Chosen(region), Choice::Chosen(locality), Some(position), true) = (
            snapshot.region(),
            snapshot.locality(),
            snapshot.position(),
            missing.is_empty(),
        ) else {
            return Err(SubmissionError::MissingFields(missing));
        };

        let contact = snapshot.contact();
        Ok(Self {
            name: contact.name.clone(),
            email: contact.email.clone(),
            whatsapp: contact.whatsapp.clone(),
            uf: region.to_string(),
            city: locality.to_string(),
            latitude: position.lat(),
            longitude: position.lng(),
            items: snapshot.items().to_vec(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selection::{Coordinate, LocalityName, RegionCode};

    fn complete_snapshot() -> SelectionState {
        SelectionState::new()
            .with_contact(ContactField::Name, "ONG X")
            .with_contact(ContactField::Email, "a@b.com")
            .with_contact(ContactField::Whatsapp, "119999")
            .with_region(Choice::Chosen(RegionCode::new("SP")))
            .with_locality(Choice::Chosen(LocalityName::new("Santos")))
            .with_position(Coordinate::new(-23.5, -46.6).unwrap())
            .with_item_toggled(ItemId(1))
            .with_item_toggled(ItemId(3))
    }

    #[test]
    fn test_payload_wire_shape() {
        let payload = SubmissionPayload::from_snapshot(&complete_snapshot()).unwrap();
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "name": "ONG X",
                "email": "a@b.com",
                "whatsapp": "119999",
                "uf": "SP",
                "city": "Santos",
                "latitude": -23.5,
                "longitude": -46.6,
                "items": [1, 3]
            })
        );
    }

    #[test]
    fn test_empty_items_are_valid() {
        let snapshot = complete_snapshot()
            .with_item_toggled(ItemId(1))
            .with_item_toggled(ItemId(3));
        let payload = SubmissionPayload::from_snapshot(&snapshot).unwrap();
        assert!(payload.items.is_empty());
    }

    #[test]
    fn test_missing_fields_listed_in_form_order() {
        let snapshot = SelectionState::new().with_contact(ContactField::Email, "a@b.com");
        assert_eq!(
            SubmissionPayload::from_snapshot(&snapshot),
            Err(SubmissionError::MissingFields(vec![
                RequiredField::Name,
                RequiredField::Whatsapp,
                RequiredField::Region,
                RequiredField::Locality,
                RequiredField::Position,
            ]))
        );
    }

    #[test]
    fn test_whitespace_only_counts_as_missing() {
        let snapshot = complete_snapshot().with_contact(ContactField::Name, "   ");
        assert_eq!(missing_fields(&snapshot), vec![RequiredField::Name]);
    }

    #[test]
    fn test_error_message() {
        let error: AppError =
            SubmissionError::MissingFields(vec![RequiredField::Region, RequiredField::Position])
                .into();
        assert_eq!(error.kind, ErrorKind::Validation);
        assert_eq!(error.message, "Missing fields: state, map position");
    }
}

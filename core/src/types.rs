//! Domain types for the events resource group.
//!
//! # Design
//! These mirror the Graph wire schema but are defined independently of the
//! mock server. Every entity is an immutable value whose identity is its `id`.
//! Optional text is `None` when absent or empty, never `""`.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DeserializeFromStr, NoneAsEmptyString, SerializeDisplay};

/// An `{id, name}` pair pointing at another Graph object.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Reference {
    pub id: String,
    pub name: String,
}

/// Who can see an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, SerializeDisplay, DeserializeFromStr)]
pub enum Privacy {
    Open,
    Closed,
    Secret,
}

impl fmt::Display for Privacy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Privacy::Open => "OPEN",
            Privacy::Closed => "CLOSED",
            Privacy::Secret => "SECRET",
        })
    }
}

impl FromStr for Privacy {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "OPEN" => Ok(Privacy::Open),
            "CLOSED" => Ok(Privacy::Closed),
            "SECRET" => Ok(Privacy::Secret),
            _ => Err(UnknownVariant::new("privacy", s)),
        }
    }
}

/// A respondent's reply to an event invitation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, SerializeDisplay, DeserializeFromStr)]
pub enum RsvpStatus {
    Attending,
    Unsure,
    NotReplied,
    Declined,
}

impl fmt::Display for RsvpStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RsvpStatus::Attending => "attending",
            RsvpStatus::Unsure => "unsure",
            RsvpStatus::NotReplied => "not_replied",
            RsvpStatus::Declined => "declined",
        })
    }
}

impl FromStr for RsvpStatus {
    type Err = UnknownVariant;

    /// Accepts the snake_case wire form in any case, plus the edge names
    /// `maybe` and `noreply`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "attending" => Ok(RsvpStatus::Attending),
            "unsure" | "maybe" => Ok(RsvpStatus::Unsure),
            "not_replied" | "noreply" => Ok(RsvpStatus::NotReplied),
            "declined" => Ok(RsvpStatus::Declined),
            _ => Err(UnknownVariant::new("rsvp status", s)),
        }
    }
}

/// A string that names none of an enum's variants.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} {value:?}")]
pub struct UnknownVariant {
    kind: &'static str,
    value: String,
}

impl UnknownVariant {
    fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}

/// An event as returned by `GET /{eventId}`.
#[serde_as]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Event {
    pub id: String,
    pub owner: Reference,
    pub name: String,
    pub privacy: Privacy,
    #[serde(with = "crate::time")]
    pub start_time: DateTime<Utc>,
    #[serde(with = "crate::time")]
    pub end_time: DateTime<Utc>,
    #[serde(with = "crate::time")]
    pub updated_time: DateTime<Utc>,
    #[serde_as(deserialize_as = "NoneAsEmptyString")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde_as(deserialize_as = "NoneAsEmptyString")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

/// A user's invitation to an event, from `GET /{userId}/events`.
///
/// The only payload where an rsvp status travels alongside event metadata.
#[serde_as]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Invitation {
    #[serde(rename = "id")]
    pub event_id: String,
    pub name: String,
    #[serde_as(deserialize_as = "NoneAsEmptyString")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(with = "crate::time")]
    pub start_time: DateTime<Utc>,
    #[serde(with = "crate::time")]
    pub end_time: DateTime<Utc>,
    pub rsvp_status: RsvpStatus,
}

/// One respondent on an event's invitee edge.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EventInvitee {
    pub id: String,
    pub name: String,
    pub rsvp_status: RsvpStatus,
}

/// Form payload for `POST /me/events`. Times are passed through verbatim.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewEvent {
    pub name: String,
    pub start_time: String,
    pub end_time: String,
}

/// The `{"id": "..."}` body answered by create calls.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct CreatedId {
    pub id: String,
}

/// A listing as the Graph API answers it, either wrapped in `data` or bare.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum Listing<T> {
    Envelope { data: Vec<T> },
    Bare(Vec<T>),
}

impl<T> Listing<T> {
    pub fn into_vec(self) -> Vec<T> {
        match self {
            Listing::Envelope { data } => data,
            Listing::Bare(items) => items,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn rsvp_status_parses_wire_and_edge_names() {
        assert_eq!("attending".parse::<RsvpStatus>().unwrap(), RsvpStatus::Attending);
        assert_eq!("NOT_REPLIED".parse::<RsvpStatus>().unwrap(), RsvpStatus::NotReplied);
        assert_eq!("maybe".parse::<RsvpStatus>().unwrap(), RsvpStatus::Unsure);
        assert_eq!("noreply".parse::<RsvpStatus>().unwrap(), RsvpStatus::NotReplied);
        assert!("interested".parse::<RsvpStatus>().is_err());
    }

    #[test]
    fn rsvp_status_serializes_snake_case() {
        let json = serde_json::to_value(RsvpStatus::NotReplied).unwrap();
        assert_eq!(json, "not_replied");
    }

    #[test]
    fn privacy_is_case_insensitive() {
        assert_eq!("open".parse::<Privacy>().unwrap(), Privacy::Open);
        assert_eq!("SECRET".parse::<Privacy>().unwrap(), Privacy::Secret);
        assert_eq!(serde_json::to_value(Privacy::Closed).unwrap(), "CLOSED");
    }

    #[test]
    fn invitee_rejects_unknown_rsvp_status() {
        let result: Result<EventInvitee, _> =
            serde_json::from_str(r#"{"id":"1","name":"A","rsvp_status":"interested"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn invitation_without_location_is_none() {
        let invitation: Invitation = serde_json::from_str(
            r#"{"id":"188420717869780","name":"Mow the lawn","start_time":"2011-03-26T15:00:00",
                "end_time":"2011-03-26T16:00:00","rsvp_status":"not_replied"}"#,
        )
        .unwrap();
        assert_eq!(invitation.event_id, "188420717869780");
        assert!(invitation.location.is_none());
        assert_eq!(
            invitation.start_time,
            Utc.with_ymd_and_hms(2011, 3, 26, 15, 0, 0).unwrap()
        );
    }

    #[test]
    fn empty_location_is_none() {
        let invitation: Invitation = serde_json::from_str(
            r#"{"id":"1","name":"x","location":"","start_time":"2011-03-26T15:00:00",
                "end_time":"2011-03-26T16:00:00","rsvp_status":"attending"}"#,
        )
        .unwrap();
        assert!(invitation.location.is_none());
    }

    #[test]
    fn absent_optional_text_is_omitted_when_serialized() {
        let event: Event = serde_json::from_str(
            r#"{"id":"7","owner":{"id":"1","name":"o"},"name":"x","privacy":"OPEN",
                "start_time":"2011-03-26T15:00:00","end_time":"2011-03-26T16:00:00",
                "updated_time":"2011-03-20T10:00:00+0000","location":""}"#,
        )
        .unwrap();
        let json = serde_json::to_value(&event).unwrap();
        assert!(json.get("description").is_none());
        assert!(json.get("location").is_none());

        let with_location = Event {
            location: Some("Hall".to_string()),
            ..event
        };
        let json = serde_json::to_value(&with_location).unwrap();
        assert_eq!(json["location"], "Hall");
        let back: Event = serde_json::from_value(json).unwrap();
        assert_eq!(back, with_location);
    }

    #[test]
    fn listing_accepts_envelope_and_bare_array() {
        let wrapped: Listing<Reference> =
            serde_json::from_str(r#"{"data":[{"id":"1","name":"a"}]}"#).unwrap();
        let bare: Listing<Reference> = serde_json::from_str(r#"[{"id":"1","name":"a"}]"#).unwrap();
        assert_eq!(wrapped.into_vec(), bare.into_vec());
    }
}

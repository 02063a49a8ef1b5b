//! Stateless HTTP request builder and response parser for the events API.
//!
//! # Design
//! `EventClient` holds only a base URL and the `Authorization` value derived
//! from a static access token. Each operation is split into a `build_*`
//! method that produces an `HttpRequest` and a `parse_*` method that consumes
//! an `HttpResponse`. The caller (or an `EventOperations` wrapping a
//! `Transport`) executes the round-trip in between.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::warn;

use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{CreatedId, Event, EventInvitee, Invitation, Listing, NewEvent};

/// Everything but RFC 3986 unreserved characters is escaped in path segments.
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'_').remove(b'.').remove(b'~');

/// The relationship lists hanging off an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InviteeEdge {
    Invited,
    Attending,
    Maybe,
    NoReply,
    Declined,
}

impl InviteeEdge {
    pub const ALL: [InviteeEdge; 5] = [
        InviteeEdge::Invited,
        InviteeEdge::Attending,
        InviteeEdge::Maybe,
        InviteeEdge::NoReply,
        InviteeEdge::Declined,
    ];

    /// Path segment under `/{eventId}/`.
    pub fn segment(self) -> &'static str {
        match self {
            InviteeEdge::Invited => "invited",
            InviteeEdge::Attending => "attending",
            InviteeEdge::Maybe => "maybe",
            InviteeEdge::NoReply => "noreply",
            InviteeEdge::Declined => "declined",
        }
    }
}

/// Synchronous, stateless client for the events resource group.
#[derive(Debug, Clone)]
pub struct EventClient {
    base_url: String,
    authorization: String,
}

impl EventClient {
    pub fn new(base_url: &str, access_token: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            authorization: format!("OAuth {access_token}"),
        }
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(&config.base_url, &config.access_token)
    }

    /// Each segment is percent-encoded, so ids cannot smuggle in `/`, `?` or `#`.
    fn request(&self, method: HttpMethod, segments: &[&str]) -> HttpRequest {
        let mut url = self.base_url.clone();
        for segment in segments {
            url.push('/');
            url.extend(utf8_percent_encode(segment, PATH_SEGMENT));
        }
        HttpRequest {
            method,
            url,
            headers: vec![("authorization".to_string(), self.authorization.clone())],
            body: None,
        }
    }

    // -----------------------------------------------------------------------
    // Invitations
    // -----------------------------------------------------------------------

    /// Invitations of the token's owner.
    pub fn build_get_invitations(&self) -> HttpRequest {
        self.build_get_invitations_for("me")
    }

    pub fn build_get_invitations_for(&self, user_id: &str) -> HttpRequest {
        self.request(HttpMethod::Get, &[user_id, "events"])
    }

    pub fn parse_get_invitations(&self, response: HttpResponse) -> Result<Vec<Invitation>, ApiError> {
        parse_listing(response)
    }

    // -----------------------------------------------------------------------
    // Events
    // -----------------------------------------------------------------------

    pub fn build_get_event(&self, event_id: &str) -> HttpRequest {
        self.request(HttpMethod::Get, &[event_id])
    }

    pub fn parse_get_event(&self, response: HttpResponse) -> Result<Event, ApiError> {
        check_status(&response)?;
        parse_json(&response.body)
    }

    /// `start_time` and `end_time` are sent exactly as given.
    pub fn build_create_event(
        &self,
        name: &str,
        start_time: &str,
        end_time: &str,
    ) -> Result<HttpRequest, ApiError> {
        let form = NewEvent {
            name: name.to_string(),
            start_time: start_time.to_string(),
            end_time: end_time.to_string(),
        };
        let body = serde_urlencoded::to_string(&form)
            .map_err(|e| ApiError::SerializationError(e.to_string()))?;

        let mut request = self.request(HttpMethod::Post, &["me", "events"]);
        request.headers.push((
            "content-type".to_string(),
            "application/x-www-form-urlencoded".to_string(),
        ));
        request.body = Some(body);
        Ok(request)
    }

    /// Returns the id of the new event.
    pub fn parse_create_event(&self, response: HttpResponse) -> Result<String, ApiError> {
        check_status(&response)?;
        let created: CreatedId = parse_json(&response.body)?;
        Ok(created.id)
    }

    pub fn build_delete_event(&self, event_id: &str) -> HttpRequest {
        self.request(HttpMethod::Delete, &[event_id])
    }

    /// A literal `false` body is `ApiError::Rejected`.
    pub fn parse_delete_event(&self, response: HttpResponse) -> Result<(), ApiError> {
        parse_confirmation(response, "delete event")
    }

    // -----------------------------------------------------------------------
    // Invitees
    // -----------------------------------------------------------------------

    pub fn build_get_invitees(&self, event_id: &str, edge: InviteeEdge) -> HttpRequest {
        self.request(HttpMethod::Get, &[event_id, edge.segment()])
    }

    /// Order of the response array is preserved.
    pub fn parse_get_invitees(&self, response: HttpResponse) -> Result<Vec<EventInvitee>, ApiError> {
        parse_listing(response)
    }

    pub fn build_get_invited(&self, event_id: &str) -> HttpRequest {
        self.build_get_invitees(event_id, InviteeEdge::Invited)
    }

    pub fn build_get_attending(&self, event_id: &str) -> HttpRequest {
        self.build_get_invitees(event_id, InviteeEdge::Attending)
    }

    pub fn build_get_maybe_attending(&self, event_id: &str) -> HttpRequest {
        self.build_get_invitees(event_id, InviteeEdge::Maybe)
    }

    pub fn build_get_no_replies(&self, event_id: &str) -> HttpRequest {
        self.build_get_invitees(event_id, InviteeEdge::NoReply)
    }

    pub fn build_get_declined(&self, event_id: &str) -> HttpRequest {
        self.build_get_invitees(event_id, InviteeEdge::Declined)
    }

    // -----------------------------------------------------------------------
    // RSVP
    // -----------------------------------------------------------------------

    pub fn build_accept_invitation(&self, event_id: &str) -> HttpRequest {
        self.request(HttpMethod::Post, &[event_id, "attending"])
    }

    /// A literal `false` body is `ApiError::Rejected`.
    pub fn parse_accept_invitation(&self, response: HttpResponse) -> Result<(), ApiError> {
        parse_confirmation(response, "accept invitation")
    }

    pub fn build_maybe_invitation(&self, event_id: &str) -> HttpRequest {
        self.request(HttpMethod::Post, &[event_id, "maybe"])
    }

    /// A literal `false` body is `ApiError::Rejected`.
    pub fn parse_maybe_invitation(&self, response: HttpResponse) -> Result<(), ApiError> {
        parse_confirmation(response, "maybe invitation")
    }

    pub fn build_decline_invitation(&self, event_id: &str) -> HttpRequest {
        self.request(HttpMethod::Post, &[event_id, "declined"])
    }

    /// Succeeds on a literal `true`; a literal `false` is `ApiError::Rejected`.
    pub fn parse_decline_invitation(&self, response: HttpResponse) -> Result<(), ApiError> {
        parse_confirmation(response, "decline invitation")
    }
}

#[derive(Debug, Deserialize)]
struct GraphErrorBody {
    error: GraphErrorDetail,
}

#[derive(Debug, Deserialize)]
struct GraphErrorDetail {
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(default)]
    message: String,
}

/// Map non-2xx status codes to the appropriate `ApiError` variant.
fn check_status(response: &HttpResponse) -> Result<(), ApiError> {
    if (200..=299).contains(&response.status) {
        return Ok(());
    }
    warn!(status = response.status, "unexpected status from graph api");
    if response.status == 404 {
        return Err(ApiError::NotFound);
    }
    if let Ok(GraphErrorBody { error }) = serde_json::from_str(&response.body) {
        return Err(ApiError::Graph {
            status: response.status,
            kind: error.kind,
            message: error.message,
        });
    }
    Err(ApiError::HttpError {
        status: response.status,
        body: response.body.clone(),
    })
}

fn parse_json<T: DeserializeOwned>(body: &str) -> Result<T, ApiError> {
    serde_json::from_str(body).map_err(|e| ApiError::DeserializationError(e.to_string()))
}

fn parse_listing<T: DeserializeOwned>(response: HttpResponse) -> Result<Vec<T>, ApiError> {
    check_status(&response)?;
    let listing: Listing<T> = parse_json(&response.body)?;
    Ok(listing.into_vec())
}

/// Boolean endpoints answer a literal `true` or `false`.
fn parse_confirmation(response: HttpResponse, operation: &'static str) -> Result<(), ApiError> {
    check_status(&response)?;
    if parse_json::<bool>(response.body.trim())? {
        Ok(())
    } else {
        Err(ApiError::Rejected { operation })
    }
}

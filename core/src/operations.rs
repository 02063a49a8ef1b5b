//! Blocking convenience layer over `EventClient`.
//!
//! `EventOperations` pairs the stateless client with a `Transport` and runs
//! build, execute, and parse as one call. Every method is a single
//! synchronous round trip; nothing retries or paginates.

use tracing::debug;

use crate::client::{EventClient, InviteeEdge};
use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse};
use crate::types::{Event, EventInvitee, Invitation};

/// Executes an `HttpRequest` and hands back whatever the server answered.
///
/// Implementations return non-2xx responses as data; `Err` is reserved for
/// failures that produced no response at all.
pub trait Transport {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        (**self).execute(request)
    }
}

pub struct EventOperations<T> {
    client: EventClient,
    transport: T,
}

impl<T: Transport> EventOperations<T> {
    pub fn new(client: EventClient, transport: T) -> Self {
        Self { client, transport }
    }

    pub fn client(&self) -> &EventClient {
        &self.client
    }

    fn send(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        debug!(method = request.method.as_str(), url = %request.url, "sending graph request");
        let response = self.transport.execute(request)?;
        debug!(status = response.status, "graph response received");
        Ok(response)
    }

    pub fn get_invitations(&self) -> Result<Vec<Invitation>, ApiError> {
        let response = self.send(self.client.build_get_invitations())?;
        self.client.parse_get_invitations(response)
    }

    pub fn get_invitations_for(&self, user_id: &str) -> Result<Vec<Invitation>, ApiError> {
        let response = self.send(self.client.build_get_invitations_for(user_id))?;
        self.client.parse_get_invitations(response)
    }

    pub fn get_event(&self, event_id: &str) -> Result<Event, ApiError> {
        let response = self.send(self.client.build_get_event(event_id))?;
        self.client.parse_get_event(response)
    }

    /// Creates an event owned by the token's user and returns its id.
    pub fn create_event(&self, name: &str, start_time: &str, end_time: &str) -> Result<String, ApiError> {
        let request = self.client.build_create_event(name, start_time, end_time)?;
        let response = self.send(request)?;
        self.client.parse_create_event(response)
    }

    /// A literal `false` from the API is `ApiError::Rejected`.
    pub fn delete_event(&self, event_id: &str) -> Result<(), ApiError> {
        let response = self.send(self.client.build_delete_event(event_id))?;
        self.client.parse_delete_event(response)
    }

    pub fn get_invitees(&self, event_id: &str, edge: InviteeEdge) -> Result<Vec<EventInvitee>, ApiError> {
        let response = self.send(self.client.build_get_invitees(event_id, edge))?;
        self.client.parse_get_invitees(response)
    }

    pub fn get_invited(&self, event_id: &str) -> Result<Vec<EventInvitee>, ApiError> {
        self.get_invitees(event_id, InviteeEdge::Invited)
    }

    pub fn get_attending(&self, event_id: &str) -> Result<Vec<EventInvitee>, ApiError> {
        self.get_invitees(event_id, InviteeEdge::Attending)
    }

    pub fn get_maybe_attending(&self, event_id: &str) -> Result<Vec<EventInvitee>, ApiError> {
        self.get_invitees(event_id, InviteeEdge::Maybe)
    }

    pub fn get_no_replies(&self, event_id: &str) -> Result<Vec<EventInvitee>, ApiError> {
        self.get_invitees(event_id, InviteeEdge::NoReply)
    }

    pub fn get_declined(&self, event_id: &str) -> Result<Vec<EventInvitee>, ApiError> {
        self.get_invitees(event_id, InviteeEdge::Declined)
    }

    /// Answer "attending". A literal `false` from the API is `ApiError::Rejected`.
    pub fn accept_invitation(&self, event_id: &str) -> Result<(), ApiError> {
        let response = self.send(self.client.build_accept_invitation(event_id))?;
        self.client.parse_accept_invitation(response)
    }

    /// Answer "maybe". A literal `false` from the API is `ApiError::Rejected`.
    pub fn maybe_invitation(&self, event_id: &str) -> Result<(), ApiError> {
        let response = self.send(self.client.build_maybe_invitation(event_id))?;
        self.client.parse_maybe_invitation(response)
    }

    /// Decline the invitation.
    ///
    /// Succeeds only on a literal `true` body; `false` is `ApiError::Rejected`
    /// rather than a silent success.
    pub fn decline_invitation(&self, event_id: &str) -> Result<(), ApiError> {
        let response = self.send(self.client.build_decline_invitation(event_id))?;
        self.client.parse_decline_invitation(response)
    }
}

#[cfg(feature = "blocking")]
mod blocking {
    use super::*;
    use crate::config::ClientConfig;
    use crate::http::HttpMethod;

    /// `Transport` backed by a `ureq` agent.
    #[derive(Clone)]
    pub struct UreqTransport {
        agent: ureq::Agent,
    }

    impl UreqTransport {
        pub fn new() -> Self {
            let agent = ureq::Agent::config_builder()
                .http_status_as_error(false)
                .build()
                .new_agent();
            Self { agent }
        }
    }

    impl Default for UreqTransport {
        fn default() -> Self {
            Self::new()
        }
    }

    fn with_headers<B>(
        mut builder: ureq::RequestBuilder<B>,
        headers: &[(String, String)],
    ) -> ureq::RequestBuilder<B> {
        for (name, value) in headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        builder
    }

    impl Transport for UreqTransport {
        fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
            let HttpRequest {
                method,
                url,
                headers,
                body,
            } = request;

            let result = match (method, body) {
                (HttpMethod::Get, _) => with_headers(self.agent.get(&url), &headers).call(),
                (HttpMethod::Delete, _) => with_headers(self.agent.delete(&url), &headers).call(),
                (HttpMethod::Post, Some(body)) => {
                    with_headers(self.agent.post(&url), &headers).send(body.as_bytes())
                }
                (HttpMethod::Post, None) => with_headers(self.agent.post(&url), &headers).send_empty(),
            };
            let mut response = result.map_err(|e| ApiError::Transport(e.to_string()))?;

            let status = response.status().as_u16();
            let headers = response
                .headers()
                .iter()
                .filter_map(|(name, value)| {
                    value
                        .to_str()
                        .ok()
                        .map(|value| (name.as_str().to_string(), value.to_string()))
                })
                .collect();
            let body = response
                .body_mut()
                .read_to_string()
                .map_err(|e| ApiError::Transport(e.to_string()))?;

            Ok(HttpResponse {
                status,
                headers,
                body,
            })
        }
    }

    impl EventOperations<UreqTransport> {
        /// Operations over a fresh `ureq` agent.
        pub fn from_config(config: &ClientConfig) -> Self {
            Self::new(EventClient::from_config(config), UreqTransport::new())
        }
    }
}

#[cfg(feature = "blocking")]
pub use blocking::UreqTransport;

use std::{collections::BTreeMap, sync::Arc};

use axum::{
    extract::{Path, State},
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::{net::TcpListener, sync::RwLock};
use tracing::{debug, info, warn};

pub const DEFAULT_ACCESS_TOKEN: &str = "someAccessToken";

/// Id handed to the first event created through `POST /me/events`.
pub const FIRST_CREATED_ID: u64 = 193_482_145_020_832;

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Rsvp {
    Attending,
    Unsure,
    NotReplied,
    Declined,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Reference {
    pub id: String,
    pub name: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Event {
    pub id: String,
    pub owner: Reference,
    pub name: String,
    pub privacy: String,
    pub start_time: String,
    pub end_time: String,
    pub updated_time: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Invitee {
    pub id: String,
    pub name: String,
    pub rsvp_status: Rsvp,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Invitation {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    pub start_time: String,
    pub end_time: String,
    pub rsvp_status: Rsvp,
}

#[derive(Debug, Deserialize)]
pub struct NewEvent {
    pub name: String,
    pub start_time: String,
    pub end_time: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Listing<T> {
    pub data: Vec<T>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Created {
    pub id: String,
}

/// Graph-style failure, rendered as `{"error": {"type", "message"}}`.
#[derive(Debug)]
pub struct GraphError {
    status: StatusCode,
    kind: &'static str,
    message: String,
}

impl GraphError {
    fn oauth(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            kind: "OAuthException",
            message: message.into(),
        }
    }

    fn permission(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::FORBIDDEN,
            kind: "OAuthException",
            message: message.into(),
        }
    }

    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            kind: "GraphMethodException",
            message: message.into(),
        }
    }

    fn not_found(id: &str) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            kind: "GraphMethodException",
            message: format!("Unsupported request. Object with ID '{id}' does not exist"),
        }
    }
}

impl IntoResponse for GraphError {
    fn into_response(self) -> Response {
        warn!(status = self.status.as_u16(), kind = self.kind, message = %self.message, "rejecting request");
        let body = json!({ "error": { "type": self.kind, "message": self.message } });
        (self.status, Json(body)).into_response()
    }
}

/// In-memory social graph: events, their invitees, and the token's owner.
#[derive(Debug)]
pub struct Graph {
    access_token: String,
    me: Reference,
    events: BTreeMap<String, Event>,
    invitees: BTreeMap<String, Vec<Invitee>>,
    next_id: u64,
}

impl Graph {
    pub fn empty(access_token: &str, me: Reference) -> Self {
        Self {
            access_token: access_token.to_string(),
            me,
            events: BTreeMap::new(),
            invitees: BTreeMap::new(),
            next_id: FIRST_CREATED_ID,
        }
    }

    /// Graph holding the breakdancing class owned by the current user, Art
    /// Names, and two events others invited them to.
    pub fn seeded(access_token: &str) -> Self {
        let art = reference("100001387295207", "Art Names");
        let craig = reference("738140579", "Craig Walls");
        let chuck = reference("975041837", "Chuck Wagon");

        let mut graph = Self::empty(access_token, art.clone());
        graph.insert_event(
            Event {
                id: "193482154020832".to_string(),
                owner: art.clone(),
                name: "Breakdancing Class".to_string(),
                privacy: "OPEN".to_string(),
                start_time: "2011-03-30T14:30:00".to_string(),
                end_time: "2011-03-30T17:30:00".to_string(),
                updated_time: "2011-03-30T14:30:28+0000".to_string(),
                description: None,
                location: None,
            },
            vec![
                invitee(&art, Rsvp::Attending),
                invitee(&craig, Rsvp::Unsure),
                invitee(&chuck, Rsvp::NotReplied),
            ],
        );
        graph.insert_event(
            Event {
                id: "188420717869087".to_string(),
                owner: craig.clone(),
                name: "Afternoon naptime".to_string(),
                privacy: "CLOSED".to_string(),
                start_time: "2011-03-26T14:00:00".to_string(),
                end_time: "2011-03-26T15:00:00".to_string(),
                updated_time: "2011-03-25T09:12:44+0000".to_string(),
                description: None,
                location: Some("On the couch".to_string()),
            },
            vec![invitee(&craig, Rsvp::Attending), invitee(&art, Rsvp::Attending)],
        );
        graph.insert_event(
            Event {
                id: "188420717869780".to_string(),
                owner: chuck.clone(),
                name: "Mow the lawn".to_string(),
                privacy: "SECRET".to_string(),
                start_time: "2011-03-26T15:00:00".to_string(),
                end_time: "2011-03-26T16:00:00".to_string(),
                updated_time: "2011-03-25T09:20:02+0000".to_string(),
                description: None,
                location: None,
            },
            vec![invitee(&chuck, Rsvp::Attending), invitee(&art, Rsvp::NotReplied)],
        );
        graph
    }

    pub fn insert_event(&mut self, event: Event, invitees: Vec<Invitee>) {
        self.invitees.insert(event.id.clone(), invitees);
        self.events.insert(event.id.clone(), event);
    }

    fn resolve_user<'a>(&'a self, user_id: &'a str) -> &'a str {
        if user_id == "me" {
            &self.me.id
        } else {
            user_id
        }
    }

    /// Every event `user_id` appears on, ordered by event id.
    pub fn invitations_for(&self, user_id: &str) -> Vec<Invitation> {
        self.invitees
            .iter()
            .filter_map(|(event_id, invitees)| {
                let status = invitees.iter().find(|i| i.id == user_id)?.rsvp_status;
                let event = self.events.get(event_id)?;
                Some(Invitation {
                    id: event.id.clone(),
                    name: event.name.clone(),
                    location: event.location.clone(),
                    start_time: event.start_time.clone(),
                    end_time: event.end_time.clone(),
                    rsvp_status: status,
                })
            })
            .collect()
    }

    /// Create an event owned by the current user, who is marked attending.
    pub fn create_event(&mut self, form: NewEvent) -> Result<String, GraphError> {
        if form.name.trim().is_empty() {
            return Err(GraphError::bad_request("(#100) name is required"));
        }
        let id = self.next_id.to_string();
        self.next_id += 1;

        let event = Event {
            id: id.clone(),
            owner: self.me.clone(),
            name: form.name,
            privacy: "OPEN".to_string(),
            start_time: form.start_time,
            end_time: form.end_time,
            updated_time: Utc::now().format("%Y-%m-%dT%H:%M:%S+0000").to_string(),
            description: None,
            location: None,
        };
        let invitees = vec![invitee(&self.me, Rsvp::Attending)];
        self.insert_event(event, invitees);
        Ok(id)
    }

    /// Set the current user's reply, adding them to the invitees if needed.
    pub fn set_rsvp(&mut self, event_id: &str, status: Rsvp) -> Result<(), GraphError> {
        let me = self.me.clone();
        let invitees = self
            .invitees
            .get_mut(event_id)
            .ok_or_else(|| GraphError::not_found(event_id))?;
        match invitees.iter_mut().find(|i| i.id == me.id) {
            Some(existing) => existing.rsvp_status = status,
            None => invitees.push(invitee(&me, status)),
        }
        Ok(())
    }

    pub fn delete_event(&mut self, event_id: &str) -> Result<(), GraphError> {
        let event = self
            .events
            .get(event_id)
            .ok_or_else(|| GraphError::not_found(event_id))?;
        if event.owner.id != self.me.id {
            return Err(GraphError::permission("(#200) Only the owner can delete an event"));
        }
        self.events.remove(event_id);
        self.invitees.remove(event_id);
        Ok(())
    }
}

fn reference(id: &str, name: &str) -> Reference {
    Reference {
        id: id.to_string(),
        name: name.to_string(),
    }
}

fn invitee(who: &Reference, rsvp_status: Rsvp) -> Invitee {
    Invitee {
        id: who.id.clone(),
        name: who.name.clone(),
        rsvp_status,
    }
}

/// Status filter of an invitee edge; `invited` lists everyone.
fn edge_filter(edge: &str) -> Result<Option<Rsvp>, GraphError> {
    match edge {
        "invited" => Ok(None),
        "attending" => Ok(Some(Rsvp::Attending)),
        "maybe" => Ok(Some(Rsvp::Unsure)),
        "noreply" => Ok(Some(Rsvp::NotReplied)),
        "declined" => Ok(Some(Rsvp::Declined)),
        other => Err(GraphError::bad_request(format!("Unknown path components: /{other}"))),
    }
}

pub type Db = Arc<RwLock<Graph>>;

pub fn app() -> Router {
    app_with(Graph::seeded(DEFAULT_ACCESS_TOKEN))
}

pub fn app_with(graph: Graph) -> Router {
    let db: Db = Arc::new(RwLock::new(graph));
    Router::new()
        .route("/{id}", get(get_event).delete(delete_event))
        .route("/{id}/{edge}", get(get_edge).post(post_edge))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    run_with(listener, Graph::seeded(DEFAULT_ACCESS_TOKEN)).await
}

pub async fn run_with(listener: TcpListener, graph: Graph) -> Result<(), std::io::Error> {
    axum::serve(listener, app_with(graph)).await
}

fn authorize(headers: &HeaderMap, graph: &Graph) -> Result<(), GraphError> {
    let expected = format!("OAuth {}", graph.access_token);
    match headers.get(AUTHORIZATION).and_then(|value| value.to_str().ok()) {
        Some(value) if value == expected => Ok(()),
        Some(_) => Err(GraphError::oauth("Invalid OAuth access token.")),
        None => Err(GraphError::oauth(
            "An active access token must be used to query information about the current user.",
        )),
    }
}

async fn get_event(
    State(db): State<Db>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<Event>, GraphError> {
    let graph = db.read().await;
    authorize(&headers, &graph)?;
    graph
        .events
        .get(&id)
        .cloned()
        .map(Json)
        .ok_or_else(|| GraphError::not_found(&id))
}

async fn delete_event(
    State(db): State<Db>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<bool>, GraphError> {
    let mut graph = db.write().await;
    authorize(&headers, &graph)?;
    graph.delete_event(&id)?;
    info!(event_id = %id, "event deleted");
    Ok(Json(true))
}

async fn get_edge(
    State(db): State<Db>,
    headers: HeaderMap,
    Path((id, edge)): Path<(String, String)>,
) -> Result<Response, GraphError> {
    let graph = db.read().await;
    authorize(&headers, &graph)?;

    if edge == "events" {
        let data = graph.invitations_for(graph.resolve_user(&id));
        debug!(user = %id, count = data.len(), "listing invitations");
        return Ok(Json(Listing { data }).into_response());
    }

    let filter = edge_filter(&edge)?;
    let invitees = graph.invitees.get(&id).ok_or_else(|| GraphError::not_found(&id))?;
    let data: Vec<Invitee> = invitees
        .iter()
        .filter(|i| filter.map_or(true, |status| i.rsvp_status == status))
        .cloned()
        .collect();
    debug!(event_id = %id, edge = %edge, count = data.len(), "listing invitees");
    Ok(Json(Listing { data }).into_response())
}

async fn post_edge(
    State(db): State<Db>,
    headers: HeaderMap,
    Path((id, edge)): Path<(String, String)>,
    body: String,
) -> Result<Response, GraphError> {
    let mut graph = db.write().await;
    authorize(&headers, &graph)?;

    if edge == "events" {
        if graph.resolve_user(&id) != graph.me.id {
            return Err(GraphError::permission("(#200) Cannot create events for another user"));
        }
        let form: NewEvent = serde_urlencoded::from_str(&body)
            .map_err(|e| GraphError::bad_request(format!("(#100) Invalid event form: {e}")))?;
        let created = graph.create_event(form)?;
        info!(event_id = %created, "event created");
        return Ok(Json(Created { id: created }).into_response());
    }

    let status = match edge_filter(&edge)? {
        Some(status) if status != Rsvp::NotReplied => status,
        _ => return Err(GraphError::bad_request(format!("(#100) Cannot post to /{edge}"))),
    };
    graph.set_rsvp(&id, status)?;
    info!(event_id = %id, edge = %edge, "rsvp updated");
    Ok(Json(true).into_response())
}

//! Event lifecycle test against the live mock server.
//!
//! # Design
//! Starts the mock server on a random port, then drives every operation over
//! real HTTP through `EventOperations` and `UreqTransport`. Validates that
//! request building and response parsing agree with an actual server.

use chrono::{TimeZone, Utc};
use events_core::{
    ApiError, ClientConfig, EventClient, EventOperations, Privacy, RsvpStatus, UreqTransport,
};

const EVENT: &str = "193482154020832";

fn start_mock_server() -> std::net::SocketAddr {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_graph::run(listener).await
        })
        .unwrap();
    });

    addr
}

#[test]
fn event_lifecycle() {
    let addr = start_mock_server();
    let config = ClientConfig {
        base_url: format!("http://{addr}"),
        access_token: mock_graph::DEFAULT_ACCESS_TOKEN.to_string(),
    };
    let graph = EventOperations::from_config(&config);

    // Step 1: own invitations, ordered by event id.
    let invitations = graph.get_invitations().unwrap();
    assert_eq!(invitations.len(), 3);
    assert_eq!(invitations[0].event_id, "188420717869087");
    assert_eq!(invitations[0].location.as_deref(), Some("On the couch"));
    assert_eq!(
        invitations[0].start_time,
        Utc.with_ymd_and_hms(2011, 3, 26, 14, 0, 0).unwrap()
    );
    assert_eq!(invitations[1].rsvp_status, RsvpStatus::NotReplied);
    assert!(invitations[1].location.is_none());

    // Step 2: someone else's invitations.
    let craig = graph.get_invitations_for("738140579").unwrap();
    assert_eq!(craig.len(), 2);

    // Step 3: fetch the seeded event.
    let event = graph.get_event(EVENT).unwrap();
    assert_eq!(event.name, "Breakdancing Class");
    assert_eq!(event.owner.name, "Art Names");
    assert_eq!(event.privacy, Privacy::Open);
    assert_eq!(
        event.updated_time,
        Utc.with_ymd_and_hms(2011, 3, 30, 14, 30, 28).unwrap()
    );
    assert!(event.description.is_none());

    // Step 4: invitee edges.
    let invited = graph.get_invited(EVENT).unwrap();
    let statuses: Vec<RsvpStatus> = invited.iter().map(|i| i.rsvp_status).collect();
    assert_eq!(
        statuses,
        [RsvpStatus::Attending, RsvpStatus::Unsure, RsvpStatus::NotReplied]
    );
    assert_eq!(graph.get_attending(EVENT).unwrap().len(), 1);
    assert_eq!(graph.get_maybe_attending(EVENT).unwrap()[0].id, "738140579");
    assert_eq!(graph.get_no_replies(EVENT).unwrap()[0].id, "975041837");
    assert!(graph.get_declined(EVENT).unwrap().is_empty());

    // Step 5: decline, then see it on the declined edge.
    graph.decline_invitation(EVENT).unwrap();
    let declined = graph.get_declined(EVENT).unwrap();
    assert_eq!(declined.len(), 1);
    assert_eq!(declined[0].id, "100001387295207");

    // Step 6: maybe, then accept.
    graph.maybe_invitation(EVENT).unwrap();
    assert_eq!(graph.get_maybe_attending(EVENT).unwrap().len(), 2);
    graph.accept_invitation(EVENT).unwrap();
    assert_eq!(graph.get_attending(EVENT).unwrap().len(), 1);

    // Step 7: create an event; times are stored verbatim and read back as UTC.
    let id = graph
        .create_event("Test Event", "2011-04-01T15:30:00", "2011-04-01T18:30:00")
        .unwrap();
    assert_eq!(id, "193482145020832");
    let created = graph.get_event(&id).unwrap();
    assert_eq!(created.name, "Test Event");
    assert_eq!(
        created.start_time,
        Utc.with_ymd_and_hms(2011, 4, 1, 15, 30, 0).unwrap()
    );
    let attending = graph.get_attending(&id).unwrap();
    assert_eq!(attending.len(), 1);

    // Step 8: delete it.
    graph.delete_event(&id).unwrap();
    let err = graph.get_event(&id).unwrap_err();
    assert!(matches!(err, ApiError::NotFound));

    // Step 9: deleting someone else's event is refused.
    let err = graph.delete_event("188420717869087").unwrap_err();
    assert!(matches!(err, ApiError::Graph { status: 403, .. }));
}

#[test]
fn bad_token_surfaces_oauth_exception() {
    let addr = start_mock_server();
    let graph = EventOperations::new(
        EventClient::new(&format!("http://{addr}"), "expired"),
        UreqTransport::new(),
    );

    let err = graph.get_invitations().unwrap_err();
    match err {
        ApiError::Graph { status, kind, .. } => {
            assert_eq!(status, 400);
            assert_eq!(kind, "OAuthException");
        }
        other => panic!("expected OAuthException, got {other:?}"),
    }
}

#[test]
fn unreachable_server_is_a_transport_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let graph = EventOperations::new(EventClient::new(&format!("http://{addr}"), "t"), UreqTransport::new());
    let err = graph.get_event(EVENT).unwrap_err();
    assert!(matches!(err, ApiError::Transport(_)));
}

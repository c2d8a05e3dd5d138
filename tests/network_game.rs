//! Full game over real sockets: two client sessions against the
//! coordinator, each running its own rule engine, playing to checkmate.

use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;

use backend::matchmaker::Matchmaker;
use chess_engine::{Color, GameObserver, GameStatus, Square};
use netchess::NetworkSession;

/// Observer that ignores everything; the assertions read session state.
struct SilentView;

impl GameObserver for SilentView {}

async fn start_server() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind ephemeral port");
    let addr = listener.local_addr().expect("local addr").to_string();
    tokio::spawn(backend::serve(listener, Arc::new(Matchmaker::new())));
    addr
}

async fn connect(addr: &str, name: &str) -> Arc<NetworkSession> {
    let session = NetworkSession::connect(addr, name, Arc::new(SilentView))
        .await
        .expect("connect");
    {
        let session = session.clone();
        tokio::spawn(async move {
            let _ = session.run().await;
        });
    }
    session
}

/// Poll until `condition` holds or a generous timeout passes.
async fn wait_for(what: &str, mut condition: impl FnMut() -> bool) {
    for _ in 0..500 {
        if condition() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("timed out waiting for {what}");
}

fn sq(s: &str) -> Square {
    s.parse().unwrap()
}

#[tokio::test]
async fn test_fools_mate_over_the_wire() {
    let addr = start_server().await;

    let alice = connect(&addr, "alice").await;
    let bob = connect(&addr, "bob").await;

    wait_for("both sessions to be seated", || {
        alice.my_color().is_some() && bob.my_color().is_some()
    })
    .await;

    assert_eq!(alice.my_color(), Some(Color::White), "first join plays White");
    assert_eq!(bob.my_color(), Some(Color::Black));
    assert_eq!(alice.opponent_name().as_deref(), Some("bob"));
    assert_eq!(bob.opponent_name().as_deref(), Some("alice"));

    // Fool's mate: 1. f3 e5 2. g4 Qh4#
    assert!(alice.submit_move(sq("f2"), sq("f3")).await.expect("send"));
    wait_for("black to receive 1. f3", || bob.ply_count() == 1).await;

    assert!(bob.submit_move(sq("e7"), sq("e5")).await.expect("send"));
    wait_for("white to receive 1... e5", || alice.ply_count() == 2).await;

    assert!(alice.submit_move(sq("g2"), sq("g4")).await.expect("send"));
    wait_for("black to receive 2. g4", || bob.ply_count() == 3).await;

    assert!(bob.submit_move(sq("d8"), sq("h4")).await.expect("send"));

    // Both engines reach the same verdict independently
    wait_for("white to see the mate", || {
        alice.status() == GameStatus::Won { winner: Color::Black }
    })
    .await;
    assert_eq!(bob.status(), GameStatus::Won { winner: Color::Black });
    assert!(bob.is_finished());
    wait_for("white session to finish", || alice.is_finished()).await;

    // Nothing more is accepted after the mate
    assert!(!alice.submit_move(sq("e2"), sq("e4")).await.expect("send"));
}

#[tokio::test]
async fn test_local_engine_refuses_out_of_turn_and_illegal_moves() {
    let addr = start_server().await;

    let alice = connect(&addr, "alice").await;
    let bob = connect(&addr, "bob").await;
    wait_for("both sessions to be seated", || {
        alice.my_color().is_some() && bob.my_color().is_some()
    })
    .await;

    assert!(
        !bob.submit_move(sq("e7"), sq("e5")).await.expect("send"),
        "black may not open the game"
    );
    assert!(
        !alice.submit_move(sq("e2"), sq("e5")).await.expect("send"),
        "a three-square pawn jump never leaves the client"
    );
    assert_eq!(alice.ply_count(), 0);
    assert_eq!(bob.ply_count(), 0);

    assert!(alice.submit_move(sq("e2"), sq("e4")).await.expect("send"));
    wait_for("the one legal move to arrive", || bob.ply_count() == 1).await;
    assert_eq!(bob.current_turn(), Color::Black);
}

#[tokio::test]
async fn test_disconnect_finishes_survivor_session() {
    let addr = start_server().await;

    let alice = connect(&addr, "alice").await;
    let bob = connect(&addr, "bob").await;
    wait_for("both sessions to be seated", || {
        alice.my_color().is_some() && bob.my_color().is_some()
    })
    .await;

    alice.disconnect().await;
    wait_for("bob to win by default", || bob.is_finished()).await;
}

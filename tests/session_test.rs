//! Session controller tests: guards, snapshot replacement, the in-flight
//! request lock, and the spawned score credit.

mod stub;

use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::time::Duration;
use stub::StubState;
use tokio::sync::mpsc;
use ttt_tui::{ApiClient, Cell, GameSession, GameStatus, Mark, MoveOutcome, SessionEvent};

fn session_for(url: String) -> (GameSession, mpsc::UnboundedReceiver<SessionEvent>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (GameSession::new(ApiClient::new(Some(url)), tx), rx)
}

async fn next_event(rx: &mut mpsc::UnboundedReceiver<SessionEvent>) -> SessionEvent {
    tokio::time::timeout(Duration::from_secs(2), rx.recv())
        .await
        .expect("no session event")
        .expect("event channel closed")
}

/// Receives the next outcome and feeds it back into the session, the way the
/// UI loop does. Returns the banner text for failures.
async fn pump(
    session: &mut GameSession,
    rx: &mut mpsc::UnboundedReceiver<SessionEvent>,
) -> Option<String> {
    let event = next_event(rx).await;
    session.handle_event(event)
}

/// Starts a game and drives it to completion.
async fn start(session: &mut GameSession, rx: &mut mpsc::UnboundedReceiver<SessionEvent>) {
    session.start_game("Alice", "Guest");
    assert!(session.is_busy());
    assert_eq!(pump(session, rx).await, None);
    assert!(session.snapshot().is_some());
}

/// Submits a move and drives it to completion.
async fn play(
    session: &mut GameSession,
    rx: &mut mpsc::UnboundedReceiver<SessionEvent>,
    index: usize,
) {
    assert_eq!(session.submit_move(index), MoveOutcome::Submitted);
    assert_eq!(pump(session, rx).await, None);
}

/// Polls until `ready` returns true or two seconds pass.
async fn wait_until(state: &Arc<StubState>, ready: impl Fn(&StubState) -> bool) {
    tokio::time::timeout(Duration::from_secs(2), async {
        while !ready(state) {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("condition not reached in time");
}

#[tokio::test]
async fn applied_move_replaces_snapshot_with_server_state() {
    let (url, state) = stub::spawn().await;
    let (mut session, mut rx) = session_for(url);

    start(&mut session, &mut rx).await;
    assert_eq!(session.submit_move(4), MoveOutcome::Submitted);
    assert!(session.is_busy());
    assert_eq!(pump(&mut session, &mut rx).await, None);
    assert!(!session.is_busy());

    let game = session.snapshot().unwrap();
    assert_eq!(game.board[4], Cell::Taken(Mark::X));
    assert_eq!(game.current_player, Mark::O);
    assert_eq!(state.move_requests.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn occupied_cell_is_ignored_without_a_request() {
    let (url, state) = stub::spawn().await;
    let (mut session, mut rx) = session_for(url);

    start(&mut session, &mut rx).await;
    play(&mut session, &mut rx, 0).await;
    let before = session.snapshot().unwrap().clone();

    assert_eq!(session.submit_move(0), MoveOutcome::Ignored);
    assert_eq!(session.snapshot().unwrap(), &before);
    assert_eq!(state.move_requests.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn move_without_a_game_is_ignored() {
    let (url, state) = stub::spawn().await;
    let (mut session, _rx) = session_for(url);

    assert_eq!(session.submit_move(0), MoveOutcome::Ignored);
    assert!(session.snapshot().is_none());
    assert!(!session.is_busy());
    assert_eq!(state.requests.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn in_flight_move_drops_a_second_submission() {
    let (url, state) = stub::spawn().await;
    let (mut session, mut rx) = session_for(url);

    start(&mut session, &mut rx).await;
    // Hold the move response open so the second intent lands mid-flight.
    state.response_delay_ms.store(200, Ordering::SeqCst);

    assert_eq!(session.submit_move(0), MoveOutcome::Submitted);
    assert_eq!(session.submit_move(1), MoveOutcome::Ignored);
    assert!(session.is_busy());

    assert_eq!(pump(&mut session, &mut rx).await, None);
    assert!(!session.is_busy());

    // Only the first intent reached the wire; the second was dropped, not
    // queued behind it.
    assert_eq!(state.move_requests.load(Ordering::SeqCst), 1);
    let game = session.snapshot().unwrap();
    assert_eq!(game.board[0], Cell::Taken(Mark::X));
    assert_eq!(game.board[1], Cell::Empty);
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn in_flight_start_drops_a_second_start() {
    let (url, state) = stub::spawn().await;
    let (mut session, mut rx) = session_for(url);

    state.response_delay_ms.store(200, Ordering::SeqCst);
    session.start_game("Alice", "Guest");
    session.start_game("Alice", "Guest");
    assert!(session.is_busy());

    assert_eq!(pump(&mut session, &mut rx).await, None);
    assert!(!session.is_busy());
    assert_eq!(state.requests.load(Ordering::SeqCst), 1);
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn concluded_game_rejects_further_moves() {
    let (url, state) = stub::spawn().await;
    let (mut session, mut rx) = session_for(url);

    start(&mut session, &mut rx).await;
    state.script_status("draw");
    play(&mut session, &mut rx, 0).await;
    assert_eq!(session.snapshot().unwrap().status, GameStatus::Draw);

    assert_eq!(session.submit_move(5), MoveOutcome::Ignored);
    assert_eq!(state.move_requests.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn winning_move_credits_the_winner_once() {
    let (url, state) = stub::spawn().await;
    let (mut session, mut rx) = session_for(url);

    start(&mut session, &mut rx).await;
    state.script_status("x_won");
    play(&mut session, &mut rx, 2).await;
    assert_eq!(session.snapshot().unwrap().status, GameStatus::XWon);

    wait_until(&state, |s| s.score_writes.load(Ordering::SeqCst) >= 1).await;
    assert_eq!(state.score_writes.load(Ordering::SeqCst), 1);
    assert_eq!(state.score_reads.load(Ordering::SeqCst), 1);
    assert_eq!(state.score_of("Alice"), Some(1));
}

#[tokio::test]
async fn draw_triggers_no_score_traffic() {
    let (url, state) = stub::spawn().await;
    let (mut session, mut rx) = session_for(url);

    start(&mut session, &mut rx).await;
    state.script_status("draw");
    play(&mut session, &mut rx, 0).await;

    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(state.score_reads.load(Ordering::SeqCst), 0);
    assert_eq!(state.score_writes.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn failed_credit_reports_event_and_keeps_terminal_board() {
    let (url, state) = stub::spawn().await;
    let (mut session, mut rx) = session_for(url);

    start(&mut session, &mut rx).await;
    state.fail_set_score.store(true, Ordering::SeqCst);
    state.script_status("o_won");
    play(&mut session, &mut rx, 8).await;

    // The terminal board is applied before the credit resolves.
    assert_eq!(session.snapshot().unwrap().status, GameStatus::OWon);

    match next_event(&mut rx).await {
        SessionEvent::CreditFailed(message) => {
            assert!(message.contains("Failed to update score"));
            assert!(message.contains("write refused"));
            // The failure surfaces as a banner; the board is untouched.
            assert!(
                session
                    .handle_event(SessionEvent::CreditFailed(message))
                    .is_some()
            );
        }
        other => panic!("expected CreditFailed, got {other:?}"),
    }
    assert_eq!(session.snapshot().unwrap().status, GameStatus::OWon);
}

#[tokio::test]
async fn successful_credit_reports_new_score() {
    let (url, state) = stub::spawn().await;
    let (mut session, mut rx) = session_for(url);
    state.seed_score("Alice", 4);

    start(&mut session, &mut rx).await;
    state.script_status("x_won");
    play(&mut session, &mut rx, 0).await;

    match next_event(&mut rx).await {
        SessionEvent::Credited(entry) => {
            assert_eq!(entry.username, "Alice");
            assert_eq!(entry.score, 5);
        }
        other => panic!("expected Credited, got {other:?}"),
    }
}

#[tokio::test]
async fn failed_start_leaves_previous_game_and_clears_busy() {
    let (url, state) = stub::spawn().await;
    let (mut session, mut rx) = session_for(url);

    start(&mut session, &mut rx).await;
    let first_id = session.snapshot().unwrap().id.clone();

    state.fail_create.store(true, Ordering::SeqCst);
    session.start_game("Alice", "Guest");
    let banner = pump(&mut session, &mut rx).await.expect("expected a banner");
    assert!(banner.contains("Failed to start game"));
    assert!(banner.contains("engine offline"));
    assert_eq!(session.snapshot().unwrap().id, first_id);
    assert!(!session.is_busy());

    // The guard recovers: a later attempt succeeds.
    state.fail_create.store(false, Ordering::SeqCst);
    start(&mut session, &mut rx).await;
    assert_ne!(session.snapshot().unwrap().id, first_id);
}

#[tokio::test]
async fn failed_move_leaves_snapshot_unchanged() {
    let (url, state) = stub::spawn().await;
    let (mut session, mut rx) = session_for(url);

    start(&mut session, &mut rx).await;
    let before = session.snapshot().unwrap().clone();

    // Kill the game server-side so the move is rejected.
    state.games.lock().unwrap().clear();
    assert_eq!(session.submit_move(3), MoveOutcome::Submitted);
    let banner = pump(&mut session, &mut rx).await.expect("expected a banner");
    assert!(banner.contains("Move error"));
    assert!(banner.contains("game not found"));
    assert_eq!(session.snapshot().unwrap(), &before);
    assert!(!session.is_busy());
}

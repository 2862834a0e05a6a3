//! End-to-end match-mode session flow through the runtime handle.

use std::time::Duration;

use quiz_core::{MatchPhase, MatchRules};
use runtime::{SessionMode, SessionRuntime, SessionSnapshot};

fn init_tracing() {
    use tracing_subscriber::EnvFilter;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

async fn open_live_question(handle: &runtime::SessionHandle) -> quiz_core::Question {
    handle.start_match().await.unwrap();
    handle.spin_difficulty().await.unwrap();
    handle.reveal_difficulty().await.unwrap();
    handle.spin_topic().await.unwrap();
    handle.reveal_topic().await.unwrap();
    handle.ask_question().await.unwrap();

    let state = handle.match_snapshot().await.unwrap();
    match &state.phase {
        MatchPhase::Question { question } => question.clone(),
        other => panic!("expected a live question, got {}", other.label()),
    }
}

#[tokio::test(start_paused = true)]
async fn correct_answer_resolves_in_the_same_command_turn() {
    init_tracing();
    let session = SessionRuntime::builder(SessionMode::Match)
        .with_seed(42)
        .build();
    let handle = session.handle();

    let question = open_live_question(&handle).await;
    handle.submit_answer(question.answer.clone()).await.unwrap();

    // Local grading resolved before the reply came back
    let state = handle.match_snapshot().await.unwrap();
    match &state.phase {
        MatchPhase::ResultCorrect { grade, .. } => assert!(grade.is_correct),
        other => panic!("expected result-correct, got {}", other.label()),
    }
    assert!(!state.clock.is_armed());

    session.shutdown().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn countdown_expiry_forfeits_the_question_without_user_action() {
    init_tracing();
    let session = SessionRuntime::builder(SessionMode::Match)
        .with_seed(43)
        .build();
    let handle = session.handle();

    open_live_question(&handle).await;
    let state = handle.match_snapshot().await.unwrap();
    let budget = MatchRules::round_plan(state.tier.expect("tier spun")).seconds;

    // Let virtual time run past the whole budget
    tokio::time::sleep(Duration::from_secs(u64::from(budget) + 1)).await;

    let state = handle.match_snapshot().await.unwrap();
    match &state.phase {
        MatchPhase::ResultIncorrect { expired, .. } => assert!(expired),
        other => panic!("expected result-incorrect, got {}", other.label()),
    }
    // The non-answering side took the point
    assert_eq!(state.scores.get(state.active_team.opponent()), 1);
    assert!(!state.clock.is_armed());

    session.shutdown().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn reset_cancels_the_ticker_and_returns_to_setup() {
    init_tracing();
    let session = SessionRuntime::builder(SessionMode::Match)
        .with_seed(44)
        .build();
    let handle = session.handle();

    open_live_question(&handle).await;
    handle.reset().await.unwrap();

    // Plenty of virtual time: a stale ticker would have expired something
    tokio::time::sleep(Duration::from_secs(120)).await;

    let state = handle.match_snapshot().await.unwrap();
    assert_eq!(state.phase, MatchPhase::TeamSetup);
    assert_eq!(state.scores.home, 0);
    assert_eq!(state.scores.away, 0);

    session.shutdown().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn mode_specific_commands_are_rejected_cross_mode() {
    init_tracing();
    let session = SessionRuntime::builder(SessionMode::Match)
        .with_seed(45)
        .build();
    let handle = session.handle();

    let error = handle.start_quest().await.unwrap_err();
    assert!(matches!(error, runtime::RuntimeError::ModeMismatch(_)));

    // The match session is unharmed
    match handle.snapshot().await.unwrap() {
        SessionSnapshot::Match(state) => assert_eq!(state.phase, MatchPhase::TeamSetup),
        SessionSnapshot::Quest(_) => panic!("session changed mode"),
    }

    session.shutdown().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn clock_events_stream_on_the_clock_topic() {
    init_tracing();
    let session = SessionRuntime::builder(SessionMode::Match)
        .with_seed(46)
        .build();
    let handle = session.handle();
    let mut clock_rx = handle.subscribe(runtime::Topic::Clock);

    open_live_question(&handle).await;
    tokio::time::sleep(Duration::from_secs(3)).await;

    // First tick lands a full second after arming
    let event = clock_rx.recv().await.unwrap();
    match event {
        runtime::Event::Clock(runtime::ClockEvent::Tick { remaining }) => {
            let state = handle.match_snapshot().await.unwrap();
            let budget = MatchRules::round_plan(state.tier.expect("tier spun")).seconds;
            assert_eq!(remaining, budget - 1);
        }
        other => panic!("expected a tick, got {other:?}"),
    }

    session.shutdown().await.unwrap();
}

//! Test suite for calculator sessions
//!
//! Tests cover:
//! - Applying actions and keypad labels through a handle
//! - Event order (DisplayChanged before ResultRecorded)
//! - Serialised access from concurrent handles
//! - Fire-and-forget saves that fail without touching engine state
//! - Handle behaviour after errors
//! - Handlers that feed follow-up actions back into their own session

use std::sync::{Arc, Mutex, OnceLock};
use std::time::Duration;

use async_trait::async_trait;
use scicalc::{
    Action, CalculatorEngine, CalculatorEvent, CalculatorSession, EventHandler, Operator,
    SaveClient, SessionHandle, UnaryFunction,
};

#[derive(Default)]
struct RecordingHandler {
    events: Mutex<Vec<CalculatorEvent>>,
}

impl RecordingHandler {
    fn events(&self) -> Vec<CalculatorEvent> {
        self.events.lock().unwrap().clone()
    }

    fn results(&self) -> Vec<(String, String)> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                CalculatorEvent::ResultRecorded {
                    expression, result, ..
                } => Some((expression, result)),
                _ => None,
            })
            .collect()
    }

    fn saves(&self) -> Vec<CalculatorEvent> {
        self.events()
            .into_iter()
            .filter(|e| matches!(e, CalculatorEvent::SaveCompleted { .. }))
            .collect()
    }
}

#[async_trait]
impl EventHandler for RecordingHandler {
    async fn on_calculator_event(&self, event: &CalculatorEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}

#[tokio::test]
async fn test_apply_returns_transition() {
    let handle = CalculatorSession::new(CalculatorEngine::new()).spawn();

    handle.apply(Action::Digit('7')).await.unwrap();
    handle.apply(Action::Operator(Operator::Add)).await.unwrap();
    handle.apply(Action::Digit('3')).await.unwrap();
    let transition = handle.apply(Action::Evaluate).await.unwrap();

    assert_eq!(transition.display, "10");
    assert_eq!(transition.recorded.unwrap().expression, "7 add 3");
}

#[tokio::test]
async fn test_press_parses_labels() {
    let handle = CalculatorSession::new(CalculatorEngine::new()).spawn();

    for label in ["1", "6", "√"] {
        handle.press(label).await.unwrap();
    }

    let snapshot = handle.snapshot().await.unwrap();
    assert_eq!(snapshot.display, "4");
    assert_eq!(snapshot.history[0].expression, "sqrt(16)");
}

#[tokio::test]
async fn test_unknown_label_leaves_engine_untouched() {
    let handle = CalculatorSession::new(CalculatorEngine::new()).spawn();
    handle.press("5").await.unwrap();

    let err = handle.press("M+").await.unwrap_err();
    assert!(err.to_string().contains("Unknown key"));

    let snapshot = handle.snapshot().await.unwrap();
    assert_eq!(snapshot.display, "5");
    // The handle is still usable.
    handle.press("0").await.unwrap();
    assert_eq!(handle.snapshot().await.unwrap().display, "50");
}

#[tokio::test]
async fn test_events_in_order() {
    let handler = Arc::new(RecordingHandler::default());
    let handle = CalculatorSession::new(CalculatorEngine::new())
        .with_id("session-a")
        .with_event_handler(handler.clone())
        .spawn();
    assert_eq!(handle.id(), "session-a");

    handle.press("9").await.unwrap();
    handle.press("√").await.unwrap();

    let events = handler.events();
    assert_eq!(events.len(), 3);
    assert_eq!(
        events[0],
        CalculatorEvent::DisplayChanged {
            session_id: "session-a".into(),
            action: Action::Digit('9'),
            display: "9".into(),
        }
    );
    assert_eq!(
        events[1],
        CalculatorEvent::DisplayChanged {
            session_id: "session-a".into(),
            action: Action::Function(UnaryFunction::Sqrt),
            display: "3".into(),
        }
    );
    assert_eq!(
        events[2],
        CalculatorEvent::ResultRecorded {
            session_id: "session-a".into(),
            expression: "sqrt(9)".into(),
            result: "3".into(),
        }
    );
    assert!(events.iter().all(|e| e.session_id() == "session-a"));
}

#[tokio::test]
async fn test_no_op_actions_still_emit_display_changed() {
    let handler = Arc::new(RecordingHandler::default());
    let handle = CalculatorSession::new(CalculatorEngine::new())
        .with_event_handler(handler.clone())
        .spawn();

    handle.press("=").await.unwrap();

    let events = handler.events();
    assert_eq!(events.len(), 1);
    assert!(matches!(
        &events[0],
        CalculatorEvent::DisplayChanged { display, .. } if display == "0"
    ));
    assert!(handler.results().is_empty());
}

#[tokio::test]
async fn test_chained_operator_emits_result() {
    let handler = Arc::new(RecordingHandler::default());
    let handle = CalculatorSession::new(CalculatorEngine::new())
        .with_event_handler(handler.clone())
        .spawn();

    for label in ["2", "+", "3", "×", "4", "="] {
        handle.press(label).await.unwrap();
    }

    assert_eq!(
        handler.results(),
        vec![
            ("2 add 3".to_string(), "5".to_string()),
            ("5 multiply 4".to_string(), "20".to_string()),
        ]
    );
}

#[tokio::test]
async fn test_concurrent_handles_are_serialised() {
    let handle = CalculatorSession::new(CalculatorEngine::new()).spawn();

    let mut tasks = Vec::new();
    for _ in 0..8 {
        let handle = handle.clone();
        tasks.push(tokio::spawn(async move {
            for _ in 0..5 {
                handle.apply(Action::Digit('1')).await.unwrap();
            }
        }));
    }
    for task in tasks {
        task.await.unwrap();
    }

    let snapshot = handle.snapshot().await.unwrap();
    assert_eq!(snapshot.display, "1".repeat(40));
}

#[tokio::test]
async fn test_clear_history_through_handle() {
    let handle = CalculatorSession::new(CalculatorEngine::new()).spawn();
    for label in ["4", "√", "√"] {
        handle.press(label).await.unwrap();
    }
    assert_eq!(handle.snapshot().await.unwrap().history.len(), 2);

    handle.clear_history().await.unwrap();
    let snapshot = handle.snapshot().await.unwrap();
    assert!(snapshot.history.is_empty());
    assert_eq!(snapshot.display, "1.4142135623730951");
}

#[tokio::test]
async fn test_failed_save_is_reported_and_harmless() {
    let handler = Arc::new(RecordingHandler::default());
    // Nothing listens on port 9 locally; the connection is refused.
    let mut client = SaveClient::new("http://127.0.0.1:9/calculations");
    client.with_timeout(Duration::from_secs(2));

    let handle = CalculatorSession::new(CalculatorEngine::new())
        .with_event_handler(handler.clone())
        .with_save_client(client)
        .spawn();

    for label in ["7", "+", "3", "="] {
        handle.press(label).await.unwrap();
    }

    let mut saves = Vec::new();
    for _ in 0..100 {
        saves = handler.saves();
        if !saves.is_empty() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }

    assert_eq!(saves.len(), 1);
    match &saves[0] {
        CalculatorEvent::SaveCompleted {
            expression,
            success,
            error,
            ..
        } => {
            assert_eq!(expression, "7 add 3");
            assert!(!success);
            assert!(error.as_deref().unwrap().starts_with("Save error"));
        }
        other => panic!("unexpected event {:?}", other),
    }

    let snapshot = handle.snapshot().await.unwrap();
    assert_eq!(snapshot.display, "10");
    assert_eq!(snapshot.history.len(), 1);
}

/// Takes the square root of every `4` it sees, from a spawned task.
#[derive(Default)]
struct RootOfFour {
    handle: OnceLock<SessionHandle>,
}

#[async_trait]
impl EventHandler for RootOfFour {
    async fn on_calculator_event(&self, event: &CalculatorEvent) {
        if let CalculatorEvent::ResultRecorded { result, .. } = event {
            if result == "4" {
                if let Some(handle) = self.handle.get().cloned() {
                    tokio::spawn(async move {
                        handle.press("√").await.unwrap();
                    });
                }
            }
        }
    }
}

#[tokio::test]
async fn test_handler_can_feed_actions_back_from_spawned_task() {
    let handler = Arc::new(RootOfFour::default());
    let handle = CalculatorSession::new(CalculatorEngine::new())
        .with_event_handler(handler.clone())
        .spawn();
    handler.handle.set(handle.clone()).unwrap();

    let outcome = tokio::time::timeout(Duration::from_secs(5), async {
        for label in ["1", "6", "√"] {
            handle.press(label).await.unwrap();
        }
        loop {
            let snapshot = handle.snapshot().await.unwrap();
            if snapshot.history.len() == 2 {
                return snapshot;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    })
    .await;

    let snapshot = outcome.expect("session stalled");
    assert_eq!(snapshot.display, "2");
    assert_eq!(snapshot.history[0].expression, "sqrt(4)");
    assert_eq!(snapshot.history[1].expression, "sqrt(16)");
}

mod common;

use common::*;

use scheduler_core::entity::CustomerBinding;
use scheduler_core::lifecycle::{OperationExecutor, RequestStage, StageError};

#[test]
fn racing_resolvers_have_exactly_one_winner() {
    let request = RequestStage::<CustomerBinding>::edit(new_customer());

    let mut handles = Vec::new();
    for i in 0..16 {
        let stage = request.clone();
        handles.push(std::thread::spawn(move || match i % 3 {
            0 => stage.approve(),
            1 => stage.cancel(Some("racing cancel")),
            _ => stage.fault(anyhow::anyhow!("racing fault"), None),
        }));
    }

    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    assert!(results
        .iter()
        .filter(|r| r.is_err())
        .all(|r| matches!(r, Err(StageError::AlreadyResolved))));
    assert!(request.handled());
}

#[tokio::test]
async fn concurrent_validation_resolvers_have_one_winner() {
    let request = RequestStage::<CustomerBinding>::edit(new_customer());
    request.approve().unwrap();
    let begin = request.into_begin().unwrap();
    begin.complete().unwrap();
    let validating = begin.into_validating().unwrap();

    let mut handles = Vec::new();
    for i in 0..8 {
        let stage = validating.clone();
        handles.push(tokio::spawn(async move {
            if i % 2 == 0 {
                stage.mark_valid()
            } else {
                stage.cancel(Some("racing cancel"))
            }
        }));
    }

    let mut winners = 0;
    for handle in handles {
        if handle.await.unwrap().is_ok() {
            winners += 1;
        }
    }
    assert_eq!(winners, 1);
    assert!(validating.handled());
}

#[tokio::test]
async fn cancel_during_write_wins_over_completion() {
    let request = RequestStage::<CustomerBinding>::edit(new_customer());
    request.approve().unwrap();

    let writer = SelfCancelingWriter {
        message: "user closed the editor",
    };
    let outcome = OperationExecutor::new()
        .run(request, &writer, &CustomerRuleValidator)
        .await
        .unwrap();

    let failure = outcome.failed().expect("expected failure");
    assert!(failure.canceled());
    assert!(failure.fault().is_none());
    assert_eq!(failure.message(), "user closed the editor");
}

#[tokio::test]
async fn retry_after_failure_starts_a_fresh_chain() {
    let first = RequestStage::<CustomerBinding>::edit(new_customer());
    first.approve().unwrap();
    let first_id = first.operation_id();
    let outcome = OperationExecutor::new()
        .run(first, &FailingWriter { message: "deadlock" }, &CustomerRuleValidator)
        .await
        .unwrap();
    assert!(!outcome.successful());

    // A retry is a brand new request with its own resolution and id.
    let second = RequestStage::<CustomerBinding>::edit(new_customer());
    second.approve().unwrap();
    assert_ne!(second.operation_id(), first_id);
    let outcome = OperationExecutor::new()
        .run(second, &InstantWriter, &CustomerRuleValidator)
        .await
        .unwrap();
    assert!(outcome.successful());
}

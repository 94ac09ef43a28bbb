use std::sync::{Arc, Mutex};

use audioscribe::application::services::{ProgressEvent, SegmentDispatcher};
use audioscribe::domain::SegmentOutcome;

use crate::fakes::{FakeGateway, segments};

#[tokio::test]
async fn given_ten_segments_and_window_of_three_when_dispatching_then_never_more_than_three_in_flight() {
    let gateway = Arc::new(FakeGateway::default().with_segment_delay(20));
    let dispatcher = SegmentDispatcher::new(Arc::clone(&gateway), 3);

    let outcomes = dispatcher
        .dispatch(&segments(10), "Transcribe", &|_: ProgressEvent| {})
        .await;

    assert_eq!(outcomes.len(), 10);
    assert_eq!(gateway.max_in_flight(), 3);
}

#[tokio::test]
async fn given_zero_window_when_dispatching_then_segments_sent_one_at_a_time() {
    let gateway = Arc::new(FakeGateway::default().with_segment_delay(5));
    let dispatcher = SegmentDispatcher::new(Arc::clone(&gateway), 0);

    dispatcher
        .dispatch(&segments(4), "Transcribe", &|_: ProgressEvent| {})
        .await;

    assert_eq!(gateway.max_in_flight(), 1);
    assert_eq!(
        gateway.log(),
        vec!["segment:0", "segment:1", "segment:2", "segment:3"]
    );
}

#[tokio::test]
async fn given_failing_segment_when_dispatching_then_outcomes_ordered_with_failure_kept() {
    let gateway = Arc::new(FakeGateway::default().with_failing_segments(&[1]));
    let dispatcher = SegmentDispatcher::new(gateway, 2);

    let outcomes = dispatcher
        .dispatch(&segments(3), "Transcribe", &|_: ProgressEvent| {})
        .await;

    let indices: Vec<usize> = outcomes.iter().map(SegmentOutcome::index).collect();
    assert_eq!(indices, vec![0, 1, 2]);
    assert!(outcomes[1].is_failure());
    assert_eq!(
        outcomes[0],
        SegmentOutcome::Transcribed {
            index: 0,
            text: "segment 0".to_string()
        }
    );
}

#[tokio::test]
async fn given_segments_when_dispatching_then_progress_reported_after_each() {
    let gateway = Arc::new(FakeGateway::default().with_failing_segments(&[4]));
    let dispatcher = SegmentDispatcher::new(gateway, 2);
    let events = Mutex::new(Vec::new());
    let sink = |event: ProgressEvent| events.lock().unwrap().push(event);

    dispatcher.dispatch(&segments(5), "Transcribe", &sink).await;

    let events = events.into_inner().unwrap();
    let completed: Vec<usize> = events
        .iter()
        .filter_map(|e| match e {
            ProgressEvent::SegmentFinished {
                completed, total, ..
            } => {
                assert_eq!(*total, 5);
                Some(*completed)
            }
            _ => None,
        })
        .collect();
    assert_eq!(completed, vec![1, 2, 3, 4, 5]);
    assert!(events.iter().any(|e| matches!(
        e,
        ProgressEvent::SegmentFinished {
            index: 4,
            failed: true,
            ..
        }
    )));
}

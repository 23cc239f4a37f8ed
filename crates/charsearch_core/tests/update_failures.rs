use std::sync::Once;
use std::time::Duration;

use charsearch_core::{
    update, AppState, Effect, LoadError, LoadPhase, Msg, Notice, ResultItem, SearchFilter,
    SearchSettings,
};

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(charsearch_logging::initialize_for_tests);
}

fn settings(max_retries: u32) -> SearchSettings {
    SearchSettings {
        max_retries,
        retry_base_delay: Duration::from_millis(100),
        ..SearchSettings::default()
    }
}

fn started(max_retries: u32) -> (AppState, u64, u32) {
    let (state, effects) = update(
        AppState::with_settings(settings(max_retries)),
        Msg::SearchSubmitted(SearchFilter::new("monika")),
    );
    match effects.as_slice() {
        [Effect::FetchPage {
            generation, page, ..
        }] => (state, *generation, *page),
        other => panic!("expected fetch, got {other:?}"),
    }
}

fn fail(state: AppState, generation: u64, page: u32) -> (AppState, Vec<Effect>) {
    update(
        state,
        Msg::PageFailed {
            generation,
            page,
            error: LoadError::Network("connection refused".into()),
        },
    )
}

#[test]
fn failure_schedules_retry_with_doubling_delay() {
    init_logging();
    let (mut state, generation, page) = started(3);
    let mut delays = Vec::new();

    for _ in 0..3 {
        let (next, effects) = fail(state, generation, page);
        match effects.as_slice() {
            [Effect::ScheduleRetry {
                generation: g,
                page: p,
                delay,
            }] => {
                assert_eq!((*g, *p), (generation, page));
                delays.push(*delay);
            }
            other => panic!("expected retry, got {other:?}"),
        }
        let (next, effects) = update(next, Msg::RetryDue { generation, page });
        assert!(matches!(
            effects.as_slice(),
            [Effect::FetchPage { page: 0, .. }]
        ));
        state = next;
    }

    assert_eq!(
        delays,
        vec![
            Duration::from_millis(100),
            Duration::from_millis(200),
            Duration::from_millis(400),
        ]
    );
}

#[test]
fn spent_retries_surface_failure_distinct_from_exhaustion() {
    init_logging();
    let (state, generation, page) = started(1);
    let (state, _) = fail(state, generation, page);
    let (state, _) = update(state, Msg::RetryDue { generation, page });
    let (state, effects) = update(
        state,
        Msg::PageFailed {
            generation,
            page,
            error: LoadError::Format("expected a JSON array".into()),
        },
    );

    assert!(effects.is_empty());
    let view = state.view();
    assert_eq!(view.phase, LoadPhase::Failed);
    assert_eq!(
        view.notice,
        Some(Notice::LoadFailed {
            page: 0,
            error: LoadError::Format("expected a JSON array".into()),
        })
    );
    assert_ne!(view.notice, Some(Notice::EndOfResults));
    assert!(!state.pagination().no_more_results());
}

#[test]
fn scroll_after_failure_does_not_fetch_or_advance() {
    init_logging();
    let (state, generation, page) = started(0);
    let (state, _) = fail(state, generation, page);
    assert_eq!(state.pagination().phase, LoadPhase::Failed);

    let (state, effects) = update(
        state,
        Msg::Scrolled {
            viewport_bottom: 100,
            document_height: 100,
        },
    );
    assert!(effects.is_empty());
    assert_eq!(state.pagination().current_page, 0);
}

#[test]
fn manual_retry_refetches_same_page() {
    init_logging();
    let (state, generation, page) = started(0);
    let (state, _) = fail(state, generation, page);

    let (state, effects) = update(state, Msg::RetryRequested);
    assert!(matches!(
        effects.as_slice(),
        [Effect::FetchPage { page: 0, .. }]
    ));
    assert_eq!(state.pagination().phase, LoadPhase::Loading);
    assert_eq!(state.view().notice, None);

    let (state, effects) = update(
        state,
        Msg::PageLoaded {
            generation,
            page,
            items: vec![ResultItem::default()],
            total: None,
        },
    );
    assert!(effects.is_empty());
    assert_eq!(state.card_count(), 1);
    assert_eq!(state.pagination().phase, LoadPhase::Idle);
}

#[test]
fn retry_request_is_ignored_unless_failed() {
    init_logging();
    let (state, _, _) = started(3);
    let (_state, effects) = update(state, Msg::RetryRequested);
    assert!(effects.is_empty());
}

#[test]
fn stale_retry_is_ignored_after_new_search() {
    init_logging();
    let (state, generation, page) = started(3);
    let (state, _) = fail(state, generation, page);
    let (state, _) = update(state, Msg::SearchSubmitted(SearchFilter::new("yuri")));

    let (state, effects) = update(state, Msg::RetryDue { generation, page });
    assert!(effects.is_empty());

    let (_state, effects) = fail(state, generation, page);
    assert!(effects.is_empty());
}

#[test]
fn success_after_retry_clears_retry_notice() {
    init_logging();
    let (state, generation, page) = started(3);
    let (state, _) = fail(state, generation, page);
    assert!(matches!(
        state.view().notice,
        Some(Notice::Retrying { attempt: 1, .. })
    ));
    let (state, _) = update(state, Msg::RetryDue { generation, page });
    let (state, _) = update(
        state,
        Msg::PageLoaded {
            generation,
            page,
            items: vec![ResultItem::default()],
            total: None,
        },
    );
    assert_eq!(state.view().notice, None);

    // The retry budget starts over for the next page.
    let (state, _) = update(
        state,
        Msg::Scrolled {
            viewport_bottom: 10,
            document_height: 10,
        },
    );
    let (_state, effects) = fail(state, generation, 1);
    assert!(matches!(
        effects.as_slice(),
        [Effect::ScheduleRetry { delay, .. }] if *delay == Duration::from_millis(100)
    ));
}

use super::*;
use crate::test_support::{accounts, page_of, ScriptedGateway};
use shared::domain::Theme;

fn controller(
    gateway: Arc<ScriptedGateway>,
    page_size: u32,
    debounce: Duration,
) -> (Arc<SearchController>, Arc<Mutex<ExplorerState>>) {
    let state = Arc::new(Mutex::new(ExplorerState::new(page_size, Theme::Light)));
    let (events, _) = broadcast::channel(64);
    let controller = Arc::new(SearchController::new(
        gateway,
        Arc::clone(&state),
        events,
        debounce,
    ));
    (controller, state)
}

#[tokio::test]
async fn first_page_success_has_no_previous_page() {
    let gateway = Arc::new(ScriptedGateway::new());
    gateway.push_search(Ok(page_of(accounts(5, "user"), 40)));
    let (search, state) = controller(Arc::clone(&gateway), 5, Duration::ZERO);

    search.set_query("  rust  ").await;
    search.trigger_search(1).await;

    let guard = state.lock().await;
    assert_eq!(guard.search.page.current_page, 1);
    assert!(!guard.search.page.has_prev_page);
    assert!(guard.search.page.has_next_page);
    assert_eq!(guard.search.phase, SearchPhase::Success);
    assert!(!guard.search.loading);
    assert_eq!(guard.search.active_query.as_deref(), Some("rust"));
    assert_eq!(gateway.search_calls()[0].query, "rust");
}

#[tokio::test]
async fn empty_query_resets_without_network() {
    let gateway = Arc::new(ScriptedGateway::new());
    gateway.push_search(Ok(page_of(accounts(5, "user"), 40)));
    let (search, state) = controller(Arc::clone(&gateway), 5, Duration::ZERO);

    search.set_query("rust").await;
    search.trigger_search(1).await;
    state.lock().await.error = Some("stale".into());

    search.set_query("   ").await;
    search.trigger_search(1).await;

    let guard = state.lock().await;
    assert!(guard.search.entities.is_empty());
    assert_eq!(guard.search.page.total_count, 0);
    assert_eq!(guard.search.page.current_page, 1);
    assert!(guard.error.is_none());
    assert!(!guard.search.is_active());
    assert_eq!(guard.search.phase, SearchPhase::Idle);
    assert_eq!(gateway.search_calls().len(), 1);
}

#[tokio::test]
async fn empty_query_from_fresh_state_never_calls_gateway() {
    let gateway = Arc::new(ScriptedGateway::new());
    let (search, state) = controller(Arc::clone(&gateway), 5, Duration::ZERO);

    search.set_query("").await;
    search.trigger_search(1).await;

    assert!(gateway.search_calls().is_empty());
    assert!(!state.lock().await.search.is_active());
}

#[tokio::test]
async fn set_query_alone_does_not_search() {
    let gateway = Arc::new(ScriptedGateway::new());
    let (search, state) = controller(Arc::clone(&gateway), 5, Duration::ZERO);

    search.set_query("octocat").await;

    assert!(gateway.search_calls().is_empty());
    assert_eq!(state.lock().await.search.query, "octocat");
}

#[tokio::test]
async fn failure_sets_error_and_clears_results() {
    let gateway = Arc::new(ScriptedGateway::new());
    gateway.push_search(Ok(page_of(accounts(5, "user"), 40)));
    gateway.push_search(Err(GatewayError::status(
        "/search/users",
        503,
        "unavailable",
    )));
    let (search, state) = controller(Arc::clone(&gateway), 5, Duration::ZERO);

    search.set_query("rust").await;
    search.trigger_search(1).await;
    search.next_page().await;

    let guard = state.lock().await;
    assert!(guard.search.entities.is_empty());
    assert_eq!(guard.search.page.total_count, 0);
    assert!(!guard.search.loading);
    assert_eq!(guard.search.phase, SearchPhase::Failed);
    let message = guard.error.as_deref().expect("error");
    assert!(message.contains("HTTP 503"), "unexpected message: {message}");
}

#[tokio::test]
async fn new_attempt_clears_previous_error() {
    let gateway = Arc::new(ScriptedGateway::new());
    gateway.push_search(Err(GatewayError::transport("/search/users", "refused")));
    let pending = gateway.defer_search();
    let (search, state) = controller(Arc::clone(&gateway), 5, Duration::ZERO);

    search.set_query("rust").await;
    search.trigger_search(1).await;
    assert!(state.lock().await.error.is_some());

    let retry = {
        let search = Arc::clone(&search);
        tokio::spawn(async move { search.trigger_search(1).await })
    };
    gateway.wait_for_search_calls(2).await;
    {
        let guard = state.lock().await;
        assert!(guard.error.is_none());
        assert!(guard.search.loading);
        assert_eq!(guard.search.phase, SearchPhase::Searching);
    }

    pending
        .send(Ok(page_of(accounts(2, "user"), 2)))
        .expect("release");
    retry.await.expect("retry task");
    assert!(state.lock().await.error.is_none());
}

#[tokio::test]
async fn next_and_prev_page_move_through_results() {
    let gateway = Arc::new(ScriptedGateway::new());
    gateway.push_search(Ok(page_of(accounts(5, "a"), 1000)));
    gateway.push_search(Ok(page_of(accounts(5, "b"), 1000)));
    gateway.push_search(Ok(page_of(accounts(5, "c"), 1000)));
    let (search, state) = controller(Arc::clone(&gateway), 5, Duration::ZERO);

    search.set_query("a").await;
    search.trigger_search(1).await;
    search.next_page().await;
    search.next_page().await;

    {
        let guard = state.lock().await;
        assert_eq!(guard.search.page.current_page, 3);
        assert!(guard.search.page.has_next_page);
        assert_eq!(guard.search.page.range_label(), "11-15 of 1,000");
    }

    gateway.push_search(Ok(page_of(accounts(5, "b"), 1000)));
    search.prev_page().await;
    let pages: Vec<u32> = gateway.search_calls().iter().map(|c| c.page).collect();
    assert_eq!(pages, vec![1, 2, 3, 2]);
}

#[tokio::test]
async fn paging_is_a_noop_without_affordance() {
    let gateway = Arc::new(ScriptedGateway::new());
    gateway.push_search(Ok(page_of(accounts(1, "octocat"), 1)));
    let (search, state) = controller(Arc::clone(&gateway), 5, Duration::ZERO);

    search.set_query("octocat").await;
    search.trigger_search(1).await;
    search.next_page().await;
    search.prev_page().await;

    assert_eq!(gateway.search_calls().len(), 1);
    let guard = state.lock().await;
    assert!(!guard.search.page.has_next_page);
    assert_eq!(guard.search.page.range_label(), "1-1 of 1");
}

#[tokio::test]
async fn short_page_disables_next_regardless_of_total() {
    let gateway = Arc::new(ScriptedGateway::new());
    gateway.push_search(Ok(page_of(accounts(3, "user"), 900)));
    let (search, state) = controller(Arc::clone(&gateway), 5, Duration::ZERO);

    search.set_query("user").await;
    search.trigger_search(1).await;

    assert!(!state.lock().await.search.page.has_next_page);
}

#[tokio::test]
async fn repeated_identical_search_is_idempotent() {
    let gateway = Arc::new(ScriptedGateway::new());
    gateway.push_search(Ok(page_of(accounts(5, "user"), 12)));
    gateway.push_search(Ok(page_of(accounts(5, "user"), 12)));
    let (search, state) = controller(Arc::clone(&gateway), 5, Duration::ZERO);

    search.set_query("user").await;
    search.trigger_search(2).await;
    let first = state.lock().await.search.clone();
    search.trigger_search(2).await;
    let second = state.lock().await.search.clone();

    assert_eq!(first.entities, second.entities);
    assert_eq!(first.page, second.page);
    assert_eq!(first.phase, second.phase);
    assert_eq!(first.active_query, second.active_query);
}

#[tokio::test]
async fn overlapping_searches_let_last_completion_win() {
    let gateway = Arc::new(ScriptedGateway::new());
    let older = gateway.defer_search();
    let newer = gateway.defer_search();
    let (search, state) = controller(Arc::clone(&gateway), 5, Duration::ZERO);

    search.set_query("ru").await;
    let first = {
        let search = Arc::clone(&search);
        tokio::spawn(async move { search.trigger_search(1).await })
    };
    gateway.wait_for_search_calls(1).await;

    search.set_query("rust").await;
    let second = {
        let search = Arc::clone(&search);
        tokio::spawn(async move { search.trigger_search(1).await })
    };
    gateway.wait_for_search_calls(2).await;

    newer
        .send(Ok(page_of(accounts(5, "rust"), 50)))
        .expect("release newer");
    second.await.expect("second");
    older
        .send(Ok(page_of(accounts(2, "ru"), 2)))
        .expect("release older");
    first.await.expect("first");

    let guard = state.lock().await;
    assert_eq!(guard.search.entities.len(), 2);
    assert_eq!(guard.search.entities[0].login, "ru0");
    assert_eq!(guard.search.page.total_count, 2);
    assert_eq!(guard.search.active_query.as_deref(), Some("ru"));
}

#[tokio::test(start_paused = true)]
async fn debounced_edits_collapse_into_one_search() {
    let gateway = Arc::new(ScriptedGateway::new());
    gateway.push_search(Ok(page_of(accounts(1, "octo"), 1)));
    let (search, state) = controller(Arc::clone(&gateway), 5, Duration::from_millis(300));

    let first = search.query_changed("oc").await.expect("timer");
    tokio::time::advance(Duration::from_millis(100)).await;
    let second = search.query_changed("octo").await.expect("timer");

    first.await.expect("first timer");
    second.await.expect("second timer");

    let calls = gateway.search_calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].query, "octo");
    assert_eq!(calls[0].page, 1);
    assert_eq!(state.lock().await.search.entities.len(), 1);
}

#[tokio::test(start_paused = true)]
async fn explicit_trigger_cancels_pending_debounce() {
    let gateway = Arc::new(ScriptedGateway::new());
    gateway.push_search(Ok(page_of(accounts(1, "octo"), 1)));
    let (search, _state) = controller(Arc::clone(&gateway), 5, Duration::from_millis(300));

    let timer = search.query_changed("octo").await.expect("timer");
    search.trigger_search(1).await;
    timer.await.expect("timer");

    assert_eq!(gateway.search_calls().len(), 1);
}

#[tokio::test]
async fn zero_debounce_searches_immediately() {
    let gateway = Arc::new(ScriptedGateway::new());
    gateway.push_search(Ok(page_of(accounts(1, "octo"), 1)));
    let (search, _state) = controller(Arc::clone(&gateway), 5, Duration::ZERO);

    assert!(search.query_changed("octo").await.is_none());
    assert_eq!(gateway.search_calls().len(), 1);
}

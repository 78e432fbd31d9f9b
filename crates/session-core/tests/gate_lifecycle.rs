use std::{sync::Arc, time::Duration};

use pp_types::{Identity, Session};
use secrecy::SecretString;
use session_core::{
    AuthGate, Authenticator, FetchFailurePolicy, GateConfig, GateDecision, GateError, MemorySessionStore, MetadataProfileResolver, Resolution, SessionContext, SignInFlow, SignInOutcome
};
use tokio::task::JoinHandle;

fn context(store: &Arc<MemorySessionStore>) -> SessionContext {
    SessionContext::from_backend(store.clone(), Arc::new(MetadataProfileResolver))
}

fn spawn_guard(ctx: &SessionContext, gate: &AuthGate) -> JoinHandle<()> {
    let (ctx, gate) = (ctx.clone(), gate.clone());
    tokio::spawn(async move { ctx.guard(gate).await })
}

async fn wait_for(gate: &AuthGate, resolution: Resolution) {
    let mut rx = gate.watch();
    tokio::time::timeout(Duration::from_secs(1), rx.wait_for(|r| *r == resolution))
        .await
        .expect("gate did not resolve in time")
        .expect("gate dropped");
}

async fn until(mut check: impl FnMut() -> bool) {
    for _ in 0..1000 {
        if check() {
            return;
        }
        tokio::task::yield_now().await;
    }
    panic!("condition never became true");
}

async fn finish(driver: JoinHandle<()>) {
    tokio::time::timeout(Duration::from_secs(1), driver)
        .await
        .expect("driver did not stop")
        .expect("driver panicked");
}

#[tokio::test]
async fn test_redirect_then_sign_in_returns_to_requested_view() {
    let store = Arc::new(MemorySessionStore::new());
    store.add_user("ada@example.com", "pw");
    let ctx = context(&store);

    let gate = ctx.mount_gate("/projects");
    assert_eq!(gate.decision(), GateDecision::Loading);
    let driver = spawn_guard(&ctx, &gate);
    wait_for(&gate, Resolution::Denied).await;

    let GateDecision::Redirect(redirect) = gate.decision() else {
        panic!("expected redirect");
    };
    assert_eq!(redirect.href(), "/signin?from=%2Fprojects");

    let mut flow = SignInFlow::from_redirect(&redirect);
    let outcome = flow
        .sign_in(ctx.auth.as_ref(), "ada@example.com", &SecretString::from("pw".to_string()))
        .await
        .unwrap();
    assert_eq!(outcome, SignInOutcome::Navigate("/projects".to_string()));

    // the still-mounted gate follows the sign-in notification
    wait_for(&gate, Resolution::Granted).await;
    assert_eq!(gate.authorize().unwrap().identity().email.as_deref(), Some("ada@example.com"));

    gate.teardown();
    finish(driver).await;
    assert_eq!(store.subscriber_count(), 0);
    assert_eq!(store.fetch_calls(), 1);
}

#[tokio::test]
async fn test_sign_out_notification_beats_stale_fetch() {
    let store = Arc::new(MemorySessionStore::new());
    store.set_session(Some(Session::new(Identity::new("u-1"))));
    store.pause_fetches();
    let ctx = context(&store);

    let gate = ctx.mount_gate("/reports");
    let driver = spawn_guard(&ctx, &gate);
    until(|| store.fetch_calls() == 1 && store.subscriber_count() == 1).await;

    // the held fetch already captured the signed-in snapshot
    store.sign_out().await.unwrap();
    wait_for(&gate, Resolution::Denied).await;

    store.resume_fetches();
    until(|| store.fetches_answered() == 1).await;
    assert_eq!(gate.resolution(), Resolution::Denied);
    assert_eq!(gate.authorize(), Err(GateError::Denied));

    gate.teardown();
    finish(driver).await;
}

#[tokio::test]
async fn test_unmount_before_fetch_resolves() {
    let store = Arc::new(MemorySessionStore::new());
    store.set_session(Some(Session::new(Identity::new("u-1"))));
    store.pause_fetches();
    let ctx = context(&store);

    let gate = ctx.mount_gate("/projects/42");
    let driver = spawn_guard(&ctx, &gate);
    until(|| store.fetch_calls() == 1 && store.subscriber_count() == 1).await;

    gate.teardown();
    assert_eq!(store.subscriber_count(), 0);

    store.resume_fetches();
    finish(driver).await;
    assert_eq!(store.fetches_answered(), 1);
    assert_eq!(gate.resolution(), Resolution::Pending);
    assert_eq!(gate.authorize(), Err(GateError::TornDown));
}

#[tokio::test]
async fn test_granted_view_redirects_on_expiry() {
    let store = Arc::new(MemorySessionStore::new());
    store.set_session(Some(Session::new(Identity::new("u-1"))));
    let ctx = context(&store);

    let gate = ctx.mount_gate("/");
    let driver = spawn_guard(&ctx, &gate);
    wait_for(&gate, Resolution::Granted).await;

    // a token refresh for the same identity leaves the view alone
    let mut rx = gate.watch();
    rx.borrow_and_update();
    store.set_session(Some(Session::new(Identity::new("u-1"))));
    tokio::task::yield_now().await;
    assert!(!rx.has_changed().unwrap());

    store.expire();
    wait_for(&gate, Resolution::Denied).await;
    let GateDecision::Redirect(redirect) = gate.decision() else {
        panic!("expected redirect");
    };
    assert_eq!(redirect.href(), "/signin?from=%2F");

    gate.teardown();
    finish(driver).await;
    assert_eq!(store.fetch_calls(), 1);
}

#[tokio::test]
async fn test_failed_fetch_policies() {
    let store = Arc::new(MemorySessionStore::new());
    store.fail_next_fetches(1);
    let ctx = context(&store);

    let gate = ctx.mount_gate("/projects");
    let driver = spawn_guard(&ctx, &gate);
    wait_for(&gate, Resolution::Denied).await;
    gate.teardown();
    finish(driver).await;

    // keeping the last known state still denies a gate that never resolved
    let lenient = context(&store).with_gate_config(GateConfig {
        on_fetch_failure: FetchFailurePolicy::KeepLastKnown,
        ..GateConfig::default()
    });
    store.fail_next_fetches(1);
    let gate = lenient.mount_gate("/projects");
    let driver = spawn_guard(&lenient, &gate);
    wait_for(&gate, Resolution::Denied).await;
    gate.teardown();
    finish(driver).await;
}

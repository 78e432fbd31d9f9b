//! Unit tests for gate state transitions and the render decision.

use pp_types::Identity;

use super::*;
use crate::store::SessionNotifier;

fn session(id: &str) -> Session {
    Session::new(Identity::new(id).with_email(format!("{id}@example.com")))
}

fn gate(path: &str) -> AuthGate {
    AuthGate::mount(path, GateConfig::default())
}

#[test]
fn test_mounts_pending_and_renders_loading() {
    let gate = gate("/projects");
    assert_eq!(gate.resolution(), Resolution::Pending);
    assert_eq!(gate.decision(), GateDecision::Loading);
    assert_eq!(gate.authorize(), Err(GateError::Pending));
}

#[test]
fn test_initial_snapshot_grants() {
    let gate = gate("/projects");
    let s = session("u-1");
    assert!(gate.apply(gate.initial_ticket(), Observation::Present(&s)));

    assert_eq!(gate.resolution(), Resolution::Granted);
    assert_eq!(gate.decision(), GateDecision::Render);
    let proof = gate.authorize().unwrap();
    assert_eq!(proof.user_id().as_str(), "u-1");
}

#[test]
fn test_denied_redirect_carries_requested_path() {
    let gate = gate("/projects");
    gate.apply(gate.initial_ticket(), Observation::Absent);

    match gate.decision() {
        GateDecision::Redirect(redirect) => {
            assert_eq!(redirect.target, "/signin");
            assert_eq!(redirect.return_to.as_ref().map(|r| r.as_str()), Some("/projects"));
            assert_eq!(redirect.href(), "/signin?from=%2Fprojects");
        }
        other => panic!("expected redirect, got {other:?}"),
    }
    assert_eq!(gate.authorize(), Err(GateError::Denied));
}

#[test]
fn test_notification_outranks_late_initial_snapshot() {
    let gate = gate("/reports");
    let s = session("u-1");

    // sign-out notification lands before the initial fetch answers "present"
    let ticket = gate.issue_ticket().unwrap();
    assert!(gate.apply(ticket, Observation::Absent));
    assert!(!gate.apply(gate.initial_ticket(), Observation::Present(&s)));

    assert_eq!(gate.resolution(), Resolution::Denied);
}

#[test]
fn test_notification_after_grant_denies() {
    let gate = gate("/");
    let s = session("u-1");
    gate.apply(gate.initial_ticket(), Observation::Present(&s));

    let ticket = gate.issue_ticket().unwrap();
    assert!(gate.apply(ticket, Observation::Absent));
    assert_eq!(gate.resolution(), Resolution::Denied);
    assert!(matches!(gate.decision(), GateDecision::Redirect(_)));
}

#[test]
fn test_identical_notifications_do_not_notify() {
    let gate = gate("/");
    let mut rx = gate.watch();
    let s = session("u-1");

    assert!(gate.apply(gate.initial_ticket(), Observation::Present(&s)));
    assert!(rx.has_changed().unwrap());
    rx.borrow_and_update();

    let ticket = gate.issue_ticket().unwrap();
    assert!(!gate.apply(ticket, Observation::Present(&s)));
    assert!(!rx.has_changed().unwrap());
    assert_eq!(gate.resolution(), Resolution::Granted);
}

#[test]
fn test_identity_switch_while_granted_updates_proof() {
    let gate = gate("/");
    gate.apply(gate.initial_ticket(), Observation::Present(&session("u-1")));
    let ticket = gate.issue_ticket().unwrap();
    assert!(gate.apply(ticket, Observation::Present(&session("u-2"))));
    assert_eq!(gate.authorize().unwrap().user_id().as_str(), "u-2");
}

#[test]
fn test_failed_fetch_denies_by_default() {
    let gate = gate("/projects/7");
    gate.apply(gate.initial_ticket(), Observation::Failed);
    assert_eq!(gate.resolution(), Resolution::Denied);
}

#[test]
fn test_keep_last_known_policy() {
    let config = GateConfig {
        on_fetch_failure: FetchFailurePolicy::KeepLastKnown,
        ..GateConfig::default()
    };

    // pending gate still resolves to denied
    let pending = AuthGate::mount("/", config.clone());
    pending.apply(pending.initial_ticket(), Observation::Failed);
    assert_eq!(pending.resolution(), Resolution::Denied);

    // resolved gate keeps its state
    let granted = AuthGate::mount("/", config);
    let ticket = granted.issue_ticket().unwrap();
    granted.apply(ticket, Observation::Present(&session("u-1")));
    let later = granted.issue_ticket().unwrap();
    assert!(!granted.apply(later, Observation::Failed));
    assert_eq!(granted.resolution(), Resolution::Granted);
}

#[test]
fn test_teardown_blocks_writes_and_cancels_subscription() {
    let notifier = SessionNotifier::new();
    let subscription = notifier.subscribe();
    let gate = gate("/projects");
    assert!(gate.attach_subscription(subscription.handle()));

    gate.teardown();
    assert!(gate.is_torn_down());
    assert_eq!(notifier.subscriber_count(), 0);
    assert!(gate.issue_ticket().is_none());
    assert!(!gate.apply(gate.initial_ticket(), Observation::Present(&session("u-1"))));
    assert_eq!(gate.resolution(), Resolution::Pending);
    assert_eq!(gate.authorize(), Err(GateError::TornDown));

    // teardown is idempotent and late subscriptions are refused
    gate.teardown();
    let late = notifier.subscribe();
    assert!(!gate.attach_subscription(late.handle()));
    assert!(!late.handle().is_active());
}

#[test]
fn test_decide_is_pure() {
    let config = GateConfig::default();
    assert_eq!(decide(Resolution::Pending, "/projects", &config), GateDecision::Loading);
    assert_eq!(decide(Resolution::Granted, "/projects", &config), GateDecision::Render);

    // an off-site "requested" location is never carried along
    let GateDecision::Redirect(redirect) = decide(Resolution::Denied, "//evil.example", &config) else {
        panic!("expected redirect");
    };
    assert_eq!(redirect.return_to, None);
    assert_eq!(redirect.href(), "/signin");
}

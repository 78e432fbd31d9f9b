use tracing::debug;

use super::{AuthGate, Observation};
use crate::store::SessionSource;

/// Resolve and follow the session for `gate` until it is torn down.
///
/// Subscribes first, then runs the single initial fetch and the notification
/// loop concurrently on the current task. Ordering between the two is settled
/// by the gate's tickets, not by which future happens to finish first.
/// Returns once the gate is torn down or the session source goes away.
pub async fn drive_gate<S>(source: &S, gate: AuthGate)
where
    S: SessionSource + ?Sized,
{
    let mut subscription = source.subscribe();
    if !gate.attach_subscription(subscription.handle()) {
        return;
    }

    let initial = gate.initial_ticket();
    let fetch = source.current();
    tokio::pin!(fetch);
    let mut fetched = false;

    loop {
        let mut closed = false;

        tokio::select! {
            result = &mut fetch, if !fetched => {
                fetched = true;
                if let Err(err) = &result {
                    debug!(path = gate.requested(), error = %err, "initial session fetch failed");
                }
                gate.apply(initial, Observation::from_fetch(&result));
            }
            event = subscription.next() => match event {
                Some(event) => match gate.issue_ticket() {
                    Some(ticket) => {
                        gate.apply(ticket, Observation::from_snapshot(event.session()));
                    }
                    None => closed = true,
                },
                // cancelled by teardown, or the store is gone
                None => closed = true,
            },
        }

        if gate.is_torn_down() {
            break;
        }
        if closed {
            if !fetched {
                let result = (&mut fetch).await;
                gate.apply(initial, Observation::from_fetch(&result));
            }
            break;
        }
    }

    debug!(path = gate.requested(), "gate driver stopped");
}

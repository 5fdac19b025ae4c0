use std::sync::Arc;

use tokio::sync::broadcast;

use backspin_types::AppEvent;

/// Fan-out of application events to subscribed views. Events are fire-and-
/// forget: a lagging or absent subscriber never blocks a mutation.
#[derive(Clone)]
pub struct Dispatcher {
    inner: Arc<DispatcherInner>,
}

struct DispatcherInner {
    broadcast_tx: broadcast::Sender<AppEvent>,
}

impl Dispatcher {
    pub fn new() -> Self {
        let (broadcast_tx, _) = broadcast::channel(1024);
        Self {
            inner: Arc::new(DispatcherInner { broadcast_tx }),
        }
    }

    /// Subscribe to application events. Returns a broadcast receiver.
    pub fn subscribe(&self) -> broadcast::Receiver<AppEvent> {
        self.inner.broadcast_tx.subscribe()
    }

    /// Broadcast an event to all subscribers.
    pub fn broadcast(&self, event: AppEvent) {
        let _ = self.inner.broadcast_tx.send(event);
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn subscribers_see_events_in_order() {
        let dispatcher = Dispatcher::new();
        let mut rx = dispatcher.subscribe();

        dispatcher.broadcast(AppEvent::InviteIssued { code: "DJ-AAAAAA".into() });
        dispatcher.broadcast(AppEvent::InviteIssued { code: "DJ-BBBBBB".into() });

        match rx.recv().await.unwrap() {
            AppEvent::InviteIssued { code } => assert_eq!(code, "DJ-AAAAAA"),
            other => panic!("unexpected event: {:?}", other),
        }
        match rx.recv().await.unwrap() {
            AppEvent::InviteIssued { code } => assert_eq!(code, "DJ-BBBBBB"),
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[test]
    fn broadcast_without_subscribers_is_fine() {
        let dispatcher = Dispatcher::new();
        dispatcher.broadcast(AppEvent::SessionEnded { user_id: "u1".into() });
    }
}

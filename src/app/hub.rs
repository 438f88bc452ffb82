use crate::app::notification::Notification;
use crate::domain::models::Entry;
use tokio::sync::mpsc::{self, error::TrySendError};

struct AttachedSurface {
    id: u64,
    tx: mpsc::Sender<Notification>,
}

#[derive(Default)]
pub struct PresentationHub {
    surfaces: Vec<AttachedSurface>,
    next_id: u64,
}

impl PresentationHub {
    /// Registers a new surface. Its channel starts with a `Snapshot` of
    /// `entries` so it can build its mirror before any incremental update.
    pub fn attach(
        &mut self,
        entries: Vec<Entry>,
        capacity: usize,
    ) -> (u64, mpsc::Receiver<Notification>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        let id = self.next_id;
        self.next_id += 1;

        if tx.try_send(Notification::Snapshot { entries }).is_err() {
            log::warn!("surface {id} could not receive its snapshot");
        }
        self.surfaces.push(AttachedSurface { id, tx });
        log::info!("surface {id} attached ({} total)", self.surfaces.len());
        (id, rx)
    }

    pub fn len(&self) -> usize {
        self.surfaces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.surfaces.is_empty()
    }

    /// Sends to one surface only. A full or closed channel just misses it.
    pub fn send_to(&mut self, id: u64, notification: &Notification) {
        let Some(surface) = self.surfaces.iter().find(|s| s.id == id) else {
            return;
        };
        if surface.tx.try_send(notification.clone()).is_err() {
            log::warn!("surface {id} missed a notification");
        }
    }

    /// Never blocks: a surface with a full channel misses this message and is
    /// expected to reattach for a fresh snapshot; a closed one is dropped.
    pub fn broadcast(&mut self, notification: &Notification) {
        self.surfaces
            .retain(|surface| match surface.tx.try_send(notification.clone()) {
                Ok(()) => true,
                Err(TrySendError::Full(_)) => {
                    log::warn!("surface {} is lagging; dropped a notification", surface.id);
                    true
                }
                Err(TrySendError::Closed(_)) => {
                    log::info!("surface {} detached", surface.id);
                    false
                }
            });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::Item;

    #[tokio::test]
    async fn test_attach_starts_with_snapshot() {
        let mut hub = PresentationHub::default();
        let entries = vec![Entry::Item(Item::new("a", "A"))];
        let (_, mut rx) = hub.attach(entries.clone(), 4);
        assert_eq!(rx.recv().await, Some(Notification::Snapshot { entries }));
    }

    #[tokio::test]
    async fn test_broadcast_reaches_every_surface_in_order() {
        let mut hub = PresentationHub::default();
        let (_, mut first) = hub.attach(Vec::new(), 8);
        let (_, mut second) = hub.attach(Vec::new(), 8);

        hub.broadcast(&Notification::EntryRemoved {
            url: "a".to_string(),
        });
        hub.broadcast(&Notification::ViewsClosed);

        for rx in [&mut first, &mut second] {
            assert!(matches!(rx.recv().await, Some(Notification::Snapshot { .. })));
            assert!(matches!(
                rx.recv().await,
                Some(Notification::EntryRemoved { .. })
            ));
            assert_eq!(rx.recv().await, Some(Notification::ViewsClosed));
        }
    }

    #[tokio::test]
    async fn test_send_to_reaches_one_surface() {
        let mut hub = PresentationHub::default();
        let (_, mut first) = hub.attach(Vec::new(), 4);
        let (second_id, mut second) = hub.attach(Vec::new(), 4);

        hub.send_to(second_id, &Notification::ViewsClosed);
        hub.send_to(99, &Notification::ViewsClosed);

        assert!(matches!(first.recv().await, Some(Notification::Snapshot { .. })));
        assert!(first.try_recv().is_err());
        assert!(matches!(second.recv().await, Some(Notification::Snapshot { .. })));
        assert_eq!(second.recv().await, Some(Notification::ViewsClosed));
    }

    #[tokio::test]
    async fn test_closed_surface_is_dropped_and_full_one_kept() {
        let mut hub = PresentationHub::default();
        let (_, closed) = hub.attach(Vec::new(), 1);
        let (_, _full) = hub.attach(Vec::new(), 1);
        drop(closed);

        // the full surface still holds its snapshot, so this does not fit
        hub.broadcast(&Notification::ViewsClosed);
        assert_eq!(hub.len(), 1);
    }
}

use crate::host::{ContainerMetrics, Dispatch, HostEnvironment, HostEvent, HostEventKind, ListenerId};
use std::collections::{BTreeMap, VecDeque};

/// In-memory host: a queue of synthesized events and a listener table.
///
/// Used for headless runs and tests, and as the listener bookkeeping behind
/// real window hosts.
#[derive(Debug, Default)]
pub struct HeadlessHost {
    container: Option<ContainerMetrics>,
    listeners: BTreeMap<ListenerId, HostEventKind>,
    queue: VecDeque<HostEvent>,
    next_id: u64,
}

impl HeadlessHost {
    pub fn new(container: Option<ContainerMetrics>) -> Self {
        Self {
            container,
            ..Self::default()
        }
    }

    pub fn set_container(&mut self, container: Option<ContainerMetrics>) {
        self.container = container;
    }

    /// Queue an event. Resize events also update the container size.
    pub fn emit(&mut self, event: HostEvent) {
        if let HostEvent::Resize { size } = event {
            match &mut self.container {
                Some(c) => c.size = size,
                None => self.container = Some(ContainerMetrics::new(size)),
            }
        }
        self.queue.push_back(event);
    }

    pub fn pending_events(&self) -> usize {
        self.queue.len()
    }

    pub fn listener_count(&self, kind: HostEventKind) -> usize {
        self.listeners.values().filter(|k| **k == kind).count()
    }

    pub fn total_listeners(&self) -> usize {
        self.listeners.len()
    }
}

impl HostEnvironment for HeadlessHost {
    fn container(&self) -> Option<ContainerMetrics> {
        self.container
    }

    fn subscribe(&mut self, kind: HostEventKind) -> ListenerId {
        self.next_id += 1;
        let id = ListenerId(self.next_id);
        self.listeners.insert(id, kind);
        tracing::trace!(?id, ?kind, "listener added");
        id
    }

    fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let removed = self.listeners.remove(&id).is_some();
        if removed {
            tracing::trace!(?id, "listener removed");
        }
        removed
    }

    fn is_subscribed(&self, id: ListenerId) -> bool {
        self.listeners.contains_key(&id)
    }

    fn poll_event(&mut self) -> Option<Dispatch> {
        let event = self.queue.pop_front()?;
        let kind = event.kind();
        let listeners = self
            .listeners
            .iter()
            .filter(|(_, k)| **k == kind)
            .map(|(id, _)| *id)
            .collect();
        Some(Dispatch { event, listeners })
    }
}

// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The "new cluster" notification.

use core::fmt::Debug;

use crate::draft::ClusterDraft;

/// Handle returned by [`ClusterEvent::subscribe`], used to unsubscribe.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Listener<K> = Box<dyn FnMut(&[K], &mut ClusterDraft)>;

/// Ordered registry of cluster listeners.
///
/// Every finalized cluster raises the event once per pass. Listeners receive the owners of the
/// clustered annotations and the draft to style; they run in subscription order and each sees
/// the draft as left by the previous one.
///
/// ```
/// use glam::DVec3;
/// use understory_cluster::{ClusterDraft, ClusterEvent, LabelGraphics};
///
/// let mut event = ClusterEvent::<u32>::new();
/// let id = event.subscribe(|members, draft| {
///     draft.label = Some(LabelGraphics::with_text(format!("{} stops", members.len())));
/// });
///
/// let mut draft = ClusterDraft::new(DVec3::ZERO, 2);
/// event.raise(&[4, 9], &mut draft);
/// let text = draft.label.unwrap().text.unwrap();
/// assert_eq!(text.constant().map(String::as_str), Some("2 stops"));
///
/// assert!(event.unsubscribe(id));
/// assert!(event.is_empty());
/// ```
pub struct ClusterEvent<K> {
    listeners: Vec<(ListenerId, Listener<K>)>,
    next_id: u64,
}

impl<K> Debug for ClusterEvent<K> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ClusterEvent")
            .field("listeners", &self.listeners.len())
            .finish_non_exhaustive()
    }
}

impl<K> Default for ClusterEvent<K> {
    fn default() -> Self {
        Self {
            listeners: Vec::new(),
            next_id: 0,
        }
    }
}

impl<K> ClusterEvent<K> {
    /// Create an event with no listeners.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener.
    pub fn subscribe<F>(&mut self, listener: F) -> ListenerId
    where
        F: FnMut(&[K], &mut ClusterDraft) + 'static,
    {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Remove a listener. Returns `false` if it was not registered.
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(listener, _)| *listener != id);
        self.listeners.len() != before
    }

    /// Number of listeners.
    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    /// Whether no listener is registered.
    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    /// Remove every listener.
    pub fn clear(&mut self) {
        self.listeners.clear();
    }

    /// Invoke every listener with `members` and `draft`.
    pub fn raise(&mut self, members: &[K], draft: &mut ClusterDraft) {
        for (_, listener) in &mut self.listeners {
            listener(members, draft);
        }
    }
}

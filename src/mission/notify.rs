//! Lifecycle notifications for external observers.
//!
//! Observers are called synchronously, in subscription order, before the
//! engine call that produced the notification returns.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::mission::tag::Tag;
use crate::mission::types::EventSource;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum MissionNotification {
    MissionStarted {
        mission_id: Tag,
    },
    MissionCompleted {
        mission_id: Tag,
        success: bool,
    },
    ObjectiveStarted {
        mission_id: Tag,
        objective_id: Tag,
    },
    ObjectiveCompleted {
        mission_id: Tag,
        objective_id: Tag,
        success: bool,
    },
    /// Fired for every valid emitted event, consumed or not.
    EventBroadcast {
        event_tag: Tag,
        source: EventSource,
    },
}

impl MissionNotification {
    /// Mission the notification belongs to, if any.
    pub fn mission_id(&self) -> Option<&Tag> {
        match self {
            MissionNotification::MissionStarted { mission_id }
            | MissionNotification::MissionCompleted { mission_id, .. }
            | MissionNotification::ObjectiveStarted { mission_id, .. }
            | MissionNotification::ObjectiveCompleted { mission_id, .. } => Some(mission_id),
            MissionNotification::EventBroadcast { .. } => None,
        }
    }
}

impl fmt::Display for MissionNotification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MissionNotification::MissionStarted { mission_id } => {
                write!(f, "mission started: {}", mission_id)
            }
            MissionNotification::MissionCompleted { mission_id, success } => {
                write!(f, "mission completed: {} (success={})", mission_id, success)
            }
            MissionNotification::ObjectiveStarted {
                mission_id,
                objective_id,
            } => write!(f, "objective started: {}/{}", mission_id, objective_id),
            MissionNotification::ObjectiveCompleted {
                mission_id,
                objective_id,
                success,
            } => write!(
                f,
                "objective completed: {}/{} (success={})",
                mission_id, objective_id, success
            ),
            MissionNotification::EventBroadcast { event_tag, .. } => {
                write!(f, "event: {}", event_tag)
            }
        }
    }
}

pub trait MissionObserver {
    fn notify(&mut self, notification: &MissionNotification);
}

impl<F> MissionObserver for F
where
    F: FnMut(&MissionNotification),
{
    fn notify(&mut self, notification: &MissionNotification) {
        self(notification)
    }
}

/// Handle returned by [`ObserverRegistry::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

#[derive(Default)]
pub struct ObserverRegistry {
    next_id: u64,
    observers: Vec<(SubscriptionId, Box<dyn MissionObserver + Send>)>,
}

impl ObserverRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, observer: impl MissionObserver + Send + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.observers.push((id, Box::new(observer)));
        id
    }

    /// Returns false if `id` was not subscribed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(existing, _)| *existing != id);
        self.observers.len() != before
    }

    pub fn len(&self) -> usize {
        self.observers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }

    pub fn publish(&mut self, notification: &MissionNotification) {
        for (_, observer) in self.observers.iter_mut() {
            observer.notify(notification);
        }
    }
}

impl fmt::Debug for ObserverRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObserverRegistry")
            .field("observers", &self.observers.len())
            .finish()
    }
}

use std::collections::VecDeque;

use crate::error::ExperienceError;
use crate::sizes::{DeviceClass, Viewport};
use crate::theme::Theme;

/// Notifications passed between components through the orchestrator.
#[derive(Debug, Clone, PartialEq)]
pub enum ExperienceEvent {
    Resized(Viewport),
    DeviceChanged(DeviceClass),
    AssetsReady,
    AssetsFailed(ExperienceError),
    WorldReady,
    ControlsEnabled,
    ThemeSwitched(Theme),
}

/// FIFO of pending notifications. Components publish, the orchestrator drains.
#[derive(Debug, Default)]
pub struct EventQueue {
    pending: VecDeque<ExperienceEvent>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn publish(&mut self, event: ExperienceEvent) {
        self.pending.push_back(event);
    }

    pub fn publish_all(&mut self, events: impl IntoIterator<Item = ExperienceEvent>) {
        self.pending.extend(events);
    }

    pub fn pop(&mut self) -> Option<ExperienceEvent> {
        self.pending.pop_front()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

/// Observer list for listeners outside the component graph (the page, tests).
pub struct Signal<T> {
    listeners: Vec<Box<dyn FnMut(&T)>>,
}

impl<T> Signal<T> {
    pub fn new() -> Self {
        Self {
            listeners: Vec::new(),
        }
    }

    pub fn subscribe(&mut self, listener: impl FnMut(&T) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    /// Call every listener in registration order.
    pub fn emit(&mut self, value: &T) {
        for listener in &mut self.listeners {
            listener(value);
        }
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}

impl<T> Default for Signal<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_queue_is_fifo() {
        let mut q = EventQueue::new();
        q.publish(ExperienceEvent::AssetsReady);
        q.publish_all([ExperienceEvent::WorldReady, ExperienceEvent::ControlsEnabled]);
        assert_eq!(q.len(), 3);
        assert_eq!(q.pop(), Some(ExperienceEvent::AssetsReady));
        assert_eq!(q.pop(), Some(ExperienceEvent::WorldReady));
        assert_eq!(q.pop(), Some(ExperienceEvent::ControlsEnabled));
        assert!(q.pop().is_none());
        assert!(q.is_empty());
    }

    #[test]
    fn test_signal_reaches_every_listener_in_order() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut signal = Signal::new();
        for id in 0..3 {
            let seen = seen.clone();
            signal.subscribe(move |v: &Theme| seen.borrow_mut().push((id, *v)));
        }
        signal.emit(&Theme::Dark);
        assert_eq!(
            *seen.borrow(),
            vec![(0, Theme::Dark), (1, Theme::Dark), (2, Theme::Dark)]
        );
        assert_eq!(signal.len(), 3);
    }

    #[test]
    fn test_signal_without_listeners() {
        let mut signal: Signal<()> = Signal::default();
        signal.emit(&());
        assert!(signal.is_empty());
    }
}

// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use crate::event::Event;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Ordered queue of events waiting for the next flush.
///
/// Every operation takes the same lock for the whole buffer, so a drain never
/// observes a half-applied append or prepend. The lock is never held while
/// events are on the wire: [`EventBuffer::drain_all`] detaches the batch first.
#[derive(Debug, Default)]
pub struct EventBuffer {
    events: Mutex<Vec<Event>>,
}

impl EventBuffer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Event>> {
        // No critical section can leave the Vec half-updated
        self.events.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn append(&self, event: Event) {
        self.lock().push(event);
    }

    /// Takes every buffered event, leaving the buffer empty.
    #[must_use]
    pub fn drain_all(&self) -> Vec<Event> {
        std::mem::take(&mut *self.lock())
    }

    /// Puts `events` back in front of anything appended since they were drained.
    pub fn prepend(&self, mut events: Vec<Event>) {
        if events.is_empty() {
            return;
        }
        let mut buffered = self.lock();
        events.append(&mut buffered);
        *buffered = events;
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{event, messages};
    use std::sync::Arc;

    #[test]
    fn test_append_and_drain_preserves_order() {
        let buffer = EventBuffer::new();
        buffer.append(event("e1"));
        buffer.append(event("e2"));
        buffer.append(event("e3"));
        assert_eq!(buffer.len(), 3);

        let drained = buffer.drain_all();
        assert_eq!(messages(&drained), vec!["e1", "e2", "e3"]);
        assert!(buffer.is_empty());
        assert!(buffer.drain_all().is_empty());
    }

    #[test]
    fn test_prepend_goes_before_new_arrivals() {
        let buffer = EventBuffer::new();
        buffer.append(event("a"));
        buffer.append(event("b"));

        let batch = buffer.drain_all();
        buffer.append(event("c"));
        buffer.prepend(batch);

        assert_eq!(messages(&buffer.drain_all()), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_prepend_empty_is_noop() {
        let buffer = EventBuffer::new();
        buffer.append(event("a"));
        buffer.prepend(Vec::new());
        assert_eq!(messages(&buffer.drain_all()), vec!["a"]);
    }

    #[test]
    fn test_repeated_failures_keep_order_without_duplicates() {
        let buffer = EventBuffer::new();
        buffer.append(event("a"));
        buffer.append(event("b"));

        for round in 0..3 {
            let batch = buffer.drain_all();
            buffer.append(event(&format!("new{round}")));
            buffer.prepend(batch);
        }

        assert_eq!(
            messages(&buffer.drain_all()),
            vec!["a", "b", "new0", "new1", "new2"]
        );
    }

    #[test]
    fn test_concurrent_append_and_drain() {
        use std::thread;
        use std::time::Duration;

        let buffer = Arc::new(EventBuffer::new());

        let producers: Vec<_> = (0..4)
            .map(|p| {
                let buffer = Arc::clone(&buffer);
                thread::spawn(move || {
                    for i in 0..250 {
                        buffer.append(event(&format!("p{p}-{i}")));
                    }
                })
            })
            .collect();

        let drainer = {
            let buffer = Arc::clone(&buffer);
            thread::spawn(move || {
                let mut drained = Vec::new();
                for _ in 0..10 {
                    thread::sleep(Duration::from_micros(200));
                    drained.extend(buffer.drain_all());
                }
                drained
            })
        };

        for producer in producers {
            producer.join().unwrap();
        }
        let mut all = drainer.join().unwrap();
        all.extend(buffer.drain_all());

        assert_eq!(all.len(), 1000);

        // Each producer's events stay in call order
        for p in 0..4 {
            let prefix = format!("p{p}-");
            let seen: Vec<usize> = messages(&all)
                .iter()
                .filter_map(|m| m.strip_prefix(&prefix).map(|i| i.parse().unwrap()))
                .collect();
            assert_eq!(seen, (0..250).collect::<Vec<_>>());
        }
    }
}

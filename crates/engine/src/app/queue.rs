use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use super::input::Intent;

/// FIFO buffer that is only ever emptied as a whole batch.
///
/// A drain removes exactly the items present when it starts.
#[derive(Debug)]
pub struct DrainQueue<T> {
    items: VecDeque<T>,
}

impl<T> Default for DrainQueue<T> {
    fn default() -> Self {
        Self {
            items: VecDeque::new(),
        }
    }
}

impl<T> DrainQueue<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, item: T) {
        self.items.push_back(item);
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn drain_all(&mut self) -> Vec<T> {
        let count = self.items.len();
        self.items.drain(..count).collect()
    }

    fn pop_front(&mut self) -> Option<T> {
        self.items.pop_front()
    }
}

/// An intent tagged with its position in capture order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Message {
    pub seq: u64,
    pub intent: Intent,
}

#[derive(Debug, Default)]
struct MessageBuffer {
    pending: DrainQueue<Message>,
    next_seq: u64,
}

impl MessageBuffer {
    fn append(&mut self, intent: Intent) -> u64 {
        let seq = self.next_seq;
        self.next_seq = self.next_seq.wrapping_add(1);
        self.pending.push(Message { seq, intent });
        seq
    }
}

/// Capture-side message queue, shared on one thread between input handling
/// (through [`MessageSink`]) and the loop's once-per-frame drain.
#[derive(Debug, Clone, Default)]
pub struct MessageQueue {
    inner: Rc<RefCell<MessageBuffer>>,
}

impl MessageQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sink(&self) -> MessageSink {
        MessageSink {
            inner: Rc::clone(&self.inner),
        }
    }

    pub fn append(&self, intent: Intent) -> u64 {
        self.inner.borrow_mut().append(intent)
    }

    pub fn len(&self) -> usize {
        self.inner.borrow().pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.borrow().pending.is_empty()
    }

    pub fn drain_all(&self) -> Vec<Message> {
        self.inner.borrow_mut().pending.drain_all()
    }

    /// Drains the messages queued at call time, handing each to `visit`.
    ///
    /// No borrow is held while `visit` runs, so it may append; those appends
    /// stay queued for the next drain. Returns the number of messages visited.
    pub fn drain_each<F>(&self, mut visit: F) -> usize
    where
        F: FnMut(Message),
    {
        let count = self.len();
        let mut visited = 0usize;
        while visited < count {
            let next = self.inner.borrow_mut().pending.pop_front();
            let Some(message) = next else {
                break;
            };
            visit(message);
            visited += 1;
        }
        visited
    }
}

/// Append-only handle onto a [`MessageQueue`].
#[derive(Debug, Clone)]
pub struct MessageSink {
    inner: Rc<RefCell<MessageBuffer>>,
}

impl MessageSink {
    pub fn append(&self, intent: Intent) -> u64 {
        self.inner.borrow_mut().append(intent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::Direction;

    const UP: Intent = Intent::Move(Direction::Up);
    const DOWN: Intent = Intent::Move(Direction::Down);
    const LEFT: Intent = Intent::Move(Direction::Left);

    #[test]
    fn drain_queue_returns_fifo_batch_and_empties() {
        let mut queue = DrainQueue::new();
        queue.push(1);
        queue.push(2);
        queue.push(3);

        assert_eq!(queue.drain_all(), vec![1, 2, 3]);
        assert!(queue.is_empty());
        assert!(queue.drain_all().is_empty());
    }

    #[test]
    fn sequence_numbers_follow_append_order() {
        let queue = MessageQueue::new();
        let sink = queue.sink();

        let first = sink.append(UP);
        let second = queue.append(DOWN);
        let third = sink.append(LEFT);

        assert!(first < second && second < third);
        let drained = queue.drain_all();
        assert_eq!(
            drained.iter().map(|m| m.seq).collect::<Vec<_>>(),
            vec![first, second, third]
        );
        assert_eq!(
            drained.iter().map(|m| m.intent).collect::<Vec<_>>(),
            vec![UP, DOWN, LEFT]
        );
    }

    #[test]
    fn append_during_drain_is_deferred_to_next_drain() {
        let queue = MessageQueue::new();
        let sink = queue.sink();
        sink.append(UP);
        sink.append(UP);
        sink.append(DOWN);

        let mut seen = Vec::new();
        let visited = queue.drain_each(|message| {
            seen.push(message.intent);
            if seen.len() == 1 {
                sink.append(LEFT);
            }
        });

        assert_eq!(visited, 3);
        assert_eq!(seen, vec![UP, UP, DOWN]);
        assert_eq!(queue.len(), 1);

        let next = queue.drain_all();
        assert_eq!(next.len(), 1);
        assert_eq!(next[0].intent, LEFT);
    }

    #[test]
    fn appending_on_every_visit_still_terminates() {
        let queue = MessageQueue::new();
        let sink = queue.sink();
        sink.append(UP);

        for _ in 0..5 {
            let visited = queue.drain_each(|_| {
                sink.append(DOWN);
            });
            assert_eq!(visited, 1);
        }
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn draining_empty_queue_visits_nothing() {
        let queue = MessageQueue::new();
        let visited = queue.drain_each(|_| panic!("nothing to visit"));
        assert_eq!(visited, 0);
    }
}

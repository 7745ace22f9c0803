//! One-shot deferred tasks on a millisecond clock.
//!
//! The owner polls [`Deferred::drain_due`] once per frame. Tasks live inside
//! the owner, so dropping or clearing it cancels everything still pending.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskId(u64);

#[derive(Debug)]
struct Entry<T> {
    id: TaskId,
    due_ms: f64,
    task: T,
}

#[derive(Debug)]
pub struct Deferred<T> {
    entries: Vec<Entry<T>>,
    next_id: u64,
}

impl<T> Default for Deferred<T> {
    fn default() -> Self {
        Self { entries: Vec::new(), next_id: 0 }
    }
}

impl<T> Deferred<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, now_ms: f64, delay_ms: f64, task: T) -> TaskId {
        let id = TaskId(self.next_id);
        self.next_id += 1;
        self.entries.push(Entry { id, due_ms: now_ms + delay_ms, task });
        id
    }

    /// Returns whether the task was still pending.
    pub fn cancel(&mut self, id: TaskId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.id != id);
        before != self.entries.len()
    }

    pub fn cancel_all(&mut self) {
        self.entries.clear();
    }

    pub fn is_pending(&self, id: TaskId) -> bool {
        self.entries.iter().any(|e| e.id == id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Removes and returns every task due at `now_ms`, earliest first.
    /// Ties keep scheduling order.
    pub fn drain_due(&mut self, now_ms: f64) -> Vec<T> {
        let mut due = Vec::new();
        let mut i = 0;
        while i < self.entries.len() {
            if self.entries[i].due_ms <= now_ms {
                due.push(self.entries.remove(i));
            } else {
                i += 1;
            }
        }
        due.sort_by(|a, b| a.due_ms.total_cmp(&b.due_ms).then(a.id.0.cmp(&b.id.0)));
        due.into_iter().map(|e| e.task).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fires_only_when_due() {
        let mut q = Deferred::new();
        q.schedule(0.0, 500.0, "explode");
        assert!(q.drain_due(499.0).is_empty());
        assert_eq!(q.drain_due(500.0), vec!["explode"]);
        assert!(q.is_empty());
    }

    #[test]
    fn earliest_first() {
        let mut q = Deferred::new();
        q.schedule(0.0, 300.0, 'b');
        q.schedule(0.0, 100.0, 'a');
        q.schedule(0.0, 300.0, 'c');
        assert_eq!(q.drain_due(1_000.0), vec!['a', 'b', 'c']);
    }

    #[test]
    fn cancel_removes_task() {
        let mut q = Deferred::new();
        let id = q.schedule(0.0, 10.0, ());
        assert!(q.is_pending(id));
        assert!(q.cancel(id));
        assert!(!q.cancel(id));
        assert!(q.drain_due(100.0).is_empty());
    }

    #[test]
    fn cancel_all_clears() {
        let mut q = Deferred::new();
        q.schedule(0.0, 1.0, 1);
        q.schedule(0.0, 2.0, 2);
        q.cancel_all();
        assert_eq!(q.len(), 0);
    }
}

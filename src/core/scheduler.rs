use serde::Serialize;
use std::cmp::Ordering;
use std::collections::BinaryHeap;

pub type Millis = u64;

#[derive(Debug)]
struct Entry<A> {
    due: Millis,
    seq: u64,
    action: A,
}

impl<A> PartialEq for Entry<A> {
    fn eq(&self, other: &Self) -> bool {
        self.due == other.due && self.seq == other.seq
    }
}

impl<A> Eq for Entry<A> {}

impl<A> PartialOrd for Entry<A> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<A> Ord for Entry<A> {
    // Reversed so the max-heap pops the earliest due time, then the earliest insertion.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .due
            .cmp(&self.due)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Virtual-time queue of deferred actions.
///
/// Scheduling is fire-and-forget: nothing can be cancelled once queued. Callers drive time
/// explicitly through [`Scheduler::pop_due`], so tests never wait on a wall clock.
#[derive(Debug)]
pub struct Scheduler<A> {
    queue: BinaryHeap<Entry<A>>,
    next_seq: u64,
}

impl<A> Default for Scheduler<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A> Scheduler<A> {
    pub fn new() -> Self {
        Self {
            queue: BinaryHeap::new(),
            next_seq: 0,
        }
    }

    pub fn schedule_at(&mut self, due: Millis, action: A) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.queue.push(Entry { due, seq, action });
    }

    pub fn schedule_timeline<E>(
        &mut self,
        base: Millis,
        timeline: Timeline<E>,
        wrap: impl Fn(E) -> A,
    ) {
        for step in timeline.steps {
            self.schedule_at(base.saturating_add(step.at_ms), wrap(step.effect));
        }
    }

    /// Removes and returns the next action due at or before `now`.
    pub fn pop_due(&mut self, now: Millis) -> Option<(Millis, A)> {
        if self.queue.peek()?.due > now {
            return None;
        }
        self.queue.pop().map(|entry| (entry.due, entry.action))
    }

    pub fn next_due(&self) -> Option<Millis> {
        self.queue.peek().map(|entry| entry.due)
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineStep<E> {
    pub at_ms: Millis,
    pub effect: E,
}

/// Ordered list of (offset, effect) steps relative to some start instant.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Timeline<E> {
    steps: Vec<TimelineStep<E>>,
}

impl<E> Default for Timeline<E> {
    fn default() -> Self {
        Self { steps: Vec::new() }
    }
}

impl<E> Timeline<E> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, at_ms: Millis, effect: E) {
        self.steps.push(TimelineStep { at_ms, effect });
    }

    pub fn extend(&mut self, other: Timeline<E>) {
        self.steps.extend(other.steps);
    }

    /// Steps ordered by offset; equal offsets keep push order.
    pub fn into_sorted(mut self) -> Self {
        self.steps.sort_by_key(|step| step.at_ms);
        self
    }

    pub fn steps(&self) -> &[TimelineStep<E>] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain(
        scheduler: &mut Scheduler<&'static str>,
        now: Millis,
    ) -> Vec<(Millis, &'static str)> {
        let mut out = Vec::new();
        while let Some(item) = scheduler.pop_due(now) {
            out.push(item);
        }
        out
    }

    #[test]
    fn pops_in_due_order_with_fifo_ties() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule_at(300, "c");
        scheduler.schedule_at(100, "a");
        scheduler.schedule_at(200, "b1");
        scheduler.schedule_at(200, "b2");

        assert_eq!(
            drain(&mut scheduler, 1_000),
            vec![(100, "a"), (200, "b1"), (200, "b2"), (300, "c")]
        );
        assert!(scheduler.is_empty());
    }

    #[test]
    fn holds_back_actions_that_are_not_yet_due() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule_at(150, "stat");
        scheduler.schedule_at(250, "service");

        assert!(drain(&mut scheduler, 149).is_empty());
        assert_eq!(drain(&mut scheduler, 200), vec![(150, "stat")]);
        assert_eq!(scheduler.next_due(), Some(250));
        assert_eq!(scheduler.len(), 1);
    }

    #[test]
    fn timeline_steps_are_offset_from_base() {
        let mut timeline = Timeline::new();
        timeline.push(300, "icon-reset");
        timeline.push(0, "icon");
        let mut scheduler = Scheduler::new();
        scheduler.schedule_timeline(1_000, timeline.into_sorted(), |e| e);

        assert_eq!(
            drain(&mut scheduler, 2_000),
            vec![(1_000, "icon"), (1_300, "icon-reset")]
        );
    }
}

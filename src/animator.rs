//! Per-property animation timeline.
//!
//! Provides [`StatusAnimator`], which schedules target values for individual
//! [`Property`] slots and interpolates them over time. Every property has its
//! own timeline: a multi-property request is split into one descriptor per
//! property, and at most one animation per property is active at any instant.
//!
//! Non-forced requests are chained: a rolling cursor marks the instant the
//! last chained animation finishes, and the next request starts there. Forced
//! requests start immediately and supersede whatever is active on the same
//! property once promoted.

use crate::status::Status;
use crate::time::{TimeDuration, TimeInstant};
use crate::types::{PROPERTY_COUNT, Property, PropertyMap, StatusDelta, TimingProfile};

/// A scheduled future change to one property.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimationDescriptor<I: TimeInstant> {
    pub property: Property,
    pub target: f32,
    pub duration: I::Duration,
    pub profile: TimingProfile,
    pub scheduled_start: I,
}

/// The currently interpolating animation of one property.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActiveAnimation<I: TimeInstant> {
    pub start_value: f32,
    pub end_value: f32,
    pub start_time: I,
    pub end_time: I,
    pub duration: I::Duration,
    pub profile: TimingProfile,
}

impl<I: TimeInstant> ActiveAnimation<I> {
    /// Interpolated value at `now`, clamped to the end value once finished.
    pub fn value_at(&self, now: I) -> f32 {
        let elapsed = now.duration_since(self.start_time);
        self.profile.interpolate(
            self.start_value,
            self.end_value,
            elapsed.as_millis(),
            self.duration.as_millis(),
        )
    }

    #[inline]
    pub fn is_finished(&self, now: I) -> bool {
        now >= self.end_time
    }
}

/// Schedules and evaluates per-property animations.
///
/// # Type Parameters
/// * `I` - Time instant type
#[derive(Debug, Clone)]
pub struct StatusAnimator<I: TimeInstant> {
    queue: Vec<AnimationDescriptor<I>>,
    active: [Option<ActiveAnimation<I>>; PROPERTY_COUNT],
    cursor: I,
}

impl<I: TimeInstant> StatusAnimator<I> {
    /// Creates an idle animator whose chaining cursor starts at `now`.
    pub fn new(now: I) -> Self {
        Self {
            queue: Vec::new(),
            active: [None; PROPERTY_COUNT],
            cursor: now,
        }
    }

    /// Enqueues one descriptor per property in `delta`.
    ///
    /// Non-forced calls start at the rolling cursor and push it forward by
    /// `duration`. Forced calls start at `now`; the cursor is moved to at
    /// least `now + duration` so later chained calls follow the forced motion.
    /// Zero durations are stored as one millisecond.
    pub fn trigger_animation(
        &mut self,
        delta: &StatusDelta,
        duration: I::Duration,
        profile: TimingProfile,
        force: bool,
        now: I,
    ) {
        self.catch_up_cursor(now);
        let duration = if duration.as_millis() == 0 {
            I::Duration::from_millis(1)
        } else {
            duration
        };

        let scheduled_start = if force { now } else { self.cursor };
        for (property, target) in delta.iter() {
            self.enqueue(AnimationDescriptor {
                property,
                target,
                duration,
                profile,
                scheduled_start,
            });
        }

        let finish = scheduled_start.add_or_hold(duration);
        if finish > self.cursor {
            self.cursor = finish;
        }
    }

    /// Inserts a pause before the next chained animation.
    ///
    /// Only takes effect while something is queued; a wait with nothing
    /// queued is a no-op.
    pub fn trigger_wait_animation(&mut self, duration: I::Duration, now: I) {
        self.catch_up_cursor(now);
        if !self.queue.is_empty() {
            self.cursor = self.cursor.add_or_hold(duration);
        }
    }

    /// Promotes due descriptors and evaluates every active animation at `now`.
    ///
    /// Returns the properties that had an active or just-completed animation
    /// this tick, with their interpolated values. Finished animations are
    /// removed after being evaluated once at their end value.
    pub fn advance(&mut self, current: &Status, now: I) -> StatusDelta {
        self.promote_due(current, now);

        let mut updates = PropertyMap::new();
        for property in Property::ALL {
            if let Some(animation) = self.active[property.index()] {
                updates.insert(property, animation.value_at(now));
                if animation.is_finished(now) {
                    self.active[property.index()] = None;
                }
            }
        }
        updates
    }

    /// `current` with every active and queued end value applied.
    ///
    /// Lets callers compose new animations relative to where a property will
    /// end up rather than where it is drawn right now.
    pub fn final_status(&self, current: &Status) -> Status {
        let mut status = *current;
        for (property, animation) in self.active_animations() {
            status.set(property, animation.end_value);
        }
        for descriptor in &self.queue {
            status.set(descriptor.property, descriptor.target);
        }
        status
    }

    /// Remaining time of all active animations plus all queued durations.
    pub fn final_time(&self, now: I) -> I::Duration {
        let active = self
            .active_animations()
            .map(|(_, a)| a.end_time.duration_since(now))
            .fold(I::Duration::ZERO, |acc, d| acc.saturating_add(d));
        self.queue
            .iter()
            .map(|d| d.duration)
            .fold(active, |acc, d| acc.saturating_add(d))
    }

    /// True if anything is queued or active.
    pub fn is_active(&self) -> bool {
        !self.queue.is_empty() || self.active.iter().any(Option::is_some)
    }

    /// Drops all queued and active animations.
    ///
    /// Properties keep whatever value they were last drawn with.
    pub fn reset(&mut self, now: I) {
        self.queue.clear();
        self.active = [None; PROPERTY_COUNT];
        self.cursor = now;
    }

    /// Queued descriptors, ordered by scheduled start.
    pub fn queued(&self) -> &[AnimationDescriptor<I>] {
        &self.queue
    }

    pub fn active(&self, property: Property) -> Option<&ActiveAnimation<I>> {
        self.active[property.index()].as_ref()
    }

    /// The instant the next chained animation will start.
    pub fn cursor(&self) -> I {
        self.cursor
    }

    fn active_animations(&self) -> impl Iterator<Item = (Property, &ActiveAnimation<I>)> {
        Property::ALL
            .into_iter()
            .zip(self.active.iter())
            .filter_map(|(p, slot)| slot.as_ref().map(|a| (p, a)))
    }

    fn catch_up_cursor(&mut self, now: I) {
        if now >= self.cursor {
            self.cursor = now;
        }
    }

    /// Stable insert keeping the queue ordered by scheduled start.
    fn enqueue(&mut self, descriptor: AnimationDescriptor<I>) {
        let at = self
            .queue
            .partition_point(|d| d.scheduled_start <= descriptor.scheduled_start);
        self.queue.insert(at, descriptor);
    }

    fn promote_due(&mut self, current: &Status, now: I) {
        let due = self.queue.partition_point(|d| d.scheduled_start <= now);
        for descriptor in self.queue.drain(..due) {
            let slot = &mut self.active[descriptor.property.index()];

            let start_value = match slot {
                // Same target already in flight: drop the redundant request.
                Some(existing)
                    if existing.end_value == descriptor.target && !existing.is_finished(now) =>
                {
                    continue;
                }
                Some(existing) => existing.value_at(now),
                None => current.get(descriptor.property),
            };

            *slot = Some(ActiveAnimation {
                start_value,
                end_value: descriptor.target,
                start_time: descriptor.scheduled_start,
                end_time: descriptor.scheduled_start.add_or_hold(descriptor.duration),
                duration: descriptor.duration,
                profile: descriptor.profile,
            });
        }
    }
}

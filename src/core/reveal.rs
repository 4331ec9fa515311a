use serde::Serialize;
use std::fmt;
use std::mem;
use std::str::FromStr;
use tracing::{debug, trace};

use super::counter::{
    CounterAnimation, DecoratedNumber, PULSE_DELAY_MS, PULSE_HOLD_MS, PULSE_SCALE,
};
use super::scheduler::{Millis, Scheduler, Timeline};
use super::types::{Effect, ElementKind, RevealState, TargetId, TargetParts};
use crate::error::LandingError;

pub const DEFAULT_THRESHOLD: f64 = 0.1;

const ICON_SCALE: f64 = 1.1;
const ICON_ROTATE_DEG: f64 = 5.0;
const ICON_RESET_MS: Millis = 300;
const TITLE_FLASH_MS: Millis = 500;
const FEATURE_START_MS: Millis = 600;
const FEATURE_STAGGER_MS: Millis = 100;
const CONTENT_FADE_MS: Millis = 200;
const AUTHOR_FADE_MS: Millis = 400;

/// CSS-style margin applied to the viewport before intersection is computed, in pixels.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct RootMargin {
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
    pub left: i32,
}

impl RootMargin {
    pub fn bottom_inset(px: i32) -> Self {
        Self {
            bottom: -px,
            ..Self::default()
        }
    }
}

impl fmt::Display for RootMargin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}px {}px {}px {}px",
            self.top, self.right, self.bottom, self.left
        )
    }
}

impl FromStr for RootMargin {
    type Err = LandingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || LandingError::InvalidRootMargin(s.to_string());
        let values = s
            .split_whitespace()
            .map(|part| {
                let number = part.strip_suffix("px").unwrap_or(part);
                number.parse::<i32>().map_err(|_| invalid())
            })
            .collect::<Result<Vec<_>, _>>()?;

        match values.as_slice() {
            [all] => Ok(Self {
                top: *all,
                right: *all,
                bottom: *all,
                left: *all,
            }),
            [vertical, horizontal] => Ok(Self {
                top: *vertical,
                right: *horizontal,
                bottom: *vertical,
                left: *horizontal,
            }),
            [top, horizontal, bottom] => Ok(Self {
                top: *top,
                right: *horizontal,
                bottom: *bottom,
                left: *horizontal,
            }),
            [top, right, bottom, left] => Ok(Self {
                top: *top,
                right: *right,
                bottom: *bottom,
                left: *left,
            }),
            _ => Err(invalid()),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RevealOptions {
    pub threshold: f64,
    #[serde(serialize_with = "serialize_margin")]
    pub root_margin: RootMargin,
}

fn serialize_margin<S: serde::Serializer>(margin: &RootMargin, s: S) -> Result<S::Ok, S::Error> {
    s.collect_str(margin)
}

impl RevealOptions {
    pub fn new(threshold: f64, root_margin: RootMargin) -> Result<Self, LandingError> {
        if !(0.0..=1.0).contains(&threshold) {
            return Err(LandingError::InvalidThreshold(threshold));
        }
        Ok(Self {
            threshold,
            root_margin,
        })
    }
}

impl Default for RevealOptions {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            root_margin: RootMargin::bottom_inset(50),
        }
    }
}

/// Viewport-intersection capability: whoever reports visibility crossings for enrolled elements.
pub trait ViewportObserver {
    fn observe(&mut self, target: TargetId, options: &RevealOptions);
    fn unobserve(&mut self, target: TargetId);
}

/// Single sink for every visual change the controller makes.
pub trait RevealView {
    fn apply(&mut self, target: TargetId, effect: &Effect);
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct IntersectionEvent {
    pub target: TargetId,
    pub ratio: f64,
    pub is_intersecting: bool,
}

#[derive(Clone, Debug)]
pub struct RevealTarget {
    pub kind: ElementKind,
    pub parts: TargetParts,
    state: RevealState,
}

impl RevealTarget {
    pub fn new(kind: ElementKind) -> Self {
        Self {
            kind,
            parts: TargetParts::default(),
            state: RevealState::Unobserved,
        }
    }

    pub fn with_parts(mut self, parts: TargetParts) -> Self {
        self.parts = parts;
        self
    }

    pub fn state(&self) -> RevealState {
        self.state
    }

    pub fn has_fired(&self) -> bool {
        self.state == RevealState::Revealed
    }
}

#[derive(Clone, Debug, PartialEq)]
enum Action {
    Reveal(TargetId),
    Apply(TargetId, Effect),
}

/// Kind-specific follow-up steps, relative to the moment the target is revealed.
pub fn follow_up_timeline(kind: ElementKind, parts: &TargetParts) -> Timeline<Effect> {
    let mut timeline = Timeline::new();
    match kind {
        ElementKind::SolutionCard => {
            if parts.icon {
                timeline.push(
                    0,
                    Effect::IconTransform {
                        scale: ICON_SCALE,
                        rotate_deg: ICON_ROTATE_DEG,
                    },
                );
                timeline.push(
                    ICON_RESET_MS,
                    Effect::IconTransform {
                        scale: 1.0,
                        rotate_deg: 0.0,
                    },
                );
            }
            if parts.title {
                timeline.push(0, Effect::TitleHighlight { on: true });
                timeline.push(TITLE_FLASH_MS, Effect::TitleHighlight { on: false });
            }
            for index in 0..parts.features {
                timeline.push(
                    FEATURE_START_MS + index as Millis * FEATURE_STAGGER_MS,
                    Effect::FeatureShift { index },
                );
            }
        }
        ElementKind::TestimonialCard => {
            if parts.content {
                timeline.push(0, Effect::ContentVisible { visible: false });
                timeline.push(CONTENT_FADE_MS, Effect::ContentVisible { visible: true });
            }
            if parts.author {
                timeline.push(0, Effect::AuthorVisible { visible: false });
                timeline.push(AUTHOR_FADE_MS, Effect::AuthorVisible { visible: true });
            }
        }
        _ => {}
    }
    timeline.into_sorted()
}

fn pulse_timeline() -> Timeline<Effect> {
    let mut timeline = Timeline::new();
    timeline.push(PULSE_DELAY_MS, Effect::CounterScale { scale: PULSE_SCALE });
    timeline.push(
        PULSE_DELAY_MS + PULSE_HOLD_MS,
        Effect::CounterScale { scale: 1.0 },
    );
    timeline
}

/// Display refresh interval used when a reveal is rendered ahead of time.
pub const PLAN_FRAME_MS: Millis = 16;

/// Everything a page needs to replay one target's reveal without the controller.
///
/// `steps` are offsets from the reveal instant, which itself comes `delay_ms` after the
/// target first crosses the threshold.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RevealPlan {
    pub kind: ElementKind,
    pub delay_ms: Millis,
    pub steps: Timeline<Effect>,
}

struct Detached;

impl ViewportObserver for Detached {
    fn observe(&mut self, _target: TargetId, _options: &RevealOptions) {}
    fn unobserve(&mut self, _target: TargetId) {}
}

#[derive(Default)]
struct PlanRecorder {
    now: Millis,
    steps: Timeline<Effect>,
}

impl RevealView for PlanRecorder {
    fn apply(&mut self, _target: TargetId, effect: &Effect) {
        // Re-applying the latest value of the same property changes nothing on the page.
        let repeat = self
            .steps
            .steps()
            .iter()
            .rev()
            .find(|step| mem::discriminant(&step.effect) == mem::discriminant(effect))
            .is_some_and(|step| step.effect == *effect);
        if !repeat {
            self.steps.push(self.now, effect.clone());
        }
    }
}

/// Runs one target through a controller in virtual time and records what it renders.
pub fn reveal_plan(kind: ElementKind, parts: &TargetParts) -> RevealPlan {
    let mut controller =
        ViewportRevealController::new(Detached, PlanRecorder::default(), RevealOptions::default());
    let ids = controller.register([RevealTarget::new(kind).with_parts(parts.clone())]);
    let events: Vec<IntersectionEvent> = ids
        .into_iter()
        .map(|target| IntersectionEvent {
            target,
            ratio: 1.0,
            is_intersecting: true,
        })
        .collect();
    controller.handle_intersections(0, &events);

    let delay_ms = kind.reveal_delay_ms();
    let mut now = delay_ms;
    loop {
        controller.view.now = now - delay_ms;
        controller.tick(now);
        let next_frame = (!controller.counters.is_empty()).then(|| now + PLAN_FRAME_MS);
        let Some(next) = next_frame.into_iter().chain(controller.scheduler.next_due()).min()
        else {
            break;
        };
        now = next;
    }
    trace!(kind = kind.as_str(), steps = controller.view.steps.len(), "rendered reveal plan");

    RevealPlan {
        kind,
        delay_ms,
        steps: controller.view.steps,
    }
}

/// Drives one-time reveal transitions for enrolled elements as they scroll into view.
///
/// Each target walks `Unobserved -> Pending -> Firing -> Revealed`; `Revealed` is absorbing
/// and the target is unobserved as it enters it, so repeated visibility never re-fires.
pub struct ViewportRevealController<O, V> {
    observer: O,
    view: V,
    options: RevealOptions,
    targets: Vec<RevealTarget>,
    scheduler: Scheduler<Action>,
    counters: Vec<(TargetId, CounterAnimation)>,
}

impl<O: ViewportObserver, V: RevealView> ViewportRevealController<O, V> {
    pub fn new(observer: O, view: V, options: RevealOptions) -> Self {
        Self {
            observer,
            view,
            options,
            targets: Vec::new(),
            scheduler: Scheduler::new(),
            counters: Vec::new(),
        }
    }

    pub fn register(&mut self, targets: impl IntoIterator<Item = RevealTarget>) -> Vec<TargetId> {
        let mut ids = Vec::new();
        for mut target in targets {
            let id = TargetId(self.targets.len() as u32);
            target.state = RevealState::Pending;
            self.observer.observe(id, &self.options);
            debug!(target_id = id.0, kind = target.kind.as_str(), "registered reveal target");
            self.targets.push(target);
            ids.push(id);
        }
        ids
    }

    pub fn handle_intersections(&mut self, now: Millis, events: &[IntersectionEvent]) {
        for event in events {
            if !event.is_intersecting || event.ratio < self.options.threshold {
                continue;
            }
            let Some(target) = self.targets.get_mut(event.target.0 as usize) else {
                continue;
            };
            if target.state != RevealState::Pending {
                trace!(target_id = event.target.0, state = ?target.state, "ignoring repeat intersection");
                continue;
            }
            target.state = RevealState::Firing;
            let delay = target.kind.reveal_delay_ms();
            debug!(target_id = event.target.0, delay_ms = delay, "scheduling reveal");
            self.scheduler
                .schedule_at(now.saturating_add(delay), Action::Reveal(event.target));
        }
    }

    /// Runs every scheduled step due at or before `now`, including steps those steps queue.
    pub fn advance(&mut self, now: Millis) {
        while let Some((due, action)) = self.scheduler.pop_due(now) {
            match action {
                Action::Reveal(id) => self.reveal(id, due),
                Action::Apply(id, effect) => self.view.apply(id, &effect),
            }
        }
    }

    /// Samples every running counter once, as a display refresh would.
    pub fn frame(&mut self, now: Millis) {
        let mut finished = Vec::new();
        for (id, counter) in &self.counters {
            let sample = counter.sample(now);
            self.view.apply(*id, &Effect::CounterText { text: sample.text.clone() });
            if sample.is_complete() {
                self.view.apply(*id, &Effect::CounterHighlight { on: false });
                self.view.apply(*id, &Effect::CounterScale { scale: 1.0 });
                finished.push(*id);
            } else {
                self.view.apply(*id, &Effect::CounterHighlight { on: true });
            }
        }
        if finished.is_empty() {
            return;
        }
        self.counters.retain(|(id, _)| !finished.contains(id));
        for id in finished {
            self.scheduler
                .schedule_timeline(now, pulse_timeline(), |effect| Action::Apply(id, effect));
        }
    }

    pub fn tick(&mut self, now: Millis) {
        self.advance(now);
        self.frame(now);
    }

    fn reveal(&mut self, id: TargetId, at: Millis) {
        let Some(target) = self.targets.get_mut(id.0 as usize) else {
            return;
        };
        if target.state != RevealState::Firing {
            return;
        }
        target.state = RevealState::Revealed;
        let kind = target.kind;
        let parts = target.parts.clone();

        self.view.apply(id, &Effect::Revealed);
        self.observer.unobserve(id);
        debug!(target_id = id.0, kind = kind.as_str(), at_ms = at, "revealed");

        if kind == ElementKind::StatCard {
            if let Some(number) = parts.stat_label.as_deref().and_then(DecoratedNumber::parse) {
                self.counters.push((id, CounterAnimation::start(number, at)));
            }
        }
        self.scheduler
            .schedule_timeline(at, follow_up_timeline(kind, &parts), |effect| {
                Action::Apply(id, effect)
            });
    }

    pub fn target(&self, id: TargetId) -> Option<&RevealTarget> {
        self.targets.get(id.0 as usize)
    }

    pub fn state(&self, id: TargetId) -> Option<RevealState> {
        self.target(id).map(RevealTarget::state)
    }

    pub fn options(&self) -> &RevealOptions {
        &self.options
    }

    pub fn pending_steps(&self) -> usize {
        self.scheduler.len()
    }

    pub fn active_counters(&self) -> usize {
        self.counters.len()
    }

    pub fn is_idle(&self) -> bool {
        self.scheduler.is_empty() && self.counters.is_empty()
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn observer(&self) -> &O {
        &self.observer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[derive(Default)]
    struct RecordingObserver {
        observed: BTreeSet<TargetId>,
        unobserve_calls: Vec<TargetId>,
    }

    impl ViewportObserver for RecordingObserver {
        fn observe(&mut self, target: TargetId, _options: &RevealOptions) {
            self.observed.insert(target);
        }

        fn unobserve(&mut self, target: TargetId) {
            self.observed.remove(&target);
            self.unobserve_calls.push(target);
        }
    }

    #[derive(Default)]
    struct RecordingView {
        applied: Vec<(TargetId, Effect)>,
    }

    impl RecordingView {
        fn count(&self, id: TargetId, effect: &Effect) -> usize {
            self.applied
                .iter()
                .filter(|(t, e)| *t == id && e == effect)
                .count()
        }

        fn for_target(&self, id: TargetId) -> Vec<&Effect> {
            self.applied
                .iter()
                .filter(|(t, _)| *t == id)
                .map(|(_, e)| e)
                .collect()
        }
    }

    impl RevealView for RecordingView {
        fn apply(&mut self, target: TargetId, effect: &Effect) {
            self.applied.push((target, effect.clone()));
        }
    }

    fn controller() -> ViewportRevealController<RecordingObserver, RecordingView> {
        ViewportRevealController::new(
            RecordingObserver::default(),
            RecordingView::default(),
            RevealOptions::default(),
        )
    }

    fn visible(id: TargetId) -> IntersectionEvent {
        IntersectionEvent {
            target: id,
            ratio: 0.5,
            is_intersecting: true,
        }
    }

    fn hidden(id: TargetId) -> IntersectionEvent {
        IntersectionEvent {
            target: id,
            ratio: 0.0,
            is_intersecting: false,
        }
    }

    #[test]
    fn registration_observes_and_marks_pending() {
        let mut ctl = controller();
        let ids = ctl.register([
            RevealTarget::new(ElementKind::ServiceItem),
            RevealTarget::new(ElementKind::Generic),
        ]);
        assert_eq!(ids, vec![TargetId(0), TargetId(1)]);
        assert_eq!(ctl.state(ids[0]), Some(RevealState::Pending));
        assert_eq!(ctl.observer().observed.len(), 2);
    }

    #[test]
    fn reveal_waits_for_kind_delay() {
        let mut ctl = controller();
        let ids = ctl.register([RevealTarget::new(ElementKind::ServiceItem)]);
        ctl.handle_intersections(1_000, &[visible(ids[0])]);
        assert_eq!(ctl.state(ids[0]), Some(RevealState::Firing));

        ctl.advance(1_249);
        assert_eq!(ctl.view().count(ids[0], &Effect::Revealed), 0);

        ctl.advance(1_250);
        assert_eq!(ctl.view().count(ids[0], &Effect::Revealed), 1);
        assert_eq!(ctl.state(ids[0]), Some(RevealState::Revealed));
        assert!(ctl.target(ids[0]).is_some_and(RevealTarget::has_fired));
        assert_eq!(ctl.observer().unobserve_calls, vec![ids[0]]);
        assert!(ctl.is_idle());
    }

    #[test]
    fn below_threshold_or_not_intersecting_is_ignored() {
        let mut ctl = controller();
        let ids = ctl.register([RevealTarget::new(ElementKind::Generic)]);
        ctl.handle_intersections(
            0,
            &[
                IntersectionEvent {
                    target: ids[0],
                    ratio: 0.05,
                    is_intersecting: true,
                },
                hidden(ids[0]),
            ],
        );
        assert_eq!(ctl.state(ids[0]), Some(RevealState::Pending));
        assert_eq!(ctl.pending_steps(), 0);
    }

    #[test]
    fn ratio_exactly_at_threshold_fires() {
        let mut ctl = controller();
        let ids = ctl.register([RevealTarget::new(ElementKind::Generic)]);
        ctl.handle_intersections(
            0,
            &[IntersectionEvent {
                target: ids[0],
                ratio: DEFAULT_THRESHOLD,
                is_intersecting: true,
            }],
        );
        assert_eq!(ctl.state(ids[0]), Some(RevealState::Firing));
        ctl.advance(0);
        assert_eq!(ctl.state(ids[0]), Some(RevealState::Revealed));
    }

    #[test]
    fn intersection_while_firing_does_not_reschedule() {
        let mut ctl = controller();
        let ids = ctl.register([RevealTarget::new(ElementKind::ServiceItem)]);
        let id = ids[0];
        ctl.handle_intersections(0, &[visible(id)]);
        assert_eq!(ctl.pending_steps(), 1);

        ctl.handle_intersections(100, &[visible(id)]);
        ctl.handle_intersections(200, &[hidden(id), visible(id)]);
        assert_eq!(ctl.state(id), Some(RevealState::Firing));
        assert_eq!(ctl.pending_steps(), 1);

        ctl.advance(249);
        assert_eq!(ctl.view().count(id, &Effect::Revealed), 0);
        ctl.advance(250);
        ctl.advance(450);
        assert_eq!(ctl.view().count(id, &Effect::Revealed), 1);
        assert_eq!(ctl.observer().unobserve_calls, vec![id]);
    }

    #[test]
    fn target_never_fires_twice() {
        let mut ctl = controller();
        let ids = ctl.register([RevealTarget::new(ElementKind::TestimonialCard)]);
        let id = ids[0];

        ctl.handle_intersections(0, &[visible(id)]);
        ctl.handle_intersections(50, &[hidden(id)]);
        ctl.handle_intersections(100, &[visible(id)]);
        ctl.tick(400);
        ctl.handle_intersections(500, &[hidden(id)]);
        ctl.handle_intersections(600, &[visible(id)]);
        ctl.tick(5_000);

        assert_eq!(ctl.view().count(id, &Effect::Revealed), 1);
        assert_eq!(ctl.observer().unobserve_calls, vec![id]);
    }

    #[test]
    fn unknown_target_ids_are_skipped() {
        let mut ctl = controller();
        ctl.handle_intersections(0, &[visible(TargetId(42))]);
        ctl.tick(1_000);
        assert!(ctl.view().applied.is_empty());
    }

    #[test]
    fn solution_card_runs_icon_title_and_staggered_features() {
        let mut ctl = controller();
        let parts = TargetParts {
            icon: true,
            title: true,
            features: 3,
            ..TargetParts::default()
        };
        let ids = ctl.register([RevealTarget::new(ElementKind::SolutionCard).with_parts(parts)]);
        let id = ids[0];
        ctl.handle_intersections(0, &[visible(id)]);

        ctl.advance(200);
        assert_eq!(
            ctl.view().for_target(id),
            vec![
                &Effect::Revealed,
                &Effect::IconTransform {
                    scale: 1.1,
                    rotate_deg: 5.0
                },
                &Effect::TitleHighlight { on: true },
            ]
        );

        ctl.advance(899);
        assert_eq!(ctl.view().count(id, &Effect::FeatureShift { index: 0 }), 1);
        assert_eq!(ctl.view().count(id, &Effect::FeatureShift { index: 1 }), 0);
        assert_eq!(
            ctl.view().count(
                id,
                &Effect::IconTransform {
                    scale: 1.0,
                    rotate_deg: 0.0
                }
            ),
            1
        );
        assert_eq!(ctl.view().count(id, &Effect::TitleHighlight { on: false }), 1);

        ctl.advance(1_000);
        assert_eq!(ctl.view().count(id, &Effect::FeatureShift { index: 2 }), 1);
        assert!(ctl.is_idle());
    }

    #[test]
    fn testimonial_card_fades_content_then_author() {
        let mut ctl = controller();
        let parts = TargetParts {
            content: true,
            author: true,
            ..TargetParts::default()
        };
        let ids = ctl.register([RevealTarget::new(ElementKind::TestimonialCard).with_parts(parts)]);
        let id = ids[0];
        ctl.handle_intersections(0, &[visible(id)]);
        ctl.advance(10_000);

        assert_eq!(
            ctl.view().for_target(id),
            vec![
                &Effect::Revealed,
                &Effect::ContentVisible { visible: false },
                &Effect::AuthorVisible { visible: false },
                &Effect::ContentVisible { visible: true },
                &Effect::AuthorVisible { visible: true },
            ]
        );
    }

    #[test]
    fn missing_parts_are_skipped() {
        let mut ctl = controller();
        let ids = ctl.register([
            RevealTarget::new(ElementKind::SolutionCard),
            RevealTarget::new(ElementKind::StatCard),
        ]);
        ctl.handle_intersections(0, &[visible(ids[0]), visible(ids[1])]);
        ctl.tick(10_000);

        assert_eq!(ctl.view().for_target(ids[0]), vec![&Effect::Revealed]);
        assert_eq!(ctl.view().for_target(ids[1]), vec![&Effect::Revealed]);
        assert_eq!(ctl.active_counters(), 0);
    }

    #[test]
    fn stat_card_counts_up_then_pulses() {
        let mut ctl = controller();
        let parts = TargetParts {
            stat_label: Some("$1,500".to_string()),
            ..TargetParts::default()
        };
        let ids = ctl.register([RevealTarget::new(ElementKind::StatCard).with_parts(parts)]);
        let id = ids[0];
        ctl.handle_intersections(0, &[visible(id)]);

        ctl.tick(150);
        assert_eq!(ctl.active_counters(), 1);
        assert_eq!(ctl.view().count(id, &Effect::CounterText { text: "$0".into() }), 1);

        ctl.tick(1_150);
        assert_eq!(ctl.view().count(id, &Effect::CounterText { text: "$1,406".into() }), 1);

        ctl.tick(2_150);
        assert_eq!(ctl.active_counters(), 0);
        assert_eq!(ctl.view().count(id, &Effect::CounterText { text: "$1,500".into() }), 1);

        ctl.tick(2_250);
        assert_eq!(ctl.view().count(id, &Effect::CounterScale { scale: 1.05 }), 1);
        ctl.tick(2_400);
        assert_eq!(ctl.view().count(id, &Effect::CounterScale { scale: 1.0 }), 2);
        assert!(ctl.is_idle());

        ctl.tick(10_000);
        let texts = ctl
            .view()
            .for_target(id)
            .into_iter()
            .filter(|e| matches!(e, Effect::CounterText { .. }))
            .count();
        assert_eq!(texts, 3);
    }

    #[test]
    fn root_margin_follows_css_shorthand() {
        assert_eq!(
            "0px 0px -50px 0px".parse::<RootMargin>().ok(),
            Some(RootMargin::bottom_inset(50))
        );
        assert_eq!(
            "10px".parse::<RootMargin>().ok(),
            Some(RootMargin {
                top: 10,
                right: 10,
                bottom: 10,
                left: 10
            })
        );
        assert_eq!(
            "5 -20px".parse::<RootMargin>().ok(),
            Some(RootMargin {
                top: 5,
                right: -20,
                bottom: 5,
                left: -20
            })
        );
        assert!("".parse::<RootMargin>().is_err());
        assert!("1px 2px 3px 4px 5px".parse::<RootMargin>().is_err());
        assert!("10%".parse::<RootMargin>().is_err());
        assert_eq!(RootMargin::bottom_inset(50).to_string(), "0px 0px -50px 0px");
    }

    #[test]
    fn threshold_must_be_a_fraction() {
        assert!(RevealOptions::new(1.5, RootMargin::default()).is_err());
        assert!(RevealOptions::new(f64::NAN, RootMargin::default()).is_err());
        assert!(RevealOptions::new(0.5, RootMargin::default()).is_ok());
    }

    #[test]
    fn plan_lists_reveal_and_follow_ups_in_time_order() {
        let parts = TargetParts {
            icon: true,
            features: 2,
            ..TargetParts::default()
        };
        let plan = reveal_plan(ElementKind::SolutionCard, &parts);
        assert_eq!(plan.delay_ms, 200);
        let offsets: Vec<Millis> = plan.steps.steps().iter().map(|s| s.at_ms).collect();
        assert_eq!(offsets, vec![0, 0, 300, 600, 700]);
        assert_eq!(plan.steps.steps()[0].effect, Effect::Revealed);
    }

    #[test]
    fn stat_plan_carries_counter_frames_and_pulse() {
        let plan = reveal_plan(
            ElementKind::StatCard,
            &TargetParts {
                stat_label: Some("98%".into()),
                ..TargetParts::default()
            },
        );
        assert_eq!(plan.delay_ms, 150);
        let steps = plan.steps.steps();
        assert_eq!(steps[0].effect, Effect::Revealed);
        assert_eq!(
            steps[1].effect,
            Effect::CounterText {
                text: "0%".into()
            }
        );
        assert!(steps.windows(2).all(|w| w[0].at_ms <= w[1].at_ms));
        assert!(
            steps
                .iter()
                .filter(|s| matches!(s.effect, Effect::CounterText { .. }))
                .all(|s| s.at_ms % PLAN_FRAME_MS == 0)
        );

        let at = |effect: &Effect| {
            steps
                .iter()
                .filter(|s| s.effect == *effect)
                .map(|s| s.at_ms)
                .collect::<Vec<_>>()
        };
        assert_eq!(at(&Effect::CounterText { text: "98%".into() }), vec![2_000]);
        assert_eq!(at(&Effect::CounterHighlight { on: true }), vec![0]);
        assert_eq!(at(&Effect::CounterHighlight { on: false }), vec![2_000]);
        assert_eq!(at(&Effect::CounterScale { scale: 1.05 }), vec![2_100]);
        assert_eq!(at(&Effect::CounterScale { scale: 1.0 }), vec![2_000, 2_250]);
        assert_eq!(steps.last().map(|s| s.at_ms), Some(2_250));
    }

    #[test]
    fn plan_matches_a_live_controller_run() {
        let parts = TargetParts {
            content: true,
            author: true,
            ..TargetParts::default()
        };
        let plan = reveal_plan(ElementKind::TestimonialCard, &parts);
        let effects: Vec<&Effect> = plan.steps.steps().iter().map(|s| &s.effect).collect();

        let mut ctl = controller();
        let ids = ctl.register([RevealTarget::new(ElementKind::TestimonialCard).with_parts(parts)]);
        ctl.handle_intersections(0, &[visible(ids[0])]);
        ctl.tick(10_000);
        assert_eq!(ctl.view().for_target(ids[0]), effects);
    }

    #[test]
    fn labels_without_a_number_plan_no_counter() {
        let plan = reveal_plan(
            ElementKind::StatCard,
            &TargetParts {
                stat_label: Some("24/7".into()),
                ..TargetParts::default()
            },
        );
        assert_eq!(plan.steps.len(), 1);
    }
}

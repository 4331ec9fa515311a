mod calculator;
mod counter;
mod reveal;
mod scheduler;
mod session;
mod types;

pub use calculator::{
    CalculatorProfile, CurrencyFormat, RoiCalculator, RoiView, ScenarioButton, ScenarioTable,
    compute, parse_investment,
};
pub use counter::{
    COUNTER_DURATION_MS, CounterAnimation, CounterFrame, DecoratedNumber, ease_out_quart,
    value_at,
};
pub use reveal::{
    DEFAULT_THRESHOLD, IntersectionEvent, PLAN_FRAME_MS, RevealOptions, RevealPlan, RevealTarget,
    RevealView, RootMargin, ViewportObserver, ViewportRevealController, follow_up_timeline,
    reveal_plan,
};
pub use scheduler::{Millis, Scheduler, Timeline, TimelineStep};
pub use session::{
    COOKIE_CONSENT_KEY, MemoryStore, NOTIFICATION_DISMISSED_KEY, PreferenceStore, SessionAction,
    SessionSnapshot, SessionState, THEME_KEY, Theme,
};
pub use types::{
    CalculationResult, EMPTY_PLACEHOLDER, Effect, ElementKind, FormulaVariant, RevealState,
    RiskIndicator, Scenario, ScenarioConfig, TargetId, TargetParts,
};

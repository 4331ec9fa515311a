use serde::Serialize;
use std::str::FromStr;

use crate::error::LandingError;

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Scenario {
    #[default]
    Realistic,
    Optimistic,
    Conservative,
}

impl Scenario {
    pub const ALL: [Scenario; 3] = [
        Scenario::Realistic,
        Scenario::Optimistic,
        Scenario::Conservative,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Scenario::Realistic => "realistic",
            Scenario::Optimistic => "optimistic",
            Scenario::Conservative => "conservative",
        }
    }
}

impl FromStr for Scenario {
    type Err = LandingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "realistic" => Ok(Scenario::Realistic),
            "optimistic" => Ok(Scenario::Optimistic),
            "conservative" => Ok(Scenario::Conservative),
            _ => Err(LandingError::UnknownScenario(s.to_string())),
        }
    }
}

/// Which projection formula the calculator uses for the one- and three-year values.
///
/// The page historically shipped two calculators that disagree here; both remain available.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Default, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum FormulaVariant {
    /// `one_year = investment + annual`, `three_year = investment + annual * 3`.
    WithPrincipal,
    /// `one_year = annual`, `three_year = annual * 3`.
    #[default]
    ReturnOnly,
}

impl FromStr for FormulaVariant {
    type Err = LandingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "with-principal" | "withprincipal" | "with_principal" | "principal" => {
                Ok(FormulaVariant::WithPrincipal)
            }
            "return-only" | "returnonly" | "return_only" | "return" => {
                Ok(FormulaVariant::ReturnOnly)
            }
            _ => Err(LandingError::UnknownVariant(s.to_string())),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskIndicator {
    pub label: &'static str,
    pub color: &'static str,
    /// Lower is safer; used to pick the indicator shown for an empty result.
    #[serde(skip)]
    pub level: u8,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ScenarioConfig {
    pub scenario: Scenario,
    pub roi_multiplier: f64,
    pub savings_rate: f64,
    pub risk: RiskIndicator,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculationResult {
    pub annual_return: String,
    pub one_year_value: String,
    pub three_year_value: String,
    pub savings_estimate: String,
}

pub const EMPTY_PLACEHOLDER: &str = "-";

impl CalculationResult {
    pub fn empty() -> Self {
        Self {
            annual_return: EMPTY_PLACEHOLDER.to_string(),
            one_year_value: EMPTY_PLACEHOLDER.to_string(),
            three_year_value: EMPTY_PLACEHOLDER.to_string(),
            savings_estimate: EMPTY_PLACEHOLDER.to_string(),
        }
    }

    pub fn is_empty(&self) -> bool {
        [
            &self.annual_return,
            &self.one_year_value,
            &self.three_year_value,
            &self.savings_estimate,
        ]
        .iter()
        .all(|field| field.as_str() == EMPTY_PLACEHOLDER)
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ElementKind {
    SolutionCard,
    TestimonialCard,
    StatCard,
    ServiceItem,
    IntegrationCategory,
    Generic,
}

impl ElementKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ElementKind::SolutionCard => "solution-card",
            ElementKind::TestimonialCard => "testimonial-card",
            ElementKind::StatCard => "stat-card",
            ElementKind::ServiceItem => "service-item",
            ElementKind::IntegrationCategory => "integration-category",
            ElementKind::Generic => "generic",
        }
    }

    pub fn reveal_delay_ms(self) -> u64 {
        match self {
            ElementKind::SolutionCard => 200,
            ElementKind::TestimonialCard => 300,
            ElementKind::StatCard => 150,
            ElementKind::ServiceItem => 250,
            ElementKind::IntegrationCategory => 200,
            ElementKind::Generic => 0,
        }
    }

    /// Resolves a kind from an element's class list, first match wins in table order.
    pub fn from_class_list(classes: &str) -> Self {
        let has = |name: &str| classes.split_whitespace().any(|c| c == name);
        [
            ElementKind::SolutionCard,
            ElementKind::TestimonialCard,
            ElementKind::StatCard,
            ElementKind::ServiceItem,
            ElementKind::IntegrationCategory,
        ]
        .into_iter()
        .find(|kind| has(kind.as_str()))
        .unwrap_or(ElementKind::Generic)
    }
}

impl FromStr for ElementKind {
    type Err = LandingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "solution-card" => Ok(ElementKind::SolutionCard),
            "testimonial-card" => Ok(ElementKind::TestimonialCard),
            "stat-card" => Ok(ElementKind::StatCard),
            "service-item" => Ok(ElementKind::ServiceItem),
            "integration-category" => Ok(ElementKind::IntegrationCategory),
            "generic" => Ok(ElementKind::Generic),
            _ => Err(LandingError::UnknownElementKind(s.to_string())),
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RevealState {
    Unobserved,
    Pending,
    Firing,
    Revealed,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize)]
pub struct TargetId(pub u32);

/// Optional sub-parts of an enrolled element. Absent parts are skipped by the animations.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TargetParts {
    pub icon: bool,
    pub title: bool,
    pub features: usize,
    pub content: bool,
    pub author: bool,
    pub stat_label: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(
    tag = "type",
    rename_all = "kebab-case",
    rename_all_fields = "camelCase"
)]
pub enum Effect {
    Revealed,
    IconTransform { scale: f64, rotate_deg: f64 },
    TitleHighlight { on: bool },
    FeatureShift { index: usize },
    ContentVisible { visible: bool },
    AuthorVisible { visible: bool },
    CounterText { text: String },
    CounterHighlight { on: bool },
    CounterScale { scale: f64 },
}

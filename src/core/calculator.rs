use serde::Serialize;
use std::str::FromStr;

use super::counter::group_digits;
use super::types::{CalculationResult, FormulaVariant, RiskIndicator, Scenario, ScenarioConfig};
use crate::error::LandingError;

const RISK_VERY_LOW: RiskIndicator = RiskIndicator {
    label: "Muito Baixo",
    color: "#6366f1",
    level: 0,
};
const RISK_LOW: RiskIndicator = RiskIndicator {
    label: "Baixo",
    color: "#10b981",
    level: 1,
};
const RISK_MEDIUM: RiskIndicator = RiskIndicator {
    label: "Médio",
    color: "#f59e0b",
    level: 2,
};
const RISK_HIGH: RiskIndicator = RiskIndicator {
    label: "Alto",
    color: "#ef4444",
    level: 3,
};

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ScenarioTable {
    configs: [ScenarioConfig; 3],
}

impl ScenarioTable {
    /// Multiplier table of the compact calculator: the return is a multiple of the investment.
    pub fn multipliers() -> Self {
        Self {
            configs: [
                ScenarioConfig {
                    scenario: Scenario::Realistic,
                    roi_multiplier: 2.5,
                    savings_rate: 0.7,
                    risk: RISK_LOW,
                },
                ScenarioConfig {
                    scenario: Scenario::Optimistic,
                    roi_multiplier: 4.0,
                    savings_rate: 0.7,
                    risk: RISK_MEDIUM,
                },
                ScenarioConfig {
                    scenario: Scenario::Conservative,
                    roi_multiplier: 1.8,
                    savings_rate: 0.7,
                    risk: RISK_VERY_LOW,
                },
            ],
        }
    }

    /// Rate table of the first calculator: fractional yearly returns with per-scenario savings.
    pub fn rates() -> Self {
        Self {
            configs: [
                ScenarioConfig {
                    scenario: Scenario::Realistic,
                    roi_multiplier: 0.5,
                    savings_rate: 0.6,
                    risk: RISK_MEDIUM,
                },
                ScenarioConfig {
                    scenario: Scenario::Optimistic,
                    roi_multiplier: 0.8,
                    savings_rate: 0.7,
                    risk: RISK_LOW,
                },
                ScenarioConfig {
                    scenario: Scenario::Conservative,
                    roi_multiplier: 0.3,
                    savings_rate: 0.5,
                    risk: RISK_HIGH,
                },
            ],
        }
    }

    pub fn get(&self, scenario: Scenario) -> &ScenarioConfig {
        // Every Scenario variant has exactly one row.
        self.configs
            .iter()
            .find(|config| config.scenario == scenario)
            .unwrap_or(&self.configs[0])
    }

    pub fn lowest_risk(&self) -> &ScenarioConfig {
        self.configs
            .iter()
            .min_by_key(|config| config.risk.level)
            .unwrap_or(&self.configs[0])
    }

    pub fn configs(&self) -> &[ScenarioConfig] {
        &self.configs
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrencyFormat {
    pub symbol: &'static str,
    pub separator: char,
}

impl CurrencyFormat {
    /// `$2.500`
    pub fn dollar() -> Self {
        Self {
            symbol: "$",
            separator: '.',
        }
    }

    /// `R$ 2.500`
    pub fn real() -> Self {
        Self {
            symbol: "R$ ",
            separator: '.',
        }
    }

    pub fn format(&self, value: f64) -> String {
        let rounded = value.abs().round();
        let magnitude = if rounded.is_finite() && rounded < u64::MAX as f64 {
            rounded as u64
        } else {
            u64::MAX
        };
        let sign = if value < 0.0 && magnitude > 0 { "-" } else { "" };
        format!(
            "{sign}{}{}",
            self.symbol,
            group_digits(magnitude, self.separator)
        )
    }
}

impl Default for CurrencyFormat {
    fn default() -> Self {
        Self::dollar()
    }
}

impl FromStr for CurrencyFormat {
    type Err = LandingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dollar" | "usd" | "$" => Ok(Self::dollar()),
            "real" | "brl" | "r$" => Ok(Self::real()),
            _ => Err(LandingError::UnknownCurrencyFormat(s.to_string())),
        }
    }
}

/// Everything the calculator needs besides the investment and the selected scenario.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct CalculatorProfile {
    pub variant: FormulaVariant,
    pub table: ScenarioTable,
    pub currency: CurrencyFormat,
}

impl CalculatorProfile {
    pub fn new(variant: FormulaVariant, currency: CurrencyFormat) -> Self {
        let table = match variant {
            FormulaVariant::ReturnOnly => ScenarioTable::multipliers(),
            FormulaVariant::WithPrincipal => ScenarioTable::rates(),
        };
        Self {
            variant,
            table,
            currency,
        }
    }
}

impl Default for CalculatorProfile {
    fn default() -> Self {
        Self::new(FormulaVariant::default(), CurrencyFormat::default())
    }
}

/// Reads the leading decimal literal of `text`; anything unreadable counts as zero.
pub fn parse_investment(text: &str) -> f64 {
    let trimmed = text.trim_start();
    let bytes = trimmed.as_bytes();
    let mut end = 0;
    let mut best = 0;

    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        end += 1;
    }
    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut has_digits = end > int_start;
    if has_digits {
        best = end;
    }
    if end < bytes.len() && bytes[end] == b'.' {
        end += 1;
        let frac_start = end;
        while end < bytes.len() && bytes[end].is_ascii_digit() {
            end += 1;
        }
        if end > frac_start {
            has_digits = true;
        }
        if has_digits {
            best = end;
        }
    }
    if has_digits && end < bytes.len() && matches!(bytes[end], b'e' | b'E') {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+') | Some(b'-')) {
            exp_end += 1;
        }
        let exp_digits = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits {
            best = exp_end;
        }
    }

    trimmed[..best]
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .unwrap_or(0.0)
}

pub fn compute(
    investment: f64,
    config: &ScenarioConfig,
    variant: FormulaVariant,
    currency: &CurrencyFormat,
) -> CalculationResult {
    if !investment.is_finite() || investment <= 0.0 {
        return CalculationResult::empty();
    }

    let annual = investment * config.roi_multiplier;
    let (one_year, three_year) = match variant {
        FormulaVariant::WithPrincipal => (investment + annual, investment + annual * 3.0),
        FormulaVariant::ReturnOnly => (annual, annual * 3.0),
    };
    let savings = investment * config.savings_rate;

    CalculationResult {
        annual_return: currency.format(annual),
        one_year_value: currency.format(one_year),
        three_year_value: currency.format(three_year),
        savings_estimate: currency.format(savings),
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioButton {
    pub scenario: Scenario,
    pub active: bool,
}

/// Complete display state of the calculator widget; each update replaces the previous one.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoiView {
    pub investment: f64,
    pub scenario: Scenario,
    pub variant: FormulaVariant,
    pub result: CalculationResult,
    pub risk: RiskIndicator,
    pub buttons: Vec<ScenarioButton>,
}

#[derive(Clone, Debug)]
pub struct RoiCalculator {
    profile: CalculatorProfile,
    selected: Scenario,
    investment: f64,
}

impl Default for RoiCalculator {
    fn default() -> Self {
        Self::new(CalculatorProfile::default())
    }
}

impl RoiCalculator {
    pub fn new(profile: CalculatorProfile) -> Self {
        Self {
            profile,
            selected: Scenario::default(),
            investment: 0.0,
        }
    }

    pub fn selected(&self) -> Scenario {
        self.selected
    }

    pub fn investment(&self) -> f64 {
        self.investment
    }

    pub fn set_investment(&mut self, text: &str) -> RoiView {
        self.investment = parse_investment(text);
        self.view()
    }

    pub fn set_investment_value(&mut self, investment: f64) -> RoiView {
        self.investment = if investment.is_finite() { investment } else { 0.0 };
        self.view()
    }

    pub fn select(&mut self, scenario: Scenario) -> RoiView {
        self.selected = scenario;
        self.view()
    }

    pub fn view(&self) -> RoiView {
        let config = self.profile.table.get(self.selected);
        let result = compute(
            self.investment,
            config,
            self.profile.variant,
            &self.profile.currency,
        );
        let risk = if result.is_empty() {
            self.profile.table.lowest_risk().risk
        } else {
            config.risk
        };
        RoiView {
            investment: self.investment,
            scenario: self.selected,
            variant: self.profile.variant,
            result,
            risk,
            buttons: Scenario::ALL
                .iter()
                .map(|&scenario| ScenarioButton {
                    scenario,
                    active: scenario == self.selected,
                })
                .collect(),
        }
    }
}

use serde::Serialize;

use super::scheduler::Millis;

pub const COUNTER_DURATION_MS: Millis = 2_000;
pub const PULSE_DELAY_MS: Millis = 100;
pub const PULSE_HOLD_MS: Millis = 150;
pub const PULSE_SCALE: f64 = 1.05;

/// A display string such as `$1,500`, `98%` or `500+`, split around its numeric magnitude.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DecoratedNumber {
    pub prefix: String,
    pub value: u64,
    pub separator: Option<char>,
    pub suffix: String,
}

impl DecoratedNumber {
    /// Returns `None` when there is nothing to count: no digits, or a clock-style value like `24/7`.
    pub fn parse(text: &str) -> Option<Self> {
        if text.contains('/') {
            return None;
        }
        let start = text.find(|c: char| c.is_ascii_digit())?;
        let (prefix, rest) = text.split_at(start);
        let bytes = rest.as_bytes();

        let mut digits = String::new();
        let mut separator: Option<char> = None;
        let mut end = 0;
        while end < bytes.len() {
            let b = bytes[end];
            if b.is_ascii_digit() {
                digits.push(b as char);
                end += 1;
                continue;
            }
            let candidate = b as char;
            let same_separator = separator.is_none_or(|s| s == candidate);
            if (candidate == ',' || candidate == '.')
                && same_separator
                && is_digit_group(&bytes[end + 1..])
            {
                separator = Some(candidate);
                end += 1;
                continue;
            }
            break;
        }

        let value = digits.parse::<u64>().ok()?;
        Some(Self {
            prefix: prefix.to_string(),
            value,
            separator,
            suffix: rest[end..].to_string(),
        })
    }

    pub fn render(&self, value: u64) -> String {
        let body = match self.separator {
            Some(sep) if value >= 1_000 => group_digits(value, sep),
            _ => value.to_string(),
        };
        format!("{}{}{}", self.prefix, body, self.suffix)
    }
}

fn is_digit_group(bytes: &[u8]) -> bool {
    bytes.len() >= 3
        && bytes[..3].iter().all(u8::is_ascii_digit)
        && bytes.get(3).is_none_or(|b| !b.is_ascii_digit())
}

pub fn group_digits(value: u64, separator: char) -> String {
    let raw = value.to_string();
    let mut out = String::with_capacity(raw.len() + raw.len() / 3);
    for (i, c) in raw.chars().enumerate() {
        if i > 0 && (raw.len() - i) % 3 == 0 {
            out.push(separator);
        }
        out.push(c);
    }
    out
}

pub fn ease_out_quart(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    1.0 - (1.0 - t).powi(4)
}

pub fn progress(elapsed: Millis, duration: Millis) -> f64 {
    if duration == 0 {
        return 1.0;
    }
    (elapsed as f64 / duration as f64).min(1.0)
}

/// Eased count for progress `t`; exactly `final_value` once `t` reaches 1.
pub fn value_at(final_value: u64, t: f64) -> u64 {
    if t >= 1.0 {
        return final_value;
    }
    let eased = (final_value as f64 * ease_out_quart(t)).floor();
    (eased as u64).min(final_value)
}

#[derive(Clone, Debug, PartialEq)]
pub struct CounterFrame {
    pub text: String,
    pub progress: f64,
}

impl CounterFrame {
    pub fn is_complete(&self) -> bool {
        self.progress >= 1.0
    }
}

/// Frame-sampled count-up from zero to the parsed magnitude.
#[derive(Clone, Debug)]
pub struct CounterAnimation {
    number: DecoratedNumber,
    started_at: Millis,
    duration: Millis,
}

impl CounterAnimation {
    pub fn start(number: DecoratedNumber, started_at: Millis) -> Self {
        Self {
            number,
            started_at,
            duration: COUNTER_DURATION_MS,
        }
    }

    pub fn sample(&self, now: Millis) -> CounterFrame {
        let t = progress(now.saturating_sub(self.started_at), self.duration);
        CounterFrame {
            text: self.number.render(value_at(self.number.value, t)),
            progress: t,
        }
    }
}

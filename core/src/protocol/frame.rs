//! Line-level parsing of the UMD2 ASCII telemetry.
//!
//! A device line is either a header announcing the sample frequency
//! (`Sample Frequency = 2000 Hz`) or a run of `KEY:VALUE` tokens such as
//! `N:12 D:-4031 X:0.25`.

use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;

static HEADER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*Sample\s+Frequency\s*=\s*([0-9]+(?:\.[0-9]+)?)\s*Hz\s*$")
        .expect("invalid header regex")
});

static TOKEN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([A-Za-z]+)\s*:\s*(-?[0-9]+(?:\.[0-9]+)?)\b").expect("invalid token regex")
});

/// Numeric payload of a single token.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TokenValue {
    Int(i64),
    Real(f64),
}

impl TokenValue {
    fn parse(text: &str) -> Option<Self> {
        if text.contains('.') {
            text.parse().ok().map(TokenValue::Real)
        } else {
            text.parse().ok().map(TokenValue::Int)
        }
    }

    pub fn as_f64(self) -> f64 {
        match self {
            TokenValue::Int(value) => value as f64,
            TokenValue::Real(value) => value,
        }
    }

    /// Integer view; reals truncate toward zero.
    pub fn as_i64(self) -> i64 {
        match self {
            TokenValue::Int(value) => value,
            TokenValue::Real(value) => value.trunc() as i64,
        }
    }
}

/// Tokens of one line keyed by their uppercased name. Later duplicates win.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TokenSet {
    tokens: HashMap<String, TokenValue>,
}

impl TokenSet {
    pub fn scan(line: &str) -> Self {
        let mut tokens = HashMap::new();
        for captures in TOKEN_RE.captures_iter(line) {
            let (_, [key, value]) = captures.extract();
            if let Some(value) = TokenValue::parse(value) {
                tokens.insert(key.to_ascii_uppercase(), value);
            }
        }
        Self { tokens }
    }

    pub fn get(&self, key: &str) -> Option<TokenValue> {
        self.tokens.get(key).copied()
    }

    /// Number of distinct keys.
    pub fn count(&self) -> usize {
        self.tokens.len()
    }

    /// Fringe counter, preferring `DIFF` over `D`.
    pub fn counter(&self) -> Option<i64> {
        self.get("DIFF")
            .or_else(|| self.get("D"))
            .map(TokenValue::as_i64)
    }
}

/// A data line that carried a fringe counter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame {
    pub seq: i64,
    pub counter: i64,
    pub x2: Option<f64>,
    pub y2: Option<f64>,
}

/// Result of parsing one trimmed line.
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedLine {
    Blank,
    Header { sample_frequency_hz: f64 },
    Data(Frame),
    /// Tokens (if any) did not include a counter; the line is dropped.
    NoCounter { tokens: usize },
}

/// Returns the announced sample frequency when the line is a header.
///
/// A header announcing zero is not a header.
pub fn parse_header(line: &str) -> Option<f64> {
    let captures = HEADER_RE.captures(line)?;
    let hz: f64 = captures.get(1)?.as_str().parse().ok()?;
    (hz > 0.0).then_some(hz)
}

pub fn parse_line(raw: &str, capture_xy: bool) -> ParsedLine {
    let line = raw.trim();
    if line.is_empty() {
        return ParsedLine::Blank;
    }
    if let Some(sample_frequency_hz) = parse_header(line) {
        return ParsedLine::Header {
            sample_frequency_hz,
        };
    }

    let tokens = TokenSet::scan(line);
    let Some(counter) = tokens.counter() else {
        return ParsedLine::NoCounter {
            tokens: tokens.count(),
        };
    };

    let secondary = |key: &str| {
        if capture_xy {
            tokens.get(key).map(TokenValue::as_f64)
        } else {
            None
        }
    };

    ParsedLine::Data(Frame {
        seq: tokens.get("N").map(TokenValue::as_i64).unwrap_or(0),
        counter,
        x2: secondary("X"),
        y2: secondary("Y"),
    })
}

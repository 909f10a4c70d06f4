//! Keyboard and button types.
//!
//! A [`ButtonSpec`] is what applications register (color and row optional);
//! a [`Button`] is the normalized form stored by the registry; a [`Keyboard`]
//! is the rendered, row-ordered layout handed to the transport.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Button colors understood by messaging platforms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ButtonColor {
    #[default]
    Primary,
    Secondary,
    Positive,
    Negative,
}

impl fmt::Display for ButtonColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ButtonColor::Primary => write!(f, "primary"),
            ButtonColor::Secondary => write!(f, "secondary"),
            ButtonColor::Positive => write!(f, "positive"),
            ButtonColor::Negative => write!(f, "negative"),
        }
    }
}

impl FromStr for ButtonColor {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "primary" => Ok(ButtonColor::Primary),
            "secondary" => Ok(ButtonColor::Secondary),
            "positive" => Ok(ButtonColor::Positive),
            "negative" => Ok(ButtonColor::Negative),
            other => Err(format!("unknown button color: {other}")),
        }
    }
}

/// A button as registered by the application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ButtonSpec {
    pub text: String,
    #[serde(default)]
    pub color: Option<ButtonColor>,
    #[serde(default)]
    pub row: Option<u32>,
    #[serde(default)]
    pub payload: Option<serde_json::Value>,
}

impl ButtonSpec {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            color: None,
            row: None,
            payload: None,
        }
    }

    pub fn color(mut self, color: ButtonColor) -> Self {
        self.color = Some(color);
        self
    }

    pub fn row(mut self, row: u32) -> Self {
        self.row = Some(row);
        self
    }

    pub fn payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = Some(payload);
        self
    }
}

/// A normalized button: color and row are always resolved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Button {
    pub text: String,
    pub color: ButtonColor,
    pub row: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<serde_json::Value>,
}

impl From<ButtonSpec> for Button {
    fn from(spec: ButtonSpec) -> Self {
        Self {
            text: spec.text,
            color: spec.color.unwrap_or_default(),
            row: spec.row.unwrap_or(0),
            payload: spec.payload,
        }
    }
}

/// A rendered keyboard: rows in ascending row order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Keyboard {
    /// Whether the platform should hide the keyboard after one use.
    pub one_time: bool,
    pub rows: Vec<Vec<Button>>,
}

impl Keyboard {
    /// The keyboard sent when no keyboard applies: no buttons, single-use.
    pub fn empty() -> Self {
        Self {
            one_time: true,
            rows: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.iter().all(Vec::is_empty)
    }

    /// All buttons, row by row.
    pub fn buttons(&self) -> impl Iterator<Item = &Button> {
        self.rows.iter().flatten()
    }

    /// The `index`-th button (zero-based) in reading order.
    pub fn button(&self, index: usize) -> Option<&Button> {
        self.buttons().nth(index)
    }
}

//! Keyboard registry.
//!
//! Stores named button sets and renders them into rows. Registration may
//! happen at setup or at runtime from inside a scene (per-category keyboards
//! are built on `enter`), so the table is a `DashMap`.

use std::collections::BTreeMap;

use dashmap::DashMap;
use sceneflow_types::error::EngineError;
use sceneflow_types::keyboard::{Button, ButtonSpec, Keyboard};
use tracing::debug;

/// Process-wide table of named keyboards.
#[derive(Debug, Default)]
pub struct KeyboardRegistry {
    keyboards: DashMap<String, Vec<Button>>,
}

impl KeyboardRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or overwrite) a keyboard.
    ///
    /// The name must be non-blank and at least one button is required. Each
    /// button is normalized: color defaults to primary, row defaults to 0.
    pub fn register(
        &self,
        name: &str,
        buttons: impl IntoIterator<Item = ButtonSpec>,
    ) -> Result<(), EngineError> {
        let name = validate_name(name)?;
        let buttons: Vec<Button> = buttons.into_iter().map(Button::from).collect();
        if buttons.is_empty() {
            return Err(EngineError::InvalidKeyboard {
                name: name.to_string(),
                reason: "at least one button is required".to_string(),
            });
        }

        debug!(keyboard = name, buttons = buttons.len(), "registered keyboard");
        self.keyboards.insert(name.to_string(), buttons);
        Ok(())
    }

    /// Register a keyboard given as nested rows; the outer index becomes each
    /// button's row number.
    pub fn register_rows<R>(
        &self,
        name: &str,
        rows: impl IntoIterator<Item = R>,
    ) -> Result<(), EngineError>
    where
        R: IntoIterator<Item = ButtonSpec>,
    {
        let buttons = rows.into_iter().enumerate().flat_map(|(index, row)| {
            row.into_iter().map(move |spec| spec.row(index as u32))
        });
        self.register(name, buttons)
    }

    /// Render a keyboard into rows ordered by ascending row index.
    ///
    /// Buttons sharing a row keep their registration order. An unknown name
    /// renders as [`Keyboard::empty`]. Names are trimmed on lookup as they are
    /// on registration.
    pub fn render(&self, name: &str) -> Keyboard {
        let Some(buttons) = self.keyboards.get(name.trim()) else {
            return Keyboard::empty();
        };

        let mut rows: BTreeMap<u32, Vec<Button>> = BTreeMap::new();
        for button in buttons.iter() {
            rows.entry(button.row).or_default().push(button.clone());
        }

        Keyboard {
            one_time: false,
            rows: rows.into_values().collect(),
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.keyboards.contains_key(name.trim())
    }

    /// Remove a keyboard. Returns `true` if it was registered.
    pub fn remove(&self, name: &str) -> bool {
        self.keyboards.remove(name.trim()).is_some()
    }

    /// Registered keyboard names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.keyboards.iter().map(|e| e.key().clone()).collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.keyboards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keyboards.is_empty()
    }
}

fn validate_name(name: &str) -> Result<&str, EngineError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(EngineError::InvalidKeyboard {
            name: name.to_string(),
            reason: "name must not be blank".to_string(),
        });
    }
    Ok(trimmed)
}

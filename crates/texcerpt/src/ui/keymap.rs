//! Resolving configured key binding strings into crossterm key matches.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::infra::config::Keybindings;

/// A single key plus required modifiers, parsed from strings like `"j"`, `"space"`, `"ctrl+g"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyBinding {
    code: KeyCode,
    modifiers: KeyModifiers,
}

impl KeyBinding {
    pub fn parse(raw: &str) -> Option<Self> {
        let mut modifiers = KeyModifiers::NONE;
        let mut key = None;
        for part in raw.split('+').map(str::trim) {
            match part.to_ascii_lowercase().as_str() {
                "ctrl" | "control" => modifiers |= KeyModifiers::CONTROL,
                "alt" => modifiers |= KeyModifiers::ALT,
                "shift" => modifiers |= KeyModifiers::SHIFT,
                _ => key = Some(part),
            }
        }

        let code = match key?.to_ascii_lowercase().as_str() {
            "space" => KeyCode::Char(' '),
            "enter" | "return" => KeyCode::Enter,
            "tab" => KeyCode::Tab,
            "esc" | "escape" => KeyCode::Esc,
            "up" => KeyCode::Up,
            "down" => KeyCode::Down,
            "left" => KeyCode::Left,
            "right" => KeyCode::Right,
            _ => {
                let mut chars = key?.chars();
                let ch = chars.next()?;
                if chars.next().is_some() {
                    return None;
                }
                KeyCode::Char(ch)
            }
        };
        Some(Self { code, modifiers })
    }

    pub fn matches(&self, event: &KeyEvent) -> bool {
        // Terminals report shifted letters with SHIFT set; compare only the modifiers we care
        // about.
        let relevant = KeyModifiers::CONTROL | KeyModifiers::ALT;
        event.code == self.code && (event.modifiers & relevant) == (self.modifiers & relevant)
    }
}

/// Actions on the selection screen that are user-configurable.
#[derive(Debug, Clone)]
pub struct KeyMap {
    pub up: Option<KeyBinding>,
    pub down: Option<KeyBinding>,
    pub select: Option<KeyBinding>,
    pub generate: Option<KeyBinding>,
}

impl KeyMap {
    pub fn from_config(bindings: &Keybindings) -> Self {
        let parse = |name: &str, raw: &str| {
            let binding = KeyBinding::parse(raw);
            if binding.is_none() {
                tracing::warn!(action = name, binding = raw, "ignoring unparseable key binding");
            }
            binding
        };
        Self {
            up: parse("up", &bindings.up),
            down: parse("down", &bindings.down),
            select: parse("select", &bindings.select),
            generate: parse("generate", &bindings.generate),
        }
    }
}

/// Whether `event` triggers an optional binding.
pub fn triggers(binding: &Option<KeyBinding>, event: &KeyEvent) -> bool {
    binding.as_ref().is_some_and(|binding| binding.matches(event))
}

use ant_core::{ConfigurationError, ResponseLabel};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyBinding {
    /// Key text as the host reports it, e.g. `"z"`.
    pub key: String,
    /// What the participant is told to press.
    pub ui_label: String,
    pub data_label: ResponseLabel,
}

/// Maps pressed keys to response labels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyMap {
    pub name: String,
    pub bindings: Vec<KeyBinding>,
}

impl Default for KeyMap {
    fn default() -> Self {
        Self {
            name: "Responses".into(),
            bindings: vec![
                KeyBinding {
                    key: "z".into(),
                    ui_label: "z".into(),
                    data_label: ResponseLabel::Left,
                },
                KeyBinding {
                    key: "/".into(),
                    ui_label: "/".into(),
                    data_label: ResponseLabel::Right,
                },
            ],
        }
    }
}

impl KeyMap {
    pub fn label_for(&self, key: &str) -> Option<ResponseLabel> {
        self.bindings
            .iter()
            .find(|b| b.key.eq_ignore_ascii_case(key))
            .map(|b| b.data_label)
    }

    pub fn key_for(&self, label: ResponseLabel) -> Option<&str> {
        self.bindings
            .iter()
            .find(|b| b.data_label == label)
            .map(|b| b.key.as_str())
    }

    pub fn validate(&self) -> Result<(), ConfigurationError> {
        for label in [ResponseLabel::Left, ResponseLabel::Right] {
            if self.key_for(label).is_none() {
                return Err(ConfigurationError::invalid(
                    "keymap",
                    format!("no key bound to `{}`", label.as_str()),
                ));
            }
        }
        for (i, binding) in self.bindings.iter().enumerate() {
            if binding.data_label == ResponseLabel::NA {
                return Err(ConfigurationError::invalid(
                    "keymap",
                    format!("key {:?} is bound to NA", binding.key),
                ));
            }
            if self.bindings[..i]
                .iter()
                .any(|b| b.key.eq_ignore_ascii_case(&binding.key))
            {
                return Err(ConfigurationError::invalid(
                    "keymap",
                    format!("key {:?} is bound twice", binding.key),
                ));
            }
        }
        Ok(())
    }
}

//! Input state management
//!
//! Tracks raw key/button names per frame and maps them onto logical actions.
//! Key names are plain strings (`"Space"`, `"MouseLeft"`, ...) so any
//! windowing or terminal frontend can feed them in.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

pub const ACTION_ASCEND: &str = "ascend";
pub const ACTION_PAUSE: &str = "pause";
pub const ACTION_RESTART: &str = "restart";

/// Action bindings, loadable from the `[input]` table of the game config
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputConfig {
    #[serde(default = "default_bindings")]
    pub bindings: HashMap<String, Vec<String>>,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            bindings: default_bindings(),
        }
    }
}

fn default_bindings() -> HashMap<String, Vec<String>> {
    let mut map = HashMap::new();
    map.insert(
        ACTION_ASCEND.to_string(),
        vec![
            "Space".to_string(),
            "ArrowUp".to_string(),
            "MouseLeft".to_string(),
            "TouchStart".to_string(),
        ],
    );
    map.insert(
        ACTION_PAUSE.to_string(),
        vec!["Escape".to_string(), "KeyP".to_string()],
    );
    map.insert(ACTION_RESTART.to_string(), vec!["KeyR".to_string()]);
    map
}

/// Tracks key state per frame
pub struct InputState {
    /// Keys currently held down
    keys_down: HashSet<String>,
    /// Keys pressed this frame
    keys_just_pressed: HashSet<String>,
    /// Keys released this frame
    keys_just_released: HashSet<String>,
    /// Action name -> bound keys
    action_map: HashMap<String, Vec<String>>,
}

impl Default for InputState {
    fn default() -> Self {
        Self::new()
    }
}

impl InputState {
    pub fn new() -> Self {
        Self::from_config(&InputConfig::default())
    }

    pub fn from_config(config: &InputConfig) -> Self {
        Self {
            keys_down: HashSet::new(),
            keys_just_pressed: HashSet::new(),
            keys_just_released: HashSet::new(),
            action_map: config.bindings.clone(),
        }
    }

    /// Bind an action to one or more keys, replacing earlier bindings
    pub fn bind_action(&mut self, action: impl Into<String>, keys: Vec<String>) {
        self.action_map.insert(action.into(), keys);
    }

    /// Process a key press. Auto-repeat presses of a held key are ignored.
    pub fn process_key_down(&mut self, key: &str) {
        if !self.keys_down.contains(key) {
            self.keys_just_pressed.insert(key.to_string());
        }
        self.keys_down.insert(key.to_string());
    }

    /// Process a key release
    pub fn process_key_up(&mut self, key: &str) {
        self.keys_down.remove(key);
        self.keys_just_released.insert(key.to_string());
    }

    /// Call at end of frame to clear per-frame state
    pub fn end_frame(&mut self) {
        self.keys_just_pressed.clear();
        self.keys_just_released.clear();
    }

    pub fn is_key_down(&self, key: &str) -> bool {
        self.keys_down.contains(key)
    }

    /// Is an action currently held?
    pub fn is_action_pressed(&self, action: &str) -> bool {
        self.action_map
            .get(action)
            .map(|keys| keys.iter().any(|k| self.keys_down.contains(k)))
            .unwrap_or(false)
    }

    /// Was an action just pressed this frame?
    pub fn is_action_just_pressed(&self, action: &str) -> bool {
        self.action_map
            .get(action)
            .map(|keys| keys.iter().any(|k| self.keys_just_pressed.contains(k)))
            .unwrap_or(false)
    }

    /// Was an action just released this frame?
    pub fn is_action_just_released(&self, action: &str) -> bool {
        self.action_map
            .get(action)
            .map(|keys| keys.iter().any(|k| self.keys_just_released.contains(k)))
            .unwrap_or(false)
    }

    /// Get all registered action names
    pub fn action_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.action_map.keys().cloned().collect();
        names.sort();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ascend_is_edge_triggered() {
        let mut input = InputState::new();

        input.process_key_down("Space");
        assert!(input.is_action_just_pressed(ACTION_ASCEND));

        input.end_frame();
        input.process_key_down("Space"); // key repeat while held
        assert!(input.is_action_pressed(ACTION_ASCEND));
        assert!(!input.is_action_just_pressed(ACTION_ASCEND));

        input.process_key_up("Space");
        assert!(input.is_action_just_released(ACTION_ASCEND));
        input.end_frame();
        input.process_key_down("Space");
        assert!(input.is_action_just_pressed(ACTION_ASCEND));
    }

    #[test]
    fn any_bound_key_triggers() {
        let mut input = InputState::new();
        input.process_key_down("MouseLeft");
        assert!(input.is_action_just_pressed(ACTION_ASCEND));
        assert!(!input.is_action_just_pressed(ACTION_PAUSE));
    }

    #[test]
    fn custom_binding() {
        let mut input = InputState::new();
        input.bind_action(ACTION_ASCEND, vec!["KeyW".to_string()]);
        input.process_key_down("Space");
        assert!(!input.is_action_pressed(ACTION_ASCEND));
        input.process_key_down("KeyW");
        assert!(input.is_action_pressed(ACTION_ASCEND));
    }

    #[test]
    fn config_from_toml() {
        let config: InputConfig = toml::from_str(
            r#"
            [bindings]
            ascend = ["KeyJ"]
            "#,
        )
        .unwrap();
        let mut input = InputState::from_config(&config);
        input.process_key_down("KeyJ");
        assert!(input.is_action_just_pressed(ACTION_ASCEND));
        assert_eq!(input.action_names(), vec!["ascend".to_string()]);
    }
}

//! Keyboard navigation model
//!
//! The tabs pattern moves focus (and, with automatic activation, selection)
//! along the tab list:
//! ```text
//! Next      ArrowRight / ArrowDown
//! Previous  ArrowLeft  / ArrowUp
//! First     Home
//! Last      End
//! ```
//! What happens at either end of the list is pinned by [`WrapPolicy`].

use serde::{Deserialize, Serialize};

use crate::error::WidgetError;

/// Physical key sent to the page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Key {
    ArrowLeft,
    ArrowRight,
    ArrowUp,
    ArrowDown,
    Home,
    End,
    Tab,
    Enter,
    Space,
}

impl Key {
    pub fn as_str(&self) -> &'static str {
        match self {
            Key::ArrowLeft => "ArrowLeft",
            Key::ArrowRight => "ArrowRight",
            Key::ArrowUp => "ArrowUp",
            Key::ArrowDown => "ArrowDown",
            Key::Home => "Home",
            Key::End => "End",
            Key::Tab => "Tab",
            Key::Enter => "Enter",
            Key::Space => " ",
        }
    }
}

impl std::fmt::Display for Key {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Key::Space => write!(f, "Space"),
            other => write!(f, "{}", other.as_str()),
        }
    }
}

impl std::str::FromStr for Key {
    type Err = WidgetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ArrowLeft" => Ok(Key::ArrowLeft),
            "ArrowRight" => Ok(Key::ArrowRight),
            "ArrowUp" => Ok(Key::ArrowUp),
            "ArrowDown" => Ok(Key::ArrowDown),
            "Home" => Ok(Key::Home),
            "End" => Ok(Key::End),
            "Tab" => Ok(Key::Tab),
            "Enter" => Ok(Key::Enter),
            " " | "Space" => Ok(Key::Space),
            _ => Err(WidgetError::UnknownKey(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    #[default]
    Horizontal,
    Vertical,
}

impl Orientation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Orientation::Horizontal => "horizontal",
            Orientation::Vertical => "vertical",
        }
    }
}

impl std::fmt::Display for Orientation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Orientation {
    type Err = WidgetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "horizontal" => Ok(Orientation::Horizontal),
            "vertical" => Ok(Orientation::Vertical),
            _ => Err(WidgetError::UnknownOrientation(s.to_string())),
        }
    }
}

/// Behaviour of Next on the last tab and Previous on the first.
///
/// No default: widgets legitimately do either.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WrapPolicy {
    /// Continue at the opposite end
    Wrap,
    /// Stay put
    Clamp,
}

impl WrapPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            WrapPolicy::Wrap => "wrap",
            WrapPolicy::Clamp => "clamp",
        }
    }
}

impl std::fmt::Display for WrapPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for WrapPolicy {
    type Err = WidgetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "wrap" => Ok(WrapPolicy::Wrap),
            "clamp" | "no-wrap" | "nowrap" => Ok(WrapPolicy::Clamp),
            _ => Err(WidgetError::UnknownWrapPolicy(s.to_string())),
        }
    }
}

/// Logical navigation command within a tab list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NavKey {
    Next,
    Previous,
    First,
    Last,
}

impl NavKey {
    /// Key that produces this command for the given orientation
    pub fn key(&self, orientation: Orientation) -> Key {
        match (self, orientation) {
            (NavKey::Next, Orientation::Horizontal) => Key::ArrowRight,
            (NavKey::Next, Orientation::Vertical) => Key::ArrowDown,
            (NavKey::Previous, Orientation::Horizontal) => Key::ArrowLeft,
            (NavKey::Previous, Orientation::Vertical) => Key::ArrowUp,
            (NavKey::First, _) => Key::Home,
            (NavKey::Last, _) => Key::End,
        }
    }

    /// Inverse of [`NavKey::key`]; keys with no meaning in the tab list
    /// (or the cross-axis arrows) map to `None`.
    pub fn from_key(key: Key, orientation: Orientation) -> Option<Self> {
        [NavKey::Next, NavKey::Previous, NavKey::First, NavKey::Last]
            .into_iter()
            .find(|nav| nav.key(orientation) == key)
    }

    /// Index focus should land on when this command is issued on tab
    /// `from` of a list of `len` tabs.
    ///
    /// `len` must be non-zero and `from` in range.
    pub fn target(&self, from: usize, len: usize, policy: WrapPolicy) -> usize {
        debug_assert!(len > 0 && from < len);
        let last = len - 1;
        match (self, policy) {
            (NavKey::First, _) => 0,
            (NavKey::Last, _) => last,
            (NavKey::Next, WrapPolicy::Wrap) => (from + 1) % len,
            (NavKey::Next, WrapPolicy::Clamp) => (from + 1).min(last),
            (NavKey::Previous, WrapPolicy::Wrap) => (from + last) % len,
            (NavKey::Previous, WrapPolicy::Clamp) => from.saturating_sub(1),
        }
    }

    /// Whether the command crosses an end of the list from `from`
    pub fn is_boundary(&self, from: usize, len: usize) -> bool {
        match self {
            NavKey::Next => from + 1 == len,
            NavKey::Previous => from == 0,
            NavKey::First | NavKey::Last => false,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            NavKey::Next => "move-next",
            NavKey::Previous => "move-previous",
            NavKey::First => "move-to-start",
            NavKey::Last => "move-to-end",
        }
    }
}

impl std::fmt::Display for NavKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_targets() {
        let p = WrapPolicy::Wrap;
        assert_eq!(NavKey::Next.target(0, 4, p), 1);
        assert_eq!(NavKey::Next.target(3, 4, p), 0);
        assert_eq!(NavKey::Previous.target(0, 4, p), 3);
        assert_eq!(NavKey::Previous.target(2, 4, p), 1);
    }

    #[test]
    fn test_clamp_targets() {
        let p = WrapPolicy::Clamp;
        assert_eq!(NavKey::Next.target(3, 4, p), 3);
        assert_eq!(NavKey::Previous.target(0, 4, p), 0);
        assert_eq!(NavKey::Next.target(1, 4, p), 2);
    }

    #[test]
    fn test_first_and_last_ignore_policy() {
        for policy in [WrapPolicy::Wrap, WrapPolicy::Clamp] {
            for from in 0..4 {
                assert_eq!(NavKey::First.target(from, 4, policy), 0);
                assert_eq!(NavKey::Last.target(from, 4, policy), 3);
            }
        }
    }

    #[test]
    fn test_single_tab_list() {
        assert_eq!(NavKey::Next.target(0, 1, WrapPolicy::Wrap), 0);
        assert_eq!(NavKey::Previous.target(0, 1, WrapPolicy::Clamp), 0);
    }

    #[test]
    fn test_orientation_keys() {
        assert_eq!(NavKey::Next.key(Orientation::Horizontal), Key::ArrowRight);
        assert_eq!(NavKey::Next.key(Orientation::Vertical), Key::ArrowDown);
        assert_eq!(
            NavKey::from_key(Key::ArrowUp, Orientation::Vertical),
            Some(NavKey::Previous)
        );
        // Cross-axis arrows do nothing
        assert_eq!(NavKey::from_key(Key::ArrowUp, Orientation::Horizontal), None);
        assert_eq!(
            NavKey::from_key(Key::End, Orientation::Horizontal),
            Some(NavKey::Last)
        );
    }

    #[test]
    fn test_boundaries() {
        assert!(NavKey::Next.is_boundary(3, 4));
        assert!(!NavKey::Next.is_boundary(2, 4));
        assert!(NavKey::Previous.is_boundary(0, 4));
        assert!(!NavKey::Last.is_boundary(3, 4));
    }

    #[test]
    fn test_parse() {
        assert_eq!("clamp".parse::<WrapPolicy>().unwrap(), WrapPolicy::Clamp);
        assert_eq!("No-Wrap".parse::<WrapPolicy>().unwrap(), WrapPolicy::Clamp);
        assert!("sometimes".parse::<WrapPolicy>().is_err());
        assert_eq!("End".parse::<Key>().unwrap(), Key::End);
        assert_eq!(
            "F5".parse::<Key>(),
            Err(WidgetError::UnknownKey("F5".to_string()))
        );
    }
}

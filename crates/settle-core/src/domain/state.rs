//! State - セルの状態
//!
//! # 状態遷移
//! - Pending -> Fulfilled(value)
//! - Pending -> Rejected(error)
//!
//! 終端状態からの遷移はない。値とエラーは tagged union に保持するので、
//! `()` や `0` のような「空っぽ」の値も普通の成功値として扱える。

use serde::{Deserialize, Serialize};

/// Outcome storage of a settlement cell.
///
/// Value and error live inside the variant that owns them; `Pending` carries
/// nothing, so an empty payload such as `()` or `0` is still `Fulfilled`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettleState<T, E> {
    /// Not yet settled.
    Pending,

    /// Settled successfully with a value.
    Fulfilled(T),

    /// Settled with a failure payload.
    Rejected(E),
}

impl<T, E> SettleState<T, E> {
    pub fn kind(&self) -> StateKind {
        match self {
            Self::Pending => StateKind::Pending,
            Self::Fulfilled(_) => StateKind::Fulfilled,
            Self::Rejected(_) => StateKind::Rejected,
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }

    /// Is this a terminal state (no further transitions)?
    pub fn is_settled(&self) -> bool {
        !self.is_pending()
    }

    pub fn is_fulfilled(&self) -> bool {
        matches!(self, Self::Fulfilled(_))
    }

    pub fn is_rejected(&self) -> bool {
        matches!(self, Self::Rejected(_))
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            Self::Fulfilled(value) => Some(value),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&E> {
        match self {
            Self::Rejected(error) => Some(error),
            _ => None,
        }
    }
}

impl<T, E> Default for SettleState<T, E> {
    fn default() -> Self {
        Self::Pending
    }
}

impl<T, E> std::fmt::Display for SettleState<T, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.kind().fmt(f)
    }
}

/// Payload-free view of [`SettleState`], used in status views and logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StateKind {
    Pending,
    Fulfilled,
    Rejected,
}

impl StateKind {
    pub fn is_terminal(self) -> bool {
        !matches!(self, StateKind::Pending)
    }
}

impl std::fmt::Display for StateKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StateKind::Pending => f.write_str("pending"),
            StateKind::Fulfilled => f.write_str("fulfilled"),
            StateKind::Rejected => f.write_str("rejected"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn default_is_pending() {
        let state: SettleState<u32, String> = SettleState::default();
        assert!(state.is_pending());
        assert!(!state.is_settled());
        assert_eq!(state.value(), None);
        assert_eq!(state.error(), None);
    }

    #[test]
    fn empty_payload_is_still_fulfilled() {
        let state: SettleState<(), String> = SettleState::Fulfilled(());
        assert!(state.is_settled());
        assert_eq!(state.value(), Some(&()));
    }

    #[rstest]
    #[case::pending(SettleState::Pending, StateKind::Pending, "pending")]
    #[case::fulfilled(SettleState::Fulfilled(0), StateKind::Fulfilled, "fulfilled")]
    #[case::rejected(SettleState::Rejected("x"), StateKind::Rejected, "rejected")]
    fn kind_and_display_agree(
        #[case] state: SettleState<i32, &'static str>,
        #[case] kind: StateKind,
        #[case] shown: &str,
    ) {
        assert_eq!(state.kind(), kind);
        assert_eq!(state.to_string(), shown);
        assert_eq!(kind.is_terminal(), state.is_settled());
    }

    #[test]
    fn state_kind_serializes_as_snake_case() {
        let s = serde_json::to_string(&StateKind::Fulfilled).unwrap();
        assert_eq!(s, "\"fulfilled\"");
    }
}

use serde::{Deserialize, Serialize};

/// The three phases of a pomodoro cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TimerMode {
    Focus,
    ShortBreak,
    LongBreak,
}

impl TimerMode {
    pub fn label(&self) -> &'static str {
        match self {
            TimerMode::Focus => "Focus Time",
            TimerMode::ShortBreak => "Short Break",
            TimerMode::LongBreak => "Long Break",
        }
    }

    pub fn is_break(&self) -> bool {
        !matches!(self, TimerMode::Focus)
    }
}

impl Default for TimerMode {
    fn default() -> Self {
        TimerMode::Focus
    }
}

/// Result of leaving a mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub next: TimerMode,
    /// Focus intervals finished so far, including the one just left.
    pub focus_intervals: u32,
}

/// Where the cycle goes after `mode` ends.
///
/// Leaving `Focus` bumps the interval counter and picks `LongBreak` on every
/// `intervals_before_long_break`-th interval. Breaks always return to `Focus`.
/// A cadence of zero is treated as one.
pub fn transition(mode: TimerMode, focus_intervals: u32, intervals_before_long_break: u32) -> Transition {
    match mode {
        TimerMode::Focus => {
            let focus_intervals = focus_intervals.saturating_add(1);
            let next = if focus_intervals % intervals_before_long_break.max(1) == 0 {
                TimerMode::LongBreak
            } else {
                TimerMode::ShortBreak
            };
            Transition { next, focus_intervals }
        }
        TimerMode::ShortBreak | TimerMode::LongBreak => Transition {
            next: TimerMode::Focus,
            focus_intervals,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fourth_focus_goes_to_long_break() {
        let mut count = 0;
        let mut seen = Vec::new();
        for _ in 0..4 {
            let t = transition(TimerMode::Focus, count, 4);
            count = t.focus_intervals;
            seen.push(t.next);
        }
        assert_eq!(
            seen,
            vec![
                TimerMode::ShortBreak,
                TimerMode::ShortBreak,
                TimerMode::ShortBreak,
                TimerMode::LongBreak
            ]
        );
    }

    #[test]
    fn breaks_return_to_focus_without_counting() {
        let t = transition(TimerMode::LongBreak, 4, 4);
        assert_eq!(t.next, TimerMode::Focus);
        assert_eq!(t.focus_intervals, 4);
        let t = transition(TimerMode::ShortBreak, 1, 4);
        assert_eq!(t, Transition { next: TimerMode::Focus, focus_intervals: 1 });
    }

    #[test]
    fn cadence_of_one_is_always_long() {
        assert_eq!(transition(TimerMode::Focus, 0, 1).next, TimerMode::LongBreak);
        assert_eq!(transition(TimerMode::Focus, 7, 0).next, TimerMode::LongBreak);
    }

    #[test]
    fn serializes_camel_case() {
        assert_eq!(serde_json::to_string(&TimerMode::ShortBreak).unwrap(), "\"shortBreak\"");
        assert_eq!(TimerMode::LongBreak.label(), "Long Break");
    }
}

//! Scripted input
//!
//! One event per line: `<tick> <switches> <buttons>`. From that tick on the
//! switch and button registers read the given levels, until the next event.
//! Numbers are decimal or `0x`-prefixed hex; `#` starts a comment.
//!
//! ```text
//! # both paddles up, then press reset at tick 100
//! 1    0x201 0
//! 100  0x201 1
//! 101  0x201 0
//! ```

use thiserror::Error;
use vgapong::hw::RawInput;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ScriptError {
    #[error("line {line}: {message}")]
    Syntax { line: usize, message: String },

    #[error("line {line}: tick {tick} does not come after tick {previous}")]
    Unordered { line: usize, tick: u32, previous: u32 },
}

impl ScriptError {
    fn syntax(line: usize, message: impl Into<String>) -> Self {
        Self::Syntax {
            line,
            message: message.into(),
        }
    }
}

/// Input levels taking effect at `tick`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScriptEvent {
    pub tick: u32,
    pub input: RawInput,
}

/// Ordered list of input changes
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputScript {
    events: Vec<ScriptEvent>,
}

impl InputScript {
    pub fn parse(source: &str) -> Result<Self, ScriptError> {
        let mut events: Vec<ScriptEvent> = Vec::new();

        for (index, raw) in source.lines().enumerate() {
            let line = index + 1;
            let text = raw.split('#').next().unwrap_or_default().trim();
            if text.is_empty() {
                continue;
            }

            let fields: Vec<&str> = text.split_whitespace().collect();
            let [tick, switches, buttons] = fields[..] else {
                return Err(ScriptError::syntax(
                    line,
                    format!("expected `<tick> <switches> <buttons>`, found {} fields", fields.len()),
                ));
            };

            let tick = parse_number(tick).map_err(|message| ScriptError::syntax(line, message))?;
            let switches = parse_number(switches).map_err(|message| ScriptError::syntax(line, message))?;
            let buttons = parse_number(buttons).map_err(|message| ScriptError::syntax(line, message))?;

            if let Some(previous) = events.last() {
                if tick <= previous.tick {
                    return Err(ScriptError::Unordered {
                        line,
                        tick,
                        previous: previous.tick,
                    });
                }
            }

            events.push(ScriptEvent {
                tick,
                input: RawInput::new(switches, buttons),
            });
        }

        Ok(InputScript { events })
    }

    pub fn events(&self) -> &[ScriptEvent] {
        &self.events
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Levels in force during `tick`, if any event has taken effect yet
    pub fn level_at(&self, tick: u32) -> Option<RawInput> {
        let count = self.events.partition_point(|event| event.tick <= tick);
        count.checked_sub(1).map(|index| self.events[index].input)
    }
}

fn parse_number(text: &str) -> Result<u32, String> {
    let parsed = match text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        Some(hex) => u32::from_str_radix(hex, 16),
        None => text.parse(),
    };
    parsed.map_err(|err| format!("invalid number `{text}`: {err}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_events_and_comments() {
        let script = InputScript::parse(
            "# header\n\
             1 0x201 0\n\
             \n\
             100 513 1   # reset\n\
             101 0X201 0\n",
        )
        .unwrap();
        assert_eq!(
            script.events(),
            &[
                ScriptEvent { tick: 1, input: RawInput::new(0x201, 0) },
                ScriptEvent { tick: 100, input: RawInput::new(0x201, 1) },
                ScriptEvent { tick: 101, input: RawInput::new(0x201, 0) },
            ]
        );
    }

    #[test]
    fn test_level_holds_until_next_event() {
        let script = InputScript::parse("5 1 0\n10 2 1\n").unwrap();
        assert_eq!(script.level_at(4), None);
        assert_eq!(script.level_at(5), Some(RawInput::new(1, 0)));
        assert_eq!(script.level_at(9), Some(RawInput::new(1, 0)));
        assert_eq!(script.level_at(10), Some(RawInput::new(2, 1)));
        assert_eq!(script.level_at(u32::MAX), Some(RawInput::new(2, 1)));
    }

    #[test]
    fn test_syntax_errors_carry_line() {
        let err = InputScript::parse("1 0 0\n2 0\n").unwrap_err();
        assert_eq!(
            err.to_string(),
            "line 2: expected `<tick> <switches> <buttons>`, found 2 fields"
        );

        let err = InputScript::parse("1 0xZZ 0\n").unwrap_err();
        assert!(matches!(err, ScriptError::Syntax { line: 1, .. }));
    }

    #[test]
    fn test_ticks_must_increase() {
        let err = InputScript::parse("10 0 0\n# gap\n10 1 0\n").unwrap_err();
        assert_eq!(err, ScriptError::Unordered { line: 3, tick: 10, previous: 10 });
    }

    #[test]
    fn test_empty_script() {
        let script = InputScript::parse("  \n# nothing\n").unwrap();
        assert!(script.is_empty());
        assert_eq!(script.level_at(1), None);
    }
}

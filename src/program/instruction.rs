use thiserror::Error;

use crate::core::state::Cycle;

/// Closed instruction set. `I` computes for one step, `ES n` requests n
/// cycles of simulated I/O, `F` terminates the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstructionKind {
    Compute,
    IoRequest { wait: Cycle },
    Terminate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Instruction {
    pub ordinal: u32,
    pub kind: InstructionKind,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("blank instruction line")]
    Blank,
    #[error("malformed ordinal {0:?}")]
    BadOrdinal(String),
    #[error("instruction line has no kind field")]
    MissingKind,
    #[error("unknown instruction kind {0:?}")]
    UnknownKind(String),
    #[error("I/O instruction missing its duration")]
    MissingDuration,
    #[error("invalid I/O duration {0:?}, expected an integer >= 1")]
    BadDuration(String),
}

/// Decode one meaningful line of a process definition file:
/// `ordinal kind [param]`. Pure; decoding the same line twice yields the
/// same value or the same error.
pub fn decode(line: &str) -> Result<Instruction, ParseError> {
    let mut fields = line.split_whitespace();

    let ordinal_field = fields.next().ok_or(ParseError::Blank)?;
    let ordinal: u32 = ordinal_field
        .parse()
        .map_err(|_| ParseError::BadOrdinal(ordinal_field.to_string()))?;

    let kind_field = fields.next().ok_or(ParseError::MissingKind)?;
    let kind = match kind_field {
        "I" => InstructionKind::Compute,
        "ES" => {
            let wait_field = fields.next().ok_or(ParseError::MissingDuration)?;
            let wait: Cycle = wait_field
                .parse()
                .map_err(|_| ParseError::BadDuration(wait_field.to_string()))?;
            // A zero-cycle wait could never complete under the count-down
            // contract, so it is rejected at the source.
            if wait == 0 {
                return Err(ParseError::BadDuration(wait_field.to_string()));
            }
            InstructionKind::IoRequest { wait }
        }
        "F" => InstructionKind::Terminate,
        other => return Err(ParseError::UnknownKind(other.to_string())),
    };

    Ok(Instruction { ordinal, kind })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_the_three_kinds() {
        assert_eq!(
            decode("1 I").unwrap(),
            Instruction {
                ordinal: 1,
                kind: InstructionKind::Compute
            }
        );
        assert_eq!(
            decode("2 ES 3").unwrap(),
            Instruction {
                ordinal: 2,
                kind: InstructionKind::IoRequest { wait: 3 }
            }
        );
        assert_eq!(
            decode("3 F").unwrap(),
            Instruction {
                ordinal: 3,
                kind: InstructionKind::Terminate
            }
        );
    }

    #[test]
    fn tolerates_extra_whitespace() {
        assert_eq!(decode("  4   ES   10  "), decode("4 ES 10"));
    }

    #[test]
    fn rejects_malformed_lines() {
        assert_eq!(decode("x I"), Err(ParseError::BadOrdinal("x".into())));
        assert_eq!(decode("1"), Err(ParseError::MissingKind));
        assert_eq!(decode("1 XYZ"), Err(ParseError::UnknownKind("XYZ".into())));
        assert_eq!(decode("1 ES"), Err(ParseError::MissingDuration));
        assert_eq!(decode("1 ES beep"), Err(ParseError::BadDuration("beep".into())));
        assert_eq!(decode("1 ES 0"), Err(ParseError::BadDuration("0".into())));
        assert_eq!(decode("1 ES -2"), Err(ParseError::BadDuration("-2".into())));
    }

    #[test]
    fn decoding_is_idempotent() {
        for line in ["1 I", "2 ES 7", "3 F", "nope", "9 ES zz"] {
            assert_eq!(decode(line), decode(line));
        }
    }
}

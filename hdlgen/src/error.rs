use crate::dialect::Dialect;
use crate::netlist::Attribute;

/// A recoverable failure to generate one component instance.
///
/// These are reported as diagnostics at the instance boundary; generation of the remaining
/// instances carries on.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum GenerateError {
    #[error("missing attribute `{0}`")]
    MissingAttribute(Attribute),
    #[error("attribute `{attribute}` has invalid value {value}; {reason}")]
    InvalidAttribute {
        attribute: Attribute,
        value: i64,
        reason: &'static str,
    },
    #[error("value {value} does not fit in {width} bit(s)")]
    ValueOutOfRange { value: i64, width: u32 },
    #[error("attribute `{attribute}` is {declared} but end {end} is {connected} bit(s) wide")]
    WidthMismatch {
        attribute: Attribute,
        end: usize,
        declared: u32,
        connected: u32,
    },
    #[error("input {end} is not connected")]
    FloatingInput { end: usize },
    #[error("missing end {end}")]
    MissingEnd { end: usize },
    #[error("clock is not the source of any clock tree")]
    MissingClockTree,
    #[error("{generator} cannot be generated in {dialect}")]
    Unsupported {
        generator: &'static str,
        dialect: Dialect,
    },
}

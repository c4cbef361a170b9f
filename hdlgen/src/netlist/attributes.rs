use std::collections::BTreeMap;
use std::fmt;

/// Attribute keys understood by the generators.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Attribute {
    /// Bit width of single-width components (constants, ground, power).
    Width,
    /// Input width of a bit extender, checked against its input end when set.
    InputWidth,
    /// Output width of a bit extender, checked against its output end when set.
    OutputWidth,
    /// Value driven by a constant.
    Value,
    /// Clock ticks spent high per period.
    HighTicks,
    /// Clock ticks spent low per period.
    LowTicks,
    /// Clock phase offset in ticks.
    Phase,
    /// How a bit extender fills its upper bits.
    Extension,
    /// User-assigned instance label.
    Label,
}

impl Attribute {
    pub fn name(self) -> &'static str {
        match self {
            Attribute::Width => "width",
            Attribute::InputWidth => "in_width",
            Attribute::OutputWidth => "out_width",
            Attribute::Value => "value",
            Attribute::HighTicks => "highDuration",
            Attribute::LowTicks => "lowDuration",
            Attribute::Phase => "phaseOffset",
            Attribute::Extension => "type",
            Attribute::Label => "label",
        }
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Fill mode of a bit extender's upper bits.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ExtensionMode {
    Zero,
    One,
    /// Replicate the input's most significant bit.
    Sign,
    /// Replicate a separate single-bit input.
    Input,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum AttributeValue {
    Int(i64),
    Extension(ExtensionMode),
    Text(String),
}

impl From<i64> for AttributeValue {
    fn from(value: i64) -> Self {
        AttributeValue::Int(value)
    }
}

impl From<u32> for AttributeValue {
    fn from(value: u32) -> Self {
        AttributeValue::Int(value.into())
    }
}

impl From<ExtensionMode> for AttributeValue {
    fn from(value: ExtensionMode) -> Self {
        AttributeValue::Extension(value)
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        AttributeValue::Text(value.to_string())
    }
}

/// The attributes of one component instance.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct AttributeSet {
    values: BTreeMap<Attribute, AttributeValue>,
}

impl AttributeSet {
    pub fn new() -> AttributeSet {
        AttributeSet::default()
    }

    pub fn with(mut self, attribute: Attribute, value: impl Into<AttributeValue>) -> AttributeSet {
        self.set(attribute, value);
        self
    }

    pub fn set(&mut self, attribute: Attribute, value: impl Into<AttributeValue>) {
        self.values.insert(attribute, value.into());
    }

    pub fn get(&self, attribute: Attribute) -> Option<&AttributeValue> {
        self.values.get(&attribute)
    }

    pub fn int(&self, attribute: Attribute) -> Option<i64> {
        match self.get(attribute) {
            Some(AttributeValue::Int(value)) => Some(*value),
            _ => None,
        }
    }

    /// Integer attribute interpreted as a bit width; absent, zero and negative values read as `None`.
    pub fn width(&self, attribute: Attribute) -> Option<u32> {
        self.int(attribute)
            .filter(|&width| width > 0 && width <= i64::from(u32::max_value()))
            .map(|width| width as u32)
    }

    pub fn extension(&self) -> Option<ExtensionMode> {
        match self.get(Attribute::Extension) {
            Some(AttributeValue::Extension(mode)) => Some(*mode),
            _ => None,
        }
    }

    /// The instance label, if set and not blank.
    pub fn label(&self) -> Option<&str> {
        match self.get(Attribute::Label) {
            Some(AttributeValue::Text(label)) if !label.trim().is_empty() => Some(label.trim()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typed_lookups() {
        let attrs = AttributeSet::new()
            .with(Attribute::Width, 8u32)
            .with(Attribute::Value, -1i64)
            .with(Attribute::Extension, ExtensionMode::Sign)
            .with(Attribute::Label, "  ");

        assert_eq!(attrs.width(Attribute::Width), Some(8));
        assert_eq!(attrs.width(Attribute::Value), None);
        assert_eq!(attrs.int(Attribute::Value), Some(-1));
        assert_eq!(attrs.int(Attribute::Extension), None);
        assert_eq!(attrs.extension(), Some(ExtensionMode::Sign));
        assert_eq!(attrs.label(), None);
        assert_eq!(attrs.with(Attribute::Label, " c1 ").label(), Some("c1"));
    }
}

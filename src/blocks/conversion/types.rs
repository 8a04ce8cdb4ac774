/// `cc_type` of a CC block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ConversionType {
    Identity,
    Linear,
    Rational,
    /// Text formula
    Algebraic,
    TableInterpolated,
    Table,
    RangeTable,
    ValueToText,
    RangeToText,
    TextToValue,
    TextToText,
    BitfieldText,
    Unknown(u8),
}

/// Known types, indexed by their code.
const KNOWN: [ConversionType; 12] = [
    ConversionType::Identity,
    ConversionType::Linear,
    ConversionType::Rational,
    ConversionType::Algebraic,
    ConversionType::TableInterpolated,
    ConversionType::Table,
    ConversionType::RangeTable,
    ConversionType::ValueToText,
    ConversionType::RangeToText,
    ConversionType::TextToValue,
    ConversionType::TextToText,
    ConversionType::BitfieldText,
];

impl ConversionType {
    pub fn from_u8(code: u8) -> Self {
        KNOWN
            .get(usize::from(code))
            .copied()
            .unwrap_or(ConversionType::Unknown(code))
    }

    pub fn to_u8(self) -> u8 {
        match self {
            ConversionType::Unknown(code) => code,
            known => KNOWN
                .iter()
                .position(|&k| k == known)
                .map_or(u8::MAX, |code| code as u8),
        }
    }

    /// Short name for log messages.
    pub fn name(self) -> &'static str {
        match self {
            ConversionType::Identity => "identity",
            ConversionType::Linear => "linear",
            ConversionType::Rational => "rational",
            ConversionType::Algebraic => "algebraic",
            ConversionType::TableInterpolated => "interpolated table",
            ConversionType::Table => "table",
            ConversionType::RangeTable => "range table",
            ConversionType::ValueToText => "value to text",
            ConversionType::RangeToText => "range to text",
            ConversionType::TextToValue => "text to value",
            ConversionType::TextToText => "text to text",
            ConversionType::BitfieldText => "bitfield text",
            ConversionType::Unknown(_) => "unknown",
        }
    }
}

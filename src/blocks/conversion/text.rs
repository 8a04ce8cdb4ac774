use crate::types::DecodedValue;

/// Lookup table of a value-to-text conversion (`cc_type` 7).
///
/// `texts[i]` belongs to `keys[i]`; `default` is used when no key matches.
/// A key whose reference is not a text block has no entry.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ValueToText {
    pub keys: Vec<f64>,
    pub texts: Vec<Option<String>>,
    pub default: Option<String>,
}

impl ValueToText {
    /// Look up the text for `value`.
    ///
    /// Values without a match and without a default text are returned as-is.
    pub fn apply(&self, value: &DecodedValue) -> DecodedValue {
        let Some(raw) = value.as_f64() else {
            return value.clone();
        };
        let hit = self
            .keys
            .iter()
            .position(|&k| k == raw)
            .and_then(|idx| self.texts.get(idx).cloned().flatten());
        match hit.or_else(|| self.default.clone()) {
            Some(text) => DecodedValue::Text(text),
            None => value.clone(),
        }
    }
}

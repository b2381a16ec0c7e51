//! Converters between the UI-facing and the model-facing representation.

use std::fmt::Display;
use std::marker::PhantomData;
use std::str::FromStr;

use crate::error::ConversionError;

/// Result of a forward conversion.
pub type ConversionResult<T> = Result<T, ConversionError>;

/// Bidirectional mapping `S ⇄ T`.
///
/// `S` is the outer (UI) type and `T` the inner (model) type. The forward
/// direction may fail; the backward direction is total.
pub trait Converter<S, T> {
    fn convert(&self, value: &S) -> ConversionResult<T>;
    fn convert_back(&self, value: &T) -> S;
}

// ---------------------------------------------------------------------------
// FloatConverter
// ---------------------------------------------------------------------------

/// Text ⇄ `f64`. Blank text and `NaN` are rejected.
#[derive(Debug, Clone, Copy, Default)]
pub struct FloatConverter;

impl FloatConverter {
    pub const MESSAGE: &'static str = "Not a number.";
}

impl Converter<String, f64> for FloatConverter {
    fn convert(&self, value: &String) -> ConversionResult<f64> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ConversionError::new(Self::MESSAGE));
        }
        match trimmed.parse::<f64>() {
            Ok(n) if !n.is_nan() => Ok(n),
            _ => Err(ConversionError::new(Self::MESSAGE)),
        }
    }

    fn convert_back(&self, value: &f64) -> String {
        value.to_string()
    }
}

// ---------------------------------------------------------------------------
// ParseConverter
// ---------------------------------------------------------------------------

/// Text ⇄ any `FromStr + Display` type, with a fixed failure message.
pub struct ParseConverter<N> {
    message: String,
    _marker: PhantomData<fn() -> N>,
}

impl<N> ParseConverter<N> {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            _marker: PhantomData,
        }
    }
}

impl<N: FromStr + Display> Converter<String, N> for ParseConverter<N> {
    fn convert(&self, value: &String) -> ConversionResult<N> {
        value
            .trim()
            .parse()
            .map_err(|_| ConversionError::new(self.message.clone()))
    }

    fn convert_back(&self, value: &N) -> String {
        value.to_string()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn float_accepts_numbers() {
        assert_eq!(FloatConverter.convert(&"42".to_owned()), Ok(42.0));
        assert_eq!(FloatConverter.convert(&" -1.5 ".to_owned()), Ok(-1.5));
    }

    #[test]
    fn float_rejects_garbage() {
        for bad in ["abc", "", "   ", "NaN"] {
            let err = FloatConverter.convert(&bad.to_owned()).unwrap_err();
            assert_eq!(err.message, FloatConverter::MESSAGE, "input {bad:?}");
        }
    }

    #[test]
    fn float_convert_back_is_compact() {
        assert_eq!(FloatConverter.convert_back(&42.0), "42");
        assert_eq!(FloatConverter.convert_back(&0.25), "0.25");
    }

    #[test]
    fn parse_converter_integers() {
        let conv = ParseConverter::<u8>::new("Not a byte.");
        assert_eq!(conv.convert(&"200".to_owned()), Ok(200));
        assert_eq!(
            conv.convert(&"300".to_owned()).unwrap_err().message,
            "Not a byte."
        );
        assert_eq!(conv.convert_back(&7), "7");
    }
}

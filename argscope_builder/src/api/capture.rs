use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

use crate::constant::IMPLICIT_TRUE;
use crate::context::ResolvedConfig;
use crate::model::{CharMode, Nargs};

/// Marker trait for capturable types that can formulate an option in the Cli.
pub trait CliOption {}

/// Marker trait for capturable types that can formulate an argument in the Cli.
pub trait CliArgument {}

/// Behaviour to capture an explicit generic type T, already converted from its input `&str`.
///
/// We use this at the bottom of the command line parser object graph so the compiler can maintain each field's type.
#[doc(hidden)]
pub trait GenericCapturable<'a, T> {
    /// Declare that a new occurrence of the parameter has been matched.
    fn begin(&mut self);

    /// Capture a value into the generic type T for this parameter.
    fn capture(&mut self, value: T);

    /// Declare that parsing has completed.
    fn finish(&mut self);

    /// Get the `Nargs` for this implementation (`None` for single value fields).
    fn nargs(&self) -> Option<Nargs>;

    /// Whether this field must receive a value when used as a positional argument.
    fn required(&self) -> bool;
}

/// The failure to capture a text value.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum InvalidCapture {
    /// The text does not parse as the target type.
    #[error("cannot convert '{token}' to {type_name}.")]
    InvalidConversion {
        /// The offending text.
        token: String,
        /// The target type.
        type_name: &'static str,
    },

    /// The value lies outside of the natural or configured bounds of its type.
    #[error("'{token}' is out of range (expected {range}).")]
    OutOfRange {
        /// The offending text.
        token: String,
        /// The accepted range, rendered as `[min, max]`.
        range: String,
    },

    /// The text is not one of the documented choices.
    #[error("'{token}' is not one of the choices: {choices}.")]
    InvalidChoice {
        /// The offending text.
        token: String,
        /// The accepted choices.
        choices: String,
    },

    /// A custom conversion function rejected the text.
    #[error("cannot convert '{token}': {message}.")]
    Custom {
        /// The offending text.
        token: String,
        /// The reason given by the conversion function.
        message: String,
    },
}

/// Behaviour to convert a text value into `Self`, under a scope's configuration.
///
/// Implemented for `bool`, `char`, every integer width, `f32`/`f64`, `String` and `PathBuf`.
/// User types may delegate to [`convert_from_str`].
///
/// ### Example
/// ```
/// # use argscope_builder as argscope;
/// use argscope::{convert_from_str, Convert, InvalidCapture, ResolvedConfig};
/// use std::str::FromStr;
///
/// #[derive(Debug, PartialEq)]
/// enum Color {
///     Red,
///     Blue,
/// }
///
/// impl FromStr for Color {
///     type Err = String;
///
///     fn from_str(value: &str) -> Result<Self, Self::Err> {
///         match value {
///             "red" => Ok(Color::Red),
///             "blue" => Ok(Color::Blue),
///             _ => Err(format!("unknown: {value}")),
///         }
///     }
/// }
///
/// impl Convert for Color {
///     fn convert(text: &str, _config: &ResolvedConfig) -> Result<Self, InvalidCapture> {
///         convert_from_str(text)
///     }
/// }
///
/// assert_eq!(Color::convert("red", &ResolvedConfig::default()), Ok(Color::Red));
/// ```
pub trait Convert: Sized {
    /// Convert `text` into a value.
    fn convert(text: &str, config: &ResolvedConfig) -> Result<Self, InvalidCapture>;

    /// The value text assumed when the option appears without a value.
    fn implicit() -> Option<&'static str> {
        None
    }
}

/// Convert via [`FromStr`], reporting any failure as an [`InvalidCapture::InvalidConversion`].
pub fn convert_from_str<T: FromStr>(text: &str) -> Result<T, InvalidCapture> {
    T::from_str(text).map_err(|_| invalid::<T>(text))
}

fn invalid<T>(text: &str) -> InvalidCapture {
    InvalidCapture::InvalidConversion {
        token: text.to_string(),
        type_name: std::any::type_name::<T>(),
    }
}

fn out_of_range(text: &str, min: impl Display, max: impl Display) -> InvalidCapture {
    InvalidCapture::OutOfRange {
        token: text.to_string(),
        range: format!("[{min}, {max}]"),
    }
}

fn check_bounds<T: PartialOrd + Display + 'static>(
    text: &str,
    value: T,
    config: &ResolvedConfig,
) -> Result<T, InvalidCapture> {
    match config.bounds::<T>() {
        Some(range) if !range.contains(&value) => {
            Err(out_of_range(text, range.start(), range.end()))
        }
        _ => Ok(value),
    }
}

/// Parse the integer literal grammar: an optional sign, then `0b` binary, `0x` hexadecimal, or decimal digits.
/// Returns the sign (`true` when negative) and the magnitude.
pub(crate) fn parse_integer_literal(text: &str) -> Option<(bool, u128)> {
    let (negative, unsigned) = if let Some(rest) = text.strip_prefix('-') {
        (true, rest)
    } else if let Some(rest) = text.strip_prefix('+') {
        (false, rest)
    } else {
        (false, text)
    };

    let (radix, digits) = if let Some(digits) = unsigned
        .strip_prefix("0x")
        .or_else(|| unsigned.strip_prefix("0X"))
    {
        (16, digits)
    } else if let Some(digits) = unsigned
        .strip_prefix("0b")
        .or_else(|| unsigned.strip_prefix("0B"))
    {
        (2, digits)
    } else {
        (10, unsigned)
    };

    // `from_str_radix` tolerates a leading sign of its own.
    if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
        return None;
    }

    u128::from_str_radix(digits, radix)
        .ok()
        .map(|magnitude| (negative, magnitude))
}

fn parse_float_literal<T: FromStr>(text: &str) -> Option<T> {
    let unsigned = text
        .strip_prefix('-')
        .or_else(|| text.strip_prefix('+'))
        .unwrap_or(text);
    let mut chars = unsigned.chars();
    let leading_digit = match chars.next() {
        Some(c) if c.is_ascii_digit() => true,
        Some('.') => matches!(chars.next(), Some(c) if c.is_ascii_digit()),
        _ => false,
    };

    if leading_digit {
        T::from_str(text).ok()
    } else {
        None
    }
}

/// Parse the hexadecimal floating point grammar: an optional sign, `0x`, hex digits with an optional `.`, then a `p` binary exponent.
/// Ex: `0x1.8p1` is `3.0`.
fn parse_hex_float_literal(text: &str) -> Option<f64> {
    let (negative, unsigned) = if let Some(rest) = text.strip_prefix('-') {
        (true, rest)
    } else if let Some(rest) = text.strip_prefix('+') {
        (false, rest)
    } else {
        (false, text)
    };
    let body = unsigned
        .strip_prefix("0x")
        .or_else(|| unsigned.strip_prefix("0X"))?;
    let (mantissa, exponent) = body.split_once(|c: char| c == 'p' || c == 'P')?;
    let (whole, fraction) = mantissa.split_once('.').unwrap_or((mantissa, ""));
    let digits = format!("{whole}{fraction}");

    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }

    let exponent_digits = exponent
        .strip_prefix(|c: char| c == '+' || c == '-')
        .unwrap_or(exponent);

    if exponent_digits.is_empty() || !exponent_digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }

    let significand = u64::from_str_radix(&digits, 16).ok()?;
    let exponent = i32::from_str(exponent)
        .ok()?
        .checked_sub(i32::try_from(fraction.len() * 4).ok()?)?;
    let magnitude = significand as f64 * 2f64.powi(exponent);

    Some(if negative { -magnitude } else { magnitude })
}

/// Whether `text` reads as a numeric literal (ex: `-5`, `0x1f`, `-1.5e3`, `0x1p-2`), rather than a flag.
pub(crate) fn is_numeric_literal(text: &str) -> bool {
    parse_integer_literal(text).is_some()
        || parse_float_literal::<f64>(text).is_some()
        || parse_hex_float_literal(text).is_some()
}

fn parse_integer<T>(text: &str, min: T, max: T) -> Result<T, InvalidCapture>
where
    T: TryFrom<i128> + TryFrom<u128> + Display,
{
    let (negative, magnitude) = parse_integer_literal(text).ok_or_else(|| invalid::<T>(text))?;
    let converted = if negative {
        if magnitude == i128::MIN.unsigned_abs() {
            <T as TryFrom<i128>>::try_from(i128::MIN).ok()
        } else {
            i128::try_from(magnitude)
                .ok()
                .and_then(|magnitude| <T as TryFrom<i128>>::try_from(-magnitude).ok())
        }
    } else {
        <T as TryFrom<u128>>::try_from(magnitude).ok()
    };

    converted.ok_or_else(|| out_of_range(text, min, max))
}

macro_rules! convert_integer {
    ($($t:ty),* $(,)?) => {
        $(
            impl Convert for $t {
                fn convert(text: &str, config: &ResolvedConfig) -> Result<Self, InvalidCapture> {
                    let value = parse_integer::<$t>(text, <$t>::MIN, <$t>::MAX)?;
                    check_bounds(text, value, config)
                }
            }
        )*
    };
}

convert_integer!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);

macro_rules! convert_float {
    ($($t:ty),* $(,)?) => {
        $(
            impl Convert for $t {
                fn convert(text: &str, config: &ResolvedConfig) -> Result<Self, InvalidCapture> {
                    let value = parse_float_literal::<$t>(text)
                        .or_else(|| parse_hex_float_literal(text).map(|value| value as $t))
                        .ok_or_else(|| invalid::<$t>(text))?;
                    check_bounds(text, value, config)
                }
            }
        )*
    };
}

convert_float!(f32, f64);

impl Convert for bool {
    fn convert(text: &str, _config: &ResolvedConfig) -> Result<Self, InvalidCapture> {
        if text.eq_ignore_ascii_case("true") {
            Ok(true)
        } else if text.eq_ignore_ascii_case("false") {
            Ok(false)
        } else {
            Err(invalid::<bool>(text))
        }
    }

    fn implicit() -> Option<&'static str> {
        Some(IMPLICIT_TRUE)
    }
}

impl Convert for char {
    fn convert(text: &str, config: &ResolvedConfig) -> Result<Self, InvalidCapture> {
        let value = match config.char_mode() {
            CharMode::ExpectAscii => {
                let mut chars = text.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) if c.is_ascii() => c,
                    _ => return Err(invalid::<char>(text)),
                }
            }
            CharMode::ExpectInteger => {
                let code = parse_integer::<u32>(text, 0, char::MAX as u32)?;
                char::from_u32(code).ok_or_else(|| invalid::<char>(text))?
            }
        };

        check_bounds(text, value, config)
    }
}

impl Convert for String {
    fn convert(text: &str, _config: &ResolvedConfig) -> Result<Self, InvalidCapture> {
        Ok(text.to_string())
    }
}

impl Convert for PathBuf {
    fn convert(text: &str, _config: &ResolvedConfig) -> Result<Self, InvalidCapture> {
        Ok(PathBuf::from(text))
    }
}

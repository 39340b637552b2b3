//! Writing dynamic values into a render.

use std::borrow::Cow;
use std::fmt::Display;

use crate::{Closed, PipeWriter};

/// Escape the characters that are significant in HTML text and attribute
/// values.
pub fn escape_html(s: &str) -> Cow<'_, str> {
    if !s.contains(['&', '<', '>', '"', '\'']) {
        return Cow::Borrowed(s);
    }

    let mut out = String::with_capacity(s.len() + 8);
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    Cow::Owned(out)
}

/// Write a value HTML-escaped.
pub fn write_esc(value: impl Display, buffer: &mut PipeWriter) -> Result<(), Closed> {
    let s = value.to_string();
    match escape_html(&s) {
        Cow::Borrowed(_) => buffer.write_string(s),
        Cow::Owned(escaped) => buffer.write_string(escaped),
    }
}

/// Write a value as-is.
pub fn write_raw(value: impl Display, buffer: &mut PipeWriter) -> Result<(), Closed> {
    buffer.write_string(value.to_string())
}

/// Write an integer in decimal. Integers never need escaping.
pub fn write_int(value: impl Integer, buffer: &mut PipeWriter) -> Result<(), Closed> {
    buffer.write_string(value.to_decimal())
}

/// Primitive integers and references to them.
pub trait Integer {
    fn to_decimal(&self) -> String;
}

macro_rules! impl_integer {
    ($($ty:ty),*) => {
        $(
            impl Integer for $ty {
                fn to_decimal(&self) -> String {
                    self.to_string()
                }
            }
        )*
    };
}

impl_integer!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);

impl<T: Integer + ?Sized> Integer for &T {
    fn to_decimal(&self) -> String {
        (**self).to_decimal()
    }
}

impl<T: Integer + ?Sized> Integer for &mut T {
    fn to_decimal(&self) -> String {
        (**self).to_decimal()
    }
}

//! Record-type tags and code-list enumerations.
//!
//! The record-type literal in column 0 of every row is both a schema field and
//! the tag that tells header, detail and footer rows apart. [`RecordType`] is the
//! only place those literals are spelled out.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Record-type tag found in column 0 of every row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RecordType {
    /// `HDR`: file header.
    #[serde(rename = "HDR")]
    Header,
    /// `DTL`: detail row of incoming files.
    #[serde(rename = "DTL")]
    Detail,
    /// `PNM`: patient detail row of load files.
    #[serde(rename = "PNM")]
    Patient,
    /// `TRL`: file trailer.
    #[serde(rename = "TRL")]
    Trailer,
}

impl RecordType {
    /// Wire literal.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Header => "HDR",
            Self::Detail => "DTL",
            Self::Patient => "PNM",
            Self::Trailer => "TRL",
        }
    }

    /// Single-element code list accepted by the record-type column.
    pub const fn codes(self) -> &'static [&'static str] {
        match self {
            Self::Header => &["HDR"],
            Self::Detail => &["DTL"],
            Self::Patient => &["PNM"],
            Self::Trailer => &["TRL"],
        }
    }

    /// Parse a wire literal.
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "HDR" => Some(Self::Header),
            "DTL" => Some(Self::Detail),
            "PNM" => Some(Self::Patient),
            "TRL" => Some(Self::Trailer),
            _ => None,
        }
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Logical position of a row within a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RowKind {
    Header,
    Detail,
    Footer,
}

impl RowKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Header => "header",
            Self::Detail => "detail",
            Self::Footer => "footer",
        }
    }
}

impl fmt::Display for RowKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A closed set of wire codes mapped onto a Rust enum.
///
/// Implemented through [`code_set!`](crate::code_set) so the code list used by
/// the field converter and the typed enum can never drift apart.
pub trait CodeSet: Sized + Copy + 'static {
    /// Every accepted wire code, in declaration order.
    const CODES: &'static [&'static str];

    /// Wire code of this member.
    fn code(self) -> &'static str;

    /// Member for a wire code.
    fn from_code(code: &str) -> Option<Self>;
}

/// Declare a code-list enum together with its [`CodeSet`] implementation.
///
/// ```
/// medhx_codec::code_set! {
///     /// Patient gender.
///     pub enum Gender {
///         Male => "M",
///         Female => "F",
///     }
/// }
///
/// use medhx_codec::CodeSet;
/// assert_eq!(Gender::from_code("F"), Some(Gender::Female));
/// assert_eq!(Gender::CODES, &["M", "F"]);
/// ```
#[macro_export]
macro_rules! code_set {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident => $code:literal
            ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        $vis enum $name {
            $(
                $(#[$variant_meta])*
                $variant,
            )+
        }

        impl $crate::CodeSet for $name {
            const CODES: &'static [&'static str] = &[$($code),+];

            fn code(self) -> &'static str {
                match self {
                    $(Self::$variant => $code,)+
                }
            }

            fn from_code(code: &str) -> Option<Self> {
                match code {
                    $($code => Some(Self::$variant),)+
                    _ => None,
                }
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str($crate::CodeSet::code(*self))
            }
        }

        impl $crate::__serde::Serialize for $name {
            fn serialize<S: $crate::__serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str($crate::CodeSet::code(*self))
            }
        }
    };
}

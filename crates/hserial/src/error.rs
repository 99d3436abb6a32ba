// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Error taxonomy for serialization sessions.
//!
//! Lexical and structural errors abort the whole top-level read/write and
//! surface to the caller with the failing stream position. The only
//! non-fatal path is the unknown-member skip (see `engine::read`), and even
//! that becomes [`Error::UnknownMember`] under strict mode.

use std::fmt;

/// Position within an input stream, for diagnostics.
///
/// Byte-oriented codecs report an offset; line-oriented codecs additionally
/// report line/column (1-based, 0 = unknown).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Position {
    pub offset: usize,
    pub line: u32,
    pub column: u32,
}

impl Position {
    /// Position known only as a byte offset.
    pub fn at_offset(offset: usize) -> Self {
        Self {
            offset,
            line: 0,
            column: 0,
        }
    }

    /// Position with line/column information.
    pub fn at_line(offset: usize, line: u32, column: u32) -> Self {
        Self {
            offset,
            line,
            column,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.line > 0 {
            write!(f, "line {}, column {}", self.line, self.column)
        } else {
            write!(f, "offset {}", self.offset)
        }
    }
}

/// Errors produced by encode/decode sessions.
#[derive(Debug)]
pub enum Error {
    /// Lexically malformed input for the active codec.
    Format { position: Position, message: String },
    /// Value shape disagrees with the descriptor.
    TypeMismatch {
        expected: String,
        found: String,
        path: String,
    },
    /// A required member is absent from the wire.
    MissingRequiredMember { record: String, member: String },
    /// Wire content names a member the local descriptor does not know.
    UnknownMember { record: String, member: String },
    /// Back-reference to an index not yet assigned in this session.
    DanglingReference { index: u32 },
    /// A choice value has no variant set at write time.
    ChoiceNotSet { choice: String },
    /// The active format cannot express a shared or cyclic reference.
    UnsupportedReference { format: &'static str },
    /// Conflicting registration for an already-registered type name.
    DuplicateType { name: String },
    /// Registry lookup miss.
    UnknownType { name: String },
    /// Propagated verbatim from the byte source/sink.
    Io(std::io::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Format { position, message } => {
                write!(f, "format error at {}: {}", position, message)
            }
            Self::TypeMismatch {
                expected,
                found,
                path,
            } => {
                if path.is_empty() {
                    write!(f, "type mismatch: expected {}, found {}", expected, found)
                } else {
                    write!(
                        f,
                        "type mismatch at {}: expected {}, found {}",
                        path, expected, found
                    )
                }
            }
            Self::MissingRequiredMember { record, member } => {
                write!(f, "missing required member {}.{}", record, member)
            }
            Self::UnknownMember { record, member } => {
                write!(f, "unknown member {}.{}", record, member)
            }
            Self::DanglingReference { index } => {
                write!(f, "dangling back-reference to object {}", index)
            }
            Self::ChoiceNotSet { choice } => {
                write!(f, "no variant set on choice {}", choice)
            }
            Self::UnsupportedReference { format } => {
                write!(f, "{} format cannot express shared references", format)
            }
            Self::DuplicateType { name } => {
                write!(f, "conflicting registration for type {}", name)
            }
            Self::UnknownType { name } => write!(f, "unknown type {}", name),
            Self::Io(e) => write!(f, "i/o error: {}", e),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

pub type Result<T> = std::result::Result<T, Error>;

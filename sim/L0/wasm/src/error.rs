//! Error codes, bounded error records and the registry error type.

use std::ffi::CStr;
use std::fmt;

use thiserror::Error;

use crate::handle::Handle;

/// Error codes reported through `errno_last_global` / `errno_last`.
///
/// The numbering is part of the ABI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(i32)]
pub enum ErrorCode {
    /// No error.
    #[default]
    None = 0,
    /// The engine could not load the model.
    Load = 1,
    /// The engine could not allocate state for a loaded model.
    StateAllocation = 2,
    /// Every slot of the handle table is live.
    NoFreeHandle = 3,
    /// A step or forward call on a live handle failed inside the engine.
    EngineFault = 4,
    /// A panic was caught at the export boundary.
    Panic = 5,
}

impl ErrorCode {
    /// Raw ABI value.
    #[must_use]
    pub fn as_raw(self) -> i32 {
        self as i32
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::None => "none",
            Self::Load => "load",
            Self::StateAllocation => "state allocation",
            Self::NoFreeHandle => "no free handle",
            Self::EngineFault => "engine fault",
            Self::Panic => "panic",
        };
        f.write_str(s)
    }
}

/// A `(code, message)` record with a bounded, NUL-terminated message.
///
/// The message lives in a buffer allocated once, so a pointer from
/// [`as_c_str`](Self::as_c_str) stays valid for the life of the record and
/// always reads the latest message. Messages longer than `capacity - 1`
/// bytes are cut on a UTF-8 character boundary, and an interior NUL ends the
/// message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorState {
    code: ErrorCode,
    buf: Box<[u8]>,
}

impl ErrorState {
    /// Empty record whose messages fit in `capacity` bytes including the
    /// terminator.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            code: ErrorCode::None,
            buf: vec![0; capacity.max(1)].into_boxed_slice(),
        }
    }

    /// Record an error.
    pub fn set(&mut self, code: ErrorCode, message: &str) {
        self.code = code;
        let len = bounded_len(message, self.buf.len() - 1);
        self.buf.fill(0);
        self.buf[..len].copy_from_slice(&message.as_bytes()[..len]);
    }

    /// Reset to `(0, "")`.
    pub fn clear(&mut self) {
        self.code = ErrorCode::None;
        self.buf.fill(0);
    }

    /// Current code.
    #[must_use]
    pub fn code(&self) -> ErrorCode {
        self.code
    }

    /// Current message.
    #[must_use]
    pub fn message(&self) -> &str {
        self.as_c_str().to_str().unwrap_or_default()
    }

    /// Current message as a C string. The pointer is stable across `set`
    /// and `clear`.
    #[must_use]
    pub fn as_c_str(&self) -> &CStr {
        CStr::from_bytes_until_nul(&self.buf).unwrap_or_default()
    }

    /// Buffer size, including the terminator.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    /// Whether a non-zero code is recorded.
    #[must_use]
    pub fn is_set(&self) -> bool {
        self.code != ErrorCode::None
    }
}

/// Byte length of `message` up to its first NUL, cut to at most `max_len`
/// on a character boundary.
fn bounded_len(message: &str, max_len: usize) -> usize {
    let message = message.split('\0').next().unwrap_or_default();
    let mut end = message.len().min(max_len);
    while !message.is_char_boundary(end) {
        end -= 1;
    }
    end
}

/// Errors returned by [`Registry`](crate::Registry) operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// The engine could not load the model.
    #[error("{0}")]
    Load(String),
    /// The engine could not allocate state.
    #[error("state allocation failed")]
    StateAllocation,
    /// The handle table is full.
    #[error("no free handle")]
    NoFreeHandle,
    /// The handle is out of range, freed, or from an earlier generation.
    #[error("invalid handle {0}")]
    InvalidHandle(Handle),
    /// `step` was asked for zero or fewer steps.
    #[error("step count must be positive, got {0}")]
    InvalidStepCount(i32),
    /// The engine reported a fault on a live handle.
    #[error("{0}")]
    Engine(String),
    /// A panic was caught.
    #[error("panic: {0}")]
    Panicked(String),
}

impl RegistryError {
    /// The ABI code this error is recorded under. Argument errors map to
    /// [`ErrorCode::None`] because they are never recorded.
    #[must_use]
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Load(_) => ErrorCode::Load,
            Self::StateAllocation => ErrorCode::StateAllocation,
            Self::NoFreeHandle => ErrorCode::NoFreeHandle,
            Self::Engine(_) => ErrorCode::EngineFault,
            Self::Panicked(_) => ErrorCode::Panic,
            Self::InvalidHandle(_) | Self::InvalidStepCount(_) => ErrorCode::None,
        }
    }
}

/// Result type for registry operations.
pub type Result<T> = std::result::Result<T, RegistryError>;

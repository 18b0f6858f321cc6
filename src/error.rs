//! Error handling primitives for the AS3935 driver.

/// Crate-wide result type alias.
pub type Result<T, E> = core::result::Result<T, Error<E>>;

/// Error variants produced by the driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error<E> {
    /// Any error reported by the underlying bus interface.
    Interface(E),
    /// The configuration or transport binding is invalid.
    InvalidConfig,
    /// A physical value lies outside the domain accepted by the target field.
    ///
    /// Reported before any bus transaction takes place.
    InvalidValue,
    /// The initial bus probe was not acknowledged.
    NotConnected,
    /// A register held a code with no documented meaning.
    UnexpectedRegisterData {
        /// Register the code was read from.
        register: u8,
        /// Raw field code that failed to decode.
        value: u8,
    },
}

impl<E> From<E> for Error<E> {
    fn from(err: E) -> Self {
        Self::Interface(err)
    }
}

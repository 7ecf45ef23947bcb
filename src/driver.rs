use crate::Address;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum BindError {
    #[error("Family code {found:#04x} is not {expected:#04x}.")]
    /// The address belongs to a device of another type.
    FamilyMismatch { expected: u8, found: u8 },
}

/// A device driver that claims one one-wire family code.
pub trait FamilyDriver: Sized {
    const FAMILY_CODE: u8;
    type Config;

    /// Bind a freshly enumerated address to a driver handle.
    ///
    /// Fails with [`BindError::FamilyMismatch`] when the address does not
    /// carry [`Self::FAMILY_CODE`].
    fn bind(address: Address, config: &Self::Config) -> Result<Self, BindError>;

    fn address(&self) -> Address;

    /// Family check shared by implementations of [`Self::bind`].
    fn check_family(address: Address) -> Result<(), BindError> {
        let found = address.family_code();
        if found == Self::FAMILY_CODE {
            Ok(())
        } else {
            Err(BindError::FamilyMismatch {
                expected: Self::FAMILY_CODE,
                found,
            })
        }
    }
}

//! Disk letter validation.

use crate::Error;

/// Lowest supported disk letter.
pub const MIN_DISK: char = 'A';

/// Highest supported disk letter.
pub const MAX_DISK: char = 'Z';

/// Check that `disk` names a supported drive.
pub fn validate_disk(disk: char) -> Result<(), Error> {
    if (MIN_DISK..=MAX_DISK).contains(&disk) {
        Ok(())
    } else {
        Err(Error::OutOfRange { disk })
    }
}

/// Every supported disk letter, in order.
pub fn disks() -> impl Iterator<Item = char> {
    MIN_DISK..=MAX_DISK
}

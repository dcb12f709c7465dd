//! The flat, fixed-size root directory region.

use crate::entry::DirEntry;
use crate::flash::FlashPort;
use crate::geometry::{root_offset_of, root_sector_of, ROOT_ENTRIES};
use crate::status::DirectoryError;
use crate::{Error, DIR_ENTRY_SIZE, NO_SLOT};

/// Read the entry at `slot`.
pub fn read_entry<F: FlashPort>(flash: &mut F, slot: u8) -> Result<DirEntry, Error> {
    let mut buf = [0u8; DIR_ENTRY_SIZE];
    flash
        .partial_read(root_sector_of(slot), root_offset_of(slot), &mut buf)
        .map_err(|_| Error::Flash)?;
    Ok(DirEntry::from_bytes(&buf))
}

/// Write `entry` into `slot`.
pub fn write_entry<F: FlashPort>(flash: &mut F, slot: u8, entry: &DirEntry) -> Result<(), Error> {
    flash
        .partial_write(root_sector_of(slot), root_offset_of(slot), entry.as_bytes())
        .map_err(|_| Error::Flash)
}

/// Mark `slot` deleted without freeing its cluster chain (the caller's job).
pub fn delete_entry<F: FlashPort>(flash: &mut F, slot: u8) -> Result<(), Error> {
    let mut entry = read_entry(flash, slot)?;
    entry.mark_deleted();
    write_entry(flash, slot, &entry)
}

/// The lowest slot index with a free entry, or `NO_SLOT` if the directory
/// is full. Deleted slots are reused before ever extending past the first
/// never-used terminator slot.
pub fn first_free_slot<F: FlashPort>(flash: &mut F) -> Result<u8, Error> {
    for slot in 0..ROOT_ENTRIES {
        if read_entry(flash, slot)?.is_free() {
            return Ok(slot);
        }
    }
    Ok(NO_SLOT)
}

/// Find the slot holding `name`/`extension`, or `NO_SLOT` if absent.
///
/// Stops at the first never-used terminator slot; deleted slots are
/// skipped without ending the scan.
pub fn lookup<F: FlashPort>(
    flash: &mut F,
    name: &[u8; 8],
    extension: &[u8; 3],
) -> Result<u8, Error> {
    for slot in 0..ROOT_ENTRIES {
        let entry = read_entry(flash, slot)?;
        if entry.is_terminator() {
            return Ok(NO_SLOT);
        }
        if entry.is_free() {
            continue;
        }
        if entry.matches(name, extension) {
            return Ok(slot);
        }
    }
    Ok(NO_SLOT)
}

/// Validate that `slot` is in range and currently live.
pub fn require_live<F: FlashPort>(flash: &mut F, slot: u8) -> Result<DirEntry, Error> {
    if slot >= ROOT_ENTRIES {
        return Err(DirectoryError::SlotOutOfRange.into());
    }
    let entry = read_entry(flash, slot)?;
    if entry.is_free() {
        return Err(DirectoryError::SlotEmpty.into());
    }
    Ok(entry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::RamFlash;

    #[test]
    fn lookup_stops_at_terminator() {
        let mut flash = RamFlash::new();
        let got = lookup(&mut flash, b"NOPE    ", b"BIN").unwrap();
        assert_eq!(got, crate::NO_SLOT);
    }

    #[test]
    fn first_free_slot_reuses_deleted_before_extending() {
        let mut flash = RamFlash::new();
        let entry = DirEntry::new(*b"A       ", *b"TXT", 2, 0);
        write_entry(&mut flash, 0, &entry).unwrap();
        delete_entry(&mut flash, 0).unwrap();
        let slot = first_free_slot(&mut flash).unwrap();
        assert_eq!(slot, 0);
    }

    #[test]
    fn require_live_rejects_out_of_range_and_empty() {
        let mut flash = RamFlash::new();
        assert_eq!(
            require_live(&mut flash, ROOT_ENTRIES).unwrap_err(),
            Error::from(DirectoryError::SlotOutOfRange)
        );
        assert_eq!(
            require_live(&mut flash, 5).unwrap_err(),
            Error::from(DirectoryError::SlotEmpty)
        );
    }
}

//! The file-level engine: the only component with a public operation
//! surface. Composes the FAT table and root directory modules and drives
//! the flash port directly for payload sectors.

use crate::clock::RealTimeClock;
use crate::entry::DirEntry;
use crate::fat;
use crate::flash::FlashPort;
use crate::geometry::sector_of_cluster;
use crate::root_dir;
use crate::status::{self, DirectoryError, EngineError};
use crate::{Error, Slot, NO_SLOT, SECTOR_SIZE};

/// A cursor into a file's cluster chain, letting repeated sequential
/// reads skip re-walking the chain from the head each time.
#[derive(Debug, Clone, Copy)]
pub struct ReadCursor {
    pub cluster: u16,
    pub index: u32,
}

impl ReadCursor {
    pub fn new(first_cluster: u16) -> Self {
        Self {
            cluster: first_cluster,
            index: 0,
        }
    }
}

/// Owns the flash port and clock and exposes the file-level API.
///
/// A single caller drives every operation to completion; nothing here
/// suspends or retries. Wrap in [`crate::sync::SharedFatEngine`] for a
/// coarse mutex boundary when multiple contexts share one engine.
pub struct FatEngine<F: FlashPort, C: RealTimeClock> {
    flash: F,
    clock: C,
}

impl<F: FlashPort, C: RealTimeClock> FatEngine<F, C> {
    pub fn new(flash: F, clock: C) -> Self {
        Self { flash, clock }
    }

    pub fn flash(&self) -> &F {
        &self.flash
    }

    pub fn flash_mut(&mut self) -> &mut F {
        &mut self.flash
    }

    /// Look up a file by its 8.3 name; `NO_SLOT` if absent.
    pub fn find_file(&mut self, name: &[u8; 8], extension: &[u8; 3]) -> Result<Slot, Error> {
        root_dir::lookup(&mut self.flash, name, extension)
    }

    /// Create a new, empty-or-sized file. Fails on a duplicate name, a
    /// full directory, or insufficient free clusters.
    pub fn create_file(
        &mut self,
        name: [u8; 8],
        extension: [u8; 3],
        size: u32,
    ) -> Result<Slot, Error> {
        if root_dir::lookup(&mut self.flash, &name, &extension)? != NO_SLOT {
            return Err(DirectoryError::NameInUse.into());
        }
        let slot = root_dir::first_free_slot(&mut self.flash)?;
        if slot == NO_SLOT {
            return Err(DirectoryError::DirectoryFull.into());
        }

        let required = fat::clusters_for_create(size);
        if fat::count_free(&mut self.flash, required)? != required {
            return Err(crate::status::FatTableError::NoFreeClusters.into());
        }

        let first = fat::find_free(&mut self.flash, 2)?;

        let mut entry = DirEntry::new(name, extension, first, size);
        let date = self.clock.fat_date();
        let time = self.clock.fat_time();
        entry.set_created(date, time);
        root_dir::write_entry(&mut self.flash, slot, &entry)?;

        let mut current = first;
        for i in 0..required {
            if i == required - 1 {
                fat::write_entry(&mut self.flash, current, fat::EOC)?;
            } else {
                let next = fat::find_free(&mut self.flash, current + 1)?;
                fat::write_entry(&mut self.flash, current, next)?;
                current = next;
            }
        }

        Ok(slot)
    }

    /// Delete a file and free its entire cluster chain. A no-op if the
    /// slot is out of range or already free.
    pub fn delete_file(&mut self, slot: Slot) -> Result<(), Error> {
        let entry = match root_dir::require_live(&mut self.flash, slot) {
            Ok(e) => e,
            Err(_) => return Ok(()),
        };
        fat::free_chain(&mut self.flash, entry.first_cluster())?;
        root_dir::delete_entry(&mut self.flash, slot)
    }

    /// Rename a file in place. Does not check for collisions with an
    /// existing name.
    pub fn rename_file(
        &mut self,
        slot: Slot,
        name: [u8; 8],
        extension: [u8; 3],
    ) -> Result<(), Error> {
        let mut entry = root_dir::require_live(&mut self.flash, slot)?;
        entry.set_name(name, extension);
        root_dir::write_entry(&mut self.flash, slot, &entry)
    }

    /// Read `length` bytes starting at `start` into `buf`.
    pub fn read_from_file(
        &mut self,
        slot: Slot,
        start: u32,
        buf: &mut [u8],
    ) -> Result<(), Error> {
        let entry = root_dir::require_live(&mut self.flash, slot)?;
        if start as u64 + buf.len() as u64 > entry.file_size() as u64 {
            return Err(EngineError::OutOfRange.into());
        }
        let mut cursor = ReadCursor::new(entry.first_cluster());
        self.read_from_file_fast(start, buf, &mut cursor)
    }

    /// Read starting at `start`, advancing `cursor` as far as needed from
    /// wherever it already sits. `cursor.index * SECTOR_SIZE` must not
    /// exceed `start`.
    pub fn read_from_file_fast(
        &mut self,
        start: u32,
        buf: &mut [u8],
        cursor: &mut ReadCursor,
    ) -> Result<(), Error> {
        let cursor_byte = cursor.index * SECTOR_SIZE as u32;
        if cursor_byte > start {
            return Err(EngineError::CursorAhead.into());
        }

        while (start - cursor.index * SECTOR_SIZE as u32) >= SECTOR_SIZE as u32 {
            cursor.cluster = fat::next_cluster(&mut self.flash, cursor.cluster)?
                .ok_or(EngineError::OutOfRange)?;
            cursor.index += 1;
        }

        let mut working = cursor.cluster;
        let mut offset = (start - cursor.index * SECTOR_SIZE as u32) as usize;
        let mut written = 0usize;

        while written < buf.len() {
            let chunk = (SECTOR_SIZE - offset).min(buf.len() - written);
            self.flash
                .partial_read(
                    sector_of_cluster(working),
                    offset as u16,
                    &mut buf[written..written + chunk],
                )
                .map_err(|_| Error::Flash)?;
            written += chunk;
            offset = 0;
            if written < buf.len() {
                working = fat::next_cluster(&mut self.flash, working)?
                    .ok_or(EngineError::OutOfRange)?;
            }
        }
        Ok(())
    }

    /// Append `data` to the end of the file, growing its chain as needed.
    pub fn append_to_file(&mut self, slot: Slot, data: &[u8]) -> Result<(), Error> {
        let mut entry = root_dir::require_live(&mut self.flash, slot)?;
        let (mut current, mut offset) = self.walk_to_tail(entry.first_cluster(), entry.file_size())?;

        let mut written = 0usize;
        while written < data.len() {
            if offset == SECTOR_SIZE {
                let next = fat::find_free(&mut self.flash, 0)?;
                fat::write_entry(&mut self.flash, current, next)?;
                fat::write_entry(&mut self.flash, next, fat::EOC)?;
                current = next;
                offset = 0;
            }
            let chunk = (SECTOR_SIZE - offset).min(data.len() - written);
            self.flash
                .partial_write(
                    sector_of_cluster(current),
                    offset as u16,
                    &data[written..written + chunk],
                )
                .map_err(|_| Error::Flash)?;
            written += chunk;
            offset += chunk;
        }

        entry.set_file_size(entry.file_size() + data.len() as u32);
        let date = self.clock.fat_date();
        let time = self.clock.fat_time();
        entry.set_modified(date, time);
        root_dir::write_entry(&mut self.flash, slot, &entry)
    }

    /// Overwrite `data` starting at `start`. Silently clamps the write so
    /// it never extends the file; does not update the modified timestamp
    /// (kept bug-compatible with the reference driver).
    pub fn modify_file(&mut self, slot: Slot, start: u32, data: &[u8]) -> Result<(), Error> {
        let entry = root_dir::require_live(&mut self.flash, slot)?;
        if start > entry.file_size() {
            return Ok(());
        }
        let length = (data.len() as u32).min(entry.file_size() - start) as usize;
        if length == 0 {
            return Ok(());
        }

        let (mut current, mut offset) = self.walk_to_byte(entry.first_cluster(), start)?;
        let mut written = 0usize;
        while written < length {
            let chunk = (SECTOR_SIZE - offset).min(length - written);
            self.flash
                .partial_write(
                    sector_of_cluster(current),
                    offset as u16,
                    &data[written..written + chunk],
                )
                .map_err(|_| Error::Flash)?;
            written += chunk;
            offset += chunk;
            if offset == SECTOR_SIZE && written < length {
                current = fat::next_cluster(&mut self.flash, current)?
                    .ok_or(EngineError::OutOfRange)?;
                offset = 0;
            }
        }
        Ok(())
    }

    /// Grow or shrink the file's cluster chain to hold exactly `new_size`
    /// bytes, then update its size field.
    pub fn resize_file(&mut self, slot: Slot, new_size: u32) -> Result<(), Error> {
        let mut entry = root_dir::require_live(&mut self.flash, slot)?;
        if new_size == entry.file_size() {
            return Ok(());
        }

        let mut first = entry.first_cluster();
        if first == 0 {
            first = fat::find_free(&mut self.flash, 2)?;
            fat::write_entry(&mut self.flash, first, fat::EOC)?;
            entry.set_first_cluster(first);
        }

        let old_clusters = fat::clusters_for_size(entry.file_size()).max(1);
        let new_clusters = fat::clusters_for_size(new_size).max(1);

        if new_clusters >= old_clusters {
            let mut current = first;
            for i in 0..new_clusters {
                if i == new_clusters - 1 {
                    fat::write_entry(&mut self.flash, current, fat::EOC)?;
                    break;
                }
                match fat::next_cluster(&mut self.flash, current)? {
                    Some(next) => current = next,
                    None => {
                        let next = fat::find_free(&mut self.flash, current + 1)?;
                        fat::write_entry(&mut self.flash, current, next)?;
                        current = next;
                    }
                }
            }
        } else {
            let mut current = first;
            for i in 0..new_clusters - 1 {
                let _ = i;
                current = fat::next_cluster(&mut self.flash, current)?
                    .ok_or(EngineError::OutOfRange)?;
            }
            let tail = fat::next_cluster(&mut self.flash, current)?;
            fat::write_entry(&mut self.flash, current, fat::EOC)?;
            if let Some(mut stray) = tail {
                loop {
                    let next = fat::next_cluster(&mut self.flash, stray)?;
                    fat::write_entry(&mut self.flash, stray, fat::FREE)?;
                    match next {
                        Some(n) => stray = n,
                        None => break,
                    }
                }
            }
        }

        entry.set_file_size(new_size);
        root_dir::write_entry(&mut self.flash, slot, &entry)
    }

    /// Copy the 32-byte directory entry for `slot` into `out`.
    pub fn file_information(&mut self, slot: Slot) -> Result<DirEntry, Error> {
        root_dir::require_live(&mut self.flash, slot)
    }

    /// Number of free clusters, capped at `max` for a bounded scan.
    pub fn empty_clusters(&mut self, max: u16) -> Result<u16, Error> {
        fat::count_free(&mut self.flash, max)
    }

    /// Enumerate live files in slot order into `out`, stopping at the
    /// directory terminator and skipping the volume label entry. Returns
    /// the number of files found, which may exceed `out.len()` if it ran
    /// out of room; the caller can tell from the return value whether
    /// every file fit.
    pub fn list_files(&mut self, out: &mut [(Slot, DirEntry)]) -> Result<usize, Error> {
        let mut count = 0usize;
        for slot in 0..crate::geometry::ROOT_ENTRIES {
            let entry = root_dir::read_entry(&mut self.flash, slot)?;
            if entry.is_terminator() {
                break;
            }
            if entry.is_free() || entry.attr() == crate::ATTR_VOLUME_ID {
                continue;
            }
            if count < out.len() {
                out[count] = (slot, entry);
            }
            count += 1;
        }
        Ok(count)
    }

    // The flattened, spec-literal surface (§6 "Engine surface (exposed)").
    // Each `fat_*` function wraps the typed operation above and converts
    // its `Result` to the single `u8` status byte that operation's own
    // section of §4.G specifies, rather than one blanket conversion — see
    // the mapping functions in `status.rs` for why a single conversion
    // cannot be correct across call sites.

    /// `fat_create_file`: see `create_file`.
    pub fn fat_create_file(&mut self, name: [u8; 8], extension: [u8; 3], size: u32) -> u8 {
        status::create_file_status(self.create_file(name, extension, size)).into()
    }

    /// `fat_delete_file`: see `delete_file`. Always succeeds; a no-op on an
    /// invalid or already-free slot is success, not a reported failure.
    pub fn fat_delete_file(&mut self, slot: Slot) -> u8 {
        status::find_status(self.delete_file(slot)).into()
    }

    /// `fat_rename_file`: see `rename_file`.
    pub fn fat_rename_file(&mut self, slot: Slot, name: [u8; 8], extension: [u8; 3]) -> u8 {
        status::find_status(self.rename_file(slot, name, extension)).into()
    }

    /// `fat_read_from_file`: see `read_from_file`.
    pub fn fat_read_from_file(&mut self, slot: Slot, start: u32, buf: &mut [u8]) -> u8 {
        status::find_status(self.read_from_file(slot, start, buf)).into()
    }

    /// `fat_read_from_file_fast`: see `read_from_file_fast`.
    pub fn fat_read_from_file_fast(
        &mut self,
        start: u32,
        buf: &mut [u8],
        cursor: &mut ReadCursor,
    ) -> u8 {
        status::find_status(self.read_from_file_fast(start, buf, cursor)).into()
    }

    /// `fat_append_to_file`: see `append_to_file`.
    pub fn fat_append_to_file(&mut self, slot: Slot, data: &[u8]) -> u8 {
        status::mutate_status(self.append_to_file(slot, data)).into()
    }

    /// `fat_modify_file`: see `modify_file`.
    pub fn fat_modify_file(&mut self, slot: Slot, start: u32, data: &[u8]) -> u8 {
        status::find_status(self.modify_file(slot, start, data)).into()
    }

    /// `fat_resize_file`: see `resize_file`.
    pub fn fat_resize_file(&mut self, slot: Slot, new_size: u32) -> u8 {
        status::mutate_status(self.resize_file(slot, new_size)).into()
    }

    /// `fat_get_file_information`: see `file_information`. `out` is left
    /// untouched on failure.
    pub fn fat_get_file_information(&mut self, slot: Slot, out: &mut DirEntry) -> u8 {
        let result = self.file_information(slot);
        if let Ok(entry) = &result {
            *out = *entry;
        }
        status::info_status(result).into()
    }

    /// `fat_find_file`: see `find_file`. Returns `NO_SLOT` on a flash fault
    /// as well as a genuine miss; §6 treats both as "no such file".
    pub fn fat_find_file(&mut self, name: &[u8; 8], extension: &[u8; 3]) -> Slot {
        self.find_file(name, extension).unwrap_or(NO_SLOT)
    }

    /// `fat_get_empty_clusters`: see `empty_clusters`.
    pub fn fat_get_empty_clusters(&mut self, max: u16) -> u16 {
        self.empty_clusters(max).unwrap_or(0)
    }

    /// Advance from `first_cluster` to the cluster and in-sector offset
    /// holding byte `position`. Used by `modify_file`, whose `position` is
    /// always strictly less than the file's current size.
    fn walk_to_byte(&mut self, first_cluster: u16, position: u32) -> Result<(u16, usize), Error> {
        let mut cluster = first_cluster;
        let mut remaining = position;
        while remaining >= SECTOR_SIZE as u32 {
            cluster = fat::next_cluster(&mut self.flash, cluster)?.ok_or(EngineError::OutOfRange)?;
            remaining -= SECTOR_SIZE as u32;
        }
        Ok((cluster, remaining as usize))
    }

    /// Advance from `first_cluster` to the tail cluster and in-sector
    /// offset at `file_size` bytes, for `append_to_file`. Unlike
    /// `walk_to_byte`, the comparison is strict: when `file_size` lands
    /// exactly on a cluster boundary the walk stops one cluster early and
    /// reports `offset == SECTOR_SIZE`, letting the caller allocate a new
    /// cluster rather than stepping onto a link that does not exist yet
    /// (the tail cluster's FAT entry is `EOC`).
    fn walk_to_tail(&mut self, first_cluster: u16, file_size: u32) -> Result<(u16, usize), Error> {
        let mut cluster = first_cluster;
        let mut remaining = file_size;
        while remaining > SECTOR_SIZE as u32 {
            cluster = fat::next_cluster(&mut self.flash, cluster)?.ok_or(EngineError::OutOfRange)?;
            remaining -= SECTOR_SIZE as u32;
        }
        Ok((cluster, remaining as usize))
    }
}

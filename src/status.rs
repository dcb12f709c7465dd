//! Per-component error types and the 8-bit status surface.

/// Failures raised while reading or writing the FAT table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FatTableError {
    /// No free cluster could be found to satisfy an allocation.
    NoFreeClusters,
}

/// Failures raised while operating on the root directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectoryError {
    /// A file with the requested name/extension already exists.
    NameInUse,
    /// No free directory slot remains.
    DirectoryFull,
    /// The slot index does not name a root entry.
    SlotOutOfRange,
    /// The slot does not currently hold a live entry.
    SlotEmpty,
}

/// Failures raised by file-level engine operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineError {
    Fat(FatTableError),
    Dir(DirectoryError),
    /// A read or cursor request referenced bytes past the end of the file.
    OutOfRange,
    /// A `read_from_file_fast` cursor was positioned past the requested start.
    CursorAhead,
}

impl From<FatTableError> for EngineError {
    fn from(e: FatTableError) -> Self {
        EngineError::Fat(e)
    }
}

impl From<DirectoryError> for EngineError {
    fn from(e: DirectoryError) -> Self {
        EngineError::Dir(e)
    }
}

/// The crate-wide error type returned by every fallible internal function.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    Engine(EngineError),
    /// The underlying flash port reported an I/O failure.
    Flash,
}

impl From<EngineError> for Error {
    fn from(e: EngineError) -> Self {
        Error::Engine(e)
    }
}

impl From<FatTableError> for Error {
    fn from(e: FatTableError) -> Self {
        Error::Engine(EngineError::Fat(e))
    }
}

impl From<DirectoryError> for Error {
    fn from(e: DirectoryError) -> Self {
        Error::Engine(EngineError::Dir(e))
    }
}

/// The 8-bit status codes exposed at the public engine boundary.
///
/// `0x00` is success; the rest mirror the sentinel codes documented for
/// each operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Status {
    Ok = 0x00,
    NotFound = 0x01,
    SlotEmpty = 0x02,
    InsufficientSpace = 0xFD,
    DirectoryFull = 0xFE,
    Invalid = 0xFF,
}

impl From<Status> for u8 {
    fn from(s: Status) -> u8 {
        s as u8
    }
}

// The byte a failure maps to is not a property of the `Error` alone: the
// reference driver returns different literals for the same underlying
// condition depending on which `fat_*` entry point raised it (compare
// `fat_append_to_file`'s `0xFE` for a free slot against
// `fat_get_file_information`'s `0x02` for the same condition). A single
// blanket `From<Error> for Status` cannot express that, so each public
// engine operation instead picks one of the mappings below.

/// Status mapping for `create_file` (SPEC_FULL.md §4.G, steps 1/2/4): a
/// duplicate name collapses to `Invalid`, a full directory to
/// `DirectoryFull`, insufficient free clusters to `InsufficientSpace`.
pub fn create_file_status<T>(result: Result<T, Error>) -> Status {
    match result {
        Ok(_) => Status::Ok,
        Err(Error::Engine(EngineError::Dir(DirectoryError::DirectoryFull))) => {
            Status::DirectoryFull
        }
        Err(Error::Engine(EngineError::Fat(FatTableError::NoFreeClusters))) => {
            Status::InsufficientSpace
        }
        Err(_) => Status::Invalid,
    }
}

/// Status mapping shared by `append_to_file` and `resize_file`
/// (SPEC_FULL.md §4.G): an out-of-range slot is `Invalid` (`0xFF`); a free
/// slot reuses the `DirectoryFull` byte (`0xFE`) to mean "slot empty" in
/// this context, exactly as the reference driver reuses literal return
/// values with a per-function meaning rather than a single global code.
pub fn mutate_status<T>(result: Result<T, Error>) -> Status {
    match result {
        Ok(_) => Status::Ok,
        Err(Error::Engine(EngineError::Dir(DirectoryError::SlotEmpty))) => Status::DirectoryFull,
        Err(_) => Status::Invalid,
    }
}

/// Status mapping for `get_file_information` (SPEC_FULL.md §4.G): an
/// out-of-range slot is `NotFound` (`0x01`), a free slot is `SlotEmpty`
/// (`0x02`).
pub fn info_status<T>(result: Result<T, Error>) -> Status {
    match result {
        Ok(_) => Status::Ok,
        Err(Error::Engine(EngineError::Dir(DirectoryError::SlotOutOfRange))) => Status::NotFound,
        Err(Error::Engine(EngineError::Dir(DirectoryError::SlotEmpty))) => Status::SlotEmpty,
        Err(_) => Status::Invalid,
    }
}

/// Default status mapping for operations SPEC_FULL.md does not assign a
/// dedicated code to (`rename_file`, `modify_file`) or that already have
/// a single `0xFF` failure mode (`read_from_file`, `read_from_file_fast`):
/// every failure collapses to `Invalid`, per §7's rule that `0xFF` on a
/// find/slot function means "no such file".
pub fn find_status<T>(result: Result<T, Error>) -> Status {
    match result {
        Ok(_) => Status::Ok,
        Err(_) => Status::Invalid,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_file_status_matches_spec_literals() {
        assert_eq!(create_file_status::<()>(Ok(())), Status::Ok);
        assert_eq!(
            create_file_status::<()>(Err(DirectoryError::NameInUse.into())),
            Status::Invalid
        );
        assert_eq!(
            create_file_status::<()>(Err(DirectoryError::DirectoryFull.into())),
            Status::DirectoryFull
        );
        assert_eq!(
            create_file_status::<()>(Err(FatTableError::NoFreeClusters.into())),
            Status::InsufficientSpace
        );
    }

    #[test]
    fn mutate_status_reuses_directory_full_byte_for_empty_slot() {
        assert_eq!(
            mutate_status::<()>(Err(DirectoryError::SlotOutOfRange.into())),
            Status::Invalid
        );
        assert_eq!(
            mutate_status::<()>(Err(DirectoryError::SlotEmpty.into())),
            Status::DirectoryFull
        );
    }

    #[test]
    fn info_status_uses_the_dedicated_low_byte_codes() {
        assert_eq!(
            info_status::<()>(Err(DirectoryError::SlotOutOfRange.into())),
            Status::NotFound
        );
        assert_eq!(
            info_status::<()>(Err(DirectoryError::SlotEmpty.into())),
            Status::SlotEmpty
        );
    }

    #[test]
    fn find_status_collapses_every_failure_to_invalid() {
        assert_eq!(
            find_status::<()>(Err(EngineError::OutOfRange.into())),
            Status::Invalid
        );
        assert_eq!(
            find_status::<()>(Err(EngineError::CursorAhead.into())),
            Status::Invalid
        );
    }
}

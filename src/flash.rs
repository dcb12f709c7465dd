//! Capability interface for the underlying flash storage.

use crate::SECTOR_SIZE;

/// Raw sector-addressable storage backing the volume.
///
/// Implementors provide full-sector transfers plus partial transfers
/// confined to a single sector; the engine never issues a read or write
/// spanning two sectors.
pub trait FlashPort: Send + Sync {
    type Error;

    /// Read the full `SECTOR_SIZE` bytes of `sector` into `buf`.
    fn page_read(&mut self, sector: u16, buf: &mut [u8; SECTOR_SIZE]) -> Result<(), Self::Error>;

    /// Write the full `SECTOR_SIZE` bytes of `buf` to `sector`.
    fn page_write(&mut self, sector: u16, buf: &[u8; SECTOR_SIZE]) -> Result<(), Self::Error>;

    /// Read `dst.len()` bytes starting at `offset` within `sector`.
    ///
    /// `offset + dst.len() <= SECTOR_SIZE`.
    fn partial_read(
        &mut self,
        sector: u16,
        offset: u16,
        dst: &mut [u8],
    ) -> Result<(), Self::Error>;

    /// Write `src` starting at `offset` within `sector`.
    ///
    /// `offset + src.len() <= SECTOR_SIZE`.
    fn partial_write(&mut self, sector: u16, offset: u16, src: &[u8]) -> Result<(), Self::Error>;
}

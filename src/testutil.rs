//! In-memory flash simulator used only by the test suite.

use crate::flash::FlashPort;
use crate::geometry::{DATA_FIRST_SECTOR, DATA_NUMBER_OF_SECTORS};
use crate::SECTOR_SIZE;

const SECTOR_COUNT: usize = (DATA_FIRST_SECTOR as usize) + (DATA_NUMBER_OF_SECTORS as usize);

/// A RAM-backed stand-in for a real flash chip; every sector is zeroed at
/// construction, exactly as an erased flash device would read.
pub struct RamFlash {
    sectors: Vec<[u8; SECTOR_SIZE]>,
}

impl RamFlash {
    pub fn new() -> Self {
        Self::blank()
    }

    pub fn blank() -> Self {
        Self {
            sectors: vec![[0u8; SECTOR_SIZE]; SECTOR_COUNT],
        }
    }

    pub fn snapshot(&self) -> Vec<[u8; SECTOR_SIZE]> {
        self.sectors.clone()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RamFlashError;

impl FlashPort for RamFlash {
    type Error = RamFlashError;

    fn page_read(&mut self, sector: u16, buf: &mut [u8; SECTOR_SIZE]) -> Result<(), Self::Error> {
        buf.copy_from_slice(&self.sectors[sector as usize]);
        Ok(())
    }

    fn page_write(&mut self, sector: u16, buf: &[u8; SECTOR_SIZE]) -> Result<(), Self::Error> {
        self.sectors[sector as usize] = *buf;
        Ok(())
    }

    fn partial_read(
        &mut self,
        sector: u16,
        offset: u16,
        dst: &mut [u8],
    ) -> Result<(), Self::Error> {
        let offset = offset as usize;
        dst.copy_from_slice(&self.sectors[sector as usize][offset..offset + dst.len()]);
        Ok(())
    }

    fn partial_write(&mut self, sector: u16, offset: u16, src: &[u8]) -> Result<(), Self::Error> {
        let offset = offset as usize;
        self.sectors[sector as usize][offset..offset + src.len()].copy_from_slice(src);
        Ok(())
    }
}

//! Volume lifecycle: detect an existing format, or lay one down.

use crate::flash::FlashPort;
use crate::format;
use crate::geometry::{FAT_FIRST_SECTOR, FAT_LAST_SECTOR, MBR_SECTOR, ROOT_FIRST_SECTOR, ROOT_LAST_SECTOR};
use crate::{Error, SECTOR_SIZE};

fn matches_image<F: FlashPort>(
    flash: &mut F,
    sector: u16,
    image: impl Fn(u16) -> u8,
) -> Result<bool, Error> {
    let mut buf = [0u8; SECTOR_SIZE];
    flash.page_read(sector, &mut buf).map_err(|_| Error::Flash)?;
    for (i, &b) in buf.iter().enumerate() {
        if b != image(i as u16) {
            return Ok(false);
        }
    }
    Ok(true)
}

fn write_image<F: FlashPort>(
    flash: &mut F,
    sector: u16,
    image: impl Fn(u16) -> u8,
) -> Result<(), Error> {
    let mut buf = [0u8; SECTOR_SIZE];
    for (i, b) in buf.iter_mut().enumerate() {
        *b = image(i as u16);
    }
    flash.page_write(sector, &buf).map_err(|_| Error::Flash)
}

fn zero_sectors<F: FlashPort>(flash: &mut F, first: u16, last: u16) -> Result<(), Error> {
    let zero = [0u8; SECTOR_SIZE];
    for sector in first..=last {
        flash.page_write(sector, &zero).map_err(|_| Error::Flash)?;
    }
    Ok(())
}

/// True if sectors 0 and 1 already carry the expected MBR/FBR images.
pub fn is_formatted<F: FlashPort>(flash: &mut F) -> Result<bool, Error> {
    Ok(matches_image(flash, MBR_SECTOR, format::mbr_byte)?
        && matches_image(flash, crate::geometry::MBR_FIRST_PARTITION_SECTOR as u16, format::fbr_byte)?)
}

/// Write the MBR, FBR, FAT, root directory, and demo data sector.
pub fn format<F: FlashPort>(flash: &mut F) -> Result<(), Error> {
    write_image(flash, MBR_SECTOR, format::mbr_byte)?;
    write_image(
        flash,
        crate::geometry::MBR_FIRST_PARTITION_SECTOR as u16,
        format::fbr_byte,
    )?;

    write_image(flash, FAT_FIRST_SECTOR, format::fat_byte)?;
    zero_sectors(flash, FAT_FIRST_SECTOR + 1, FAT_LAST_SECTOR)?;

    write_image(flash, ROOT_FIRST_SECTOR, format::root_byte)?;
    zero_sectors(flash, ROOT_FIRST_SECTOR + 1, ROOT_LAST_SECTOR)?;

    write_image(flash, crate::geometry::DATA_FIRST_SECTOR, format::data_byte)?;

    Ok(())
}

/// Format the volume only if it is not already formatted.
pub fn init<F: FlashPort>(flash: &mut F) -> Result<(), Error> {
    if !is_formatted(flash)? {
        format(flash)?;
    }
    Ok(())
}

//! Bit-exact on-disk format images.
//!
//! Each generator below answers "what byte sits at this index" for one
//! sector of the freshly formatted volume. `lifecycle::format` drives
//! these to write the volume; `lifecycle::get_format_status` drives them
//! again to check whether an existing volume already matches.

use crate::geometry::{
    MBR_FIRST_PARTITION_SECTOR, MBR_PARTITION_SIZE, ROOT_DRIVE_NAME, ROOT_FILE_CONTENT,
    ROOT_FILE_EXTENSION, ROOT_FILE_FIRST_CLUSTER, ROOT_FILE_NAME, ROOT_FILE_SIZE,
};
use crate::SECTOR_SIZE;

fn low_byte(word: u16) -> u8 {
    (word & 0xFF) as u8
}

fn high_byte(word: u16) -> u8 {
    (word >> 8) as u8
}

fn low_word(dword: u32) -> u16 {
    (dword & 0xFFFF) as u16
}

fn high_word(dword: u32) -> u16 {
    (dword >> 16) as u16
}

/// Byte `idx` of the master boot record (sector 0).
pub fn mbr_byte(idx: u16) -> u8 {
    match idx {
        0x1BE => 0x80, // partition status: bootable
        0x1BF => 0x00, // start head
        0x1C0 => 0x02, // start sector (CHS is unused by this volume)
        0x1C1 => 0x00, // start cylinder
        0x1C2 => 0x06, // partition type: FAT16
        0x1C3 => 0x00, // end head
        0x1C4 => 0x00, // end sector
        0x1C5 => 0x00, // end cylinder
        0x1C6 => low_byte(low_word(MBR_FIRST_PARTITION_SECTOR)),
        0x1C7 => high_byte(low_word(MBR_FIRST_PARTITION_SECTOR)),
        0x1C8 => low_byte(high_word(MBR_FIRST_PARTITION_SECTOR)),
        0x1C9 => high_byte(high_word(MBR_FIRST_PARTITION_SECTOR)),
        0x1CA => low_byte(low_word(MBR_PARTITION_SIZE)),
        0x1CB => high_byte(low_word(MBR_PARTITION_SIZE)),
        0x1CC => low_byte(high_word(MBR_PARTITION_SIZE)),
        0x1CD => high_byte(high_word(MBR_PARTITION_SIZE)),
        0x1FE => 0x55,
        0x1FF => 0xAA,
        _ => 0x00,
    }
}

const FBR_OEM_IDENTIFIER: [u8; 8] = *b"EMBDFAT1";
const FBR_BYTES_PER_SECTOR: u16 = SECTOR_SIZE as u16;
const FBR_SECTORS_PER_CLUSTER: u8 = 1;
const FBR_RESERVED_SECTORS: u16 = 1;
const FBR_NUMBER_OF_FATS: u8 = 1;
const FBR_ROOT_ENTRIES: u16 = crate::geometry::ROOT_ENTRIES as u16;
const FBR_NUMBER_OF_SECTORS: u16 = MBR_PARTITION_SIZE as u16;
const FBR_MEDIA_DESCRIPTOR: u8 = 0xF8;
const FBR_SECTORS_PER_FAT: u16 =
    (crate::geometry::FAT_LAST_SECTOR - crate::geometry::FAT_FIRST_SECTOR + 1) as u16;
const FBR_SECTORS_PER_HEAD: u16 = 0;
const FBR_HEADS_PER_CYLINDER: u16 = 0;
const FBR_HIDDEN_SECTORS: u32 = 0;
const FBR_EXT_FLAGS: u16 = 0;
const FBR_ROOT_DIRECTORY_START: u32 = crate::geometry::ROOT_FIRST_SECTOR as u32;

/// Byte `idx` of the FAT16 boot sector (the partition's first sector).
pub fn fbr_byte(idx: u16) -> u8 {
    match idx {
        0x00 => 0xEB,
        0x01 => 0x3C,
        0x02 => 0x90,
        0x03..=0x0A => FBR_OEM_IDENTIFIER[(idx - 0x03) as usize],
        0x0B => low_byte(FBR_BYTES_PER_SECTOR),
        0x0C => high_byte(FBR_BYTES_PER_SECTOR),
        0x0D => FBR_SECTORS_PER_CLUSTER,
        0x0E => low_byte(FBR_RESERVED_SECTORS),
        0x0F => high_byte(FBR_RESERVED_SECTORS),
        0x10 => FBR_NUMBER_OF_FATS,
        0x11 => low_byte(FBR_ROOT_ENTRIES),
        0x12 => high_byte(FBR_ROOT_ENTRIES),
        0x13 => low_byte(FBR_NUMBER_OF_SECTORS),
        0x14 => high_byte(FBR_NUMBER_OF_SECTORS),
        0x15 => FBR_MEDIA_DESCRIPTOR,
        0x16 => low_byte(FBR_SECTORS_PER_FAT),
        0x17 => high_byte(FBR_SECTORS_PER_FAT),
        0x18 => low_byte(FBR_SECTORS_PER_HEAD),
        0x19 => high_byte(FBR_SECTORS_PER_HEAD),
        0x1A => low_byte(FBR_HEADS_PER_CYLINDER),
        0x1B => high_byte(FBR_HEADS_PER_CYLINDER),
        0x1C => low_byte(low_word(FBR_HIDDEN_SECTORS)),
        0x1D => high_byte(low_word(FBR_HIDDEN_SECTORS)),
        0x1E => low_byte(high_word(FBR_HIDDEN_SECTORS)),
        0x1F => high_byte(high_word(FBR_HIDDEN_SECTORS)),
        0x28 => low_byte(FBR_EXT_FLAGS),
        0x29 => high_byte(FBR_EXT_FLAGS),
        0x2C => low_byte(low_word(FBR_ROOT_DIRECTORY_START)),
        0x2D => high_byte(low_word(FBR_ROOT_DIRECTORY_START)),
        // The documented reference generator drops the `return` here,
        // silently falling through to 0x2F's case and leaving this byte
        // 0x00. This implementation emits the intended high byte instead.
        0x2E => low_byte(high_word(FBR_ROOT_DIRECTORY_START)),
        0x2F => high_byte(high_word(FBR_ROOT_DIRECTORY_START)),
        0x36 => b'F',
        0x37 => b'A',
        0x38 => b'T',
        0x39 => b'1',
        0x3A => b'6',
        0x3B..=0x3D => b' ',
        0x1FE => 0x55,
        0x1FF => 0xAA,
        _ => 0x00,
    }
}

/// Byte `idx` of the first FAT sector: cluster 0/1 reserved markers plus
/// the single-cluster demo file chain at cluster 2.
pub fn fat_byte(idx: u16) -> u8 {
    match idx {
        0x00 => 0xF8,
        0x01 | 0x02 | 0x03 => 0xFF,
        0x04 | 0x05 => 0xFF,
        _ => 0x00,
    }
}

/// Byte `idx` of the first root directory sector: the volume label at
/// slot 0 and the demo file at slot 1.
pub fn root_byte(idx: u16) -> u8 {
    if idx < 0x20 {
        if idx < 11 {
            return ROOT_DRIVE_NAME[idx as usize];
        }
        if idx == 11 {
            return 0x08;
        }
        return 0x00;
    }
    if idx < 0x40 {
        let rel = idx - 0x20;
        if rel < 8 {
            return ROOT_FILE_NAME[rel as usize];
        }
        if rel < 11 {
            return ROOT_FILE_EXTENSION[(rel - 8) as usize];
        }
        return match rel {
            11 => 0x20,
            0x0D => 0x06,
            0x0E => 0x28,
            0x0F => 0x78,
            0x10 => 0xDE,
            0x11 => 0x38,
            0x12 => 0x5F,
            0x13 => 0x4B,
            0x14 => 0x00,
            0x15 => 0x00,
            0x16 => 0x04,
            0x17 => 0x77,
            0x18 => 0xDE,
            0x19 => 0x38,
            26 => low_byte(ROOT_FILE_FIRST_CLUSTER),
            27 => high_byte(ROOT_FILE_FIRST_CLUSTER),
            28 => low_byte(low_word(ROOT_FILE_SIZE)),
            29 => high_byte(low_word(ROOT_FILE_SIZE)),
            30 => low_byte(high_word(ROOT_FILE_SIZE)),
            31 => high_byte(high_word(ROOT_FILE_SIZE)),
            _ => 0x00,
        };
    }
    0x00
}

/// Byte `idx` of the first data sector: the demo file's content.
pub fn data_byte(idx: u16) -> u8 {
    if (idx as usize) < ROOT_FILE_CONTENT.len() {
        ROOT_FILE_CONTENT[idx as usize]
    } else {
        0x00
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mbr_signature_is_55_aa() {
        assert_eq!(mbr_byte(0x1FE), 0x55);
        assert_eq!(mbr_byte(0x1FF), 0xAA);
    }

    #[test]
    fn fbr_root_dir_start_spans_all_four_bytes() {
        assert_eq!(fbr_byte(0x2C), low_byte(low_word(FBR_ROOT_DIRECTORY_START)));
        assert_eq!(fbr_byte(0x2D), high_byte(low_word(FBR_ROOT_DIRECTORY_START)));
        assert_eq!(fbr_byte(0x2E), low_byte(high_word(FBR_ROOT_DIRECTORY_START)));
        assert_eq!(fbr_byte(0x2F), high_byte(high_word(FBR_ROOT_DIRECTORY_START)));
    }

    #[test]
    fn fbr_names_the_filesystem() {
        let name: [u8; 5] = [
            fbr_byte(0x36),
            fbr_byte(0x37),
            fbr_byte(0x38),
            fbr_byte(0x39),
            fbr_byte(0x3A),
        ];
        assert_eq!(&name, b"FAT16");
    }

    #[test]
    fn fat_image_preallocates_demo_cluster() {
        assert_eq!(fat_byte(0), 0xF8);
        assert_eq!(fat_byte(4), 0xFF);
        assert_eq!(fat_byte(5), 0xFF);
        assert_eq!(fat_byte(6), 0x00);
    }

    #[test]
    fn root_image_places_demo_file_at_slot_one() {
        for (i, &b) in ROOT_FILE_NAME.iter().enumerate() {
            assert_eq!(root_byte(0x20 + i as u16), b);
        }
        assert_eq!(root_byte(0x20 + 26), 2); // first cluster low byte
        assert_eq!(root_byte(0x20 + 28), 15); // file size low byte
    }

    #[test]
    fn data_image_carries_demo_content() {
        for (i, &b) in ROOT_FILE_CONTENT.iter().enumerate() {
            assert_eq!(data_byte(i as u16), b);
        }
        assert_eq!(data_byte(ROOT_FILE_CONTENT.len() as u16), 0);
    }
}

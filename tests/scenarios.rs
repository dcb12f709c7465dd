//! End-to-end scenarios against an in-memory flash device.

use embedfat16::clock::NullClock;
use embedfat16::{lifecycle, FatEngine};

const SECTOR_SIZE: usize = 512;
const SECTOR_COUNT: usize = 7 + 512; // DATA_FIRST_SECTOR + DATA_NUMBER_OF_SECTORS

struct MemoryFlash {
    sectors: Vec<[u8; SECTOR_SIZE]>,
}

impl MemoryFlash {
    fn new() -> Self {
        Self {
            sectors: vec![[0u8; SECTOR_SIZE]; SECTOR_COUNT],
        }
    }
}

#[derive(Debug)]
struct FlashIoError;

impl embedfat16::FlashPort for MemoryFlash {
    type Error = FlashIoError;

    fn page_read(&mut self, sector: u16, buf: &mut [u8; SECTOR_SIZE]) -> Result<(), Self::Error> {
        buf.copy_from_slice(&self.sectors[sector as usize]);
        Ok(())
    }

    fn page_write(&mut self, sector: u16, buf: &[u8; SECTOR_SIZE]) -> Result<(), Self::Error> {
        self.sectors[sector as usize] = *buf;
        Ok(())
    }

    fn partial_read(&mut self, sector: u16, offset: u16, dst: &mut [u8]) -> Result<(), Self::Error> {
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

fn formatted() -> FatEngine<MemoryFlash, NullClock> {
    let mut flash = MemoryFlash::new();
    lifecycle::init(&mut flash).unwrap();
    FatEngine::new(flash, NullClock)
}

#[test]
fn scenario_fresh_volume_carries_the_demo_file() {
    let mut engine = formatted();
    let slot = engine.find_file(b"HELLO   ", b"TXT").unwrap();
    assert_eq!(slot, 1);

    let info = engine.file_information(slot).unwrap();
    assert_eq!(info.file_size(), 15);

    let mut buf = [0u8; 15];
    engine.read_from_file(slot, 0, &mut buf).unwrap();
    assert_eq!(&buf, b"Hello, world!\r\n");
}

#[test]
fn scenario_create_then_grow() {
    let mut engine = formatted();
    let slot = engine.create_file(*b"DATA    ", *b"BIN", 0).unwrap();
    engine.append_to_file(slot, &[0u8; 1024]).unwrap();

    let info = engine.file_information(slot).unwrap();
    assert_eq!(info.file_size(), 1024);

    let mut clusters = 0;
    let mut cluster = info.first_cluster();
    loop {
        clusters += 1;
        match embedfat16::fat::next_cluster(engine.flash_mut(), cluster).unwrap() {
            Some(next) => cluster = next,
            None => break,
        }
    }
    assert_eq!(clusters, 2);
}

#[test]
fn scenario_capacity_check_leaves_volume_unchanged_on_failure() {
    let mut engine = formatted();

    // One demo cluster is already allocated by format(); a 507-sector
    // padding file consumes 508 more (the create_file `+1` rule), leaving
    // exactly 3 free clusters on a 512-cluster volume.
    engine.create_file(*b"PAD     ", *b"BIN", 507 * 512).unwrap();
    assert_eq!(engine.empty_clusters(u16::MAX).unwrap(), 3);

    let free_before = engine.empty_clusters(u16::MAX).unwrap();
    let result = engine.create_file(*b"BIG     ", *b"BIN", 2048);
    assert!(result.is_err());
    let free_after = engine.empty_clusters(u16::MAX).unwrap();
    assert_eq!(free_before, free_after);
}

#[test]
fn scenario_delete_then_reuse_slot() {
    let mut engine = formatted();
    let slot = engine.create_file(*b"A       ", *b"TXT", 0).unwrap();
    engine.delete_file(slot).unwrap();
    let slot2 = engine.create_file(*b"B       ", *b"TXT", 0).unwrap();
    assert_eq!(slot, slot2);
}

#[test]
fn scenario_modify_does_not_extend_the_file() {
    let mut engine = formatted();
    let slot = engine.create_file(*b"X       ", *b"TXT", 0).unwrap();
    engine.append_to_file(slot, b"0123456789").unwrap();
    engine.modify_file(slot, 8, b"abcd").unwrap();

    let info = engine.file_information(slot).unwrap();
    assert_eq!(info.file_size(), 10);

    let mut buf = [0u8; 2];
    engine.read_from_file(slot, 8, &mut buf).unwrap();
    assert_eq!(&buf, b"ab");
}

#[test]
fn scenario_resize_shrink_frees_clusters_and_terminates_chain() {
    let mut engine = formatted();
    let slot = engine.create_file(*b"Y       ", *b"TXT", 0).unwrap();
    engine.append_to_file(slot, &[0u8; 2000]).unwrap();

    let free_before = engine.empty_clusters(u16::MAX).unwrap();
    engine.resize_file(slot, 600).unwrap();
    let free_after = engine.empty_clusters(u16::MAX).unwrap();
    assert_eq!(free_after, free_before + 2);
}

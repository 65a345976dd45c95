use anyhow::{Result, bail};

use super::cartridge::{Cartridge, PRG_BANK_SIZE};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mirroring {
    Horizontal,
    Vertical,
    FourScreen,
}

/// Cartridge address translation. `read_prg` answers the CPU side of the
/// bus, `read_chr` the PPU pattern-table side. Boards without writable
/// memory keep the default no-op writes.
pub trait Mapper: std::fmt::Debug {
    fn read_prg(&mut self, addr: u16) -> u8;
    fn read_chr(&mut self, addr: u16) -> u8;
    fn write_prg(&mut self, _addr: u16, _value: u8) {}
    fn write_chr(&mut self, _addr: u16, _value: u8) {}
    fn mirroring(&self) -> Mirroring;
}

pub fn mapper_name(mapper_id: u8) -> &'static str {
    match mapper_id {
        0 => "NROM",
        _ => "Unsupported",
    }
}

pub fn create_mapper(cart: Cartridge) -> Result<Box<dyn Mapper>> {
    let mapper: Box<dyn Mapper> = match cart.mapper_id {
        0 => Box::new(Mapper0::new(cart)),
        id => bail!("mapper {id} is not supported"),
    };
    Ok(mapper)
}

/// Mapper 0 (NROM): no bank switching. One 16 KiB PRG bank is mirrored
/// across $8000-$FFFF; two banks map linearly. CHR is a flat 8 KiB.
#[derive(Debug)]
pub struct Mapper0 {
    prg_rom: Vec<u8>,
    chr: Vec<u8>,
    chr_is_ram: bool,
    prg_ram: Vec<u8>,
    mirroring: Mirroring,
}

impl Mapper0 {
    pub fn new(cart: Cartridge) -> Self {
        let prg_ram_size = cart.prg_ram_size.max(8 * 1024);
        Self {
            prg_rom: cart.prg_rom,
            chr: cart.chr_data,
            chr_is_ram: cart.chr_is_ram,
            prg_ram: vec![0; prg_ram_size],
            mirroring: cart.mirroring,
        }
    }
}

impl Mapper for Mapper0 {
    fn read_prg(&mut self, addr: u16) -> u8 {
        match addr {
            0x6000..=0x7FFF => {
                let idx = (addr as usize - 0x6000) % self.prg_ram.len();
                self.prg_ram[idx]
            }
            0x8000..=0xFFFF => {
                let mut idx = addr as usize & 0x7FFF;
                if self.prg_rom.len() == PRG_BANK_SIZE {
                    idx &= 0x3FFF;
                }
                self.prg_rom[idx]
            }
            _ => 0,
        }
    }

    fn write_prg(&mut self, addr: u16, value: u8) {
        if (0x6000..=0x7FFF).contains(&addr) {
            let idx = (addr as usize - 0x6000) % self.prg_ram.len();
            self.prg_ram[idx] = value;
        }
    }

    fn read_chr(&mut self, addr: u16) -> u8 {
        self.chr[addr as usize % self.chr.len()]
    }

    fn write_chr(&mut self, addr: u16, value: u8) {
        if self.chr_is_ram {
            let idx = addr as usize % self.chr.len();
            self.chr[idx] = value;
        }
    }

    fn mirroring(&self) -> Mirroring {
        self.mirroring
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nes::cartridge::CHR_BANK_SIZE;

    fn patterned_banks(total_size: usize, bank_size: usize) -> Vec<u8> {
        let mut data = vec![0u8; total_size];
        for (bank, chunk) in data.chunks_mut(bank_size).enumerate() {
            chunk.fill((bank as u8).wrapping_add(1));
        }
        data
    }

    fn make_cart(prg_rom: Vec<u8>, chr_data: Vec<u8>, chr_is_ram: bool) -> Cartridge {
        let prg_banks = prg_rom.len() / PRG_BANK_SIZE;
        Cartridge {
            mapper_id: 0,
            mirroring: Mirroring::Horizontal,
            has_battery_backed_ram: false,
            prg_banks,
            prg_rom,
            chr_data,
            chr_is_ram,
            prg_ram_size: 8 * 1024,
        }
    }

    #[test]
    fn single_prg_bank_mirrors_upper_half() {
        let prg = patterned_banks(PRG_BANK_SIZE, PRG_BANK_SIZE);
        let mut mapper = Mapper0::new(make_cart(prg, vec![0; CHR_BANK_SIZE], false));

        assert_eq!(mapper.read_prg(0x8000), 1);
        assert_eq!(mapper.read_prg(0xC000), 1);
        assert_eq!(mapper.read_prg(0xFFFF), 1);
    }

    #[test]
    fn double_prg_bank_maps_linearly() {
        let prg = patterned_banks(2 * PRG_BANK_SIZE, PRG_BANK_SIZE);
        let mut mapper = Mapper0::new(make_cart(prg, vec![0; CHR_BANK_SIZE], false));

        assert_eq!(mapper.read_prg(0x8000), 1);
        assert_eq!(mapper.read_prg(0xC000), 2);
    }

    #[test]
    fn prg_rom_ignores_writes() {
        let prg = patterned_banks(PRG_BANK_SIZE, PRG_BANK_SIZE);
        let mut mapper = Mapper0::new(make_cart(prg, vec![0; CHR_BANK_SIZE], false));

        mapper.write_prg(0x8000, 0x55);
        assert_eq!(mapper.read_prg(0x8000), 1);
    }

    #[test]
    fn prg_ram_window_round_trips() {
        let prg = patterned_banks(PRG_BANK_SIZE, PRG_BANK_SIZE);
        let mut mapper = Mapper0::new(make_cart(prg, vec![0; CHR_BANK_SIZE], false));

        mapper.write_prg(0x6123, 0xA5);
        assert_eq!(mapper.read_prg(0x6123), 0xA5);
    }

    #[test]
    fn chr_rom_is_write_protected() {
        let prg = patterned_banks(PRG_BANK_SIZE, PRG_BANK_SIZE);
        let chr = patterned_banks(CHR_BANK_SIZE, CHR_BANK_SIZE);
        let mut mapper = Mapper0::new(make_cart(prg, chr, false));

        mapper.write_chr(0x0010, 0xAB);
        assert_eq!(mapper.read_chr(0x0010), 1);
    }

    #[test]
    fn chr_ram_accepts_writes() {
        let prg = patterned_banks(PRG_BANK_SIZE, PRG_BANK_SIZE);
        let mut mapper = Mapper0::new(make_cart(prg, vec![0; CHR_BANK_SIZE], true));

        mapper.write_chr(0x0010, 0xAB);
        assert_eq!(mapper.read_chr(0x0010), 0xAB);
    }

    #[test]
    fn unsupported_mapper_fails_cleanly() {
        let prg = patterned_banks(PRG_BANK_SIZE, PRG_BANK_SIZE);
        let mut cart = make_cart(prg, vec![0; CHR_BANK_SIZE], false);
        cart.mapper_id = 4;

        let err = create_mapper(cart).unwrap_err();
        assert!(err.to_string().contains("mapper 4"));
    }

    #[test]
    fn mirroring_comes_from_the_header() {
        let prg = patterned_banks(PRG_BANK_SIZE, PRG_BANK_SIZE);
        let mut cart = make_cart(prg, vec![0; CHR_BANK_SIZE], false);
        cart.mirroring = Mirroring::Vertical;

        let mapper = Mapper0::new(cart);
        assert_eq!(mapper.mirroring(), Mirroring::Vertical);
    }
}

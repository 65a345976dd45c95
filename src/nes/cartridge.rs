use anyhow::{Context, Result, bail};
use std::{fs, path::Path};

use super::mapper::Mirroring;

pub const PRG_BANK_SIZE: usize = 16 * 1024;
pub const CHR_BANK_SIZE: usize = 8 * 1024;
pub const PRG_RAM_BANK_SIZE: usize = 8 * 1024;

/// A parsed iNES cartridge image: raw PRG/CHR payloads plus the header
/// facts the mapper needs. Bank selection itself lives in `mapper`.
#[derive(Debug, Clone)]
pub struct Cartridge {
    pub mapper_id: u8,
    pub mirroring: Mirroring,
    pub has_battery_backed_ram: bool,
    pub prg_banks: usize,
    pub prg_rom: Vec<u8>,
    pub chr_data: Vec<u8>,
    pub chr_is_ram: bool,
    pub prg_ram_size: usize,
}

impl Cartridge {
    pub fn from_file(path: &Path) -> Result<Self> {
        let bytes =
            fs::read(path).with_context(|| format!("failed to read ROM: {}", path.display()))?;
        Self::from_bytes(&bytes)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < 16 {
            bail!("ROM is too small to contain an iNES header");
        }
        if &bytes[0..4] != b"NES\x1A" {
            bail!("invalid iNES header magic, expected NES<EOF>");
        }

        let prg_banks = (bytes[4] as usize).max(1);
        let chr_banks = bytes[5] as usize;
        let flags6 = bytes[6];
        let flags7 = bytes[7];

        let mapper_id = (flags7 & 0xF0) | (flags6 >> 4);
        let four_screen = (flags6 & 0x08) != 0;
        let mirroring = if four_screen {
            Mirroring::FourScreen
        } else if (flags6 & 0x01) != 0 {
            Mirroring::Vertical
        } else {
            Mirroring::Horizontal
        };

        let has_battery_backed_ram = (flags6 & 0x02) != 0;
        let trainer_present = (flags6 & 0x04) != 0;

        let prg_ram_banks = if bytes[8] == 0 { 1 } else { bytes[8] as usize };
        let prg_ram_size = prg_ram_banks * PRG_RAM_BANK_SIZE;

        let prg_rom_size = prg_banks * PRG_BANK_SIZE;
        let chr_rom_size = chr_banks * CHR_BANK_SIZE;

        let mut cursor = 16usize;
        if trainer_present {
            cursor += 512;
        }

        if bytes.len() < cursor + prg_rom_size {
            bail!(
                "ROM truncated: expected {} PRG bytes but file ended early",
                prg_rom_size
            );
        }
        let prg_rom = bytes[cursor..cursor + prg_rom_size].to_vec();
        cursor += prg_rom_size;

        // No CHR banks means the board carries 8 KiB of CHR RAM instead.
        let (chr_data, chr_is_ram) = if chr_rom_size == 0 {
            (vec![0; CHR_BANK_SIZE], true)
        } else {
            if bytes.len() < cursor + chr_rom_size {
                bail!(
                    "ROM truncated: expected {} CHR bytes but file ended early",
                    chr_rom_size
                );
            }
            (bytes[cursor..cursor + chr_rom_size].to_vec(), false)
        };

        Ok(Self {
            mapper_id,
            mirroring,
            has_battery_backed_ram,
            prg_banks,
            prg_rom,
            chr_data,
            chr_is_ram,
            prg_ram_size,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ines_image(prg_banks: u8, chr_banks: u8, flags6: u8, flags7: u8) -> Vec<u8> {
        let mut bytes = vec![0u8; 16];
        bytes[0..4].copy_from_slice(b"NES\x1A");
        bytes[4] = prg_banks;
        bytes[5] = chr_banks;
        bytes[6] = flags6;
        bytes[7] = flags7;
        bytes.extend(vec![0u8; prg_banks as usize * PRG_BANK_SIZE]);
        bytes.extend(vec![0u8; chr_banks as usize * CHR_BANK_SIZE]);
        bytes
    }

    #[test]
    fn rejects_bad_preamble() {
        let mut bytes = ines_image(1, 1, 0, 0);
        bytes[0] = b'X';
        let err = Cartridge::from_bytes(&bytes).unwrap_err();
        assert!(err.to_string().contains("magic"));
    }

    #[test]
    fn rejects_short_header() {
        assert!(Cartridge::from_bytes(b"NES\x1A").is_err());
    }

    #[test]
    fn rejects_truncated_prg() {
        let mut bytes = ines_image(2, 1, 0, 0);
        bytes.truncate(16 + PRG_BANK_SIZE);
        let err = Cartridge::from_bytes(&bytes).unwrap_err();
        assert!(err.to_string().contains("PRG"));
    }

    #[test]
    fn rejects_truncated_chr() {
        let mut bytes = ines_image(1, 1, 0, 0);
        bytes.truncate(16 + PRG_BANK_SIZE + 100);
        let err = Cartridge::from_bytes(&bytes).unwrap_err();
        assert!(err.to_string().contains("CHR"));
    }

    #[test]
    fn mapper_id_combines_header_nibbles() {
        let bytes = ines_image(1, 1, 0x40, 0x20);
        let cart = Cartridge::from_bytes(&bytes).unwrap();
        assert_eq!(cart.mapper_id, 0x24);
    }

    #[test]
    fn mirroring_follows_flags() {
        let horizontal = Cartridge::from_bytes(&ines_image(1, 1, 0x00, 0)).unwrap();
        assert_eq!(horizontal.mirroring, Mirroring::Horizontal);

        let vertical = Cartridge::from_bytes(&ines_image(1, 1, 0x01, 0)).unwrap();
        assert_eq!(vertical.mirroring, Mirroring::Vertical);

        // Four-screen overrides the horizontal/vertical bit.
        let four = Cartridge::from_bytes(&ines_image(1, 1, 0x09, 0)).unwrap();
        assert_eq!(four.mirroring, Mirroring::FourScreen);
    }

    #[test]
    fn trainer_is_skipped() {
        let mut bytes = vec![0u8; 16];
        bytes[0..4].copy_from_slice(b"NES\x1A");
        bytes[4] = 1;
        bytes[5] = 1;
        bytes[6] = 0x04;
        bytes.extend(vec![0xEE; 512]);
        let mut prg = vec![0u8; PRG_BANK_SIZE];
        prg[0] = 0xAB;
        bytes.extend(prg);
        bytes.extend(vec![0u8; CHR_BANK_SIZE]);

        let cart = Cartridge::from_bytes(&bytes).unwrap();
        assert_eq!(cart.prg_rom[0], 0xAB);
    }

    #[test]
    fn zero_chr_banks_allocates_chr_ram() {
        let cart = Cartridge::from_bytes(&ines_image(1, 0, 0, 0)).unwrap();
        assert!(cart.chr_is_ram);
        assert_eq!(cart.chr_data.len(), CHR_BANK_SIZE);
    }

    #[test]
    fn prg_ram_defaults_to_one_bank() {
        let cart = Cartridge::from_bytes(&ines_image(1, 1, 0, 0)).unwrap();
        assert_eq!(cart.prg_ram_size, PRG_RAM_BANK_SIZE);
    }
}

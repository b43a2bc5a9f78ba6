//! Static id-to-name lookup tables for board partners, memory types and
//! memory makers. A miss is an ordinary `None`, callers decide how to
//! render unknown hardware.

/// PCI subsystem vendor id → board partner name.
pub fn board_partner(id: u16) -> Option<&'static str> {
    match id {
        0x8086 => Some("Intel"),
        0x1002 => Some("AMD"),
        0x10DE => Some("NVIDIA"),
        0x1043 => Some("ASUS"),
        0x1458 => Some("Gigabyte"),
        0x1462 => Some("MSI"),
        0x196E => Some("PNY"),
        0x3842 => Some("EVGA"),
        0x19DA => Some("Zotac"),
        0x1DA2 => Some("Palit"),
        0x1787 => Some("Sapphire"),
        0x174B => Some("Sapphire"),
        0x1682 => Some("XFX"),
        0x148C => Some("PowerColor"),
        0x17AA => Some("Lenovo"),
        0x1028 => Some("Dell"),
        0x103C => Some("HP"),
        _ => None,
    }
}

/// SMBIOS memory type code (Win32_PhysicalMemory.SMBIOSMemoryType) → name.
/// Codes Windows never reported in practice are omitted; an unmapped code
/// maps to "Unknown" rather than a miss so the report still shows the row.
pub fn smbios_memory_type(code: u16) -> &'static str {
    match code {
        19 => "SDRAM",
        20 => "DDR",
        21 => "DDR2",
        22 => "DDR2 FB-DIMM",
        23 | 24 => "DDR3",
        26 => "DDR4",
        27 => "LPDDR",
        28 => "LPDDR2",
        29 => "LPDDR3",
        30 => "DDR5",
        34 => "DDR5",
        35 => "LPDDR5",
        _ => "Unknown",
    }
}

/// NVIDIA driver RAM type code → marketing name.
pub fn nv_ram_type(code: u32) -> Option<&'static str> {
    match code {
        1 => Some("SDRAM"),
        2 => Some("DDR"),
        3 => Some("DDR2"),
        4 => Some("GDDR2"),
        5 => Some("GDDR3"),
        6 => Some("GDDR4"),
        7 => Some("DDR3"),
        8 => Some("GDDR5"),
        9 => Some("LPDDR2"),
        10 => Some("GDDR5X"),
        14 => Some("GDDR6"),
        15 => Some("GDDR6X"),
        _ => None,
    }
}

/// NVIDIA driver RAM maker code → memory chip manufacturer.
pub fn nv_ram_maker(code: u32) -> Option<&'static str> {
    match code {
        1 => Some("Samsung"),
        2 => Some("Qimonda"),
        3 => Some("Elpida"),
        4 => Some("Etron"),
        5 => Some("Nanya"),
        6 => Some("Hynix"),
        7 => Some("Mosel"),
        8 => Some("Winbond"),
        9 => Some("Elite"),
        10 => Some("Micron"),
        _ => None,
    }
}

/// Intel graphics control library memory-type enum → name.
pub fn igcl_memory_type(code: u32) -> Option<&'static str> {
    match code {
        0 => Some("DDR3"),
        1 => Some("DDR4"),
        2 => Some("DDR5"),
        3 => Some("LPDDR3"),
        4 => Some("LPDDR4"),
        5 => Some("LPDDR5"),
        6 => Some("GDDR5"),
        7 => Some("GDDR6"),
        8 => Some("GDDR6X"),
        9 => Some("HBM"),
        10 => Some("HBM2"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn board_partner_known_ids() {
        assert_eq!(board_partner(0x196E), Some("PNY"));
        assert_eq!(board_partner(0x1043), Some("ASUS"));
        assert_eq!(board_partner(0x174B), Some("Sapphire"));
        assert_eq!(board_partner(0x1787), Some("Sapphire"));
    }

    #[test]
    fn board_partner_miss_is_none() {
        assert_eq!(board_partner(0x0000), None);
        assert_eq!(board_partner(0xFFFF), None);
        assert_eq!(board_partner(0x1234), None);
    }

    #[test]
    fn smbios_memory_type_maps_and_defaults() {
        assert_eq!(smbios_memory_type(23), "DDR3");
        assert_eq!(smbios_memory_type(24), "DDR3");
        assert_eq!(smbios_memory_type(26), "DDR4");
        assert_eq!(smbios_memory_type(30), "DDR5");
        assert_eq!(smbios_memory_type(34), "DDR5");
        assert_eq!(smbios_memory_type(0), "Unknown");
        assert_eq!(smbios_memory_type(99), "Unknown");
    }

    #[test]
    fn nv_ram_tables() {
        assert_eq!(nv_ram_type(8), Some("GDDR5"));
        assert_eq!(nv_ram_type(15), Some("GDDR6X"));
        assert_eq!(nv_ram_type(11), None);
        assert_eq!(nv_ram_maker(1), Some("Samsung"));
        assert_eq!(nv_ram_maker(10), Some("Micron"));
        assert_eq!(nv_ram_maker(0), None);
    }

    #[test]
    fn igcl_memory_type_bounds() {
        assert_eq!(igcl_memory_type(0), Some("DDR3"));
        assert_eq!(igcl_memory_type(5), Some("LPDDR5"));
        assert_eq!(igcl_memory_type(6), Some("GDDR5"));
        assert_eq!(igcl_memory_type(7), Some("GDDR6"));
        assert_eq!(igcl_memory_type(8), Some("GDDR6X"));
        assert_eq!(igcl_memory_type(9), Some("HBM"));
        assert_eq!(igcl_memory_type(10), Some("HBM2"));
        assert_eq!(igcl_memory_type(11), None);
    }
}

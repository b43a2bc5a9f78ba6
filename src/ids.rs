//! Pure parsers for PCI/PNP identifier strings.
//!
//! Hardware ids look like `PCI\VEN_10DE&DEV_2489&SUBSYS_2489196E&REV_A1`.
//! Every parser either yields a complete value or nothing; no partial
//! results leak out of a malformed token.

/// Extract the subsystem vendor id from the `SUBSYS_ssssnnnn` token.
/// The token carries 8 hex digits: subsystem device id then vendor id;
/// the lower 16 bits are the board partner. Missing token or a non-hex
/// digit anywhere in the 8 means no value.
pub fn subsystem_vendor(hwid: &str) -> Option<u16> {
    let start = hwid.find("SUBSYS_")? + "SUBSYS_".len();
    let digits = hwid.get(start..start + 8)?;
    let mut subsys: u32 = 0;
    for ch in digits.chars() {
        subsys = (subsys << 4) | ch.to_digit(16)?;
    }
    Some((subsys & 0xFFFF) as u16)
}

/// Extract the PCI vendor id from the `VEN_xxxx` token.
pub fn pci_vendor(hwid: &str) -> Option<u16> {
    let start = hwid.find("VEN_")? + "VEN_".len();
    let digits = hwid.get(start..start + 4)?;
    u16::from_str_radix(digits, 16).ok()
}

/// Format the `REV_xx` token as `"Rev. xx"`. Absent or truncated tokens
/// fall back to `"Rev. 00"`; callers never see failure here.
pub fn revision(hwid: &str) -> String {
    if let Some(pos) = hwid.find("REV_")
        && let Some(rev) = hwid.get(pos + 4..pos + 6)
    {
        return format!("Rev. {rev}");
    }
    "Rev. 00".to_string()
}

const CHIPSET_LETTERS: &[char] = &['A', 'B', 'X', 'H', 'Z', 'Q', 'P'];

/// Scan free text for a chipset code: one allowed letter followed by three
/// digits (B550, Z690, X570...). First match scanning left to right.
pub fn chipset_code(text: &str) -> Option<&str> {
    let bytes = text.as_bytes();
    for i in 0..bytes.len().saturating_sub(3) {
        let c0 = bytes[i] as char;
        if CHIPSET_LETTERS.contains(&c0)
            && bytes[i + 1].is_ascii_digit()
            && bytes[i + 2].is_ascii_digit()
            && bytes[i + 3].is_ascii_digit()
        {
            return Some(&text[i..i + 4]);
        }
    }
    None
}

/// Guess a GPU/chip vendor from a free-text device description.
/// Case-sensitive on purpose: the brand tokens are spelled consistently in
/// driver-provided descriptions, and "amd" would match inside random words.
pub fn vendor_from_description(desc: &str) -> Option<&'static str> {
    if desc.contains("NVIDIA") {
        return Some("NVIDIA");
    }
    if desc.contains("Intel") {
        return Some("Intel");
    }
    if desc.contains("AMD") || desc.contains("Advanced Micro Devices") {
        return Some("AMD");
    }
    None
}

/// Name a southbridge vendor from its PCI vendor id. Misses keep the raw
/// id visible rather than hiding it behind "Unknown".
pub fn pci_vendor_name(id: u16) -> String {
    match id {
        0x1022 => "AMD".to_string(),
        0x8086 => "Intel".to_string(),
        0x10DE => "NVIDIA".to_string(),
        0x1106 => "VIA".to_string(),
        other => format!("VEN_{other:04X}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subsystem_vendor_parses_lower_16_bits() {
        let id = r"PCI\VEN_10DE&DEV_2489&SUBSYS_2489196E&REV_A1";
        assert_eq!(subsystem_vendor(id), Some(0x196E));
    }

    #[test]
    fn subsystem_vendor_rejects_malformed() {
        assert_eq!(subsystem_vendor(r"PCI\VEN_10DE&DEV_2489"), None);
        // truncated hex run
        assert_eq!(subsystem_vendor(r"PCI\SUBSYS_1234"), None);
        // non-hex digit inside the 8
        assert_eq!(subsystem_vendor(r"PCI\SUBSYS_2489Z96E&REV_A1"), None);
        assert_eq!(subsystem_vendor("SUBSYS_"), None);
        assert_eq!(subsystem_vendor(""), None);
    }

    #[test]
    fn pci_vendor_parses() {
        assert_eq!(pci_vendor(r"PCI\VEN_8086&DEV_7A84"), Some(0x8086));
        assert_eq!(pci_vendor(r"PCI\VEN_zzzz&DEV_7A84"), None);
        assert_eq!(pci_vendor(r"ACPI\PNP0C0A"), None);
    }

    #[test]
    fn revision_formats_or_defaults() {
        assert_eq!(revision(r"PCI\VEN_1022&DEV_790E&REV_51"), "Rev. 51");
        assert_eq!(revision(r"PCI\VEN_1022&DEV_790E"), "Rev. 00");
        assert_eq!(revision("REV_"), "Rev. 00");
        assert_eq!(revision("REV_5"), "Rev. 00");
    }

    #[test]
    fn chipset_code_first_match() {
        assert_eq!(chipset_code("Gigabyte B550 AORUS ELITE"), Some("B550"));
        assert_eq!(chipset_code("Z790 Gaming X"), Some("Z790"));
        assert_eq!(chipset_code("X570 or B550"), Some("X570"));
        assert_eq!(chipset_code("PRIME H610M-K"), Some("H610"));
        assert_eq!(chipset_code("To Be Filled By O.E.M."), None);
        assert_eq!(chipset_code("B55"), None);
    }

    #[test]
    fn vendor_guess_is_case_sensitive() {
        assert_eq!(vendor_from_description("NVIDIA GeForce RTX 3060"), Some("NVIDIA"));
        assert_eq!(vendor_from_description("Intel(R) UHD Graphics 770"), Some("Intel"));
        assert_eq!(
            vendor_from_description("Advanced Micro Devices SMBus"),
            Some("AMD")
        );
        assert_eq!(vendor_from_description("nvidia lowercase"), None);
        assert_eq!(vendor_from_description("Standard VGA"), None);
    }

    #[test]
    fn pci_vendor_name_known_and_raw() {
        assert_eq!(pci_vendor_name(0x1022), "AMD");
        assert_eq!(pci_vendor_name(0x8086), "Intel");
        assert_eq!(pci_vendor_name(0x1B21), "VEN_1B21");
    }
}

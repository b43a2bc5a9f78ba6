//! Mainboard identity: baseboard strings, BIOS, bus capabilities and the
//! chipset/southbridge rows.
//!
//! Neither Windows nor the vendor SDKs name the chipset outright, so the
//! identity is reconstructed: the CPU names the northbridge generation
//! (it has been on-die since Sandy Bridge and Zen) and a keyword scan of
//! the PnP device tree picks the device standing in for the hub.

use crate::{cpu, ids};

/// One enumerated PnP device with a PCI-style hardware id.
#[derive(Debug, Clone, PartialEq)]
pub struct PnpDevice {
    pub hardware_id: String,
    pub description: String,
}

/// One chipset table row.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct ChipsetRow {
    pub label: &'static str,
    pub vendor: String,
    pub model: String,
    pub revision: String,
}

/// Root-complex likelihood of a device description. The Portuguese
/// keywords cover localized Windows installs that spell out the device
/// class in the system language.
pub fn chipset_score(desc: &str) -> u32 {
    let mut score = 0;
    if desc.contains("Root Complex") {
        score += 8;
    }
    if desc.contains("Root Port") {
        score += 5;
    }
    if desc.contains("Root Bridge") {
        score += 5;
    }
    if desc.contains("Host Bridge") {
        score += 5;
    }
    if desc.contains("Host CPU bridge") {
        score += 5;
    }
    if desc.contains("PCI Express Root") {
        score += 4;
    }
    if desc.contains("Complexo da Raiz") {
        score += 6;
    }
    if desc.contains("Controlador de raiz") {
        score += 4;
    }
    score
}

/// Southbridge/PCH likelihood of a device description.
pub fn southbridge_score(desc: &str) -> u32 {
    let mut score = 0;
    if desc.contains("Southbridge") {
        score += 8;
    }
    if desc.contains("PCH") {
        score += 6;
    }
    if desc.contains("FCH") {
        score += 6;
    }
    if desc.contains("Platform Controller") {
        score += 6;
    }
    if desc.contains("SMBus") {
        score += 5;
    }
    if desc.contains("LPC") {
        score += 5;
    }
    if desc.contains("ISA bridge") || desc.contains("ISA Bridge") {
        score += 5;
    }
    if desc.contains("SATA Controller") || desc.contains("Serial ATA Controller") {
        score += 4;
    }
    if desc.contains("USB Controller") {
        score += 3;
    }
    score
}

/// Highest-scoring device; equal scores keep the earlier device, and a
/// zero score never wins.
pub fn best_scored<'a>(
    devices: &'a [PnpDevice],
    score: impl Fn(&str) -> u32,
) -> Option<&'a PnpDevice> {
    let mut best: Option<(&PnpDevice, u32)> = None;
    for dev in devices {
        let s = score(&dev.description);
        if s == 0 {
            continue;
        }
        if best.is_none_or(|(_, b)| s > b) {
            best = Some((dev, s));
        }
    }
    best.map(|(dev, _)| dev)
}

/// Chipset row from CPU identity plus the enumerated device tree.
/// The CPU names vendor and model; the device tree only contributes the
/// silicon revision of the root complex.
pub fn chipset_identity(devices: &[PnpDevice], id: Option<&cpu::CpuIdentity>) -> ChipsetRow {
    let (vendor, model) = match id {
        Some(id) => {
            let vendor = cpu::vendor_name(&id.vendor_id);
            let model = cpu::chipset_model(vendor, &id.brand, id.family, id.model);
            (vendor.to_string(), model)
        }
        None => ("Unknown".to_string(), "Chipset".to_string()),
    };
    let revision = best_scored(devices, chipset_score)
        .map(|dev| ids::revision(&dev.hardware_id))
        .unwrap_or_else(|| "Rev. 00".to_string());
    ChipsetRow { label: "Chipset", vendor, model, revision }
}

/// Southbridge row from the enumerated device tree. `board_product` is
/// the motherboard product string, a second chance at a chipset code when
/// the winning device description does not carry one.
pub fn southbridge_identity(
    devices: &[PnpDevice],
    board_product: Option<&str>,
) -> Option<ChipsetRow> {
    let dev = best_scored(devices, southbridge_score)?;
    let vendor = match ids::pci_vendor(&dev.hardware_id) {
        Some(id) => ids::pci_vendor_name(id),
        None => ids::vendor_from_description(&dev.description)
            .unwrap_or("Unknown")
            .to_string(),
    };
    let model = ids::chipset_code(&dev.description)
        .or_else(|| board_product.and_then(ids::chipset_code))
        .map(str::to_string)
        .unwrap_or_else(|| dev.description.clone());
    let revision = ids::revision(&dev.hardware_id);
    Some(ChipsetRow { label: "Southbridge", vendor, model, revision })
}

/// Always two rows, chipset then southbridge, each independently falling
/// back to generic text when nothing usable was found.
pub fn build_chipset_rows(
    devices: &[PnpDevice],
    id: Option<&cpu::CpuIdentity>,
    board_product: Option<&str>,
) -> Vec<ChipsetRow> {
    let chipset = chipset_identity(devices, id);
    let south = southbridge_identity(devices, board_product).unwrap_or(ChipsetRow {
        label: "Southbridge",
        vendor: "Unknown".to_string(),
        model: "Southbridge".to_string(),
        revision: "Rev. 00".to_string(),
    });
    vec![chipset, south]
}

/// Bus capability string from the probe outcomes. The fixed PCIe 3.0 text
/// needs both registry keys; the class key alone proves nothing, so that
/// case is decided by the WMI bus table like any other.
pub fn classify_bus(class_key: bool, pci_bus_key: bool, wmi_pcie: bool) -> &'static str {
    if class_key && pci_bus_key {
        return "PCI-Express 3.0 (8.0 GT/s)";
    }
    if wmi_pcie { "PCI-Express" } else { "PCI" }
}

/// Reformat a CIM datetime (`YYYYMMDDHHMMSS.mmmmmm+UUU`) as `DD/MM/YYYY`.
pub fn format_cim_date(raw: &str) -> Option<String> {
    if raw.len() < 8 || !raw[..8].bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some(format!("{}/{}/{}", &raw[6..8], &raw[4..6], &raw[..4]))
}

#[cfg(windows)]
mod probes {
    use super::PnpDevice;
    use crate::wmi_util;
    use winreg::RegKey;
    use winreg::enums::HKEY_LOCAL_MACHINE;

    fn baseboard_field(field: &str) -> Option<String> {
        #[derive(serde::Deserialize)]
        struct Row {
            #[serde(rename = "Manufacturer")]
            manufacturer: Option<String>,
            #[serde(rename = "Product")]
            product: Option<String>,
        }
        let rows = wmi_util::query::<Row>("SELECT Manufacturer, Product FROM Win32_BaseBoard")?;
        let row = rows.into_iter().next()?;
        let value = match field {
            "Manufacturer" => row.manufacturer,
            _ => row.product,
        }?;
        let value = value.trim().to_string();
        if value.is_empty() { None } else { Some(value) }
    }

    pub fn manufacturer() -> Option<String> {
        baseboard_field("Manufacturer")
    }

    pub fn model() -> Option<String> {
        baseboard_field("Product")
    }

    fn bios_field(select: &str) -> Option<String> {
        #[derive(serde::Deserialize)]
        struct Row {
            #[serde(rename = "Manufacturer")]
            manufacturer: Option<String>,
            #[serde(rename = "SMBIOSBIOSVersion")]
            version: Option<String>,
            #[serde(rename = "ReleaseDate")]
            release_date: Option<String>,
        }
        let rows = wmi_util::query::<Row>(
            "SELECT Manufacturer, SMBIOSBIOSVersion, ReleaseDate FROM Win32_BIOS",
        )?;
        let row = rows.into_iter().next()?;
        match select {
            "Manufacturer" => row.manufacturer,
            "SMBIOSBIOSVersion" => row.version,
            _ => row.release_date,
        }
    }

    pub fn bios_brand() -> Option<String> {
        bios_field("Manufacturer")
    }

    pub fn bios_version() -> Option<String> {
        bios_field("SMBIOSBIOSVersion")
    }

    pub fn bios_date() -> Option<String> {
        let raw = bios_field("ReleaseDate")?;
        super::format_cim_date(&raw)
    }

    const PCI_CLASS_KEY: &str =
        r"SYSTEM\CurrentControlSet\Control\Class\{4d36e97d-e325-11ce-bfc1-08002be10318}";
    const PCI_BUS_KEY: &str = r"HARDWARE\DESCRIPTION\System\MultifunctionAdapter\0\PCIBus\0";

    /// Bus capability string. Generation detection is approximate: a
    /// visible PCI bus node is reported as PCIe 3.0 because the registry
    /// does not record the negotiated link rate.
    pub fn bus_specs() -> String {
        let hklm = RegKey::predef(HKEY_LOCAL_MACHINE);
        let class_key = hklm.open_subkey(PCI_CLASS_KEY).is_ok();
        let pci_bus_key = class_key && hklm.open_subkey(PCI_BUS_KEY).is_ok();
        if class_key && pci_bus_key {
            return super::classify_bus(class_key, pci_bus_key, false).to_string();
        }

        #[derive(serde::Deserialize)]
        struct Row {
            #[serde(rename = "BusType")]
            _bus_type: Option<i64>,
        }
        let has_pcie = wmi_util::query::<Row>("SELECT BusType FROM Win32_Bus WHERE BusType=5")
            .map(|rows| !rows.is_empty())
            .unwrap_or(false);
        super::classify_bus(class_key, pci_bus_key, has_pcie).to_string()
    }

    /// Motherboard product string as the firmware reported it to Windows.
    pub fn baseboard_product_from_registry() -> Option<String> {
        let hklm = RegKey::predef(HKEY_LOCAL_MACHINE);
        let key = hklm.open_subkey(r"HARDWARE\DESCRIPTION\System\BIOS").ok()?;
        let product: String = key.get_value("BaseBoardProduct").ok()?;
        let product = product.trim().to_string();
        if product.is_empty() { None } else { Some(product) }
    }

    /// Every PnP device carrying a PCI-style VEN_ hardware id.
    pub fn pnp_devices() -> Vec<PnpDevice> {
        #[derive(serde::Deserialize)]
        struct Row {
            #[serde(rename = "PNPDeviceID")]
            pnp_device_id: Option<String>,
            #[serde(rename = "Description")]
            description: Option<String>,
        }
        wmi_util::query::<Row>("SELECT PNPDeviceID, Description FROM Win32_PnPEntity")
            .unwrap_or_default()
            .into_iter()
            .filter_map(|r| {
                let id = r.pnp_device_id?;
                if !id.contains("VEN_") {
                    return None;
                }
                Some(PnpDevice { hardware_id: id, description: r.description? })
            })
            .collect()
    }
}

#[cfg(windows)]
pub use probes::{
    baseboard_product_from_registry, bios_brand, bios_date, bios_version, bus_specs,
    manufacturer, model, pnp_devices,
};

#[cfg(not(windows))]
mod probes {
    use super::PnpDevice;

    pub fn manufacturer() -> Option<String> {
        None
    }
    pub fn model() -> Option<String> {
        None
    }
    pub fn bios_brand() -> Option<String> {
        None
    }
    pub fn bios_version() -> Option<String> {
        None
    }
    pub fn bios_date() -> Option<String> {
        None
    }
    pub fn bus_specs() -> String {
        "PCI".to_string()
    }
    pub fn baseboard_product_from_registry() -> Option<String> {
        None
    }
    pub fn pnp_devices() -> Vec<PnpDevice> {
        Vec::new()
    }
}

#[cfg(not(windows))]
pub use probes::{
    baseboard_product_from_registry, bios_brand, bios_date, bios_version, bus_specs,
    manufacturer, model, pnp_devices,
};

/// The two chipset rows against the live system.
pub fn chipset_rows() -> Vec<ChipsetRow> {
    let devices = pnp_devices();
    let id = cpu::identity();
    let product = baseboard_product_from_registry();
    build_chipset_rows(&devices, id.as_ref(), product.as_deref())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dev(hwid: &str, desc: &str) -> PnpDevice {
        PnpDevice { hardware_id: hwid.to_string(), description: desc.to_string() }
    }

    fn ryzen_identity() -> cpu::CpuIdentity {
        cpu::CpuIdentity {
            vendor_id: "AuthenticAMD".to_string(),
            brand: "AMD Ryzen 7 5800X 8-Core Processor".to_string(),
            family: 0x19,
            model: 0x21,
            stepping: 0,
        }
    }

    #[test]
    fn scoring_accumulates_keywords() {
        assert_eq!(chipset_score("AMD PCI Express Root Complex"), 12);
        assert_eq!(chipset_score("Intel Host Bridge"), 5);
        assert_eq!(chipset_score("Realtek Audio"), 0);
        assert_eq!(southbridge_score("AMD SMBus"), 5);
        assert_eq!(
            southbridge_score("Intel(R) Platform Controller Hub PCH SMBus"),
            17
        );
    }

    #[test]
    fn best_scored_keeps_first_at_equal_score() {
        let devices = vec![
            dev(r"PCI\VEN_1022&DEV_790B&REV_51", "First SMBus"),
            dev(r"PCI\VEN_1022&DEV_790C&REV_61", "Second SMBus"),
        ];
        let best = best_scored(&devices, southbridge_score).unwrap();
        assert_eq!(best.description, "First SMBus");
    }

    #[test]
    fn best_scored_ignores_zero() {
        let devices = vec![dev(r"PCI\VEN_10EC&DEV_8168", "Realtek NIC")];
        assert!(best_scored(&devices, southbridge_score).is_none());
    }

    #[test]
    fn chipset_identity_from_ryzen() {
        let devices = vec![dev(
            r"PCI\VEN_1022&DEV_1480&SUBSYS_14801022&REV_01",
            "AMD PCI Express Root Complex",
        )];
        let id = ryzen_identity();
        let row = chipset_identity(&devices, Some(&id));
        assert_eq!(row.vendor, "AMD");
        assert_eq!(row.model, "Ryzen SOC");
        assert_eq!(row.revision, "Rev. 01");
    }

    #[test]
    fn chipset_identity_without_cpu_or_devices() {
        let row = chipset_identity(&[], None);
        assert_eq!(row.vendor, "Unknown");
        assert_eq!(row.model, "Chipset");
        assert_eq!(row.revision, "Rev. 00");
    }

    #[test]
    fn southbridge_model_prefers_description_code() {
        let devices = vec![dev(
            r"PCI\VEN_1022&DEV_790B&REV_61",
            "AMD B550 Chipset SMBus",
        )];
        let row = southbridge_identity(&devices, Some("X570 AORUS MASTER")).unwrap();
        assert_eq!(row.vendor, "AMD");
        assert_eq!(row.model, "B550");
        assert_eq!(row.revision, "Rev. 61");
    }

    #[test]
    fn southbridge_model_falls_back_to_board_product() {
        let devices = vec![dev(r"PCI\VEN_1022&DEV_790B&REV_61", "AMD SMBus")];
        let row = southbridge_identity(&devices, Some("B550 AORUS ELITE")).unwrap();
        assert_eq!(row.model, "B550");
    }

    #[test]
    fn southbridge_model_last_resort_is_description() {
        let devices = vec![dev(r"PCI\VEN_8086&DEV_7A23&REV_11", "Intel SMBus Controller")];
        let row = southbridge_identity(&devices, None).unwrap();
        assert_eq!(row.vendor, "Intel");
        assert_eq!(row.model, "Intel SMBus Controller");
    }

    #[test]
    fn southbridge_vendor_guess_without_ven_token() {
        let devices = vec![dev("ROOT\\UNKNOWN", "NVIDIA nForce PCH SMBus")];
        let row = southbridge_identity(&devices, None).unwrap();
        assert_eq!(row.vendor, "NVIDIA");
    }

    #[test]
    fn rows_are_always_two_in_fixed_order() {
        let rows = build_chipset_rows(&[], None, None);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].label, "Chipset");
        assert_eq!(rows[1].label, "Southbridge");
        assert_eq!(rows[1].model, "Southbridge");

        let id = ryzen_identity();
        let devices = vec![
            dev(r"PCI\VEN_1022&DEV_1480&REV_01", "AMD PCI Express Root Complex"),
            dev(r"PCI\VEN_1022&DEV_790B&REV_61", "AMD SMBus"),
        ];
        let rows = build_chipset_rows(&devices, Some(&id), Some("B550M DS3H"));
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].model, "Ryzen SOC");
        assert_eq!(rows[1].model, "B550");
    }

    #[test]
    fn bus_class_key_alone_defers_to_wmi() {
        // the hardcoded PCIe 3.0 text needs both registry keys
        assert_eq!(classify_bus(true, true, false), "PCI-Express 3.0 (8.0 GT/s)");
        // class key without the PCIBus node: WMI decides
        assert_eq!(classify_bus(true, false, true), "PCI-Express");
        assert_eq!(classify_bus(true, false, false), "PCI");
        // no registry evidence at all
        assert_eq!(classify_bus(false, false, true), "PCI-Express");
        assert_eq!(classify_bus(false, false, false), "PCI");
    }

    #[test]
    fn cim_date_reformat() {
        assert_eq!(
            format_cim_date("20230412000000.000000+000").as_deref(),
            Some("12/04/2023")
        );
        assert_eq!(format_cim_date("2023"), None);
        assert_eq!(format_cim_date("not-a-date"), None);
    }
}

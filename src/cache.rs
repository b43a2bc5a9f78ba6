//! CPU cache topology: raw enumeration and the four-row summary the
//! report prints.

/// What a cache level stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheKind {
    Data,
    Instruction,
    Unified,
    Trace,
}

/// One cache instance as the OS reports it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawCache {
    pub level: u8,
    pub kind: CacheKind,
    pub size_bytes: u64,
    /// 0 means the OS did not report associativity.
    pub ways: u32,
}

/// One line of the cache summary. `count` is how many identical instances
/// exist across the package (8 per-core L1s collapse into one row).
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct CacheRow {
    pub label: &'static str,
    pub count: usize,
    pub size_bytes: u64,
    pub ways: u32,
}

impl CacheRow {
    /// Render as the report shows it: `8 x 32 KBytes, 8-way`.
    pub fn describe(&self) -> String {
        let size = format_size(self.size_bytes);
        let ways = if self.ways == 0 {
            "unknown".to_string()
        } else {
            format!("{}-way", self.ways)
        };
        if self.count > 1 {
            format!("{} x {size}, {ways}", self.count)
        } else {
            format!("{size}, {ways}")
        }
    }
}

/// KBytes below 1 MB, MBytes above, one decimal only when fractional.
pub fn format_size(bytes: u64) -> String {
    const MB: u64 = 1024 * 1024;
    const KB: u64 = 1024;
    if bytes >= MB {
        let mb = bytes as f64 / MB as f64;
        if bytes % MB == 0 {
            format!("{mb:.0} MBytes")
        } else {
            format!("{mb:.1} MBytes")
        }
    } else {
        let kb = bytes as f64 / KB as f64;
        if bytes % KB == 0 {
            format!("{kb:.0} KBytes")
        } else {
            format!("{kb:.1} KBytes")
        }
    }
}

fn row_label(level: u8, kind: CacheKind) -> Option<&'static str> {
    match (level, kind) {
        (1, CacheKind::Data) => Some("L1 Data"),
        (1, CacheKind::Instruction) => Some("L1 Inst."),
        (2, _) => Some("Level 2"),
        (3, _) => Some("Level 3"),
        _ => None,
    }
}

fn sort_priority(label: &str) -> u32 {
    match label {
        "L1 Data" => 0,
        "L1 Inst." => 1,
        "Level 2" => 2,
        "Level 3" => 3,
        _ => 100,
    }
}

/// Collapse the raw cache list into at most four display rows.
///
/// L1 unified and trace caches are dropped; L2/L3 keep any kind.
/// Identical (level, kind, size, ways) instances merge into one counted
/// row. Ordering is L1D, L1I, L2, L3, then bigger first.
pub fn build_rows(raw: &[RawCache]) -> Vec<CacheRow> {
    let mut rows: Vec<CacheRow> = Vec::new();
    for c in raw {
        let Some(label) = row_label(c.level, c.kind) else { continue };
        if let Some(row) = rows.iter_mut().find(|r| {
            r.label == label && r.size_bytes == c.size_bytes && r.ways == c.ways
        }) {
            row.count += 1;
            continue;
        }
        rows.push(CacheRow { label, count: 1, size_bytes: c.size_bytes, ways: c.ways });
    }
    rows.sort_by(|a, b| {
        sort_priority(a.label)
            .cmp(&sort_priority(b.label))
            .then(b.size_bytes.cmp(&a.size_bytes))
            .then(b.ways.cmp(&a.ways))
    });
    rows.truncate(4);
    rows
}

#[cfg(windows)]
pub fn enumerate() -> Vec<RawCache> {
    use windows::Win32::System::SystemInformation::{
        CacheData, CacheInstruction, CacheTrace, GetLogicalProcessorInformationEx,
        RelationCache, SYSTEM_LOGICAL_PROCESSOR_INFORMATION_EX,
    };

    let mut len: u32 = 0;
    // first call sizes the buffer
    unsafe {
        let _ = GetLogicalProcessorInformationEx(RelationCache, None, &mut len);
    }
    if len == 0 {
        return Vec::new();
    }
    let mut buf = vec![0u8; len as usize];
    let ok = unsafe {
        GetLogicalProcessorInformationEx(
            RelationCache,
            Some(buf.as_mut_ptr() as *mut SYSTEM_LOGICAL_PROCESSOR_INFORMATION_EX),
            &mut len,
        )
    };
    if ok.is_err() {
        return Vec::new();
    }

    let mut out = Vec::new();
    let mut offset = 0usize;
    while offset + std::mem::size_of::<u32>() < len as usize {
        let entry = unsafe {
            &*(buf.as_ptr().add(offset) as *const SYSTEM_LOGICAL_PROCESSOR_INFORMATION_EX)
        };
        if entry.Size == 0 {
            break;
        }
        if entry.Relationship == RelationCache {
            let cache = unsafe { entry.Anonymous.Cache };
            let kind = match cache.Type {
                t if t == CacheData => CacheKind::Data,
                t if t == CacheInstruction => CacheKind::Instruction,
                t if t == CacheTrace => CacheKind::Trace,
                _ => CacheKind::Unified,
            };
            out.push(RawCache {
                level: cache.Level,
                kind,
                size_bytes: cache.CacheSize as u64,
                ways: cache.Associativity as u32,
            });
        }
        offset += entry.Size as usize;
    }
    out
}

#[cfg(not(windows))]
pub fn enumerate() -> Vec<RawCache> {
    Vec::new()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn l1d(size: u64) -> RawCache {
        RawCache { level: 1, kind: CacheKind::Data, size_bytes: size, ways: 8 }
    }

    #[test]
    fn dedupes_identical_instances_with_count() {
        let raw = vec![l1d(32 * 1024); 8];
        let rows = build_rows(&raw);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].count, 8);
        assert_eq!(rows[0].describe(), "8 x 32 KBytes, 8-way");
    }

    #[test]
    fn drops_l1_unified_and_trace() {
        let raw = vec![
            RawCache { level: 1, kind: CacheKind::Unified, size_bytes: 65536, ways: 8 },
            RawCache { level: 1, kind: CacheKind::Trace, size_bytes: 65536, ways: 8 },
            l1d(32 * 1024),
        ];
        let rows = build_rows(&raw);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].label, "L1 Data");
    }

    #[test]
    fn keeps_l2_l3_of_any_kind_in_priority_order() {
        let raw = vec![
            RawCache { level: 3, kind: CacheKind::Unified, size_bytes: 32 << 20, ways: 16 },
            RawCache { level: 2, kind: CacheKind::Unified, size_bytes: 512 << 10, ways: 8 },
            RawCache { level: 1, kind: CacheKind::Instruction, size_bytes: 32 << 10, ways: 8 },
            l1d(32 * 1024),
        ];
        let labels: Vec<_> = build_rows(&raw).iter().map(|r| r.label).collect();
        assert_eq!(labels, vec!["L1 Data", "L1 Inst.", "Level 2", "Level 3"]);
    }

    #[test]
    fn caps_at_four_rows() {
        let mut raw = Vec::new();
        for ways in 1..=6 {
            raw.push(RawCache {
                level: 2,
                kind: CacheKind::Unified,
                size_bytes: 1 << 20,
                ways,
            });
        }
        assert_eq!(build_rows(&raw).len(), 4);
    }

    #[test]
    fn bigger_first_within_a_level() {
        let raw = vec![
            RawCache { level: 2, kind: CacheKind::Unified, size_bytes: 512 << 10, ways: 8 },
            RawCache { level: 2, kind: CacheKind::Unified, size_bytes: 1 << 20, ways: 8 },
        ];
        let rows = build_rows(&raw);
        assert_eq!(rows[0].size_bytes, 1 << 20);
    }

    #[test]
    fn size_formatting() {
        assert_eq!(format_size(32 * 1024), "32 KBytes");
        assert_eq!(format_size(512 * 1024), "512 KBytes");
        assert_eq!(format_size(1024 * 1024), "1 MBytes");
        assert_eq!(format_size(1536 * 1024), "1.5 MBytes");
        assert_eq!(format_size(32 << 20), "32 MBytes");
    }

    #[test]
    fn unknown_associativity() {
        let row = CacheRow { label: "Level 3", count: 1, size_bytes: 32 << 20, ways: 0 };
        assert_eq!(row.describe(), "32 MBytes, unknown");
    }
}

//! Bulk dump variants and their fixed record layout

use std::fmt;
use std::ops::Range;

use serde::{Serialize, Serializer};

/// Length of the SYSEX header preceding the first voice record
pub const HEADER_SIZE: usize = 6;

/// Size of one packed voice record
pub const VOICE_SIZE: usize = 128;

/// Offset of the name field within a voice record.
/// 6 operators * 17 bytes + 16 bytes of global voice parameters.
pub const NAME_OFFSET: usize = 6 * 17 + 16;

/// Length of the name field
pub const NAME_SIZE: usize = 10;

/// On-disk layout family of a bulk dump, identified by total file size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InstrumentVariant {
    /// DX7 32 voice bank
    Dx7,
    /// DX7 II or TX802 32 voice bank. Both share the same size.
    Dx7iiTx802,
    /// DX7s 32 voice bank
    Dx7s,
    /// TX7
    Tx7,
    /// DX1 or DX5 64 voice dump
    Dx1Dx5,
    /// DX7 II FD 64 voice dump
    Dx7iiFd,
    /// TX816 rack, 8 modules of 32 voices
    Tx816,
    /// Size matches no known variant
    Unknown,
}

/// File sizes of every known variant. Exact matches only.
const SIZE_TABLE: [(u64, InstrumentVariant); 7] = [
    (4104, InstrumentVariant::Dx7),
    (4096, InstrumentVariant::Dx7iiTx802),
    (4942, InstrumentVariant::Dx7s),
    (163, InstrumentVariant::Tx7),
    (4096 * 2, InstrumentVariant::Dx1Dx5),
    (4096 * 2 + 8, InstrumentVariant::Dx7iiFd),
    (4104 * 8, InstrumentVariant::Tx816),
];

impl InstrumentVariant {
    /// Every known variant, in table order.
    pub const KNOWN: [InstrumentVariant; 7] = [
        InstrumentVariant::Dx7,
        InstrumentVariant::Dx7iiTx802,
        InstrumentVariant::Dx7s,
        InstrumentVariant::Tx7,
        InstrumentVariant::Dx1Dx5,
        InstrumentVariant::Dx7iiFd,
        InstrumentVariant::Tx816,
    ];

    /// Classifies a file by its byte length.
    pub fn from_file_len(len: u64) -> Self {
        SIZE_TABLE
            .iter()
            .find(|(size, _)| *size == len)
            .map(|(_, variant)| *variant)
            .unwrap_or(InstrumentVariant::Unknown)
    }

    /// Total file size this variant is recognized by.
    pub fn expected_file_len(&self) -> Option<u64> {
        SIZE_TABLE
            .iter()
            .find(|(_, variant)| variant == self)
            .map(|(size, _)| *size)
    }

    /// Number of voice records the variant holds, 0 for `Unknown`.
    pub fn voice_count(&self) -> usize {
        match self {
            InstrumentVariant::Dx1Dx5 | InstrumentVariant::Dx7iiFd => 64,
            InstrumentVariant::Tx816 => 256,
            InstrumentVariant::Unknown => 0,
            _ => 32,
        }
    }

    /// Bytes before the first voice record.
    pub fn header_len(&self) -> usize {
        match self {
            InstrumentVariant::Unknown => 0,
            _ => HEADER_SIZE,
        }
    }

    /// False only for `Unknown`.
    pub fn is_known(&self) -> bool {
        *self != InstrumentVariant::Unknown
    }

    /// Human readable label, used in search results.
    pub fn label(&self) -> &'static str {
        match self {
            InstrumentVariant::Dx7 => "Yamaha DX7",
            InstrumentVariant::Dx7iiTx802 => "Yamaha DX7II or TX802",
            InstrumentVariant::Dx7s => "Yamaha DX7s",
            InstrumentVariant::Tx7 => "Yamaha TX7",
            InstrumentVariant::Dx1Dx5 => "Yamaha DX1 or DX5",
            InstrumentVariant::Dx7iiFd => "Yamaha DX7IIFD",
            InstrumentVariant::Tx816 => "Yamaha TX816",
            InstrumentVariant::Unknown => "Unknown",
        }
    }

    /// Record layout, or `None` for files that carry no decodable voices.
    pub fn layout(&self) -> Option<Layout> {
        if !self.is_known() {
            return None;
        }
        Some(Layout {
            header_len: self.header_len(),
            voice_count: self.voice_count(),
            voice_size: VOICE_SIZE,
            name_offset: NAME_OFFSET,
            name_len: NAME_SIZE,
        })
    }
}

impl fmt::Display for InstrumentVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for InstrumentVariant {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

/// Byte layout of the voice records inside a bulk dump.
///
/// Any bytes after the last voice record (checksum, `0xF7`) are footer and
/// take no part in offset computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
    /// Bytes skipped before the first record
    pub header_len: usize,
    /// Number of records
    pub voice_count: usize,
    /// Size of one record
    pub voice_size: usize,
    /// Start of the name field within a record
    pub name_offset: usize,
    /// Length of the name field
    pub name_len: usize,
}

impl Layout {
    /// Bytes needed to hold every voice record, header included.
    pub fn data_len(&self) -> usize {
        self.header_len + self.voice_count * self.voice_size
    }

    /// Byte range of the zero-based voice record `index`.
    pub fn voice_range(&self, index: usize) -> Range<usize> {
        let start = self.header_len + index * self.voice_size;
        start..start + self.voice_size
    }

    /// Byte range of the name field of voice `index`.
    pub fn name_range(&self, index: usize) -> Range<usize> {
        let start = self.voice_range(index).start + self.name_offset;
        start..start + self.name_len
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_known_sizes() {
        assert_eq!(InstrumentVariant::from_file_len(4104), InstrumentVariant::Dx7);
        assert_eq!(
            InstrumentVariant::from_file_len(4096),
            InstrumentVariant::Dx7iiTx802
        );
        assert_eq!(InstrumentVariant::from_file_len(4942), InstrumentVariant::Dx7s);
        assert_eq!(InstrumentVariant::from_file_len(163), InstrumentVariant::Tx7);
        assert_eq!(InstrumentVariant::from_file_len(8192), InstrumentVariant::Dx1Dx5);
        assert_eq!(InstrumentVariant::from_file_len(8200), InstrumentVariant::Dx7iiFd);
        assert_eq!(InstrumentVariant::from_file_len(32832), InstrumentVariant::Tx816);
    }

    #[test]
    fn test_classify_unknown_sizes() {
        for len in [0, 1, 155, 162, 164, 1000, 4095, 4097, 4103, 4105, 32831, u64::MAX] {
            assert_eq!(
                InstrumentVariant::from_file_len(len),
                InstrumentVariant::Unknown,
                "size {}",
                len
            );
        }
    }

    #[test]
    fn test_voice_counts() {
        assert_eq!(InstrumentVariant::Dx7.voice_count(), 32);
        assert_eq!(InstrumentVariant::Tx7.voice_count(), 32);
        assert_eq!(InstrumentVariant::Dx1Dx5.voice_count(), 64);
        assert_eq!(InstrumentVariant::Dx7iiFd.voice_count(), 64);
        assert_eq!(InstrumentVariant::Tx816.voice_count(), 256);
        assert_eq!(InstrumentVariant::Unknown.voice_count(), 0);
    }

    #[test]
    fn test_expected_len_round_trips_through_table() {
        for variant in InstrumentVariant::KNOWN {
            let len = variant.expected_file_len().unwrap();
            assert_eq!(InstrumentVariant::from_file_len(len), variant);
        }
        assert_eq!(InstrumentVariant::Unknown.expected_file_len(), None);
    }

    #[test]
    fn test_layout_offsets() {
        assert_eq!(InstrumentVariant::Unknown.layout(), None);

        let layout = InstrumentVariant::Dx7.layout().unwrap();
        assert_eq!(layout.voice_range(0), 6..134);
        assert_eq!(layout.name_range(0), 124..134);
        assert_eq!(layout.name_range(31), 6 + 31 * 128 + 118..6 + 32 * 128);
        // 4104 byte file: 2 footer bytes after the last voice
        assert_eq!(layout.data_len(), 4102);
    }

    #[test]
    fn test_label_display() {
        assert_eq!(InstrumentVariant::Dx7iiTx802.to_string(), "Yamaha DX7II or TX802");
        assert_eq!(InstrumentVariant::Unknown.to_string(), "Unknown");
    }
}

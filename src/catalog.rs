//! The shared encoding-variant catalog.
//!
//! Every sweep driver iterates this exact ordered list. Variant names double
//! as command-line selectors for the external binaries and as filename
//! components, so the catalog lives in one place only: the build sweep and
//! the timing sweeps desynchronize the moment two copies drift apart.

use std::fmt;

/// One inverted-index compression scheme known to the external binaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Encoding {
    /// Partitioned variable-byte, partitions chosen by dynamic programming
    OptVbDp,
    /// Variable-byte over fixed-size partitions
    UniformVb,
    /// Partitioned variable-byte, approximate partition optimization
    OptVb,
    /// Block codec: masked VByte (SIMD decoding)
    BlockMaskedVbyte,
    /// Block codec: Stream VByte
    BlockStreamVbyte,
    /// Block codec: varint-GB (group varint)
    BlockVarintGb,
    /// Block codec: varint-G8IU
    BlockVarintG8iu,
}

/// The fixed sweep order. Both the build driver and the timing drivers walk
/// this slice front to back; artifacts built by one are looked up by the
/// others under the same variant name.
pub const CATALOG: [Encoding; 7] = [
    Encoding::OptVbDp,
    Encoding::UniformVb,
    Encoding::OptVb,
    Encoding::BlockMaskedVbyte,
    Encoding::BlockStreamVbyte,
    Encoding::BlockVarintGb,
    Encoding::BlockVarintG8iu,
];

impl Encoding {
    /// The selector string understood by the external binaries. Also the
    /// filename component in every artifact and result path.
    pub fn name(&self) -> &'static str {
        match self {
            Self::OptVbDp => "opt_vb_dp",
            Self::UniformVb => "uniform_vb",
            Self::OptVb => "opt_vb",
            Self::BlockMaskedVbyte => "block_maskedvbyte",
            Self::BlockStreamVbyte => "block_streamvbyte",
            Self::BlockVarintGb => "block_varintgb",
            Self::BlockVarintG8iu => "block_varintg8iu",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        CATALOG.iter().copied().find(|v| v.name() == s)
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::OptVbDp => "partitioned VByte, optimal partitions via dynamic programming",
            Self::UniformVb => "partitioned VByte, uniform partition length",
            Self::OptVb => "partitioned VByte, approximately optimal partitions",
            Self::BlockMaskedVbyte => "block-aligned masked VByte (SIMD decode)",
            Self::BlockStreamVbyte => "block-aligned Stream VByte",
            Self::BlockVarintGb => "block-aligned group varint (varint-GB)",
            Self::BlockVarintG8iu => "block-aligned varint-G8IU",
        }
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_order() {
        let names: Vec<&str> = CATALOG.iter().map(|v| v.name()).collect();
        assert_eq!(
            names,
            vec![
                "opt_vb_dp",
                "uniform_vb",
                "opt_vb",
                "block_maskedvbyte",
                "block_streamvbyte",
                "block_varintgb",
                "block_varintg8iu",
            ]
        );
    }

    #[test]
    fn test_names_unique() {
        let mut names: Vec<&str> = CATALOG.iter().map(|v| v.name()).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), CATALOG.len());
    }

    #[test]
    fn test_from_str_round_trip() {
        for variant in CATALOG {
            assert_eq!(Encoding::from_str(variant.name()), Some(variant));
        }
        assert_eq!(Encoding::from_str("simple16"), None);
    }
}

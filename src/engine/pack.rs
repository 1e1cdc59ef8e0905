//! Packaged-binary container parsing
//!
//! A pack is the packaged-binary artifact kind: a little-endian header
//! followed by a JSON payload holding the packaged unit manifests. Platform
//! library directories hold packs as well.

use crate::engine::manifest::UnitManifest;
use crate::error::{Error, Result};
use scroll::Pread;

/// Magic number identifying pack files
pub const PACK_MAGIC: u64 = 0x70c1_5ce0_4e6a_9e01;

/// Extension used by packaged binaries and platform libraries
pub const PACK_EXTENSION: &str = "pack";

fn min_supported_version() -> u32 {
    1
}

fn max_supported_version() -> u32 {
    1
}

/// Fixed-size pack header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PackHeader {
    pub magic: u64,
    pub version: u32,
    pub unit_count: u32,
    pub payload_len: u32,
}

/// A parsed pack file
#[derive(Debug, Clone)]
pub struct PackFile {
    pub header: PackHeader,
    pub units: Vec<UnitManifest>,
}

impl PackFile {
    /// Parse a pack from a byte slice
    pub fn parse(data: &[u8]) -> Result<Self> {
        let mut offset = 0usize;

        let magic: u64 = data
            .gread_with(&mut offset, scroll::LE)
            .map_err(|e: scroll::Error| Error::Parse {
                offset,
                message: format!("failed to parse magic: {e}"),
            })?;
        if magic != PACK_MAGIC {
            return Err(Error::InvalidMagic {
                expected: PACK_MAGIC,
                got: magic,
            });
        }

        let version: u32 = data
            .gread_with(&mut offset, scroll::LE)
            .map_err(|e: scroll::Error| Error::Parse {
                offset,
                message: format!("failed to parse version: {e}"),
            })?;
        if version < min_supported_version() || version > max_supported_version() {
            return Err(Error::UnsupportedVersion { version });
        }

        let unit_count: u32 = data
            .gread_with(&mut offset, scroll::LE)
            .map_err(|e: scroll::Error| Error::Parse {
                offset,
                message: format!("failed to parse unit count: {e}"),
            })?;
        let payload_len: u32 = data
            .gread_with(&mut offset, scroll::LE)
            .map_err(|e: scroll::Error| Error::Parse {
                offset,
                message: format!("failed to parse payload length: {e}"),
            })?;

        let payload_end = offset + payload_len as usize;
        if payload_end > data.len() {
            return Err(Error::Parse {
                offset,
                message: format!(
                    "payload length {} exceeds remaining {} bytes",
                    payload_len,
                    data.len() - offset
                ),
            });
        }

        let units: Vec<UnitManifest> = serde_json::from_slice(&data[offset..payload_end])
            .map_err(|e| Error::Parse {
                offset,
                message: format!("failed to parse unit payload: {e}"),
            })?;
        if units.len() != unit_count as usize {
            return Err(Error::Parse {
                offset,
                message: format!(
                    "header declares {} units, payload holds {}",
                    unit_count,
                    units.len()
                ),
            });
        }

        Ok(PackFile {
            header: PackHeader {
                magic,
                version,
                unit_count,
                payload_len,
            },
            units,
        })
    }
}

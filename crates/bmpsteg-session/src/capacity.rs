//! Carrier capacity planning.
//!
//! Two policies decide whether a payload fits:
//! - [`CapacityPolicy::Legacy`] compares `width * height * 3` against a
//!   fixed-overhead estimate of the frame, ignoring row padding.
//! - [`CapacityPolicy::Exact`] compares the exact frame footprint with the
//!   pixel bytes actually present in the file.
//!
//! Whatever the policy, a frame is never planned into a carrier whose real
//! pixel bytes are shorter than its footprint.

use bmpsteg_carrier::{CarrierHeader, BYTES_PER_PIXEL};
use bmpsteg_frame::{frame_len, wire_size, BLOCK_SIZE, MAGIC, MAX_EXT_LEN, SIZE_FIELD_LEN};
use serde::Serialize;

use crate::error::{Result, StegError};

/// Which capacity formula to apply before encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CapacityPolicy {
    /// Geometry-based estimate with fixed field budgets.
    #[default]
    Legacy,
    /// Exact frame footprint against real pixel bytes.
    Exact,
}

/// Carrier bytes declared by the geometry: three per pixel, no padding.
pub fn image_capacity_bytes(width: u32, height: u32) -> u64 {
    u64::from(width) * u64::from(height) * BYTES_PER_PIXEL
}

/// Logical bytes budgeted for a payload of `payload_size` bytes.
pub fn required_bytes(payload_size: u64) -> u64 {
    payload_size.saturating_add((MAGIC.len() + MAX_EXT_LEN + SIZE_FIELD_LEN) as u64)
}

/// True when the geometry can hold the budgeted frame. Exact equality fits.
pub fn can_encode(width: u32, height: u32, payload_size: u64) -> bool {
    image_capacity_bytes(width, height) >= required_bytes(payload_size).saturating_mul(BLOCK_SIZE as u64)
}

/// Outcome of planning one payload into one carrier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CapacityPlan {
    pub policy: CapacityPolicy,
    pub width: u32,
    pub height: u32,
    pub pixel_data_offset: u32,
    /// Bytes from the pixel-data offset to end-of-file.
    pub pixel_bytes: u64,
    /// `width * height * 3`.
    pub image_capacity_bytes: u64,
    pub payload_size: u64,
    /// Legacy estimate in carrier bytes (`required_bytes * 8`).
    pub budgeted_bytes: u64,
    /// Carrier bytes the frame will actually occupy.
    pub frame_bytes: u64,
    pub fits: bool,
}

impl CapacityPlan {
    /// Carrier bytes the policy requires.
    pub fn required(&self) -> u64 {
        match self.policy {
            CapacityPolicy::Legacy => self.budgeted_bytes.max(self.frame_bytes),
            CapacityPolicy::Exact => self.frame_bytes,
        }
    }

    /// Carrier bytes the policy considers available.
    pub fn available(&self) -> u64 {
        match self.policy {
            CapacityPolicy::Legacy => self.image_capacity_bytes.min(self.pixel_bytes),
            CapacityPolicy::Exact => self.pixel_bytes,
        }
    }

    /// Fail with `CapacityExceeded` unless the frame fits.
    pub fn check(&self) -> Result<()> {
        if self.fits {
            return Ok(());
        }
        Err(StegError::CapacityExceeded {
            required: self.required(),
            available: self.available(),
        })
    }
}

/// Plan a payload with the given extension length into a carrier.
pub fn plan(
    header: &CarrierHeader,
    extension_len: usize,
    payload_size: u64,
    policy: CapacityPolicy,
) -> CapacityPlan {
    let frame_bytes = wire_size(extension_len, payload_size);
    let pixel_bytes = header.pixel_bytes();
    let exact_fits = frame_bytes <= pixel_bytes;
    let fits = match policy {
        CapacityPolicy::Legacy => exact_fits && can_encode(header.width, header.height, payload_size),
        CapacityPolicy::Exact => exact_fits,
    };

    CapacityPlan {
        policy,
        width: header.width,
        height: header.height,
        pixel_data_offset: header.pixel_data_offset,
        pixel_bytes,
        image_capacity_bytes: image_capacity_bytes(header.width, header.height),
        payload_size,
        budgeted_bytes: required_bytes(payload_size).saturating_mul(BLOCK_SIZE as u64),
        frame_bytes,
        fits,
    }
}

/// Largest payload that fits the carrier under `policy`, or 0 if none does.
pub fn max_payload_size(header: &CarrierHeader, extension_len: usize, policy: CapacityPolicy) -> u64 {
    let blocks = header.pixel_bytes() / BLOCK_SIZE as u64;
    let mut size = blocks;
    // Frame overhead is at most a few dozen blocks.
    while size > 0 && frame_len(extension_len, size) > blocks {
        size -= 1;
    }

    if policy == CapacityPolicy::Legacy {
        let overhead = required_bytes(0);
        let budget = image_capacity_bytes(header.width, header.height) / BLOCK_SIZE as u64;
        size = size.min(budget.saturating_sub(overhead));
    }
    size
}

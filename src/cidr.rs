// Copyright (c) 2025 The cidry authors
// SPDX-License-Identifier: MIT

//! Pure CIDR algebra.
//!
//! Stateless helpers over [`ipnet::IpNet`] used by admission and capacity
//! accounting: range parsing, containment tests, bound computation and the
//! capacity formula `2^(family_bits - prefix_length)`.
//!
//! Nothing in this module touches the Kubernetes API.

use std::net::IpAddr;

use ipnet::IpNet;

use crate::constants::{IPV4_FAMILY_BITS, IPV6_FAMILY_BITS, MAX_CAPACITY_EXPONENT};
use crate::ipam_errors::CidrError;

/// Parse an address-range string into its written address and its network.
///
/// The returned [`IpNet`] is truncated to the network address, so
/// `"10.0.0.1/16"` yields the address `10.0.0.1` and the range
/// `10.0.0.0/16`.
///
/// # Errors
///
/// Returns [`CidrError::InvalidRange`] if the string is not CIDR notation.
pub fn parse_range(s: &str) -> Result<(IpAddr, IpNet), CidrError> {
    let net: IpNet = s.trim().parse().map_err(|_| CidrError::InvalidRange {
        range: s.to_string(),
    })?;
    Ok((net.addr(), net.trunc()))
}

/// Whether `outer` contains the single address `addr`.
#[must_use]
pub fn contains(outer: &IpNet, addr: &IpAddr) -> bool {
    outer.contains(addr)
}

/// Whether every address of `inner` lies within `outer`.
///
/// Both ranges are CIDR-aligned, so subset containment is exactly "outer
/// contains inner's network and broadcast address".
#[must_use]
pub fn contains_range(outer: &IpNet, inner: &IpNet) -> bool {
    outer.contains(inner)
}

/// First and last address of a range (network and broadcast for v4).
#[must_use]
pub fn address_bounds(range: &IpNet) -> (IpAddr, IpAddr) {
    (range.network(), range.broadcast())
}

/// Address bits of a range's family: 32 for v4, 128 for v6.
#[must_use]
pub fn family_bits(range: &IpNet) -> u8 {
    match range {
        IpNet::V4(_) => IPV4_FAMILY_BITS,
        IpNet::V6(_) => IPV6_FAMILY_BITS,
    }
}

/// Total address capacity of a prefix: `2^(family_bits - prefix_len)`.
///
/// # Errors
///
/// - [`CidrError::PrefixOutOfRange`] if the prefix is longer than the
///   address family allows.
/// - [`CidrError::CapacityOverflow`] for exponents ≥ 63: the result would
///   not fit the signed 64-bit capacity field, and the accountant refuses
///   to compute a capacity rather than return a wrapped number. In practice
///   this only affects IPv6 prefixes shorter than /66.
pub fn capacity(prefix_len: u8, family_bits: u8) -> Result<i64, CidrError> {
    let exponent = family_bits
        .checked_sub(prefix_len)
        .ok_or(CidrError::PrefixOutOfRange {
            prefix_len,
            family_bits,
        })?;

    if exponent >= MAX_CAPACITY_EXPONENT {
        return Err(CidrError::CapacityOverflow {
            prefix_len,
            exponent,
        });
    }

    Ok(1i64 << exponent)
}

/// Capacity of a parsed range, deriving the family bits from the range
/// itself.
///
/// # Errors
///
/// Same refusal policy as [`capacity`].
pub fn net_capacity(range: &IpNet) -> Result<i64, CidrError> {
    capacity(range.prefix_len(), family_bits(range))
}

//! Deterministic address allocation inside a subnet
//!
//! Well-known cluster addresses (API server service IP, CoreDNS, ...) are
//! derived from a fixed offset into the service or pod network instead of
//! being stored anywhere.

use ipnet::IpNet;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use crate::error::{CoreError, Result};

/// Compute the address `offset` positions after the network address of `subnet`.
///
/// IPv4 subnets yield 4-byte addresses, IPv6 subnets 16-byte ones. The offset
/// must fit into the host part of the subnet, and for IPv4 the result must not
/// be the broadcast address.
pub fn compute_offset_ip(subnet: Option<&IpNet>, offset: u64) -> Result<IpAddr> {
    let subnet = subnet.ok_or_else(|| CoreError::InvalidInput {
        message: "subnet is nil".to_string(),
    })?;

    let host_bits = u32::from(subnet.max_prefix_len() - subnet.prefix_len());
    let too_small = || CoreError::SubnetTooSmall {
        subnet: subnet.to_string(),
        offset,
    };

    // A host part of 128 bits can address any u64 offset.
    if host_bits == 0 || (host_bits < 128 && u128::from(offset) >= 1u128 << host_bits) {
        return Err(too_small());
    }

    match subnet {
        IpNet::V4(net) => {
            let base = u32::from(net.network());
            let offset = u32::try_from(offset).map_err(|_| too_small())?;
            let address = Ipv4Addr::from(base + offset);

            if address == net.broadcast() {
                return Err(CoreError::BroadcastAddress {
                    address: address.to_string(),
                    subnet: subnet.to_string(),
                });
            }

            Ok(IpAddr::V4(address))
        }
        IpNet::V6(net) => {
            let base = u128::from(net.network());
            Ok(IpAddr::V6(Ipv6Addr::from(base + u128::from(offset))))
        }
    }
}

//! Anchor-and-offset parsers for diagnostic output.
//!
//! The output tables are column-aligned for humans, not machines, so each
//! parser tokenizes on whitespace, finds a known anchor token and reads
//! fixed offsets from it. A missing anchor or offset yields `None`.

/// Token `offset` places after the first `anchor`. Offset 0 yields `None`.
fn after_anchor<'a>(output: &'a str, anchor: &str, offset: usize) -> Option<&'a str> {
    let mut tokens = output.split_whitespace();
    tokens.position(|token| token == anchor)?;
    tokens.nth(offset.checked_sub(1)?)
}

/// Serial number and model from chassis hardware output.
///
/// ```text
/// Item             Version  Part number  Serial number     Description
/// Chassis                                JW3618AF0123      EX2300-24P
/// ```
pub fn parse_chassis(output: &str) -> (Option<String>, Option<String>) {
    let serial = after_anchor(output, "Chassis", 1).map(str::to_string);
    let model = after_anchor(output, "Chassis", 2).map(str::to_string);
    (serial, model)
}

/// MAC address from management interface output.
///
/// ```text
///   Current address: 2c:6b:f5:aa:bb:c0, Hardware address: 2c:6b:f5:aa:bb:c0
/// ```
pub fn parse_mac(output: &str) -> Option<String> {
    after_anchor(output, "Current", 2).map(|mac| mac.trim_end_matches(',').to_string())
}

/// Address and dotted subnet mask from terse interface output.
///
/// ```text
/// vme.0                   up    up   inet     10.20.0.15/24
/// ```
pub fn parse_inet(output: &str) -> (Option<String>, Option<String>) {
    let Some(cidr) = after_anchor(output, "inet", 1) else {
        return (None, None);
    };

    match cidr.split_once('/') {
        Some((address, prefix)) => (
            Some(address.to_string()),
            prefix.parse().ok().and_then(prefix_to_mask),
        ),
        None => (Some(cidr.to_string()), None),
    }
}

/// `24` → `255.255.255.0`.
fn prefix_to_mask(prefix: u8) -> Option<String> {
    if prefix > 32 {
        return None;
    }
    let mask = u32::MAX.checked_shl(32 - u32::from(prefix)).unwrap_or(0);
    Some(std::net::Ipv4Addr::from(mask).to_string())
}

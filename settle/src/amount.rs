// Copyright (c) Trestle Contributors
// SPDX-License-Identifier: Apache-2.0

//! Base-unit to display-string conversion. No floats anywhere; amounts stay
//! integral until the final string.

/// Render `raw` base units as a decimal string with `decimals` fractional
/// digits, trimming trailing zeros. u128 carries at most 38 decimal digits,
/// so larger `decimals` values are clamped; parsers reject them upstream.
pub fn format_units(raw: u128, decimals: u8) -> String {
    let decimals = decimals.min(38);
    if decimals == 0 {
        return raw.to_string();
    }
    let divisor = 10u128.pow(decimals as u32);
    let whole = raw / divisor;
    let frac = raw % divisor;
    if frac == 0 {
        return whole.to_string();
    }
    let mut frac_str = format!("{:0width$}", frac, width = decimals as usize);
    while frac_str.ends_with('0') {
        frac_str.pop();
    }
    format!("{whole}.{frac_str}")
}

/// Precision of token-bridge wire amounts: the bridge truncates transfers
/// to at most 8 decimals regardless of the token's own precision.
pub fn truncated_decimals(token_decimals: u8) -> u8 {
    token_decimals.min(8)
}

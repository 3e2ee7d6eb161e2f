//! Test fixtures for integration tests
//!
//! Builders for flat record buffers and shared record definitions.

#![allow(dead_code)]

/// ASCII file separator, the usual field delimiter in legacy wire records
pub const FS: u8 = 0x1c;

/// Joins tokens with the file separator.
pub fn fs_joined(tokens: &[&str]) -> Vec<u8> {
    let mut data = Vec::new();
    for (i, token) in tokens.iter().enumerate() {
        if i > 0 {
            data.push(FS);
        }
        data.extend_from_slice(token.as_bytes());
    }
    data
}

/// Definitions for a small order-entry message format.
pub const ORDER_DEFINITIONS: &str = r#"
# fixed-width header
Header = int version `len:"2"`; string kind `len:"3"`
Party = string id `sep:"\x1c" len:"8"`; string name `sep:"\x1c"`
Order = Header header; Party party; int qty `sep:"\x1c"`; []int prices `sep:"\x1c" len:"6"`
"#;

/// An order message matching `ORDER_DEFINITIONS`.
pub fn order_message() -> Vec<u8> {
    let mut data = Vec::new();
    data.extend_from_slice(b"01NEW");
    data.extend_from_slice(&fs_joined(&["C-1001", "ACME Corp", "250", "1200", "-35", "17"]));
    data
}

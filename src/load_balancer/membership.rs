//! Pool membership lookup.

use crate::provider::Member;

/// Find the member registered as `(ip, port)`, if any.
///
/// Node labels and provider ids play no part in the match.
pub fn find_member<'a>(members: &'a [Member], ip: &str, port: u16) -> Option<&'a Member> {
    members.iter().find(|m| m.matches(ip, port))
}

//! HTML escaping for free-text fields before they are stored.
//!
//! Only text columns pass through here. Timestamps, numbers and booleans are
//! parsed into typed values during validation and never reach this filter.

use std::borrow::Cow;

/// Escape `& < > " ' /` so stored text renders inert when embedded in HTML.
pub fn sanitize_text(input: &str) -> Cow<'_, str> {
    html_escape::encode_safe(input)
}

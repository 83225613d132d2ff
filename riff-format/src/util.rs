//! Internal assertion helpers.

use riff_result::{Error, Result};

/// Assert that two optional byte arrays are equal.
///
/// Failures report through [`Error::Internal`] with the message
/// `"{context}: {expected} != {actual}"`, rendering an absent side as
/// `null` and a present one as decimal bytes, e.g. `[4, 120]`. Two absent
/// sides do not compare equal — an invariant about bytes that do not exist
/// cannot hold.
pub fn assert_bytes(expected: Option<&[u8]>, actual: Option<&[u8]>, context: &str) -> Result<()> {
    if let (Some(e), Some(a)) = (expected, actual)
        && e == a
    {
        return Ok(());
    }
    Err(Error::Internal(format!(
        "{context}: {} != {}",
        render(expected),
        render(actual)
    )))
}

fn render(bytes: Option<&[u8]>) -> String {
    match bytes {
        None => "null".to_string(),
        Some(bytes) => {
            let rendered: Vec<String> = bytes.iter().map(|b| b.to_string()).collect();
            format!("[{}]", rendered.join(", "))
        }
    }
}

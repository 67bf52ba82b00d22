//! Fixed paths and keys shared between the page and the server.

use crate::domain::Callsign;

/// Key the last admitted callsign is stored under.
pub const STORE_KEY_NAME: &str = "name";

/// Identifier of the text input holding the user's callsign.
pub const CALLSIGN_INPUT_ID: &str = "callsign";

/// Identifier of the navigation element pointing at the morse page.
pub const LINK_ELEMENT_ID: &str = "link";

pub const CHECKNAME_PATH: &str = "/checkname";
pub const MORSE_PATH: &str = "/morse";

/// Path of the availability check. The callsign is embedded as-is.
pub fn checkname_path(callsign: &Callsign) -> String {
    format!("{CHECKNAME_PATH}/{callsign}")
}

/// Navigation target for joining with `callsign`. No query encoding is applied.
pub fn morse_href(callsign: &Callsign) -> String {
    format!("{MORSE_PATH}?name={callsign}")
}

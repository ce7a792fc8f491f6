//! Stream ids carried in the first header byte.
//!
//! The terminal only originates [`DATA`] frames. Inbound frames may carry any
//! id the remote side chooses; they are rendered the same way.

/// Operator text typed into the terminal (`'d'`).
pub const DATA: u8 = b'd';

/// Returns a human-readable name for a stream id.
pub fn stream_name(id: u8) -> &'static str {
    match id {
        DATA => "DATA",
        _ => "OTHER",
    }
}

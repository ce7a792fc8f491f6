use crate::error::{FrameError, Result};

/// Largest payload a frame may declare.
///
/// Also bounds the read a corrupted header can trigger.
pub const MAX_PAYLOAD: u32 = 80;

/// Payload the remote side sends to acknowledge a line.
pub const ACK_PAYLOAD: &[u8; 2] = b"ok";

/// Check a declared payload size; zero and anything above [`MAX_PAYLOAD`] fail.
pub fn validate_payload_size(size: u32) -> Result<u32> {
    if size == 0 || size > MAX_PAYLOAD {
        return Err(FrameError::SizeViolation {
            size,
            max: MAX_PAYLOAD,
        });
    }
    Ok(size)
}

/// True for an acknowledgment frame, which is consumed without rendering.
pub fn is_suppressed_ack(payload_size: u32, payload: &[u8]) -> bool {
    payload_size == ACK_PAYLOAD.len() as u32 && payload == ACK_PAYLOAD
}

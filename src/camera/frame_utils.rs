//! Frame conversion utilities.

use nokhwa::pixel_format::RgbFormat;

use super::types::{Frame, FrameFormat};

/// Convert a nokhwa buffer to our RGB Frame format.
///
/// Handles various camera formats (MJPEG, YUYV, NV12, etc.) by using
/// nokhwa's built-in decode_image which converts from the camera's
/// native format to RGB.
///
/// Returns `None` if the conversion fails (unsupported format or corrupt data).
pub fn convert_to_rgb(buffer: &nokhwa::Buffer) -> Option<Frame> {
    let decoded = buffer.decode_image::<RgbFormat>().ok()?;
    let (width, height) = decoded.dimensions();

    Some(Frame::new(decoded.into_raw(), width, height, FrameFormat::Rgb))
}

/// Classify a driver error message, mapping OS permission refusals apart
/// from ordinary open failures.
pub fn is_permission_error(message: &str) -> bool {
    let msg = message.to_lowercase();
    msg.contains("permission")
        || msg.contains("denied")
        || msg.contains("authorization")
        || msg.contains("access")
}

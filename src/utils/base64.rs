use base64::{engine::general_purpose::STANDARD, Engine};

/// Decodes program data the RPC node sends as standard base64.
///
/// Surrounding whitespace is ignored; an empty string decodes to no bytes.
pub fn decode_program_data(encoded: &str) -> Result<Vec<u8>, base64::DecodeError> {
    STANDARD.decode(encoded.trim())
}

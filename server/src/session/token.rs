use rand::RngCore;
use rand::rngs::OsRng;

pub const TOKEN_BYTES: usize = 16;

/// 16 bytes from the OS CSPRNG as 32 lowercase hex characters.
/// Collisions are not checked.
pub fn generate_session_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

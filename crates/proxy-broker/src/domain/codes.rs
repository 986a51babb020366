//! Pairing-code generation.
//!
//! Codes are read off one screen and typed on another, so the alphabet leaves
//! out characters that are easy to confuse (`0/O`, `1/I/L`).

use proxy_core::{PairingCode, PairingCodeError};
use rand::Rng;

/// Characters a generated code is drawn from.
pub const CODE_ALPHABET: &[u8] = b"ABCDEFGHJKMNPQRSTUVWXYZ23456789";

/// Length of a generated code.
pub const CODE_LEN: usize = 6;

/// Draws a random code of [`CODE_LEN`] characters from [`CODE_ALPHABET`].
///
/// # Errors
///
/// Only if the alphabet constants stop producing valid pairing codes.
pub fn generate_code<R: Rng + ?Sized>(rng: &mut R) -> Result<PairingCode, PairingCodeError> {
    let code: String = (0..CODE_LEN)
        .map(|_| CODE_ALPHABET[rng.gen_range(0..CODE_ALPHABET.len())] as char)
        .collect();
    PairingCode::new(code)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_generated_code_has_expected_length_and_alphabet() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..100 {
            let code = generate_code(&mut rng).unwrap();
            assert_eq!(code.as_str().len(), CODE_LEN);
            assert!(code.as_str().bytes().all(|b| CODE_ALPHABET.contains(&b)));
        }
    }

    #[test]
    fn test_alphabet_has_no_ambiguous_characters() {
        for ambiguous in [b'0', b'O', b'1', b'I', b'L'] {
            assert!(!CODE_ALPHABET.contains(&ambiguous), "{}", ambiguous as char);
        }
    }

    #[test]
    fn test_same_seed_gives_same_code() {
        let a = generate_code(&mut StdRng::seed_from_u64(42)).unwrap();
        let b = generate_code(&mut StdRng::seed_from_u64(42)).unwrap();
        assert_eq!(a, b);
    }
}

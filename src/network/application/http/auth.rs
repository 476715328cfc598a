//! Basic authentication.
//!
//! Credentials are sent as `Authorization: Basic <base64(user:password)>`
//! using the standard alphabet with `=` padding and no line wrapping.

use super::Error;
use base64ct::{Base64, Encoding as B64Encoding};
use heapless::String;

/// Maximum user name length in bytes
pub const USER_CAPACITY: usize = 64;
/// Maximum password length in bytes
pub const PASSWORD_CAPACITY: usize = 64;

const CREDENTIALS_CAPACITY: usize = USER_CAPACITY + 1 + PASSWORD_CAPACITY;

/// Capacity of an encoded `user:password` token
pub const TOKEN_CAPACITY: usize = CREDENTIALS_CAPACITY.div_ceil(3) * 4;

/// Base64-encode `input` into `output`.
///
/// Fails with [`Error::Overflow`] when `output` is shorter than
/// `4 * ceil(input.len() / 3)` bytes.
pub fn base64_encode<'o>(input: &[u8], output: &'o mut [u8]) -> Result<&'o str, Error> {
    Base64::encode(input, output).map_err(|_| Error::Overflow)
}

/// Build the base64 token for `user:password`.
pub fn basic_token(user: &str, password: &str) -> Result<String<TOKEN_CAPACITY>, Error> {
    if user.len() > USER_CAPACITY || password.len() > PASSWORD_CAPACITY {
        return Err(Error::Overflow);
    }

    let mut credentials: String<CREDENTIALS_CAPACITY> = String::new();
    credentials.push_str(user).map_err(|_| Error::Overflow)?;
    credentials.push(':').map_err(|_| Error::Overflow)?;
    credentials.push_str(password).map_err(|_| Error::Overflow)?;

    let mut encoded = [0u8; TOKEN_CAPACITY];
    let token = base64_encode(credentials.as_bytes(), &mut encoded)?;
    String::try_from(token).map_err(|_| Error::Overflow)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(input: &[u8]) -> std::string::String {
        let mut out = [0u8; 64];
        base64_encode(input, &mut out).unwrap().into()
    }

    #[test]
    fn known_vectors() {
        assert_eq!(encode(b""), "");
        assert_eq!(encode(b"f"), "Zg==");
        assert_eq!(encode(b"fo"), "Zm8=");
        assert_eq!(encode(b"foo"), "Zm9v");
        assert_eq!(encode(b"foob"), "Zm9vYg==");
        assert_eq!(encode(b"fooba"), "Zm9vYmE=");
        assert_eq!(encode(b"foobar"), "Zm9vYmFy");
    }

    #[test]
    fn uses_standard_alphabet() {
        assert_eq!(encode(&[0xfb, 0xff]), "+/8=");
    }

    #[test]
    fn output_length_follows_input_length() {
        for n in 0..32usize {
            let input = [0x5au8; 32];
            let encoded = encode(&input[..n]);
            assert_eq!(encoded.len(), n.div_ceil(3) * 4);
        }
    }

    #[test]
    fn rejects_short_destination() {
        let mut out = [0u8; 3];
        assert_eq!(base64_encode(b"f", &mut out), Err(Error::Overflow));

        let mut out = [0u8; 4];
        assert_eq!(base64_encode(b"foo", &mut out).unwrap(), "Zm9v");
        assert_eq!(base64_encode(b"foob", &mut out), Err(Error::Overflow));
    }

    #[test]
    fn basic_token_matches_rfc_example() {
        let token = basic_token("Aladdin", "open sesame").unwrap();
        assert_eq!(token.as_str(), "QWxhZGRpbjpvcGVuIHNlc2FtZQ==");
    }

    #[test]
    fn basic_token_rejects_long_credentials() {
        let user = "u".repeat(USER_CAPACITY + 1);
        assert_eq!(basic_token(&user, "pw"), Err(Error::Overflow));
    }
}

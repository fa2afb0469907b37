// SPDX-FileCopyrightText: 2026 Keepsake Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! BLOB codec for embedding vectors.
//!
//! Vectors are stored as contiguous native-endian f32 bytes. The
//! database never moves between hosts, so native byte order is safe and
//! keeps encode/decode allocation-only.

use keepsake_core::KeepsakeError;

/// Encode a vector as raw f32 bytes.
pub fn encode_vector(vector: &[f32]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(vector.len() * 4);
    for value in vector {
        bytes.extend_from_slice(&value.to_ne_bytes());
    }
    bytes
}

/// Decode raw f32 bytes back into a vector.
///
/// A blob whose length is not a multiple of four is corrupt and
/// rejected; callers in the retrieval path skip the row rather than
/// fail the query.
pub fn decode_vector(bytes: &[u8]) -> Result<Vec<f32>, KeepsakeError> {
    if bytes.len() % 4 != 0 {
        return Err(KeepsakeError::MalformedBlob { len: bytes.len() });
    }
    Ok(bytes
        .chunks_exact(4)
        .map(|chunk| f32::from_ne_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip_preserves_values() {
        let original = vec![0.0f32, -1.5, 3.25, f32::MAX, f32::MIN_POSITIVE];
        let decoded = decode_vector(&encode_vector(&original)).unwrap();
        assert_eq!(decoded, original);
    }

    #[test]
    fn empty_vector_roundtrips() {
        assert_eq!(decode_vector(&encode_vector(&[])).unwrap(), Vec::<f32>::new());
    }

    #[test]
    fn truncated_blob_is_rejected() {
        let err = decode_vector(&[0u8; 7]).unwrap_err();
        assert!(matches!(err, KeepsakeError::MalformedBlob { len: 7 }));
    }
}

//! Iu security key derivation: IK/CK computed from the 2G ciphering key Kc
//! when the CN wants to reuse an existing GSM authentication vector for 3G
//! Iu security.

/// Derive a 128-bit Integrity Key from a 64-bit Kc.
///
/// `ik[0..4] = kc[i] XOR kc[i+4]`, `ik[4..12] = kc[0..8]`,
/// `ik[12..16] = ik[0..4]`.
pub fn derive_ik(kc: [u8; 8]) -> [u8; 16] {
    let mut ik = [0u8; 16];
    for i in 0..4 {
        ik[i] = kc[i] ^ kc[i + 4];
    }
    ik[4..12].copy_from_slice(&kc);
    let (head, tail) = ik.split_at_mut(12);
    tail.copy_from_slice(&head[0..4]);
    ik
}

/// Derive a 128-bit Ciphering Key from a 64-bit Kc: Kc concatenated with
/// itself.
pub fn derive_ck(kc: [u8; 8]) -> [u8; 16] {
    let mut ck = [0u8; 16];
    ck[0..8].copy_from_slice(&kc);
    ck[8..16].copy_from_slice(&kc);
    ck
}

#[cfg(test)]
mod tests {
    use super::*;

    const KC: [u8; 8] = [0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08];

    #[test]
    fn ik_derivation_is_deterministic() {
        let ik = derive_ik(KC);
        assert_eq!(
            ik,
            [
                0x04, 0x04, 0x04, 0x0c, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08, 0x04,
                0x04, 0x04, 0x0c,
            ]
        );
    }

    #[test]
    fn ck_derivation_is_kc_concatenated_with_itself() {
        let ck = derive_ck(KC);
        assert_eq!(
            ck,
            [
                0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08, 0x01, 0x02, 0x03, 0x04, 0x05,
                0x06, 0x07, 0x08,
            ]
        );
    }
}

//! Wallet identity helpers

use rand::{rngs::StdRng, SeedableRng};

/// EVM-style address: `0x` followed by 40 hex digits
pub fn is_valid_wallet(wallet_address: &str) -> bool {
    let Some(body) = wallet_address.strip_prefix("0x") else {
        return false;
    };
    body.len() == 40 && hex::decode(body).is_ok()
}

/// Deterministic random stream for a wallet.
///
/// Seeded from the sum of the address's character codes, so the same
/// wallet always sees the same generated data.
pub fn wallet_rng(wallet_address: &str) -> StdRng {
    let seed: u64 = wallet_address.chars().map(|c| c as u64).sum();
    StdRng::seed_from_u64(seed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    #[test]
    fn test_valid_wallets() {
        assert!(is_valid_wallet("0x52908400098527886E0F7030069857D2E4169EE7"));
        assert!(is_valid_wallet("0xde709f2102306220921060314715629080e2fb77"));
    }

    #[test]
    fn test_invalid_wallets() {
        assert!(!is_valid_wallet(""));
        assert!(!is_valid_wallet("52908400098527886E0F7030069857D2E4169EE7"));
        assert!(!is_valid_wallet("0x52908400098527886E0F7030069857D2E4169EE"));
        assert!(!is_valid_wallet("0x52908400098527886E0F7030069857D2E4169EE77"));
        assert!(!is_valid_wallet("0xZZ908400098527886E0F7030069857D2E4169EE7"));
        assert!(!is_valid_wallet("0X52908400098527886E0F7030069857D2E4169EE7"));
    }

    #[test]
    fn test_wallet_rng_is_stable() {
        let wallet = "0xde709f2102306220921060314715629080e2fb77";
        let mut a = wallet_rng(wallet);
        let mut b = wallet_rng(wallet);
        for _ in 0..5 {
            assert_eq!(a.gen::<u32>(), b.gen::<u32>());
        }
    }
}

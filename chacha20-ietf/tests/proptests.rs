//! Property-based tests for sessions and the seekable cipher

use chacha20_ietf::{ChaCha20, Config, Session, Word};
use cipher::{KeyIvInit, StreamCipher, StreamCipherSeek};
use proptest::prelude::*;
use std::num::NonZeroUsize;

proptest! {
    #[test]
    fn process_is_self_inverse(
        key in any::<[u8; 32]>(),
        nonce in any::<[u8; 12]>(),
        counter in 0u32..1_000_000,
        data in prop::collection::vec(any::<u8>(), 0..=1024)
    ) {
        let config = Config::default().initial_counter(counter);
        let mut buf = data.clone();
        Session::with_config(&key.into(), &nonce.into(), config).encrypt(&mut buf).unwrap();
        Session::with_config(&key.into(), &nonce.into(), config).decrypt(&mut buf).unwrap();
        prop_assert_eq!(buf, data);
    }

    #[test]
    fn session_matches_seeked_cipher(
        key in any::<[u8; 32]>(),
        nonce in any::<[u8; 12]>(),
        counter in 0u32..1_000_000,
        data in prop::collection::vec(any::<u8>(), 1..=700)
    ) {
        let config = Config::default().initial_counter(counter);
        let mut from_session = data.clone();
        let mut session = Session::with_config(&key.into(), &nonce.into(), config);
        session.process(&mut from_session).unwrap();
        prop_assert_eq!(
            u64::from(session.counter()),
            u64::from(counter) + data.len().div_ceil(64) as u64
        );

        let mut cipher = ChaCha20::new(&key.into(), &nonce.into());
        cipher.seek(u64::from(counter) * 64);
        let mut from_cipher = data;
        cipher.apply_keystream(&mut from_cipher);
        prop_assert_eq!(from_session, from_cipher);
    }

    #[test]
    fn parallel_matches_sequential(
        key in any::<[u8; 32]>(),
        nonce in any::<[u8; 12]>(),
        workers in 1usize..=16,
        data in prop::collection::vec(any::<u8>(), 0..=4096)
    ) {
        let mut sequential = data.clone();
        let mut seq = Session::new(&key.into(), &nonce.into());
        seq.process(&mut sequential).unwrap();

        let mut parallel = data;
        let mut par = Session::new(&key.into(), &nonce.into());
        let workers = NonZeroUsize::new(workers).unwrap();
        par.process_parallel(&mut parallel, workers).unwrap();

        prop_assert_eq!(parallel, sequential);
        prop_assert_eq!(par.counter(), seq.counter());
    }

    #[test]
    fn words_match_bytes(words in prop::collection::vec(any::<u32>(), 0..=100)) {
        let key = [9u8; 32].into();
        let nonce = [3u8; 12].into();

        let mut as_words: Vec<Word> = words.iter().copied().map(Word).collect();
        Session::new(&key, &nonce).process_words(&mut as_words).unwrap();

        let mut as_bytes: Vec<u8> = words.iter().flat_map(|w| w.to_le_bytes()).collect();
        Session::new(&key, &nonce).process(&mut as_bytes).unwrap();

        let encoded: Vec<u8> = as_words.iter().flat_map(|w| w.to_le_bytes()).collect();
        prop_assert_eq!(encoded, as_bytes);
    }
}

//! Keystream backends for [`ChaChaCore`][crate::ChaChaCore].
//!
//! Selected at compile time: SSE2 on x86(-64) targets that have it, the
//! portable implementation everywhere else or under
//! `--cfg chacha20_force_soft`.

use cfg_if::cfg_if;

cfg_if! {
    if #[cfg(chacha20_force_soft)] {
        pub(crate) mod soft;
    } else if #[cfg(all(
        any(target_arch = "x86", target_arch = "x86_64"),
        target_feature = "sse2"
    ))] {
        pub(crate) mod sse2;
    } else {
        pub(crate) mod soft;
    }
}

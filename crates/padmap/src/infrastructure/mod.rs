//! Infrastructure layer for padmap.
//!
//! Contains OS-facing adapters: the XInput device source, the SendInput
//! keyboard transport, their test doubles, and TOML configuration storage.
//!
//! **Dependency rule**: this layer may depend on `application` and
//! `padmap_core`, but MUST NOT be imported by the `application` layer.

pub mod device;
pub mod keyboard;
pub mod storage;

//! Hardware Abstraction Layer
//!
//! Seams between this core and the board it runs on.
//!
//! # Modules
//!
//! - [`bus`]: Register-space access and physical address translation
//! - [`line`]: Line-interface and modem-status sampling
//!
//! # Delay Integration
//!
//! Board reset uses `embedded_hal::delay::DelayNs` directly.
//! Pass any delay implementation from your HAL.

pub mod bus;
pub mod line;

// Re-export commonly used types
pub use bus::{AddressTranslation, IdentityMapping, RegisterSpace};
pub use line::{LineInterface, ModemSignals};

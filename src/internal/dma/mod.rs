//! DMA Engine
//!
//! This module provides the per-channel DMA engine that moves frames between
//! the adapter's chained-descriptor controllers and software. All memory is
//! statically allocated using const generics.
//!
//! # Architecture
//!
//! - [`DmaEngine`]: receive and transmit rings of one channel plus the
//!   completion logic
//! - [`DescriptorRing`]: circular ring of descriptor + buffer slots with a
//!   reserved gap slot
//! - [`Descriptor`]: one hardware-visible chained descriptor

pub mod descriptor;
mod engine;
mod ring;

pub use descriptor::{Descriptor, DescriptorStatus};
pub use engine::{DmaEngine, rx_outcome};
pub use ring::DescriptorRing;

//! Handle types for mesh elements.
//!
//! Mesh elements are identified by opaque, type-safe handles backed by a
//! `u32` index. Each handle type reserves `u32::MAX` as an invalid
//! sentinel, so "no element" is representable and distinguishable without
//! an `Option` wrapper in the connectivity arrays.
//!
//! A handle is only meaningful while the referenced element exists in the
//! mesh it came from; handles are never rebound.

use std::fmt::{self, Debug};

const INVALID: u32 = u32::MAX;

/// A type-safe vertex handle.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct VertexHandle(u32);

/// A type-safe half-edge handle.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct HalfEdgeHandle(u32);

/// A type-safe face handle.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct FaceHandle(u32);

macro_rules! impl_handle_type {
    ($name:ident, $display:literal) => {
        impl $name {
            /// Create a new handle from a raw index.
            #[inline]
            pub fn new(index: usize) -> Self {
                debug_assert!(index < INVALID as usize, "index {} overflows handle", index);
                Self(index as u32)
            }

            /// Create the invalid sentinel handle.
            #[inline]
            pub fn invalid() -> Self {
                Self(INVALID)
            }

            /// Get the raw index value.
            #[inline]
            pub fn index(self) -> usize {
                self.0 as usize
            }

            /// Check if this is a valid (non-sentinel) handle.
            #[inline]
            pub fn is_valid(self) -> bool {
                self.0 != INVALID
            }
        }

        impl Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                if self.is_valid() {
                    write!(f, "{}({})", $display, self.index())
                } else {
                    write!(f, "{}(INVALID)", $display)
                }
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::invalid()
            }
        }
    };
}

impl_handle_type!(VertexHandle, "V");
impl_handle_type!(HalfEdgeHandle, "HE");
impl_handle_type!(FaceHandle, "F");

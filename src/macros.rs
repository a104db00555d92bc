//! # Internal Macros
//!
//! Boilerplate reduction for on-disk structs built from zerocopy
//! big-endian wrapper types.
//!
//! ## zerocopy_getters!
//!
//! Generates read-only getter methods for zerocopy struct fields that use
//! big-endian wrapper types (U16, U32).
//!
//! ### Usage
//!
//! ```ignore
//! use zerocopy::big_endian::{U16, U32};
//!
//! #[repr(C)]
//! struct Header {
//!     page_size: U16,
//!     change_counter: U32,
//! }
//!
//! impl Header {
//!     zerocopy_getters! {
//!         page_size: u16,
//!         change_counter: u32,
//!     }
//! }
//!
//! // Generates:
//! // pub fn page_size(&self) -> u16 { self.page_size.get() }
//! // pub fn change_counter(&self) -> u32 { self.change_counter.get() }
//! ```

/// Generates getter methods for zerocopy big-endian fields (read-only).
#[macro_export]
macro_rules! zerocopy_getters {
    ($($field:ident : $native_ty:ty),* $(,)?) => {
        $(
            #[inline]
            pub fn $field(&self) -> $native_ty {
                self.$field.get()
            }
        )*
    };
}

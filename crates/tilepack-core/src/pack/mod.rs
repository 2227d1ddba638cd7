//! Sub-byte packing of tile pixel windows.
//!
//! # Examples
//!
//! ```ignore
//! use tilepack_core::pack::pack_values;
//!
//! let packed = pack_values(&[0, 1, 2, 3, 4, 5, 6, 7, 0], 3).unwrap();
//! assert_eq!(packed.len(), 4);
//! ```

mod bitpack;

pub use bitpack::{
    pack_tile, pack_values, packed_len, unpack_values, PackError, PackedBuffer, PADDING_VALUE,
};

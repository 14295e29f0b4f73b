//! read-tools from crates.io extended with float functions.
//!
//! There are some surprise allocations in here because
//! doing the conversion without transmute requires two steps.
//!
//! Little-endian only; the on-disk matrix formats are declared
//! non-portable across endianness anyway.

extern crate byte_tools;

pub use byte_tools::{read_u32v_le, write_u32v_le, read_u64v_le, write_u64v_le};

pub fn read_f64v_le(dst: &mut [f64], src: &[u8]) {
    let mut u64s = vec![0u64; dst.len()];

    read_u64v_le(&mut u64s, src);

    for (f, i) in dst.iter_mut().zip(u64s) {
        *f = f64::from_bits(i);
    }
}

pub fn write_f64v_le(dst: &mut [u8], src: &[f64]) {
    let mut u64s = vec![0u64; src.len()];

    for (i, &f) in u64s.iter_mut().zip(src) {
        *i = f.to_bits();
    }

    write_u64v_le(dst, &u64s);
}

pub fn read_f32v_le(dst: &mut [f32], src: &[u8]) {
    let mut u32s = vec![0u32; dst.len()];

    read_u32v_le(&mut u32s, src);

    for (f, i) in dst.iter_mut().zip(u32s) {
        *f = f32::from_bits(i);
    }
}

pub fn write_f32v_le(dst: &mut [u8], src: &[f32]) {
    let mut u32s = vec![0u32; src.len()];

    for (i, &f) in u32s.iter_mut().zip(src) {
        *i = f.to_bits();
    }

    write_u32v_le(dst, &u32s);
}

/// Read a single little-endian `u32` from the first four bytes of `src`.
pub fn read_u32_le(src: &[u8]) -> u32 {
    let mut out = [0u32; 1];
    read_u32v_le(&mut out, &src[..4]);
    out[0]
}

/// Write a single `u32` into the first four bytes of `dst`.
pub fn write_u32_le(dst: &mut [u8], value: u32) {
    write_u32v_le(&mut dst[..4], &[value]);
}

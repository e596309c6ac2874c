//! Helpers for building syntactically valid modules byte by byte.
#![allow(dead_code)]

pub const HEADER: &[u8] = b"\x00asm\x01\x00\x00\x00";

pub fn leb_u32(mut v: u32) -> Vec<u8> {
    let mut out = Vec::new();
    loop {
        let mut b = (v & 0x7F) as u8;
        v >>= 7;
        if v != 0 {
            b |= 0x80;
        }
        out.push(b);
        if v == 0 {
            return out;
        }
    }
}

pub fn leb_s32(v: i32) -> Vec<u8> {
    let mut v = i64::from(v);
    let mut out = Vec::new();
    loop {
        let b = (v & 0x7F) as u8;
        v >>= 7;
        let done = (v == 0 && b & 0x40 == 0) || (v == -1 && b & 0x40 != 0);
        out.push(if done { b } else { b | 0x80 });
        if done {
            return out;
        }
    }
}

/// Assemble a module from `(section-id, content)` pairs.
pub fn module(sections: &[(u8, Vec<u8>)]) -> Vec<u8> {
    let mut out = HEADER.to_vec();
    for (id, content) in sections {
        out.push(*id);
        out.extend_from_slice(&leb_u32(content.len() as u32));
        out.extend_from_slice(content);
    }
    out
}

/// A length-prefixed vector of already-encoded items.
pub fn vec_of(items: &[Vec<u8>]) -> Vec<u8> {
    let mut out = leb_u32(items.len() as u32);
    for item in items {
        out.extend_from_slice(item);
    }
    out
}

pub fn name(s: &str) -> Vec<u8> {
    let mut out = leb_u32(s.len() as u32);
    out.extend_from_slice(s.as_bytes());
    out
}

/// A functype entry: `0x60` marker, params, results.
pub fn func_type(params: &[u8], results: &[u8]) -> Vec<u8> {
    let mut out = vec![0x60];
    out.extend_from_slice(&leb_u32(params.len() as u32));
    out.extend_from_slice(params);
    out.extend_from_slice(&leb_u32(results.len() as u32));
    out.extend_from_slice(results);
    out
}

pub fn import_func(module: &str, field: &str, type_idx: u32) -> Vec<u8> {
    let mut out = name(module);
    out.extend_from_slice(&name(field));
    out.push(0x00);
    out.extend_from_slice(&leb_u32(type_idx));
    out
}

pub fn export_func(field: &str, index: u32) -> Vec<u8> {
    let mut out = name(field);
    out.push(0x00);
    out.extend_from_slice(&leb_u32(index));
    out
}

/// A code-section body: size-prefixed local declarations plus code.
pub fn body(locals: &[(u32, u8)], code: &[u8]) -> Vec<u8> {
    let mut inner = leb_u32(locals.len() as u32);
    for &(count, ty) in locals {
        inner.extend_from_slice(&leb_u32(count));
        inner.push(ty);
    }
    inner.extend_from_slice(code);

    let mut out = leb_u32(inner.len() as u32);
    out.extend_from_slice(&inner);
    out
}

/// An active data segment at `i32.const offset`.
pub fn data_segment(mem_idx: u32, offset: i32, bytes: &[u8]) -> Vec<u8> {
    let mut out = leb_u32(mem_idx);
    out.push(0x41);
    out.extend_from_slice(&leb_s32(offset));
    out.push(0x0B);
    out.extend_from_slice(&leb_u32(bytes.len() as u32));
    out.extend_from_slice(bytes);
    out
}

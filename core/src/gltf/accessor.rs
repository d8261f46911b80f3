//! Accessor decoding: typed, strided, possibly-normalized reads out of raw
//! buffer bytes.
//!
//! All reads are bounds-checked against the backing buffer; a short buffer
//! is an error the caller downgrades to skipping the attribute or primitive,
//! never a panic.

use gltf_dep::accessor::DataType;

use super::error::GltfError;

/// Locate an accessor's bytes in the resolved buffers.
///
/// Returns the byte slice starting at the accessor's first element and the
/// per-element stride (the buffer view's explicit stride, or tight packing).
fn accessor_slice<'a>(
    accessor: &gltf_dep::Accessor,
    buffers: &'a [Vec<u8>],
) -> Result<(&'a [u8], usize), GltfError> {
    let view = accessor.view().ok_or_else(|| {
        GltfError::Accessor(format!(
            "accessor {} has no buffer view (sparse accessors not supported)",
            accessor.index()
        ))
    })?;
    let buffer_index = view.buffer().index();
    let buffer_data = buffers
        .get(buffer_index)
        .ok_or_else(|| GltfError::Buffer(format!("buffer index {buffer_index} out of range")))?;

    let start = view.offset() + accessor.offset();
    if start > buffer_data.len() {
        return Err(GltfError::Accessor(format!(
            "accessor {} starts past the end of buffer {buffer_index}",
            accessor.index()
        )));
    }

    let element_size = accessor.data_type().size() * accessor.dimensions().multiplicity();
    let stride = view.stride().unwrap_or(element_size);

    Ok((&buffer_data[start..], stride))
}

/// Read an attribute accessor as `count` elements of `n` floats each.
///
/// Component handling:
/// - `F32`: copied through unchanged.
/// - `U8`/`U16` with the normalized flag: divided by 255 / 65535 into [0, 1].
/// - `U8`/`U16` without it: the raw integer value as a float.
///
/// Other component types are unsupported for attributes and fail the read.
pub(crate) fn read_vec_n(
    accessor: &gltf_dep::Accessor,
    n: usize,
    buffers: &[Vec<u8>],
) -> Result<Vec<f32>, GltfError> {
    let data_type = accessor.data_type();
    let component_size = match data_type {
        DataType::F32 => 4,
        DataType::U16 => 2,
        DataType::U8 => 1,
        other => {
            return Err(GltfError::Accessor(format!(
                "unsupported attribute component type {other:?}"
            )));
        }
    };
    if accessor.dimensions().multiplicity() < n {
        return Err(GltfError::Accessor(format!(
            "accessor {} has fewer than {n} components per element",
            accessor.index()
        )));
    }

    let (data, stride) = accessor_slice(accessor, buffers)?;
    let normalized = accessor.normalized();
    let count = accessor.count();
    let mut out = Vec::with_capacity(count * n);

    for i in 0..count {
        let element = i * stride;
        if element + n * component_size > data.len() {
            return Err(GltfError::Accessor(format!(
                "accessor {} data out of bounds at element {i}",
                accessor.index()
            )));
        }
        for k in 0..n {
            let at = element + k * component_size;
            let value = match data_type {
                DataType::F32 => {
                    f32::from_le_bytes([data[at], data[at + 1], data[at + 2], data[at + 3]])
                }
                DataType::U16 => {
                    let raw = u16::from_le_bytes([data[at], data[at + 1]]);
                    if normalized {
                        raw as f32 / 65535.0
                    } else {
                        raw as f32
                    }
                }
                DataType::U8 => {
                    let raw = data[at];
                    if normalized {
                        raw as f32 / 255.0
                    } else {
                        raw as f32
                    }
                }
                _ => unreachable!(),
            };
            out.push(value);
        }
    }

    Ok(out)
}

/// Read an index accessor, widening u8/u16/u32 sources to u32.
pub(crate) fn read_indices(
    accessor: &gltf_dep::Accessor,
    buffers: &[Vec<u8>],
) -> Result<Vec<u32>, GltfError> {
    let component_size = match accessor.data_type() {
        DataType::U8 => 1,
        DataType::U16 => 2,
        DataType::U32 => 4,
        other => {
            return Err(GltfError::Accessor(format!(
                "unsupported index component type {other:?}"
            )));
        }
    };

    let (data, stride) = accessor_slice(accessor, buffers)?;
    let count = accessor.count();
    let mut out = Vec::with_capacity(count);

    for i in 0..count {
        let at = i * stride;
        if at + component_size > data.len() {
            return Err(GltfError::Accessor(format!(
                "index accessor {} data out of bounds at element {i}",
                accessor.index()
            )));
        }
        let index = match accessor.data_type() {
            DataType::U8 => data[at] as u32,
            DataType::U16 => u16::from_le_bytes([data[at], data[at + 1]]) as u32,
            DataType::U32 => {
                u32::from_le_bytes([data[at], data[at + 1], data[at + 2], data[at + 3]])
            }
            _ => unreachable!(),
        };
        out.push(index);
    }

    Ok(out)
}

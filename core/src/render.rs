//! Draw-span bucketing for the two-pass render contract.
//!
//! Blended surfaces cannot share a pass with opaque ones: they must be drawn
//! after all opaque geometry, with depth writes off and alpha blending on.
//! The split keeps encounter order within each bucket; blended spans are not
//! depth-sorted against each other (an accepted approximation).

use crate::gltf::DrawSpan;

/// Draw spans partitioned by pass, each bucket in original encounter order.
///
/// Contract for the GPU layer: draw `opaque` first with depth writes enabled
/// and blending disabled, then `blended` with depth writes disabled and
/// standard alpha blending, and restore default state afterward.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DrawPasses {
    pub opaque: Vec<DrawSpan>,
    pub blended: Vec<DrawSpan>,
}

/// Partition spans into the opaque and blended passes.
pub fn split_passes(spans: &[DrawSpan]) -> DrawPasses {
    let mut passes = DrawPasses::default();
    for span in spans {
        if span.blend {
            passes.blended.push(*span);
        } else {
            passes.opaque.push(*span);
        }
    }
    passes
}

use super::framebuffer::FrameBuffer;

/// Merges one `FrameBuffer` per simulated rank into a single master
/// buffer, copying every pixel whose peer mask is `1` in rank order
/// (`spec.md` §4.N; `SPEC_FULL.md` §5.O: this crate has no MPI binding,
/// so the message-passing composer is realized as a direct in-process
/// buffer hand-off — structurally the same "region + four buffers per
/// peer" protocol, but without serialization). Writing is idempotent
/// because each pixel is owned by exactly one rank, so overlapping
/// masks (which should not occur) simply resolve to last-rank-wins.
pub fn gather(width: u32, height: u32, ranks: Vec<FrameBuffer>) -> FrameBuffer {
    let mut master = FrameBuffer::new(width, height);
    for buf in &ranks {
        for y in 0..height {
            for x in 0..width {
                if buf.mask_at(x, y) == 1 {
                    let color = buf.color_at(x, y);
                    master.set_raw(x, y, color, buf.depth_at(x, y), buf.sample_count_at(x, y), buf.irradiance_mask_at(x, y));
                }
            }
        }
    }
    for buf in ranks {
        master.increment_rendered_pixels(buf.rendered_pixels());
    }
    master
}

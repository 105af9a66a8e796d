//! Reading rendered frames back to the CPU.

use image::RgbaImage;

use crate::error::RenderError;
use crate::gpu::GpuContext;

/// Pixel size of saved snapshots, independent of the window.
pub const SNAPSHOT_SIZE: (u32, u32) = (1024, 768);

/// Bytes per row of a `width`-texel RGBA8 copy, padded to wgpu's copy alignment.
pub fn padded_bytes_per_row(width: u32) -> u32 {
    let unpadded = width * 4;
    unpadded.div_ceil(wgpu::COPY_BYTES_PER_ROW_ALIGNMENT) * wgpu::COPY_BYTES_PER_ROW_ALIGNMENT
}

/// Strips row padding and, for BGRA sources, swaps channels to RGBA.
pub fn unpad_rows(data: &[u8], width: u32, height: u32, padded_row: u32, bgra: bool) -> Vec<u8> {
    let row = (width * 4) as usize;
    let mut pixels = Vec::with_capacity(row * height as usize);
    for line in data.chunks(padded_row as usize).take(height as usize) {
        pixels.extend_from_slice(&line[..row]);
    }
    if bgra {
        for texel in pixels.chunks_exact_mut(4) {
            texel.swap(0, 2);
        }
    }
    pixels
}

/// Copies `texture` into a CPU image, blocking until the GPU is done.
///
/// Only 8-bit RGBA and BGRA formats can be read back.
pub fn read_texture(
    gpu: &GpuContext,
    texture: &wgpu::Texture,
    size: (u32, u32),
    format: wgpu::TextureFormat,
) -> Result<RgbaImage, RenderError> {
    let bgra = match format {
        wgpu::TextureFormat::Bgra8Unorm | wgpu::TextureFormat::Bgra8UnormSrgb => true,
        wgpu::TextureFormat::Rgba8Unorm | wgpu::TextureFormat::Rgba8UnormSrgb => false,
        other => return Err(RenderError::Readback(format!("unsupported format {other:?}"))),
    };

    let (width, height) = size;
    let padded_row = padded_bytes_per_row(width);

    let readback = gpu.device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("Snapshot Readback"),
        size: padded_row as u64 * height as u64,
        usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
        mapped_at_creation: false,
    });

    let mut encoder = gpu
        .device
        .create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Snapshot Copy Encoder"),
        });
    encoder.copy_texture_to_buffer(
        wgpu::TexelCopyTextureInfo {
            texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        wgpu::TexelCopyBufferInfo {
            buffer: &readback,
            layout: wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(padded_row),
                rows_per_image: Some(height),
            },
        },
        wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
    );
    gpu.queue.submit(std::iter::once(encoder.finish()));

    let slice = readback.slice(..);
    let (tx, rx) = std::sync::mpsc::channel();
    slice.map_async(wgpu::MapMode::Read, move |res| {
        let _ = tx.send(res);
    });
    gpu.device
        .poll(wgpu::PollType::wait_indefinitely())
        .map_err(|e| RenderError::Readback(e.to_string()))?;

    match rx.recv() {
        Ok(Ok(())) => {}
        Ok(Err(e)) => return Err(RenderError::Readback(e.to_string())),
        Err(e) => return Err(RenderError::Readback(e.to_string())),
    }

    let pixels = {
        let data = slice.get_mapped_range();
        unpad_rows(&data, width, height, padded_row, bgra)
    };
    readback.unmap();

    RgbaImage::from_raw(width, height, pixels)
        .ok_or_else(|| RenderError::Readback("pixel buffer too small".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_pad_to_copy_alignment() {
        assert_eq!(padded_bytes_per_row(64), 256);
        assert_eq!(padded_bytes_per_row(65), 512);
        assert_eq!(padded_bytes_per_row(1024), 4096);
        assert_eq!(padded_bytes_per_row(1), 256);
    }

    #[test]
    fn padding_is_dropped() {
        let padded = padded_bytes_per_row(2);
        let mut data = vec![0xAA; (padded * 2) as usize];
        data[..8].copy_from_slice(&[1, 2, 3, 4, 5, 6, 7, 8]);
        data[padded as usize..padded as usize + 8].copy_from_slice(&[9, 10, 11, 12, 13, 14, 15, 16]);

        let pixels = unpad_rows(&data, 2, 2, padded, false);
        assert_eq!(pixels, (1..=16).collect::<Vec<u8>>());
    }

    #[test]
    fn bgra_is_swizzled() {
        let padded = padded_bytes_per_row(1);
        let mut data = vec![0; padded as usize];
        data[..4].copy_from_slice(&[30, 20, 10, 255]);

        assert_eq!(unpad_rows(&data, 1, 1, padded, true), vec![10, 20, 30, 255]);
    }
}

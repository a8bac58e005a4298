//! Headless walk through the paint paths of one browser surface.
//!
//! Feeds a scripted sequence of browser paint events into a
//! [`PaintDispatcher`] backed by a real wgpu device and logs what each one
//! did. Run with `RUST_LOG=debug` to see the engine's own decisions.

use anyhow::Result;
use bytemuck::{Pod, Zeroable};

use webtex_engine::coords::{PixelRect, PixelSize};
use webtex_engine::device::{Gpu, GpuInit, WgpuBackend};
use webtex_engine::import::{
    acceleration_support, AcceleratedPaintInfo, ColorType, DmaBufInfo, HostCapabilities,
};
use webtex_engine::logging::{init_logging, LoggingConfig};
use webtex_engine::platform::Platform;
use webtex_engine::resource::TextureTable;
use webtex_engine::{PaintDispatcher, PaintError, PaintLayer, PaintOutcome, SurfaceInit};

/// One pixel as the browser engine lays it out in memory.
#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
struct Bgra {
    b: u8,
    g: u8,
    r: u8,
    a: u8,
}

impl Bgra {
    const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { b, g, r, a: 255 }
    }
}

/// A frame with a horizontal gradient tinted by `tint`.
fn frame(size: PixelSize, tint: Bgra) -> Vec<Bgra> {
    let mut pixels = Vec::with_capacity(size.width as usize * size.height as usize);
    for _y in 0..size.height {
        for x in 0..size.width {
            let shade = (x * 255 / size.width.max(1)) as u8;
            pixels.push(Bgra {
                b: tint.b / 2 + shade / 2,
                g: tint.g,
                r: tint.r,
                a: 255,
            });
        }
    }
    pixels
}

fn report(step: &str, result: Result<PaintOutcome, PaintError>) {
    match result {
        Ok(outcome) => log::info!("{step}: {outcome:?}"),
        Err(e) => log::info!("{step}: dropped ({:?}) {e}", e.kind()),
    }
}

fn main() -> Result<()> {
    init_logging(LoggingConfig::default());

    let gpu = Gpu::headless_blocking(GpuInit::default())?;
    let adapter = gpu.adapter_info();
    log::info!("demo: running on {} ({:?})", adapter.name, adapter.backend);

    let support = acceleration_support(|| HostCapabilities {
        platform: Platform::current(),
        dmabuf_renderer_disabled: HostCapabilities::dmabuf_renderer_disabled_from_env(),
        ..Default::default()
    });
    log::info!("demo: accelerated paint supported={} beta={}", support.supported, support.beta);

    let table = TextureTable::new();
    let backend = WgpuBackend::new(gpu.device().clone(), gpu.queue().clone());
    let mut surface = PaintDispatcher::new(
        backend,
        table.clone(),
        SurfaceInit {
            transparent: true,
            ..Default::default()
        },
    );

    // ── base layer ────────────────────────────────────────────────────────

    let size = PixelSize::new(640, 360);
    let page = frame(size, Bgra::rgb(30, 60, 90));
    report(
        "full paint",
        surface.on_software_paint(PaintLayer::Base, &[size.bounds()], bytemuck::cast_slice(&page), size),
    );

    let page = frame(size, Bgra::rgb(90, 60, 30));
    let dirty = [PixelRect::new(0, 0, 64, 32), PixelRect::new(600, 340, 80, 80)];
    report(
        "partial paint",
        surface.on_software_paint(PaintLayer::Base, &dirty, bytemuck::cast_slice(&page), size),
    );

    report(
        "empty paint",
        surface.on_software_paint(PaintLayer::Base, &[], bytemuck::cast_slice(&page), size),
    );

    // ── popup ─────────────────────────────────────────────────────────────

    let bounds = PixelRect::new(40, 40, 200, 120);
    surface.on_popup_resize(bounds);
    surface.on_popup_show(true);

    let menu_size = bounds.size();
    let menu = vec![Bgra::rgb(240, 240, 240); menu_size.width as usize * menu_size.height as usize];
    report(
        "popup paint",
        surface.on_software_paint(
            PaintLayer::Popup,
            &[menu_size.bounds()],
            bytemuck::cast_slice(&menu),
            menu_size,
        ),
    );
    report(
        "paint under popup",
        surface.on_software_paint(PaintLayer::Base, &dirty, bytemuck::cast_slice(&page), size),
    );

    surface.on_popup_show(false);
    report(
        "paint after popup hide",
        surface.on_software_paint(PaintLayer::Base, &dirty, bytemuck::cast_slice(&page), size),
    );
    log::info!("demo: popup retained after hide: {:?}", surface.popup().bounds());

    // ── resize ────────────────────────────────────────────────────────────

    let size = PixelSize::new(800, 600);
    let page = frame(size, Bgra::rgb(10, 200, 120));
    report(
        "resized paint",
        surface.on_software_paint(
            PaintLayer::Base,
            &[PixelRect::new(0, 0, 10, 10)],
            bytemuck::cast_slice(&page),
            size,
        ),
    );

    // ── accelerated ───────────────────────────────────────────────────────

    // wgpu exposes no EGL context, so this falls back to the software frame.
    let info = AcceleratedPaintInfo::DmaBuf(DmaBufInfo {
        format: ColorType::RAW_BGRA_8888,
        width: size.width,
        height: size.height,
        plane_count: 1,
        fds: vec![-1],
        strides: vec![size.width * 4],
        offsets: vec![0],
        sizes: vec![size.byte_len() as u64],
        modifier: 0,
    });
    report(
        "accelerated paint",
        surface.on_accelerated_paint(PaintLayer::Base, &[size.bounds()], &info),
    );

    // ── host view ─────────────────────────────────────────────────────────

    let bound = table.lookup(surface.identifier());
    let sampled = bound.and_then(|id| surface.backend().texture(id));
    log::info!(
        "demo: {} -> {:?} ready={} accelerated={} bgra={} transparent={} texture={:?}",
        surface.identifier(),
        bound,
        surface.is_ready(),
        surface.is_accelerated(),
        surface.is_bgra_order(),
        surface.is_transparent(),
        sampled.map(|t| t.size()),
    );

    gpu.flush();

    surface.close();
    surface.close();
    log::info!(
        "demo: closed, current texture {:?}, live textures {}",
        surface.current_texture(),
        surface.backend().len()
    );

    Ok(())
}

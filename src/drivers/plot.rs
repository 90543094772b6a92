use std::fs;
use std::io::Cursor;
use std::path::PathBuf;
use image::{DynamicImage, ImageBuffer, ImageFormat, Rgb};
use log::debug;
use plotters::prelude::LineSeries;
use plotters::prelude::*;
use crate::drivers::error::StreamError;
use crate::drivers::renderer::{FrameSink, RenderFrame};
use crate::types::SensorGroup;
#[derive(Clone, Debug)]
pub struct PlotStyle {
    pub width: u32,
    pub height: u32,
    pub background: RGBColor,
    /// Series colours, cycled. An empty palette draws every series in white.
    pub palette: Vec<RGBColor>,
    /// Captions, axis labels and legends. Needs a system font.
    pub draw_text: bool,
}
impl Default for PlotStyle {
    fn default() -> Self {
        Self {
            width: 900,
            height: 700,
            background: RGBColor(10, 10, 10),
            palette: vec![BLUE, RED, GREEN],
            draw_text: true,
        }
    }
}
/// Draws the acceleration panel above the gyro panel and encodes the result as PNG.
pub fn render_frame_png(frame: &RenderFrame, style: &PlotStyle) -> Result<Vec<u8>, StreamError> {
    if frame.point_count() == 0 {
        return Err(StreamError::Plot("render frame has no points".into()));
    }
    let mut buffer = vec![0u8; (style.width * style.height * 3) as usize];
    {
        let root = BitMapBackend::with_buffer(&mut buffer, (style.width, style.height))
            .into_drawing_area();
        root.fill(&style.background)?;
        let panels = root.split_evenly((SensorGroup::ALL.len(), 1));
        for (panel, group) in panels.iter().zip(SensorGroup::ALL) {
            draw_group(panel, frame, group, style)?;
        }
        root.present()?;
    }
    encode_png(&buffer, style.width, style.height)
}
fn draw_group<DB: DrawingBackend>(
    area: &DrawingArea<DB, plotters::coord::Shift>,
    frame: &RenderFrame,
    group: SensorGroup,
    style: &PlotStyle,
) -> Result<(), StreamError>
where
    DB::ErrorType: 'static,
{
    let Some((x_range, y_range)) = frame.ranges(group) else {
        return Ok(());
    };
    // plotters rejects an empty span
    let x_max = if x_range.width() > 0.0 {
        x_range.max
    } else {
        x_range.min + 1e-3
    };
    let mut builder = ChartBuilder::on(area);
    builder.margin(10);
    if style.draw_text {
        builder
            .caption(group.title(), ("sans-serif", 18).into_font().color(&WHITE))
            .set_label_area_size(LabelAreaPosition::Left, 55)
            .set_label_area_size(LabelAreaPosition::Bottom, 35);
    }
    let mut chart = builder.build_cartesian_2d(x_range.min..x_max, y_range.min..y_range.max)?;
    if style.draw_text {
        chart
            .configure_mesh()
            .x_desc("Time [s]")
            .y_desc(group.unit_label())
            .axis_desc_style(("sans-serif", 14).into_font().color(&WHITE))
            .label_style(("sans-serif", 12).into_font().color(&WHITE))
            .light_line_style(WHITE.mix(0.1))
            .draw()?;
    }
    for (idx, (name, label)) in group
        .series_names()
        .iter()
        .zip(group.series_labels())
        .enumerate()
    {
        let color = match style.palette.len() {
            0 => WHITE,
            n => style.palette[idx % n],
        };
        let series = frame.series(name).iter().map(|p| (p.time, p.value));
        let drawn = chart.draw_series(LineSeries::new(series, &color))?;
        if style.draw_text {
            drawn
                .label(label)
                .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color));
        }
    }
    if style.draw_text {
        chart
            .configure_series_labels()
            .border_style(WHITE.mix(0.2))
            .background_style(style.background)
            .label_font(("sans-serif", 12).into_font().color(&WHITE))
            .draw()?;
    }
    Ok(())
}
fn encode_png(buffer: &[u8], width: u32, height: u32) -> Result<Vec<u8>, StreamError> {
    let image = ImageBuffer::<Rgb<u8>, _>::from_raw(width, height, buffer.to_vec())
        .ok_or_else(|| StreamError::Plot("failed to allocate image buffer".into()))?;
    let mut output = Vec::new();
    let dynamic = DynamicImage::ImageRgb8(image);
    dynamic.write_to(&mut Cursor::new(&mut output), ImageFormat::Png)?;
    Ok(output)
}
/// Rewrites one PNG file on every frame.
pub struct PngFileSink {
    path: PathBuf,
    style: PlotStyle,
}
impl PngFileSink {
    pub fn new(path: impl Into<PathBuf>, style: PlotStyle) -> Self {
        Self {
            path: path.into(),
            style,
        }
    }
}
impl FrameSink for PngFileSink {
    fn present(&mut self, frame: &RenderFrame) -> Result<(), StreamError> {
        let png = render_frame_png(frame, &self.style)?;
        // write then rename so viewers never pick up a half-written file
        let tmp = self.path.with_extension("png.tmp");
        fs::write(&tmp, &png)?;
        fs::rename(&tmp, &self.path)?;
        debug!("plot written to {} ({} bytes)", self.path.display(), png.len());
        Ok(())
    }
}
#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StreamConfig;
    use crate::drivers::{FanoutDistributor, WindowRenderer};
    use crate::types::Sample;
    fn frame_with_samples(count: u64) -> RenderFrame {
        let mut fanout = FanoutDistributor::new();
        let mut renderer = WindowRenderer::new(fanout.subscribe("plot"), &StreamConfig::default());
        for i in 0..count {
            let t = i as f64 * 0.01;
            fanout.distribute(&Sample {
                index: i,
                timestamp: t,
                gyro: [t.sin() * 50.0, t.cos() * 20.0, 0.0],
                accel: [0.0, 0.1, 1.0],
            });
        }
        renderer.tick().unwrap_or_default()
    }
    fn textless() -> PlotStyle {
        PlotStyle {
            width: 320,
            height: 240,
            draw_text: false,
            ..PlotStyle::default()
        }
    }
    #[test]
    fn renders_png_bytes() {
        let png = render_frame_png(&frame_with_samples(50), &textless()).unwrap();
        assert_eq!(&png[1..4], b"PNG");
    }
    #[test]
    fn single_point_frame_still_renders() {
        assert!(render_frame_png(&frame_with_samples(1), &textless()).is_ok());
    }
    #[test]
    fn empty_palette_falls_back_to_white() {
        let style = PlotStyle {
            palette: Vec::new(),
            ..textless()
        };
        let png = render_frame_png(&frame_with_samples(20), &style).unwrap();
        assert_eq!(&png[1..4], b"PNG");
    }
    #[test]
    fn empty_frame_is_rejected() {
        let err = render_frame_png(&RenderFrame::default(), &textless()).unwrap_err();
        assert!(matches!(err, StreamError::Plot(_)));
    }
    #[test]
    fn file_sink_writes_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plot.png");
        let mut sink = PngFileSink::new(&path, textless());
        sink.present(&frame_with_samples(10)).unwrap();
        assert!(fs::metadata(&path).unwrap().len() > 0);
    }
}

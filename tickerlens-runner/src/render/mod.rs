//! Chart rendering: closing-price line charts encoded as PNG.
//!
//! Charts are drawn into an in-memory RGB buffer with plotters and encoded
//! with `image`, so rendering never touches the filesystem. Output is
//! deterministic for identical input and style.

mod fonts;

use chrono::{Duration, NaiveDate};
use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder};
use plotters::prelude::*;
use plotters::style::{Palette, Palette99};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use thiserror::Error;
use tickerlens_core::domain::Series;

pub use fonts::ensure_font;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("nothing to plot for {label}: no close values")]
    EmptySeries { label: String },

    #[error("chart drawing failed: {0}")]
    Backend(String),

    #[error("PNG encoding failed: {0}")]
    Encode(String),
}

/// Canvas sizes and line styling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ChartStyle {
    pub width: u32,
    pub height: u32,
    pub combined_width: u32,
    pub combined_height: u32,
    pub line_width: u32,
    /// TrueType font for titles, axes and legends
    pub font_path: Option<PathBuf>,
}

impl Default for ChartStyle {
    fn default() -> Self {
        Self {
            width: 1000,
            height: 400,
            combined_width: 1200,
            combined_height: 600,
            line_width: 2,
            font_path: None,
        }
    }
}

/// An encoded PNG plus its pixel dimensions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image {
    pub width: u32,
    pub height: u32,
    pub png: Vec<u8>,
}

struct Line {
    label: String,
    points: Vec<(NaiveDate, f64)>,
}

impl Line {
    fn of(label: String, series: &Series) -> Option<Self> {
        let points: Vec<_> = series
            .closes()
            .into_iter()
            .filter(|(_, close)| close.is_finite())
            .collect();
        (!points.is_empty()).then_some(Self { label, points })
    }
}

/// Line chart of one series' closes over time.
pub fn render(series: &Series, label: &str, style: &ChartStyle) -> Result<Image, RenderError> {
    let line = Line::of(format!("{label} Close"), series).ok_or_else(|| {
        RenderError::EmptySeries {
            label: label.to_string(),
        }
    })?;
    draw_chart(
        &format!("{label} Closing Price"),
        &[line],
        (style.width, style.height),
        style,
    )
}

/// All series' closes on shared axes, one line and legend entry per label.
///
/// Series without closes are left out. Fails only when none remain.
pub fn render_combined(
    series_by_label: &BTreeMap<&str, &Series>,
    style: &ChartStyle,
) -> Result<Image, RenderError> {
    let lines: Vec<Line> = series_by_label
        .iter()
        .filter_map(|(label, series)| Line::of(label.to_string(), series))
        .collect();
    if lines.is_empty() {
        return Err(RenderError::EmptySeries {
            label: "combined".into(),
        });
    }
    draw_chart(
        "Closing Price Comparison",
        &lines,
        (style.combined_width, style.combined_height),
        style,
    )
}

fn draw_chart(
    title: &str,
    lines: &[Line],
    (width, height): (u32, u32),
    style: &ChartStyle,
) -> Result<Image, RenderError> {
    if width == 0 || height == 0 {
        return Err(RenderError::Backend(format!(
            "invalid canvas size {width}x{height}"
        )));
    }
    let (origin, last) = date_bounds(lines)
        .ok_or_else(|| RenderError::Backend("no points to draw".into()))?;
    let span = i32::try_from((last - origin).num_days())
        .unwrap_or(i32::MAX)
        .max(1);
    let (lo, hi) = price_bounds(lines);
    let text = ensure_font(style.font_path.as_deref());

    let mut buf = vec![0u8; width as usize * height as usize * 3];
    {
        let root = BitMapBackend::with_buffer(&mut buf, (width, height)).into_drawing_area();
        root.fill(&WHITE).map_err(backend_err)?;

        let mut builder = ChartBuilder::on(&root);
        builder.margin(16);
        if text {
            builder
                .caption(title, (fonts::FAMILY, 22))
                .x_label_area_size(40)
                .y_label_area_size(64);
        }
        let mut chart = builder
            .build_cartesian_2d(0..span, lo..hi)
            .map_err(backend_err)?;

        if text {
            let date_label = |offset: &i32| {
                (origin + Duration::days(i64::from(*offset)))
                    .format("%Y-%m-%d")
                    .to_string()
            };
            chart
                .configure_mesh()
                .x_desc("Date")
                .y_desc("Price (USD)")
                .x_labels(6)
                .x_label_formatter(&date_label)
                .y_label_formatter(&|v: &f64| format!("{v:.2}"))
                .label_style((fonts::FAMILY, 13))
                .draw()
                .map_err(backend_err)?;
        }

        for (i, line) in lines.iter().enumerate() {
            let color = Palette99::pick(i).to_rgba();
            let points = line
                .points
                .iter()
                .map(|(date, close)| (day_offset(origin, *date), *close));
            let anno = chart
                .draw_series(LineSeries::new(points, color.stroke_width(style.line_width)))
                .map_err(backend_err)?;
            if text {
                anno.label(line.label.clone()).legend(move |(x, y)| {
                    PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2))
                });
            }
        }

        if text {
            chart
                .configure_series_labels()
                .position(SeriesLabelPosition::UpperLeft)
                .label_font((fonts::FAMILY, 14))
                .background_style(WHITE.mix(0.8))
                .border_style(BLACK)
                .draw()
                .map_err(backend_err)?;
        }

        root.present().map_err(backend_err)?;
    }

    encode_png(&buf, width, height)
}

fn encode_png(rgb: &[u8], width: u32, height: u32) -> Result<Image, RenderError> {
    let mut png = Vec::new();
    PngEncoder::new(&mut png)
        .write_image(rgb, width, height, ExtendedColorType::Rgb8)
        .map_err(|e| RenderError::Encode(e.to_string()))?;
    Ok(Image { width, height, png })
}

fn backend_err(e: impl std::fmt::Display) -> RenderError {
    RenderError::Backend(e.to_string())
}

fn day_offset(origin: NaiveDate, date: NaiveDate) -> i32 {
    i32::try_from((date - origin).num_days()).unwrap_or(i32::MAX)
}

fn date_bounds(lines: &[Line]) -> Option<(NaiveDate, NaiveDate)> {
    let first = lines.iter().filter_map(|l| l.points.first()).map(|p| p.0).min()?;
    let last = lines.iter().filter_map(|l| l.points.last()).map(|p| p.0).max()?;
    Some((first, last))
}

/// Value range of all lines, padded by 5% so lines never touch the frame.
fn price_bounds(lines: &[Line]) -> (f64, f64) {
    let (min, max) = lines
        .iter()
        .flat_map(|l| l.points.iter().map(|p| p.1))
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
    let pad = if max > min {
        (max - min) * 0.05
    } else {
        (max.abs() * 0.05).max(1.0)
    };
    (min - pad, max + pad)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tickerlens_core::domain::PriceRecord;

    fn series(symbol: &str, closes: &[Option<f64>]) -> Series {
        let start = NaiveDate::from_ymd_opt(2023, 1, 2).unwrap();
        let records = closes
            .iter()
            .zip(start.iter_days())
            .map(|(close, date)| PriceRecord {
                date,
                open: Some(1.0),
                high: Some(1.0),
                low: Some(1.0),
                close: *close,
                volume: Some(1),
            })
            .collect();
        Series::new(symbol, records)
    }

    fn decode(image: &Image) -> (u32, u32) {
        let decoded =
            image::load_from_memory_with_format(&image.png, image::ImageFormat::Png).unwrap();
        (decoded.width(), decoded.height())
    }

    #[test]
    fn renders_png_of_requested_size() {
        let style = ChartStyle::default();
        let image = render(&series("AAPL", &[Some(100.0), Some(101.5), Some(99.0)]), "AAPL", &style)
            .unwrap();

        assert_eq!(&image.png[..8], b"\x89PNG\r\n\x1a\n");
        assert_eq!((image.width, image.height), (1000, 400));
        assert_eq!(decode(&image), (1000, 400));
    }

    #[test]
    fn rendering_is_deterministic() {
        let style = ChartStyle::default();
        let s = series("MSFT", &[Some(10.0), Some(12.0), None, Some(11.0)]);
        let a = render(&s, "MSFT", &style).unwrap();
        let b = render(&s, "MSFT", &style).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn empty_series_is_an_error() {
        let style = ChartStyle::default();
        let err = render(&Series::empty("NONE"), "NONE", &style).unwrap_err();
        assert!(matches!(err, RenderError::EmptySeries { ref label } if label == "NONE"));

        let all_missing = series("GAP", &[None, None]);
        assert!(render(&all_missing, "GAP", &style).is_err());
    }

    #[test]
    fn single_point_and_flat_series_render() {
        let style = ChartStyle::default();
        assert!(render(&series("ONE", &[Some(5.0)]), "ONE", &style).is_ok());
        assert!(render(&series("FLAT", &[Some(5.0); 4]), "FLAT", &style).is_ok());
    }

    #[test]
    fn combined_skips_empty_members() {
        let style = ChartStyle::default();
        let a = series("AAPL", &[Some(100.0), Some(101.0)]);
        let empty = Series::empty("TSLA");
        let map: BTreeMap<&str, &Series> = [("AAPL", &a), ("TSLA", &empty)].into_iter().collect();

        let image = render_combined(&map, &style).unwrap();
        assert_eq!(decode(&image), (1200, 600));

        let only_empty: BTreeMap<&str, &Series> = [("TSLA", &empty)].into_iter().collect();
        assert!(matches!(
            render_combined(&only_empty, &style),
            Err(RenderError::EmptySeries { .. })
        ));
    }

    #[test]
    fn price_bounds_pad_flat_lines() {
        let line = Line {
            label: "x".into(),
            points: vec![(NaiveDate::from_ymd_opt(2023, 1, 2).unwrap(), 0.0)],
        };
        let (lo, hi) = price_bounds(&[line]);
        assert!(lo < 0.0 && hi > 0.0);
    }
}

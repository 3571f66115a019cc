//! Grid of deviation-versus-pressure scatter plots, one panel per isotherm.
//!
//! Shaping the deviation records into [`Panel`]s is kept apart from drawing them, so the grouping
//! can be checked without producing an image.
use std::f64::consts::{FRAC_PI_4, PI, TAU};
use std::path::Path;

use itertools::{Itertools, MinMaxResult};
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::register_font;

use crate::config::PlotOptions;
use crate::correlation::Correlation;
use crate::dataset::{MarkerSymbol, ReferenceData};
use crate::deviation::compute_deviations;
use crate::{Error, Result};

const COLUMNS: usize = 2;
const MARKER_SIZE: i32 = 4;
const LEGEND_COLUMNS: usize = 5;
const LEGEND_ROW_HEIGHT: i32 = 24;

/// Deviations of one correlation against one source on one isotherm
#[derive(Clone, Debug, PartialEq)]
pub struct Series {
    pub correlation: Correlation,
    pub source_label: String,
    pub marker: MarkerSymbol,
    /// (pressure in MPa, relative deviation in percent)
    pub points: Vec<(f64, f64)>,
}

impl Series {
    #[must_use]
    pub fn label(&self) -> String {
        format!("{} ({})", self.correlation, self.source_label)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Panel {
    pub temperature: f64,
    pub series: Vec<Series>,
}

impl Panel {
    fn pressure_range(&self) -> Option<(f64, f64)> {
        let pressures = self
            .series
            .iter()
            .flat_map(|series| series.points.iter().map(|(pressure, _)| *pressure));
        match pressures.minmax() {
            MinMaxResult::NoElements => None,
            MinMaxResult::OneElement(p) => Some((p, p)),
            MinMaxResult::MinMax(low, high) => Some((low, high)),
        }
    }
}

/// Compute the deviations for every isotherm and correlation and group them for plotting
///
/// Within a panel the series are ordered by correlation, in the order given, and then by source in
/// provider order.
///
/// # Errors
/// Propagates errors from [`compute_deviations`].
pub fn build_panels(
    data: &impl ReferenceData,
    temperatures: &[f64],
    correlations: &[Correlation],
) -> Result<Vec<Panel>> {
    temperatures
        .iter()
        .map(|&temperature| {
            let mut series = vec![];
            for &correlation in correlations {
                let records = compute_deviations(data, temperature, correlation)?;
                let grouped = records.iter().group_by(|record| record.source_label.clone());
                for (source_label, group) in &grouped {
                    let group = group.collect::<Vec<_>>();
                    series.push(Series {
                        correlation,
                        source_label,
                        marker: group[0].marker_symbol,
                        points: group
                            .iter()
                            .map(|record| (record.pressure, record.relative_deviation_pct))
                            .collect(),
                    });
                }
            }
            if series.is_empty() {
                log::warn!("No data found at {temperature}K, the panel will be empty");
            }
            Ok(Panel {
                temperature,
                series,
            })
        })
        .collect()
}

/// Draw `panels` into an image at `path`
///
/// Files ending in `.svg` are written as SVG, everything else as a PNG bitmap.
///
/// # Errors
/// Returns [`Error::Render`] if the backend fails to draw or write the image.
pub fn render(panels: &[Panel], options: &PlotOptions, path: &Path) -> Result<()> {
    register_fonts()?;
    let size = (options.width, options.height);
    let is_svg = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("svg"));

    if is_svg {
        draw_grid(&SVGBackend::new(path, size).into_drawing_area(), panels, options)?;
    } else {
        draw_grid(&BitMapBackend::new(path, size).into_drawing_area(), panels, options)?;
    }

    log::info!("wrote {} panels to {}", panels.len(), path.display());
    Ok(())
}

#[allow(clippy::needless_pass_by_value)]
fn render_error(e: impl std::fmt::Display) -> Error {
    Error::Render(e.to_string())
}

/// Make the bundled DejaVu Sans the `sans-serif` family used by every caption and label
fn register_fonts() -> Result<()> {
    register_font(
        FontFamily::SansSerif.as_str(),
        FontStyle::Normal,
        include_bytes!("../assets/fonts/DejaVuSans.ttf"),
    )
    .map_err(|_| Error::Render("the bundled font could not be parsed".to_owned()))
}

const fn colour(correlation: Correlation) -> RGBColor {
    match correlation {
        Correlation::Kta => BLACK,
        Correlation::KtaMod => RED,
        Correlation::KtaTweak => BLUE,
    }
}

type Offset = (i32, i32);

/// Marker outline in pixels relative to the data point, y pointing down
#[derive(Clone, Debug, PartialEq, Eq)]
enum Glyph {
    Round,
    /// Closed polygon, filled or drawn as an outline
    Outline(Vec<Offset>),
    /// Open polyline, always stroked
    Strokes(Vec<Offset>),
}

/// `corners` points on a circle starting straight up, cycling through `radii` (in marker sizes)
#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
fn ring(corners: usize, radii: &[f64], rotation: f64) -> Vec<Offset> {
    (0..corners)
        .map(|k| {
            let angle = rotation + TAU * k as f64 / corners as f64;
            let radius = radii[k % radii.len()] * f64::from(MARKER_SIZE);
            (
                (radius * angle.sin()).round() as i32,
                (-radius * angle.cos()).round() as i32,
            )
        })
        .collect()
}

fn glyph(marker: MarkerSymbol) -> Glyph {
    let s = MARKER_SIZE;
    match marker {
        MarkerSymbol::Circle => Glyph::Round,
        MarkerSymbol::Square => Glyph::Outline(ring(4, &[1.4], FRAC_PI_4)),
        MarkerSymbol::TriangleUp => Glyph::Outline(ring(3, &[1.25], 0.)),
        MarkerSymbol::TriangleDown => Glyph::Outline(ring(3, &[1.25], PI)),
        MarkerSymbol::Diamond => Glyph::Outline(ring(4, &[1.3], 0.)),
        MarkerSymbol::ThinDiamond => {
            Glyph::Outline(vec![(0, -s - 1), (s / 2 + 1, 0), (0, s + 1), (-s / 2 - 1, 0)])
        }
        MarkerSymbol::Star => Glyph::Outline(ring(10, &[1.4, 0.6], 0.)),
        MarkerSymbol::Pentagon => Glyph::Outline(ring(5, &[1.2], 0.)),
        MarkerSymbol::Hexagon => Glyph::Outline(ring(6, &[1.2], 0.)),
        MarkerSymbol::Cross => Glyph::Strokes(vec![(-s, -s), (s, s), (0, 0), (-s, s), (s, -s)]),
        MarkerSymbol::Plus => Glyph::Strokes(vec![(-s, 0), (s, 0), (0, 0), (0, -s), (0, s)]),
        MarkerSymbol::TriUp => {
            let spokes = ring(3, &[1.25], 0.);
            Glyph::Strokes(vec![spokes[0], (0, 0), spokes[1], (0, 0), spokes[2]])
        }
    }
}

/// The marker for `marker` centred on `coord`, usable both on a chart and in the legend strip
fn marker_element<'a, DB, Coord>(
    coord: Coord,
    marker: MarkerSymbol,
    colour: RGBColor,
) -> DynElement<'a, DB, Coord>
where
    DB: DrawingBackend + 'a,
    Coord: Clone + 'a,
{
    let at = EmptyElement::at(coord);
    let style = if marker.is_filled() {
        colour.filled()
    } else {
        colour.stroke_width(1)
    };
    match glyph(marker) {
        Glyph::Round => (at + Circle::new((0, 0), MARKER_SIZE, style)).into_dyn(),
        Glyph::Outline(corners) if style.filled => (at + Polygon::new(corners, style)).into_dyn(),
        Glyph::Outline(mut corners) => {
            corners.push(corners[0]);
            (at + PathElement::new(corners, style)).into_dyn()
        }
        Glyph::Strokes(path) => (at + PathElement::new(path, colour.stroke_width(2))).into_dyn(),
    }
}

/// One legend entry per distinct series label, in order of first appearance across the panels
fn legend_entries(panels: &[Panel]) -> Vec<&Series> {
    panels
        .iter()
        .flat_map(|panel| &panel.series)
        .unique_by(|series| series.label())
        .collect()
}

fn draw_grid<DB: DrawingBackend >(
    root: &DrawingArea<DB, Shift>,
    panels: &[Panel],
    options: &PlotOptions,
) -> Result<()> {
    root.fill(&WHITE).map_err(render_error)?;
    let titled = root
        .titled("ARD Plots", ("sans-serif", 24))
        .map_err(render_error)?;

    let entries = legend_entries(panels);
    let legend_rows = i32::try_from(entries.len().div_ceil(LEGEND_COLUMNS)).unwrap_or(0);
    let (_, height) = titled.dim_in_pixel();
    let grid_height = i32::try_from(height).unwrap_or(i32::MAX) - legend_rows * LEGEND_ROW_HEIGHT;
    let (grid, legend) = titled.split_vertically(grid_height.max(0));

    let rows = panels.len().div_ceil(COLUMNS).max(1);
    let bottom_row = (rows - 1) * COLUMNS;
    for (index, (area, panel)) in grid
        .split_evenly((rows, COLUMNS))
        .iter()
        .zip(panels)
        .enumerate()
    {
        draw_panel(area, panel, options, index >= bottom_row)?;
    }
    draw_legend(&legend, &entries)?;

    root.present().map_err(render_error)
}

/// Lay the legend entries out in rows of [`LEGEND_COLUMNS`] below the panels
#[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
fn draw_legend<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    entries: &[&Series],
) -> Result<()> {
    let (width, _) = area.dim_in_pixel();
    let column_width = width as i32 / LEGEND_COLUMNS as i32;
    for (index, series) in entries.iter().enumerate() {
        let x = column_width * (index % LEGEND_COLUMNS) as i32 + 20;
        let y = LEGEND_ROW_HEIGHT * (index / LEGEND_COLUMNS) as i32 + LEGEND_ROW_HEIGHT / 2;
        area.draw(&marker_element((x, y), series.marker, colour(series.correlation)))
            .map_err(render_error)?;
        area.draw(&Text::new(series.label(), (x + 12, y - 8), ("sans-serif", 15)))
            .map_err(render_error)?;
    }
    Ok(())
}

fn draw_panel<DB: DrawingBackend >(
    area: &DrawingArea<DB, Shift>,
    panel: &Panel,
    options: &PlotOptions,
    bottom_row: bool,
) -> Result<()> {
    let (low, high) = options.deviation_range;
    let (min_pressure, max_pressure) = panel.pressure_range().unwrap_or((0., 1.));
    let padding = ((max_pressure - min_pressure) * 0.05).max(0.5);
    let x_range = (min_pressure - padding)..(max_pressure + padding);

    let mut chart = ChartBuilder::on(area)
        .caption(format!("{}K", panel.temperature), ("sans-serif", 18))
        .margin(10)
        .x_label_area_size(if bottom_row { 40 } else { 25 })
        .y_label_area_size(50)
        .build_cartesian_2d(x_range.clone(), low..high)
        .map_err(render_error)?;

    let mut mesh = chart.configure_mesh();
    if bottom_row {
        mesh.x_desc("Pressure [MPa]");
    }
    mesh.y_desc("100 (η_model - η_exp) / η_exp")
        .draw()
        .map_err(render_error)?;

    chart
        .draw_series(LineSeries::new(
            [(x_range.start, 0.), (x_range.end, 0.)],
            BLACK.stroke_width(1),
        ))
        .map_err(render_error)?;

    for series in &panel.series {
        let colour = colour(series.correlation);
        for &point in &series.points {
            chart
                .plotting_area()
                .draw(&marker_element(point, series.marker, colour))
                .map_err(render_error)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use tempdir::TempDir;

    use super::{build_panels, glyph, legend_entries, render, Glyph, Panel, Series};
    use crate::config::{AnalysisConfig, PlotOptions};
    use crate::correlation::Correlation;
    use crate::dataset::{Dataset, MarkerSymbol, SourceSeries};
    use crate::Result;

    fn two_sources() -> Result<Dataset> {
        let first = SourceSeries::new(
            "first",
            MarkerSymbol::Circle,
            vec![293.15, 293.15, 323.15],
            vec![1., 10., 5.],
            vec![19.6, 19.7, 21.0],
        )?;
        let second = SourceSeries::new(
            "second",
            MarkerSymbol::Cross,
            vec![293.3, 400.],
            vec![0.1, 1.],
            vec![19.6, 24.4],
        )?;
        Dataset::new("two", vec![first, second])
    }

    #[test]
    fn series_are_grouped_by_model_then_source() -> Result<()> {
        let data = two_sources()?;

        let panels = build_panels(&data, &[293.15], &[Correlation::KtaMod, Correlation::Kta])?;

        assert_eq!(panels.len(), 1);
        let labels = panels[0].series.iter().map(super::Series::label).collect::<Vec<_>>();
        assert_eq!(
            labels,
            vec!["KTA_mod (first)", "KTA_mod (second)", "KTA (first)", "KTA (second)"]
        );
        assert_eq!(panels[0].series[0].points.len(), 2);
        assert_eq!(panels[0].series[1].marker, MarkerSymbol::Cross);
        Ok(())
    }

    #[test]
    fn isotherm_without_data_gives_an_empty_panel() -> Result<()> {
        let data = two_sources()?;
        let panels = build_panels(&data, &[500.], &Correlation::ALL)?;
        assert!(panels[0].series.is_empty());
        Ok(())
    }

    #[test]
    fn svg_output_is_written() -> Result<()> {
        let tmp_dir = TempDir::new("svg_output_is_written").unwrap();
        let path = tmp_dir.path().join("grid.svg");
        let data = Dataset::embedded()?;
        let panels = build_panels(&data, &[273.15, 293.15, 323.15], &Correlation::ALL)?;

        render(&panels, &PlotOptions::default(), &path)?;

        let svg = std::fs::read_to_string(&path).unwrap();
        assert!(svg.contains("<svg"));
        Ok(())
    }

    #[test]
    fn png_output_is_written_with_the_default_configuration() -> Result<()> {
        let tmp_dir = TempDir::new("png_output_is_written").unwrap();
        let config = AnalysisConfig::default();
        let path = tmp_dir.path().join(&config.output);
        let data = Dataset::embedded()?;
        let panels = build_panels(&data, &config.temperatures, &config.models)?;

        render(&panels, &config.plot, &path)?;

        let png = std::fs::read(&path).unwrap();
        assert!(png.starts_with(b"\x89PNG\r\n\x1a\n"));
        Ok(())
    }

    #[test]
    fn every_marker_has_its_own_glyph() {
        let glyphs = MarkerSymbol::CODES.map(|(marker, _)| glyph(marker));
        for (i, first) in glyphs.iter().enumerate() {
            for second in &glyphs[i + 1..] {
                assert_ne!(first, second);
            }
        }
        assert_eq!(glyph(MarkerSymbol::Circle), Glyph::Round);
        for marker in [MarkerSymbol::Cross, MarkerSymbol::Plus, MarkerSymbol::TriUp] {
            assert!(matches!(glyph(marker), Glyph::Strokes(_)));
        }
        let Glyph::Outline(star) = glyph(MarkerSymbol::Star) else {
            panic!("star is not an outline");
        };
        assert_eq!(star.len(), 10);
    }

    #[test]
    fn every_marker_renders() -> Result<()> {
        let tmp_dir = TempDir::new("every_marker_renders").unwrap();
        let series = MarkerSymbol::CODES
            .iter()
            .zip(Correlation::ALL.iter().cycle())
            .map(|(&(marker, code), &correlation)| Series {
                correlation,
                source_label: code.to_owned(),
                marker,
                points: vec![(1., 0.5), (2., -0.5)],
            })
            .collect();
        let panels = [Panel {
            temperature: 293.15,
            series,
        }];

        for name in ["markers.svg", "markers.png"] {
            let path = tmp_dir.path().join(name);
            render(&panels, &PlotOptions::default(), &path)?;
            assert!(std::fs::metadata(&path).unwrap().len() > 0);
        }
        Ok(())
    }

    #[test]
    fn legend_lists_each_series_once_across_panels() -> Result<()> {
        let data = two_sources()?;
        let panels = build_panels(&data, &[293.15, 323.15, 400.], &[Correlation::Kta])?;

        let labels = legend_entries(&panels)
            .into_iter()
            .map(Series::label)
            .collect::<Vec<_>>();

        assert_eq!(labels, vec!["KTA (first)", "KTA (second)"]);
        Ok(())
    }
}

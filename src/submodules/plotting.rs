use std::error::Error;
use std::ops::Range;
use std::path::Path;

use plotters::coord::Shift;
use plotters::prelude::*;
use tracing::info;

use super::{error::PlotError, polar_table::{PolarField, PolarTable}, type_lib::NumericData};

const ORANGE: RGBColor = RGBColor(255, 140, 0);

/// 17 cm x 12 cm at 100 dpi.
pub const FIGURE_SIZE: (u32, u32) = (670, 472);

type Points = Vec<(NumericData, NumericData)>;

/// Two stacked panels over a shared alpha axis: `C_l`/`C_d` on top, glide
/// ratio below. Nothing touches the disk until [`PolarFigure::save`].
#[derive(Debug, Clone, PartialEq)]
pub struct PolarFigure {
    pub title: String,
    pub size: (u32, u32),
    pub lift: Points,
    pub drag: Points,
    pub glide_ratio: Points,
    pub alpha_range: Range<NumericData>,
    pub coefficient_range: Range<NumericData>,
    pub glide_range: Range<NumericData>,
}

impl PolarFigure {
    pub fn new(airfoil_name: &str, table: &PolarTable) -> Result<Self, PlotError> {
        if table.is_empty() {
            return Err(PlotError::EmptyTable);
        }
        let alpha = table.column(PolarField::Alpha);
        let series = |field: PolarField| -> Points {
            alpha
                .iter()
                .zip(table.column(field).iter())
                .filter(|(x, y)| x.is_finite() && y.is_finite())
                .map(|(x, y)| (*x, *y))
                .collect()
        };
        let lift = series(PolarField::Cl);
        let drag = series(PolarField::Cd);
        let glide_ratio = series(PolarField::ClCd);

        let alpha_range = padded_range(alpha.iter().copied(), 0.0);
        let coefficient_range = padded_range(lift.iter().chain(drag.iter()).map(|p| p.1), 0.05);
        let glide_range = padded_range(glide_ratio.iter().map(|p| p.1), 0.05);

        Ok(PolarFigure {
            title: format!("{} airfoil - performance coefficients", airfoil_name),
            size: FIGURE_SIZE,
            lift,
            drag,
            glide_ratio,
            alpha_range,
            coefficient_range,
            glide_range,
        })
    }

    pub fn render_svg(&self) -> Result<String, PlotError> {
        let mut svg = String::new();
        {
            let root = SVGBackend::with_string(&mut svg, self.size).into_drawing_area();
            self.draw(root).map_err(backend_error)?;
        }
        Ok(svg)
    }

    /// Packed RGB pixels, three bytes per pixel, row-major.
    pub fn render_rgb(&self) -> Result<Vec<u8>, PlotError> {
        let (w, h) = self.size;
        let mut buffer = vec![0_u8; (w * h * 3) as usize];
        {
            let root = BitMapBackend::with_buffer(&mut buffer, self.size).into_drawing_area();
            self.draw(root).map_err(backend_error)?;
        }
        Ok(buffer)
    }

    /// Writes a `.png` or `.svg` file, picked by extension.
    pub fn save(&self, path: &Path) -> Result<(), PlotError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        match ext.as_str() {
            "png" => {
                let root = BitMapBackend::new(path, self.size).into_drawing_area();
                self.draw(root).map_err(backend_error)?;
            }
            "svg" => {
                let root = SVGBackend::new(path, self.size).into_drawing_area();
                self.draw(root).map_err(backend_error)?;
            }
            _ => return Err(PlotError::Format(ext)),
        }
        info!(path = %path.display(), "figure saved");
        Ok(())
    }

    fn draw<DB: DrawingBackend>(&self, root: DrawingArea<DB, Shift>) -> Result<(), Box<dyn Error>>
    where
        DB::ErrorType: 'static,
    {
        root.fill(&WHITE)?;
        let root = root.titled(&self.title, ("sans-serif", 18).into_font())?;
        let panels = root.split_evenly((2, 1));

        let mut upper = ChartBuilder::on(&panels[0])
            .margin(6)
            .x_label_area_size(20)
            .y_label_area_size(45)
            .build_cartesian_2d(self.alpha_range.clone(), self.coefficient_range.clone())?;
        upper.configure_mesh().max_light_lines(0).draw()?;

        upper
            .draw_series(DashedLineSeries::new(self.lift.clone(), 6, 3, BLUE.stroke_width(2)))?
            .label("C_l")
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], &BLUE));
        upper.draw_series(self.lift.iter().map(|&p| TriangleMarker::new(p, 4, BLUE.filled())))?;

        upper
            .draw_series(DashedLineSeries::new(self.drag.clone(), 10, 4, ORANGE.stroke_width(2)))?
            .label("C_d")
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], &ORANGE));
        upper.draw_series(self.drag.iter().map(|&p| {
            EmptyElement::at(p) + Polygon::new(vec![(-4, -3), (4, -3), (0, 4)], ORANGE.filled())
        }))?;

        upper
            .configure_series_labels()
            .background_style(&WHITE.mix(0.8))
            .border_style(&BLACK)
            .draw()?;

        let mut lower = ChartBuilder::on(&panels[1])
            .margin(6)
            .x_label_area_size(35)
            .y_label_area_size(45)
            .build_cartesian_2d(self.alpha_range.clone(), self.glide_range.clone())?;
        lower
            .configure_mesh()
            .max_light_lines(0)
            .x_desc("attack angle alpha (deg)")
            .draw()?;

        lower
            .draw_series(LineSeries::new(self.glide_ratio.iter().copied(), RED.stroke_width(2)))?
            .label("glide ratio (C_l/C_d)")
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], &RED));
        lower.draw_series(self.glide_ratio.iter().map(|&p| {
            EmptyElement::at(p) + Polygon::new(vec![(0, -5), (4, 0), (0, 5), (-4, 0)], RED.filled())
        }))?;

        lower
            .configure_series_labels()
            .background_style(&WHITE.mix(0.8))
            .border_style(&BLACK)
            .draw()?;

        root.present()?;
        Ok(())
    }
}

impl PolarTable {
    pub fn figure(&self) -> Result<PolarFigure, PlotError> {
        PolarFigure::new(&self.airfoil_name, self)
    }
}

fn backend_error(e: Box<dyn Error>) -> PlotError {
    PlotError::Backend(e.to_string())
}

/// Finite min..max of `values`, widened by `pad` of the span. Degenerate
/// inputs still give a drawable range.
fn padded_range(values: impl Iterator<Item = NumericData>, pad: NumericData) -> Range<NumericData> {
    let (lo, hi) = values
        .filter(|v| v.is_finite())
        .fold((NumericData::INFINITY, NumericData::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));
    if !lo.is_finite() {
        return 0.0..1.0;
    }
    if hi - lo == 0.0 {
        return lo - 0.5..hi + 0.5;
    }
    let margin = (hi - lo) * pad;
    lo - margin..hi + margin
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    fn table() -> PolarTable {
        PolarTable::from_raw_rows(
            "NACA6409",
            &[
                [0.0, 0.76, 0.0139, 0.0074, -0.157, 0.62, 1.0],
                [2.0, 0.98, 0.0150, 0.0085, -0.158, 0.55, 1.0],
                [4.0, 1.20, 0.0180, 0.0110, -0.157, 0.45, 1.0],
            ],
        )
    }

    #[test]
    fn figure_collects_series_and_title() {
        let figure = table().figure().unwrap();
        assert_eq!(figure.title, "NACA6409 airfoil - performance coefficients");
        assert_eq!(figure.lift.len(), 3);
        assert_eq!(figure.drag[1], (2.0, 0.0150));
        assert_relative_eq!(figure.glide_ratio[2].1, 1.20 / 0.0180);
        assert_eq!(figure.alpha_range, 0.0..4.0);
        assert!(figure.coefficient_range.start < 0.0139);
        assert!(figure.coefficient_range.end > 1.20);
    }

    #[test]
    fn non_finite_ratios_are_left_out() {
        let table = PolarTable::from_raw_rows(
            "FLAT",
            &[[0.0, 0.0, 0.0, 0.0, 0.0, 1.0, 1.0], [1.0, 1.0, 0.125, 0.0, 0.0, 1.0, 1.0]],
        );
        let figure = table.figure().unwrap();
        assert_eq!(figure.glide_ratio.len(), 1);
        assert_eq!(figure.glide_range, 7.5..8.5);
    }

    #[test]
    fn empty_table_is_rejected() {
        let table = PolarTable::from_raw_rows("NONE", &[]);
        assert!(matches!(table.figure(), Err(PlotError::EmptyTable)));
    }

    #[test]
    fn unknown_extension_is_rejected() {
        let figure = table().figure().unwrap();
        let err = figure.save(Path::new("polar.bmpx")).unwrap_err();
        assert!(matches!(err, PlotError::Format(ext) if ext == "bmpx"));
    }

    #[test]
    fn padded_range_handles_degenerate_input() {
        assert_eq!(padded_range([2.0].into_iter(), 0.1), 1.5..2.5);
        assert_eq!(padded_range([NumericData::NAN].into_iter(), 0.1), 0.0..1.0);
        assert_eq!(padded_range([0.0, 10.0].into_iter(), 0.1), -1.0..11.0);
    }

    #[test]
    fn svg_contains_labels() {
        let svg = table().figure().unwrap().render_svg().unwrap();
        assert!(svg.contains("NACA6409 airfoil - performance coefficients"));
        assert!(svg.contains("attack angle alpha (deg)"));
        assert!(svg.contains("glide ratio (C_l/C_d)"));
    }

    #[test]
    fn rgb_buffer_covers_figure() {
        let figure = table().figure().unwrap();
        let (width, height) = figure.size;
        let pixels = figure.render_rgb().unwrap();
        assert_eq!(pixels.len(), (width * height * 3) as usize);
        assert!(pixels.iter().any(|&p| p != 0));
        // Curves are drawn over the white fill.
        assert!(pixels.iter().any(|&p| p != 255));
    }
}

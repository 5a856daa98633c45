use std::path::Path;

use ndarray::{Array1, Array2, ArrayView1, Axis};
use serde::Serialize;

use super::{error::PolarError, type_lib::{NumericData, RawPolarRow}};

/// Lines XFOIL writes ahead of the first data row of a saved polar.
pub const HEADER_LINES: usize = 12;
pub const RAW_COLUMNS: usize = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolarField {
    Alpha,
    Cl,
    Cd,
    ClCd,
    Cdp,
    Cm,
    TopXtr,
    BotXtr,
}

impl PolarField {
    pub const ALL: [PolarField; 8] = [
        PolarField::Alpha,
        PolarField::Cl,
        PolarField::Cd,
        PolarField::ClCd,
        PolarField::Cdp,
        PolarField::Cm,
        PolarField::TopXtr,
        PolarField::BotXtr,
    ];

    pub fn to_str(&self) -> &str {
        match self {
            PolarField::Alpha => "alpha",
            PolarField::Cl => "C_l",
            PolarField::Cd => "C_d",
            PolarField::ClCd => "C_l/C_d",
            PolarField::Cdp => "C_dp",
            PolarField::Cm => "C_m",
            PolarField::TopXtr => "Top_Xtr",
            PolarField::BotXtr => "Bot_Xtr",
        }
    }

    /// Column position in the table, derived column included.
    pub fn index(&self) -> usize {
        match self {
            PolarField::Alpha => 0,
            PolarField::Cl => 1,
            PolarField::Cd => 2,
            PolarField::ClCd => 3,
            PolarField::Cdp => 4,
            PolarField::Cm => 5,
            PolarField::TopXtr => 6,
            PolarField::BotXtr => 7,
        }
    }
}

/// One row of the table with named columns, used for JSON export.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PolarRecord {
    pub alpha: NumericData,
    #[serde(rename = "C_l")]
    pub c_l: NumericData,
    #[serde(rename = "C_d")]
    pub c_d: NumericData,
    #[serde(rename = "C_l/C_d")]
    pub glide_ratio: NumericData,
    #[serde(rename = "C_dp")]
    pub c_dp: NumericData,
    #[serde(rename = "C_m")]
    pub c_m: NumericData,
    #[serde(rename = "Top_Xtr")]
    pub top_xtr: NumericData,
    #[serde(rename = "Bot_Xtr")]
    pub bot_xtr: NumericData,
}

#[derive(Debug, Clone, Serialize)]
pub struct PolarExport<'a> {
    pub airfoil: &'a str,
    pub reynolds: Option<NumericData>,
    pub rows: Vec<PolarRecord>,
}

/// Polar of one airfoil: one row per converged angle of attack, in the order
/// the solver wrote them, with `C_l/C_d` placed right after `C_d`.
#[derive(Debug, Clone, PartialEq)]
pub struct PolarTable {
    pub airfoil_name: String,
    pub reynolds: Option<NumericData>,
    pub data: Array2<NumericData>,
}

impl PolarTable {
    pub fn from_raw_rows(airfoil_name: &str, rows: &[RawPolarRow]) -> Self {
        PolarTable {
            airfoil_name: airfoil_name.to_string(),
            reynolds: None,
            data: PolarTable::with_glide_ratio(rows),
        }
    }

    pub fn read(airfoil_name: &str, path: &Path) -> Result<Self, PolarError> {
        let text = std::fs::read_to_string(path).map_err(|source| PolarError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        PolarTable::parse(airfoil_name, &text)
    }

    pub fn parse(airfoil_name: &str, text: &str) -> Result<Self, PolarError> {
        let lines: Vec<&str> = text.lines().collect();
        if lines.len() < HEADER_LINES {
            return Err(PolarError::TruncatedHeader { found: lines.len(), expected: HEADER_LINES });
        }

        let mut rows = Vec::new();
        for (i, line) in lines.iter().enumerate().skip(HEADER_LINES) {
            if line.trim().is_empty() {
                continue;
            }
            rows.push(PolarTable::parse_row(line, i + 1)?);
        }
        if rows.is_empty() {
            return Err(PolarError::EmptyPolar);
        }

        let mut table = PolarTable::from_raw_rows(airfoil_name, &rows);
        table.reynolds = PolarTable::header_reynolds(&lines[..HEADER_LINES]);
        Ok(table)
    }

    fn parse_row(line: &str, line_number: usize) -> Result<RawPolarRow, PolarError> {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.len() != RAW_COLUMNS {
            return Err(PolarError::ColumnCount { line: line_number, found: tokens.len() });
        }
        let mut row = [0.0; RAW_COLUMNS];
        for (j, token) in tokens.iter().enumerate() {
            row[j] = token.parse().map_err(|_| PolarError::InvalidNumber {
                line: line_number,
                column: j + 1,
                token: token.to_string(),
            })?;
        }
        Ok(row)
    }

    /// Reads `Re =     0.100 e 6` from the metadata block, if present.
    fn header_reynolds(header: &[&str]) -> Option<NumericData> {
        let line = header.iter().find(|line| line.contains("Re ="))?;
        let after = line.split("Re =").nth(1)?;
        let value = after.split("Ncrit").next()?;
        let compact: String = value.chars().filter(|c| !c.is_whitespace()).collect();
        compact.parse().ok()
    }

    fn with_glide_ratio(rows: &[RawPolarRow]) -> Array2<NumericData> {
        let cl = PolarField::Cl.index();
        let cd = PolarField::Cd.index();
        let ratio = PolarField::ClCd.index();
        Array2::from_shape_fn((rows.len(), RAW_COLUMNS + 1), |(i, j)| {
            if j < ratio {
                rows[i][j]
            } else if j == ratio {
                rows[i][cl] / rows[i][cd]
            } else {
                rows[i][j - 1]
            }
        })
    }

    pub fn len(&self) -> usize {
        self.data.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.data.nrows() == 0
    }

    pub fn column(&self, field: PolarField) -> ArrayView1<'_, NumericData> {
        self.data.column(field.index())
    }

    pub fn glide_ratio(&self) -> Array1<NumericData> {
        self.column(PolarField::ClCd).to_owned()
    }

    /// Rows without the derived column, in solver column order.
    pub fn raw_rows(&self) -> Vec<RawPolarRow> {
        self.data
            .axis_iter(Axis(0))
            .map(|row| {
                let mut raw = [0.0; RAW_COLUMNS];
                let mut k = 0;
                for field in PolarField::ALL.iter().filter(|f| **f != PolarField::ClCd) {
                    raw[k] = row[field.index()];
                    k += 1;
                }
                raw
            })
            .collect()
    }

    pub fn records(&self) -> Vec<PolarRecord> {
        self.data
            .axis_iter(Axis(0))
            .map(|row| PolarRecord {
                alpha: row[PolarField::Alpha.index()],
                c_l: row[PolarField::Cl.index()],
                c_d: row[PolarField::Cd.index()],
                glide_ratio: row[PolarField::ClCd.index()],
                c_dp: row[PolarField::Cdp.index()],
                c_m: row[PolarField::Cm.index()],
                top_xtr: row[PolarField::TopXtr.index()],
                bot_xtr: row[PolarField::BotXtr.index()],
            })
            .collect()
    }

    pub fn export(&self) -> PolarExport<'_> {
        PolarExport {
            airfoil: &self.airfoil_name,
            reynolds: self.reynolds,
            rows: self.records(),
        }
    }

    /// Angle of attack with the highest finite glide ratio.
    pub fn best_glide(&self) -> Option<PolarRecord> {
        self.records()
            .into_iter()
            .filter(|r| r.glide_ratio.is_finite())
            .max_by(|a, b| a.glide_ratio.total_cmp(&b.glide_ratio))
    }

    /// Writes the raw columns back in XFOIL's saved-polar layout. Values use
    /// the shortest text that parses back to the same `f64`.
    pub fn to_polar_text(&self) -> String {
        let reynolds = self.reynolds.unwrap_or(0.0) / 1.0e6;
        let mut out = format!(
            " \n       XFOIL         Version 6.99\n \n Calculated polar for: {name}\n \n \
             1 1 Reynolds number fixed          Mach number fixed\n \n \
             xtrf =   1.000 (top)        1.000 (bottom)\n \
             Mach =   0.000     Re = {reynolds:9.3} e 6     Ncrit =   9.000\n \n  \
             alpha    CL        CD       CDp       CM     Top_Xtr  Bot_Xtr\n \
             ------ -------- --------- --------- -------- -------- --------\n",
            name = self.airfoil_name,
        );
        for row in self.raw_rows() {
            out.push_str(&format!(
                "{:>8} {:>8} {:>9} {:>9} {:>8} {:>8} {:>8}\n",
                row[0], row[1], row[2], row[3], row[4], row[5], row[6]
            ));
        }
        out
    }
}

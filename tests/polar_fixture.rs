use std::path::Path;

use approx::assert_relative_eq;
use xfoil_polar::{PolarField, PolarTable};

fn fixture_table() -> PolarTable {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/naca6409_re1e5.txt");
    PolarTable::read("NACA6409", &path).unwrap()
}

#[test]
fn saved_polar_parses_in_file_order() {
    let table = fixture_table();
    assert_eq!(table.len(), 7);
    assert_eq!(table.data.ncols(), 8);
    assert_relative_eq!(table.reynolds.unwrap(), 1.0e5, max_relative = 1e-9);

    let alpha = table.column(PolarField::Alpha);
    assert!(alpha.windows(2).into_iter().all(|w| w[0] < w[1]));

    let last = table.data.row(6);
    assert_eq!(last[PolarField::Alpha.index()], 3.0);
    assert_eq!(last[PolarField::Cdp.index()], 0.00898);
    assert_eq!(last[PolarField::Cm.index()], -0.1570);
    assert_eq!(last[PolarField::TopXtr.index()], 0.5419);
}

#[test]
fn glide_ratio_is_lift_over_drag_everywhere() {
    let table = fixture_table();
    let cl = table.column(PolarField::Cl);
    let cd = table.column(PolarField::Cd);
    for (i, ratio) in table.glide_ratio().iter().enumerate() {
        assert_eq!(*ratio, cl[i] / cd[i]);
    }
    let best = table.best_glide().unwrap();
    assert_eq!(best.alpha, 3.0);
    assert_relative_eq!(best.glide_ratio, 1.0791 / 0.01524);
}

#[test]
fn raw_columns_survive_rewrite() {
    let table = fixture_table();
    let again = PolarTable::parse("NACA6409", &table.to_polar_text()).unwrap();
    assert_eq!(again.raw_rows(), table.raw_rows());
    assert_eq!(again, table);
}

#[test]
fn figure_spans_sweep() {
    let figure = fixture_table().figure().unwrap();
    assert_eq!(figure.alpha_range, 0.0..3.0);
    assert_eq!(figure.lift.len(), 7);
    assert!(figure.glide_range.start < 0.7587 / 0.01388);
}

pub type NumericData = f64;

/// One parsed solver row: alpha, C_l, C_d, C_dp, C_m, Top_Xtr, Bot_Xtr.
pub type RawPolarRow = [NumericData; 7];

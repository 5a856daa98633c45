pub mod naca6409;

pub mod presensi;
pub mod report;

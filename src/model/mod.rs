pub mod presensi;
pub mod role;

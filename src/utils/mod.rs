pub mod db_utils;
pub mod email_guard;
pub mod photo;
pub mod wib;

pub mod capabilities;
pub mod models;
pub mod pm_summary;
pub mod schedule;
pub mod views;
pub mod work_order;

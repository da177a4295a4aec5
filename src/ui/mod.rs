//! egui rendering: side panel filters, top bar, dashboard and charts.

pub mod dashboard;
pub mod panels;
pub mod plot;

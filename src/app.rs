use eframe::egui;

use crate::config::DashboardConfig;
use crate::state::AppState;
use crate::ui::{dashboard, panels};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct EmployeeInsightsApp {
    pub state: AppState,
}

impl EmployeeInsightsApp {
    /// Build the app and load the configured default table if it exists.
    pub fn new(config: DashboardConfig) -> Self {
        let default_path = config.data_path.clone();
        let mut state = AppState::new(config);
        if default_path.exists() {
            state.load_path(&default_path);
        } else {
            log::info!(
                "{} not found; waiting for File → Open",
                default_path.display()
            );
        }
        Self { state }
    }
}

impl eframe::App for EmployeeInsightsApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: filters ----
        egui::SidePanel::left("filter_panel")
            .default_width(260.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: KPIs and charts ----
        egui::CentralPanel::default().show(ctx, |ui| {
            dashboard::central_panel(ui, &mut self.state);
        });
    }
}

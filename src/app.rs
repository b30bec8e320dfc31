use eframe::egui;

use crate::config::DashboardConfig;
use crate::state::AppState;
use crate::ui::{panels, tabs};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct CarAdsApp {
    pub state: AppState,
}

impl CarAdsApp {
    /// Build the app and open the configured listings file.
    pub fn new(config: DashboardConfig) -> Self {
        let path = config.data_path.clone();
        let mut state = AppState::new(config);
        state.open(&path);
        Self { state }
    }
}

impl eframe::App for CarAdsApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // Nothing else renders without a table.
        if self.state.table.is_none() {
            egui::CentralPanel::default().show(ctx, |ui| {
                panels::load_error(ui, &self.state);
            });
            return;
        }

        // ---- Left side panel: filters ----
        egui::SidePanel::left("filter_panel")
            .default_width(240.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: metrics + tabs ----
        egui::CentralPanel::default().show(ctx, |ui| {
            panels::metrics_row(ui, &self.state);
            ui.separator();
            tabs::tab_bar(ui, &mut self.state);
            ui.separator();
            tabs::active_tab(ui, &mut self.state);
        });
    }
}

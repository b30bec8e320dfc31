use std::ops::RangeInclusive;

use eframe::egui::{self, emath::Numeric, Color32, RichText, ScrollArea, Ui};

use crate::data::filter::FILTERABLE_CATEGORIES;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filters");
    ui.separator();

    let Some(table) = state.table.clone() else {
        ui.label("No listings loaded.");
        return;
    };

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            // ---- Range sliders ----
            let bounds = state.bounds.clone();
            range_slider(ui, "Price (USD)", &mut state.predicates.price, &bounds.price);
            range_slider(ui, "Odometer (mi)", &mut state.predicates.odometer, &bounds.odometer);
            range_slider(ui, "Model year", &mut state.predicates.model_year, &bounds.model_year);

            // ---- Category multi-selects (collapsible) ----
            for column in FILTERABLE_CATEGORIES {
                let Some(all_values) = table.unique_values.get(&column) else {
                    continue;
                };

                let n_selected = state
                    .predicates
                    .categories
                    .get(&column)
                    .map_or(0, |s| s.len());
                let header_text = if n_selected == 0 {
                    format!("{}  (all)", column.label())
                } else {
                    format!("{}  ({n_selected}/{})", column.label(), all_values.len())
                };

                egui::CollapsingHeader::new(RichText::new(header_text).strong())
                    .id_salt(column.name())
                    .default_open(false)
                    .show(ui, |ui: &mut Ui| {
                        if ui.small_button("Clear").clicked() {
                            state.predicates.categories.remove(&column);
                        }
                        for value in all_values {
                            let mut checked = state.predicates.is_selected(column, value);
                            if ui.checkbox(&mut checked, value.as_str()).changed() {
                                state.predicates.toggle(column, value);
                            }
                        }
                    });
            }

            ui.separator();
            if ui.button("Reset filters").clicked() {
                state.reset_filters();
            }
        });

    // Recompute the report after any widget changes.
    state.refresh();
}

/// Two sliders (min / max) over `bounds`; hidden when the column is absent.
fn range_slider<T: Numeric>(
    ui: &mut Ui,
    label: &str,
    value: &mut Option<RangeInclusive<T>>,
    bounds: &Option<RangeInclusive<T>>,
) {
    let (Some(current), Some(bounds)) = (value.as_mut(), bounds) else {
        return;
    };

    let (mut low, mut high) = (*current.start(), *current.end());
    ui.strong(label);
    let low_changed = ui
        .add(egui::Slider::new(&mut low, bounds.clone()).text("min").step_by(1.0))
        .changed();
    let high_changed = ui
        .add(egui::Slider::new(&mut high, bounds.clone()).text("max").step_by(1.0))
        .changed();

    // Keep min <= max by dragging the other handle along.
    if low > high {
        if low_changed {
            high = low;
        } else if high_changed {
            low = high;
        }
    }
    *current = low..=high;
    ui.add_space(6.0);
}

// ---------------------------------------------------------------------------
// Headline metrics
// ---------------------------------------------------------------------------

pub fn metrics_row(ui: &mut Ui, state: &AppState) {
    let Some(report) = &state.report else {
        return;
    };
    let metrics = &report.metrics;

    ui.columns(3, |cols: &mut [Ui]| {
        metric(&mut cols[0], "Listings (after filters)", Some(metrics.count_label()));
        metric(&mut cols[1], "Median price", metrics.median_price_label());
        metric(&mut cols[2], "Mean odometer", metrics.mean_odometer_label());
    });
}

fn metric(ui: &mut Ui, label: &str, value: Option<String>) {
    let Some(value) = value else {
        return;
    };
    ui.label(RichText::new(label).weak());
    ui.heading(value);
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let (Some(table), Some(report)) = (&state.table, &state.report) {
            ui.label(format!(
                "{} listings loaded, {} after filters",
                table.len(),
                report.metrics.count
            ));
        }

        if let Some(path) = &state.source {
            ui.separator();
            ui.label(RichText::new(path.display().to_string()).weak());
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

/// Central panel content when no table could be loaded.
pub fn load_error(ui: &mut Ui, state: &AppState) {
    let msg = state
        .status_message
        .as_deref()
        .unwrap_or("Open a listings file to start  (File → Open…)");
    ui.centered_and_justified(|ui: &mut Ui| {
        ui.heading(RichText::new(msg).color(Color32::RED));
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open vehicle listings")
        .add_filter("Supported files", &["csv", "json", "parquet", "pq"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        state.open(&path);
    }
}

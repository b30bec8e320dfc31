use eframe::egui::{self, RichText, Ui};
use egui_extras::{Column as TableColumn, TableBuilder};

use super::plot;
use crate::analysis::charts::{self, BIN_RANGE};
use crate::analysis::conclusions::Observation;
use crate::analysis::metrics::group_thousands;
use crate::analysis::Section;
use crate::state::{AppState, Tab};

pub fn tab_bar(ui: &mut Ui, state: &mut AppState) {
    ui.horizontal(|ui: &mut Ui| {
        for tab in Tab::ALL {
            ui.selectable_value(&mut state.active_tab, tab, tab.label());
        }
    });
}

/// Controls for the active tab, then its content from a fresh report.
pub fn active_tab(ui: &mut Ui, state: &mut AppState) {
    match state.active_tab {
        Tab::Histogram => histogram_controls(ui, state),
        Tab::Scatter => scatter_controls(ui, state),
        Tab::BoxPlot => box_plot_controls(ui, state),
        Tab::Conclusions => {
            ui.heading("What do the listings show?");
        }
    }
    state.refresh();

    let Some(report) = &state.report else {
        return;
    };
    match state.active_tab {
        Tab::Histogram => match &report.histogram {
            Section::Ready(hist) => plot::histogram_plot(ui, hist),
            Section::Placeholder(msg) => placeholder(ui, msg),
        },
        Tab::Scatter => match &report.scatter {
            Section::Ready(scatter) => plot::scatter_plot(ui, scatter, state.color_map.as_ref()),
            Section::Placeholder(msg) => placeholder(ui, msg),
        },
        Tab::BoxPlot => match &report.box_plot {
            Section::Ready(box_plot) => plot::price_box_plot(ui, box_plot),
            Section::Placeholder(msg) => placeholder(ui, msg),
        },
        Tab::Conclusions => match &report.observations {
            Section::Ready(bullets) => conclusions(ui, bullets),
            Section::Placeholder(msg) => placeholder(ui, msg),
        },
    }
}

fn placeholder(ui: &mut Ui, msg: &str) {
    ui.add_space(8.0);
    ui.label(RichText::new(format!("ℹ {msg}")).italics());
}

// ---------------------------------------------------------------------------
// Per-tab controls
// ---------------------------------------------------------------------------

fn histogram_controls(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Distribution");
    let Some(table) = state.table.clone() else {
        return;
    };
    let columns = charts::histogram_columns(&table);
    if columns.is_empty() {
        return;
    }

    ui.horizontal(|ui: &mut Ui| {
        let mut selected = state.settings.histogram.column;
        egui::ComboBox::from_label("Column")
            .selected_text(selected.name())
            .show_ui(ui, |ui: &mut Ui| {
                for column in &columns {
                    ui.selectable_value(&mut selected, *column, column.name());
                }
            });
        state.set_histogram_column(selected);

        ui.add(egui::Slider::new(&mut state.settings.histogram.bins, BIN_RANGE).text("Bins"));
        ui.checkbox(
            &mut state.settings.histogram.log_scale,
            "Log scale (recommended for price)",
        );
    });
}

fn scatter_controls(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Relation between variables");
    ui.label("Useful pairs: odometer vs price (more miles, cheaper?) • age vs price (newer, pricier?)");
    let Some(table) = state.table.clone() else {
        return;
    };
    let pairs = charts::scatter_pairs(&table);
    if pairs.is_empty() {
        return;
    }

    ui.horizontal(|ui: &mut Ui| {
        egui::ComboBox::from_label("Pair")
            .selected_text(state.settings.scatter_pair.to_string())
            .show_ui(ui, |ui: &mut Ui| {
                for pair in &pairs {
                    ui.selectable_value(&mut state.settings.scatter_pair, *pair, pair.to_string());
                }
            });

        let mut color_by = state.settings.color_by;
        egui::ComboBox::from_label("Color by")
            .selected_text(color_by.map_or("None", |c| c.name()))
            .show_ui(ui, |ui: &mut Ui| {
                ui.selectable_value(&mut color_by, None, "None");
                for column in charts::color_by_columns(&table) {
                    ui.selectable_value(&mut color_by, Some(column), column.name());
                }
            });
        if color_by != state.settings.color_by {
            state.set_color_by(color_by);
        }
    });
}

fn box_plot_controls(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Compare prices by category");
    let Some(table) = state.table.clone() else {
        return;
    };
    let columns = charts::box_columns(&table);
    let Some(current) = state.settings.box_column else {
        return;
    };

    egui::ComboBox::from_label("Category")
        .selected_text(current.name())
        .show_ui(ui, |ui: &mut Ui| {
            for column in &columns {
                ui.selectable_value(&mut state.settings.box_column, Some(*column), column.name());
            }
        });
}

// ---------------------------------------------------------------------------
// Conclusions
// ---------------------------------------------------------------------------

fn conclusions(ui: &mut Ui, bullets: &[Observation]) {
    for bullet in bullets {
        ui.label(format!("• {bullet}"));
        if let Observation::CategoryMedians { column, top } = bullet {
            ui.push_id(column.name(), |ui: &mut Ui| {
                median_table(ui, &column.label(), top);
            });
        }
        ui.add_space(4.0);
    }
}

fn median_table(ui: &mut Ui, heading: &str, rows: &[(String, i64)]) {
    TableBuilder::new(ui)
        .striped(true)
        .column(TableColumn::auto().at_least(120.0))
        .column(TableColumn::auto().at_least(100.0))
        .header(20.0, |mut header| {
            header.col(|ui| {
                ui.strong(heading);
            });
            header.col(|ui| {
                ui.strong("Median price");
            });
        })
        .body(|mut body| {
            for (name, price) in rows {
                body.row(18.0, |mut row| {
                    row.col(|ui| {
                        ui.label(name.as_str());
                    });
                    row.col(|ui| {
                        ui.label(format!("${}", group_thousands(*price)));
                    });
                });
            }
        });
}

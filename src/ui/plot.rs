use eframe::egui::{Color32, Ui};
use egui_plot::{Bar, BarChart, BoxElem, BoxPlot, BoxSpread, Legend, Plot, PlotPoints, Points};

use crate::analysis::charts::{Histogram, PriceBoxPlot, Scatter};
use crate::color::ColorMap;

// ---------------------------------------------------------------------------
// Histogram
// ---------------------------------------------------------------------------

/// Tick label for a `log10` axis position.
pub fn log_tick_label(exponent: f64) -> String {
    let value = 10f64.powf(exponent);
    if value >= 1.0 {
        format!("{value:.0}")
    } else {
        format!("{value:.2}")
    }
}

pub fn histogram_plot(ui: &mut Ui, hist: &Histogram) {
    ui.label(format!("Distribution of {}", hist.column));

    let bars: Vec<Bar> = hist
        .bins
        .iter()
        .map(|bin| Bar::new(bin.center(), bin.count as f64).width(bin.width() * 0.95))
        .collect();
    let chart = BarChart::new(bars)
        .color(Color32::LIGHT_BLUE)
        .name(hist.column.name());

    let mut plot = Plot::new("histogram")
        .legend(Legend::default())
        .x_axis_label(hist.column.name())
        .y_axis_label("count")
        .height(480.0)
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true);
    if hist.log_scale {
        plot = plot.x_axis_formatter(|mark, _range| log_tick_label(mark.value));
    }
    plot.show(ui, |plot_ui| {
        plot_ui.bar_chart(chart);
    });

    if hist.skipped > 0 {
        ui.label(format!(
            "{} non-positive values are not shown on the log axis.",
            hist.skipped
        ));
    }
}

// ---------------------------------------------------------------------------
// Scatter
// ---------------------------------------------------------------------------

pub fn scatter_plot(ui: &mut Ui, scatter: &Scatter, color_map: Option<&ColorMap>) {
    ui.label(scatter.pair.to_string());

    Plot::new("scatter")
        .legend(Legend::default())
        .x_axis_label(scatter.pair.x().name())
        .y_axis_label(scatter.pair.y().name())
        .height(500.0)
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            for series in &scatter.series {
                let color = color_map
                    .map(|cm| cm.color_for(&series.label))
                    .unwrap_or(Color32::LIGHT_BLUE)
                    .gamma_multiply(0.6);
                let name = if series.label.is_empty() {
                    "listings"
                } else {
                    series.label.as_str()
                };
                let points: PlotPoints = series.points.iter().copied().collect();
                plot_ui.points(Points::new(points).radius(2.0).color(color).name(name));
            }
        });
}

// ---------------------------------------------------------------------------
// Box plot
// ---------------------------------------------------------------------------

pub fn price_box_plot(ui: &mut Ui, plot: &PriceBoxPlot) {
    ui.label(format!("Price distribution by {}", plot.column));

    let elems: Vec<BoxElem> = plot
        .boxes
        .iter()
        .enumerate()
        .map(|(i, b)| {
            let spread = BoxSpread::new(b.lower_whisker, b.q1, b.median, b.q3, b.upper_whisker);
            BoxElem::new(i as f64, spread)
                .name(format!("{} (n = {})", b.category, b.count))
                .box_width(0.6)
        })
        .collect();
    let outliers: PlotPoints = plot
        .boxes
        .iter()
        .enumerate()
        .flat_map(|(i, b)| b.outliers.iter().map(move |&v| [i as f64, v]))
        .collect();

    // Category names on integer ticks only.
    let names: Vec<String> = plot.boxes.iter().map(|b| b.category.clone()).collect();
    Plot::new("box_plot")
        .legend(Legend::default())
        .x_axis_label(plot.column.name())
        .y_axis_label("price")
        .height(500.0)
        .x_axis_formatter(move |mark, _range| {
            let idx = mark.value.round();
            if (mark.value - idx).abs() > 1e-6 || idx < 0.0 {
                return String::new();
            }
            names.get(idx as usize).cloned().unwrap_or_default()
        })
        .show(ui, |plot_ui| {
            plot_ui.box_plot(BoxPlot::new(elems).name("price"));
            plot_ui.points(
                Points::new(outliers)
                    .radius(2.5)
                    .color(Color32::from_rgb(230, 120, 60))
                    .name("suspected outliers"),
            );
        });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_tick_label() {
        assert_eq!(log_tick_label(0.0), "1");
        assert_eq!(log_tick_label(3.0), "1000");
        assert_eq!(log_tick_label(-1.0), "0.10");
    }
}

//! HTML rendering of the dashboard page.
//!
//! The page is a plain GET form in a sidebar next to the rendered panels, so
//! every filter change is a new request that recomputes the whole
//! dashboard.

use chrono::NaiveDateTime;
use crime_eda_analytics_models::Dashboard;
use crime_eda_charts::RenderedPanel;
use crime_eda_server_models::QUERY_DATE_FORMAT;

const STYLE: &str = "\
body{margin:0;font-family:sans-serif;display:flex;color:#262730}\
aside{width:300px;min-height:100vh;padding:1.5rem;background:#f0f2f6;box-sizing:border-box}\
aside label{display:block;margin-top:1rem;font-weight:600}\
aside select,aside input{width:100%;box-sizing:border-box;margin-top:.3rem}\
aside button{margin-top:1.5rem;width:100%;padding:.5rem}\
main{flex:1;padding:1.5rem 3rem}\
section.panel svg{max-width:100%;height:auto}\
footer{color:#808495;padding-bottom:2rem}";

/// Escapes text for use in HTML content and double-quoted attributes.
#[must_use]
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

fn date_value(date: Option<NaiveDateTime>) -> String {
    date.map(|d| d.date().format(QUERY_DATE_FORMAT).to_string())
        .unwrap_or_default()
}

fn write_multi_select(
    html: &mut String,
    label: &str,
    name: &str,
    options: &[String],
    selected: &[String],
) {
    let size = options.len().clamp(2, 8);
    html.push_str(&format!(
        "<label for=\"{name}\">{label}</label><select id=\"{name}\" name=\"{name}\" multiple size=\"{size}\">",
        label = escape_html(label),
    ));
    for option in options {
        let value = escape_html(option);
        let marker = if selected.contains(option) {
            " selected"
        } else {
            ""
        };
        html.push_str(&format!("<option value=\"{value}\"{marker}>{value}</option>"));
    }
    html.push_str("</select>");
}

fn write_sidebar(html: &mut String, dashboard: &Dashboard) {
    let options = &dashboard.options;
    let selection = &dashboard.selection;
    let min = date_value(options.min_date);
    let max = date_value(options.max_date);

    html.push_str("<aside><form method=\"get\" action=\"/\"><h2>Filter Options</h2>");
    html.push_str("<input type=\"hidden\" name=\"applied\" value=\"1\">");
    write_multi_select(
        html,
        "Crime Categories",
        "category",
        &options.categories,
        &selection.categories,
    );
    write_multi_select(
        html,
        "Weapon Used",
        "weapon",
        &options.weapons,
        &selection.weapons,
    );
    write_multi_select(html, "Victim Sex", "sex", &options.sexes, &selection.sexes);
    html.push_str(&format!(
        "<label for=\"from\">Date Range</label>\
         <input type=\"date\" id=\"from\" name=\"from\" value=\"{from}\" min=\"{min}\" max=\"{max}\">\
         <input type=\"date\" id=\"to\" name=\"to\" value=\"{to}\" min=\"{min}\" max=\"{max}\">",
        from = date_value(selection.date_from),
        to = date_value(selection.date_to),
    ));
    html.push_str("<button type=\"submit\">Apply</button></form></aside>");
}

/// Builds the complete dashboard page around already rendered panels.
#[must_use]
pub fn render(dashboard: &Dashboard, panels: &[RenderedPanel]) -> String {
    let title = escape_html(&dashboard.title);
    let svg_len: usize = panels.iter().map(|p| p.svg.len()).sum();
    let mut html = String::with_capacity(svg_len + 16_384);

    html.push_str(&format!(
        "<!DOCTYPE html><html lang=\"en\"><head><meta charset=\"utf-8\">\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\
         <title>{title}</title><style>{STYLE}</style></head><body>",
    ));
    write_sidebar(&mut html, dashboard);

    html.push_str(&format!(
        "<main><h1>{title}</h1><p>Showing {} of {} incidents</p>",
        dashboard.filtered_rows, dashboard.total_rows,
    ));
    for panel in panels {
        html.push_str(&format!(
            "<section class=\"panel\" id=\"{}\"><h2>{}</h2>{}</section>",
            panel.kind,
            escape_html(&panel.title),
            panel.svg,
        ));
    }
    html.push_str(&format!(
        "<hr><footer>{}</footer></main></body></html>",
        escape_html(&dashboard.footer),
    ));

    html
}

#[cfg(test)]
mod tests {
    use crime_eda_analytics_models::{
        DASHBOARD_FOOTER, DASHBOARD_TITLE, FilterOptions, FilterSelection, PanelKind,
    };

    use super::*;

    fn dashboard() -> Dashboard {
        let options = FilterOptions {
            categories: vec!["Property Crimes".into(), "Violent Crimes".into()],
            weapons: vec!["KNIFE".into(), "STRONG-ARM (HANDS, FIST)".into()],
            sexes: vec!["F".into(), "M".into()],
            min_date: chrono::NaiveDate::from_ymd_opt(2023, 1, 3)
                .and_then(|d| d.and_hms_opt(10, 0, 0)),
            max_date: chrono::NaiveDate::from_ymd_opt(2023, 2, 1)
                .and_then(|d| d.and_hms_opt(9, 0, 0)),
        };
        let mut selection = FilterSelection::all(&options);
        selection.weapons = vec!["KNIFE".into()];
        Dashboard {
            title: DASHBOARD_TITLE.to_string(),
            options,
            selection,
            total_rows: 3,
            filtered_rows: 2,
            panels: Vec::new(),
            footer: DASHBOARD_FOOTER.to_string(),
        }
    }

    fn panels() -> Vec<RenderedPanel> {
        PanelKind::all()
            .iter()
            .map(|&kind| RenderedPanel {
                kind,
                title: kind.title().to_string(),
                svg: format!("<svg id=\"chart-{kind}\"></svg>"),
            })
            .collect()
    }

    #[test]
    fn escapes_markup() {
        assert_eq!(
            escape_html("<b>\"Tom & Jerry's\"</b>"),
            "&lt;b&gt;&quot;Tom &amp; Jerry&#39;s&quot;&lt;/b&gt;"
        );
    }

    #[test]
    fn sidebar_reflects_the_selection() {
        let html = render(&dashboard(), &panels());
        assert!(html.contains("Filter Options"));
        assert!(html.contains("<label for=\"category\">Crime Categories</label>"));
        assert!(html.contains("<label for=\"weapon\">Weapon Used</label>"));
        assert!(html.contains("<label for=\"sex\">Victim Sex</label>"));
        assert!(html.contains("Date Range"));
        assert!(html.contains("<option value=\"KNIFE\" selected>KNIFE</option>"));
        assert!(html.contains(
            "<option value=\"STRONG-ARM (HANDS, FIST)\">STRONG-ARM (HANDS, FIST)</option>"
        ));
        assert!(html.contains("name=\"from\" value=\"2023-01-03\""));
        assert!(html.contains("name=\"to\" value=\"2023-02-01\""));
        assert!(html.contains("Showing 2 of 3 incidents"));
    }

    #[test]
    fn option_values_are_escaped() {
        let mut dashboard = dashboard();
        dashboard.options.weapons.push("<KNIFE & \"GUN\">".into());
        let html = render(&dashboard, &[]);
        assert!(html.contains(
            "<option value=\"&lt;KNIFE &amp; &quot;GUN&quot;&gt;\">&lt;KNIFE &amp; &quot;GUN&quot;&gt;</option>"
        ));
        assert!(html.ends_with("</footer></main></body></html>"));
    }

    #[test]
    fn panels_are_laid_out_in_order_before_the_footer() {
        let html = render(&dashboard(), &panels());
        let positions: Vec<usize> = PanelKind::all()
            .iter()
            .map(|kind| html.find(&format!("<h2>{}</h2>", kind.title())).unwrap())
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));

        let rule = html.find("<hr>").unwrap();
        let footer = html.find("Made by Oorja Gund").unwrap();
        assert!(positions.iter().all(|&p| p < rule));
        assert!(rule < footer);
        assert!(html.contains("<svg id=\"chart-monthly_trend\"></svg>"));
    }
}

// Entry point and menu-driven CLI flow.
//
// - Option [1] loads the ORDERED / LOADED worksheet exports.
// - Option [2] narrows the date range and route selection.
// - Option [3] shows one KPI page.
// - Option [4] exports every report plus a JSON summary.
use chrono::NaiveDate;
use despatch_kpi::config::DashboardConfig;
use despatch_kpi::normalize::{normalize_loadings, normalize_orders};
use despatch_kpi::types::{Dashboard, FilterCriteria, RawRecord};
use despatch_kpi::{aggregate, filter, loader, output, reports, util};
use std::io::{self, Write};
use std::path::Path;

// What survives between menu choices. The engine itself keeps nothing.
#[derive(Default)]
struct AppState {
    orders: Vec<RawRecord>,
    loadings: Vec<RawRecord>,
    known_routes: Vec<String>,
    criteria: Option<FilterCriteria>,
}

/// Print a prompt and read one trimmed line from stdin.
fn prompt(label: &str) -> String {
    print!("{}", label);
    let _ = io::stdout().flush();
    let mut buf = String::new();
    io::stdin().read_line(&mut buf).ok();
    buf.trim().to_string()
}

fn read_choice() -> String {
    prompt("Enter choice: ")
}

/// Ask the user whether to go back to the main menu.
///
/// Returns `true` if the user chose `Y`, `false` if they chose `N`.
fn prompt_back_to_menu() -> bool {
    loop {
        match prompt("Back to Main Menu (Y/N): ").to_uppercase().as_str() {
            "Y" => return true,
            "N" => return false,
            _ => println!("Invalid choice. Please enter Y or N."),
        }
    }
}

/// Handle option [1]: load both worksheet exports and reset the filters to
/// the full date span with every route selected.
fn handle_load(config: &DashboardConfig, state: &mut AppState) {
    let orders = match loader::load_file(&config.orders_path) {
        Ok((rows, _)) => rows,
        Err(e) => {
            log::error!("failed to load {}: {}", config.orders_path.display(), e);
            eprintln!("Failed to load orders: {}\n", e);
            return;
        }
    };
    let loadings = match loader::load_file(&config.loadings_path) {
        Ok((rows, _)) => rows,
        Err(e) => {
            log::error!("failed to load {}: {}", config.loadings_path.display(), e);
            eprintln!("Failed to load loadings: {}\n", e);
            return;
        }
    };

    let typed_orders = normalize_orders(&orders);
    let typed_loadings = normalize_loadings(&loadings);
    let routes = filter::known_routes(&typed_loadings.records);
    let bounds = filter::date_bounds(&typed_orders.records, &typed_loadings.records);

    println!(
        "Processing data... ({} orders, {} loadings, {} routes)",
        util::format_int(orders.len()),
        util::format_int(loadings.len()),
        util::format_int(routes.len())
    );
    let skipped = typed_orders.quality.missing_identity + typed_loadings.quality.missing_identity;
    let undated = typed_orders.quality.invalid_dates + typed_loadings.quality.invalid_dates;
    if skipped > 0 || undated > 0 {
        println!(
            "Note: {} rows lack DATE/ROUTE, {} rows have unreadable dates; both are left out.",
            util::format_int(skipped),
            util::format_int(undated)
        );
    }

    state.criteria = match bounds {
        Some((start, end)) => FilterCriteria::new(start, end, routes.iter().cloned()).ok(),
        None => {
            println!("Warning: no valid dates found; set a date range with option [2].");
            None
        }
    };
    if let Some(c) = &state.criteria {
        println!("Date range: {} to {}\n", c.start, c.end);
    }
    state.orders = orders;
    state.loadings = loadings;
    state.known_routes = routes;
}

fn prompt_date(label: &str, current: Option<NaiveDate>) -> NaiveDate {
    loop {
        let shown = current.map(|d| d.to_string()).unwrap_or_default();
        let input = prompt(&format!("{} [{}]: ", label, shown));
        if let (true, Some(d)) = (input.is_empty(), current) {
            return d;
        }
        match util::parse_date_safe(Some(&input)) {
            Some(d) => return d,
            None => println!(
                "Could not read {:?} as a date (e.g. 05-Jan-24 or 2024-01-05).",
                input
            ),
        }
    }
}

/// Handle option [2]: date range and route selection.
fn handle_filters(state: &mut AppState) {
    if state.orders.is_empty() && state.loadings.is_empty() {
        println!("Error: No data loaded. Please load the worksheets first (option 1).\n");
        return;
    }
    let current = state.criteria.clone();
    let start = prompt_date("Start date", current.as_ref().map(|c| c.start));
    let end = prompt_date("End date", current.as_ref().map(|c| c.end));

    println!("Known routes: {}", state.known_routes.join(", "));
    let input = prompt("Routes (comma separated, ALL for every route, blank to keep): ");
    let routes: Vec<String> = if input.eq_ignore_ascii_case("all") {
        state.known_routes.clone()
    } else if input.is_empty() {
        current
            .map(|c| c.routes.into_iter().collect())
            .unwrap_or_else(|| state.known_routes.clone())
    } else {
        input
            .split(',')
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty())
            .collect()
    };

    match FilterCriteria::new(start, end, routes) {
        Ok(c) => {
            println!(
                "Filters set: {} to {}, {} routes selected.\n",
                c.start,
                c.end,
                c.routes.len()
            );
            state.criteria = Some(c);
        }
        Err(e) => println!("Error: {}. Filters unchanged.\n", e),
    }
}

fn current_dashboard(state: &AppState) -> Option<Dashboard> {
    let Some(criteria) = &state.criteria else {
        println!("Error: No data loaded or no date range set (options 1 and 2).\n");
        return None;
    };
    match aggregate(&state.orders, &state.loadings, criteria) {
        Ok(d) => Some(d),
        Err(e) => {
            println!("Error: {}\n", e);
            None
        }
    }
}

fn show_summary(dash: &Dashboard, rows: usize) {
    output::preview_table(
        "Despatch KPI Dashboard",
        None,
        &reports::summary_rows(&dash.summary),
        rows.max(6),
    );
    output::preview_table(
        "Daily Orders Trend",
        None,
        &reports::daily_order_rows(&dash.summary),
        rows,
    );
    let quality = &dash.summary.data_quality;
    if !quality.orders.is_clean() || !quality.loadings.is_clean() {
        output::preview_table(
            "Data Quality",
            Some("rows excluded or unfilterable"),
            &reports::data_quality_rows(quality),
            8,
        );
    }
}

fn show_kpi(dash: &Dashboard, choice: &str, rows: usize) -> bool {
    let s = &dash.summary;
    match choice {
        "1" => show_summary(dash, rows),
        "2" => output::preview_table(
            "Loaves Loaded by Route",
            Some("sorted by total loaded"),
            &reports::route_load_rows(s),
            rows,
        ),
        "3" => output::preview_table(
            "Loading Compliance Breakdown",
            Some("Green counts as compliant"),
            &reports::status_rows(&s.loading_status_counts),
            rows,
        ),
        "4" => output::preview_table(
            "Departure Compliance Breakdown",
            Some("On-time counts as compliant"),
            &reports::status_rows(&s.departure_status_counts),
            rows,
        ),
        "5" => output::preview_table(
            "Munchie Cookies Ordered vs Loaded",
            None,
            &reports::cookie_rows(s),
            2,
        ),
        "6" => {
            output::preview_table(
                "Filtered Orders",
                None,
                &reports::order_table_rows(&dash.orders),
                rows,
            );
            output::preview_table(
                "Filtered Loadings",
                None,
                &reports::loading_table_rows(&dash.loadings),
                rows,
            );
        }
        _ => return false,
    }
    true
}

/// Handle option [3]: show one KPI page.
fn handle_explore(config: &DashboardConfig, state: &AppState) {
    let Some(dash) = current_dashboard(state) else {
        return;
    };
    println!("Select KPI to Explore:");
    println!("[1] Summary View");
    println!("[2] Loaves Loaded");
    println!("[3] Loading Compliance");
    println!("[4] Departure Compliance");
    println!("[5] Munchie Cookies Analysis");
    println!("[6] Raw Data\n");
    let choice = read_choice();
    if !show_kpi(&dash, &choice, config.preview_rows) {
        println!("Invalid choice. Please enter 1 to 6.\n");
    }
}

fn export<T: serde::Serialize>(dir: &Path, file: &str, rows: &[T]) {
    let path = dir.join(file);
    match output::write_csv(&path, rows) {
        Ok(()) => println!("  {}", path.display()),
        Err(e) => {
            log::error!("writing {} failed: {}", path.display(), e);
            eprintln!("Write error: {}", e);
        }
    }
}

/// Handle option [4]: write every report as CSV and the summary as JSON.
fn handle_export(config: &DashboardConfig, state: &AppState) {
    let Some(dash) = current_dashboard(state) else {
        return;
    };
    let dir = config.output_dir.as_path();
    if let Err(e) = std::fs::create_dir_all(dir) {
        eprintln!("Cannot create {}: {}\n", dir.display(), e);
        return;
    }
    let s = &dash.summary;
    println!("Generating reports...");
    export(dir, "report_summary.csv", &reports::summary_rows(s));
    export(dir, "report_loaves_by_route.csv", &reports::route_load_rows(s));
    export(
        dir,
        "report_loading_compliance.csv",
        &reports::status_rows(&s.loading_status_counts),
    );
    export(
        dir,
        "report_departure_compliance.csv",
        &reports::status_rows(&s.departure_status_counts),
    );
    export(dir, "report_daily_orders.csv", &reports::daily_order_rows(s));
    export(dir, "report_munchie_cookies.csv", &reports::cookie_rows(s));
    export(dir, "filtered_orders.csv", &reports::order_table_rows(&dash.orders));
    export(dir, "filtered_loadings.csv", &reports::loading_table_rows(&dash.loadings));

    let json_path = dir.join("kpi_summary.json");
    match output::write_json(&json_path, s) {
        Ok(()) => println!("  {}\n", json_path.display()),
        Err(e) => eprintln!("Write error: {}\n", e),
    }
    log::info!("exported reports to {}", dir.display());
    show_summary(&dash, config.preview_rows);
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let config = DashboardConfig::from_env();
    let mut state = AppState::default();

    loop {
        println!("Despatch KPI Dashboard");
        println!("[1] Load the worksheets");
        println!("[2] Set filters");
        println!("[3] Explore a KPI");
        println!("[4] Export reports\n");
        let choice = read_choice();
        match choice.as_str() {
            "1" => handle_load(&config, &mut state),
            "2" => handle_filters(&mut state),
            "3" | "4" => {
                println!();
                if choice == "4" {
                    handle_export(&config, &state);
                } else {
                    handle_explore(&config, &state);
                }
                if !prompt_back_to_menu() {
                    println!("Exiting the program.");
                    break;
                }
            }
            _ => println!("Invalid choice. Please enter 1 to 4.\n"),
        }
    }
}

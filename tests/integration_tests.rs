use std::process::Command;

/// Helper function to run co2dash from the fixture directory, which holds nco2.csv
fn run_co2dash(args: &[&str]) -> Result<Vec<u8>, String> {
    let output = Command::new(env!("CARGO_BIN_EXE_co2dash"))
        .args(args)
        .current_dir("test")
        .output()
        .map_err(|e| format!("Failed to spawn process: {}", e))?;

    if output.status.success() {
        Ok(output.stdout)
    } else {
        Err(String::from_utf8_lossy(&output.stderr).to_string())
    }
}

fn run_json(args: &[&str]) -> serde_json::Value {
    let stdout = run_co2dash(args).unwrap_or_else(|e| panic!("Failed: {}", e));
    serde_json::from_slice(&stdout).expect("Output is not valid JSON")
}

/// Check if bytes are a valid PNG
fn is_valid_png(bytes: &[u8]) -> bool {
    bytes.len() > 8 && bytes[0..8] == [137, 80, 78, 71, 13, 10, 26, 10]
}

#[test]
fn test_end_to_end_bar_chart_png() {
    let result = run_co2dash(&["render", "--chart", "bar", "--attribute", "make"]);
    assert!(result.is_ok(), "Failed: {:?}", result.err());
    assert!(is_valid_png(&result.unwrap()), "Output is not a valid PNG");
}

#[test]
fn test_end_to_end_violin_svg() {
    let result = run_co2dash(&[
        "render", "--chart", "violin", "--attribute", "cylinders", "--format", "svg",
    ]);
    assert!(result.is_ok(), "Failed: {:?}", result.err());
    let svg = String::from_utf8(result.unwrap()).unwrap();
    assert!(svg.contains("<svg"));
}

#[test]
fn test_end_to_end_bar_json_title() {
    let chart = run_json(&[
        "render", "--insight", "CO2 Emissions", "--chart", "Bar Graph", "--attribute", "Make",
        "--format", "json",
    ]);
    assert_eq!(chart["title"], "Bar Graph for CO2 Emissions by Make");
    assert_eq!(chart["x_axis"]["categories"][0], "Audi");
    assert_eq!(chart["color"]["by"], "Make");
}

#[test]
fn test_end_to_end_histogram_ignores_attribute() {
    let chart = run_json(&[
        "render", "--chart", "histogram", "--attribute", "model", "--format", "json",
    ]);
    assert_eq!(chart["title"], "Histogram for CO2 Emissions");
    assert_eq!(chart["x_field"], "N/A");
    let counts = chart["groups"][0]["geometry"]["counts"].as_array().unwrap();
    assert_eq!(counts.len(), 30);
    let total: u64 = counts.iter().map(|c| c.as_u64().unwrap()).sum();
    // One row of the fixture has an empty CO2 cell
    assert_eq!(total, 21);
}

#[test]
fn test_end_to_end_model_filter() {
    let chart = run_json(&[
        "render", "--chart", "box", "--attribute", "model", "--make", "Audi", "--model", "A4",
        "--model", "Q5", "--insight", "city", "--format", "json",
    ]);
    assert_eq!(chart["title"], "Box Plot for Fuel Consumption City by Model");
    let keys: Vec<&str> = chart["groups"]
        .as_array()
        .unwrap()
        .iter()
        .map(|g| g["key"].as_str().unwrap())
        .collect();
    assert_eq!(keys, vec!["A4", "Q5"]);
}

#[test]
fn test_end_to_end_no_models_selected() {
    let result = run_co2dash(&["render", "--attribute", "model", "--make", "BMW"]);
    assert!(result.is_err(), "Should have failed without models");
    assert!(result.unwrap_err().contains("Please select at least one model."));
}

#[test]
fn test_end_to_end_models_outside_make_draw_empty_chart() {
    let chart = run_json(&[
        "render", "--attribute", "model", "--make", "Audi", "--model", "Camry", "--format", "json",
    ]);
    assert_eq!(chart["title"], "Bar Graph for CO2 Emissions by Model");
    assert_eq!(chart["groups"], serde_json::json!([]));

    let result = run_co2dash(&[
        "render", "--attribute", "model", "--make", "Audi", "--model", "Camry", "--format", "svg",
    ]);
    assert!(result.is_ok(), "Failed: {:?}", result.err());
}

#[test]
fn test_end_to_end_classic_has_no_violin() {
    let result = run_co2dash(&["render", "--chart", "violin", "--variant", "classic"]);
    assert!(result.is_err(), "Classic dashboard should not draw violins");
}

#[test]
fn test_end_to_end_unknown_chart() {
    let result = run_co2dash(&["render", "--chart", "pie"]);
    assert!(result.is_err());
    assert!(result.unwrap_err().contains("unknown chart type"));
}

#[test]
fn test_end_to_end_same_selection_same_output() {
    let args = ["render", "--chart", "scatter", "--attribute", "engine-size", "--format", "json"];
    let first = run_co2dash(&args).unwrap();
    let second = run_co2dash(&args).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_end_to_end_sidebar_model_options() {
    let state = run_json(&["sidebar", "--attribute", "model", "--make", "Toyota"]);
    assert_eq!(state["model_filter_visible"], true);
    assert_eq!(state["makes"][0], "Audi");
    assert_eq!(state["make"], "Toyota");
    let models: Vec<&str> = state["models"]
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m.as_str().unwrap())
        .collect();
    assert_eq!(models, vec!["Camry", "Corolla", "RAV4 AWD", "Tacoma 4WD"]);
}

#[test]
fn test_end_to_end_sidebar_histogram_disables_attribute() {
    let state = run_json(&["sidebar", "--chart", "histogram"]);
    assert_eq!(state["attribute_enabled"], false);
    assert_eq!(state["attributes"], serde_json::json!(["N/A"]));
    assert_eq!(state["chart_types"].as_array().unwrap().len(), 5);
}

#[test]
fn test_end_to_end_missing_dataset() {
    let output = Command::new(env!("CARGO_BIN_EXE_co2dash"))
        .args(["render"])
        .current_dir("src")
        .output()
        .expect("Failed to spawn process");
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Failed to load dataset"));
}

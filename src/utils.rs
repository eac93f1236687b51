use crate::error::AcoResult;
use crate::structs::DesignClass;
use chrono::Utc;
use log::debug;
use std::fs::OpenOptions;
use std::io::Write;

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

pub fn population_std_dev(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let m = mean(values);
    let variance = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

/// Sample standard deviation, 0 for fewer than two values.
pub fn sample_std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values);
    let variance = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    variance.sqrt()
}

pub fn print_design_summary(classes: &[DesignClass]) {
    for class in classes {
        debug!(
            "class {}: attributes [{}], methods [{}]",
            class.index,
            class.attributes.join(", "),
            class.methods.join(", ")
        );
    }
}

/// One line per batch, appended; the header is written when the file is new or empty.
#[allow(clippy::too_many_arguments)]
pub fn log_run_to_csv(
    path: &str,
    vertices: usize,
    classes: usize,
    ants: usize,
    iterations: usize,
    runs: usize,
    best_combined: f64,
    mean_interference: f64,
    max_invalids: usize,
) -> AcoResult<()> {
    let timestamp = Utc::now().to_rfc3339();

    let mut file = OpenOptions::new().create(true).append(true).open(path)?;

    let header =
        "timestamp,vertices,classes,ants,iterations,runs,best_combined,mean_interference,max_invalids\n";
    if file.metadata().map(|m| m.len()).unwrap_or(0) == 0 {
        file.write_all(header.as_bytes())?;
    }

    let record = format!(
        "{},{},{},{},{},{},{:.4},{:.3},{}\n",
        timestamp,
        vertices,
        classes,
        ants,
        iterations,
        runs,
        best_combined,
        mean_interference,
        max_invalids
    );
    file.write_all(record.as_bytes())?;
    Ok(())
}

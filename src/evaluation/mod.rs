//! Agreement between computed score bands and the ratings recorded in the
//! data: accuracy, precision, recall, F1 and a confusion matrix.

use serde::Serialize;

use crate::scoring::{binary_category, BandConfig, ScoreResult};

const BAND_CLASSES: [&str; 3] = ["Bad", "Standard", "Good"];
const BINARY_CLASSES: [&str; 2] = ["Bad", "Good"];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassMetrics {
    pub label: String,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    /// Number of samples whose recorded class is this one
    pub support: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Evaluation {
    pub class_names: Vec<String>,
    /// Rows are recorded classes, columns are predicted classes.
    pub confusion: Vec<Vec<usize>>,
    pub samples: usize,
    /// Results without a recorded rating
    pub skipped: usize,
    pub accuracy: f64,
    pub macro_precision: f64,
    pub macro_recall: f64,
    pub macro_f1: f64,
    pub per_class: Vec<ClassMetrics>,
}

/// Compare computed bands against recorded ratings.
///
/// With `binary`, both sides collapse to good/bad: the recorded rating is
/// good when it is Standard or Good, the prediction is good when the score
/// is above `bad_up_to`.
pub fn evaluate_results(results: &[ScoreResult], bands: &BandConfig, binary: bool) -> Evaluation {
    let mut pairs = Vec::with_capacity(results.len());
    let mut skipped = 0;

    for result in results {
        let Some(recorded) = result.recorded_band else {
            skipped += 1;
            continue;
        };
        let pair = if binary {
            (
                recorded.ordinal().min(1) as usize,
                binary_category(result.score, bands) as usize,
            )
        } else {
            (recorded.ordinal() as usize, result.band.ordinal() as usize)
        };
        pairs.push(pair);
    }

    if skipped > 0 {
        tracing::debug!(skipped, "results without a recorded rating left out of evaluation");
    }

    let classes: &[&str] = if binary {
        &BINARY_CLASSES
    } else {
        &BAND_CLASSES
    };
    let mut evaluation = evaluate(&pairs, classes);
    evaluation.skipped = skipped;
    evaluation
}

/// Metrics over `(recorded, predicted)` class index pairs.
///
/// Undefined ratios (no predictions or no samples for a class) count as 0.
/// Macro averages cover the classes that occur on either side.
pub fn evaluate(pairs: &[(usize, usize)], class_names: &[&str]) -> Evaluation {
    let n = class_names.len();
    let mut confusion = vec![vec![0usize; n]; n];
    for &(actual, predicted) in pairs {
        if actual < n && predicted < n {
            confusion[actual][predicted] += 1;
        }
    }

    let samples: usize = confusion.iter().flatten().sum();
    let correct: usize = (0..n).map(|i| confusion[i][i]).sum();
    let accuracy = ratio(correct, samples);

    let mut per_class = Vec::with_capacity(n);
    let mut present = Vec::with_capacity(n);
    for (i, name) in class_names.iter().enumerate() {
        let true_positive = confusion[i][i];
        let support: usize = confusion[i].iter().sum();
        let predicted: usize = confusion.iter().map(|row| row[i]).sum();

        let precision = ratio(true_positive, predicted);
        let recall = ratio(true_positive, support);
        let f1 = if precision + recall > 0.0 {
            2.0 * precision * recall / (precision + recall)
        } else {
            0.0
        };

        present.push(support > 0 || predicted > 0);
        per_class.push(ClassMetrics {
            label: name.to_string(),
            precision,
            recall,
            f1,
            support,
        });
    }

    let macro_average = |metric: fn(&ClassMetrics) -> f64| {
        let values: Vec<f64> = per_class
            .iter()
            .zip(&present)
            .filter(|(_, present)| **present)
            .map(|(class, _)| metric(class))
            .collect();
        if values.is_empty() {
            0.0
        } else {
            values.iter().sum::<f64>() / values.len() as f64
        }
    };

    Evaluation {
        class_names: class_names.iter().map(|s| s.to_string()).collect(),
        samples,
        skipped: 0,
        accuracy,
        macro_precision: macro_average(|c| c.precision),
        macro_recall: macro_average(|c| c.recall),
        macro_f1: macro_average(|c| c.f1),
        confusion,
        per_class,
    }
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

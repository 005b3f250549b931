//! One-level decision tree.
//!
//! Picks the single attribute with the highest information gain and
//! predicts the majority class of the matching branch. Rows whose split
//! value is missing, and values never seen in training, fall back to the
//! overall majority class.

use std::sync::Arc;

use crate::dataset::{AttributeKind, Dataset, DatasetSchema, Row, Value};
use crate::error::{GeolearnError, Result};
use crate::learner::classifier::Classifier;

#[derive(Debug)]
enum Split {
    /// One branch per nominal value: branch\[value\] = predicted class.
    Nominal { branches: Vec<usize> },
    /// Threshold split: below and at-or-above predictions.
    Numeric { threshold: f64, below: usize, above: usize },
    /// No attribute improved on the class distribution.
    None,
}

#[derive(Debug)]
struct Model {
    schema: Arc<DatasetSchema>,
    attribute: usize,
    split: Split,
    default_class: usize,
}

/// Single-split decision tree selected by information gain.
#[derive(Debug)]
pub struct DecisionStump {
    model: Option<Model>,
}

impl DecisionStump {
    pub fn new() -> Self {
        DecisionStump { model: None }
    }
}

impl Default for DecisionStump {
    fn default() -> Self {
        DecisionStump::new()
    }
}

impl Classifier for DecisionStump {
    fn name(&self) -> &'static str {
        "dstump"
    }

    fn fit(&mut self, data: &Dataset) -> Result<()> {
        let schema = Arc::clone(data.schema());
        let class_count = schema.class_values().len();
        let class_index = schema.class_index();

        let mut class_counts = vec![0usize; class_count];
        for row in data.rows() {
            let class = class_of(row, class_index)?;
            class_counts[class] += 1;
        }
        if data.is_empty() {
            return Err(GeolearnError::learner(
                "dstump: cannot fit on an empty dataset",
            ));
        }
        let default_class = majority(&class_counts);
        let base_entropy = entropy(&class_counts);

        let mut best: Option<(f64, usize, Split)> = None;
        for (index, attribute) in schema.attributes().iter().enumerate() {
            if index == class_index {
                continue;
            }
            let candidate = match &attribute.kind {
                AttributeKind::Nominal(values) => nominal_split(
                    data.rows(),
                    index,
                    class_index,
                    values.len(),
                    class_count,
                    default_class,
                )?,
                AttributeKind::Numeric => {
                    numeric_split(data.rows(), index, class_index, class_count)?
                }
            };
            let Some((weighted_entropy, split)) = candidate else {
                continue;
            };
            let gain = base_entropy - weighted_entropy;
            if best.as_ref().is_none_or(|(g, _, _)| gain > *g) {
                best = Some((gain, index, split));
            }
        }

        let (attribute, split) = match best {
            Some((gain, index, split)) if gain > 0.0 => (index, split),
            _ => (class_index, Split::None),
        };

        self.model = Some(Model {
            schema,
            attribute,
            split,
            default_class,
        });
        Ok(())
    }

    fn predict(&self, row: &Row) -> Result<usize> {
        let model = self
            .model
            .as_ref()
            .ok_or_else(|| GeolearnError::learner("dstump: predict before fit"))?;
        if row.values.len() != model.schema.len() {
            return Err(GeolearnError::schema(
                "dstump: row width does not match the fitted schema",
            ));
        }

        let class = match &model.split {
            Split::None => model.default_class,
            Split::Nominal { branches } => match row.value(model.attribute).nominal() {
                Some(v) if v < branches.len() => branches[v],
                _ => model.default_class,
            },
            Split::Numeric { threshold, below, above } => {
                match row.value(model.attribute).numeric() {
                    Some(x) if x < *threshold => *below,
                    Some(_) => *above,
                    None => model.default_class,
                }
            }
        };
        Ok(class)
    }
}

fn class_of(row: &Row, class_index: usize) -> Result<usize> {
    row.value(class_index)
        .nominal()
        .ok_or_else(|| GeolearnError::record("dstump: training row has no class value"))
}

fn majority(counts: &[usize]) -> usize {
    let mut best = 0;
    for (class, count) in counts.iter().enumerate() {
        if *count > counts[best] {
            best = class;
        }
    }
    best
}

fn entropy(counts: &[usize]) -> f64 {
    let total: usize = counts.iter().sum();
    if total == 0 {
        return 0.0;
    }
    let total = total as f64;
    counts
        .iter()
        .filter(|c| **c > 0)
        .map(|c| {
            let p = *c as f64 / total;
            -p * p.log2()
        })
        .sum()
}

/// Weighted post-split entropy and the branch table for a nominal
/// attribute. Missing values sit out of the split entirely.
fn nominal_split(
    rows: &[Row],
    index: usize,
    class_index: usize,
    domain: usize,
    class_count: usize,
    default_class: usize,
) -> Result<Option<(f64, Split)>> {
    let mut branch_counts = vec![vec![0usize; class_count]; domain];
    let mut covered = 0usize;
    for row in rows {
        let Some(v) = row.value(index).nominal() else {
            continue;
        };
        if v >= domain {
            return Err(GeolearnError::record(format!(
                "dstump: value index {v} outside a nominal universe of {domain}"
            )));
        }
        branch_counts[v][class_of(row, class_index)?] += 1;
        covered += 1;
    }
    if covered == 0 {
        return Ok(None);
    }

    let mut weighted = 0.0;
    let mut branches = Vec::with_capacity(domain);
    for counts in &branch_counts {
        let weight: usize = counts.iter().sum();
        weighted += weight as f64 / covered as f64 * entropy(counts);
        branches.push(if weight == 0 {
            default_class
        } else {
            majority(counts)
        });
    }
    Ok(Some((weighted, Split::Nominal { branches })))
}

/// Best threshold for a numeric attribute by a sorted sweep over the
/// midpoints between adjacent distinct values.
fn numeric_split(
    rows: &[Row],
    index: usize,
    class_index: usize,
    class_count: usize,
) -> Result<Option<(f64, Split)>> {
    let mut points: Vec<(f64, usize)> = Vec::new();
    for row in rows {
        if let Some(x) = row.value(index).numeric() {
            points.push((x, class_of(row, class_index)?));
        }
    }
    if points.len() < 2 {
        return Ok(None);
    }
    points.sort_by(|a, b| a.0.total_cmp(&b.0));

    let total = points.len() as f64;
    let mut left = vec![0usize; class_count];
    let mut right = vec![0usize; class_count];
    for (_, class) in &points {
        right[*class] += 1;
    }

    let mut best: Option<(f64, f64)> = None;
    for i in 0..points.len() - 1 {
        let (x, class) = points[i];
        left[class] += 1;
        right[class] -= 1;
        if x == points[i + 1].0 {
            continue;
        }
        let threshold = (x + points[i + 1].0) / 2.0;
        let count = (i + 1) as f64;
        let weighted =
            count / total * entropy(&left) + (total - count) / total * entropy(&right);
        if best.is_none_or(|(w, _)| weighted < w) {
            best = Some((weighted, threshold));
        }
    }
    let Some((weighted, threshold)) = best else {
        return Ok(None);
    };

    // Recount the winning partition for the branch predictions.
    let mut below = vec![0usize; class_count];
    let mut above = vec![0usize; class_count];
    for (x, class) in &points {
        if *x < threshold {
            below[*class] += 1;
        } else {
            above[*class] += 1;
        }
    }
    Ok(Some((
        weighted,
        Split::Numeric {
            threshold,
            below: majority(&below),
            above: majority(&above),
        },
    )))
}

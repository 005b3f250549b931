//! k-nearest-neighbors classifier.
//!
//! Stores the training rows verbatim and classifies by majority vote
//! among the k closest rows under a mixed-type distance: numeric
//! attributes are range-normalized absolute differences, nominal
//! attributes are a 0/1 mismatch, and a missing value on either side
//! contributes the maximum distance of 1.

use std::sync::Arc;

use crate::dataset::{Dataset, DatasetSchema, Row, Value};
use crate::error::{GeolearnError, Result};
use crate::learner::classifier::{Classifier, parse_option_value};

#[derive(Debug)]
struct Model {
    schema: Arc<DatasetSchema>,
    rows: Vec<Row>,
    /// Per attribute: (min, max) over the training rows, for numeric
    /// attributes with at least one observed value.
    ranges: Vec<Option<(f64, f64)>>,
}

/// Instance-based classifier with majority voting.
#[derive(Debug)]
pub struct NearestNeighbors {
    k: usize,
    model: Option<Model>,
}

impl NearestNeighbors {
    pub fn new() -> Self {
        NearestNeighbors { k: 5, model: None }
    }
}

impl Default for NearestNeighbors {
    fn default() -> Self {
        NearestNeighbors::new()
    }
}

impl Classifier for NearestNeighbors {
    fn name(&self) -> &'static str {
        "knn"
    }

    /// `-K <neighbors>` sets the vote size.
    fn set_options(&mut self, options: &[&str]) -> Result<()> {
        let mut iter = options.iter();
        while let Some(flag) = iter.next() {
            match *flag {
                "-K" => self.k = parse_option_value(self.name(), "-K", iter.next())?,
                other => {
                    return Err(GeolearnError::config(format!(
                        "classifier 'knn': unknown option '{other}'"
                    )));
                }
            }
        }
        if self.k == 0 {
            return Err(GeolearnError::config("classifier 'knn': -K must be positive"));
        }
        Ok(())
    }

    fn fit(&mut self, data: &Dataset) -> Result<()> {
        let schema = Arc::clone(data.schema());
        let mut ranges: Vec<Option<(f64, f64)>> = vec![None; schema.len()];
        for row in data.rows() {
            for (index, value) in row.values.iter().enumerate() {
                if let Value::Numeric(x) = value {
                    ranges[index] = Some(match ranges[index] {
                        Some((lo, hi)) => (lo.min(*x), hi.max(*x)),
                        None => (*x, *x),
                    });
                }
            }
        }
        self.model = Some(Model {
            schema,
            rows: data.rows().to_vec(),
            ranges,
        });
        Ok(())
    }

    fn predict(&self, row: &Row) -> Result<usize> {
        let model = self
            .model
            .as_ref()
            .ok_or_else(|| GeolearnError::learner("knn: predict before fit"))?;
        if model.rows.is_empty() {
            return Err(GeolearnError::prediction("knn: no stored training rows"));
        }

        let mut scored: Vec<(f64, usize)> = Vec::with_capacity(model.rows.len());
        for stored in &model.rows {
            let class = stored
                .value(model.schema.class_index())
                .nominal()
                .ok_or_else(|| GeolearnError::record("knn: stored row has no class value"))?;
            scored.push((distance(model, row, stored), class));
        }
        scored.sort_by(|a, b| a.0.total_cmp(&b.0));

        let mut votes = vec![0usize; model.schema.class_values().len()];
        for (_, class) in scored.iter().take(self.k) {
            votes[*class] += 1;
        }
        // Ties break toward the lower class index.
        let mut best = 0;
        for (class, count) in votes.iter().enumerate() {
            if *count > votes[best] {
                best = class;
            }
        }
        Ok(best)
    }
}

fn distance(model: &Model, a: &Row, b: &Row) -> f64 {
    let mut sum = 0.0;
    for index in 0..model.schema.len() {
        if index == model.schema.class_index() {
            continue;
        }
        let d = match (a.value(index), b.value(index)) {
            (Value::Missing, _) | (_, Value::Missing) => 1.0,
            (Value::Nominal(x), Value::Nominal(y)) => {
                if x == y { 0.0 } else { 1.0 }
            }
            (Value::Numeric(x), Value::Numeric(y)) => match model.ranges[index] {
                Some((lo, hi)) if hi > lo => ((x - y) / (hi - lo)).abs().min(1.0),
                _ => {
                    if x == y { 0.0 } else { 1.0 }
                }
            },
            // Mixed types cannot happen for rows of one schema.
            _ => 1.0,
        };
        sum += d * d;
    }
    sum.sqrt()
}

//! Deterministic isolation forest.
//!
//! Split features and split points are derived from tree height and
//! partition size instead of a seeded RNG, so a forest fitted twice on
//! the same corpus scores identically. Scores follow the standard
//! isolation-forest normalization: 2^(-avg_path / c(sample_size)),
//! landing in (0, 1] with outliers pushed toward 1.

use crate::DetectError;

#[derive(Debug, Clone)]
enum Node {
    Split {
        feature: usize,
        value: f64,
        left: Box<Node>,
        right: Box<Node>,
    },
    Leaf {
        size: usize,
    },
}

#[derive(Debug, Clone)]
struct Tree {
    root: Node,
}

impl Tree {
    fn grow(data: &[&[f64]], height_limit: usize, height: usize) -> Node {
        if height >= height_limit || data.len() <= 1 {
            return Node::Leaf { size: data.len() };
        }

        let n_features = data[0].len();
        if n_features == 0 {
            return Node::Leaf { size: data.len() };
        }

        let feature = (height * 31 + data.len() * 17) % n_features;

        let min = data
            .iter()
            .map(|row| row[feature])
            .fold(f64::INFINITY, f64::min);
        let max = data
            .iter()
            .map(|row| row[feature])
            .fold(f64::NEG_INFINITY, f64::max);
        if (max - min).abs() < f64::EPSILON {
            return Node::Leaf { size: data.len() };
        }

        // Golden-ratio hash of the height keeps the cut point stable.
        let frac = (height as f64 * 0.618033988749895) % 1.0;
        let value = min + frac * (max - min);

        let (left, right): (Vec<&[f64]>, Vec<&[f64]>) =
            data.iter().copied().partition(|row| row[feature] < value);

        Node::Split {
            feature,
            value,
            left: Box::new(Self::grow(&left, height_limit, height + 1)),
            right: Box::new(Self::grow(&right, height_limit, height + 1)),
        }
    }

    fn path_length(&self, sample: &[f64]) -> f64 {
        let mut node = &self.root;
        let mut depth = 0usize;
        loop {
            match node {
                Node::Leaf { size } => return depth as f64 + c(*size),
                Node::Split {
                    feature,
                    value,
                    left,
                    right,
                } => {
                    node = if sample.get(*feature).copied().unwrap_or(0.0) < *value {
                        left
                    } else {
                        right
                    };
                    depth += 1;
                }
            }
        }
    }
}

/// Average path length of an unsuccessful BST search over n points.
fn c(n: usize) -> f64 {
    if n <= 1 {
        return 0.0;
    }
    let n = n as f64;
    2.0 * (n.ln() + 0.5772156649) - (2.0 * (n - 1.0) / n)
}

/// Isolation forest over fixed-order feature rows.
#[derive(Debug, Clone)]
pub struct IsolationForest {
    trees: Vec<Tree>,
    n_trees: usize,
    sample_size: usize,
    threshold: f64,
}

impl IsolationForest {
    pub fn new(n_trees: usize, sample_size: usize) -> Self {
        Self {
            trees: Vec::new(),
            n_trees,
            sample_size,
            threshold: 0.5,
        }
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn fit(&mut self, rows: &[Vec<f64>]) -> Result<(), DetectError> {
        if rows.len() < self.sample_size {
            return Err(DetectError::InsufficientData {
                needed: self.sample_size,
                have: rows.len(),
            });
        }

        let height_limit = (self.sample_size as f64).log2().ceil() as usize;

        self.trees.clear();
        for i in 0..self.n_trees {
            let sample: Vec<&[f64]> = rows
                .iter()
                .enumerate()
                .filter(|(j, _)| (i * 31 + j * 17) % rows.len() < self.sample_size)
                .map(|(_, row)| row.as_slice())
                .take(self.sample_size)
                .collect();

            self.trees.push(Tree {
                root: Tree::grow(&sample, height_limit, 0),
            });
        }

        Ok(())
    }

    pub fn score(&self, sample: &[f64]) -> Result<f64, DetectError> {
        if self.trees.is_empty() {
            return Err(DetectError::NotTrained);
        }

        let avg_path: f64 = self
            .trees
            .iter()
            .map(|t| t.path_length(sample))
            .sum::<f64>()
            / self.trees.len() as f64;

        Ok(2.0_f64.powf(-avg_path / c(self.sample_size)))
    }

    /// Anomaly verdict at the configured threshold.
    pub fn is_anomaly(&self, sample: &[f64]) -> Result<bool, DetectError> {
        Ok(self.score(sample)? > self.threshold)
    }

    pub fn is_trained(&self) -> bool {
        !self.trees.is_empty()
    }

    pub fn tree_count(&self) -> usize {
        self.n_trees
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_rows(n: usize) -> Vec<Vec<f64>> {
        (0..n)
            .map(|i| {
                vec![
                    (i as f64).sin() * 10.0 + 50.0,
                    (i as f64).cos() * 5.0 + 25.0,
                    i as f64 % 10.0,
                ]
            })
            .collect()
    }

    #[test]
    fn fit_requires_enough_rows() {
        let mut forest = IsolationForest::new(10, 64);
        let err = forest.fit(&make_rows(10)).unwrap_err();
        assert!(matches!(
            err,
            DetectError::InsufficientData { needed: 64, have: 10 }
        ));
    }

    #[test]
    fn untrained_score_is_error() {
        let forest = IsolationForest::new(10, 64);
        assert!(matches!(
            forest.score(&[1.0, 2.0, 3.0]),
            Err(DetectError::NotTrained)
        ));
    }

    #[test]
    fn outlier_scores_above_inlier() {
        let rows = make_rows(500);
        let mut forest = IsolationForest::new(100, 256);
        forest.fit(&rows).unwrap();

        let inlier_score = forest.score(&rows[100]).unwrap();
        let outlier_score = forest.score(&[1000.0, -500.0, 999.0]).unwrap();
        assert!(outlier_score > inlier_score);
        assert!(outlier_score > 0.5);
        assert!(inlier_score < 0.6);
    }

    #[test]
    fn deterministic_across_fits() {
        let rows = make_rows(400);
        let sample = vec![52.0, 26.0, 4.0];

        let mut a = IsolationForest::new(50, 128);
        a.fit(&rows).unwrap();
        let mut b = IsolationForest::new(50, 128);
        b.fit(&rows).unwrap();

        assert_eq!(a.score(&sample).unwrap(), b.score(&sample).unwrap());
    }
}

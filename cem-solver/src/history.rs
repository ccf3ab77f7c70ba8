/// Snapshots of the field, one row per time step.
///
/// Rows are stored contiguously in a single buffer.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FieldHistory {
    num_points: usize,
    data: Vec<f64>,
}

impl FieldHistory {
    pub fn new(num_points: usize) -> Self {
        Self {
            num_points,
            data: vec![],
        }
    }

    pub fn with_capacity(num_points: usize, num_steps: usize) -> Self {
        Self {
            num_points,
            data: Vec::with_capacity(num_points * num_steps),
        }
    }

    /// Appends a snapshot.
    ///
    /// # Panics
    ///
    /// Panics if `field` doesn't have `num_points` samples.
    pub fn push(&mut self, field: &[f64]) {
        assert_eq!(
            field.len(),
            self.num_points,
            "snapshot has wrong number of samples"
        );
        self.data.extend_from_slice(field);
    }

    pub fn num_points(&self) -> usize {
        self.num_points
    }

    /// Number of recorded steps
    pub fn len(&self) -> usize {
        if self.num_points == 0 {
            0
        }
        else {
            self.data.len() / self.num_points
        }
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Field after step `step`.
    pub fn snapshot(&self, step: usize) -> Option<&[f64]> {
        let start = step.checked_mul(self.num_points)?;
        let end = start.checked_add(self.num_points)?;
        self.data.get(start..end)
    }

    pub fn iter(&self) -> impl ExactSizeIterator<Item = &[f64]> {
        // chunks_exact panics on a chunk size of 0
        self.data.chunks_exact(self.num_points.max(1))
    }

    /// Value at `index` over all recorded steps.
    pub fn column(&self, index: usize) -> Option<Vec<f64>> {
        (index < self.num_points).then(|| self.iter().map(|row| row[index]).collect())
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }
}

#[cfg(test)]
mod tests {
    use crate::history::FieldHistory;

    #[test]
    fn it_records_rows() {
        let mut history = FieldHistory::new(3);
        assert!(history.is_empty());

        history.push(&[1.0, 2.0, 3.0]);
        history.push(&[4.0, 5.0, 6.0]);

        assert_eq!(history.len(), 2);
        assert_eq!(history.snapshot(1), Some(&[4.0, 5.0, 6.0][..]));
        assert_eq!(history.snapshot(2), None);
        assert_eq!(history.snapshot(usize::MAX / 3), None);
        assert_eq!(history.snapshot(usize::MAX), None);
        assert_eq!(history.iter().count(), 2);
    }

    #[test]
    fn it_extracts_columns() {
        let mut history = FieldHistory::with_capacity(2, 3);
        history.push(&[1.0, 2.0]);
        history.push(&[3.0, 4.0]);
        history.push(&[5.0, 6.0]);

        assert_eq!(history.column(1), Some(vec![2.0, 4.0, 6.0]));
        assert_eq!(history.column(2), None);
    }

    #[test]
    #[should_panic]
    fn it_rejects_wrong_row_length() {
        let mut history = FieldHistory::new(3);
        history.push(&[1.0, 2.0]);
    }
}

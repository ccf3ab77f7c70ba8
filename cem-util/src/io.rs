use std::io;

/// Writes equally long columns of numbers as comma-separated rows.
///
/// The first row holds the column headers.
#[derive(Debug)]
pub struct ColumnWriter<'a> {
    headers: Vec<&'a str>,
    columns: Vec<&'a [f64]>,
}

impl<'a> ColumnWriter<'a> {
    pub fn new() -> Self {
        Self {
            headers: vec![],
            columns: vec![],
        }
    }

    pub fn column(mut self, header: &'a str, values: &'a [f64]) -> Self {
        self.headers.push(header);
        self.columns.push(values);
        self
    }

    pub fn num_rows(&self) -> usize {
        self.columns.first().map_or(0, |column| column.len())
    }

    pub fn write<W>(&self, mut writer: W) -> Result<(), ColumnError>
    where
        W: io::Write,
    {
        let num_rows = self.num_rows();
        for (header, column) in self.headers.iter().zip(&self.columns) {
            if column.len() != num_rows {
                return Err(ColumnError::LengthMismatch {
                    header: header.to_string(),
                    expected: num_rows,
                    actual: column.len(),
                });
            }
        }

        writeln!(writer, "{}", self.headers.join(","))?;

        for row in 0..num_rows {
            for (i, column) in self.columns.iter().enumerate() {
                if i > 0 {
                    write!(writer, ",")?;
                }
                write!(writer, "{:e}", column[row])?;
            }
            writeln!(writer)?;
        }

        writer.flush()?;

        Ok(())
    }
}

impl Default for ColumnWriter<'_> {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ColumnError {
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error("Column {header} has {actual} rows, expected {expected}")]
    LengthMismatch {
        header: String,
        expected: usize,
        actual: usize,
    },
}

#[cfg(test)]
mod tests {
    use crate::io::{
        ColumnError,
        ColumnWriter,
    };

    #[test]
    fn it_writes_rows() {
        let z = [0.0, 0.5];
        let e = [1.0, -2.5];
        let mut buffer = vec![];
        ColumnWriter::new()
            .column("z", &z)
            .column("e", &e)
            .write(&mut buffer)
            .unwrap();

        let text = String::from_utf8(buffer).unwrap();
        assert_eq!(text, "z,e\n0e0,1e0\n5e-1,-2.5e0\n");
    }

    #[test]
    fn it_rejects_ragged_columns() {
        let z = [0.0, 0.5];
        let e = [1.0];
        let result = ColumnWriter::new()
            .column("z", &z)
            .column("e", &e)
            .write(&mut vec![]);

        assert!(matches!(
            result,
            Err(ColumnError::LengthMismatch {
                expected: 2,
                actual: 1,
                ..
            })
        ));
    }
}

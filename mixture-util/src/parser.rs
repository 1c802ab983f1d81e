use crate::common_io::open_buf_reader;
use std::io::BufRead;

/// Read one p-value per line.
///
/// Lines that are blank, not a number, NaN or outside [0, 1] are skipped
/// and handed to `on_bad_line` with their 1-based line number. I/O errors
/// stop the parse.
pub fn parse_p_values<R, F>(reader: R, mut on_bad_line: F) -> std::io::Result<Vec<f64>>
where
    R: BufRead,
    F: FnMut(usize, &str),
{
    let mut ret = vec![];
    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        match line.trim().parse::<f64>() {
            Ok(p) if (0.0..=1.0).contains(&p) => ret.push(p),
            _ => on_bad_line(i + 1, &line),
        }
    }
    Ok(ret)
}

/// [`parse_p_values`] on a plain or gzipped file
pub fn read_p_values<F>(input_file: &str, on_bad_line: F) -> anyhow::Result<Vec<f64>>
where
    F: FnMut(usize, &str),
{
    let buf = open_buf_reader(input_file)?;
    Ok(parse_p_values(buf, on_bad_line)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bad_lines_are_reported() {
        let text = "0.5\n\nabc\n1.2\nNaN\n 0.001 \n-0.1\n1\n";
        let mut bad = vec![];
        let values = parse_p_values(text.as_bytes(), |i, line| bad.push((i, line.to_string())))
            .unwrap();
        assert_eq!(values, vec![0.5, 0.001, 1.0]);
        let lines: Vec<usize> = bad.iter().map(|(i, _)| *i).collect();
        assert_eq!(lines, vec![2, 3, 4, 5, 7]);
        assert_eq!(bad[1].1, "abc");
    }

    #[test]
    fn test_read_file() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let file = dir.path().join("p.txt");
        std::fs::write(&file, "0.01\n0.2\nx\n")?;
        let mut num_bad = 0;
        let values = read_p_values(file.to_str().unwrap_or_default(), |_, _| num_bad += 1)?;
        assert_eq!(values, vec![0.01, 0.2]);
        assert_eq!(num_bad, 1);
        Ok(())
    }
}

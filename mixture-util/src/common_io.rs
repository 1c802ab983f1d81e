use flate2::read::GzDecoder;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

///
/// Open a p-value list for reading
///
/// * `input_file` - file name--either gzipped or not; `stdin` reads the
///   standard input
///
pub fn open_buf_reader(input_file: &str) -> anyhow::Result<Box<dyn BufRead>> {
    if input_file == "-" || input_file.eq_ignore_ascii_case("stdin") {
        return Ok(Box::new(BufReader::new(std::io::stdin())));
    }

    let file = File::open(input_file)
        .map_err(|e| anyhow::anyhow!("failed to open {}: {}", input_file, e))?;

    match Path::new(input_file).extension().and_then(|x| x.to_str()) {
        Some("gz") => Ok(Box::new(BufReader::new(GzDecoder::new(file)))),
        _ => Ok(Box::new(BufReader::new(file))),
    }
}

///
/// Open a file for writing, and return a buffered writer
///
/// * `output_file` - file name--either gzipped or not; `stdout` and
///   `stderr` write to the console
///
pub fn open_buf_writer(output_file: &str) -> anyhow::Result<Box<dyn Write>> {
    if output_file.eq_ignore_ascii_case("stdout") {
        return Ok(Box::new(BufWriter::new(std::io::stdout())));
    }

    if output_file.eq_ignore_ascii_case("stderr") {
        return Ok(Box::new(BufWriter::new(std::io::stderr())));
    }

    mkdir(output_file)?;
    let file = File::create(output_file)?;

    match Path::new(output_file).extension().and_then(|x| x.to_str()) {
        Some("gz") => {
            let encoder = flate2::write::GzEncoder::new(file, flate2::Compression::default());
            Ok(Box::new(BufWriter::new(encoder)))
        }
        _ => Ok(Box::new(BufWriter::new(file))),
    }
}

///
/// Write every line into the output_file; a closed pipe ends the
/// output quietly
///
/// * `lines` - anything that can be displayed, one per line
/// * `output_file` - file name--either gzipped or not
///
pub fn write_lines<T>(lines: &[T], output_file: &str) -> anyhow::Result<()>
where
    T: std::fmt::Display,
{
    let mut buf = open_buf_writer(output_file)?;
    for line in lines {
        if let Err(e) = writeln!(buf, "{}", line) {
            if e.kind() == std::io::ErrorKind::BrokenPipe {
                return Ok(());
            }
            return Err(anyhow::anyhow!("failed to write {}: {}", output_file, e));
        }
    }
    buf.flush()?;
    Ok(())
}

///
/// Create the parent directory of a file if needed
///
pub fn mkdir(file: &str) -> anyhow::Result<()> {
    if let Some(dir) = Path::new(file).parent() {
        if !dir.as_os_str().is_empty() {
            std::fs::create_dir_all(dir)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    #[test]
    fn test_write_and_read_back_gz() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let file = dir.path().join("nested").join("values.txt.gz");
        let file = file.to_str().ok_or(anyhow::anyhow!("path"))?;

        write_lines(&["0.1", "0.25", "0.9"], file)?;

        let mut text = String::new();
        open_buf_reader(file)?.read_to_string(&mut text)?;
        assert_eq!(text, "0.1\n0.25\n0.9\n");
        Ok(())
    }

    #[test]
    fn test_missing_file() {
        assert!(open_buf_reader("/nonexistent/pvalues.txt").is_err());
    }
}

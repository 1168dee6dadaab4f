//! Line-delimited sample loading with block decimation
//!
//! Every line is decoded (a bad line aborts the run even when its block
//! would have been dropped), then only blocks on the decimation stride are
//! handed on.

use crate::error::{PlotError, Result};
use crate::sample::Sample;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Keep one sample every this many blocks
pub const DECIMATION_STRIDE: i64 = 10_000;

/// Whether a block height survives decimation
pub fn is_kept(block: i64) -> bool {
    block % DECIMATION_STRIDE == 0
}

/// A sample that survived decimation, with its 1-based line number
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeptSample {
    pub line: usize,
    pub sample: Sample,
}

/// Iterator over the kept samples of a line-delimited JSON source
pub struct SampleLoader<R> {
    reader: R,
    buf: String,
    lines_read: usize,
    samples_kept: usize,
    failed: bool,
}

impl SampleLoader<BufReader<File>> {
    /// Open a sample log on disk
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| PlotError::InputNotFound {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!(path = %path.display(), "opened sample log");
        Ok(Self::new(BufReader::new(file)))
    }
}

impl<R: BufRead> SampleLoader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buf: String::new(),
            lines_read: 0,
            samples_kept: 0,
            failed: false,
        }
    }

    /// Lines consumed so far, kept or not
    pub fn lines_read(&self) -> usize {
        self.lines_read
    }

    /// Samples handed out so far
    pub fn samples_kept(&self) -> usize {
        self.samples_kept
    }

    fn next_line(&mut self) -> Option<Result<usize>> {
        self.buf.clear();
        match self.reader.read_line(&mut self.buf) {
            Ok(0) => None,
            Ok(_) => {
                self.lines_read += 1;
                Some(Ok(self.lines_read))
            }
            Err(e) => Some(Err(PlotError::malformed(
                self.lines_read + 1,
                format!("read failed: {}", e),
            ))),
        }
    }
}

impl<R: BufRead> Iterator for SampleLoader<R> {
    type Item = Result<KeptSample>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }

        loop {
            let line = match self.next_line()? {
                Ok(line) => line,
                Err(e) => {
                    self.failed = true;
                    return Some(Err(e));
                }
            };

            let text = self.buf.trim_end_matches(['\n', '\r']);
            let sample = match Sample::from_json_line(text, line) {
                Ok(sample) => sample,
                Err(e) => {
                    self.failed = true;
                    return Some(Err(e));
                }
            };

            if !is_kept(sample.block) {
                continue;
            }

            self.samples_kept += 1;
            tracing::trace!(line, block = sample.block, "kept sample");
            return Some(Ok(KeptSample { line, sample }));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};
    use tempfile::NamedTempFile;

    fn loader(input: &str) -> SampleLoader<Cursor<Vec<u8>>> {
        SampleLoader::new(Cursor::new(input.as_bytes().to_vec()))
    }

    #[test]
    fn test_is_kept() {
        assert!(is_kept(0));
        assert!(is_kept(10_000));
        assert!(is_kept(68_580_000));
        assert!(!is_kept(9_999));
        assert!(!is_kept(10_001));
        assert!(!is_kept(1_000));
    }

    #[test]
    fn test_decimation_keeps_stride_blocks_in_order() {
        let input = "\
{\"b\":1000,\"s\":1,\"rvec\":[0,0]}
{\"b\":10000,\"s\":2,\"rvec\":[0,0]}
{\"b\":15000,\"s\":3,\"rvec\":[0,0]}
{\"b\":20000,\"s\":4,\"rvec\":[0,0]}
";
        let mut loader = loader(input);
        let kept: Vec<_> = loader.by_ref().collect::<Result<_>>().unwrap();
        let blocks: Vec<_> = kept.iter().map(|k| k.sample.block).collect();
        let lines: Vec<_> = kept.iter().map(|k| k.line).collect();

        assert_eq!(blocks, vec![10000, 20000]);
        assert_eq!(lines, vec![2, 4]);
        assert_eq!(loader.lines_read(), 4);
        assert_eq!(loader.samples_kept(), 2);
    }

    #[test]
    fn test_last_line_without_newline() {
        let kept: Vec<_> = loader("{\"b\":10000,\"s\":2,\"rvec\":[]}")
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(kept.len(), 1);
    }

    #[test]
    fn test_crlf_line_endings() {
        let kept: Vec<_> = loader("{\"b\":10000,\"s\":2,\"rvec\":[]}\r\n")
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(kept.len(), 1);
    }

    #[test]
    fn test_empty_input_yields_nothing() {
        let mut loader = loader("");
        assert!(loader.next().is_none());
        assert_eq!(loader.lines_read(), 0);
    }

    #[test]
    fn test_malformed_dropped_line_still_fails() {
        // Block 1 would be dropped, but the missing field aborts first
        let input = "{\"b\":10000,\"s\":2,\"rvec\":[]}\n{\"b\":1}\n{\"b\":20000,\"s\":2,\"rvec\":[]}\n";
        let results: Vec<_> = loader(input).collect();
        assert_eq!(results.len(), 2);
        assert!(results[0].is_ok());
        assert!(matches!(
            results[1],
            Err(PlotError::MalformedRecord { line: 2, .. })
        ));
    }

    #[test]
    fn test_blank_line_is_malformed() {
        let input = "{\"b\":10000,\"s\":2,\"rvec\":[]}\n\n";
        let err = loader(input).collect::<Result<Vec<_>>>().unwrap_err();
        assert!(matches!(err, PlotError::MalformedRecord { line: 2, .. }));
    }

    #[test]
    fn test_open_missing_file() {
        let err = SampleLoader::open("/nonexistent/path/samples.jsonl")
            .err()
            .expect("missing file must fail");
        assert!(matches!(err, PlotError::InputNotFound { .. }));
    }

    #[test]
    fn test_open_reads_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "{{\"b\":0,\"s\":21000000,\"rvec\":[999,0]}}").unwrap();
        writeln!(file, "{{\"b\":5,\"s\":21000000,\"rvec\":[999,0]}}").unwrap();
        file.flush().unwrap();

        let mut loader = SampleLoader::open(file.path()).unwrap();
        let kept: Vec<_> = loader.by_ref().collect::<Result<_>>().unwrap();
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].sample.block, 0);
        assert_eq!(loader.lines_read(), 2);
    }
}

use crate::libmcq::eval::EvalResult;
use crate::libmcq::Error;
use log::info;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

/// Writes `"{index} {answer_num}"` per line, in the order given, no header.
/// Missing parent directories are created first.
pub fn save_results_txt(results: &[EvalResult], output_path: &Path) -> Result<(), Error> {
    if let Some(dir) = output_path.parent() {
        if !dir.as_os_str().is_empty() && !dir.exists() {
            fs::create_dir_all(dir).map_err(|source| Error::CreateOutputDir {
                path: dir.to_path_buf(),
                source,
            })?;
        }
    }

    let write_err = |source| Error::WriteResults {
        path: output_path.to_path_buf(),
        source,
    };
    let mut out = BufWriter::new(File::create(output_path).map_err(write_err)?);
    for result in results {
        writeln!(out, "{} {}", result.index, result.answer_num).map_err(write_err)?;
    }
    out.flush().map_err(write_err)?;

    info!("[Save] {} rows to {:?}", results.len(), output_path);
    Ok(())
}

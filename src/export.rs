//! CSV export of experiment results.

use std::io::Write;

use crate::error::Result;
use crate::solver::PathSolution;
use crate::summary::RateSummary;

/// Write rate summaries, one row per path position.
///
/// Connectivity columns are included when the first summary carries them;
/// rows without connectivity leave those cells empty.
pub fn write_summary_csv<W: Write>(mut writer: W, summaries: &[RateSummary]) -> Result<()> {
    let with_connectivity = summaries
        .first()
        .is_some_and(|s| s.connectivity.is_some());

    write!(writer, "rho,tpr_mean,tpr_q10,tpr_q90,fpr_mean,fpr_q10,fpr_q90")?;
    if with_connectivity {
        write!(writer, ",conn_mean,conn_q10,conn_q90,connected_fraction")?;
    }
    writeln!(writer)?;

    for s in summaries {
        write!(
            writer,
            "{},{},{},{},{},{},{}",
            s.rho, s.tpr.mean, s.tpr.q10, s.tpr.q90, s.fpr.mean, s.fpr.q10, s.fpr.q90
        )?;
        if with_connectivity {
            match (s.connectivity, s.connected_fraction) {
                (Some(c), Some(f)) => write!(writer, ",{},{},{},{}", c.mean, c.q10, c.q90, f)?,
                _ => write!(writer, ",,,,")?,
            }
        }
        writeln!(writer)?;
    }
    writer.flush()?;
    Ok(())
}

/// Write every entry of every estimated precision matrix along a path,
/// header `rho,row,col,value`.
pub fn write_path_csv<W: Write>(mut writer: W, solution: &PathSolution) -> Result<()> {
    writeln!(writer, "rho,row,col,value")?;
    for est in solution.iter() {
        let m = &est.precision;
        for row in 0..m.nrows() {
            for col in 0..m.ncols() {
                writeln!(writer, "{},{},{},{}", est.rho, row, col, m[(row, col)])?;
            }
        }
    }
    writer.flush()?;
    Ok(())
}

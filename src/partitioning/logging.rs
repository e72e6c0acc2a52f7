use crate::partitioning::RankedSingularValue;
use log::{debug, info, log_enabled, Level};

pub fn print_partition_header(n_mo: usize, n_frag: usize) {
    info!("{:^80}", "");
    info!(
        " Partition {:>4} orbitals into a total of {:>4} orbitals",
        n_mo, n_frag
    );
    info!("{:-^80}", "");
    info!("{:>16} {:>12} {:<12}", "Index", "Sing. Val.", "Space");
}

/// The singular values of all fragment orbitals are printed and marked with a star. From the
/// environment orbitals only those above `threshold` are printed at the info level, since they
/// still overlap with the fragment.
pub fn print_singular_values(spectrum: &[RankedSingularValue], n_frag: usize, threshold: f64) {
    for (idx, sv) in spectrum.iter().enumerate() {
        if idx < n_frag {
            info!("{:>16} {:>12.8} {:>12}*", idx, sv.value, sv.block);
        } else if sv.value > threshold {
            info!("{:>16} {:>12.8} {:>12}", idx, sv.value, sv.block);
        } else if log_enabled!(Level::Debug) {
            debug!("{:>16} {:>12.8} {:>12}", idx, sv.value, sv.block);
        }
    }
    info!("{:-^80}", "");
}

use anyhow::{bail, Context, Result};
use clap::{crate_version, Arg, Command};
use env_logger::Builder;
use log::{info, warn, LevelFilter};
use ndarray::prelude::*;
use orbpart::canonicalization::{canonicalize, CanonicalBlock};
use orbpart::defaults::*;
use orbpart::embedding::{dmet_clustering, fragment_active_space, ActiveSpace, DmetClusters};
use orbpart::frontier::{extract_frontier_orbitals, FrontierDims, FrontierOrbitals};
use orbpart::io::*;
use orbpart::projector::FragmentProjector;
use orbpart::utils::{trace_abs_overlap, Timer};
use std::io::Write;
use std::path::{Path, PathBuf};

fn main() -> Result<()> {
    let matches = Command::new("orbpart")
        .version(crate_version!())
        .about("SVD based partitioning of molecular orbitals into fragment and environment")
        .arg(
            Arg::new("input")
                .help("directory with the orbital blocks, the overlap matrix and projectors")
                .required(true)
                .index(1),
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .takes_value(true)
                .help("configuration file, defaults to <input>/orbpart.toml"),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .takes_value(true)
                .help("directory for the results, defaults to the input directory"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .multiple_occurrences(true)
                .help("increases the verbosity of the output"),
        )
        .get_matches();

    let input_dir: PathBuf = PathBuf::from(matches.value_of("input").unwrap_or("."));
    let config_path: PathBuf = match matches.value_of("config") {
        Some(path) => PathBuf::from(path),
        None => input_dir.join(CONFIG_FILE_NAME),
    };
    let output_dir: PathBuf = match matches.value_of("output") {
        Some(path) => PathBuf::from(path),
        None => input_dir.clone(),
    };

    let config: Configuration = Configuration::from_file(&config_path)
        .with_context(|| format!("could not read {}", config_path.display()))?;
    let verbose: i64 = config.verbose as i64 + matches.occurrences_of("verbose") as i64;
    let log_level: LevelFilter = match verbose {
        i64::MIN..=-2 => LevelFilter::Error,
        -1 => LevelFilter::Warn,
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    Builder::new()
        .format(|buf, record| writeln!(buf, "{}", record.args()))
        .filter(None, log_level)
        .init();

    write_header();
    let timer: Timer = Timer::start();

    let bundle: MatrixBundle = MatrixBundle::from_directory(&input_dir)
        .with_context(|| format!("could not load the matrices of {}", input_dir.display()))?;
    let reference_path: PathBuf = input_dir.join(REFERENCE_FILE_NAME);
    let reference: Option<ReferencePartition> = if reference_path.exists() {
        Some(ReferencePartition::from_file(&reference_path).with_context(|| {
            format!("could not read the reference {}", reference_path.display())
        })?)
    } else {
        None
    };

    let blocks: Vec<Array2<f64>> = bundle.get_all(&config.orbital_blocks)?;
    let s: ArrayView2<f64> = bundle.get(&config.overlap)?;

    let fragment_configs: Vec<FragmentConfig> = fragment_configs(&config, reference.as_ref());
    if fragment_configs.is_empty() {
        bail!(
            "no fragments are defined, add [[fragments]] to {} or provide {}",
            config_path.display(),
            REFERENCE_FILE_NAME
        );
    }
    let fragments: Vec<FragmentProjector> = fragment_configs
        .iter()
        .map(|frag| frag.projector(&bundle))
        .collect::<Result<Vec<FragmentProjector>, IoError>>()?;

    let active: ActiveSpace = fragment_active_space(
        &blocks,
        &fragments,
        s,
        &config.partitioning,
        &config.orthogonalization,
    )
    .context("the partitioning of the orbitals failed")?;
    write_blocks(&output_dir, "fragment", &active.fragments)?;

    let mut summaries: Vec<FragmentSummary> = fragment_summaries(&fragment_configs, &active);
    if let Some(name) = &config.fock {
        let f: ArrayView2<f64> = bundle.get(name)?;
        frontier_orbitals(
            &active,
            &fragment_configs,
            f,
            &config,
            &output_dir,
            &mut summaries,
        )?;
    }

    if config.dmet {
        let dmet: DmetClusters = match (blocks.first(), blocks.last()) {
            (Some(c_occ), Some(c_vir)) if blocks.len() > 1 => dmet_clustering(
                c_occ.view(),
                c_vir.view(),
                &fragments,
                s,
                &config.partitioning,
            )?,
            _ => bail!("the DMET clustering needs an occupied and a virtual orbital block"),
        };
        info!("{: <25} {:?}", "DMET cluster sizes:", dmet.sizes());
        write_blocks(&output_dir, "dmet", &dmet.orbitals)?;
        if let Some(reference) = &reference {
            if !reference.dmet_sizes.is_empty() && reference.dmet_sizes != dmet.sizes() {
                warn!(
                    "DMET cluster sizes {:?} differ from the reference {:?}",
                    dmet.sizes(),
                    reference.dmet_sizes
                );
            }
        }
    }

    let summary: Summary = Summary {
        fragments: summaries,
        init_fspace: active.init_fspace.clone(),
        clusters: active.clusters.clone(),
    };
    write_summary(output_dir.join(SUMMARY_FILE_NAME), &summary)?;

    if let Some(reference) = &reference {
        compare_with_reference(&active, reference, &bundle, s);
    }
    info!("{}", timer);
    Ok(())
}

/// The fragments of the configuration file. If there are none, the AO index lists of the
/// reference are used.
fn fragment_configs(
    config: &Configuration,
    reference: Option<&ReferencePartition>,
) -> Vec<FragmentConfig> {
    if !config.fragments.is_empty() {
        return config.fragments.clone();
    }
    match reference {
        Some(reference) => reference
            .frags
            .iter()
            .map(|ao_indices| FragmentConfig {
                ao_indices: ao_indices.clone(),
                ..FragmentConfig::default()
            })
            .collect(),
        None => Vec::new(),
    }
}

fn fragment_summaries(configs: &[FragmentConfig], active: &ActiveSpace) -> Vec<FragmentSummary> {
    configs
        .iter()
        .enumerate()
        .map(|(idx, frag)| FragmentSummary {
            name: frag.label(idx),
            block_sizes: active.block_sizes[idx].clone(),
            singular_values: active.singular_values[idx].iter().map(|sv| sv.value).collect(),
            leaked_singular_values: active.leaked[idx].iter().map(|sv| sv.value).collect(),
            orbital_energies: None,
            frontier: None,
        })
        .collect()
}

/// Canonicalizes the orbitals of every fragment and splits them into core, active and virtual
/// orbitals if the fragment defines the frontier dimensions.
fn frontier_orbitals(
    active: &ActiveSpace,
    configs: &[FragmentConfig],
    f: ArrayView2<f64>,
    config: &Configuration,
    output_dir: &Path,
    summaries: &mut [FragmentSummary],
) -> Result<()> {
    let canonical: Vec<CanonicalBlock> = canonicalize(
        &active.fragments,
        f,
        &config.canonicalization,
    )
    .context("the canonicalization of the fragment orbitals failed")?;
    let orbitals: Vec<Array2<f64>> = canonical.iter().map(|c| c.orbitals.clone()).collect();
    write_blocks(output_dir, "canonical", &orbitals)?;
    for (summary, block) in summaries.iter_mut().zip(canonical.iter()) {
        summary.orbital_energies = Some(block.orbital_energies.to_vec());
    }

    let dims: Vec<Option<FrontierDims>> = configs.iter().map(|c| c.frontier_dims()).collect();
    if dims.iter().all(|d| d.is_none()) {
        return Ok(());
    }
    let dims: Vec<FrontierDims> = dims
        .iter()
        .zip(orbitals.iter())
        .map(|(dim, c)| dim.unwrap_or_else(|| FrontierDims::new(0, c.ncols(), 0)))
        .collect();
    let frontier: FrontierOrbitals = extract_frontier_orbitals(&orbitals, &dims)
        .context("the frontier orbitals could not be extracted")?;
    write_blocks(output_dir, "core", &frontier.core)?;
    write_blocks(output_dir, "active", &frontier.active)?;
    write_blocks(output_dir, "virtual", &frontier.virt)?;
    for (summary, dim) in summaries.iter_mut().zip(dims.into_iter()) {
        summary.frontier = Some(dim);
    }
    Ok(())
}

fn compare_with_reference(
    active: &ActiveSpace,
    reference: &ReferencePartition,
    bundle: &MatrixBundle,
    s: ArrayView2<f64>,
) {
    info!("{:-^80}", " Reference ");
    if !reference.init_fspace.is_empty() {
        let agree: bool = reference.init_fspace == active.init_fspace;
        info!("{: <25} {}", "init_fspace agrees:", agree);
        if !agree {
            warn!(
                "init_fspace {:?} differs from the reference {:?}",
                active.init_fspace, reference.init_fspace
            );
        }
    }
    if !reference.clusters.is_empty() {
        let agree: bool = reference.clusters == active.clusters;
        info!("{: <25} {}", "clusters agree:", agree);
        if !agree {
            warn!("the clusters differ from the reference");
        }
    }
    if let (Some(trace), Ok(c_act)) = (reference.active_space_trace, bundle.get("Cact")) {
        let value: f64 = trace_abs_overlap(active.orbitals().view(), c_act, s);
        info!(
            "{: <25} {:.8} (reference: {:.8})",
            "tr |C^T S C_act|:", value, trace
        );
    }
    info!("{:-^80}", "");
}

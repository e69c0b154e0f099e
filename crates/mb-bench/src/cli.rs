//! Command-line parsing for the `mb-bench` binary.

use std::path::PathBuf;

use crate::config::{BenchConfig, PhaseConfig};
use crate::error::{BenchError, BenchResult};
use crate::registry::BackendId;
use crate::report::ReportFormat;

/// Parsed command-line flags, before being merged into a `BenchConfig`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CliArgs {
    pub config_path: Option<PathBuf>,
    pub backends: Option<Vec<BackendId>>,
    pub phases: Vec<PhaseConfig>,
    pub seed: Option<u64>,
    pub vendor_root: Option<PathBuf>,
    pub vendor_lib: Option<String>,
    pub small_threshold: Option<usize>,
    pub system_search: bool,
    pub json: bool,
    pub list: bool,
    pub help: bool,
}

impl CliArgs {
    /// Parse flags (without the program name).
    pub fn parse<I>(args: I) -> BenchResult<Self>
    where
        I: IntoIterator<Item = String>,
    {
        let mut cli = CliArgs::default();
        let mut args = args.into_iter();

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--config" => cli.config_path = Some(PathBuf::from(value(&mut args, &arg)?)),
                "--backends" => {
                    let list = value(&mut args, &arg)?;
                    let ids = list
                        .split(',')
                        .map(str::trim)
                        .filter(|s| !s.is_empty())
                        .map(str::parse)
                        .collect::<BenchResult<Vec<BackendId>>>()?;
                    cli.backends = Some(ids);
                }
                "--phase" => cli.phases.push(parse_phase(&value(&mut args, &arg)?)?),
                "--seed" => cli.seed = Some(parse_number(&value(&mut args, &arg)?, &arg)?),
                "--vendor-root" => cli.vendor_root = Some(PathBuf::from(value(&mut args, &arg)?)),
                "--vendor-lib" => cli.vendor_lib = Some(value(&mut args, &arg)?),
                "--small-threshold" => {
                    cli.small_threshold = Some(parse_number(&value(&mut args, &arg)?, &arg)?)
                }
                "--system-search" => cli.system_search = true,
                "--json" => cli.json = true,
                "--list" => cli.list = true,
                "-h" | "--help" => cli.help = true,
                other => {
                    return Err(BenchError::InvalidArgument(format!(
                        "unknown argument: {}",
                        other
                    )))
                }
            }
        }

        Ok(cli)
    }

    /// Merge with the configuration sources, lowest precedence first:
    /// defaults, the `--config` file, `env_vendor_root` (from `MKLROOT`),
    /// then the flags themselves.
    pub fn resolve(&self, env_vendor_root: Option<PathBuf>) -> BenchResult<BenchConfig> {
        let mut config = match &self.config_path {
            Some(path) => BenchConfig::load(path)?,
            None => BenchConfig::default(),
        };

        if let Some(root) = env_vendor_root {
            config.vendor.root = root;
        }
        if let Some(root) = &self.vendor_root {
            config.vendor.root = root.clone();
        }
        if let Some(lib) = &self.vendor_lib {
            config.vendor.library = lib.clone();
        }
        if let Some(threshold) = self.small_threshold {
            config.vendor.small_threshold = threshold;
        }
        if self.system_search {
            config.vendor.system_search = true;
        }
        if let Some(backends) = &self.backends {
            config.backends = backends.clone();
        }
        if !self.phases.is_empty() {
            config.phases = self.phases.clone();
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }
        if self.json {
            config.format = ReportFormat::Json;
        }

        config.validate()?;
        Ok(config)
    }
}

fn value(args: &mut impl Iterator<Item = String>, flag: &str) -> BenchResult<String> {
    args.next()
        .ok_or_else(|| BenchError::InvalidArgument(format!("{} requires a value", flag)))
}

fn parse_number<T: std::str::FromStr>(value: &str, flag: &str) -> BenchResult<T> {
    value.parse().map_err(|_| {
        BenchError::InvalidArgument(format!("{} expects a non-negative integer, got '{}'", flag, value))
    })
}

/// Parse `batch,m,k,n`.
fn parse_phase(value: &str) -> BenchResult<PhaseConfig> {
    let dims = value
        .split(',')
        .map(|part| parse_number::<usize>(part.trim(), "--phase"))
        .collect::<BenchResult<Vec<usize>>>()?;
    match dims[..] {
        [batch_size, m, k, n] => {
            let phase = PhaseConfig::new("", batch_size, m, k, n);
            phase.spec()?;
            Ok(phase)
        }
        _ => Err(BenchError::InvalidArgument(format!(
            "--phase expects batch,m,k,n, got '{}'",
            value
        ))),
    }
}

pub fn usage(program: &str) -> String {
    format!(
        "Usage: {program} [options]

Options:
  --config <path>          load a JSON configuration file
  --backends <a,b,...>     backends to run, in report order
  --phase <batch,m,k,n>    benchmark phase (repeatable, replaces the defaults)
  --seed <u64>             seed the batch generator for reproducible runs
  --vendor-root <dir>      vendor library installation root (default: $MKLROOT)
  --vendor-lib <file>      vendor shared library file name
  --small-threshold <n>    use the plain loop when M, N, K are all <= n
  --system-search          also look up the vendor library on the system path
  --json                   emit one JSON document per phase
  --list                   list available backends
  -h, --help               show this message"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_flags() {
        let cli = CliArgs::parse(args(&[
            "--backends",
            "reference, vendor",
            "--phase",
            "2,4,5,6",
            "--seed",
            "11",
            "--vendor-root",
            "/opt/mkl",
            "--small-threshold",
            "0",
            "--json",
        ]))
        .unwrap();

        assert_eq!(
            cli.backends,
            Some(vec![BackendId::Reference, BackendId::Vendor])
        );
        assert_eq!(cli.phases, vec![PhaseConfig::new("", 2, 4, 5, 6)]);
        assert_eq!(cli.seed, Some(11));
        assert_eq!(cli.vendor_root, Some(PathBuf::from("/opt/mkl")));
        assert_eq!(cli.small_threshold, Some(0));
        assert!(cli.json);
        assert!(!cli.list);
    }

    #[test]
    fn test_parse_errors() {
        assert!(CliArgs::parse(args(&["--bogus"])).is_err());
        assert!(CliArgs::parse(args(&["--seed"])).is_err());
        assert!(CliArgs::parse(args(&["--seed", "-1"])).is_err());
        assert!(CliArgs::parse(args(&["--phase", "1,2,3"])).is_err());
        assert!(CliArgs::parse(args(&["--phase", "0,2,3,4"])).is_err());
        assert!(matches!(
            CliArgs::parse(args(&["--backends", "cuda"])),
            Err(BenchError::UnknownBackend(_))
        ));
    }

    #[test]
    fn test_resolve_precedence() {
        let cli = CliArgs::parse(args(&["--vendor-root", "/flag/root", "--json"])).unwrap();
        let config = cli.resolve(Some(PathBuf::from("/env/root"))).unwrap();
        assert_eq!(config.vendor.root, PathBuf::from("/flag/root"));
        assert_eq!(config.format, ReportFormat::Json);
        assert_eq!(config.phases, BenchConfig::default_phases());

        let cli = CliArgs::parse(args(&["--phase", "1,2,2,2"])).unwrap();
        let config = cli.resolve(Some(PathBuf::from("/env/root"))).unwrap();
        assert_eq!(config.vendor.root, PathBuf::from("/env/root"));
        assert_eq!(config.phases.len(), 1);
    }

    #[test]
    fn test_resolve_empty_backends_rejected() {
        let cli = CliArgs::parse(args(&["--backends", ""])).unwrap();
        assert!(cli.resolve(None).is_err());
    }

    #[test]
    fn test_usage_mentions_flags() {
        let text = usage("mb-bench");
        assert!(text.starts_with("Usage: mb-bench"));
        assert!(text.contains("--backends"));
    }
}
